//! A module for scalar covariance kernels `k(a, b)` used to build GP covariance matrices.
//!
//! The following kernels are implemented:
//! * squared exponential (`squared_exp`),
//! * rational quadratic (`rational_quadratic`),
//! * periodic (`periodic`),
//! * locally periodic (`locally_periodic`),
//! * linear (`linear`),
//! * cosine (`cos`).
//!
//! Each kernel is a small immutable struct holding its named hyperparameters,
//! [`KernelSpec`] is the closed set of the six kernels which lets the GP engine
//! be driven generically from a [`KernelKind`] identifier and a [`KernelConfig`].

use crate::errors::{GpError, Result};
use linfa::Float;
#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;

/// Default length scale
pub const DEFAULT_LENGTH_SCALE: f64 = 1.;
/// Default output variance
pub const DEFAULT_VARIANCE_OUT: f64 = 2.;
/// Default weighting of large and small scale variations of the rational quadratic kernel
pub const DEFAULT_ALPHA_WEIGHTING: f64 = 10.;
/// Default period of the periodic kernels, pi divided by the golden ratio
pub const DEFAULT_PERIOD: f64 = std::f64::consts::PI / 1.618;
/// Default constant variance of the linear kernel
pub const DEFAULT_CONSTANT_VARIANCE_OUT: f64 = 1.;
/// Default offset of the linear kernel
pub const DEFAULT_OFFSET: f64 = 0.;

/// A trait for using a scalar covariance kernel in GP regression
pub trait Kernel<F: Float>: Clone + fmt::Debug + fmt::Display + Send + Sync {
    /// Covariance `k(a, b)` between two scalar inputs
    fn value(&self, a: F, b: F) -> F;

    /// Check hyperparameters validity.
    ///
    /// Zero or non finite denominators (length scale, period, ...) are reported
    /// as [`GpError::InvalidValueError`].
    fn check(&self) -> Result<()>;

    /// Registered identifier of the kernel
    fn kind(&self) -> KernelKind;
}

fn check_positive<F: Float>(name: &str, value: F) -> Result<()> {
    if value.is_finite() && value > F::zero() {
        Ok(())
    } else {
        Err(GpError::InvalidValueError(format!(
            "`{name}` should be strictly positive and finite, got {value}"
        )))
    }
}

fn check_finite<F: Float>(name: &str, value: F) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(GpError::InvalidValueError(format!(
            "`{name}` should be finite, got {value}"
        )))
    }
}

fn check_non_negative<F: Float>(name: &str, value: F) -> Result<()> {
    if value.is_finite() && value >= F::zero() {
        Ok(())
    } else {
        Err(GpError::InvalidValueError(format!(
            "`{name}` should be non negative and finite, got {value}"
        )))
    }
}

/// Registered kernel identifiers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serializable",
    derive(Serialize, Deserialize),
    serde(into = "String"),
    serde(try_from = "String")
)]
pub enum KernelKind {
    /// `squared_exp`
    SquaredExponential,
    /// `rational_quadratic`
    RationalQuadratic,
    /// `periodic`
    Periodic,
    /// `locally_periodic`
    LocallyPeriodic,
    /// `linear`
    Linear,
    /// `cos`
    Cosine,
}

impl KernelKind {
    /// All registered kernels in their canonical order
    pub const ALL: [KernelKind; 6] = [
        KernelKind::SquaredExponential,
        KernelKind::RationalQuadratic,
        KernelKind::Periodic,
        KernelKind::LocallyPeriodic,
        KernelKind::Linear,
        KernelKind::Cosine,
    ];

    /// Stable string identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            KernelKind::SquaredExponential => "squared_exp",
            KernelKind::RationalQuadratic => "rational_quadratic",
            KernelKind::Periodic => "periodic",
            KernelKind::LocallyPeriodic => "locally_periodic",
            KernelKind::Linear => "linear",
            KernelKind::Cosine => "cos",
        }
    }
}

impl fmt::Display for KernelKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for KernelKind {
    type Err = GpError;

    fn from_str(s: &str) -> Result<Self> {
        KernelKind::ALL
            .iter()
            .find(|kind| kind.as_str() == s)
            .copied()
            .ok_or_else(|| GpError::UnknownKernel(s.to_string()))
    }
}

impl From<KernelKind> for String {
    fn from(item: KernelKind) -> String {
        item.as_str().to_string()
    }
}

impl TryFrom<String> for KernelKind {
    type Error = GpError;
    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

/// Squared exponential kernel
///
/// `variance_out * exp(-0.5 * ((a - b) / length_scale)^2)`
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct SquaredExponential<F: Float> {
    /// Length scale
    pub length_scale: F,
    /// Output variance
    pub variance_out: F,
}

impl<F: Float> Default for SquaredExponential<F> {
    fn default() -> Self {
        SquaredExponential {
            length_scale: F::cast(DEFAULT_LENGTH_SCALE),
            variance_out: F::cast(DEFAULT_VARIANCE_OUT),
        }
    }
}

impl<F: Float> SquaredExponential<F> {
    /// Set length scale
    pub fn length_scale(mut self, length_scale: F) -> Self {
        self.length_scale = length_scale;
        self
    }

    /// Set output variance
    pub fn variance_out(mut self, variance_out: F) -> Self {
        self.variance_out = variance_out;
        self
    }
}

impl<F: Float> Kernel<F> for SquaredExponential<F> {
    fn value(&self, a: F, b: F) -> F {
        let r = (a - b) / self.length_scale;
        self.variance_out * F::exp(F::cast(-0.5) * r * r)
    }

    fn check(&self) -> Result<()> {
        check_positive("length_scale", self.length_scale)?;
        check_non_negative("variance_out", self.variance_out)
    }

    fn kind(&self) -> KernelKind {
        KernelKind::SquaredExponential
    }
}

impl<F: Float> fmt::Display for SquaredExponential<F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "SquaredExponential(length_scale={}, variance_out={})",
            self.length_scale, self.variance_out
        )
    }
}

/// Rational quadratic kernel, a scale mixture of squared exponential kernels
///
/// `variance_out * (1 + (a - b)^2 / (2 * alpha * length_scale^2))^(-alpha)`
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct RationalQuadratic<F: Float> {
    /// Length scale
    pub length_scale: F,
    /// Output variance
    pub variance_out: F,
    /// Relative weighting of large-scale and small-scale variations
    pub alpha_weighting: F,
}

impl<F: Float> Default for RationalQuadratic<F> {
    fn default() -> Self {
        RationalQuadratic {
            length_scale: F::cast(DEFAULT_LENGTH_SCALE),
            variance_out: F::cast(DEFAULT_VARIANCE_OUT),
            alpha_weighting: F::cast(DEFAULT_ALPHA_WEIGHTING),
        }
    }
}

impl<F: Float> RationalQuadratic<F> {
    /// Set length scale
    pub fn length_scale(mut self, length_scale: F) -> Self {
        self.length_scale = length_scale;
        self
    }

    /// Set output variance
    pub fn variance_out(mut self, variance_out: F) -> Self {
        self.variance_out = variance_out;
        self
    }

    /// Set alpha weighting
    pub fn alpha_weighting(mut self, alpha_weighting: F) -> Self {
        self.alpha_weighting = alpha_weighting;
        self
    }
}

impl<F: Float> Kernel<F> for RationalQuadratic<F> {
    fn value(&self, a: F, b: F) -> F {
        let d = a - b;
        let alpha = self.alpha_weighting;
        let base = F::one() + d * d / (F::cast(2.) * alpha * self.length_scale * self.length_scale);
        self.variance_out * base.powf(-alpha)
    }

    fn check(&self) -> Result<()> {
        check_positive("length_scale", self.length_scale)?;
        check_positive("alpha_weighting", self.alpha_weighting)?;
        check_non_negative("variance_out", self.variance_out)
    }

    fn kind(&self) -> KernelKind {
        KernelKind::RationalQuadratic
    }
}

impl<F: Float> fmt::Display for RationalQuadratic<F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "RationalQuadratic(length_scale={}, variance_out={}, alpha_weighting={})",
            self.length_scale, self.variance_out, self.alpha_weighting
        )
    }
}

/// Periodic (exp-sine-squared) kernel
///
/// `variance_out * exp(-2 * sin(pi * (a - b) / period)^2 / length_scale^2)`
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct Periodic<F: Float> {
    /// Length scale
    pub length_scale: F,
    /// Output variance
    pub variance_out: F,
    /// Distance between repetitions
    pub period: F,
}

impl<F: Float> Default for Periodic<F> {
    fn default() -> Self {
        Periodic {
            length_scale: F::cast(DEFAULT_LENGTH_SCALE),
            variance_out: F::cast(DEFAULT_VARIANCE_OUT),
            period: F::cast(DEFAULT_PERIOD),
        }
    }
}

impl<F: Float> Periodic<F> {
    /// Set length scale
    pub fn length_scale(mut self, length_scale: F) -> Self {
        self.length_scale = length_scale;
        self
    }

    /// Set output variance
    pub fn variance_out(mut self, variance_out: F) -> Self {
        self.variance_out = variance_out;
        self
    }

    /// Set period
    pub fn period(mut self, period: F) -> Self {
        self.period = period;
        self
    }
}

fn periodic_term<F: Float>(d: F, length_scale: F, period: F) -> F {
    let s = F::sin(F::cast(std::f64::consts::PI) * d / period);
    F::exp(F::cast(-2.) * s * s / (length_scale * length_scale))
}

impl<F: Float> Kernel<F> for Periodic<F> {
    fn value(&self, a: F, b: F) -> F {
        self.variance_out * periodic_term(a - b, self.length_scale, self.period)
    }

    fn check(&self) -> Result<()> {
        check_positive("length_scale", self.length_scale)?;
        check_positive("period", self.period)?;
        check_non_negative("variance_out", self.variance_out)
    }

    fn kind(&self) -> KernelKind {
        KernelKind::Periodic
    }
}

impl<F: Float> fmt::Display for Periodic<F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Periodic(length_scale={}, variance_out={}, period={})",
            self.length_scale, self.variance_out, self.period
        )
    }
}

/// Locally periodic kernel: a periodic kernel whose correlation decays with distance
///
/// `periodic(a, b) * exp(-(a - b)^2 / (2 * length_scale^2))`
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct LocallyPeriodic<F: Float> {
    /// Length scale shared by the periodic term and the decay envelope
    pub length_scale: F,
    /// Output variance
    pub variance_out: F,
    /// Distance between repetitions
    pub period: F,
}

impl<F: Float> Default for LocallyPeriodic<F> {
    fn default() -> Self {
        LocallyPeriodic {
            length_scale: F::cast(DEFAULT_LENGTH_SCALE),
            variance_out: F::cast(DEFAULT_VARIANCE_OUT),
            period: F::cast(DEFAULT_PERIOD),
        }
    }
}

impl<F: Float> LocallyPeriodic<F> {
    /// Set length scale
    pub fn length_scale(mut self, length_scale: F) -> Self {
        self.length_scale = length_scale;
        self
    }

    /// Set output variance
    pub fn variance_out(mut self, variance_out: F) -> Self {
        self.variance_out = variance_out;
        self
    }

    /// Set period
    pub fn period(mut self, period: F) -> Self {
        self.period = period;
        self
    }
}

impl<F: Float> Kernel<F> for LocallyPeriodic<F> {
    fn value(&self, a: F, b: F) -> F {
        let d = a - b;
        let envelope = F::exp(-d * d / (F::cast(2.) * self.length_scale * self.length_scale));
        self.variance_out * periodic_term(d, self.length_scale, self.period) * envelope
    }

    fn check(&self) -> Result<()> {
        check_positive("length_scale", self.length_scale)?;
        check_positive("period", self.period)?;
        check_non_negative("variance_out", self.variance_out)
    }

    fn kind(&self) -> KernelKind {
        KernelKind::LocallyPeriodic
    }
}

impl<F: Float> fmt::Display for LocallyPeriodic<F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "LocallyPeriodic(length_scale={}, variance_out={}, period={})",
            self.length_scale, self.variance_out, self.period
        )
    }
}

/// Linear (dot product) kernel, non stationary
///
/// `constant_variance_out^2 + variance_out^2 * (a - offset) * (b - offset)`
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct Linear<F: Float> {
    /// Output variance of the slope
    pub variance_out: F,
    /// Output variance of the constant term
    pub constant_variance_out: F,
    /// Point all lines go through in expectation
    pub offset: F,
}

impl<F: Float> Default for Linear<F> {
    fn default() -> Self {
        Linear {
            variance_out: F::cast(DEFAULT_VARIANCE_OUT),
            constant_variance_out: F::cast(DEFAULT_CONSTANT_VARIANCE_OUT),
            offset: F::cast(DEFAULT_OFFSET),
        }
    }
}

impl<F: Float> Linear<F> {
    /// Set slope output variance
    pub fn variance_out(mut self, variance_out: F) -> Self {
        self.variance_out = variance_out;
        self
    }

    /// Set constant output variance
    pub fn constant_variance_out(mut self, constant_variance_out: F) -> Self {
        self.constant_variance_out = constant_variance_out;
        self
    }

    /// Set offset
    pub fn offset(mut self, offset: F) -> Self {
        self.offset = offset;
        self
    }
}

impl<F: Float> Kernel<F> for Linear<F> {
    fn value(&self, a: F, b: F) -> F {
        self.constant_variance_out * self.constant_variance_out
            + self.variance_out * self.variance_out * (a - self.offset) * (b - self.offset)
    }

    fn check(&self) -> Result<()> {
        check_finite("variance_out", self.variance_out)?;
        check_finite("constant_variance_out", self.constant_variance_out)?;
        check_finite("offset", self.offset)
    }

    fn kind(&self) -> KernelKind {
        KernelKind::Linear
    }
}

impl<F: Float> fmt::Display for Linear<F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Linear(variance_out={}, constant_variance_out={}, offset={})",
            self.variance_out, self.constant_variance_out, self.offset
        )
    }
}

/// Cosine kernel, no variance scaling
///
/// `cos(2 * pi * (a - b) / period)`
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct Cosine<F: Float> {
    /// Distance between repetitions
    pub period: F,
}

impl<F: Float> Default for Cosine<F> {
    fn default() -> Self {
        Cosine {
            period: F::cast(DEFAULT_PERIOD),
        }
    }
}

impl<F: Float> Cosine<F> {
    /// Set period
    pub fn period(mut self, period: F) -> Self {
        self.period = period;
        self
    }
}

impl<F: Float> Kernel<F> for Cosine<F> {
    fn value(&self, a: F, b: F) -> F {
        F::cos(F::cast(2. * std::f64::consts::PI) * (a - b) / self.period)
    }

    fn check(&self) -> Result<()> {
        check_positive("period", self.period)
    }

    fn kind(&self) -> KernelKind {
        KernelKind::Cosine
    }
}

impl<F: Float> fmt::Display for Cosine<F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Cosine(period={})", self.period)
    }
}

/// Hyperparameters shared by the registered kernels, each kernel picks the ones it uses.
///
/// Defaults are `length_scale=1`, `variance_out=2`, `alpha_weighting=10`,
/// `period=pi/1.618`, `constant_variance_out=1`, `offset=0`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serializable",
    derive(Serialize, Deserialize),
    serde(default)
)]
pub struct KernelConfig<F: Float> {
    /// Length scale
    pub length_scale: F,
    /// Output variance
    pub variance_out: F,
    /// Rational quadratic weighting
    pub alpha_weighting: F,
    /// Period of periodic, locally periodic and cosine kernels
    pub period: F,
    /// Constant output variance of the linear kernel
    pub constant_variance_out: F,
    /// Offset of the linear kernel
    pub offset: F,
}

impl<F: Float> Default for KernelConfig<F> {
    fn default() -> Self {
        KernelConfig {
            length_scale: F::cast(DEFAULT_LENGTH_SCALE),
            variance_out: F::cast(DEFAULT_VARIANCE_OUT),
            alpha_weighting: F::cast(DEFAULT_ALPHA_WEIGHTING),
            period: F::cast(DEFAULT_PERIOD),
            constant_variance_out: F::cast(DEFAULT_CONSTANT_VARIANCE_OUT),
            offset: F::cast(DEFAULT_OFFSET),
        }
    }
}

/// One of the registered kernels
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub enum KernelSpec<F: Float> {
    /// Squared exponential
    SquaredExponential(SquaredExponential<F>),
    /// Rational quadratic
    RationalQuadratic(RationalQuadratic<F>),
    /// Periodic
    Periodic(Periodic<F>),
    /// Locally periodic
    LocallyPeriodic(LocallyPeriodic<F>),
    /// Linear
    Linear(Linear<F>),
    /// Cosine
    Cosine(Cosine<F>),
}

impl<F: Float> Default for KernelSpec<F> {
    fn default() -> Self {
        KernelSpec::SquaredExponential(SquaredExponential::default())
    }
}

impl<F: Float> KernelSpec<F> {
    /// Build the kernel registered as `kind` with hyperparameters taken from `config`
    pub fn from_config(kind: KernelKind, config: &KernelConfig<F>) -> Self {
        match kind {
            KernelKind::SquaredExponential => KernelSpec::SquaredExponential(SquaredExponential {
                length_scale: config.length_scale,
                variance_out: config.variance_out,
            }),
            KernelKind::RationalQuadratic => KernelSpec::RationalQuadratic(RationalQuadratic {
                length_scale: config.length_scale,
                variance_out: config.variance_out,
                alpha_weighting: config.alpha_weighting,
            }),
            KernelKind::Periodic => KernelSpec::Periodic(Periodic {
                length_scale: config.length_scale,
                variance_out: config.variance_out,
                period: config.period,
            }),
            KernelKind::LocallyPeriodic => KernelSpec::LocallyPeriodic(LocallyPeriodic {
                length_scale: config.length_scale,
                variance_out: config.variance_out,
                period: config.period,
            }),
            KernelKind::Linear => KernelSpec::Linear(Linear {
                variance_out: config.variance_out,
                constant_variance_out: config.constant_variance_out,
                offset: config.offset,
            }),
            KernelKind::Cosine => KernelSpec::Cosine(Cosine {
                period: config.period,
            }),
        }
    }

    /// Build the kernel registered under `name` with hyperparameters taken from `config`
    pub fn from_name(name: &str, config: &KernelConfig<F>) -> Result<Self> {
        Ok(Self::from_config(name.parse()?, config))
    }
}

impl<F: Float> Kernel<F> for KernelSpec<F> {
    fn value(&self, a: F, b: F) -> F {
        match self {
            KernelSpec::SquaredExponential(k) => k.value(a, b),
            KernelSpec::RationalQuadratic(k) => k.value(a, b),
            KernelSpec::Periodic(k) => k.value(a, b),
            KernelSpec::LocallyPeriodic(k) => k.value(a, b),
            KernelSpec::Linear(k) => k.value(a, b),
            KernelSpec::Cosine(k) => k.value(a, b),
        }
    }

    fn check(&self) -> Result<()> {
        match self {
            KernelSpec::SquaredExponential(k) => k.check(),
            KernelSpec::RationalQuadratic(k) => k.check(),
            KernelSpec::Periodic(k) => k.check(),
            KernelSpec::LocallyPeriodic(k) => k.check(),
            KernelSpec::Linear(k) => k.check(),
            KernelSpec::Cosine(k) => k.check(),
        }
    }

    fn kind(&self) -> KernelKind {
        match self {
            KernelSpec::SquaredExponential(k) => k.kind(),
            KernelSpec::RationalQuadratic(k) => k.kind(),
            KernelSpec::Periodic(k) => k.kind(),
            KernelSpec::LocallyPeriodic(k) => k.kind(),
            KernelSpec::Linear(k) => k.kind(),
            KernelSpec::Cosine(k) => k.kind(),
        }
    }
}

impl<F: Float> fmt::Display for KernelSpec<F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            KernelSpec::SquaredExponential(k) => k.fmt(f),
            KernelSpec::RationalQuadratic(k) => k.fmt(f),
            KernelSpec::Periodic(k) => k.fmt(f),
            KernelSpec::LocallyPeriodic(k) => k.fmt(f),
            KernelSpec::Linear(k) => k.fmt(f),
            KernelSpec::Cosine(k) => k.fmt(f),
        }
    }
}

macro_rules! impl_from_kernel {
    ($($kernel:ident),*) => {
        $(
            impl<F: Float> From<$kernel<F>> for KernelSpec<F> {
                fn from(kernel: $kernel<F>) -> Self {
                    KernelSpec::$kernel(kernel)
                }
            }
        )*
    };
}

impl_from_kernel!(
    SquaredExponential,
    RationalQuadratic,
    Periodic,
    LocallyPeriodic,
    Linear,
    Cosine
);
