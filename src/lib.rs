//! Gaussian process showcase: prior, posterior and noisy posterior of a zero mean GP
//! under six covariance kernels.
//!
//! The GP core lives in the [`gp`] crate (re-exported from `gpshow-gp`). This crate drives it
//! over a [`ShowcaseConfig`]: for each configured kernel and [`Scenario`] a [`Panel`] holds the
//! posterior mean, the confidence band and sample paths at the query points. Panels are
//! exported as [`SeriesPoint`] triples `(x, y, series_id)` to be plotted by an external tool.
//!
//! ```no_run
//! use gpshow::{run_showcase, write_series, ShowcaseConfig};
//! use gpshow::gp::kernels::KernelKind;
//!
//! let config = ShowcaseConfig::default()
//!     .kernels(&[KernelKind::SquaredExponential, KernelKind::Periodic])
//!     .seed(42);
//! let panels = run_showcase(&config).expect("showcase run");
//! write_series(&panels, std::io::stdout()).expect("series written");
//! ```
#![warn(missing_docs)]
mod config;
mod errors;
mod scenario;
mod series;

pub use config::*;
pub use errors::*;
pub use scenario::*;
pub use series::*;

pub use gpshow_gp as gp;
