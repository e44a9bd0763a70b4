//! Export of panels as `(x, y, series_id)` triples for plotting.
use crate::errors::Result;
use crate::scenario::Panel;

use ndarray::{Array1, ArrayView1};
use ndarray_npy::write_npy;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// One plotted point belonging to the series `series_id`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    /// Abscissa
    pub x: f64,
    /// Ordinate
    pub y: f64,
    /// Series identifier `<kernel>/<scenario>/<curve>`
    pub series_id: String,
}

fn push_curve(points: &mut Vec<SeriesPoint>, id: &str, x: &Array1<f64>, y: ArrayView1<f64>) {
    points.extend(x.iter().zip(y.iter()).map(|(x, y)| SeriesPoint {
        x: *x,
        y: *y,
        series_id: id.to_string(),
    }));
}

impl Panel {
    /// Flatten the panel in series: `observations` (empty for the prior),
    /// `mean`, `lower`, `upper` and `sample_<i>` for each sample path
    pub fn series(&self) -> Vec<SeriesPoint> {
        let name = self.name();
        let mut points = Vec::new();
        push_curve(
            &mut points,
            &format!("{name}/observations"),
            &self.xtrain,
            self.ytrain.view(),
        );
        push_curve(
            &mut points,
            &format!("{name}/mean"),
            &self.x,
            self.posterior.mean.view(),
        );
        push_curve(&mut points, &format!("{name}/lower"), &self.x, self.lower.view());
        push_curve(&mut points, &format!("{name}/upper"), &self.x, self.upper.view());
        for (i, path) in self.samples.rows().into_iter().enumerate() {
            push_curve(&mut points, &format!("{name}/sample_{i}"), &self.x, path);
        }
        points
    }
}

/// Write the series of all `panels` as a JSON array to `writer`
pub fn write_series<W: Write>(panels: &[Panel], writer: W) -> Result<()> {
    let points: Vec<SeriesPoint> = panels.iter().flat_map(|p| p.series()).collect();
    serde_json::to_writer_pretty(writer, &points)?;
    Ok(())
}

/// Write the series of all `panels` as JSON in the file `path`
pub fn save_series<P: AsRef<Path>>(panels: &[Panel], path: P) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_series(panels, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Save posterior mean, covariance and sample paths of each panel as npy files
/// `<kernel>_<scenario>_{mean,cov,samples}.npy` in directory `dir`
pub fn save_npy<P: AsRef<Path>>(panels: &[Panel], dir: P) -> Result<()> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;
    for panel in panels {
        let prefix = format!("{}_{}", panel.kernel, panel.scenario);
        write_npy(dir.join(format!("{prefix}_mean.npy")), &panel.posterior.mean)?;
        write_npy(
            dir.join(format!("{prefix}_cov.npy")),
            &panel.posterior.covariance,
        )?;
        write_npy(dir.join(format!("{prefix}_samples.npy")), &panel.samples)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShowcaseConfig;
    use crate::scenario::{run_panel, run_showcase, Scenario};
    use gpshow_gp::kernels::{KernelKind, KernelSpec};
    use ndarray_rand::rand::SeedableRng;
    use rand_xoshiro::Xoshiro256Plus;
    use std::collections::HashSet;

    fn panel(scenario: Scenario) -> Panel {
        let config = ShowcaseConfig::default().n_samples(2);
        let kernel = KernelSpec::from_config(KernelKind::Cosine, &Default::default());
        let mut rng = Xoshiro256Plus::seed_from_u64(42);
        run_panel(&config, &kernel, scenario, &mut rng).unwrap()
    }

    #[test]
    fn test_panel_series() {
        let points = panel(Scenario::Posterior).series();
        // 5 observations, mean, band bounds and 2 samples over 50 query points
        assert_eq!(points.len(), 5 + 5 * 50);
        assert_eq!(points[0].series_id, "cos/posterior/observations");
        assert_eq!(points[0].x, -4.1);
        assert_eq!(points[0].y, -2.);
        assert_eq!(points[5].series_id, "cos/posterior/mean");
        assert_eq!(points[5].x, -5.);
        assert_eq!(points.last().unwrap().series_id, "cos/posterior/sample_1");
    }

    #[test]
    fn test_prior_series_without_observations() {
        let points = panel(Scenario::Prior).series();
        assert_eq!(points.len(), 5 * 50);
        assert!(points.iter().all(|p| !p.series_id.ends_with("observations")));
    }

    #[test]
    fn test_write_series_json() {
        let panels = vec![panel(Scenario::NoisyPosterior)];
        let mut buffer = Vec::new();
        write_series(&panels, &mut buffer).unwrap();
        let points: Vec<SeriesPoint> = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(points, panels[0].series());
    }

    #[test]
    fn test_series_export() {
        let config = ShowcaseConfig::default()
            .kernels(&[KernelKind::Linear, KernelKind::LocallyPeriodic])
            .n_samples(1);
        let panels = run_showcase(&config).unwrap();

        let mut buffer = Vec::new();
        write_series(&panels, &mut buffer).unwrap();
        let points: Vec<SeriesPoint> = serde_json::from_slice(&buffer).unwrap();
        let ids: HashSet<&str> = points.iter().map(|p| p.series_id.as_str()).collect();
        assert!(ids.contains("linear/prior/mean"));
        assert!(ids.contains("locally_periodic/noisy_posterior/sample_0"));
        assert!(ids.contains("locally_periodic/posterior/observations"));
        assert!(!ids.contains("linear/prior/observations"));

        let path = std::env::temp_dir().join("gpshow_series_export.json");
        save_series(&panels, &path).unwrap();
        let saved: Vec<SeriesPoint> =
            serde_json::from_reader(std::fs::File::open(&path).unwrap()).unwrap();
        assert_eq!(saved, points);
        std::fs::remove_file(path).ok();
    }
}
