use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    time::Instant,
};

pub use anyhow::Result;
use log::{info, warn};

use crate::{
    aircraft::{self, AircraftSpec},
    config::RunConfig,
    perf::{
        atmosphere::LayeredAtmosphere,
        fit::{self, FitParameters},
        performance::{self, PerformanceResults},
    },
    plot,
};

/// One batch analysis: aircraft table in, chart files out.
pub struct AnalysisRun {
    aircraft: Vec<AircraftSpec>,
    config: RunConfig,
    out_dir: PathBuf,
}

impl AnalysisRun {
    pub fn new(data: &Path, config: Option<&Path>, out_dir: PathBuf) -> Result<Self> {
        info!("Reading aircraft table from '{}'", data.display());
        let aircraft = aircraft::load_aircraft_table(data)?;
        info!("Loaded {} aircraft models", aircraft.len());

        let config = RunConfig::load(config)?;

        Ok(Self {
            aircraft,
            config,
            out_dir,
        })
    }

    pub fn run(&self) -> Result<()> {
        let atmosphere = LayeredAtmosphere::default();
        let grid = self.config.grid();

        info!(
            "Evaluating {} models over {} velocity samples x {} altitudes",
            self.aircraft.len(),
            grid.velocities_m_s.len(),
            grid.altitudes_m.len()
        );

        let start_time = Instant::now();
        let results = performance::evaluate(&self.aircraft, &atmosphere, &grid)?;
        let duration = (Instant::now() - start_time).as_secs_f64();

        info!("Evaluation completed in {duration:.6} s");

        let fits = fit_min_drag_curves(&self.aircraft, &results);

        info!("Rendering charts into '{}'", self.out_dir.display());
        plot::render_all(
            &self.out_dir,
            &self.aircraft,
            &results,
            &fits,
            &self.config.charts,
        )?;

        info!("Run completed");

        Ok(())
    }
}

/// Fits the minimum-drag-speed curve of every model. A failed fit is logged
/// and its model omitted from the map; the other models are unaffected.
pub fn fit_min_drag_curves(
    aircraft: &[AircraftSpec],
    results: &PerformanceResults,
) -> BTreeMap<String, FitParameters> {
    let mut fits = BTreeMap::new();

    for spec in aircraft {
        // The fit works in presentation units: altitude in km, speed in km/h.
        let points: Vec<(f64, f64)> = results
            .min_drag_profile(&spec.name)
            .iter()
            .map(|(altitude_m, point)| {
                (f64::from(*altitude_m) / 1000.0, point.airspeed_m_s * 3.6)
            })
            .collect();

        match fit::fit_min_drag_speed(&spec.name, &points) {
            Ok(params) => {
                fits.insert(spec.name.clone(), params);
            }
            Err(err) => warn!("{err}"),
        }
    }

    fits
}
