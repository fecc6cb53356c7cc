pub mod charts;

use std::{collections::BTreeMap, fs, path::Path};

use anyhow::Result;
use log::debug;

use crate::{
    aircraft::AircraftSpec,
    config::ChartConfig,
    perf::{fit::FitParameters, performance::PerformanceResults},
};

/// Renders every chart of one analysis run into `out_dir`. Models missing
/// from `fits` get scatter points but no fitted curve.
pub fn render_all(
    out_dir: &Path,
    aircraft: &[AircraftSpec],
    results: &PerformanceResults,
    fits: &BTreeMap<String, FitParameters>,
    charts: &ChartConfig,
) -> Result<()> {
    fs::create_dir_all(out_dir)?;

    let altitudes_m: Vec<u32> = results.mach_sweeps.keys().copied().collect();

    let path = out_dir.join("wing_load.svg");
    charts::wing_load_chart(&path, aircraft, results)?;
    debug!("Rendered '{}'", path.display());

    for spec in aircraft {
        let path = out_dir.join(format!("thrust_velocity_{}.svg", file_slug(&spec.name)));
        charts::thrust_velocity_chart(&path, spec, &altitudes_m, results, charts)?;
        debug!("Rendered '{}'", path.display());
    }

    let path = out_dir.join("min_drag_fit.svg");
    charts::min_drag_fit_chart(&path, aircraft, results, fits, charts)?;
    debug!("Rendered '{}'", path.display());

    for spec in aircraft {
        let path = out_dir.join(format!("thrust_mach_{}.svg", file_slug(&spec.name)));
        charts::thrust_mach_chart(&path, spec, &altitudes_m, results, charts)?;
        debug!("Rendered '{}'", path.display());
    }

    let path = out_dir.join("mach_comparison.svg");
    charts::mach_comparison_chart(&path, aircraft, &altitudes_m, results)?;
    debug!("Rendered '{}'", path.display());

    Ok(())
}

/// Lowercase file-name fragment for a model name.
pub fn file_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.ends_with('_') && !slug.is_empty() {
            slug.push('_');
        }
    }

    slug.trim_matches('_').to_string()
}

/// (min, max) over an iterator of values.
pub fn value_range(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    values.into_iter().fold(None, |range, value| {
        let (min, max) = range.unwrap_or((value, value));
        Some((min.min(value), max.max(value)))
    })
}
