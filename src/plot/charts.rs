use std::{collections::BTreeMap, path::Path};

use anyhow::{anyhow, Result};
use itertools::izip;
use plotters::prelude::*;

use crate::{
    aircraft::AircraftSpec,
    config::ChartConfig,
    math,
    perf::{fit::FitParameters, performance::PerformanceResults, performance::SeriesKey},
};

use super::value_range;

const M_S_TO_KM_H: f64 = 3.6;
const N_TO_KN: f64 = 1.0e-3;

const CORAL: RGBColor = RGBColor(255, 127, 80);
const TAB_BLUE: RGBColor = RGBColor(31, 119, 180);
const TAB_ORANGE: RGBColor = RGBColor(255, 127, 14);
const GREY: RGBColor = RGBColor(128, 128, 128);

const CHART_SIZE: (u32, u32) = (900, 600);

/// Scatter marker shapes, cycled per model.
#[derive(Debug, Clone, Copy)]
enum Marker {
    Circle,
    Triangle,
    Square,
}

const MARKERS: [Marker; 3] = [Marker::Circle, Marker::Triangle, Marker::Square];

fn altitude_label(altitude_m: u32) -> String {
    format!("{} km", f64::from(altitude_m) / 1000.0)
}

/// One bar per model, file row order.
pub fn wing_load_chart(
    path: &Path,
    aircraft: &[AircraftSpec],
    results: &PerformanceResults,
) -> Result<()> {
    let loads: Vec<f64> = aircraft
        .iter()
        .map(|spec| {
            results
                .wing_loads_n_m2
                .get(&spec.name)
                .copied()
                .ok_or_else(|| anyhow!("No wing load for '{}'", spec.name))
        })
        .collect::<Result<_>>()?;

    let (_, max_load) =
        value_range(loads.iter().copied()).ok_or_else(|| anyhow!("No aircraft to plot"))?;

    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let x_max = aircraft.len() as f64 - 0.4;
    let mut chart = ChartBuilder::on(&root)
        .caption("Wing load", ("serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(-0.6..x_max, 0.0..max_load * 1.1)?;

    let model_names: Vec<&str> = aircraft.iter().map(|spec| spec.name.as_str()).collect();
    let label_for = move |x: &f64| {
        let index = x.round();
        if (x - index).abs() < 1e-6 && index >= 0.0 {
            model_names
                .get(index as usize)
                .map(|name| name.to_string())
                .unwrap_or_default()
        } else {
            String::new()
        }
    };

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_labels(aircraft.len())
        .x_label_formatter(&label_for)
        .x_desc("Model")
        .y_desc("Wing load (N/m²)")
        .draw()?;

    chart.draw_series(loads.iter().enumerate().map(|(index, &load)| {
        let center = index as f64;
        Rectangle::new([(center - 0.25, 0.0), (center + 0.25, load)], CORAL.filled())
    }))?;

    root.present()?;
    Ok(())
}

/// Thrust required vs airspeed for one model, one curve per altitude, with
/// the minimum-drag point marked on each curve.
pub fn thrust_velocity_chart(
    path: &Path,
    spec: &AircraftSpec,
    altitudes_m: &[u32],
    results: &PerformanceResults,
    charts: &ChartConfig,
) -> Result<()> {
    let (v_min, v_max) = value_range(results.velocities_m_s.iter().copied())
        .ok_or_else(|| anyhow!("Empty velocity sweep"))?;

    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(&spec.name, ("serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(
            v_min * M_S_TO_KM_H..v_max * M_S_TO_KM_H,
            0.0..charts.thrust_axis_max_kn,
        )?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_desc("Velocity (km/h)")
        .y_desc("Thrust Required (kN)")
        .draw()?;

    for (index, &altitude_m) in altitudes_m.iter().enumerate() {
        let key = SeriesKey::new(&spec.name, altitude_m);
        let series = results
            .series
            .get(&key)
            .ok_or_else(|| anyhow!("No series for '{}' at {} m", spec.name, altitude_m))?;
        let point = results
            .min_drag
            .get(&key)
            .ok_or_else(|| anyhow!("No minimum-drag point for '{}' at {} m", spec.name, altitude_m))?;

        let color = Palette99::pick(index).to_rgba();
        chart
            .draw_series(LineSeries::new(
                izip!(&results.velocities_m_s, &series.thrust_n)
                    .map(|(&v, &thrust)| (v * M_S_TO_KM_H, thrust * N_TO_KN)),
                color.stroke_width(2),
            ))?
            .label(altitude_label(altitude_m))
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 18, y)], color.stroke_width(2))
            });

        chart.draw_series(PointSeries::of_element(
            [(point.airspeed_m_s * M_S_TO_KM_H, point.thrust_n * N_TO_KN)],
            3,
            color.filled(),
            &|coord, size, style| Circle::new(coord, size, style),
        ))?;
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .border_style(BLACK.mix(0.4))
        .background_style(WHITE.mix(0.8))
        .draw()?;

    root.present()?;
    Ok(())
}

/// Minimum-drag airspeed vs height scatter for every model, overlaid with
/// the fitted curves of the models whose fit succeeded.
pub fn min_drag_fit_chart(
    path: &Path,
    aircraft: &[AircraftSpec],
    results: &PerformanceResults,
    fits: &BTreeMap<String, FitParameters>,
    charts: &ChartConfig,
) -> Result<()> {
    let curve_xs = math::linspace(0.0, charts.fit_axis_max_km, charts.fit_curve_samples);

    let mut scatter: Vec<(String, Vec<(f64, f64)>)> = Vec::new();
    for spec in aircraft {
        let profile = results.min_drag_profile(&spec.name);
        if profile.is_empty() {
            return Err(anyhow!("No minimum-drag points for '{}'", spec.name));
        }

        let points = profile
            .iter()
            .map(|(altitude_m, point)| {
                (
                    f64::from(*altitude_m) / 1000.0,
                    point.airspeed_m_s * M_S_TO_KM_H,
                )
            })
            .collect();
        scatter.push((spec.name.clone(), points));
    }

    let speeds = scatter
        .iter()
        .flat_map(|(_, points)| points.iter().map(|&(_, speed)| speed))
        .chain(fits.values().flat_map(|fit| {
            curve_xs.iter().map(move |&x| fit.evaluate(x))
        }));
    let (speed_min, speed_max) =
        value_range(speeds).ok_or_else(|| anyhow!("No data to plot"))?;
    let pad = (speed_max - speed_min).max(1.0) * 0.05;

    let root = SVGBackend::new(path, (500, 800)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Minimum drag airspeed", ("serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(
            0.0..charts.fit_axis_max_km,
            (speed_min - pad)..(speed_max + pad),
        )?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_desc("Height (km)")
        .y_desc("Minimum drag airspeed (km/h)")
        .draw()?;

    for (index, (name, points)) in scatter.iter().enumerate() {
        let color = Palette99::pick(index).to_rgba();

        let scatter_series = match MARKERS[index % MARKERS.len()] {
            Marker::Circle => chart.draw_series(
                points.iter().map(|&coord| Circle::new(coord, 4, color.filled())),
            )?,
            Marker::Triangle => chart.draw_series(
                points
                    .iter()
                    .map(|&coord| TriangleMarker::new(coord, 5, color.filled())),
            )?,
            Marker::Square => chart.draw_series(points.iter().map(|&coord| {
                EmptyElement::at(coord) + Rectangle::new([(-4, -4), (4, 4)], color.filled())
            }))?,
        };
        scatter_series
            .label(name)
            .legend(move |(x, y)| Circle::new((x + 9, y), 4, color.filled()));

        if let Some(fit) = fits.get(name) {
            chart
                .draw_series(DashedLineSeries::new(
                    curve_xs.iter().map(|&x| (x, fit.evaluate(x))),
                    5,
                    3,
                    color.stroke_width(1),
                ))?
                .label(format!("{name} Fit"))
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 18, y)], color.stroke_width(1))
                });
        }
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::LowerRight)
        .border_style(BLACK.mix(0.4))
        .background_style(WHITE.mix(0.8))
        .draw()?;

    root.present()?;
    Ok(())
}

/// Thrust required vs Mach for one model, one curve per altitude, with the
/// reported cruise Mach marked.
pub fn thrust_mach_chart(
    path: &Path,
    spec: &AircraftSpec,
    altitudes_m: &[u32],
    results: &PerformanceResults,
    charts: &ChartConfig,
) -> Result<()> {
    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(&spec.name, ("serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(
            charts.mach_axis_min..charts.mach_axis_max,
            0.0..charts.mach_thrust_axis_max_kn,
        )?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_desc("Mach")
        .y_desc("Thrust Required (kN)")
        .draw()?;

    for (index, &altitude_m) in altitudes_m.iter().enumerate() {
        let key = SeriesKey::new(&spec.name, altitude_m);
        let series = results
            .series
            .get(&key)
            .ok_or_else(|| anyhow!("No series for '{}' at {} m", spec.name, altitude_m))?;
        let machs = results
            .mach_sweeps
            .get(&altitude_m)
            .ok_or_else(|| anyhow!("No Mach sweep at {altitude_m} m"))?;

        let color = Palette99::pick(index).to_rgba();
        chart
            .draw_series(LineSeries::new(
                izip!(machs, &series.thrust_n).map(|(&mach, &thrust)| (mach, thrust * N_TO_KN)),
                color.stroke_width(2),
            ))?
            .label(altitude_label(altitude_m))
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 18, y)], color.stroke_width(2))
            });
    }

    chart
        .draw_series(DashedLineSeries::new(
            [
                (spec.cruise_mach, 0.0),
                (spec.cruise_mach, charts.mach_thrust_axis_max_kn),
            ],
            6,
            4,
            GREY.stroke_width(1),
        ))?
        .label("Cruise Mach")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 18, y)], GREY.stroke_width(1)));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .border_style(BLACK.mix(0.4))
        .background_style(WHITE.mix(0.8))
        .draw()?;

    root.present()?;
    Ok(())
}

/// Cruise Mach next to minimum-drag Mach, one bar pair per model, at the
/// middle altitude of the evaluated set.
pub fn mach_comparison_chart(
    path: &Path,
    aircraft: &[AircraftSpec],
    altitudes_m: &[u32],
    results: &PerformanceResults,
) -> Result<()> {
    let altitude_m = *altitudes_m
        .get(altitudes_m.len() / 2)
        .ok_or_else(|| anyhow!("No altitudes to plot"))?;
    let speed_of_sound = results
        .speed_of_sound_at(altitude_m)
        .ok_or_else(|| anyhow!("No speed of sound at {altitude_m} m"))?;

    let mut cruise = Vec::with_capacity(aircraft.len());
    let mut min_drag = Vec::with_capacity(aircraft.len());
    for spec in aircraft {
        let key = SeriesKey::new(&spec.name, altitude_m);
        let point = results
            .min_drag
            .get(&key)
            .ok_or_else(|| anyhow!("No minimum-drag point for '{}' at {} m", spec.name, altitude_m))?;

        cruise.push(spec.cruise_mach);
        min_drag.push(point.airspeed_m_s / speed_of_sound);
    }

    let (_, mach_max) = value_range(cruise.iter().chain(min_drag.iter()).copied())
        .ok_or_else(|| anyhow!("No aircraft to plot"))?;

    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let x_max = aircraft.len() as f64 - 0.4;
    let mut chart = ChartBuilder::on(&root)
        .caption("Mach cruise speed vs minimum drag speed", ("serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.6..x_max, 0.0..mach_max * 1.2)?;

    let model_names: Vec<&str> = aircraft.iter().map(|spec| spec.name.as_str()).collect();
    let label_for = move |x: &f64| {
        let index = x.round();
        if (x - index).abs() < 1e-6 && index >= 0.0 {
            model_names
                .get(index as usize)
                .map(|name| name.to_string())
                .unwrap_or_default()
        } else {
            String::new()
        }
    };

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_labels(aircraft.len())
        .x_label_formatter(&label_for)
        .y_desc("Speed (Mach)")
        .draw()?;

    chart
        .draw_series(cruise.iter().enumerate().map(|(index, &mach)| {
            let center = index as f64;
            Rectangle::new([(center - 0.2, 0.0), (center, mach)], TAB_BLUE.filled())
        }))?
        .label("Cruise mach")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], TAB_BLUE.filled()));

    chart
        .draw_series(min_drag.iter().enumerate().map(|(index, &mach)| {
            let center = index as f64;
            Rectangle::new([(center, 0.0), (center + 0.2, mach)], TAB_ORANGE.filled())
        }))?
        .label("Min. drag speed")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], TAB_ORANGE.filled()));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .border_style(BLACK.mix(0.4))
        .background_style(WHITE.mix(0.8))
        .draw()?;

    root.present()?;
    Ok(())
}
