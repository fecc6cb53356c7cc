use std::collections::BTreeMap;

use thiserror::Error;

use crate::{
    aircraft::AircraftSpec,
    math,
    perf::{
        aero,
        atmosphere::{mach_number, Atmosphere, AtmosphereError},
    },
};

use super::aero::AeroError;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum Error {
    #[error("Atmosphere model rejected the flight condition")]
    Atmosphere(#[from] AtmosphereError),

    #[error("Aerodynamic model rejected the flight condition")]
    Aero(#[from] AeroError),

    #[error("Velocity sweep is empty")]
    EmptySweep,
}

/// The (velocity x altitude) grid one evaluation pass covers.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationGrid {
    pub velocities_m_s: Vec<f64>,
    pub altitudes_m: Vec<u32>,
}

impl Default for EvaluationGrid {
    fn default() -> Self {
        EvaluationGrid {
            velocities_m_s: math::linspace(50.0, 800.0, 750),
            altitudes_m: vec![5000, 8000, 11000, 15000, 18000],
        }
    }
}

/// Key of one thrust-required series.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SeriesKey {
    pub model: String,
    pub altitude_m: u32,
}

impl SeriesKey {
    pub fn new(model: &str, altitude_m: u32) -> Self {
        SeriesKey {
            model: model.to_string(),
            altitude_m,
        }
    }
}

/// Thrust required at each velocity sample, ascending velocity order.
#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceSeries {
    pub thrust_n: Vec<f64>,
}

impl PerformanceSeries {
    /// Discrete minimum over the sampled series, first occurrence on ties.
    pub fn min_drag_point(&self, velocities_m_s: &[f64]) -> Option<MinimumDragPoint> {
        let sample_index = math::argmin(&self.thrust_n)?;

        Some(MinimumDragPoint {
            sample_index,
            airspeed_m_s: velocities_m_s[sample_index],
            thrust_n: self.thrust_n[sample_index],
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinimumDragPoint {
    pub sample_index: usize,
    pub airspeed_m_s: f64,
    pub thrust_n: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceResults {
    /// Velocity sweep shared by every series.
    pub velocities_m_s: Vec<f64>,
    pub series: BTreeMap<SeriesKey, PerformanceSeries>,
    pub min_drag: BTreeMap<SeriesKey, MinimumDragPoint>,
    /// Wing load per model, N/m^2.
    pub wing_loads_n_m2: BTreeMap<String, f64>,
    /// Mach sweep per altitude, shared across models.
    pub mach_sweeps: BTreeMap<u32, Vec<f64>>,
    /// Speed of sound per altitude, m/s.
    pub speeds_of_sound_m_s: BTreeMap<u32, f64>,
}

impl PerformanceResults {
    /// Minimum-drag points of one model in ascending altitude order.
    pub fn min_drag_profile(&self, model: &str) -> Vec<(u32, MinimumDragPoint)> {
        let from = SeriesKey::new(model, 0);
        let to = SeriesKey::new(model, u32::MAX);

        self.min_drag
            .range(from..=to)
            .map(|(key, point)| (key.altitude_m, *point))
            .collect()
    }

    pub fn speed_of_sound_at(&self, altitude_m: u32) -> Option<f64> {
        self.speeds_of_sound_m_s.get(&altitude_m).copied()
    }
}

/// Evaluates thrust-required curves for every (model, altitude) pair of the
/// grid. Pure function of its inputs; evaluating twice yields identical
/// results.
pub fn evaluate(
    aircraft: &[AircraftSpec],
    atmosphere: &impl Atmosphere,
    grid: &EvaluationGrid,
) -> Result<PerformanceResults, Error> {
    let mut series = BTreeMap::new();
    let mut min_drag = BTreeMap::new();
    let mut wing_loads_n_m2 = BTreeMap::new();

    for spec in aircraft {
        let aspect_ratio = aero::wing_aspect_ratio(spec.wing_area_m2, spec.wing_span_m);

        wing_loads_n_m2.insert(
            spec.name.clone(),
            aero::wing_load(spec.weight_n(), spec.wing_area_m2),
        );

        for &altitude_m in &grid.altitudes_m {
            let rho = atmosphere.density_kg_m3(f64::from(altitude_m))?;

            let mut thrust_n = Vec::with_capacity(grid.velocities_m_s.len());
            for &v in &grid.velocities_m_s {
                let point = aero::performance_point(
                    spec.mass_kg,
                    rho,
                    v,
                    spec.wing_area_m2,
                    spec.parasite_drag_coeff,
                    aspect_ratio,
                )?;
                thrust_n.push(point.thrust_n);
            }

            let key = SeriesKey::new(&spec.name, altitude_m);
            let altitude_series = PerformanceSeries { thrust_n };
            let point = altitude_series
                .min_drag_point(&grid.velocities_m_s)
                .ok_or(Error::EmptySweep)?;

            min_drag.insert(key.clone(), point);
            series.insert(key, altitude_series);
        }
    }

    let mut mach_sweeps = BTreeMap::new();
    let mut speeds_of_sound_m_s = BTreeMap::new();
    for &altitude_m in &grid.altitudes_m {
        let c = atmosphere.speed_of_sound_m_s(f64::from(altitude_m))?;
        let machs = grid
            .velocities_m_s
            .iter()
            .map(|&v| mach_number(v, c))
            .collect();

        speeds_of_sound_m_s.insert(altitude_m, c);
        mach_sweeps.insert(altitude_m, machs);
    }

    Ok(PerformanceResults {
        velocities_m_s: grid.velocities_m_s.clone(),
        series,
        min_drag,
        wing_loads_n_m2,
        mach_sweeps,
        speeds_of_sound_m_s,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::perf::atmosphere::LayeredAtmosphere;
    use approx::assert_relative_eq;

    fn test_aircraft() -> Vec<AircraftSpec> {
        vec![
            AircraftSpec {
                name: "Alpha".to_string(),
                wing_area_m2: 100.0,
                wing_span_m: 30.0,
                mass_kg: 50000.0,
                parasite_drag_coeff: 0.02,
                cruise_mach: 0.8,
            },
            AircraftSpec {
                name: "Bravo".to_string(),
                wing_area_m2: 120.0,
                wing_span_m: 34.0,
                mass_kg: 65000.0,
                parasite_drag_coeff: 0.025,
                cruise_mach: 0.78,
            },
        ]
    }

    #[test]
    fn test_grid_defaults() {
        let grid = EvaluationGrid::default();

        assert_eq!(grid.velocities_m_s.len(), 750);
        assert_eq!(grid.velocities_m_s[0], 50.0);
        assert_eq!(grid.velocities_m_s[749], 800.0);
        assert_eq!(grid.altitudes_m, vec![5000, 8000, 11000, 15000, 18000]);
    }

    #[test]
    fn test_series_cover_grid() {
        let aircraft = test_aircraft();
        let atmo = LayeredAtmosphere::default();
        let grid = EvaluationGrid::default();

        let results = evaluate(&aircraft, &atmo, &grid).unwrap();

        assert_eq!(results.series.len(), aircraft.len() * grid.altitudes_m.len());
        assert_eq!(results.min_drag.len(), results.series.len());

        for spec in &aircraft {
            for &altitude_m in &grid.altitudes_m {
                let key = SeriesKey::new(&spec.name, altitude_m);
                let series = &results.series[&key];
                assert_eq!(series.thrust_n.len(), grid.velocities_m_s.len());
            }
        }
    }

    #[test]
    fn test_min_drag_is_argmin() {
        let aircraft = test_aircraft();
        let atmo = LayeredAtmosphere::default();
        let grid = EvaluationGrid::default();

        let results = evaluate(&aircraft, &atmo, &grid).unwrap();

        for (key, series) in &results.series {
            let point = &results.min_drag[key];

            let mut expected = 0;
            for (index, &thrust) in series.thrust_n.iter().enumerate() {
                if thrust < series.thrust_n[expected] {
                    expected = index;
                }
            }

            assert_eq!(point.sample_index, expected);
            assert_eq!(point.airspeed_m_s, grid.velocities_m_s[expected]);
            assert_eq!(point.thrust_n, series.thrust_n[expected]);

            // Realistic drag trade-off has an interior minimum.
            assert!(point.sample_index > 0);
            assert!(point.sample_index < series.thrust_n.len() - 1);
        }
    }

    #[test]
    fn test_wing_loads() {
        let aircraft = test_aircraft();
        let atmo = LayeredAtmosphere::default();

        let results = evaluate(&aircraft, &atmo, &EvaluationGrid::default()).unwrap();

        assert_relative_eq!(results.wing_loads_n_m2["Alpha"], 50000.0 * 9.81 / 100.0);
        assert_relative_eq!(results.wing_loads_n_m2["Bravo"], 65000.0 * 9.81 / 120.0);
    }

    #[test]
    fn test_mach_sweep_shared_per_altitude() {
        let aircraft = test_aircraft();
        let atmo = LayeredAtmosphere::default();
        let grid = EvaluationGrid::default();

        let results = evaluate(&aircraft, &atmo, &grid).unwrap();

        for &altitude_m in &grid.altitudes_m {
            let c = atmo.speed_of_sound_m_s(f64::from(altitude_m)).unwrap();
            let machs = &results.mach_sweeps[&altitude_m];

            assert_eq!(machs.len(), grid.velocities_m_s.len());
            assert_relative_eq!(machs[0], grid.velocities_m_s[0] / c);
            assert_relative_eq!(machs[749], grid.velocities_m_s[749] / c);
            assert_relative_eq!(results.speed_of_sound_at(altitude_m).unwrap(), c);
        }
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let aircraft = test_aircraft();
        let atmo = LayeredAtmosphere::default();
        let grid = EvaluationGrid::default();

        let first = evaluate(&aircraft, &atmo, &grid).unwrap();
        let second = evaluate(&aircraft, &atmo, &grid).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_min_drag_profile_ordering() {
        let aircraft = test_aircraft();
        let atmo = LayeredAtmosphere::default();
        let grid = EvaluationGrid::default();

        let results = evaluate(&aircraft, &atmo, &grid).unwrap();
        let profile = results.min_drag_profile("Alpha");

        let altitudes: Vec<u32> = profile.iter().map(|(h, _)| *h).collect();
        assert_eq!(altitudes, vec![5000, 8000, 11000, 15000, 18000]);

        // Thinner air pushes the minimum-drag speed up.
        assert!(profile[4].1.airspeed_m_s > profile[0].1.airspeed_m_s);
    }

    #[test]
    fn test_out_of_domain_altitude_fails() {
        let aircraft = test_aircraft();
        let atmo = LayeredAtmosphere::default();
        let grid = EvaluationGrid {
            velocities_m_s: math::linspace(50.0, 800.0, 10),
            altitudes_m: vec![25000],
        };

        assert!(matches!(
            evaluate(&aircraft, &atmo, &grid),
            Err(Error::Atmosphere(_))
        ));
    }

    #[test]
    fn test_empty_sweep_fails() {
        let aircraft = test_aircraft();
        let atmo = LayeredAtmosphere::default();
        let grid = EvaluationGrid {
            velocities_m_s: Vec::new(),
            altitudes_m: vec![11000],
        };

        assert_eq!(evaluate(&aircraft, &atmo, &grid), Err(Error::EmptySweep));
    }
}
