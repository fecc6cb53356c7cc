use std::f64::consts::PI;

use num_traits::Pow;
use thiserror::Error;

use super::atmosphere::STANDARD_GRAVITY_M_S2;

/// Oswald-type span efficiency, constant approximation.
pub const OSWALD_EFFICIENCY: f64 = 0.8;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum AeroError {
    #[error("Airspeed {airspeed_m_s} m/s must be positive")]
    NonPositiveAirspeed { airspeed_m_s: f64 },
}

/// Lift, drag and thrust figures for one flight condition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerformancePoint {
    pub lift_coeff: f64,
    pub induced_drag_coeff: f64,
    pub total_drag_coeff: f64,
    pub thrust_n: f64,
}

#[inline]
pub fn wing_load(weight_n: f64, wing_area_m2: f64) -> f64 {
    weight_n / wing_area_m2
}

#[inline]
pub fn wing_aspect_ratio(wing_area_m2: f64, wing_span_m: f64) -> f64 {
    wing_span_m.pow(2.0) / wing_area_m2
}

/// Lift coefficient in steady level flight (lift balances weight).
pub fn lift_coefficient(
    mass_kg: f64,
    rho_kg_m3: f64,
    airspeed_m_s: f64,
    wing_area_m2: f64,
) -> Result<f64, AeroError> {
    if airspeed_m_s <= 0.0 {
        return Err(AeroError::NonPositiveAirspeed {
            airspeed_m_s,
        });
    }

    Ok(2.0 * mass_kg * STANDARD_GRAVITY_M_S2
        / (rho_kg_m3 * wing_area_m2 * airspeed_m_s.pow(2.0)))
}

#[inline]
pub fn induced_drag_coefficient(lift_coeff: f64, aspect_ratio: f64) -> f64 {
    lift_coeff.pow(2.0) / (PI * aspect_ratio * OSWALD_EFFICIENCY)
}

#[inline]
pub fn total_drag_coefficient(induced_drag_coeff: f64, parasite_drag_coeff: f64) -> f64 {
    induced_drag_coeff + parasite_drag_coeff
}

/// Thrust balancing total drag in steady level flight.
#[inline]
pub fn thrust_required(rho_kg_m3: f64, airspeed_m_s: f64, wing_area_m2: f64, drag_coeff: f64) -> f64 {
    0.5 * rho_kg_m3 * airspeed_m_s.pow(2.0) * wing_area_m2 * drag_coeff
}

pub fn performance_point(
    mass_kg: f64,
    rho_kg_m3: f64,
    airspeed_m_s: f64,
    wing_area_m2: f64,
    parasite_drag_coeff: f64,
    aspect_ratio: f64,
) -> Result<PerformancePoint, AeroError> {
    let lift_coeff = lift_coefficient(mass_kg, rho_kg_m3, airspeed_m_s, wing_area_m2)?;
    let induced_drag_coeff = induced_drag_coefficient(lift_coeff, aspect_ratio);
    let total_drag_coeff = total_drag_coefficient(induced_drag_coeff, parasite_drag_coeff);
    let thrust_n = thrust_required(rho_kg_m3, airspeed_m_s, wing_area_m2, total_drag_coeff);

    Ok(PerformancePoint {
        lift_coeff,
        induced_drag_coeff,
        total_drag_coeff,
        thrust_n,
    })
}
