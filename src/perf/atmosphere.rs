use thiserror::Error;

/// Standard gravitational acceleration, m/s^2.
pub const STANDARD_GRAVITY_M_S2: f64 = 9.81;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum AtmosphereError {
    #[error("Altitude {altitude_m} m is outside the model domain [{min_m}, {max_m}] m")]
    AltitudeOutOfRange {
        altitude_m: f64,
        min_m: f64,
        max_m: f64,
    },
}

/// Atmospheric layer an altitude falls into. The tropopause itself belongs
/// to the troposphere branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Troposphere,
    LowerStratosphere,
}

pub trait Atmosphere {
    fn temperature_k(&self, alt_m: f64) -> Result<f64, AtmosphereError>;
    fn density_kg_m3(&self, alt_m: f64) -> Result<f64, AtmosphereError>;
    fn speed_of_sound_m_s(&self, alt_m: f64) -> Result<f64, AtmosphereError>;
}

pub fn mach_number(v_air_m_s: f64, c_m_s: f64) -> f64 {
    v_air_m_s / c_m_s
}

/// Two-layer standard atmosphere: linear temperature lapse up to the
/// tropopause, isothermal above it. Valid up to `max_alt_m`; altitudes
/// outside [0, max_alt_m] are rejected rather than extrapolated.
#[derive(Debug, Clone)]
pub struct LayeredAtmosphere {
    density_0: f64,
    density_tropopause: f64,
    temperature_0: f64,
    lapse_rate: f64,
    tropopause_alt_m: f64,
    max_alt_m: f64,
    g_0: f64,
    specific_gas_constant: f64,
    gamma: f64,
}

impl Default for LayeredAtmosphere {
    fn default() -> Self {
        LayeredAtmosphere {
            density_0: 1.225,
            density_tropopause: 0.364,
            temperature_0: 288.15,
            lapse_rate: 0.0065,
            tropopause_alt_m: 11000.0,
            max_alt_m: 20000.0,
            g_0: STANDARD_GRAVITY_M_S2,
            specific_gas_constant: 287.05,
            gamma: 1.4,
        }
    }
}

impl LayeredAtmosphere {
    pub fn tropopause_temperature_k(&self) -> f64 {
        self.temperature_0 - self.lapse_rate * self.tropopause_alt_m
    }

    /// Resolves the layer for an altitude with a single boundary check.
    pub fn layer(&self, alt_m: f64) -> Result<Layer, AtmosphereError> {
        if !(0.0..=self.max_alt_m).contains(&alt_m) {
            return Err(AtmosphereError::AltitudeOutOfRange {
                altitude_m: alt_m,
                min_m: 0.0,
                max_m: self.max_alt_m,
            });
        }

        if alt_m <= self.tropopause_alt_m {
            Ok(Layer::Troposphere)
        } else {
            Ok(Layer::LowerStratosphere)
        }
    }
}

impl Atmosphere for LayeredAtmosphere {
    fn temperature_k(&self, alt_m: f64) -> Result<f64, AtmosphereError> {
        Ok(match self.layer(alt_m)? {
            Layer::Troposphere => self.temperature_0 - self.lapse_rate * alt_m,
            Layer::LowerStratosphere => self.tropopause_temperature_k(),
        })
    }

    fn density_kg_m3(&self, alt_m: f64) -> Result<f64, AtmosphereError> {
        Ok(match self.layer(alt_m)? {
            Layer::Troposphere => {
                let exponent = self.g_0 / (self.specific_gas_constant * self.lapse_rate) - 1.0;
                self.density_0 * (1.0 - self.lapse_rate * alt_m / self.temperature_0).powf(exponent)
            }
            Layer::LowerStratosphere => {
                let t = self.tropopause_temperature_k();
                let scale = -self.g_0 * (alt_m - self.tropopause_alt_m)
                    / (self.specific_gas_constant * t);
                self.density_tropopause * f64::exp(scale)
            }
        })
    }

    fn speed_of_sound_m_s(&self, alt_m: f64) -> Result<f64, AtmosphereError> {
        let t = self.temperature_k(alt_m)?;
        Ok(f64::sqrt(self.gamma * self.specific_gas_constant * t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_layer_resolution() {
        let atmo = LayeredAtmosphere::default();

        assert_eq!(atmo.layer(0.0), Ok(Layer::Troposphere));
        assert_eq!(atmo.layer(5000.0), Ok(Layer::Troposphere));
        assert_eq!(atmo.layer(11000.0), Ok(Layer::Troposphere));
        assert_eq!(atmo.layer(11000.1), Ok(Layer::LowerStratosphere));
        assert_eq!(atmo.layer(20000.0), Ok(Layer::LowerStratosphere));
    }

    #[test]
    fn test_altitude_domain() {
        let atmo = LayeredAtmosphere::default();

        for alt in [-1.0, 20000.1, 25000.0] {
            assert_eq!(
                atmo.layer(alt),
                Err(AtmosphereError::AltitudeOutOfRange {
                    altitude_m: alt,
                    min_m: 0.0,
                    max_m: 20000.0,
                })
            );
            assert!(atmo.density_kg_m3(alt).is_err());
            assert!(atmo.speed_of_sound_m_s(alt).is_err());
        }

        assert!(atmo.layer(f64::NAN).is_err());
        assert!(atmo.density_kg_m3(f64::NAN).is_err());
    }

    #[test]
    fn test_temperature() {
        let atmo = LayeredAtmosphere::default();

        assert_relative_eq!(atmo.temperature_k(0.0).unwrap(), 288.15);
        assert_relative_eq!(atmo.temperature_k(5000.0).unwrap(), 255.65);
        assert_relative_eq!(atmo.temperature_k(11000.0).unwrap(), 216.65);
        assert_relative_eq!(atmo.temperature_k(18000.0).unwrap(), 216.65);
    }

    #[test]
    fn test_density() {
        let atmo = LayeredAtmosphere::default();

        assert_relative_eq!(atmo.density_kg_m3(0.0).unwrap(), 1.225, epsilon = 1e-3);
        assert_relative_eq!(atmo.density_kg_m3(5000.0).unwrap(), 0.7359, epsilon = 1e-3);
        assert_relative_eq!(atmo.density_kg_m3(15000.0).unwrap(), 0.1937, epsilon = 1e-3);
    }

    #[test]
    fn test_density_continuity_at_tropopause() {
        let atmo = LayeredAtmosphere::default();

        // Both branch formulas agree closely at the boundary.
        assert_relative_eq!(atmo.density_kg_m3(11000.0).unwrap(), 0.364, epsilon = 1e-2);
        assert_relative_eq!(
            atmo.density_kg_m3(11000.0).unwrap(),
            atmo.density_kg_m3(11000.1).unwrap(),
            epsilon = 1e-3
        );
    }

    #[test]
    fn test_boundary_uses_troposphere_branch() {
        let atmo = LayeredAtmosphere::default();

        // The troposphere power law at 11000 m, not the stratosphere base
        // constant 0.364.
        assert_relative_eq!(
            atmo.density_kg_m3(11000.0).unwrap(),
            0.363726,
            epsilon = 1e-4
        );
    }

    #[test]
    fn test_speed_of_sound() {
        let atmo = LayeredAtmosphere::default();

        assert_relative_eq!(
            atmo.speed_of_sound_m_s(0.0).unwrap(),
            f64::sqrt(1.4 * 287.05 * 288.15)
        );
        assert_relative_eq!(
            atmo.speed_of_sound_m_s(0.0).unwrap(),
            340.292,
            epsilon = 1e-3
        );
        assert_relative_eq!(
            atmo.speed_of_sound_m_s(11000.0).unwrap(),
            295.068,
            epsilon = 1e-3
        );
        // Isothermal above the tropopause.
        assert_relative_eq!(
            atmo.speed_of_sound_m_s(15000.0).unwrap(),
            atmo.speed_of_sound_m_s(11000.0).unwrap()
        );
    }

    #[test]
    fn test_mach_number() {
        assert_relative_eq!(mach_number(295.068, 295.068), 1.0);
        assert_relative_eq!(mach_number(200.0, 340.292), 0.5877, epsilon = 1e-4);
    }
}
