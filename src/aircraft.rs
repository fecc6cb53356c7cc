use std::{collections::BTreeSet, fs::File, io::Read, path::Path};

use serde::Deserialize;
use thiserror::Error;

use crate::perf::atmosphere::STANDARD_GRAVITY_M_S2;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Cannot read aircraft table")]
    Io(#[from] std::io::Error),

    #[error("Error deserializing aircraft table")]
    Deserialize(#[from] csv::Error),

    #[error("Aircraft table contains no rows")]
    Empty,

    #[error("Aircraft table row {row} has an empty model name")]
    UnnamedModel { row: usize },

    #[error("Duplicate aircraft model '{model}'")]
    DuplicateModel { model: String },

    #[error("Aircraft '{model}': '{column}' must be positive (got {value})")]
    NonPositive {
        model: String,
        column: String,
        value: f64,
    },

    #[error("Aircraft '{model}': '{column}' must not be negative (got {value})")]
    NegativeValue {
        model: String,
        column: String,
        value: f64,
    },
}

/// One aircraft model row. Field aliases match the table headers.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AircraftSpec {
    #[serde(alias = "Model")]
    pub name: String,
    #[serde(alias = "Wing area")]
    pub wing_area_m2: f64,
    #[serde(alias = "Wing span")]
    pub wing_span_m: f64,
    #[serde(alias = "mass")]
    pub mass_kg: f64,
    #[serde(alias = "C_dp")]
    pub parasite_drag_coeff: f64,
    #[serde(alias = "Mach cruise")]
    pub cruise_mach: f64,
}

impl AircraftSpec {
    pub fn weight_n(&self) -> f64 {
        self.mass_kg * STANDARD_GRAVITY_M_S2
    }
}

/// Loads and validates the aircraft table, preserving file row order.
pub fn load_aircraft_table(path: &Path) -> Result<Vec<AircraftSpec>, Error> {
    parse_aircraft_table(File::open(path)?)
}

pub fn parse_aircraft_table(reader: impl Read) -> Result<Vec<AircraftSpec>, Error> {
    let mut csv_reader = csv::Reader::from_reader(reader);

    let mut aircraft = Vec::new();
    for row in csv_reader.deserialize() {
        let spec: AircraftSpec = row?;
        aircraft.push(spec);
    }

    validate(&aircraft)?;

    Ok(aircraft)
}

fn validate(aircraft: &[AircraftSpec]) -> Result<(), Error> {
    if aircraft.is_empty() {
        return Err(Error::Empty);
    }

    let mut seen = BTreeSet::new();

    for (index, spec) in aircraft.iter().enumerate() {
        if spec.name.trim().is_empty() {
            return Err(Error::UnnamedModel { row: index + 1 });
        }

        if !seen.insert(spec.name.as_str()) {
            return Err(Error::DuplicateModel {
                model: spec.name.clone(),
            });
        }

        let positive = [
            ("Wing area", spec.wing_area_m2),
            ("Wing span", spec.wing_span_m),
            ("mass", spec.mass_kg),
            ("Mach cruise", spec.cruise_mach),
        ];
        for (column, value) in positive {
            if !(value > 0.0) {
                return Err(Error::NonPositive {
                    model: spec.name.clone(),
                    column: column.to_string(),
                    value,
                });
            }
        }

        if !(spec.parasite_drag_coeff >= 0.0) {
            return Err(Error::NegativeValue {
                model: spec.name.clone(),
                column: "C_dp".to_string(),
                value: spec.parasite_drag_coeff,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const TABLE: &str = "\
Model,Wing area,Wing span,mass,C_dp,Mach cruise
Airbus A320,122.6,35.8,73500,0.023,0.78
Boeing 747-400,541.2,64.4,396890,0.022,0.85
";

    #[test]
    fn test_parse_table() {
        let aircraft = parse_aircraft_table(TABLE.as_bytes()).unwrap();

        assert_eq!(
            aircraft,
            vec![
                AircraftSpec {
                    name: "Airbus A320".to_string(),
                    wing_area_m2: 122.6,
                    wing_span_m: 35.8,
                    mass_kg: 73500.0,
                    parasite_drag_coeff: 0.023,
                    cruise_mach: 0.78,
                },
                AircraftSpec {
                    name: "Boeing 747-400".to_string(),
                    wing_area_m2: 541.2,
                    wing_span_m: 64.4,
                    mass_kg: 396890.0,
                    parasite_drag_coeff: 0.022,
                    cruise_mach: 0.85,
                },
            ]
        );
    }

    #[test]
    fn test_weight() {
        let aircraft = parse_aircraft_table(TABLE.as_bytes()).unwrap();
        approx::assert_relative_eq!(aircraft[0].weight_n(), 73500.0 * 9.81);
    }

    #[test]
    fn test_empty_table() {
        let header_only = "Model,Wing area,Wing span,mass,C_dp,Mach cruise\n";
        assert!(matches!(
            parse_aircraft_table(header_only.as_bytes()),
            Err(Error::Empty)
        ));
    }

    #[test]
    fn test_non_numeric_field() {
        let table = "\
Model,Wing area,Wing span,mass,C_dp,Mach cruise
Airbus A320,large,35.8,73500,0.023,0.78
";
        assert!(matches!(
            parse_aircraft_table(table.as_bytes()),
            Err(Error::Deserialize(_))
        ));
    }

    #[test]
    fn test_missing_column() {
        let table = "\
Model,Wing area,Wing span,mass,C_dp
Airbus A320,122.6,35.8,73500,0.023
";
        assert!(matches!(
            parse_aircraft_table(table.as_bytes()),
            Err(Error::Deserialize(_))
        ));
    }

    #[test]
    fn test_non_positive_named() {
        let table = "\
Model,Wing area,Wing span,mass,C_dp,Mach cruise
Airbus A320,-122.6,35.8,73500,0.023,0.78
";
        let err = parse_aircraft_table(table.as_bytes()).unwrap_err();
        match err {
            Error::NonPositive {
                model,
                column,
                value,
            } => {
                assert_eq!(model, "Airbus A320");
                assert_eq!(column, "Wing area");
                assert_eq!(value, -122.6);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_negative_parasite_drag() {
        let table = "\
Model,Wing area,Wing span,mass,C_dp,Mach cruise
Airbus A320,122.6,35.8,73500,-0.023,0.78
";
        let err = parse_aircraft_table(table.as_bytes()).unwrap_err();
        match err {
            Error::NegativeValue { model, column, .. } => {
                assert_eq!(model, "Airbus A320");
                assert_eq!(column, "C_dp");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_zero_parasite_drag_allowed() {
        let table = "\
Model,Wing area,Wing span,mass,C_dp,Mach cruise
Glider,122.6,35.8,73500,0.0,0.78
";
        assert!(parse_aircraft_table(table.as_bytes()).is_ok());
    }

    #[test]
    fn test_duplicate_model() {
        let table = "\
Model,Wing area,Wing span,mass,C_dp,Mach cruise
Airbus A320,122.6,35.8,73500,0.023,0.78
Airbus A320,122.6,35.8,73500,0.023,0.78
";
        assert!(matches!(
            parse_aircraft_table(table.as_bytes()),
            Err(Error::DuplicateModel { model }) if model == "Airbus A320"
        ));
    }

    #[test]
    fn test_nan_mass_rejected() {
        let table = "\
Model,Wing area,Wing span,mass,C_dp,Mach cruise
Airbus A320,122.6,35.8,NaN,0.023,0.78
";
        assert!(matches!(
            parse_aircraft_table(table.as_bytes()),
            Err(Error::NonPositive { column, .. }) if column == "mass"
        ));
    }
}
