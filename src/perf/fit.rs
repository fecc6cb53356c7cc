use levenberg_marquardt::{LeastSquaresProblem, LevenbergMarquardt};
use nalgebra::{storage::Owned, Const, DVector, Dyn, OMatrix, Vector5, U5};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum FitError {
    #[error("Curve fit for '{model}' has no data points")]
    EmptySeries { model: String },

    #[error("Curve fit for '{model}' did not converge ({reason})")]
    DidNotConverge { model: String, reason: String },
}

/// Residuals above this fraction of the data magnitude mean the solver
/// stalled on a flat local minimum rather than fitting the trend.
const RESIDUAL_RMS_TOLERANCE: f64 = 0.02;

/// Stand-in for residual or Jacobian entries that overflow; keeps the
/// solver stepping instead of aborting on a non-finite value.
const OVERFLOW_SENTINEL: f64 = 1e100;

fn clamp_finite(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else if value.is_nan() {
        OVERFLOW_SENTINEL
    } else {
        OVERFLOW_SENTINEL.copysign(value)
    }
}

/// Parameters of `f(x) = amplitude * base^((x - shift) * rate) + offset`.
///
/// The model is overparameterized on purpose (it reduces to
/// `B * k^x + C`); keeping all five parameters preserves the shape of the
/// fit this pipeline has always produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitParameters {
    pub amplitude: f64,
    pub base: f64,
    pub offset: f64,
    pub shift: f64,
    pub rate: f64,
}

pub const INITIAL_GUESS: FitParameters = FitParameters {
    amplitude: 1.0,
    base: 5.0,
    offset: 500.0,
    shift: 0.0,
    rate: 0.5,
};

impl FitParameters {
    pub fn evaluate(&self, x: f64) -> f64 {
        self.amplitude * self.base.powf((x - self.shift) * self.rate) + self.offset
    }

    /// Solver-space vector; the base is optimized as its logarithm so it
    /// stays positive through every step.
    fn internal(&self) -> Vector5<f64> {
        Vector5::new(
            self.amplitude,
            self.base.ln(),
            self.offset,
            self.shift,
            self.rate,
        )
    }

    fn from_internal(p: &Vector5<f64>) -> Self {
        FitParameters {
            amplitude: p[0],
            base: p[1].exp(),
            offset: p[2],
            shift: p[3],
            rate: p[4],
        }
    }
}

struct CurveFitProblem<'a> {
    points: &'a [(f64, f64)],
    /// (amplitude, ln base, offset, shift, rate).
    p: Vector5<f64>,
}

impl CurveFitProblem<'_> {
    fn model(&self, x: f64) -> f64 {
        let (a, ln_base, c, m, rate) = (self.p[0], self.p[1], self.p[2], self.p[3], self.p[4]);
        a * f64::exp(ln_base * (x - m) * rate) + c
    }
}

impl LeastSquaresProblem<f64, Dyn, U5> for CurveFitProblem<'_> {
    type ResidualStorage = Owned<f64, Dyn>;
    type JacobianStorage = Owned<f64, Dyn, U5>;
    type ParameterStorage = Owned<f64, U5>;

    fn set_params(&mut self, p: &Vector5<f64>) {
        self.p.copy_from(p);
    }

    fn params(&self) -> Vector5<f64> {
        self.p
    }

    fn residuals(&self) -> Option<DVector<f64>> {
        Some(DVector::from_iterator(
            self.points.len(),
            self.points
                .iter()
                .map(|&(x, y)| clamp_finite(self.model(x) - y)),
        ))
    }

    fn jacobian(&self) -> Option<OMatrix<f64, Dyn, U5>> {
        let (a, ln_base, _, m, rate) = (self.p[0], self.p[1], self.p[2], self.p[3], self.p[4]);

        let mut jacobian =
            OMatrix::<f64, Dyn, U5>::zeros_generic(Dyn(self.points.len()), Const::<5>);
        for (row, &(x, _)) in self.points.iter().enumerate() {
            let exponent = ln_base * (x - m) * rate;
            let power = f64::exp(exponent);

            jacobian[(row, 0)] = clamp_finite(power);
            jacobian[(row, 1)] = clamp_finite(a * (x - m) * rate * power);
            jacobian[(row, 2)] = 1.0;
            jacobian[(row, 3)] = clamp_finite(-a * ln_base * rate * power);
            jacobian[(row, 4)] = clamp_finite(a * ln_base * (x - m) * power);
        }

        Some(jacobian)
    }
}

/// Least-squares fit of the minimum-drag-speed curve for one model over
/// (altitude in km, speed in km/h) points.
pub fn fit_min_drag_speed(
    model: &str,
    points: &[(f64, f64)],
) -> Result<FitParameters, FitError> {
    if points.is_empty() {
        return Err(FitError::EmptySeries {
            model: model.to_string(),
        });
    }

    let problem = CurveFitProblem {
        points,
        p: INITIAL_GUESS.internal(),
    };

    let (solved, report) = LevenbergMarquardt::new()
        .with_patience(1000)
        .minimize(problem);

    if !report.termination.was_successful() {
        return Err(FitError::DidNotConverge {
            model: model.to_string(),
            reason: format!("{:?}", report.termination),
        });
    }

    let params = FitParameters::from_internal(&solved.p);

    // The solver can stop on a flat local minimum and still report success;
    // a fit that far from the data must not reach the charts.
    let scale = points
        .iter()
        .map(|&(_, y)| y.abs())
        .fold(1.0f64, f64::max);
    let rms = (points
        .iter()
        .map(|&(x, y)| (params.evaluate(x) - y).powi(2))
        .sum::<f64>()
        / points.len() as f64)
        .sqrt();

    if !(rms <= RESIDUAL_RMS_TOLERANCE * scale) {
        return Err(FitError::DidNotConverge {
            model: model.to_string(),
            reason: format!("residual rms {rms:.3} against data scale {scale:.3}"),
        });
    }

    Ok(params)
}
