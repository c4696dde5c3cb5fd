//! Error metrics for validation against analytic solutions.

/// Statistical comparison between a model field and a reference field.
///
/// All metrics take the first series as the model and the second as the
/// reference.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ErrorMetrics {
    /// Root mean square error: sqrt(mean((model - ref)²))
    pub rms: f64,
    /// RMS of the reference: sqrt(mean(ref²))
    pub reference_rms: f64,
    /// Bias (mean error): mean(model - ref)
    pub bias: f64,
    /// Maximum absolute error
    pub max_error: f64,
    /// Number of compared values
    pub n_points: usize,
}

impl ErrorMetrics {
    /// Compare `model` against `reference`.
    ///
    /// # Panics
    ///
    /// Panics if the series have different lengths or are empty.
    pub fn compute(model: &[f64], reference: &[f64]) -> Self {
        assert_eq!(
            model.len(),
            reference.len(),
            "Model and reference must have same length"
        );
        assert!(!model.is_empty(), "Series must not be empty");

        let n = model.len() as f64;
        let (mut sq, mut sq_ref, mut sum, mut max_error) = (0.0, 0.0, 0.0, 0.0_f64);
        for (&m, &r) in model.iter().zip(reference) {
            let e = m - r;
            sq += e * e;
            sq_ref += r * r;
            sum += e;
            max_error = max_error.max(e.abs());
        }

        Self {
            rms: (sq / n).sqrt(),
            reference_rms: (sq_ref / n).sqrt(),
            bias: sum / n,
            max_error,
            n_points: model.len(),
        }
    }

    /// RMS error relative to the reference RMS; infinite for a zero
    /// reference with nonzero error.
    pub fn relative_rms(&self) -> f64 {
        if self.reference_rms > 0.0 {
            self.rms / self.reference_rms
        } else if self.rms == 0.0 {
            0.0
        } else {
            f64::INFINITY
        }
    }
}

/// Root mean square difference of two series.
pub fn rms_error(model: &[f64], reference: &[f64]) -> f64 {
    ErrorMetrics::compute(model, reference).rms
}
