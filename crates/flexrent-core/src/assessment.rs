use serde::Serialize;

/// Income above which an applicant counts as creditworthy.
pub const CREDITWORTHY_THRESHOLD: f64 = 200_000.0;

/// Verdict for one analyzed statement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Assessment {
    pub total_income: f64,
    pub threshold: f64,
    pub is_creditworthy: bool,
}

impl Assessment {
    /// The comparison is strict: an income equal to `threshold` is not enough.
    pub fn new(total_income: f64, threshold: f64) -> Self {
        Self {
            total_income,
            threshold,
            is_creditworthy: total_income > threshold,
        }
    }

    /// Assess against [`CREDITWORTHY_THRESHOLD`].
    pub fn with_default_threshold(total_income: f64) -> Self {
        Self::new(total_income, CREDITWORTHY_THRESHOLD)
    }
}
