use super::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Score(f64);

impl Score {
    /// Score given to every spreadsheet-imported question.
    pub const IMPORT_DEFAULT: Score = Score(1.0);

    pub fn new(value: f64) -> Result<Self, DomainError> {
        if value.is_finite() && value > 0.0 {
            Ok(Self(value))
        } else {
            Err(DomainError::InvalidScore(value))
        }
    }

    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let value = raw
            .trim()
            .parse::<f64>()
            .map_err(|_| DomainError::InvalidScore(f64::NAN))?;
        Self::new(value)
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Score {
    type Error = DomainError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Score> for f64 {
    fn from(value: Score) -> Self {
        value.value()
    }
}
