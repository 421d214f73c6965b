use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

/// A model's verdict on one element: boolean label plus a score in `[0, 1]`.
///
/// Scores outside the range are rejected at construction; they are never
/// clamped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPrediction")]
pub struct Prediction {
    label: bool,
    score: f64,
}

#[derive(Deserialize)]
struct RawPrediction {
    label: bool,
    score: f64,
}

impl Prediction {
    pub fn new(label: bool, score: f64) -> Result<Self, ModelError> {
        if !(0.0..=1.0).contains(&score) {
            return Err(ModelError::ScoreOutOfRange { score });
        }
        Ok(Self { label, score })
    }

    pub fn label(&self) -> bool {
        self.label
    }

    pub fn score(&self) -> f64 {
        self.score
    }
}

impl TryFrom<RawPrediction> for Prediction {
    type Error = ModelError;

    fn try_from(raw: RawPrediction) -> Result<Self, Self::Error> {
        Prediction::new(raw.label, raw.score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_out_of_range_is_rejected() {
        assert!(matches!(
            Prediction::new(true, 1.5),
            Err(ModelError::ScoreOutOfRange { .. })
        ));
        assert!(Prediction::new(false, -0.01).is_err());
        assert!(Prediction::new(true, f64::NAN).is_err());
    }

    #[test]
    fn bounds_are_inclusive() {
        assert_eq!(Prediction::new(true, 1.0).unwrap().score(), 1.0);
        assert_eq!(Prediction::new(false, 0.0).unwrap().score(), 0.0);
    }

    #[test]
    fn deserialization_validates_score() {
        let bad = serde_json::from_str::<Prediction>(r#"{"label":true,"score":1.5}"#);
        assert!(bad.is_err());
        let good: Prediction = serde_json::from_str(r#"{"label":true,"score":0.75}"#).unwrap();
        assert!(good.label());
    }
}
