use serde::Serialize;

use super::model::Model;
use super::schema::{DropoutFactors, FeatureVector, InfraFactors, RetentionFactors};
use super::PredictError;

// ---------------------------------------------------------------------------
// Inference adapter: encode → shape check → score → label
// ---------------------------------------------------------------------------

/// Raw regression output is a fraction of ten percentage points; the
/// reported score multiplies it out. Part of the adapter contract, not
/// the model's.
pub const DROPOUT_SCALE: f64 = 10.0;

pub const HIGH_RETENTION: &str = "High Retention";
pub const LOW_RETENTION: &str = "Low Retention";

/// A scored request: the scalar output and its human-readable label.
#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    pub score: f64,
    pub label: String,
}

/// Single scoring path for every target: no retries, no fallback. A
/// vector that does not match the model's trained width fails the whole
/// request.
fn run(model: &dyn Model, features: &FeatureVector) -> Result<f64, PredictError> {
    if features.len() != model.n_features() {
        return Err(PredictError::ShapeMismatch {
            expected: model.n_features(),
            got: features.len(),
        });
    }
    Ok(model.predict(features))
}

/// Score the dropout-rate regression target.
pub fn predict_dropout_rate(
    model: &dyn Model,
    factors: &DropoutFactors,
) -> Result<Prediction, PredictError> {
    let raw = run(model, &factors.encode())?;
    let score = raw * DROPOUT_SCALE;
    Ok(Prediction {
        score,
        label: format!("{score:.2}% predicted dropout rate"),
    })
}

/// Score the binary retention target. The classifier emits exact class
/// codes: `1` is high retention, anything else low.
pub fn predict_retention(
    model: &dyn Model,
    factors: &RetentionFactors,
) -> Result<Prediction, PredictError> {
    let raw = run(model, &factors.encode())?;
    let label = if raw == 1.0 {
        HIGH_RETENTION
    } else {
        LOW_RETENTION
    };
    Ok(Prediction {
        score: raw,
        label: label.to_string(),
    })
}

/// Score the infrastructure quality target on its 0–100 scale and band
/// the result.
pub fn score_infrastructure(
    model: &dyn Model,
    factors: &InfraFactors,
) -> Result<Prediction, PredictError> {
    let raw = run(model, &factors.encode())?;
    let score = raw.round() * 10.0;
    let label = if score >= 80.0 {
        "Excellent infrastructure quality"
    } else if score >= 60.0 {
        "Good infrastructure quality"
    } else if score >= 40.0 {
        "Average infrastructure quality"
    } else {
        "Poor infrastructure quality"
    };
    Ok(Prediction {
        score,
        label: label.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Fixed-output stand-in for a pretrained artifact.
    struct FixedModel {
        n_features: usize,
        output: f64,
    }

    impl Model for FixedModel {
        fn n_features(&self) -> usize {
            self.n_features
        }

        fn predict(&self, _features: &[f64]) -> f64 {
            self.output
        }
    }

    fn dropout_factors() -> DropoutFactors {
        DropoutFactors {
            electricity: "Yes".into(),
            total_class_rooms: 10.0,
            total_tch: 20.0,
            trained_comp: 5.0,
            furniture: "Yes".into(),
            total_girls_func_toilet: 2.0,
            library: "Yes".into(),
            internet: "Yes".into(),
            building_status: "Pucca".into(),
            playground: "Yes".into(),
        }
    }

    fn retention_factors() -> RetentionFactors {
        RetentionFactors {
            rural_urban: "Rural".into(),
            school_category: "Primary".into(),
            management: "Govt".into(),
            female_teachers: 10.0,
            total_tch: 20.0,
            trained_comp: 5.0,
            library: "Yes".into(),
            availability_ramps: "No".into(),
            medical_checkups: "No".into(),
            electricity: "Yes".into(),
        }
    }

    #[test]
    fn dropout_score_applies_post_scaling() {
        let model = FixedModel {
            n_features: 10,
            output: 0.42,
        };
        let prediction = predict_dropout_rate(&model, &dropout_factors()).unwrap();
        assert!((prediction.score - 4.2).abs() < 1e-12);
        assert!(prediction.label.contains("4.20%"));
    }

    #[test]
    fn retention_labels_are_binary() {
        let high = FixedModel {
            n_features: 10,
            output: 1.0,
        };
        let low = FixedModel {
            n_features: 10,
            output: 0.0,
        };
        let other = FixedModel {
            n_features: 10,
            output: 2.0,
        };
        let factors = retention_factors();
        assert_eq!(predict_retention(&high, &factors).unwrap().label, HIGH_RETENTION);
        assert_eq!(predict_retention(&low, &factors).unwrap().label, LOW_RETENTION);
        assert_eq!(predict_retention(&other, &factors).unwrap().label, LOW_RETENTION);
    }

    #[test]
    fn shape_mismatch_fails_the_request() {
        let model = FixedModel {
            n_features: 7,
            output: 0.0,
        };
        let err = predict_dropout_rate(&model, &dropout_factors()).unwrap_err();
        match err {
            PredictError::ShapeMismatch { expected, got } => {
                assert_eq!(expected, 7);
                assert_eq!(got, 10);
            }
        }
    }

    #[test]
    fn infrastructure_score_rounds_then_bands() {
        let factors = InfraFactors {
            building_status: "Pucca".into(),
            boundary_wall: "Yes".into(),
            electricity_availability: "Yes".into(),
            tap_fun_yn: "Yes".into(),
            internet: "Yes".into(),
            playground_available: "Yes".into(),
            comp_lab_cond: "Good".into(),
            library_availability: "Yes".into(),
            total_boys_func_toilet: 5.0,
            classrooms_in_good_condition: 20.0,
        };
        let model = FixedModel {
            n_features: 10,
            output: 8.4,
        };
        let prediction = score_infrastructure(&model, &factors).unwrap();
        assert_eq!(prediction.score, 80.0);
        assert!(prediction.label.starts_with("Excellent"));

        let mid = FixedModel {
            n_features: 10,
            output: 4.2,
        };
        assert!(score_infrastructure(&mid, &factors)
            .unwrap()
            .label
            .starts_with("Average"));
    }
}
