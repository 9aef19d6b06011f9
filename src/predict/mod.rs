//! Prediction layer: fixed-order feature encoding and adapters over
//! pretrained scoring models.

use thiserror::Error;

pub mod adapter;
pub mod model;
pub mod schema;

/// Request-fatal prediction failures. Data-quality lenience stops here:
/// a vector that does not fit the model is an error, never a partial
/// prediction.
#[derive(Debug, Error)]
pub enum PredictError {
    #[error("model expects {expected} features, got {got}")]
    ShapeMismatch { expected: usize, got: usize },
}
