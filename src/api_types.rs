use serde::{Deserialize, Serialize};

/// Body of a REST `:predict` call.
#[derive(Debug, Clone, Serialize)]
pub struct PredictRequest {
    pub instances: Vec<Vec<i64>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PredictResponse {
    pub predictions: Vec<Vec<f32>>,
}

/// Error payload returned by the model server on non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ServingError {
    #[serde(default)]
    pub error: String,
}
