use serde::{Deserialize, Serialize};

use crate::core::value::Value;

#[derive(Debug, Serialize)]
pub struct PredictionRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<&'a str>,
    pub input: &'a Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionStatus {
    Starting,
    Processing,
    Succeeded,
    Failed,
    Canceled,
    #[serde(other)]
    Unknown,
}

impl PredictionStatus {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Canceled)
    }
}

#[derive(Debug, Deserialize)]
pub struct Prediction {
    pub id: String,
    pub status: PredictionStatus,
    #[serde(default)]
    pub output: Value,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

impl Prediction {
    /// The provider reports errors as a string or, occasionally, an object.
    #[must_use]
    pub fn error_text(&self) -> String {
        match &self.error {
            Some(serde_json::Value::String(text)) => text.clone(),
            Some(other) if !other.is_null() => other.to_string(),
            _ => format!("prediction {} ended without output", self.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prediction_deserialization() {
        let json = r#"{
            "id": "p-1",
            "status": "succeeded",
            "output": ["https://replicate.delivery/out-0.png"],
            "error": null,
            "metrics": {"predict_time": 1.2}
        }"#;
        let prediction: Prediction = serde_json::from_str(json).expect("deserialize");
        assert_eq!(prediction.status, PredictionStatus::Succeeded);
        assert!(prediction.status.is_terminal());
        assert_eq!(prediction.output.as_list().map(<[Value]>::len), Some(1));
    }

    #[test]
    fn test_unknown_status() {
        let json = r#"{"id": "p-2", "status": "queued"}"#;
        let prediction: Prediction = serde_json::from_str(json).expect("deserialize");
        assert_eq!(prediction.status, PredictionStatus::Unknown);
        assert!(!prediction.status.is_terminal());
        assert!(prediction.output.is_null());
    }

    #[test]
    fn test_error_text() {
        let json = r#"{"id": "p-3", "status": "failed", "error": "CUDA out of memory"}"#;
        let prediction: Prediction = serde_json::from_str(json).expect("deserialize");
        assert_eq!(prediction.error_text(), "CUDA out of memory");
    }

    #[test]
    fn test_request_without_version() {
        let input = Value::map([("prompt", Value::from("a cat"))]);
        let body = PredictionRequest {
            version: None,
            input: &input,
        };
        let json = serde_json::to_value(&body).expect("serialize");
        assert!(json.get("version").is_none());
        assert_eq!(json["input"]["prompt"], "a cat");
    }
}
