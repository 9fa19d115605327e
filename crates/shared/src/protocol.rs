use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::domain::NormalizedVector;

pub const HIGH_RISK_LABEL: &str = "🧠 High Risk of Heart Disease";
pub const LOW_RISK_LABEL: &str = "💓 Low Risk";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictRequest {
    pub input: NormalizedVector,
}

/// Body returned by the login and signup endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthReply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AuthReply {
    /// `error`, else `message`, else `fallback`. Empty strings count as absent.
    pub fn failure_text(&self, fallback: &str) -> String {
        [self.error.as_deref(), self.message.as_deref()]
            .into_iter()
            .flatten()
            .find(|text| !text.is_empty())
            .unwrap_or(fallback)
            .to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskClass {
    High,
    Low,
}

impl RiskClass {
    pub fn label(self) -> &'static str {
        match self {
            RiskClass::High => HIGH_RISK_LABEL,
            RiskClass::Low => LOW_RISK_LABEL,
        }
    }
}

/// Scorer response, resolved from the raw payload once at the HTTP boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScorerReply {
    Label(String),
    Binary(RiskClass),
    Error(String),
}

impl ScorerReply {
    /// Precedence: a non-empty `error` wins, then a non-empty `risk`, then `result == 1`.
    /// Anything else, a missing `result` included, is the low-risk outcome.
    pub fn from_payload(payload: &Value) -> Self {
        if let Some(error) = payload.get("error").and_then(present_text) {
            return ScorerReply::Error(error);
        }
        if let Some(risk) = payload.get("risk").and_then(present_text) {
            return ScorerReply::Label(risk);
        }
        let high = payload
            .get("result")
            .and_then(Value::as_f64)
            .is_some_and(|result| result == 1.0);
        ScorerReply::Binary(if high { RiskClass::High } else { RiskClass::Low })
    }

    /// Text to show on success, or the scorer's own error message.
    pub fn into_outcome(self) -> Result<String, String> {
        match self {
            ScorerReply::Label(label) => Ok(label),
            ScorerReply::Binary(class) => Ok(class.label().to_string()),
            ScorerReply::Error(message) => Err(message),
        }
    }
}

impl<'de> Deserialize<'de> for ScorerReply {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let payload = Value::deserialize(deserializer)?;
        if !payload.is_object() {
            return Err(de::Error::custom(format!(
                "scorer reply must be a JSON object, got {payload}"
            )));
        }
        Ok(ScorerReply::from_payload(&payload))
    }
}

/// Text for a payload member that is set to something meaningful. Null, `false`, `0` and
/// empty strings are treated as absent.
fn present_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(text) if text.is_empty() => None,
        Value::String(text) => Some(text.clone()),
        Value::Number(number) if number.as_f64() == Some(0.0) => None,
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn error_takes_precedence_over_risk_and_result() {
        let reply = ScorerReply::from_payload(&json!({"error": "bad input", "risk": "High", "result": 1}));
        assert_eq!(reply, ScorerReply::Error("bad input".to_string()));
    }

    #[test]
    fn textual_risk_is_preferred_over_binary_result() {
        let reply = ScorerReply::from_payload(&json!({"risk": "Moderate", "result": 1}));
        assert_eq!(reply.into_outcome(), Ok("Moderate".to_string()));
    }

    #[test]
    fn binary_result_maps_to_fixed_labels() {
        assert_eq!(
            ScorerReply::from_payload(&json!({"result": 1})).into_outcome(),
            Ok(HIGH_RISK_LABEL.to_string())
        );
        assert_eq!(
            ScorerReply::from_payload(&json!({"result": 0})).into_outcome(),
            Ok(LOW_RISK_LABEL.to_string())
        );
        assert_eq!(
            ScorerReply::from_payload(&json!({"result": 2})),
            ScorerReply::Binary(RiskClass::Low)
        );
        assert_eq!(
            ScorerReply::from_payload(&json!({"result": "1"})),
            ScorerReply::Binary(RiskClass::Low)
        );
    }

    #[test]
    fn empty_error_and_risk_fall_through() {
        let reply = ScorerReply::from_payload(&json!({"error": "", "risk": "", "result": 1}));
        assert_eq!(reply, ScorerReply::Binary(RiskClass::High));
    }

    #[test]
    fn numeric_risk_is_rendered_as_text() {
        let reply = ScorerReply::from_payload(&json!({"risk": 0.82}));
        assert_eq!(reply, ScorerReply::Label("0.82".to_string()));
    }

    #[test]
    fn deserializes_through_payload_resolution() {
        let reply: ScorerReply = serde_json::from_str(r#"{"error":"Input must be a list of 13 numbers"}"#)
            .expect("decode");
        assert_eq!(
            reply,
            ScorerReply::Error("Input must be a list of 13 numbers".to_string())
        );
    }

    #[test]
    fn non_object_reply_does_not_decode() {
        for body in ["null", "[]", "\"ok\"", "1"] {
            assert!(serde_json::from_str::<ScorerReply>(body).is_err(), "{body}");
        }
    }

    #[test]
    fn auth_failure_text_prefers_error_then_message() {
        let both = AuthReply {
            message: Some("m".to_string()),
            error: Some("e".to_string()),
        };
        assert_eq!(both.failure_text("Login failed"), "e");

        let message_only = AuthReply {
            message: Some("m".to_string()),
            error: Some(String::new()),
        };
        assert_eq!(message_only.failure_text("Login failed"), "m");

        assert_eq!(AuthReply::default().failure_text("Login failed"), "Login failed");
    }

    #[test]
    fn predict_request_wraps_vector_under_input() {
        let request = PredictRequest {
            input: NormalizedVector::new([0.0; crate::domain::FIELD_COUNT]),
        };
        let json = serde_json::to_value(&request).expect("serialize");
        assert_eq!(json["input"].as_array().map(Vec::len), Some(13));
    }
}
