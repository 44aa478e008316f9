use serde::Deserialize;
use uuid::Uuid;

use crate::shared::error::{AppError, AppResult};

/// Payload of the pair endpoint, e.g.
/// `{"result":"success","base_code":"USD","target_code":"EUR","conversion_rate":0.92}`.
#[derive(Debug, Deserialize)]
pub struct PairRateResponse {
    pub result: String,
    pub base_code: Option<String>,
    pub target_code: Option<String>,
    pub conversion_rate: Option<f64>,
    #[serde(rename = "error-type")]
    pub error_type: Option<String>,
}

impl PairRateResponse {
    pub fn into_rate(self) -> AppResult<f64> {
        if !self.result.eq_ignore_ascii_case("success") {
            return Err(AppError::Network(format!(
                "API reported failure: {}",
                self.error_type.as_deref().unwrap_or("unknown")
            )));
        }
        match self.conversion_rate {
            Some(rate) if rate.is_finite() => Ok(rate),
            Some(rate) => Err(AppError::Validation(format!("Invalid conversion rate: {}", rate))),
            None => Err(AppError::Validation("Response is missing conversion_rate".into())),
        }
    }
}

/// A conversion waiting on its rate.
///
/// The amount and codes are captured when the request starts, so a reply is
/// always applied to the input it was requested for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingConversion {
    pub token: Uuid,
    pub amount: String,
    pub from: String,
    pub to: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_payload() {
        let payload: PairRateResponse = serde_json::from_str(
            r#"{"result":"success","base_code":"USD","target_code":"EUR","conversion_rate":0.9213}"#,
        )
        .unwrap();
        assert_eq!(payload.base_code.as_deref(), Some("USD"));
        assert_eq!(payload.into_rate().unwrap(), 0.9213);
    }

    #[test]
    fn test_error_payload() {
        let payload: PairRateResponse =
            serde_json::from_str(r#"{"result":"error","error-type":"invalid-key"}"#).unwrap();
        let err = payload.into_rate().unwrap_err();
        assert!(matches!(err, AppError::Network(msg) if msg.contains("invalid-key")));
    }

    #[test]
    fn test_missing_rate() {
        let payload: PairRateResponse = serde_json::from_str(r#"{"result":"success"}"#).unwrap();
        assert!(matches!(payload.into_rate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_non_numeric_rate_fails_to_decode() {
        let parsed = serde_json::from_str::<PairRateResponse>(r#"{"result":"success","conversion_rate":"abc"}"#);
        assert!(parsed.is_err());
    }
}
