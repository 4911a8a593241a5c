//! HTTP handlers for the warehouse API
//!
//! Handlers validate their input first, then call the estimator and the
//! ledger, then compose the JSON response.

pub mod disputes;
pub mod items;
pub mod operations;
pub mod tariffs;

use crate::estimator::{fallback_weight, WeightFeatures};
use crate::server::ApiError;

/// A required, non-blank string field
pub(crate) fn require_text(value: Option<String>, field: &str) -> Result<String, ApiError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ApiError::validation(format!("{} is required", field))),
    }
}

/// A required, finite, strictly positive number
pub(crate) fn require_positive(value: Option<f64>, field: &str) -> Result<f64, ApiError> {
    let v = value.ok_or_else(|| ApiError::validation(format!("{} is required", field)))?;
    check_positive(v, field)
}

pub(crate) fn check_positive(value: f64, field: &str) -> Result<f64, ApiError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ApiError::validation(format!("{} must be a positive number", field)))
    }
}

/// Individually valid dimensions can still overflow once multiplied
pub(crate) fn check_features(features: &WeightFeatures) -> Result<(), ApiError> {
    check_positive(features.volume(), "volume")?;
    check_positive(fallback_weight(features), "estimated weight")?;
    Ok(())
}

/// Blank strings count as absent
pub(crate) fn optional_text(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_text() {
        assert_eq!(require_text(Some("a".into()), "id").unwrap(), "a");
        assert!(require_text(Some("  ".into()), "id").is_err());
        let err = require_text(None, "itemId").unwrap_err();
        assert_eq!(err.to_string(), "itemId is required");
    }

    #[test]
    fn test_require_positive() {
        assert_eq!(require_positive(Some(2.5), "length").unwrap(), 2.5);
        assert!(require_positive(Some(0.0), "length").is_err());
        assert!(require_positive(Some(-1.0), "length").is_err());
        assert!(require_positive(Some(f64::NAN), "length").is_err());
        assert!(require_positive(None, "length").is_err());
    }

    #[test]
    fn test_check_features_rejects_overflow() {
        assert!(check_features(&WeightFeatures::new(2.0, 3.0, 4.0, 0.85)).is_ok());

        let err = check_features(&WeightFeatures::new(1e200, 1e200, 1.0, 0.85)).unwrap_err();
        assert_eq!(err.to_string(), "volume must be a positive number");

        let err = check_features(&WeightFeatures::new(1e150, 1e150, 1.0, 1e300)).unwrap_err();
        assert_eq!(err.to_string(), "estimated weight must be a positive number");
    }
}
