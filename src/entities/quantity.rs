//! Value checks shared by the plant resource records

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum QuantityError {
    #[error("{field} must be a non-negative number, got {value}")]
    Negative { field: &'static str, value: f64 },

    #[error("{field} must be between 0 and 100, got {value}")]
    NotAPercentage { field: &'static str, value: f64 },

    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("expiry date {expiry} is before the receipt date {received}")]
    ExpiresBeforeReceipt {
        received: chrono::NaiveDate,
        expiry: chrono::NaiveDate,
    },
}

pub fn non_negative(field: &'static str, value: f64) -> Result<(), QuantityError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(QuantityError::Negative { field, value })
    }
}

pub fn non_negative_opt(field: &'static str, value: Option<f64>) -> Result<(), QuantityError> {
    value.map_or(Ok(()), |v| non_negative(field, v))
}

pub fn percentage(field: &'static str, value: f64) -> Result<(), QuantityError> {
    if value.is_finite() && (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(QuantityError::NotAPercentage { field, value })
    }
}

pub fn not_blank(field: &'static str, value: &str) -> Result<(), QuantityError> {
    if value.trim().is_empty() {
        Err(QuantityError::Empty { field })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        assert!(non_negative("x", 0.0).is_ok());
        assert!(non_negative("x", -0.1).is_err());
        assert!(non_negative("x", f64::NAN).is_err());
        assert!(non_negative_opt("x", None).is_ok());
        assert!(percentage("x", 100.0).is_ok());
        assert_eq!(
            percentage("recycling", 101.0).unwrap_err().to_string(),
            "recycling must be between 0 and 100, got 101"
        );
        assert!(not_blank("name", "  ").is_err());
    }
}
