//! Error types for account and rate-table operations.
//!
//! Every fallible billing operation returns [`BillingError`] through the
//! crate [`Result`] alias. Errors are raised before any state changes, so a
//! failed call leaves accounts and rate tables exactly as they were.

/// Errors raised by accounts and rate tables.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BillingError {
    /// A caller-supplied value was rejected (negative amount, negative
    /// price, unrecognised plan tag, malformed tier table).
    #[error("invalid argument `{field}`: {reason}")]
    InvalidArgument {
        /// Name of the rejected input.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },

    /// A plan or strategy tag has no matching rate-table entry.
    #[error("{what} not found in rate table")]
    NotFound {
        /// Description of the missing entry.
        what: String,
    },
}

impl BillingError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field,
            reason: reason.into(),
        }
    }

    /// Returns `true` for [`BillingError::InvalidArgument`].
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }

    /// Returns `true` for [`BillingError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, BillingError>;

/// Rejects negative, NaN and infinite quantities.
///
/// Used by every accumulator mutator, constructor and price setter.
pub(crate) fn ensure_non_negative(field: &'static str, value: f64) -> Result<f64> {
    if !value.is_finite() {
        return Err(BillingError::invalid(field, format!("must be finite, got {value}")));
    }
    if value < 0.0 {
        return Err(BillingError::invalid(field, format!("cannot be negative, got {value}")));
    }
    Ok(value)
}

/// Adds a validated quantity to a running total.
///
/// Fails without a result when `delta` is rejected by
/// [`ensure_non_negative`] or the sum would no longer be finite.
pub(crate) fn accumulate(field: &'static str, total: f64, delta: f64) -> Result<f64> {
    let delta = ensure_non_negative(field, delta)?;
    let sum = total + delta;
    if !sum.is_finite() {
        return Err(BillingError::invalid(
            field,
            format!("running total {total} overflows when adding {delta}"),
        ));
    }
    Ok(sum)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_zero_and_positive() {
        assert_eq!(ensure_non_negative("x", 0.0), Ok(0.0));
        assert_eq!(ensure_non_negative("x", 12.5), Ok(12.5));
    }

    #[test]
    fn rejects_negative() {
        let err = ensure_non_negative("usage", -1.0).unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(err.to_string().contains("usage"));
    }

    #[test]
    fn rejects_non_finite() {
        assert!(ensure_non_negative("x", f64::NAN).is_err());
        assert!(ensure_non_negative("x", f64::INFINITY).is_err());
    }

    #[test]
    fn accumulate_rejects_overflowing_total() {
        assert_eq!(accumulate("x", 1.5, 2.0), Ok(3.5));
        let err = accumulate("usage", f64::MAX, f64::MAX).unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(accumulate("usage", 1.0, -1.0).is_err());
    }

    #[test]
    fn not_found_message_names_entry() {
        let err = BillingError::NotFound {
            what: "water plan `NoSupply`".to_string(),
        };
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "water plan `NoSupply` not found in rate table");
    }
}
