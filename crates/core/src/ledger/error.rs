//! Ledger error types.

use rust_decimal::Decimal;
use thiserror::Error;

use patungan_shared::types::{MemberId, TripId};

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Expense amount cannot be negative.
    #[error("Expense amount cannot be negative")]
    NegativeAmount,

    /// A participant share cannot be negative.
    #[error("Share for member {0} cannot be negative")]
    NegativeShare(MemberId),

    /// An expense needs at least one participant.
    #[error("Expense must have at least one participant")]
    NoParticipants,

    /// The same member appears twice among the participants.
    #[error("Member {0} is listed more than once among the participants")]
    DuplicateParticipant(MemberId),

    /// Participant shares do not add up to the expense amount.
    #[error("Participant shares sum to {actual}, expected {expected}")]
    ShareSumMismatch {
        /// The expense amount.
        expected: Decimal,
        /// The sum of the submitted shares.
        actual: Decimal,
    },

    // ========== Reference Errors ==========
    /// Trip not found.
    #[error("Trip not found: {0}")]
    TripNotFound(TripId),

    /// The trip has no active members to compute over.
    #[error("Trip {0} has no active members")]
    NoActiveMembers(TripId),

    /// The payer is not an active member of the trip.
    #[error("Payer {0} is not an active member of the trip")]
    PayerNotMember(MemberId),

    /// A participant is not an active member of the trip.
    #[error("Participant {0} is not an active member of the trip")]
    ParticipantNotMember(MemberId),

    // ========== Database Errors ==========
    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NegativeAmount => "NEGATIVE_AMOUNT",
            Self::NegativeShare(_) => "NEGATIVE_SHARE",
            Self::NoParticipants => "NO_PARTICIPANTS",
            Self::DuplicateParticipant(_) => "DUPLICATE_PARTICIPANT",
            Self::ShareSumMismatch { .. } => "SHARE_SUM_MISMATCH",
            Self::TripNotFound(_) => "TRIP_NOT_FOUND",
            Self::NoActiveMembers(_) => "NO_ACTIVE_MEMBERS",
            Self::PayerNotMember(_) => "PAYER_NOT_MEMBER",
            Self::ParticipantNotMember(_) => "PARTICIPANT_NOT_MEMBER",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::NegativeAmount
            | Self::NegativeShare(_)
            | Self::NoParticipants
            | Self::DuplicateParticipant(_)
            | Self::ShareSumMismatch { .. }
            | Self::PayerNotMember(_)
            | Self::ParticipantNotMember(_) => 400,
            Self::TripNotFound(_) | Self::NoActiveMembers(_) => 404,
            Self::Database(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_codes() {
        assert_eq!(LedgerError::NegativeAmount.error_code(), "NEGATIVE_AMOUNT");
        assert_eq!(
            LedgerError::ShareSumMismatch {
                expected: dec!(100),
                actual: dec!(99),
            }
            .error_code(),
            "SHARE_SUM_MISMATCH"
        );
        assert_eq!(
            LedgerError::TripNotFound(TripId::new()).error_code(),
            "TRIP_NOT_FOUND"
        );
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(LedgerError::NoParticipants.http_status_code(), 400);
        assert_eq!(
            LedgerError::TripNotFound(TripId::new()).http_status_code(),
            404
        );
        assert_eq!(
            LedgerError::Database("boom".into()).http_status_code(),
            500
        );
    }

    #[test]
    fn test_share_sum_mismatch_display() {
        let err = LedgerError::ShareSumMismatch {
            expected: dec!(100.00),
            actual: dec!(99.50),
        };
        assert_eq!(
            err.to_string(),
            "Participant shares sum to 99.50, expected 100.00"
        );
    }
}
