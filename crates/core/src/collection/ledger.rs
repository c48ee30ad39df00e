//! Outstanding balance arithmetic and payment validation.
//!
//! The outstanding balance of a collection is never stored; it is always
//! `amount - sum(payments)`. Settlement uses an absolute tolerance of one
//! cent so that rounding on the last installment cannot strand a collection
//! one atom away from `Paid`.

use rust_decimal::Decimal;

use crate::collection::error::CollectionError;
use crate::collection::types::CollectionStatus;

/// Absolute settlement tolerance in currency units.
#[must_use]
pub fn settlement_tolerance() -> Decimal {
    // 0.01
    Decimal::new(1, 2)
}

/// Computes the outstanding balance from the obligation and the sum of
/// recorded payments.
#[must_use]
pub fn outstanding(amount: Decimal, paid_total: Decimal) -> Decimal {
    amount - paid_total
}

/// Validates a payment against the current outstanding balance.
///
/// A payment may never overshoot the remaining balance beyond the
/// settlement tolerance. Callers must hold the collection row lock while
/// computing `outstanding` so two concurrent payments cannot jointly
/// overshoot.
///
/// # Errors
///
/// Returns `CollectionError::InvalidAmount` for non-positive amounts and
/// `CollectionError::ExceedsOutstanding` for overshooting ones.
pub fn validate_payment(amount: Decimal, outstanding: Decimal) -> Result<(), CollectionError> {
    if amount <= Decimal::ZERO {
        return Err(CollectionError::InvalidAmount);
    }

    if amount > outstanding + settlement_tolerance() {
        return Err(CollectionError::ExceedsOutstanding {
            amount,
            outstanding,
        });
    }

    Ok(())
}

/// Returns true if the outstanding balance counts as settled.
#[must_use]
pub fn is_settled(outstanding: Decimal) -> bool {
    outstanding <= settlement_tolerance()
}

/// Derives the payment-phase status from the outstanding balance.
///
/// Only meaningful once the collection is `Active` or beyond; the approval
/// statuses are explicit transitions, not derived.
#[must_use]
pub fn status_for_outstanding(outstanding: Decimal) -> CollectionStatus {
    if is_settled(outstanding) {
        CollectionStatus::Paid
    } else {
        CollectionStatus::PartiallyPaid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[test]
    fn test_outstanding() {
        assert_eq!(outstanding(dec!(100), dec!(60)), dec!(40));
        assert_eq!(outstanding(dec!(100), dec!(0)), dec!(100));
        assert_eq!(outstanding(dec!(100), dec!(100)), dec!(0));
    }

    #[test]
    fn test_validate_payment_within_balance() {
        assert!(validate_payment(dec!(60), dec!(100)).is_ok());
        assert!(validate_payment(dec!(100), dec!(100)).is_ok());
    }

    #[test]
    fn test_validate_payment_rejects_non_positive() {
        assert!(matches!(
            validate_payment(dec!(0), dec!(100)),
            Err(CollectionError::InvalidAmount)
        ));
        assert!(matches!(
            validate_payment(dec!(-10), dec!(100)),
            Err(CollectionError::InvalidAmount)
        ));
    }

    #[test]
    fn test_validate_payment_rejects_overshoot() {
        let err = validate_payment(dec!(50), dec!(40));
        assert!(matches!(
            err,
            Err(CollectionError::ExceedsOutstanding {
                amount,
                outstanding,
            }) if amount == dec!(50) && outstanding == dec!(40)
        ));
    }

    #[rstest]
    // Exactly one cent over is allowed; two cents over is not.
    #[case(dec!(40.01), dec!(40), true)]
    #[case(dec!(40.02), dec!(40), false)]
    #[case(dec!(100.01), dec!(100), true)]
    #[case(dec!(0.01), dec!(0.01), true)]
    fn test_validate_payment_tolerance_boundary(
        #[case] amount: Decimal,
        #[case] outstanding: Decimal,
        #[case] accepted: bool,
    ) {
        assert_eq!(validate_payment(amount, outstanding).is_ok(), accepted);
    }

    #[test]
    fn test_is_settled() {
        assert!(is_settled(dec!(0)));
        assert!(is_settled(dec!(0.01)));
        assert!(is_settled(dec!(-0.01)));
        assert!(!is_settled(dec!(0.02)));
        assert!(!is_settled(dec!(40)));
    }

    #[test]
    fn test_status_for_outstanding() {
        assert_eq!(status_for_outstanding(dec!(0)), CollectionStatus::Paid);
        assert_eq!(status_for_outstanding(dec!(0.01)), CollectionStatus::Paid);
        assert_eq!(
            status_for_outstanding(dec!(40)),
            CollectionStatus::PartiallyPaid
        );
    }
}
