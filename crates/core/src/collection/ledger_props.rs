//! Property-based tests for outstanding balance arithmetic.

use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::collection::error::CollectionError;
use crate::collection::ledger::{
    is_settled, outstanding, settlement_tolerance, status_for_outstanding, validate_payment,
};
use crate::collection::types::CollectionStatus;

/// Strategy for generating positive amounts with cent precision.
fn arb_amount() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Strategy for generating sequences of payment amounts.
fn arb_payments() -> impl Strategy<Value = Vec<Decimal>> {
    prop::collection::vec((1i64..100_000i64).prop_map(|n| Decimal::new(n, 2)), 0..20)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Accepted payments never push the paid total past the obligation plus
    /// the settlement tolerance.
    #[test]
    fn prop_accepted_payments_never_overshoot(
        amount in arb_amount(),
        payments in arb_payments(),
    ) {
        let mut paid = Decimal::ZERO;
        for payment in payments {
            let remaining = outstanding(amount, paid);
            if validate_payment(payment, remaining).is_ok() {
                paid += payment;
            }
        }
        prop_assert!(paid <= amount + settlement_tolerance());
    }

    /// A payment equal to the outstanding balance is always accepted while
    /// any balance remains.
    #[test]
    fn prop_settling_payment_is_accepted(
        amount in arb_amount(),
        paid_fraction in 0u8..100u8,
    ) {
        let paid = amount * Decimal::from(paid_fraction) / Decimal::from(100u8);
        let remaining = outstanding(amount, paid);
        prop_assume!(remaining > Decimal::ZERO);
        prop_assert!(validate_payment(remaining, remaining).is_ok());
    }

    /// Non-positive payments are always rejected.
    #[test]
    fn prop_non_positive_payment_rejected(
        amount in arb_amount(),
        payment in -10_000i64..=0i64,
    ) {
        let result = validate_payment(Decimal::new(payment, 2), amount);
        prop_assert!(matches!(result, Err(CollectionError::InvalidAmount)));
    }

    /// A payment strictly above outstanding + tolerance is always rejected.
    #[test]
    fn prop_overshoot_rejected(
        remaining in arb_amount(),
        excess in 2i64..100_000i64,
    ) {
        let payment = remaining + Decimal::new(excess, 2);
        let result = validate_payment(payment, remaining);
        let rejected = matches!(result, Err(CollectionError::ExceedsOutstanding { .. }));
        prop_assert!(rejected);
    }

    /// The derived status is `Paid` exactly when the balance is settled,
    /// `PartiallyPaid` otherwise.
    #[test]
    fn prop_status_matches_settlement(remaining in -1_000i64..1_000_000i64) {
        let remaining = Decimal::new(remaining, 2);
        let status = status_for_outstanding(remaining);
        if is_settled(remaining) {
            prop_assert_eq!(status, CollectionStatus::Paid);
        } else {
            prop_assert_eq!(status, CollectionStatus::PartiallyPaid);
        }
    }
}
