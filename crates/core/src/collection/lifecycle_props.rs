//! Property-based tests for the lifecycle state machine.

use proptest::prelude::*;
use utang_shared::types::UserId;

use crate::collection::lifecycle::LifecycleService;
use crate::collection::types::{CollectionStatus, Participants, Party, Role};

/// Strategy for generating any collection status.
fn arb_status() -> impl Strategy<Value = CollectionStatus> {
    prop_oneof![
        Just(CollectionStatus::PendingApproval),
        Just(CollectionStatus::Active),
        Just(CollectionStatus::PartiallyPaid),
        Just(CollectionStatus::Paid),
        Just(CollectionStatus::Rejected),
        Just(CollectionStatus::Cancelled),
    ]
}

/// Strategy for generating a counterparty slot.
fn arb_counterparty() -> impl Strategy<Value = Party> {
    prop_oneof![
        Just(Party::Registered(UserId::new())),
        "[A-Za-z][A-Za-z ]{0,30}".prop_map(Party::Manual),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Terminal statuses accept no transition of any kind.
    #[test]
    fn prop_terminal_statuses_are_final(status in arb_status(), accept in any::<bool>()) {
        prop_assume!(status.is_terminal());
        prop_assert!(LifecycleService::respond(status, accept).is_err());
        prop_assert!(LifecycleService::cancel(status, true).is_err());
        prop_assert!(!status.accepts_payments());
    }

    /// A manual-counterparty collection is never born awaiting approval.
    #[test]
    fn prop_manual_counterparty_skips_approval(counterparty in arb_counterparty()) {
        let initial = LifecycleService::initial_status(&counterparty);
        match counterparty {
            Party::Registered(_) => {
                prop_assert_eq!(initial, CollectionStatus::PendingApproval);
            }
            Party::Manual(_) => prop_assert_eq!(initial, CollectionStatus::Active),
        }
    }

    /// Every transition the service performs is in the valid-transition matrix.
    #[test]
    fn prop_service_transitions_are_valid(status in arb_status(), accept in any::<bool>()) {
        if let Ok(next) = LifecycleService::respond(status, accept) {
            prop_assert!(LifecycleService::is_valid_transition(status, next));
        }
        if let Ok(next) = LifecycleService::cancel(status, true) {
            prop_assert!(LifecycleService::is_valid_transition(status, next));
        }
    }

    /// The actor's resolved role always points back at a registered slot
    /// holding the actor's id.
    #[test]
    fn prop_role_resolution_is_consistent(
        as_creditor in any::<bool>(),
        counterparty in arb_counterparty(),
    ) {
        let actor = UserId::new();
        let role = if as_creditor { Role::Creditor } else { Role::Debtor };
        let participants = Participants::with_actor(role, actor, counterparty);

        prop_assert_eq!(participants.role_of(actor), Some(role));
        prop_assert_eq!(participants.party(role).registered_id(), Some(actor));
        prop_assert_eq!(participants.role_of(UserId::new()), None);
    }
}
