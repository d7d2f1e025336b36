use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::ShipmentStatus;

/// Role attached to an API key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Owner,
    MiamiOperator,
    CubaOperator,
    Sender,
    Recipient,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Owner => "owner",
            Self::MiamiOperator => "miami_operator",
            Self::CubaOperator => "cuba_operator",
            Self::Sender => "sender",
            Self::Recipient => "recipient",
        };
        f.write_str(name)
    }
}

/// Immutable per-request identity, built by the auth middleware and carried
/// as a request extension. Replaces any notion of process-wide auth state.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Name of the API key used for authentication
    pub actor: String,
    pub role: Role,
    /// Validated tenant slug from the X-Tenant header
    pub tenant: String,
}

use ShipmentStatus::*;

/// Whether `to` is reachable from `from` at all, regardless of role.
/// The chain is linear; cancellation is allowed from any non-terminal state.
pub fn is_valid_transition(from: ShipmentStatus, to: ShipmentStatus) -> bool {
    if from.is_terminal() {
        return false;
    }
    if to == Cancelled {
        return true;
    }
    matches!(
        (from, to),
        (Registered, ReceivedMiami)
            | (ReceivedMiami, InTransit)
            | (InTransit, InCuba)
            | (InCuba, OutForDelivery)
            | (OutForDelivery, Delivered)
    )
}

/// Whether `role` may perform a transition that is already valid per
/// `is_valid_transition`. Operators only touch the legs they handle.
pub fn role_may_transition(role: Role, from: ShipmentStatus, to: ShipmentStatus) -> bool {
    match role {
        Role::Owner => true,
        Role::MiamiOperator => matches!(
            (from, to),
            (Registered, ReceivedMiami)
                | (ReceivedMiami, InTransit)
                | (Registered, Cancelled)
                | (ReceivedMiami, Cancelled)
        ),
        Role::CubaOperator => matches!(
            (from, to),
            (InTransit, InCuba) | (InCuba, OutForDelivery) | (OutForDelivery, Delivered)
        ),
        Role::Sender | Role::Recipient => false,
    }
}

/// Roles allowed to register a new shipment.
pub fn may_create_shipment(role: Role) -> bool {
    matches!(role, Role::Owner | Role::MiamiOperator | Role::Sender)
}

/// Roles allowed to browse a tenant's full shipment list.
pub fn may_list_shipments(role: Role) -> bool {
    matches!(
        role,
        Role::Owner | Role::MiamiOperator | Role::CubaOperator
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_STATUSES: [ShipmentStatus; 7] = [
        Registered,
        ReceivedMiami,
        InTransit,
        InCuba,
        OutForDelivery,
        Delivered,
        Cancelled,
    ];

    #[test]
    fn test_linear_chain_is_valid() {
        assert!(is_valid_transition(Registered, ReceivedMiami));
        assert!(is_valid_transition(ReceivedMiami, InTransit));
        assert!(is_valid_transition(InTransit, InCuba));
        assert!(is_valid_transition(InCuba, OutForDelivery));
        assert!(is_valid_transition(OutForDelivery, Delivered));
    }

    #[test]
    fn test_skipping_states_is_invalid() {
        assert!(!is_valid_transition(Registered, InTransit));
        assert!(!is_valid_transition(ReceivedMiami, Delivered));
        assert!(!is_valid_transition(InCuba, Delivered));
    }

    #[test]
    fn test_no_backwards_moves() {
        assert!(!is_valid_transition(InCuba, InTransit));
        assert!(!is_valid_transition(Delivered, OutForDelivery));
    }

    #[test]
    fn test_cancel_from_any_non_terminal_state() {
        for from in ALL_STATUSES {
            assert_eq!(is_valid_transition(from, Cancelled), !from.is_terminal());
        }
    }

    #[test]
    fn test_terminal_states_are_frozen() {
        for to in ALL_STATUSES {
            assert!(!is_valid_transition(Delivered, to));
            assert!(!is_valid_transition(Cancelled, to));
        }
    }

    #[test]
    fn test_owner_may_perform_any_valid_transition() {
        for from in ALL_STATUSES {
            for to in ALL_STATUSES {
                if is_valid_transition(from, to) {
                    assert!(role_may_transition(Role::Owner, from, to));
                }
            }
        }
    }

    #[test]
    fn test_miami_operator_scope() {
        assert!(role_may_transition(
            Role::MiamiOperator,
            Registered,
            ReceivedMiami
        ));
        assert!(role_may_transition(
            Role::MiamiOperator,
            ReceivedMiami,
            InTransit
        ));
        assert!(role_may_transition(
            Role::MiamiOperator,
            Registered,
            Cancelled
        ));
        // The Cuba leg is out of reach once the package has shipped
        assert!(!role_may_transition(Role::MiamiOperator, InTransit, InCuba));
        assert!(!role_may_transition(
            Role::MiamiOperator,
            InTransit,
            Cancelled
        ));
    }

    #[test]
    fn test_cuba_operator_scope() {
        assert!(role_may_transition(Role::CubaOperator, InTransit, InCuba));
        assert!(role_may_transition(
            Role::CubaOperator,
            InCuba,
            OutForDelivery
        ));
        assert!(role_may_transition(
            Role::CubaOperator,
            OutForDelivery,
            Delivered
        ));
        assert!(!role_may_transition(
            Role::CubaOperator,
            Registered,
            ReceivedMiami
        ));
        assert!(!role_may_transition(
            Role::CubaOperator,
            InTransit,
            Cancelled
        ));
    }

    #[test]
    fn test_senders_and_recipients_are_read_only() {
        for from in ALL_STATUSES {
            for to in ALL_STATUSES {
                assert!(!role_may_transition(Role::Sender, from, to));
                assert!(!role_may_transition(Role::Recipient, from, to));
            }
        }
    }

    #[test]
    fn test_creation_roles() {
        assert!(may_create_shipment(Role::Owner));
        assert!(may_create_shipment(Role::MiamiOperator));
        assert!(may_create_shipment(Role::Sender));
        assert!(!may_create_shipment(Role::CubaOperator));
        assert!(!may_create_shipment(Role::Recipient));
    }

    #[test]
    fn test_listing_roles() {
        assert!(may_list_shipments(Role::Owner));
        assert!(may_list_shipments(Role::MiamiOperator));
        assert!(may_list_shipments(Role::CubaOperator));
        assert!(!may_list_shipments(Role::Sender));
        assert!(!may_list_shipments(Role::Recipient));
    }

    #[test]
    fn test_role_serde_names() {
        assert_eq!(
            serde_json::to_string(&Role::MiamiOperator).unwrap(),
            "\"miami_operator\""
        );
        let role: Role = serde_json::from_str("\"cuba_operator\"").unwrap();
        assert_eq!(role, Role::CubaOperator);
    }
}
