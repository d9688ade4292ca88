//! Role/ownership policy table, enforced at the command boundary.
//!
//! Aggregates stay auth-agnostic; every service operation runs its action
//! through these checks before dispatching. Two deliberate asymmetries:
//!
//! - Viewing an order you cannot see is `NotFound`, so probing requests
//!   cannot distinguish "does not exist" from "not yours".
//! - Attempting a mutation you are not allowed to make is `Forbidden` — the
//!   caller already holds a reference to the resource, so there is nothing
//!   left to hide and the denial is the useful signal.

use stackassign_auth::Actor;
use stackassign_core::{DomainError, UserId};
use stackassign_orders::OrderStatus;

/// Actions on an order, each with its own rule.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum OrderAction {
    View,
    EditContent,
    EditStatus,
    RecordPayment,
    AssignWriter,
    Cancel,
    Delete,
}

/// Authorize `actor` to perform `action` on the order owned by `owner` in
/// state `status`.
///
/// Self-service cancellation is allowed through here for owners in any
/// state: the lifecycle state machine is the authority on which states can
/// actually be cancelled, and its `InvalidTransition` answer is the one the
/// caller should see.
pub fn authorize_order(
    actor: Actor,
    action: OrderAction,
    owner: UserId,
    status: OrderStatus,
) -> Result<(), DomainError> {
    if actor.is_admin() {
        return Ok(());
    }

    let is_owner = actor.owns(owner);
    match action {
        OrderAction::View => {
            if is_owner {
                Ok(())
            } else {
                Err(DomainError::not_found())
            }
        }
        OrderAction::EditContent => {
            if !is_owner {
                return Err(DomainError::forbidden("access denied"));
            }
            if status != OrderStatus::Pending {
                return Err(DomainError::forbidden("can only update pending orders"));
            }
            Ok(())
        }
        OrderAction::Cancel => {
            if is_owner {
                Ok(())
            } else {
                Err(DomainError::forbidden("access denied"))
            }
        }
        OrderAction::EditStatus | OrderAction::RecordPayment | OrderAction::AssignWriter => {
            Err(DomainError::forbidden("admin privilege required"))
        }
        OrderAction::Delete => Err(DomainError::forbidden("admin privilege required")),
    }
}

/// Inquiry listing and mutation are back-office operations; an optional
/// submitter link grants no access. Creation is public and never checked.
pub fn authorize_inquiry_manage(actor: Actor) -> Result<(), DomainError> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(DomainError::forbidden("admin privilege required"))
    }
}

/// Publications are authored and published by the back office; the public
/// side only ever reads published entries.
pub fn authorize_publication_manage(actor: Actor) -> Result<(), DomainError> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(DomainError::forbidden("admin privilege required"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> UserId {
        UserId::new()
    }

    #[test]
    fn admin_may_do_everything() {
        let admin = Actor::admin(UserId::new());
        let owner = owner();

        for action in [
            OrderAction::View,
            OrderAction::EditContent,
            OrderAction::EditStatus,
            OrderAction::RecordPayment,
            OrderAction::AssignWriter,
            OrderAction::Cancel,
            OrderAction::Delete,
        ] {
            for status in [
                OrderStatus::Pending,
                OrderStatus::Completed,
                OrderStatus::Refunded,
            ] {
                assert!(authorize_order(admin, action, owner, status).is_ok());
            }
        }

        assert!(authorize_inquiry_manage(admin).is_ok());
        assert!(authorize_publication_manage(admin).is_ok());
    }

    #[test]
    fn non_owner_view_is_not_found() {
        let stranger = Actor::customer(UserId::new());
        let err = authorize_order(stranger, OrderAction::View, owner(), OrderStatus::Pending)
            .unwrap_err();
        assert_eq!(err, DomainError::NotFound);
    }

    #[test]
    fn non_owner_mutations_are_forbidden() {
        let stranger = Actor::customer(UserId::new());
        for action in [
            OrderAction::EditContent,
            OrderAction::EditStatus,
            OrderAction::Cancel,
            OrderAction::Delete,
        ] {
            let err = authorize_order(stranger, action, owner(), OrderStatus::Pending)
                .unwrap_err();
            assert!(matches!(err, DomainError::Forbidden(_)), "{action:?}");
        }
    }

    #[test]
    fn owner_edits_content_only_while_pending() {
        let owner_id = owner();
        let actor = Actor::customer(owner_id);

        assert!(
            authorize_order(actor, OrderAction::EditContent, owner_id, OrderStatus::Pending)
                .is_ok()
        );
        let err = authorize_order(
            actor,
            OrderAction::EditContent,
            owner_id,
            OrderStatus::Confirmed,
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[test]
    fn owner_never_touches_status_payment_or_writer() {
        let owner_id = owner();
        let actor = Actor::customer(owner_id);

        for action in [
            OrderAction::EditStatus,
            OrderAction::RecordPayment,
            OrderAction::AssignWriter,
            OrderAction::Delete,
        ] {
            assert!(
                authorize_order(actor, action, owner_id, OrderStatus::Pending).is_err(),
                "{action:?}"
            );
        }
    }

    #[test]
    fn owner_cancel_passes_policy_in_any_state() {
        // The state machine, not the policy, decides which states cancel.
        let owner_id = owner();
        let actor = Actor::customer(owner_id);

        for status in [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::Completed,
        ] {
            assert!(authorize_order(actor, OrderAction::Cancel, owner_id, status).is_ok());
        }
    }

    #[test]
    fn customers_cannot_manage_inquiries_or_publications() {
        let customer = Actor::customer(UserId::new());
        assert!(authorize_inquiry_manage(customer).is_err());
        assert!(authorize_publication_manage(customer).is_err());
    }
}
