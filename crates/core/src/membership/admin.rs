//! Admin-count and self-action guards for member management.
//!
//! A trip must retain at least one active admin at all times, and admins
//! cannot remove or demote themselves through the member-management
//! path. The guards are pure functions over the trip's member rows; the
//! repository re-runs them under row locks before mutating.

use rust_decimal::Decimal;

use patungan_shared::types::UserId;

use super::error::MembershipError;
use super::types::{ActiveMember, MemberRole};

/// Stateless guards protecting membership invariants.
pub struct MemberGuard;

impl MemberGuard {
    /// Counts the active admins among the given members.
    #[must_use]
    pub fn active_admin_count(members: &[ActiveMember]) -> usize {
        members
            .iter()
            .filter(|m| m.is_active && m.role == MemberRole::Admin)
            .count()
    }

    /// Ensures removing or demoting `target` leaves the trip with at
    /// least one active admin.
    ///
    /// # Errors
    ///
    /// Returns `LastAdmin` if the target is the only remaining active
    /// admin.
    pub fn ensure_admin_remains(
        members: &[ActiveMember],
        target: &ActiveMember,
    ) -> Result<(), MembershipError> {
        if target.role != MemberRole::Admin || !target.is_active {
            return Ok(());
        }
        let remaining = members
            .iter()
            .filter(|m| m.is_active && m.role == MemberRole::Admin && m.member_id != target.member_id)
            .count();
        if remaining == 0 {
            return Err(MembershipError::LastAdmin);
        }
        Ok(())
    }

    /// Ensures the acting user is not managing their own member row.
    ///
    /// # Errors
    ///
    /// Returns `SelfAdminAction` if `target` belongs to the actor.
    pub fn ensure_not_self(
        actor: UserId,
        target: &ActiveMember,
    ) -> Result<(), MembershipError> {
        if target.user_id == Some(actor) {
            return Err(MembershipError::SelfAdminAction);
        }
        Ok(())
    }

    /// Validates a fund-pool contribution amount.
    ///
    /// # Errors
    ///
    /// Returns `NegativeContribution` for amounts below zero.
    pub fn validate_contribution(amount: Decimal) -> Result<(), MembershipError> {
        if amount < Decimal::ZERO {
            return Err(MembershipError::NegativeContribution);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use patungan_shared::types::MemberId;
    use rust_decimal_macros::dec;

    fn member(role: MemberRole, is_active: bool) -> ActiveMember {
        ActiveMember {
            member_id: MemberId::new(),
            user_id: Some(UserId::new()),
            role,
            is_active,
        }
    }

    #[test]
    fn test_admin_count_ignores_inactive() {
        let members = vec![
            member(MemberRole::Admin, true),
            member(MemberRole::Admin, false),
            member(MemberRole::Member, true),
        ];
        assert_eq!(MemberGuard::active_admin_count(&members), 1);
    }

    #[test]
    fn test_last_admin_cannot_be_removed() {
        let admin = member(MemberRole::Admin, true);
        let members = vec![admin.clone(), member(MemberRole::Member, true)];
        let result = MemberGuard::ensure_admin_remains(&members, &admin);
        assert!(matches!(result, Err(MembershipError::LastAdmin)));
    }

    #[test]
    fn test_admin_removable_when_another_remains() {
        let first = member(MemberRole::Admin, true);
        let second = member(MemberRole::Admin, true);
        let members = vec![first.clone(), second];
        assert!(MemberGuard::ensure_admin_remains(&members, &first).is_ok());
    }

    #[test]
    fn test_plain_member_never_trips_the_guard() {
        let target = member(MemberRole::Member, true);
        let members = vec![member(MemberRole::Admin, true), target.clone()];
        assert!(MemberGuard::ensure_admin_remains(&members, &target).is_ok());
    }

    #[test]
    fn test_inactive_admin_does_not_count_as_remaining() {
        let active_admin = member(MemberRole::Admin, true);
        let inactive_admin = member(MemberRole::Admin, false);
        let members = vec![active_admin.clone(), inactive_admin];
        let result = MemberGuard::ensure_admin_remains(&members, &active_admin);
        assert!(matches!(result, Err(MembershipError::LastAdmin)));
    }

    #[test]
    fn test_self_action_rejected() {
        let target = member(MemberRole::Admin, true);
        let actor = target.user_id.unwrap();
        assert!(matches!(
            MemberGuard::ensure_not_self(actor, &target),
            Err(MembershipError::SelfAdminAction)
        ));
    }

    #[test]
    fn test_other_target_allowed_and_virtual_targets_never_self() {
        let target = member(MemberRole::Member, true);
        assert!(MemberGuard::ensure_not_self(UserId::new(), &target).is_ok());

        let virtual_target = ActiveMember {
            user_id: None,
            ..member(MemberRole::Member, true)
        };
        assert!(MemberGuard::ensure_not_self(UserId::new(), &virtual_target).is_ok());
    }

    #[test]
    fn test_contribution_validation() {
        assert!(MemberGuard::validate_contribution(dec!(0)).is_ok());
        assert!(MemberGuard::validate_contribution(dec!(150.25)).is_ok());
        assert!(matches!(
            MemberGuard::validate_contribution(dec!(-0.01)),
            Err(MembershipError::NegativeContribution)
        ));
    }
}
