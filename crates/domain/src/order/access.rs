use common::{AccountId, CallerContext};

/// What a caller is trying to do with an existing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderAction {
    Read,
    Delete,
}

impl std::fmt::Display for OrderAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderAction::Read => f.write_str("read"),
            OrderAction::Delete => f.write_str("delete"),
        }
    }
}

/// Who may read or delete an order.
///
/// Owners may always read and delete. Admins may always read; whether they
/// may delete orders they do not own is controlled by `admin_can_delete`,
/// which is off unless configured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccessPolicy {
    pub admin_can_delete: bool,
}

/// Outcome of an access check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Access {
    Granted,
    /// Report the order as absent.
    Hidden,
    /// The caller can see the order but the action is refused.
    Denied,
}

impl AccessPolicy {
    pub fn new(admin_can_delete: bool) -> Self {
        Self { admin_can_delete }
    }

    /// Returns true if `caller` may perform `action` on an order owned by `owner`.
    pub fn authorize(&self, caller: &CallerContext, owner: AccountId, action: OrderAction) -> bool {
        self.check(caller, owner, action) == Access::Granted
    }

    pub(crate) fn check(
        &self,
        caller: &CallerContext,
        owner: AccountId,
        action: OrderAction,
    ) -> Access {
        if caller.account_id == owner {
            return Access::Granted;
        }
        if !caller.is_admin() {
            return Access::Hidden;
        }
        match action {
            OrderAction::Read => Access::Granted,
            OrderAction::Delete if self.admin_can_delete => Access::Granted,
            OrderAction::Delete => Access::Denied,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::Role;

    const OWNER: AccountId = AccountId::new(8);

    fn customer(id: i64) -> CallerContext {
        CallerContext::new(AccountId::new(id), Role::Customer)
    }

    fn admin(id: i64) -> CallerContext {
        CallerContext::new(AccountId::new(id), Role::Admin)
    }

    #[test]
    fn owner_may_read_and_delete() {
        let policy = AccessPolicy::default();
        assert!(policy.authorize(&customer(8), OWNER, OrderAction::Read));
        assert!(policy.authorize(&customer(8), OWNER, OrderAction::Delete));
    }

    #[test]
    fn other_customer_is_hidden_from_both_actions() {
        let policy = AccessPolicy::new(true);
        assert_eq!(
            policy.check(&customer(7), OWNER, OrderAction::Read),
            Access::Hidden
        );
        assert_eq!(
            policy.check(&customer(7), OWNER, OrderAction::Delete),
            Access::Hidden
        );
    }

    #[test]
    fn admin_reads_but_only_deletes_when_enabled() {
        let strict = AccessPolicy::default();
        assert!(strict.authorize(&admin(1), OWNER, OrderAction::Read));
        assert_eq!(
            strict.check(&admin(1), OWNER, OrderAction::Delete),
            Access::Denied
        );

        let permissive = AccessPolicy::new(true);
        assert!(permissive.authorize(&admin(1), OWNER, OrderAction::Delete));
    }
}
