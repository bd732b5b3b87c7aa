//! Order Access Filter
//!
//! Admins see and mutate every order; everyone else only their own.
//!
//! Deliberate contract: when a non-owner requests a specific order, the
//! answer is "not found" rather than "forbidden" — the existence of
//! someone else's order is never confirmed. The only place a 403 surfaces
//! is creating an order on behalf of another user.

use crate::auth::CurrentUser;
use shared::models::Order;

pub struct OrderAccess;

impl OrderAccess {
    /// May `user` see (and therefore mutate) this order?
    pub fn can_view(order: &Order, user: &CurrentUser) -> bool {
        user.is_admin() || order.user_id == user.id
    }

    /// May `user` create an order owned by `owner_id`?
    pub fn can_create_for(owner_id: i64, user: &CurrentUser) -> bool {
        user.is_admin() || owner_id == user.id
    }

    /// Owner filter for listings: `None` means unscoped (admin).
    pub fn list_scope(user: &CurrentUser) -> Option<i64> {
        if user.is_admin() {
            None
        } else {
            Some(user.id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{Address, ClientInfo, Role};

    fn user(id: i64, roles: &[Role]) -> CurrentUser {
        CurrentUser {
            id,
            username: format!("user{id}"),
            roles: roles.to_vec(),
        }
    }

    fn order_owned_by(user_id: i64) -> Order {
        Order {
            id: 1,
            user_id,
            client: ClientInfo {
                name: "c".into(),
                email: "c@example.com".into(),
                phone: "000".into(),
                address: Address {
                    street: "s".into(),
                    city: "c".into(),
                    zip: "z".into(),
                },
            },
            order_lines: vec![],
            total_items: 0,
            total: 0.0,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn owner_sees_own_order() {
        let order = order_owned_by(1);
        assert!(OrderAccess::can_view(&order, &user(1, &[Role::User])));
    }

    #[test]
    fn stranger_does_not_see_foreign_order() {
        let order = order_owned_by(1);
        assert!(!OrderAccess::can_view(&order, &user(2, &[Role::User])));
    }

    #[test]
    fn admin_sees_everything() {
        let order = order_owned_by(1);
        assert!(OrderAccess::can_view(&order, &user(99, &[Role::Admin])));
    }

    #[test]
    fn list_scope_is_unfiltered_only_for_admin() {
        assert_eq!(OrderAccess::list_scope(&user(2, &[Role::User])), Some(2));
        assert_eq!(OrderAccess::list_scope(&user(2, &[Role::Admin])), None);
    }

    #[test]
    fn create_for_other_user_requires_admin() {
        assert!(OrderAccess::can_create_for(1, &user(1, &[Role::User])));
        assert!(!OrderAccess::can_create_for(2, &user(1, &[Role::User])));
        assert!(OrderAccess::can_create_for(2, &user(1, &[Role::Admin])));
    }
}
