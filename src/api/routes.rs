//! Declarative route table: every authenticated route with the roles it admits.

use crate::{
    api::{admin, auth, customer, delivery, restaurant, AppState},
    auth::RoleSet,
};
use axum::routing::{delete, get, patch, post, MethodRouter};

pub struct GatedRoute {
    pub path: &'static str,
    pub roles: RoleSet,
    pub handler: MethodRouter<AppState>,
}

fn gated(path: &'static str, roles: RoleSet, handler: MethodRouter<AppState>) -> GatedRoute {
    GatedRoute {
        path,
        roles,
        handler,
    }
}

pub fn gated_routes() -> Vec<GatedRoute> {
    vec![
        gated("/api/auth/me", RoleSet::ANY, get(auth::me)),
        // Customers
        gated(
            "/api/customers/browse-restaurants",
            RoleSet::CUSTOMER,
            get(customer::browse_restaurants),
        ),
        gated(
            "/api/customers/search-menus",
            RoleSet::CUSTOMER,
            get(customer::search_menus),
        ),
        gated(
            "/api/customers/place-order",
            RoleSet::CUSTOMER,
            post(customer::place_order),
        ),
        gated(
            "/api/customers/track-order/:order_id",
            RoleSet::CUSTOMER,
            get(customer::track_order),
        ),
        gated(
            "/api/customers/order-history",
            RoleSet::CUSTOMER,
            get(customer::order_history),
        ),
        // Restaurants
        gated(
            "/api/restaurants/menu",
            RoleSet::RESTAURANT,
            get(restaurant::list_menu).post(restaurant::add_menu_item),
        ),
        gated(
            "/api/restaurants/orders",
            RoleSet::RESTAURANT,
            get(restaurant::list_orders),
        ),
        gated(
            "/api/restaurants/update-order/:order_id",
            RoleSet::RESTAURANT,
            patch(restaurant::update_order),
        ),
        // Delivery
        gated(
            "/api/delivery/assigned-orders",
            RoleSet::DELIVERY,
            get(delivery::assigned_orders),
        ),
        gated(
            "/api/delivery/update-status/:order_id",
            RoleSet::DELIVERY,
            patch(delivery::update_status),
        ),
        // Administrators
        gated(
            "/api/admin/manage-users",
            RoleSet::ADMIN,
            get(admin::manage_users),
        ),
        gated(
            "/api/admin/update-user/:user_id",
            RoleSet::ADMIN,
            patch(admin::update_user),
        ),
        gated(
            "/api/admin/deactivate-user/:user_id",
            RoleSet::ADMIN,
            delete(admin::deactivate_user),
        ),
        gated(
            "/api/admin/view-orders",
            RoleSet::ADMIN,
            get(admin::view_orders),
        ),
        gated(
            "/api/admin/manage-order/:order_id",
            RoleSet::ADMIN,
            patch(admin::manage_order),
        ),
        gated(
            "/api/admin/generate-reports",
            RoleSet::ADMIN,
            get(admin::generate_reports),
        ),
        gated(
            "/api/admin/monitor-activity",
            RoleSet::ADMIN,
            get(admin::monitor_activity),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_paths_are_unique() {
        let routes = gated_routes();
        let paths: HashSet<_> = routes.iter().map(|r| r.path).collect();
        assert_eq!(paths.len(), routes.len());
    }

    #[test]
    fn test_prefix_matches_role() {
        for route in gated_routes() {
            let expected = if route.path.starts_with("/api/customers/") {
                RoleSet::CUSTOMER
            } else if route.path.starts_with("/api/restaurants/") {
                RoleSet::RESTAURANT
            } else if route.path.starts_with("/api/delivery/") {
                RoleSet::DELIVERY
            } else if route.path.starts_with("/api/admin/") {
                RoleSet::ADMIN
            } else {
                RoleSet::ANY
            };
            assert_eq!(route.roles, expected, "{}", route.path);
        }
    }
}
