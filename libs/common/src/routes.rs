//! Admin dashboard destinations opened from notifications.

/// Orders list in the admin dashboard.
pub const ADMIN_ORDERS_PATH: &str = "/admin/orders";

/// Path (with query) of the admin view for an order, or the orders list.
///
/// The id is form-encoded the way `URLSearchParams` writes it.
pub fn admin_order_url(order_id: Option<&str>) -> String {
    match order_id.filter(|id| !id.is_empty()) {
        Some(id) => {
            let query = url::form_urlencoded::Serializer::new(String::new())
                .append_pair("orderId", id)
                .finish();
            format!("{ADMIN_ORDERS_PATH}?{query}")
        }
        None => ADMIN_ORDERS_PATH.to_string(),
    }
}
