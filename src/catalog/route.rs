//! Path routing for the read surface.

use crate::error::RequestError;
use crate::storage::OrderStatus;

/// A read-surface route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// `/products/`
    ProductList,
    /// `/products/<id>/`
    ProductDetail(i64),
    /// `/products/recent/`
    RecentProducts,
    /// `/orders/`
    OrderList,
    /// `/orders/<id>/`
    OrderDetail(i64),
    /// `/orders/dashboard/[?status=s]`
    OrderDashboard(Option<OrderStatus>),
    /// `/categories/<id>/products/`
    CategoryProducts(i64),
}

impl Route {
    /// Parse a request path, with optional query string.
    ///
    /// Leading and trailing slashes are optional.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::UnknownRoute`] if no route matches, or
    /// [`RequestError::InvalidParameter`] for a malformed id or status.
    pub fn parse(path: &str) -> Result<Self, RequestError> {
        let (path_part, query) = path.split_once('?').unwrap_or((path, ""));
        let segments: Vec<&str> = path_part.split('/').filter(|s| !s.is_empty()).collect();

        let route = match segments.as_slice() {
            ["products"] => Self::ProductList,
            ["products", "recent"] => Self::RecentProducts,
            ["products", id] => Self::ProductDetail(parse_id(id)?),
            ["orders"] => Self::OrderList,
            ["orders", "dashboard"] => Self::OrderDashboard(parse_status(query)?),
            ["orders", id] => Self::OrderDetail(parse_id(id)?),
            ["categories", id, "products"] => Self::CategoryProducts(parse_id(id)?),
            _ => {
                return Err(RequestError::UnknownRoute {
                    path: path.to_string(),
                })
            }
        };

        Ok(route)
    }
}

fn parse_id(raw: &str) -> Result<i64, RequestError> {
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| RequestError::InvalidParameter {
            name: "id".to_string(),
            value: raw.to_string(),
        })
}

fn parse_status(query: &str) -> Result<Option<OrderStatus>, RequestError> {
    let value = query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == "status")
        .map(|(_, value)| value);

    match value {
        None | Some("") => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| RequestError::InvalidParameter {
                name: "status".to_string(),
                value: raw.to_string(),
            }),
    }
}
