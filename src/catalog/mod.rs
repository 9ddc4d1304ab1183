//! Catalog read surface.
//!
//! This module provides:
//! - [`Route`]: path parsing for the read endpoints
//! - [`Catalog`]: dispatch of a route against a storage handle
//! - [`RouteExplanation`]: query plan of the statement behind a route
//!
//! Responses are JSON values. Prices are rendered as decimal strings.
//!
//! # Example
//!
//! ```ignore
//! use shop_diagnostics::catalog::Catalog;
//! use shop_diagnostics::diagnostics::RequestDiagnostics;
//!
//! let catalog = Catalog::default();
//! let (body, report) = catalog
//!     .handle_request(&diagnostics, &storage, "/orders/dashboard/?status=shipped")
//!     .await;
//! ```

mod explain;
pub mod handlers;
mod route;

pub use explain::RouteExplanation;
pub use route::Route;

use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::diagnostics::RequestDiagnostics;
use crate::error::RequestError;
use crate::storage::ShopStorage;
use crate::traits::{RealTimeProvider, TimeProvider};

/// Dispatches read-surface routes.
#[derive(Clone)]
pub struct Catalog {
    clock: Arc<dyn TimeProvider>,
}

impl fmt::Debug for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Catalog").finish_non_exhaustive()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::with_clock(Arc::new(RealTimeProvider))
    }
}

impl Catalog {
    /// Create a catalog that reads "now" from `clock`.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn TimeProvider>) -> Self {
        Self { clock }
    }

    /// Run one route against `storage`.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::NotFound`] for a missing entity, or
    /// [`RequestError::Storage`] if the store fails.
    pub async fn dispatch(
        &self,
        storage: &ShopStorage,
        route: Route,
    ) -> Result<Value, RequestError> {
        match route {
            Route::ProductList => handlers::product_list(storage).await,
            Route::ProductDetail(id) => handlers::product_detail(storage, id).await,
            Route::RecentProducts => {
                handlers::recent_products(storage, self.clock.as_ref()).await
            }
            Route::OrderList => handlers::order_list(storage).await,
            Route::OrderDetail(id) => handlers::order_detail(storage, id).await,
            Route::OrderDashboard(status) => handlers::order_dashboard(storage, status).await,
            Route::CategoryProducts(id) => handlers::category_products(storage, id).await,
        }
    }

    /// Handle a `GET` of `path` under request diagnostics.
    ///
    /// Returns the response and, when diagnostics produced one, the SQL
    /// report. Paths that fail to parse run no statements and get no report.
    pub async fn handle_request(
        &self,
        diagnostics: &RequestDiagnostics,
        storage: &ShopStorage,
        path: &str,
    ) -> (Result<Value, RequestError>, Option<String>) {
        let route = match Route::parse(path) {
            Ok(route) => route,
            Err(e) => return (Err(e), None),
        };

        diagnostics
            .wrap_with_report("GET", path, storage, move |db| async move {
                self.dispatch(&db, route).await
            })
            .await
    }
}
