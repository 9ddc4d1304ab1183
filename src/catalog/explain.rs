//! Query plan of the statement behind a route.

use serde::Serialize;
use std::fmt::Write as _;
use std::time::Duration;

use super::{route::Route, Catalog};
use crate::diagnostics::{truncate_statement, ObservationScope};
use crate::error::RequestError;
use crate::storage::{inline_params, render_plan, PlanRow, ShopStorage};

const RULE_WIDTH: usize = 70;
const QUERY_PREVIEW_WIDTH: usize = 200;

/// The first statement a route runs, with its query plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteExplanation {
    /// Statement text with placeholders.
    pub statement: String,
    /// Values bound to the placeholders.
    pub params: Vec<String>,
    /// `EXPLAIN QUERY PLAN` rows.
    pub plan: Vec<PlanRow>,
    /// Time taken by one timed execution, when analyzed.
    pub elapsed: Option<Duration>,
}

impl RouteExplanation {
    /// Whether any step of the plan reads a whole table.
    #[must_use]
    pub fn has_full_scan(&self) -> bool {
        self.plan.iter().any(PlanRow::is_full_scan)
    }

    /// Human-readable plan report.
    #[must_use]
    pub fn render(&self) -> String {
        let heavy = "=".repeat(RULE_WIDTH);
        let light = "-".repeat(RULE_WIDTH);
        let query = inline_params(&self.statement, &self.params);

        let mut out = String::new();
        let _ = writeln!(out, "{heavy}");
        let _ = writeln!(out, "EXPLAIN QUERY PLAN OUTPUT");
        let _ = writeln!(out, "{heavy}");
        let _ = writeln!(
            out,
            "Query: {}",
            truncate_statement(&query, QUERY_PREVIEW_WIDTH)
        );
        let _ = writeln!(out, "{light}");
        out.push_str(&render_plan(&self.plan));
        let _ = writeln!(out, "{light}");
        if let Some(elapsed) = self.elapsed {
            let _ = writeln!(out, "Execution time: {:.3}ms", elapsed.as_secs_f64() * 1000.0);
            let _ = writeln!(out, "{light}");
        }
        out
    }
}

impl Catalog {
    /// Run `path` once and explain the first statement it executed.
    ///
    /// With `analyze`, that statement is also executed once more and timed.
    /// Returns `None` if the route ran no statements.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError`] if the path does not parse, the route fails,
    /// or the plan cannot be produced.
    pub async fn explain_route(
        &self,
        storage: &ShopStorage,
        path: &str,
        analyze: bool,
    ) -> Result<Option<RouteExplanation>, RequestError> {
        let route = Route::parse(path)?;
        let scope = ObservationScope::new();
        self.dispatch(&storage.observed(scope.clone()), route)
            .await?;

        let Some(first) = scope.snapshot().into_iter().next() else {
            return Ok(None);
        };

        let plan = storage.explain(&first.statement, &first.params).await?;
        let elapsed = if analyze {
            Some(storage.analyze(&first.statement, &first.params).await?)
        } else {
            None
        };
        Ok(Some(RouteExplanation {
            statement: first.statement,
            params: first.params,
            plan,
            elapsed,
        }))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::storage::core::tests::test_storage;
    use crate::test_utils::{create_test_product, seed_owner_and_category};

    #[tokio::test]
    async fn test_explain_recent_products_scans() {
        let storage = test_storage().await;
        let catalog = Catalog::default();

        let explanation = catalog
            .explain_route(&storage, "/products/recent/", false)
            .await
            .unwrap()
            .unwrap();

        assert!(explanation.statement.contains("created_at >= ?"));
        assert_eq!(explanation.params.len(), 1);
        assert!(explanation.has_full_scan());
    }

    #[tokio::test]
    async fn test_explain_product_detail_uses_primary_key() {
        let storage = test_storage().await;
        let (owner, category) = seed_owner_and_category(&storage).await;
        let product = create_test_product(&storage, "p", "1.00", category.id, owner.id).await;

        let explanation = Catalog::default()
            .explain_route(&storage, &format!("/products/{}/", product.id), false)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(explanation.params, vec![product.id.to_string()]);
        assert!(!explanation.has_full_scan());

        let rendered = explanation.render();
        assert!(rendered.contains("EXPLAIN QUERY PLAN OUTPUT"));
        assert!(rendered.contains(&format!("WHERE id = {}", product.id)));
        assert!(rendered.contains("QUERY PLAN\n"));
        assert!(explanation.elapsed.is_none());
        assert!(!rendered.contains("Execution time"));
    }

    #[tokio::test]
    async fn test_explain_with_analyze_reports_execution_time() {
        let storage = test_storage().await;
        let (owner, category) = seed_owner_and_category(&storage).await;
        create_test_product(&storage, "p", "1.00", category.id, owner.id).await;

        let explanation = Catalog::default()
            .explain_route(&storage, "/products/", true)
            .await
            .unwrap()
            .unwrap();

        assert!(explanation.elapsed.is_some());
        assert!(explanation.render().contains("Execution time: "));
    }

    #[test]
    fn test_render_execution_time_in_millis() {
        let explanation = RouteExplanation {
            statement: "SELECT 1".into(),
            params: vec![],
            plan: vec![],
            elapsed: Some(Duration::from_micros(1_500)),
        };

        assert!(explanation.render().contains("Execution time: 1.500ms\n"));
    }

    #[tokio::test]
    async fn test_explain_propagates_route_errors() {
        let storage = test_storage().await;
        let result = Catalog::default()
            .explain_route(&storage, "/orders/12/", false)
            .await;

        assert!(matches!(result, Err(RequestError::NotFound { .. })));
    }
}
