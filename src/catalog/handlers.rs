//! Read-surface handlers.
//!
//! Each handler loads a parent collection and then looks up related rows one
//! at a time. That is the access pattern the diagnostics recorder exists to
//! expose, so it is kept as is.

use chrono::Duration;
use serde_json::{json, Value};

use crate::error::RequestError;
use crate::storage::{OrderStatus, ShopStorage};
use crate::traits::TimeProvider;

/// Orders shown by the order list.
pub const ORDER_LIST_LIMIT: u32 = 50;

/// Age limit for the recent products listing.
pub const RECENT_PRODUCT_DAYS: i64 = 7;

/// `/products/`
pub async fn product_list(storage: &ShopStorage) -> Result<Value, RequestError> {
    let mut data = Vec::new();
    for product in storage.list_products().await? {
        let category = storage.require_category(product.category_id).await?;
        let owner = storage.require_user(product.owner_id).await?;
        data.push(json!({
            "id": product.id,
            "name": product.name,
            "price": product.price.to_string(),
            "category": category.name,
            "created_by": owner.username,
        }));
    }

    Ok(json!({ "products": data }))
}

/// `/products/<id>/`
pub async fn product_detail(storage: &ShopStorage, id: i64) -> Result<Value, RequestError> {
    let product = storage.require_product(id).await?;
    let breadcrumb = storage.category_path(product.category_id).await?;
    let owner = storage.require_user(product.owner_id).await?;

    Ok(json!({
        "id": product.id,
        "name": product.name,
        "description": product.description,
        "price": product.price.to_string(),
        "category_breadcrumb": breadcrumb.join(" > "),
        "created_by": owner.username,
    }))
}

/// `/products/recent/`
pub async fn recent_products(
    storage: &ShopStorage,
    clock: &dyn TimeProvider,
) -> Result<Value, RequestError> {
    let since = clock.now() - Duration::days(RECENT_PRODUCT_DAYS);

    let data: Vec<Value> = storage
        .products_created_since(since)
        .await?
        .into_iter()
        .map(|product| {
            json!({
                "id": product.id,
                "name": product.name,
                "created_at": product.created_at.to_rfc3339(),
            })
        })
        .collect();

    Ok(json!({ "products": data }))
}

/// `/orders/`
pub async fn order_list(storage: &ShopStorage) -> Result<Value, RequestError> {
    let mut data = Vec::new();
    for order in storage.list_recent_orders(ORDER_LIST_LIMIT).await? {
        let user = storage.require_user(order.user_id).await?;
        data.push(json!({
            "id": order.id,
            "user": user.username,
            "status": order.status,
            "created_at": order.created_at.to_rfc3339(),
        }));
    }

    Ok(json!({ "orders": data }))
}

/// `/orders/<id>/`
pub async fn order_detail(storage: &ShopStorage, id: i64) -> Result<Value, RequestError> {
    let order = storage.require_order(id).await?;
    let user = storage.require_user(order.user_id).await?;

    let mut items = Vec::new();
    for item in storage.order_items(order.id).await? {
        let product = storage.require_product(item.product_id).await?;
        let category = storage.require_category(product.category_id).await?;
        items.push(json!({
            "product": product.name,
            "category": category.name,
            "quantity": item.quantity,
            "price": item.price.to_string(),
            "subtotal": item.subtotal().to_string(),
        }));
    }
    let total = storage.order_total(order.id).await?;

    Ok(json!({
        "id": order.id,
        "user": user.username,
        "status": order.status,
        "items": items,
        "total": total.to_string(),
    }))
}

/// `/orders/dashboard/[?status=s]`
pub async fn order_dashboard(
    storage: &ShopStorage,
    status: Option<OrderStatus>,
) -> Result<Value, RequestError> {
    let mut data = Vec::new();
    for order in storage.list_orders(status).await? {
        let user = storage.require_user(order.user_id).await?;

        let mut items = Vec::new();
        for item in storage.order_items(order.id).await? {
            let product = storage.require_product(item.product_id).await?;
            items.push(json!({
                "product": product.name,
                "quantity": item.quantity,
            }));
        }
        let total = storage.order_total(order.id).await?;

        data.push(json!({
            "id": order.id,
            "user": user.username,
            "status": order.status,
            "item_count": items.len(),
            "items": items,
            "total": total.to_string(),
        }));
    }

    Ok(json!({ "orders": data }))
}

/// `/categories/<id>/products/`
pub async fn category_products(storage: &ShopStorage, id: i64) -> Result<Value, RequestError> {
    let category = storage.require_category(id).await?;

    let mut data = Vec::new();
    for product in storage.products_in_category(category.id).await? {
        let owner = storage.require_user(product.owner_id).await?;
        data.push(json!({
            "id": product.id,
            "name": product.name,
            "price": product.price.to_string(),
            "created_by": owner.username,
        }));
    }

    Ok(json!({
        "category": category.name,
        "products": data,
    }))
}
