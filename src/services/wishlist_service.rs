use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    db::DbPool,
    dto::wishlist::{AddWishlistRequest, WishlistCheck, WishlistItemDto, WishlistList},
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::{Category, Product, WishlistItem, string_list},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
};

#[derive(FromRow)]
struct WishlistRow {
    wishlist_id: Uuid,
    product_id: Uuid,
    name: String,
    description: Option<String>,
    price: i64,
    stock: i32,
    images: serde_json::Value,
    colors: serde_json::Value,
    category_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    cat_name: Option<String>,
    cat_parent_id: Option<Uuid>,
    cat_created_at: Option<DateTime<Utc>>,
}

pub async fn list_wishlist(
    pool: &DbPool,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<WishlistList>> {
    let (page, limit, offset) = pagination.normalize();
    let rows = sqlx::query_as::<_, WishlistRow>(
        r#"
        SELECT w.id AS wishlist_id,
               p.id AS product_id, p.name, p.description, p.price, p.stock,
               p.images, p.colors, p.category_id, p.created_at,
               c.name AS cat_name, c.parent_id AS cat_parent_id, c.created_at AS cat_created_at
        FROM wishlist_items w
        JOIN products p ON p.id = w.product_id
        LEFT JOIN categories c ON c.id = p.category_id
        WHERE w.user_id = $1
        ORDER BY w.created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(user.user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM wishlist_items WHERE user_id = $1")
        .bind(user.user_id)
        .fetch_one(pool)
        .await?;

    let items = rows
        .into_iter()
        .map(|row| {
            let category = match (row.category_id, row.cat_name, row.cat_created_at) {
                (Some(id), Some(name), Some(created_at)) => Some(Category {
                    id,
                    name,
                    parent_id: row.cat_parent_id,
                    created_at,
                }),
                _ => None,
            };
            WishlistItemDto {
                id: row.wishlist_id,
                product: Product {
                    id: row.product_id,
                    name: row.name,
                    description: row.description,
                    price: row.price,
                    stock: row.stock,
                    images: string_list(&row.images),
                    colors: string_list(&row.colors),
                    category_id: row.category_id,
                    created_at: row.created_at,
                },
                category,
            }
        })
        .collect();

    let meta = Meta::new(page, limit, total.0);
    Ok(ApiResponse::success("OK", WishlistList { items }, Some(meta)))
}

pub async fn add_to_wishlist(
    pool: &DbPool,
    user: &AuthUser,
    payload: AddWishlistRequest,
) -> AppResult<ApiResponse<WishlistItem>> {
    let product_exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM products WHERE id = $1")
        .bind(payload.product_id)
        .fetch_optional(pool)
        .await?;

    if product_exists.is_none() {
        return Err(AppError::NotFound);
    }

    let existing: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM wishlist_items WHERE user_id = $1 AND product_id = $2")
            .bind(user.user_id)
            .bind(payload.product_id)
            .fetch_optional(pool)
            .await?;

    if existing.is_some() {
        return Err(AppError::BadRequest("Product already in wishlist".into()));
    }

    let item: WishlistItem = sqlx::query_as(
        r#"
        INSERT INTO wishlist_items (id, user_id, product_id)
        VALUES ($1, $2, $3)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user.user_id)
    .bind(payload.product_id)
    .fetch_one(pool)
    .await?;

    if let Err(err) = log_audit(
        pool,
        Some(user.user_id),
        "wishlist_add",
        Some("wishlist_items"),
        Some(serde_json::json!({ "product_id": payload.product_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Added to wishlist",
        item,
        Some(Meta::empty()),
    ))
}

pub async fn remove_from_wishlist(
    pool: &DbPool,
    user: &AuthUser,
    product_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = sqlx::query("DELETE FROM wishlist_items WHERE user_id = $1 AND product_id = $2")
        .bind(user.user_id)
        .bind(product_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = log_audit(
        pool,
        Some(user.user_id),
        "wishlist_remove",
        Some("wishlist_items"),
        Some(serde_json::json!({ "product_id": product_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Removed from wishlist",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

pub async fn check_wishlist(
    pool: &DbPool,
    user: &AuthUser,
    product_id: Uuid,
) -> AppResult<ApiResponse<WishlistCheck>> {
    let existing: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM wishlist_items WHERE user_id = $1 AND product_id = $2")
            .bind(user.user_id)
            .bind(product_id)
            .fetch_optional(pool)
            .await?;

    let data = WishlistCheck {
        is_in_wishlist: existing.is_some(),
    };
    Ok(ApiResponse::success("OK", data, None))
}
