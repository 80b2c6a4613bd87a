use crate::{
    db::DbPool,
    dto::users::UserList,
    error::AppResult,
    middleware::auth::{AuthUser, ensure_admin},
    models::UserPublic,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
};

pub async fn list_users(
    pool: &DbPool,
    user: &AuthUser,
    pagination: Pagination,
) -> AppResult<ApiResponse<UserList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = pagination.normalize();

    let items = sqlx::query_as::<_, UserPublic>(
        r#"
        SELECT id, email, full_name, role, created_at
        FROM users
        ORDER BY created_at DESC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;

    let meta = Meta::new(page, limit, total.0);
    Ok(ApiResponse::success("Users", UserList { items }, Some(meta)))
}
