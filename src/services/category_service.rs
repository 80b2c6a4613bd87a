use std::collections::HashMap;

use uuid::Uuid;

use crate::{
    audit::log_audit,
    entity::categories::{ActiveModel, Column, Entity as Categories, Model as CategoryModel},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Category,
    response::{ApiResponse, Meta},
    state::AppState,
};
use crate::dto::categories::{
    CategoryList, CategoryTree, CreateCategoryRequest, UpdateCategoryRequest,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use sea_orm::ActiveValue::NotSet;

// One level of nesting only: top-level categories with their direct children.
pub async fn list_categories(state: &AppState) -> AppResult<ApiResponse<CategoryList>> {
    let all = Categories::find()
        .order_by_asc(Column::Name)
        .all(&state.orm)
        .await?;

    let mut children_by_parent: HashMap<Uuid, Vec<Category>> = HashMap::new();
    let mut roots: Vec<Category> = Vec::new();
    for model in all {
        let category = category_from_entity(model);
        match category.parent_id {
            Some(parent_id) => children_by_parent
                .entry(parent_id)
                .or_default()
                .push(category),
            None => roots.push(category),
        }
    }

    let items = roots
        .into_iter()
        .map(|category| {
            let children = children_by_parent.remove(&category.id).unwrap_or_default();
            CategoryTree { category, children }
        })
        .collect();

    Ok(ApiResponse::success(
        "Categories",
        CategoryList { items },
        None,
    ))
}

pub async fn create_category(
    state: &AppState,
    user: &AuthUser,
    payload: CreateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    ensure_admin(user)?;

    if let Some(parent_id) = payload.parent_id {
        let parent = Categories::find_by_id(parent_id).one(&state.orm).await?;
        if parent.is_none() {
            return Err(AppError::BadRequest("Parent category not found".into()));
        }
    }

    let id = Uuid::new_v4();
    let active = ActiveModel {
        id: Set(id),
        name: Set(payload.name),
        parent_id: Set(payload.parent_id),
        created_at: NotSet,
    };
    let category = active.insert(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "category_create",
        Some("categories"),
        Some(serde_json::json!({ "category_id": category.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Category created",
        category_from_entity(category),
        Some(Meta::empty()),
    ))
}

pub async fn update_category(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    ensure_admin(user)?;
    let existing = Categories::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(c) => c,
        None => return Err(AppError::NotFound),
    };

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(parent_id) = payload.parent_id {
        if let Some(pid) = parent_id {
            let parent = Categories::find_by_id(pid).one(&state.orm).await?;
            if parent.is_none() {
                return Err(AppError::BadRequest("Parent category not found".into()));
            }
        }
        active.parent_id = Set(parent_id);
    }

    let category = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "category_update",
        Some("categories"),
        Some(serde_json::json!({ "category_id": category.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Updated",
        category_from_entity(category),
        Some(Meta::empty()),
    ))
}

pub async fn delete_category(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = Categories::delete_by_id(id).exec(&state.orm).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "category_delete",
        Some("categories"),
        Some(serde_json::json!({ "category_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

fn category_from_entity(model: CategoryModel) -> Category {
    Category {
        id: model.id,
        name: model.name,
        parent_id: model.parent_id,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
