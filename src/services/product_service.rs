use uuid::Uuid;

use crate::{
    audit::log_audit,
    entity::{
        cart_items::{Column as CartCol, Entity as CartItems},
        categories::{Column as CatCol, Entity as Categories, Model as CategoryModel},
        order_items::{Column as OrderItemCol, Entity as OrderItems},
        products::{ActiveModel, Column, Entity as Products, Model as ProductModel},
        wishlist_items::{Column as WishlistCol, Entity as WishlistItems},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Category, Product, string_list, string_list_json},
    response::{ApiResponse, Meta},
    routes::params::{ProductQuery, ProductSortBy},
    state::AppState,
};
use crate::dto::products::{CreateProductRequest, ProductDetail, ProductList, UpdateProductRequest};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;

pub async fn list_products(
    state: &AppState,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = query.pagination.normalize();
    let mut condition = Condition::all();

    if let Some(search) = query.q.as_ref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search);
        condition = condition.add(
            Condition::any()
                .add(Expr::col((Products, Column::Name)).ilike(pattern.clone()))
                .add(Expr::col((Products, Column::Description)).ilike(pattern)),
        );
    }

    // A category filter matches the category itself and its direct children.
    if let Some(category_id) = query.category_id {
        let mut ids: Vec<Uuid> = Categories::find()
            .filter(CatCol::ParentId.eq(category_id))
            .all(&state.orm)
            .await?
            .into_iter()
            .map(|c| c.id)
            .collect();
        ids.push(category_id);
        condition = condition.add(Column::CategoryId.is_in(ids));
    }

    let mut finder = Products::find().filter(condition);
    finder = match query.sort_by {
        Some(ProductSortBy::PriceAsc) => finder.order_by_asc(Column::Price),
        Some(ProductSortBy::PriceDesc) => finder.order_by_desc(Column::Price),
        Some(ProductSortBy::NameAsc) => finder.order_by_asc(Column::Name),
        Some(ProductSortBy::NameDesc) => finder.order_by_desc(Column::Name),
        None => finder.order_by_desc(Column::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .find_also_related(Categories)
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|(product, category)| ProductDetail {
            product: product_from_entity(product),
            category: category.map(category_from_entity),
        })
        .collect();

    let meta = Meta::new(page, limit, total);
    let data = ProductList { items };
    Ok(ApiResponse::success("Products", data, Some(meta)))
}

pub async fn get_product(state: &AppState, id: Uuid) -> AppResult<ApiResponse<ProductDetail>> {
    let result = Products::find_by_id(id)
        .find_also_related(Categories)
        .one(&state.orm)
        .await?;
    let (product, category) = match result {
        Some(found) => found,
        None => return Err(AppError::NotFound),
    };

    let data = ProductDetail {
        product: product_from_entity(product),
        category: category.map(category_from_entity),
    };
    Ok(ApiResponse::success("Product", data, None))
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;

    if let Some(category_id) = payload.category_id {
        let category = Categories::find_by_id(category_id).one(&state.orm).await?;
        if category.is_none() {
            return Err(AppError::BadRequest("Category not found".into()));
        }
    }

    let id = Uuid::new_v4();
    let active = ActiveModel {
        id: Set(id),
        name: Set(payload.name),
        description: Set(payload.description),
        price: Set(payload.price),
        stock: Set(payload.stock),
        images: Set(string_list_json(&payload.images)),
        colors: Set(string_list_json(&payload.colors)),
        category_id: Set(payload.category_id),
        created_at: NotSet,
    };
    let product = active.insert(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "product_create",
        Some("products"),
        Some(serde_json::json!({ "product_id": product.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Product created",
        product_from_entity(product),
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(user)?;
    let existing = Products::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    if let Some(category_id) = payload.category_id {
        let category = Categories::find_by_id(category_id).one(&state.orm).await?;
        if category.is_none() {
            return Err(AppError::BadRequest("Category not found".into()));
        }
    }

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(description) = payload.description {
        active.description = Set(Some(description));
    }
    if let Some(price) = payload.price {
        active.price = Set(price);
    }
    if let Some(stock) = payload.stock {
        active.stock = Set(stock);
    }
    if let Some(images) = payload.images {
        active.images = Set(string_list_json(&images));
    }
    if let Some(colors) = payload.colors {
        active.colors = Set(string_list_json(&colors));
    }
    if let Some(category_id) = payload.category_id {
        active.category_id = Set(Some(category_id));
    }

    let product = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "product_update",
        Some("products"),
        Some(serde_json::json!({ "product_id": product.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Updated",
        product_from_entity(product),
        Some(Meta::empty()),
    ))
}

pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let txn = state.orm.begin().await?;

    let product = Products::find_by_id(id).one(&txn).await?;
    if product.is_none() {
        return Err(AppError::NotFound);
    }

    // Cart and wishlist references go away with the product; order history
    // must survive, so any referencing order item aborts the whole unit.
    CartItems::delete_many()
        .filter(CartCol::ProductId.eq(id))
        .exec(&txn)
        .await?;
    WishlistItems::delete_many()
        .filter(WishlistCol::ProductId.eq(id))
        .exec(&txn)
        .await?;

    let referenced = OrderItems::find()
        .filter(OrderItemCol::ProductId.eq(id))
        .count(&txn)
        .await?;
    if referenced > 0 {
        return Err(AppError::BadRequest(
            "Product has order history and cannot be deleted".into(),
        ));
    }

    Products::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "product_delete",
        Some("products"),
        Some(serde_json::json!({ "product_id": id })),
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

fn product_from_entity(model: ProductModel) -> Product {
    Product {
        id: model.id,
        name: model.name,
        description: model.description,
        price: model.price,
        stock: model.stock,
        images: string_list(&model.images),
        colors: string_list(&model.colors),
        category_id: model.category_id,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn category_from_entity(model: CategoryModel) -> Category {
    Category {
        id: model.id,
        name: model.name,
        parent_id: model.parent_id,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
