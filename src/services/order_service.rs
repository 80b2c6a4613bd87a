use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use sea_orm::ActiveValue::NotSet;
use uuid::Uuid;

use crate::{
    audit::log_audit,
    db::OrmConn,
    dto::orders::{
        AdminOrderList, AdminOrderRecord, OrderItemDetail, OrderList, OrderWithItems,
        PlaceOrderRequest, UpdateOrderStatusRequest,
    },
    entity::{
        cart_items::{Column as CartCol, Entity as CartItems},
        order_items::{
            ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems,
            Model as OrderItemModel,
        },
        orders::{
            ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel,
        },
        products::{Entity as Products, Model as ProductModel},
        users::{Entity as Users, Model as UserModel},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Order, OrderItem, Product, ROLE_ADMIN, UserPublic, string_list},
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    state::AppState,
};

pub async fn place_order(
    state: &AppState,
    user: &AuthUser,
    payload: PlaceOrderRequest,
) -> AppResult<ApiResponse<Order>> {
    let PlaceOrderRequest {
        address,
        customer_info,
        payment_method,
    } = payload;

    // Cart is read before the transaction; an empty cart never opens one.
    let rows = CartItems::find()
        .filter(CartCol::UserId.eq(user.user_id))
        .find_also_related(Products)
        .all(&state.orm)
        .await?;

    if rows.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".into()));
    }

    let address = customer_info
        .as_ref()
        .and_then(|info| info.address.clone())
        .or(address);
    let address = match address {
        Some(a) if !a.is_empty() => a,
        _ => return Err(AppError::BadRequest("Address is required".into())),
    };

    let mut total_amount: i64 = 0;
    let mut lines: Vec<(Uuid, i32, i64)> = Vec::with_capacity(rows.len());
    for (item, product) in &rows {
        let product = match product {
            Some(p) => p,
            None => return Err(AppError::BadRequest("Product no longer exists".into())),
        };
        if item.quantity <= 0 {
            return Err(AppError::BadRequest("Cart has invalid quantity".into()));
        }
        total_amount += product.price * (item.quantity as i64);
        lines.push((product.id, item.quantity, product.price));
    }

    let txn = state.orm.begin().await?;

    let order_id = Uuid::new_v4();
    let order = OrderActive {
        id: Set(order_id),
        user_id: Set(user.user_id),
        address: Set(address),
        customer_name: Set(customer_info.as_ref().and_then(|info| info.full_name.clone())),
        customer_phone: Set(customer_info.as_ref().and_then(|info| info.phone.clone())),
        customer_email: Set(customer_info.as_ref().and_then(|info| info.email.clone())),
        payment_method: Set(payment_method),
        total_amount: Set(total_amount),
        status: Set("PENDING".into()),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    // Each line freezes the product price at order time.
    for (product_id, quantity, price) in lines {
        OrderItemActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            product_id: Set(product_id),
            quantity: Set(quantity),
            price: Set(price),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;
    }

    CartItems::delete_many()
        .filter(CartCol::UserId.eq(user.user_id))
        .exec(&txn)
        .await?;

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "order_place",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "total_amount": order.total_amount })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Order placed",
        order_from_entity(order),
        Some(Meta::empty()),
    ))
}

pub async fn list_my_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination.normalize();
    let mut condition = Condition::all().add(OrderCol::UserId.eq(user.user_id));
    if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(OrderCol::Status.eq(status.clone()));
    }

    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let mut finder = Orders::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let mut items_by_order =
        load_items(&state.orm, orders.iter().map(|o| o.id).collect()).await?;

    let items = orders
        .into_iter()
        .map(|model| {
            let order = order_from_entity(model);
            let items = items_by_order.remove(&order.id).unwrap_or_default();
            OrderWithItems { order, items }
        })
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Orders", OrderList { items }, Some(meta)))
}

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = Orders::find_by_id(id).one(&state.orm).await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    if order.user_id != user.user_id && user.role != ROLE_ADMIN {
        return Err(AppError::Forbidden);
    }

    let mut items_by_order = load_items(&state.orm, vec![order.id]).await?;
    let order = order_from_entity(order);
    let items = items_by_order.remove(&order.id).unwrap_or_default();

    Ok(ApiResponse::success(
        "OK",
        OrderWithItems { order, items },
        Some(Meta::empty()),
    ))
}

pub async fn list_all_orders(
    state: &AppState,
    user: &AuthUser,
    query: OrderListQuery,
) -> AppResult<ApiResponse<AdminOrderList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = query.pagination.normalize();

    let mut condition = Condition::all();
    if let Some(status) = query.status.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(OrderCol::Status.eq(status.clone()));
    }

    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let mut finder = Orders::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(OrderCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let rows = finder
        .find_also_related(Users)
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let mut items_by_order =
        load_items(&state.orm, rows.iter().map(|(o, _)| o.id).collect()).await?;

    let items = rows
        .into_iter()
        .map(|(model, buyer)| {
            let order = order_from_entity(model);
            let items = items_by_order.remove(&order.id).unwrap_or_default();
            AdminOrderRecord {
                order,
                user: buyer.map(user_public_from_entity),
                items,
            }
        })
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Orders",
        AdminOrderList { items },
        Some(meta),
    ))
}

pub async fn update_order_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<Order>> {
    ensure_admin(user)?;
    validate_order_status(&payload.status)?;

    let existing = Orders::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let mut active: OrderActive = existing.into();
    active.status = Set(payload.status);
    active.updated_at = Set(Utc::now().into());
    let order = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "order_status_update",
        Some("orders"),
        Some(serde_json::json!({ "order_id": order.id, "status": order.status })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Order updated",
        order_from_entity(order),
        Some(Meta::empty()),
    ))
}

pub fn validate_order_status(status: &str) -> Result<(), AppError> {
    const VALID: [&str; 5] = ["PENDING", "PAID", "SHIPPED", "COMPLETED", "CANCELED"];
    if VALID.contains(&status) {
        Ok(())
    } else {
        Err(AppError::BadRequest("Invalid order status".into()))
    }
}

async fn load_items(
    conn: &OrmConn,
    order_ids: Vec<Uuid>,
) -> AppResult<HashMap<Uuid, Vec<OrderItemDetail>>> {
    let mut grouped: HashMap<Uuid, Vec<OrderItemDetail>> = HashMap::new();
    if order_ids.is_empty() {
        return Ok(grouped);
    }

    let rows = OrderItems::find()
        .filter(OrderItemCol::OrderId.is_in(order_ids))
        .find_also_related(Products)
        .all(conn)
        .await?;

    for (item, product) in rows {
        let detail = OrderItemDetail {
            item: order_item_from_entity(item),
            product: product.map(product_from_entity),
        };
        grouped
            .entry(detail.item.order_id)
            .or_default()
            .push(detail);
    }
    Ok(grouped)
}

fn order_from_entity(model: OrderModel) -> Order {
    Order {
        id: model.id,
        user_id: model.user_id,
        address: model.address,
        customer_name: model.customer_name,
        customer_phone: model.customer_phone,
        customer_email: model.customer_email,
        payment_method: model.payment_method,
        total_amount: model.total_amount,
        status: model.status,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}

fn order_item_from_entity(model: OrderItemModel) -> OrderItem {
    OrderItem {
        id: model.id,
        order_id: model.order_id,
        product_id: model.product_id,
        quantity: model.quantity,
        price: model.price,
        created_at: model.created_at.with_timezone(&Utc),
    }
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

fn user_public_from_entity(model: UserModel) -> UserPublic {
    UserPublic {
        id: model.id,
        email: model.email,
        full_name: model.full_name,
        role: model.role,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
