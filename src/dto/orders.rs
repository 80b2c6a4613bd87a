use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Order, OrderItem, Product, UserPublic};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CustomerInfo {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PlaceOrderRequest {
    pub address: Option<String>,
    pub customer_info: Option<CustomerInfo>,
    pub payment_method: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemDetail {
    pub item: OrderItem,
    pub product: Option<Product>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderWithItems {
    pub order: Order,
    pub items: Vec<OrderItemDetail>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<OrderWithItems>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminOrderRecord {
    pub order: Order,
    pub user: Option<UserPublic>,
    pub items: Vec<OrderItemDetail>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminOrderList {
    pub items: Vec<AdminOrderRecord>,
}
