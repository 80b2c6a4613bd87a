use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Category, Product};

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct AddWishlistRequest {
    pub product_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WishlistItemDto {
    pub id: Uuid,
    pub product: Product,
    pub category: Option<Category>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WishlistList {
    pub items: Vec<WishlistItemDto>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WishlistCheck {
    pub is_in_wishlist: bool,
}
