use serde::Serialize;
use utoipa::ToSchema;

use crate::models::UserPublic;

#[derive(Debug, Serialize, ToSchema)]
pub struct UserList {
    pub items: Vec<UserPublic>,
}
