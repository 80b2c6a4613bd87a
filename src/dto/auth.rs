use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Registration body. New accounts always get the CUSTOMER role.
#[derive(Deserialize, Debug, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct Claims {
    /// User id.
    pub sub: String,
    pub role: String,
    /// Expiry, unix seconds.
    pub exp: usize,
}
