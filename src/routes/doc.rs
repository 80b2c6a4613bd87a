use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{LoginRequest, LoginResponse, RegisterRequest},
        cart::{AddToCartRequest, CartItemDto, CartList, UpdateCartItemRequest},
        categories::{CategoryList, CategoryTree, CreateCategoryRequest, UpdateCategoryRequest},
        orders::{
            AdminOrderList, AdminOrderRecord, CustomerInfo, OrderItemDetail, OrderList,
            OrderWithItems, PlaceOrderRequest, UpdateOrderStatusRequest,
        },
        products::{CreateProductRequest, ProductDetail, ProductList, UpdateProductRequest},
        upload::{UploadedImage, UploadedImages},
        users::UserList,
        wishlist::{AddWishlistRequest, WishlistCheck, WishlistItemDto, WishlistList},
    },
    models::{CartItem, Category, Order, OrderItem, Product, UserPublic, WishlistItem},
    response::{ApiResponse, Meta},
    routes::{
        auth, cart, categories, health, orders, params, products as product_routes, upload, users,
        wishlist,
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::me,
        product_routes::list_products,
        product_routes::get_product,
        product_routes::create_product,
        product_routes::update_product,
        product_routes::delete_product,
        categories::list_categories,
        categories::create_category,
        categories::update_category,
        categories::delete_category,
        cart::cart_list,
        cart::add_to_cart,
        cart::update_cart_item,
        cart::remove_from_cart,
        cart::clear_cart,
        orders::place_order,
        orders::list_my_orders,
        orders::get_order,
        orders::list_all_orders,
        orders::update_order_status,
        wishlist::list_wishlist,
        wishlist::add_to_wishlist,
        wishlist::remove_from_wishlist,
        wishlist::check_wishlist,
        users::list_users,
        upload::upload_single,
        upload::upload_multiple,
        upload::delete_upload
    ),
    components(
        schemas(
            UserPublic,
            Category,
            Product,
            CartItem,
            Order,
            OrderItem,
            WishlistItem,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            CreateProductRequest,
            UpdateProductRequest,
            ProductDetail,
            ProductList,
            CreateCategoryRequest,
            UpdateCategoryRequest,
            CategoryTree,
            CategoryList,
            AddToCartRequest,
            UpdateCartItemRequest,
            CartItemDto,
            CartList,
            CustomerInfo,
            PlaceOrderRequest,
            UpdateOrderStatusRequest,
            OrderItemDetail,
            OrderWithItems,
            OrderList,
            AdminOrderRecord,
            AdminOrderList,
            AddWishlistRequest,
            WishlistItemDto,
            WishlistList,
            WishlistCheck,
            UserList,
            UploadedImage,
            UploadedImages,
            params::Pagination,
            params::ProductQuery,
            params::OrderListQuery,
            Meta,
            ApiResponse<UserPublic>,
            ApiResponse<LoginResponse>,
            ApiResponse<Product>,
            ApiResponse<ProductDetail>,
            ApiResponse<ProductList>,
            ApiResponse<CategoryList>,
            ApiResponse<CartList>,
            ApiResponse<Order>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>,
            ApiResponse<AdminOrderList>,
            ApiResponse<WishlistList>,
            ApiResponse<UserList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Products", description = "Product catalog endpoints"),
        (name = "Categories", description = "Category endpoints"),
        (name = "Cart", description = "Cart endpoints"),
        (name = "Orders", description = "Order endpoints"),
        (name = "Wishlist", description = "Wishlist endpoints"),
        (name = "Users", description = "User administration endpoints"),
        (name = "Upload", description = "Image upload endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
