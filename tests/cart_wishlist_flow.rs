use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set, Statement};
use serde_json::json;
use storefront_api::{
    db::{create_orm_conn, create_pool, run_migrations},
    dto::{
        cart::{AddToCartRequest, UpdateCartItemRequest},
        wishlist::AddWishlistRequest,
    },
    entity::{
        categories::ActiveModel as CategoryActive,
        products::{ActiveModel as ProductActive, Model as ProductModel},
        users::ActiveModel as UserActive,
    },
    error::AppError,
    middleware::auth::AuthUser,
    models::ROLE_CUSTOMER,
    routes::params::Pagination,
    services::{cart_service, wishlist_service},
    state::AppState,
};
use uuid::Uuid;

// Cart keeps one row per product and accumulates quantity; the wishlist is a
// plain membership set with its own lookups.
#[tokio::test]
async fn cart_accumulates_and_wishlist_tracks_membership() -> anyhow::Result<()> {
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(());
        }
    };

    let state = setup_state(&database_url).await?;

    let customer = AuthUser {
        user_id: create_user(&state, "customer@example.com").await?,
        role: ROLE_CUSTOMER.into(),
    };

    let category = CategoryActive {
        id: Set(Uuid::new_v4()),
        name: Set("Mugs".into()),
        parent_id: Set(None),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    let mug = create_product(&state, "Enamel Mug", 95_000, Some(category.id)).await?;
    let tote = create_product(&state, "Canvas Tote", 120_000, None).await?;

    // Omitted quantity defaults to one.
    let added = cart_service::add_to_cart(
        &state.pool,
        &customer,
        AddToCartRequest {
            product_id: mug.id,
            quantity: None,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(added.quantity, 1);

    // Adding the same product again accumulates instead of duplicating.
    let added = cart_service::add_to_cart(
        &state.pool,
        &customer,
        AddToCartRequest {
            product_id: mug.id,
            quantity: Some(2),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(added.quantity, 3);

    let cart = cart_service::list_cart(&state.pool, &customer, default_page())
        .await?
        .data
        .unwrap();
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].quantity, 3);
    assert_eq!(cart.items[0].product.name, "Enamel Mug");

    let err = cart_service::add_to_cart(
        &state.pool,
        &customer,
        AddToCartRequest {
            product_id: Uuid::new_v4(),
            quantity: Some(1),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let err = cart_service::add_to_cart(
        &state.pool,
        &customer,
        AddToCartRequest {
            product_id: mug.id,
            quantity: Some(0),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    // PUT semantics: the quantity is set, not added.
    let updated = cart_service::update_cart_item(
        &state.pool,
        &customer,
        mug.id,
        UpdateCartItemRequest { quantity: 5 },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(updated.quantity, 5);

    let err = cart_service::update_cart_item(
        &state.pool,
        &customer,
        mug.id,
        UpdateCartItemRequest { quantity: 0 },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let err = cart_service::update_cart_item(
        &state.pool,
        &customer,
        Uuid::new_v4(),
        UpdateCartItemRequest { quantity: 1 },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    cart_service::add_to_cart(
        &state.pool,
        &customer,
        AddToCartRequest {
            product_id: tote.id,
            quantity: Some(1),
        },
    )
    .await?;
    let cart = cart_service::list_cart(&state.pool, &customer, default_page())
        .await?
        .data
        .unwrap();
    assert_eq!(cart.items.len(), 2);

    cart_service::remove_from_cart(&state.pool, &customer, tote.id).await?;
    let err = cart_service::remove_from_cart(&state.pool, &customer, tote.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    cart_service::clear_cart(&state.pool, &customer).await?;
    let cart = cart_service::list_cart(&state.pool, &customer, default_page())
        .await?
        .data
        .unwrap();
    assert!(cart.items.is_empty());

    // Wishlist round.
    wishlist_service::add_to_wishlist(
        &state.pool,
        &customer,
        AddWishlistRequest { product_id: mug.id },
    )
    .await?;

    let err = wishlist_service::add_to_wishlist(
        &state.pool,
        &customer,
        AddWishlistRequest { product_id: mug.id },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    let err = wishlist_service::add_to_wishlist(
        &state.pool,
        &customer,
        AddWishlistRequest {
            product_id: Uuid::new_v4(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    let check = wishlist_service::check_wishlist(&state.pool, &customer, mug.id).await?;
    assert!(check.data.unwrap().is_in_wishlist);
    let check = wishlist_service::check_wishlist(&state.pool, &customer, tote.id).await?;
    assert!(!check.data.unwrap().is_in_wishlist);

    let wishlist = wishlist_service::list_wishlist(&state.pool, &customer, default_page())
        .await?
        .data
        .unwrap();
    assert_eq!(wishlist.items.len(), 1);
    assert_eq!(wishlist.items[0].product.name, "Enamel Mug");
    assert_eq!(
        wishlist.items[0].category.as_ref().map(|c| c.name.as_str()),
        Some("Mugs")
    );

    wishlist_service::remove_from_wishlist(&state.pool, &customer, mug.id).await?;
    let check = wishlist_service::check_wishlist(&state.pool, &customer, mug.id).await?;
    assert!(!check.data.unwrap().is_in_wishlist);
    let err = wishlist_service::remove_from_wishlist(&state.pool, &customer, mug.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    Ok(())
}

fn default_page() -> Pagination {
    Pagination {
        page: None,
        per_page: None,
    }
}

async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let pool = create_pool(database_url).await?;
    let orm = create_orm_conn(&pool);
    run_migrations(&orm).await?;

    // Clean tables between runs
    let backend = orm.get_database_backend();
    orm.execute(Statement::from_string(
        backend,
        "TRUNCATE TABLE order_items, orders, cart_items, wishlist_items, audit_logs, products, categories, users RESTART IDENTITY CASCADE",
    ))
    .await?;

    Ok(AppState {
        pool,
        orm,
        upload_dir: std::env::temp_dir(),
    })
}

async fn create_user(state: &AppState, email: &str) -> anyhow::Result<Uuid> {
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        password_hash: Set("dummy".into()),
        full_name: Set("Test User".into()),
        role: Set(ROLE_CUSTOMER.into()),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(user.id)
}

async fn create_product(
    state: &AppState,
    name: &str,
    price: i64,
    category_id: Option<Uuid>,
) -> anyhow::Result<ProductModel> {
    let product = ProductActive {
        id: Set(Uuid::new_v4()),
        name: Set(name.into()),
        description: Set(Some("A product for testing".into())),
        price: Set(price),
        stock: Set(10),
        images: Set(json!([])),
        colors: Set(json!([])),
        category_id: Set(category_id),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(product)
}
