use jsonwebtoken::{DecodingKey, Validation, decode};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set, Statement};
use std::sync::Once;
use storefront_api::{
    db::{create_orm_conn, create_pool, run_migrations},
    dto::auth::{Claims, LoginRequest, RegisterRequest},
    entity::users::ActiveModel as UserActive,
    error::AppError,
    middleware::auth::AuthUser,
    models::{ROLE_ADMIN, ROLE_CUSTOMER},
    routes::params::Pagination,
    services::{auth_service, user_service},
    state::AppState,
};
use uuid::Uuid;

const TEST_SECRET: &str = "test-secret";

static INIT: Once = Once::new();

fn init_env() {
    INIT.call_once(|| unsafe { std::env::set_var("JWT_SECRET", TEST_SECRET) });
}

// Registration, login and the admin user listing against a real database.
#[tokio::test]
async fn register_login_and_list_users_flow() -> anyhow::Result<()> {
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
    init_env();

    let state = setup_state(&database_url).await?;

    let registered = auth_service::register_user(
        &state.pool,
        RegisterRequest {
            email: "shopper@example.com".into(),
            password: "hunter2hunter2".into(),
            full_name: "Sample Shopper".into(),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(registered.email, "shopper@example.com");
    assert_eq!(registered.full_name, "Sample Shopper");
    assert_eq!(registered.role, ROLE_CUSTOMER);

    // Same email again is a conflict, not an overwrite.
    let err = auth_service::register_user(
        &state.pool,
        RegisterRequest {
            email: "shopper@example.com".into(),
            password: "other-password".into(),
            full_name: "Someone Else".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let login = auth_service::login_user(
        &state.pool,
        LoginRequest {
            email: "shopper@example.com".into(),
            password: "hunter2hunter2".into(),
        },
    )
    .await?
    .data
    .unwrap();

    let decoded = decode::<Claims>(
        &login.token,
        &DecodingKey::from_secret(TEST_SECRET.as_bytes()),
        &Validation::default(),
    )?;
    assert_eq!(decoded.claims.sub, registered.id.to_string());
    assert_eq!(decoded.claims.role, ROLE_CUSTOMER);

    // Wrong password and unknown email fail the same way.
    let err = auth_service::login_user(
        &state.pool,
        LoginRequest {
            email: "shopper@example.com".into(),
            password: "wrong".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));

    let err = auth_service::login_user(
        &state.pool,
        LoginRequest {
            email: "nobody@example.com".into(),
            password: "hunter2hunter2".into(),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));

    let customer = AuthUser {
        user_id: registered.id,
        role: ROLE_CUSTOMER.into(),
    };
    let profile = auth_service::me(&state.pool, &customer).await?.data.unwrap();
    assert_eq!(profile.id, registered.id);
    assert_eq!(profile.email, "shopper@example.com");

    let ghost = AuthUser {
        user_id: Uuid::new_v4(),
        role: ROLE_CUSTOMER.into(),
    };
    let err = auth_service::me(&state.pool, &ghost).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    let admin = AuthUser {
        user_id: create_admin(&state, "admin@example.com").await?,
        role: ROLE_ADMIN.into(),
    };

    let users = user_service::list_users(&state.pool, &admin, default_page()).await?;
    assert_eq!(users.meta.as_ref().and_then(|m| m.total), Some(2));
    let users = users.data.unwrap();
    assert!(users.items.iter().any(|u| u.email == "shopper@example.com"));

    let err = user_service::list_users(&state.pool, &customer, default_page())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

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

async fn create_admin(state: &AppState, email: &str) -> anyhow::Result<Uuid> {
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        password_hash: Set("dummy".into()),
        full_name: Set("Store Admin".into()),
        role: Set(ROLE_ADMIN.into()),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(user.id)
}
