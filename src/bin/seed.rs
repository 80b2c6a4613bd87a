use argon2::{
    Argon2, PasswordHasher,
    password_hash::{rand_core::OsRng, SaltString},
};
use serde_json::json;
use storefront_api::{
    config::AppConfig,
    db::create_pool,
    models::{ROLE_ADMIN, ROLE_CUSTOMER},
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    let admin_id = ensure_user_with_role(
        &pool,
        "admin@example.com",
        "admin123",
        "Store Admin",
        ROLE_ADMIN,
    )
    .await?;
    let customer_id = ensure_user_with_role(
        &pool,
        "customer@example.com",
        "customer123",
        "Sample Customer",
        ROLE_CUSTOMER,
    )
    .await?;

    let apparel = ensure_category(&pool, "Apparel", None).await?;
    let hoodies = ensure_category(&pool, "Hoodies", Some(apparel)).await?;
    let accessories = ensure_category(&pool, "Accessories", None).await?;

    seed_products(&pool, hoodies, accessories).await?;

    println!("Seed completed. Admin ID: {admin_id}, Customer ID: {customer_id}");
    Ok(())
}

async fn ensure_user_with_role(
    pool: &sqlx::PgPool,
    email: &str,
    password: &str,
    full_name: &str,
    role: &str,
) -> anyhow::Result<Uuid> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let (user_id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, password_hash, full_name, role)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (email) DO UPDATE SET full_name = EXCLUDED.full_name, role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(password_hash)
    .bind(full_name)
    .bind(role)
    .fetch_one(pool)
    .await?;

    println!("Ensured user {email} (role={role})");
    Ok(user_id)
}

async fn ensure_category(
    pool: &sqlx::PgPool,
    name: &str,
    parent_id: Option<Uuid>,
) -> anyhow::Result<Uuid> {
    // Category names carry no unique constraint, so look before inserting.
    let existing: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM categories WHERE name = $1")
        .bind(name)
        .fetch_optional(pool)
        .await?;
    if let Some((id,)) = existing {
        return Ok(id);
    }

    let (id,): (Uuid,) = sqlx::query_as(
        "INSERT INTO categories (id, name, parent_id) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(parent_id)
    .fetch_one(pool)
    .await?;

    println!("Ensured category {name}");
    Ok(id)
}

async fn seed_products(
    pool: &sqlx::PgPool,
    hoodies: Uuid,
    accessories: Uuid,
) -> anyhow::Result<()> {
    let products = vec![
        (
            "Classic Hoodie",
            "Heavyweight cotton hoodie",
            550_000_i64,
            50,
            Some(hoodies),
            json!(["/uploads/classic-hoodie.jpg"]),
            json!(["black", "navy"]),
        ),
        (
            "Canvas Tote",
            "Everyday carry tote bag",
            120_000_i64,
            100,
            Some(accessories),
            json!([]),
            json!(["natural"]),
        ),
        (
            "Enamel Mug",
            "Double-walled camping mug",
            95_000_i64,
            200,
            Some(accessories),
            json!([]),
            json!([]),
        ),
        (
            "Sticker Pack",
            "Assorted vinyl stickers",
            50_000_i64,
            300,
            None,
            json!([]),
            json!([]),
        ),
    ];

    for (name, desc, price, stock, category_id, images, colors) in products {
        let existing: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM products WHERE name = $1")
            .bind(name)
            .fetch_optional(pool)
            .await?;
        if existing.is_some() {
            continue;
        }

        sqlx::query(
            r#"
            INSERT INTO products (id, name, description, price, stock, images, colors, category_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(desc)
        .bind(price)
        .bind(stock)
        .bind(images)
        .bind(colors)
        .bind(category_id)
        .execute(pool)
        .await?;
    }

    println!("Seeded products");
    Ok(())
}
