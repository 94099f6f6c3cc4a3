use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use canteen_api::{
    config::AppConfig,
    db::{create_orm_conn, create_pool, run_migrations},
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config.database_url).await?;
    run_migrations(&orm).await?;

    let pool = create_pool(&config.database_url).await?;

    let admin_id = ensure_user(&pool, "admin@canteen.test", "admin123", true, true).await?;
    let user_id = ensure_user(&pool, "user@canteen.test", "user123", false, false).await?;
    seed_menu(&pool).await?;

    println!("Seed completed. Admin ID: {admin_id}, User ID: {user_id}");
    Ok(())
}

async fn ensure_user(
    pool: &sqlx::PgPool,
    email: &str,
    password: &str,
    is_staff: bool,
    is_superuser: bool,
) -> anyhow::Result<Uuid> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let row: (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, password_hash, is_staff, is_superuser)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (email) DO UPDATE SET is_staff = EXCLUDED.is_staff,
                                          is_superuser = EXCLUDED.is_superuser
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(password_hash)
    .bind(is_staff)
    .bind(is_superuser)
    .fetch_one(pool)
    .await?;

    println!("Ensured user {email} (staff={is_staff}, superuser={is_superuser})");
    Ok(row.0)
}

async fn seed_menu(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let categories = vec!["Breakfast", "Lunch", "Drinks"];
    for name in &categories {
        sqlx::query("INSERT INTO categories (id, name) VALUES ($1, $2) ON CONFLICT (name) DO NOTHING")
            .bind(Uuid::new_v4())
            .bind(name)
            .execute(pool)
            .await?;
    }

    let items = vec![
        ("Chapati", "Breakfast", "Fresh chapati", "300.00"),
        ("Beans and Rice", "Lunch", "House plate of the day", "1500.00"),
        ("Brochette", "Lunch", "Grilled goat brochette", "2000.00"),
        ("African Tea", "Drinks", "Milk tea with ginger", "500.00"),
        ("Fanta Citron", "Drinks", "", "800.00"),
    ];

    for (name, category, description, price) in items {
        sqlx::query(
            r#"
            INSERT INTO items (id, category_id, name, description, price)
            SELECT $1, c.id, $2, $3, $4::numeric
            FROM categories c
            WHERE c.name = $5
              AND NOT EXISTS (SELECT 1 FROM items i WHERE i.name = $2)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(description)
        .bind(price)
        .bind(category)
        .execute(pool)
        .await?;
    }

    println!("Seeded menu");
    Ok(())
}
