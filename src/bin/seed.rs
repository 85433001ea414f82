// Creates the first administrator account in an empty database

use taskboard::{auth::service::bootstrap_admin, db, store::PgStore};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    if let Err(err) = run().await {
        tracing::error!("Seed failed: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let database_url =
        std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set in environment")?;
    let password =
        std::env::var("ADMIN_PASSWORD").map_err(|_| "ADMIN_PASSWORD must be set in environment")?;
    let email = env_or("ADMIN_EMAIL", "admin@example.com");
    let name = env_or("ADMIN_NAME", "Admin User");

    let pool = db::create_pool(&database_url).await?;
    db::run_migrations(&pool).await?;
    let store = PgStore::new(pool);

    match bootstrap_admin(&store, &email, &password, &name).await? {
        Some(admin) => tracing::info!("Admin user created: email={}, user_id={}", admin.email, admin.id),
        None => tracing::info!("Users already exist. Skipping seed."),
    }

    Ok(())
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_string())
}
