use admin_panel_api::db::{create_orm_conn, run_migrations};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL")?;
    let orm = create_orm_conn(&database_url).await?;
    let applied = run_migrations(&orm, "migrations").await?;
    println!("Migrations applied: {applied} file(s)");
    Ok(())
}
