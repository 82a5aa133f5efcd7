use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use std::time::Duration;
use tracing::info;

use catalog_api::migrator::{run_migration, Migrator};

#[derive(Parser)]
#[command(
    name = "catalog-migrate",
    about = "Apply or roll back the catalog schema",
    version
)]
struct Cli {
    /// Database to migrate
    #[arg(
        long,
        env = "APP__DATABASE_URL",
        default_value = "sqlite://catalog.db?mode=rwc"
    )]
    database_url: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending migrations
    Up {
        #[arg(long)]
        steps: Option<u32>,
    },
    /// Roll back applied migrations
    Down {
        #[arg(long, default_value_t = 1)]
        steps: u32,
    },
    /// Show applied and pending migrations
    Status,
    /// Drop every table and re-apply all migrations
    Fresh,
}

async fn connect(url: &str) -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new(url.to_owned());
    options
        .max_connections(2)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(10))
        .acquire_timeout(Duration::from_secs(10))
        .sqlx_logging(false);
    Database::connect(options)
        .await
        .with_context(|| format!("failed to connect to {}", url))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Up { steps } => run_migration(&cli.database_url, steps).await?,
        Commands::Down { steps } => {
            let db = connect(&cli.database_url).await?;
            Migrator::down(&db, Some(steps))
                .await
                .context("rollback failed")?;
            info!(steps, "Rolled back migrations");
        }
        Commands::Status => {
            let db = connect(&cli.database_url).await?;
            Migrator::status(&db).await.context("status failed")?;
        }
        Commands::Fresh => {
            let db = connect(&cli.database_url).await?;
            Migrator::fresh(&db).await.context("fresh failed")?;
            info!("Schema recreated");
        }
    }

    Ok(())
}
