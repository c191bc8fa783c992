use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use primefire_db::seed;
use primefire_db::Migrator;

#[derive(Parser)]
#[command(name = "primefire-migrate")]
#[command(about = "Apply schema migrations and seed reference data")]
#[command(version)]
struct Cli {
    /// Target database.
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Apply every pending migration (default)")]
    Up {
        /// Stop after this migration id.
        #[arg(long)]
        to: Option<String>,
    },

    #[command(about = "Show which migrations are recorded in the ledger")]
    Status,

    #[command(about = "Seed roles, modules and default permissions into empty tables")]
    Seed,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "primefire_db=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let pool = primefire_db::create_pool(&cli.database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command.unwrap_or(Command::Up { to: None }) {
        Command::Up { to } => {
            let mut migrator = Migrator::standard()?;
            if let Some(id) = to {
                migrator = migrator.up_to(&id)?;
            }
            // The steps that ran are printed before any failure is reported.
            let (report, result) = migrator.run_reporting(&pool).await;
            println!("{report}");
            result?;
            println!("Migrations completed successfully");
        }
        Command::Status => {
            for status in Migrator::standard()?.status(&pool).await? {
                println!("{status}");
            }
        }
        Command::Seed => {
            for (target, outcome) in seed::seed_all(&pool).await? {
                println!("{}: {outcome}", target.table());
            }
            println!("Seeding completed successfully");
        }
    }

    Ok(())
}
