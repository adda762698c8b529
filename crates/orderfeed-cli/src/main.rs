mod details;
mod job;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "orderfeed-cli")]
#[command(about = "orderfeed command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Run a job once, outside the server
    Job {
        #[command(subcommand)]
        command: job::JobCommands,
    },
    /// Inspect stored line item detail documents
    Details {
        #[command(subcommand)]
        command: details::DetailsCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check that the database is reachable
    Ping,
    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("orderfeed-cli: no command given; see --help");
        return Ok(());
    };

    let config = orderfeed_core::load_app_config_from_env()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = orderfeed_db::PoolConfig::from_app_config(&config);
    let pool = orderfeed_db::connect_pool(&config.database_url, pool_config).await?;

    match command {
        Commands::Db {
            command: DbCommands::Ping,
        } => {
            orderfeed_db::health_check(&pool).await?;
            println!("database ok");
        }
        Commands::Db {
            command: DbCommands::Migrate,
        } => {
            let applied = orderfeed_db::run_migrations(&pool).await?;
            println!("applied {applied} migration(s)");
        }
        Commands::Job {
            command: job::JobCommands::ReceiveLineItems { order_id },
        } => job::run_receive_line_items(pool, &config, &order_id).await?,
        Commands::Details {
            command: details::DetailsCommands::Show { order_id },
        } => details::run_details_show(&pool, &order_id).await?,
    }

    Ok(())
}
