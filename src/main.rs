//! gamestore CLI - video game inventory server

use clap::{Parser, Subcommand};
use gamestore::routes::{self, AppState};
use gamestore::{seed, Config, Entity, Game, Genre, Inventory, Platform};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "gamestore")]
#[command(about = "A video game inventory backed by markdown documents", long_about = None)]
struct Cli {
    /// Data directory (defaults to current directory)
    #[arg(short, long, default_value = ".")]
    data: PathBuf,

    /// Directory of template overrides
    #[arg(long)]
    templates: Option<PathBuf>,

    /// Do not record writes in git history
    #[arg(long)]
    no_history: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the data directory layout and a default config file
    Init,

    /// Run the HTTP server
    Serve {
        /// Address to listen on (overrides the config file)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Populate the inventory with sample games, genres and platforms
    Seed,

    /// Show inventory counts and the latest history entry
    Status,
}

impl Cli {
    /// Config file values with command-line flags applied on top
    fn config(&self) -> anyhow::Result<Config> {
        let mut config = Config::load(&self.data)?;
        if let Some(templates) = &self.templates {
            config.templates = Some(templates.clone());
        }
        if self.no_history {
            config.history = false;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let mut config = cli.config()?;

    match cli.command {
        Commands::Init => init_inventory(&cli.data, &config).await,
        Commands::Serve { bind } => {
            if let Some(bind) = bind {
                config.bind = bind;
            }
            serve(&config).await
        }
        Commands::Seed => seed_inventory(&config).await,
        Commands::Status => show_status(&config).await,
    }
}

async fn init_inventory(path: &Path, config: &Config) -> anyhow::Result<()> {
    println!("Initializing gamestore at {:?}...", path);

    let inventory = Inventory::open(config).await?;
    for collection in [Game::COLLECTION, Genre::COLLECTION, Platform::COLLECTION] {
        inventory.store().collection(collection).ensure_exists().await?;
    }
    if !path.join(gamestore::config::CONFIG_FILE).exists() {
        config.save()?;
    }

    println!("Inventory initialized successfully!");
    println!();
    println!("Directory structure:");
    println!("  collections/games/      - Games");
    println!("  collections/genres/     - Genres");
    println!("  collections/platforms/  - Platforms");
    println!("  gamestore.yaml          - Configuration");
    println!();
    println!("Get started:");
    println!("  gamestore seed");
    println!("  gamestore serve");

    Ok(())
}

async fn serve(config: &Config) -> anyhow::Result<()> {
    let state = Arc::new(AppState::from_config(config).await?);
    routes::serve(state, &config.bind).await?;
    Ok(())
}

async fn seed_inventory(config: &Config) -> anyhow::Result<()> {
    let inventory = Inventory::open(config).await?;
    let report = seed::seed(&inventory).await?;

    println!(
        "Seeded inventory: {} added, {} already present.",
        report.created, report.existing
    );
    Ok(())
}

async fn show_status(config: &Config) -> anyhow::Result<()> {
    let inventory = Inventory::open(config).await?;
    let counts = inventory.counts().await?;

    println!("gamestore Status");
    println!("================");
    println!("Path: {:?}", inventory.root());
    println!();
    println!("Games:     {}", counts.games);
    println!("Genres:    {}", counts.genres);
    println!("Platforms: {}", counts.platforms);

    let store = inventory.store();
    match store.history_status().await? {
        Some(status) => {
            let short = status.head.get(..7).unwrap_or(status.head.as_str());
            println!("\nHistory head: {}", short);
            for entry in store.history_log(5).await?.unwrap_or_default() {
                println!("  * {}", entry);
            }
            if status.uncommitted {
                println!("\nUncommitted changes detected.");
            } else {
                println!("\nNo uncommitted changes.");
            }
        }
        None => println!("\nHistory disabled."),
    }

    Ok(())
}
