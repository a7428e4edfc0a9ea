//! CLI entry point for spacetraveling

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "spacetraveling")]
#[command(version)]
#[command(about = "A blog front-end for a headless CMS", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        folder: PathBuf,
    },

    /// Generate the listing and pre-rendered post pages
    #[command(alias = "g")]
    Generate,

    /// Start a local server
    #[command(alias = "s")]
    Server {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Serve without generating first
        #[arg(long)]
        no_generate: bool,
    },

    /// Clean the public folder
    Clean,

    /// List posts from the CMS
    List {
        /// Number of batches to load
        #[arg(short, long, default_value = "1", conflicts_with = "all")]
        pages: usize,

        /// Follow "load more" until the last post
        #[arg(short, long)]
        all: bool,
    },

    /// Print a single post
    Show {
        /// Post uid
        id: String,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "spacetraveling=debug,info"
    } else {
        "spacetraveling=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    let load_blog = || -> Result<spacetraveling::Blog> {
        let mut blog = spacetraveling::Blog::new(&base_dir)?;
        blog.config.apply_env();
        Ok(blog)
    };

    match cli.command {
        Commands::Init { folder } => {
            let target_dir = if folder.is_absolute() {
                folder
            } else {
                base_dir.join(folder)
            };
            tracing::info!("Initializing blog in {:?}", target_dir);
            spacetraveling::commands::init::init_site(&target_dir)?;
            println!("Initialized blog in {:?}", target_dir);
        }

        Commands::Generate => {
            let blog = load_blog()?;
            tracing::info!("Generating static files...");
            let report = blog.generate().await?;
            for id in &report.missing {
                println!("Skipped missing post: {}", id);
            }
            for id in &report.failed {
                println!("Could not fetch post {}, it will be resolved on first visit", id);
            }
            println!("Generated successfully!");
        }

        Commands::Server {
            port,
            ip,
            no_generate,
        } => {
            let blog = load_blog()?;
            let client = blog.client()?;

            if !no_generate {
                tracing::info!("Generating static files...");
                spacetraveling::commands::generate::run_with_client(&blog, client.clone()).await?;
            }

            tracing::info!("Starting server at http://{}:{}", ip, port);
            spacetraveling::server::start(&blog, client, &ip, port).await?;
        }

        Commands::Clean => {
            let blog = load_blog()?;
            tracing::info!("Cleaning public folder...");
            blog.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::List { pages, all } => {
            let blog = load_blog()?;
            let client = blog.client()?;
            let max_pages = if all { None } else { Some(pages.max(1)) };
            spacetraveling::commands::list::run(&blog, client, max_pages, &mut std::io::stdout())
                .await?;
        }

        Commands::Show { id } => {
            let blog = load_blog()?;
            let client = blog.client()?;
            spacetraveling::commands::show::run(&blog, client, &id, &mut std::io::stdout())
                .await?;
        }

        Commands::Version => {
            println!("spacetraveling version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
