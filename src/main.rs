//! CLI entry point for vellum

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "vellum")]
#[command(version = "0.1.0")]
#[command(about = "A static blog generator with search, feeds and live reload", long_about = None)]
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
    /// Initialize a new blog
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        folder: PathBuf,
    },

    /// Create a new article
    New {
        /// Title of the new article
        title: String,

        /// Author name (defaults to the site author)
        #[arg(short, long)]
        author: Option<String>,
    },

    /// Build the site into the public directory
    #[command(alias = "b")]
    Build {
        /// Watch for file changes and rebuild
        #[arg(short, long)]
        watch: bool,
    },

    /// Start a local server
    #[command(alias = "s")]
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,

        /// Enable static mode (no file watching)
        #[arg(long)]
        r#static: bool,
    },

    /// Clean the public directory
    Clean,

    /// List site content
    List {
        /// Type of content to list (article, author, tag, category)
        #[arg(default_value = "article")]
        r#type: String,

        /// Narrow articles by a case-insensitive text search
        #[arg(short, long, default_value = "")]
        search: String,

        /// Narrow articles to an exact tag
        #[arg(long, default_value = "All")]
        tag: String,

        /// Narrow articles to an exact category
        #[arg(long, default_value = "All")]
        category: String,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "vellum=debug,info"
    } else {
        "vellum=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = cli.cwd.unwrap_or_else(|| std::env::current_dir().unwrap());

    match cli.command {
        Commands::Init { folder } => {
            let target_dir = if folder.is_absolute() {
                folder
            } else {
                base_dir.join(folder)
            };
            tracing::info!("Initializing blog in {:?}", target_dir);
            vellum::commands::init::init_site(&target_dir)?;
            println!("Initialized empty blog in {:?}", target_dir);
        }

        Commands::New { title, author } => {
            let vellum = vellum::Vellum::new(&base_dir)?;
            tracing::info!("Creating new article: {}", title);
            vellum.new_article(&title, author.as_deref())?;
        }

        Commands::Build { watch } => {
            let vellum = vellum::Vellum::new(&base_dir)?;
            tracing::info!("Building site...");

            vellum.build()?;
            println!("Built successfully!");

            if watch {
                tracing::info!("Watching for file changes...");
                vellum::commands::build::watch(&vellum).await?;
            }
        }

        Commands::Serve {
            port,
            ip,
            open,
            r#static,
        } => {
            let vellum = vellum::Vellum::new(&base_dir)?;

            // Build first so the server has something to serve
            tracing::info!("Building site...");
            vellum.build()?;

            tracing::info!("Starting server at http://{}:{}", ip, port);
            vellum::server::start(&vellum, &ip, port, !r#static, open).await?;
        }

        Commands::Clean => {
            let vellum = vellum::Vellum::new(&base_dir)?;
            tracing::info!("Cleaning public directory...");
            vellum.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::List {
            r#type,
            search,
            tag,
            category,
        } => {
            let vellum = vellum::Vellum::new(&base_dir)?;
            let query = vellum::content::ArticleQuery::from_parts(&search, &tag, &category);
            vellum::commands::list::run(&vellum, &r#type, &query)?;
        }

        Commands::Version => {
            println!("vellum version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
