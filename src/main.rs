use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use portfolio_content::config::{Config, LogFormat};
use portfolio_content::ContentResolver;

/// Inspect the project content the portfolio site would render.
#[derive(Debug, Parser)]
#[command(name = "portfolio-content", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List every project, as shown on the projects page.
    List {
        /// Only featured (in progress) projects.
        #[arg(long)]
        featured: bool,
    },
    /// Show one project with its markdown body.
    Show {
        /// Project slug.
        slug: String,
    },
    /// Print the slug of every detail page to generate.
    Slugs,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        if tracing::dispatcher::has_been_set() {
            error!("Fatal error: {e:#}");
        } else {
            eprintln!("Fatal error: {e:#}");
        }
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Logging comes up first so configuration errors are reported
    init_tracing(LogFormat::from_env())?;

    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    info!(
        remote = config.notion.is_some(),
        log_format = ?config.log_format,
        content_dir = %config.content_dir.display(),
        "Configuration loaded"
    );

    let resolver = ContentResolver::from_config(&config).context("Failed to build resolver")?;

    match cli.command {
        Command::List { featured } => {
            let projects = if featured {
                resolver.get_featured_projects().await
            } else {
                resolver.get_all_projects().await
            }
            .context("Failed to load projects")?;
            print_json(&projects)?;
        }
        Command::Show { slug } => {
            let detail = resolver
                .get_project_by_slug(&slug)
                .await
                .with_context(|| format!("Failed to load project '{slug}'"))?;
            match detail {
                Some(detail) => print_json(&detail)?,
                None => anyhow::bail!("No project with slug '{slug}'"),
            }
        }
        Command::Slugs => {
            for slug in resolver.get_all_slugs().await.context("Failed to list slugs")? {
                println!("{slug}");
            }
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{json}");
    Ok(())
}

fn init_tracing(format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,portfolio_content=debug"));

    // Logs go to stderr so stdout stays clean JSON
    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?,
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?,
    }

    Ok(())
}
