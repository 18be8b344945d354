//! ExploreFlix CLI application.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use exploreflix::{Catalog, Category, HomeFeed};
use shared::{Config, ContentRecord, ContentType, LoadState, LogConfig, RecentSearches};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Mixed trending movies and anime
    Trending,
    /// Popular movies
    Movies,
    /// Popular series
    Series,
    /// Top anime
    Anime,
    /// Search movies, anime and series
    Search {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },
    /// Show one title by id, e.g. movie-tt0372784 or anime-21
    Show { id: String },
    /// List recent searches
    Recent {
        /// Forget all recent searches
        #[arg(long)]
        clear: bool,
    },
    /// Home view sections
    Home {
        /// all, movie, series or anime
        #[arg(long, default_value = "all")]
        category: Category,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let mut config = Config::from_file(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;
    config.apply_env_overrides();

    // Initialize logging
    shared::logging::init(LogConfig::from_config(&config, "exploreflix", args.verbose))?;

    info!(config_file = %args.config.display(), "Loaded configuration");
    if config.omdb.api_key.trim().is_empty() {
        warn!(
            env = shared::config::OMDB_API_KEY_ENV,
            "No OMDb API key configured, movie and series lookups will come back empty"
        );
    }

    let catalog = Catalog::from_config(&config).context("Failed to create catalog")?;

    match args.command {
        Command::Trending => print_records(&catalog.trending().await, args.json)?,
        Command::Movies => print_records(&catalog.popular_movies().await, args.json)?,
        Command::Series => print_records(&catalog.popular_series().await, args.json)?,
        Command::Anime => print_records(&catalog.trending_anime().await, args.json)?,
        Command::Search { query } => {
            let query = query.join(" ");

            let mut recents = RecentSearches::load(
                config.recent_searches_path(),
                config.recent_searches.capacity,
            );
            if let Err(e) = recents.record(&query) {
                warn!(error = %e, "Failed to save recent search");
            }

            print_records(&catalog.search(&query).await, args.json)?;
        }
        Command::Show { id } => {
            let (content_type, _) = ContentType::split_record_id(&id).with_context(|| {
                format!("Invalid content id '{}' (expected <movie|series|anime>-<id>)", id)
            })?;
            let record = catalog.content_by_id(&id, content_type).await;
            print_detail(&record, args.json)?;
        }
        Command::Recent { clear } => {
            let mut recents = RecentSearches::load(
                config.recent_searches_path(),
                config.recent_searches.capacity,
            );
            if clear {
                recents.clear()?;
                info!("Recent searches cleared");
            } else if args.json {
                println!("{}", serde_json::to_string_pretty(recents.entries())?);
            } else {
                for query in recents.entries() {
                    println!("{}", query);
                }
            }
        }
        Command::Home { category } => {
            let mut feed = HomeFeed::new();
            feed.load(&catalog).await;
            print_home(&feed, category, args.json)?;
        }
    }

    Ok(())
}

fn print_records(records: &[ContentRecord], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No results");
        return Ok(());
    }

    for record in records {
        println!(
            "{:<20} {:<7} {:<10} {}",
            record.id(),
            record.content_type(),
            record.year().unwrap_or("-"),
            record.title()
        );
    }
    Ok(())
}

fn print_detail(record: &ContentRecord, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(record)?);
        return Ok(());
    }

    println!("{} ({})", record.title(), record.content_type());
    println!("  id: {}", record.id());

    let fields = [
        ("year", record.year()),
        ("genre", record.genre()),
        ("runtime", record.runtime()),
        ("rating", record.rating()),
        ("director", record.director()),
        ("cast", record.cast()),
        ("status", record.status()),
        ("season", record.season()),
        ("studio", record.studio()),
    ];
    for (name, value) in fields {
        if let Some(value) = value {
            println!("  {}: {}", name, value);
        }
    }
    if let Some(episodes) = record.episodes() {
        println!("  episodes: {}", episodes);
    }
    println!("  poster: {}", record.poster());
    if let Some(plot) = record.plot() {
        println!();
        println!("{}", plot);
    }
    Ok(())
}

fn print_home(feed: &HomeFeed, category: Category, json: bool) -> Result<()> {
    let browse = feed.by_category(category);
    let picks = feed.editor_picks();
    let recent = feed.recently_added();

    if json {
        let value = serde_json::json!({
            "browse": browse,
            "editorPicks": picks,
            "recentlyAdded": recent,
            "movies": feed.movies().value(),
            "anime": feed.anime().value(),
            "series": feed.series().value(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("== Browse ({:?}) ==", category);
    print_refs(&browse);
    println!("\n== Editor's picks ==");
    print_refs(&picks);
    println!("\n== Recently added ==");
    print_refs(&recent);

    for (name, section) in [
        ("Movies", feed.movies()),
        ("Anime", feed.anime()),
        ("Series", feed.series()),
    ] {
        println!("\n== {} ==", name);
        match section.state() {
            LoadState::Loaded(records) => print_records(records, false)?,
            LoadState::Failed(message) => println!("unavailable: {}", message),
            LoadState::Idle | LoadState::Loading => println!("not loaded"),
        }
    }
    Ok(())
}

fn print_refs(records: &[&ContentRecord]) {
    if records.is_empty() {
        println!("No results");
    }
    for record in records {
        println!("{:<20} {:<7} {}", record.id(), record.content_type(), record.title());
    }
}
