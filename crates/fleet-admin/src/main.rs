//! fleet-admin CLI
//!
//! Command-line tool for the fleet compliance records.

use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use fleet_forms::MemoryUrlRegistry;
use fleet_table::{render_table, DataTable, TableViewState};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use fleet_admin::http::Request;
use fleet_admin::import::import_json;
use fleet_admin::views::record_table;
use fleet_admin::with_resource;
use fleet_admin::{
    dispatch, AdminConfig, AppContext, Collection, DocumentStore, FeatureFlags, Resource,
    SqliteDocumentStore, NAV_CATALOG,
};

/// Fleet compliance records: vehicles, drivers, training and more.
#[derive(Parser)]
#[command(name = "fleet-admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Database URL (SQLite path or connection string).
    #[arg(short, long, env = "DATABASE_URL")]
    database: Option<String>,

    /// Seconds a cached profile stays fresh.
    #[arg(long, env = "FLEET_CACHE_TTL")]
    cache_ttl: Option<u64>,

    /// Rows per table page.
    #[arg(long, env = "FLEET_PAGE_SIZE")]
    page_size: Option<usize>,

    /// JSON configuration file; command line options override it.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the storage tables.
    Init,

    /// Import records from a JSON array.
    Import {
        /// Collection slug, e.g. `vehicles` or `working-time`.
        collection: String,

        /// JSON file holding an array of objects.
        file: PathBuf,
    },

    /// Show the records of a collection.
    List {
        /// Collection slug.
        collection: String,

        /// Only rows containing this text.
        #[arg(short, long)]
        search: Option<String>,

        /// Sort column; prefix with `-` for descending.
        #[arg(long)]
        sort: Option<String>,

        /// Page to show.
        #[arg(short, long, default_value_t = 1)]
        page: usize,

        /// Print the HTML table instead of text.
        #[arg(long)]
        html: bool,
    },

    /// Show which sidebar links a flag cookie enables.
    Nav {
        /// Cookie value to decode (catalog defaults if not specified).
        #[arg(long)]
        cookie: Option<String>,

        /// Links to flip before printing.
        #[arg(short, long)]
        toggle: Vec<String>,
    },

    /// Render a page as a browser would receive it.
    Page {
        /// Path with optional query string, e.g. `/drivers/?q=smith`.
        target: String,

        /// Cookie header to send.
        #[arg(long)]
        cookie: Option<String>,

        /// Ask for JSON instead of HTML.
        #[arg(long)]
        json: bool,
    },
}

fn load_config(cli: &Cli) -> anyhow::Result<AdminConfig> {
    let mut config = match &cli.config {
        Some(path) => AdminConfig::from_json_file(path)?,
        None => AdminConfig::new(),
    };
    if let Some(url) = &cli.database {
        config = config.database_url(url);
    }
    if let Some(ttl) = cli.cache_ttl {
        config = config.cache_ttl_secs(ttl);
    }
    if let Some(size) = cli.page_size {
        config = config.page_size(size);
    }
    config.validate()?;
    Ok(config)
}

async fn print_list<T: Resource>(
    store: &dyn DocumentStore,
    state: TableViewState,
    html: bool,
) -> anyhow::Result<()> {
    let table: DataTable<T> = record_table::<T>(store, state).await?;
    if html {
        println!("{}", render_table(&table));
        return Ok(());
    }

    let window = table.window();
    if window.total_rows == 0 {
        println!("No items found.");
        return Ok(());
    }
    if window.is_search_miss() {
        println!("No results for \"{}\".", table.state().search);
        return Ok(());
    }

    let titles: Vec<&str> = table.columns().iter().map(|c| c.title.as_str()).collect();
    println!("{}", titles.join("\t"));
    for row in &window.rows {
        let cells: Vec<String> = table.columns().iter().map(|c| c.text(row)).collect();
        println!("{}", cells.join("\t"));
    }
    println!();
    println!(
        "Showing {}-{} of {} (page {} of {})",
        window.first_index(),
        window.last_index(),
        window.matches,
        window.page,
        window.total_pages
    );
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = load_config(&cli)?;

    if let Commands::Nav { cookie, toggle } = &cli.command {
        let mut flags = match cookie {
            Some(value) => FeatureFlags::from_cookie(value),
            None => FeatureFlags::new(),
        };
        for id in toggle {
            if flags.toggle(id).is_none() {
                anyhow::bail!("unknown navigation link: {id}");
            }
        }
        for item in NAV_CATALOG {
            let mark = if flags.is_enabled(item.id) { "x" } else { " " };
            println!("[{mark}] {:<16} {}", item.id, item.href);
        }
        println!();
        println!(
            "Set-Cookie: {}",
            flags.set_cookie_header(&config.flag_cookie_name, config.flag_cookie_max_age)
        );
        return Ok(());
    }

    // Connect to database
    let options = SqliteConnectOptions::from_str(&config.database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;
    let store = SqliteDocumentStore::new(pool);
    store.init().await?;

    match cli.command {
        Commands::Init => {
            info!("Storage tables ready at {}", config.database_url);
        }

        Commands::Import { collection, file } => {
            let collection = Collection::from_str(&collection)?;
            let json = std::fs::read_to_string(&file)?;
            info!("Importing {} into {}...", file.display(), collection);
            let report = import_json(&store, Arc::new(MemoryUrlRegistry::new()), collection, &json)
                .await?;

            println!("Created {} record(s).", report.created.len());
            for rejection in &report.rejected {
                println!("Object {} refused:", rejection.index);
                for (field, messages) in &rejection.errors {
                    for message in messages {
                        println!("  {field}: {message}");
                    }
                }
            }
        }

        Commands::List {
            collection,
            search,
            sort,
            page,
            html,
        } => {
            let collection = Collection::from_str(&collection)?;
            let mut params = HashMap::from([("page".to_string(), page.to_string())]);
            if let Some(q) = search {
                params.insert("q".to_string(), q);
            }
            if let Some(o) = sort {
                params.insert("o".to_string(), o);
            }
            let state = TableViewState::from_params(&params, config.page_size);
            with_resource!(collection, R => print_list::<R>(&store, state, html).await)?;
        }

        Commands::Page {
            target,
            cookie,
            json,
        } => {
            let mut req = Request::get(target);
            if let Some(cookie) = cookie {
                req = req.header("Cookie", cookie);
            }
            if json {
                req = req.header("Accept", "application/json");
            }
            let ctx = AppContext::new(
                config,
                Arc::new(store),
                Arc::new(MemoryUrlRegistry::new()),
            );
            let res = dispatch(&ctx, &req).await;
            eprintln!("{} {}", res.status, res.status_text());
            println!("{}", res.body_string().unwrap_or_default());
        }

        Commands::Nav { .. } => {}
    }

    Ok(())
}
