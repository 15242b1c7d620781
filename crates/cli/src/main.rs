use bookshelf_core::application::CatalogService;
use bookshelf_core::ports::{BookFetcher, BookStore};
use clap::Parser;
use scraper_adapter::HttpBookFetcher;
use sqlite_adapter::SqliteBookStore;

mod menu;

const DEFAULT_LISTING_URL: &str = "https://search.books.com.tw/search/query/key/LLM/cat/all";

/// Interactive book catalog: scrapes an online bookstore listing into a
/// local SQLite database and queries it by title or author.
#[derive(Parser, Debug)]
#[command(name = "bookshelf")]
#[command(about = "Scrapes book listings into SQLite and queries them from a text menu")]
struct Cli {
    /// Path to the SQLite database file
    #[arg(short = 'd', long = "database", default_value = "books.db")]
    database: String,

    /// Listing page URL to scrape
    #[arg(short = 'u', long = "listing-url", default_value = DEFAULT_LISTING_URL)]
    listing_url: String,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Instantiate concrete implementations of the ports
    let store = match SqliteBookStore::open(&cli.database) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Failed to open database {}: {}", cli.database, e);
            std::process::exit(1);
        }
    };
    let fetcher = match HttpBookFetcher::new(cli.listing_url.clone()) {
        Ok(fetcher) => fetcher,
        Err(e) => {
            eprintln!("Failed to build the HTTP client: {e}");
            std::process::exit(1);
        }
    };

    let store: Box<dyn BookStore> = Box::new(store);
    let fetcher: Box<dyn BookFetcher> = Box::new(fetcher);
    let service = CatalogService::new(fetcher, store);

    // Schema init at startup; the update action re-runs it before inserting.
    if let Err(e) = service.ensure_schema() {
        eprintln!("Failed to initialize the database schema: {e}");
        std::process::exit(1);
    }

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    if let Err(e) = menu::run(&service, &mut stdin.lock(), &mut stdout.lock()) {
        eprintln!("Terminal I/O error: {e}");
        std::process::exit(1);
    }
}
