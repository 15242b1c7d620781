use std::time::Duration;

use bookshelf_core::domain::Book;
use bookshelf_core::error::FetchError;
use bookshelf_core::ports::BookFetcher;
use scraper::{ElementRef, Html, Selector};

const USER_AGENT: &str = "Mozilla/5.0 (compatible; bookshelf/0.1)";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP implementation of the `BookFetcher` port: fetches one listing page
/// and parses its items into book records.
pub struct HttpBookFetcher {
    listing_url: String,
    client: reqwest::blocking::Client,
}

impl HttpBookFetcher {
    pub fn new(listing_url: String) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(net_err)?;
        Ok(Self {
            listing_url,
            client,
        })
    }
}

impl BookFetcher for HttpBookFetcher {
    fn fetch_books(&self) -> Result<Vec<Book>, FetchError> {
        tracing::info!(url = %self.listing_url, "fetching listing page");
        let response = self
            .client
            .get(&self.listing_url)
            .send()
            .map_err(net_err)?
            .error_for_status()
            .map_err(net_err)?;
        let body = response.text().map_err(net_err)?;
        parse_listing(&body)
    }
}

/// Parses a listing page into book records.
///
/// Each `li.item` is one listing: title in `h4 a`, authors in
/// `a[rel="go_author"]` (joined when a book has several), and the sale
/// price in the last `.price b`. Items missing any of the three are logged
/// and skipped so one broken listing never aborts a pass; markup with no
/// recognizable items yields an empty set.
pub fn parse_listing(html: &str) -> Result<Vec<Book>, FetchError> {
    let doc = Html::parse_document(html);
    let item_sel = selector("li.item")?;
    let title_sel = selector("h4 a")?;
    let author_sel = selector(r#"a[rel="go_author"]"#)?;
    let price_sel = selector(".price b")?;

    let mut books = Vec::new();
    for item in doc.select(&item_sel) {
        let title = match item.select(&title_sel).next().map(node_text) {
            Some(t) if !t.is_empty() => t,
            _ => {
                tracing::warn!("listing item without a title, skipped");
                continue;
            }
        };

        let authors: Vec<String> = item
            .select(&author_sel)
            .map(node_text)
            .filter(|a| !a.is_empty())
            .collect();
        if authors.is_empty() {
            tracing::warn!(%title, "listing item without an author, skipped");
            continue;
        }

        let price = match item.select(&price_sel).last().and_then(|n| parse_price(&node_text(n))) {
            Some(p) => p,
            None => {
                tracing::warn!(%title, "listing item without a price, skipped");
                continue;
            }
        };

        books.push(Book {
            title,
            author: authors.join(", "),
            price,
        });
    }

    tracing::debug!(count = books.len(), "parsed listing page");
    Ok(books)
}

fn net_err(e: reqwest::Error) -> FetchError {
    FetchError::Network(e.to_string())
}

fn selector(css: &str) -> Result<Selector, FetchError> {
    Selector::parse(css).map_err(|e| FetchError::Parse(format!("bad selector `{css}`: {e}")))
}

fn node_text(node: ElementRef<'_>) -> String {
    node.text().collect::<String>().trim().to_string()
}

/// Pulls the numeric value out of price markup like `474元`.
fn parse_price(text: &str) -> Option<i64> {
    let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}
