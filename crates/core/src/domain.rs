/// One scraped book listing. Records are considered the same book when
/// title and author both match; price may change between scrape passes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub title: String,
    pub author: String,
    pub price: i64,
}

/// Field a stored-book query matches against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryField {
    Title,
    Author,
}

impl QueryField {
    /// Column name in the backing store.
    pub fn column(self) -> &'static str {
        match self {
            QueryField::Title => "title",
            QueryField::Author => "author",
        }
    }
}
