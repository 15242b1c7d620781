use std::io::{self, BufRead, Write};

use bookshelf_core::application::{CatalogService, UpdateError};
use bookshelf_core::domain::{Book, QueryField};

/// Runs the interactive menu until the user picks exit (or input ends).
///
/// Every fetcher/store failure is rendered as a single line and the loop
/// continues; only I/O errors on the menu's own streams propagate.
pub fn run<R: BufRead, W: Write>(
    service: &CatalogService,
    input: &mut R,
    out: &mut W,
) -> io::Result<()> {
    loop {
        print_main_menu(out)?;
        let Some(choice) = prompt(input, out, "Select an option (1-3): ")? else {
            break;
        };
        match choice.as_str() {
            "1" => update_action(service, out)?,
            "2" => query_loop(service, input, out)?,
            "3" => {
                writeln!(out, "Goodbye.")?;
                break;
            }
            _ => writeln!(out, "Invalid option, please try again.")?,
        }
    }
    Ok(())
}

fn print_main_menu<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "-".repeat(35))?;
    writeln!(out, "-----   Book catalog manager  -----")?;
    writeln!(out, "1. Update book database")?;
    writeln!(out, "2. Query books")?;
    writeln!(out, "3. Exit")?;
    writeln!(out, "{}", "-".repeat(35))
}

fn print_query_menu<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "--- Query books ---")?;
    writeln!(out, "a. By title")?;
    writeln!(out, "b. By author")?;
    writeln!(out, "c. Back to main menu")?;
    writeln!(out, "{}", "-".repeat(15))
}

/// Writes the prompt, then reads one trimmed line. `None` means end of
/// input. Menu choices are lowercased by their callers; keywords keep
/// their case.
fn prompt<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    message: &str,
) -> io::Result<Option<String>> {
    write!(out, "{message}")?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn update_action<W: Write>(service: &CatalogService, out: &mut W) -> io::Result<()> {
    match service.update_database() {
        Ok(report) if report.total == 0 => {
            writeln!(out, "Nothing scraped; the database was not updated.")
        }
        Ok(report) => writeln!(
            out,
            "Database update complete: {} scraped, {} newly added.",
            report.total, report.new_count
        ),
        Err(UpdateError::Fetch(e)) => writeln!(out, "Scrape failed: {e}"),
        Err(UpdateError::Storage(e)) => writeln!(out, "Database update failed: {e}"),
    }
}

fn query_loop<R: BufRead, W: Write>(
    service: &CatalogService,
    input: &mut R,
    out: &mut W,
) -> io::Result<()> {
    loop {
        print_query_menu(out)?;
        let Some(choice) = prompt(input, out, "Select a query mode (a-c): ")? else {
            return Ok(());
        };
        let choice = choice.to_lowercase();
        match choice.as_str() {
            "c" => return Ok(()),
            "a" | "b" => {
                let Some(keyword) = prompt(input, out, "Enter a keyword: ")? else {
                    return Ok(());
                };
                if keyword.is_empty() {
                    writeln!(out, "Keyword must not be empty.")?;
                    continue;
                }
                let field = if choice == "a" {
                    QueryField::Title
                } else {
                    QueryField::Author
                };
                search_and_display(service, field, &keyword, out)?;
            }
            _ => writeln!(out, "Invalid option, please try again.")?,
        }
    }
}

fn search_and_display<W: Write>(
    service: &CatalogService,
    field: QueryField,
    keyword: &str,
    out: &mut W,
) -> io::Result<()> {
    let books = match service.search(field, keyword) {
        Ok(books) => books,
        Err(e) => return writeln!(out, "Query failed: {e}"),
    };

    if books.is_empty() {
        return writeln!(out, "No data found.");
    }

    writeln!(out)?;
    writeln!(out, "{}", "=".repeat(20))?;
    for book in &books {
        print_book(out, book)?;
    }
    writeln!(out, "{}", "=".repeat(20))
}

fn print_book<W: Write>(out: &mut W, book: &Book) -> io::Result<()> {
    writeln!(out, "Title:  {}", book.title)?;
    writeln!(out, "Author: {}", book.author)?;
    writeln!(out, "Price:  {}", book.price)?;
    writeln!(out, "---")
}
