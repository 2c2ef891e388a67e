//! Terminal output for the interactive retrieval loop.
//!
//! Absent record fields get their placeholders here, at the presentation
//! boundary; the data model itself keeps them as `None`.

use owo_colors::OwoColorize;
use std::io::IsTerminal;

use crate::models::{Paper, Translation};

/// Check if stdout is a terminal.
pub fn is_terminal() -> bool {
    std::io::stdout().is_terminal()
}

/// Print an informational status line.
pub fn info(message: impl AsRef<str>) {
    println!("{} {}", "ℹ".cyan().bold(), message.as_ref());
}

/// Print a success status line.
pub fn success(message: impl AsRef<str>) {
    println!("{} {}", "✓".green().bold(), message.as_ref());
}

/// Print a warning status line.
pub fn warn(message: impl AsRef<str>) {
    println!("{} {}", "⚠".yellow().bold(), message.as_ref());
}

/// Print an error status line.
pub fn error(message: impl AsRef<str>) {
    println!("{} {}", "✗".red().bold(), message.as_ref());
}

/// Print one normalized, enriched record for the operator to judge.
pub fn print_paper(paper: &Paper, operator_lang: &str) {
    println!();
    println!(
        "{} {}",
        format!("[{}]", paper.source).magenta(),
        paper
            .title
            .as_deref()
            .unwrap_or("(no title)")
            .bold()
    );

    let authors = if paper.authors.is_empty() {
        "(no authors listed)".to_string()
    } else {
        paper.authors.join(", ")
    };
    println!("{} {}", "Authors:".cyan(), authors);

    println!(
        "{} {}",
        "Abstract:".cyan(),
        paper.abstract_text.as_deref().unwrap_or("(no abstract available)")
    );

    match &paper.translated_abstract {
        Translation::Translated(text) => {
            println!("{} {}", format!("Abstract ({}):", operator_lang).cyan(), text);
        }
        Translation::Failed => {
            println!(
                "{} {}",
                format!("Abstract ({}):", operator_lang).cyan(),
                "(translation unavailable)".dimmed()
            );
        }
        Translation::NotTranslated => {}
    }

    println!(
        "{} {}",
        "Link:".cyan(),
        paper.link.as_deref().unwrap_or("(no link)")
    );
    println!(
        "{} {}",
        "PDF:".cyan(),
        paper.pdf_url.as_deref().unwrap_or("unavailable")
    );
}
