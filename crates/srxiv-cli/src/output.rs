use std::io::Write;

use owo_colors::OwoColorize;
use srxiv_core::{ParsedCitation, SearchResult};

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Print what was parsed out of the citation block before searching.
pub fn print_parsed(
    w: &mut dyn Write,
    parsed: &ParsedCitation,
    color: ColorMode,
) -> std::io::Result<()> {
    let authors = if parsed.authors.is_empty() {
        "(none)".to_string()
    } else {
        parsed.authors.join(", ")
    };
    let title = parsed.title.as_deref().unwrap_or("(none)");

    if color.enabled() {
        writeln!(w, "{} {}", "Authors:".bold(), authors)?;
        writeln!(w, "{} {}", "Title:  ".bold(), title)?;
    } else {
        writeln!(w, "Authors: {}", authors)?;
        writeln!(w, "Title:   {}", title)?;
    }
    writeln!(w)
}

/// Print a contiguous run of search results. `offset` is the 0-based
/// position of the first entry in the full result list.
pub fn print_entries(
    w: &mut dyn Write,
    entries: &[SearchResult],
    offset: usize,
    color: ColorMode,
) -> std::io::Result<()> {
    for (i, entry) in entries.iter().enumerate() {
        print_entry(w, offset + i + 1, entry, color)?;
    }
    Ok(())
}

fn print_entry(
    w: &mut dyn Write,
    index: usize,
    entry: &SearchResult,
    color: ColorMode,
) -> std::io::Result<()> {
    let score = entry
        .score
        .map(|s| format!(" ({s:.1})"))
        .unwrap_or_default();
    let authors = entry.authors.join(", ");
    let summary = truncate(&entry.summary, 200);

    if color.enabled() {
        writeln!(
            w,
            "{} {}{}",
            format!("[{index}]").bold().yellow(),
            entry.title.bold(),
            score.dimmed()
        )?;
        writeln!(w, "    {} ({})", authors, entry.id.cyan())?;
        if !summary.is_empty() {
            writeln!(w, "    {}", summary.dimmed())?;
        }
    } else {
        writeln!(w, "[{index}] {}{score}", entry.title)?;
        writeln!(w, "    {} ({})", authors, entry.id)?;
        if !summary.is_empty() {
            writeln!(w, "    {summary}")?;
        }
    }
    Ok(())
}

/// Prompt for the next session command and flush, so the cursor waits on
/// the same line.
pub fn print_prompt(w: &mut dyn Write, revealed: usize, total: usize) -> std::io::Result<()> {
    let select = if revealed == 1 {
        "dl [1]".to_string()
    } else {
        format!("dl [1-{revealed}]")
    };
    if revealed < total {
        write!(w, "command ([m]ore/{select}/[q]uit): ")?;
    } else {
        write!(w, "command ({select}/[q]uit): ")?;
    }
    w.flush()
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max).collect();
        format!("{cut}...")
    }
}
