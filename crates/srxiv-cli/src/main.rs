use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use clap::Parser;
use once_cell::sync::Lazy;
use regex::Regex;

mod output;

use output::ColorMode;
use srxiv_arxiv::ArxivClient;
use srxiv_core::{
    CitationPattern, PdfBackend, ReferenceMarker, SearchQuery, SearchResult, block, citation,
    locator, query, ranking,
    session::{self, Effect, SessionInput, SessionState},
};
use srxiv_pdf_mupdf::MupdfBackend;

/// Resolve a numbered citation in an academic PDF to an arXiv paper
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to a PDF, or a bare arXiv identifier to fetch directly
    source: String,

    /// Reference number to resolve, e.g. 12, or S3 for supplementary lists
    refnum: Option<String>,

    /// Force a citation pattern (1 quoted title, 2 unquoted title, 3 authors only)
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=3))]
    pattern: Option<u8>,

    /// Which occurrence of the marker to use, counting back from the last page
    #[arg(short, long, default_value_t = 1)]
    depth: u32,

    /// Which citation to use when the block holds several separated by ';'
    #[arg(short, long, default_value_t = 1)]
    inner_refnum: usize,

    /// Maximum number of search results to request from arXiv
    #[arg(long)]
    max_results: Option<usize>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Resolve configuration: CLI flags > env vars > defaults
    let max_results = cli
        .max_results
        .or_else(|| {
            std::env::var("SRXIV_MAX_RESULTS")
                .ok()
                .and_then(|v| v.parse().ok())
        })
        .unwrap_or(srxiv_arxiv::DEFAULT_MAX_RESULTS);

    let color = ColorMode(!cli.no_color);
    let client = ArxivClient::new(max_results);

    // A bare identifier skips the PDF pipeline entirely
    if query::is_arxiv_id(&cli.source) {
        let entry = lookup_entry(&client, &cli.source).await?;
        return download_and_open(&client, &entry, color).await;
    }

    let Some(ref refnum) = cli.refnum else {
        anyhow::bail!("a reference number is required when the source is a PDF");
    };
    let marker = parse_marker(refnum, cli.depth)?;

    let pdf_path = PathBuf::from(&cli.source);
    if !pdf_path.exists() {
        anyhow::bail!("File not found: {}", pdf_path.display());
    }

    let backend = MupdfBackend::new();
    let pages = backend.extract_pages(&pdf_path)?;

    let page = locator::locate(&pages, &marker)?;
    let citation_block = block::extract(&pages, page, &marker)?;

    // An identifier embedded in the citation makes parsing unnecessary,
    // and the block may not even be parseable (e.g. "arXiv:2301.12345"
    // with nothing else)
    if let Some(arxiv_id) = query::find_arxiv_id(&citation_block.raw_text) {
        let entry = lookup_entry(&client, &arxiv_id).await?;
        return download_and_open(&client, &entry, color).await;
    }

    let pattern_override = cli.pattern.and_then(CitationPattern::from_index);
    let parsed = citation::parse(&citation_block, pattern_override, cli.inner_refnum)?;

    let mut stdout = std::io::stdout();
    output::print_parsed(&mut stdout, &parsed, color)?;

    let search_query = query::build(&citation_block, &parsed);
    let results = client.search(&search_query).await?;
    if results.is_empty() {
        anyhow::bail!("arXiv returned no results for this citation");
    }

    let ranked = ranking::rank(results, parsed.title.as_deref());
    if ranked.is_empty() {
        anyhow::bail!("no arXiv result was similar enough to the extracted title");
    }

    run_session(&client, ranked, color).await
}

/// Parse a reference number argument into a marker: `12` or `S3`.
fn parse_marker(refnum: &str, depth: u32) -> anyhow::Result<ReferenceMarker> {
    let (supplementary, digits) = match refnum.strip_prefix(['S', 's']) {
        Some(rest) => (true, rest),
        None => (false, refnum),
    };
    let number: u32 = digits
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid reference number: {refnum}"))?;
    if number == 0 {
        anyhow::bail!("reference numbers start at 1");
    }
    Ok(ReferenceMarker::new(number, supplementary).with_depth(depth))
}

/// Fetch the feed entry for a known identifier.
async fn lookup_entry(client: &ArxivClient, arxiv_id: &str) -> anyhow::Result<SearchResult> {
    let results = client
        .search(&SearchQuery::Lookup {
            arxiv_id: arxiv_id.to_string(),
        })
        .await?;
    results
        .into_iter()
        .next()
        .ok_or_else(|| anyhow::anyhow!("arXiv has no entry for {arxiv_id}"))
}

/// Drive the interactive selection loop until the user picks an entry,
/// quits, or closes stdin.
async fn run_session(
    client: &ArxivClient,
    results: Vec<SearchResult>,
    color: ColorMode,
) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout();
    let stdin = std::io::stdin();

    let total = results.len();
    let state = SessionState::new(results, 1);
    output::print_entries(&mut stdout, &state.results[..state.revealed], 0, color)?;

    let mut state = state;
    loop {
        output::print_prompt(&mut stdout, state.revealed, total)?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            writeln!(stdout)?;
            return Ok(());
        }

        let (next, effect) = session::step(state, SessionInput::parse(&line));
        state = next;

        match effect {
            Effect::Reveal(range) => {
                let start = range.start;
                output::print_entries(&mut stdout, &state.results[range], start, color)?;
            }
            Effect::Download(entry) => {
                download_and_open(client, &entry, color).await?;
                return Ok(());
            }
            Effect::Notice(message) => writeln!(stdout, "{message}")?,
            Effect::Terminate => return Ok(()),
        }
    }
}

/// Download the paper into the working directory and hand it to a viewer.
async fn download_and_open(
    client: &ArxivClient,
    entry: &SearchResult,
    color: ColorMode,
) -> anyhow::Result<()> {
    use owo_colors::OwoColorize;

    let path = target_path(entry);
    let mut stdout = std::io::stdout();

    if path.exists() {
        writeln!(stdout, "Already downloaded: {}", path.display())?;
    } else {
        let bytes = client.download_pdf(&entry.id).await?;
        save_pdf(&path, &bytes)?;
        if color.enabled() {
            writeln!(stdout, "{} {}", "Saved:".green().bold(), path.display())?;
        } else {
            writeln!(stdout, "Saved: {}", path.display())?;
        }
    }

    open_viewer(&path);
    Ok(())
}

/// Local filename for a feed entry: `{id}_{sanitized title}.pdf`.
/// Old-format identifiers contain a slash, which cannot appear in a
/// filename.
fn target_path(entry: &SearchResult) -> PathBuf {
    PathBuf::from(format!(
        "{}_{}.pdf",
        entry.id.replace('/', "_"),
        sanitize_title(&entry.title)
    ))
}

/// Reduce a paper title to a filename-safe slug, at most 40 characters.
fn sanitize_title(title: &str) -> String {
    static STRIP: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s-]").unwrap());
    static COLLAPSE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s-]+").unwrap());

    let stripped = STRIP.replace_all(title, "");
    let collapsed = COLLAPSE.replace_all(&stripped, "_");
    collapsed.trim_matches('_').chars().take(40).collect()
}

/// Write the PDF unless the target already exists; returns true if written.
fn save_pdf(path: &Path, bytes: &[u8]) -> std::io::Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    std::fs::write(path, bytes)?;
    Ok(true)
}

/// Launch a PDF viewer on the downloaded file. Failure to find or start
/// a viewer is not fatal; the file is already on disk.
fn open_viewer(path: &Path) {
    let mut candidates: Vec<String> = Vec::new();
    if let Ok(viewer) = std::env::var("SRXIV_VIEWER")
        && !viewer.is_empty()
    {
        candidates.push(viewer);
    }
    candidates.extend(
        ["mupdf", "zathura", "evince", "xdg-open", "open"]
            .iter()
            .map(|s| s.to_string()),
    );

    for viewer in &candidates {
        match std::process::Command::new(viewer)
            .arg(path)
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .spawn()
        {
            Ok(_) => return,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => {
                tracing::warn!(%viewer, error = %e, "failed to launch viewer");
                return;
            }
        }
    }
    tracing::warn!("no PDF viewer found; open {} manually", path.display());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_accepts_plain_and_supplementary_numbers() {
        let marker = parse_marker("12", 1).unwrap();
        assert_eq!(marker.token(), "[12]");

        let marker = parse_marker("S3", 2).unwrap();
        assert_eq!(marker.token(), "[S3]");
        assert_eq!(marker.depth, 2);

        let marker = parse_marker("s3", 1).unwrap();
        assert_eq!(marker.token(), "[S3]");
    }

    #[test]
    fn marker_rejects_garbage() {
        assert!(parse_marker("", 1).is_err());
        assert!(parse_marker("S", 1).is_err());
        assert!(parse_marker("0", 1).is_err());
        assert!(parse_marker("twelve", 1).is_err());
    }

    #[test]
    fn sanitize_produces_filename_safe_slugs() {
        assert_eq!(
            sanitize_title("On gauging finite subgroups"),
            "On_gauging_finite_subgroups"
        );
        assert_eq!(
            sanitize_title("Non-Hermitian physics: a review!"),
            "Non_Hermitian_physics_a_review"
        );
        assert_eq!(sanitize_title("  --  "), "");
    }

    #[test]
    fn sanitize_caps_length_at_forty() {
        let slug = sanitize_title(&"word ".repeat(20));
        assert_eq!(slug.chars().count(), 40);
    }

    #[test]
    fn target_path_replaces_slashes_in_old_ids() {
        let entry = SearchResult {
            id: "hep-th/9901001".to_string(),
            title: "A Paper".to_string(),
            authors: vec![],
            summary: String::new(),
            score: None,
        };
        assert_eq!(target_path(&entry), PathBuf::from("hep-th_9901001_A_Paper.pdf"));
    }

    #[test]
    fn save_pdf_skips_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("paper.pdf");

        assert!(save_pdf(&path, b"%PDF-1.4 first").unwrap());
        assert!(!save_pdf(&path, b"%PDF-1.4 second").unwrap());
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.4 first");
    }
}
