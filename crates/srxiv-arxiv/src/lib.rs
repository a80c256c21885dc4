//! Client for the arXiv export API.
//!
//! Two operations: [`ArxivClient::search`] runs a query against the Atom
//! feed endpoint, [`ArxivClient::download_pdf`] fetches the PDF for a
//! known identifier.

mod feed;

use srxiv_core::{SearchQuery, SearchResult};

const API_BASE: &str = "https://export.arxiv.org/api/query";
const PDF_BASE: &str = "https://arxiv.org/pdf";

pub const DEFAULT_MAX_RESULTS: usize = 10;

#[derive(Debug, thiserror::Error)]
pub enum ArxivError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("arXiv API returned HTTP {status}")]
    RemoteApi { status: u16 },
    #[error("malformed Atom feed: {0}")]
    InvalidFeed(String),
    #[error("downloaded body is not a PDF")]
    NotAPdf,
}

pub struct ArxivClient {
    client: reqwest::Client,
    max_results: usize,
}

impl ArxivClient {
    pub fn new(max_results: usize) -> Self {
        Self {
            client: reqwest::Client::new(),
            max_results,
        }
    }

    /// Run a search query and return the feed entries in API order.
    pub async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchResult>, ArxivError> {
        let url = self.query_url(query);
        tracing::debug!(%url, "querying arXiv");

        let resp = self.client.get(&url).send().await?;
        if !resp.status().is_success() {
            return Err(ArxivError::RemoteApi {
                status: resp.status().as_u16(),
            });
        }

        let body = resp.text().await?;
        let results = feed::parse(&body)?;
        tracing::debug!(count = results.len(), "arXiv returned entries");
        Ok(results)
    }

    /// Download the PDF for an arXiv identifier. The body is checked for
    /// the `%PDF` magic: arXiv serves an HTML error page with status 200
    /// for withdrawn or nonexistent papers.
    pub async fn download_pdf(&self, arxiv_id: &str) -> Result<Vec<u8>, ArxivError> {
        let url = format!("{PDF_BASE}/{arxiv_id}");
        tracing::debug!(%url, "downloading PDF");

        let resp = self.client.get(&url).send().await?;
        if !resp.status().is_success() {
            return Err(ArxivError::RemoteApi {
                status: resp.status().as_u16(),
            });
        }

        let body = resp.bytes().await?;
        if !body.starts_with(b"%PDF") {
            return Err(ArxivError::NotAPdf);
        }
        Ok(body.to_vec())
    }

    fn query_url(&self, query: &SearchQuery) -> String {
        match query {
            SearchQuery::Lookup { arxiv_id } => {
                format!("{API_BASE}?id_list={}", urlencoding::encode(arxiv_id))
            }
            SearchQuery::Keywords {
                author_terms,
                title_terms,
            } => {
                let mut terms: Vec<String> = author_terms
                    .iter()
                    .map(|a| format!("au:{a}"))
                    .collect();
                terms.extend(title_terms.iter().cloned());
                let search = terms.join(" ");
                format!(
                    "{API_BASE}?search_query={}&start=0&max_results={}",
                    urlencoding::encode(&search),
                    self.max_results
                )
            }
        }
    }
}
