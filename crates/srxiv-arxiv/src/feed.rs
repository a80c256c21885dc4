//! Atom feed parsing for arXiv API responses.

use quick_xml::Reader;
use quick_xml::events::Event;
use srxiv_core::SearchResult;

use crate::ArxivError;

/// Parse an arXiv Atom feed into search results, in feed order.
///
/// The feed itself carries `<title>` and `<id>` elements, so those are
/// only collected while inside an `<entry>`.
pub fn parse(xml: &str) -> Result<Vec<SearchResult>, ArxivError> {
    let mut reader = Reader::from_str(xml);

    let mut results = Vec::new();

    let mut in_entry = false;
    let mut in_title = false;
    let mut in_author = false;
    let mut in_name = false;
    let mut in_id = false;
    let mut in_summary = false;

    let mut current_title = String::new();
    let mut current_authors: Vec<String> = Vec::new();
    let mut current_name = String::new();
    let mut current_id = String::new();
    let mut current_summary = String::new();

    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"entry" => {
                    in_entry = true;
                    current_title.clear();
                    current_authors.clear();
                    current_id.clear();
                    current_summary.clear();
                }
                b"title" if in_entry => {
                    in_title = true;
                    current_title.clear();
                }
                b"author" if in_entry => {
                    in_author = true;
                    current_name.clear();
                }
                b"name" if in_author => {
                    in_name = true;
                    current_name.clear();
                }
                b"id" if in_entry => {
                    in_id = true;
                    current_id.clear();
                }
                b"summary" if in_entry => {
                    in_summary = true;
                    current_summary.clear();
                }
                _ => {}
            },
            Ok(Event::Text(ref e)) => {
                let text = e.unescape().unwrap_or_default();
                if in_title && in_entry {
                    current_title.push_str(&text);
                }
                if in_name {
                    current_name.push_str(&text);
                }
                if in_id {
                    current_id.push_str(&text);
                }
                if in_summary {
                    current_summary.push_str(&text);
                }
            }
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"entry" => {
                    results.push(SearchResult {
                        id: strip_id_url(current_id.trim()),
                        title: collapse_whitespace(current_title.trim()),
                        authors: current_authors.clone(),
                        summary: collapse_whitespace(current_summary.trim()),
                        score: None,
                    });
                    in_entry = false;
                }
                b"title" => in_title = false,
                b"author" => {
                    if !current_name.is_empty() {
                        current_authors.push(current_name.trim().to_string());
                    }
                    in_author = false;
                }
                b"name" => in_name = false,
                b"id" => in_id = false,
                b"summary" => in_summary = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(ArxivError::InvalidFeed(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(results)
}

/// The entry `<id>` is an abs URL like `http://arxiv.org/abs/2301.12345v1`;
/// reduce it to the bare identifier.
fn strip_id_url(id: &str) -> String {
    match id.rfind("/abs/") {
        Some(pos) => id[pos + "/abs/".len()..].to_string(),
        None => id.to_string(),
    }
}

/// arXiv wraps long titles and summaries with newline + indent.
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title type="html">ArXiv Query: search_query=au:Tachikawa gauging</title>
  <id>http://arxiv.org/api/abc123</id>
  <entry>
    <id>http://arxiv.org/abs/1712.09542v3</id>
    <title>On gauging finite
 subgroups</title>
    <summary>  We study in general spacetime dimension the symmetry
 structure after gauging.
</summary>
    <author><name>Yuji Tachikawa</name></author>
  </entry>
  <entry>
    <id>http://arxiv.org/abs/2301.00001v1</id>
    <title>Another Paper &amp; Its Sequel</title>
    <summary>Abstract text.</summary>
    <author><name>First Author</name></author>
    <author><name>Second Author</name></author>
  </entry>
</feed>"#;

    #[test]
    fn parses_entries_in_feed_order() {
        let results = parse(FEED).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, "1712.09542v3");
        assert_eq!(results[0].title, "On gauging finite subgroups");
        assert_eq!(results[0].authors, vec!["Yuji Tachikawa"]);
        assert_eq!(
            results[0].summary,
            "We study in general spacetime dimension the symmetry structure after gauging."
        );
        assert!(results[0].score.is_none());
    }

    #[test]
    fn unescapes_entities_and_collects_all_authors() {
        let results = parse(FEED).unwrap();
        assert_eq!(results[1].title, "Another Paper & Its Sequel");
        assert_eq!(results[1].authors, vec!["First Author", "Second Author"]);
    }

    #[test]
    fn feed_level_title_and_id_are_ignored() {
        let results = parse(FEED).unwrap();
        assert!(!results[0].title.contains("ArXiv Query"));
        assert!(!results[0].id.contains("api"));
    }

    #[test]
    fn empty_feed_yields_no_results() {
        let xml = r#"<feed xmlns="http://www.w3.org/2005/Atom"><title>ArXiv Query</title></feed>"#;
        assert!(parse(xml).unwrap().is_empty());
    }

    #[test]
    fn malformed_xml_is_an_error() {
        assert!(matches!(
            parse("<feed><entry><title>bad</wrong></entry></feed>"),
            Err(ArxivError::InvalidFeed(_))
        ));
    }
}
