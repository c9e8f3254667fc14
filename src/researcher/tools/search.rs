// SPDX-License-Identifier: MIT

//! Contact search over Google Custom Search

use crate::adk::error::ResearcherError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::env;

const CSE_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";

/// Custom Search returns at most this many results per request
pub const MAX_RESULTS: u32 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub link: String,
    #[serde(default)]
    pub snippet: String,
}

/// Web search used to find public profiles
#[async_trait]
pub trait ContactSearch: Send + Sync {
    async fn search(&self, query: &str, count: u32) -> Result<Vec<SearchHit>, ResearcherError>;
}

/// Build a LinkedIn profile query for people with any of `titles` at `company`
///
/// Every term is quoted as a phrase. Quotes inside a term would end the phrase
/// early, so they are dropped.
pub fn linkedin_query(company: &str, titles: &[&str]) -> String {
    let titles = titles
        .iter()
        .map(|t| phrase(t))
        .filter(|t| t.len() > 2)
        .collect::<Vec<_>>()
        .join(" OR ");
    format!("site:linkedin.com/in {} ({})", phrase(company), titles)
}

fn phrase(term: &str) -> String {
    let term: String = term.chars().filter(|c| *c != '"').collect();
    format!("\"{}\"", term.trim())
}

pub struct GoogleCseSearch {
    client: Client,
    api_key: String,
    engine_id: String,
}

impl GoogleCseSearch {
    pub fn new(api_key: impl Into<String>, engine_id: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            engine_id: engine_id.into(),
        }
    }

    /// Reads `GOOGLE_API_KEY_FOR_CSE` and `GOOGLE_CSE_ID`
    pub fn from_env() -> Result<Self, ResearcherError> {
        let api_key = env::var("GOOGLE_API_KEY_FOR_CSE")
            .map_err(|_| ResearcherError::config("GOOGLE_API_KEY_FOR_CSE must be set"))?;
        let engine_id = env::var("GOOGLE_CSE_ID")
            .map_err(|_| ResearcherError::config("GOOGLE_CSE_ID must be set"))?;
        Ok(Self::new(api_key, engine_id))
    }
}

#[async_trait]
impl ContactSearch for GoogleCseSearch {
    async fn search(&self, query: &str, count: u32) -> Result<Vec<SearchHit>, ResearcherError> {
        let count = count.clamp(1, MAX_RESULTS);

        let mut url = reqwest::Url::parse(CSE_ENDPOINT)
            .map_err(|e| ResearcherError::config(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("key", &self.api_key)
            .append_pair("cx", &self.engine_id)
            .append_pair("q", query)
            .append_pair("num", &count.to_string());

        log::debug!("Custom Search query: {}", query);

        let resp = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await?;
            return Err(ResearcherError::api("custom_search", format!("{}: {}", status, text)));
        }

        let body: Value = resp.json().await?;
        let hits = parse_hits(&body)?;
        log::info!("Custom Search returned {} results", hits.len());
        Ok(hits)
    }
}

/// `items` is absent when nothing matched
fn parse_hits(body: &Value) -> Result<Vec<SearchHit>, ResearcherError> {
    match body.get("items") {
        None => Ok(vec![]),
        Some(items) => Ok(serde_json::from_value(items.clone())?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_linkedin_query() {
        let query = linkedin_query("Acme Corp", &["CTO", "VP Engineering"]);
        assert_eq!(
            query,
            r#"site:linkedin.com/in "Acme Corp" ("CTO" OR "VP Engineering")"#
        );
    }

    #[test]
    fn test_linkedin_query_drops_embedded_quotes() {
        let query = linkedin_query(r#"Acme "Labs""#, &[r#"VP "Sales""#, r#""""#]);
        assert_eq!(query, r#"site:linkedin.com/in "Acme Labs" ("VP Sales")"#);
    }

    #[test]
    fn test_parse_hits() {
        let body = json!({
            "items": [
                { "title": "Jane Doe - CTO - Acme", "link": "https://linkedin.com/in/jane", "snippet": "CTO at Acme" },
                { "title": "John Roe", "link": "https://linkedin.com/in/john" }
            ]
        });
        let hits = parse_hits(&body).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].link, "https://linkedin.com/in/jane");
        assert_eq!(hits[1].snippet, "");
    }

    #[test]
    fn test_parse_no_items() {
        let hits = parse_hits(&json!({ "searchInformation": { "totalResults": "0" } })).unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn test_parse_malformed_items() {
        let err = parse_hits(&json!({ "items": [{ "title": 3 }] })).unwrap_err();
        assert!(matches!(err, ResearcherError::Json(_)));
    }
}
