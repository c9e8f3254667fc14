// SPDX-License-Identifier: MIT

//! Content-research pipeline
//!
//! Web (or company-focused) research, optional lead identification and
//! contact search, optional video analysis, a synthesized markdown report
//! and an optional two-host podcast.

pub mod graph;
pub mod routers;
pub mod state;
pub mod steps;

use std::sync::Arc;

use crate::adk::error::ResearcherError;
use crate::adk::model::gemini::GeminiModel;
use crate::adk::model::{Model, SpeechSynthesizer};
use crate::researcher::config::ResearchConfig;
use crate::researcher::tools::{BlobStore, ContactSearch, GcsBlobStore, GoogleCseSearch};

pub use graph::build_research_graph;
pub use state::{ResearchApproach, ResearchInput, ResearchOutput, ResearchState};

pub const SEARCH_RESEARCH: &str = "search_research";
pub const COMPANY_TOPIC_RESEARCH: &str = "company_topic_research";
pub const IDENTIFY_LEADS: &str = "identify_leads";
pub const SEARCH_CONTACTS: &str = "search_contacts";
pub const ANALYZE_VIDEO: &str = "analyze_video";
pub const CREATE_REPORT: &str = "create_report";
pub const CREATE_PODCAST: &str = "create_podcast";

/// Collaborators shared by every run of the research graph
///
/// Optional collaborators that are `None` make the steps that need them
/// degrade instead of fail.
#[derive(Clone)]
pub struct ResearchContext {
    pub model: Arc<dyn Model>,
    pub speech: Arc<dyn SpeechSynthesizer>,
    pub contact_search: Option<Arc<dyn ContactSearch>>,
    pub storage: Option<Arc<dyn BlobStore>>,
    pub config: ResearchConfig,
}

impl ResearchContext {
    /// Gemini for text and speech; contact search and storage when their
    /// credentials are present
    pub fn from_env(config: ResearchConfig) -> Result<Self, ResearcherError> {
        let gemini = Arc::new(GeminiModel::from_env()?);

        let contact_search: Option<Arc<dyn ContactSearch>> = match GoogleCseSearch::from_env() {
            Ok(search) => Some(Arc::new(search)),
            Err(e) => {
                log::warn!("Contact search disabled: {}", e);
                None
            }
        };

        let storage: Option<Arc<dyn BlobStore>> = match GcsBlobStore::from_env() {
            Ok(store) => Some(Arc::new(store)),
            Err(e) => {
                log::warn!("Cloud storage disabled: {}", e);
                None
            }
        };

        Ok(Self {
            model: gemini.clone(),
            speech: gemini,
            contact_search,
            storage,
            config,
        })
    }
}

/// File-name-safe form of a topic or company name
///
/// Keeps alphanumerics, spaces, hyphens and underscores, trims trailing
/// whitespace, then turns spaces into underscores.
pub fn safe_name(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect::<String>()
        .trim_end()
        .replace(' ', "_")
}
