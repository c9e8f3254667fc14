// SPDX-License-Identifier: MIT

//! Lead-only pipeline: find people at a company, then summarize the search

pub mod graph;
pub mod state;
pub mod steps;

use std::sync::Arc;

use crate::adk::error::ResearcherError;
use crate::adk::model::gemini::GeminiModel;
use crate::adk::model::Model;
use crate::researcher::config::LeadConfig;

pub use graph::build_lead_graph;
pub use state::{LeadInput, LeadOutput, LeadProfile, LeadState};

pub const IDENTIFY_LEADS: &str = "identify_leads";
pub const CREATE_SUMMARY_REPORT: &str = "create_summary_report";

#[derive(Clone)]
pub struct LeadContext {
    pub model: Arc<dyn Model>,
    pub config: LeadConfig,
}

impl LeadContext {
    pub fn from_env(config: LeadConfig) -> Result<Self, ResearcherError> {
        Ok(Self {
            model: Arc::new(GeminiModel::from_env()?),
            config,
        })
    }
}
