// SPDX-License-Identifier: MIT

//! State of the lead-only pipeline

use serde::{Deserialize, Serialize};

use crate::researcher::workflow::state::{GraphState, Outcome};

/// Caller-supplied fields
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LeadInput {
    pub company_name: String,
    #[serde(default)]
    pub lead_generation_area: String,
    #[serde(default)]
    pub titles: Vec<String>,
}

/// A person found by the lead search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadProfile {
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub linkedin_url: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct LeadState {
    pub company_name: String,
    pub lead_generation_area: String,
    pub titles: Vec<String>,

    pub raw_search_results: Option<String>,
    pub leads: Option<Outcome<Vec<LeadProfile>>>,
    pub report: Option<Outcome<String>>,
}

impl LeadState {
    pub fn titles(&self) -> Vec<&str> {
        self.titles
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_search_results: Option<String>,
    pub leads: Outcome<Vec<LeadProfile>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryUpdate {
    pub report: Outcome<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum LeadUpdate {
    Search(SearchUpdate),
    Summary(SummaryUpdate),
}

impl From<SearchUpdate> for LeadUpdate {
    fn from(u: SearchUpdate) -> Self {
        LeadUpdate::Search(u)
    }
}

impl From<SummaryUpdate> for LeadUpdate {
    fn from(u: SummaryUpdate) -> Self {
        LeadUpdate::Summary(u)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LeadOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leads: Option<Outcome<Vec<LeadProfile>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<Outcome<String>>,
}

impl GraphState for LeadState {
    type Input = LeadInput;
    type Output = LeadOutput;
    type Update = LeadUpdate;

    fn from_input(input: LeadInput) -> Self {
        Self {
            company_name: input.company_name,
            lead_generation_area: input.lead_generation_area,
            titles: input.titles,
            ..Self::default()
        }
    }

    fn apply(&mut self, update: LeadUpdate) {
        match update {
            LeadUpdate::Search(u) => {
                if u.raw_search_results.is_some() {
                    self.raw_search_results = u.raw_search_results;
                }
                self.leads = Some(u.leads);
            }
            LeadUpdate::Summary(u) => self.report = Some(u.report),
        }
    }

    fn into_output(self) -> LeadOutput {
        LeadOutput {
            leads: self.leads,
            report: self.report,
        }
    }
}
