// SPDX-License-Identifier: MIT

//! State of the content-research pipeline

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::adk::model::GroundingSource;
use crate::researcher::tools::search::SearchHit;
use crate::researcher::tools::storage::Published;
use crate::researcher::workflow::state::{GraphState, Outcome};

/// Which entry branch the caller asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ResearchApproach {
    #[default]
    #[serde(rename = "Topic Only")]
    TopicOnly,
    #[serde(rename = "Topic Company Leads")]
    TopicCompanyLeads,
}

/// Caller-supplied fields
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResearchInput {
    pub topic: String,
    #[serde(default)]
    pub research_approach: ResearchApproach,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub title_areas: Option<Vec<String>>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub create_podcast: bool,
}

/// Grounded web research on the topic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebResearch {
    pub text: String,
    pub sources: Vec<GroundingSource>,
}

/// Topic research in the context of one company
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyResearch {
    /// How the topic applies to the company
    pub topic_text: String,
    /// General company information, when the model produced that section
    pub company_info: Option<String>,
    pub sources: Vec<GroundingSource>,
}

/// A decision maker named alongside a lead
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct NamedBuyer {
    pub buyer_name: String,
    #[serde(default)]
    pub buyer_title: Option<String>,
    #[serde(default)]
    pub buyer_rationale: Option<String>,
}

/// A person at the target company worth contacting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Lead {
    pub lead_name: String,
    #[serde(default)]
    pub lead_title: Option<String>,
    #[serde(default)]
    pub lead_department: Option<String>,
    #[serde(default)]
    pub linkedin_url: Option<String>,
    #[serde(default)]
    pub summary_of_relevance: Option<String>,
    #[serde(default)]
    pub named_buyers: Vec<NamedBuyer>,
}

/// Everything learned during one research run
#[derive(Debug, Clone, Default)]
pub struct ResearchState {
    pub topic: String,
    pub research_approach: ResearchApproach,
    pub company_name: Option<String>,
    pub title_areas: Option<Vec<String>>,
    pub video_url: Option<String>,
    pub create_podcast: bool,

    pub search: Option<Outcome<WebResearch>>,
    pub company_research: Option<Outcome<CompanyResearch>>,
    pub identified_leads: Option<Outcome<Vec<Lead>>>,
    pub linkedin_contacts: Option<Outcome<Vec<SearchHit>>>,
    pub video_text: Option<Outcome<String>>,
    pub synthesis_text: Option<String>,

    pub report: Option<Outcome<Published>>,
    pub podcast_script: Option<Outcome<String>>,
    pub podcast_url: Option<Outcome<Published>>,
}

impl ResearchState {
    /// Non-blank title areas
    pub fn titles(&self) -> Vec<&str> {
        self.title_areas
            .iter()
            .flatten()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .collect()
    }
}

// --- Per-step updates ---

#[derive(Debug, Clone, Serialize)]
pub struct SearchUpdate {
    pub search: Outcome<WebResearch>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompanyResearchUpdate {
    pub company_research: Outcome<CompanyResearch>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LeadsUpdate {
    pub identified_leads: Outcome<Vec<Lead>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContactsUpdate {
    pub linkedin_contacts: Outcome<Vec<SearchHit>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VideoUpdate {
    pub video_text: Outcome<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportUpdate {
    pub report: Outcome<Published>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub synthesis_text: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PodcastUpdate {
    pub podcast_script: Outcome<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub podcast_url: Option<Outcome<Published>>,
}

/// Update returned by any research step
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ResearchUpdate {
    Search(SearchUpdate),
    CompanyResearch(CompanyResearchUpdate),
    Leads(LeadsUpdate),
    Contacts(ContactsUpdate),
    Video(VideoUpdate),
    Report(ReportUpdate),
    Podcast(PodcastUpdate),
}

macro_rules! into_update {
    ($($ty:ident => $variant:ident),* $(,)?) => {
        $(impl From<$ty> for ResearchUpdate {
            fn from(u: $ty) -> Self {
                ResearchUpdate::$variant(u)
            }
        })*
    };
}

into_update! {
    SearchUpdate => Search,
    CompanyResearchUpdate => CompanyResearch,
    LeadsUpdate => Leads,
    ContactsUpdate => Contacts,
    VideoUpdate => Video,
    ReportUpdate => Report,
    PodcastUpdate => Podcast,
}

/// Fields returned to the caller
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResearchOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<Outcome<Published>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub podcast_script: Option<Outcome<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub podcast_url: Option<Outcome<Published>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identified_leads: Option<Outcome<Vec<Lead>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin_contacts: Option<Outcome<Vec<SearchHit>>>,
}

impl GraphState for ResearchState {
    type Input = ResearchInput;
    type Output = ResearchOutput;
    type Update = ResearchUpdate;

    fn from_input(input: ResearchInput) -> Self {
        Self {
            topic: input.topic,
            research_approach: input.research_approach,
            company_name: input.company_name,
            title_areas: input.title_areas,
            video_url: input.video_url,
            create_podcast: input.create_podcast,
            ..Self::default()
        }
    }

    fn apply(&mut self, update: ResearchUpdate) {
        match update {
            ResearchUpdate::Search(u) => self.search = Some(u.search),
            ResearchUpdate::CompanyResearch(u) => self.company_research = Some(u.company_research),
            ResearchUpdate::Leads(u) => self.identified_leads = Some(u.identified_leads),
            ResearchUpdate::Contacts(u) => self.linkedin_contacts = Some(u.linkedin_contacts),
            ResearchUpdate::Video(u) => self.video_text = Some(u.video_text),
            ResearchUpdate::Report(u) => {
                self.report = Some(u.report);
                if let Some(text) = u.synthesis_text {
                    self.synthesis_text = Some(text);
                }
            }
            ResearchUpdate::Podcast(u) => {
                self.podcast_script = Some(u.podcast_script);
                if let Some(url) = u.podcast_url {
                    self.podcast_url = Some(url);
                }
            }
        }
    }

    fn into_output(self) -> ResearchOutput {
        ResearchOutput {
            report: self.report,
            podcast_script: self.podcast_script,
            podcast_url: self.podcast_url,
            identified_leads: self.identified_leads,
            linkedin_contacts: self.linkedin_contacts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_input_defaults() {
        let input: ResearchInput = serde_json::from_value(json!({ "topic": "Rust" })).unwrap();
        assert_eq!(input.research_approach, ResearchApproach::TopicOnly);
        assert!(!input.create_podcast);
        assert!(input.video_url.is_none());
    }

    #[test]
    fn test_input_approach_names() {
        let input: ResearchInput = serde_json::from_value(json!({
            "topic": "CRM",
            "research_approach": "Topic Company Leads",
            "company_name": "Acme",
            "title_areas": ["CTO"]
        }))
        .unwrap();
        assert_eq!(input.research_approach, ResearchApproach::TopicCompanyLeads);
    }

    #[test]
    fn test_input_rejects_unknown_fields() {
        let result: Result<ResearchInput, _> =
            serde_json::from_value(json!({ "topic": "x", "podcast": true }));
        assert!(result.is_err());
    }

    #[test]
    fn test_apply_leaves_other_fields() {
        let mut state = ResearchState::from_input(ResearchInput {
            topic: "Rust".to_string(),
            ..Default::default()
        });
        state.apply(
            SearchUpdate {
                search: Outcome::Ready(WebResearch {
                    text: "overview".to_string(),
                    sources: vec![],
                }),
            }
            .into(),
        );
        state.apply(
            VideoUpdate {
                video_text: Outcome::Ready("video".to_string()),
            }
            .into(),
        );
        assert_eq!(state.topic, "Rust");
        assert!(state.search.as_ref().unwrap().is_ready());
        assert!(state.video_text.as_ref().unwrap().is_ready());
    }

    #[test]
    fn test_output_omits_intermediates() {
        let mut state = ResearchState::from_input(ResearchInput {
            topic: "Rust".to_string(),
            ..Default::default()
        });
        state.apply(
            ReportUpdate {
                report: Outcome::Ready(Published::Inline {
                    content: "# Report".to_string(),
                }),
                synthesis_text: Some("synthesis".to_string()),
            }
            .into(),
        );
        let json = serde_json::to_value(state.into_output()).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.keys().collect::<Vec<_>>(), vec!["report"]);
    }

    #[test]
    fn test_titles_skips_blank() {
        let state = ResearchState {
            title_areas: Some(vec!["CTO".into(), "  ".into(), " VP Sales ".into()]),
            ..Default::default()
        };
        assert_eq!(state.titles(), vec!["CTO", "VP Sales"]);
    }

    #[test]
    fn test_lead_tolerates_missing_optional_fields() {
        let lead: Lead = serde_json::from_value(json!({ "lead_name": "Ada" })).unwrap();
        assert!(lead.named_buyers.is_empty());
        assert!(lead.lead_title.is_none());
    }
}
