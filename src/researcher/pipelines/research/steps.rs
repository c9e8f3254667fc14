// SPDX-License-Identifier: MIT

//! Steps of the content-research pipeline

use async_trait::async_trait;
use uuid::Uuid;

use super::state::*;
use super::{safe_name, ResearchContext};
use super::{
    ANALYZE_VIDEO, COMPANY_TOPIC_RESEARCH, CREATE_PODCAST, CREATE_REPORT, IDENTIFY_LEADS,
    SEARCH_CONTACTS, SEARCH_RESEARCH,
};
use crate::adk::error::ResearcherError;
use crate::adk::model::{Content, GenerationConfig, ModelTool, Part};
use crate::adk::speech::encode_wave;
use crate::researcher::parse::{extract_json_list, split_sections};
use crate::researcher::prompts;
use crate::researcher::report::{self, CompanySection, ReportInputs};
use crate::researcher::tools::search::linkedin_query;
use crate::researcher::tools::storage::{publish_text, Published};
use crate::researcher::workflow::state::{non_blank, ready, DegradationReason, Outcome};
use crate::researcher::workflow::step::Step;

fn missing<T>(step: &str, field: &str) -> Outcome<T> {
    Outcome::degraded(step, DegradationReason::MissingInput(field.to_string()))
}

fn blank(s: &str) -> Option<&str> {
    Some(s.trim()).filter(|s| !s.is_empty())
}

/// Grounded web search on the topic
pub struct SearchResearch;

#[async_trait]
impl Step<ResearchState, ResearchContext> for SearchResearch {
    type Output = SearchUpdate;

    async fn run(
        &self,
        state: &ResearchState,
        ctx: &ResearchContext,
    ) -> Result<SearchUpdate, ResearcherError> {
        let Some(topic) = blank(&state.topic) else {
            return Ok(SearchUpdate {
                search: missing(SEARCH_RESEARCH, "topic"),
            });
        };

        let cfg = &ctx.config;
        let generation = ctx
            .model
            .generate_content(
                &cfg.search_model,
                &[Content::user_text(prompts::web_research(topic))],
                &GenerationConfig::with_temperature(cfg.search_temperature),
                &[ModelTool::GoogleSearch],
            )
            .await?;

        let text = generation.text();
        if text.trim().is_empty() {
            return Ok(SearchUpdate {
                search: Outcome::degraded(SEARCH_RESEARCH, DegradationReason::EmptyResponse),
            });
        }

        log::debug!(
            "Web research returned {} chars, {} sources",
            text.len(),
            generation.sources.len()
        );
        Ok(SearchUpdate {
            search: Outcome::Ready(WebResearch {
                text,
                sources: generation.sources,
            }),
        })
    }
}

/// Topic research in the context of the target company
pub struct CompanyTopicResearch;

#[async_trait]
impl Step<ResearchState, ResearchContext> for CompanyTopicResearch {
    type Output = CompanyResearchUpdate;

    async fn run(
        &self,
        state: &ResearchState,
        ctx: &ResearchContext,
    ) -> Result<CompanyResearchUpdate, ResearcherError> {
        let Some(company) = non_blank(&state.company_name) else {
            return Ok(CompanyResearchUpdate {
                company_research: missing(COMPANY_TOPIC_RESEARCH, "company_name"),
            });
        };
        let Some(topic) = blank(&state.topic) else {
            return Ok(CompanyResearchUpdate {
                company_research: missing(COMPANY_TOPIC_RESEARCH, "topic"),
            });
        };

        let cfg = &ctx.config;
        let prompt = prompts::company_topic_research(topic, company);
        let generation = ctx
            .model
            .generate_content(
                &cfg.search_model,
                &[Content::user_text(prompt)],
                &GenerationConfig::with_temperature(cfg.search_temperature),
                &[ModelTool::GoogleSearch],
            )
            .await?;

        let text = generation.text();
        if text.trim().is_empty() {
            return Ok(CompanyResearchUpdate {
                company_research: Outcome::degraded(
                    COMPANY_TOPIC_RESEARCH,
                    DegradationReason::EmptyResponse,
                ),
            });
        }

        let sections = split_sections(&text, prompts::COMPANY_INFO_MARKER);
        if sections.secondary.is_none() {
            log::warn!(
                "Company research for {} has no '{}' section; using the whole text",
                company,
                prompts::COMPANY_INFO_MARKER
            );
        }

        Ok(CompanyResearchUpdate {
            company_research: Outcome::Ready(CompanyResearch {
                topic_text: sections.primary,
                company_info: sections.secondary.filter(|s| !s.is_empty()),
                sources: generation.sources,
            }),
        })
    }
}

/// Ask the model for people at the company matching the title areas
pub struct IdentifyLeads;

#[async_trait]
impl Step<ResearchState, ResearchContext> for IdentifyLeads {
    type Output = LeadsUpdate;

    async fn run(
        &self,
        state: &ResearchState,
        ctx: &ResearchContext,
    ) -> Result<LeadsUpdate, ResearcherError> {
        let Some(company) = non_blank(&state.company_name) else {
            return Ok(LeadsUpdate {
                identified_leads: missing(IDENTIFY_LEADS, "company_name"),
            });
        };
        let titles = state.titles();
        if titles.is_empty() {
            return Ok(LeadsUpdate {
                identified_leads: missing(IDENTIFY_LEADS, "title_areas"),
            });
        }

        let context = ready(&state.company_research)
            .map(|r| r.topic_text.as_str())
            .unwrap_or_default();

        let cfg = &ctx.config;
        let prompt = prompts::lead_identification(company, &titles, context);
        let generation = ctx
            .model
            .generate_content(
                &cfg.lead_identification_model,
                &[Content::user_text(prompt)],
                &GenerationConfig::with_temperature(cfg.lead_identification_temperature),
                &[ModelTool::GoogleSearch],
            )
            .await?;

        let text = generation.text();
        if text.trim().is_empty() {
            return Ok(LeadsUpdate {
                identified_leads: Outcome::degraded(
                    IDENTIFY_LEADS,
                    DegradationReason::EmptyResponse,
                ),
            });
        }

        let identified_leads = match extract_json_list::<Lead>(&text) {
            Ok(leads) => {
                log::info!("Identified {} leads at {}", leads.len(), company);
                Outcome::Ready(leads)
            }
            Err(e) => {
                log::debug!("Unparseable lead response: {}", text);
                Outcome::degraded(IDENTIFY_LEADS, DegradationReason::Unparseable(e.to_string()))
            }
        };

        Ok(LeadsUpdate { identified_leads })
    }
}

/// Public profile search for the title areas at the company
pub struct SearchContacts;

#[async_trait]
impl Step<ResearchState, ResearchContext> for SearchContacts {
    type Output = ContactsUpdate;

    async fn run(
        &self,
        state: &ResearchState,
        ctx: &ResearchContext,
    ) -> Result<ContactsUpdate, ResearcherError> {
        let Some(company) = non_blank(&state.company_name) else {
            return Ok(ContactsUpdate {
                linkedin_contacts: missing(SEARCH_CONTACTS, "company_name"),
            });
        };
        let titles = state.titles();
        if titles.is_empty() {
            return Ok(ContactsUpdate {
                linkedin_contacts: missing(SEARCH_CONTACTS, "title_areas"),
            });
        }
        let Some(search) = &ctx.contact_search else {
            return Ok(ContactsUpdate {
                linkedin_contacts: Outcome::degraded(
                    SEARCH_CONTACTS,
                    DegradationReason::Unconfigured("contact search".to_string()),
                ),
            });
        };

        let query = linkedin_query(company, &titles);
        let hits = search
            .search(&query, ctx.config.contact_search_results)
            .await?;

        Ok(ContactsUpdate {
            linkedin_contacts: Outcome::Ready(hits),
        })
    }
}

/// Summarize the video in relation to the topic
pub struct AnalyzeVideo;

#[async_trait]
impl Step<ResearchState, ResearchContext> for AnalyzeVideo {
    type Output = VideoUpdate;

    async fn run(
        &self,
        state: &ResearchState,
        ctx: &ResearchContext,
    ) -> Result<VideoUpdate, ResearcherError> {
        let Some(video_url) = non_blank(&state.video_url) else {
            return Ok(VideoUpdate {
                video_text: missing(ANALYZE_VIDEO, "video_url"),
            });
        };

        let contents = [Content {
            role: "user".to_string(),
            parts: vec![
                Part::FileData {
                    file_uri: video_url.to_string(),
                    mime_type: None,
                },
                Part::Text(prompts::video_analysis(&state.topic)),
            ],
        }];

        let generation = ctx
            .model
            .generate_content(
                &ctx.config.video_model,
                &contents,
                &GenerationConfig::default(),
                &[],
            )
            .await?;

        let text = generation.text();
        let video_text = if text.trim().is_empty() {
            Outcome::degraded(ANALYZE_VIDEO, DegradationReason::EmptyResponse)
        } else {
            Outcome::Ready(text)
        };
        Ok(VideoUpdate { video_text })
    }
}

/// Company-path inputs, present only when the company branch ran
fn company_section(state: &ResearchState) -> Option<CompanySection<'_>> {
    let name = non_blank(&state.company_name)?;
    state.company_research.as_ref()?;
    Some(CompanySection {
        name,
        research: state.company_research.as_ref(),
        leads: state.identified_leads.as_ref(),
        contacts: state.linkedin_contacts.as_ref(),
    })
}

/// Synthesize everything gathered into a published markdown report
pub struct CreateReport;

#[async_trait]
impl Step<ResearchState, ResearchContext> for CreateReport {
    type Output = ReportUpdate;

    async fn run(
        &self,
        state: &ResearchState,
        ctx: &ResearchContext,
    ) -> Result<ReportUpdate, ResearcherError> {
        let Some(topic) = blank(&state.topic) else {
            return Ok(ReportUpdate {
                report: missing(CREATE_REPORT, "topic"),
                synthesis_text: None,
            });
        };

        let company = company_section(state);
        let no_leads: Vec<Lead> = Vec::new();
        let materials = prompts::SynthesisMaterials {
            topic,
            search_text: ready(&state.search).map(|r| r.text.as_str()),
            video_text: ready(&state.video_text).map(String::as_str),
            company: company.as_ref().map(|c| {
                let research = c.research.and_then(Outcome::ready);
                prompts::CompanyMaterials {
                    company: c.name,
                    topic_text: research.map(|r| r.topic_text.as_str()).unwrap_or_default(),
                    company_info: research.and_then(|r| r.company_info.as_deref()),
                    leads: ready(&state.identified_leads).unwrap_or(&no_leads),
                }
            }),
        };

        let cfg = &ctx.config;
        let generation = ctx
            .model
            .generate_content(
                &cfg.synthesis_model,
                &[Content::user_text(prompts::synthesis(&materials))],
                &GenerationConfig::with_temperature(cfg.synthesis_temperature),
                &[],
            )
            .await?;

        let synthesis = generation.text();
        if synthesis.trim().is_empty() {
            return Ok(ReportUpdate {
                report: Outcome::degraded(CREATE_REPORT, DegradationReason::EmptyResponse),
                synthesis_text: None,
            });
        }

        let markdown = report::render(&ReportInputs {
            topic,
            synthesis: &synthesis,
            web_research: state.search.as_ref(),
            company,
            video_url: non_blank(&state.video_url),
            video: state.video_text.as_ref(),
        });

        let object = format!("reports/research_report_{}.md", safe_name(topic));
        let storage = ctx.storage.as_deref();
        let published = publish_text(storage, &object, markdown, "text/markdown").await?;
        log::info!("Report published: {}", published.location());

        Ok(ReportUpdate {
            report: Outcome::Ready(published),
            synthesis_text: Some(synthesis),
        })
    }
}

/// Text the podcast hosts discuss
fn podcast_material(state: &ResearchState) -> String {
    let primary = if state.research_approach == ResearchApproach::TopicCompanyLeads {
        ready(&state.company_research).and_then(|r| {
            let info = r.company_info.as_deref().and_then(blank);
            blank(&r.topic_text).or(info)
        })
    } else {
        ready(&state.search).and_then(|r| blank(&r.text))
    };

    primary
        .or_else(|| non_blank(&state.synthesis_text))
        .unwrap_or("No detailed research text available for podcast.")
        .to_string()
}

/// `research_podcast_<topic>[_<company>]_<run>.wav`, unique per run
fn podcast_filename(state: &ResearchState, run: &str) -> String {
    let company = match (&state.research_approach, non_blank(&state.company_name)) {
        (ResearchApproach::TopicCompanyLeads, Some(c)) => {
            let safe = safe_name(c);
            if safe.is_empty() {
                String::new()
            } else {
                format!("_{}", safe)
            }
        }
        _ => String::new(),
    };
    let topic = safe_name(&state.topic);
    format!("research_podcast_{}{}_{}.wav", topic, company, run)
}

/// Two-host dialogue script, rendered to speech and published
pub struct CreatePodcast;

#[async_trait]
impl Step<ResearchState, ResearchContext> for CreatePodcast {
    type Output = PodcastUpdate;

    async fn run(
        &self,
        state: &ResearchState,
        ctx: &ResearchContext,
    ) -> Result<PodcastUpdate, ResearcherError> {
        let Some(topic) = blank(&state.topic) else {
            return Ok(PodcastUpdate {
                podcast_script: missing(CREATE_PODCAST, "topic"),
                podcast_url: None,
            });
        };

        let cfg = &ctx.config;
        let material = podcast_material(state);
        let generation = ctx
            .model
            .generate_content(
                &cfg.synthesis_model,
                &[Content::user_text(prompts::podcast_script(
                    topic,
                    &material,
                    ready(&state.video_text).map(String::as_str),
                ))],
                &GenerationConfig::with_temperature(cfg.podcast_script_temperature),
                &[],
            )
            .await?;

        let script = generation.text();
        if script.trim().is_empty() {
            let reason = DegradationReason::EmptyResponse;
            return Ok(PodcastUpdate {
                podcast_script: Outcome::degraded(CREATE_PODCAST, reason),
                podcast_url: None,
            });
        }

        let pcm = ctx
            .speech
            .synthesize(&cfg.tts_model, &script, &cfg.voices())
            .await?;
        let wav = encode_wave(&pcm, &cfg.wave_format())?;

        let run = Uuid::new_v4().simple().to_string();
        let filename = podcast_filename(state, &run[..8]);
        tokio::fs::create_dir_all(&cfg.output_dir).await?;
        let path = cfg.output_dir.join(&filename);
        tokio::fs::write(&path, &wav).await?;
        log::info!("Podcast saved locally as {}", path.display());

        let published = match &ctx.storage {
            Some(storage) => {
                let object = format!("podcasts/{}", filename);
                let uploaded = storage.upload(&object, wav, "audio/wav").await;
                if let Err(e) = tokio::fs::remove_file(&path).await {
                    log::warn!("Failed to remove local file {}: {}", path.display(), e);
                }
                Published::SignedUrl { url: uploaded? }
            }
            None => {
                log::warn!("No storage; podcast kept at {}", path.display());
                Published::LocalFile {
                    path: path.display().to_string(),
                }
            }
        };

        Ok(PodcastUpdate {
            podcast_script: Outcome::Ready(script),
            podcast_url: Some(Outcome::Ready(published)),
        })
    }
}
