// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use super::state::{LeadProfile, LeadState, SearchUpdate, SummaryUpdate};
use super::{LeadContext, CREATE_SUMMARY_REPORT, IDENTIFY_LEADS};
use crate::adk::error::ResearcherError;
use crate::adk::model::{Content, GenerationConfig, ModelTool};
use crate::researcher::parse::extract_json_list;
use crate::researcher::prompts;
use crate::researcher::workflow::state::{ready, DegradationReason, Outcome};
use crate::researcher::workflow::step::Step;

/// Grounded search for people matching the area and titles
pub struct IdentifyLeads;

#[async_trait]
impl Step<LeadState, LeadContext> for IdentifyLeads {
    type Output = SearchUpdate;

    async fn run(
        &self,
        state: &LeadState,
        ctx: &LeadContext,
    ) -> Result<SearchUpdate, ResearcherError> {
        let company = state.company_name.trim();
        let titles = state.titles();
        if company.is_empty() || titles.is_empty() {
            let field = if company.is_empty() {
                "company_name"
            } else {
                "titles"
            };
            return Ok(SearchUpdate {
                raw_search_results: None,
                leads: Outcome::degraded(
                    IDENTIFY_LEADS,
                    DegradationReason::MissingInput(field.to_string()),
                ),
            });
        }

        let cfg = &ctx.config;
        let generation = ctx
            .model
            .generate_content(
                &cfg.lead_search_model,
                &[Content::user_text(prompts::lead_search(
                    company,
                    state.lead_generation_area.trim(),
                    &titles,
                ))],
                &GenerationConfig::with_temperature(cfg.lead_search_temperature),
                &[ModelTool::GoogleSearch],
            )
            .await?;

        let text = generation.text();
        let leads = match extract_json_list::<LeadProfile>(&text) {
            Ok(leads) => {
                log::info!("Found {} leads at {}", leads.len(), company);
                Outcome::Ready(leads)
            }
            Err(e) if text.trim().is_empty() => {
                log::debug!("Lead search returned no text: {}", e);
                Outcome::degraded(IDENTIFY_LEADS, DegradationReason::EmptyResponse)
            }
            Err(e) => {
                let reason = DegradationReason::Unparseable(e.to_string());
                Outcome::degraded(IDENTIFY_LEADS, reason)
            }
        };

        Ok(SearchUpdate {
            raw_search_results: Some(text),
            leads,
        })
    }
}

/// Short narrative over the search parameters and whatever was found
pub struct CreateSummaryReport;

#[async_trait]
impl Step<LeadState, LeadContext> for CreateSummaryReport {
    type Output = SummaryUpdate;

    async fn run(
        &self,
        state: &LeadState,
        ctx: &LeadContext,
    ) -> Result<SummaryUpdate, ResearcherError> {
        let leads = ready(&state.leads).map(Vec::as_slice).unwrap_or_default();
        let prompt = prompts::lead_summary(
            state.company_name.trim(),
            state.lead_generation_area.trim(),
            &state.titles(),
            leads,
        );

        let cfg = &ctx.config;
        let generation = ctx
            .model
            .generate_content(
                &cfg.report_generation_model,
                &[Content::user_text(prompt)],
                &GenerationConfig::with_temperature(cfg.report_generation_temperature),
                &[],
            )
            .await?;

        let text = generation.text();
        let report = if text.trim().is_empty() {
            Outcome::degraded(CREATE_SUMMARY_REPORT, DegradationReason::EmptyResponse)
        } else {
            Outcome::Ready(text)
        };
        Ok(SummaryUpdate { report })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adk::model::{Generation, Model, Part};
    use crate::researcher::config::LeadConfig;
    use std::sync::{Arc, Mutex};

    struct EchoModel {
        reply: String,
        prompts: Mutex<Vec<(String, String)>>,
    }

    impl EchoModel {
        fn new(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.to_string(),
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Model for EchoModel {
        async fn generate_content(
            &self,
            model: &str,
            contents: &[Content],
            _config: &GenerationConfig,
            _tools: &[ModelTool],
        ) -> Result<Generation, ResearcherError> {
            let prompt = match &contents[0].parts[0] {
                Part::Text(t) => t.clone(),
                _ => String::new(),
            };
            self.prompts
                .lock()
                .unwrap()
                .push((model.to_string(), prompt));
            Ok(Generation {
                parts: vec![Part::Text(self.reply.clone())],
                sources: vec![],
            })
        }
    }

    struct DownModel;

    #[async_trait]
    impl Model for DownModel {
        async fn generate_content(
            &self,
            _model: &str,
            _contents: &[Content],
            _config: &GenerationConfig,
            _tools: &[ModelTool],
        ) -> Result<Generation, ResearcherError> {
            Err(ResearcherError::api("gemini", "500 Internal"))
        }
    }

    fn ctx(model: Arc<dyn Model>) -> LeadContext {
        LeadContext {
            model,
            config: LeadConfig::default(),
        }
    }

    fn state() -> LeadState {
        LeadState {
            company_name: "Acme".to_string(),
            lead_generation_area: "Data platform".to_string(),
            titles: vec!["CTO".to_string(), "Head of Data".to_string()],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_identify_leads_parses_profiles() {
        let model = EchoModel::new(
            r#"```json
[{"name": "Ada Lovelace", "title": "CTO", "email": null, "linkedin_url": "https://linkedin.com/in/ada", "summary": "runs the data org"}]
```"#,
        );
        let update = IdentifyLeads
            .run(&state(), &ctx(model.clone()))
            .await
            .unwrap();

        let leads = update.leads.ready().unwrap();
        assert_eq!(leads[0].name, "Ada Lovelace");
        assert!(update.raw_search_results.unwrap().contains("Ada Lovelace"));

        let prompts = model.prompts.lock().unwrap();
        assert_eq!(prompts[0].0, "gemini-1.5-flash-latest");
        assert!(prompts[0].1.contains("Area/Department: \"Data platform\""));
        assert!(prompts[0].1.contains("'CTO', 'Head of Data'"));
    }

    #[tokio::test]
    async fn test_identify_leads_unparseable_keeps_raw_text() {
        let update = IdentifyLeads
            .run(&state(), &ctx(EchoModel::new("nobody found")))
            .await
            .unwrap();
        assert_eq!(update.raw_search_results.as_deref(), Some("nobody found"));
        assert!(matches!(
            update.leads.degradation().unwrap().reason,
            DegradationReason::Unparseable(_)
        ));
    }

    #[tokio::test]
    async fn test_identify_leads_without_company_degrades() {
        let mut s = state();
        s.company_name = " ".to_string();
        let model = EchoModel::new("[]");
        let update = IdentifyLeads.run(&s, &ctx(model.clone())).await.unwrap();
        assert_eq!(
            update.leads.degradation().unwrap().reason,
            DegradationReason::MissingInput("company_name".to_string())
        );
        assert!(model.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_summary_lists_found_leads() {
        let mut s = state();
        s.leads = Some(Outcome::Ready(vec![LeadProfile {
            name: "Ada".to_string(),
            title: Some("CTO".to_string()),
            email: None,
            linkedin_url: None,
            summary: None,
        }]));
        let model = EchoModel::new("Two strong leads.");
        let update = CreateSummaryReport
            .run(&s, &ctx(model.clone()))
            .await
            .unwrap();

        assert_eq!(update.report.ready().unwrap(), "Two strong leads.");
        let prompts = model.prompts.lock().unwrap();
        assert!(prompts[0].1.contains("- Ada (CTO)"));
    }

    #[tokio::test]
    async fn test_summary_after_degraded_search() {
        let mut s = state();
        s.leads = Some(Outcome::degraded(IDENTIFY_LEADS, DegradationReason::EmptyResponse));
        let model = EchoModel::new("No leads; widen the titles.");
        CreateSummaryReport
            .run(&s, &ctx(model.clone()))
            .await
            .unwrap();
        let prompts = model.prompts.lock().unwrap();
        assert!(prompts[0].1.contains("No specific leads were identified."));
    }

    #[tokio::test]
    async fn test_summary_empty_reply_degrades() {
        let update = CreateSummaryReport
            .run(&state(), &ctx(EchoModel::new("  ")))
            .await
            .unwrap();
        assert_eq!(
            update.report.degradation().unwrap().reason,
            DegradationReason::EmptyResponse
        );
    }

    #[tokio::test]
    async fn test_model_errors_propagate() {
        assert!(IdentifyLeads
            .run(&state(), &ctx(Arc::new(DownModel)))
            .await
            .is_err());
        assert!(CreateSummaryReport
            .run(&state(), &ctx(Arc::new(DownModel)))
            .await
            .is_err());
    }
}
