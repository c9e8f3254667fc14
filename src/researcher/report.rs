// SPDX-License-Identifier: MIT

//! Markdown rendering of the final research report

use std::fmt::Write;

use crate::adk::model::GroundingSource;
use crate::researcher::pipelines::research::state::{CompanyResearch, Lead, WebResearch};
use crate::researcher::tools::search::SearchHit;
use crate::researcher::workflow::state::{Outcome, StepDegradation};

/// Company-path sections
pub struct CompanySection<'a> {
    pub name: &'a str,
    pub research: Option<&'a Outcome<CompanyResearch>>,
    pub leads: Option<&'a Outcome<Vec<Lead>>>,
    pub contacts: Option<&'a Outcome<Vec<SearchHit>>>,
}

pub struct ReportInputs<'a> {
    pub topic: &'a str,
    pub synthesis: &'a str,
    pub web_research: Option<&'a Outcome<WebResearch>>,
    pub company: Option<CompanySection<'a>>,
    pub video_url: Option<&'a str>,
    pub video: Option<&'a Outcome<String>>,
}

pub fn render(inputs: &ReportInputs<'_>) -> String {
    let mut out = String::new();

    // Writing to a String cannot fail
    let _ = writeln!(out, "# Research Report: {}\n", inputs.topic);
    let _ = writeln!(out, "## Executive Summary\n\n{}\n", inputs.synthesis.trim());

    if let Some(company) = &inputs.company {
        render_company(&mut out, company);
    }

    if let Some(url) = inputs.video_url {
        let _ = writeln!(out, "## Video Source\n- **URL**: {}", url);
        if let Some(Outcome::Degraded(d)) = inputs.video {
            not_available(&mut out, d);
        }
        out.push('\n');
    }

    out.push_str("## Additional Sources\n");
    if let Some(Outcome::Degraded(d)) = inputs.web_research {
        not_available(&mut out, d);
    }
    let sources = collect_sources(inputs);
    if sources.is_empty() {
        out.push_str("No grounding sources were returned.\n");
    } else {
        for (i, s) in sources.iter().enumerate() {
            let _ = writeln!(out, "{}. {}\n   {}", i + 1, s.title, s.uri);
        }
    }

    out.push_str("\n---\n*Report generated using multi-modal AI research combining web search and video analysis*\n");
    out
}

fn render_company(out: &mut String, company: &CompanySection<'_>) {
    let _ = writeln!(out, "## Company Context: {}\n", company.name);
    match company.research {
        Some(Outcome::Ready(r)) => {
            let _ = writeln!(out, "{}\n", r.topic_text.trim());
            if let Some(info) = &r.company_info {
                let _ = writeln!(out, "### General Company Information\n\n{}\n", info.trim());
            }
        }
        Some(Outcome::Degraded(d)) => {
            not_available(out, d);
            out.push('\n');
        }
        None => out.push_str("No company research was performed.\n\n"),
    }

    out.push_str("## Identified Leads\n\n");
    match company.leads {
        Some(Outcome::Ready(leads)) if leads.is_empty() => {
            out.push_str("No leads were identified.\n\n");
        }
        Some(Outcome::Ready(leads)) => {
            for lead in leads {
                render_lead(out, lead);
            }
        }
        Some(Outcome::Degraded(d)) => {
            not_available(out, d);
            out.push('\n');
        }
        None => out.push_str("No leads were identified.\n\n"),
    }

    out.push_str("## LinkedIn Contacts\n\n");
    match company.contacts {
        Some(Outcome::Ready(hits)) if hits.is_empty() => {
            out.push_str("No contacts were found.\n\n");
        }
        Some(Outcome::Ready(hits)) => {
            for hit in hits {
                let _ = write!(out, "- [{}]({})", hit.title, hit.link);
                if !hit.snippet.is_empty() {
                    let _ = write!(out, ": {}", hit.snippet.replace('\n', " "));
                }
                out.push('\n');
            }
            out.push('\n');
        }
        Some(Outcome::Degraded(d)) => {
            not_available(out, d);
            out.push('\n');
        }
        None => out.push_str("No contacts were found.\n\n"),
    }
}

fn render_lead(out: &mut String, lead: &Lead) {
    let _ = writeln!(out, "### {}", lead.lead_name);
    if let Some(title) = &lead.lead_title {
        let _ = writeln!(out, "- **Title**: {}", title);
    }
    if let Some(dept) = &lead.lead_department {
        let _ = writeln!(out, "- **Department**: {}", dept);
    }
    if let Some(url) = &lead.linkedin_url {
        let _ = writeln!(out, "- **LinkedIn**: {}", url);
    }
    if let Some(why) = &lead.summary_of_relevance {
        let _ = writeln!(out, "- **Relevance**: {}", why);
    }
    if !lead.named_buyers.is_empty() {
        out.push_str("- **Named buyers**:\n");
        for buyer in &lead.named_buyers {
            let _ = write!(out, "  - {}", buyer.buyer_name);
            if let Some(title) = &buyer.buyer_title {
                let _ = write!(out, " ({})", title);
            }
            if let Some(why) = &buyer.buyer_rationale {
                let _ = write!(out, ": {}", why);
            }
            out.push('\n');
        }
    }
    out.push('\n');
}

fn not_available(out: &mut String, d: &StepDegradation) {
    let _ = writeln!(out, "> Not available: {}", d.reason);
}

fn collect_sources<'a>(inputs: &ReportInputs<'a>) -> Vec<&'a GroundingSource> {
    let mut sources: Vec<&GroundingSource> = Vec::new();
    if let Some(Outcome::Ready(r)) = inputs.web_research {
        sources.extend(&r.sources);
    }
    if let Some(company) = &inputs.company {
        if let Some(Outcome::Ready(r)) = company.research {
            sources.extend(&r.sources);
        }
    }
    let mut seen = std::collections::HashSet::new();
    sources.retain(|s| seen.insert(s.uri.as_str()));
    sources
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::researcher::pipelines::research::state::NamedBuyer;
    use crate::researcher::workflow::state::DegradationReason;

    fn source(title: &str, uri: &str) -> GroundingSource {
        GroundingSource {
            title: title.to_string(),
            uri: uri.to_string(),
        }
    }

    #[test]
    fn test_topic_only_report() {
        let research = Outcome::Ready(WebResearch {
            text: "overview".to_string(),
            sources: vec![source("Rust Book", "https://doc.rust-lang.org/book")],
        });
        let report = render(&ReportInputs {
            topic: "Rust",
            synthesis: "A review of Rust.",
            web_research: Some(&research),
            company: None,
            video_url: None,
            video: None,
        });

        assert!(report.starts_with(
            "# Research Report: Rust\n\n## Executive Summary\n\nA review of Rust.\n"
        ));
        assert!(report.contains("1. Rust Book\n   https://doc.rust-lang.org/book"));
        assert!(!report.contains("## Video Source"));
        assert!(!report.contains("## Company Context"));
    }

    #[test]
    fn test_company_report_sections() {
        let research = Outcome::Ready(CompanyResearch {
            topic_text: "Acme uses Rust.".to_string(),
            company_info: Some("Founded 1999.".to_string()),
            sources: vec![source("Acme", "https://acme.example")],
        });
        let leads = Outcome::Ready(vec![Lead {
            lead_name: "Ada".to_string(),
            lead_title: Some("CTO".to_string()),
            lead_department: Some("Engineering".to_string()),
            linkedin_url: Some("https://linkedin.com/in/ada".to_string()),
            summary_of_relevance: Some("owns the platform".to_string()),
            named_buyers: vec![NamedBuyer {
                buyer_name: "Grace".to_string(),
                buyer_title: Some("CFO".to_string()),
                buyer_rationale: Some("signs budgets".to_string()),
            }],
        }]);
        let contacts = Outcome::Degraded(StepDegradation {
            step: "search_contacts".to_string(),
            reason: DegradationReason::Unconfigured("contact search".to_string()),
        });

        let report = render(&ReportInputs {
            topic: "Rust",
            synthesis: "Synthesis.",
            web_research: None,
            company: Some(CompanySection {
                name: "Acme",
                research: Some(&research),
                leads: Some(&leads),
                contacts: Some(&contacts),
            }),
            video_url: Some("https://youtu.be/x"),
            video: None,
        });

        assert!(report.contains("## Company Context: Acme\n\nAcme uses Rust."));
        assert!(report.contains("### General Company Information\n\nFounded 1999."));
        assert!(report.contains("### Ada\n- **Title**: CTO"));
        assert!(report.contains("  - Grace (CFO): signs budgets"));
        assert!(report.contains(
            "## LinkedIn Contacts\n\n> Not available: contact search is not configured"
        ));
        assert!(report.contains("## Video Source\n- **URL**: https://youtu.be/x"));
        assert!(report.contains("1. Acme\n   https://acme.example"));
    }

    #[test]
    fn test_degraded_research_and_duplicate_sources() {
        let research: Outcome<WebResearch> = Outcome::Degraded(StepDegradation {
            step: "search_research".to_string(),
            reason: DegradationReason::MissingInput("topic".to_string()),
        });
        let report = render(&ReportInputs {
            topic: "",
            synthesis: "",
            web_research: Some(&research),
            company: None,
            video_url: None,
            video: None,
        });
        assert!(report.contains("> Not available: missing input: topic"));
        assert!(report.contains("No grounding sources were returned."));
    }

    #[test]
    fn test_sources_are_deduplicated() {
        let web = Outcome::Ready(WebResearch {
            text: String::new(),
            sources: vec![source("A", "https://a"), source("A again", "https://a")],
        });
        let report = render(&ReportInputs {
            topic: "t",
            synthesis: "s",
            web_research: Some(&web),
            company: None,
            video_url: None,
            video: None,
        });
        assert!(report.contains("1. A\n"));
        assert!(!report.contains("2. "));
    }
}
