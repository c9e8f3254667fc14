// SPDX-License-Identifier: MIT

//! Prompt templates for every model call in both pipelines

use once_cell::sync::Lazy;
use schemars::schema_for;

use crate::researcher::pipelines::leads::state::LeadProfile;
use crate::researcher::pipelines::research::state::Lead;

/// Heading that separates company-specific research from general company information
pub const COMPANY_INFO_MARKER: &str = "General Company Information:";

static LEAD_LIST_SCHEMA: Lazy<String> = Lazy::new(|| {
    serde_json::to_string_pretty(&schema_for!(Vec<Lead>)).unwrap_or_else(|e| {
        log::error!("Failed to render lead schema: {}", e);
        String::from("[]")
    })
});

pub fn web_research(topic: &str) -> String {
    format!("Research this topic and give me an overview: {}", topic)
}

pub fn company_topic_research(topic: &str, company: &str) -> String {
    format!(
        r#"Research the topic "{topic}" specifically in the context of the company "{company}".

Answer in two sections:

1. How "{company}" engages with "{topic}": products, initiatives, partnerships, public statements,
   hiring signals and recent news. Cite concrete facts.

2. A section that starts with the exact heading "{marker}" giving a short profile of "{company}":
   industry, size, headquarters, key business lines and strategic priorities.
"#,
        topic = topic,
        company = company,
        marker = COMPANY_INFO_MARKER
    )
}

pub fn lead_identification(company: &str, titles: &[&str], company_context: &str) -> String {
    let context = if company_context.trim().is_empty() {
        "No prior research available."
    } else {
        company_context
    };
    format!(
        r#"Identify people at "{company}" who hold one of these roles or closely related ones: {titles}.

Use this research on the company as context for judging relevance:
{context}

For each lead, also name any buyers (decision makers who would sign off on a purchase in this
area) you can find, with their title and why they matter.

Return only a JSON list where every item matches this JSON schema:
```json
{schema}
```
Return an empty list if you cannot find anyone. Do not include any text outside the JSON."#,
        company = company,
        titles = quoted_list(titles),
        context = context,
        schema = LEAD_LIST_SCHEMA.as_str()
    )
}

pub fn video_analysis(topic: &str) -> String {
    format!(
        "Based on the video content, give me an overview of this topic: {}",
        topic
    )
}

/// Company-path material for the synthesis prompt
pub struct CompanyMaterials<'a> {
    pub company: &'a str,
    pub topic_text: &'a str,
    pub company_info: Option<&'a str>,
    pub leads: &'a [Lead],
}

/// Everything the literature review may draw on
pub struct SynthesisMaterials<'a> {
    pub topic: &'a str,
    pub search_text: Option<&'a str>,
    pub video_text: Option<&'a str>,
    pub company: Option<CompanyMaterials<'a>>,
}

pub fn synthesis(m: &SynthesisMaterials<'_>) -> String {
    let mut materials = String::new();

    if let Some(search) = m.search_text {
        materials.push_str("SEARCH RESULTS:\n");
        materials.push_str(search);
        materials.push_str("\n\n");
    }

    if let Some(c) = &m.company {
        materials.push_str(&format!(
            "COMPANY-SPECIFIC RESEARCH ({}):\n{}\n\n",
            c.company, c.topic_text
        ));
        if let Some(info) = c.company_info {
            materials.push_str(&format!("COMPANY INFORMATION:\n{}\n\n", info));
        }
        materials.push_str("IDENTIFIED LEADS:\n");
        materials.push_str(&leads_digest(c.leads));
        materials.push_str("\n\n");
    }

    if let Some(video) = m.video_text {
        materials.push_str("VIDEO CONTENT:\n");
        materials.push_str(video);
        materials.push_str("\n\n");
    }

    if materials.is_empty() {
        materials.push_str("No research material was gathered.\n\n");
    }

    let company_guidance = match &m.company {
        Some(c) => format!(
            "\nBecause this review supports outreach to \"{}\", add a section on how the topic applies to the company and close with how the identified leads relate to it.\n",
            c.company
        ),
        None => String::new(),
    };

    format!(
        r#"You are tasked with producing a high-quality literature review on the topic of "{topic}".
Base your review *solely* on the input materials below. Do not invent external information or sources.

Structure:
1. A clear, descriptive title.
2. Introduction: the topic, the purpose and scope of the review, and the themes it covers.
3. Thematic analysis: for each major theme, synthesize and critically analyze the material,
   noting where insights come from different inputs.
4. Discussion: patterns, consistencies, limitations and gaps visible in the material.
5. Conclusion: the main findings and a closing thought on "{topic}".
{company_guidance}
Keep a formal, objective, academic tone. Aim for at least 6-8 well-developed paragraphs when the
material supports it.

INPUT MATERIALS:

{materials}---
Begin the literature review now, starting with the title."#,
        topic = m.topic,
        company_guidance = company_guidance,
        materials = materials
    )
}

pub fn podcast_script(topic: &str, research_text: &str, video_text: Option<&str>) -> String {
    format!(
        r#"Create a natural, engaging podcast conversation between Dr. Sarah (research expert) and Mike (curious interviewer) about "{topic}".

Use this research content:

SEARCH FINDINGS:
{research}

VIDEO INSIGHTS:
{video}

Format as a dialogue with:
- Mike introducing the topic and asking questions
- Dr. Sarah explaining key concepts and insights
- Natural back-and-forth discussion (5-7 exchanges)
- Mike asking follow-up questions
- Dr. Sarah synthesizing the main takeaways
- Keep it conversational and accessible (3-4 minutes when spoken)

Format exactly like this:
Mike: [opening question]
Dr. Sarah: [expert response]
Mike: [follow-up]
Dr. Sarah: [explanation]
[continue...]"#,
        topic = topic,
        research = research_text,
        video = video_text.unwrap_or("No video provided.")
    )
}

pub fn lead_search(company: &str, area: &str, titles: &[&str]) -> String {
    format!(
        r#"Identify potential leads at the company "{company}" based on the following criteria:
Area/Department: "{area}"
Titles: {titles}

Search for individuals matching these roles. Return a JSON list where each item is an object with:
- name (string, full name)
- title (string, current title at the company)
- email (string, professional email if available, otherwise null)
- linkedin_url (string, LinkedIn profile URL if available, otherwise null)
- summary (string, why they are a relevant lead based on the criteria)

Ensure the output is only the JSON list. Do not include any other text outside the JSON.
Use Google Search to find this information."#,
        company = company,
        area = area,
        titles = quoted_list(titles)
    )
}

pub fn lead_summary(company: &str, area: &str, titles: &[&str], leads: &[LeadProfile]) -> String {
    let found = if leads.is_empty() {
        "No specific leads were identified.".to_string()
    } else {
        leads
            .iter()
            .map(|l| format!("- {} ({})", l.name, l.title.as_deref().unwrap_or("N/A")))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        r#"Generate a brief summary report for the lead identification task with the following parameters:
Company Searched: "{company}"
Lead Generation Area: "{area}"
Titles Sought: {titles}

Identified Leads:
{found}

Provide a concise report (2-3 paragraphs) summarizing the findings.
If leads were found, comment on their quality or relevance based on the data provided.
If no leads were found, suggest potential reasons or next steps."#,
        company = company,
        area = area,
        titles = quoted_list(titles),
        found = found
    )
}

fn quoted_list(items: &[&str]) -> String {
    items
        .iter()
        .map(|t| format!("'{}'", t))
        .collect::<Vec<_>>()
        .join(", ")
}

fn leads_digest(leads: &[Lead]) -> String {
    if leads.is_empty() {
        return "No leads were identified.".to_string();
    }
    leads
        .iter()
        .map(|l| {
            let mut line = format!(
                "- {} ({})",
                l.lead_name,
                l.lead_title.as_deref().unwrap_or("title unknown")
            );
            if let Some(why) = &l.summary_of_relevance {
                line.push_str(&format!(": {}", why));
            }
            for buyer in &l.named_buyers {
                line.push_str(&format!(
                    "\n  - buyer: {} ({})",
                    buyer.buyer_name,
                    buyer.buyer_title.as_deref().unwrap_or("title unknown")
                ));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}
