// SPDX-License-Identifier: MIT

//! Topology of the content-research pipeline

use super::routers::{route_by_approach, route_podcast, route_video, ApproachRoute};
use super::state::ResearchState;
use super::steps::*;
use super::*;
use crate::adk::error::GraphValidationError;
use crate::researcher::workflow::{CompiledGraph, RouteLabel, StateGraph, Target, END, START};

pub type ResearchGraph = CompiledGraph<ResearchState, ResearchContext>;

/// Build and validate the research graph
///
/// ```text
/// START ─┬─ search_research ─────────────────────────────────────────┬─ analyze_video ─┐
///        └─ company_topic_research → identify_leads → search_contacts ┴─────────────────┴─ create_report ─┬─ create_podcast → END
///                                                                                                         └─ END
/// ```
pub fn build_research_graph() -> Result<ResearchGraph, GraphValidationError> {
    StateGraph::new()
        .add_node(SEARCH_RESEARCH, SearchResearch)
        .add_node(COMPANY_TOPIC_RESEARCH, CompanyTopicResearch)
        .add_node(IDENTIFY_LEADS, IdentifyLeads)
        .add_node(SEARCH_CONTACTS, SearchContacts)
        .add_node(ANALYZE_VIDEO, AnalyzeVideo)
        .add_node(CREATE_REPORT, CreateReport)
        .add_node(CREATE_PODCAST, CreatePodcast)
        .add_conditional_edges(START, route_by_approach, |route| match route {
            ApproachRoute::TopicOnly => Target::node(SEARCH_RESEARCH),
            ApproachRoute::CompanyLeads => Target::node(COMPANY_TOPIC_RESEARCH),
        })
        .add_edge(COMPANY_TOPIC_RESEARCH, IDENTIFY_LEADS)
        .add_edge(IDENTIFY_LEADS, SEARCH_CONTACTS)
        .add_conditional_edges(SEARCH_RESEARCH, route_video, |r| Target::from(r.as_str()))
        .add_conditional_edges(SEARCH_CONTACTS, route_video, |r| Target::from(r.as_str()))
        .add_edge(ANALYZE_VIDEO, CREATE_REPORT)
        .add_conditional_edges(CREATE_REPORT, route_podcast, |r| Target::from(r.as_str()))
        .add_edge(CREATE_PODCAST, END)
        .compile()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_research_graph_compiles() {
        let graph = build_research_graph().unwrap();
        assert_eq!(
            graph.node_names(),
            &[
                SEARCH_RESEARCH,
                COMPANY_TOPIC_RESEARCH,
                IDENTIFY_LEADS,
                SEARCH_CONTACTS,
                ANALYZE_VIDEO,
                CREATE_REPORT,
                CREATE_PODCAST,
            ]
        );
        assert_eq!(graph.step_limit(), 21);
    }
}
