// SPDX-License-Identifier: MIT

use super::state::LeadState;
use super::steps::{CreateSummaryReport, IdentifyLeads};
use super::{LeadContext, CREATE_SUMMARY_REPORT, IDENTIFY_LEADS};
use crate::adk::error::GraphValidationError;
use crate::researcher::workflow::graph::{CompiledGraph, StateGraph, END, START};

/// `START → identify_leads → create_summary_report → END`
pub fn build_lead_graph() -> Result<CompiledGraph<LeadState, LeadContext>, GraphValidationError> {
    StateGraph::new()
        .add_node(IDENTIFY_LEADS, IdentifyLeads)
        .add_node(CREATE_SUMMARY_REPORT, CreateSummaryReport)
        .add_edge(START, IDENTIFY_LEADS)
        .add_edge(IDENTIFY_LEADS, CREATE_SUMMARY_REPORT)
        .add_edge(CREATE_SUMMARY_REPORT, END)
        .compile()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lead_graph_compiles() {
        let graph = build_lead_graph().unwrap();
        assert_eq!(graph.node_names(), &[IDENTIFY_LEADS, CREATE_SUMMARY_REPORT]);
        assert_eq!(graph.step_limit(), 6);
    }
}
