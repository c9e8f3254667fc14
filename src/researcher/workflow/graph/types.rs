// SPDX-License-Identifier: MIT

//! Graph workflow type definitions
//!
//! This module defines the entry/terminal sentinels, edge targets and router
//! labels shared by the builder and the executor.

use serde::Serialize;
use std::collections::HashMap;

/// Source of the entry edge
pub const START: &str = "__start__";

/// Terminal marker
pub const END: &str = "__end__";

/// Where an edge leads
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Target {
    Node(String),
    End,
}

impl Target {
    pub fn node(name: impl Into<String>) -> Self {
        Target::Node(name.into())
    }

    pub fn name(&self) -> &str {
        match self {
            Target::Node(n) => n,
            Target::End => END,
        }
    }
}

impl From<&str> for Target {
    fn from(name: &str) -> Self {
        if name == END {
            Target::End
        } else {
            Target::Node(name.to_string())
        }
    }
}

/// Closed set of labels a router can return
///
/// Every variant must appear in `ALL` so the graph can check at compile time
/// that each label leads somewhere.
pub trait RouteLabel: Copy + Send + Sync + 'static {
    const ALL: &'static [Self];

    fn as_str(&self) -> &'static str;
}

pub(crate) type Router<S> = Box<dyn Fn(&S) -> String + Send + Sync>;

/// Outgoing edge of a node (or of `START`)
pub(crate) enum Edge<S> {
    Direct(Target),
    Conditional {
        router: Router<S>,
        /// Labels the router declares it can return
        labels: Vec<String>,
        targets: HashMap<String, Target>,
    },
}

impl<S> Edge<S> {
    pub(crate) fn targets(&self) -> Vec<&Target> {
        match self {
            Edge::Direct(t) => vec![t],
            Edge::Conditional { targets, .. } => targets.values().collect(),
        }
    }
}

/// Event emitted while streaming a run
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GraphEvent<U, O> {
    /// A node finished and its update was merged
    Step { node: String, update: U },
    /// The run reached `END`
    Finished { output: O },
}
