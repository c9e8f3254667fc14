// SPDX-License-Identifier: MIT

//! Graph builder - declares nodes and edges, then validates them into a
//! [`CompiledGraph`]

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use super::executor::CompiledGraph;
use super::types::{Edge, RouteLabel, Target, END, START};
use crate::adk::error::GraphValidationError;
use crate::researcher::workflow::state::GraphState;
use crate::researcher::workflow::step::{Node, Step, StepNode};

/// Mutable graph definition
pub struct StateGraph<S: GraphState, C> {
    nodes: Vec<(String, Arc<dyn Node<S, C>>)>,
    edges: Vec<(String, Edge<S>)>,
    step_limit: Option<usize>,
}

impl<S, C> Default for StateGraph<S, C>
where
    S: GraphState,
    C: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S, C> StateGraph<S, C>
where
    S: GraphState,
    C: Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            step_limit: None,
        }
    }

    pub fn add_node<T>(mut self, name: &str, step: T) -> Self
    where
        T: Step<S, C> + 'static,
    {
        self.nodes
            .push((name.to_string(), Arc::new(StepNode(step))));
        self
    }

    /// Unconditional edge; `to` may be [`END`]
    pub fn add_edge(mut self, from: &str, to: &str) -> Self {
        self.edges
            .push((from.to_string(), Edge::Direct(Target::from(to))));
        self
    }

    /// Router-dispatched edge over a closed label enum
    ///
    /// `path` is evaluated for every label in `L::ALL` when the edge is added,
    /// so every label the router can return has a target.
    pub fn add_conditional_edges<L, R, P>(mut self, from: &str, router: R, path: P) -> Self
    where
        L: RouteLabel,
        R: Fn(&S) -> L + Send + Sync + 'static,
        P: Fn(L) -> Target,
    {
        let labels: Vec<String> = L::ALL.iter().map(|l| l.as_str().to_string()).collect();
        let targets = L::ALL
            .iter()
            .map(|l| (l.as_str().to_string(), path(*l)))
            .collect();

        self.edges.push((
            from.to_string(),
            Edge::Conditional {
                router: Box::new(move |s| router(s).as_str().to_string()),
                labels,
                targets,
            },
        ));
        self
    }

    /// Router-dispatched edge over string labels
    ///
    /// `labels` are the values the router declares; `compile` rejects a map
    /// that misses one of them. A label outside the map returned at run time
    /// fails the run with `WorkflowError::RouterLabel`.
    pub fn add_conditional_edges_by_name<R>(
        mut self,
        from: &str,
        router: R,
        labels: &[&str],
        targets: HashMap<String, Target>,
    ) -> Self
    where
        R: Fn(&S) -> String + Send + Sync + 'static,
    {
        self.edges.push((
            from.to_string(),
            Edge::Conditional {
                router: Box::new(router),
                labels: labels.iter().map(|l| l.to_string()).collect(),
                targets,
            },
        ));
        self
    }

    /// Override the default bound of three visits per declared node
    pub fn with_step_limit(mut self, limit: usize) -> Self {
        self.step_limit = Some(limit);
        self
    }

    /// Validate the topology and freeze it
    pub fn compile(self) -> Result<CompiledGraph<S, C>, GraphValidationError> {
        let mut nodes: HashMap<String, Arc<dyn Node<S, C>>> = HashMap::new();
        let mut order: Vec<String> = Vec::new();
        for (name, node) in self.nodes {
            if name == START || name == END {
                return Err(GraphValidationError::ReservedName(name));
            }
            if nodes.insert(name.clone(), node).is_some() {
                return Err(GraphValidationError::DuplicateNode(name));
            }
            order.push(name);
        }

        let mut edges: HashMap<String, Edge<S>> = HashMap::new();
        for (from, edge) in self.edges {
            if from != START && !nodes.contains_key(&from) {
                return Err(GraphValidationError::UndeclaredNode {
                    from: from.clone(),
                    node: from,
                });
            }
            for target in edge.targets() {
                if let Target::Node(n) = target {
                    if !nodes.contains_key(n) {
                        return Err(GraphValidationError::UndeclaredNode {
                            from: from.clone(),
                            node: n.clone(),
                        });
                    }
                }
            }
            if let Edge::Conditional {
                labels, targets, ..
            } = &edge
            {
                let missing: Vec<String> = labels
                    .iter()
                    .filter(|l| !targets.contains_key(*l))
                    .cloned()
                    .collect();
                if !missing.is_empty() {
                    return Err(GraphValidationError::IncompleteLabels { from, missing });
                }
            }
            if edges.contains_key(&from) {
                return Err(GraphValidationError::DuplicateEdge(from));
            }
            edges.insert(from, edge);
        }

        if !edges.contains_key(START) {
            return Err(GraphValidationError::MissingEntry);
        }

        if let Some(dangling) = order.iter().find(|n| !edges.contains_key(*n)) {
            return Err(GraphValidationError::DanglingNode(dangling.clone()));
        }

        let reachable = reachable_from_start(&edges);
        let unreachable: Vec<String> = order
            .iter()
            .filter(|n| !reachable.contains(n.as_str()))
            .cloned()
            .collect();
        if !unreachable.is_empty() {
            return Err(GraphValidationError::Unreachable(unreachable));
        }

        let step_limit = self.step_limit.unwrap_or(order.len() * 3);
        log::debug!(
            "Compiled graph with {} nodes, step limit {}",
            order.len(),
            step_limit
        );

        Ok(CompiledGraph::new(nodes, edges, order, step_limit))
    }
}

fn reachable_from_start<S>(edges: &HashMap<String, Edge<S>>) -> HashSet<&str> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut queue: VecDeque<&str> = VecDeque::from([START]);

    while let Some(current) = queue.pop_front() {
        let Some(edge) = edges.get(current) else {
            continue;
        };
        for target in edge.targets() {
            if let Target::Node(n) = target {
                if seen.insert(n.as_str()) {
                    queue.push_back(n.as_str());
                }
            }
        }
    }

    seen
}
