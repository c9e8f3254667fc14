// SPDX-License-Identifier: MIT

//! Graph workflow executor

use futures::stream::{self, Stream};
use std::collections::HashMap;
use std::sync::Arc;

use super::types::{Edge, GraphEvent, Target, START};
use crate::adk::error::WorkflowError;
use crate::researcher::workflow::state::GraphState;
use crate::researcher::workflow::step::Node;

/// Event type streamed by a compiled graph over state `S`
pub type StateEvent<S> = GraphEvent<<S as GraphState>::Update, <S as GraphState>::Output>;

/// Validated, immutable topology
///
/// Shareable across concurrent runs (wrap in `Arc`); every run owns its state.
pub struct CompiledGraph<S: GraphState, C> {
    nodes: HashMap<String, Arc<dyn Node<S, C>>>,
    edges: HashMap<String, Edge<S>>,
    node_order: Vec<String>,
    step_limit: usize,
}

enum Position {
    Start,
    After(String),
    Done,
}

/// Cursor over a single run
struct Run<'a, S: GraphState, C> {
    graph: &'a CompiledGraph<S, C>,
    ctx: &'a C,
    state: S,
    position: Position,
    steps: usize,
}

impl<'a, S, C> Run<'a, S, C>
where
    S: GraphState,
    C: Send + Sync + 'static,
{
    /// Resolve the next target, run it and merge its update
    ///
    /// Returns `None` once `END` is reached.
    async fn advance(&mut self) -> Result<Option<(String, S::Update)>, WorkflowError> {
        let from = match &self.position {
            Position::Start => START.to_string(),
            Position::After(node) => node.clone(),
            Position::Done => return Ok(None),
        };

        let next = self.graph.resolve(&from, &self.state)?;
        let name = match next {
            Target::End => {
                log::debug!("Run reached END after '{}'", from);
                self.position = Position::Done;
                return Ok(None);
            }
            Target::Node(name) => name,
        };

        self.steps += 1;
        if self.steps > self.graph.step_limit {
            log::error!(
                "Step limit {} exceeded after node '{}'",
                self.graph.step_limit,
                from
            );
            return Err(WorkflowError::StepLimitExceeded {
                limit: self.graph.step_limit,
                node: from,
            });
        }

        let node = self
            .graph
            .nodes
            .get(&name)
            .ok_or_else(|| WorkflowError::RouterLabel {
                node: from.clone(),
                label: name.clone(),
            })?;

        log::info!("Executing node: {}", name);
        let update = node.call(&self.state, self.ctx).await.map_err(|e| {
            log::error!("Node {} failed: {}", name, e);
            WorkflowError::Step {
                node: name.clone(),
                source: e,
            }
        })?;

        self.state.apply(update.clone());
        log::info!("Node {} completed", name);

        self.position = Position::After(name.clone());
        Ok(Some((name, update)))
    }

    fn finish(self) -> S::Output {
        self.state.into_output()
    }
}

impl<S, C> CompiledGraph<S, C>
where
    S: GraphState,
    C: Send + Sync + 'static,
{
    pub(crate) fn new(
        nodes: HashMap<String, Arc<dyn Node<S, C>>>,
        edges: HashMap<String, Edge<S>>,
        node_order: Vec<String>,
        step_limit: usize,
    ) -> Self {
        Self {
            nodes,
            edges,
            node_order,
            step_limit,
        }
    }

    /// Declared node names in declaration order
    pub fn node_names(&self) -> &[String] {
        &self.node_order
    }

    pub fn step_limit(&self) -> usize {
        self.step_limit
    }

    fn resolve(&self, from: &str, state: &S) -> Result<Target, WorkflowError> {
        // compile() guarantees every declared source has an edge
        let edge = self
            .edges
            .get(from)
            .ok_or_else(|| WorkflowError::RouterLabel {
                node: from.to_string(),
                label: String::new(),
            })?;

        match edge {
            Edge::Direct(target) => Ok(target.clone()),
            Edge::Conditional {
                router, targets, ..
            } => {
                let label = router(state);
                log::debug!("Router on '{}' returned '{}'", from, label);
                targets
                    .get(&label)
                    .cloned()
                    .ok_or_else(|| WorkflowError::RouterLabel {
                        node: from.to_string(),
                        label,
                    })
            }
        }
    }

    fn start<'a>(&'a self, input: S::Input, ctx: &'a C) -> Run<'a, S, C> {
        Run {
            graph: self,
            ctx,
            state: S::from_input(input),
            position: Position::Start,
            steps: 0,
        }
    }

    /// Run to completion and return the output projection
    pub async fn invoke(&self, input: S::Input, ctx: &C) -> Result<S::Output, WorkflowError> {
        let mut run = self.start(input, ctx);
        while run.advance().await?.is_some() {}
        Ok(run.finish())
    }

    /// Run with JSON at both boundaries
    pub async fn invoke_json(
        &self,
        input: serde_json::Value,
        ctx: &C,
    ) -> Result<serde_json::Value, WorkflowError> {
        let input: S::Input = serde_json::from_value(input)
            .map_err(|e| WorkflowError::InvalidInput(e.to_string()))?;
        let output = self.invoke(input, ctx).await?;
        serde_json::to_value(output).map_err(WorkflowError::Output)
    }

    /// Run and yield each merged update, then the output projection
    ///
    /// Updates arrive in exactly the order `invoke` applies them. The stream
    /// ends after `Finished` or after the first error.
    pub fn stream<'a>(
        &'a self,
        input: S::Input,
        ctx: &'a C,
    ) -> impl Stream<Item = Result<StateEvent<S>, WorkflowError>> + Send + 'a {
        stream::unfold(Some(self.start(input, ctx)), |run| async move {
            let mut run = run?;
            match run.advance().await {
                Ok(Some((node, update))) => {
                    let event = GraphEvent::Step { node, update };
                    Some((Ok(event), Some(run)))
                }
                Ok(None) => {
                    let output = run.finish();
                    Some((Ok(GraphEvent::Finished { output }), None))
                }
                Err(e) => Some((Err(e), None)),
            }
        })
    }
}
