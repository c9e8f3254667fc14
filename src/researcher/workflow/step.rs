// SPDX-License-Identifier: MIT

//! Step invocation contract

use crate::adk::error::ResearcherError;
use crate::researcher::workflow::state::GraphState;
use async_trait::async_trait;

/// A named unit of work in a graph
///
/// A step reads the state, may call collaborators from the run context `C`,
/// and returns its own update type. The update type names exactly the fields
/// the step is allowed to write; it is converted into the state's update enum
/// by the executor.
///
/// Returning `Err` aborts the run. Foreseeable conditions (missing inputs,
/// unconfigured optional collaborators, unparseable model output) should be
/// reported as a degraded value inside `Output` instead.
#[async_trait]
pub trait Step<S: GraphState, C>: Send + Sync {
    type Output: Into<S::Update> + Send;

    async fn run(&self, state: &S, ctx: &C) -> Result<Self::Output, ResearcherError>;
}

/// Object-safe view of a [`Step`] stored in a compiled graph
#[async_trait]
pub(crate) trait Node<S: GraphState, C>: Send + Sync {
    async fn call(&self, state: &S, ctx: &C) -> Result<S::Update, ResearcherError>;
}

pub(crate) struct StepNode<T>(pub T);

#[async_trait]
impl<S, C, T> Node<S, C> for StepNode<T>
where
    S: GraphState,
    C: Send + Sync + 'static,
    T: Step<S, C>,
{
    async fn call(&self, state: &S, ctx: &C) -> Result<S::Update, ResearcherError> {
        self.0.run(state, ctx).await.map(Into::into)
    }
}
