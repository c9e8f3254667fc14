// SPDX-License-Identifier: MIT

//! Typed workflow state
//!
//! This module provides:
//! - `GraphState` - a statically declared state record with its input, output and update types
//! - `Outcome` - a field value that is either ready or degraded by the step that wrote it
//! - `StepDegradation` - why a step could not produce its value

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use thiserror::Error;

/// State record threaded through a graph run
///
/// A fresh value is built with [`GraphState::from_input`] for every run. Steps
/// never touch it directly: they return an `Update` which the executor hands to
/// [`GraphState::apply`]. An update overwrites the fields it names and leaves
/// every other field untouched.
pub trait GraphState: Sized + Send + Sync + 'static {
    /// Fields the caller supplies at entry
    type Input: DeserializeOwned + Send;
    /// Projection returned once the run reaches `END`
    type Output: Serialize + Debug + Send;
    /// Partial update returned by a step
    type Update: Serialize + Clone + Debug + Send + Sync + 'static;

    fn from_input(input: Self::Input) -> Self;

    fn apply(&mut self, update: Self::Update);

    fn into_output(self) -> Self::Output;
}

/// Why a step produced a degraded value instead of failing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(rename_all = "snake_case")]
pub enum DegradationReason {
    /// A state field the step needs is absent or blank
    #[error("missing input: {0}")]
    MissingInput(String),

    /// An optional collaborator is not configured
    #[error("{0} is not configured")]
    Unconfigured(String),

    /// The model answered but the answer could not be parsed
    #[error("unparseable model output: {0}")]
    Unparseable(String),

    /// The model answered with no text
    #[error("empty model response")]
    EmptyResponse,
}

/// Non-fatal step failure, carried in state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepDegradation {
    pub step: String,
    pub reason: DegradationReason,
}

impl std::fmt::Display for StepDegradation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.reason, self.step)
    }
}

/// A state field written by a step that may have degraded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome<T> {
    Ready(T),
    Degraded(StepDegradation),
}

impl<T> Outcome<T> {
    /// Build a degraded value and log it
    pub fn degraded(step: &str, reason: DegradationReason) -> Self {
        log::warn!("Step {} degraded: {}", step, reason);
        Outcome::Degraded(StepDegradation {
            step: step.to_string(),
            reason,
        })
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Outcome::Ready(v) => Some(v),
            Outcome::Degraded(_) => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Outcome::Ready(_))
    }

    pub fn degradation(&self) -> Option<&StepDegradation> {
        match self {
            Outcome::Ready(_) => None,
            Outcome::Degraded(d) => Some(d),
        }
    }
}

/// Ready value of an optional outcome field
pub fn ready<T>(field: &Option<Outcome<T>>) -> Option<&T> {
    field.as_ref().and_then(Outcome::ready)
}

/// Trimmed, non-empty contents of an optional text field
pub fn non_blank(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
