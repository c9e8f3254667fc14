// SPDX-License-Identifier: MIT

//! Agent development kit: generative model clients, speech encoding and errors

pub mod error;
pub mod model;
pub mod speech;

pub use error::{GraphValidationError, ModelError, ResearcherError, WorkflowError};
