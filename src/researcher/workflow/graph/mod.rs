// SPDX-License-Identifier: MIT

//! Graph-based workflow execution
//!
//! This module provides the graph builder, which validates a topology of
//! named steps and router-dispatched edges, and the executor that walks it
//! one step at a time.

mod builder;
pub mod executor;
pub mod types;

pub use builder::StateGraph;
pub use executor::{CompiledGraph, StateEvent};
pub use types::{GraphEvent, RouteLabel, Target, END, START};
