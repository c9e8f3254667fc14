// SPDX-License-Identifier: MIT

//! Workflow engine: typed state, steps, and the graph that sequences them

pub mod graph;
pub mod state;
pub mod step;

pub use graph::{CompiledGraph, GraphEvent, RouteLabel, StateGraph, Target, END, START};
pub use state::{DegradationReason, GraphState, Outcome, StepDegradation};
pub use step::Step;
