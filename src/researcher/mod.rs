// SPDX-License-Identifier: MIT

//! Multi-modal research workflows on top of the graph engine

pub mod config;
pub mod parse;
pub mod pipelines;
pub mod prompts;
pub mod report;
pub mod server;
pub mod tools;
pub mod workflow;
