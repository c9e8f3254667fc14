// SPDX-License-Identifier: MIT

//! The two research workflows built on the graph engine

pub mod leads;
pub mod research;
