//! University course timetabling: a greedy session placer, a conflict
//! scanner over the resulting weekly grid, and an axum service around them.

pub mod config;
pub mod conflicts;
pub mod data;
pub mod error;
pub mod export;
pub mod server;
pub mod solver;
pub mod state;
