//! Core logic for planning proof-of-concept engagements: the catalog store,
//! aggregation, dashboard filtering, document generation, and saved plans.

pub mod aggregate;
pub mod catalog;
pub mod dashboard;
pub mod document;
pub mod planner;
pub mod seed;
pub mod snapshot;
pub mod store;
