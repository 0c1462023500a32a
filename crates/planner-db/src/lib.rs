//! PostgreSQL persistence for the POC planner catalog and saved plans.

pub mod config;
pub mod error;
pub mod models;
pub mod pool;
pub mod queries;
