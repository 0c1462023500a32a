//! Query functions, one module per table.

pub mod poc_plans;
pub mod prerequisites;
pub mod solutions;
pub mod use_cases;
