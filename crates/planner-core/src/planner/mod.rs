//! Planner flow: pick solutions, pick use cases, review.

pub mod request;
pub mod session;

pub use request::{
    PlanMeta, PlanRequest, PlanRequestError, ResolvedRequest, SolutionRequest, build_session,
    parse_plan_request, request_template,
};
pub use session::{PlannerError, PlannerSession, PlannerStep};
