pub mod rest;
pub mod routes;

use wayfarer_planner::TripPlanner;

pub use routes::build_router;

/// Shared, read-only state handed to every handler.
pub struct AppState {
    pub planner: TripPlanner,
}
