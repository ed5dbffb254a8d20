pub mod config;
pub mod error;
pub mod types;
pub mod validate;

pub use config::{Config, ModelProvider};
pub use error::ItineraryError;
pub use types::*;
pub use validate::{edit_warnings, expectation_warnings, validate_trip, SchemaViolation};
