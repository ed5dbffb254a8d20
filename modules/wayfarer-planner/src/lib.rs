pub mod attachments;
pub mod mock;
pub mod prompt;
pub mod resolver;
pub mod service;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use attachments::{mime_for_extension, Attachment};
pub use mock::mock_trip;
pub use prompt::{edit_prompt, generation_prompt, BuiltPrompt};
pub use resolver::{EnvModelResolver, ModelResolver, StaticModelResolver};
pub use service::{parse_model_output, TripPlanner};
