pub mod api;
pub mod attachments;
pub mod render;
pub mod store;
pub mod views;

pub use api::{ClientError, HttpTripApi, TripApi};
pub use store::{FileStore, KeyValueStore, MemoryStore, TripStore};
pub use views::{DetailView, EditModal, PlannerForm, PlannerState};
