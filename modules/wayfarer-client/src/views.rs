//! UI state for the planner form, the trip detail view and the edit modal.
//!
//! Each view is a small state machine driven by the CLI. The transitions that
//! talk to the API take a [`TripApi`] so they can be exercised without a server.

use std::path::PathBuf;

use tracing::{info, warn};
use wayfarer_common::{
    Activity, Budget, Companions, Coordinates, DateRange, Day, EditRequest, GenerateRequest,
    ItineraryError, Pacing, StoredTrip,
};

use crate::api::TripApi;
use crate::attachments::encode_files;
use crate::store::TripStore;

// =============================================================================
// Planner
// =============================================================================

/// Everything the planner form collects before submission.
#[derive(Debug, Clone, Default)]
pub struct PlannerForm {
    pub cities: Vec<String>,
    pub places: String,
    pub start_date: String,
    pub end_date: String,
    pub preferences: Vec<String>,
    pub budget: Budget,
    pub companions: Companions,
    pub pacing: Pacing,
    pub attachments: Vec<PathBuf>,
}

impl PlannerForm {
    /// Required fields: at least one city and both dates.
    pub fn validate(&self) -> Result<(), ItineraryError> {
        let mut missing = Vec::new();
        if self.cities.iter().all(|city| city.trim().is_empty()) {
            missing.push("a destination");
        }
        if self.start_date.trim().is_empty() {
            missing.push("a start date");
        }
        if self.end_date.trim().is_empty() {
            missing.push("an end date");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ItineraryError::InvalidRequest(format!(
                "please provide {}",
                missing.join(" and ")
            )))
        }
    }

    pub fn into_request(self, attachments: Vec<String>) -> GenerateRequest {
        GenerateRequest {
            cities: self
                .cities
                .into_iter()
                .map(|city| city.trim().to_string())
                .filter(|city| !city.is_empty())
                .collect(),
            places: self.places,
            dates: DateRange::new(self.start_date.trim(), self.end_date.trim()),
            preferences: self.preferences,
            budget: self.budget,
            companions: self.companions,
            pacing: self.pacing,
            attachments,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PlannerState {
    #[default]
    Idle,
    Submitting,
    /// Trip generated and saved; the detail view for this id is next.
    Navigated(String),
    ErrorShown(String),
}

impl PlannerState {
    /// Validate, encode attachments, generate and save.
    ///
    /// Validation failures leave the state untouched and are returned to the
    /// caller. Everything after that ends in `Navigated` or `ErrorShown`.
    pub async fn submit(
        &mut self,
        form: PlannerForm,
        api: &dyn TripApi,
        store: &TripStore,
    ) -> Result<(), ItineraryError> {
        if *self == PlannerState::Submitting {
            return Ok(());
        }
        form.validate()?;
        *self = PlannerState::Submitting;

        let attachments = match encode_files(&form.attachments).await {
            Ok(uris) => uris,
            Err(e) => {
                *self = PlannerState::ErrorShown(e.to_string());
                return Ok(());
            }
        };

        let request = form.into_request(attachments);
        let trip = match api.generate(&request).await {
            Ok(trip) => trip,
            Err(e) => {
                warn!(kind = e.kind(), error = %e, "Generation failed");
                *self = PlannerState::ErrorShown(e.to_string());
                return Ok(());
            }
        };

        match store.save_new(trip, &request.dates.start) {
            Ok(stored) => {
                info!(id = %stored.id, name = %stored.trip.trip_name, "Trip saved");
                *self = PlannerState::Navigated(stored.id);
            }
            Err(e) => *self = PlannerState::ErrorShown(e.to_string()),
        }
        Ok(())
    }
}

// =============================================================================
// Trip detail
// =============================================================================

#[derive(Debug, Clone)]
pub struct DetailView {
    trip: StoredTrip,
    selected_day: usize,
    expanded_activity: Option<usize>,
    active_location: Option<Coordinates>,
}

impl DetailView {
    pub fn new(trip: StoredTrip) -> Self {
        Self {
            trip,
            selected_day: 0,
            expanded_activity: None,
            active_location: None,
        }
    }

    pub fn trip(&self) -> &StoredTrip {
        &self.trip
    }

    pub fn selected_day_index(&self) -> usize {
        self.selected_day
    }

    pub fn selected_day(&self) -> Option<&Day> {
        self.trip.trip.days.get(self.selected_day)
    }

    pub fn expanded_activity(&self) -> Option<usize> {
        self.expanded_activity
    }

    /// Location the map should centre on.
    pub fn active_location(&self) -> Option<Coordinates> {
        self.active_location
    }

    /// Switch day tabs. Any expanded activity is collapsed. Out-of-range indices are ignored.
    pub fn select_day(&mut self, index: usize) {
        if index >= self.trip.trip.days.len() {
            return;
        }
        self.selected_day = index;
        self.expanded_activity = None;
    }

    /// Expand an activity of the selected day, or collapse it if it is already expanded.
    pub fn toggle_activity(&mut self, index: usize) {
        if self.expanded_activity == Some(index) {
            self.expanded_activity = None;
            return;
        }
        let Some(activity) = self.selected_day().and_then(|day| day.activities.get(index)) else {
            return;
        };
        if let Some(point) = activity.map_point() {
            self.active_location = Some(point);
        }
        self.expanded_activity = Some(index);
    }

    /// Map markers: mappable activities of the selected day with their position in the day.
    pub fn markers(&self) -> Vec<(usize, &Activity, Coordinates)> {
        self.selected_day()
            .map(|day| {
                day.activities
                    .iter()
                    .enumerate()
                    .filter_map(|(i, activity)| activity.map_point().map(|point| (i, activity, point)))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Swap in an edited trip and reset the view onto it.
    pub fn replace_trip(&mut self, trip: StoredTrip) {
        *self = Self::new(trip);
    }
}

// =============================================================================
// Edit modal
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EditModal {
    #[default]
    Closed,
    Open {
        draft: String,
        error: Option<String>,
    },
    Submitting,
}

impl EditModal {
    pub fn open(&mut self) {
        if *self == EditModal::Closed {
            *self = EditModal::Open {
                draft: String::new(),
                error: None,
            };
        }
    }

    pub fn close(&mut self) {
        if *self != EditModal::Submitting {
            *self = EditModal::Closed;
        }
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        if let EditModal::Open { draft, .. } = self {
            *draft = text.into();
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, EditModal::Open { .. })
    }

    /// Send the draft. Blank drafts send nothing and keep the modal open.
    ///
    /// On success the trip is replaced in the store and in `view`, and the
    /// modal closes. On failure the modal reopens with the error and the
    /// previous trip stays in place. Returns whether a request was sent.
    pub async fn submit(
        &mut self,
        view: &mut DetailView,
        api: &dyn TripApi,
        store: &TripStore,
    ) -> bool {
        let EditModal::Open { draft, .. } = self else {
            return false;
        };
        if draft.trim().is_empty() {
            return false;
        }
        let instructions = std::mem::take(draft);
        *self = EditModal::Submitting;

        let request = EditRequest {
            current_trip: view.trip().trip.clone(),
            instructions,
        };

        let outcome = match api.edit_trip(&request).await {
            Ok(trip) => store
                .replace(&view.trip().id, trip)
                .map_err(|e| e.to_string()),
            Err(e) => {
                warn!(kind = e.kind(), error = %e, "Edit failed");
                Err(e.to_string())
            }
        };

        match outcome {
            Ok(stored) => {
                view.replace_trip(stored);
                *self = EditModal::Closed;
            }
            Err(message) => {
                *self = EditModal::Open {
                    draft: request.instructions,
                    error: Some(message),
                };
            }
        }
        true
    }
}
