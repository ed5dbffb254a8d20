use std::sync::Arc;

use ai_client::{extract_json, truncate_to_char_boundary, AiError};
use tracing::{debug, info, warn};
use wayfarer_common::{
    edit_warnings, expectation_warnings, validate_trip, EditRequest, GenerateRequest,
    ItineraryError, Trip,
};

use crate::attachments::Attachment;
use crate::mock::mock_trip;
use crate::prompt::{edit_prompt, generation_prompt};
use crate::resolver::ModelResolver;

const OUTPUT_PREVIEW_BYTES: usize = 500;

/// Generation and edit flows around the external model.
#[derive(Clone)]
pub struct TripPlanner {
    resolver: Arc<dyn ModelResolver>,
}

impl TripPlanner {
    pub fn new(resolver: Arc<dyn ModelResolver>) -> Self {
        Self { resolver }
    }

    /// Plan a new trip. Without a credential this returns the mock itinerary.
    pub async fn generate(&self, request: &GenerateRequest) -> Result<Trip, ItineraryError> {
        let destinations = request.destinations();
        let Some(first_city) = destinations.first() else {
            return Err(ItineraryError::InvalidRequest(
                "at least one destination is required".to_string(),
            ));
        };
        let range = request.dates.parse()?;
        let attachments = request
            .attachments
            .iter()
            .map(|uri| Attachment::from_data_uri(uri))
            .collect::<Result<Vec<_>, _>>()?;

        let Some(model) = self.resolver.resolve() else {
            warn!(
                credential = self.resolver.credential_var(),
                "No model credential configured, returning mock itinerary"
            );
            return Ok(mock_trip(first_city, &request.dates.start));
        };

        info!(
            provider = model.provider(),
            model = model.model(),
            destinations = destinations.len(),
            attachments = attachments.len(),
            "Generating itinerary"
        );

        let prompt = generation_prompt(request, attachments);
        let text = model.complete(prompt.into_parts()).await.map_err(upstream)?;
        let trip = parse_model_output(&text)?;

        for warning in expectation_warnings(&trip, Some(range)) {
            warn!(%warning, "Generated itinerary deviates from request");
        }
        info!(days = trip.days.len(), activities = trip.activity_count(), "Itinerary generated");
        Ok(trip)
    }

    /// Apply free-text instructions to an existing trip. Text only, no attachments.
    pub async fn edit(&self, request: &EditRequest) -> Result<Trip, ItineraryError> {
        if request.instructions.trim().is_empty() {
            return Err(ItineraryError::InvalidRequest(
                "edit instructions are empty".to_string(),
            ));
        }

        let model = self
            .resolver
            .resolve()
            .ok_or_else(|| ItineraryError::MissingCredential(self.resolver.credential_var()))?;

        info!(
            provider = model.provider(),
            model = model.model(),
            days = request.current_trip.days.len(),
            "Editing itinerary"
        );

        let prompt = edit_prompt(&request.current_trip, &request.instructions)?;
        let text = model.complete_text(&prompt).await.map_err(upstream)?;
        let trip = parse_model_output(&text)?;

        for warning in edit_warnings(&request.current_trip, &trip)
            .into_iter()
            .chain(expectation_warnings(&trip, None))
        {
            warn!(%warning, "Edited itinerary deviates from expectations");
        }
        Ok(trip)
    }
}

/// Extract, parse and validate a Trip from raw model text.
pub fn parse_model_output(text: &str) -> Result<Trip, ItineraryError> {
    let Some(value) = extract_json(text) else {
        warn!(
            preview = truncate_to_char_boundary(text, OUTPUT_PREVIEW_BYTES),
            "Model output contained no JSON"
        );
        return Err(ItineraryError::MalformedOutput);
    };

    validate_trip(&value).map_err(|violations| {
        warn!(
            violations = violations.len(),
            first = %violations.first().map(ToString::to_string).unwrap_or_default(),
            "Model output failed schema validation"
        );
        ItineraryError::InvalidOutput(violations)
    })
}

fn upstream(err: AiError) -> ItineraryError {
    debug!(error = ?err, "Model invocation failed");
    ItineraryError::Upstream(err.to_string())
}
