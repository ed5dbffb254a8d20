// Test mocks for the planner.
//
// - MockModel (CompletionModel): scripted replies, records every prompt
// - sample_trip_json / kyoto_request: fixtures shared by the workspace tests

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use ai_client::{AiError, CompletionModel, ContentPart};
use async_trait::async_trait;
use wayfarer_common::{DateRange, GenerateRequest};

use crate::resolver::StaticModelResolver;
use crate::service::TripPlanner;

enum Reply {
    Text(String),
    Fail(String),
}

/// Scripted completion model. Replies are consumed in order; once exhausted
/// every call fails with an API error.
#[derive(Default)]
pub struct MockModel {
    replies: Mutex<VecDeque<Reply>>,
    calls: Mutex<Vec<Vec<ContentPart>>>,
}

impl MockModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply.
    pub fn reply(self, text: impl Into<String>) -> Self {
        self.push(Reply::Text(text.into()))
    }

    /// Queue an upstream failure.
    pub fn fail(self, message: impl Into<String>) -> Self {
        self.push(Reply::Fail(message.into()))
    }

    fn push(self, reply: Reply) -> Self {
        self.replies
            .lock()
            .expect("mock replies lock poisoned")
            .push_back(reply);
        self
    }

    /// Prompts received so far, one entry per call.
    pub fn calls(&self) -> Vec<Vec<ContentPart>> {
        self.calls.lock().expect("mock calls lock poisoned").clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("mock calls lock poisoned").len()
    }

    /// Text part of the `n`th call.
    pub fn prompt_text(&self, n: usize) -> Option<String> {
        self.calls().get(n)?.iter().find_map(|part| match part {
            ContentPart::Text(text) => Some(text.clone()),
            ContentPart::InlineData { .. } => None,
        })
    }

    /// Planner backed by this mock.
    pub fn planner(self: &Arc<Self>) -> TripPlanner {
        TripPlanner::new(Arc::new(StaticModelResolver::new(self.clone())))
    }
}

#[async_trait]
impl CompletionModel for MockModel {
    fn provider(&self) -> &'static str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    async fn complete(&self, parts: Vec<ContentPart>) -> Result<String, AiError> {
        self.calls
            .lock()
            .expect("mock calls lock poisoned")
            .push(parts);
        let reply = self
            .replies
            .lock()
            .expect("mock replies lock poisoned")
            .pop_front();
        match reply {
            Some(Reply::Text(text)) => Ok(text),
            Some(Reply::Fail(body)) => Err(AiError::Api { status: 503, body }),
            None => Err(AiError::Api {
                status: 500,
                body: "no scripted reply left".to_string(),
            }),
        }
    }
}

/// Planner with no model configured (mock itinerary mode).
pub fn unconfigured_planner() -> TripPlanner {
    TripPlanner::new(Arc::new(StaticModelResolver::unconfigured()))
}

/// The single-city scenario used across tests.
pub fn kyoto_request() -> GenerateRequest {
    GenerateRequest {
        cities: vec!["Kyoto".to_string()],
        places: String::new(),
        dates: DateRange::new("2025-05-01", "2025-05-01"),
        preferences: vec![],
        budget: Default::default(),
        companions: Default::default(),
        pacing: Default::default(),
        attachments: vec![],
    }
}

/// A valid model reply for a one-day Kyoto trip.
pub fn sample_trip_json() -> String {
    serde_json::json!({
        "tripName": "Kyoto in Bloom",
        "description": "Temples, tea and kaiseki.",
        "days": [{
            "date": "2025-05-01",
            "dayNumber": 1,
            "city": "Kyoto",
            "accommodation": "Hotel Kanra Kyoto",
            "activities": [
                {
                    "time": "09:00",
                    "place": "Fushimi Inari Taisha",
                    "description": "Walk the torii gates. Take the JR Nara line, 5 mins.",
                    "coordinates": {"lat": 34.9671, "lng": 135.7727},
                    "address": "Fushimi Ward, Kyoto"
                },
                {
                    "time": "12:30",
                    "place": "Nishiki Market",
                    "description": "Lunch: street food stalls, famous for tamagoyaki.",
                    "coordinates": {"lat": 35.0050, "lng": 135.7649}
                },
                {
                    "time": "19:00",
                    "place": "Gion Karyo",
                    "description": "Dinner: seasonal kaiseki in Gion.",
                    "coordinates": {"lat": 0.0, "lng": 0.0}
                }
            ]
        }]
    })
    .to_string()
}
