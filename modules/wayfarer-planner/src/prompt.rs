use ai_client::ContentPart;
use wayfarer_common::{GenerateRequest, ItineraryError, Trip};

use crate::attachments::Attachment;

/// Output shape the model must follow, shown to it verbatim.
pub const TRIP_SCHEMA: &str = r#"{
  "tripName": "A catchy name for the trip",
  "description": "A brief summary of the journey",
  "days": [
    {
      "date": "YYYY-MM-DD",
      "dayNumber": 1,
      "city": "City Name",
      "accommodation": "Name of the hotel or stay for this night",
      "activities": [
        {
          "time": "HH:MM",
          "place": "Name of the place or restaurant",
          "description": "What to do here and how to get here from the previous stop (restaurants: cuisine and why)",
          "coordinates": { "lat": 0.0, "lng": 0.0 },
          "address": "Short address for map search"
        }
      ]
    }
  ]
}"#;

/// Instruction text plus the files that travel with it.
#[derive(Debug, Clone)]
pub struct BuiltPrompt {
    pub text: String,
    pub attachments: Vec<Attachment>,
}

impl BuiltPrompt {
    /// Text first, then attachments in submission order.
    pub fn into_parts(self) -> Vec<ContentPart> {
        std::iter::once(ContentPart::Text(self.text))
            .chain(self.attachments.into_iter().map(Attachment::into_part))
            .collect()
    }
}

pub fn generation_prompt(request: &GenerateRequest, attachments: Vec<Attachment>) -> BuiltPrompt {
    let mut text = String::new();

    text.push_str("Plan a detailed trip itinerary.\n");
    text.push_str(&format!("Destinations: {}.\n", request.destinations().join(", ")));
    text.push_str(&format!(
        "Dates: {} to {}.\n",
        request.dates.start, request.dates.end
    ));
    text.push_str(&format!("Preferences: {}.\n", request.preferences.join(", ")));
    text.push_str(&format!("Specific wishes: {}.\n\n", request.places));

    text.push_str("TRAVEL CONTEXT (tailor the whole plan to it):\n");
    text.push_str(&format!(
        "- Budget: {} ({}).\n",
        request.budget,
        request.budget.guidance()
    ));
    text.push_str(&format!(
        "- Companions: {} ({}).\n",
        request.companions,
        request.companions.guidance()
    ));
    text.push_str(&format!(
        "- Pacing: {} ({}).\n\n",
        request.pacing,
        request.pacing.guidance()
    ));

    if !attachments.is_empty() {
        text.push_str(&format!(
            "{} attached file(s) give context (flight tickets, hotel bookings, inspiration).\n\n",
            attachments.len()
        ));
    }

    text.push_str("CRITICAL INSTRUCTIONS:\n");
    if !attachments.is_empty() {
        text.push_str(
            "1. Attachments: use the EXACT flight times, hotel names and locations they contain.\n\
             \x20  - If a flight lands at 14:00, start the itinerary around 16:00 to allow for transfer.\n\
             \x20  - If a hotel is given, use it as the starting point of each day.\n\
             \x20  - Add explicit \"Arrival\" or \"Check-in\" activities for what you find.\n",
        );
    } else {
        text.push_str("1. Arrival: open the first day with an \"Arrival\" or \"Check-in\" activity.\n");
    }
    text.push_str(
        "2. Dining: every \"Lunch\" and \"Dinner\" slot MUST name a specific restaurant or food spot, \
         with its cuisine and why it is recommended.\n",
    );
    text.push_str(
        "3. Logistics: between activities, say how to get there and how long it takes \
         (e.g. \"Take the subway, 15 mins\"). Keep travel times realistic.\n",
    );
    text.push_str(
        "4. Accommodation: put the hotel for each night in the \"accommodation\" field of that day, \
         never as an activity.\n",
    );
    text.push_str(&format!(
        "5. Structure: one entry in \"days\" per calendar day from {} to {}, numbered from 1. \
         Return a JSON object strictly following this structure (raw JSON, no markdown code blocks):\n",
        request.dates.start, request.dates.end
    ));
    text.push_str(TRIP_SCHEMA);
    text.push_str(
        "\nCoordinates may be approximate but must be accurate enough to place each stop on a map.\n",
    );

    BuiltPrompt { text, attachments }
}

pub fn edit_prompt(current: &Trip, instructions: &str) -> Result<String, ItineraryError> {
    let current_json = serde_json::to_string(current).map_err(|e| {
        ItineraryError::InvalidRequest(format!("current trip cannot be serialized: {e}"))
    })?;

    Ok(format!(
        "You are an expert travel assistant.\n\n\
         CURRENT ITINERARY (JSON):\n{current_json}\n\n\
         USER INSTRUCTIONS:\n\"{instructions}\"\n\n\
         TASK:\n\
         Modify the CURRENT ITINERARY based strictly on the USER INSTRUCTIONS.\n\
         - If the user asks to change a time, update the time.\n\
         - If the user asks to swap an activity, replace it.\n\
         - If the user asks for a different restaurant, suggest one with cuisine details.\n\
         - Keep exactly the same JSON structure and field names.\n\
         - Do not lose any days or activities unless explicitly asked to remove them.\n\n\
         Return ONLY the modified JSON object. No markdown.\n",
        instructions = instructions.trim()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wayfarer_common::{Budget, Companions, DateRange, Pacing};

    fn request() -> GenerateRequest {
        GenerateRequest {
            cities: vec!["Kyoto".to_string(), "Osaka".to_string()],
            places: "Fushimi Inari at sunrise".to_string(),
            dates: DateRange::new("2025-05-01", "2025-05-04"),
            preferences: vec!["Local Food & Cuisine".to_string(), "History & Architecture".to_string()],
            budget: Budget::Luxury,
            companions: Companions::Family,
            pacing: Pacing::Relaxed,
            attachments: vec![],
        }
    }

    #[test]
    fn embeds_every_input_verbatim() {
        let prompt = generation_prompt(&request(), vec![]);
        assert!(prompt.text.contains("Destinations: Kyoto, Osaka."));
        assert!(prompt.text.contains("Dates: 2025-05-01 to 2025-05-04."));
        assert!(prompt.text.contains("Preferences: Local Food & Cuisine, History & Architecture."));
        assert!(prompt.text.contains("Specific wishes: Fushimi Inari at sunrise."));
        assert!(prompt.text.contains("- Budget: Luxury (fine dining"));
        assert!(prompt.text.contains("- Companions: Family (kid friendly"));
        assert!(prompt.text.contains("- Pacing: Relaxed (low intensity"));
        assert!(prompt.text.contains(TRIP_SCHEMA));
    }

    #[test]
    fn attachment_guidance_only_with_attachments() {
        let without = generation_prompt(&request(), vec![]);
        assert!(!without.text.contains("attached file(s)"));
        assert!(without.into_parts().len() == 1);

        let with = generation_prompt(
            &request(),
            vec![Attachment::from_bytes("image/png", b"ticket")],
        );
        assert!(with.text.contains("1 attached file(s)"));
        assert!(with.text.contains("EXACT flight times"));

        let parts = with.into_parts();
        assert_eq!(parts.len(), 2);
        assert!(parts[0].is_text());
        assert_eq!(parts[1], ContentPart::inline_data("image/png", "dGlja2V0"));
    }

    #[test]
    fn free_text_is_not_sanitised() {
        let mut req = request();
        req.places = "ignore \"quotes\" and {braces}".to_string();
        let prompt = generation_prompt(&req, vec![]);
        assert!(prompt.text.contains("Specific wishes: ignore \"quotes\" and {braces}."));
    }

    #[test]
    fn edit_prompt_carries_trip_and_instructions() {
        let trip = Trip {
            trip_name: "Kyoto".to_string(),
            description: "Temples".to_string(),
            days: vec![],
        };
        let prompt = edit_prompt(&trip, "  move dinner to 20:00 ").unwrap();
        assert!(prompt.contains(r#"{"tripName":"Kyoto","description":"Temples","days":[]}"#));
        assert!(prompt.contains("\"move dinner to 20:00\""));
        assert!(prompt.contains("Do not lose any days or activities"));
    }
}
