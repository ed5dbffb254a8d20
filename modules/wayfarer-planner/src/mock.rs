use wayfarer_common::{Activity, Coordinates, Day, Trip};

/// Fixed itinerary served when no model credential is configured.
pub fn mock_trip(city: &str, start_date: &str) -> Trip {
    Trip {
        trip_name: format!("Journey to {city}"),
        description: "A simulated itinerary for demonstration purposes.".to_string(),
        days: vec![Day {
            date: start_date.to_string(),
            day_number: 1,
            city: city.to_string(),
            accommodation: None,
            activities: vec![
                Activity {
                    time: "09:00".to_string(),
                    place: format!("{city} Station"),
                    description: "Arrival and check-in".to_string(),
                    coordinates: Some(Coordinates::new(35.6895, 139.6917)),
                    address: None,
                },
                Activity {
                    time: "13:00".to_string(),
                    place: "Local Market".to_string(),
                    description: "Explore the vibrant market streets.".to_string(),
                    coordinates: Some(Coordinates::new(35.6905, 139.7000)),
                    address: None,
                },
            ],
        }],
    }
}
