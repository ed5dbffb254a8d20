//! Structural validation of model output.
//!
//! The model returns an untyped document. [`validate_trip`] walks it against
//! the Trip/Day/Activity shape and reports every mismatch with its path, so a
//! bad generation is distinguishable from a failed one. The expectation checks
//! further down never reject anything; they produce warnings for the logs.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::{Activity, Coordinates, Day, Trip};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaViolation {
    pub path: String,
    pub message: String,
}

impl SchemaViolation {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Check `value` against the Trip shape and build the typed Trip.
pub fn validate_trip(value: &Value) -> Result<Trip, Vec<SchemaViolation>> {
    let mut v = Validator::default();
    let trip = v.trip(value);
    match trip {
        Some(trip) if v.violations.is_empty() => Ok(trip),
        _ => Err(v.violations),
    }
}

#[derive(Default)]
struct Validator {
    violations: Vec<SchemaViolation>,
}

impl Validator {
    fn fail(&mut self, path: &str, message: impl Into<String>) {
        self.violations.push(SchemaViolation::new(path, message));
    }

    fn object<'a>(&mut self, value: &'a Value, path: &str) -> Option<&'a Map<String, Value>> {
        let obj = value.as_object();
        if obj.is_none() {
            self.fail(path, format!("expected object, found {}", type_name(value)));
        }
        obj
    }

    fn required_string(&mut self, obj: &Map<String, Value>, key: &str, path: &str) -> Option<String> {
        let path = join(path, key);
        match obj.get(key) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => {
                self.fail(&path, format!("expected string, found {}", type_name(other)));
                None
            }
            None => {
                self.fail(&path, "missing");
                None
            }
        }
    }

    /// Absent and `null` both mean "not provided".
    fn optional_string(&mut self, obj: &Map<String, Value>, key: &str, path: &str) -> Option<String> {
        match obj.get(key) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => {
                self.fail(
                    &join(path, key),
                    format!("expected string, found {}", type_name(other)),
                );
                None
            }
        }
    }

    fn array<'a>(&mut self, obj: &'a Map<String, Value>, key: &str, path: &str) -> Option<&'a Vec<Value>> {
        let path = join(path, key);
        match obj.get(key) {
            Some(Value::Array(items)) => Some(items),
            Some(other) => {
                self.fail(&path, format!("expected array, found {}", type_name(other)));
                None
            }
            None => {
                self.fail(&path, "missing");
                None
            }
        }
    }

    fn trip(&mut self, value: &Value) -> Option<Trip> {
        let obj = self.object(value, "$")?;
        let trip_name = self.required_string(obj, "tripName", "");
        let description = self.optional_string(obj, "description", "").unwrap_or_default();
        let days = self.array(obj, "days", "").map(|items| {
            items
                .iter()
                .enumerate()
                .filter_map(|(i, item)| self.day(item, &format!("days[{i}]")))
                .collect::<Vec<_>>()
        });

        Some(Trip {
            trip_name: trip_name?,
            description,
            days: days?,
        })
    }

    fn day(&mut self, value: &Value, path: &str) -> Option<Day> {
        let obj = self.object(value, path)?;
        let date = self.required_string(obj, "date", path);
        let day_number = self.day_number(obj, path);
        let city = self.required_string(obj, "city", path);
        let accommodation = self.optional_string(obj, "accommodation", path);
        let activities = self.array(obj, "activities", path).map(|items| {
            items
                .iter()
                .enumerate()
                .filter_map(|(i, item)| self.activity(item, &format!("{path}.activities[{i}]")))
                .collect::<Vec<_>>()
        });

        Some(Day {
            date: date?,
            day_number: day_number?,
            city: city?,
            accommodation,
            activities: activities?,
        })
    }

    /// Positive integer; `2.0` is accepted since models sometimes emit floats.
    fn day_number(&mut self, obj: &Map<String, Value>, path: &str) -> Option<u32> {
        let path = join(path, "dayNumber");
        let Some(value) = obj.get("dayNumber") else {
            self.fail(&path, "missing");
            return None;
        };
        let number = value.as_u64().or_else(|| {
            value
                .as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= 0.0)
                .map(|f| f as u64)
        });
        match number.and_then(|n| u32::try_from(n).ok()) {
            Some(n) if n >= 1 => Some(n),
            _ => {
                self.fail(&path, format!("expected positive integer, found {value}"));
                None
            }
        }
    }

    fn activity(&mut self, value: &Value, path: &str) -> Option<Activity> {
        let obj = self.object(value, path)?;
        let time = self.required_string(obj, "time", path);
        let place = self.required_string(obj, "place", path);
        let description = self.required_string(obj, "description", path);
        let coordinates = self.coordinates(obj, path);
        let address = self.optional_string(obj, "address", path);

        Some(Activity {
            time: time?,
            place: place?,
            description: description?,
            coordinates: coordinates?,
            address,
        })
    }

    /// Outer `None` is a violation, inner `None` is "no coordinates given".
    fn coordinates(&mut self, obj: &Map<String, Value>, path: &str) -> Option<Option<Coordinates>> {
        let path = join(path, "coordinates");
        let value = match obj.get("coordinates") {
            None | Some(Value::Null) => return Some(None),
            Some(value) => value,
        };
        let coords = self.object(value, &path)?;
        let lat = self.number(coords, "lat", &path);
        let lng = self.number(coords, "lng", &path);
        Some(Some(Coordinates::new(lat?, lng?)))
    }

    fn number(&mut self, obj: &Map<String, Value>, key: &str, path: &str) -> Option<f64> {
        let path = join(path, key);
        match obj.get(key) {
            Some(value) if value.is_number() => value.as_f64(),
            Some(other) => {
                self.fail(&path, format!("expected number, found {}", type_name(other)));
                None
            }
            None => {
                self.fail(&path, "missing");
                None
            }
        }
    }
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// =============================================================================
// Expectation checks
// =============================================================================

/// Soft checks on a structurally valid trip. `requested` is the inclusive date
/// range the trip was planned for, when known.
pub fn expectation_warnings(trip: &Trip, requested: Option<(NaiveDate, NaiveDate)>) -> Vec<String> {
    let mut warnings = Vec::new();

    if trip.days.is_empty() {
        warnings.push("itinerary has no days".to_string());
    }

    for (i, day) in trip.days.iter().enumerate() {
        let expected = i as u32 + 1;
        if day.day_number != expected {
            warnings.push(format!(
                "days[{i}] has dayNumber {} (expected {expected})",
                day.day_number
            ));
        }
        if day.parsed_date().is_none() {
            warnings.push(format!("days[{i}] has unparseable date '{}'", day.date));
        }
        for (j, activity) in day.activities.iter().enumerate() {
            match activity.coordinates {
                Some(c) if !c.is_mappable() && c.lat != 0.0 && c.lng != 0.0 => warnings.push(
                    format!("days[{i}].activities[{j}] has implausible coordinates ({}, {})", c.lat, c.lng),
                ),
                _ => {}
            }
        }
    }

    if let Some((start, end)) = requested {
        let expected_days = (end - start).num_days() + 1;
        if trip.days.len() as i64 != expected_days {
            warnings.push(format!(
                "itinerary has {} days but {start}..={end} spans {expected_days}",
                trip.days.len()
            ));
        }
        if let Some(first) = trip.days.first().and_then(Day::parsed_date) {
            if first != start {
                warnings.push(format!("first day is {first}, requested start is {start}"));
            }
        }
    }

    warnings
}

/// Days or activities that disappeared during an edit.
pub fn edit_warnings(before: &Trip, after: &Trip) -> Vec<String> {
    let mut warnings = Vec::new();
    if after.days.len() < before.days.len() {
        warnings.push(format!(
            "edit dropped days ({} -> {})",
            before.days.len(),
            after.days.len()
        ));
    }
    if after.activity_count() < before.activity_count() {
        warnings.push(format!(
            "edit dropped activities ({} -> {})",
            before.activity_count(),
            after.activity_count()
        ));
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_trip() -> Value {
        json!({
            "tripName": "Spring in Kyoto",
            "description": "Temples and tea",
            "days": [{
                "date": "2025-05-01",
                "dayNumber": 1,
                "city": "Kyoto",
                "accommodation": "Hotel Kanra",
                "activities": [{
                    "time": "12:30",
                    "place": "Nishiki Market",
                    "description": "Lunch: street food",
                    "coordinates": {"lat": 35.005, "lng": 135.764},
                    "address": "Nakagyo Ward"
                }, {
                    "time": "19:00",
                    "place": "Gion Karyo",
                    "description": "Dinner: kaiseki"
                }]
            }]
        })
    }

    #[test]
    fn accepts_a_well_formed_trip() {
        let trip = validate_trip(&valid_trip()).unwrap();
        assert_eq!(trip.trip_name, "Spring in Kyoto");
        assert_eq!(trip.days[0].accommodation.as_deref(), Some("Hotel Kanra"));
        assert_eq!(trip.days[0].activities[1].coordinates, None);
        assert_eq!(
            trip.days[0].activities[0].coordinates,
            Some(Coordinates::new(35.005, 135.764))
        );
    }

    #[test]
    fn validated_trip_matches_serde_decoding() {
        let value = valid_trip();
        let via_validator = validate_trip(&value).unwrap();
        let via_serde: Trip = serde_json::from_value(value).unwrap();
        assert_eq!(via_validator, via_serde);
    }

    #[test]
    fn rejects_non_object_root() {
        let violations = validate_trip(&json!([1, 2])).unwrap_err();
        assert_eq!(violations, vec![SchemaViolation::new("$", "expected object, found array")]);
    }

    #[test]
    fn reports_every_violation_with_its_path() {
        let mut value = valid_trip();
        value["tripName"] = json!(42);
        value["days"][0]["dayNumber"] = json!(0);
        value["days"][0]["activities"][0]["coordinates"] = json!({"lat": "35.0"});
        value["days"][0]["activities"][1]
            .as_object_mut()
            .unwrap()
            .remove("place");

        let violations = validate_trip(&value).unwrap_err();
        let paths: Vec<_> = violations.iter().map(|v| v.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![
                "tripName",
                "days[0].dayNumber",
                "days[0].activities[0].coordinates.lat",
                "days[0].activities[0].coordinates.lng",
                "days[0].activities[1].place",
            ]
        );
    }

    #[test]
    fn tolerates_nulls_and_float_day_numbers() {
        let mut value = valid_trip();
        value["description"] = Value::Null;
        value["days"][0]["accommodation"] = Value::Null;
        value["days"][0]["dayNumber"] = json!(1.0);
        value["days"][0]["activities"][0]["coordinates"] = Value::Null;

        let trip = validate_trip(&value).unwrap();
        assert_eq!(trip.description, "");
        assert_eq!(trip.days[0].day_number, 1);
        assert_eq!(trip.days[0].accommodation, None);
    }

    #[test]
    fn expectation_warnings_flag_gaps_and_range_mismatch() {
        let mut trip = validate_trip(&valid_trip()).unwrap();
        let mut second = trip.days[0].clone();
        second.day_number = 3;
        second.date = "soon".to_string();
        second.activities[0].coordinates = Some(Coordinates::new(95.0, 10.0));
        trip.days.push(second);

        let start = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 5, 3).unwrap();
        let warnings = expectation_warnings(&trip, Some((start, end)));

        assert_eq!(warnings.len(), 4, "{warnings:?}");
        assert!(warnings[0].contains("dayNumber 3 (expected 2)"));
        assert!(warnings[1].contains("unparseable date 'soon'"));
        assert!(warnings[2].contains("implausible coordinates"));
        assert!(warnings[3].contains("2 days"));
    }

    #[test]
    fn clean_trip_has_no_expectation_warnings() {
        let trip = validate_trip(&valid_trip()).unwrap();
        let day = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
        assert!(expectation_warnings(&trip, Some((day, day))).is_empty());
    }

    #[test]
    fn edit_warnings_detect_dropped_content() {
        let before = validate_trip(&valid_trip()).unwrap();
        let mut after = before.clone();
        after.days[0].activities.pop();
        assert_eq!(edit_warnings(&before, &after), vec!["edit dropped activities (2 -> 1)"]);
        assert!(edit_warnings(&before, &before).is_empty());
    }
}
