use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ItineraryError;

// =============================================================================
// Itinerary schema
// =============================================================================

/// A generated itinerary. Replaced wholesale by edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub trip_name: String,
    pub description: String,
    pub days: Vec<Day>,
}

impl Trip {
    pub fn activity_count(&self) -> usize {
        self.days.iter().map(|day| day.activities.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Day {
    /// ISO date. Not guaranteed to parse; see [`Day::label`].
    pub date: String,
    pub day_number: u32,
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accommodation: Option<String>,
    pub activities: Vec<Activity>,
}

impl Day {
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").ok()
    }

    /// `May 1` for a valid date, `Day 3` otherwise.
    pub fn label(&self) -> String {
        match self.parsed_date() {
            Some(date) => date.format("%b %-d").to_string(),
            None => format!("Day {}", self.day_number),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub time: String,
    pub place: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl Activity {
    /// Coordinates worth putting on a map, if any.
    pub fn map_point(&self) -> Option<Coordinates> {
        self.coordinates.filter(Coordinates::is_mappable)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// A zero component or an out-of-range pair is a placeholder, not a location.
    pub fn is_mappable(&self) -> bool {
        self.lat != 0.0
            && self.lng != 0.0
            && self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

// =============================================================================
// Travel context enumerations
// =============================================================================

/// Preference tags offered by the planner form. The server accepts any tag.
pub const PREFERENCE_OPTIONS: &[&str] = &[
    "Culture & Tradition",
    "Local Food & Cuisine",
    "Nature & Landscapes",
    "History & Architecture",
    "Shopping & Markets",
    "Relaxation & Wellness",
];

macro_rules! travel_enum {
    ($name:ident, default = $default:ident, [$($variant:ident => $guidance:literal),+ $(,)?]) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($variant)),+
                }
            }

            /// How the model should read this choice.
            pub fn guidance(&self) -> &'static str {
                match self {
                    $($name::$variant => $guidance),+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| {
                        let options: Vec<_> = $name::ALL.iter().map(|v| v.as_str()).collect();
                        format!("unknown {} '{}' (expected one of: {})", stringify!($name).to_lowercase(), wanted, options.join(", "))
                    })
            }
        }
    };
}

travel_enum!(Budget, default = Moderate, [
    Budget => "street food, free sights and public transport",
    Moderate => "a mix of casual restaurants and paid highlights",
    Luxury => "fine dining, premium experiences and private transfers",
]);

travel_enum!(Companions, default = Couple, [
    Solo => "flexible plans and social spots for a solo traveller",
    Couple => "romantic settings and experiences for two",
    Family => "kid friendly activities and manageable walking",
    Friends => "nightlife and group fun",
]);

travel_enum!(Pacing, default = Balanced, [
    Relaxed => "low intensity, late starts and long meals",
    Balanced => "a steady rhythm with breaks between highlights",
    Packed => "maximised sightseeing from early morning",
]);

// =============================================================================
// API requests
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

impl DateRange {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Both ends parsed, with `start <= end` enforced.
    pub fn parse(&self) -> Result<(NaiveDate, NaiveDate), ItineraryError> {
        let parse = |label: &str, raw: &str| {
            NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
                ItineraryError::InvalidRequest(format!(
                    "{label} date '{raw}' is not a YYYY-MM-DD date"
                ))
            })
        };
        let start = parse("start", &self.start)?;
        let end = parse("end", &self.end)?;
        if start > end {
            return Err(ItineraryError::InvalidRequest(format!(
                "start date {start} is after end date {end}"
            )));
        }
        Ok((start, end))
    }

    /// Inclusive number of days; `None` if the range does not parse.
    pub fn num_days(&self) -> Option<u32> {
        let (start, end) = self.parse().ok()?;
        u32::try_from((end - start).num_days() + 1).ok()
    }
}

/// Body of `POST /api/generate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub cities: Vec<String>,
    #[serde(default)]
    pub places: String,
    pub dates: DateRange,
    #[serde(default)]
    pub preferences: Vec<String>,
    #[serde(default)]
    pub budget: Budget,
    #[serde(default)]
    pub companions: Companions,
    #[serde(default)]
    pub pacing: Pacing,
    /// `data:<mime>;base64,<payload>` URIs.
    #[serde(default)]
    pub attachments: Vec<String>,
}

impl GenerateRequest {
    /// Cities with surrounding whitespace removed and blanks dropped.
    pub fn destinations(&self) -> Vec<&str> {
        self.cities
            .iter()
            .map(|city| city.trim())
            .filter(|city| !city.is_empty())
            .collect()
    }
}

/// Body of `POST /api/edit-trip`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditRequest {
    pub current_trip: Trip,
    pub instructions: String,
}

/// JSON body of every non-2xx API response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default)]
    pub kind: String,
}

// =============================================================================
// Client-side persistence
// =============================================================================

/// A trip as kept by the client: the itinerary plus its identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredTrip {
    pub id: String,
    #[serde(flatten)]
    pub trip: Trip,
    pub created_at: DateTime<Utc>,
}

/// One row of the saved-trips listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripIndexEntry {
    pub id: String,
    pub name: String,
    pub date: String,
}
