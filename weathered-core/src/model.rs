use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Normalized payload handed to the weather collaborator.
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherQuery {
    City(String),
    Coordinates(Coordinates),
}

impl From<Coordinates> for WeatherQuery {
    fn from(coords: Coordinates) -> Self {
        WeatherQuery::Coordinates(coords)
    }
}

impl std::fmt::Display for WeatherQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WeatherQuery::City(name) => f.write_str(name),
            WeatherQuery::Coordinates(c) => write!(f, "{:.4}, {:.4}", c.latitude, c.longitude),
        }
    }
}

/// One geocoding candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    pub lat: f64,
    pub lon: f64,
}

impl Place {
    /// Human-readable suggestion label: `name[, state][, country]`.
    pub fn label(&self) -> String {
        let mut label = self.name.clone();
        for part in [&self.state, &self.country].into_iter().flatten() {
            if !part.is_empty() {
                label.push_str(", ");
                label.push_str(part);
            }
        }
        label
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub main: String,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub location_name: String,
    pub country: Option<String>,
    pub conditions: Vec<Condition>,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub humidity_pct: u8,
    pub pressure_hpa: f64,
    pub wind_speed_mps: f64,
    pub observation_time: Option<DateTime<Utc>>,
}

impl WeatherReport {
    /// The first condition reported, which drives the background selection.
    pub fn primary_condition(&self) -> Option<&Condition> {
        self.conditions.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(name: &str, state: Option<&str>, country: Option<&str>) -> Place {
        Place {
            name: name.into(),
            state: state.map(Into::into),
            country: country.map(Into::into),
            lat: 0.0,
            lon: 0.0,
        }
    }

    #[test]
    fn label_omits_missing_parts() {
        assert_eq!(place("Paris", None, Some("FR")).label(), "Paris, FR");
        assert_eq!(place("Paris", Some("TX"), Some("US")).label(), "Paris, TX, US");
        assert_eq!(place("Atlantis", None, None).label(), "Atlantis");
        assert_eq!(place("Springfield", Some("IL"), None).label(), "Springfield, IL");
    }

    #[test]
    fn label_skips_empty_strings() {
        assert_eq!(place("Oslo", Some(""), Some("NO")).label(), "Oslo, NO");
    }

    #[test]
    fn place_deserializes_without_optional_fields() {
        let json = r#"{"name":"Paris","country":"FR","lat":48.85,"lon":2.35}"#;
        let parsed: Place = serde_json::from_str(json).expect("valid place");
        assert_eq!(parsed.state, None);
        assert_eq!(parsed.country.as_deref(), Some("FR"));
    }

    #[test]
    fn query_display() {
        assert_eq!(WeatherQuery::City("Lyon".into()).to_string(), "Lyon");
        let coords = Coordinates { latitude: 48.8566, longitude: 2.3522 };
        assert_eq!(WeatherQuery::from(coords).to_string(), "48.8566, 2.3522");
    }
}
