//! Error taxonomy shared by the collaborators and the views that consume them.
//!
//! Every variant maps to exactly one user-facing string via `user_message()`;
//! callers convert failures to view state at the call site instead of
//! propagating them further.

use thiserror::Error;

pub const NOT_FOUND_MESSAGE: &str = "City not found. Check city and try again.";
pub const GENERIC_MESSAGE: &str = "An error occurred. Please try again later.";
pub const MISSING_CREDENTIAL_MESSAGE: &str =
    "Weather API key is not configured. Run `weathered configure` first.";
pub const SUGGESTIONS_FAILED_MESSAGE: &str = "Could not load city suggestions.";
pub const LOCATION_FAILED_MESSAGE: &str =
    "Unable to retrieve your location. Please enter a city manually.";
pub const LOCATION_UNSUPPORTED_MESSAGE: &str = "Geolocation is not supported on this system.";

/// Failures reported by the weather and geocoding collaborators.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// No API key, or a placeholder one, is configured. Raised before any request.
    #[error("no API key configured for the weather service")]
    MissingCredential,

    /// The weather endpoint answered 404 for the requested location.
    #[error("location not found")]
    NotFound,

    #[error("request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to reach weather service: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to parse weather service response: {0}")]
    Parse(#[from] serde_json::Error),
}

impl WeatherError {
    /// Message shown in the main result area for a failed weather lookup.
    pub fn user_message(&self) -> &'static str {
        match self {
            WeatherError::MissingCredential => MISSING_CREDENTIAL_MESSAGE,
            WeatherError::NotFound => NOT_FOUND_MESSAGE,
            WeatherError::Status { .. } | WeatherError::Transport(_) | WeatherError::Parse(_) => {
                GENERIC_MESSAGE
            }
        }
    }

    /// Message shown inline in the suggestion panel for a failed geocoding lookup.
    pub fn suggestion_message(&self) -> &'static str {
        match self {
            WeatherError::MissingCredential => MISSING_CREDENTIAL_MESSAGE,
            _ => SUGGESTIONS_FAILED_MESSAGE,
        }
    }
}

/// Failures of the geolocation capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeolocationError {
    #[error("location permission denied")]
    Denied,
    #[error("location unavailable")]
    Unavailable,
    #[error("geolocation is not supported")]
    Unsupported,
}

impl GeolocationError {
    pub fn user_message(&self) -> &'static str {
        match self {
            GeolocationError::Denied | GeolocationError::Unavailable => LOCATION_FAILED_MESSAGE,
            GeolocationError::Unsupported => LOCATION_UNSUPPORTED_MESSAGE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_has_its_own_message() {
        assert_eq!(WeatherError::NotFound.user_message(), NOT_FOUND_MESSAGE);
    }

    #[test]
    fn server_errors_share_the_generic_message() {
        let err = WeatherError::Status { status: 500, body: "boom".into() };
        assert_eq!(err.user_message(), GENERIC_MESSAGE);

        let err = WeatherError::Status { status: 401, body: String::new() };
        assert_eq!(err.user_message(), GENERIC_MESSAGE);
    }

    #[test]
    fn parse_errors_use_the_generic_message() {
        let err: WeatherError = serde_json::from_str::<u8>("nope").unwrap_err().into();
        assert_eq!(err.user_message(), GENERIC_MESSAGE);
        assert_eq!(err.suggestion_message(), SUGGESTIONS_FAILED_MESSAGE);
    }

    #[test]
    fn missing_credential_is_a_configuration_message_everywhere() {
        let err = WeatherError::MissingCredential;
        assert_eq!(err.user_message(), MISSING_CREDENTIAL_MESSAGE);
        assert_eq!(err.suggestion_message(), MISSING_CREDENTIAL_MESSAGE);
    }

    #[test]
    fn geolocation_messages() {
        assert_eq!(GeolocationError::Denied.user_message(), LOCATION_FAILED_MESSAGE);
        assert_eq!(GeolocationError::Unavailable.user_message(), LOCATION_FAILED_MESSAGE);
        assert_eq!(GeolocationError::Unsupported.user_message(), LOCATION_UNSUPPORTED_MESSAGE);
    }
}
