//! Weather result to display mapping: background video selection, the result
//! area state, and the formatted weather card.

use tracing::{debug, info};

use crate::{
    error::WeatherError,
    geolocation::Geolocator,
    model::{WeatherQuery, WeatherReport},
    provider::WeatherProvider,
};

pub const DEFAULT_VIDEO_KEY: &str = "default";

const ATMOSPHERE_VIDEO: &str = "https://cdn.pixabay.com/video/2025/04/10/271161_large.mp4";

/// Background video per lower-cased primary condition. Must contain `DEFAULT_VIDEO_KEY`.
const VIDEO_SOURCES: &[(&str, &str)] = &[
    ("thunderstorm", "https://cdn.pixabay.com/video/2015/08/11/305-135918495_large.mp4"),
    ("drizzle", ATMOSPHERE_VIDEO),
    ("rain", "https://cdn.pixabay.com/video/2019/10/24/28236-368501609_large.mp4"),
    ("snow", ATMOSPHERE_VIDEO),
    ("mist", ATMOSPHERE_VIDEO),
    ("smoke", ATMOSPHERE_VIDEO),
    ("haze", ATMOSPHERE_VIDEO),
    ("dust", ATMOSPHERE_VIDEO),
    ("fog", ATMOSPHERE_VIDEO),
    ("sand", ATMOSPHERE_VIDEO),
    ("ash", ATMOSPHERE_VIDEO),
    ("squall", ATMOSPHERE_VIDEO),
    ("tornado", ATMOSPHERE_VIDEO),
    (
        "clear",
        "https://static.videezy.com/system/resources/previews/000/044/533/original/sky-timelapse-2.mp4",
    ),
    ("clouds", "https://cdn.pixabay.com/video/2019/02/11/21285-316701418_large.mp4"),
    (DEFAULT_VIDEO_KEY, ATMOSPHERE_VIDEO),
];

fn lookup_video(key: &str) -> Option<&'static str> {
    VIDEO_SOURCES
        .iter()
        .find(|(condition, _)| *condition == key)
        .map(|(_, url)| *url)
}

pub fn default_video() -> &'static str {
    lookup_video(DEFAULT_VIDEO_KEY).unwrap_or(ATMOSPHERE_VIDEO)
}

/// Select the background for a condition label such as `"Rain"`.
pub fn video_for_condition(condition: Option<&str>) -> &'static str {
    condition
        .map(|c| c.trim().to_lowercase())
        .and_then(|key| lookup_video(&key))
        .unwrap_or_else(default_video)
}

/// Main result area: at most one of `report` / `error` is set at a time.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherScreen {
    pub report: Option<WeatherReport>,
    pub error: Option<&'static str>,
    pub video: &'static str,
    pub loading: bool,
}

impl Default for WeatherScreen {
    fn default() -> Self {
        Self {
            report: None,
            error: None,
            video: default_video(),
            loading: false,
        }
    }
}

impl WeatherScreen {
    pub fn apply(&mut self, result: Result<WeatherReport, WeatherError>) {
        match result {
            Ok(report) => {
                let condition = report.primary_condition().map(|c| c.main.as_str());
                self.video = video_for_condition(condition);
                self.error = None;
                self.report = Some(report);
            }
            Err(err) => {
                debug!(error = %err, "weather lookup failed");
                self.report = None;
                self.video = default_video();
                self.error = Some(err.user_message());
            }
        }
    }

    pub async fn load(&mut self, provider: &dyn WeatherProvider, query: &WeatherQuery) {
        self.loading = true;
        self.error = None;
        let result = provider.get_weather(query).await;
        self.apply(result);
        self.loading = false;
    }

    /// Start-up lookup for the user's own position. A geolocation failure
    /// leaves the screen empty without a message.
    pub async fn bootstrap(&mut self, geolocator: &dyn Geolocator, provider: &dyn WeatherProvider) {
        self.loading = true;
        match geolocator.current_position().await {
            Ok(coords) => self.load(provider, &WeatherQuery::Coordinates(coords)).await,
            Err(err) => {
                info!(error = %err, "no position available at start-up");
                self.loading = false;
            }
        }
    }

    pub fn card(&self) -> Option<WeatherCard> {
        self.report.as_ref().map(WeatherCard::from_report)
    }
}

/// Formatted fields of a weather report, ready for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherCard {
    pub title: String,
    pub temperature: String,
    pub description: String,
    pub icon_url: Option<String>,
    pub humidity: String,
    pub wind: String,
    pub pressure: String,
    pub feels_like: String,
}

impl WeatherCard {
    pub fn from_report(report: &WeatherReport) -> Self {
        let title = match report.country.as_deref() {
            Some(country) if !country.is_empty() => format!("{}, {country}", report.location_name),
            _ => report.location_name.clone(),
        };
        let condition = report.primary_condition();

        Self {
            title,
            temperature: format!("{}°C", whole(report.temperature_c)),
            description: condition.map(|c| c.description.clone()).unwrap_or_default(),
            icon_url: condition
                .filter(|c| !c.icon.is_empty())
                .map(|c| format!("http://openweathermap.org/img/w/{}.png", c.icon)),
            humidity: format!("{}%", report.humidity_pct),
            wind: format!("{} m/s", report.wind_speed_mps),
            pressure: format!("{} hPa", report.pressure_hpa),
            feels_like: format!("{}°C", whole(report.feels_like_c)),
        }
    }
}

// Adding 0.0 turns -0.0 into 0.0 so "-0°C" is never shown.
fn whole(value: f64) -> f64 {
    value.round() + 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::{GENERIC_MESSAGE, GeolocationError, NOT_FOUND_MESSAGE},
        model::{Condition, Coordinates},
    };
    use async_trait::async_trait;
    use parking_lot::Mutex;

    fn report(main: &str) -> WeatherReport {
        WeatherReport {
            location_name: "London".into(),
            country: Some("GB".into()),
            conditions: vec![Condition {
                main: main.into(),
                description: "light rain".into(),
                icon: "10d".into(),
            }],
            temperature_c: 11.6,
            feels_like_c: 10.4,
            humidity_pct: 81,
            pressure_hpa: 1009.0,
            wind_speed_mps: 4.12,
            observation_time: None,
        }
    }

    #[derive(Debug, Default)]
    struct RecordingProvider {
        queries: Mutex<Vec<WeatherQuery>>,
    }

    #[async_trait]
    impl WeatherProvider for RecordingProvider {
        async fn get_weather(&self, query: &WeatherQuery) -> Result<WeatherReport, WeatherError> {
            self.queries.lock().push(query.clone());
            Ok(report("Clouds"))
        }
    }

    #[derive(Debug)]
    struct FailingLocator;

    #[async_trait]
    impl Geolocator for FailingLocator {
        async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
            Err(GeolocationError::Denied)
        }
    }

    #[test]
    fn every_table_key_is_lowercase() {
        for (key, _) in VIDEO_SOURCES {
            assert_eq!(*key, key.to_lowercase());
        }
        assert!(lookup_video(DEFAULT_VIDEO_KEY).is_some());
    }

    #[test]
    fn rain_selects_the_rain_video() {
        assert_eq!(video_for_condition(Some("Rain")), lookup_video("rain").unwrap());
        assert_ne!(video_for_condition(Some("Rain")), default_video());
    }

    #[test]
    fn unmapped_or_missing_condition_falls_back_to_default() {
        assert_eq!(video_for_condition(Some("Blizzard")), default_video());
        assert_eq!(video_for_condition(None), default_video());
        assert_eq!(video_for_condition(Some("")), default_video());
    }

    #[test]
    fn success_sets_report_and_video() {
        let mut screen = WeatherScreen::default();
        screen.apply(Ok(report("Clear")));

        assert_eq!(screen.video, lookup_video("clear").unwrap());
        assert!(screen.report.is_some());
        assert_eq!(screen.error, None);
    }

    #[test]
    fn not_found_shows_not_found_message() {
        let mut screen = WeatherScreen::default();
        screen.apply(Ok(report("Rain")));
        screen.apply(Err(WeatherError::NotFound));

        assert_eq!(screen.error, Some(NOT_FOUND_MESSAGE));
        assert_eq!(screen.report, None);
        assert_eq!(screen.video, default_video());
    }

    #[test]
    fn other_failures_show_generic_message() {
        let mut screen = WeatherScreen::default();
        screen.apply(Ok(report("Thunderstorm")));
        screen.apply(Err(WeatherError::Status { status: 503, body: String::new() }));

        assert_eq!(screen.error, Some(GENERIC_MESSAGE));
        assert_eq!(screen.report, None);
        assert_eq!(screen.video, default_video());
    }

    #[test]
    fn card_formats_like_the_result_panel() {
        let card = WeatherCard::from_report(&report("Rain"));

        assert_eq!(card.title, "London, GB");
        assert_eq!(card.temperature, "12°C");
        assert_eq!(card.feels_like, "10°C");
        assert_eq!(card.humidity, "81%");
        assert_eq!(card.wind, "4.12 m/s");
        assert_eq!(card.pressure, "1009 hPa");
        assert_eq!(card.icon_url.as_deref(), Some("http://openweathermap.org/img/w/10d.png"));
    }

    #[test]
    fn card_never_shows_negative_zero() {
        let mut chilly = report("Snow");
        chilly.temperature_c = -0.3;

        assert_eq!(WeatherCard::from_report(&chilly).temperature, "0°C");
    }

    #[tokio::test]
    async fn load_clears_loading_flag() {
        let provider = RecordingProvider::default();
        let mut screen = WeatherScreen::default();

        screen.load(&provider, &WeatherQuery::City("London".into())).await;

        assert!(!screen.loading);
        assert_eq!(screen.video, lookup_video("clouds").unwrap());
        assert_eq!(provider.queries.lock().len(), 1);
    }

    #[tokio::test]
    async fn bootstrap_without_position_is_silent() {
        let provider = RecordingProvider::default();
        let mut screen = WeatherScreen::default();

        screen.bootstrap(&FailingLocator, &provider).await;

        assert!(!screen.loading);
        assert_eq!(screen.error, None);
        assert!(provider.queries.lock().is_empty());
    }
}
