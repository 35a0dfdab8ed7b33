use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};
use tracing::{debug, warn};

use crate::{
    config::Config,
    error::WeatherError,
    model::{Condition, Place, WeatherQuery, WeatherReport},
};

use super::{Geocoder, WeatherProvider};

/// OpenWeather client serving both the weather lookup and the city geocoder.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: Option<String>,
    api_url: String,
    geo_url: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(api_key: Option<String>, api_url: String, geo_url: String) -> Self {
        Self {
            api_key,
            api_url,
            geo_url,
            http: Client::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.api_key().map(str::to_owned),
            config.api_url().to_owned(),
            config.geo_url().to_owned(),
        )
    }

    fn credential(&self) -> Result<&str, WeatherError> {
        self.api_key
            .as_deref()
            .filter(|key| !crate::config::is_placeholder_key(key))
            .ok_or(WeatherError::MissingCredential)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<T, WeatherError> {
        let res = self.http.get(url).query(params).send().await?;

        let status = res.status();
        let body = res.text().await?;

        if status == StatusCode::NOT_FOUND {
            return Err(WeatherError::NotFound);
        }
        if !status.is_success() {
            return Err(WeatherError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
    pressure: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Default, Deserialize)]
struct OwSys {
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    dt: Option<i64>,
    #[serde(default)]
    sys: OwSys,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    wind: OwWind,
}

impl From<OwCurrentResponse> for WeatherReport {
    fn from(parsed: OwCurrentResponse) -> Self {
        WeatherReport {
            location_name: parsed.name,
            country: parsed.sys.country,
            conditions: parsed
                .weather
                .into_iter()
                .map(|w| Condition {
                    main: w.main,
                    description: w.description,
                    icon: w.icon,
                })
                .collect(),
            temperature_c: parsed.main.temp,
            feels_like_c: parsed.main.feels_like,
            humidity_pct: parsed.main.humidity,
            pressure_hpa: parsed.main.pressure,
            wind_speed_mps: parsed.wind.speed,
            observation_time: parsed.dt.and_then(unix_to_utc),
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    fn ensure_credential(&self) -> Result<(), WeatherError> {
        self.credential().map(|_| ())
    }

    async fn get_weather(&self, query: &WeatherQuery) -> Result<WeatherReport, WeatherError> {
        let api_key = self.credential()?.to_owned();

        let mut params = match query {
            WeatherQuery::City(city) => vec![("q", city.clone())],
            WeatherQuery::Coordinates(c) => vec![
                ("lat", c.latitude.to_string()),
                ("lon", c.longitude.to_string()),
            ],
        };
        params.push(("units", "metric".to_owned()));
        params.push(("appid", api_key));

        debug!(%query, "fetching current weather");
        let parsed: OwCurrentResponse = self
            .get_json(&self.api_url, &params)
            .await
            .inspect_err(|err| warn!(%query, error = %err, "weather lookup failed"))?;

        Ok(parsed.into())
    }
}

#[async_trait]
impl Geocoder for OpenWeatherClient {
    fn ensure_credential(&self) -> Result<(), WeatherError> {
        self.credential().map(|_| ())
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Place>, WeatherError> {
        let api_key = self.credential()?.to_owned();

        let params = [
            ("q", query.to_owned()),
            ("limit", limit.to_string()),
            ("appid", api_key),
        ];

        debug!(query, limit, "fetching city suggestions");
        // The geocoding endpoint has no 404 semantics of its own; fold it into a status error.
        let places = match self.get_json::<Vec<Place>>(&self.geo_url, &params).await {
            Err(WeatherError::NotFound) => Err(WeatherError::Status {
                status: StatusCode::NOT_FOUND.as_u16(),
                body: String::new(),
            }),
            other => other,
        }
        .inspect_err(|err| warn!(query, error = %err, "geocoding failed"))?;

        Ok(places.into_iter().take(limit).collect())
    }
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(ts, 0)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
