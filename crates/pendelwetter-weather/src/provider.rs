//! Open-Meteo forecast client.

use chrono::{NaiveDateTime, Utc};
use pendelwetter_core::ReqwestErrorExt;
use serde::Deserialize;
use std::time::Duration;

use crate::types::{Condition, CurrentWeather, HourSample, WeatherBundle, WeatherError};

const REQUEST_TIMEOUT_SECS: u64 = 10;
const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current_weather: CurrentWeatherWire,
    hourly: HourlyWire,
}

#[derive(Debug, Deserialize)]
struct CurrentWeatherWire {
    temperature: f64,
    windspeed: f64,
    weathercode: i32,
}

#[derive(Debug, Deserialize)]
struct HourlyWire {
    time: Vec<String>,
    temperature_2m: Vec<f64>,
    precipitation: Vec<f64>,
    #[serde(default)]
    precipitation_probability: Option<Vec<Option<u8>>>,
    weathercode: Vec<i32>,
}

/// Client for the Open-Meteo forecast endpoint.
#[derive(Debug, Clone)]
pub struct ForecastClient {
    client: reqwest::Client,
    endpoint: String,
}

impl ForecastClient {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, WeatherError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| WeatherError::Network(e.into_network_error()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// Fetch current conditions plus the hourly series for the coordinates.
    pub async fn fetch(&self, latitude: f64, longitude: f64) -> Result<WeatherBundle, WeatherError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("current_weather", "true".to_string()),
                (
                    "hourly",
                    "temperature_2m,precipitation,precipitation_probability,weathercode"
                        .to_string(),
                ),
                ("timezone", "auto".to_string()),
            ])
            .send()
            .await
            .map_err(|e| WeatherError::Network(e.into_network_error()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(WeatherError::Status {
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| WeatherError::Network(e.into_network_error()))?;
        let wire: ForecastResponse =
            serde_json::from_str(&body).map_err(|e| WeatherError::Parse(e.to_string()))?;

        tracing::debug!(hours = wire.hourly.time.len(), "Fetched forecast");
        Self::assemble(wire)
    }

    fn assemble(wire: ForecastResponse) -> Result<WeatherBundle, WeatherError> {
        let current = CurrentWeather {
            temperature_c: wire.current_weather.temperature,
            wind_speed_kmh: wire.current_weather.windspeed,
            condition: Condition::from_wmo_code(wire.current_weather.weathercode),
            fetched_at: Utc::now(),
        };

        let hourly = wire.hourly;
        let len = hourly
            .time
            .len()
            .min(hourly.temperature_2m.len())
            .min(hourly.precipitation.len())
            .min(hourly.weathercode.len());

        let mut hours = Vec::with_capacity(len);
        for i in 0..len {
            let time = NaiveDateTime::parse_from_str(&hourly.time[i], TIME_FORMAT)
                .map_err(|e| WeatherError::Parse(format!("hourly time: {}", e)))?;
            let probability = hourly
                .precipitation_probability
                .as_ref()
                .and_then(|p| p.get(i).copied().flatten());
            hours.push(HourSample {
                time,
                temperature_c: hourly.temperature_2m[i],
                precipitation_mm: hourly.precipitation[i],
                precipitation_probability: probability,
                condition: Condition::from_wmo_code(hourly.weathercode[i]),
            });
        }

        Ok(WeatherBundle { current, hours })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn forecast_body() -> serde_json::Value {
        serde_json::json!({
            "current_weather": {
                "temperature": 18.4,
                "windspeed": 12.3,
                "weathercode": 61,
                "time": "2026-08-30T14:00"
            },
            "hourly": {
                "time": ["2026-08-30T14:00", "2026-08-30T15:00", "2026-08-30T16:00"],
                "temperature_2m": [18.4, 18.9, 17.5],
                "precipitation": [0.4, 0.0, 1.2],
                "precipitation_probability": [55, 10, 80],
                "weathercode": [61, 2, 80]
            }
        })
    }

    #[tokio::test]
    async fn test_fetch_assembles_bundle() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("current_weather", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
            .mount(&server)
            .await;

        let client = ForecastClient::new(server.uri()).unwrap();
        let bundle = client.fetch(50.94, 6.96).await.unwrap();

        assert_eq!(bundle.current.condition, Condition::Rain);
        assert_eq!(bundle.current.temperature_c, 18.4);
        assert_eq!(bundle.hours.len(), 3);
        assert_eq!(bundle.hours[1].condition, Condition::MostlyClear);
        assert_eq!(bundle.hours[2].precipitation_probability, Some(80));
    }

    #[tokio::test]
    async fn test_missing_probability_is_tolerated() {
        let mut body = forecast_body();
        body["hourly"]
            .as_object_mut()
            .unwrap()
            .remove("precipitation_probability");

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let client = ForecastClient::new(server.uri()).unwrap();
        let bundle = client.fetch(50.94, 6.96).await.unwrap();
        assert_eq!(bundle.hours[0].precipitation_probability, None);
    }

    #[tokio::test]
    async fn test_server_error_is_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let client = ForecastClient::new(server.uri()).unwrap();
        let err = client.fetch(50.94, 6.96).await.unwrap_err();
        assert!(matches!(err, WeatherError::Status { status: 502 }));
    }

    #[tokio::test]
    async fn test_malformed_body_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .mount(&server)
            .await;

        let client = ForecastClient::new(server.uri()).unwrap();
        let err = client.fetch(50.94, 6.96).await.unwrap_err();
        assert!(matches!(err, WeatherError::Parse(_)));
    }
}
