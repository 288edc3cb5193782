//! Weather data for the "now" and commute views.
//!
//! Fetches current conditions and the hourly series from Open-Meteo and
//! scores commute departure slots by precipitation risk. Rendering is the
//! presentation layer's job; this crate only produces the data.

pub mod commute;
pub mod provider;
pub mod types;

pub use commute::{best_slot, plan_departures, DepartureSlot};
pub use provider::ForecastClient;
pub use types::{Condition, CurrentWeather, HourSample, WeatherBundle, WeatherError};
