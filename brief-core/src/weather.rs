//! Open-Meteo forecast, current conditions and air quality.
//!
//! Temperatures leave this module in Fahrenheit only. Every operation is
//! memoized for [`WEATHER_TTL`].

use std::time::Duration;

use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;

use crate::{
    cache::TtlCache,
    error::FetchError,
    http::{build_client, fetch_json},
    model::{AirQuality, Coordinate, CurrentConditions, DayForecast, Forecast, WeatherCondition},
};

pub const WEATHER_TTL: Duration = Duration::from_secs(30 * 60);

/// Number of daily records in a forecast.
pub const FORECAST_DAYS: usize = 7;

#[derive(Debug, Clone)]
pub struct WeatherEndpoints {
    pub forecast_url: String,
    pub air_quality_url: String,
}

impl Default for WeatherEndpoints {
    fn default() -> Self {
        Self {
            forecast_url: "https://api.open-meteo.com/v1/forecast".to_string(),
            air_quality_url: "https://air-quality-api.open-meteo.com/v1/air-quality".to_string(),
        }
    }
}

#[derive(Debug)]
pub struct WeatherClient {
    http: Client,
    endpoints: WeatherEndpoints,
    forecasts: TtlCache<String, Forecast>,
    conditions: TtlCache<String, CurrentConditions>,
    air: TtlCache<String, AirQuality>,
}

impl WeatherClient {
    pub fn new() -> Result<Self, FetchError> {
        Self::with_endpoints(WeatherEndpoints::default(), WEATHER_TTL)
    }

    pub fn with_endpoints(endpoints: WeatherEndpoints, ttl: Duration) -> Result<Self, FetchError> {
        Ok(Self {
            http: build_client()?,
            endpoints,
            forecasts: TtlCache::new(ttl),
            conditions: TtlCache::new(ttl),
            air: TtlCache::new(ttl),
        })
    }

    /// Seven-day forecast in ascending date order.
    #[instrument(skip(self))]
    pub async fn forecast(
        &self,
        coordinate: Coordinate,
        timezone: &str,
    ) -> Result<Forecast, FetchError> {
        let key = format!("{}|{timezone}", coordinate.key());
        self.forecasts.get_or_fetch(key, || self.fetch_forecast(coordinate, timezone)).await
    }

    #[instrument(skip(self))]
    pub async fn current_conditions(
        &self,
        coordinate: Coordinate,
    ) -> Result<CurrentConditions, FetchError> {
        self.conditions
            .get_or_fetch(coordinate.key(), || self.fetch_current(coordinate))
            .await
    }

    #[instrument(skip(self))]
    pub async fn air_quality(&self, coordinate: Coordinate) -> Result<AirQuality, FetchError> {
        self.air.get_or_fetch(coordinate.key(), || self.fetch_air_quality(coordinate)).await
    }

    async fn fetch_forecast(
        &self,
        coordinate: Coordinate,
        timezone: &str,
    ) -> Result<Forecast, FetchError> {
        let request = self.http.get(&self.endpoints.forecast_url).query(&[
            ("latitude", coordinate.latitude.to_string()),
            ("longitude", coordinate.longitude.to_string()),
            ("timezone", timezone.to_string()),
            ("daily", "weather_code,temperature_2m_max,temperature_2m_min".to_string()),
            ("temperature_unit", "fahrenheit".to_string()),
            ("forecast_days", FORECAST_DAYS.to_string()),
        ]);

        let payload: ForecastResponse = fetch_json(request, "Open-Meteo forecast").await?;
        parse_forecast(payload)
    }

    async fn fetch_current(&self, coordinate: Coordinate) -> Result<CurrentConditions, FetchError> {
        let request = self.http.get(&self.endpoints.forecast_url).query(&[
            ("latitude", coordinate.latitude.to_string()),
            ("longitude", coordinate.longitude.to_string()),
            ("current", "temperature_2m,relative_humidity_2m,weather_code".to_string()),
            ("temperature_unit", "fahrenheit".to_string()),
        ]);

        let payload: CurrentResponse = fetch_json(request, "Open-Meteo current weather").await?;
        let unit = payload.current_units.temperature_2m.as_deref();

        Ok(CurrentConditions {
            temperature_f: to_fahrenheit(payload.current.temperature_2m, unit),
            humidity_pct: payload.current.relative_humidity_2m.round().clamp(0.0, 100.0) as u8,
            condition: WeatherCondition::from_wmo_code(payload.current.weather_code),
        })
    }

    async fn fetch_air_quality(&self, coordinate: Coordinate) -> Result<AirQuality, FetchError> {
        let request = self.http.get(&self.endpoints.air_quality_url).query(&[
            ("latitude", coordinate.latitude.to_string()),
            ("longitude", coordinate.longitude.to_string()),
            ("current", "us_aqi,pm2_5,pm10".to_string()),
        ]);

        let payload: AirQualityResponse = fetch_json(request, "Open-Meteo air quality").await?;

        Ok(AirQuality {
            us_aqi: payload.current.us_aqi.map(|aqi| aqi.round().max(0.0) as u32),
            pm2_5: payload.current.pm2_5,
            pm10: payload.current.pm10,
        })
    }
}

fn parse_forecast(payload: ForecastResponse) -> Result<Forecast, FetchError> {
    let daily = payload.daily;
    let unit = payload.daily_units.temperature_2m_max.as_deref();

    let len = daily.time.len();
    if daily.weather_code.len() != len
        || daily.temperature_2m_max.len() != len
        || daily.temperature_2m_min.len() != len
    {
        return Err(FetchError::unavailable("forecast arrays have mismatched lengths"));
    }

    let mut days = daily
        .time
        .iter()
        .zip(&daily.weather_code)
        .zip(daily.temperature_2m_max.iter().zip(&daily.temperature_2m_min))
        .map(|((date, code), (high, low))| {
            let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|e| {
                FetchError::unavailable(format!("invalid forecast date '{date}': {e}"))
            })?;
            Ok(DayForecast {
                date,
                high_f: high.map(|t| to_fahrenheit(t, unit)),
                low_f: low.map(|t| to_fahrenheit(t, unit)),
                condition: code.map_or(WeatherCondition::Unknown, WeatherCondition::from_wmo_code),
            })
        })
        .collect::<Result<Vec<_>, FetchError>>()?;

    if days.len() < FORECAST_DAYS {
        return Err(FetchError::unavailable(format!(
            "forecast has {} days, expected {FORECAST_DAYS}",
            days.len()
        )));
    }

    days.sort_by_key(|day| day.date);
    days.truncate(FORECAST_DAYS);
    Ok(days)
}

/// Open-Meteo reports units as "°F" / "°C"; anything not Celsius is taken as Fahrenheit.
fn to_fahrenheit(value: f64, unit: Option<&str>) -> f64 {
    match unit.map(|u| u.trim().trim_start_matches('°')) {
        Some(u) if u.eq_ignore_ascii_case("c") => value * 9.0 / 5.0 + 32.0,
        _ => value,
    }
}

#[derive(Debug, Default, Deserialize)]
struct Units {
    #[serde(default)]
    temperature_2m: Option<String>,
    #[serde(default)]
    temperature_2m_max: Option<String>,
}

/// Open-Meteo puts `null` in these arrays for days a model doesn't cover.
#[derive(Debug, Deserialize)]
struct DailyData {
    time: Vec<String>,
    weather_code: Vec<Option<i32>>,
    temperature_2m_max: Vec<Option<f64>>,
    temperature_2m_min: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    daily_units: Units,
    daily: DailyData,
}

#[derive(Debug, Deserialize)]
struct CurrentData {
    temperature_2m: f64,
    relative_humidity_2m: f64,
    weather_code: i32,
}

#[derive(Debug, Deserialize)]
struct CurrentResponse {
    #[serde(default)]
    current_units: Units,
    current: CurrentData,
}

#[derive(Debug, Deserialize)]
struct AirQualityData {
    us_aqi: Option<f64>,
    pm2_5: Option<f64>,
    pm10: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct AirQualityResponse {
    current: AirQualityData,
}
