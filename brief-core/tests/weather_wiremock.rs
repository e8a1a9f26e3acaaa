//! Integration tests for the Open-Meteo client using wiremock.

use std::time::Duration;

use brief_core::{
    FetchError, WeatherClient, WeatherCondition, WeatherEndpoints,
    config::{CHARLOTTE, TIMEZONE},
    weather::WEATHER_TTL,
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

fn client_for(server: &MockServer) -> WeatherClient {
    let endpoints = WeatherEndpoints {
        forecast_url: format!("{}/v1/forecast", server.uri()),
        air_quality_url: format!("{}/v1/air-quality", server.uri()),
    };
    WeatherClient::with_endpoints(endpoints, WEATHER_TTL).unwrap()
}

fn forecast_body() -> serde_json::Value {
    serde_json::json!({
        "latitude": 35.23,
        "longitude": -80.84,
        "timezone": "America/New_York",
        "daily_units": {
            "time": "iso8601",
            "weather_code": "wmo code",
            "temperature_2m_max": "°F",
            "temperature_2m_min": "°F"
        },
        "daily": {
            "time": ["2026-10-18", "2026-10-19", "2026-10-20", "2026-10-21",
                     "2026-10-22", "2026-10-23", "2026-10-24"],
            "weather_code": [0, 2, 61, 3, 95, 45, 1],
            "temperature_2m_max": [72.1, 74.0, 65.3, 68.0, 70.2, 66.6, 71.0],
            "temperature_2m_min": [50.0, 52.4, 55.0, 49.9, 58.1, 47.0, 48.3]
        }
    })
}

#[tokio::test]
async fn forecast_returns_seven_ordered_days() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("temperature_unit", "fahrenheit"))
        .and(query_param("timezone", TIMEZONE))
        .and(query_param("forecast_days", "7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .mount(&server)
        .await;

    let forecast = client_for(&server).forecast(CHARLOTTE, TIMEZONE).await.unwrap();

    assert_eq!(forecast.len(), 7);
    assert!(forecast.windows(2).all(|w| w[0].date <= w[1].date));
    assert_eq!(forecast[0].condition, WeatherCondition::Clear);
    assert_eq!(forecast[2].condition.label(), "Rain");
    assert_eq!(forecast[0].high_f, Some(72.1));
}

#[tokio::test]
async fn forecast_is_fetched_once_within_ttl() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let first = client.forecast(CHARLOTTE, TIMEZONE).await.unwrap();
    let second = client.forecast(CHARLOTTE, TIMEZONE).await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn current_conditions_are_fetched_once_within_ttl() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("current", "temperature_2m,relative_humidity_2m,weather_code"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "current_units": { "temperature_2m": "°F" },
            "current": { "temperature_2m": 68.4, "relative_humidity_2m": 61, "weather_code": 2 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let first = client.current_conditions(CHARLOTTE).await.unwrap();
    let second = client.current_conditions(CHARLOTTE).await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn air_quality_is_fetched_once_within_ttl() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/air-quality"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "current": { "us_aqi": 42, "pm2_5": 7.3, "pm10": 12.9 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let first = client.air_quality(CHARLOTTE).await.unwrap();
    let second = client.air_quality(CHARLOTTE).await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn expired_cache_refetches() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .expect(2)
        .mount(&server)
        .await;

    let endpoints = WeatherEndpoints {
        forecast_url: format!("{}/v1/forecast", server.uri()),
        air_quality_url: format!("{}/v1/air-quality", server.uri()),
    };
    let client = WeatherClient::with_endpoints(endpoints, Duration::ZERO).unwrap();

    client.forecast(CHARLOTTE, TIMEZONE).await.unwrap();
    client.forecast(CHARLOTTE, TIMEZONE).await.unwrap();
}

#[tokio::test]
async fn current_conditions_are_parsed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("current", "temperature_2m,relative_humidity_2m,weather_code"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "current_units": { "temperature_2m": "°F", "relative_humidity_2m": "%" },
            "current": {
                "time": "2026-10-18T14:00",
                "temperature_2m": 68.4,
                "relative_humidity_2m": 61,
                "weather_code": 2
            }
        })))
        .mount(&server)
        .await;

    let current = client_for(&server).current_conditions(CHARLOTTE).await.unwrap();

    assert_eq!(current.temperature_f, 68.4);
    assert_eq!(current.humidity_pct, 61);
    assert_eq!(current.condition.label(), "Partly Cloudy");
}

#[tokio::test]
async fn celsius_current_conditions_are_converted() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "current_units": { "temperature_2m": "°C" },
            "current": { "temperature_2m": 20.0, "relative_humidity_2m": 50, "weather_code": 0 }
        })))
        .mount(&server)
        .await;

    let current = client_for(&server).current_conditions(CHARLOTTE).await.unwrap();
    assert_eq!(current.temperature_f, 68.0);
}

#[tokio::test]
async fn air_quality_is_parsed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/air-quality"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "current": { "time": "2026-10-18T14:00", "us_aqi": 42, "pm2_5": 7.3, "pm10": 12.9 }
        })))
        .mount(&server)
        .await;

    let air = client_for(&server).air_quality(CHARLOTTE).await.unwrap();

    assert_eq!(air.us_aqi, Some(42));
    assert_eq!(air.pm2_5, Some(7.3));
    assert_eq!(air.pm10, Some(12.9));
    assert_eq!(air.category().map(|c| c.label()), Some("Good"));
}

#[tokio::test]
async fn server_error_is_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/air-quality"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let err = client_for(&server).air_quality(CHARLOTTE).await.unwrap_err();

    match err {
        FetchError::Unavailable { reason } => assert!(reason.contains("503"), "{reason}"),
        other => panic!("expected Unavailable, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_payload_is_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server).forecast(CHARLOTTE, TIMEZONE).await.unwrap_err();
    assert!(matches!(err, FetchError::Unavailable { .. }));
}

#[tokio::test]
async fn failures_are_retried_on_next_call() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert!(client.forecast(CHARLOTTE, TIMEZONE).await.is_err());
    assert_eq!(client.forecast(CHARLOTTE, TIMEZONE).await.unwrap().len(), 7);
}

#[tokio::test]
async fn unreachable_host_is_unavailable() {
    let endpoints = WeatherEndpoints {
        forecast_url: "http://127.0.0.1:9/v1/forecast".to_string(),
        air_quality_url: "http://127.0.0.1:9/v1/air-quality".to_string(),
    };
    let client = WeatherClient::with_endpoints(endpoints, WEATHER_TTL).unwrap();

    let err = client.current_conditions(CHARLOTTE).await.unwrap_err();
    assert!(matches!(err, FetchError::Unavailable { .. }));
}
