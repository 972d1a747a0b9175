//! HTTP lookup service backed by Google Maps and SearchAPI.
//!
//! Geocoding, routes and place searches go to the Google Maps web services;
//! weather goes to SearchAPI's Google engine. Each response is reduced to a
//! short text summary for the model plus the relevant slice of raw JSON.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;

use tripweave_core::lookup::ExternalLookupService;
use tripweave_types::error::ServiceError;
use tripweave_types::lookup::{LookupKind, LookupRequest, LookupResult};

use crate::secret::{Credentials, GOOGLE_MAPS_API_KEY, SEARCHAPI_API_KEY};

/// Endpoints and limits for [`HttpLookupService`].
#[derive(Debug, Clone)]
pub struct HttpLookupConfig {
    pub maps_base_url: String,
    pub searchapi_base_url: String,
    pub timeout: Duration,
    /// Places listed in a search summary.
    pub max_places: usize,
}

impl Default for HttpLookupConfig {
    fn default() -> Self {
        Self {
            maps_base_url: "https://maps.googleapis.com/maps/api".into(),
            searchapi_base_url: "https://www.searchapi.io/api/v1".into(),
            timeout: Duration::from_secs(20),
            max_places: 5,
        }
    }
}

/// Lookup service over the Google Maps and SearchAPI HTTP endpoints.
///
/// Does NOT derive Debug: it holds API keys.
pub struct HttpLookupService {
    client: reqwest::Client,
    maps_key: Option<SecretString>,
    searchapi_key: Option<SecretString>,
    config: HttpLookupConfig,
}

impl HttpLookupService {
    pub fn new(
        config: HttpLookupConfig,
        maps_key: Option<SecretString>,
        searchapi_key: Option<SecretString>,
    ) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ServiceError::Provider(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            maps_key,
            searchapi_key,
            config,
        })
    }

    pub fn from_credentials(credentials: &Credentials) -> Result<Self, ServiceError> {
        Self::new(
            HttpLookupConfig::default(),
            credentials.google_maps_api_key.clone(),
            credentials.searchapi_api_key.clone(),
        )
    }

    async fn maps_get(&self, path: &str, params: &[(&str, &str)]) -> Result<Value, ServiceError> {
        let key = self
            .maps_key
            .as_ref()
            .ok_or_else(|| ServiceError::Auth(format!("{GOOGLE_MAPS_API_KEY} is not configured")))?;
        let url = format!("{}/{}", self.config.maps_base_url.trim_end_matches('/'), path);

        let response = self
            .client
            .get(&url)
            .query(params)
            .query(&[("key", key.expose_secret())])
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let body = read_json(response).await?;
        check_google_status(&body)?;
        Ok(body)
    }

    async fn searchapi_get(&self, params: &[(&str, &str)]) -> Result<Value, ServiceError> {
        let key = self
            .searchapi_key
            .as_ref()
            .ok_or_else(|| ServiceError::Auth(format!("{SEARCHAPI_API_KEY} is not configured")))?;
        let url = format!("{}/search", self.config.searchapi_base_url.trim_end_matches('/'));

        let response = self
            .client
            .get(&url)
            .query(params)
            .query(&[("api_key", key.expose_secret())])
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let body = read_json(response).await?;
        if let Some(error) = body.get("error").and_then(Value::as_str) {
            return Err(ServiceError::Provider(format!("searchapi: {error}")));
        }
        Ok(body)
    }

    async fn place_search(&self, request: &LookupRequest) -> Result<LookupResult, ServiceError> {
        let query = search_query(required(request, "query")?, request.get("location"));
        let mut params = vec![("query", query.as_str())];
        if let Some(place_type) = request.get("type") {
            params.push(("type", place_type));
        }
        let body = self.maps_get("place/textsearch/json", &params).await?;
        parse_places(request.kind, &body, self.config.max_places)
    }
}

impl ExternalLookupService for HttpLookupService {
    fn name(&self) -> &str {
        "google-maps+searchapi"
    }

    async fn lookup(&self, request: &LookupRequest) -> Result<LookupResult, ServiceError> {
        tracing::debug!(lookup = %request.describe(), "http lookup");
        match request.kind {
            LookupKind::Geocode => {
                let address = required(request, "address")?;
                let body = self.maps_get("geocode/json", &[("address", address)]).await?;
                parse_geocode(&body)
            }
            LookupKind::Route => {
                let origin = required(request, "origin")?;
                let destination = required(request, "destination")?;
                let body = self
                    .maps_get(
                        "directions/json",
                        &[("origin", origin), ("destination", destination)],
                    )
                    .await?;
                parse_route(origin, destination, &body)
            }
            LookupKind::PoiSearch | LookupKind::PlacesSearch => self.place_search(request).await,
            LookupKind::Weather => {
                let location = required(request, "location")?;
                let query = match request.get("start_date") {
                    Some(date) => format!("weather {location} {date}"),
                    None => format!("weather {location}"),
                };
                let body = self
                    .searchapi_get(&[("engine", "google"), ("q", query.as_str())])
                    .await?;
                parse_weather(location, &body)
            }
        }
    }
}

fn required<'a>(request: &'a LookupRequest, key: &str) -> Result<&'a str, ServiceError> {
    request
        .get(key)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ServiceError::Provider(format!("{} lookup needs '{key}'", request.kind)))
}

/// Text search has no separate location field; fold it into the query.
fn search_query(query: &str, location: Option<&str>) -> String {
    match location {
        Some(loc) if !loc.trim().is_empty() && !query.to_lowercase().contains(&loc.trim().to_lowercase()) => {
            format!("{} {}", query.trim(), loc.trim())
        }
        _ => query.trim().to_string(),
    }
}

async fn read_json(response: reqwest::Response) -> Result<Value, ServiceError> {
    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        return Err(map_http_status(status.as_u16(), &text));
    }
    response
        .json::<Value>()
        .await
        .map_err(|e| ServiceError::Provider(format!("invalid JSON response: {e}")))
}

fn map_reqwest_error(err: reqwest::Error) -> ServiceError {
    if err.is_timeout() || err.is_connect() {
        ServiceError::Transient(err.to_string())
    } else {
        ServiceError::Provider(err.to_string())
    }
}

/// Map a non-success HTTP status to a [`ServiceError`].
pub(crate) fn map_http_status(status: u16, body: &str) -> ServiceError {
    let message = format!("HTTP {status}: {}", body.chars().take(200).collect::<String>());
    match status {
        401 | 403 => ServiceError::Auth(message),
        404 => ServiceError::NotFound(message),
        429 | 500..=599 => ServiceError::Transient(message),
        _ => ServiceError::Provider(message),
    }
}

/// Map the `status` field Google Maps returns inside a 200 response.
pub(crate) fn check_google_status(body: &Value) -> Result<(), ServiceError> {
    let status = body.get("status").and_then(Value::as_str).unwrap_or("OK");
    let detail = body
        .get("error_message")
        .and_then(Value::as_str)
        .map_or_else(|| status.to_string(), |msg| format!("{status}: {msg}"));
    match status {
        "OK" => Ok(()),
        "ZERO_RESULTS" | "NOT_FOUND" => Err(ServiceError::NotFound(detail)),
        "REQUEST_DENIED" => Err(ServiceError::Auth(detail)),
        "OVER_QUERY_LIMIT" | "OVER_DAILY_LIMIT" | "UNKNOWN_ERROR" => {
            Err(ServiceError::Transient(detail))
        }
        _ => Err(ServiceError::Provider(detail)),
    }
}

fn results(body: &Value) -> &[Value] {
    body.get("results")
        .and_then(Value::as_array)
        .map_or(&[], Vec::as_slice)
}

pub(crate) fn parse_geocode(body: &Value) -> Result<LookupResult, ServiceError> {
    let first = results(body)
        .first()
        .ok_or_else(|| ServiceError::NotFound("geocode returned no results".into()))?;
    let address = first
        .get("formatted_address")
        .and_then(Value::as_str)
        .unwrap_or("unknown address");
    let location = first.pointer("/geometry/location");
    let summary = match location.and_then(|l| Some((l.get("lat")?.as_f64()?, l.get("lng")?.as_f64()?))) {
        Some((lat, lng)) => format!("{address} ({lat:.5}, {lng:.5})"),
        None => address.to_string(),
    };
    Ok(LookupResult {
        kind: LookupKind::Geocode,
        summary,
        data: first.clone(),
    })
}

pub(crate) fn parse_route(origin: &str, destination: &str, body: &Value) -> Result<LookupResult, ServiceError> {
    let leg = body
        .pointer("/routes/0/legs/0")
        .ok_or_else(|| ServiceError::NotFound(format!("no route from {origin} to {destination}")))?;
    let distance = leg.pointer("/distance/text").and_then(Value::as_str).unwrap_or("unknown distance");
    let duration = leg.pointer("/duration/text").and_then(Value::as_str).unwrap_or("unknown duration");
    Ok(LookupResult {
        kind: LookupKind::Route,
        summary: format!("{origin} -> {destination}: {distance}, about {duration}"),
        data: leg.clone(),
    })
}

pub(crate) fn parse_places(kind: LookupKind, body: &Value, max: usize) -> Result<LookupResult, ServiceError> {
    let places = results(body);
    if places.is_empty() {
        return Err(ServiceError::NotFound("place search returned no results".into()));
    }
    let lines: Vec<String> = places
        .iter()
        .take(max)
        .map(|place| {
            let name = place.get("name").and_then(Value::as_str).unwrap_or("unnamed place");
            let mut line = format!("- {name}");
            if let Some(address) = place.get("formatted_address").and_then(Value::as_str) {
                line.push_str(&format!(", {address}"));
            }
            if let Some(rating) = place.get("rating").and_then(Value::as_f64) {
                line.push_str(&format!(" (rating {rating:.1})"));
            }
            line
        })
        .collect();
    Ok(LookupResult {
        kind,
        summary: lines.join("\n"),
        data: Value::Array(places.iter().take(max).cloned().collect()),
    })
}

pub(crate) fn parse_weather(location: &str, body: &Value) -> Result<LookupResult, ServiceError> {
    let answer = body
        .get("answer_box")
        .ok_or_else(|| ServiceError::NotFound(format!("no weather data for {location}")))?;
    let text = |key: &str| answer.get(key).and_then(Value::as_str);

    let mut summary = format!("Weather in {location}");
    if let Some(weather) = text("weather") {
        summary.push_str(&format!(": {weather}"));
    }
    if let Some(temperature) = text("temperature") {
        let unit = text("unit").unwrap_or("");
        summary.push_str(&format!(", {temperature}{unit}"));
    }
    for (label, key) in [("precipitation", "precipitation"), ("humidity", "humidity"), ("wind", "wind")] {
        if let Some(value) = text(key) {
            summary.push_str(&format!(", {label} {value}"));
        }
    }
    if let Some(forecast) = answer.get("forecast").and_then(Value::as_array) {
        for day in forecast {
            let name = day.get("day").and_then(Value::as_str).unwrap_or("?");
            let weather = day.get("weather").and_then(Value::as_str).unwrap_or("");
            let high = day.pointer("/temperature/high").map(value_text).unwrap_or_default();
            let low = day.pointer("/temperature/low").map(value_text).unwrap_or_default();
            summary.push_str(&format!("\n- {name}: {weather} {high}/{low}"));
        }
    }

    Ok(LookupResult {
        kind: LookupKind::Weather,
        summary,
        data: answer.clone(),
    })
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_google_status_mapping() {
        assert!(check_google_status(&json!({"status": "OK"})).is_ok());
        assert!(matches!(
            check_google_status(&json!({"status": "ZERO_RESULTS"})),
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            check_google_status(&json!({"status": "REQUEST_DENIED", "error_message": "bad key"})),
            Err(ServiceError::Auth(msg)) if msg == "REQUEST_DENIED: bad key"
        ));
        assert!(matches!(
            check_google_status(&json!({"status": "OVER_QUERY_LIMIT"})),
            Err(ServiceError::Transient(_))
        ));
        assert!(matches!(
            check_google_status(&json!({"status": "INVALID_REQUEST"})),
            Err(ServiceError::Provider(_))
        ));
    }

    #[test]
    fn test_http_status_mapping() {
        assert!(matches!(map_http_status(401, ""), ServiceError::Auth(_)));
        assert!(matches!(map_http_status(404, ""), ServiceError::NotFound(_)));
        assert!(map_http_status(429, "slow down").is_retryable());
        assert!(map_http_status(503, "").is_retryable());
        assert!(matches!(map_http_status(400, ""), ServiceError::Provider(_)));
    }

    #[test]
    fn test_search_query_adds_missing_location() {
        assert_eq!(search_query("night markets", Some("Kaohsiung")), "night markets Kaohsiung");
        assert_eq!(search_query("hotels in Kaohsiung", Some("kaohsiung")), "hotels in Kaohsiung");
        assert_eq!(search_query(" ramen ", None), "ramen");
    }

    #[test]
    fn test_parse_geocode() {
        let body = json!({
            "status": "OK",
            "results": [{
                "formatted_address": "Kaohsiung City, Taiwan",
                "geometry": {"location": {"lat": 22.6272784, "lng": 120.3014353}}
            }]
        });
        let result = parse_geocode(&body).unwrap();
        assert_eq!(result.summary, "Kaohsiung City, Taiwan (22.62728, 120.30144)");
    }

    #[test]
    fn test_parse_route() {
        let body = json!({
            "status": "OK",
            "routes": [{"legs": [{"distance": {"text": "357 km"}, "duration": {"text": "3 hours 55 mins"}}]}]
        });
        let result = parse_route("Taipei", "Kaohsiung", &body).unwrap();
        assert_eq!(result.summary, "Taipei -> Kaohsiung: 357 km, about 3 hours 55 mins");
        assert!(matches!(
            parse_route("Taipei", "Atlantis", &json!({"routes": []})),
            Err(ServiceError::NotFound(_))
        ));
    }

    #[test]
    fn test_parse_places_limits_and_formats() {
        let body = json!({
            "status": "OK",
            "results": [
                {"name": "Liuhe Night Market", "formatted_address": "Xinxing District", "rating": 4.1},
                {"name": "Ruifeng Night Market"},
                {"name": "Third"}
            ]
        });
        let result = parse_places(LookupKind::PoiSearch, &body, 2).unwrap();
        assert_eq!(
            result.summary,
            "- Liuhe Night Market, Xinxing District (rating 4.1)\n- Ruifeng Night Market"
        );
        assert_eq!(result.data.as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn test_parse_weather() {
        let body = json!({
            "answer_box": {
                "weather": "Sunny",
                "temperature": "27",
                "unit": "°C",
                "humidity": "70%",
                "forecast": [{"day": "Saturday", "weather": "Cloudy", "temperature": {"high": 28, "low": 21}}]
            }
        });
        let result = parse_weather("Kaohsiung", &body).unwrap();
        assert!(result.summary.starts_with("Weather in Kaohsiung: Sunny, 27°C, humidity 70%"));
        assert!(result.summary.contains("- Saturday: Cloudy 28/21"));
        assert!(matches!(parse_weather("X", &json!({})), Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_request() {
        let service = HttpLookupService::new(HttpLookupConfig::default(), None, None).unwrap();
        let err = service
            .lookup(&LookupRequest::new(LookupKind::Geocode).param("address", "Taipei"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Auth(msg) if msg.contains(GOOGLE_MAPS_API_KEY)));

        let err = service
            .lookup(&LookupRequest::new(LookupKind::Weather).param("location", "Taipei"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Auth(msg) if msg.contains(SEARCHAPI_API_KEY)));
    }

    #[tokio::test]
    async fn test_missing_param_is_provider_error() {
        let service = HttpLookupService::new(HttpLookupConfig::default(), None, None).unwrap();
        let err = service
            .lookup(&LookupRequest::new(LookupKind::Route).param("origin", "Taipei"))
            .await
            .unwrap_err();
        assert_eq!(err, ServiceError::Provider("route lookup needs 'destination'".into()));
    }
}
