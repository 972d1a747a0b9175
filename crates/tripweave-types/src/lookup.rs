//! External lookup request/response types.
//!
//! Lookups are the geolocation and search calls some agent roles need
//! before their completion call (geocoding, routes, points of interest,
//! weather, place search).

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Kind of external lookup a role may perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LookupKind {
    Geocode,
    PoiSearch,
    Route,
    Weather,
    PlacesSearch,
}

impl fmt::Display for LookupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupKind::Geocode => write!(f, "geocode"),
            LookupKind::PoiSearch => write!(f, "poi-search"),
            LookupKind::Route => write!(f, "route"),
            LookupKind::Weather => write!(f, "weather"),
            LookupKind::PlacesSearch => write!(f, "places-search"),
        }
    }
}

impl FromStr for LookupKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "geocode" => Ok(LookupKind::Geocode),
            "poi-search" | "poi_search" => Ok(LookupKind::PoiSearch),
            "route" => Ok(LookupKind::Route),
            "weather" => Ok(LookupKind::Weather),
            "places-search" | "places_search" => Ok(LookupKind::PlacesSearch),
            other => Err(format!("invalid lookup kind: '{other}'")),
        }
    }
}

/// A single lookup call with string parameters.
///
/// Parameter names are provider-neutral: `address`, `origin`, `destination`,
/// `location`, `query`, `type`, `date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupRequest {
    pub kind: LookupKind,
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

impl LookupRequest {
    pub fn new(kind: LookupKind) -> Self {
        Self {
            kind,
            params: BTreeMap::new(),
        }
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Compact one-line description used in logs and tool-result labels.
    pub fn describe(&self) -> String {
        if self.params.is_empty() {
            return self.kind.to_string();
        }
        let params = self
            .params
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(", ");
        format!("{}({params})", self.kind)
    }
}

/// Result of a lookup: a short human-readable summary plus the raw payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupResult {
    pub kind: LookupKind,
    pub summary: String,
    #[serde(default)]
    pub data: serde_json::Value,
}
