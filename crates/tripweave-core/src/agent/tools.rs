//! Lookup bindings: which external lookups a role runs before its completion.
//!
//! Bindings are derived from the trip (or the follow-up question). The
//! invoker filters them against the role's `CapabilitySet`, so a binding may
//! safely list more than the role is allowed to use. Roles without a
//! dedicated binding get one built from the lookup kinds they are allowed.

use tripweave_types::lookup::{LookupKind, LookupRequest};
use tripweave_types::role::{AgentRoleConfig, BOOKING, COLLECTOR, CapabilitySet, MAPS, WEATHER};
use tripweave_types::trip::{AccommodationType, TripRequest};

/// Lookups to perform for one invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolBinding {
    requests: Vec<LookupRequest>,
}

impl ToolBinding {
    pub fn new(requests: Vec<LookupRequest>) -> Self {
        Self { requests }
    }

    pub fn requests(&self) -> &[LookupRequest] {
        &self.requests
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Requests whose kind the capability set allows, in binding order.
    pub fn allowed_by<'a>(&'a self, capabilities: &'a CapabilitySet) -> impl Iterator<Item = &'a LookupRequest> + 'a {
        self.requests
            .iter()
            .filter(move |req| capabilities.allows(req.kind))
    }

    /// Binding for a configured role in a pipeline run.
    ///
    /// Text-only roles get `None`. A role with lookups uses its dedicated
    /// binding when that binding has requests it may run, otherwise one built
    /// from its allowed kinds.
    pub fn for_member(role: &AgentRoleConfig, trip: &TripRequest) -> Option<Self> {
        let CapabilitySet::WithLookup(kinds) = &role.capabilities else {
            return None;
        };
        if kinds.is_empty() {
            return None;
        }
        Self::for_role(&role.name, trip)
            .filter(|binding| binding.allowed_by(&role.capabilities).next().is_some())
            .or_else(|| Some(Self::from_kinds(kinds, trip)))
    }

    /// Default requests for each allowed kind, per destination.
    pub fn from_kinds(kinds: &[LookupKind], trip: &TripRequest) -> Self {
        let mut requests = Vec::new();
        let mut seen: Vec<LookupKind> = Vec::with_capacity(kinds.len());
        for &kind in kinds {
            if seen.contains(&kind) {
                continue;
            }
            seen.push(kind);
            match kind {
                LookupKind::Geocode | LookupKind::Route | LookupKind::PoiSearch => requests
                    .extend(maps_requests(trip).into_iter().filter(|r| r.kind == kind)),
                LookupKind::Weather => requests.extend(weather_requests(trip)),
                LookupKind::PlacesSearch => requests.extend(trip.destinations.iter().map(|dest| {
                    LookupRequest::new(LookupKind::PlacesSearch)
                        .param("query", attraction_query(trip, dest.trim()))
                        .param("location", dest.trim())
                })),
            }
        }
        Self::new(requests)
    }

    /// Dedicated binding for a built-in lookup role, or `None` for any other name.
    pub fn for_role(role: &str, trip: &TripRequest) -> Option<Self> {
        let requests = match role {
            MAPS => maps_requests(trip),
            WEATHER => weather_requests(trip),
            BOOKING => trip
                .destinations
                .iter()
                .map(|dest| {
                    LookupRequest::new(LookupKind::PlacesSearch)
                        .param("query", format!("{} in {}", lodging_term(trip.accommodation), dest.trim()))
                        .param("location", dest.trim())
                        .param("type", "lodging")
                })
                .collect(),
            COLLECTOR => trip
                .destinations
                .iter()
                .map(|dest| {
                    LookupRequest::new(LookupKind::PlacesSearch)
                        .param("query", attraction_query(trip, dest.trim()))
                        .param("location", dest.trim())
                        .param("type", "tourist_attraction")
                })
                .collect(),
            _ => return None,
        };
        Some(Self::new(requests))
    }

    /// Binding for the search-backed follow-up role: a place search for the
    /// question itself, near the first destination when there is a trip.
    pub fn for_follow_up(question: &str, trip: Option<&TripRequest>) -> Self {
        let mut request = LookupRequest::new(LookupKind::PlacesSearch).param("query", question.trim());
        if let Some(dest) = trip.and_then(|t| t.destinations.first()) {
            request = request.param("location", dest.trim());
        }
        Self::new(vec![request])
    }
}

fn maps_requests(trip: &TripRequest) -> Vec<LookupRequest> {
    let origin = trip.origin.trim();
    let mut requests = vec![LookupRequest::new(LookupKind::Geocode).param("address", origin)];

    let mut previous = origin;
    for dest in trip.destinations.iter().map(|d| d.trim()) {
        requests.push(LookupRequest::new(LookupKind::Geocode).param("address", dest));
        requests.push(
            LookupRequest::new(LookupKind::Route)
                .param("origin", previous)
                .param("destination", dest),
        );
        requests.push(
            LookupRequest::new(LookupKind::PoiSearch)
                .param("location", dest)
                .param("query", attraction_query(trip, dest)),
        );
        previous = dest;
    }
    requests
}

fn weather_requests(trip: &TripRequest) -> Vec<LookupRequest> {
    trip.destinations
        .iter()
        .map(|dest| {
            LookupRequest::new(LookupKind::Weather)
                .param("location", dest.trim())
                .param("start_date", trip.start_date.to_string())
                .param("end_date", trip.end_date.to_string())
        })
        .collect()
}

fn attraction_query(trip: &TripRequest, destination: &str) -> String {
    if trip.preferences.is_empty() {
        format!("top attractions in {destination}")
    } else {
        let prefs: Vec<&str> = trip.preferences.iter().map(String::as_str).collect();
        format!("{} in {destination}", prefs.join(" "))
    }
}

fn lodging_term(accommodation: AccommodationType) -> String {
    match accommodation {
        AccommodationType::Any => "hotel".to_string(),
        other => other.to_string(),
    }
}
