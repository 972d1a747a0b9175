//! External lookup abstractions (geocoding, routes, places, weather).

pub mod box_service;
pub mod service;

pub use box_service::BoxLookupService;
pub use service::ExternalLookupService;
