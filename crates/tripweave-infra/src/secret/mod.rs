//! API credentials for the completion and lookup adapters.
//!
//! - `env`: environment + `.env` source
//! - [`Credentials`]: the resolved keys, wrapped in `SecretString`

pub mod env;

use std::collections::BTreeSet;

use secrecy::SecretString;

use tripweave_types::error::ConfigError;
use tripweave_types::lookup::LookupKind;

use self::env::EnvSource;

pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const GOOGLE_MAPS_API_KEY: &str = "GOOGLE_MAPS_API_KEY";
pub const SEARCHAPI_API_KEY: &str = "SEARCHAPI_API_KEY";

/// Credential names needed to serve `lookups`, completion key first.
///
/// Weather goes through SearchAPI; every other lookup kind through Google Maps.
pub fn required_keys(lookups: &BTreeSet<LookupKind>) -> Vec<&'static str> {
    let mut keys = vec![OPENAI_API_KEY];
    if lookups.iter().any(|k| *k != LookupKind::Weather) {
        keys.push(GOOGLE_MAPS_API_KEY);
    }
    if lookups.contains(&LookupKind::Weather) {
        keys.push(SEARCHAPI_API_KEY);
    }
    keys
}

/// Resolved API keys.
///
/// Does NOT implement `Display`; `SecretString`'s `Debug` redacts the values.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub openai_api_key: SecretString,
    pub google_maps_api_key: Option<SecretString>,
    pub searchapi_api_key: Option<SecretString>,
}

impl Credentials {
    /// Resolve the keys needed for `lookups` from `source`.
    ///
    /// Fails with every missing required name at once. Optional keys that
    /// happen to be present are still loaded.
    pub fn resolve(source: &EnvSource, lookups: &BTreeSet<LookupKind>) -> Result<Self, ConfigError> {
        let missing: Vec<String> = required_keys(lookups)
            .into_iter()
            .filter(|key| source.get(key).is_none())
            .map(str::to_string)
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::MissingCredential(missing));
        }

        let secret = |key: &str| source.get(key).map(SecretString::from);
        Ok(Self {
            openai_api_key: secret(OPENAI_API_KEY)
                .ok_or_else(|| ConfigError::MissingCredential(vec![OPENAI_API_KEY.to_string()]))?,
            google_maps_api_key: secret(GOOGLE_MAPS_API_KEY),
            searchapi_api_key: secret(SEARCHAPI_API_KEY),
        })
    }

    /// Whether any lookup credential is available.
    pub fn has_lookup_keys(&self) -> bool {
        self.google_maps_api_key.is_some() || self.searchapi_api_key.is_some()
    }
}
