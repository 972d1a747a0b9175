//! HTTP request handlers for the REST API.

pub mod conversation;
pub mod roles;

#[cfg(test)]
pub(crate) mod test_support;
