//! Minimal clients for the Google Cloud REST APIs involved in a budget remediation.
pub mod api;
pub mod auth;
pub mod billing;
pub mod compute;
pub mod project;

/// Header required by every metadata server request.
pub(crate) const METADATA_FLAVOR_HEADER: &str = "metadata-flavor";
pub(crate) const METADATA_FLAVOR_VALUE: &str = "Google";
