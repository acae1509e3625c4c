//! API-level constants

/// API version segment of every versioned path
pub const API_VERSION: &str = "v1";

/// Path prefix for versioned routes
pub const API_PREFIX: &str = "/api/v1";
