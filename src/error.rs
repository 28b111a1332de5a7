//! Unified error handling for the route-geometry library.
//!
//! Every failure in this crate degrades to a usable result at the call site
//! (partial decode, straight-line fallback, default viewport). The error type
//! exists so those recoveries can be logged and tested rather than hidden.

use thiserror::Error;

use crate::GeoPoint;

/// A truncated or otherwise malformed encoded polyline.
///
/// Carries the points decoded before the failure so callers can still draw
/// the part of the path that was intact.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("polyline truncated at code unit {offset} after {} points", .partial.len())]
pub struct DecodeError {
    /// Offset (in UTF-16 code units) where decoding stopped
    pub offset: usize,
    /// Points decoded before the failure
    pub partial: Vec<GeoPoint>,
}

impl DecodeError {
    /// Consume the error and keep the partial decode.
    pub fn into_partial(self) -> Vec<GeoPoint> {
        self.partial
    }
}

/// Unified error type for route-geometry operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RouteError {
    /// Encoded polyline could not be fully decoded
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Routing provider failed: network, status code, body or empty route
    #[error("{}", provider_message(.message, .status_code))]
    RoutingProvider {
        message: String,
        status_code: Option<u16>,
    },

    /// An operation that needs at least one point received none
    #[error("{operation} requires at least one point")]
    EmptyInput { operation: &'static str },

    /// Coordinates outside WGS-84 ranges or not finite
    #[error("Invalid coordinates: {message}")]
    InvalidCoordinates { message: String },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config { message: String },
}

fn provider_message(message: &str, status_code: &Option<u16>) -> String {
    match status_code {
        Some(code) => format!("Routing provider error ({}): {}", code, message),
        None => format!("Routing provider error: {}", message),
    }
}

impl RouteError {
    /// Shorthand for a provider failure without an HTTP status.
    pub fn provider(message: impl Into<String>) -> Self {
        RouteError::RoutingProvider {
            message: message.into(),
            status_code: None,
        }
    }

    /// Shorthand for a provider failure carrying an HTTP status.
    pub fn provider_status(status_code: u16, message: impl Into<String>) -> Self {
        RouteError::RoutingProvider {
            message: message.into(),
            status_code: Some(status_code),
        }
    }

    /// Whether the failure came from the routing provider.
    pub fn is_provider_error(&self) -> bool {
        matches!(self, RouteError::RoutingProvider { .. })
    }
}

/// Result type alias for route-geometry operations.
pub type Result<T> = std::result::Result<T, RouteError>;

/// Extension trait for converting Option to RouteError.
pub trait OptionExt<T> {
    /// Convert Option to Result with an empty input error.
    fn ok_or_empty(self, operation: &'static str) -> Result<T>;

    /// Convert Option to Result with a routing provider error.
    fn ok_or_provider(self, message: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_empty(self, operation: &'static str) -> Result<T> {
        self.ok_or(RouteError::EmptyInput { operation })
    }

    fn ok_or_provider(self, message: &str) -> Result<T> {
        self.ok_or_else(|| RouteError::provider(message))
    }
}
