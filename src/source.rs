use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::Volume;

/// Media source descriptor, replaced wholesale on every set-source command.
///
/// Descriptors arrive from the host runtime as loose key/value maps; only
/// the URL is mandatory. Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Source {
    /// Media URL, remote (`http(s)://`) or a local file path
    pub url: String,

    /// HTTP headers attached to remote asset requests
    pub headers: HashMap<String, String>,

    /// Start playing as soon as the source is loaded instead of paused
    pub autoplay: bool,

    /// Initial volume to apply alongside the new source
    pub volume: Option<Volume>,
}

impl Source {
    /// Create a descriptor for a plain URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Decode a descriptor from the host runtime's untyped map.
    ///
    /// # Errors
    /// Returns a deserialization error if the value is not a map or a field
    /// has the wrong shape.
    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Whether the descriptor carries enough information to load
    pub fn is_valid(&self) -> bool {
        !self.url.is_empty()
    }

    /// Whether two descriptors point at the same media.
    ///
    /// Compares the URL and the header map shallowly; autoplay and volume
    /// are playback settings, not part of the media identity. Bridge hosts
    /// can check this before issuing a set-source command; the shim itself
    /// always reloads when one arrives.
    pub fn same_media(&self, other: &Self) -> bool {
        self.url == other.url && self.headers == other.headers
    }
}
