//! Boundary-crossing events reported upstream.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::GeofenceRecord;

/// Direction of a boundary crossing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrossingType {
    /// The device moved into the fence.
    Enter,
    /// The device left the fence.
    Exit,
}

impl CrossingType {
    /// Lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Enter => "enter",
            Self::Exit => "exit",
        }
    }
}

impl fmt::Display for CrossingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown crossing type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown crossing type {0:?}; expected \"enter\" or \"exit\"")]
pub struct ParseCrossingTypeError(pub String);

impl FromStr for CrossingType {
    type Err = ParseCrossingTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "enter" => Ok(Self::Enter),
            "exit" => Ok(Self::Exit),
            _ => Err(ParseCrossingTypeError(s.to_owned())),
        }
    }
}

/// A detected crossing, built at detection time and serialised at once.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossingEvent {
    /// Stable per-install identifier of the device.
    pub device_descriptor: String,
    /// When the crossing was detected.
    pub detected_at: DateTime<FixedOffset>,
    /// Code of the crossed fence.
    pub fence_code: Option<String>,
    /// Name of the crossed fence.
    pub fence_name: Option<String>,
    /// Direction of the crossing.
    pub crossing_type: CrossingType,
    /// Version of the reporting SDK.
    pub sdk_version: String,
}

impl CrossingEvent {
    /// Build one event per fence, all sharing `detected_at`.
    ///
    /// # Examples
    /// ```
    /// use chrono::DateTime;
    /// use geofence_core::{CrossingEvent, CrossingType, GeofenceRecord};
    ///
    /// let at = DateTime::parse_from_rfc3339("2016-02-10T08:54:08.000+01:00").unwrap();
    /// let fences = [GeofenceRecord::new(Some("A".into()), "Home", 1.0, 2.0, 50.0)];
    /// let events = CrossingEvent::for_fences(&fences, CrossingType::Enter, "dev-1", "1.0.1", at);
    ///
    /// assert_eq!(events.len(), 1);
    /// assert_eq!(events[0].fence_code.as_deref(), Some("A"));
    /// ```
    pub fn for_fences(
        fences: &[GeofenceRecord],
        crossing_type: CrossingType,
        device_descriptor: &str,
        sdk_version: &str,
        detected_at: DateTime<FixedOffset>,
    ) -> Vec<Self> {
        fences
            .iter()
            .map(|fence| Self {
                device_descriptor: device_descriptor.to_owned(),
                detected_at,
                fence_code: fence.code.clone(),
                fence_name: fence.name.clone(),
                crossing_type,
                sdk_version: sdk_version.to_owned(),
            })
            .collect()
    }
}
