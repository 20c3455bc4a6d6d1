//! Bidirectional mapping between [`GeofenceRecord`](crate::GeofenceRecord)
//! values and the GeoJSON payloads exchanged with the config connector.
//!
//! Decoding is strict about structure: a feature missing `properties`,
//! `geometry` or `geometry.coordinates` is a
//! [`MalformedPayload`](crate::GeofenceError::MalformedPayload) error and no
//! partial result is returned. Encoding never fails; values JSON cannot
//! represent are logged and emitted as `null`.

mod crossing;
mod feature;

pub use crossing::{DETECTED_TIME_FORMAT, encode_crossing_batch, format_detected_time};
pub use feature::{decode_geofence, decode_geofences, encode_create, encode_update};
