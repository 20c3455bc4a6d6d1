//! Crossing-event batch payloads.

use chrono::{DateTime, FixedOffset};
use log::warn;
use serde_json::{Value, json};

use crate::CrossingEvent;

/// `strftime` pattern for `detectedTime`: milliseconds plus a `±hhmm` offset.
pub const DETECTED_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%z";

/// Render a detection timestamp, e.g. `2016-02-10T08:54:08.000+0100`.
///
/// # Examples
/// ```
/// use chrono::DateTime;
/// use geofence_core::codec::format_detected_time;
///
/// let at = DateTime::parse_from_rfc3339("2016-02-10T08:54:08.5+01:00").unwrap();
/// assert_eq!(format_detected_time(&at), "2016-02-10T08:54:08.500+0100");
/// ```
#[must_use]
pub fn format_detected_time(at: &DateTime<FixedOffset>) -> String {
    at.format(DETECTED_TIME_FORMAT).to_string()
}

/// Encode `{sdkVersion, notifications: [...]}` for a batch of crossings.
///
/// Batches built with [`CrossingEvent::for_fences`] share one detection time.
/// Events without a fence code are still encoded, with a null code.
#[must_use]
pub fn encode_crossing_batch(events: &[CrossingEvent], sdk_version: &str) -> Value {
    let notifications: Vec<Value> = events.iter().map(notification_json).collect();
    json!({
        "sdkVersion": sdk_version,
        "notifications": notifications,
    })
}

fn notification_json(event: &CrossingEvent) -> Value {
    if event.fence_code.is_none() {
        warn!(
            "crossing event for {:?} has no fence code",
            event.fence_name.as_deref().unwrap_or("<unnamed>")
        );
    }
    json!({
        "descriptor": event.device_descriptor,
        "detectedTime": format_detected_time(&event.detected_at),
        "data": {
            "geofenceCode": event.fence_code,
            "geofenceName": event.fence_name,
            "crossingType": event.crossing_type.as_str(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CrossingType, GeofenceRecord};
    use rstest::{fixture, rstest};

    #[fixture]
    fn detected_at() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2016-02-10T08:54:08.123+01:00").expect("valid timestamp")
    }

    #[rstest]
    fn batch_matches_wire_shape(detected_at: DateTime<FixedOffset>) {
        let fences = [
            GeofenceRecord::new(Some("A".into()), "Home", 1.0, 2.0, 10.0),
            GeofenceRecord::new(Some("B".into()), "Work", 3.0, 4.0, 20.0),
        ];
        let events =
            CrossingEvent::for_fences(&fences, CrossingType::Exit, "dev-1", "1.0.1", detected_at);

        let body = encode_crossing_batch(&events, "1.0.1");

        assert_eq!(
            body,
            json!({
                "sdkVersion": "1.0.1",
                "notifications": [
                    {
                        "descriptor": "dev-1",
                        "detectedTime": "2016-02-10T08:54:08.123+0100",
                        "data": {"geofenceCode": "A", "geofenceName": "Home", "crossingType": "exit"}
                    },
                    {
                        "descriptor": "dev-1",
                        "detectedTime": "2016-02-10T08:54:08.123+0100",
                        "data": {"geofenceCode": "B", "geofenceName": "Work", "crossingType": "exit"}
                    }
                ]
            })
        );
    }

    #[rstest]
    fn empty_batch_has_no_notifications() {
        let body = encode_crossing_batch(&[], "");
        assert_eq!(body, json!({"sdkVersion": "", "notifications": []}));
    }

    #[rstest]
    fn unregistered_fence_encodes_null_code(detected_at: DateTime<FixedOffset>) {
        let fences = [GeofenceRecord::draft("Draft", 0.0, 0.0, 5.0)];
        let events =
            CrossingEvent::for_fences(&fences, CrossingType::Enter, "dev-1", "1.0.1", detected_at);
        let body = encode_crossing_batch(&events, "1.0.1");
        assert_eq!(
            body["notifications"][0]["data"]["geofenceCode"],
            Value::Null
        );
    }
}
