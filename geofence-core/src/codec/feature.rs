//! GeoJSON feature mapping for geofence definitions.

use chrono::{DateTime, Utc};
use geo::Coord;
use log::{error, warn};
use serde::Deserialize;
use serde_json::{Map, Value, json};

use crate::{GeofenceError, GeofenceRecord, UNSPECIFIED_RADIUS};

/// Wire shape of one feature as served by the config connector.
///
/// `code` and the legacy `@code` key are both accepted; `code` wins when both
/// are present. Optional properties are read loosely: scalar codes, names and
/// descriptions become strings and a radius that is not a number becomes
/// [`UNSPECIFIED_RADIUS`].
#[derive(Debug, Deserialize)]
struct FeatureDto {
    properties: PropertiesDto,
    geometry: GeometryDto,
}

#[derive(Debug, Deserialize)]
struct PropertiesDto {
    #[serde(default)]
    code: Option<Value>,
    #[serde(default, rename = "@code")]
    legacy_code: Option<Value>,
    #[serde(default)]
    name: Option<Value>,
    #[serde(default)]
    description: Option<Value>,
    #[serde(default)]
    radius: Option<Value>,
}

fn scalar_text(value: Option<Value>) -> Option<String> {
    match value? {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn radius_or_unspecified(value: Option<Value>) -> f64 {
    let parsed = match &value {
        None | Some(Value::Null) => return UNSPECIFIED_RADIUS,
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => text.trim().parse::<f64>().ok(),
        Some(_) => None,
    };
    parsed.unwrap_or_else(|| {
        warn!("geofence radius {value:?} is not a number; treating it as unspecified");
        UNSPECIFIED_RADIUS
    })
}

#[derive(Debug, Deserialize)]
struct GeometryDto {
    coordinates: Vec<f64>,
}

impl TryFrom<FeatureDto> for GeofenceRecord {
    type Error = GeofenceError;

    fn try_from(feature: FeatureDto) -> Result<Self, Self::Error> {
        let FeatureDto {
            properties,
            geometry,
        } = feature;
        let [lng, lat] = match geometry.coordinates.as_slice() {
            [lng, lat, ..] => [*lng, *lat],
            other => {
                return Err(GeofenceError::malformed(format!(
                    "geometry.coordinates needs [longitude, latitude], found {} value(s)",
                    other.len()
                )));
            }
        };
        Ok(Self {
            code: scalar_text(properties.code).or_else(|| scalar_text(properties.legacy_code)),
            name: scalar_text(properties.name),
            description: scalar_text(properties.description),
            center: Coord { x: lng, y: lat },
            radius: radius_or_unspecified(properties.radius),
        })
    }
}

/// Decode a single GeoJSON feature into a [`GeofenceRecord`].
///
/// Missing `name`/`description` become `None` and a missing `radius` becomes
/// [`UNSPECIFIED_RADIUS`]. A feature without `properties`, `geometry` or
/// `geometry.coordinates` is rejected.
///
/// # Examples
/// ```
/// use geofence_core::codec::decode_geofence;
/// use serde_json::json;
///
/// let feature = json!({
///     "type": "Feature",
///     "geometry": {"type": "Point", "coordinates": [10.0, 20.0]},
///     "properties": {"@code": "A", "name": "Home", "radius": 50}
/// });
/// let record = decode_geofence(&feature)?;
/// assert_eq!(record.code.as_deref(), Some("A"));
/// assert_eq!(record.latitude(), 20.0);
/// # Ok::<(), geofence_core::GeofenceError>(())
/// ```
pub fn decode_geofence(feature: &Value) -> Result<GeofenceRecord, GeofenceError> {
    let dto = FeatureDto::deserialize(feature).map_err(|err| {
        error!("failed to decode geofence feature: {err}");
        GeofenceError::malformed(format!("invalid geofence feature: {err}"))
    })?;
    GeofenceRecord::try_from(dto).inspect_err(|err| error!("failed to decode geofence: {err}"))
}

/// Decode the `features` array of a feature collection, preserving order.
///
/// Any invalid feature fails the whole decode; no partial list is returned.
pub fn decode_geofences(collection: &Value) -> Result<Vec<GeofenceRecord>, GeofenceError> {
    let features = collection
        .get("features")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            error!("geofence collection has no features array");
            GeofenceError::malformed("missing features array")
        })?;
    features
        .iter()
        .enumerate()
        .map(|(index, feature)| {
            decode_geofence(feature).map_err(|err| match err {
                GeofenceError::MalformedPayload { reason } => GeofenceError::MalformedPayload {
                    reason: format!("feature {index}: {reason}"),
                },
                other => other,
            })
        })
        .collect()
}

/// Encode a record for registration. The server assigns the code, so none is
/// emitted.
///
/// # Examples
/// ```
/// use geofence_core::{GeofenceRecord, codec::encode_create};
///
/// let body = encode_create(&GeofenceRecord::draft("Home", 20.0, 10.0, 50.0));
/// assert_eq!(body["geometry"]["coordinates"][0], 10.0);
/// assert_eq!(body["properties"]["description"], "");
/// assert!(body["properties"].get("code").is_none());
/// ```
#[must_use]
pub fn encode_create(record: &GeofenceRecord) -> Value {
    feature_json(record, properties_json(record))
}

/// Encode a record for update, stamping who changed it and when.
#[must_use]
pub fn encode_update(record: &GeofenceRecord, acting_user: &str, at: DateTime<Utc>) -> Value {
    let mut properties = properties_json(record);
    properties.insert(
        "@updated".to_owned(),
        json!({
            "by": acting_user,
            "timestamp": at.timestamp_millis(),
        }),
    );
    feature_json(record, properties)
}

fn properties_json(record: &GeofenceRecord) -> Map<String, Value> {
    if !record.radius.is_finite() {
        warn!(
            "geofence {} has a non-finite radius; it is encoded as null",
            record.label()
        );
    }
    let mut properties = Map::new();
    if let Some(name) = &record.name {
        properties.insert("name".to_owned(), Value::from(name.as_str()));
    }
    properties.insert(
        "description".to_owned(),
        Value::from(record.description_or_empty()),
    );
    properties.insert("radius".to_owned(), Value::from(record.radius));
    properties
}

fn feature_json(record: &GeofenceRecord, properties: Map<String, Value>) -> Value {
    if !(record.longitude().is_finite() && record.latitude().is_finite()) {
        warn!(
            "geofence {} has non-finite coordinates; they are encoded as null",
            record.label()
        );
    }
    json!({
        "type": "Feature",
        "geometry": {
            "type": "Point",
            "coordinates": [record.longitude(), record.latitude()],
        },
        "properties": properties,
    })
}
