//! The geofence entity shared by the store, codec and reconciler.

use geo::Coord;
use serde::{Deserialize, Serialize};

/// Radius value meaning "no radius was supplied".
pub const UNSPECIFIED_RADIUS: f64 = -1.0;

/// A circular fence identified by a server-assigned code.
///
/// The centre uses WGS84 with `x = longitude` and `y = latitude`. A record
/// whose `code` is `None` has not been registered yet and never matches any
/// other record.
///
/// # Examples
/// ```
/// use geofence_core::GeofenceRecord;
///
/// let home = GeofenceRecord::new(Some("A".into()), "Home", 20.0, 10.0, 50.0);
///
/// assert_eq!(home.latitude(), 20.0);
/// assert_eq!(home.longitude(), 10.0);
/// assert!(home.is_same_fence(&home.clone()));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeofenceRecord {
    /// Server-assigned identifier, absent until registration succeeds.
    pub code: Option<String>,
    /// Display name.
    pub name: Option<String>,
    /// Free-form description.
    pub description: Option<String>,
    /// Centre of the fence.
    pub center: Coord<f64>,
    /// Radius in metres, or [`UNSPECIFIED_RADIUS`].
    pub radius: f64,
}

impl GeofenceRecord {
    /// Construct a record with an empty description.
    #[must_use]
    pub fn new(
        code: Option<String>,
        name: impl Into<String>,
        latitude: f64,
        longitude: f64,
        radius: f64,
    ) -> Self {
        Self {
            code,
            name: Some(name.into()),
            description: None,
            center: Coord {
                x: longitude,
                y: latitude,
            },
            radius,
        }
    }

    /// Construct an unregistered record awaiting a server code.
    ///
    /// # Examples
    /// ```
    /// use geofence_core::GeofenceRecord;
    ///
    /// let draft = GeofenceRecord::draft("Office", 51.5, -0.1, 100.0);
    /// assert!(draft.code.is_none());
    /// ```
    #[must_use]
    pub fn draft(name: impl Into<String>, latitude: f64, longitude: f64, radius: f64) -> Self {
        Self::new(None, name, latitude, longitude, radius)
    }

    /// Attach a description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Replace the code, typically with the one assigned by the server.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Latitude of the centre in degrees.
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.center.y
    }

    /// Longitude of the centre in degrees.
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.center.x
    }

    /// Whether a radius was supplied.
    #[must_use]
    pub fn has_radius(&self) -> bool {
        self.radius >= 0.0
    }

    /// Description, or the empty string when none was supplied.
    #[must_use]
    pub fn description_or_empty(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }

    /// Two records are the same fence iff both codes are present and equal.
    #[must_use]
    pub fn is_same_fence(&self, other: &Self) -> bool {
        matches!((&self.code, &other.code), (Some(a), Some(b)) if a == b)
    }

    /// Overwrite the mutable fields with those of `source`, keeping `self.code`.
    pub fn apply_update(&mut self, source: &Self) {
        self.name.clone_from(&source.name);
        self.description.clone_from(&source.description);
        self.center = source.center;
        self.radius = source.radius;
    }

    /// Whether the centre lies within the WGS84 latitude/longitude ranges.
    #[must_use]
    pub fn has_valid_center(&self) -> bool {
        let Coord { x: lng, y: lat } = self.center;
        lat.is_finite()
            && lng.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lng)
    }

    pub(crate) fn label(&self) -> String {
        self.code
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or("<unnamed>")
            .to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn records_without_code_never_match() {
        let a = GeofenceRecord::draft("Home", 0.0, 0.0, 10.0);
        let b = a.clone();
        assert!(!a.is_same_fence(&b));
    }

    #[rstest]
    #[case(Some("A"), Some("A"), true)]
    #[case(Some("A"), Some("B"), false)]
    #[case(Some("A"), None, false)]
    #[case(None, Some("A"), false)]
    fn identity_requires_equal_codes(
        #[case] left: Option<&str>,
        #[case] right: Option<&str>,
        #[case] expected: bool,
    ) {
        let a = GeofenceRecord::new(left.map(str::to_owned), "x", 0.0, 0.0, 1.0);
        let b = GeofenceRecord::new(right.map(str::to_owned), "y", 1.0, 1.0, 2.0);
        assert_eq!(a.is_same_fence(&b), expected);
    }

    #[rstest]
    fn apply_update_keeps_code() {
        let mut local = GeofenceRecord::new(Some("A".into()), "Old", 1.0, 2.0, 10.0);
        let remote = GeofenceRecord::new(Some("Z".into()), "New", 3.0, 4.0, 50.0)
            .with_description("moved");
        local.apply_update(&remote);
        assert_eq!(local.code.as_deref(), Some("A"));
        assert_eq!(local.name.as_deref(), Some("New"));
        assert_eq!(local.description.as_deref(), Some("moved"));
        assert_eq!(local.latitude(), 3.0);
        assert_eq!(local.longitude(), 4.0);
        assert_eq!(local.radius, 50.0);
    }

    #[rstest]
    #[case(90.0, 180.0, true)]
    #[case(-90.0, -180.0, true)]
    #[case(90.5, 0.0, false)]
    #[case(0.0, -180.5, false)]
    #[case(f64::NAN, 0.0, false)]
    fn validates_center_ranges(#[case] lat: f64, #[case] lng: f64, #[case] expected: bool) {
        let record = GeofenceRecord::draft("x", lat, lng, 1.0);
        assert_eq!(record.has_valid_center(), expected);
    }

    #[rstest]
    fn missing_description_reads_as_empty() {
        let record = GeofenceRecord::draft("x", 0.0, 0.0, 1.0);
        assert_eq!(record.description_or_empty(), "");
        assert!(record.has_radius());
        assert!(!GeofenceRecord::draft("x", 0.0, 0.0, UNSPECIFIED_RADIUS).has_radius());
    }
}
