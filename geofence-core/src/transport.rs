//! Transport seam between request builders and the network.

use crate::{ApiRequest, ApiResponse, TransportError};

/// Execute [`ApiRequest`]s against the config connector.
///
/// Implementations resolve `request.path` against their base URL, attach
/// credentials, and map every non-success outcome to a [`TransportError`].
/// Callers never retry; an error is surfaced to the user exactly once.
///
/// # Examples
///
/// ```rust
/// use geofence_core::{ApiRequest, ApiResponse, Transport, TransportError, build_list_request};
///
/// struct EmptyServer;
///
/// impl Transport for EmptyServer {
///     fn execute(&self, _request: &ApiRequest) -> Result<ApiResponse, TransportError> {
///         Ok(ApiResponse::new(200, r#"{"type":"FeatureCollection","features":[]}"#))
///     }
/// }
///
/// let response = EmptyServer.execute(&build_list_request())?;
/// assert_eq!(response.status, 200);
/// # Ok::<(), TransportError>(())
/// ```
pub trait Transport: Send + Sync {
    /// Perform `request` and return the successful response.
    fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        (**self).execute(request)
    }
}

impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        (**self).execute(request)
    }
}
