//! The seam between composed requests and the network.

mod http;

use std::future::Future;

use crate::error::TransportError;
use crate::request::RequestDescriptor;
use crate::response::RawResponse;

pub use http::{HttpTransport, HttpTransportBuilder};

/// Delivers a composed request and returns the raw response.
///
/// Implementations surface failures unchanged; there is no retry at this
/// layer. Timeouts and cancellation belong to the implementation.
pub trait Transport: Send + Sync + 'static {
    fn send(
        &self,
        request: RequestDescriptor,
    ) -> impl Future<Output = Result<RawResponse, TransportError>> + Send;
}
