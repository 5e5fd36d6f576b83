//! External request ingress type.

use crate::{Body, ServiceId, TxId};
use serde::{Deserialize, Serialize};

/// An external request submitted to the gateway.
///
/// The gateway assigns a fresh transaction id on ingress when none is
/// supplied and turns the request into a properly initialized event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Pre-assigned transaction id; usually absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub txid: Option<TxId>,
    /// Target service for the first forward hop.
    pub service: ServiceId,
    /// Target endpoint within that service.
    pub endpoint: String,
    /// Handler-specific payload.
    #[serde(default)]
    pub body: Body,
}

impl Request {
    /// Create a request targeting a service endpoint.
    pub fn new(service: ServiceId, endpoint: impl Into<String>) -> Self {
        Self {
            txid: None,
            service,
            endpoint: endpoint.into(),
            body: Body::new(),
        }
    }

    /// Attach a payload field.
    pub fn with_field(
        mut self,
        key: impl Into<String>,
        value: impl Into<crate::BodyValue>,
    ) -> Self {
        self.body.set(key, value);
        self
    }
}
