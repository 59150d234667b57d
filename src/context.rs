use std::net::{IpAddr, SocketAddr};

use async_trait::async_trait;
use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::error::HandlerError;

/// Host reported when the request carries neither a `Host` header nor an absolute URI.
const FALLBACK_HOST: &str = "127.0.0.1";

/// Per-request view of who is calling and which host name they used to reach us.
#[derive(Clone, Debug)]
pub struct RequestContext {
    host: String,
    remote_addr: SocketAddr,
}

impl RequestContext {
    pub fn new(host: impl Into<String>, remote_addr: SocketAddr) -> Self {
        Self {
            host: host.into(),
            remote_addr,
        }
    }

    /// The `Host` the client addressed, as seen by the server.
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn remote_addr(&self) -> SocketAddr {
        self.remote_addr
    }

    /// Peer IP address without the ephemeral port.
    pub fn remote_ip(&self) -> IpAddr {
        self.remote_addr.ip()
    }

    /// Emits the per-request access line.
    pub fn log_invocation(&self, route: &str) {
        tracing::info!(
            route,
            host = %self.host,
            from = %self.remote_ip(),
            "{route} serving from {} has been invoked from {}",
            self.host,
            self.remote_ip()
        );
    }

    fn from_parts(parts: &Parts) -> Result<Self, RequestContextRejection> {
        let ConnectInfo(remote_addr) = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .copied()
            .ok_or(RequestContextRejection::MissingPeerAddress)?;

        let host = parts
            .headers
            .get(axum::http::header::HOST)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_owned())
            .or_else(|| parts.uri.authority().map(|authority| authority.to_string()))
            .unwrap_or_else(|| FALLBACK_HOST.to_owned());

        Ok(Self { host, remote_addr })
    }
}

/// Errors emitted when a handler asks for [`RequestContext`] but the connection metadata is missing.
#[derive(Debug, Error)]
pub enum RequestContextRejection {
    #[error("peer address missing from request extensions")]
    MissingPeerAddress,
}

impl IntoResponse for RequestContextRejection {
    fn into_response(self) -> Response {
        HandlerError::from(self).into_response()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = RequestContextRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::from_parts(parts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_for(request: Request<()>) -> Parts {
        request.into_parts().0
    }

    #[test]
    fn reads_host_header_and_peer() {
        let peer: SocketAddr = "203.0.113.7:50123".parse().unwrap();
        let mut request = Request::builder()
            .uri("/info")
            .header("host", "svc.example:8080")
            .body(())
            .unwrap();
        request.extensions_mut().insert(ConnectInfo(peer));

        let context = RequestContext::from_parts(&parts_for(request)).unwrap();
        assert_eq!(context.host(), "svc.example:8080");
        assert_eq!(context.remote_addr(), peer);
        assert_eq!(context.remote_ip().to_string(), "203.0.113.7");
    }

    #[test]
    fn falls_back_to_uri_authority_then_loopback() {
        let peer: SocketAddr = "10.1.2.3:4000".parse().unwrap();

        let mut absolute = Request::builder()
            .uri("http://proxy.internal/info")
            .body(())
            .unwrap();
        absolute.extensions_mut().insert(ConnectInfo(peer));
        let context = RequestContext::from_parts(&parts_for(absolute)).unwrap();
        assert_eq!(context.host(), "proxy.internal");

        let mut bare = Request::builder().uri("/info").body(()).unwrap();
        bare.extensions_mut().insert(ConnectInfo(peer));
        let context = RequestContext::from_parts(&parts_for(bare)).unwrap();
        assert_eq!(context.host(), FALLBACK_HOST);
    }

    #[test]
    fn missing_peer_is_rejected() {
        let request = Request::builder().uri("/info").body(()).unwrap();
        assert!(matches!(
            RequestContext::from_parts(&parts_for(request)),
            Err(RequestContextRejection::MissingPeerAddress)
        ));
    }
}
