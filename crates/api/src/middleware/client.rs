//! Request metadata recorded on client submissions.

use std::convert::Infallible;
use std::net::IpAddr;

use axum::extract::FromRequestParts;
use axum::http::header::USER_AGENT;
use axum::http::request::Parts;
use mindak_core::reservation::{client_ip_from_forwarded, truncate_user_agent};

/// Client address and user agent, as far as the proxy chain tells us.
#[derive(Debug, Clone, Default)]
pub struct ClientContext {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
}

impl<S: Send + Sync> FromRequestParts<S> for ClientContext {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| parts.headers.get(name).and_then(|v| v.to_str().ok());

        let ip = header("x-forwarded-for")
            .and_then(client_ip_from_forwarded)
            .or_else(|| {
                header("x-real-ip")
                    .and_then(|v| v.trim().parse::<IpAddr>().ok())
                    .map(|ip| ip.to_string())
            });

        let user_agent = parts
            .headers
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.trim().is_empty())
            .map(truncate_user_agent);

        Ok(ClientContext { ip, user_agent })
    }
}
