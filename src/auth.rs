use std::net::{IpAddr, SocketAddr};

use axum::{
    extract::{connect_info::ConnectInfo, Request, State},
    http::{HeaderMap, Method},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use ipnet::IpNet;

use crate::{errors::AppError, AppState};

/// Bearer check for the MCP endpoint. Disabled when no API token is configured;
/// CORS preflight requests always pass.
pub async fn require_bearer_token(
    State(state): State<AppState>,
    auth_header: Option<TypedHeader<Authorization<Bearer>>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(expected) = state.api_token.as_deref() else {
        return Ok(next.run(request).await);
    };

    if request.method() == Method::OPTIONS {
        return Ok(next.run(request).await);
    }

    let Some(TypedHeader(auth)) = auth_header else {
        return Err(AppError::unauthorized(
            "missing_token",
            "missing authorization header",
        ));
    };

    if auth.token() != expected {
        return Err(AppError::unauthorized(
            "invalid_token",
            "invalid bearer token",
        ));
    }

    Ok(next.run(request).await)
}

pub async fn enforce_ip_allowlist(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(allowed_cidr) = state.allowed_cidr else {
        return Ok(next.run(request).await);
    };

    let client_ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(peer)| {
            resolve_client_ip(peer.ip(), request.headers(), &state.trusted_proxies)
        });

    match client_ip {
        Some(ip) if allowed_cidr.contains(&ip) => Ok(next.run(request).await),
        _ => Err(AppError::forbidden(
            "ip_not_allowed",
            "client address is not allowed",
        )),
    }
}

/// Walks `X-Forwarded-For` from the right while hops are trusted proxies.
/// The peer address wins unless it is itself a trusted proxy.
pub fn resolve_client_ip(peer: IpAddr, headers: &HeaderMap, trusted_proxies: &[IpNet]) -> IpAddr {
    let is_trusted = |ip: &IpAddr| trusted_proxies.iter().any(|net| net.contains(ip));

    if !is_trusted(&peer) {
        return peer;
    }

    let forwarded = headers
        .get_all("x-forwarded-for")
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter_map(|hop| hop.trim().parse::<IpAddr>().ok())
        .collect::<Vec<_>>();

    forwarded
        .iter()
        .rev()
        .find(|hop| !is_trusted(*hop))
        .or_else(|| forwarded.first())
        .copied()
        .unwrap_or(peer)
}
