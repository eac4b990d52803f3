//! HTTP surface of the relay.
//!
//! ```text
//! POST    /room              {roomCode, encryptedBlob} -> 200 {success, roomCode}
//! GET     /room/{roomCode}                             -> 200 {encryptedBlob}
//! OPTIONS *                                            -> 200, CORS headers, no body
//! ```
//!
//! Errors are `{error}` bodies with status 400, 404, 429 or 500.

use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    body::Bytes,
    extract::{ConnectInfo, Path, State},
    http::{HeaderMap, Method, StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use cloakroom_core::Environment;
use cloakroom_proto::{CreateRoomRequest, CreateRoomResponse, ErrorResponse, GetRoomResponse, ROOM_PATH};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    exchange::{ExchangeError, RoomExchangeService},
    storage::RoomStore,
};

/// Header set by Cloudflare with the original client address.
pub const CF_CONNECTING_IP: &str = "cf-connecting-ip";

/// Standard proxy header; the first entry is the original client.
pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Client address used when nothing identifies the caller.
pub const UNKNOWN_CLIENT: &str = "unknown";

type SharedService<E, S> = Arc<RoomExchangeService<E, S>>;

/// Build the relay router around `service`.
///
/// Serve with `into_make_service_with_connect_info::<SocketAddr>()` so the
/// peer address can stand in when no proxy header is present.
pub fn router<E, S>(service: SharedService<E, S>) -> Router
where
    E: Environment,
    S: RoomStore<E::Instant>,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .route(ROOM_PATH, post(create_room::<E, S>))
        .route("/room/", get(missing_code))
        .route("/room/:room_code", get(get_room::<E, S>))
        .fallback(not_found)
        .with_state(service)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

async fn create_room<E, S>(State(service): State<SharedService<E, S>>, body: Bytes) -> Response
where
    E: Environment,
    S: RoomStore<E::Instant>,
{
    let Ok(request) = serde_json::from_slice::<CreateRoomRequest>(&body) else {
        return ExchangeError::InvalidRequest("Invalid request".into()).into_response();
    };

    match service.create(&request.room_code, &request.encrypted_blob) {
        Ok(code) => {
            Json(CreateRoomResponse { success: true, room_code: code.to_string() }).into_response()
        },
        Err(e) => e.into_response(),
    }
}

async fn get_room<E, S>(
    State(service): State<SharedService<E, S>>,
    Path(room_code): Path<String>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
) -> Response
where
    E: Environment,
    S: RoomStore<E::Instant>,
{
    let client = client_address(&headers, peer.map(|ConnectInfo(addr)| addr));

    match service.get(&client, &room_code) {
        Ok(blob) => Json(GetRoomResponse { encrypted_blob: blob }).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn missing_code() -> Response {
    ExchangeError::InvalidRequest("Invalid room code".into()).into_response()
}

async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(ErrorResponse::new("Not found"))).into_response()
}

/// Identify the caller for rate limiting.
///
/// Prefers `CF-Connecting-IP`, then the first `X-Forwarded-For` entry, then
/// the socket peer, then [`UNKNOWN_CLIENT`].
pub fn client_address(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let header = |name: &str| {
        headers.get(name).and_then(|v| v.to_str().ok()).map(str::trim).filter(|v| !v.is_empty())
    };

    if let Some(ip) = header(CF_CONNECTING_IP) {
        return ip.to_string();
    }

    if let Some(first) = header(X_FORWARDED_FOR)
        .and_then(|list| list.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
    {
        return first.to_string();
    }

    peer.map_or_else(|| UNKNOWN_CLIENT.to_string(), |addr| addr.ip().to_string())
}

impl ExchangeError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ExchangeError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::Storage(e) => {
                tracing::error!(error = %e, "storage failure");
                "Internal server error".to_string()
            },
            other => other.to_string(),
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    fn peer() -> Option<SocketAddr> {
        Some("10.0.0.9:5555".parse().unwrap())
    }

    #[test]
    fn cloudflare_header_wins() {
        let h = headers(&[(CF_CONNECTING_IP, "1.1.1.1"), (X_FORWARDED_FOR, "2.2.2.2")]);
        assert_eq!(client_address(&h, peer()), "1.1.1.1");
    }

    #[test]
    fn first_forwarded_entry() {
        let h = headers(&[(X_FORWARDED_FOR, " 2.2.2.2 , 3.3.3.3")]);
        assert_eq!(client_address(&h, peer()), "2.2.2.2");
    }

    #[test]
    fn falls_back_to_peer_then_unknown() {
        assert_eq!(client_address(&HeaderMap::new(), peer()), "10.0.0.9");
        assert_eq!(client_address(&HeaderMap::new(), None), UNKNOWN_CLIENT);
    }

    #[test]
    fn blank_headers_ignored() {
        let h = headers(&[(CF_CONNECTING_IP, ""), (X_FORWARDED_FOR, " ,4.4.4.4")]);
        assert_eq!(client_address(&h, None), UNKNOWN_CLIENT);
    }

    #[test]
    fn error_statuses() {
        assert_eq!(ExchangeError::InvalidRequest(String::new()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ExchangeError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ExchangeError::RateLimited.status(), StatusCode::TOO_MANY_REQUESTS);
    }
}
