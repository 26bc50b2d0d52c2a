use alloy::primitives::{Address, U256};
use axum::{
    Json, Router,
    extract::{Path, Request, State},
    http::{HeaderValue, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
};
use launchpad_sdk::{
    abi::{AccessRegistry, BondingCurve},
    error::LaunchpadError,
    num,
    state::TokenRecord,
};
use serde_json::{Value, json};

use crate::AppState;

pub(crate) fn router(state: AppState) -> Router {
    Router::new()
        .route("/tokens", get(tokens))
        .route("/fees/{token}", get(fees))
        .route("/graduated-tokens/{tokenAddress}", get(graduated_token))
        .route("/users/{address}", get(user))
        .route("/users/canCreateToken/{address}", get(user_can_create))
        .layer(middleware::from_fn(cors))
        .with_state(state)
}

async fn cors(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(header::ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static("GET, OPTIONS"));
    headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("*"));
    response
}

async fn tokens(State(app): State<AppState>) -> Response {
    match app.catalog.refresh().await {
        Ok(snapshot) => {
            let tokens: Vec<Value> = snapshot.tokens().iter().map(token_json).collect();
            Json(json!({
                "success": true,
                "count": tokens.len(),
                "tokens": tokens,
            }))
            .into_response()
        },
        Err(err) => internal_error("assembling the token catalog", err),
    }
}

async fn fees(State(app): State<AppState>, Path(token): Path<String>) -> Response {
    let Some(token) = parse_address(&token) else {
        return bad_request();
    };

    // Unreachable contract data degrades to zeroed fields, not a 5xx
    let curve = BondingCurve::new(app.chain.curve(), &app.provider);
    let total = curve.totalFeesOf(token).call().await.unwrap_or(U256::ZERO);
    let pending = curve.pendingFeesOf(token).call().await.unwrap_or(U256::ZERO);

    Json(json!({
        "success": true,
        "token": token.to_string(),
        "totalFees": num::plain_string(app.converter.from_unsigned(total)),
        "pendingFees": num::plain_string(app.converter.from_unsigned(pending)),
    }))
    .into_response()
}

async fn graduated_token(State(app): State<AppState>, Path(token): Path<String>) -> Response {
    let Some(token) = parse_address(&token) else {
        return bad_request();
    };

    // A failed curve read degrades to the registry signal alone
    let curve = app.catalog.pricer().curve_state(token).await.ok().flatten();
    let status = app.catalog.tracker().status(token, curve.as_ref()).await;
    if !status.is_graduated() {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"success": false, "error": "token is not graduated"})),
        )
            .into_response();
    }

    match app.catalog.enrich(token).await {
        Ok(record) => {
            Json(json!({"success": true, "token": token_json(&record)})).into_response()
        },
        Err(err) => internal_error("enriching graduated token", err),
    }
}

async fn user(State(app): State<AppState>, Path(address): Path<String>) -> Response {
    let Some(address) = parse_address(&address) else {
        return bad_request();
    };

    // Each flag individually defaults to false on a failed read
    let registry = AccessRegistry::new(app.chain.access_registry(), &app.provider);
    let is_allowed = registry.isAllowed(address).call().await.unwrap_or(false);
    let can_create_token = registry.canCreateToken(address).call().await.unwrap_or(false);

    Json(json!({
        "success": true,
        "address": address.to_string(),
        "isAllowed": is_allowed,
        "canCreateToken": can_create_token,
    }))
    .into_response()
}

async fn user_can_create(State(app): State<AppState>, Path(address): Path<String>) -> Response {
    let Some(address) = parse_address(&address) else {
        return bad_request();
    };

    let registry = AccessRegistry::new(app.chain.access_registry(), &app.provider);
    let can_create_token = registry.canCreateToken(address).call().await.unwrap_or(false);

    Json(json!({"success": true, "canCreateToken": can_create_token})).into_response()
}

/// Strict hex-address predicate for path parameters.
fn parse_address(raw: &str) -> Option<Address> {
    if raw.len() != 42 || !raw.starts_with("0x") || !raw[2..].chars().all(|c| c.is_ascii_hexdigit())
    {
        return None;
    }
    raw.parse().ok()
}

fn token_json(record: &TokenRecord) -> Value {
    let graduation = record.graduation();
    json!({
        "address": record.address().to_string(),
        "name": record.name(),
        "symbol": record.symbol(),
        "imageUri": record.image_uri(),
        "description": record.description(),
        "profile": record.profile().map(|profile| json!({
            "website": profile.website,
            "twitter": profile.twitter,
            "telegram": profile.telegram,
        })),
        "creator": record.creator().to_string(),
        "createdAt": record.created_at().timestamp(),
        "totalSupply": num::plain_string(record.total_supply()),
        "active": record.active(),
        "price": record.price().to_plain_string(),
        "graduation": {
            "canGraduate": graduation.can_graduate(),
            "progressPercent": graduation.progress_percent(),
            "isGraduated": graduation.is_graduated(),
        },
        "curve": record.curve().map(|curve| json!({
            "soldSupply": num::plain_string(curve.sold_supply()),
            "reservesIn": num::plain_string(curve.reserves_in()),
            "virtualReserveQuote": num::plain_string(curve.virtual_reserve_quote()),
            "virtualReserveToken": num::plain_string(curve.virtual_reserve_token()),
            "graduated": curve.graduated(),
            "active": curve.active(),
        })),
    })
}

fn bad_request() -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({"success": false, "error": "invalid address"})))
        .into_response()
}

fn internal_error(context: &str, err: LaunchpadError) -> Response {
    tracing::error!(%err, context, "request failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "success": false,
            "error": "internal error",
            "message": err.to_string(),
        })),
    )
        .into_response()
}
