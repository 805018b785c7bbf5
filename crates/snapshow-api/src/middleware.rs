use axum::{
    extract::Request,
    http::{StatusCode, header},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, Validation, decode};

use snapshow_types::api::Claims;

pub fn jwt_secret() -> String {
    std::env::var("SNAPSHOW_JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".into())
}

fn claims_from_request(req: &Request) -> Option<Claims> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())?;
    let token = auth_header.strip_prefix("Bearer ")?;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_secret().as_bytes()),
        &Validation::default(),
    )
    .ok()
    .map(|data| data.claims)
}

/// Extract and validate JWT from Authorization header.
pub async fn require_auth(mut req: Request, next: Next) -> Result<Response, StatusCode> {
    let claims = claims_from_request(&req).ok_or(StatusCode::UNAUTHORIZED)?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Public routes whose behavior changes when signed in (visibility,
/// permission flags) get `Option<Claims>`; a missing or invalid token
/// just means anonymous.
pub async fn optional_auth(mut req: Request, next: Next) -> Response {
    let claims = claims_from_request(&req);
    req.extensions_mut().insert(claims);
    next.run(req).await
}
