use crate::{access::RequestContext, config::Config, error::AppError};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Header selecting the tenant partition for an authenticated request.
pub const TENANT_HEADER: &str = "x-tenant";

/// Authentication middleware
///
/// Validates the Bearer token against configured API keys and the X-Tenant
/// header against configured tenants, then attaches a RequestContext to the
/// request. Handlers never consult global state for identity.
pub async fn auth_middleware(
    State(config): State<Arc<arc_swap::ArcSwap<Config>>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Extract Authorization header
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".to_string()))?;

    let token = extract_bearer_token(auth_header)?;

    let tenant_header = req
        .headers()
        .get(TENANT_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .ok_or_else(|| AppError::Unauthorized("Missing X-Tenant header".to_string()))?;

    // Load current configuration
    let config = config.load();

    let api_key_config = config
        .api_keys
        .iter()
        .find(|k| k.key == token && k.enabled)
        .ok_or_else(|| AppError::Unauthorized("Invalid or disabled API key".to_string()))?;

    let tenant = config
        .tenants
        .iter()
        .find(|t| t.slug == tenant_header && t.enabled)
        .ok_or_else(|| AppError::Unauthorized("Unknown or disabled tenant".to_string()))?;

    req.extensions_mut().insert(RequestContext {
        actor: api_key_config.name.clone(),
        role: api_key_config.role,
        tenant: tenant.slug.clone(),
    });

    Ok(next.run(req).await)
}

/// Extract Bearer token from Authorization header
fn extract_bearer_token(auth_header: &str) -> Result<&str, AppError> {
    const BEARER_PREFIX: &str = "Bearer ";

    if !auth_header.starts_with(BEARER_PREFIX) {
        return Err(AppError::Unauthorized(
            "Authorization header must use Bearer scheme".to_string(),
        ));
    }

    let token = &auth_header[BEARER_PREFIX.len()..];

    if token.is_empty() {
        return Err(AppError::Unauthorized("Bearer token is empty".to_string()));
    }

    Ok(token)
}
