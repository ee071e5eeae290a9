use std::time::Duration;

use axum::{
    Router,
    http::{
        HeaderName, HeaderValue, Method,
        header::{
            ACCEPT, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_MAX_AGE, AUTHORIZATION, CONTENT_TYPE, ORIGIN,
        },
    },
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;

/// Six hours, as long as browsers are willing to cache a preflight.
pub const MAX_AGE_SECS: u64 = 21600;

const ALLOWED_METHODS: [Method; 4] = [Method::GET, Method::POST, Method::DELETE, Method::OPTIONS];
const ALLOWED_METHODS_VALUE: &str = "GET,POST,DELETE,OPTIONS";

const ALLOWED_HEADERS: [HeaderName; 5] = [
    ORIGIN,
    HeaderName::from_static("x-requested-with"),
    CONTENT_TYPE,
    ACCEPT,
    AUTHORIZATION,
];
const ALLOWED_HEADERS_VALUE: &str = "origin,x-requested-with,content-type,accept,authorization";

/// Credentialed CORS for any origin. The request origin is mirrored back
/// because browsers refuse `*` together with credentials. Every OPTIONS
/// request is answered here, before routing and gating.
pub fn layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_credentials(true)
        .allow_methods(ALLOWED_METHODS)
        .allow_headers(ALLOWED_HEADERS)
        .max_age(Duration::from_secs(MAX_AGE_SECS))
}

/// Wrap a router so every response, not just preflights, advertises the
/// allowed methods, headers and max age.
pub fn apply(router: Router) -> Router {
    router
        .layer(SetResponseHeaderLayer::if_not_present(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS_VALUE),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOWED_HEADERS_VALUE),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            ACCESS_CONTROL_MAX_AGE,
            HeaderValue::from(MAX_AGE_SECS),
        ))
        .layer(layer())
}
