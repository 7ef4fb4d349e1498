//! `HandshakeToken` extractor: finds the credential a WebSocket client sent.
//!
//! Browsers cannot set headers on a WebSocket handshake, so the token may
//! arrive in the `token` query parameter, an `Authorization: Bearer`
//! header, or the `jwt` cookie set by the REST login flow. The first one
//! present wins, in that order.

use std::convert::Infallible;

use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::{Authorization, Cookie, HeaderMapExt};
use serde::Deserialize;

/// Name of the cookie carrying the credential.
const TOKEN_COOKIE: &str = "jwt";

#[derive(Debug, Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

/// The raw credential, if the client sent one. Not yet verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeToken(pub Option<String>);

impl HandshakeToken {
    fn from_parts(parts: &Parts) -> Option<String> {
        let from_query = Query::<TokenQuery>::try_from_uri(&parts.uri)
            .ok()
            .and_then(|Query(q)| q.token)
            .filter(|t| !t.trim().is_empty());

        from_query
            .or_else(|| {
                parts
                    .headers
                    .typed_get::<Authorization<Bearer>>()
                    .map(|auth| auth.token().to_string())
            })
            .or_else(|| {
                parts
                    .headers
                    .typed_get::<Cookie>()
                    .and_then(|cookie| cookie.get(TOKEN_COOKIE).map(str::to_string))
            })
            .filter(|t| !t.trim().is_empty())
    }
}

impl<S> FromRequestParts<S> for HandshakeToken
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(Self::from_parts(parts)))
    }
}
