use std::collections::HashSet;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use lambda_http::http::header::{AUTHORIZATION, WWW_AUTHENTICATE};
use lambda_http::http::HeaderMap;
use lambda_http::{Body, Error, Response};

use crate::config::Config;

pub const REALM: &str = "KV Manager";

/// Chat sender ids allowed to talk to the bot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowList(HashSet<String>);

impl AllowList {
    /// Comma-separated ids; blanks are dropped.
    pub fn parse(raw: &str) -> Self {
        Self(
            raw.split(',')
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn contains(&self, sender_id: &str) -> bool {
        self.0.contains(sender_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Decoded `Authorization: Basic ...` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    pub username: String,
    pub password: String,
}

impl BasicCredentials {
    /// Any malformed header yields `None`; the password is everything after
    /// the first `:`.
    pub fn parse(header: &str) -> Option<Self> {
        let (scheme, encoded) = header.trim().split_once(' ')?;
        if !scheme.eq_ignore_ascii_case("Basic") {
            return None;
        }
        let decoded = STANDARD.decode(encoded.trim()).ok()?;
        let decoded = String::from_utf8(decoded).ok()?;
        let (username, password) = decoded.split_once(':')?;
        Some(Self {
            username: username.to_string(),
            password: password.to_string(),
        })
    }
}

pub fn admin_authorized(headers: &HeaderMap, config: &Config) -> bool {
    let creds = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(BasicCredentials::parse);
    match creds {
        Some(c) => c.username == config.admin_user && c.password == config.admin_pass,
        None => false,
    }
}

pub fn unauthorized() -> Result<Response<Body>, Error> {
    Response::builder()
        .status(401)
        .header(WWW_AUTHENTICATE, format!("Basic realm=\"{REALM}\""))
        .body(Body::Text("Unauthorized".to_string()))
        .map_err(|e| Error::from(format!("resp: {e}")))
}
