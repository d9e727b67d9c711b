//! Per-request snapshot handed to the gate.
//!
//! # Responsibilities
//! - Resolve the client address by header precedence
//! - Normalise query-string and body inputs into one ordered parameter map
//!
//! # Design Decisions
//! - Query parameters are merged first, body parameters second; on a name
//!   collision the later source wins and the entry keeps its first position
//! - Form keys ending in `[]` collect into lists; other repeated keys keep
//!   the last value
//! - JSON bodies keep their structure; numbers and booleans become text,
//!   nulls are dropped

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use axum::http::HeaderMap;
use serde_json::Value;

/// Address used when nothing better is known about the client.
pub const FALLBACK_CLIENT_ADDRESS: &str = "127.0.0.1";

/// One input value, possibly structured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Text(String),
    List(Vec<ParamValue>),
    Map(Vec<(String, ParamValue)>),
}

impl ParamValue {
    pub fn text(value: impl Into<String>) -> Self {
        ParamValue::Text(value.into())
    }

    /// Convert a JSON value. Returns `None` for `null`.
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(b) => Some(ParamValue::Text(b.to_string())),
            Value::Number(n) => Some(ParamValue::Text(n.to_string())),
            Value::String(s) => Some(ParamValue::Text(s)),
            Value::Array(items) => Some(ParamValue::List(
                items.into_iter().filter_map(ParamValue::from_json).collect(),
            )),
            Value::Object(map) => Some(ParamValue::Map(
                map.into_iter()
                    .filter_map(|(k, v)| ParamValue::from_json(v).map(|v| (k, v)))
                    .collect(),
            )),
        }
    }
}

/// Ordered name → value mapping with deterministic collision handling.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters {
    entries: Vec<(String, ParamValue)>,
    /// Name to position in `entries`.
    index: HashMap<String, usize>,
}

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace. A replaced entry keeps its original position.
    pub fn insert(&mut self, name: impl Into<String>, value: ParamValue) {
        let name = name.into();
        match self.index.get(&name) {
            Some(&pos) => self.entries[pos].1 = value,
            None => {
                self.index.insert(name.clone(), self.entries.len());
                self.entries.push((name, value));
            }
        }
    }

    /// Merge `later` into `self`; `later` wins on collisions.
    pub fn merge(&mut self, later: Parameters) {
        for (name, value) in later.entries {
            self.insert(name, value);
        }
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.index.get(name).map(|&pos| &self.entries[pos].1)
    }

    fn get_mut(&mut self, name: &str) -> Option<&mut ParamValue> {
        self.index.get(name).map(|&pos| &mut self.entries[pos].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse `application/x-www-form-urlencoded` text (also used for query strings).
    pub fn from_urlencoded(input: &str) -> Self {
        let mut params = Parameters::new();
        for (key, value) in url::form_urlencoded::parse(input.as_bytes()) {
            match key.strip_suffix("[]") {
                Some(list_key) => match params.get_mut(list_key) {
                    Some(ParamValue::List(items)) => items.push(ParamValue::text(value)),
                    _ => params.insert(list_key, ParamValue::List(vec![ParamValue::text(value)])),
                },
                None => params.insert(key, ParamValue::text(value)),
            }
        }
        params
    }

    /// Top-level entries of a JSON object body. Non-object bodies are kept
    /// whole under the name `body` so they are still inspected.
    pub fn from_json(value: Value) -> Self {
        let mut params = Parameters::new();
        match value {
            Value::Object(map) => {
                for (key, value) in map {
                    if let Some(value) = ParamValue::from_json(value) {
                        params.insert(key, value);
                    }
                }
            }
            other => {
                if let Some(value) = ParamValue::from_json(other) {
                    params.insert("body", value);
                }
            }
        }
        params
    }
}

impl FromIterator<(String, ParamValue)> for Parameters {
    fn from_iter<I: IntoIterator<Item = (String, ParamValue)>>(iter: I) -> Self {
        let mut params = Parameters::new();
        for (name, value) in iter {
            params.insert(name, value);
        }
        params
    }
}

/// Immutable snapshot of one inbound request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub client_address: String,
    /// Path plus query string, as requested.
    pub path: String,
    pub method: String,
    pub user_agent: String,
    pub parameters: Parameters,
}

impl RequestContext {
    /// Minimal context, mainly for callers outside an HTTP stack.
    pub fn new(client_address: impl Into<String>, method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            client_address: client_address.into(),
            path: path.into(),
            method: method.into(),
            user_agent: String::new(),
            parameters: Parameters::new(),
        }
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(name, ParamValue::text(value));
        self
    }

    pub fn with_parameters(mut self, parameters: Parameters) -> Self {
        self.parameters = parameters;
        self
    }
}

/// Resolve the client address.
///
/// Precedence: first entry of `X-Forwarded-For`, then `X-Real-IP`, then the
/// peer address, then [`FALLBACK_CLIENT_ADDRESS`].
pub fn client_address(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    if let Some(first) = header("x-forwarded-for")
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
    {
        return first.to_string();
    }

    if let Some(real_ip) = header("x-real-ip") {
        return real_ip.to_string();
    }

    peer.map(|addr| addr.ip())
        .map(|ip: IpAddr| ip.to_string())
        .unwrap_or_else(|| FALLBACK_CLIENT_ADDRESS.to_string())
}
