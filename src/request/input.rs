//! Request input with origin-restricted views.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::routing::ParamsMap;

/// Where a bound parameter may be read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// POST input only.
    Post,
    /// GET input only.
    Get,
    /// Combined input (GET overlaid by POST).
    Request,
}

impl Origin {
    pub fn access_type(self) -> AccessType {
        match self {
            Origin::Post => AccessType::Post,
            Origin::Get => AccessType::Get,
            Origin::Request => AccessType::Request,
        }
    }
}

/// Which origin supplied the resolved request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessType {
    Post,
    Get,
    Request,
    Uri,
    #[default]
    None,
}

impl AccessType {
    pub fn as_str(self) -> &'static str {
        match self {
            AccessType::Post => "post",
            AccessType::Get => "get",
            AccessType::Request => "request",
            AccessType::Uri => "uri",
            AccessType::None => "none",
        }
    }
}

impl fmt::Display for AccessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single input value. Only `Text` can carry a request path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum InputValue {
    Text(String),
    List(Vec<String>),
}

impl InputValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            InputValue::Text(text) => Some(text),
            InputValue::List(_) => None,
        }
    }
}

impl From<&str> for InputValue {
    fn from(value: &str) -> Self {
        InputValue::Text(value.to_string())
    }
}

impl From<String> for InputValue {
    fn from(value: String) -> Self {
        InputValue::Text(value)
    }
}

impl From<Vec<String>> for InputValue {
    fn from(values: Vec<String>) -> Self {
        InputValue::List(values)
    }
}

/// Request input injected into the resolver.
///
/// The combined view is maintained on insertion: POST values shadow GET
/// values of the same name regardless of insertion order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RequestInput {
    post: HashMap<String, InputValue>,
    get: HashMap<String, InputValue>,
    request: HashMap<String, InputValue>,
}

impl RequestInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_post(mut self, name: impl Into<String>, value: impl Into<InputValue>) -> Self {
        self.insert(Origin::Post, name, value);
        self
    }

    pub fn with_get(mut self, name: impl Into<String>, value: impl Into<InputValue>) -> Self {
        self.insert(Origin::Get, name, value);
        self
    }

    pub fn insert(&mut self, origin: Origin, name: impl Into<String>, value: impl Into<InputValue>) {
        let name = name.into();
        let value = value.into();
        match origin {
            Origin::Post => {
                self.request.insert(name.clone(), value.clone());
                self.post.insert(name, value);
            }
            Origin::Get => {
                if !self.post.contains_key(&name) {
                    self.request.insert(name.clone(), value.clone());
                }
                self.get.insert(name, value);
            }
            Origin::Request => {
                self.request.insert(name, value);
            }
        }
    }

    pub fn lookup(&self, origin: Origin, name: &str) -> Option<&InputValue> {
        self.view(origin).get(name)
    }

    pub fn view(&self, origin: Origin) -> &HashMap<String, InputValue> {
        match origin {
            Origin::Post => &self.post,
            Origin::Get => &self.get,
            Origin::Request => &self.request,
        }
    }

    /// Copy resolved parameters into the combined view.
    pub fn export(&mut self, params: &ParamsMap) {
        for (name, value) in params {
            self.request
                .insert(name.clone(), InputValue::Text(value.clone()));
        }
    }
}
