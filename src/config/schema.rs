//! Configuration schema definitions.
//!
//! This module defines the structure of the routing configuration file.
//! All types derive Serde traits for deserialization from TOML.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Root routing configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RouterConfig {
    /// Reserved singleton handlers.
    pub general: GeneralConfig,

    /// Reference patterns mapped to handler scripts, in document order.
    pub uri: UriTable,

    /// Resolver behaviour.
    pub resolver: ResolverSettings,
}

/// The `[general]` group.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GeneralConfig {
    /// Handler run when no request path was received.
    pub default: Option<String>,

    /// Handler run on fatal abort.
    pub abort: Option<String>,
}

/// Ordered `pattern = handler` pairs of the `[uri]` group.
///
/// Order is match priority, so this deserializes from a TOML table into a
/// vector instead of a hash map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UriTable(pub Vec<(String, String)>);

impl UriTable {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for UriTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (pattern, handler) in &self.0 {
            map.serialize_entry(pattern, handler)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for UriTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct UriVisitor;

        impl<'de> Visitor<'de> for UriVisitor {
            type Value = UriTable;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a table of reference patterns to handler paths")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<UriTable, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((pattern, handler)) = access.next_entry::<String, String>()? {
                    entries.push((pattern, handler));
                }
                Ok(UriTable(entries))
            }
        }

        deserializer.deserialize_map(UriVisitor)
    }
}

/// Settings for path-source detection, diagnostics and execution.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ResolverSettings {
    /// Fall back to server metadata when the bound parameter is absent.
    pub auto_detect: bool,

    /// Request path of the entry point itself. No sub-routing happens there.
    pub document_root: String,

    /// Prefix stripped from an auto-detected request path.
    pub base_dir: String,

    /// Emit one diagnostic record per executed handler.
    pub debug: bool,

    /// Copy captured parameters into the combined input before a routed
    /// handler runs.
    pub export: bool,

    /// Extensions a detoured file must carry.
    pub script_extensions: Vec<String>,

    /// Interpreter per script extension (e.g. `py = "python3"`). Scripts
    /// with no entry are executed directly.
    pub interpreters: BTreeMap<String, String>,

    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            auto_detect: true,
            document_root: "/".to_string(),
            base_dir: "/".to_string(),
            debug: false,
            export: false,
            script_extensions: ["cgi", "php", "pl", "py", "sh"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            interpreters: BTreeMap::new(),
            log_level: "info".to_string(),
        }
    }
}
