//! Per-client configuration defaults.
//!
//! A [`ConfigStore`] holds the defaults a client applies to every invocation:
//! query, body, headers, URI parameters and base URI parameters. Updates swap in
//! a new immutable [`ConfigSnapshot`]; a request composes against whichever
//! snapshot was current when it started, so later changes never alter a
//! request that is already in flight.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use arc_swap::ArcSwap;
use serde_json::{Map, Value};
use strum::{Display, EnumIter, EnumString};
use tracing::debug;

use crate::error::ConfigError;

/// The option keys a client stores defaults for.
///
/// ## Examples
///
/// ```
/// use std::str::FromStr;
/// use apitree::ConfigKey;
///
/// assert_eq!(ConfigKey::from_str("uriParameters").unwrap(), ConfigKey::UriParameters);
/// assert_eq!(ConfigKey::BaseUriParameters.to_string(), "baseUriParameters");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
#[strum(serialize_all = "camelCase")]
pub enum ConfigKey {
    /// Query string: an encoded string or a mapping.
    Query,
    /// Request body: any value.
    Body,
    /// Request headers: a mapping.
    Headers,
    /// Path and base URI variables: a mapping.
    UriParameters,
    /// Base URI variables only: a mapping.
    BaseUriParameters,
}

impl ConfigKey {
    fn validate(self, value: &Value) -> Result<(), ConfigError> {
        let valid = match self {
            Self::Body => true,
            Self::Query => value.is_string() || value.is_object(),
            Self::Headers | Self::UriParameters | Self::BaseUriParameters => value.is_object(),
        };
        if valid {
            Ok(())
        } else {
            Err(ConfigError::InvalidValue {
                key: self,
                expected: self.expected_shape(),
            })
        }
    }

    fn expected_shape(self) -> &'static str {
        match self {
            Self::Body => "any value",
            Self::Query => "an encoded string or an object",
            Self::Headers | Self::UriParameters | Self::BaseUriParameters => "an object",
        }
    }
}

/// An immutable view of a client's defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigSnapshot {
    values: HashMap<ConfigKey, Value>,
}

impl ConfigSnapshot {
    /// The stored value, or `None` when the key is unset.
    pub fn get(&self, key: ConfigKey) -> Option<&Value> {
        self.values.get(&key)
    }

    /// The stored mapping for an object-valued key.
    pub fn object(&self, key: ConfigKey) -> Option<&Map<String, Value>> {
        self.values.get(&key).and_then(Value::as_object)
    }

    /// Returns `true` when no key is set.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Mutable home of a client's defaults.
///
/// ## Examples
///
/// ```
/// use apitree::{ConfigKey, ConfigStore};
/// use serde_json::json;
///
/// let store = ConfigStore::new();
/// assert_eq!(store.get(ConfigKey::Query), None);
///
/// store.set(ConfigKey::Query, json!("test=data")).unwrap();
/// assert_eq!(store.get(ConfigKey::Query), Some(json!("test=data")));
///
/// store.unset(ConfigKey::Query);
/// assert_eq!(store.get(ConfigKey::Query), None);
/// ```
#[derive(Debug)]
pub struct ConfigStore {
    current: ArcSwap<ConfigSnapshot>,
}

impl ConfigStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            current: ArcSwap::from_pointee(ConfigSnapshot::default()),
        }
    }

    /// Returns the value stored under `key`.
    ///
    /// Absence (`None`) is distinct from a stored empty string or object.
    pub fn get(&self, key: ConfigKey) -> Option<Value> {
        self.current.load().get(key).cloned()
    }

    /// Stores `value` under `key`, returning the value now stored.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when the value has the wrong shape
    /// for the key (headers and parameters must be objects, the query must be
    /// a string or an object).
    pub fn set(&self, key: ConfigKey, value: Value) -> Result<Value, ConfigError> {
        key.validate(&value)?;
        self.current.rcu(|current| {
            let mut next = ConfigSnapshot::clone(current);
            next.values.insert(key, value.clone());
            next
        });
        debug!(key = %key, "configuration default set");
        Ok(value)
    }

    /// Stores several defaults at once from an object keyed by option name.
    ///
    /// Either every entry is applied or, on error, none is.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError::NotAnObject`] for a non-object argument and
    /// [`ConfigError::UnknownKey`] / [`ConfigError::InvalidValue`] for bad
    /// entries.
    pub fn set_all(&self, values: &Value) -> Result<(), ConfigError> {
        let entries = values.as_object().ok_or(ConfigError::NotAnObject)?;
        let mut parsed = Vec::with_capacity(entries.len());
        for (name, value) in entries {
            let key = ConfigKey::from_str(name).map_err(|_| ConfigError::UnknownKey {
                key: name.clone(),
            })?;
            key.validate(value)?;
            parsed.push((key, value.clone()));
        }

        self.current.rcu(|current| {
            let mut next = ConfigSnapshot::clone(current);
            next.values.extend(parsed.iter().cloned());
            next
        });
        debug!(keys = parsed.len(), "configuration defaults set");
        Ok(())
    }

    /// Removes the value stored under `key`, returning it.
    pub fn unset(&self, key: ConfigKey) -> Option<Value> {
        let previous = self.current.rcu(|current| {
            let mut next = ConfigSnapshot::clone(current);
            next.values.remove(&key);
            next
        });
        debug!(key = %key, "configuration default unset");
        previous.get(key).cloned()
    }

    /// The current defaults as an immutable snapshot.
    pub fn snapshot(&self) -> Arc<ConfigSnapshot> {
        self.current.load_full()
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new()
    }
}
