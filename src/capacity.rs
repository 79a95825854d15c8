use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::num::NonZeroU32;

/// Location -> capacity cap, with a required default for unlisted locations.
///
/// Read-only once built; share it by reference across parallel analyses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityPolicy {
    default: NonZeroU32,
    #[serde(default)]
    locations: BTreeMap<String, NonZeroU32>,
}

impl Default for CapacityPolicy {
    fn default() -> Self {
        let cap = |n: u32| NonZeroU32::new(n).unwrap_or(NonZeroU32::MIN);
        Self {
            default: cap(3),
            locations: BTreeMap::from([
                ("Denver".to_string(), cap(40)),
                ("Tampa".to_string(), cap(10)),
                ("San Francisco".to_string(), cap(2)),
            ]),
        }
    }
}

impl CapacityPolicy {
    pub fn new(default: u32) -> Result<Self, ConfigError> {
        let default = NonZeroU32::new(default)
            .ok_or_else(|| ConfigError::ZeroCapacity { location: "default".into() })?;
        Ok(Self { default, locations: BTreeMap::new() })
    }

    pub fn with_location(mut self, location: impl Into<String>, cap: u32) -> Result<Self, ConfigError> {
        let location = location.into();
        let cap = NonZeroU32::new(cap).ok_or_else(|| ConfigError::ZeroCapacity { location: location.clone() })?;
        self.locations.insert(location, cap);
        Ok(self)
    }

    pub fn with_default(mut self, default: u32) -> Result<Self, ConfigError> {
        self.default = NonZeroU32::new(default)
            .ok_or_else(|| ConfigError::ZeroCapacity { location: "default".into() })?;
        Ok(self)
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn cap_for(&self, location: &str) -> NonZeroU32 {
        self.locations.get(location).copied().unwrap_or(self.default)
    }

    pub fn default_cap(&self) -> NonZeroU32 {
        self.default
    }

    pub fn locations(&self) -> impl Iterator<Item = (&str, NonZeroU32)> {
        self.locations.iter().map(|(k, v)| (k.as_str(), *v))
    }
}
