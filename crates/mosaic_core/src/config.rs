//! # World Configuration
//!
//! Loaded once at startup, typically from a TOML file:
//!
//! ```toml
//! max_entities = 5000
//! ```

use serde::Deserialize;

use crate::error::{EcsError, EcsResult};

/// Default maximum number of simultaneously alive entities.
pub const DEFAULT_MAX_ENTITIES: usize = 5000;

/// Configuration for a [`World`](crate::World).
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorldConfig {
    /// Maximum number of simultaneously alive entities.
    pub max_entities: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            max_entities: DEFAULT_MAX_ENTITIES,
        }
    }
}

impl WorldConfig {
    /// Parses a configuration from TOML text and validates it.
    ///
    /// Missing keys take their default values.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidConfig`] if the text is not valid TOML,
    /// contains unknown keys, or fails [`WorldConfig::validate`].
    pub fn from_toml_str(text: &str) -> EcsResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| EcsError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the entity capacity is usable.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidConfig`] if `max_entities` is zero or
    /// larger than the `u32` identifier space.
    pub fn validate(&self) -> EcsResult<()> {
        if self.max_entities == 0 {
            return Err(EcsError::InvalidConfig(
                "max_entities must be greater than zero".to_owned(),
            ));
        }
        // Identifiers are u32, so the last one is max_entities - 1
        if u32::try_from(self.max_entities - 1).is_err() {
            return Err(EcsError::InvalidConfig(format!(
                "max_entities {} exceeds the u32 identifier space",
                self.max_entities
            )));
        }
        Ok(())
    }
}
