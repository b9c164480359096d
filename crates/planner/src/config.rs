use crate::error::PlanError;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_DEPTH: usize = 32;
pub const DEFAULT_ROOT_ALIAS: &str = "s";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuilderConfig {
    /// Deepest nesting a filter may have; a flat filter is one level deep.
    pub max_depth: usize,

    /// Alias bound to the root entity when the builder creates the query.
    pub root_alias: String,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            root_alias: DEFAULT_ROOT_ALIAS.to_string(),
        }
    }
}

impl BuilderConfig {
    pub fn from_json_str(json: &str) -> Result<Self, PlanError> {
        let config: BuilderConfig =
            serde_json::from_str(json).map_err(|e| PlanError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_root_alias(mut self, alias: &str) -> Self {
        self.root_alias = alias.to_string();
        self
    }

    pub fn validate(&self) -> Result<(), PlanError> {
        if self.max_depth == 0 {
            return Err(PlanError::Config("max_depth must be at least 1".into()));
        }
        if self.root_alias.is_empty() || self.root_alias.contains('.') {
            return Err(PlanError::Config(format!(
                "root_alias `{}` must be a non-empty name without `.`",
                self.root_alias
            )));
        }
        Ok(())
    }
}
