use crate::error::FixtureError;
use planner::BuilderConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FixtureConfig {
    /// Roll back everything an isolated test wrote. With `false` the
    /// writes are committed and stay visible to later tests.
    pub cleanup: bool,

    /// Settings for the association builder behind the assertion helpers.
    pub builder: BuilderConfig,
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self {
            cleanup: true,
            builder: BuilderConfig::default(),
        }
    }
}

impl FixtureConfig {
    pub fn from_json_str(json: &str) -> Result<Self, FixtureError> {
        let config: FixtureConfig =
            serde_json::from_str(json).map_err(|e| FixtureError::Config(e.to_string()))?;
        config.builder.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_builder_settings_are_read() {
        let config =
            FixtureConfig::from_json_str(r#"{ "cleanup": false, "builder": { "root_alias": "u" } }"#)
                .unwrap();
        assert!(!config.cleanup);
        assert_eq!(config.builder.root_alias, "u");
        assert_eq!(config.builder.max_depth, 32);
    }

    #[test]
    fn invalid_builder_settings_surface_as_plan_errors() {
        let err = FixtureConfig::from_json_str(r#"{ "builder": { "max_depth": 0 } }"#).unwrap_err();
        assert!(matches!(err, FixtureError::Plan(_)));
    }

    #[test]
    fn empty_object_is_default() {
        assert_eq!(FixtureConfig::from_json_str("{}").unwrap(), FixtureConfig::default());
    }
}
