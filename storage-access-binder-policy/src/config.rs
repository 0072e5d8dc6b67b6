//! Backend definition loaded from TOML.

use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigurationError, Result};

fn default_stack() -> String {
    "custom-bucket-stack".to_string()
}

fn default_policy_prefix() -> String {
    "customBucket".to_string()
}

/// Auth resource settings that decide which roles exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthDefinition {
    /// Whether the identity pool issues credentials to unauthenticated users.
    #[serde(default)]
    pub guest_access: bool,
    /// User groups, each of which gets its own role.
    #[serde(default)]
    pub groups: Vec<String>,
}

/// Attributes of the existing bucket to import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BucketDefinition {
    /// Logical id of the imported bucket.
    pub id: String,
    pub arn: String,
    pub region: String,
}

/// Everything the binder needs besides the storage outputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackendDefinition {
    /// Stack that holds the bucket import.
    #[serde(default = "default_stack")]
    pub stack: String,
    /// Leading words of generated policy names.
    #[serde(default = "default_policy_prefix")]
    pub policy_prefix: String,
    pub auth: AuthDefinition,
    pub bucket: BucketDefinition,
}

impl BackendDefinition {
    pub fn from_toml(source: &str) -> Result<Self> {
        let definition: Self = toml::from_str(source)?;
        definition.validate()?;
        Ok(definition)
    }

    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading backend definition from {}", path.display());
        let source = std::fs::read_to_string(path).map_err(|e| {
            ConfigurationError::definition(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml(&source)
    }

    fn validate(&self) -> Result<()> {
        if self.stack.trim().is_empty() {
            return Err(ConfigurationError::definition("stack name is empty"));
        }
        if self.policy_prefix.trim().is_empty() {
            return Err(ConfigurationError::definition("policy_prefix is empty"));
        }
        if self.bucket.id.trim().is_empty() {
            return Err(ConfigurationError::definition("bucket id is empty"));
        }
        for (index, group) in self.auth.groups.iter().enumerate() {
            if group.trim().is_empty() {
                return Err(ConfigurationError::definition("group name is empty"));
            }
            if self.auth.groups[..index].contains(group) {
                return Err(ConfigurationError::definition(format!(
                    "group '{group}' is declared twice"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFINITION: &str = r#"
stack = "custom-bucket-stack"
policy_prefix = "customBucket"

[auth]
guest_access = true
groups = ["admin"]

[bucket]
id = "MyCustomBucket"
arn = "arn:aws:s3:::baff-demo-storage-browser-test2"
region = "us-east-1"
"#;

    #[test]
    fn test_parses_definition() {
        let definition = BackendDefinition::from_toml(DEFINITION).unwrap();
        assert_eq!(definition.stack, "custom-bucket-stack");
        assert!(definition.auth.guest_access);
        assert_eq!(definition.auth.groups, vec!["admin"]);
        assert_eq!(definition.bucket.id, "MyCustomBucket");
    }

    #[test]
    fn test_defaults_stack_and_prefix() {
        let source = DEFINITION
            .replace("stack = \"custom-bucket-stack\"\n", "")
            .replace("policy_prefix = \"customBucket\"\n", "");
        let definition = BackendDefinition::from_toml(&source).unwrap();
        assert_eq!(definition.stack, "custom-bucket-stack");
        assert_eq!(definition.policy_prefix, "customBucket");
    }

    #[test]
    fn test_rejects_unknown_fields() {
        let source = DEFINITION.replace("guest_access", "guest_acess");
        assert!(matches!(
            BackendDefinition::from_toml(&source),
            Err(ConfigurationError::InvalidDefinition(_))
        ));
    }

    #[test]
    fn test_rejects_duplicate_groups() {
        let source = DEFINITION.replace("[\"admin\"]", "[\"admin\", \"admin\"]");
        assert_eq!(
            BackendDefinition::from_toml(&source),
            Err(ConfigurationError::definition(
                "group 'admin' is declared twice"
            ))
        );
    }

    #[test]
    fn test_rejects_missing_bucket() {
        let source = DEFINITION.split("[bucket]").next().unwrap();
        assert!(BackendDefinition::from_toml(source).is_err());
    }
}
