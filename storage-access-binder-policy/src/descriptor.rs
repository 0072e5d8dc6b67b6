//! Storage output descriptor
//!
//! The descriptor is the capability map surfaced to client SDKs: for each
//! bucket, which path patterns each principal class may use and how. Policies
//! are derived from it, and attached policies are checked back against it.

use std::collections::{BTreeMap, BTreeSet};

use log::debug;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigurationError, Result};
use crate::types::{Operation, PathPattern, PrincipalClass};

/// Access granted to each principal class on one path pattern.
pub type PathAccess = BTreeMap<PrincipalClass, Vec<Operation>>;

/// One bucket entry of the storage outputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct BucketOutput {
    pub aws_region: String,
    pub bucket_name: String,
    /// Friendly name clients use to select the bucket.
    pub name: String,
    pub paths: BTreeMap<PathPattern, PathAccess>,
}

impl BucketOutput {
    /// Operations declared for `principal` on `pattern`, if any.
    pub fn declared(&self, pattern: &PathPattern, principal: &PrincipalClass) -> Option<&[Operation]> {
        self.paths
            .get(pattern)
            .and_then(|access| access.get(principal))
            .map(Vec::as_slice)
    }

    /// Every principal class named anywhere in the path map.
    pub fn principals(&self) -> BTreeSet<&PrincipalClass> {
        self.paths.values().flat_map(BTreeMap::keys).collect()
    }

    fn validate(&self) -> Result<()> {
        if self.paths.is_empty() {
            return Err(ConfigurationError::descriptor(format!(
                "bucket '{}' declares no paths",
                self.name
            )));
        }
        for (pattern, access) in &self.paths {
            if access.is_empty() {
                return Err(ConfigurationError::descriptor(format!(
                    "path '{pattern}' in bucket '{}' grants nothing to anyone",
                    self.name
                )));
            }
            for (principal, operations) in access {
                if operations.is_empty() {
                    return Err(ConfigurationError::descriptor(format!(
                        "path '{pattern}' lists no operations for '{principal}'"
                    )));
                }
                let unique: BTreeSet<_> = operations.iter().collect();
                if unique.len() != operations.len() {
                    return Err(ConfigurationError::descriptor(format!(
                        "path '{pattern}' repeats an operation for '{principal}'"
                    )));
                }
                if matches!(principal, PrincipalClass::Guest)
                    && operations.iter().any(|op| op.is_mutating())
                {
                    return Err(ConfigurationError::descriptor(format!(
                        "path '{pattern}' grants write or delete to guests"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// The `storage` section of the backend outputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StorageOutputs {
    /// Region of the default bucket.
    pub aws_region: String,
    /// Name of the default bucket.
    pub bucket_name: String,
    pub buckets: Vec<BucketOutput>,
}

impl StorageOutputs {
    /// Parse storage outputs from JSON, accepting either the bare section or
    /// a full outputs document with a `storage` key.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let storage = match value {
            serde_json::Value::Object(mut map) if map.contains_key("storage") => map
                .remove("storage")
                .unwrap_or(serde_json::Value::Null),
            other => other,
        };
        let outputs: Self = serde_json::from_value(storage)?;
        outputs.validate()?;
        debug!(
            "Loaded storage outputs with {} bucket(s), default '{}'",
            outputs.buckets.len(),
            outputs.bucket_name
        );
        Ok(outputs)
    }

    pub fn validate(&self) -> Result<()> {
        if self.buckets.is_empty() {
            return Err(ConfigurationError::descriptor("no buckets declared"));
        }

        let mut names = BTreeSet::new();
        for bucket in &self.buckets {
            if !names.insert(bucket.name.as_str()) {
                return Err(ConfigurationError::descriptor(format!(
                    "duplicate bucket name '{}'",
                    bucket.name
                )));
            }
            bucket.validate()?;
        }

        let default_declared = self
            .buckets
            .iter()
            .any(|b| b.bucket_name == self.bucket_name && b.aws_region == self.aws_region);
        if !default_declared {
            return Err(ConfigurationError::descriptor(format!(
                "default bucket '{}' in '{}' is not listed in buckets",
                self.bucket_name, self.aws_region
            )));
        }
        Ok(())
    }

    /// The bucket entry backed by `bucket_name` in `region`.
    pub fn bucket(&self, bucket_name: &str, region: &str) -> Option<&BucketOutput> {
        self.buckets
            .iter()
            .find(|b| b.bucket_name == bucket_name && b.aws_region == region)
    }
}

/// Outputs document handed to client SDKs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct BackendOutputs {
    pub storage: StorageOutputs,
}

impl BackendOutputs {
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// JSON schema of the outputs document.
    pub fn schema_json() -> Result<String> {
        Ok(serde_json::to_string_pretty(&schemars::schema_for!(
            BackendOutputs
        ))?)
    }
}
