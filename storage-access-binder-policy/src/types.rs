//! Core value types shared across the binder.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// IAM policy language version used for every generated document.
pub const POLICY_VERSION: &str = "2012-10-17";

/// Condition key the storage service uses to filter `ListBucket` by key prefix.
pub const S3_PREFIX_CONDITION_KEY: &str = "s3:prefix";

/// Operation kinds advertised to client SDKs in the storage outputs.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Get,
    List,
    Write,
    Delete,
}

impl Operation {
    /// All operations in canonical order.
    pub const ALL: [Self; 4] = [Self::Get, Self::List, Self::Write, Self::Delete];

    /// Whether the operation modifies objects.
    pub fn is_mutating(self) -> bool {
        matches!(self, Self::Write | Self::Delete)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Get => "get",
            Self::List => "list",
            Self::Write => "write",
            Self::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// A principal class as spelled in the storage outputs.
///
/// Groups are written `groups<Name>`, so the `admin` group is `groupsadmin`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PrincipalClass {
    Guest,
    Authenticated,
    Group(String),
}

const GROUP_PREFIX: &str = "groups";

impl PrincipalClass {
    pub fn group(name: impl Into<String>) -> Self {
        Self::Group(name.into())
    }
}

impl fmt::Display for PrincipalClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Guest => f.write_str("guest"),
            Self::Authenticated => f.write_str("authenticated"),
            Self::Group(name) => write!(f, "{GROUP_PREFIX}{name}"),
        }
    }
}

impl FromStr for PrincipalClass {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "guest" => Ok(Self::Guest),
            "authenticated" => Ok(Self::Authenticated),
            other => match other.strip_prefix(GROUP_PREFIX) {
                Some(name) if !name.is_empty() => Ok(Self::Group(name.to_string())),
                _ => Err(ConfigurationError::descriptor(format!(
                    "unknown principal class '{other}'"
                ))),
            },
        }
    }
}

impl TryFrom<String> for PrincipalClass {
    type Error = ConfigurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PrincipalClass> for String {
    fn from(value: PrincipalClass) -> Self {
        value.to_string()
    }
}

impl JsonSchema for PrincipalClass {
    fn schema_name() -> Cow<'static, str> {
        "PrincipalClass".into()
    }

    fn json_schema(_: &mut schemars::SchemaGenerator) -> schemars::Schema {
        schemars::json_schema!({
            "type": "string",
            "pattern": "^(guest|authenticated|groups.+)$"
        })
    }
}

/// A key-space partition of the form `<prefix>/*`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PathPattern(String);

impl PathPattern {
    pub fn new(pattern: impl Into<String>) -> crate::Result<Self> {
        let pattern = pattern.into();
        let valid = pattern
            .strip_suffix("/*")
            .is_some_and(|prefix| !prefix.is_empty() && !prefix.contains('*'));
        if valid {
            Ok(Self(pattern))
        } else {
            Err(ConfigurationError::InvalidPathPattern(pattern))
        }
    }

    /// The literal key prefix, e.g. `admin/` for `admin/*`.
    pub fn prefix(&self) -> &str {
        &self.0[..self.0.len() - 1]
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Map a prefix condition value or object key pattern back to a path pattern.
    ///
    /// Both `admin/` and `admin/*` name the `admin/*` partition.
    pub fn from_scope(scope: &str) -> Option<Self> {
        let normalized = if scope.ends_with("/*") {
            scope.to_string()
        } else if scope.ends_with('/') {
            format!("{scope}*")
        } else {
            return None;
        };
        Self::new(normalized).ok()
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PathPattern {
    type Error = ConfigurationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PathPattern> for String {
    fn from(value: PathPattern) -> Self {
        value.0
    }
}

impl JsonSchema for PathPattern {
    fn schema_name() -> Cow<'static, str> {
        "PathPattern".into()
    }

    fn json_schema(_: &mut schemars::SchemaGenerator) -> schemars::Schema {
        schemars::json_schema!({
            "type": "string",
            "pattern": "^[^*]+/\\*$"
        })
    }
}

/// A bucket that exists outside this backend, resolved to its ARN.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ResolvedBucketRef {
    pub arn: String,
    pub region: String,
    pub name: String,
}

impl ResolvedBucketRef {
    /// ARN pattern matching every object under `pattern`.
    pub fn object_arn(&self, pattern: &PathPattern) -> String {
        format!("{}/{}", self.arn, pattern)
    }

    /// ARN pattern matching every object in the bucket.
    pub fn all_objects_arn(&self) -> String {
        format!("{}/*", self.arn)
    }
}

/// Kind of role a policy can be attached to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum RoleKind {
    Unauthenticated,
    Authenticated,
    Group,
}

/// Reference to a role owned by the identity provider.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
pub struct RoleRef {
    pub kind: RoleKind,
    pub id: String,
}

impl RoleRef {
    pub fn new(kind: RoleKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }
}

impl fmt::Display for RoleRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            RoleKind::Group => write!(f, "group/{}", self.id),
            RoleKind::Authenticated | RoleKind::Unauthenticated => f.write_str(&self.id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Effect {
    Allow,
    Deny,
}

/// Condition operators used by generated statements.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
pub enum Operator {
    StringEquals,
    StringLike,
}

/// `operator -> key -> values`, ordered so serialization is stable.
pub type ConditionBlock = BTreeMap<Operator, BTreeMap<String, Vec<String>>>;

/// A single IAM policy statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct Statement {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
    pub effect: Effect,
    pub action: Vec<String>,
    pub resource: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub condition: ConditionBlock,
}

impl Statement {
    pub fn allow(actions: Vec<String>, resources: Vec<String>) -> Self {
        Self {
            sid: None,
            effect: Effect::Allow,
            action: actions,
            resource: resources,
            condition: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_sid(mut self, sid: impl Into<String>) -> Self {
        self.sid = Some(sid.into());
        self
    }

    #[must_use]
    pub fn with_condition(
        mut self,
        operator: Operator,
        key: impl Into<String>,
        values: Vec<String>,
    ) -> Self {
        self.condition
            .entry(operator)
            .or_default()
            .insert(key.into(), values);
        self
    }

    /// Values of the `s3:prefix` condition under any operator.
    pub fn prefix_condition_values(&self) -> impl Iterator<Item = &str> {
        self.condition
            .values()
            .filter_map(|keys| keys.get(S3_PREFIX_CONDITION_KEY))
            .flatten()
            .map(String::as_str)
    }
}

/// An IAM policy document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    pub version: String,
    pub statement: Vec<Statement>,
}

impl PolicyDocument {
    pub fn new(statement: Vec<Statement>) -> Self {
        Self {
            version: POLICY_VERSION.to_string(),
            statement,
        }
    }
}

/// A named policy ready to be attached inline to a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Policy {
    pub name: String,
    pub document: PolicyDocument,
}
