//! This crate provides the core logic for binding storage access to auth roles:
//! - Storage output descriptor parsing and validation
//! - Statement synthesis from declared path rules
//! - Policy derivation, attachment, and coverage checks
//! - Backend synthesis into a deployment manifest
//!

mod backend;
mod binder;
mod bucket;
mod config;
mod descriptor;
mod error;
mod identity;
mod synthesis;
mod types;

// Re-exports for a small, focused public API
pub use backend::{plan, synthesize, BindingPlan, Deployment};
pub use binder::{derive_policies, policy_name, Attachment, BackendConfig, Binder, RoleBinding};
pub use bucket::{parse_bucket_arn, BucketResolver, ImportedBucket};
pub use config::{AuthDefinition, BackendDefinition, BucketDefinition};
pub use descriptor::{BackendOutputs, BucketOutput, PathAccess, StorageOutputs};
pub use error::{ConfigurationError, Result};
pub use identity::{
    AuthResource, IdentityDirectory, AUTHENTICATED_ROLE_ID, UNAUTHENTICATED_ROLE_ID,
};
pub use synthesis::{
    operation_for_action, provider_action, statement_scope, statements_for_rule, ActionLevel,
};
pub use types::{
    ConditionBlock, Effect, Operation, Operator, PathPattern, Policy, PolicyDocument,
    PrincipalClass, ResolvedBucketRef, RoleKind, RoleRef, Statement, POLICY_VERSION,
    S3_PREFIX_CONDITION_KEY,
};
