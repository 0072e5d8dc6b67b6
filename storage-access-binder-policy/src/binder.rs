//! Access policy binder
//!
//! Derives one policy per principal class from the storage outputs and
//! attaches it to the role backing that class. Every bind takes the current
//! [`BackendConfig`] by reference and returns a new one, so a failed bind
//! leaves nothing half attached.

use std::collections::{BTreeMap, BTreeSet};

use convert_case::{Case, Casing};
use log::{debug, info};
use serde::Serialize;

use crate::descriptor::{BucketOutput, StorageOutputs};
use crate::error::{ConfigurationError, Result};
use crate::identity::IdentityDirectory;
use crate::synthesis::{dedupe_sids, operation_for_action, statement_scope, statements_for_rule};
use crate::types::{
    Effect, Operation, PathPattern, Policy, PolicyDocument, PrincipalClass, ResolvedBucketRef,
    RoleRef, Statement,
};

/// A policy derived for a principal class, not yet attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleBinding {
    pub principal: PrincipalClass,
    pub policy: Policy,
}

/// Policies attached to a single role, keyed by policy name.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RoleAttachments {
    principal: PrincipalClass,
    policies: BTreeMap<String, PolicyDocument>,
}

/// One attached policy, as handed to the deployment platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attachment {
    pub role: RoleRef,
    pub principal: PrincipalClass,
    pub policy_name: String,
    pub policy_document: PolicyDocument,
}

/// Storage outputs plus the policies attached so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    storage: StorageOutputs,
    attachments: BTreeMap<RoleRef, RoleAttachments>,
}

impl BackendConfig {
    pub fn new(storage: StorageOutputs) -> Self {
        Self {
            storage,
            attachments: BTreeMap::new(),
        }
    }

    pub fn storage(&self) -> &StorageOutputs {
        &self.storage
    }

    /// Attached policies ordered by role, then policy name.
    pub fn attachments(&self) -> Vec<Attachment> {
        self.attachments
            .iter()
            .flat_map(|(role, attached)| {
                attached
                    .policies
                    .iter()
                    .map(move |(name, document)| Attachment {
                        role: role.clone(),
                        principal: attached.principal.clone(),
                        policy_name: name.clone(),
                        policy_document: document.clone(),
                    })
            })
            .collect()
    }

    /// The policy named `policy_name` on `role`, if attached.
    pub fn policy(&self, role: &RoleRef, policy_name: &str) -> Option<&PolicyDocument> {
        self.attachments
            .get(role)
            .and_then(|attached| attached.policies.get(policy_name))
    }

    fn declared_bucket(&self, bucket: &ResolvedBucketRef) -> Result<&BucketOutput> {
        self.storage
            .bucket(&bucket.name, &bucket.region)
            .ok_or_else(|| {
                ConfigurationError::descriptor(format!(
                    "bucket '{}' in '{}' is not declared in the storage outputs",
                    bucket.name, bucket.region
                ))
            })
    }
}

/// Name of the policy attached for `principal`, e.g. `customBucketAdminPolicy`.
pub fn policy_name(prefix: &str, principal: &PrincipalClass) -> String {
    let label = match principal {
        PrincipalClass::Guest => "guest",
        PrincipalClass::Authenticated => "auth",
        PrincipalClass::Group(name) => name.as_str(),
    };
    format!("{} {} policy", prefix.to_case(Case::Lower), label.to_case(Case::Lower))
        .to_case(Case::Camel)
}

/// Derive one policy per principal class declared for `declared`.
///
/// Statements are ordered by path pattern so output is stable.
pub fn derive_policies(
    bucket: &ResolvedBucketRef,
    declared: &BucketOutput,
    policy_prefix: &str,
) -> Vec<RoleBinding> {
    declared
        .principals()
        .into_iter()
        .map(|principal| {
            let mut statements: Vec<Statement> = declared
                .paths
                .iter()
                .filter_map(|(pattern, access)| {
                    access
                        .get(principal)
                        .map(|operations| statements_for_rule(bucket, pattern, operations))
                })
                .flatten()
                .collect();
            dedupe_sids(&mut statements);
            RoleBinding {
                principal: principal.clone(),
                policy: Policy {
                    name: policy_name(policy_prefix, principal),
                    document: PolicyDocument::new(statements),
                },
            }
        })
        .collect()
}

/// Attaches policies to roles resolved through an identity directory.
#[derive(Debug)]
pub struct Binder<'a, D: IdentityDirectory> {
    directory: &'a D,
}

impl<'a, D: IdentityDirectory> Binder<'a, D> {
    pub fn new(directory: &'a D) -> Self {
        Self { directory }
    }

    fn role_for(&self, principal: &PrincipalClass) -> Result<RoleRef> {
        self.directory
            .resolve(principal)
            .ok_or_else(|| ConfigurationError::UnknownRole {
                principal: principal.to_string(),
            })
    }

    /// Attach `policy` to the role backing `principal`.
    ///
    /// Re-binding a policy with the same name on the same role replaces it,
    /// so binding identical input twice yields an identical configuration.
    pub fn bind(
        &self,
        config: &BackendConfig,
        bucket: &ResolvedBucketRef,
        principal: &PrincipalClass,
        policy: Policy,
    ) -> Result<BackendConfig> {
        let role = self.role_for(principal)?;
        let declared = config.declared_bucket(bucket)?;
        check_declared(bucket, declared, principal, &policy)?;

        let mut next = config.clone();
        let attached = next
            .attachments
            .entry(role.clone())
            .or_insert_with(|| RoleAttachments {
                principal: principal.clone(),
                policies: BTreeMap::new(),
            });
        let replaced = attached
            .policies
            .insert(policy.name.clone(), policy.document)
            .is_some();

        info!(
            "{} policy '{}' on role '{}' for '{}'",
            if replaced { "Replaced" } else { "Attached" },
            policy.name,
            role,
            principal
        );
        Ok(next)
    }

    /// Attach every binding, or none of them.
    pub fn bind_all(
        &self,
        config: &BackendConfig,
        bucket: &ResolvedBucketRef,
        bindings: Vec<RoleBinding>,
    ) -> Result<BackendConfig> {
        bindings.into_iter().try_fold(config.clone(), |current, binding| {
            self.bind(&current, bucket, &binding.principal, binding.policy)
        })
    }

    /// Check that every declared path and operation is granted to its
    /// principal class by some attached policy.
    pub fn verify_coverage(&self, config: &BackendConfig, bucket: &ResolvedBucketRef) -> Result<()> {
        let declared = config.declared_bucket(bucket)?;

        for (pattern, access) in &declared.paths {
            for (principal, operations) in access {
                let role = self.role_for(principal)?;
                let granted = config
                    .attachments
                    .get(&role)
                    .map(|attached| granted_operations(bucket, attached, pattern))
                    .unwrap_or_default();

                let missing: Vec<_> = operations
                    .iter()
                    .filter(|op| !granted.contains(*op))
                    .collect();
                if !missing.is_empty() {
                    debug!(
                        "'{}' on '{}' is missing {:?}",
                        principal, pattern, missing
                    );
                    return Err(ConfigurationError::UncoveredPath {
                        principal: principal.to_string(),
                        path: pattern.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Reject statements that reach outside what the outputs declare for `principal`.
fn check_declared(
    bucket: &ResolvedBucketRef,
    declared: &BucketOutput,
    principal: &PrincipalClass,
    policy: &Policy,
) -> Result<()> {
    for (index, statement) in policy.document.statement.iter().enumerate() {
        if statement.effect == Effect::Deny {
            continue;
        }

        let unscoped = || ConfigurationError::UnscopedStatement {
            policy: policy.name.clone(),
            statement: statement
                .sid
                .clone()
                .unwrap_or_else(|| format!("#{index}")),
        };
        check_resources(bucket, principal, policy, statement, unscoped)?;

        let scope = statement_scope(bucket, statement);
        if scope.is_empty() {
            return Err(unscoped());
        }

        for path in scope {
            let undeclared_path = || ConfigurationError::UndeclaredPath {
                policy: policy.name.clone(),
                principal: principal.to_string(),
                path: path.clone(),
            };
            let pattern = PathPattern::new(path.clone()).map_err(|_| undeclared_path())?;
            let operations = declared
                .declared(&pattern, principal)
                .ok_or_else(undeclared_path)?;

            for action in &statement.action {
                let allowed =
                    operation_for_action(action).is_some_and(|op| operations.contains(&op));
                if !allowed {
                    return Err(ConfigurationError::UndeclaredAction {
                        policy: policy.name.clone(),
                        principal: principal.to_string(),
                        path: path.clone(),
                        action: action.clone(),
                    });
                }
            }
        }
    }
    Ok(())
}

/// Every resource must sit inside `bucket` and name a path pattern. The bucket
/// itself and `<bucket>/*` may only carry read actions narrowed by `s3:prefix`.
fn check_resources(
    bucket: &ResolvedBucketRef,
    principal: &PrincipalClass,
    policy: &Policy,
    statement: &Statement,
    unscoped: impl Fn() -> ConfigurationError,
) -> Result<()> {
    let object_root = format!("{}/", bucket.arn);
    let narrowed = statement.prefix_condition_values().next().is_some();

    for resource in &statement.resource {
        let key = resource.strip_prefix(&object_root);
        if *resource == bucket.arn || key == Some("*") {
            if !narrowed {
                return Err(unscoped());
            }
            let mutating = statement
                .action
                .iter()
                .find(|action| !operation_for_action(action).is_some_and(|op| !op.is_mutating()));
            if let Some(action) = mutating {
                return Err(ConfigurationError::UndeclaredAction {
                    policy: policy.name.clone(),
                    principal: principal.to_string(),
                    path: resource.clone(),
                    action: action.clone(),
                });
            }
            continue;
        }

        if key.and_then(PathPattern::from_scope).is_none() {
            return Err(ConfigurationError::UndeclaredPath {
                policy: policy.name.clone(),
                principal: principal.to_string(),
                path: resource.clone(),
            });
        }
    }
    Ok(())
}

fn granted_operations(
    bucket: &ResolvedBucketRef,
    attached: &RoleAttachments,
    pattern: &PathPattern,
) -> BTreeSet<Operation> {
    attached
        .policies
        .values()
        .flat_map(|document| &document.statement)
        .filter(|statement| statement.effect == Effect::Allow)
        .filter(|statement| statement_scope(bucket, statement).contains(pattern.as_str()))
        .flat_map(|statement| &statement.action)
        .filter_map(|action| operation_for_action(action))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::AuthResource;
    use crate::types::{Operator, RoleKind, S3_PREFIX_CONDITION_KEY};
    use rstest::rstest;

    const ARN: &str = "arn:aws:s3:::baff-demo-storage-browser-test2";

    fn bucket() -> ResolvedBucketRef {
        ResolvedBucketRef {
            arn: ARN.to_string(),
            region: "us-east-1".to_string(),
            name: "baff-demo-storage-browser-test2".to_string(),
        }
    }

    fn storage() -> StorageOutputs {
        StorageOutputs::from_json(
            r#"{
              "aws_region": "us-east-1",
              "bucket_name": "baff-demo-storage-browser-test2",
              "buckets": [{
                "aws_region": "us-east-1",
                "bucket_name": "baff-demo-storage-browser-test2",
                "name": "baff-demo-storage-browser-test2",
                "paths": {
                  "public/*": { "guest": ["get", "list"] },
                  "admin/*": {
                    "authenticated": ["get", "list"],
                    "groupsadmin": ["get", "list", "write", "delete"]
                  }
                }
              }]
            }"#,
        )
        .unwrap()
    }

    fn derived() -> Vec<RoleBinding> {
        let storage = storage();
        derive_policies(&bucket(), &storage.buckets[0], "customBucket")
    }

    fn binding_for(principal: &PrincipalClass) -> RoleBinding {
        derived()
            .into_iter()
            .find(|b| &b.principal == principal)
            .unwrap()
    }

    #[test]
    fn test_policy_names() {
        assert_eq!(
            policy_name("customBucket", &PrincipalClass::Authenticated),
            "customBucketAuthPolicy"
        );
        assert_eq!(
            policy_name("customBucket", &PrincipalClass::group("admin")),
            "customBucketAdminPolicy"
        );
        assert_eq!(
            policy_name("customBucket", &PrincipalClass::Guest),
            "customBucketGuestPolicy"
        );
    }

    #[test]
    fn test_derives_one_policy_per_principal() {
        let bindings = derived();
        let principals: Vec<_> = bindings.iter().map(|b| b.principal.clone()).collect();
        assert_eq!(
            principals,
            vec![
                PrincipalClass::Guest,
                PrincipalClass::Authenticated,
                PrincipalClass::group("admin")
            ]
        );
    }

    #[test]
    fn test_authenticated_reads_admin_prefix() {
        let binding = binding_for(&PrincipalClass::Authenticated);
        let statements = &binding.policy.document.statement;
        assert_eq!(statements.len(), 1);
        assert_eq!(statements[0].action, vec!["s3:GetObject", "s3:ListBucket"]);
        assert_eq!(
            statements[0].prefix_condition_values().collect::<Vec<_>>(),
            vec!["admin/", "admin/*"]
        );
    }

    #[test]
    fn test_bind_attaches_to_resolved_role() {
        let auth = AuthResource::new(true, ["admin"]);
        let binder = Binder::new(&auth);
        let config = BackendConfig::new(storage());
        let binding = binding_for(&PrincipalClass::group("admin"));

        let next = binder
            .bind(&config, &bucket(), &binding.principal, binding.policy.clone())
            .unwrap();

        let role = RoleRef::new(RoleKind::Group, "admin");
        assert_eq!(
            next.policy(&role, "customBucketAdminPolicy"),
            Some(&binding.policy.document)
        );
        assert!(config.attachments().is_empty());
    }

    #[test]
    fn test_bind_is_idempotent() {
        let auth = AuthResource::new(true, ["admin"]);
        let binder = Binder::new(&auth);
        let config = BackendConfig::new(storage());

        let once = binder.bind_all(&config, &bucket(), derived()).unwrap();
        let twice = binder.bind_all(&once, &bucket(), derived()).unwrap();
        assert_eq!(once, twice);
        assert_eq!(twice.attachments().len(), 3);
    }

    #[test]
    fn test_bind_unknown_role_fails() {
        let auth = AuthResource::new(true, Vec::<String>::new());
        let binder = Binder::new(&auth);
        let config = BackendConfig::new(storage());
        let binding = binding_for(&PrincipalClass::group("admin"));

        let err = binder
            .bind(&config, &bucket(), &binding.principal, binding.policy)
            .unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::UnknownRole {
                principal: "groupsadmin".to_string()
            }
        );
    }

    #[test]
    fn test_bind_all_is_all_or_nothing() {
        let auth = AuthResource::new(false, ["admin"]);
        let binder = Binder::new(&auth);
        let config = BackendConfig::new(storage());

        let result = binder.bind_all(&config, &bucket(), derived());
        assert!(matches!(result, Err(ConfigurationError::UnknownRole { .. })));
        assert!(config.attachments().is_empty());
    }

    #[test]
    fn test_bind_rejects_undeclared_prefix() {
        let auth = AuthResource::new(true, ["admin"]);
        let binder = Binder::new(&auth);
        let config = BackendConfig::new(storage());

        // Guests are only declared on public/*.
        let policy = Policy {
            name: "customBucketGuestPolicy".to_string(),
            document: PolicyDocument::new(statements_for_rule(
                &bucket(),
                &PathPattern::new("admin/*").unwrap(),
                &[Operation::Get],
            )),
        };
        let err = binder
            .bind(&config, &bucket(), &PrincipalClass::Guest, policy)
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::UndeclaredPath { path, .. } if path == "admin/*"));
    }

    #[test]
    fn test_bind_rejects_undeclared_action() {
        let auth = AuthResource::new(true, ["admin"]);
        let binder = Binder::new(&auth);
        let config = BackendConfig::new(storage());

        let policy = Policy {
            name: "customBucketAuthPolicy".to_string(),
            document: PolicyDocument::new(statements_for_rule(
                &bucket(),
                &PathPattern::new("admin/*").unwrap(),
                &[Operation::Get, Operation::Delete],
            )),
        };
        let err = binder
            .bind(&config, &bucket(), &PrincipalClass::Authenticated, policy)
            .unwrap_err();
        assert!(
            matches!(err, ConfigurationError::UndeclaredAction { action, .. } if action == "s3:DeleteObject")
        );
    }

    #[test]
    fn test_bind_rejects_unscoped_statement() {
        let auth = AuthResource::new(true, ["admin"]);
        let binder = Binder::new(&auth);
        let config = BackendConfig::new(storage());

        let policy = Policy {
            name: "customBucketAdminPolicy".to_string(),
            document: PolicyDocument::new(vec![Statement::allow(
                vec!["s3:GetObject".to_string()],
                vec![format!("{ARN}/*")],
            )
            .with_sid("Everything")]),
        };
        let err = binder
            .bind(&config, &bucket(), &PrincipalClass::group("admin"), policy)
            .unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::UnscopedStatement {
                policy: "customBucketAdminPolicy".to_string(),
                statement: "Everything".to_string()
            }
        );
    }

    #[test]
    fn test_bind_rejects_prefix_condition_mismatch() {
        let auth = AuthResource::new(true, ["admin"]);
        let binder = Binder::new(&auth);
        let config = BackendConfig::new(storage());

        let policy = Policy {
            name: "customBucketAuthPolicy".to_string(),
            document: PolicyDocument::new(vec![Statement::allow(
                vec!["s3:ListBucket".to_string()],
                vec![ARN.to_string()],
            )
            .with_condition(
                Operator::StringLike,
                S3_PREFIX_CONDITION_KEY,
                vec!["private/".to_string()],
            )]),
        };
        assert!(matches!(
            binder.bind(&config, &bucket(), &PrincipalClass::Authenticated, policy),
            Err(ConfigurationError::UndeclaredPath { .. })
        ));
    }

    #[test]
    fn test_bind_rejects_undeclared_bucket() {
        let auth = AuthResource::new(true, ["admin"]);
        let binder = Binder::new(&auth);
        let config = BackendConfig::new(storage());
        let other = ResolvedBucketRef {
            arn: "arn:aws:s3:::other-bucket".to_string(),
            region: "us-east-1".to_string(),
            name: "other-bucket".to_string(),
        };
        let binding = binding_for(&PrincipalClass::Authenticated);
        assert!(matches!(
            binder.bind(&config, &other, &binding.principal, binding.policy),
            Err(ConfigurationError::InvalidDescriptor(_))
        ));
    }

    #[test]
    fn test_verify_coverage_passes_after_bind_all() {
        let auth = AuthResource::new(true, ["admin"]);
        let binder = Binder::new(&auth);
        let config = binder
            .bind_all(&BackendConfig::new(storage()), &bucket(), derived())
            .unwrap();
        assert!(binder.verify_coverage(&config, &bucket()).is_ok());
    }

    #[test]
    fn test_verify_coverage_reports_missing_policy() {
        let auth = AuthResource::new(true, ["admin"]);
        let binder = Binder::new(&auth);
        let without_admin: Vec<_> = derived()
            .into_iter()
            .filter(|b| b.principal != PrincipalClass::group("admin"))
            .collect();
        let config = binder
            .bind_all(&BackendConfig::new(storage()), &bucket(), without_admin)
            .unwrap();

        assert_eq!(
            binder.verify_coverage(&config, &bucket()),
            Err(ConfigurationError::UncoveredPath {
                principal: "groupsadmin".to_string(),
                path: "admin/*".to_string()
            })
        );
    }

    #[test]
    fn test_verify_coverage_reports_partial_grant() {
        let auth = AuthResource::new(true, ["admin"]);
        let binder = Binder::new(&auth);
        let mut bindings = derived();
        for binding in &mut bindings {
            if binding.principal == PrincipalClass::group("admin") {
                // Keep only the object statement; listing is no longer granted.
                binding.policy.document.statement.truncate(1);
            }
        }
        let config = binder
            .bind_all(&BackendConfig::new(storage()), &bucket(), bindings)
            .unwrap();
        assert!(matches!(
            binder.verify_coverage(&config, &bucket()),
            Err(ConfigurationError::UncoveredPath { path, .. }) if path == "admin/*"
        ));
    }

    fn admin_write_policy(resources: &[&str]) -> Policy {
        Policy {
            name: "customBucketAdminPolicy".to_string(),
            document: PolicyDocument::new(vec![Statement::allow(
                vec!["s3:PutObject".to_string(), "s3:DeleteObject".to_string()],
                resources.iter().map(ToString::to_string).collect(),
            )]),
        }
    }

    #[rstest]
    #[case::whole_bucket_and_foreign_bucket(
        &["arn:aws:s3:::baff-demo-storage-browser-test2/admin/*", "arn:aws:s3:::baff-demo-storage-browser-test2/*", "arn:aws:s3:::other-bucket/*"],
        ConfigurationError::UnscopedStatement {
            policy: "customBucketAdminPolicy".to_string(),
            statement: "#0".to_string(),
        }
    )]
    #[case::foreign_bucket(
        &["arn:aws:s3:::baff-demo-storage-browser-test2/admin/*", "arn:aws:s3:::other-bucket/*"],
        ConfigurationError::UndeclaredPath {
            policy: "customBucketAdminPolicy".to_string(),
            principal: "groupsadmin".to_string(),
            path: "arn:aws:s3:::other-bucket/*".to_string(),
        }
    )]
    #[case::wildcard(
        &["arn:aws:s3:::baff-demo-storage-browser-test2/admin/*", "*"],
        ConfigurationError::UndeclaredPath {
            policy: "customBucketAdminPolicy".to_string(),
            principal: "groupsadmin".to_string(),
            path: "*".to_string(),
        }
    )]
    fn test_bind_checks_every_resource(
        #[case] resources: &[&str],
        #[case] expected: ConfigurationError,
    ) {
        let auth = AuthResource::new(true, ["admin"]);
        let binder = Binder::new(&auth);
        let config = BackendConfig::new(storage());

        let err = binder
            .bind(
                &config,
                &bucket(),
                &PrincipalClass::group("admin"),
                admin_write_policy(resources),
            )
            .unwrap_err();
        assert_eq!(err, expected);
    }

    #[test]
    fn test_bind_rejects_write_on_whole_bucket_even_when_prefixed() {
        let auth = AuthResource::new(true, ["admin"]);
        let binder = Binder::new(&auth);
        let config = BackendConfig::new(storage());

        let mut policy = admin_write_policy(&[
            "arn:aws:s3:::baff-demo-storage-browser-test2/admin/*",
            "arn:aws:s3:::baff-demo-storage-browser-test2/*",
        ]);
        policy.document.statement[0] = policy.document.statement[0].clone().with_condition(
            Operator::StringLike,
            S3_PREFIX_CONDITION_KEY,
            vec!["admin/".to_string(), "admin/*".to_string()],
        );

        let err = binder
            .bind(&config, &bucket(), &PrincipalClass::group("admin"), policy)
            .unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::UndeclaredAction {
                policy: "customBucketAdminPolicy".to_string(),
                principal: "groupsadmin".to_string(),
                path: format!("{ARN}/*"),
                action: "s3:PutObject".to_string(),
            }
        );
    }

    #[test]
    fn test_derived_sids_are_unique_within_a_policy() {
        let storage = StorageOutputs::from_json(
            r#"{
              "aws_region": "us-east-1",
              "bucket_name": "baff-demo-storage-browser-test2",
              "buckets": [{
                "aws_region": "us-east-1",
                "bucket_name": "baff-demo-storage-browser-test2",
                "name": "baff-demo-storage-browser-test2",
                "paths": {
                  "admin/*": { "authenticated": ["get", "list"] },
                  "private-docs/*": { "authenticated": ["get"] },
                  "private/docs/*": { "authenticated": ["get"] }
                }
              }]
            }"#,
        )
        .unwrap();
        let bindings = derive_policies(&bucket(), &storage.buckets[0], "customBucket");
        let sids: Vec<_> = bindings[0]
            .policy
            .document
            .statement
            .iter()
            .filter_map(|statement| statement.sid.as_deref())
            .collect();
        assert_eq!(sids, vec!["AdminRead", "PrivateDocsRead", "PrivateDocsRead2"]);

        let auth = AuthResource::new(true, ["admin"]);
        let binder = Binder::new(&auth);
        let config = binder
            .bind_all(&BackendConfig::new(storage), &bucket(), bindings)
            .unwrap();
        assert!(binder.verify_coverage(&config, &bucket()).is_ok());
    }
}
