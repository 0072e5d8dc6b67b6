//! Statement synthesis (deterministic IAM JSON generation)
//!
//! Translates a declared path rule into IAM statements. Object-level actions
//! operate on keys and take object ARNs; `s3:ListBucket` operates on the
//! bucket itself and is narrowed with an `s3:prefix` condition instead.

use std::collections::BTreeSet;

use convert_case::{Case, Casing};

use crate::types::{
    Operation, Operator, PathPattern, ResolvedBucketRef, Statement, S3_PREFIX_CONDITION_KEY,
};

/// Whether a storage action targets objects or the bucket resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionLevel {
    Object,
    Bucket,
}

/// Provider action name and level for an advertised operation.
pub fn provider_action(operation: Operation) -> (&'static str, ActionLevel) {
    match operation {
        Operation::Get => ("s3:GetObject", ActionLevel::Object),
        Operation::List => ("s3:ListBucket", ActionLevel::Bucket),
        Operation::Write => ("s3:PutObject", ActionLevel::Object),
        Operation::Delete => ("s3:DeleteObject", ActionLevel::Object),
    }
}

/// Advertised operation granted by a provider action, if it is one we map.
pub fn operation_for_action(action: &str) -> Option<Operation> {
    Operation::ALL
        .into_iter()
        .find(|op| provider_action(*op).0 == action)
}

/// Build the statements granting `operations` on `pattern`.
///
/// Read-only rules collapse into one statement over the bucket and its
/// objects, narrowed by prefix. Rules that write or delete keep object-level
/// actions on `<bucket>/<pattern>` and bucket listing in a second statement.
pub fn statements_for_rule(
    bucket: &ResolvedBucketRef,
    pattern: &PathPattern,
    operations: &[Operation],
) -> Vec<Statement> {
    let operations: BTreeSet<Operation> = operations.iter().copied().collect();
    if operations.is_empty() {
        return Vec::new();
    }

    if operations.iter().any(|op| op.is_mutating()) {
        split_statements(bucket, pattern, &operations)
    } else {
        vec![read_only_statement(bucket, pattern, &operations)]
    }
}

fn read_only_statement(
    bucket: &ResolvedBucketRef,
    pattern: &PathPattern,
    operations: &BTreeSet<Operation>,
) -> Statement {
    let actions = operations
        .iter()
        .map(|op| provider_action(*op).0.to_string())
        .collect();
    Statement::allow(actions, vec![bucket.arn.clone(), bucket.all_objects_arn()])
        .with_sid(statement_sid(pattern, "read"))
        .with_condition(
            Operator::StringLike,
            S3_PREFIX_CONDITION_KEY,
            vec![pattern.prefix().to_string(), pattern.to_string()],
        )
}

fn split_statements(
    bucket: &ResolvedBucketRef,
    pattern: &PathPattern,
    operations: &BTreeSet<Operation>,
) -> Vec<Statement> {
    let (object_actions, bucket_actions): (Vec<_>, Vec<_>) = operations
        .iter()
        .map(|op| provider_action(*op))
        .partition(|(_, level)| *level == ActionLevel::Object);

    let mut statements = Vec::with_capacity(2);
    if !object_actions.is_empty() {
        statements.push(
            Statement::allow(
                object_actions
                    .into_iter()
                    .map(|(name, _)| name.to_string())
                    .collect(),
                vec![bucket.object_arn(pattern)],
            )
            .with_sid(statement_sid(pattern, "object access")),
        );
    }
    if !bucket_actions.is_empty() {
        statements.push(
            Statement::allow(
                bucket_actions
                    .into_iter()
                    .map(|(name, _)| name.to_string())
                    .collect(),
                vec![bucket.arn.clone(), bucket.all_objects_arn()],
            )
            .with_sid(statement_sid(pattern, "list"))
            .with_condition(
                Operator::StringLike,
                S3_PREFIX_CONDITION_KEY,
                vec![pattern.to_string(), pattern.prefix().to_string()],
            ),
        );
    }
    statements
}

/// Path patterns a statement grants access to.
///
/// Object resources under the bucket contribute their key pattern and
/// `s3:prefix` condition values contribute the partition they name. The
/// bare bucket ARN and `<bucket>/*` carry no scope of their own.
pub fn statement_scope(bucket: &ResolvedBucketRef, statement: &Statement) -> BTreeSet<String> {
    let mut scope = BTreeSet::new();
    let object_root = format!("{}/", bucket.arn);

    for resource in &statement.resource {
        if let Some(key) = resource.strip_prefix(&object_root) {
            if key == "*" {
                continue;
            }
            scope.insert(
                PathPattern::from_scope(key).map_or_else(|| key.to_string(), |p| p.to_string()),
            );
        }
    }
    for value in statement.prefix_condition_values() {
        scope.insert(
            PathPattern::from_scope(value).map_or_else(|| value.to_string(), |p| p.to_string()),
        );
    }
    scope
}

/// Statement id such as `AdminObjectAccess` or `PublicRead`. IAM only
/// accepts ASCII alphanumerics here.
fn statement_sid(pattern: &PathPattern, shape: &str) -> String {
    let base = pattern.prefix().replace('/', " ");
    format!("{base} {shape}")
        .to_case(Case::Pascal)
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect()
}

/// Suffix repeated statement ids with a counter so each is unique in its policy.
pub(crate) fn dedupe_sids(statements: &mut [Statement]) {
    let mut seen = BTreeSet::new();
    for statement in statements {
        let Some(sid) = statement.sid.take() else {
            continue;
        };
        let mut candidate = sid.clone();
        let mut counter = 2;
        while !seen.insert(candidate.clone()) {
            candidate = format!("{sid}{counter}");
            counter += 1;
        }
        statement.sid = Some(candidate);
    }
}
