//! Bucket references for buckets that exist outside this backend.

use std::sync::OnceLock;

use log::debug;
use regex::Regex;

use crate::error::{ConfigurationError, Result};
use crate::types::ResolvedBucketRef;

/// Resolves a bucket name and region to a reference with a usable ARN.
pub trait BucketResolver {
    fn resolve(&self, bucket_name: &str, region: &str) -> Result<ResolvedBucketRef>;
}

fn bucket_arn_regex() -> &'static Regex {
    static BUCKET_ARN: OnceLock<Regex> = OnceLock::new();
    BUCKET_ARN.get_or_init(|| {
        Regex::new(r"^arn:(aws|aws-cn|aws-us-gov):s3:::([a-z0-9][a-z0-9.-]{1,61}[a-z0-9])$")
            .expect("bucket ARN pattern is valid")
    })
}

/// Extract the partition and bucket name from a bucket ARN.
pub fn parse_bucket_arn(arn: &str) -> Option<(&str, &str)> {
    let captures = bucket_arn_regex().captures(arn)?;
    let partition = captures.get(1)?.as_str();
    let name = captures.get(2)?.as_str();
    Some((partition, name))
}

/// A bucket imported by its attributes, without creating or owning it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedBucket {
    id: String,
    bucket: ResolvedBucketRef,
}

impl ImportedBucket {
    /// Import a bucket from its ARN and region.
    pub fn from_bucket_attributes(
        id: impl Into<String>,
        arn: impl Into<String>,
        region: impl Into<String>,
    ) -> Result<Self> {
        let arn = arn.into();
        let region = region.into();
        let name = match parse_bucket_arn(&arn) {
            Some((_, name)) => name.to_string(),
            None => {
                return Err(ConfigurationError::UnresolvedArn {
                    bucket: arn.clone(),
                    region,
                    reason: "not a bucket ARN".to_string(),
                })
            }
        };
        if region.trim().is_empty() {
            return Err(ConfigurationError::UnresolvedArn {
                bucket: name,
                region,
                reason: "region is empty".to_string(),
            });
        }

        let id = id.into();
        debug!("Imported bucket '{}' as '{}' ({})", name, id, arn);
        Ok(Self {
            id,
            bucket: ResolvedBucketRef { arn, region, name },
        })
    }

    /// Logical id of the import within the stack.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn reference(&self) -> &ResolvedBucketRef {
        &self.bucket
    }
}

impl BucketResolver for ImportedBucket {
    fn resolve(&self, bucket_name: &str, region: &str) -> Result<ResolvedBucketRef> {
        if self.bucket.name != bucket_name {
            return Err(ConfigurationError::UnresolvedArn {
                bucket: bucket_name.to_string(),
                region: region.to_string(),
                reason: format!("only '{}' is imported", self.bucket.name),
            });
        }
        if self.bucket.region != region {
            return Err(ConfigurationError::UnresolvedArn {
                bucket: bucket_name.to_string(),
                region: region.to_string(),
                reason: format!("bucket is imported in '{}'", self.bucket.region),
            });
        }
        Ok(self.bucket.clone())
    }
}
