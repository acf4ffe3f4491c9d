use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

use crate::error::Error;

/// BuildType is the event class that started a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildType {
    /// Triggered by pushing a tag
    Tag,
    /// Triggered by a pull request update
    PullRequest,
    /// Started by hand, without a commit
    Manual,
    /// Triggered by a code push
    Push,
}

impl BuildType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildType::Tag => "tag",
            BuildType::PullRequest => "pull-request",
            BuildType::Manual => "manual",
            BuildType::Push => "push",
        }
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// BuildRecord is the metadata of a single build, as returned by the builds API.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct BuildRecord {
    #[serde(deserialize_with = "null_as_default")]
    pub tag: String,
    #[serde(deserialize_with = "null_as_default")]
    pub slug: String,
    #[serde(deserialize_with = "null_as_default")]
    pub branch: String,
    /// 0 while the build is running, nonzero once it finished
    #[serde(deserialize_with = "null_as_default")]
    pub status: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub status_text: String,
    #[serde(deserialize_with = "null_as_default")]
    pub commit_hash: String,
    #[serde(deserialize_with = "null_as_default")]
    pub triggered_at: DateTime<Utc>,
    #[serde(deserialize_with = "null_as_default")]
    pub build_number: i64,
    pub pull_request_id: Option<i64>,
    #[serde(deserialize_with = "null_as_default")]
    pub triggered_workflow: String,
    #[serde(deserialize_with = "null_as_default")]
    pub pull_request_target_branch: String,
}

impl BuildRecord {
    /// Classifies the build by the event that triggered it.
    ///
    /// The checks overlap in real data (a tag build may still carry a commit
    /// hash and pull request metadata), so the order is significant: tag,
    /// then pull request, then manual, then push.
    pub fn build_type(&self) -> BuildType {
        if !self.tag.is_empty() {
            BuildType::Tag
        } else if self.pull_request_id.is_some_and(|id| id > 0)
            || !self.pull_request_target_branch.is_empty()
        {
            BuildType::PullRequest
        } else if self.commit_hash.is_empty() {
            BuildType::Manual
        } else {
            BuildType::Push
        }
    }

    /// Whether the build is still running.
    pub fn in_progress(&self) -> bool {
        self.status == 0
    }

    /// Two builds are equivalent when they ran the same workflow on the same
    /// branch for the same kind of trigger.
    pub fn equivalent(&self, other: &BuildRecord) -> bool {
        self.branch == other.branch
            && self.triggered_workflow == other.triggered_workflow
            && self.build_type() == other.build_type()
    }

    /// Checks that the record can identify the current build.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if the slug is empty or the build number is not positive.
    pub fn validate(&self) -> Result<(), Error> {
        if self.slug.is_empty() {
            return Err(Error::Decode("build has no slug".to_string()));
        }
        if self.build_number <= 0 {
            return Err(Error::Decode(format!(
                "build {} has invalid build number: {}",
                self.slug, self.build_number
            )));
        }
        Ok(())
    }
}

// The API sends `null` for unset fields; they decode to the zero value.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
