use std::fmt;

use crate::build::{BuildRecord, BuildType};

/// Length of the window searched for a previous build, in seconds.
pub const LOOKBACK_SECS: i64 = 24 * 60 * 60;

/// Sort directive sent with every listing query.
///
/// Previous-build selection scans candidates in the order they are returned,
/// so the listing must always be sorted by creation time.
pub const SORT_BY_CREATED_AT: &str = "created_at";

/// Filter describes the builds comparable to a given build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    /// Upper bound of the window, epoch seconds
    pub before: i64,
    /// Lower bound of the window, epoch seconds
    pub after: i64,
    /// Maximum number of builds to return, server default when unset
    pub limit: Option<u32>,
    pub branch: String,
    pub workflow: String,
    pub pull_request_id: Option<i64>,
    pub trigger_event_type: &'static str,
}

impl Filter {
    /// Builds the query for earlier builds like `build`: same workflow and
    /// branch, same trigger event, triggered within the last day before it.
    ///
    /// Manual builds are looked up as pushes, the API has no separate event
    /// type for them.
    pub fn for_build(build: &BuildRecord) -> Self {
        let before = build.triggered_at.timestamp();
        let build_type = build.build_type();

        let (trigger_event_type, pull_request_id) = match build_type {
            BuildType::Tag => ("tag", None),
            BuildType::PullRequest => ("pull-request", build.pull_request_id),
            BuildType::Manual | BuildType::Push => ("push", None),
        };

        Filter {
            before,
            after: before - LOOKBACK_SECS,
            limit: None,
            branch: build.branch.clone(),
            workflow: build.triggered_workflow.clone(),
            pull_request_id,
            trigger_event_type,
        }
    }

    /// Renders the filter as URL query parameters, leaving out unset values.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();

        if self.before != 0 {
            pairs.push(("before", self.before.to_string()));
        }
        if self.after != 0 {
            pairs.push(("after", self.after.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if !self.branch.is_empty() {
            pairs.push(("branch", self.branch.clone()));
        }
        pairs.push(("sort_by", SORT_BY_CREATED_AT.to_string()));
        if !self.workflow.is_empty() {
            pairs.push(("workflow", self.workflow.clone()));
        }
        if let Some(id) = self.pull_request_id.filter(|id| *id != 0) {
            pairs.push(("pull_request_id", id.to_string()));
        }
        if !self.trigger_event_type.is_empty() {
            pairs.push(("trigger_event_type", self.trigger_event_type.to_string()));
        }

        pairs
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "- branch: {}", self.branch)?;
        writeln!(f, "- workflow: {}", self.workflow)?;
        writeln!(f, "- pull request ID: {}", self.pull_request_id.unwrap_or(0))?;
        write!(f, "- event type: {}", self.trigger_event_type)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn build() -> BuildRecord {
        BuildRecord {
            branch: "main".into(),
            triggered_workflow: "primary".into(),
            commit_hash: "abc".into(),
            triggered_at: Utc.with_ymd_and_hms(2024, 3, 1, 10, 15, 0).unwrap(),
            ..Default::default()
        }
    }

    #[test]
    fn push_filter_covers_the_previous_day() {
        let filter = Filter::for_build(&build());

        assert_eq!(filter.before, 1_709_288_100);
        assert_eq!(filter.after, 1_709_288_100 - 86_400);
        assert_eq!(filter.branch, "main");
        assert_eq!(filter.workflow, "primary");
        assert_eq!(filter.trigger_event_type, "push");
        assert_eq!(filter.pull_request_id, None);
        assert_eq!(filter.limit, None);
    }

    #[test]
    fn manual_builds_are_queried_as_push() {
        let manual = BuildRecord {
            commit_hash: String::new(),
            ..build()
        };
        assert_eq!(manual.build_type(), BuildType::Manual);
        assert_eq!(Filter::for_build(&manual).trigger_event_type, "push");
    }

    #[test]
    fn tag_filter_has_no_pull_request_id() {
        let tagged = BuildRecord {
            tag: "v2.1.0".into(),
            pull_request_id: Some(7),
            ..build()
        };
        let filter = Filter::for_build(&tagged);
        assert_eq!(filter.trigger_event_type, "tag");
        assert_eq!(filter.pull_request_id, None);
    }

    #[test]
    fn pull_request_filter_carries_the_id() {
        let pr = BuildRecord {
            pull_request_id: Some(42),
            pull_request_target_branch: "main".into(),
            ..build()
        };
        let filter = Filter::for_build(&pr);
        assert_eq!(filter.trigger_event_type, "pull-request");
        assert_eq!(filter.pull_request_id, Some(42));
    }

    #[test]
    fn pull_request_without_id_leaves_it_unset() {
        let pr = BuildRecord {
            pull_request_target_branch: "main".into(),
            ..build()
        };
        let filter = Filter::for_build(&pr);
        assert_eq!(filter.trigger_event_type, "pull-request");
        assert_eq!(filter.pull_request_id, None);
        assert!(!filter.query_pairs().iter().any(|(k, _)| *k == "pull_request_id"));
    }

    #[test]
    fn query_pairs_always_sort_by_creation() {
        let pr = BuildRecord {
            pull_request_id: Some(42),
            ..build()
        };
        let pairs = Filter::for_build(&pr).query_pairs();

        assert_eq!(
            pairs,
            vec![
                ("before", "1709288100".to_string()),
                ("after", "1709201700".to_string()),
                ("branch", "main".to_string()),
                ("sort_by", "created_at".to_string()),
                ("workflow", "primary".to_string()),
                ("pull_request_id", "42".to_string()),
                ("trigger_event_type", "pull-request".to_string()),
            ]
        );
    }

    #[test]
    fn query_pairs_skip_empty_values() {
        let filter = Filter {
            before: 0,
            after: 0,
            limit: Some(10),
            branch: String::new(),
            workflow: String::new(),
            pull_request_id: None,
            trigger_event_type: "push",
        };
        assert_eq!(
            filter.query_pairs(),
            vec![
                ("limit", "10".to_string()),
                ("sort_by", "created_at".to_string()),
                ("trigger_event_type", "push".to_string()),
            ]
        );
    }

    #[test]
    fn display_lists_the_query() {
        let rendered = Filter::for_build(&build()).to_string();
        assert_eq!(
            rendered,
            "- branch: main\n- workflow: primary\n- pull request ID: 0\n- event type: push"
        );
    }
}
