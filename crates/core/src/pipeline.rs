use tracing::{debug, info};

use crate::{
    build::BuildRecord,
    config::StepConfig,
    error::Error,
    filter::Filter,
    matcher::select_previous,
    source::BuildSource,
    status::{ENV_BUILD_STATUS_CHANGED, ENV_PREVIOUS_BUILD_STATUS, changed},
};

/// Report is the outcome of the step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Status text of the previous equivalent build, unless it was supplied
    /// as an input and no lookup happened
    pub previous_status: Option<String>,
    pub status_changed: bool,
}

impl Report {
    /// Key/value pairs to export, in export order.
    pub fn env_vars(&self) -> Vec<(&'static str, String)> {
        let mut vars = Vec::with_capacity(2);
        if let Some(previous) = &self.previous_status {
            vars.push((ENV_PREVIOUS_BUILD_STATUS, previous.clone()));
        }
        vars.push((ENV_BUILD_STATUS_CHANGED, self.status_changed.to_string()));
        vars
    }
}

/// Lookup holds every intermediate value of a previous-build search.
#[derive(Debug, Clone)]
pub struct Lookup {
    pub current: BuildRecord,
    pub filter: Filter,
    pub candidates: Vec<BuildRecord>,
    previous: Option<BuildRecord>,
}

impl Lookup {
    /// The selected previous build, if any candidate matched.
    pub fn previous(&self) -> Option<&BuildRecord> {
        self.previous.as_ref()
    }
}

/// Fetches the current build and the builds comparable to it, and selects
/// the previous equivalent one.
///
/// # Errors
///
/// Propagates errors from the build source, and returns [`Error::Decode`] if
/// the current build cannot be identified. Finding no match is not an error
/// here; see [`Lookup::previous`].
pub async fn lookup<S>(source: &S, app_slug: &str, build_slug: &str) -> Result<Lookup, Error>
where
    S: BuildSource + ?Sized,
{
    info!("Getting current build");
    let current = source.fetch_one(app_slug, build_slug).await?;
    current.validate()?;

    let filter = Filter::for_build(&current);
    info!(
        build_number = current.build_number,
        build_type = %current.build_type(),
        "Build info:\n{filter}"
    );

    info!("Getting similar builds");
    let candidates = source.fetch_many(app_slug, &filter).await?;
    info!("{} builds found", candidates.len());

    let previous = select_previous(&candidates, &current).cloned();
    match &previous {
        Some(found) => info!(
            "Found: (#{}) {}: {}",
            found.build_number, found.slug, found.status_text
        ),
        None => debug!("No equivalent finished build among {} candidates", candidates.len()),
    }

    Ok(Lookup {
        current,
        filter,
        candidates,
        previous,
    })
}

/// Runs the step: decides whether the current build's outcome differs from
/// the previous equivalent build's.
///
/// When the previous status is supplied in `config`, it is used as is and
/// `source` is never called.
///
/// # Errors
///
/// Propagates errors from [`lookup`], and returns [`Error::NoMatch`] if no
/// previous equivalent build exists.
pub async fn run<S>(config: &StepConfig, source: &S) -> Result<Report, Error>
where
    S: BuildSource + ?Sized,
{
    let current_failed = config.current_build_failed();

    if let Some(previous_status) = &config.previous_build_status {
        debug!(previous_status = %previous_status, "Previous build status supplied, skipping lookup");
        return Ok(Report {
            previous_status: None,
            status_changed: changed(current_failed, previous_status),
        });
    }

    let lookup = lookup(source, &config.app_slug, &config.build_slug).await?;
    let previous = lookup.previous().ok_or(Error::NoMatch)?;

    Ok(Report {
        previous_status: Some(previous.status_text.clone()),
        status_changed: changed(current_failed, &previous.status_text),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::config::{StepConfig, StepInputs};

    struct FakeSource {
        current: BuildRecord,
        candidates: Vec<BuildRecord>,
        calls: AtomicUsize,
    }

    impl FakeSource {
        fn new(current: BuildRecord, candidates: Vec<BuildRecord>) -> Self {
            Self {
                current,
                candidates,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl BuildSource for FakeSource {
        async fn fetch_one(&self, _app_slug: &str, build_slug: &str) -> Result<BuildRecord, Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if build_slug == self.current.slug {
                Ok(self.current.clone())
            } else {
                Err(Error::Transport {
                    status: Some(404),
                    message: "not found".into(),
                })
            }
        }

        async fn fetch_many(
            &self,
            _app_slug: &str,
            filter: &Filter,
        ) -> Result<Vec<BuildRecord>, Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert_eq!(filter.branch, self.current.branch);
            Ok(self.candidates.clone())
        }
    }

    fn record(number: i64, status: i64, status_text: &str, commit: &str) -> BuildRecord {
        BuildRecord {
            slug: format!("build-{number}"),
            branch: "main".into(),
            triggered_workflow: "wf1".into(),
            commit_hash: commit.into(),
            build_number: number,
            status,
            status_text: status_text.into(),
            triggered_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            ..Default::default()
        }
    }

    fn config(build_status: &str, previous: Option<&str>) -> StepConfig {
        StepConfig::from_inputs(StepInputs {
            app_slug: "app".into(),
            build_slug: "build-10".into(),
            build_status: build_status.into(),
            previous_build_status: previous.map(String::from),
            access_token: "token".into(),
            api_url: String::new(),
        })
        .unwrap()
    }

    fn scenario() -> FakeSource {
        FakeSource::new(
            record(10, 1, "", "abc"),
            vec![
                record(9, 0, "", "x"),
                record(8, 1, "success", "y"),
            ],
        )
    }

    #[tokio::test]
    async fn finds_previous_build_and_reports_no_change() {
        let source = scenario();
        let report = run(&config("0", None), &source).await.unwrap();

        assert_eq!(
            report,
            Report {
                previous_status: Some("success".into()),
                status_changed: false,
            }
        );
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
        assert_eq!(
            report.env_vars(),
            vec![
                ("PREVIOUS_BUILD_STATUS", "success".to_string()),
                ("BUILD_STATUS_CHANGED", "false".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn reports_change_when_current_build_fails() {
        let report = run(&config("1", None), &scenario()).await.unwrap();
        assert!(report.status_changed);
    }

    #[tokio::test]
    async fn supplied_previous_status_skips_the_lookup() {
        let source = scenario();
        let report = run(&config("1", Some("success")), &source).await.unwrap();

        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
        assert_eq!(report.previous_status, None);
        assert!(report.status_changed);
        assert_eq!(
            report.env_vars(),
            vec![("BUILD_STATUS_CHANGED", "true".to_string())]
        );
    }

    #[tokio::test]
    async fn no_equivalent_build_is_an_error() {
        let source = FakeSource::new(record(10, 1, "", "abc"), vec![record(9, 0, "", "x")]);
        let err = run(&config("0", None), &source).await.unwrap_err();
        assert_eq!(err, Error::NoMatch);
    }

    #[tokio::test]
    async fn source_errors_propagate() {
        let source = FakeSource::new(record(11, 1, "", "abc"), vec![]);
        let err = run(&config("0", None), &source).await.unwrap_err();
        assert!(matches!(err, Error::Transport { status: Some(404), .. }));
    }

    #[tokio::test]
    async fn lookup_exposes_intermediate_values() {
        let lookup = lookup(&scenario(), "app", "build-10").await.unwrap();

        assert_eq!(lookup.current.build_number, 10);
        assert_eq!(lookup.filter.trigger_event_type, "push");
        assert_eq!(lookup.candidates.len(), 2);
        assert_eq!(lookup.previous().map(|b| b.build_number), Some(8));
    }

    #[tokio::test]
    async fn unidentifiable_current_build_is_rejected() {
        let mut current = record(10, 1, "", "abc");
        current.build_number = 0;
        current.slug = "build-10".into();
        let source = FakeSource::new(current, vec![]);

        let err = lookup(&source, "app", "build-10").await.unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn selected_build_outlives_the_candidate_list() {
        let mut lookup = lookup(&scenario(), "app", "build-10").await.unwrap();
        lookup.candidates.clear();

        assert_eq!(lookup.previous().map(|b| b.build_number), Some(8));
    }
}
