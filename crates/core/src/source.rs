use async_trait::async_trait;

use crate::{build::BuildRecord, error::Error, filter::Filter};

/// BuildSource fetches build metadata from the CI service.
///
/// Failures are reported as [`Error::Transport`] when the service cannot be
/// reached or answers with an error status, and as [`Error::Decode`] when the
/// payload is malformed.
#[async_trait]
pub trait BuildSource {
    /// Fetches a single build of an app.
    async fn fetch_one(&self, app_slug: &str, build_slug: &str) -> Result<BuildRecord, Error>;

    /// Lists the builds of an app matching `filter`.
    ///
    /// Implementations must return the builds sorted by creation time,
    /// ascending. [`select_previous`](crate::matcher::select_previous) relies
    /// on this order and does not sort on its own.
    async fn fetch_many(&self, app_slug: &str, filter: &Filter) -> Result<Vec<BuildRecord>, Error>;
}
