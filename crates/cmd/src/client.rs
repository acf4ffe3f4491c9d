use async_trait::async_trait;
use prevbuild_core::{BuildRecord, BuildSource, Error, Filter, Secret};
use reqwest::{StatusCode, header};
use serde::de::DeserializeOwned;

use crate::types::DataResponse;

/// BitriseClient reads builds from the Bitrise REST API.
pub struct BitriseClient {
    client: reqwest::Client,
    base_url: String,
    access_token: Secret,
}

impl BitriseClient {
    pub fn new(base_url: &str, access_token: Secret) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token,
        }
    }

    async fn get<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&'static str, String)],
    ) -> Result<T, Error> {
        let response = self
            .client
            .get(url)
            .query(query)
            .header(header::ACCEPT, "application/json")
            .header(header::AUTHORIZATION, self.access_token.expose())
            .send()
            .await
            .map_err(|e| Error::Transport {
                status: None,
                message: e.to_string(),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| Error::Transport {
            status: Some(status.as_u16()),
            message: format!("failed to read response body: {e}"),
        })?;

        if status != StatusCode::OK {
            return Err(Error::Transport {
                status: Some(status.as_u16()),
                message: body,
            });
        }

        let decoded: DataResponse<T> =
            serde_json::from_str(&body).map_err(|e| Error::Decode(format!("{e}: {body}")))?;
        Ok(decoded.data)
    }
}

#[async_trait]
impl BuildSource for BitriseClient {
    async fn fetch_one(&self, app_slug: &str, build_slug: &str) -> Result<BuildRecord, Error> {
        let url = format!("{}/apps/{app_slug}/builds/{build_slug}", self.base_url);
        self.get(&url, &[]).await
    }

    async fn fetch_many(&self, app_slug: &str, filter: &Filter) -> Result<Vec<BuildRecord>, Error> {
        let url = format!("{}/apps/{app_slug}/builds", self.base_url);
        self.get(&url, &filter.query_pairs()).await
    }
}
