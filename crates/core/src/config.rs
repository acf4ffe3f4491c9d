use std::fmt;

use crate::status::build_failed;

/// Default Bitrise API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.bitrise.io/v0.1";

/// Secret wraps a sensitive input so that it never ends up in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Secret(value.into())
    }

    /// Returns the raw secret value.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

/// Raw step inputs, as read from flags or the environment.
#[derive(Debug, Clone, Default)]
pub struct StepInputs {
    pub app_slug: String,
    pub build_slug: String,
    pub build_status: String,
    pub previous_build_status: Option<String>,
    pub access_token: String,
    pub api_url: String,
}

/// StepConfig holds the validated inputs of the step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepConfig {
    /// Slug of the app whose builds are compared
    pub app_slug: String,
    /// Slug of the build currently running
    pub build_slug: String,
    /// Raw status code of the current build ("0" means success)
    pub build_status: String,
    /// Status text of the previous build, when a prior step already resolved it
    pub previous_build_status: Option<String>,
    /// API access token
    pub access_token: Secret,
    /// Base URL of the builds API
    pub api_url: String,
}

impl StepConfig {
    /// Validates raw inputs into a StepConfig.
    ///
    /// Required inputs must be non-empty. An empty previous build status is
    /// treated as not supplied, and an empty API URL falls back to
    /// [`DEFAULT_API_URL`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] naming the first empty required input,
    /// or [`ConfigError::InvalidValue`] if the API URL is not an http(s) URL.
    pub fn from_inputs(inputs: StepInputs) -> Result<Self, ConfigError> {
        let StepInputs {
            app_slug,
            build_slug,
            build_status,
            previous_build_status,
            access_token,
            api_url,
        } = inputs;

        let app_slug = required("app_slug", app_slug)?;
        let build_slug = required("build_slug", build_slug)?;
        let build_status = required("build_status", build_status)?;
        let access_token = required("access_token", access_token)?;

        let api_url = if api_url.trim().is_empty() {
            DEFAULT_API_URL.to_string()
        } else if api_url.starts_with("http://") || api_url.starts_with("https://") {
            api_url.trim_end_matches('/').to_string()
        } else {
            return Err(ConfigError::InvalidValue {
                field: "api_url".to_string(),
                value: api_url,
            });
        };

        Ok(StepConfig {
            app_slug,
            build_slug,
            build_status,
            previous_build_status: previous_build_status.filter(|s| !s.is_empty()),
            access_token: Secret::new(access_token),
            api_url,
        })
    }

    /// Whether the current build has failed so far, judged by its raw status code.
    pub fn current_build_failed(&self) -> bool {
        build_failed(&self.build_status)
    }
}

impl fmt::Display for StepConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "- app_slug: {}", self.app_slug)?;
        writeln!(f, "- build_slug: {}", self.build_slug)?;
        writeln!(f, "- build_status: {}", self.build_status)?;
        writeln!(
            f,
            "- previous_build_status: {}",
            self.previous_build_status.as_deref().unwrap_or("")
        )?;
        writeln!(f, "- access_token: {}", self.access_token)?;
        write!(f, "- api_url: {}", self.api_url)
    }
}

fn required(field: &str, value: String) -> Result<String, ConfigError> {
    if value.is_empty() {
        Err(ConfigError::MissingField(field.to_string()))
    } else {
        Ok(value)
    }
}

/// Errors that can occur when validating the step inputs.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Required field is missing
    MissingField(String),
    /// Field has a value that cannot be used
    InvalidValue { field: String, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingField(field) => write!(f, "Missing required field: {field}"),
            ConfigError::InvalidValue { field, value } => {
                write!(f, "Invalid value for {field}: {value}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
