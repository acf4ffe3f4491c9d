use crate::config::ConfigError;

/// Errors that can abort a previous-build lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// A required step input is missing or invalid
    Config(ConfigError),
    /// The build source could not be reached or answered with a non-2xx status
    Transport {
        /// HTTP status code, if a response was received
        status: Option<u16>,
        message: String,
    },
    /// The build source answered with a payload that could not be decoded
    Decode(String),
    /// No equivalent, finished build was found among the candidates
    NoMatch,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Config(err) => write!(f, "Invalid input: {err}"),
            Error::Transport {
                status: Some(status),
                message,
            } => write!(f, "invalid response status code: {status}\nbody: {message}"),
            Error::Transport {
                status: None,
                message,
            } => write!(f, "Request failed: {message}"),
            Error::Decode(msg) => write!(f, "Failed to decode response: {msg}"),
            Error::NoMatch => write!(f, "no equivalent build found"),
        }
    }
}

impl std::error::Error for Error {}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::Config(err)
    }
}
