//! Decides whether a CI build's outcome differs from the previous comparable build.
//!
//! A build is compared against the most recent finished build that ran the
//! same workflow on the same branch for the same kind of trigger.

pub mod build;
pub mod config;
pub mod error;
pub mod filter;
pub mod matcher;
pub mod pipeline;
pub mod source;
pub mod status;

pub use build::{BuildRecord, BuildType};
pub use config::{ConfigError, Secret, StepConfig, StepInputs};
pub use error::Error;
pub use filter::Filter;
pub use matcher::select_previous;
pub use pipeline::{Lookup, Report, lookup, run};
pub use source::BuildSource;
pub use status::changed;
