/// Status text of a build that finished successfully.
pub const SUCCESS_STATUS_TEXT: &str = "success";

/// Raw status code of the running build while nothing has failed.
pub const SUCCESS_STATUS_CODE: &str = "0";

/// Env var holding the status text of the previous equivalent build.
pub const ENV_PREVIOUS_BUILD_STATUS: &str = "PREVIOUS_BUILD_STATUS";

/// Env var telling whether the outcome differs from the previous build.
pub const ENV_BUILD_STATUS_CHANGED: &str = "BUILD_STATUS_CHANGED";

/// Whether the running build has failed, judged by its raw status code.
///
/// The running build reports a numeric code while finished builds report a
/// status text, so the two sides of a comparison are judged differently.
pub fn build_failed(build_status: &str) -> bool {
    build_status != SUCCESS_STATUS_CODE
}

/// Whether the outcome flipped between the previous build and the current one.
pub fn changed(current_failed: bool, previous_status_text: &str) -> bool {
    let previous_failed = previous_status_text != SUCCESS_STATUS_TEXT;
    current_failed != previous_failed
}
