use serde::Deserialize;

/// Envelope wrapping every successful API response.
#[derive(Deserialize)]
pub struct DataResponse<T> {
    pub data: T,
}
