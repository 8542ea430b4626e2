use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("could not build property source client: {0}")]
    Client(String),
    #[error("property search request failed: {0}")]
    Request(String),
    #[error("property source returned status {status} for `{location}`")]
    Status { status: u16, location: String },
    #[error("could not decode property source response: {0}")]
    Decode(String),
}
