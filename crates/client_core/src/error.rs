use thiserror::Error;

/// Roster retrieval failed. The rendered list must not be partially updated
/// from a failed fetch; the client shows the unavailable state instead.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request never completed, or the service answered with an error
    /// status.
    #[error("roster request failed: {0}")]
    Transport(#[source] reqwest::Error),
    /// The response arrived but its body was not a valid roster document.
    #[error("roster response could not be decoded: {0}")]
    Decode(#[source] reqwest::Error),
}

/// A signup or unregister attempt that did not complete normally.
#[derive(Debug, Error)]
pub enum MutationError {
    /// The service explicitly declined the mutation (capacity exceeded,
    /// unknown participant, unknown activity). Carries the server's `detail`
    /// text when the failure body included one.
    #[error("mutation declined by service: {}", .detail.as_deref().unwrap_or("no detail"))]
    Rejected { detail: Option<String> },
    /// The request never completed, or a response body could not be decoded.
    #[error("mutation request failed: {0}")]
    Transport(#[source] reqwest::Error),
}
