//! The search service as seen from the page: one GET, one markup body back.

use crate::error::FetchError;

/// Fetches rendered search results.
///
/// The body is an opaque markup fragment produced by the backend's templates;
/// nothing here parses it. Futures are not required to be `Send` since the
/// panel runs on the page's single UI thread.
#[allow(async_fn_in_trait)]
pub trait SearchBackend {
    /// GET `url` and return the response body. A non-success status must come
    /// back as [`FetchError::Status`], not as `Ok`.
    async fn fetch_results(&self, url: &str) -> Result<String, FetchError>;
}
