use crate::metadata::MetadataExtractor;

/// Shared application state passed to all handlers.
/// The extractor only wraps a `reqwest::Client`, which is reference-counted internally.
#[derive(Clone)]
pub struct AppState {
    pub extractor: MetadataExtractor,
}
