use async_trait::async_trait;
use docent_core::context::SourceContext;
use docent_core::producer::{ContentProducer, ProducerError};
use std::path::Path;

/// Stands in for the LLM in commands that never produce content.
///
/// `status`, `seed-cache` and `index` only need the engine's view of the
/// source and output trees, so they must work without an API key.
pub struct Offline;

#[async_trait]
impl ContentProducer for Offline {
    async fn produce(
        &self,
        _path: &Path,
        _content: &str,
        _context: &SourceContext,
    ) -> Result<String, ProducerError> {
        Err(ProducerError::Other(
            "content generation is not available in this command".to_string(),
        ))
    }
}
