use std::future::Future;

use crate::domain::analysis::entities::AnalysisError;

/// Text-completion backend used by the AI analysis path.
pub trait LLMClient: Send + Sync {
    /// Validates credentials and prepares the connection. A missing key is
    /// reported as [`AnalysisError::Configuration`].
    fn connect(&self) -> impl Future<Output = Result<(), AnalysisError>> + Send;

    fn generate_with_text(
        &self,
        prompt: String,
        response_schema: serde_json::Value,
    ) -> impl Future<Output = Result<String, AnalysisError>> + Send;
}
