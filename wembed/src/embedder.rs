//! Embedding calls over an [`EmbeddingProvider`].

use std::sync::Arc;

use wprovider::{
    EmbeddingProvider, NoopOperationHooks, ProviderCall, ProviderOperation,
    ProviderOperationHooks, RetryPolicy, execute_with_timer,
};

use crate::{EmbedError, EmbeddingEntry, EmbeddingIndex, Neighbor};

#[derive(Clone)]
pub struct Embedder {
    provider: Arc<dyn EmbeddingProvider>,
    model: String,
    retry_policy: RetryPolicy,
    hooks: Arc<dyn ProviderOperationHooks>,
}

impl Embedder {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            retry_policy: RetryPolicy::default(),
            hooks: Arc::new(NoopOperationHooks),
        }
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn ProviderOperationHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn embed_one(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let mut vectors = self.embed_texts(vec![text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| EmbedError::validation("provider returned no embedding"))
    }

    /// Embeds every text, one vector per input in input order.
    pub async fn embed_many<S>(&self, texts: &[S]) -> Result<EmbeddingBatch, EmbedError>
    where
        S: AsRef<str>,
    {
        let texts: Vec<String> = texts.iter().map(|text| text.as_ref().to_string()).collect();
        if texts.is_empty() {
            return Ok(EmbeddingBatch::default());
        }

        let embeddings = self.embed_texts(texts.clone()).await?;
        Ok(EmbeddingBatch { texts, embeddings })
    }

    pub async fn nearest_neighbors(
        &self,
        query: &str,
        k: usize,
        index: &EmbeddingIndex,
    ) -> Result<Vec<Neighbor>, EmbedError> {
        let query = self.embed_one(query).await?;
        index.nearest(&query, k)
    }

    async fn embed_texts(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, EmbedError> {
        let expected = texts.len();
        let call = ProviderCall::new(self.provider.id(), ProviderOperation::Embed, &self.model);
        let vectors = execute_with_timer(&call, &self.retry_policy, self.hooks.as_ref(), |_| {
            self.provider.embed(&self.model, texts.clone())
        })
        .await?;

        if vectors.len() != expected {
            return Err(EmbedError::validation(format!(
                "provider returned {} embeddings for {expected} inputs",
                vectors.len()
            )));
        }

        Ok(vectors)
    }
}

impl std::fmt::Debug for Embedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Embedder")
            .field("provider", &self.provider.id())
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

/// Texts paired with their vectors, in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmbeddingBatch {
    texts: Vec<String>,
    embeddings: Vec<Vec<f32>>,
}

impl EmbeddingBatch {
    pub fn texts(&self) -> &[String] {
        &self.texts
    }

    pub fn embeddings(&self) -> &[Vec<f32>] {
        &self.embeddings
    }

    pub fn len(&self) -> usize {
        self.embeddings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.embeddings.is_empty()
    }

    pub fn create_index(&self) -> EmbeddingIndex {
        self.texts
            .iter()
            .zip(&self.embeddings)
            .map(|(text, embedding)| EmbeddingEntry::new(text.clone(), embedding.clone()))
            .collect()
    }

    pub fn into_index(self) -> EmbeddingIndex {
        self.texts
            .into_iter()
            .zip(self.embeddings)
            .map(|(text, embedding)| EmbeddingEntry::new(text, embedding))
            .collect()
    }
}
