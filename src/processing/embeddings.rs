//! Embedding providers: text in, fixed-dimension vector out

use crate::config::EmbeddingConfig;
use crate::error::{Result, SkillMatchError};
use log::info;
use model2vec_rs::model::StaticModel;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

/// Anything that can turn text into a vector in one shared embedding space.
///
/// Candidate summaries and job queries must go through the same provider;
/// nothing checks that at runtime.
pub trait EmbeddingProvider: Send + Sync {
    /// False until the underlying model is loaded.
    fn is_ready(&self) -> bool;

    fn embed(&self, text: &str) -> impl Future<Output = Result<Vec<f32>>> + Send;
}

/// Model2Vec static embeddings, loaded lazily from a local folder or the Hub.
pub struct Model2VecEmbedder {
    model: Option<Arc<StaticModel>>,
    model_id: String,
    normalize: bool,
}

impl Model2VecEmbedder {
    /// Create an embedder that still needs [`Self::load`].
    pub fn new(config: &EmbeddingConfig) -> Self {
        Self {
            model: None,
            model_id: config.model.clone(),
            normalize: config.normalize,
        }
    }

    pub async fn load(&mut self) -> Result<()> {
        if self.model.is_some() {
            return Ok(());
        }

        let start_time = Instant::now();
        info!("Loading Model2Vec embedding model: {}", self.model_id);

        let model_id = self.model_id.clone();
        let normalize = self.normalize;
        let model = tokio::task::spawn_blocking(move || {
            StaticModel::from_pretrained(&model_id, None, Some(normalize), None)
        })
        .await
        .map_err(|e| SkillMatchError::Embedding(format!("Model loading task failed: {}", e)))??;

        info!("Model loaded successfully in {:.2?}", start_time.elapsed());
        self.model = Some(Arc::new(model));
        Ok(())
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }
}

impl EmbeddingProvider for Model2VecEmbedder {
    fn is_ready(&self) -> bool {
        self.model.is_some()
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let model = self.model.clone().ok_or(SkillMatchError::EmbedderNotInitialized)?;
        let text = text.to_string();

        tokio::task::spawn_blocking(move || model.encode_single(&text))
            .await
            .map_err(|e| SkillMatchError::Embedding(format!("Embedding task failed: {}", e)))
    }
}
