//! BGE sentence embedder (BERT encoder, CLS pooling, unit-length output).
//!
//! Use [`BgeConfig::stub`] to run without model files.

pub mod config;


pub use config::BgeConfig;

use candle_core::{DType, Device, IndexOp, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use tokenizers::Tokenizer;
use tracing::{debug, info, warn};

use super::Embedder;
use super::device::select_device;
use super::error::EmbeddingError;
use super::utils::{l2_normalize, load_batch_tokenizer, stub_vector};

enum EmbedderBackend {
    Model {
        model: Box<BertModel>,
        tokenizer: Box<Tokenizer>,
        device: Device,
    },
    Stub,
}

/// Text embedder backed by a BGE checkpoint (or a deterministic stub).
pub struct BgeEmbedder {
    backend: EmbedderBackend,
    config: BgeConfig,
}

impl std::fmt::Debug for BgeEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BgeEmbedder")
            .field(
                "backend",
                &match &self.backend {
                    EmbedderBackend::Model { device, .. } => format!("Model({device:?})"),
                    EmbedderBackend::Stub => "Stub".to_string(),
                },
            )
            .field("embedding_dim", &self.config.embedding_dim)
            .field("max_seq_len", &self.config.max_seq_len)
            .finish()
    }
}

impl BgeEmbedder {
    pub fn load(config: BgeConfig) -> Result<Self, EmbeddingError> {
        config.validate()?;

        if config.stub {
            warn!("Embedder running in STUB mode; vectors carry no meaning");
            return Ok(Self {
                backend: EmbedderBackend::Stub,
                config,
            });
        }

        let device = select_device()?;
        debug!(?device, "Selected compute device for embedder");

        let model_config: BertConfig =
            serde_json::from_str(&std::fs::read_to_string(config.config_path())?).map_err(|e| {
                EmbeddingError::ModelLoadFailed {
                    reason: format!("failed to parse config.json: {e}"),
                }
            })?;

        if model_config.hidden_size != config.embedding_dim {
            return Err(EmbeddingError::InvalidConfig {
                reason: format!(
                    "embedding_dim ({}) does not match model hidden_size ({})",
                    config.embedding_dim, model_config.hidden_size
                ),
            });
        }

        // SAFETY: the weights file is not modified while mapped.
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[config.weights_path()], DType::F32, &device)?
        };
        let model = if vb.contains_tensor("bert.embeddings.word_embeddings.weight") {
            BertModel::load(vb.pp("bert"), &model_config)
        } else {
            BertModel::load(vb, &model_config)
        }
        .map_err(|e| EmbeddingError::ModelLoadFailed {
            reason: format!("failed to load BERT weights: {e}"),
        })?;

        let tokenizer = load_batch_tokenizer(&config.model_dir, config.max_seq_len).map_err(|e| {
            EmbeddingError::TokenizationFailed {
                reason: format!("failed to load tokenizer: {e}"),
            }
        })?;

        info!(
            model_dir = %config.model_dir.display(),
            embedding_dim = config.embedding_dim,
            max_seq_len = config.max_seq_len,
            "Embedding model loaded"
        );

        Ok(Self {
            backend: EmbedderBackend::Model {
                model: Box::new(model),
                tokenizer: Box::new(tokenizer),
                device,
            },
            config,
        })
    }

    pub fn is_stub(&self) -> bool {
        matches!(self.backend, EmbedderBackend::Stub)
    }

    pub fn config(&self) -> &BgeConfig {
        &self.config
    }

    fn forward_batch(
        &self,
        texts: &[&str],
        model: &BertModel,
        tokenizer: &Tokenizer,
        device: &Device,
    ) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let encodings = tokenizer.encode_batch(texts.to_vec(), true).map_err(|e| {
            EmbeddingError::TokenizationFailed {
                reason: e.to_string(),
            }
        })?;

        let mut ids = Vec::with_capacity(encodings.len());
        let mut masks = Vec::with_capacity(encodings.len());
        for encoding in &encodings {
            ids.push(Tensor::new(encoding.get_ids(), device)?);
            masks.push(Tensor::new(encoding.get_attention_mask(), device)?);
        }

        let input_ids = Tensor::stack(&ids, 0)?;
        let attention_mask = Tensor::stack(&masks, 0)?;
        let token_type_ids = input_ids.zeros_like()?;

        debug!(
            batch = texts.len(),
            seq_len = input_ids.dim(1)?,
            "Embedding forward pass"
        );

        // [batch, seq, hidden] -> CLS row per input
        let hidden = model.forward(&input_ids, &token_type_ids, Some(&attention_mask))?;
        let cls = hidden.i((.., 0, ..))?.to_dtype(DType::F32)?;

        Ok(cls.to_vec2::<f32>()?.into_iter().map(l2_normalize).collect())
    }
}

impl Embedder for BgeEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut out = self.embed_batch(&[text])?;
        out.pop().ok_or_else(|| EmbeddingError::InferenceFailed {
            reason: "model returned no embedding".to_string(),
        })
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        match &self.backend {
            EmbedderBackend::Model {
                model,
                tokenizer,
                device,
            } => self.forward_batch(texts, model, tokenizer, device),
            EmbedderBackend::Stub => Ok(texts
                .iter()
                .map(|text| stub_vector(text, self.config.embedding_dim))
                .collect()),
        }
    }

    fn embedding_dim(&self) -> usize {
        self.config.embedding_dim
    }

    fn is_stub(&self) -> bool {
        BgeEmbedder::is_stub(self)
    }
}
