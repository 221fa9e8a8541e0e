use crate::config::{AppConfig, SentimentBackend};
use anyhow::{Context, Result, anyhow};
use candle_core::{D, DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_nn::ops::softmax;
use candle_transformers::models::modernbert::{Config, ModernBertForSequenceClassification};
use hf_hub::{Repo, RepoType, api::sync::Api};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tokenizers::{Tokenizer, TruncationParams};
use tracing::info;

/// Predictions below this confidence are reported as neutral. Product policy,
/// not a model property.
const CONFIDENCE_THRESHOLD: f64 = 0.75;

/// Sentiment class assigned to a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl SentimentLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Neutral => "neutral",
            SentimentLabel::Negative => "negative",
        }
    }

    fn from_model_label(label: &str) -> Result<Self> {
        match label.to_ascii_lowercase().as_str() {
            "positive" => Ok(SentimentLabel::Positive),
            "neutral" => Ok(SentimentLabel::Neutral),
            "negative" => Ok(SentimentLabel::Negative),
            other => Err(anyhow!("Model produced unrecognized label '{}'", other)),
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of classifying a single review.
#[derive(Debug, Clone, Copy)]
pub struct SentimentPrediction {
    pub label: SentimentLabel,
    pub confidence: f64,
}

/// Sentiment backend selected at startup. Shared read-only across handlers;
/// inference is stateless so no locking is needed.
pub enum SentimentAnalyzer {
    Mock(MockAnalyzer),
    Model(Box<ModelAnalyzer>),
}

impl SentimentAnalyzer {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        match config.backend {
            SentimentBackend::Mock => Ok(SentimentAnalyzer::Mock(MockAnalyzer)),
            SentimentBackend::Model => {
                let analyzer = ModelAnalyzer::new(&config.model_id, config.max_length)?;
                Ok(SentimentAnalyzer::Model(Box::new(analyzer)))
            }
        }
    }

    pub fn predict(&self, text: &str) -> Result<SentimentPrediction> {
        match self {
            SentimentAnalyzer::Mock(mock) => Ok(mock.predict()),
            SentimentAnalyzer::Model(model) => model.predict(text),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            SentimentAnalyzer::Mock(_) => "mock",
            SentimentAnalyzer::Model(_) => "model",
        }
    }
}

/// Random predictions for integration testing without a model download.
pub struct MockAnalyzer;

impl MockAnalyzer {
    pub fn predict(&self) -> SentimentPrediction {
        let mut rng = rand::thread_rng();
        let label = match rng.gen_range(0..3) {
            0 => SentimentLabel::Positive,
            1 => SentimentLabel::Neutral,
            _ => SentimentLabel::Negative,
        };
        let confidence = (rng.gen_range(0.7..0.99) * 100.0_f64).round() / 100.0;
        SentimentPrediction { label, confidence }
    }
}

/// Pre-trained ModernBERT sequence classifier, loaded once from the HF hub.
pub struct ModelAnalyzer {
    model: ModernBertForSequenceClassification,
    tokenizer: Tokenizer,
    device: Device,
    id2label: HashMap<String, String>,
}

/// Classifier head metadata carried in the model's `config.json`.
#[derive(Deserialize)]
struct ClassifierLabels {
    #[serde(default)]
    id2label: HashMap<String, String>,
}

impl ModelAnalyzer {
    pub fn new(model_id: &str, max_length: usize) -> Result<Self> {
        let device = Device::cuda_if_available(0)?;
        info!(model_id, ?device, "Loading sentiment classifier");

        let api = Api::new()?;
        let repo = api.repo(Repo::new(model_id.to_string(), RepoType::Model));

        let config_path = repo.get("config.json")?;
        let weights_path = repo
            .get("model.safetensors")
            .or_else(|_| repo.get("pytorch_model.bin"))?;
        let tokenizer_path = repo.get("tokenizer.json")?;

        let config_str = std::fs::read_to_string(&config_path)?;
        let config: Config = serde_json::from_str(&config_str)?;
        let labels: ClassifierLabels = serde_json::from_str(&config_str)?;

        let vb = if weights_path.extension().is_some_and(|e| e == "safetensors") {
            unsafe { VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, &device)? }
        } else {
            VarBuilder::from_pth(&weights_path, DType::F32, &device)?
        };
        let model = ModernBertForSequenceClassification::load(vb, &config)
            .context("Failed to load classifier weights")?;

        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer: {e}"))?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length,
                ..Default::default()
            }))
            .map_err(|e| anyhow!("Failed to configure truncation: {e}"))?;

        Ok(Self {
            model,
            tokenizer,
            device,
            id2label: labels.id2label,
        })
    }

    pub fn predict(&self, text: &str) -> Result<SentimentPrediction> {
        let tokens = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| anyhow!("Tokenization error: {e}"))?;

        let input_ids = Tensor::new(tokens.get_ids(), &self.device)?.unsqueeze(0)?;
        let attention_mask = Tensor::new(tokens.get_attention_mask(), &self.device)?.unsqueeze(0)?;

        let logits = self.model.forward(&input_ids, &attention_mask)?;
        let pred_id = logits.argmax(D::Minus1)?.squeeze(0)?.to_scalar::<u32>()?;

        let probs = softmax(&logits, D::Minus1)?;
        let probs_vec = probs.squeeze(0)?.to_vec1::<f32>()?;
        let confidence = probs_vec.get(pred_id as usize).copied().unwrap_or(0.0) as f64;

        let predicted = self
            .id2label
            .get(&pred_id.to_string())
            .ok_or_else(|| anyhow!("Predicted class '{}' missing from id2label", pred_id))
            .and_then(|label| SentimentLabel::from_model_label(label))?;

        Ok(SentimentPrediction {
            label: resolve_label(predicted, confidence),
            confidence,
        })
    }
}

/// Collapse low-confidence predictions to neutral. The 0.75 boundary keeps the
/// predicted class: only strictly lower confidence is neutralized.
fn resolve_label(predicted: SentimentLabel, confidence: f64) -> SentimentLabel {
    if confidence < CONFIDENCE_THRESHOLD {
        SentimentLabel::Neutral
    } else {
        predicted
    }
}
