use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub columns: ColumnConfig,
    #[serde(default)]
    pub tfidf: TfIdfConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
}

/// Column names of the preprocessed tweet table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnConfig {
    pub tweet: String,
    pub tokenized_tweet: String,
    pub untokenized_tweet: String,
    pub label: String,
    pub date: String,
    pub time: String,
    pub hashtags: String,
    pub mentions: String,
    pub reply_to: String,
    pub photos: String,
    pub urls: String,
    pub video: String,
    pub retweet: String,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            tweet: "tweet".to_string(),
            tokenized_tweet: "tweet_tokenized".to_string(),
            untokenized_tweet: "tweet".to_string(),
            label: "label".to_string(),
            date: "date".to_string(),
            time: "time".to_string(),
            hashtags: "hashtags".to_string(),
            mentions: "mentions".to_string(),
            reply_to: "reply_to".to_string(),
            photos: "photos".to_string(),
            urls: "urls".to_string(),
            video: "video".to_string(),
            retweet: "retweet".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TfIdfConfig {
    /// Keep only the most frequent terms; unlimited when absent.
    pub max_features: Option<usize>,
    pub min_df: usize,
}

impl Default for TfIdfConfig {
    fn default() -> Self {
        Self {
            max_features: None,
            min_df: 1,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub svm: SvmConfig,
    pub knn: KnnConfig,
    pub mlp: MlpConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SvmConfig {
    pub c: f64,
    /// Solver stopping tolerance.
    pub eps: f64,
}

impl Default for SvmConfig {
    fn default() -> Self {
        Self {
            c: 1.0,
            eps: 1e-4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KnnConfig {
    pub k: usize,
}

impl Default for KnnConfig {
    fn default() -> Self {
        Self { k: 10 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MlpConfig {
    pub hidden_layers: Vec<usize>,
    pub learning_rate: f64,
    /// L2 penalty.
    pub alpha: f64,
    pub max_iter: usize,
    pub batch_size: usize,
    pub tol: f64,
    pub n_iter_no_change: usize,
}

impl Default for MlpConfig {
    fn default() -> Self {
        Self {
            hidden_layers: vec![100],
            learning_rate: 0.001,
            alpha: 1e-4,
            max_iter: 200,
            batch_size: 200,
            tol: 1e-4,
            n_iter_no_change: 10,
        }
    }
}

pub fn load(path: Option<&str>) -> anyhow::Result<AppConfig> {
    let mut settings = config::Config::builder();
    if let Some(p) = path {
        settings = settings.add_source(config::File::with_name(p));
    } else {
        settings = settings.add_source(config::File::with_name("config/default").required(false));
    }
    settings = settings.add_source(config::Environment::with_prefix("TWEET").separator("__"));
    let cfg = settings.build()?;
    Ok(cfg.try_deserialize()?)
}
