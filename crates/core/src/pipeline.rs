use crate::classifier::{Classifier, ClassifierKind, TrainedClassifier};
use crate::config::AppConfig;
use crate::dataset::Table;
use crate::error::Error;
use crate::features::{
    AttributeCount, CharacterLength, CountMode, Extractor, FeatureCollector, NamedEntities,
    OneHotTime, Sentiment, TfIdf, Threads, TimeUnit,
};
use crate::metrics::Metric;
use crate::models::FeatureSet;
use anyhow::Context;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info};

/// Which extractors to build when no collector is imported.
#[derive(Debug, Clone, Default)]
pub struct FeatureFlags {
    pub char_length: bool,
    pub ner: bool,
    pub hashtag_count: bool,
    pub mentions_count: bool,
    pub reply_to_count: bool,
    pub photos_count: bool,
    pub url_count: bool,
    pub video_binary: bool,
    pub retweet_binary: bool,
    pub weekday: bool,
    pub month: bool,
    pub season: bool,
    pub daytime: bool,
    pub tfidf: bool,
    pub sentiment: bool,
    pub threads: bool,
    /// Absolute counts for the count attributes instead of presence flags.
    pub item_count: bool,
}

impl FeatureFlags {
    /// Extractors in their fixed column order.
    pub fn extractors(&self, config: &AppConfig) -> Vec<Extractor> {
        let cols = &config.columns;
        let mode = if self.item_count {
            CountMode::Count
        } else {
            CountMode::Boolean
        };
        let mut out = Vec::new();
        if self.char_length {
            out.push(Extractor::CharacterLength(CharacterLength::new(&cols.tweet)));
        }
        if self.ner {
            out.push(Extractor::NamedEntities(NamedEntities::new(
                &cols.tokenized_tweet,
            )));
        }
        let counts = [
            (self.hashtag_count, &cols.hashtags, mode),
            (self.mentions_count, &cols.mentions, mode),
            (self.reply_to_count, &cols.reply_to, mode),
            (self.photos_count, &cols.photos, mode),
            (self.url_count, &cols.urls, mode),
            (self.video_binary, &cols.video, CountMode::Boolean),
            (self.retweet_binary, &cols.retweet, CountMode::Boolean),
        ];
        for (enabled, column, mode) in counts {
            if enabled {
                out.push(Extractor::AttributeCount(AttributeCount::new(column, mode)));
            }
        }
        let times = [
            (self.weekday, &cols.date, TimeUnit::Weekday),
            (self.month, &cols.date, TimeUnit::Month),
            (self.season, &cols.date, TimeUnit::Season),
            (self.daytime, &cols.time, TimeUnit::Daytime),
        ];
        for (enabled, column, unit) in times {
            if enabled {
                out.push(Extractor::OneHotTime(OneHotTime::new(column, unit)));
            }
        }
        if self.tfidf {
            out.push(Extractor::TfIdf(TfIdf::new(
                &cols.tokenized_tweet,
                config.tfidf.max_features,
                config.tfidf.min_df,
            )));
        }
        if self.sentiment {
            out.push(Extractor::Sentiment(Sentiment::new(&cols.untokenized_tweet)));
        }
        if self.threads {
            out.push(Extractor::Threads(Threads::new(&cols.tweet)));
        }
        out
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExtractionOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub import_file: Option<PathBuf>,
    pub export_file: Option<PathBuf>,
    pub features: FeatureFlags,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractionSummary {
    pub rows: usize,
    pub feature_names: Vec<String>,
    pub imported: bool,
}

pub fn run_extraction(
    config: &AppConfig,
    options: &ExtractionOptions,
) -> anyhow::Result<ExtractionSummary> {
    info!("Loading {}...", options.input.display());
    let table = Table::from_path(&options.input)
        .with_context(|| format!("reading {}", options.input.display()))?;
    info!("Loaded {} rows.", table.len());

    let collector = match &options.import_file {
        Some(path) => {
            info!("Importing feature collector from {}", path.display());
            FeatureCollector::load(path)
                .with_context(|| format!("importing collector {}", path.display()))?
        }
        None => {
            let mut collector = FeatureCollector::new(options.features.extractors(config));
            info!(
                "Fitting {} feature extractors...",
                collector.extractors().len()
            );
            collector.fit(&table).context("fitting feature extractors")?;
            collector
        }
    };

    info!("Starting transform phase...");
    let features = collector.transform(&table).context("extracting features")?;
    let labels = table
        .column(&config.columns.label)
        .context("reading labels")?
        .to_vec();
    let set = FeatureSet {
        features,
        labels,
        feature_names: collector.feature_names(),
    };
    set.validate()?;
    debug!("feature names: {:?}", set.feature_names);
    set.save(&options.output)
        .with_context(|| format!("writing {}", options.output.display()))?;
    info!(
        "Transform complete. Wrote {} x {} features.",
        set.features.len(),
        set.feature_names.len()
    );

    if let Some(path) = &options.export_file {
        collector
            .save(path)
            .with_context(|| format!("exporting collector {}", path.display()))?;
        info!("Exported feature collector to {}", path.display());
    }

    Ok(ExtractionSummary {
        rows: set.features.len(),
        feature_names: set.feature_names,
        imported: options.import_file.is_some(),
    })
}

#[derive(Debug, Clone, Default)]
pub struct ClassificationOptions {
    pub input: PathBuf,
    pub seed: Option<u64>,
    pub import_file: Option<PathBuf>,
    pub export_file: Option<PathBuf>,
    pub classifier: Option<ClassifierKind>,
    /// Metrics to report, in order.
    pub metrics: Vec<Metric>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassificationReport {
    pub classifier: String,
    pub imported: bool,
    pub samples: usize,
    pub scores: Vec<(Metric, f64)>,
}

pub fn run_classification(
    config: &AppConfig,
    options: &ClassificationOptions,
) -> anyhow::Result<ClassificationReport> {
    let data = FeatureSet::load(&options.input)
        .with_context(|| format!("reading {}", options.input.display()))?;
    info!(
        "Loaded {} samples with {} features.",
        data.features.len(),
        data.feature_names.len()
    );

    let classifier = match (&options.import_file, options.classifier) {
        (Some(path), _) => {
            info!("Importing classifier from {}", path.display());
            TrainedClassifier::load(path)
                .with_context(|| format!("importing classifier {}", path.display()))?
        }
        (None, Some(kind)) => {
            let mut classifier = kind.build(&config.classifier, options.seed);
            info!("Training {}...", classifier.describe());
            classifier
                .fit(&data.features, &data.labels)
                .with_context(|| format!("training {}", classifier.describe()))?;
            classifier
        }
        (None, None) => return Err(Error::NoClassifier.into()),
    };

    let prediction = classifier.predict(&data.features).context("predicting")?;
    let scores = options
        .metrics
        .iter()
        .map(|m| m.compute(&data.labels, &prediction).map(|v| (*m, v)))
        .collect::<crate::Result<Vec<_>>>()
        .context("evaluating predictions")?;

    if let Some(path) = &options.export_file {
        classifier
            .save(path)
            .with_context(|| format!("exporting classifier {}", path.display()))?;
        info!("Exported classifier to {}", path.display());
    }

    Ok(ClassificationReport {
        classifier: classifier.describe().to_string(),
        imported: options.import_file.is_some(),
        samples: prediction.len(),
        scores,
    })
}
