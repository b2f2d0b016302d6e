//! Command-line arguments shared by the `extract-features` and
//! `run-classifier` binaries.

use clap::Parser;
use std::path::PathBuf;
use tweet_core::classifier::ClassifierKind;
use tweet_core::metrics::Metric;
use tweet_core::pipeline::{
    ClassificationOptions, ClassificationReport, ExtractionOptions, FeatureFlags,
};

#[derive(Parser, Debug)]
#[command(name = "extract-features")]
#[command(about = "Feature Extraction", long_about = None)]
pub struct ExtractArgs {
    /// Path to the input csv file
    pub input_file: PathBuf,
    /// Path to the output feature file
    pub output_file: PathBuf,
    /// Path to config TOML
    #[arg(short = 'C', long)]
    pub config: Option<String>,
    /// Create a pipeline and export it to the given location
    #[arg(short, long = "export_file")]
    pub export_file: Option<PathBuf>,
    /// Import an existing pipeline from the given location
    #[arg(short, long = "import_file")]
    pub import_file: Option<PathBuf>,
    /// Compute the month the tweet was posted
    #[arg(short = 'b', long)]
    pub month: bool,
    /// Compute the number of characters in the tweet
    #[arg(short, long = "char_length")]
    pub char_length: bool,
    /// Compute the time of day the tweet was posted
    #[arg(short, long)]
    pub daytime: bool,
    /// Count named entities in the tweet
    #[arg(short, long)]
    pub ner: bool,
    /// Compute the number of photos in the tweet
    #[arg(short, long = "photos_count")]
    pub photos_count: bool,
    /// Flag retweets
    #[arg(short, long = "retweet_binary")]
    pub retweet_binary: bool,
    /// Compute word-wise tf-idf
    #[arg(short, long)]
    pub tfidf: bool,
    /// Compute the number of URLs used in the tweet
    #[arg(short, long = "url_count")]
    pub url_count: bool,
    /// Flag tweets with a video
    #[arg(short, long = "video_binary")]
    pub video_binary: bool,
    /// Compute the day of the week the tweet was posted
    #[arg(short, long)]
    pub weekday: bool,
    /// Compute the number of hashtags in the tweet
    #[arg(long = "hashtag_count")]
    pub hashtag_count: bool,
    /// Absolute item counts instead of presence flags
    #[arg(long = "item_count")]
    pub item_count: bool,
    /// Compute the number of mentions in the tweet
    #[arg(long = "mentions_count")]
    pub mentions_count: bool,
    /// Compute the number of accounts replied to in the tweet
    #[arg(long = "reply_to_count")]
    pub reply_to_count: bool,
    /// Compute the season the tweet was posted
    #[arg(long)]
    pub season: bool,
    /// Compute the tweet sentiment
    #[arg(long)]
    pub sentiment: bool,
    /// Match tweets that are part of a thread
    #[arg(long)]
    pub threads: bool,
    /// Output JSON summary
    #[arg(long)]
    pub json: bool,
}

impl ExtractArgs {
    pub fn options(&self) -> ExtractionOptions {
        ExtractionOptions {
            input: self.input_file.clone(),
            output: self.output_file.clone(),
            import_file: self.import_file.clone(),
            export_file: self.export_file.clone(),
            features: FeatureFlags {
                char_length: self.char_length,
                ner: self.ner,
                hashtag_count: self.hashtag_count,
                mentions_count: self.mentions_count,
                reply_to_count: self.reply_to_count,
                photos_count: self.photos_count,
                url_count: self.url_count,
                video_binary: self.video_binary,
                retweet_binary: self.retweet_binary,
                weekday: self.weekday,
                month: self.month,
                season: self.season,
                daytime: self.daytime,
                tfidf: self.tfidf,
                sentiment: self.sentiment,
                threads: self.threads,
                item_count: self.item_count,
            },
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "run-classifier")]
#[command(about = "Classifier", long_about = None)]
pub struct ClassifyArgs {
    /// Path to the input feature file
    pub input_file: PathBuf,
    /// Path to config TOML
    #[arg(short = 'C', long)]
    pub config: Option<String>,
    /// Seed for the random number generator
    #[arg(short, long)]
    pub seed: Option<u64>,
    /// Export the trained classifier to the given location
    #[arg(short, long = "export_file")]
    pub export_file: Option<PathBuf>,
    /// Import a trained classifier from the given location
    #[arg(short, long = "import_file")]
    pub import_file: Option<PathBuf>,
    /// Majority class classifier
    #[arg(short, long)]
    pub majority: bool,
    /// Label-frequency classifier
    #[arg(short = 'q', long)]
    pub frequency: bool,
    /// Support vector machine classifier
    #[arg(long)]
    pub svm: bool,
    /// K-nearest-neighbour classifier
    #[arg(long)]
    pub knn: bool,
    /// Multilayer perceptron classifier
    #[arg(long)]
    pub mlp: bool,
    /// Evaluate using accuracy
    #[arg(short, long)]
    pub accuracy: bool,
    /// Evaluate using balanced accuracy
    #[arg(short, long = "balanced_accuracy")]
    pub balanced_accuracy: bool,
    /// Evaluate using informedness
    #[arg(short = 'n', long)]
    pub informedness: bool,
    /// Evaluate using Cohen's kappa
    #[arg(short, long)]
    pub kappa: bool,
    /// Evaluate using the F1 score
    #[arg(short, long = "f1_score")]
    pub f1_score: bool,
    /// Evaluate using the Matthews correlation coefficient
    #[arg(long)]
    pub mcc: bool,
    /// Output JSON report
    #[arg(long)]
    pub json: bool,
}

impl ClassifyArgs {
    /// The first selected classifier wins.
    pub fn classifier(&self) -> Option<ClassifierKind> {
        [
            (self.majority, ClassifierKind::Majority),
            (self.frequency, ClassifierKind::Frequency),
            (self.svm, ClassifierKind::Svm),
            (self.knn, ClassifierKind::Knn),
            (self.mlp, ClassifierKind::Mlp),
        ]
        .into_iter()
        .find_map(|(on, kind)| on.then_some(kind))
    }

    pub fn metrics(&self) -> Vec<Metric> {
        let selected = [
            self.accuracy,
            self.balanced_accuracy,
            self.informedness,
            self.kappa,
            self.f1_score,
            self.mcc,
        ];
        Metric::ALL
            .into_iter()
            .zip(selected)
            .filter_map(|(m, on)| on.then_some(m))
            .collect()
    }

    pub fn options(&self) -> ClassificationOptions {
        ClassificationOptions {
            input: self.input_file.clone(),
            seed: self.seed,
            import_file: self.import_file.clone(),
            export_file: self.export_file.clone(),
            classifier: self.classifier(),
            metrics: self.metrics(),
        }
    }
}

/// Plain-text report lines: the classifier when one was trained, then one
/// line per metric.
pub fn report_lines(report: &ClassificationReport) -> Vec<String> {
    let mut lines = Vec::new();
    if !report.imported {
        lines.push(format!("    {}", report.classifier));
    }
    for (metric, value) in &report.scores {
        lines.push(format!("    {}: {:?}", metric.name(), value));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn parsers_are_well_formed() {
        ExtractArgs::command().debug_assert();
        ClassifyArgs::command().debug_assert();
    }

    #[test]
    fn extraction_flags_use_underscored_names() {
        let args = ExtractArgs::try_parse_from([
            "extract-features",
            "in.csv",
            "out.json",
            "-c",
            "--hashtag_count",
            "--item_count",
            "-w",
            "-e",
            "collector.json",
        ])
        .unwrap();
        let options = args.options();
        assert!(options.features.char_length);
        assert!(options.features.hashtag_count);
        assert!(options.features.item_count);
        assert!(options.features.weekday);
        assert!(!options.features.tfidf);
        assert_eq!(options.export_file, Some(PathBuf::from("collector.json")));
    }

    #[test]
    fn first_classifier_flag_wins() {
        let args =
            ClassifyArgs::try_parse_from(["run-classifier", "x.json", "--mlp", "--svm", "-q"])
                .unwrap();
        assert_eq!(args.classifier(), Some(ClassifierKind::Frequency));
        let none = ClassifyArgs::try_parse_from(["run-classifier", "x.json"]).unwrap();
        assert_eq!(none.classifier(), None);
    }

    #[test]
    fn metrics_keep_report_order() {
        let args = ClassifyArgs::try_parse_from([
            "run-classifier",
            "x.json",
            "--mcc",
            "-k",
            "-a",
            "-s",
            "42",
        ])
        .unwrap();
        assert_eq!(
            args.metrics(),
            vec![Metric::Accuracy, Metric::CohenKappa, Metric::Mcc]
        );
        assert_eq!(args.seed, Some(42));
    }

    #[test]
    fn whole_scores_keep_a_decimal_point() {
        let report = ClassificationReport {
            classifier: "KNN classifier".to_string(),
            imported: true,
            samples: 4,
            scores: vec![(Metric::Accuracy, 1.0), (Metric::CohenKappa, 0.0)],
        };
        assert_eq!(
            report_lines(&report),
            vec!["    Accuracy: 1.0", "    Cohen's kappa score: 0.0"]
        );
    }
}
