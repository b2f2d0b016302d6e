use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("missing column: {0}")]
    MissingColumn(String),
    #[error("malformed csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0} used before fit")]
    NotFitted(String),
    #[error("cannot train on an empty data set")]
    EmptyTrainingSet,
    #[error("{features} feature rows but {labels} labels")]
    LabelMismatch { features: usize, labels: usize },
    #[error("expected {expected} features per row, found {found}")]
    DimensionMismatch { expected: usize, found: usize },
    #[error("{predictions} predictions for {labels} labels")]
    PredictionMismatch { predictions: usize, labels: usize },
    #[error("cannot evaluate on an empty data set")]
    EmptyEvaluation,
    #[error("svm: {0}")]
    Svm(#[from] linfa_svm::SvmError),
    #[error("nearest-neighbour index: {0}")]
    IndexBuild(#[from] linfa_nn::BuildError),
    #[error("nearest-neighbour query: {0}")]
    Neighbours(#[from] linfa_nn::NnError),
    #[error("matrix shape: {0}")]
    Shape(#[from] ndarray::ShapeError),
    #[error("no classifier selected")]
    NoClassifier,
}

pub type Result<T> = std::result::Result<T, Error>;
