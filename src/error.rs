//! Error types for scorecast

use thiserror::Error;

/// Result type alias for scorecast operations
pub type Result<T> = std::result::Result<T, ScorecastError>;

/// Main error type for the preprocessing and model-selection stages
#[derive(Error, Debug)]
pub enum ScorecastError {
    /// An estimator could not be trained on the given data
    #[error("Fit error in {model}: {reason}")]
    FitError {
        model: String,
        reason: String,
        #[source]
        source: Option<Box<ScorecastError>>,
    },

    /// A fitted estimator could not score the given feature matrix
    #[error("Prediction error in {model}: {reason}")]
    PredictionError {
        model: String,
        reason: String,
        #[source]
        source: Option<Box<ScorecastError>>,
    },

    /// The best candidate fell below the acceptance threshold
    #[error("No best model found: {best_model} scored {score:.4}, below the {threshold} threshold")]
    InsufficientModelQuality {
        best_model: String,
        score: f64,
        threshold: f64,
    },

    #[error("Data error: {0}")]
    DataError(String),

    #[error("Preprocessing error: {0}")]
    PreprocessingError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("Model not fitted")]
    ModelNotFitted,

    /// An error re-raised with the operation it interrupted
    #[error("{context}")]
    Context {
        context: String,
        #[source]
        source: Box<ScorecastError>,
    },
}

impl ScorecastError {
    /// Training of `model` failed because of `cause`
    pub fn fit_failed(model: impl Into<String>, cause: ScorecastError) -> Self {
        ScorecastError::FitError {
            model: model.into(),
            reason: cause.to_string(),
            source: Some(Box::new(cause)),
        }
    }

    /// Scoring of `model` failed because of `cause`
    pub fn prediction_failed(model: impl Into<String>, cause: ScorecastError) -> Self {
        ScorecastError::PredictionError {
            model: model.into(),
            reason: cause.to_string(),
            source: Some(Box::new(cause)),
        }
    }

    /// Wrap this error with the operation that was running when it surfaced
    pub fn context(self, context: impl Into<String>) -> Self {
        ScorecastError::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Innermost error, skipping every `Context` layer
    pub fn root_cause(&self) -> &ScorecastError {
        let mut current = self;
        while let ScorecastError::Context { source, .. } = current {
            current = source;
        }
        current
    }

    /// Context messages from the outermost layer inwards
    pub fn context_chain(&self) -> Vec<&str> {
        let mut chain = Vec::new();
        let mut current = self;
        while let ScorecastError::Context { context, source } = current {
            chain.push(context.as_str());
            current = source;
        }
        chain
    }

    pub fn is_quality_gate(&self) -> bool {
        matches!(self.root_cause(), ScorecastError::InsufficientModelQuality { .. })
    }
}

/// Attach context to the error side of a `Result`
pub trait ResultExt<T> {
    fn context(self, context: impl Into<String>) -> Result<T>;

    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.context(context))
    }

    fn with_context<F, S>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| e.context(f()))
    }
}

impl From<polars::error::PolarsError> for ScorecastError {
    fn from(err: polars::error::PolarsError) -> Self {
        ScorecastError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for ScorecastError {
    fn from(err: serde_json::Error) -> Self {
        ScorecastError::SerializationError(err.to_string())
    }
}

impl From<bincode::Error> for ScorecastError {
    fn from(err: bincode::Error) -> Self {
        ScorecastError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for ScorecastError {
    fn from(err: ndarray::ShapeError) -> Self {
        ScorecastError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}
