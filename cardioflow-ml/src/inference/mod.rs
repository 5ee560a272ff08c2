//! Predictor abstraction consumed by evaluation and the risk form.

pub mod predictor;

pub use predictor::{
    FallbackPredictor, LoadedModel, ModelArtifact, Predictor, load_model, select_predictor,
};
