//! Core prediction logic
//!
//! - `features`: input schema, record, builder
//! - `model`: opaque regressor/classifier and the predictor wrapping them
//! - `derive`: closed-form metrics from height, storeys and predictions
//! - `presentation`: widget view of a finished prediction
//! - `pipeline`: one request end to end

pub mod error;
pub mod features;
pub mod model;
pub mod derive;
pub mod presentation;
pub mod pipeline;

pub use error::{PipelineError, PipelineResult};
pub use pipeline::{run, PipelineOutput};
