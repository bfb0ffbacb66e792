pub use crate::app::pipelines::preview_pipeline::{PreviewPipeline, SourcePayload};
