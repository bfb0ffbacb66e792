pub mod preview_pipeline;
