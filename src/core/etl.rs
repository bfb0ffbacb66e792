use crate::core::{Pipeline, PreviewResult};
use crate::utils::error::Result;

pub struct PreviewEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> PreviewEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    /// Extract and transform only; nothing is written.
    pub async fn preview(&self) -> Result<PreviewResult> {
        tracing::info!("Extracting raw alarms...");
        let raw_data = self.pipeline.extract().await?;
        tracing::info!("Extracted {} records", raw_data.len());

        tracing::info!("Mapping to canonical events...");
        let result = self.pipeline.transform(raw_data).await?;
        tracing::info!(
            "Mapped {} of {} records",
            result.shown_records,
            result.total_records
        );

        Ok(result)
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("Starting preview run...");
        let result = self.preview().await?;

        tracing::info!("Writing preview...");
        let output_path = self.pipeline.load(result).await?;
        tracing::info!("Output saved to: {}", output_path);

        Ok(output_path)
    }
}
