pub mod etl;
pub mod filter;
pub mod loki;
pub mod preview_pipeline;
pub mod transform;
pub mod vendor;

pub use crate::domain::model::{CanonicalEvent, PreviewResult, RawRecord};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
