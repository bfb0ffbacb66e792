pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliArgs;

pub use config::{LocalStorage, PreviewConfig};
pub use core::{
    etl::PreviewEngine,
    preview_pipeline::PreviewPipeline,
    transform::{apply_mapping, apply_mapping_with, severity_to_isa},
    vendor::VendorKind,
};
pub use domain::mapping::{CanonicalRole, FieldMapping};
pub use domain::model::{CanonicalEvent, EventContext, IsaPriority, RawRecord};
pub use utils::error::{MapperError, Result};
