use alarm_mapper::config::toml_config::SourceKind;
use alarm_mapper::core::filter::RecordFilter;
use alarm_mapper::utils::error::ErrorSeverity;
use alarm_mapper::utils::{logger, validation::Validate};
use alarm_mapper::{
    CanonicalRole, CliArgs, FieldMapping, LocalStorage, PreviewConfig, PreviewEngine,
    PreviewPipeline, VendorKind,
};
use anyhow::{bail, Context};
use clap::Parser;

const DEFAULT_OUTPUT: &str = "./preview-output";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    if args.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("Starting alarm-mapper");
    tracing::debug!("CLI args: {:?}", args);

    let config = load_config(&args)?;

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!(
        "📋 Preview '{}' ({:?} source, formats: {})",
        config.preview.name,
        config.source.r#type,
        config.output.formats.join(", ")
    );

    // 本地路徑以工作目錄為根
    let storage = LocalStorage::new(".");
    let pipeline = PreviewPipeline::new(storage, config);
    let engine = PreviewEngine::new(pipeline);

    let outcome = if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - preview is printed, nothing is written");
        engine.preview().await.and_then(|result| {
            log_mapping_summary(&engine.pipeline().effective_mapping());
            let rendered = serde_json::to_string_pretty(&result)?;
            println!("{}", rendered);
            Ok(())
        })
    } else {
        engine.run().await.map(|output_path| {
            tracing::info!("✅ Preview written to: {}", output_path);
            println!("✅ Preview written to: {}", output_path);
        })
    };

    if let Err(e) = outcome {
        tracing::error!(
            "❌ Preview failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

/// TOML file first, then command line overrides on top.
fn load_config(args: &CliArgs) -> anyhow::Result<PreviewConfig> {
    let mut config = match (&args.config, &args.vendor) {
        (Some(path), _) => PreviewConfig::from_file(path)
            .with_context(|| format!("failed to load config file '{}'", path))?,
        (None, Some(vendor)) => {
            let kind: VendorKind = vendor.parse().map_err(anyhow::Error::msg)?;
            PreviewConfig::for_vendor(kind, DEFAULT_OUTPUT)
        }
        (None, None) => bail!("either --config or --vendor is required"),
    };

    if let Some(vendor) = &args.vendor {
        config.preview.connector_type = Some(vendor.clone());
        tracing::info!("🔧 Connector type overridden to: {}", vendor);
    }

    if let Some(input) = &args.input {
        config.source.r#type = SourceKind::File;
        config.source.path = Some(input.clone());
        tracing::info!("🔧 Reading raw records from: {}", input);
    }

    for pair in &args.filters {
        let (field, value) = RecordFilter::parse_pair(pair)
            .with_context(|| format!("invalid filter '{}', expected field=value", pair))?;
        config.filters.criteria.insert(field, value);
    }

    if !args.formats.is_empty() {
        config.output.formats = args.formats.clone();
    }

    if let Some(output) = &args.output {
        config.output.path = output.clone();
    }

    Ok(config)
}

fn log_mapping_summary(mapping: &FieldMapping) {
    tracing::info!("🔄 Field Mapping:");
    for role in CanonicalRole::ALL {
        let target = mapping.get(role).unwrap_or("(default)");
        let marker = if role.is_required() && mapping.get(role).is_none() {
            " ⚠️ required"
        } else {
            ""
        };
        tracing::info!("  [{:?}] {} -> {}{}", role.group(), role.label(), target, marker);
    }
}
