use crate::config::toml_config::{PreviewConfig, SourceKind};
use crate::core::filter::{available_fields, RecordFilter};
use crate::core::loki::LokiEntry;
use crate::core::transform::apply_mapping_with;
use crate::core::vendor::{resolve_mapping, samples_for, VendorKind};
use crate::core::{ConfigProvider, Pipeline, PreviewResult, RawRecord, Storage};
use crate::domain::mapping::FieldMapping;
use crate::domain::model::{value_to_string, CanonicalEvent};
use crate::utils::error::{MapperError, Result};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use std::sync::Mutex;

const CSV_HEADER: [&str; 16] = [
    "timestamp",
    "message",
    "severity",
    "isa_priority",
    "area",
    "equipment",
    "alarm_type",
    "source",
    "connector_id",
    "state",
    "value",
    "threshold",
    "priority",
    "vendor_alarm_id",
    "ack_required",
    "shelved",
];

/// What a source handed back besides the raw records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourcePayload {
    pub records: Vec<RawRecord>,
    pub mapping: Option<FieldMapping>,
    pub connector_type: Option<String>,
}

impl SourcePayload {
    /// Accepts either a JSON array of records or a transform config document
    /// (`sample_raw`, optional `mapping` and `connector_type`).
    pub fn from_json(value: Value) -> Result<Self> {
        match value {
            Value::Array(items) => Ok(Self {
                records: collect_records(items),
                ..Self::default()
            }),
            Value::Object(mut obj) => {
                let samples = obj.remove("sample_raw").ok_or_else(|| MapperError::SourceError {
                    message: "object payload has no `sample_raw` field".to_string(),
                })?;
                let Value::Array(items) = samples else {
                    return Err(MapperError::SourceError {
                        message: "`sample_raw` is not an array".to_string(),
                    });
                };
                let mapping = match obj.remove("mapping") {
                    Some(Value::Null) | None => None,
                    Some(m) => Some(serde_json::from_value(m)?),
                };
                let connector_type = obj
                    .get("connector_type")
                    .and_then(Value::as_str)
                    .map(str::to_string);

                Ok(Self {
                    records: collect_records(items),
                    mapping,
                    connector_type,
                })
            }
            other => Err(MapperError::SourceError {
                message: format!("expected an array or object, got {}", json_kind(&other)),
            }),
        }
    }
}

fn collect_records(items: Vec<Value>) -> Vec<RawRecord> {
    let total = items.len();
    let records: Vec<RawRecord> = items.into_iter().filter_map(RawRecord::from_value).collect();
    if records.len() < total {
        tracing::warn!(
            "Skipped {} non-object entries in source payload",
            total - records.len()
        );
    }
    records
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[derive(Serialize)]
struct PreviewDocument<'a> {
    name: &'a str,
    connector_type: Option<&'a str>,
    mapping: &'a FieldMapping,
    filters: &'a RecordFilter,
    #[serde(flatten)]
    result: &'a PreviewResult,
}

/// Extracts raw alarms from the configured source, maps them onto canonical
/// events and writes the preview in the requested formats.
pub struct PreviewPipeline<S: Storage> {
    pub(crate) storage: S,
    pub(crate) config: PreviewConfig,
    pub(crate) client: Client,
    received_at: DateTime<Utc>,
    // source 帶回來的 mapping / connector type
    remote: Mutex<Option<SourcePayload>>,
}

impl<S: Storage> PreviewPipeline<S> {
    pub fn new(storage: S, config: PreviewConfig) -> Self {
        Self {
            storage,
            config,
            client: Client::new(),
            received_at: Utc::now(),
            remote: Mutex::new(None),
        }
    }

    /// Fixes the fallback time used for unparseable Loki timestamps.
    pub fn with_received_at(mut self, received_at: DateTime<Utc>) -> Self {
        self.received_at = received_at;
        self
    }

    pub fn config(&self) -> &PreviewConfig {
        &self.config
    }

    fn remote_meta(&self) -> (Option<FieldMapping>, Option<String>) {
        self.remote
            .lock()
            .ok()
            .and_then(|guard| {
                guard
                    .as_ref()
                    .map(|p| (p.mapping.clone(), p.connector_type.clone()))
            })
            .unwrap_or_default()
    }

    /// Connector type from the config, else whatever the source reported.
    pub fn vendor(&self) -> Option<VendorKind> {
        if let Ok(Some(kind)) = self.config.vendor() {
            return Some(kind);
        }
        let (_, remote_type) = self.remote_meta();
        remote_type.and_then(|t| t.parse().ok())
    }

    /// Vendor defaults, then the mapping delivered by the source, then `[mapping]`.
    pub fn effective_mapping(&self) -> FieldMapping {
        let (remote_mapping, _) = self.remote_meta();
        let saved = match remote_mapping {
            Some(remote) => remote.overlay(&self.config.mapping),
            None => self.config.mapping.clone(),
        };
        resolve_mapping(self.vendor(), &saved)
    }

    async fn fetch_source(&self) -> Result<SourcePayload> {
        match self.config.source.r#type {
            SourceKind::Samples => {
                let connector_type = self.config.preview.connector_type.as_deref().unwrap_or("ignition");
                tracing::debug!("Using built-in samples for connector type '{}'", connector_type);
                Ok(SourcePayload {
                    records: samples_for(connector_type),
                    ..SourcePayload::default()
                })
            }
            SourceKind::File => {
                let path = self.config.source.path.as_deref().ok_or_else(|| {
                    MapperError::MissingConfigError {
                        field: "source.path".to_string(),
                    }
                })?;
                tracing::debug!("Reading raw records from {}", path);
                let bytes = self.storage.read_file(path).await?;
                SourcePayload::from_json(serde_json::from_slice(&bytes)?)
            }
            SourceKind::Api => self.fetch_api().await,
        }
    }

    async fn fetch_api(&self) -> Result<SourcePayload> {
        let endpoint = self.config.source.endpoint.as_deref().ok_or_else(|| {
            MapperError::MissingConfigError {
                field: "source.endpoint".to_string(),
            }
        })?;

        let mut request = self.client.get(endpoint);

        if let Some(headers) = &self.config.source.headers {
            for (key, value) in headers {
                request = request.header(key, value);
            }
        }

        if let Some(timeout) = self.config.source.timeout_seconds {
            request = request.timeout(std::time::Duration::from_secs(timeout));
        }

        tracing::debug!("Making API request to: {}", endpoint);
        let response = request.send().await?;
        tracing::debug!("API response status: {}", response.status());

        if !response.status().is_success() {
            return Err(MapperError::SourceError {
                message: format!("API request failed with status: {}", response.status()),
            });
        }

        let json_data: Value = response.json().await?;
        SourcePayload::from_json(json_data)
    }

    fn render_csv(events: &[CanonicalEvent]) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(CSV_HEADER)?;
        for event in events {
            let value = value_to_string(&event.metadata.value);
            let threshold = value_to_string(&event.metadata.threshold);
            let priority = value_to_string(&event.metadata.priority);
            writer.write_record([
                event.timestamp.as_str(),
                event.message.as_str(),
                event.labels.severity.as_str(),
                event.labels.isa_priority.as_str(),
                event.labels.area.as_str(),
                event.labels.equipment.as_str(),
                event.labels.alarm_type.as_str(),
                event.labels.source.as_str(),
                event.labels.connector_id.as_str(),
                event.metadata.state.as_str(),
                value.as_str(),
                threshold.as_str(),
                priority.as_str(),
                event.metadata.vendor_alarm_id.as_str(),
                if event.metadata.ack_required { "true" } else { "false" },
                if event.metadata.shelved { "true" } else { "false" },
            ])?;
        }
        writer
            .into_inner()
            .map_err(|e| MapperError::IoError(e.into_error()))
    }

    fn render_loki(&self, events: &[CanonicalEvent]) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        for event in events {
            let entry = LokiEntry::from_event(event, self.received_at);
            serde_json::to_writer(&mut out, &entry)?;
            out.push(b'\n');
        }
        Ok(out)
    }

    fn render_json(&self, result: &PreviewResult) -> Result<Vec<u8>> {
        let mapping = self.effective_mapping();
        let vendor = self.vendor();
        let document = PreviewDocument {
            name: &self.config.preview.name,
            connector_type: vendor.as_ref().map(VendorKind::as_str),
            mapping: &mapping,
            filters: &self.config.filters,
            result,
        };
        Ok(serde_json::to_vec_pretty(&document)?)
    }
}

#[async_trait::async_trait]
impl<S: Storage> Pipeline for PreviewPipeline<S> {
    async fn extract(&self) -> Result<Vec<RawRecord>> {
        tracing::info!(
            "🚀 Extracting raw alarms ({:?} source) for '{}'",
            self.config.source.r#type,
            self.config.preview.name
        );

        let mut payload = self.fetch_source().await?;

        if let Some(max) = self.config.max_records() {
            payload.records.truncate(max);
        }

        let records = std::mem::take(&mut payload.records);
        if let Ok(mut remote) = self.remote.lock() {
            *remote = Some(payload);
        }

        if records.is_empty() {
            tracing::warn!("Source returned no raw records");
        }
        Ok(records)
    }

    async fn transform(&self, data: Vec<RawRecord>) -> Result<PreviewResult> {
        let total_records = data.len();
        let mapping = self.effective_mapping();
        let available = available_fields(&data);

        for (role, field) in mapping.unknown_fields(&available) {
            tracing::warn!("⚠️ {} is mapped to '{}' which the source does not provide", role, field);
        }
        let missing_required: Vec<String> = mapping
            .missing_required()
            .into_iter()
            .map(|role| role.key().to_string())
            .collect();
        if !missing_required.is_empty() {
            tracing::warn!("⚠️ Required roles left unmapped: {}", missing_required.join(", "));
        }

        let filters = &self.config.filters;
        let filtered = filters.apply(data);
        if filters.active_count() > 0 {
            tracing::info!(
                "🔍 {} filter(s) kept {} / {} records",
                filters.active_count(),
                filtered.len(),
                total_records
            );
        }

        let events = apply_mapping_with(&filtered, &mapping, &self.config.event_context());

        Ok(PreviewResult {
            shown_records: events.len(),
            events,
            total_records,
            available_fields: available,
            missing_required,
        })
    }

    async fn load(&self, result: PreviewResult) -> Result<String> {
        let output_dir = Path::new(self.config.output_path());
        let basename = self.config.basename();

        for format in self.config.output_formats() {
            let (filename, data) = match format.as_str() {
                "json" => (format!("{}.json", basename), self.render_json(&result)?),
                "csv" => (format!("{}.csv", basename), Self::render_csv(&result.events)?),
                "loki" => (
                    format!("{}.loki.jsonl", basename),
                    self.render_loki(&result.events)?,
                ),
                other => {
                    return Err(MapperError::InvalidConfigValueError {
                        field: "output.formats".to_string(),
                        value: other.to_string(),
                        reason: "Unsupported format".to_string(),
                    })
                }
            };

            let path = output_dir.join(&filename);
            let path = path.to_string_lossy();
            tracing::debug!("Writing {} ({} bytes)", path, data.len());
            self.storage.write_file(&path, &data).await?;
        }

        Ok(self.config.output_path().to_string())
    }
}
