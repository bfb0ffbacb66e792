use crate::core::filter::RecordFilter;
use crate::core::vendor::{resolve_mapping, VendorKind};
use crate::core::ConfigProvider;
use crate::domain::mapping::FieldMapping;
use crate::domain::model::EventContext;
use crate::utils::error::{MapperError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

pub const OUTPUT_FORMATS: [&str; 3] = ["json", "csv", "loki"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewConfig {
    pub preview: PreviewSection,
    pub source: SourceConfig,
    #[serde(default)]
    pub mapping: FieldMapping,
    #[serde(default)]
    pub filters: RecordFilter,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewSection {
    pub name: String,
    pub description: Option<String>,
    pub connector_type: Option<String>,
    /// Value of the `source` label on produced events.
    pub source_label: Option<String>,
    pub connector_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Samples,
    File,
    Api,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub r#type: SourceKind,
    pub path: Option<String>,
    pub endpoint: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub headers: Option<HashMap<String, String>>,
    pub max_records: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: String,
    #[serde(default = "default_formats")]
    pub formats: Vec<String>,
    /// 檔名前綴，預設為 `preview`
    pub basename: Option<String>,
}

fn default_formats() -> Vec<String> {
    vec!["json".to_string()]
}

impl PreviewConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(MapperError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| MapperError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${API_TOKEN})，找不到的保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| MapperError::ConfigValidationError {
            field: "env_substitution".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// Config for previewing a vendor's built-in samples, with no overrides.
    pub fn for_vendor(vendor: VendorKind, output_path: &str) -> Self {
        Self {
            preview: PreviewSection {
                name: format!("{}-preview", vendor),
                description: None,
                connector_type: Some(vendor.as_str().to_string()),
                source_label: None,
                connector_id: None,
            },
            source: SourceConfig {
                r#type: SourceKind::Samples,
                path: None,
                endpoint: None,
                timeout_seconds: None,
                headers: None,
                max_records: None,
            },
            mapping: FieldMapping::new(),
            filters: RecordFilter::new(),
            output: OutputConfig {
                path: output_path.to_string(),
                formats: default_formats(),
                basename: None,
            },
        }
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_path("output.path", &self.output.path)?;

        match self.source.r#type {
            SourceKind::File => {
                let path = validation::validate_required_field("source.path", &self.source.path)?;
                validation::validate_path("source.path", path)?;
            }
            SourceKind::Api => {
                let endpoint =
                    validation::validate_required_field("source.endpoint", &self.source.endpoint)?;
                validation::validate_url("source.endpoint", endpoint)?;
            }
            SourceKind::Samples => {}
        }

        if let Some(max) = self.source.max_records {
            validation::validate_positive_number("source.max_records", max, 1)?;
        }

        if self.output.formats.is_empty() {
            return Err(MapperError::MissingConfigError {
                field: "output.formats".to_string(),
            });
        }
        for format in &self.output.formats {
            validation::validate_one_of("output.formats", format, &OUTPUT_FORMATS)?;
        }

        self.vendor()?;
        Ok(())
    }

    /// Connector type from `[preview]`, if one is set.
    pub fn vendor(&self) -> Result<Option<VendorKind>> {
        self.preview
            .connector_type
            .as_deref()
            .map(|t| {
                t.parse::<VendorKind>()
                    .map_err(|reason| MapperError::InvalidConfigValueError {
                        field: "preview.connector_type".to_string(),
                        value: t.to_string(),
                        reason,
                    })
            })
            .transpose()
    }

    /// Vendor defaults overlaid with the `[mapping]` section.
    pub fn effective_mapping(&self) -> FieldMapping {
        let vendor = self.vendor().ok().flatten();
        resolve_mapping(vendor, &self.mapping)
    }

    pub fn event_context(&self) -> EventContext {
        let defaults = EventContext::default();
        EventContext {
            source: self
                .preview
                .source_label
                .clone()
                .unwrap_or(defaults.source),
            connector_id: self
                .preview
                .connector_id
                .clone()
                .unwrap_or(defaults.connector_id),
        }
    }

    pub fn basename(&self) -> &str {
        self.output.basename.as_deref().unwrap_or("preview")
    }

    pub fn max_records(&self) -> Option<usize> {
        self.source.max_records
    }
}

impl ConfigProvider for PreviewConfig {
    fn output_path(&self) -> &str {
        &self.output.path
    }

    fn output_formats(&self) -> &[String] {
        &self.output.formats
    }
}

impl Validate for PreviewConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::mapping::CanonicalRole;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const BASIC: &str = r#"
[preview]
name = "wincc-line-2"
connector_type = "wincc"
connector_id = "c-7"

[source]
type = "samples"

[mapping]
message_field = "Tag"
area_field = ""

[filters]
State = "COME"

[output]
path = "./preview-output"
formats = ["json", "csv"]
"#;

    #[test]
    fn test_parse_basic_toml_config() {
        let config = PreviewConfig::from_toml_str(BASIC).unwrap();

        assert_eq!(config.preview.name, "wincc-line-2");
        assert_eq!(config.source.r#type, SourceKind::Samples);
        assert_eq!(config.vendor().unwrap(), Some(VendorKind::WinCc));
        assert_eq!(config.filters.active_count(), 1);
        assert_eq!(config.output_formats(), ["json", "csv"]);
        assert_eq!(config.basename(), "preview");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_effective_mapping_overlays_vendor_defaults() {
        let config = PreviewConfig::from_toml_str(BASIC).unwrap();
        let mapping = config.effective_mapping();

        assert_eq!(mapping.get(CanonicalRole::Message), Some("Tag"));
        assert_eq!(mapping.get(CanonicalRole::Area), None);
        assert_eq!(mapping.get(CanonicalRole::Severity), Some("Class"));

        let context = config.event_context();
        assert_eq!(context.source, "connector");
        assert_eq!(context.connector_id, "c-7");
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("ALARM_MAPPER_TEST_ENDPOINT", "https://scada.example.com/samples");

        let toml_content = r#"
[preview]
name = "api"

[source]
type = "api"
endpoint = "${ALARM_MAPPER_TEST_ENDPOINT}"

[output]
path = "./output"
"#;

        let config = PreviewConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(
            config.source.endpoint.as_deref(),
            Some("https://scada.example.com/samples")
        );
        assert_eq!(config.output.formats, vec!["json"]);
        assert!(config.validate().is_ok());

        std::env::remove_var("ALARM_MAPPER_TEST_ENDPOINT");
    }

    #[test]
    fn test_config_validation() {
        let bad_format = BASIC.replace(r#"["json", "csv"]"#, r#"["xml"]"#);
        let config = PreviewConfig::from_toml_str(&bad_format).unwrap();
        assert!(config.validate().is_err());

        let bad_vendor = BASIC.replace(r#""wincc""#, r#""opcua""#);
        let config = PreviewConfig::from_toml_str(&bad_vendor).unwrap();
        assert!(matches!(
            config.validate(),
            Err(MapperError::InvalidConfigValueError { .. })
        ));

        let missing_path = BASIC.replace(r#"type = "samples""#, r#"type = "file""#);
        let config = PreviewConfig::from_toml_str(&missing_path).unwrap();
        assert!(matches!(
            config.validate(),
            Err(MapperError::MissingConfigError { .. })
        ));

        let bad_url = BASIC.replace(
            r#"type = "samples""#,
            "type = \"api\"\nendpoint = \"ftp://scada\"",
        );
        let config = PreviewConfig::from_toml_str(&bad_url).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(BASIC.as_bytes()).unwrap();

        let config = PreviewConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.preview.name, "wincc-line-2");
    }

    #[test]
    fn test_for_vendor_uses_samples() {
        let config = PreviewConfig::for_vendor(VendorKind::Ignition, "./out");
        assert_eq!(config.source.r#type, SourceKind::Samples);
        assert_eq!(config.preview.name, "ignition-preview");
        assert!(config.validate().is_ok());
    }
}
