use alarm_mapper::core::etl::PreviewEngine;
use alarm_mapper::{LocalStorage, PreviewConfig, PreviewPipeline};
use anyhow::Result;
use httpmock::prelude::*;
use tempfile::TempDir;

#[tokio::test]
async fn test_end_to_end_preview_from_file() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let base = temp_dir.path().to_str().unwrap().replace('\\', "/");

    let raw_path = format!("{}/raw.json", base);
    tokio::fs::write(
        &raw_path,
        serde_json::json!([
            {"AlarmID": "X-1", "Time": "2026-02-26T14:30:00", "Category": "Critical", "Area": "ZONE_A", "Description": "Reactor pressure high"},
            {"AlarmID": "X-2", "Time": "2026-02-26T14:31:00", "Category": "Warning", "Area": "ZONE_B", "Description": "Pump vibration"}
        ])
        .to_string(),
    )
    .await?;

    let config_path = format!("{}/preview.toml", base);
    tokio::fs::write(
        &config_path,
        format!(
            r#"
[preview]
name = "plant-file"
connector_type = "plant_scada"
source_label = "plant-a"

[source]
type = "file"
path = "{raw}"

[output]
path = "{base}/out"
formats = ["json", "csv", "loki"]
"#,
            raw = raw_path,
            base = base
        ),
    )
    .await?;

    let config = PreviewConfig::from_file(&config_path)?;
    let pipeline = PreviewPipeline::new(LocalStorage::new("."), config);
    let engine = PreviewEngine::new(pipeline);

    let output = engine.run().await?;
    assert_eq!(output, format!("{}/out", base));

    let json_bytes = tokio::fs::read(format!("{}/out/preview.json", base)).await?;
    let doc: serde_json::Value = serde_json::from_slice(&json_bytes)?;
    assert_eq!(doc["total_records"], 2);
    assert_eq!(doc["events"][0]["labels"]["source"], "plant-a");
    assert_eq!(doc["events"][0]["labels"]["isa_priority"], "high");
    assert_eq!(doc["events"][1]["labels"]["area"], "ZONE_B");
    // plant_scada defaults map equipment to a field this file does not carry
    assert_eq!(doc["events"][1]["labels"]["equipment"], "unknown");

    let csv = tokio::fs::read_to_string(format!("{}/out/preview.csv", base)).await?;
    assert_eq!(csv.lines().count(), 3);

    let loki = tokio::fs::read_to_string(format!("{}/out/preview.loki.jsonl", base)).await?;
    let entry: serde_json::Value = serde_json::from_str(loki.lines().next().unwrap())?;
    assert_eq!(entry["timestamp_ns"], 1_772_116_200_000_000_000_i64);

    Ok(())
}

#[tokio::test]
async fn test_preview_from_api_without_writing() -> Result<()> {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(GET).path("/connectors/abc/transform");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({
                "connector_type": "factorytalk",
                "sample_raw": [
                    {"AlarmId": "FT-1", "TimeStamp": "2026-02-26T14:30:00.000", "Severity": "Critical", "Description": "Tank hot", "Area": "TANK_FARM"},
                    {"AlarmId": "FT-2", "TimeStamp": "2026-02-26T14:31:00.000", "Severity": "Warning", "Description": "Level low", "Area": "MIXING_AREA"}
                ],
                "mapping": null
            }));
    });

    let temp_dir = TempDir::new()?;
    let out = temp_dir.path().join("never-written");
    let config = PreviewConfig::from_toml_str(&format!(
        r#"
[preview]
name = "api-preview"

[source]
type = "api"
endpoint = "{}"

[filters]
Area = "MIXING_AREA"

[output]
path = "{}"
"#,
        server.url("/connectors/abc/transform"),
        out.to_str().unwrap().replace('\\', "/")
    ))?;

    let engine = PreviewEngine::new(PreviewPipeline::new(LocalStorage::new("."), config));
    let result = engine.preview().await?;

    api_mock.assert();
    assert_eq!(result.total_records, 2);
    assert_eq!(result.shown_records, 1);
    assert_eq!(result.events[0].metadata.vendor_alarm_id, "FT-2");
    assert_eq!(result.events[0].labels.isa_priority, "medium");
    assert!(!out.exists());

    Ok(())
}
