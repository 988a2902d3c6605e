//! # Sensor Diagnosis
//!
//! Rule-based checks against the static farm sensor snapshot. No state and no I/O
//! beyond loading the snapshot files once at startup.

pub mod types;

use crate::constants::{MIN_EC, MIN_PPFD, MIN_TEMPERATURE_C};
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use std::path::Path;
use tracing::info;
pub use types::{
    DataError, Diagnosis, DiagnosticRules, Farm, FarmData, FarmRegistry, Reading, SensorReport,
    Sensors,
};

pub const SENSOR_DIAGNOSIS_SOURCE: &str = "Sensor Diagnosis";

/// Runs the threshold rules over a farm's sensor readings.
pub fn check_sensors(sensors: &Sensors) -> SensorReport {
    let mut issues = Vec::new();
    if sensors.ec.value() < MIN_EC {
        issues.push(format!(
            "EC is low ({}), causing nutrient deficiency.",
            sensors.ec
        ));
    }
    if sensors.temperature.value() < MIN_TEMPERATURE_C {
        issues.push(format!(
            "Temperature is low ({}°C), causing cold stress.",
            sensors.temperature
        ));
    }
    if sensors.ppfd.value() < MIN_PPFD {
        issues.push(format!("Light intensity is low ({} PPFD).", sensors.ppfd));
    }

    let reply = if issues.is_empty() {
        "All sensor parameters look optimal.".to_string()
    } else {
        format!("I checked your farm sensors:\n{}", issues.join("\n"))
    };
    SensorReport {
        reply,
        source: SENSOR_DIAGNOSIS_SOURCE.to_string(),
        issues,
    }
}

/// Looks up the recorded issue of a farm in the impact table and the rule table.
pub fn diagnose_farm(
    farm: &Farm,
    rules: &DiagnosticRules,
    impacts: &Map<String, Value>,
) -> Diagnosis {
    if !farm.has_issue {
        return Diagnosis::Healthy {
            status: "healthy".to_string(),
            message: "No issues detected".to_string(),
        };
    }

    let issue = farm.issue_type.clone();
    let lookup = |table: &Map<String, Value>| {
        issue
            .as_deref()
            .and_then(|name| table.get(name))
            .cloned()
    };
    Diagnosis::Issue {
        impact: lookup(impacts).unwrap_or_else(|| json!({})),
        recommendation: lookup(rules)
            .unwrap_or_else(|| json!({ "summary": "No rule-based recommendation available" })),
        issue,
    }
}

/// Loads the farm sensor snapshot.
pub async fn load_farm_data(path: impl AsRef<Path>) -> Result<FarmData, DataError> {
    let data: FarmData = load_json(path.as_ref()).await?;
    info!(farms = data.farms.len(), "Loaded farm sensor snapshot");
    Ok(data)
}

/// Loads the diagnostic rule table.
pub async fn load_diagnostic_rules(path: impl AsRef<Path>) -> Result<DiagnosticRules, DataError> {
    let rules: DiagnosticRules = load_json(path.as_ref()).await?;
    info!(rules = rules.len(), "Loaded diagnostic rules");
    Ok(rules)
}

async fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, DataError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| DataError::Io {
            path: path.display().to_string(),
            source,
        })?;
    serde_json::from_str(&content).map_err(|source| DataError::Parse {
        path: path.display().to_string(),
        source,
    })
}
