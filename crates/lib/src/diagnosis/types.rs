use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::{collections::HashMap, fmt};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataError {
    #[error("Failed to read data file '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse data file '{path}': {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
    #[error("Duplicate farm id '{0}' in farm data")]
    DuplicateFarm(String),
}

/// A single sensor value. It keeps the number exactly as written in the snapshot, so
/// `15.0` displays as `15.0` and `420` as `420`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(transparent)]
pub struct Reading(Number);

impl Reading {
    pub fn value(&self) -> f64 {
        self.0.as_f64().unwrap_or(f64::NAN)
    }
}

impl From<Number> for Reading {
    fn from(number: Number) -> Self {
        Self(number)
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Latest sensor readings of a farm. Readings beyond the three that drive the
/// diagnosis rules are kept verbatim in `extra`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Sensors {
    pub ec: Reading,
    pub temperature: Reading,
    pub ppfd: Reading,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One farm record from the sensor snapshot.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Farm {
    pub farm_id: String,
    pub sensors: Sensors,
    #[serde(default)]
    pub has_issue: bool,
    #[serde(default)]
    pub issue_type: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The sensor snapshot file.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct FarmData {
    pub farms: Vec<Farm>,
    #[serde(default)]
    pub optimal_ranges: Value,
    #[serde(default)]
    pub issue_impact_descriptions: Map<String, Value>,
}

/// Issue type → recommendation object, as stored in the diagnostic rules file.
pub type DiagnosticRules = Map<String, Value>;

/// Farm snapshot indexed by farm id. Read-only once built.
#[derive(Debug, Clone, Default)]
pub struct FarmRegistry {
    farms: Vec<Farm>,
    by_id: HashMap<String, usize>,
    pub optimal_ranges: Value,
    pub issue_impacts: Map<String, Value>,
}

impl FarmRegistry {
    pub fn new(data: FarmData) -> Result<Self, DataError> {
        let mut by_id = HashMap::with_capacity(data.farms.len());
        for (position, farm) in data.farms.iter().enumerate() {
            if by_id.insert(farm.farm_id.clone(), position).is_some() {
                return Err(DataError::DuplicateFarm(farm.farm_id.clone()));
            }
        }
        Ok(Self {
            farms: data.farms,
            by_id,
            optimal_ranges: data.optimal_ranges,
            issue_impacts: data.issue_impact_descriptions,
        })
    }

    pub fn get(&self, farm_id: &str) -> Option<&Farm> {
        self.by_id.get(farm_id).map(|&i| &self.farms[i])
    }

    /// Farm ids in file order.
    pub fn ids(&self) -> Vec<String> {
        self.farms.iter().map(|f| f.farm_id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.farms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.farms.is_empty()
    }
}

/// Outcome of the threshold checks on a farm's sensors.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SensorReport {
    pub reply: String,
    pub source: String,
    #[serde(skip)]
    pub issues: Vec<String>,
}

/// Outcome of `diagnose_farm`.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum Diagnosis {
    Healthy {
        status: String,
        message: String,
    },
    Issue {
        issue: Option<String>,
        impact: Value,
        recommendation: Value,
    },
}
