//! Categorical encoding of battle conditions
//!
//! Each categorical field carries the class list fixed at training time; the
//! code of a value is its index in that list.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::error::PredictError;
use crate::models::BattleConditions;

/// Categorical context fields, in feature order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoricalField {
    Weather,
    StatusP1,
    StatusP2,
    Terrain,
    Hazards,
}

impl CategoricalField {
    pub const ALL: [CategoricalField; 5] = [
        CategoricalField::Weather,
        CategoricalField::StatusP1,
        CategoricalField::StatusP2,
        CategoricalField::Terrain,
        CategoricalField::Hazards,
    ];

    /// Column name used in training
    pub fn name(self) -> &'static str {
        match self {
            CategoricalField::Weather => "weather",
            CategoricalField::StatusP1 => "status_p1",
            CategoricalField::StatusP2 => "status_p2",
            CategoricalField::Terrain => "terrain",
            CategoricalField::Hazards => "hazards",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    /// Raw value of this field in a set of battle conditions
    pub fn value(self, conditions: &BattleConditions) -> &str {
        match self {
            CategoricalField::Weather => &conditions.weather,
            CategoricalField::StatusP1 => &conditions.status_p1,
            CategoricalField::StatusP2 => &conditions.status_p2,
            CategoricalField::Terrain => &conditions.terrain,
            CategoricalField::Hazards => &conditions.hazards,
        }
    }
}

/// Per-field vocabularies learned at training time
#[derive(Debug, Clone)]
pub struct CategoricalEncoder {
    tables: HashMap<CategoricalField, HashMap<String, i64>>,
}

impl CategoricalEncoder {
    /// Load `label_encoders.json`: `{ "weather": ["Clear", "Rain", ...], ... }`
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PredictError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| PredictError::Model(format!("{}: {}", path.display(), e)))?;
        let encoder = Self::from_json(&content)?;
        info!("Loaded categorical encoders from {:?}", path);
        Ok(encoder)
    }

    pub fn from_json(content: &str) -> Result<Self, PredictError> {
        let raw: HashMap<String, Vec<String>> = serde_json::from_str(content)
            .map_err(|e| PredictError::Model(format!("invalid label encoders: {}", e)))?;
        Self::from_classes(raw)
    }

    /// Build from class lists keyed by field name; every field must be present
    pub fn from_classes<K, V>(classes: HashMap<K, Vec<V>>) -> Result<Self, PredictError>
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut tables: HashMap<CategoricalField, HashMap<String, i64>> =
            HashMap::with_capacity(CategoricalField::ALL.len());
        for (name, values) in classes {
            let field = CategoricalField::from_name(name.as_ref()).ok_or_else(|| {
                PredictError::Model(format!("unknown categorical field: {}", name.as_ref()))
            })?;
            let codes: HashMap<String, i64> = values
                .into_iter()
                .enumerate()
                .map(|(code, value)| (value.into(), code as i64))
                .collect();
            tables.insert(field, codes);
        }

        for field in CategoricalField::ALL {
            if !tables.contains_key(&field) {
                return Err(PredictError::Model(format!(
                    "missing encoder for field: {}",
                    field.name()
                )));
            }
        }

        Ok(Self { tables })
    }

    /// Code of `value` for `field`.
    ///
    /// Values unseen at training time encode to 0, which is also the code of
    /// the first training class. This is not an error.
    pub fn encode(&self, field: CategoricalField, value: &str) -> i64 {
        self.tables
            .get(&field)
            .and_then(|codes| codes.get(value))
            .copied()
            .unwrap_or(0)
    }

    /// Whether `value` was part of the training vocabulary for `field`
    pub fn is_known(&self, field: CategoricalField, value: &str) -> bool {
        self.tables
            .get(&field)
            .is_some_and(|codes| codes.contains_key(value))
    }
}
