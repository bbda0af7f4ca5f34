//! Feature Engineering
//!
//! Turn two species and the battle conditions into the flat, ordered
//! feature vector the classifier was trained on.

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::info;

use super::encoding::{CategoricalEncoder, CategoricalField};
use super::species::SpeciesStats;
use super::type_chart::TypeChart;
use crate::error::PredictError;
use crate::models::BattleConditions;

/// Number of features expected by the model (7 + 7 stats, 7 diffs, 1 type, 5 categorical)
pub const NUM_FEATURES: usize = 27;

/// Feature column names in training order
pub const FEATURE_COLUMNS: [&str; NUM_FEATURES] = [
    // Pokemon 1 stats (7)
    "p1_hp",
    "p1_attack",
    "p1_defense",
    "p1_sp_attack",
    "p1_sp_defense",
    "p1_speed",
    "p1_total",
    // Pokemon 2 stats (7)
    "p2_hp",
    "p2_attack",
    "p2_defense",
    "p2_sp_attack",
    "p2_sp_defense",
    "p2_speed",
    "p2_total",
    // Differences, p1 - p2 (7)
    "hp_diff",
    "attack_diff",
    "defense_diff",
    "sp_attack_diff",
    "sp_defense_diff",
    "speed_diff",
    "total_diff",
    // Type matchup (1)
    "type_advantage",
    // Battle conditions (5)
    "weather",
    "status_p1",
    "status_p2",
    "terrain",
    "hazards",
];

/// One stat dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stat {
    Hp,
    Attack,
    Defense,
    SpAttack,
    SpDefense,
    Speed,
    Total,
}

impl Stat {
    pub const ALL: [Stat; 7] = [
        Stat::Hp,
        Stat::Attack,
        Stat::Defense,
        Stat::SpAttack,
        Stat::SpDefense,
        Stat::Speed,
        Stat::Total,
    ];

    fn name(self) -> &'static str {
        match self {
            Stat::Hp => "hp",
            Stat::Attack => "attack",
            Stat::Defense => "defense",
            Stat::SpAttack => "sp_attack",
            Stat::SpDefense => "sp_defense",
            Stat::Speed => "speed",
            Stat::Total => "total",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.name() == name)
    }
}

/// The seven stat values of one side (or their differences)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatLine {
    pub hp: i64,
    pub attack: i64,
    pub defense: i64,
    pub sp_attack: i64,
    pub sp_defense: i64,
    pub speed: i64,
    pub total: i64,
}

impl StatLine {
    pub fn of(stats: &SpeciesStats) -> Self {
        Self {
            hp: stats.hp,
            attack: stats.attack,
            defense: stats.defense,
            sp_attack: stats.sp_attack,
            sp_defense: stats.sp_defense,
            speed: stats.speed,
            total: stats.total,
        }
    }

    /// Component-wise `self - other`
    pub fn minus(&self, other: &StatLine) -> Self {
        Self {
            hp: self.hp - other.hp,
            attack: self.attack - other.attack,
            defense: self.defense - other.defense,
            sp_attack: self.sp_attack - other.sp_attack,
            sp_defense: self.sp_defense - other.sp_defense,
            speed: self.speed - other.speed,
            total: self.total - other.total,
        }
    }

    pub fn get(&self, stat: Stat) -> i64 {
        match stat {
            Stat::Hp => self.hp,
            Stat::Attack => self.attack,
            Stat::Defense => self.defense,
            Stat::SpAttack => self.sp_attack,
            Stat::SpDefense => self.sp_defense,
            Stat::Speed => self.speed,
            Stat::Total => self.total,
        }
    }
}

/// Complete feature set for one matchup, before categorical encoding
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRecord {
    pub p1: StatLine,
    pub p2: StatLine,
    pub diff: StatLine,
    /// -1, 0 or 1
    pub type_advantage: i8,
    pub conditions: BattleConditions,
}

/// Feature engineering for matchups
pub struct FeatureEngineering;

impl FeatureEngineering {
    /// Build the feature record for `p1` against `p2`.
    ///
    /// Both species must already have been resolved from the species table.
    pub fn build_record(
        p1: &SpeciesStats,
        p2: &SpeciesStats,
        type_chart: &TypeChart,
        conditions: &BattleConditions,
    ) -> FeatureRecord {
        let p1_line = StatLine::of(p1);
        let p2_line = StatLine::of(p2);

        FeatureRecord {
            p1: p1_line,
            p2: p2_line,
            diff: p1_line.minus(&p2_line),
            type_advantage: type_chart.matchup(p1, p2),
            conditions: conditions.clone(),
        }
    }
}

/// Where a feature column takes its value from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureColumn {
    P1(Stat),
    P2(Stat),
    Diff(Stat),
    TypeAdvantage,
    Categorical(CategoricalField),
}

impl FeatureColumn {
    pub fn parse(name: &str) -> Option<Self> {
        if name == "type_advantage" {
            return Some(FeatureColumn::TypeAdvantage);
        }
        if let Some(field) = CategoricalField::from_name(name) {
            return Some(FeatureColumn::Categorical(field));
        }
        if let Some(stat) = name.strip_prefix("p1_").and_then(Stat::from_name) {
            return Some(FeatureColumn::P1(stat));
        }
        if let Some(stat) = name.strip_prefix("p2_").and_then(Stat::from_name) {
            return Some(FeatureColumn::P2(stat));
        }
        name.strip_suffix("_diff")
            .and_then(Stat::from_name)
            .map(FeatureColumn::Diff)
    }

    fn value(self, record: &FeatureRecord, encoder: &CategoricalEncoder) -> f64 {
        match self {
            FeatureColumn::P1(stat) => record.p1.get(stat) as f64,
            FeatureColumn::P2(stat) => record.p2.get(stat) as f64,
            FeatureColumn::Diff(stat) => record.diff.get(stat) as f64,
            FeatureColumn::TypeAdvantage => record.type_advantage as f64,
            FeatureColumn::Categorical(field) => {
                encoder.encode(field, field.value(&record.conditions)) as f64
            }
        }
    }
}

/// Ordered feature columns, as saved alongside the model.
///
/// The classifier is order-sensitive, so vectors are always assembled
/// through this layout rather than in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureLayout {
    columns: Vec<FeatureColumn>,
}

impl FeatureLayout {
    /// Load `feature_columns.json`, a JSON array of column names
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PredictError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| PredictError::Model(format!("{}: {}", path.display(), e)))?;
        let names: Vec<String> = serde_json::from_str(&content)
            .map_err(|e| PredictError::Model(format!("invalid feature columns: {}", e)))?;
        let layout = Self::from_names(&names)?;
        info!("Loaded {} feature columns from {:?}", layout.len(), path);
        Ok(layout)
    }

    /// Validate a column list: every feature exactly once, no unknown names
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self, PredictError> {
        let mut columns = Vec::with_capacity(names.len());
        let mut seen = HashSet::with_capacity(names.len());

        for name in names {
            let name = name.as_ref();
            let column = FeatureColumn::parse(name)
                .ok_or_else(|| PredictError::Model(format!("unknown feature column: {}", name)))?;
            if !seen.insert(column) {
                return Err(PredictError::Model(format!(
                    "duplicate feature column: {}",
                    name
                )));
            }
            columns.push(column);
        }

        if columns.len() != NUM_FEATURES {
            return Err(PredictError::Model(format!(
                "expected {} feature columns, got {}",
                NUM_FEATURES,
                columns.len()
            )));
        }

        Ok(Self { columns })
    }

    /// The order used by the training script
    pub fn training_order() -> Self {
        Self {
            columns: FEATURE_COLUMNS
                .iter()
                .filter_map(|name| FeatureColumn::parse(name))
                .collect(),
        }
    }

    /// Encode a record into the model input vector
    pub fn to_vec(&self, record: &FeatureRecord, encoder: &CategoricalEncoder) -> Vec<f64> {
        self.columns
            .iter()
            .map(|column| column.value(record, encoder))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
