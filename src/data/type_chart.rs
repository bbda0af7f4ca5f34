//! Directed type-advantage table

use polars::prelude::DataFrame;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

use super::csv_loader::{int_column, read_csv, read_csv_bytes, str_column};
use super::species::SpeciesStats;
use crate::error::PredictError;

/// (attacker type, defender type) -> signed advantage.
///
/// Neither symmetric nor total: a missing pair has no effect.
#[derive(Debug, Clone, Default)]
pub struct TypeChart {
    advantages: HashMap<(String, String), i64>,
}

impl TypeChart {
    /// Load the chart from `type_advantage.csv`
    pub fn load<P: AsRef<Path>>(csv_path: P) -> Result<Self, PredictError> {
        let path = csv_path.as_ref();
        let df = read_csv(path)
            .map_err(|e| PredictError::Data(format!("{}: {}", path.display(), e)))?;
        let chart = Self::from_dataframe(&df)?;
        info!("Loaded {} type matchups from {:?}", chart.len(), path);
        Ok(chart)
    }

    /// Parse the chart from CSV text
    pub fn from_csv_bytes(bytes: &[u8]) -> Result<Self, PredictError> {
        let df = read_csv_bytes(bytes)?;
        Self::from_dataframe(&df)
    }

    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, S, i64)>,
        S: Into<String>,
    {
        let advantages = entries
            .into_iter()
            .map(|(attacker, defender, advantage)| ((attacker.into(), defender.into()), advantage))
            .collect();
        Self { advantages }
    }

    fn from_dataframe(df: &DataFrame) -> Result<Self, PredictError> {
        let attackers = str_column(df, "attacker")?;
        let defenders = str_column(df, "defender")?;
        let values = int_column(df, "advantage")?;

        let mut advantages = HashMap::with_capacity(df.height());
        for i in 0..df.height() {
            match (&attackers[i], &defenders[i], values[i]) {
                (Some(attacker), Some(defender), Some(advantage)) => {
                    advantages.insert(
                        (attacker.trim().to_string(), defender.trim().to_string()),
                        advantage,
                    );
                }
                _ => {
                    return Err(PredictError::Data(format!(
                        "type advantage row {} is incomplete",
                        i + 1
                    )))
                }
            }
        }

        Ok(Self { advantages })
    }

    /// Raw advantage of one attacking type against one defending type
    pub fn get(&self, attacker: &str, defender: &str) -> Option<i64> {
        self.advantages
            .get(&(attacker.to_string(), defender.to_string()))
            .copied()
    }

    /// Sign of the summed advantage over every attacker/defender type pair.
    ///
    /// Up to four lookups; missing pairs count as 0. Only the sign is kept
    /// (-1, 0 or 1) since that is the value the classifier was trained on.
    pub fn resolve(
        &self,
        attacker_type1: &str,
        attacker_type2: Option<&str>,
        defender_type1: &str,
        defender_type2: Option<&str>,
    ) -> i8 {
        let attackers = std::iter::once(attacker_type1).chain(attacker_type2);
        let total: i64 = attackers
            .flat_map(|a| {
                std::iter::once(defender_type1)
                    .chain(defender_type2)
                    .map(move |d| self.get(a, d).unwrap_or(0))
            })
            .sum();

        total.signum() as i8
    }

    /// Type advantage of `attacker` over `defender`
    pub fn matchup(&self, attacker: &SpeciesStats, defender: &SpeciesStats) -> i8 {
        self.resolve(
            &attacker.type1,
            attacker.type2.as_deref(),
            &defender.type1,
            defender.type2.as_deref(),
        )
    }

    pub fn len(&self) -> usize {
        self.advantages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.advantages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chart() -> TypeChart {
        TypeChart::from_entries([
            ("Water", "Fire", 1),
            ("Fire", "Water", -1),
            ("Electric", "Water", 1),
            ("Electric", "Flying", 1),
            ("Electric", "Ground", -2),
            ("Ground", "Electric", 1),
            ("Grass", "Water", 1),
            ("Grass", "Fire", -1),
            ("Poison", "Grass", 1),
        ])
    }

    #[test]
    fn test_single_types() {
        let c = chart();
        assert_eq!(c.resolve("Water", None, "Fire", None), 1);
        assert_eq!(c.resolve("Fire", None, "Water", None), -1);
        assert_eq!(c.resolve("Normal", None, "Normal", None), 0);
    }

    #[test]
    fn test_sign_discards_magnitude() {
        let c = chart();
        // 1 + 1 = 2 and -2 both collapse to their sign
        assert_eq!(c.resolve("Electric", None, "Water", Some("Flying")), 1);
        assert_eq!(c.resolve("Electric", None, "Ground", None), -1);
    }

    #[test]
    fn test_dual_types_cancel() {
        let c = chart();
        // Electric vs Water/Ground: 1 - 2 = -1
        assert_eq!(c.resolve("Electric", None, "Water", Some("Ground")), -1);
        // Grass/Poison vs Water/Fire: 1 - 1 + 0 + 0 = 0
        assert_eq!(c.resolve("Grass", Some("Poison"), "Water", Some("Fire")), 0);
    }

    #[test]
    fn test_attacker_secondary_type_counts() {
        let c = chart();
        assert_eq!(c.resolve("Normal", Some("Poison"), "Grass", None), 1);
        assert_eq!(c.resolve("Normal", None, "Grass", None), 0);
    }

    #[test]
    fn test_not_symmetric() {
        let c = chart();
        assert_eq!(c.resolve("Poison", None, "Grass", None), 1);
        assert_eq!(c.resolve("Grass", None, "Poison", None), 0);
    }

    #[test]
    fn test_result_always_bounded() {
        let c = chart();
        let types = ["Water", "Fire", "Electric", "Grass", "Ground", "Flying", "Poison"];
        for a1 in types {
            for d1 in types {
                for a2 in std::iter::once(None).chain(types.iter().copied().map(Some)) {
                    for d2 in std::iter::once(None).chain(types.iter().copied().map(Some)) {
                        let v = c.resolve(a1, a2, d1, d2);
                        assert!((-1..=1).contains(&v));
                    }
                }
            }
        }
    }

    #[test]
    fn test_load_from_csv() {
        let csv = "attacker,defender,advantage\nWater,Fire,1\nFire,Water,-1\n";
        let c = TypeChart::from_csv_bytes(csv.as_bytes()).unwrap();
        assert_eq!(c.len(), 2);
        assert_eq!(c.get("Water", "Fire"), Some(1));
        assert_eq!(c.get("Fire", "Water"), Some(-1));
        assert_eq!(c.get("Fire", "Fire"), None);
    }

    #[test]
    fn test_incomplete_row_is_fatal() {
        let csv = "attacker,defender,advantage\nWater,Fire,\n";
        assert!(TypeChart::from_csv_bytes(csv.as_bytes()).is_err());
    }

    #[test]
    fn test_missing_column_is_fatal() {
        let csv = "attacker,defender\nWater,Fire\n";
        assert!(TypeChart::from_csv_bytes(csv.as_bytes()).is_err());
    }
}
