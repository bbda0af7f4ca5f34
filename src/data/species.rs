//! Species base-stat table

use polars::prelude::DataFrame;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

use super::csv_loader::{int_column, read_csv, read_csv_bytes, str_column};
use crate::error::PredictError;

/// Base stats and typing of one species
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpeciesStats {
    #[serde(skip)]
    pub name: String,
    pub hp: i64,
    pub attack: i64,
    pub defense: i64,
    pub sp_attack: i64,
    pub sp_defense: i64,
    pub speed: i64,
    /// Taken from the table as-is, never recomputed from the six stats
    pub total: i64,
    pub type1: String,
    pub type2: Option<String>,
}

/// Lowercase, trimmed species key
pub fn normalize_species_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Missing, blank, whitespace-only or literal "None" secondary types are absent
pub fn normalize_secondary_type(raw: Option<&str>) -> Option<String> {
    match raw.map(str::trim) {
        None | Some("") | Some("None") => None,
        Some(t) => Some(t.to_string()),
    }
}

fn required_stat(
    values: &[Option<i64>],
    i: usize,
    name: &str,
    label: &str,
) -> Result<i64, PredictError> {
    values[i].ok_or_else(|| {
        PredictError::Data(format!("row {} ({}): missing {}", i + 1, name, label))
    })
}

/// In-memory species table keyed by lowercase name
#[derive(Debug, Clone, Default)]
pub struct SpeciesTable {
    species: HashMap<String, SpeciesStats>,
}

impl SpeciesTable {
    /// Load the species table from `base_stats.csv`
    pub fn load<P: AsRef<Path>>(csv_path: P) -> Result<Self, PredictError> {
        let path = csv_path.as_ref();
        let df = read_csv(path)
            .map_err(|e| PredictError::Data(format!("{}: {}", path.display(), e)))?;
        let table = Self::from_dataframe(&df)?;
        info!("Loaded {} species from {:?}", table.len(), path);
        Ok(table)
    }

    /// Parse the species table from CSV text
    pub fn from_csv_bytes(bytes: &[u8]) -> Result<Self, PredictError> {
        let df = read_csv_bytes(bytes)?;
        Self::from_dataframe(&df)
    }

    /// Build a table from already constructed records
    pub fn from_records<I: IntoIterator<Item = SpeciesStats>>(records: I) -> Self {
        let species = records
            .into_iter()
            .map(|mut s| {
                s.name = normalize_species_name(&s.name);
                (s.name.clone(), s)
            })
            .collect();
        Self { species }
    }

    fn from_dataframe(df: &DataFrame) -> Result<Self, PredictError> {
        let names = str_column(df, "pokemon")?;
        let hp = int_column(df, "hp")?;
        let attack = int_column(df, "attack")?;
        let defense = int_column(df, "defense")?;
        let sp_attack = int_column(df, "sp_attack")?;
        let sp_defense = int_column(df, "sp_defense")?;
        let speed = int_column(df, "speed")?;
        let total = int_column(df, "total")?;
        let type1 = str_column(df, "type1")?;
        let type2 = str_column(df, "type2")?;

        let mut records = Vec::with_capacity(df.height());
        for i in 0..df.height() {
            let row = i + 1;
            let name = names[i]
                .as_deref()
                .map(normalize_species_name)
                .filter(|n| !n.is_empty())
                .ok_or_else(|| PredictError::Data(format!("row {}: missing pokemon name", row)))?;
            let primary = type1[i]
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .ok_or_else(|| PredictError::Data(format!("row {} ({}): missing type1", row, name)))?
                .to_string();

            records.push(SpeciesStats {
                hp: required_stat(&hp, i, &name, "hp")?,
                attack: required_stat(&attack, i, &name, "attack")?,
                defense: required_stat(&defense, i, &name, "defense")?,
                sp_attack: required_stat(&sp_attack, i, &name, "sp_attack")?,
                sp_defense: required_stat(&sp_defense, i, &name, "sp_defense")?,
                speed: required_stat(&speed, i, &name, "speed")?,
                total: required_stat(&total, i, &name, "total")?,
                type1: primary,
                type2: normalize_secondary_type(type2[i].as_deref()),
                name,
            });
        }

        if records.is_empty() {
            return Err(PredictError::Data("species table is empty".to_string()));
        }

        Ok(Self::from_records(records))
    }

    pub fn get(&self, name: &str) -> Option<&SpeciesStats> {
        self.species.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.species.contains_key(name)
    }

    /// Look up a species, failing for unknown names
    pub fn lookup(&self, name: &str) -> Result<&SpeciesStats, PredictError> {
        self.get(name)
            .ok_or_else(|| PredictError::UnknownSpecies(name.to_string()))
    }

    /// All species names in sorted order
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.species.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE_STATS: &str = "\
pokemon,hp,attack,defense,sp_attack,sp_defense,speed,total,type1,type2
pikachu,35,55,40,50,50,90,320,Electric,
Charizard,78,84,78,109,85,100,534,Fire,Flying
squirtle,44,48,65,50,64,43,314,Water,None
gengar,60,65,60,130,75,110,500,Ghost,   
";

    #[test]
    fn test_load_from_csv() {
        let table = SpeciesTable::from_csv_bytes(BASE_STATS.as_bytes()).unwrap();
        assert_eq!(table.len(), 4);

        let pikachu = table.get("pikachu").unwrap();
        assert_eq!(pikachu.hp, 35);
        assert_eq!(pikachu.speed, 90);
        assert_eq!(pikachu.total, 320);
        assert_eq!(pikachu.type1, "Electric");
    }

    #[test]
    fn test_names_are_lowercased() {
        let table = SpeciesTable::from_csv_bytes(BASE_STATS.as_bytes()).unwrap();
        assert!(table.contains("charizard"));
        assert!(!table.contains("Charizard"));
        assert_eq!(
            table.get("charizard").unwrap().type2.as_deref(),
            Some("Flying")
        );
    }

    #[test]
    fn test_secondary_type_normalization() {
        let table = SpeciesTable::from_csv_bytes(BASE_STATS.as_bytes()).unwrap();
        // blank, literal "None" and whitespace-only all mean no secondary type
        assert_eq!(table.get("pikachu").unwrap().type2, None);
        assert_eq!(table.get("squirtle").unwrap().type2, None);
        assert_eq!(table.get("gengar").unwrap().type2, None);
    }

    #[test]
    fn test_normalize_secondary_type() {
        assert_eq!(normalize_secondary_type(None), None);
        assert_eq!(normalize_secondary_type(Some("")), None);
        assert_eq!(normalize_secondary_type(Some("None")), None);
        assert_eq!(normalize_secondary_type(Some("   ")), None);
        assert_eq!(
            normalize_secondary_type(Some(" Poison ")),
            Some("Poison".to_string())
        );
    }

    #[test]
    fn test_names_sorted() {
        let table = SpeciesTable::from_csv_bytes(BASE_STATS.as_bytes()).unwrap();
        assert_eq!(
            table.names(),
            vec!["charizard", "gengar", "pikachu", "squirtle"]
        );
    }

    #[test]
    fn test_lookup_unknown_species() {
        let table = SpeciesTable::from_csv_bytes(BASE_STATS.as_bytes()).unwrap();
        match table.lookup("missingmon") {
            Err(PredictError::UnknownSpecies(name)) => assert_eq!(name, "missingmon"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_missing_column_is_fatal() {
        let csv = "pokemon,hp,attack\npikachu,35,55\n";
        assert!(matches!(
            SpeciesTable::from_csv_bytes(csv.as_bytes()),
            Err(PredictError::Data(_))
        ));
    }

    #[test]
    fn test_missing_stat_value_is_fatal() {
        let csv = "\
pokemon,hp,attack,defense,sp_attack,sp_defense,speed,total,type1,type2
pikachu,,55,40,50,50,90,320,Electric,
";
        let err = SpeciesTable::from_csv_bytes(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("hp"));
    }

    #[test]
    fn test_empty_table_is_fatal() {
        let csv = "pokemon,hp,attack,defense,sp_attack,sp_defense,speed,total,type1,type2\n";
        assert!(SpeciesTable::from_csv_bytes(csv.as_bytes()).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            SpeciesTable::load("/nonexistent/base_stats.csv"),
            Err(PredictError::Data(_))
        ));
    }
}
