//! Reference data loading and feature engineering modules

pub mod csv_loader;
pub mod encoding;
pub mod features;
pub mod species;
pub mod type_chart;

// Re-export commonly used types
pub use encoding::{CategoricalEncoder, CategoricalField};
pub use features::{
    FeatureColumn, FeatureEngineering, FeatureLayout, FeatureRecord, Stat, StatLine,
    FEATURE_COLUMNS, NUM_FEATURES,
};
pub use species::{normalize_secondary_type, normalize_species_name, SpeciesStats, SpeciesTable};
pub use type_chart::TypeChart;
