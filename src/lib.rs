//! Pokebattle - Pokemon battle outcome prediction
//!
//! This library provides:
//! - Reference data loading (species base stats, type advantage chart)
//! - Type-advantage resolution and 27-column feature engineering
//! - Categorical encoding with the fitted label encoders
//! - 1v1 prediction through a pre-fitted classifier (ONNX or JSON forest)
//! - Team battle aggregation over every pairwise matchup
//!
//! # Example
//!
//! ```no_run
//! use pokebattle::config::ArtifactPaths;
//! use pokebattle::models::BattleConditions;
//! use pokebattle::BattlePredictor;
//!
//! let predictor = BattlePredictor::load(&ArtifactPaths::new("data", "models"))?;
//!
//! let result = predictor.predict("pikachu", "squirtle", &BattleConditions::default())?;
//! println!("{} wins ({:.1}%)", result.winner_name, result.confidence * 100.0);
//!
//! let team = predictor.predict_teams(
//!     &["pikachu", "snorlax"],
//!     &["squirtle", "charmander"],
//!     &BattleConditions::field("Rain", "None", "None"),
//! )?;
//! println!("{:?} wins {}-{}", team.winner, team.team1_wins, team.team2_wins);
//! # Ok::<(), pokebattle::error::PredictError>(())
//! ```

pub mod classifier;
pub mod config;
pub mod core;
pub mod data;
pub mod error;
pub mod models;
pub mod predictor;

// Re-export commonly used types
pub use classifier::{load_classifier, Classifier, ClassifierOutput};
pub use config::{AppConfig, ArtifactPaths};
pub use data::{CategoricalEncoder, FeatureLayout, SpeciesStats, SpeciesTable, TypeChart};
pub use error::PredictError;
pub use models::{BattleConditions, PredictionResult, Side, TeamResult, TeamSide};
pub use predictor::BattlePredictor;
