//! Core battle logic modules

pub mod team;

// Re-export commonly used types
pub use team::{predict_teams, MatchupPredictor};
