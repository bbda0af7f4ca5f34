use serde::{Deserialize, Serialize};

use crate::data::SpeciesStats;

pub const DEFAULT_WEATHER: &str = "Clear";
pub const DEFAULT_CONDITION: &str = "None";

fn default_weather() -> String {
    DEFAULT_WEATHER.to_string()
}

fn default_condition() -> String {
    DEFAULT_CONDITION.to_string()
}

/// Environmental context of a battle.
///
/// The defaults ("Clear" weather, "None" elsewhere) are real training
/// categories, not markers for a missing value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleConditions {
    #[serde(default = "default_weather")]
    pub weather: String,
    #[serde(default = "default_condition")]
    pub status_p1: String,
    #[serde(default = "default_condition")]
    pub status_p2: String,
    #[serde(default = "default_condition")]
    pub terrain: String,
    #[serde(default = "default_condition")]
    pub hazards: String,
}

impl Default for BattleConditions {
    fn default() -> Self {
        Self {
            weather: default_weather(),
            status_p1: default_condition(),
            status_p2: default_condition(),
            terrain: default_condition(),
            hazards: default_condition(),
        }
    }
}

impl BattleConditions {
    /// Field conditions with no status on either side (team mode)
    pub fn field(weather: &str, terrain: &str, hazards: &str) -> Self {
        Self {
            weather: weather.to_string(),
            terrain: terrain.to_string(),
            hazards: hazards.to_string(),
            ..Self::default()
        }
    }

    /// Same conditions with both statuses reset to "None"
    pub fn without_status(&self) -> Self {
        Self {
            status_p1: default_condition(),
            status_p2: default_condition(),
            ..self.clone()
        }
    }
}

/// Side of a 1v1 matchup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Pokemon1,
    Pokemon2,
}

/// Side of a team battle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamSide {
    Team1,
    Team2,
}

/// Win probability per side; the two values sum to 1.0
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SideProbabilities {
    pub pokemon1: f64,
    pub pokemon2: f64,
}

/// Outcome of a single matchup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub winner: Side,
    pub winner_name: String,
    pub confidence: f64,
    pub probabilities: SideProbabilities,
    pub pokemon1: String,
    pub pokemon2: String,
}

/// Aggregated outcome over every pairwise matchup of two rosters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamResult {
    pub winner: TeamSide,
    /// Mean side-1 probability over all matchups
    pub team1_score: f64,
    /// Mean side-2 probability over all matchups
    pub team2_score: f64,
    pub team1_wins: usize,
    pub team2_wins: usize,
    pub total_matchups: usize,
    pub confidence: f64,
}

/// 1v1 prediction request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattleRequest {
    #[serde(default)]
    pub pokemon1: String,
    #[serde(default)]
    pub pokemon2: String,
    #[serde(flatten)]
    pub conditions: BattleConditions,
}

/// Team prediction request (statuses are not accepted in team mode)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamBattleRequest {
    pub team1: Vec<String>,
    pub team2: Vec<String>,
    #[serde(default = "default_weather")]
    pub weather: String,
    #[serde(default = "default_condition")]
    pub terrain: String,
    #[serde(default = "default_condition")]
    pub hazards: String,
}

/// Body of `POST /api/predict`: team mode when both `team1` and `team2` are present
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PredictRequest {
    Team(TeamBattleRequest),
    Single(BattleRequest),
}

/// Team probabilities as reported over HTTP
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TeamProbabilities {
    pub team1: f64,
    pub team2: f64,
}

/// Team prediction response, rounded to 3 decimals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamResponse {
    pub winner: TeamSide,
    pub team1_score: f64,
    pub team2_score: f64,
    pub team1_wins: usize,
    pub team2_wins: usize,
    pub total_matchups: usize,
    pub confidence: f64,
    pub probabilities: TeamProbabilities,
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

impl From<&TeamResult> for TeamResponse {
    fn from(result: &TeamResult) -> Self {
        let team1 = round3(result.team1_score);
        let team2 = round3(result.team2_score);
        Self {
            winner: result.winner,
            team1_score: team1,
            team2_score: team2,
            team1_wins: result.team1_wins,
            team2_wins: result.team2_wins,
            total_matchups: result.total_matchups,
            confidence: round3(result.confidence),
            probabilities: TeamProbabilities { team1, team2 },
        }
    }
}

/// Available species
#[derive(Debug, Serialize, Deserialize)]
pub struct SpeciesListResponse {
    pub pokemon: Vec<String>,
}

/// Stats of a single species
#[derive(Debug, Serialize)]
pub struct SpeciesDetailResponse {
    pub name: String,
    pub type1: String,
    pub type2: Option<String>,
    pub stats: SpeciesStats,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub species_loaded: usize,
    pub model_backend: String,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
