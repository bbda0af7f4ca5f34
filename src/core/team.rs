//! Team Battle Aggregation
//!
//! A team battle is scored as the mean over every pairwise 1v1 matchup of the
//! two rosters. There is no synergy modelling.
//!
//! The team winner is the side with the strictly greater average probability;
//! an exact tie goes to team 2.

use tracing::debug;

use crate::error::PredictError;
use crate::models::{BattleConditions, PredictionResult, Side, TeamResult, TeamSide};

/// Anything that can predict a single matchup
pub trait MatchupPredictor {
    fn predict_matchup(
        &self,
        pokemon1: &str,
        pokemon2: &str,
        conditions: &BattleConditions,
    ) -> Result<PredictionResult, PredictError>;
}

/// Predict `team1` against `team2` over the full cross product of matchups.
///
/// Statuses are always "None" in team mode, whatever `conditions` carries.
/// Roster size limits are enforced by the caller; empty rosters are rejected.
pub fn predict_teams<P, S>(
    predictor: &P,
    team1: &[S],
    team2: &[S],
    conditions: &BattleConditions,
) -> Result<TeamResult, PredictError>
where
    P: MatchupPredictor + ?Sized,
    S: AsRef<str>,
{
    if team1.is_empty() || team2.is_empty() {
        return Err(PredictError::InvalidInput(
            "Both teams must have at least one Pokemon".to_string(),
        ));
    }

    let conditions = conditions.without_status();

    let mut team1_score = 0.0;
    let mut team2_score = 0.0;
    let mut team1_wins = 0;
    let mut team2_wins = 0;

    for p1 in team1 {
        for p2 in team2 {
            let pred = predictor.predict_matchup(p1.as_ref(), p2.as_ref(), &conditions)?;

            team1_score += pred.probabilities.pokemon1;
            team2_score += pred.probabilities.pokemon2;

            match pred.winner {
                Side::Pokemon1 => team1_wins += 1,
                Side::Pokemon2 => team2_wins += 1,
            }
        }
    }

    let total_matchups = team1.len() * team2.len();
    let team1_avg = team1_score / total_matchups as f64;
    let team2_avg = team2_score / total_matchups as f64;

    let winner = if team1_avg > team2_avg {
        TeamSide::Team1
    } else {
        TeamSide::Team2
    };

    debug!(
        "Team battle over {} matchups: {:.3} / {:.3} ({}-{})",
        total_matchups, team1_avg, team2_avg, team1_wins, team2_wins
    );

    Ok(TeamResult {
        winner,
        team1_score: team1_avg,
        team2_score: team2_avg,
        team1_wins,
        team2_wins,
        total_matchups,
        confidence: team1_avg.max(team2_avg),
    })
}
