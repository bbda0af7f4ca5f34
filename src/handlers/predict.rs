use actix_web::{web, HttpResponse};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::AppState;
use pokebattle::data::normalize_species_name;
use pokebattle::error::{validate_roster_size, validate_species_pair, AppError};
use pokebattle::models::{
    BattleConditions, BattleRequest, PredictRequest, TeamBattleRequest, TeamResponse,
};

/// Predict a 1v1 matchup, or a team battle when both rosters are given
pub async fn predict_battle(
    state: web::Data<Arc<AppState>>,
    req: web::Json<PredictRequest>,
) -> Result<HttpResponse, AppError> {
    match req.into_inner() {
        PredictRequest::Team(team) => predict_team(&state, team),
        PredictRequest::Single(single) => predict_single(&state, single),
    }
}

fn predict_single(state: &AppState, req: BattleRequest) -> Result<HttpResponse, AppError> {
    let pokemon1 = normalize_species_name(&req.pokemon1);
    let pokemon2 = normalize_species_name(&req.pokemon2);

    validate_species_pair(&pokemon1, &pokemon2)?;
    for name in [&pokemon1, &pokemon2] {
        if !state.predictor.is_known(name) {
            warn!("Rejected unknown Pokemon: {}", name);
            return Err(AppError::ValidationError(format!("Invalid Pokemon: {}", name)));
        }
    }

    let result = state
        .predictor
        .predict(&pokemon1, &pokemon2, &req.conditions)?;

    Ok(HttpResponse::Ok().json(result))
}

fn predict_team(state: &AppState, req: TeamBattleRequest) -> Result<HttpResponse, AppError> {
    validate_roster_size("team1", req.team1.len())?;
    validate_roster_size("team2", req.team2.len())?;

    let team1: Vec<String> = req.team1.iter().map(|n| normalize_species_name(n)).collect();
    let team2: Vec<String> = req.team2.iter().map(|n| normalize_species_name(n)).collect();
    debug!("Team battle {:?} vs {:?}", team1, team2);

    let conditions = BattleConditions::field(&req.weather, &req.terrain, &req.hazards);
    let result = state.predictor.predict_teams(&team1, &team2, &conditions)?;

    Ok(HttpResponse::Ok().json(TeamResponse::from(&result)))
}
