use actix_web::{web, HttpResponse};
use std::sync::Arc;

use crate::AppState;
use pokebattle::data::normalize_species_name;
use pokebattle::error::AppError;
use pokebattle::models::{SpeciesDetailResponse, SpeciesListResponse};

/// List every known species, sorted by name
pub async fn list_pokemon(state: web::Data<Arc<AppState>>) -> HttpResponse {
    let pokemon = state
        .predictor
        .species_names()
        .into_iter()
        .map(str::to_string)
        .collect();

    HttpResponse::Ok().json(SpeciesListResponse { pokemon })
}

/// Stats and types of one species
pub async fn get_pokemon(
    state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let name = normalize_species_name(&path.into_inner());
    let stats = state
        .predictor
        .species(&name)
        .ok_or_else(|| AppError::NotFound(format!("Unknown Pokemon: {}", name)))?;

    Ok(HttpResponse::Ok().json(SpeciesDetailResponse {
        name: stats.name.clone(),
        type1: stats.type1.clone(),
        type2: stats.type2.clone(),
        stats: stats.clone(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::app_state;
    use actix_web::{http::StatusCode, test, App};
    use serde_json::Value;

    #[actix_web::test]
    async fn test_list_is_sorted() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(app_state()))
                .route("/api/pokemon", web::get().to(list_pokemon)),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/pokemon").to_request();
        let body: SpeciesListResponse = test::call_and_read_body_json(&app, req).await;

        assert_eq!(
            body.pokemon,
            vec!["bulbasaur", "charmander", "pikachu", "snorlax", "squirtle"]
        );
    }

    #[actix_web::test]
    async fn test_get_pokemon() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(app_state()))
                .route("/api/pokemon/{name}", web::get().to(get_pokemon)),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/pokemon/Bulbasaur").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["name"], "bulbasaur");
        assert_eq!(body["type1"], "Grass");
        assert_eq!(body["type2"], "Poison");
        assert_eq!(body["stats"]["speed"], 45);
        assert_eq!(body["stats"]["total"], 318);

        let req = test::TestRequest::get().uri("/api/pokemon/squirtle").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert!(body["type2"].is_null());
    }

    #[actix_web::test]
    async fn test_unknown_pokemon_is_404() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(app_state()))
                .route("/api/pokemon/{name}", web::get().to(get_pokemon)),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/pokemon/missingmon").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
