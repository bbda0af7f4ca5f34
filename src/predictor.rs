use tracing::{debug, info};

use crate::classifier::{load_classifier, Classifier};
use crate::config::ArtifactPaths;
use crate::core::team::{self, MatchupPredictor};
use crate::data::{
    CategoricalEncoder, FeatureEngineering, FeatureLayout, FeatureRecord, SpeciesStats,
    SpeciesTable, TypeChart,
};
use crate::error::PredictError;
use crate::models::{BattleConditions, PredictionResult, Side, SideProbabilities, TeamResult};

/// Inference context: reference tables, encoders and the fitted classifier.
///
/// Immutable once built, so a single instance can serve concurrent requests.
pub struct BattlePredictor {
    species: SpeciesTable,
    type_chart: TypeChart,
    encoder: CategoricalEncoder,
    layout: FeatureLayout,
    classifier: Box<dyn Classifier>,
}

impl BattlePredictor {
    /// Assemble a predictor from already loaded parts
    pub fn new(
        species: SpeciesTable,
        type_chart: TypeChart,
        encoder: CategoricalEncoder,
        layout: FeatureLayout,
        classifier: Box<dyn Classifier>,
    ) -> Result<Self, PredictError> {
        if let Some(expected) = classifier.expected_features() {
            if expected != layout.len() {
                return Err(PredictError::Model(format!(
                    "model expects {} features but feature columns list {}",
                    expected,
                    layout.len()
                )));
            }
        }

        Ok(Self {
            species,
            type_chart,
            encoder,
            layout,
            classifier,
        })
    }

    /// Load every artifact; any missing or malformed file fails the whole load
    pub fn load(paths: &ArtifactPaths) -> Result<Self, PredictError> {
        let species = SpeciesTable::load(&paths.base_stats)?;
        let type_chart = TypeChart::load(&paths.type_advantage)?;
        let encoder = CategoricalEncoder::load(&paths.label_encoders)?;
        let layout = FeatureLayout::load(&paths.feature_columns)?;
        let classifier = load_classifier(&paths.model)?;

        info!(
            "Battle predictor ready: {} species, {} type matchups, {} backend",
            species.len(),
            type_chart.len(),
            classifier.backend()
        );

        Self::new(species, type_chart, encoder, layout, classifier)
    }

    pub fn species(&self, name: &str) -> Option<&SpeciesStats> {
        self.species.get(name)
    }

    pub fn is_known(&self, name: &str) -> bool {
        self.species.contains(name)
    }

    /// Known species names, sorted
    pub fn species_names(&self) -> Vec<&str> {
        self.species.names()
    }

    pub fn species_count(&self) -> usize {
        self.species.len()
    }

    pub fn backend(&self) -> &'static str {
        self.classifier.backend()
    }

    /// Feature record for a matchup, failing on unknown species
    pub fn build_features(
        &self,
        pokemon1: &str,
        pokemon2: &str,
        conditions: &BattleConditions,
    ) -> Result<FeatureRecord, PredictError> {
        let p1 = self.species.lookup(pokemon1)?;
        let p2 = self.species.lookup(pokemon2)?;
        Ok(FeatureEngineering::build_record(
            p1,
            p2,
            &self.type_chart,
            conditions,
        ))
    }

    /// Model input vector for a feature record, in saved column order
    pub fn encode(&self, record: &FeatureRecord) -> Vec<f64> {
        self.layout.to_vec(record, &self.encoder)
    }

    /// Predict the winner of `pokemon1` against `pokemon2`
    pub fn predict(
        &self,
        pokemon1: &str,
        pokemon2: &str,
        conditions: &BattleConditions,
    ) -> Result<PredictionResult, PredictError> {
        let record = self.build_features(pokemon1, pokemon2, conditions)?;
        let features = self.encode(&record);
        let output = self.classifier.classify(&features)?;

        // label 1 means side 1 wins; probabilities[1] is side 1's probability
        let (winner, winner_name) = if output.label == 1 {
            (Side::Pokemon1, pokemon1)
        } else {
            (Side::Pokemon2, pokemon2)
        };
        let probabilities = SideProbabilities {
            pokemon1: output.probabilities[1],
            pokemon2: output.probabilities[0],
        };

        debug!(
            "{} vs {}: {:?} ({:.3} / {:.3})",
            pokemon1, pokemon2, winner, probabilities.pokemon1, probabilities.pokemon2
        );

        Ok(PredictionResult {
            winner,
            winner_name: winner_name.to_string(),
            confidence: probabilities.pokemon1.max(probabilities.pokemon2),
            probabilities,
            pokemon1: pokemon1.to_string(),
            pokemon2: pokemon2.to_string(),
        })
    }

    /// Predict a team battle as the average of every pairwise matchup
    pub fn predict_teams<S: AsRef<str>>(
        &self,
        team1: &[S],
        team2: &[S],
        conditions: &BattleConditions,
    ) -> Result<TeamResult, PredictError> {
        team::predict_teams(self, team1, team2, conditions)
    }
}

impl MatchupPredictor for BattlePredictor {
    fn predict_matchup(
        &self,
        pokemon1: &str,
        pokemon2: &str,
        conditions: &BattleConditions,
    ) -> Result<PredictionResult, PredictError> {
        self.predict(pokemon1, pokemon2, conditions)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::classifier::{
        ClassifierOutput, DecisionTree, ForestClassifier, OnnxClassifier, LOGISTIC_ONNX_FIXTURE,
    };
    use crate::data::NUM_FEATURES;
    use crate::models::TeamSide;
    use std::collections::HashMap;

    const BASE_STATS: &str = "\
pokemon,hp,attack,defense,sp_attack,sp_defense,speed,total,type1,type2
pikachu,35,55,40,50,50,90,320,Electric,
squirtle,44,48,65,50,64,43,314,Water,
charmander,39,52,43,60,50,65,309,Fire,
bulbasaur,45,49,49,65,65,45,318,Grass,Poison
snorlax,160,110,65,65,110,30,540,Normal,
twin_a,50,50,50,50,50,50,300,Normal,
twin_b,50,50,50,50,50,50,300,Normal,
";

    const TYPE_ADVANTAGE: &str = "\
attacker,defender,advantage
Electric,Water,1
Water,Fire,1
Fire,Grass,1
Grass,Water,1
Fire,Water,-1
Water,Grass,-1
";

    /// Logistic score over the speed and total differences
    pub(crate) struct StubClassifier;

    impl Classifier for StubClassifier {
        fn backend(&self) -> &'static str {
            "stub"
        }

        fn expected_features(&self) -> Option<usize> {
            Some(NUM_FEATURES)
        }

        fn classify(&self, features: &[f64]) -> Result<ClassifierOutput, PredictError> {
            // speed_diff = 19, total_diff = 20, type_advantage = 21
            let score = 0.02 * features[19] + 0.01 * features[20] + 0.5 * features[21];
            let p1 = 1.0 / (1.0 + (-score).exp());
            Ok(ClassifierOutput {
                label: if p1 > 0.5 { 1 } else { 0 },
                probabilities: [1.0 - p1, p1],
            })
        }
    }

    pub(crate) fn encoder() -> CategoricalEncoder {
        let mut classes = HashMap::new();
        classes.insert("weather", vec!["Clear", "Hail", "Rain", "Sandstorm", "Sun"]);
        classes.insert("status_p1", vec!["Burn", "None", "Paralysis", "Sleep"]);
        classes.insert("status_p2", vec!["Burn", "None", "Paralysis", "Sleep"]);
        classes.insert("terrain", vec!["Electric", "Grassy", "None"]);
        classes.insert("hazards", vec!["None", "Spikes", "Stealth Rock"]);
        CategoricalEncoder::from_classes(classes).unwrap()
    }

    pub(crate) fn predictor_with(classifier: Box<dyn Classifier>) -> BattlePredictor {
        BattlePredictor::new(
            SpeciesTable::from_csv_bytes(BASE_STATS.as_bytes()).unwrap(),
            TypeChart::from_csv_bytes(TYPE_ADVANTAGE.as_bytes()).unwrap(),
            encoder(),
            FeatureLayout::training_order(),
            classifier,
        )
        .unwrap()
    }

    pub(crate) fn predictor() -> BattlePredictor {
        predictor_with(Box::new(StubClassifier))
    }

    #[test]
    fn test_predict_result_shape() {
        let p = predictor();
        let result = p
            .predict("pikachu", "squirtle", &BattleConditions::default())
            .unwrap();

        assert_eq!(result.pokemon1, "pikachu");
        assert_eq!(result.pokemon2, "squirtle");
        // faster, stronger and type advantage
        assert_eq!(result.winner, Side::Pokemon1);
        assert_eq!(result.winner_name, "pikachu");
        assert!(result.probabilities.pokemon1 > 0.5);
    }

    #[test]
    fn test_probability_invariants() {
        let p = predictor();
        let names = p.species_names();
        for &a in &names {
            for &b in &names {
                let r = p.predict(a, b, &BattleConditions::default()).unwrap();
                let sum = r.probabilities.pokemon1 + r.probabilities.pokemon2;
                assert!((sum - 1.0).abs() < 1e-9);
                assert_eq!(
                    r.confidence,
                    r.probabilities.pokemon1.max(r.probabilities.pokemon2)
                );
            }
        }
    }

    #[test]
    fn test_winner_matches_probabilities() {
        let p = predictor();
        let r = p
            .predict("snorlax", "charmander", &BattleConditions::default())
            .unwrap();
        match r.winner {
            Side::Pokemon1 => assert!(r.probabilities.pokemon1 > r.probabilities.pokemon2),
            Side::Pokemon2 => assert!(r.probabilities.pokemon2 >= r.probabilities.pokemon1),
        }
    }

    #[test]
    fn test_predict_is_deterministic() {
        let p = predictor();
        let conditions = BattleConditions {
            weather: "Rain".to_string(),
            status_p1: "Burn".to_string(),
            ..BattleConditions::default()
        };
        let first = p.predict("bulbasaur", "charmander", &conditions).unwrap();
        for _ in 0..10 {
            assert_eq!(p.predict("bulbasaur", "charmander", &conditions).unwrap(), first);
        }
    }

    #[test]
    fn test_unknown_species_rejected() {
        let p = predictor();
        let err = p
            .predict("missingmon", "pikachu", &BattleConditions::default())
            .unwrap_err();
        assert!(matches!(err, PredictError::UnknownSpecies(ref n) if n == "missingmon"));

        assert!(p
            .predict("pikachu", "missingmon", &BattleConditions::default())
            .is_err());
    }

    #[test]
    fn test_identical_species_near_even() {
        let p = predictor();
        let r = p
            .predict("twin_a", "twin_b", &BattleConditions::default())
            .unwrap();
        assert!((r.probabilities.pokemon1 - 0.5).abs() < 0.05);
        assert!((r.probabilities.pokemon2 - 0.5).abs() < 0.05);
    }

    #[test]
    fn test_unseen_condition_is_not_an_error() {
        let p = predictor();
        let conditions = BattleConditions {
            weather: "Fog".to_string(),
            terrain: "Misty".to_string(),
            ..BattleConditions::default()
        };
        assert!(p.predict("pikachu", "squirtle", &conditions).is_ok());
    }

    #[test]
    fn test_encode_uses_training_layout() {
        let p = predictor();
        let record = p
            .build_features("pikachu", "squirtle", &BattleConditions::default())
            .unwrap();
        let vec = p.encode(&record);
        assert_eq!(vec.len(), NUM_FEATURES);
        assert_eq!(vec[0], 35.0);
        assert_eq!(vec[7], 44.0);
        assert_eq!(vec[19], 47.0); // speed_diff
        assert_eq!(vec[21], 1.0); // Electric vs Water
        assert_eq!(vec[22], 0.0); // Clear
        assert_eq!(vec[23], 1.0); // None
    }

    #[test]
    fn test_feature_count_mismatch_is_fatal() {
        let forest = ForestClassifier::new(
            vec![DecisionTree {
                children_left: vec![-1],
                children_right: vec![-1],
                feature: vec![-2],
                threshold: vec![-2.0],
                value: vec![vec![1.0, 1.0]],
            }],
            vec![0, 1],
            Some(10),
        )
        .unwrap();
        let result = BattlePredictor::new(
            SpeciesTable::from_csv_bytes(BASE_STATS.as_bytes()).unwrap(),
            TypeChart::from_csv_bytes(TYPE_ADVANTAGE.as_bytes()).unwrap(),
            encoder(),
            FeatureLayout::training_order(),
            Box::new(forest),
        );
        assert!(matches!(result, Err(PredictError::Model(_))));
    }

    #[test]
    fn test_forest_backend_end_to_end() {
        // split on speed_diff (19) at 0: faster side 1 wins
        let forest = ForestClassifier::new(
            vec![DecisionTree {
                children_left: vec![1, -1, -1],
                children_right: vec![2, -1, -1],
                feature: vec![19, -2, -2],
                threshold: vec![0.0, -2.0, -2.0],
                value: vec![vec![5.0, 5.0], vec![9.0, 1.0], vec![2.0, 8.0]],
            }],
            vec![0, 1],
            Some(NUM_FEATURES),
        )
        .unwrap();
        let p = predictor_with(Box::new(forest));
        assert_eq!(p.backend(), "forest");

        let r = p
            .predict("pikachu", "snorlax", &BattleConditions::default())
            .unwrap();
        assert_eq!(r.winner, Side::Pokemon1);
        assert!((r.probabilities.pokemon1 - 0.8).abs() < 1e-12);
        assert!((r.confidence - 0.8).abs() < 1e-12);

        let r = p
            .predict("snorlax", "pikachu", &BattleConditions::default())
            .unwrap();
        assert_eq!(r.winner, Side::Pokemon2);
        assert_eq!(r.winner_name, "pikachu");
        assert!((r.probabilities.pokemon2 - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_onnx_backend_end_to_end() {
        let model = OnnxClassifier::load(LOGISTIC_ONNX_FIXTURE).unwrap();
        let p = predictor_with(Box::new(model));
        assert_eq!(p.backend(), "onnx");

        // speed_diff 47 and Electric over Water: logit 2.85 for side 1
        let r = p
            .predict("pikachu", "squirtle", &BattleConditions::default())
            .unwrap();
        assert_eq!(r.winner, Side::Pokemon1);
        assert_eq!(r.winner_name, "pikachu");
        assert!((r.probabilities.pokemon1 - 1.0 / (1.0 + (-2.85f64).exp())).abs() < 1e-5);
        assert!((r.probabilities.pokemon1 + r.probabilities.pokemon2 - 1.0).abs() < 1e-5);
        assert_eq!(r.confidence, r.probabilities.pokemon1);

        let r = p
            .predict("squirtle", "pikachu", &BattleConditions::default())
            .unwrap();
        assert_eq!(r.winner, Side::Pokemon2);
        assert_eq!(r.winner_name, "pikachu");
        assert!(r.probabilities.pokemon2 > r.probabilities.pokemon1);
    }

    #[test]
    fn test_predict_teams_delegates() {
        let p = predictor();
        let team1 = ["pikachu", "snorlax"];
        let team2 = ["squirtle", "charmander", "bulbasaur"];
        let conditions = BattleConditions {
            weather: "Rain".to_string(),
            status_p1: "Burn".to_string(),
            ..BattleConditions::default()
        };
        let result = p.predict_teams(&team1, &team2, &conditions).unwrap();

        // every pairing, predicted one by one with statuses cleared
        let field = conditions.without_status();
        let pairwise: Vec<PredictionResult> = team1
            .iter()
            .flat_map(|a| team2.iter().map(move |b| (*a, *b)))
            .map(|(a, b)| p.predict(a, b, &field).unwrap())
            .collect();
        let mean1 = pairwise.iter().map(|r| r.probabilities.pokemon1).sum::<f64>() / 6.0;
        let mean2 = pairwise.iter().map(|r| r.probabilities.pokemon2).sum::<f64>() / 6.0;
        let wins1 = pairwise
            .iter()
            .filter(|r| r.winner == Side::Pokemon1)
            .count();

        assert_eq!(result.total_matchups, 6);
        assert!((result.team1_score - mean1).abs() < 1e-12);
        assert!((result.team2_score - mean2).abs() < 1e-12);
        assert_eq!(result.team1_wins, wins1);
        assert_eq!(result.team2_wins, 6 - wins1);
        assert!((result.confidence - mean1.max(mean2)).abs() < 1e-12);
        assert_eq!(result.winner, TeamSide::Team1);
    }

    #[test]
    fn test_species_lookup_helpers() {
        let p = predictor();
        assert!(p.is_known("pikachu"));
        assert!(!p.is_known("missingmon"));
        assert_eq!(p.species("snorlax").unwrap().hp, 160);
        assert_eq!(p.species_count(), 7);
        assert_eq!(p.species_names()[0], "bulbasaur");
    }
}
