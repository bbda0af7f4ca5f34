//! Pokebattle CLI - Command-line interface for Pokemon battle predictions

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Input, MultiSelect, Select};
use std::path::{Path, PathBuf};

use pokebattle::config::{ArtifactPaths, DEFAULT_DATA_DIR, DEFAULT_MODEL_DIR};
use pokebattle::data::normalize_species_name;
use pokebattle::error::MAX_ROSTER_SIZE;
use pokebattle::models::{BattleConditions, TeamResponse, DEFAULT_CONDITION, DEFAULT_WEATHER};
use pokebattle::{BattlePredictor, PredictionResult, Side, TeamResult, TeamSide};

const WEATHERS: &[&str] = &["Clear", "Rain", "Sun", "Sandstorm", "Hail"];
const STATUSES: &[&str] = &["None", "Burn", "Paralysis", "Poison", "Sleep", "Freeze"];
const TERRAINS: &[&str] = &["None", "Electric", "Grassy", "Misty", "Psychic"];
const HAZARDS: &[&str] = &["None", "Stealth Rock", "Spikes", "Toxic Spikes"];

#[derive(Parser)]
#[command(name = "pokebattle")]
#[command(author, version, about = "Pokemon battle prediction CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Run in interactive mode
    #[arg(short, long)]
    interactive: bool,

    /// Directory holding base_stats.csv and type_advantage.csv
    #[arg(long, default_value = DEFAULT_DATA_DIR)]
    data_dir: PathBuf,

    /// Directory holding the model and its encoders
    #[arg(long, default_value = DEFAULT_MODEL_DIR)]
    model_dir: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Predict a 1v1 matchup
    Predict {
        /// First Pokemon
        pokemon1: String,

        /// Second Pokemon
        pokemon2: String,

        #[arg(long, default_value = DEFAULT_WEATHER)]
        weather: String,

        /// Status of the first Pokemon
        #[arg(long, default_value = DEFAULT_CONDITION)]
        status1: String,

        /// Status of the second Pokemon
        #[arg(long, default_value = DEFAULT_CONDITION)]
        status2: String,

        #[arg(long, default_value = DEFAULT_CONDITION)]
        terrain: String,

        #[arg(long, default_value = DEFAULT_CONDITION)]
        hazards: String,

        /// Print the raw result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Predict a team battle (1-3 Pokemon per side)
    Team {
        /// Comma-separated roster, e.g. pikachu,snorlax
        #[arg(long, value_delimiter = ',', required = true)]
        team1: Vec<String>,

        #[arg(long, value_delimiter = ',', required = true)]
        team2: Vec<String>,

        #[arg(long, default_value = DEFAULT_WEATHER)]
        weather: String,

        #[arg(long, default_value = DEFAULT_CONDITION)]
        terrain: String,

        #[arg(long, default_value = DEFAULT_CONDITION)]
        hazards: String,

        /// Print the rounded result as JSON
        #[arg(long)]
        json: bool,
    },

    /// List available Pokemon
    List,

    /// Show stats of one Pokemon
    Show {
        name: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.interactive {
        let predictor = load_predictor(&cli.data_dir, &cli.model_dir)?;
        return run_interactive(&predictor);
    }

    let Some(command) = cli.command else {
        println!("{}", "Pokemon Battle Predictor".cyan().bold());
        println!("Use --help for usage information or --interactive for interactive mode.");
        return Ok(());
    };

    let predictor = load_predictor(&cli.data_dir, &cli.model_dir)?;

    match command {
        Commands::Predict {
            pokemon1,
            pokemon2,
            weather,
            status1,
            status2,
            terrain,
            hazards,
            json,
        } => {
            let conditions = BattleConditions {
                weather,
                status_p1: status1,
                status_p2: status2,
                terrain,
                hazards,
            };
            predict_matchup(&predictor, &pokemon1, &pokemon2, &conditions, json)?;
        }
        Commands::Team {
            team1,
            team2,
            weather,
            terrain,
            hazards,
            json,
        } => {
            let conditions = BattleConditions::field(&weather, &terrain, &hazards);
            predict_team(&predictor, &team1, &team2, &conditions, json)?;
        }
        Commands::List => list_pokemon(&predictor),
        Commands::Show { name } => show_pokemon(&predictor, &name)?,
    }

    Ok(())
}

fn load_predictor(data_dir: &Path, model_dir: &Path) -> Result<BattlePredictor> {
    let paths = ArtifactPaths::new(data_dir, model_dir);
    BattlePredictor::load(&paths).with_context(|| {
        format!(
            "Failed to load predictor (data: {:?}, models: {:?})",
            data_dir, model_dir
        )
    })
}

/// Normalize a species name and fail early with a readable message when unknown
fn resolve_species(predictor: &BattlePredictor, raw: &str) -> Result<String> {
    let name = normalize_species_name(raw);
    if name.is_empty() {
        bail!("Pokemon name must not be empty");
    }
    if !predictor.is_known(&name) {
        bail!("Unknown Pokemon: {} (see `pokebattle list`)", name);
    }
    Ok(name)
}

fn predict_matchup(
    predictor: &BattlePredictor,
    pokemon1: &str,
    pokemon2: &str,
    conditions: &BattleConditions,
    json: bool,
) -> Result<()> {
    let pokemon1 = resolve_species(predictor, pokemon1)?;
    let pokemon2 = resolve_species(predictor, pokemon2)?;
    if pokemon1 == pokemon2 {
        bail!("Pokemon must be different");
    }

    let result = predictor.predict(&pokemon1, &pokemon2, conditions)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_matchup(&result, conditions);
    }
    Ok(())
}

fn print_matchup(result: &PredictionResult, conditions: &BattleConditions) {
    println!(
        "{}: {} vs {}",
        "Predicting".green(),
        result.pokemon1.bold(),
        result.pokemon2.bold()
    );
    print_conditions(conditions, true);
    println!();

    let (p1_bar, p2_bar) = match result.winner {
        Side::Pokemon1 => ("◀".green(), " ".normal()),
        Side::Pokemon2 => (" ".normal(), "◀".green()),
    };
    println!(
        "  {:<14} {:>6.1}% {}",
        result.pokemon1,
        result.probabilities.pokemon1 * 100.0,
        p1_bar
    );
    println!(
        "  {:<14} {:>6.1}% {}",
        result.pokemon2,
        result.probabilities.pokemon2 * 100.0,
        p2_bar
    );
    println!();
    println!(
        "{} {} ({:.1}% confidence)",
        "Winner:".yellow().bold(),
        result.winner_name.green().bold(),
        result.confidence * 100.0
    );
}

fn predict_team(
    predictor: &BattlePredictor,
    team1: &[String],
    team2: &[String],
    conditions: &BattleConditions,
    json: bool,
) -> Result<()> {
    for (label, team) in [("team1", team1), ("team2", team2)] {
        if team.is_empty() || team.len() > MAX_ROSTER_SIZE {
            bail!(
                "{} must have 1 to {} Pokemon, got {}",
                label,
                MAX_ROSTER_SIZE,
                team.len()
            );
        }
    }
    let team1 = team1
        .iter()
        .map(|n| resolve_species(predictor, n))
        .collect::<Result<Vec<_>>>()?;
    let team2 = team2
        .iter()
        .map(|n| resolve_species(predictor, n))
        .collect::<Result<Vec<_>>>()?;

    let result = predictor.predict_teams(&team1, &team2, conditions)?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&TeamResponse::from(&result))?
        );
    } else {
        print_team(&team1, &team2, &result, conditions);
    }
    Ok(())
}

fn print_team(team1: &[String], team2: &[String], result: &TeamResult, conditions: &BattleConditions) {
    println!(
        "{}: [{}] vs [{}]",
        "Team battle".green(),
        team1.join(", ").bold(),
        team2.join(", ").bold()
    );
    print_conditions(conditions, false);
    println!();

    println!("{}", "Matchups:".yellow().bold());
    println!(
        "  {} {} / {} {} (of {})",
        "team1".bold(),
        result.team1_wins,
        "team2".bold(),
        result.team2_wins,
        result.total_matchups
    );
    println!(
        "  {:<8} {:>6.1}%",
        "team1",
        result.team1_score * 100.0
    );
    println!(
        "  {:<8} {:>6.1}%",
        "team2",
        result.team2_score * 100.0
    );
    println!();

    let winner = match result.winner {
        TeamSide::Team1 => "Team 1",
        TeamSide::Team2 => "Team 2",
    };
    println!(
        "{} {} ({:.1}% confidence)",
        "Winner:".yellow().bold(),
        winner.green().bold(),
        result.confidence * 100.0
    );
}

fn print_conditions(conditions: &BattleConditions, with_status: bool) {
    let mut parts = vec![
        format!("weather={}", conditions.weather),
        format!("terrain={}", conditions.terrain),
        format!("hazards={}", conditions.hazards),
    ];
    if with_status {
        parts.push(format!("status1={}", conditions.status_p1));
        parts.push(format!("status2={}", conditions.status_p2));
    }
    println!("  {}", parts.join("  ").dimmed());
}

fn list_pokemon(predictor: &BattlePredictor) {
    let names = predictor.species_names();
    println!(
        "{} ({}):",
        "Available Pokemon".yellow().bold(),
        names.len()
    );
    for chunk in names.chunks(6) {
        let row: Vec<String> = chunk.iter().map(|n| format!("{:<14}", n)).collect();
        println!("  {}", row.join(""));
    }
}

fn show_pokemon(predictor: &BattlePredictor, name: &str) -> Result<()> {
    let name = resolve_species(predictor, name)?;
    let stats = predictor
        .species(&name)
        .with_context(|| format!("Unknown Pokemon: {}", name))?;

    let types = match &stats.type2 {
        Some(t2) => format!("{} / {}", stats.type1, t2),
        None => stats.type1.clone(),
    };
    println!("{} ({})", stats.name.cyan().bold(), types);
    for (label, value) in [
        ("HP", stats.hp),
        ("Attack", stats.attack),
        ("Defense", stats.defense),
        ("Sp. Atk", stats.sp_attack),
        ("Sp. Def", stats.sp_defense),
        ("Speed", stats.speed),
    ] {
        println!("  {:<8} {:>4} {}", label, value, stat_bar(value));
    }
    println!("  {:<8} {:>4}", "Total".bold(), stats.total);
    Ok(())
}

/// One block per 10 points, capped at 20
fn stat_bar(value: i64) -> String {
    let blocks = (value / 10).clamp(0, 20) as usize;
    "█".repeat(blocks)
}

fn run_interactive(predictor: &BattlePredictor) -> Result<()> {
    println!("{}", "Interactive mode".green().bold());
    println!();

    let theme = ColorfulTheme::default();
    let names = predictor.species_names();
    if names.len() < 2 {
        bail!("At least two Pokemon are needed for a battle");
    }

    loop {
        let options = ["1v1 battle", "Team battle", "Show a Pokemon", "Quit"];

        let selection = Select::with_theme(&theme)
            .with_prompt("What would you like to do?")
            .items(&options)
            .default(0)
            .interact()?;

        match selection {
            0 => {
                let p1 = Select::with_theme(&theme)
                    .with_prompt("First Pokemon")
                    .items(&names)
                    .interact()?;
                let p2 = Select::with_theme(&theme)
                    .with_prompt("Second Pokemon")
                    .items(&names)
                    .interact()?;

                let weather = pick(&theme, "Weather", WEATHERS)?;
                let status_p1 = pick(&theme, "Status of first Pokemon", STATUSES)?;
                let status_p2 = pick(&theme, "Status of second Pokemon", STATUSES)?;
                let terrain = pick(&theme, "Terrain", TERRAINS)?;
                let hazards = pick(&theme, "Hazards", HAZARDS)?;
                let conditions = BattleConditions {
                    weather,
                    status_p1,
                    status_p2,
                    terrain,
                    hazards,
                };

                println!();
                if let Err(e) = predict_matchup(predictor, names[p1], names[p2], &conditions, false)
                {
                    println!("{} {}", "Error:".red().bold(), e);
                }
                println!();
            }
            1 => {
                let team1 = pick_team(&theme, "Team 1", &names)?;
                let team2 = pick_team(&theme, "Team 2", &names)?;
                let weather = pick(&theme, "Weather", WEATHERS)?;
                let terrain = pick(&theme, "Terrain", TERRAINS)?;
                let hazards = pick(&theme, "Hazards", HAZARDS)?;
                let conditions = BattleConditions::field(&weather, &terrain, &hazards);

                println!();
                if let Err(e) = predict_team(predictor, &team1, &team2, &conditions, false) {
                    println!("{} {}", "Error:".red().bold(), e);
                }
                println!();
            }
            2 => {
                let name: String = Input::with_theme(&theme)
                    .with_prompt("Pokemon name")
                    .interact_text()?;

                println!();
                if let Err(e) = show_pokemon(predictor, &name) {
                    println!("{} {}", "Error:".red().bold(), e);
                }
                println!();
            }
            3 => {
                println!("Goodbye!");
                break;
            }
            _ => {}
        }
    }

    Ok(())
}

fn pick(theme: &ColorfulTheme, prompt: &str, options: &[&str]) -> Result<String> {
    let index = Select::with_theme(theme)
        .with_prompt(prompt)
        .items(options)
        .default(0)
        .interact()?;
    Ok(options[index].to_string())
}

fn pick_team(theme: &ColorfulTheme, prompt: &str, names: &[&str]) -> Result<Vec<String>> {
    loop {
        let picked = MultiSelect::with_theme(theme)
            .with_prompt(format!("{} (1-{} Pokemon, space to select)", prompt, MAX_ROSTER_SIZE))
            .items(names)
            .interact()?;
        if (1..=MAX_ROSTER_SIZE).contains(&picked.len()) {
            return Ok(picked.into_iter().map(|i| names[i].to_string()).collect());
        }
        println!(
            "{} pick between 1 and {} Pokemon",
            "Error:".red().bold(),
            MAX_ROSTER_SIZE
        );
    }
}
