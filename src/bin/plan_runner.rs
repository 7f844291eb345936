//! Headless Plan Runner
//!
//! Plays out a few turns of two demo armies closing on the objectives and
//! prints every planned move as JSON or text.

use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use tactical_planner::army::{
    apply_planned_movements, update_objective_control, ArmyState, ObjectiveControl, ObjectiveMarker,
    RoleProfile, UnitRole, UnitState,
};
use tactical_planner::core::config::load_planner_config;
use tactical_planner::core::{ArmyId, IdGenerator, PlannerConfig, Point, Result};
use tactical_planner::navigation::NavMeshSet;
use tactical_planner::planner::{
    load_strategy_weights, plan_simultaneous, PlannedMovement, PlanningInput, StrategyProfile,
};
use tactical_planner::terrain::{TerrainLayout, TerrainPreset};

/// Headless Plan Runner - two demo armies planning against each other
#[derive(Parser, Debug)]
#[command(name = "plan_runner")]
#[command(about = "Plan movement turns for two demo armies and print the moves")]
struct Args {
    /// Terrain preset: gt-standard, city-fight, open-field or none
    #[arg(long, default_value = "gt-standard")]
    terrain: String,

    /// Strategy profile for both sides
    #[arg(long, default_value = "greedy")]
    strategy: String,

    /// Planner config TOML (overrides --strategy)
    #[arg(long)]
    config: Option<String>,

    /// Weight table TOML replacing the strategy's weights
    #[arg(long)]
    weights: Option<String>,

    /// Use beam search instead of greedy selection
    #[arg(long)]
    beam: bool,

    /// Beam width when --beam is set
    #[arg(long)]
    beam_width: Option<usize>,

    /// Let units add the expected advance roll
    #[arg(long)]
    allow_advance: bool,

    /// Number of turns to plan
    #[arg(long, default_value_t = 3)]
    turns: u32,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,

    /// Enable debug logging on stderr
    #[arg(long, short = 'v')]
    verbose: bool,
}

/// One turn of output
#[derive(Serialize)]
struct TurnReport {
    turn: u32,
    red: Vec<PlannedMovement>,
    blue: Vec<PlannedMovement>,
    objectives: Vec<ObjectiveControl>,
}

#[derive(Serialize)]
struct RunReport {
    terrain: String,
    strategy: String,
    beam_search: bool,
    turns: Vec<TurnReport>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose {
        "tactical_planner=debug"
    } else {
        "tactical_planner=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with_writer(std::io::stderr)
        .init();

    let config = build_config(&args)?;
    let preset: TerrainPreset = args.terrain.parse()?;

    let mut ids = IdGenerator::new();
    let layout = TerrainLayout::preset(preset, &mut ids);
    let meshes = NavMeshSet::build(layout.features(), config.battlefield, config.nav_clearance);
    tracing::info!(
        terrain = %preset,
        features = layout.len(),
        infantry_waypoints = meshes.infantry.len(),
        default_waypoints = meshes.default.len(),
        "battlefield ready"
    );

    let mut objectives = standard_objectives(&config, &mut ids);
    let mut red = demo_army(ArmyId(1), "Red", config.battlefield.min_x + 6.0, &config, &mut ids);
    let mut blue = demo_army(ArmyId(2), "Blue", config.battlefield.max_x - 6.0, &config, &mut ids);

    let mut turns = Vec::new();
    for turn in 1..=args.turns {
        let red_input = PlanningInput {
            army: &red,
            opponent: &blue,
            objectives: &objectives,
            terrain: layout.features(),
            meshes: &meshes,
        };
        let blue_input = PlanningInput {
            army: &blue,
            opponent: &red,
            ..red_input
        };
        let (red_moves, blue_moves) = plan_simultaneous(&red_input, &blue_input, &config);

        red = apply_planned_movements(&red, &red_moves);
        blue = apply_planned_movements(&blue, &blue_moves);
        update_objective_control(&mut objectives, &[&red, &blue]);

        turns.push(TurnReport {
            turn,
            red: red_moves,
            blue: blue_moves,
            objectives: objectives.iter().map(|o| o.control).collect(),
        });
    }

    let report = RunReport {
        terrain: preset.to_string(),
        strategy: config.strategy.to_string(),
        beam_search: config.use_beam_search,
        turns,
    };

    match args.format.as_str() {
        "text" => print_text(&report),
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        other => {
            eprintln!("Unknown format '{}', defaulting to json", other);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}

fn build_config(args: &Args) -> Result<PlannerConfig> {
    let mut config = match &args.config {
        Some(path) => load_planner_config(path)?,
        None => PlannerConfig {
            strategy: args.strategy.parse::<StrategyProfile>()?,
            ..Default::default()
        },
    };
    if let Some(path) = &args.weights {
        config.weights = Some(load_strategy_weights(path)?);
    }
    config.use_beam_search |= args.beam;
    config.allow_advance |= args.allow_advance;
    if let Some(width) = args.beam_width {
        config.beam_width = width;
    }
    config.validate()?;
    Ok(config)
}

/// Centre primary plus four secondaries, one per quarter
fn standard_objectives(config: &PlannerConfig, ids: &mut IdGenerator) -> Vec<ObjectiveMarker> {
    let board = config.battlefield;
    let c = board.center();
    let dx = board.width() / 4.0;
    let dy = board.height() / 4.0;
    vec![
        ObjectiveMarker::primary(ids, c),
        ObjectiveMarker::secondary(ids, Point::new(c.x - dx, c.y - dy)),
        ObjectiveMarker::secondary(ids, Point::new(c.x - dx, c.y + dy)),
        ObjectiveMarker::secondary(ids, Point::new(c.x + dx, c.y - dy)),
        ObjectiveMarker::secondary(ids, Point::new(c.x + dx, c.y + dy)),
    ]
}

/// Five units spread along a deployment line at `x`
fn demo_army(id: ArmyId, name: &str, x: f32, config: &PlannerConfig, ids: &mut IdGenerator) -> ArmyState {
    let cy = config.battlefield.center().y;
    let units = [
        (UnitRole::Anvil, -8.0, false),
        (UnitRole::Gunline, -3.0, false),
        (UnitRole::MeleeMissile, 0.0, false),
        (UnitRole::Skirmisher, 4.0, false),
        (UnitRole::MobileFirepower, 9.0, true),
    ];
    units
        .into_iter()
        .fold(ArmyState::new(id, name), |army, (role, offset, vehicle)| {
            let unit_id = ids.next_unit_id();
            let position = Point::new(x, cy + offset);
            let label = format!("{} {}", name, role);
            let unit = if vehicle {
                UnitState::vehicle(unit_id, label, position)
            } else {
                UnitState::new(unit_id, label, position)
            };
            let profile = match role {
                UnitRole::MeleeMissile => RoleProfile::new(role).with_charge_threat(15.0),
                UnitRole::Gunline => RoleProfile::new(role).with_optimal_range(24.0),
                UnitRole::Skirmisher => RoleProfile::new(role).with_secondary(UnitRole::Utility),
                _ => RoleProfile::new(role),
            };
            army.with_unit(unit.with_role(profile))
        })
}

fn print_text(report: &RunReport) {
    println!("Plan Run");
    println!("========");
    println!("Terrain: {}", report.terrain);
    println!("Strategy: {} (beam: {})", report.strategy, report.beam_search);
    for turn in &report.turns {
        println!();
        println!("Turn {}", turn.turn);
        for (side, moves) in [("Red", &turn.red), ("Blue", &turn.blue)] {
            for m in moves {
                println!(
                    "  {} unit {:>2}: {:<24} -> ({:>5.1}, {:>5.1}) dist {:>4.1}{} score {:.2}",
                    side,
                    m.unit_id.0,
                    m.label,
                    m.destination.x,
                    m.destination.y,
                    m.distance,
                    if m.is_advance { " (advance)" } else { "" },
                    m.score
                );
            }
        }
        println!("  Objectives: {:?}", turn.objectives);
    }
}
