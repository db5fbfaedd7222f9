#![deny(warnings)]

//! Headless CLI running the team optimizer or the day simulator on a YAML scenario.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use team_core::{Candidate, IngredientAmount, IngredientId, Recipe};
use team_cover::{ReverseIndex, SetCover, SolverConfig};
use team_sim::TeamDefinition;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default)]
struct Args {
    scenario: Option<PathBuf>,
    days: Option<u32>,
    json: bool,
}

fn parse_args() -> Args {
    let mut args = Args::default();
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--scenario" => args.scenario = it.next().map(PathBuf::from),
            "--days" => args.days = it.next().and_then(|s| s.parse().ok()),
            "--json" => args.json = true,
            _ => {}
        }
    }
    args
}

/// Scenario file: at least one of the two sections must be present.
#[derive(Debug, Deserialize)]
struct Scenario {
    #[serde(default)]
    optimize: Option<OptimizeScenario>,
    #[serde(default)]
    simulate: Option<SimulateScenario>,
}

#[derive(Debug, Deserialize)]
struct OptimizeScenario {
    recipe: Recipe,
    candidates: Vec<Candidate>,
    #[serde(default)]
    solver: SolverConfig,
}

#[derive(Debug, Deserialize)]
struct SimulateScenario {
    #[serde(flatten)]
    team: TeamDefinition,
    #[serde(default = "default_days")]
    days: u32,
}

fn default_days() -> u32 {
    1
}

fn load_scenario(path: &Path) -> Result<Scenario> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading scenario {}", path.display()))?;
    let scenario: Scenario = serde_yaml::from_str(&text)
        .with_context(|| format!("parsing scenario {}", path.display()))?;
    if scenario.optimize.is_none() && scenario.simulate.is_none() {
        bail!(
            "scenario {} has neither an optimize nor a simulate section",
            path.display()
        );
    }
    Ok(scenario)
}

fn minimal_scenario() -> Scenario {
    let pinsir = Candidate {
        character: "pinsir".to_string(),
        loadout: vec![IngredientId::new("honey"), IngredientId::new("fancy_apple")],
        produce: vec![
            IngredientAmount::new("honey", 5.0),
            IngredientAmount::new("fancy_apple", 3.0),
        ],
    };
    Scenario {
        optimize: Some(OptimizeScenario {
            recipe: pinsir.produce.clone(),
            candidates: vec![pinsir],
            solver: SolverConfig::default(),
        }),
        simulate: None,
    }
}

fn run_optimize(opt: &OptimizeScenario, json: bool) -> Result<()> {
    let index = ReverseIndex::from_candidates(opt.candidates.iter().cloned())
        .context("invalid candidate in scenario")?;
    info!(
        candidates = opt.candidates.len(),
        ingredients = index.len(),
        "built reverse index"
    );
    let mut solver = SetCover::new(&index);
    let solutions = solver.find_optimal_combination_for(&opt.recipe, &opt.solver)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&solutions)?);
        return Ok(());
    }
    let size = solutions
        .first()
        .map(|s| s.team.len().to_string())
        .unwrap_or_else(|| format!(">{}", opt.solver.max_team_size));
    let exhaustive = solutions.iter().all(|s| s.exhaustive) && solver.stats().deadline_hits == 0;
    println!(
        "Optimal | team size: {} | solutions: {} | exhaustive: {} | states: {}",
        size,
        solutions.len(),
        exhaustive,
        solver.stats().states_expanded
    );
    for s in &solutions {
        let members: Vec<String> = s.team.iter().map(Candidate::identity_hash).collect();
        println!(
            "  [{}] filler: {:.2} | surplus: {:.2}",
            members.join(" + "),
            s.surplus.filler(),
            s.surplus.relevant_sum()
        );
    }
    Ok(())
}

fn run_simulate(sim: &SimulateScenario, days: u32, json: bool) -> Result<()> {
    let mut team = team_sim::build_team(&sim.team)?;
    let results = team_sim::simulate_days(&mut team, days);

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }
    println!(
        "KPI | days: {} | meals/day: {:.2} | recipe meals/day: {:.2} | ingredients/day: {:.1}",
        team.runs(),
        results.cooking.meals,
        results.cooking.recipe_meals,
        results.cooking.ingredients_used
    );
    for m in &results.members {
        println!(
            "  {} | helps/day: {:.1} day + {:.1} night + {:.1} bonus | spilled: {:.1} | skills: {:.2}",
            m.name, m.day_helps, m.night_helps, m.bonus_helps, m.spilled_helps, m.skill_procs
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    // Logging setup
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args();
    info!(
        scenario = ?args.scenario,
        days = ?args.days,
        build = env!("GIT_SHA"),
        "starting CLI"
    );

    let scenario = match &args.scenario {
        Some(path) => load_scenario(path)?,
        None => minimal_scenario(),
    };
    if let Some(opt) = &scenario.optimize {
        run_optimize(opt, args.json)?;
    }
    if let Some(sim) = &scenario.simulate {
        run_simulate(sim, args.days.unwrap_or(sim.days), args.json)?;
    }
    Ok(())
}
