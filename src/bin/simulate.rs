use clap::Parser;
use maze_chase::autopilot;
use maze_chase::constants::{frame_dt_ms, SCREEN_H, SCREEN_W, TICK_US};
use maze_chase::engine::{GameEngine, GameEngineOptions};
use maze_chase::types::{GameEvent, GameOutcome, Snapshot};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

const DEFAULT_MAX_TICKS: u64 = 60 * 60 * 10;

#[derive(Parser, Debug)]
#[command(author, version, about = "Runs seeded headless games driven by the autopilot")]
struct Cli {
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, default_value_t = 3)]
    runs: u32,
    #[arg(long)]
    ticks: Option<u64>,
    #[arg(long)]
    lives: Option<u32>,
    #[arg(long)]
    match_id: Option<String>,
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

#[derive(Clone, Debug, Serialize)]
struct Scenario {
    name: String,
    seed: u32,
    #[serde(rename = "maxTicks")]
    max_ticks: u64,
    lives: Option<u32>,
}

#[derive(Clone, Debug, Serialize)]
struct ScenarioResultLine {
    scenario: String,
    seed: u32,
    outcome: String,
    ticks: u64,
    #[serde(rename = "durationMs")]
    duration_ms: u64,
    score: u32,
    lives: u32,
    #[serde(rename = "pelletsLeft")]
    pellets_left: usize,
    #[serde(rename = "pelletsEaten")]
    pellets_eaten: u32,
    #[serde(rename = "powerEaten")]
    power_eaten: u32,
    #[serde(rename = "ghostsEaten")]
    ghosts_eaten: u32,
    deaths: u32,
    anomalies: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
struct AnomalyRecord {
    tick: u64,
    message: String,
}

#[derive(Clone, Debug, Serialize)]
struct ScenarioRunResult {
    #[serde(flatten)]
    result: ScenarioResultLine,
    #[serde(rename = "anomalyRecords")]
    anomaly_records: Vec<AnomalyRecord>,
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    #[serde(rename = "matchId")]
    match_id: String,
    #[serde(rename = "startedAtMs")]
    started_at_ms: u64,
    #[serde(rename = "finishedAtMs")]
    finished_at_ms: u64,
    #[serde(rename = "scenarioCount")]
    scenario_count: usize,
    #[serde(rename = "anomalyCount")]
    anomaly_count: usize,
    #[serde(rename = "averageScore")]
    average_score: u32,
    #[serde(rename = "outcomeCounts")]
    outcome_counts: BTreeMap<String, usize>,
    scenarios: Vec<ScenarioResultLine>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::filter::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let scenarios = resolve_scenarios(&cli);
    let run_started_at_ms = now_ms();
    let seed_hint = scenarios.first().map(|scenario| scenario.seed).unwrap_or(0);
    let match_id = cli
        .match_id
        .clone()
        .unwrap_or_else(|| default_match_id(seed_hint, run_started_at_ms));
    let mut has_anomaly = false;
    let mut scenario_results = Vec::new();
    let mut outcome_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut total_anomalies = 0usize;

    for scenario in scenarios {
        info!(
            match_id = %match_id,
            scenario = %scenario.name,
            seed = scenario.seed,
            max_ticks = scenario.max_ticks,
            "scenario started"
        );
        let scenario_run = run_scenario(&scenario);

        for anomaly in &scenario_run.anomaly_records {
            warn!(
                match_id = %match_id,
                scenario = %scenario.name,
                tick = anomaly.tick,
                message = %anomaly.message,
                "anomaly detected"
            );
        }

        if !scenario_run.result.anomalies.is_empty() {
            has_anomaly = true;
        }
        total_anomalies += scenario_run.anomaly_records.len();
        *outcome_counts
            .entry(scenario_run.result.outcome.clone())
            .or_insert(0) += 1;

        info!(
            match_id = %match_id,
            scenario = %scenario.name,
            outcome = %scenario_run.result.outcome,
            score = scenario_run.result.score,
            ticks = scenario_run.result.ticks,
            "scenario finished"
        );

        match serde_json::to_string(&scenario_run.result) {
            Ok(line) => println!("{line}"),
            Err(error) => error!(%error, "scenario result did not serialize"),
        }
        scenario_results.push(scenario_run.result);
    }

    let summary = build_run_summary(
        match_id.clone(),
        run_started_at_ms,
        now_ms(),
        scenario_results,
        outcome_counts,
        total_anomalies,
    );

    let mut summary_out_written: Option<String> = None;
    if let Some(path) = cli.summary_out.as_ref() {
        if let Err(error) = write_summary(path, &summary) {
            error!(
                match_id = %match_id,
                path = %path.to_string_lossy(),
                %error,
                "summary write failed"
            );
            std::process::exit(2);
        }
        summary_out_written = Some(path.to_string_lossy().to_string());
    }

    info!(
        match_id = %match_id,
        scenarios = summary.scenario_count,
        anomalies = summary.anomaly_count,
        average_score = summary.average_score,
        summary_out = ?summary_out_written,
        "run finished"
    );

    if has_anomaly {
        std::process::exit(1);
    }
}

fn run_scenario(scenario: &Scenario) -> ScenarioRunResult {
    let mut engine = GameEngine::new(GameEngineOptions {
        seed: scenario.seed,
        starting_lives: scenario.lives,
        power_duration_ms: None,
    });
    let starting_lives = engine.config.starting_lives;

    let mut pellets_eaten = 0;
    let mut power_eaten = 0;
    let mut ghosts_eaten = 0;
    let mut deaths = 0;
    let mut anomalies = Vec::new();
    let mut anomaly_records = Vec::new();
    let mut anomaly_seen = HashSet::new();

    let mut previous = engine.build_snapshot(false);
    while !engine.is_ended() && previous.tick < scenario.max_ticks {
        if let Some(dir) = autopilot::choose_direction(&engine.grid, &previous) {
            engine.request_direction(dir);
        }
        engine.step(frame_dt_ms(previous.tick, TICK_US));
        let snapshot = engine.build_snapshot(true);
        for message in collect_snapshot_anomalies(&previous, &snapshot, starting_lives) {
            push_anomaly(
                &mut anomalies,
                &mut anomaly_records,
                &mut anomaly_seen,
                snapshot.tick,
                message,
            );
        }

        for event in &snapshot.events {
            match event {
                GameEvent::PelletCollected { .. } => pellets_eaten += 1,
                GameEvent::PowerCollected { .. } => power_eaten += 1,
                GameEvent::GhostEaten { .. } => ghosts_eaten += 1,
                GameEvent::PlayerDied { .. } => deaths += 1,
            }
        }
        previous = snapshot;
    }

    let summary = engine.build_summary();
    ScenarioRunResult {
        result: ScenarioResultLine {
            scenario: scenario.name.clone(),
            seed: scenario.seed,
            outcome: outcome_key(summary.outcome),
            ticks: summary.ticks,
            duration_ms: summary.duration_ms,
            score: summary.score,
            lives: summary.lives,
            pellets_left: summary.pellets_left,
            pellets_eaten,
            power_eaten,
            ghosts_eaten,
            deaths,
            anomalies,
        },
        anomaly_records,
    }
}

fn collect_snapshot_anomalies(
    previous: &Snapshot,
    snapshot: &Snapshot,
    starting_lives: u32,
) -> Vec<String> {
    let mut anomalies = Vec::new();
    if snapshot.player.score < previous.player.score {
        anomalies.push(format!(
            "score decreased: {} -> {}",
            previous.player.score, snapshot.player.score
        ));
    }
    if snapshot.player.lives > starting_lives {
        anomalies.push(format!("lives above start: {}", snapshot.player.lives));
    }

    let before = previous.pellets.len() + previous.power_pellets.len();
    let after = snapshot.pellets.len() + snapshot.power_pellets.len();
    if after > before {
        anomalies.push(format!("collectibles reappeared: {before} -> {after}"));
    }

    let player = &snapshot.player;
    if !player.x.is_finite()
        || !player.y.is_finite()
        || player.y < 0.0
        || player.y > SCREEN_H
        || player.x < -SCREEN_W
        || player.x > SCREEN_W * 2.0
    {
        anomalies.push(format!("player out of bounds: ({}, {})", player.x, player.y));
    }

    if !player.powered {
        for ghost in &snapshot.ghosts {
            if ghost.vulnerable {
                anomalies.push(format!("ghost {} vulnerable without power", ghost.id));
            }
        }
    }
    anomalies
}

fn resolve_scenarios(cli: &Cli) -> Vec<Scenario> {
    let seed = cli.seed.unwrap_or_else(|| rand::random::<u32>() as u64);
    let max_ticks = cli.ticks.unwrap_or(DEFAULT_MAX_TICKS).max(1);
    (0..cli.runs.max(1))
        .map(|idx| Scenario {
            name: format!("autopilot-{}", idx + 1),
            seed: normalize_seed(seed.wrapping_add(idx as u64)),
            max_ticks,
            lives: cli.lives,
        })
        .collect()
}

fn normalize_seed(seed: u64) -> u32 {
    seed as u32
}

fn outcome_key(outcome: Option<GameOutcome>) -> String {
    match outcome {
        Some(GameOutcome::Victory) => "victory",
        Some(GameOutcome::Defeat) => "defeat",
        None => "tick_limit",
    }
    .to_string()
}

fn push_anomaly(
    anomalies: &mut Vec<String>,
    anomaly_records: &mut Vec<AnomalyRecord>,
    anomaly_seen: &mut HashSet<String>,
    tick: u64,
    message: String,
) {
    anomaly_records.push(AnomalyRecord {
        tick,
        message: message.clone(),
    });
    if anomaly_seen.insert(message.clone()) {
        anomalies.push(message);
    }
}

fn default_match_id(seed: u32, timestamp_ms: u64) -> String {
    format!("sim-{seed}-{timestamp_ms}")
}

fn build_run_summary(
    match_id: String,
    started_at_ms: u64,
    finished_at_ms: u64,
    scenarios: Vec<ScenarioResultLine>,
    outcome_counts: BTreeMap<String, usize>,
    anomaly_count: usize,
) -> RunSummary {
    let scenario_count = scenarios.len();
    let total_score: u64 = scenarios.iter().map(|s| s.score as u64).sum();
    let average_score = if scenario_count == 0 {
        0
    } else {
        (total_score / scenario_count as u64) as u32
    };
    RunSummary {
        match_id,
        started_at_ms,
        finished_at_ms,
        scenario_count,
        anomaly_count,
        average_score,
        outcome_counts,
        scenarios,
    }
}

fn now_ms() -> u64 {
    chrono::Utc::now().timestamp_millis().max(0) as u64
}

fn write_summary(path: &Path, summary: &RunSummary) -> io::Result<()> {
    let summary_text = serde_json::to_string_pretty(summary)?;
    std::fs::write(path, summary_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_scenario_result(outcome: &str, score: u32) -> ScenarioResultLine {
        ScenarioResultLine {
            scenario: "test".to_string(),
            seed: 42,
            outcome: outcome.to_string(),
            ticks: 600,
            duration_ms: 9_600,
            score,
            lives: 1,
            pellets_left: 100,
            pellets_eaten: 0,
            power_eaten: 0,
            ghosts_eaten: 0,
            deaths: 0,
            anomalies: Vec::new(),
        }
    }

    fn scenario(seed: u32, max_ticks: u64) -> Scenario {
        Scenario {
            name: "test".to_string(),
            seed,
            max_ticks,
            lives: None,
        }
    }

    #[test]
    fn default_match_id_contains_seed_and_timestamp() {
        assert_eq!(default_match_id(42, 123456789), "sim-42-123456789");
    }

    #[test]
    fn build_run_summary_calculates_average_score() {
        let summary = build_run_summary(
            "sim-42-1".to_string(),
            1,
            2,
            vec![
                make_scenario_result("defeat", 1_200),
                make_scenario_result("victory", 2_800),
            ],
            BTreeMap::from([
                ("defeat".to_string(), 1usize),
                ("victory".to_string(), 1usize),
            ]),
            0,
        );
        assert_eq!(summary.average_score, 2_000);
        assert_eq!(summary.scenario_count, 2);
    }

    #[test]
    fn write_summary_returns_error_when_parent_does_not_exist() {
        let target = std::env::temp_dir()
            .join(format!("maze-chase-missing-{}", now_ms()))
            .join("summary.json");
        let summary = build_run_summary(
            "sim-1-1".to_string(),
            1,
            2,
            vec![make_scenario_result("tick_limit", 300)],
            BTreeMap::from([("tick_limit".to_string(), 1usize)]),
            0,
        );
        assert!(write_summary(&target, &summary).is_err());
    }

    #[test]
    fn push_anomaly_keeps_records_and_deduplicates_summary_messages() {
        let mut anomalies = Vec::new();
        let mut records = Vec::new();
        let mut seen = HashSet::new();
        push_anomaly(
            &mut anomalies,
            &mut records,
            &mut seen,
            10,
            "same anomaly".to_string(),
        );
        push_anomaly(
            &mut anomalies,
            &mut records,
            &mut seen,
            11,
            "same anomaly".to_string(),
        );

        assert_eq!(anomalies.len(), 1);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].tick, 10);
        assert_eq!(records[1].tick, 11);
    }

    #[test]
    fn autopilot_run_scores_without_anomalies() {
        let run = run_scenario(&scenario(7, 300));
        assert!(run.result.pellets_eaten > 0);
        assert!(run.result.score >= run.result.pellets_eaten * 10);
        assert!(run.anomaly_records.is_empty(), "{:?}", run.anomaly_records);
    }

    #[test]
    fn same_seed_replays_the_same_run() {
        let a = run_scenario(&scenario(99, 300)).result;
        let b = run_scenario(&scenario(99, 300)).result;
        assert_eq!(a.score, b.score);
        assert_eq!(a.ticks, b.ticks);
        assert_eq!(a.outcome, b.outcome);
        assert_eq!(a.pellets_left, b.pellets_left);
    }

    #[test]
    fn tick_cap_is_reported_as_tick_limit() {
        let run = run_scenario(&scenario(3, 1));
        assert_eq!(run.result.ticks, 1);
        assert_eq!(run.result.outcome, "tick_limit");
    }

    #[test]
    fn scenarios_use_consecutive_seeds() {
        let cli = Cli::parse_from(["simulate", "--seed", "10", "--runs", "3", "--ticks", "50"]);
        let scenarios = resolve_scenarios(&cli);
        let seeds: Vec<u32> = scenarios.iter().map(|s| s.seed).collect();
        assert_eq!(seeds, vec![10, 11, 12]);
        assert!(scenarios.iter().all(|s| s.max_ticks == 50));
    }
}
