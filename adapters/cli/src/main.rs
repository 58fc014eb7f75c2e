#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless command-line runner for the tile defense simulation.

mod layout;

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{ensure, Context, Result};
use clap::Parser;
use tile_defense_core::{config::GameConfig, Event};
use tile_defense_session::Session;
use tracing::{info, warn};

use crate::layout::Placement;

#[derive(Debug, Parser)]
#[command(
    name = "tile-defense",
    version,
    about = "Run a tile defense session without rendering"
)]
struct Cli {
    /// TOML configuration file; built-in defaults are used when omitted.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Number of frames to simulate.
    #[arg(long, default_value_t = 3600)]
    frames: u32,

    /// Real seconds elapsed per frame.
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,

    /// Board content toggled before the first frame, e.g. `wall@3,4` or `laser@2,2`.
    #[arg(long = "place", value_name = "KIND@COLUMN,ROW")]
    placements: Vec<Placement>,
}

/// Event tally of a finished run.
#[derive(Debug, Default, PartialEq, Eq)]
struct Summary {
    spawned: usize,
    reached: usize,
    defeated: usize,
    victories: usize,
    defeats: usize,
}

impl Summary {
    fn record(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::EnemySpawned { .. } => self.spawned += 1,
                Event::EnemyReachedDestination { .. } => self.reached += 1,
                Event::EnemyDefeated { .. } => self.defeated += 1,
                Event::Victory => self.victories += 1,
                Event::Defeat => self.defeats += 1,
                Event::ContentChanged { .. }
                | Event::MutationRejected { .. }
                | Event::NewGame => {}
            }
        }
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    let summary = run(config, &cli.placements, cli.frames, cli.dt)?;
    info!(
        frames = cli.frames,
        spawned = summary.spawned,
        reached = summary.reached,
        defeated = summary.defeated,
        victories = summary.victories,
        defeats = summary.defeats,
        "run finished"
    );
    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }
}

fn load_config(path: Option<&Path>) -> Result<GameConfig> {
    let Some(path) = path else {
        return Ok(GameConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    parse_config(&text).with_context(|| format!("failed to load config {}", path.display()))
}

fn parse_config(text: &str) -> Result<GameConfig> {
    let config: GameConfig = toml::from_str(text).context("malformed TOML")?;
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn run(config: GameConfig, placements: &[Placement], frames: u32, dt: f32) -> Result<Summary> {
    ensure!(dt > 0.0, "frame time must be positive, got {dt}");

    let mut session = Session::new(config).context("failed to start session")?;
    let mut events = Vec::new();
    for placement in placements {
        session.apply(placement.command(), &mut events);
    }
    for event in events.drain(..) {
        if let Event::MutationRejected {
            tile,
            requested,
            reason,
        } = event
        {
            warn!(?tile, ?requested, ?reason, "placement rejected");
        }
    }

    let mut summary = Summary::default();
    for _ in 0..frames {
        session.advance(dt, &mut events);
        summary.record(&events);
        events.clear();
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAMPAIGN: &str = include_str!("../config/campaign.toml");

    #[test]
    fn bundled_campaign_is_valid() {
        let config = parse_config(CAMPAIGN).expect("campaign parses");
        assert_eq!((config.board.columns, config.board.rows), (13, 9));
        assert_eq!(config.scenario.waves.len(), 3);
        assert_eq!(config.scenario.cycles, 2);
    }

    #[test]
    fn invalid_configurations_are_reported() {
        let error = parse_config("[board]\ncolumns = 1\nrows = 4\n").expect_err("too small");
        assert!(format!("{error:#}").contains("at least 2x2"), "{error:#}");

        let error = parse_config("seed = \"abc\"").expect_err("wrong type");
        assert!(format!("{error:#}").contains("malformed TOML"), "{error:#}");
    }

    #[test]
    fn arguments_parse_into_placements() {
        let cli = Cli::try_parse_from([
            "tile-defense",
            "--frames",
            "10",
            "--place",
            "wall@1,1",
            "--place",
            "mortar@3,3",
        ])
        .expect("arguments parse");
        assert_eq!(cli.frames, 10);
        assert_eq!(cli.placements.len(), 2);
        assert!(cli.config.is_none());

        assert!(Cli::try_parse_from(["tile-defense", "--place", "moat@1,1"]).is_err());
    }

    #[test]
    fn runs_tally_session_events() {
        let placements: Vec<Placement> = ["laser@1,1", "laser@2,3"]
            .iter()
            .map(|text| text.parse().expect("placement parses"))
            .collect();
        let summary = run(GameConfig::default(), &placements, 600, 1.0 / 30.0).expect("run");

        assert!(summary.spawned > 0);
        assert!(summary.spawned >= summary.reached + summary.defeated);
    }

    #[test]
    fn non_positive_frame_time_is_rejected() {
        assert!(run(GameConfig::default(), &[], 1, 0.0).is_err());
    }
}
