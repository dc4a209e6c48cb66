#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that drives a Beam Maze session.
//!
//! The binary owns the session lifecycle: it loads and validates a level,
//! configures the world, replays a recorded signal feed through the decoder
//! (or falls back to a manual demonstration when no feed is available), and
//! routes every decoded command into the world. Beam results are rendered
//! immediately; there is no animation collaborator here, so the playback
//! lock is released as soon as a result has been printed.

mod level;
mod level_transfer;

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};

use beam_maze_core::{CellCoord, CellKind, Command, Event, Outcome, SessionMode, Timestamp};
use beam_maze_system_signal_decode::{DecoderConfig, SignalDecoder, DEFAULT_WINDOW};
use beam_maze_world::{self as world, query, World};
use level::LevelConfig;

/// Command-line arguments accepted by the Beam Maze session driver.
#[derive(Debug, Parser)]
#[command(name = "beam-maze", about = "Deflection-grid beam game session driver")]
struct Args {
    /// Path to a JSON level file; the reference level is used when absent.
    #[arg(long)]
    level: Option<PathBuf>,

    /// Single-line level code, as printed by --print-code.
    #[arg(long, conflicts_with = "level")]
    level_code: Option<String>,

    /// Print the active level's transfer code and exit.
    #[arg(long)]
    print_code: bool,

    /// Path to a recorded signal feed with one `mat,timestamp_ms` per line.
    #[arg(long)]
    signals: Option<PathBuf>,

    /// Stay in edit mode instead of switching to play mode.
    #[arg(long)]
    edit: bool,
}

/// Entry point for the Beam Maze command-line interface.
fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let level = load_level(&args)?;
    if args.print_code {
        println!("{}", level_transfer::encode(&level));
        return Ok(());
    }

    let mut session = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut session,
        Command::ConfigureLevel {
            dimension: level.dimension,
            entry: level.entry,
            exit: level.exit,
            fixed: level.fixed.clone(),
        },
        &mut events,
    );
    if !args.edit {
        world::apply(
            &mut session,
            Command::SetSessionMode {
                mode: SessionMode::Play,
            },
            &mut events,
        );
    }
    for event in &events {
        let _ = report_event(event);
    }

    info!(
        "level ready: {} cells, entry {}, exit {}",
        level.dimension.get(),
        level.entry,
        level.exit,
    );

    match loaded_feed(&args) {
        Some(feed) => replay_feed(&mut session, &level, &feed),
        None => {
            warn!("no signal feed available; running in manual-only mode");
            manual_demo(&mut session);
        }
    }

    render_grid(&session);
    Ok(())
}

fn load_level(args: &Args) -> Result<LevelConfig> {
    if let Some(code) = &args.level_code {
        return level_transfer::decode(code).context("level code is not usable");
    }
    let Some(path) = &args.level else {
        return Ok(LevelConfig::reference());
    };
    let json = fs::read_to_string(path)
        .with_context(|| format!("could not read level file {}", path.display()))?;
    LevelConfig::from_json(&json)
        .with_context(|| format!("level file {} is not usable", path.display()))
}

/// Reads the recorded feed, degrading to manual mode when it is missing.
fn loaded_feed(args: &Args) -> Option<String> {
    let path = args.signals.as_ref()?;
    match fs::read_to_string(path) {
        Ok(feed) => Some(feed),
        Err(error) => {
            warn!("signal feed {} unavailable: {error}", path.display());
            None
        }
    }
}

/// Replays a recorded feed through the decoder, routing every decoded
/// command into the world as it is produced.
fn replay_feed(session: &mut World, level: &LevelConfig, feed: &str) {
    // A replayed feed is its own session; every record is considered.
    let mut decoder = SignalDecoder::new(DecoderConfig::new(
        DEFAULT_WINDOW,
        level.dimension,
        Timestamp::from_millis(0),
    ));

    let mut commands = Vec::new();
    for (mat, timestamp) in parse_feed(feed) {
        decoder.handle_tick(timestamp, &mut commands);
        decoder.handle_signal(mat, timestamp, &mut commands);
        route_commands(session, &mut commands);
    }

    // Let an outstanding command press resolve before the session ends.
    if let Some(deadline) = decoder.pending_deadline() {
        decoder.handle_tick(deadline, &mut commands);
        route_commands(session, &mut commands);
    }
}

/// Parses `mat,timestamp_ms` lines; blank lines and `#` comments are
/// skipped, malformed lines are reported and dropped.
fn parse_feed(feed: &str) -> Vec<(u8, Timestamp)> {
    let mut records = Vec::new();
    for (number, line) in feed.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let parsed = trimmed.split_once(',').and_then(|(mat, timestamp)| {
            let mat = mat.trim().parse::<u8>().ok()?;
            let timestamp = timestamp.trim().parse::<u64>().ok()?;
            Some((mat, Timestamp::from_millis(timestamp)))
        });
        match parsed {
            Some(record) => records.push(record),
            None => warn!("skipping malformed feed line {}: {trimmed}", number + 1),
        }
    }
    records
}

fn manual_demo(session: &mut World) {
    let mut commands = vec![Command::FireRay];
    route_commands(session, &mut commands);
}

/// Applies queued commands to the world and reports the resulting events.
///
/// A trace result finishes its playback immediately because the CLI renders
/// the beam without animating it.
fn route_commands(session: &mut World, commands: &mut Vec<Command>) {
    for command in commands.drain(..) {
        info!("applying {command:?}");
        let mut events = Vec::new();
        world::apply(session, command, &mut events);

        let mut playback_started = false;
        for event in &events {
            playback_started |= report_event(event);
        }

        if playback_started {
            let mut done = Vec::new();
            world::apply(session, Command::FinishPlayback, &mut done);
            for event in &done {
                let _ = report_event(event);
            }
        }
    }
}

/// Reports a single world event; returns true when a playback began.
fn report_event(event: &Event) -> bool {
    match event {
        Event::RayTraced { result } => {
            let verdict = match result.outcome {
                Outcome::Win => "WIN",
                Outcome::Lose => "LOSE",
            };
            match result.exit {
                Some(exit) => println!(
                    "beam {verdict}: {} at {exit} after {} cells",
                    result.end,
                    result.path.len(),
                ),
                None => println!(
                    "beam {verdict}: {} after {} cells",
                    result.end,
                    result.path.len(),
                ),
            }
            true
        }
        Event::LevelConfigured {
            dimension,
            entry,
            exit,
        } => {
            info!(
                "configured {side}x{side} grid, entry {entry}, exit {exit}",
                side = dimension.get(),
            );
            false
        }
        Event::SessionModeChanged { mode } => {
            info!("session mode is now {mode:?}");
            false
        }
        Event::CellChanged { cell, kind } => {
            info!(
                "cell ({}, {}) is now {kind:?}",
                cell.column(),
                cell.row(),
            );
            false
        }
        Event::PlayerObstaclesReset { cleared } => {
            println!("player obstacles reset ({cleared} cleared)");
            false
        }
        Event::FixedObstaclesCleared { cleared } => {
            println!("fixed obstacles cleared ({cleared} cleared)");
            false
        }
        Event::PlaybackFinished => {
            info!("playback finished");
            false
        }
        Event::ToggleRejected { cell, reason } => {
            warn!(
                "toggle of ({}, {}) refused: {reason}",
                cell.column(),
                cell.row(),
            );
            false
        }
        Event::ResetRejected { reason } | Event::ClearRejected { reason } => {
            warn!("clear refused: {reason}");
            false
        }
        Event::FireRejected { reason } => {
            warn!("fire refused: {reason}");
            false
        }
    }
}

/// Renders the grid with `.` for empty cells, `#` for fixed obstacles and
/// `o` for player obstacles.
fn render_grid(session: &World) {
    let dimension = query::dimension(session);
    for row in 0..dimension.get() {
        let mut line = String::new();
        for column in 0..dimension.get() {
            let glyph = match query::kind_at(session, CellCoord::new(column, row)) {
                Some(CellKind::FixedObstacle) => '#',
                Some(CellKind::PlayerObstacle) => 'o',
                _ => '.',
            };
            line.push(glyph);
            line.push(' ');
        }
        println!("{}", line.trim_end());
    }
}
