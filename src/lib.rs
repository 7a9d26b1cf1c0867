// Shakeplay - motion-driven loop player
// Module declarations
pub mod audio;
pub mod cli;
pub mod commands;
pub mod control;
pub mod error;
pub mod motion;
pub mod settings;
pub mod speed;
pub mod state;

use anyhow::Context;
use clap::Parser;
use std::path::Path;
use std::rc::Rc;
use tokio::sync::mpsc;
use tokio::task::LocalSet;

use audio::{load_clip, Deck, Player};
use cli::Args;
use commands::{handle_command, Flow, InputCommand};
use control::{new_session, spawn_frame_loop};
use motion::permission::request_sensor_access;
use motion::simulator::ShakeSimulator;
use settings::Settings;
use state::AppState;

pub fn run() -> anyhow::Result<()> {
    let args = Args::parse();
    let settings = Settings::load(args.config.as_deref()).context("Failed to load settings")?;

    // The output stream cannot leave the thread that opened it
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let local = LocalSet::new();
    let result = local.block_on(&runtime, run_session(args, settings));

    // A pending stdin read would otherwise hold up shutdown
    runtime.shutdown_background();
    result
}

async fn run_session(args: Args, settings: Settings) -> anyhow::Result<()> {
    let deck = Rc::new(open_deck(&args.asset));
    let sensor = request_sensor_access(args.sensor_permission).await;

    let (ingest, speed) = new_session(&settings);
    let frame_loop = spawn_frame_loop(
        speed,
        deck.clone(),
        settings.playback.frame_rate_hz,
        |label| println!("speed {}", label),
    );
    let mut state = AppState::new(deck, ingest, frame_loop, sensor);

    let (tx, mut rx) = mpsc::unbounded_channel();
    tokio::spawn(commands::read_input(tokio::io::stdin(), tx.clone()));
    if let Some(profile) = args.simulate {
        if sensor.is_enabled() {
            tokio::spawn(commands::simulate_motion(ShakeSimulator::new(profile), tx.clone()));
        } else {
            log::warn!("Motion sensor disabled, not simulating");
        }
    }
    drop(tx);

    if args.autoplay {
        handle_command(&mut state, InputCommand::Play).await;
    }

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            command = rx.recv() => {
                let Some(command) = command else { break };
                if handle_command(&mut state, command).await == Flow::Quit {
                    break;
                }
            }
            result = &mut ctrl_c => {
                if let Err(e) = result {
                    log::error!("Failed to listen for Ctrl-C: {}", e);
                }
                break;
            }
        }
    }

    log::info!("Shutting down");
    state.shutdown().await;
    Ok(())
}

/// Decode the asset and open the output. Any failure leaves the transport
/// controls disabled; the speed loop still runs.
fn open_deck(asset: &Path) -> Deck {
    match load_clip(asset).and_then(Player::new) {
        Ok(player) => Deck::loaded(player),
        Err(e) => {
            log::error!("Audio unavailable, playback controls disabled: {}", e);
            Deck::disabled()
        }
    }
}
