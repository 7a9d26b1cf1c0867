// Input command handlers
// Sensor events and UI interactions arrive one per line and are dispatched here
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc::UnboundedSender;

use crate::control::LoopSnapshot;
use crate::error::InputError;
use crate::motion::sample::wall_clock_ms;
use crate::motion::simulator::{ShakeSimulator, SIMULATED_RATE_HZ};
use crate::motion::DeviceMotionEvent;
use crate::speed::PlaybackTransport;
use crate::state::AppState;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputCommand {
    Motion(DeviceMotionEvent),
    Slider { value: f64 },
    Play,
    #[serde(alias = "pause")]
    Stop,
    Toggle,
    Status,
    Quit,
}

/// Parse one input line: a tagged JSON object or a plain-text shorthand.
/// Blank lines yield None.
pub fn parse_line(line: &str) -> Result<Option<InputCommand>, InputError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    if line.starts_with('{') {
        return Ok(Some(serde_json::from_str(line)?));
    }

    let mut words = line.split_whitespace();
    let command = match (words.next().unwrap_or_default(), words.next()) {
        ("play" | "start", None) => InputCommand::Play,
        ("stop" | "pause", None) => InputCommand::Stop,
        ("toggle", None) => InputCommand::Toggle,
        ("status", None) => InputCommand::Status,
        ("quit" | "exit", None) => InputCommand::Quit,
        ("slider", Some(value)) => InputCommand::Slider {
            value: parse_speed(value)?,
        },
        (value, None) if value.starts_with(|c: char| c.is_ascii_digit() || c == '.') => {
            InputCommand::Slider {
                value: parse_speed(value)?,
            }
        }
        _ => return Err(InputError::UnknownCommand(line.to_string())),
    };

    if words.next().is_some() {
        return Err(InputError::UnknownCommand(line.to_string()));
    }
    Ok(Some(command))
}

fn parse_speed(text: &str) -> Result<f64, InputError> {
    text.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| InputError::InvalidValue(text.to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub is_playing: bool,
    pub controls_enabled: bool,
    pub sensor_enabled: bool,
    #[serde(flatten)]
    pub speed: Option<LoopSnapshot>,
}

pub async fn handle_command(state: &mut AppState, command: InputCommand) -> Flow {
    match command {
        InputCommand::Motion(event) => {
            if state.sensor.is_enabled() && state.ingest.on_event(&event).is_none() {
                log::trace!("Motion event without acceleration, ignored");
            }
        }
        InputCommand::Slider { value } => state.frame_loop.manual(value),
        InputCommand::Play => match state.deck.start() {
            Ok(()) => log::info!("Playing"),
            Err(e) => log::warn!("Cannot play: {}", e),
        },
        InputCommand::Stop => match state.deck.stop() {
            Ok(()) => log::info!("Stopped"),
            Err(e) => log::warn!("Cannot stop: {}", e),
        },
        InputCommand::Toggle => match state.deck.toggle() {
            Ok(playing) => log::info!("{}", if playing { "Playing" } else { "Stopped" }),
            Err(e) => log::warn!("Cannot toggle playback: {}", e),
        },
        InputCommand::Status => {
            let status = get_status(state).await;
            match serde_json::to_string(&status) {
                Ok(json) => println!("{}", json),
                Err(e) => log::error!("Failed to serialize status: {}", e),
            }
        }
        InputCommand::Quit => return Flow::Quit,
    }
    Flow::Continue
}

pub async fn get_status(state: &AppState) -> StatusResponse {
    StatusResponse {
        is_playing: state.deck.is_playing(),
        controls_enabled: state.deck.controls_enabled(),
        sensor_enabled: state.sensor.is_enabled(),
        speed: state.frame_loop.snapshot().await,
    }
}

/// Forward parsed lines from `reader` until it ends, then ask to quit
pub async fn read_input<R>(reader: R, tx: UnboundedSender<InputCommand>)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => match parse_line(&line) {
                Ok(Some(command)) => {
                    if tx.send(command).is_err() {
                        return;
                    }
                }
                Ok(None) => {}
                Err(e) => log::debug!("Ignoring input: {}", e),
            },
            Ok(None) => break,
            Err(e) => {
                log::error!("Failed to read input: {}", e);
                break;
            }
        }
    }

    log::debug!("End of input");
    let _ = tx.send(InputCommand::Quit);
}

/// Feed simulated motion events at the simulator's rate until the receiver goes away
pub async fn simulate_motion(mut simulator: ShakeSimulator, tx: UnboundedSender<InputCommand>) {
    log::info!("Simulating {:?} motion", simulator.profile());
    let mut ticker = tokio::time::interval(Duration::from_millis(1000 / SIMULATED_RATE_HZ));

    loop {
        ticker.tick().await;
        let event = simulator.next_event(wall_clock_ms());
        if tx.send(InputCommand::Motion(event)).is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::Deck;
    use crate::control::{new_session, spawn_frame_loop};
    use crate::motion::permission::SensorAccess;
    use crate::motion::simulator::ShakeProfile;
    use crate::motion::Acceleration;
    use crate::settings::Settings;
    use std::rc::Rc;
    use tokio::sync::mpsc;
    use tokio::task::LocalSet;

    fn app_state(sensor: SensorAccess) -> AppState {
        let (ingest, speed) = new_session(&Settings::default());
        let deck = Rc::new(Deck::disabled());
        let frame_loop = spawn_frame_loop(speed, deck.clone(), 1.0, |_| {});
        AppState::new(deck, ingest, frame_loop, sensor)
    }

    #[test]
    fn test_parse_json_motion() {
        let line = r#"{"type":"motion","timestamp":120,"accelerationIncludingGravity":{"x":1,"y":2,"z":9.5}}"#;
        let expected = DeviceMotionEvent::new(120, Acceleration::new(1.0, 2.0, 9.5));
        assert_eq!(parse_line(line).unwrap(), Some(InputCommand::Motion(expected)));
    }

    #[test]
    fn test_parse_motion_without_acceleration() {
        let parsed = parse_line(r#"{"type":"motion","timestamp":5}"#).unwrap();
        assert_eq!(
            parsed,
            Some(InputCommand::Motion(DeviceMotionEvent {
                timestamp: Some(5),
                acceleration_including_gravity: None,
            }))
        );
    }

    #[test]
    fn test_parse_json_controls() {
        assert_eq!(
            parse_line(r#"{"type":"slider","value":1.2}"#).unwrap(),
            Some(InputCommand::Slider { value: 1.2 })
        );
        assert_eq!(parse_line(r#"{"type":"play"}"#).unwrap(), Some(InputCommand::Play));
        assert_eq!(parse_line(r#"{"type":"pause"}"#).unwrap(), Some(InputCommand::Stop));
    }

    #[test]
    fn test_parse_shorthands() {
        assert_eq!(parse_line("  play ").unwrap(), Some(InputCommand::Play));
        assert_eq!(parse_line("stop").unwrap(), Some(InputCommand::Stop));
        assert_eq!(parse_line("toggle").unwrap(), Some(InputCommand::Toggle));
        assert_eq!(parse_line("status").unwrap(), Some(InputCommand::Status));
        assert_eq!(parse_line("quit").unwrap(), Some(InputCommand::Quit));
        assert_eq!(
            parse_line("slider 1.25").unwrap(),
            Some(InputCommand::Slider { value: 1.25 })
        );
        assert_eq!(
            parse_line("1.3").unwrap(),
            Some(InputCommand::Slider { value: 1.3 })
        );
        assert_eq!(parse_line("   ").unwrap(), None);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(parse_line("dance"), Err(InputError::UnknownCommand(_))));
        assert!(matches!(parse_line("play now"), Err(InputError::UnknownCommand(_))));
        assert!(matches!(parse_line("slider fast"), Err(InputError::InvalidValue(_))));
        assert!(matches!(parse_line("slider NaN"), Err(InputError::InvalidValue(_))));
        assert!(matches!(parse_line("{\"type\":\"motion\""), Err(InputError::Json(_))));
        assert!(matches!(parse_line(r#"{"type":"jump"}"#), Err(InputError::Json(_))));
    }

    #[tokio::test]
    async fn test_read_input_skips_bad_lines_and_quits_at_end() {
        let input = b"play\nnonsense\n\n{\"type\":\"slider\",\"value\":1.2}\n" as &[u8];
        let (tx, mut rx) = mpsc::unbounded_channel();
        read_input(input, tx).await;

        assert_eq!(rx.recv().await, Some(InputCommand::Play));
        assert_eq!(rx.recv().await, Some(InputCommand::Slider { value: 1.2 }));
        assert_eq!(rx.recv().await, Some(InputCommand::Quit));
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_simulator_stops_when_receiver_dropped() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(simulate_motion(ShakeSimulator::with_seed(ShakeProfile::Still, 1), tx));

        let first = rx.recv().await;
        assert!(matches!(first, Some(InputCommand::Motion(_))));
        drop(rx);
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_motion_updates_target_when_enabled() {
        LocalSet::new()
            .run_until(async {
                let mut state = app_state(SensorAccess::Enabled);
                for i in 0..20 {
                    let m = if i % 2 == 0 { 0.0 } else { 10.0 };
                    let event = DeviceMotionEvent::new(i * 15, Acceleration::new(0.0, 0.0, m));
                    handle_command(&mut state, InputCommand::Motion(event)).await;
                }
                assert!((state.ingest.target_activity() - 5.0).abs() < 1e-12);
                state.shutdown().await;
            })
            .await;
    }

    #[tokio::test]
    async fn test_motion_ignored_when_permission_denied() {
        LocalSet::new()
            .run_until(async {
                let mut state = app_state(SensorAccess::Disabled);
                for i in 0..20 {
                    let m = if i % 2 == 0 { 0.0 } else { 10.0 };
                    let event = DeviceMotionEvent::new(i * 15, Acceleration::new(0.0, 0.0, m));
                    handle_command(&mut state, InputCommand::Motion(event)).await;
                }
                assert_eq!(state.ingest.target_activity(), 0.0);

                // Let the loop take its first tick before overriding
                tokio::time::sleep(Duration::from_millis(50)).await;
                handle_command(&mut state, InputCommand::Slider { value: 1.3 }).await;
                let status = get_status(&state).await;
                assert!(!status.sensor_enabled);
                assert_eq!(status.speed.unwrap().slider_label, "1.300");
                state.shutdown().await;
            })
            .await;
    }

    #[tokio::test]
    async fn test_controls_disabled_without_audio() {
        LocalSet::new()
            .run_until(async {
                let mut state = app_state(SensorAccess::Enabled);
                assert_eq!(handle_command(&mut state, InputCommand::Play).await, Flow::Continue);

                let status = get_status(&state).await;
                assert!(!status.controls_enabled);
                assert!(!status.is_playing);

                assert_eq!(handle_command(&mut state, InputCommand::Quit).await, Flow::Quit);
                state.shutdown().await;
            })
            .await;
    }
}
