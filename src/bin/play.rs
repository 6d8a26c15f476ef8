use clap::Parser;
use maze_chase::audio::{AudioDispatcher, NullOutput, TerminalBell};
use maze_chase::constants::TICK_US;
use maze_chase::driver::{self, DriverExit, DriverOptions, InputCommand};
use maze_chase::engine::{GameEngine, GameEngineOptions};
use maze_chase::render::render_frame;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info};

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

#[derive(Parser, Debug)]
#[command(author, version, about = "Plays the maze chase in the terminal (w/a/s/d + Enter)")]
struct Cli {
    #[arg(long)]
    seed: Option<u32>,
    #[arg(long)]
    lives: Option<u32>,
    /// Disable the terminal bell.
    #[arg(long)]
    mute: bool,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::filter::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let seed = cli.seed.unwrap_or_else(rand::random::<u32>);
    let mut engine = GameEngine::new(GameEngineOptions {
        seed,
        starting_lives: cli.lives,
        power_duration_ms: None,
    });

    let (tx, mut rx) = mpsc::channel(32);
    tokio::spawn(read_commands(tx));

    let mut audio = if cli.mute {
        AudioDispatcher::new(Arc::new(NullOutput))
    } else {
        AudioDispatcher::new(Arc::new(TerminalBell))
    };
    let options = DriverOptions {
        tick: read_tick(),
        max_frames: None,
    };
    info!(seed, tick = ?options.tick, "starting game");

    let report = driver::run(&mut engine, &mut rx, &mut audio, options, |init, snapshot| {
        let mut stdout = std::io::stdout().lock();
        let frame = render_frame(init, snapshot);
        if let Err(error) = write!(stdout, "{CLEAR_SCREEN}{frame}").and_then(|_| stdout.flush()) {
            debug!(%error, "frame dropped");
        }
    })
    .await;
    audio.shutdown();

    match report.exit {
        DriverExit::Ended => println!("Final score: {}", report.summary.score),
        DriverExit::Quit | DriverExit::InputClosed | DriverExit::TickLimit => {
            println!("Stopped after {} frames.", report.frames)
        }
    }
}

async fn read_commands(tx: mpsc::Sender<InputCommand>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let Some(command) = InputCommand::parse(&line) else {
                    continue;
                };
                if tx.send(command).await.is_err() {
                    break;
                }
            }
            Ok(None) => break,
            Err(error) => {
                debug!(%error, "stdin read failed");
                break;
            }
        }
    }
}

fn read_tick() -> Duration {
    std::env::var("MAZE_TICK_MS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|value| *value > 0)
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_micros(TICK_US))
}
