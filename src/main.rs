//! Binary entrypoint for the Parkchase CLI.
//!
//! Commands:
//! - `init` - write a starter `config.toml`
//! - `check <board>` - validate a board file and print a summary plus the map
//! - `play [<board>] [--level <name>]` - run a session driven by stdin commands
//!
//! See the library crate docs for module-level details: `parkchase::`.
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use log::{debug, info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};

use parkchase::board::{Board, Direction};
use parkchase::config::Config;
use parkchase::engine::{EventReceiver, GameEngine, GameEvent};
use parkchase::storage::{BoardStore, TextFileStore};

#[derive(Parser)]
#[command(name = "parkchase")]
#[command(about = "Collect the baskets, dodge the guards")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init,
    /// Load a board file and print what it contains
    Check {
        /// Board file to inspect
        board: PathBuf,
    },
    /// Play a session, reading moves from stdin
    Play {
        /// Board file to start from
        board: Option<PathBuf>,
        /// Level preset from the [levels] table (easy, medium, hard)
        #[arg(short, long, conflicts_with = "board")]
        level: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let pre_config = match cli.command {
        Commands::Init => None,
        _ => Config::load(&cli.config).await.ok(),
    };
    init_logging(&pre_config, cli.verbose);

    match cli.command {
        Commands::Init => {
            info!("Writing default configuration");
            Config::create_default(&cli.config).await?;
            info!("Configuration file created at {}", cli.config);
        }
        Commands::Check { board } => {
            let board = tokio::task::spawn_blocking(move || TextFileStore.load(&board)).await??;
            print_summary(&board)?;
        }
        Commands::Play { board, level } => {
            let config = pre_config.unwrap_or_else(|| {
                warn!("No usable config at {}, using defaults", cli.config);
                Config::default()
            });
            let start = match (board, level) {
                (Some(path), _) => path,
                (None, Some(name)) => config
                    .level_path(&name)
                    .ok_or_else(|| anyhow!("unknown level '{}'", name))?,
                (None, None) => config
                    .level_path("easy")
                    .ok_or_else(|| anyhow!("no board given and no 'easy' level configured"))?,
            };
            play(&config, &start).await?;
        }
    }

    Ok(())
}

fn print_summary(board: &Board) -> Result<()> {
    let guards: Vec<_> = board
        .guards()
        .iter()
        .map(|g| {
            serde_json::json!({
                "row": g.position.row,
                "col": g.position.col,
                "pivot": g.pivot.to_string(),
            })
        })
        .collect();
    let payload = serde_json::json!({
        "size": board.size(),
        "basket_goal": board.basket_goal(),
        "player": board.player().position,
        "guards": guards,
    });
    println!("{}", serde_json::to_string_pretty(&payload)?);
    println!("{}", board.render());
    Ok(())
}

async fn play(config: &Config, start: &Path) -> Result<()> {
    let (engine, events) = GameEngine::from_config(&config.engine)?;
    let watcher = tokio::spawn(log_events(events));

    engine.new_game(start).await?;
    info!("Starting Parkchase v{} on {}", env!("CARGO_PKG_VERSION"), start.display());
    println!("Moves: w/a/s/d or up/down/left/right. Also: save [file], load <file>, pause, resume, quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let mut words = line.split_whitespace();
        let Some(cmd) = words.next() else {
            continue;
        };
        let arg = words.next();
        match cmd.to_lowercase().as_str() {
            "quit" | "q" | "exit" => break,
            "pause" => engine.pause(),
            "resume" => engine.resume(),
            "save" => {
                let path = config.storage.save_path(arg);
                match engine.save(&path).await {
                    Ok(()) => println!("saved to {}", path.display()),
                    Err(e) => warn!("Save failed: {}", e),
                }
            }
            "load" => match arg {
                Some(p) => {
                    if let Err(e) = engine.new_game(p).await {
                        warn!("Load failed, continuing current game: {}", e);
                    }
                }
                None => warn!("load needs a file name"),
            },
            "map" => {
                if let Some(board) = engine.board_snapshot() {
                    println!("{}", board.render());
                }
            }
            other => {
                let direction = match other {
                    "w" => Ok(Direction::Up),
                    "a" => Ok(Direction::Left),
                    "s" => Ok(Direction::Down),
                    "d" => Ok(Direction::Right),
                    word => word.parse::<Direction>(),
                };
                match direction {
                    Ok(direction) => engine.step(direction)?,
                    Err(e) => warn!("{}", e),
                }
            }
        }
        if engine.is_game_over() {
            if let Some(board) = engine.board_snapshot() {
                println!("{}", board.render());
            }
        }
    }

    engine.stop_timers();
    drop(engine);
    let _ = watcher.await;
    Ok(())
}

async fn log_events(mut events: EventReceiver) {
    while let Some(event) = events.recv().await {
        match event {
            GameEvent::FieldChanged(_) => {}
            GameEvent::Advanced(p) => {
                debug!("score {} elapsed {}s", p.score, p.elapsed)
            }
            GameEvent::BasketCollected => info!("Basket collected"),
            GameEvent::GameOver(p) => {
                let verdict = if p.won { "won" } else { "lost" };
                println!(
                    "Game over: you {} with {} baskets in {}s",
                    verdict, p.score, p.elapsed
                );
            }
        }
    }
}

fn init_logging(config: &Option<Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // CLI verbosity wins over the configured level
    let base_level = match verbosity {
        0 => config
            .as_ref()
            .map(|c| c.logging.level_filter())
            .unwrap_or(log::LevelFilter::Info),
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);

    let log_file = config
        .as_ref()
        .and_then(|c| c.logging.file.as_ref())
        .and_then(|file| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(file)
                .ok()
        });

    if let Some(f) = log_file {
        let write_mutex = std::sync::Arc::new(std::sync::Mutex::new(f));
        // Only echo to the console when someone is watching it
        let is_tty = atty::is(atty::Stream::Stdout);
        builder.format(move |fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            let line = format!("{} [{}] {}", ts, record.level(), record.args());
            if let Ok(mut guard) = write_mutex.lock() {
                let _ = writeln!(guard, "{}", line);
            }
            if is_tty {
                writeln!(fmt, "{}", line)
            } else {
                Ok(())
            }
        });
    } else {
        builder.format(|fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            writeln!(fmt, "{} [{}] {}", ts, record.level(), record.args())
        });
    }
    let _ = builder.try_init();
}
