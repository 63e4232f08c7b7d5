//! Rinkboard command line shell
//!
//! Headless access to the board core: inspect, import and export session
//! documents, build share parameters and play chapters back.

use clap::{Parser, Subcommand};
use rinkboard_core::playback::{ChapterPlayer, FrameHost, PlaybackConfig, PlaybackOutcome, PlaybackSpeed};
use rinkboard_core::storage::{AutoSaveManager, BoxFuture, FileStorage};
use rinkboard_core::{BoardStore, encode_state_to_param, export_file_name};
use std::cell::RefCell;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Frame interval of the headless playback host (about 60 Hz).
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

type CliResult<T> = Result<T, Box<dyn Error>>;

#[derive(Parser)]
#[command(name = "rinkboard")]
#[command(about = "Rink tactics board: session files, share links and chapter playback", long_about = None)]
struct Cli {
    /// Directory holding the autosaved session
    #[arg(long, global = true, env = "RINKBOARD_STORAGE_DIR")]
    storage_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize a session file
    Inspect {
        /// Exported session file
        file: PathBuf,
    },

    /// Import a session file into storage
    Import {
        /// Exported session file
        file: PathBuf,
    },

    /// Write the stored session to a timestamped export file
    Export {
        /// Output directory
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },

    /// Remove the stored session
    Forget,

    /// Print the share parameter for a session file
    ShareEncode {
        /// Exported session file
        file: PathBuf,
    },

    /// Decode a share parameter and print the session document
    ShareDecode {
        /// Share parameter
        param: String,
    },

    /// Play a session's chapters and print the final positions
    Play {
        /// Exported session file
        file: PathBuf,

        /// Playback speed: 0.5, 1 or 2
        #[arg(long, default_value = "1", value_parser = parse_speed)]
        speed: PlaybackSpeed,
    },
}

fn parse_speed(value: &str) -> Result<PlaybackSpeed, String> {
    PlaybackSpeed::parse(value).ok_or_else(|| format!("unsupported speed '{value}', expected 0.5, 1 or 2"))
}

/// Playback host backed by tokio timers.
struct TokioHost {
    epoch: Instant,
    frame_interval: Duration,
}

impl TokioHost {
    fn new(frame_interval: Duration) -> Self {
        Self {
            epoch: Instant::now(),
            frame_interval,
        }
    }
}

impl FrameHost for TokioHost {
    fn sleep(&self, duration: Duration) -> BoxFuture<'_, ()> {
        Box::pin(tokio::time::sleep(duration))
    }

    fn next_frame(&self) -> BoxFuture<'_, Duration> {
        Box::pin(async move {
            tokio::time::sleep(self.frame_interval).await;
            self.epoch.elapsed()
        })
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_time().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("error: failed to start runtime: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(run(cli)) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    match cli.command {
        Commands::Inspect { file } => inspect(&file),
        Commands::Import { file } => {
            let board = load_session(&file)?;
            let mut manager = autosave_manager(cli.storage_dir)?;
            manager.save_now(&board).await?;
            log::info!("Stored session from {}", file.display());
            Ok(())
        }
        Commands::Export { out_dir } => {
            let mut board = BoardStore::default();
            let mut manager = autosave_manager(cli.storage_dir)?;
            match manager.restore(&mut board).await {
                Some(outcome) if !outcome.ok => return Err(outcome.message.into()),
                Some(_) => {}
                None => log::warn!("No stored session, exporting the starting board"),
            }

            let document = board.export_all();
            std::fs::create_dir_all(&out_dir)?;
            let path = out_dir.join(export_file_name(&document));
            std::fs::write(&path, document.to_json()?)?;
            println!("{}", path.display());
            Ok(())
        }
        Commands::Forget => {
            let manager = autosave_manager(cli.storage_dir)?;
            manager.forget().await?;
            Ok(())
        }
        Commands::ShareEncode { file } => {
            let board = load_session(&file)?;
            println!("{}", encode_state_to_param(&board.export_all())?);
            Ok(())
        }
        Commands::ShareDecode { param } => {
            let mut board = BoardStore::default();
            let outcome = board.import_from_param(&param);
            if !outcome.ok {
                return Err(outcome.message.into());
            }
            println!("{}", board.export_all().to_json()?);
            Ok(())
        }
        Commands::Play { file, speed } => play(&file, speed).await,
    }
}

fn autosave_manager(storage_dir: Option<PathBuf>) -> CliResult<AutoSaveManager<FileStorage>> {
    let storage = match storage_dir {
        Some(dir) => FileStorage::new(dir)?,
        None => FileStorage::default_location()?,
    };
    Ok(AutoSaveManager::new(Arc::new(storage)))
}

fn load_session(file: &Path) -> CliResult<BoardStore> {
    let text = std::fs::read_to_string(file)?;
    let mut board = BoardStore::default();
    let outcome = board.import_json(&text);
    if !outcome.ok {
        return Err(format!("{}: {}", file.display(), outcome.message).into());
    }
    Ok(board)
}

fn inspect(file: &Path) -> CliResult<()> {
    let board = load_session(file)?;

    println!("players:  {}", board.players().len());
    println!("ball:     ({:.2}, {:.2})", board.ball().x, board.ball().y);
    println!("rotation: {} quarter turns", board.board_rotation().quarter_turns());
    let labels: Vec<&str> = board.chapters().sequence().map(|c| c.id.as_str()).collect();
    println!("chapters: [{}]", labels.join(", "));
    println!("active:   {}", board.active_chapter_index() + 1);
    println!("lines:    {}", board.drawing().lines().len());
    println!("texts:    {}", board.drawing().texts().len());
    Ok(())
}

async fn play(file: &Path, speed: PlaybackSpeed) -> CliResult<()> {
    let board = RefCell::new(load_session(file)?);
    let player = ChapterPlayer::new(
        TokioHost::new(FRAME_INTERVAL),
        PlaybackConfig::default().with_speed(speed),
    );

    let started = Instant::now();
    match player.play(&board).await {
        PlaybackOutcome::Finished { chapters } => {
            log::info!("Played {} chapters in {:.2?}", chapters, started.elapsed());
        }
        PlaybackOutcome::Cancelled => log::warn!("Playback cancelled"),
    }

    let board = board.borrow();
    for p in board.players() {
        println!("{:<8} #{:<3} {:>7.2} {:>7.2}", p.id, p.number, p.x, p.y);
    }
    println!("{:<13} {:>7.2} {:>7.2}", "ball", board.ball().x, board.ball().y);
    Ok(())
}
