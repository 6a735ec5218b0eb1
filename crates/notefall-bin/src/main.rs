// notefall: headless driver for the note-fall judgment core.
//
// Loads a chart, plays it with a scripted player and records the high score.

mod driver;
mod player;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::info;
use notefall_chart::{ChartLoader, LoadOptions, TempoMode};
use notefall_config::{GameConfig, HighScoreStore, SongCatalog, score_key};
use notefall_play::{InstantClock, ManualClock, PlaySession, TerminalState};

use driver::{AUDIO_TAIL_SECS, DriveSettings, RunSummary, drive, sleep_interval};
use player::{PlayerOptions, ScriptedPlayer};

#[derive(Parser, Debug)]
#[command(name = "notefall", about = "Headless note-fall rhythm session")]
struct Args {
    /// MIDI chart to play directly.
    #[arg(long, conflicts_with = "songs")]
    chart: Option<PathBuf>,

    /// Song catalog JSON file.
    #[arg(long)]
    songs: Option<PathBuf>,

    /// Song index in the catalog.
    #[arg(long, default_value_t = 0)]
    song: usize,

    /// Difficulty index within the song.
    #[arg(long, default_value_t = 0)]
    difficulty: usize,

    /// Game config JSON file.
    #[arg(long, default_value = "config.json")]
    config: PathBuf,

    /// High score JSON file.
    #[arg(long, default_value = "scores.json")]
    scores: PathBuf,

    /// Ticks per second.
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Scripted player's maximum timing error in milliseconds.
    #[arg(long, default_value_t = 0.0)]
    jitter_ms: f64,

    /// Miss every n-th note on purpose.
    #[arg(long)]
    skip_every: Option<usize>,

    /// Seed for the scripted player's timing error.
    #[arg(long, default_value_t = 0, env = "NOTEFALL_SEED")]
    seed: u64,

    /// Pace ticks on the wall clock instead of running as fast as possible.
    #[arg(long)]
    realtime: bool,

    /// Apply the first tempo to the whole chart (mis-times tempo changes).
    #[arg(long)]
    fixed_tempo: bool,

    /// Starting health.
    #[arg(long, default_value_t = 100)]
    health: i32,
}

/// Chart to play and the key its high score is stored under.
fn select_chart(args: &Args) -> Result<(PathBuf, String)> {
    if let Some(path) = &args.chart {
        let title = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        return Ok((path.clone(), score_key(&title, "default")));
    }
    let Some(songs) = &args.songs else {
        bail!("either --chart or --songs is required");
    };

    let catalog = SongCatalog::read(songs)?;
    let resolved = catalog.resolve(args.song, args.difficulty)?;
    info!("Selected {} [{}]", resolved.title, resolved.difficulty);
    let key = resolved.score_key();
    Ok((resolved.chart_path, key))
}

fn player_options(args: &Args) -> Result<PlayerOptions> {
    if !args.jitter_ms.is_finite() {
        bail!("--jitter-ms must be a finite number, got {}", args.jitter_ms);
    }
    Ok(PlayerOptions {
        jitter: args.jitter_ms / 1000.0,
        skip_every: args.skip_every,
        seed: args.seed,
    })
}

fn print_summary(summary: &RunSummary, key: &str) {
    let p = &summary.progress;
    let result = match summary.terminal {
        TerminalState::Completed => "CLEAR",
        TerminalState::Failed => "FAILED",
        TerminalState::None => "STOPPED",
    };
    println!("{key}: {result}");
    println!("  Score:     {}", p.score);
    println!("  Max combo: {}", p.max_combo);
    println!(
        "  PERFECT {} / GREAT {} / MISS {}",
        p.perfect_count, p.great_count, p.miss_count
    );
    println!("  FAST {} / SLOW {}", p.fast_count, p.slow_count);
    println!("  Accuracy:  {:.2}% ({})", p.accuracy(), p.rank());
    println!("  Health:    {}", p.health);
    println!("  Ticks:     {} ({:.3}s)", summary.ticks, summary.clock);
}

fn record_high_score(path: &Path, key: &str, score: u32) -> Result<()> {
    let mut store = HighScoreStore::open(path);
    let previous = store.get(key);
    if store.submit(key, score) {
        store.save()?;
        match previous {
            Some(best) => println!("New high score! (previous {best})"),
            None => println!("New high score!"),
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = GameConfig::read_or_default(&args.config);
    let (chart_path, key) = select_chart(&args)?;
    let scripted = player_options(&args)?;

    let options = LoadOptions {
        tempo_mode: if args.fixed_tempo {
            TempoMode::Fixed
        } else {
            TempoMode::TempoMap
        },
    };
    let chart = ChartLoader::load_with(&chart_path, options)
        .with_context(|| format!("cannot start session for {}", chart_path.display()))?;
    let chart = Arc::new(chart);

    let settings = DriveSettings {
        fps: args.fps.max(1),
        speed: config.note_speed_multiplier,
        calibration_offset: config.calibration_offset(),
        audio_length: chart.info().duration + AUDIO_TAIL_SECS,
    };
    let mut player = ScriptedPlayer::new(&chart, scripted);
    if player.skipped() > 0 {
        info!("Scripted player will skip {} notes", player.skipped());
    }

    let mut session = PlaySession::start(chart, args.health);
    let summary = if args.realtime {
        let clock = InstantClock::new(settings.audio_length);
        let interval = sleep_interval(&settings);
        drive(&mut session, &mut player, &clock, &settings, |_| {
            std::thread::sleep(interval)
        })
    } else {
        let clock = ManualClock::new(settings.audio_length);
        let dt = settings.tick_interval();
        drive(&mut session, &mut player, &clock, &settings, |c| c.advance(dt))
    };

    print_summary(&summary, &key);

    // Failed runs are never recorded
    if summary.terminal == TerminalState::Completed {
        record_high_score(&args.scores, &key, summary.progress.score)?;
    }
    Ok(())
}
