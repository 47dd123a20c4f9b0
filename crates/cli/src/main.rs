//! Lectio CLI - drive the reading-progress engine from a terminal.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lectio_core::{CanonMetadata, DayBoundary, Testament};
use lectio_progress::{encouragement, EngineConfig, ProgressFacade, ReadingEngine};
use lectio_storage::JsonFileStore;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lectio")]
#[command(about = "Bible reading progress tracker", long_about = None)]
struct Cli {
    /// Directory progress is stored in
    #[arg(long, default_value = ".lectio")]
    data_dir: PathBuf,

    /// Canon JSON file (book order, testaments, verse counts)
    #[arg(long, env = "LECTIO_CANON")]
    canon: PathBuf,

    /// Cut streak days at this UTC offset instead of local time
    #[arg(long, allow_hyphen_values = true)]
    utc_offset_minutes: Option<i32>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Open a chapter
    Open {
        /// Book id
        book: String,
        /// Chapter number
        chapter: u32,
    },
    /// Record the furthest verse reached
    Scroll {
        /// Verse number
        verse: u32,
    },
    /// Validate what was read and move on
    Next,
    /// Stop reading, crediting elapsed time
    Pause,
    /// Mark a whole chapter as read
    Complete {
        /// Book id
        book: String,
        /// Chapter number
        chapter: u32,
    },
    /// Show overall progress, streak and estimates
    Status,
    /// List books in progress
    Books,
    /// Erase all progress
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("LECTIO_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let canon_json = tokio::fs::read_to_string(&cli.canon)
        .await
        .with_context(|| format!("reading canon {}", cli.canon.display()))?;
    let canon = CanonMetadata::from_json(&canon_json)?;

    let day_boundary = match cli.utc_offset_minutes {
        Some(minutes) => DayBoundary::from_offset_minutes(minutes)
            .ok_or_else(|| anyhow::anyhow!("UTC offset out of range: {} minutes", minutes))?,
        None => DayBoundary::Local,
    };

    let store = JsonFileStore::new(&cli.data_dir).await?;
    let mut engine = ReadingEngine::new(canon, store).with_config(EngineConfig {
        day_boundary,
        ..Default::default()
    });
    engine.load().await;
    let mut facade = ProgressFacade::new(engine);

    let now = chrono::Utc::now().timestamp_millis();

    match cli.command {
        Commands::Open { book, chapter } => {
            if !facade.open_chapter(&book, chapter, now) {
                anyhow::bail!("{} {} is not in the canon", book, chapter);
            }
            println!("Reading {} {}", book, chapter);
        }
        Commands::Scroll { verse } => {
            facade.verse_visible(verse);
            match facade.engine().active() {
                Some(r) => println!("At verse {} of {}", verse, r),
                None => println!("No chapter open"),
            }
        }
        Commands::Next => {
            let out = facade.next(now);
            println!(
                "Validated {} verse(s){}",
                out.validated_count,
                if out.chapter_completed { ", chapter complete" } else { "" }
            );
            match facade.engine().active() {
                Some(r) => println!("Now reading {}", r),
                None => println!("No chapter open"),
            }
        }
        Commands::Pause => {
            facade.leave(now);
            println!("Paused");
        }
        Commands::Complete { book, chapter } => {
            let added = facade.mark_chapter_read(&book, chapter, now);
            println!("Marked {} {} as read ({} new verse(s))", book, chapter, added);
        }
        Commands::Status => {
            print_status(&facade, now);
            return Ok(());
        }
        Commands::Books => {
            let books = facade.active_books(&HashMap::new(), now);
            println!("Books in progress ({})", books.len());
            for book in books {
                println!(
                    "  {} | {:>3}% | {}/{} chapters | {} | {}",
                    book.name,
                    book.percent,
                    book.chapters_done,
                    book.total_chapters,
                    format_eta(book.eta_min),
                    book.action.as_str(),
                );
            }
            return Ok(());
        }
        Commands::Reset => {
            facade.engine_mut().purge().await?;
            println!("Progress erased");
            return Ok(());
        }
    }

    facade.engine().persist().await?;
    info!("Progress saved to {}", cli.data_dir.display());
    Ok(())
}

fn print_status(facade: &ProgressFacade<CanonMetadata, JsonFileStore>, now: i64) {
    let engine = facade.engine();

    let live = engine.live_times(now);
    match &live.active {
        Some(r) => println!(
            "Reading {} for {}s (chapter {}s, book {}s)",
            r, live.session_sec, live.chapter_sec, live.book_sec
        ),
        None => println!("No chapter open"),
    }

    let global = facade.global_percent();
    println!("Overall: {}% - {}", global, encouragement(global));
    for overview in facade.testament_overviews() {
        println!(
            "  {}: {}/{} verses ({}%)",
            overview.label, overview.tally.read, overview.tally.total, overview.percent
        );
    }

    let streak = engine.streak();
    println!("Streak: {} day(s), best {}", streak.current, streak.best);

    let eta = engine.eta();
    println!("Time left: {}", format_eta(Some(eta.global.minutes)));
    for (testament, scope) in [
        (Testament::Old, eta.old_testament),
        (Testament::New, eta.new_testament),
    ] {
        println!(
            "  {}: {} at {:.1} verses/min",
            testament.as_str(),
            format_eta(Some(scope.minutes)),
            scope.vpm
        );
    }
}

fn format_eta(minutes: Option<f64>) -> String {
    match minutes {
        Some(m) if m.is_finite() => {
            let total = m.ceil() as u64;
            format!("{}h{:02}", total / 60, total % 60)
        }
        _ => "unknown".to_string(),
    }
}
