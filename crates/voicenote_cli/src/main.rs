//! Terminal front end for the VoiceNote core.
//!
//! # Responsibility
//! - Drive the note store and capture session from the command line.
//! - Double as a smoke probe for `voicenote_core` linkage.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::io::BufRead;
use std::path::PathBuf;
use voicenote_core::capture::DICTATION_UNAVAILABLE_MESSAGE;
use voicenote_core::{
    CaptureSession, CaptureUpdate, DictationConfig, HostDictationEngine, LogNotifier,
    LoggingConfig, Note, NoteStore, RecognitionResult, SaveOutcome, SqliteStorage, StopReason,
    StoreConfig,
};

const DEFAULT_DB_FILE_NAME: &str = "voicenote.sqlite3";
const DEFAULT_ORIGIN: &str = "cli";

#[derive(Debug, Parser)]
#[command(name = "voicenote", version, about = "Local notes with dictation")]
struct Cli {
    /// SQLite database file; defaults to the system temp directory.
    #[arg(long, env = "VOICENOTE_DB_PATH", global = true)]
    db: Option<PathBuf>,

    /// Storage scope inside the database.
    #[arg(long, default_value = DEFAULT_ORIGIN, global = true)]
    origin: String,

    /// Absolute directory for rolling log files; logging is off when unset.
    #[arg(long, env = "VOICENOTE_LOG_DIR", global = true)]
    log_dir: Option<PathBuf>,

    #[arg(long, default_value = voicenote_core::default_log_level(), global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create a note from the given text.
    Add { text: Vec<String> },
    /// List notes, newest first.
    List,
    /// Case-insensitive substring search.
    Search { query: String },
    /// Delete a note by id.
    Delete { id: String },
    /// Dictate a note: every stdin line is one recognized segment; EOF saves.
    Dictate {
        #[arg(long, default_value = "pt-BR")]
        locale: String,
    },
    /// Print core version and store location.
    Info,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_ref() {
        let config = LoggingConfig::new(log_dir).with_level(cli.log_level.as_str());
        voicenote_core::init_logging(&config).context("failed to initialize logging")?;
    }

    let db_path = cli
        .db
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME));
    let storage = SqliteStorage::open(&db_path, cli.origin.as_str())
        .with_context(|| format!("failed to open notes at `{}`", db_path.display()))?;
    let mut store = NoteStore::initialize(storage, StoreConfig::default());

    match cli.command {
        Command::Add { text } => {
            let content = text.join(" ");
            if content.is_empty() {
                bail!("note text must not be empty");
            }
            let note = store
                .create_note(content)?
                .context("note text must not be empty")?;
            println!("created {}", note.id);
        }
        Command::List => print_notes(store.notes().iter()),
        Command::Search { query } => print_notes(store.search(query.as_str()).into_iter()),
        Command::Delete { id } => {
            let before = store.len();
            let remaining = store.delete(id.as_str())?.len();
            if remaining == before {
                println!("no note with id {id}");
            } else {
                println!("deleted {id}");
            }
        }
        Command::Dictate { locale } => dictate(&mut store, locale)?,
        Command::Info => {
            println!("voicenote_core ping={}", voicenote_core::ping());
            println!("voicenote_core version={}", voicenote_core::core_version());
            println!("db={} origin={} notes={}", db_path.display(), cli.origin, store.len());
        }
    }

    Ok(())
}

fn dictate(store: &mut NoteStore<SqliteStorage>, locale: String) -> Result<()> {
    let engine = HostDictationEngine::new(true);
    let host = engine.clone();
    let config = DictationConfig {
        locale,
        ..DictationConfig::default()
    };
    let mut session = CaptureSession::new(engine, LogNotifier, config);
    session
        .start_recording()
        .context(DICTATION_UNAVAILABLE_MESSAGE)?;
    eprintln!("listening; one line per phrase, Ctrl-D to save");

    let mut segments = Vec::new();
    for line in std::io::stdin().lock().lines() {
        let line = line.context("failed to read stdin")?;
        let phrase = line.trim();
        if phrase.is_empty() {
            continue;
        }
        let text = if segments.is_empty() {
            phrase.to_string()
        } else {
            format!(" {phrase}")
        };
        segments.push(RecognitionResult::finalized(text));
        host.push_results(segments.clone());

        for update in session.pump_pending() {
            match update {
                CaptureUpdate::Transcript(transcript) => eprintln!("> {transcript}"),
                CaptureUpdate::RecordingStopped(StopReason::Error(code)) => {
                    eprintln!("dictation stopped: {code}")
                }
                _ => {}
            }
        }
    }

    host.end();
    session.pump_pending();

    match session.save(store)? {
        SaveOutcome::Saved(note) => println!("created {}", note.id),
        SaveOutcome::Rejected => println!("nothing dictated"),
    }
    Ok(())
}

fn print_notes<'a>(notes: impl Iterator<Item = &'a Note>) {
    let mut count = 0usize;
    for note in notes {
        count += 1;
        println!(
            "{}  {}  {}",
            note.id,
            note.created_at.format("%Y-%m-%d %H:%M"),
            note.content.replace('\n', " ")
        );
    }
    if count == 0 {
        println!("no notes");
    }
}
