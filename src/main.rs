mod app;
mod catalog;
mod commands;
mod config;
mod constants;
mod error;
mod flags;
mod input;
mod player;
mod playlist;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use std::path::PathBuf;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use app::{App, LineSink, WriteSink};
use catalog::{Catalog, EmbeddedCatalog, FileCatalog};
use commands::{Flow, INVALID_COMMAND, ParseError, handle_command};
use config::Config;
use constants::constants;
use player::ThreadRngSource;

// --- CLI ---

#[derive(Parser, Debug)]
#[command(author, version = env!("CARGO_PKG_VERSION"), about, long_about = None)]
struct Args {
  /// Catalog file with one `title | id | #tag , #tag` entry per line (default: built-in catalog)
  #[arg(short, long)]
  catalog: Option<PathBuf>,

  /// Print a completion script for the given shell and exit
  #[arg(long, value_enum)]
  completions: Option<clap_complete::Shell>,
}

// --- Logging ---

/// Log to a daily rolling file; stdout carries the command output.
fn init_tracing(prefs_filter: Option<&str>) -> Result<WorkerGuard> {
  let log_dir = config::log_dir();
  std::fs::create_dir_all(&log_dir).with_context(|| format!("Failed to create log dir {}", log_dir.display()))?;

  let file_appender = tracing_appender::rolling::daily(&log_dir, &constants().log_file_name);
  let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

  let env_filter = EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| EnvFilter::new(prefs_filter.unwrap_or(constants().log_filter.as_str())));

  tracing_subscriber::registry()
    .with(env_filter)
    .with(tracing_subscriber::fmt::layer().with_writer(non_blocking).with_ansi(false))
    .init();
  Ok(guard)
}

// --- Main ---

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  if let Some(shell) = args.completions {
    clap_complete::generate(shell, &mut Args::command(), "vp", &mut std::io::stdout());
    return Ok(());
  }

  let config = Config::load();
  let _guard = init_tracing(config.log_filter.as_deref())?;

  let catalog = match args.catalog.or(config.catalog_path) {
    Some(path) => {
      info!(path = %path.display(), "loading catalog file");
      Catalog::load(&FileCatalog { path })?
    }
    None => Catalog::load(&EmbeddedCatalog)?,
  };
  if catalog.is_empty() {
    warn!("catalog is empty");
  }
  info!(videos = catalog.len(), "catalog loaded");

  let mut app = App::new(catalog, Box::new(ThreadRngSource), WriteSink::stdout());
  let mut lines = BufReader::new(tokio::io::stdin()).lines();
  run(&mut app, &mut lines).await
}

/// Read commands until EXIT or end of input. A failed write to the output
/// ends the session with an error.
async fn run<O: LineSink, R: AsyncBufRead + Unpin>(app: &mut App<O>, lines: &mut Lines<R>) -> Result<()> {
  app.emit("Welcome to vp. Enter HELP for a list of available commands or EXIT to quit.");

  loop {
    app.prompt();
    app.output_status()?;

    let Some(line) = input::next_line(lines).await? else { break };
    let command = match commands::parse(&line) {
      Ok(command) => command,
      Err(ParseError::Empty) => continue,
      Err(e) => {
        debug!(err = %e, "invalid command");
        app.emit(INVALID_COMMAND);
        continue;
      }
    };
    debug!(?command, "command");

    match handle_command(app, command) {
      Flow::Continue => {}
      Flow::AwaitSelection(results) => {
        let answer = input::read_optional_int(lines).await?;
        debug!(results = results.count(), ?answer, "search: selection answered");
        app.play_search_result(&results, answer);
      }
      Flow::Exit => break,
    }
    app.output_status()?;
  }

  info!("shell exited");
  app.emit("vp has now terminated its execution. Goodbye!");
  app.output_status()
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io;

  const WELCOME: &str = "Welcome to vp. Enter HELP for a list of available commands or EXIT to quit.";
  const GOODBYE: &str = "vp has now terminated its execution. Goodbye!";

  async fn session(input: &'static [u8]) -> Vec<String> {
    let mut app = App::new(Catalog::load(&EmbeddedCatalog).unwrap(), Box::new(ThreadRngSource), Vec::new());
    let mut lines = BufReader::new(input).lines();
    run(&mut app, &mut lines).await.unwrap();
    std::mem::take(app.output_mut())
  }

  #[tokio::test]
  async fn invalid_blank_search_and_eof() {
    let out = session(b"bogus\n\nSEARCH_VIDEOS cat\n2\nSHOW_PLAYING\n").await;
    assert_eq!(
      out,
      [
        WELCOME,
        INVALID_COMMAND,
        "Here are the results for cat:",
        "  1) Amazing Cats (amazing_cats_video_id) [#cat #animal]",
        "  2) Another Cat Video (another_cat_video_id) [#cat #animal]",
        "Would you like to play any of the above? If yes, specify the number of the video.",
        "If your answer is not a valid number, we will assume it's a no.",
        "Playing video: Another Cat Video",
        "Currently playing: Another Cat Video (another_cat_video_id) [#cat #animal]",
        GOODBYE,
      ]
    );
  }

  #[tokio::test]
  async fn wrong_arity_is_invalid() {
    let out = session(b"PLAY\nSTOP now\n").await;
    assert_eq!(out, [WELCOME, INVALID_COMMAND, INVALID_COMMAND, GOODBYE]);
  }

  #[tokio::test]
  async fn exit_stops_reading() {
    let out = session(b"exit\nNUMBER_OF_VIDEOS\n").await;
    assert_eq!(out, [WELCOME, GOODBYE]);
  }

  #[tokio::test]
  async fn declined_selection_leaves_player_idle() {
    let out = session(b"SEARCH_VIDEOS_WITH_TAG #dog\nno\nSHOW_PLAYING\nEXIT\n").await;
    assert_eq!(out[1], "Here are the results for #dog:");
    assert_eq!(&out[out.len() - 2..], ["No video is currently playing", GOODBYE]);
  }

  #[tokio::test]
  async fn selection_at_eof_is_a_no() {
    let out = session(b"SEARCH_VIDEOS dogs\n").await;
    assert_eq!(out.last().map(String::as_str), Some(GOODBYE));
    assert!(!out.iter().any(|l| l.starts_with("Playing video")));
  }

  struct ClosedPipe;

  impl io::Write for ClosedPipe {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
      Err(io::Error::from(io::ErrorKind::BrokenPipe))
    }

    fn flush(&mut self) -> io::Result<()> {
      Ok(())
    }
  }

  #[tokio::test]
  async fn broken_output_ends_session_with_error() {
    let catalog = Catalog::load(&EmbeddedCatalog).unwrap();
    let mut app = App::new(catalog, Box::new(ThreadRngSource), WriteSink::new(ClosedPipe));
    let mut lines = BufReader::new(&b"NUMBER_OF_VIDEOS\nSHOW_ALL_VIDEOS\n"[..]).lines();
    let err = run(&mut app, &mut lines).await.unwrap_err();
    assert!(err.to_string().contains("Failed to write to stdout"));
  }
}
