use anyhow::{Context, Result};
use std::io::{self, Write};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::catalog::{Catalog, Video};
use crate::constants::constants;
use crate::error::{Action, CommandError, failure_line};
use crate::flags::FlagRegistry;
use crate::player::{IndexSource, PauseOutcome, PlaybackState, VideoPlayer};
use crate::playlist::PlaylistStore;

// --- Output ---

/// Destination for status lines, one call per message.
pub trait LineSink {
  fn write_line(&mut self, line: String);

  /// Show the shell prompt. Sinks without a terminal ignore it.
  fn write_prompt(&mut self, _prompt: &str) {}

  /// Report the first write failure, if any.
  fn status(&mut self) -> Result<()> {
    Ok(())
  }
}

/// Writes lines to an `io::Write`. The first failure is kept and later
/// writes are dropped, so command handlers stay infallible.
pub struct WriteSink<W: Write> {
  writer: W,
  error: Option<io::Error>,
}

impl<W: Write> WriteSink<W> {
  pub fn new(writer: W) -> Self {
    Self { writer, error: None }
  }

  fn write_with(&mut self, f: impl FnOnce(&mut W) -> io::Result<()>) {
    if self.error.is_some() {
      return;
    }
    if let Err(e) = f(&mut self.writer) {
      warn!(err = %e, "output: write failed");
      self.error = Some(e);
    }
  }
}

impl WriteSink<io::Stdout> {
  pub fn stdout() -> Self {
    Self::new(io::stdout())
  }
}

impl<W: Write> LineSink for WriteSink<W> {
  fn write_line(&mut self, line: String) {
    self.write_with(|w| writeln!(w, "{}", line));
  }

  fn write_prompt(&mut self, prompt: &str) {
    self.write_with(|w| {
      write!(w, "{}", prompt)?;
      w.flush()
    });
  }

  fn status(&mut self) -> Result<()> {
    match self.error.take() {
      Some(e) => Err(e).context("Failed to write to stdout"),
      None => Ok(()),
    }
  }
}

/// Collects lines in memory.
impl LineSink for Vec<String> {
  fn write_line(&mut self, line: String) {
    self.push(line);
  }
}

// --- Search ---

/// Numbered results of a search, kept so the caller can act on the user's pick.
#[derive(Debug, Clone)]
pub struct SearchResults {
  videos: Vec<Arc<Video>>,
}

impl SearchResults {
  pub fn count(&self) -> usize {
    self.videos.len()
  }

  /// Map a 1-based answer to a result. Anything out of range is a "no".
  pub fn select(&self, answer: Option<i64>) -> Option<&Arc<Video>> {
    let n = usize::try_from(answer?).ok()?;
    if n == 0 {
      return None;
    }
    self.videos.get(n - 1)
  }
}

// --- Command processor ---

/// Session state plus one handler per user command. Handlers never fail:
/// every rejection is reported as a single line on the sink.
pub struct App<O: LineSink> {
  catalog: Catalog,
  flags: FlagRegistry,
  playlists: PlaylistStore,
  player: VideoPlayer,
  picker: Box<dyn IndexSource>,
  out: O,
}

impl<O: LineSink> App<O> {
  pub fn new(catalog: Catalog, picker: Box<dyn IndexSource>, out: O) -> Self {
    Self {
      catalog,
      flags: FlagRegistry::new(),
      playlists: PlaylistStore::new(),
      player: VideoPlayer::new(),
      picker,
      out,
    }
  }

  pub fn emit(&mut self, line: impl Into<String>) {
    self.out.write_line(line.into());
  }

  pub fn prompt(&mut self) {
    self.out.write_prompt(&constants().prompt);
  }

  /// Surface a failed write on the output sink.
  pub fn output_status(&mut self) -> Result<()> {
    self.out.status()
  }

  #[cfg(test)]
  pub fn output_mut(&mut self) -> &mut O {
    &mut self.out
  }

  #[cfg(test)]
  pub fn player(&self) -> &VideoPlayer {
    &self.player
  }

  fn report(&mut self, action: Action<'_>, result: Result<(), CommandError>) {
    if let Err(err) = result {
      debug!(action = %action.label(), err = %err, "command rejected");
      let line = failure_line(action, &err);
      self.emit(line);
    }
  }

  /// Load `video`, stopping whatever was loaded before it.
  fn start(&mut self, video: Arc<Video>) {
    info!(video_id = %video.id, "play: started");
    let title = video.title.clone();
    if let Some(prev) = self.player.play(video) {
      self.emit(format!("Stopping video: {}", prev.title));
    }
    self.emit(format!("Playing video: {}", title));
  }

  fn lookup(&self, id: &str) -> Result<Arc<Video>, CommandError> {
    self.catalog.get(id).cloned().ok_or(CommandError::VideoNotFound)
  }

  // --- Catalog ---

  pub fn number_of_videos(&mut self) {
    let count = self.catalog.len();
    self.emit(format!("{} videos in the library", count));
  }

  pub fn show_all_videos(&mut self) {
    let mut lines: Vec<String> =
      self.catalog.videos().iter().map(|v| format!("  {}{}", v, self.flags.annotation(&v.id))).collect();
    lines.sort();
    self.emit("Here's a list of all available videos:");
    for line in lines {
      self.emit(line);
    }
  }

  // --- Playback ---

  pub fn play_video(&mut self, id: &str) {
    let result = self.try_play(id);
    self.report(Action::Play, result);
  }

  pub(crate) fn try_play(&mut self, id: &str) -> Result<(), CommandError> {
    let video = self.lookup(id)?;
    self.flags.ensure_allowed(id)?;
    self.start(video);
    Ok(())
  }

  pub fn stop_video(&mut self) {
    let result = self.try_stop();
    self.report(Action::Stop, result);
  }

  pub(crate) fn try_stop(&mut self) -> Result<(), CommandError> {
    let video = self.player.stop()?;
    info!(video_id = %video.id, "play: stopped");
    self.emit(format!("Stopping video: {}", video.title));
    Ok(())
  }

  pub fn play_random_video(&mut self) {
    let result = self.try_play_random();
    self.report(Action::Play, result);
  }

  /// Picks by raw index over the whole catalog, flagged entries included.
  pub(crate) fn try_play_random(&mut self) -> Result<(), CommandError> {
    if self.player.is_playing() {
      self.stop_video();
    }
    if self.catalog.videos().iter().all(|v| self.flags.is_flagged(&v.id)) {
      return Err(CommandError::AllFlagged);
    }
    let idx = self.picker.pick(self.catalog.len());
    let video = Arc::clone(&self.catalog.videos()[idx]);
    self.start(video);
    Ok(())
  }

  pub fn pause_video(&mut self) {
    let result = self.try_pause();
    self.report(Action::Pause, result);
  }

  pub(crate) fn try_pause(&mut self) -> Result<(), CommandError> {
    match self.player.pause()? {
      PauseOutcome::Paused(video) => self.emit(format!("Pausing video: {}", video.title)),
      PauseOutcome::AlreadyPaused(video) => self.emit(format!("Video already paused: {}", video.title)),
    }
    Ok(())
  }

  pub fn continue_video(&mut self) {
    let result = self.try_continue();
    self.report(Action::Continue, result);
  }

  pub(crate) fn try_continue(&mut self) -> Result<(), CommandError> {
    let video = self.player.resume()?;
    self.emit(format!("Continuing video: {}", video.title));
    Ok(())
  }

  pub fn show_playing(&mut self) {
    let line = match self.player.state() {
      PlaybackState::Idle => "No video is currently playing".to_string(),
      PlaybackState::Playing(video) => format!("Currently playing: {}", video),
      PlaybackState::Paused(video) => format!("Currently playing: {} - PAUSED", video),
    };
    self.emit(line);
  }

  // --- Playlists ---

  pub fn create_playlist(&mut self, name: &str) {
    let result = self.try_create_playlist(name);
    self.report(Action::CreatePlaylist, result);
  }

  pub(crate) fn try_create_playlist(&mut self, name: &str) -> Result<(), CommandError> {
    self.playlists.create(name)?;
    info!(playlist = %name, "playlist: created");
    self.emit(format!("Successfully created new playlist: {}", name));
    Ok(())
  }

  pub fn add_to_playlist(&mut self, name: &str, id: &str) {
    let result = self.try_add_to_playlist(name, id);
    self.report(Action::AddTo(name), result);
  }

  /// The flag check runs before the playlist lookup.
  pub(crate) fn try_add_to_playlist(&mut self, name: &str, id: &str) -> Result<(), CommandError> {
    self.flags.ensure_allowed(id)?;
    let video = self.catalog.get(id).cloned();
    let playlist = self.playlists.get_mut(name)?;
    let video = video.ok_or(CommandError::VideoNotFound)?;
    playlist.add(Arc::clone(&video))?;
    info!(playlist = %name, video_id = %id, "playlist: video added");
    self.emit(format!("Added video to {}: {}", name, video.title));
    Ok(())
  }

  pub fn remove_from_playlist(&mut self, name: &str, id: &str) {
    let result = self.try_remove_from_playlist(name, id);
    self.report(Action::RemoveFrom(name), result);
  }

  pub(crate) fn try_remove_from_playlist(&mut self, name: &str, id: &str) -> Result<(), CommandError> {
    let known = self.catalog.get(id).is_some();
    let playlist = self.playlists.get_mut(name)?;
    if !known {
      return Err(CommandError::VideoNotFound);
    }
    let video = playlist.remove(id)?;
    info!(playlist = %name, video_id = %id, "playlist: video removed");
    self.emit(format!("Removed video from {}: {}", name, video.title));
    Ok(())
  }

  pub fn clear_playlist(&mut self, name: &str) {
    let result = self.try_clear_playlist(name);
    self.report(Action::ClearPlaylist(name), result);
  }

  pub(crate) fn try_clear_playlist(&mut self, name: &str) -> Result<(), CommandError> {
    let playlist = self.playlists.get_mut(name)?;
    if playlist.is_empty() {
      self.emit("Playlist already empty");
      return Ok(());
    }
    playlist.clear();
    info!(playlist = %name, "playlist: cleared");
    self.emit(format!("Successfully removed all videos from {}", name));
    Ok(())
  }

  pub fn delete_playlist(&mut self, name: &str) {
    let result = self.try_delete_playlist(name);
    self.report(Action::DeletePlaylist(name), result);
  }

  pub(crate) fn try_delete_playlist(&mut self, name: &str) -> Result<(), CommandError> {
    self.playlists.delete(name)?;
    info!(playlist = %name, "playlist: deleted");
    self.emit(format!("Deleted playlist: {}", name));
    Ok(())
  }

  pub fn show_playlist(&mut self, name: &str) {
    let result = self.try_show_playlist(name);
    self.report(Action::ShowPlaylist(name), result);
  }

  pub(crate) fn try_show_playlist(&mut self, name: &str) -> Result<(), CommandError> {
    let playlist = self.playlists.get(name)?;
    let lines: Vec<String> =
      playlist.videos().iter().map(|v| format!("  {}{}", v, self.flags.annotation(&v.id))).collect();
    self.emit(format!("Showing playlist: {}", name));
    if lines.is_empty() {
      self.emit("  No videos here yet");
    }
    for line in lines {
      self.emit(line);
    }
    Ok(())
  }

  pub fn show_all_playlists(&mut self) {
    if self.playlists.is_empty() {
      self.emit("No playlists exist yet");
      return;
    }
    let names: Vec<String> = self.playlists.sorted_names().into_iter().map(|n| format!("  {}", n)).collect();
    self.emit("Showing all playlists:");
    for name in names {
      self.emit(name);
    }
  }

  // --- Search ---

  /// Case-insensitive substring match on titles.
  pub fn search_videos(&mut self, term: &str) -> Option<SearchResults> {
    let needle = term.to_lowercase();
    self.search(term, |v| v.title.to_lowercase().contains(&needle))
  }

  /// Exact, case-sensitive tag match.
  pub fn search_videos_with_tag(&mut self, tag: &str) -> Option<SearchResults> {
    self.search(tag, |v| v.has_tag(tag))
  }

  fn search(&mut self, term: &str, matches: impl Fn(&Video) -> bool) -> Option<SearchResults> {
    let mut videos: Vec<Arc<Video>> =
      self.catalog.videos().iter().filter(|v| !self.flags.is_flagged(&v.id) && matches(v)).cloned().collect();
    debug!(term = %term, hits = videos.len(), "search");
    if videos.is_empty() {
      self.emit(format!("No search results for {}", term));
      return None;
    }
    videos.sort_by_cached_key(|v| v.to_string());
    self.emit(format!("Here are the results for {}:", term));
    for (i, video) in videos.iter().enumerate() {
      self.emit(format!("  {}) {}", i + 1, video));
    }
    self.emit("Would you like to play any of the above? If yes, specify the number of the video.");
    self.emit("If your answer is not a valid number, we will assume it's a no.");
    Some(SearchResults { videos })
  }

  /// Act on the answer to the post-search prompt. Invalid answers are ignored.
  pub fn play_search_result(&mut self, results: &SearchResults, answer: Option<i64>) {
    match results.select(answer) {
      Some(video) => self.start(Arc::clone(video)),
      None => debug!(?answer, "search: selection declined"),
    }
  }

  // --- Moderation ---

  /// Flag a video. `None` or a blank reason records the default reason.
  pub fn flag_video(&mut self, id: &str, reason: Option<&str>) {
    let result = self.try_flag(id, reason);
    self.report(Action::Flag, result);
  }

  pub(crate) fn try_flag(&mut self, id: &str, reason: Option<&str>) -> Result<(), CommandError> {
    if self.flags.is_flagged(id) {
      return Err(CommandError::AlreadyFlagged);
    }
    let video = self.lookup(id)?;
    let reason = reason.map(str::trim).filter(|r| !r.is_empty()).unwrap_or(constants().default_flag_reason.as_str());
    self.flags.flag(id, reason)?;
    info!(video_id = %id, reason = %reason, "flag: added");
    if self.player.current().is_some_and(|current| current.id == video.id) {
      self.stop_video();
    }
    self.emit(format!("Successfully flagged video: {} (reason: {})", video.title, reason));
    Ok(())
  }

  pub fn allow_video(&mut self, id: &str) {
    let result = self.try_allow(id);
    self.report(Action::Allow, result);
  }

  pub(crate) fn try_allow(&mut self, id: &str) -> Result<(), CommandError> {
    let video = self.lookup(id)?;
    self.flags.unflag(id)?;
    info!(video_id = %id, "flag: removed");
    self.emit(format!("Successfully removed flag from video: {}", video.title));
    Ok(())
  }
}
