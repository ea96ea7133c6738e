use rand::Rng;
use std::sync::Arc;

use crate::catalog::Video;
use crate::error::CommandError;

/// Single-stream playback state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PlaybackState {
  #[default]
  Idle,
  Playing(Arc<Video>),
  Paused(Arc<Video>),
}

/// Outcome of a pause request on a loaded video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PauseOutcome {
  Paused(Arc<Video>),
  AlreadyPaused(Arc<Video>),
}

/// Source of random catalog indices for `PLAY_RANDOM`.
pub trait IndexSource {
  /// Return an index in `0..len`. `len` is never zero.
  fn pick(&mut self, len: usize) -> usize;
}

/// Uniform picks from the thread-local RNG.
pub struct ThreadRngSource;

impl IndexSource for ThreadRngSource {
  fn pick(&mut self, len: usize) -> usize {
    rand::thread_rng().gen_range(0..len)
  }
}

#[derive(Debug, Default)]
pub struct VideoPlayer {
  state: PlaybackState,
}

impl VideoPlayer {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn state(&self) -> &PlaybackState {
    &self.state
  }

  pub fn current(&self) -> Option<&Arc<Video>> {
    match &self.state {
      PlaybackState::Idle => None,
      PlaybackState::Playing(video) | PlaybackState::Paused(video) => Some(video),
    }
  }

  pub fn is_playing(&self) -> bool {
    matches!(self.state, PlaybackState::Playing(_))
  }

  /// Start `video`, returning whatever was loaded before it.
  pub fn play(&mut self, video: Arc<Video>) -> Option<Arc<Video>> {
    match std::mem::replace(&mut self.state, PlaybackState::Playing(video)) {
      PlaybackState::Idle => None,
      PlaybackState::Playing(prev) | PlaybackState::Paused(prev) => Some(prev),
    }
  }

  pub fn stop(&mut self) -> Result<Arc<Video>, CommandError> {
    match std::mem::take(&mut self.state) {
      PlaybackState::Idle => Err(CommandError::NoVideoPlaying),
      PlaybackState::Playing(video) | PlaybackState::Paused(video) => Ok(video),
    }
  }

  pub fn pause(&mut self) -> Result<PauseOutcome, CommandError> {
    match &self.state {
      PlaybackState::Idle => Err(CommandError::NoVideoPlaying),
      PlaybackState::Paused(video) => Ok(PauseOutcome::AlreadyPaused(Arc::clone(video))),
      PlaybackState::Playing(video) => {
        let video = Arc::clone(video);
        self.state = PlaybackState::Paused(Arc::clone(&video));
        Ok(PauseOutcome::Paused(video))
      }
    }
  }

  pub fn resume(&mut self) -> Result<Arc<Video>, CommandError> {
    match &self.state {
      PlaybackState::Idle => Err(CommandError::NoVideoPlaying),
      PlaybackState::Playing(_) => Err(CommandError::NotPaused),
      PlaybackState::Paused(video) => {
        let video = Arc::clone(video);
        self.state = PlaybackState::Playing(Arc::clone(&video));
        Ok(video)
      }
    }
  }
}
