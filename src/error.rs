use thiserror::Error;

/// Why a command could not proceed. Rendered as the reason half of a
/// `Cannot {action}: {reason}` line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
  #[error("Video does not exist")]
  VideoNotFound,
  #[error("Video is currently flagged (reason: {0})")]
  Flagged(String),
  #[error("Video is already flagged")]
  AlreadyFlagged,
  #[error("Video is not flagged")]
  NotFlagged,
  #[error("No video is currently playing")]
  NoVideoPlaying,
  #[error("Video is not paused")]
  NotPaused,
  #[error("No videos available")]
  AllFlagged,
  #[error("A playlist with the same name already exists")]
  DuplicateName,
  #[error("Video already added")]
  AlreadyInPlaylist,
  #[error("Video is not in playlist")]
  NotInPlaylist,
  #[error("Playlist does not exist")]
  PlaylistNotFound,
}

/// The operation a failure line is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action<'a> {
  Play,
  Stop,
  Pause,
  Continue,
  CreatePlaylist,
  AddTo(&'a str),
  RemoveFrom(&'a str),
  ClearPlaylist(&'a str),
  DeletePlaylist(&'a str),
  ShowPlaylist(&'a str),
  Flag,
  Allow,
}

impl Action<'_> {
  pub fn label(self) -> String {
    match self {
      Action::Play => "play video".to_string(),
      Action::Stop => "stop video".to_string(),
      Action::Pause => "pause video".to_string(),
      Action::Continue => "continue video".to_string(),
      Action::CreatePlaylist => "create playlist".to_string(),
      Action::AddTo(name) => format!("add video to {}", name),
      Action::RemoveFrom(name) => format!("remove video from {}", name),
      Action::ClearPlaylist(name) => format!("clear playlist {}", name),
      Action::DeletePlaylist(name) => format!("delete playlist {}", name),
      Action::ShowPlaylist(name) => format!("show playlist {}", name),
      Action::Flag => "flag video".to_string(),
      Action::Allow => "remove flag from video".to_string(),
    }
  }
}

/// Render the single explanatory line for a failed command.
pub fn failure_line(action: Action<'_>, err: &CommandError) -> String {
  match err {
    CommandError::AllFlagged => err.to_string(),
    _ => format!("Cannot {}: {}", action.label(), err),
  }
}
