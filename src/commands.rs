use thiserror::Error;

use crate::app::{App, LineSink, SearchResults};

pub const INVALID_COMMAND: &str = "Please enter a valid command, type HELP for a list of available commands.";

const HELP: &[&str] = &[
  "Available commands:",
  "    NUMBER_OF_VIDEOS - Shows how many videos are in the library.",
  "    SHOW_ALL_VIDEOS - Lists all videos from the library.",
  "    PLAY <video_id> - Plays specified video.",
  "    PLAY_RANDOM - Plays a random video from the library.",
  "    STOP - Stop the current video.",
  "    PAUSE - Pause the current video.",
  "    CONTINUE - Resume the current paused video.",
  "    SHOW_PLAYING - Displays the title, video_id and tags of the video currently playing.",
  "    CREATE_PLAYLIST <playlist_name> - Creates a new (empty) playlist with the provided name.",
  "    ADD_TO_PLAYLIST <playlist_name> <video_id> - Adds the requested video to the playlist.",
  "    REMOVE_FROM_PLAYLIST <playlist_name> <video_id> - Removes the specified video from the specified playlist",
  "    CLEAR_PLAYLIST <playlist_name> - Removes all the videos from the playlist.",
  "    DELETE_PLAYLIST <playlist_name> - Deletes the playlist.",
  "    SHOW_PLAYLIST <playlist_name> - List all the videos in this playlist.",
  "    SHOW_ALL_PLAYLISTS - Display all the available playlists.",
  "    SEARCH_VIDEOS <search_term> - Display all the videos whose titles contain the search_term.",
  "    SEARCH_VIDEOS_WITH_TAG <tag_name> - Display all videos whose tags contains the provided tag.",
  "    FLAG_VIDEO <video_id> <flag_reason> - Mark a video as flagged.",
  "    ALLOW_VIDEO <video_id> - Removes a flag from a video.",
  "    HELP - Displays help.",
  "    EXIT - Terminates the program execution.",
];

/// One parsed shell line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
  NumberOfVideos,
  ShowAllVideos,
  Play(String),
  PlayRandom,
  Stop,
  Pause,
  Continue,
  ShowPlaying,
  CreatePlaylist(String),
  AddToPlaylist { playlist: String, video_id: String },
  RemoveFromPlaylist { playlist: String, video_id: String },
  ClearPlaylist(String),
  DeletePlaylist(String),
  ShowPlaylist(String),
  ShowAllPlaylists,
  SearchVideos(String),
  SearchVideosWithTag(String),
  FlagVideo { video_id: String, reason: Option<String> },
  AllowVideo(String),
  Help,
  Exit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
  #[error("empty line")]
  Empty,
  #[error("unknown command {0}")]
  Unknown(String),
  #[error("wrong number of arguments for {0}")]
  Arity(String),
}

/// Parse a shell line. The command name is case-insensitive; arguments are
/// whitespace-separated, except a flag reason which takes the rest of the line.
pub fn parse(line: &str) -> Result<Command, ParseError> {
  let mut tokens = line.split_whitespace();
  let Some(name) = tokens.next() else {
    return Err(ParseError::Empty);
  };
  let name = name.to_uppercase();
  let args: Vec<&str> = tokens.collect();
  let arity = || ParseError::Arity(name.clone());

  let command = match (name.as_str(), args.as_slice()) {
    ("NUMBER_OF_VIDEOS", []) => Command::NumberOfVideos,
    ("SHOW_ALL_VIDEOS", []) => Command::ShowAllVideos,
    ("PLAY", [id]) => Command::Play(id.to_string()),
    ("PLAY_RANDOM", []) => Command::PlayRandom,
    ("STOP", []) => Command::Stop,
    ("PAUSE", []) => Command::Pause,
    ("CONTINUE", []) => Command::Continue,
    ("SHOW_PLAYING", []) => Command::ShowPlaying,
    ("CREATE_PLAYLIST", [playlist]) => Command::CreatePlaylist(playlist.to_string()),
    ("ADD_TO_PLAYLIST", [playlist, id]) => {
      Command::AddToPlaylist { playlist: playlist.to_string(), video_id: id.to_string() }
    }
    ("REMOVE_FROM_PLAYLIST", [playlist, id]) => {
      Command::RemoveFromPlaylist { playlist: playlist.to_string(), video_id: id.to_string() }
    }
    ("CLEAR_PLAYLIST", [playlist]) => Command::ClearPlaylist(playlist.to_string()),
    ("DELETE_PLAYLIST", [playlist]) => Command::DeletePlaylist(playlist.to_string()),
    ("SHOW_PLAYLIST", [playlist]) => Command::ShowPlaylist(playlist.to_string()),
    ("SHOW_ALL_PLAYLISTS", []) => Command::ShowAllPlaylists,
    ("SEARCH_VIDEOS", [term]) => Command::SearchVideos(term.to_string()),
    ("SEARCH_VIDEOS_WITH_TAG", [tag]) => Command::SearchVideosWithTag(tag.to_string()),
    ("FLAG_VIDEO", [id, reason @ ..]) => Command::FlagVideo {
      video_id: id.to_string(),
      reason: if reason.is_empty() { None } else { Some(reason.join(" ")) },
    },
    ("ALLOW_VIDEO", [id]) => Command::AllowVideo(id.to_string()),
    ("HELP", []) => Command::Help,
    ("EXIT", []) => Command::Exit,
    (
      "NUMBER_OF_VIDEOS" | "SHOW_ALL_VIDEOS" | "PLAY" | "PLAY_RANDOM" | "STOP" | "PAUSE" | "CONTINUE" | "SHOW_PLAYING"
      | "CREATE_PLAYLIST" | "ADD_TO_PLAYLIST" | "REMOVE_FROM_PLAYLIST" | "CLEAR_PLAYLIST" | "DELETE_PLAYLIST"
      | "SHOW_PLAYLIST" | "SHOW_ALL_PLAYLISTS" | "SEARCH_VIDEOS" | "SEARCH_VIDEOS_WITH_TAG" | "FLAG_VIDEO"
      | "ALLOW_VIDEO" | "HELP" | "EXIT",
      _,
    ) => return Err(arity()),
    _ => return Err(ParseError::Unknown(name.clone())),
  };
  Ok(command)
}

/// What the shell should do after a command ran.
#[derive(Debug)]
pub enum Flow {
  Continue,
  /// A search printed results; the next input line is the user's pick.
  AwaitSelection(SearchResults),
  Exit,
}

pub fn handle_command<O: LineSink>(app: &mut App<O>, command: Command) -> Flow {
  match command {
    Command::NumberOfVideos => app.number_of_videos(),
    Command::ShowAllVideos => app.show_all_videos(),
    Command::Play(id) => app.play_video(&id),
    Command::PlayRandom => app.play_random_video(),
    Command::Stop => app.stop_video(),
    Command::Pause => app.pause_video(),
    Command::Continue => app.continue_video(),
    Command::ShowPlaying => app.show_playing(),
    Command::CreatePlaylist(name) => app.create_playlist(&name),
    Command::AddToPlaylist { playlist, video_id } => app.add_to_playlist(&playlist, &video_id),
    Command::RemoveFromPlaylist { playlist, video_id } => app.remove_from_playlist(&playlist, &video_id),
    Command::ClearPlaylist(name) => app.clear_playlist(&name),
    Command::DeletePlaylist(name) => app.delete_playlist(&name),
    Command::ShowPlaylist(name) => app.show_playlist(&name),
    Command::ShowAllPlaylists => app.show_all_playlists(),
    Command::SearchVideos(term) => return awaiting(app.search_videos(&term)),
    Command::SearchVideosWithTag(tag) => return awaiting(app.search_videos_with_tag(&tag)),
    Command::FlagVideo { video_id, reason } => app.flag_video(&video_id, reason.as_deref()),
    Command::AllowVideo(id) => app.allow_video(&id),
    Command::Help => {
      for line in HELP {
        app.emit(*line);
      }
    }
    Command::Exit => return Flow::Exit,
  }
  Flow::Continue
}

fn awaiting(results: Option<SearchResults>) -> Flow {
  results.map_or(Flow::Continue, Flow::AwaitSelection)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::{Catalog, Video};
  use crate::player::ThreadRngSource;

  #[test]
  fn parse_case_insensitive_name() {
    assert_eq!(parse("play amazing_cats_video_id"), Ok(Command::Play("amazing_cats_video_id".to_string())));
    assert_eq!(parse("  Show_All_Playlists  "), Ok(Command::ShowAllPlaylists));
  }

  #[test]
  fn parse_keeps_argument_case() {
    assert_eq!(
      parse("ADD_TO_PLAYLIST My_List Some_ID"),
      Ok(Command::AddToPlaylist { playlist: "My_List".to_string(), video_id: "Some_ID".to_string() })
    );
  }

  #[test]
  fn parse_flag_reason_rest_of_line() {
    assert_eq!(
      parse("FLAG_VIDEO v1 not  family friendly"),
      Ok(Command::FlagVideo { video_id: "v1".to_string(), reason: Some("not family friendly".to_string()) })
    );
    assert_eq!(parse("FLAG_VIDEO v1"), Ok(Command::FlagVideo { video_id: "v1".to_string(), reason: None }));
  }

  #[test]
  fn parse_empty_line() {
    assert_eq!(parse(""), Err(ParseError::Empty));
    assert_eq!(parse("   \t "), Err(ParseError::Empty));
  }

  #[test]
  fn parse_wrong_arity() {
    assert_eq!(parse("PLAY"), Err(ParseError::Arity("PLAY".to_string())));
    assert_eq!(parse("stop now"), Err(ParseError::Arity("STOP".to_string())));
    assert_eq!(parse("ADD_TO_PLAYLIST mix"), Err(ParseError::Arity("ADD_TO_PLAYLIST".to_string())));
    assert_eq!(parse("FLAG_VIDEO"), Err(ParseError::Arity("FLAG_VIDEO".to_string())));
  }

  #[test]
  fn parse_unknown() {
    assert_eq!(parse("REWIND 10"), Err(ParseError::Unknown("REWIND".to_string())));
  }

  fn app() -> App<Vec<String>> {
    let catalog = Catalog::new(vec![
      Video::new("v1", "Amazing Cat Video", &["cat", "animal"]),
      Video::new("v2", "Another Cat Video", &["cat"]),
    ]);
    App::new(catalog, Box::new(ThreadRngSource), Vec::new())
  }

  #[test]
  fn handle_search_awaits_selection() {
    let mut app = app();
    let flow = handle_command(&mut app, Command::SearchVideos("cat".to_string()));
    let Flow::AwaitSelection(results) = flow else { panic!("expected selection prompt") };
    assert_eq!(results.count(), 2);
  }

  #[test]
  fn handle_search_without_results_continues() {
    let mut app = app();
    let flow = handle_command(&mut app, Command::SearchVideosWithTag("dog".to_string()));
    assert!(matches!(flow, Flow::Continue));
  }

  #[test]
  fn handle_exit_and_help() {
    let mut app = app();
    assert!(matches!(handle_command(&mut app, Command::Exit), Flow::Exit));
    assert!(matches!(handle_command(&mut app, Command::Help), Flow::Continue));
    assert_eq!(app.output_mut().len(), HELP.len());
  }

  #[test]
  fn scenario_flag_then_search() {
    let mut app = app();
    handle_command(&mut app, parse("FLAG_VIDEO v1 duplicate").unwrap());
    let Flow::AwaitSelection(results) = handle_command(&mut app, parse("SEARCH_VIDEOS cat").unwrap()) else {
      panic!("expected selection prompt")
    };
    app.play_search_result(&results, Some(1));
    let out = std::mem::take(app.output_mut());
    assert_eq!(out[0], "Successfully flagged video: Amazing Cat Video (reason: duplicate)");
    assert_eq!(out[2], "  1) Another Cat Video (v2) [cat]");
    assert_eq!(out.last().map(String::as_str), Some("Playing video: Another Cat Video"));
  }
}
