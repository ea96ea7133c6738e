use std::sync::Arc;

use crate::catalog::Video;
use crate::error::CommandError;

/// A named, ordered list of catalog videos. Membership is by video id.
#[derive(Debug, Clone)]
pub struct Playlist {
  name: String,
  videos: Vec<Arc<Video>>,
}

impl Playlist {
  pub fn new(name: impl Into<String>) -> Self {
    Self { name: name.into(), videos: Vec::new() }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn videos(&self) -> &[Arc<Video>] {
    &self.videos
  }

  pub fn is_empty(&self) -> bool {
    self.videos.is_empty()
  }

  pub fn contains(&self, id: &str) -> bool {
    self.videos.iter().any(|v| v.id == id)
  }

  pub fn add(&mut self, video: Arc<Video>) -> Result<(), CommandError> {
    if self.contains(&video.id) {
      return Err(CommandError::AlreadyInPlaylist);
    }
    self.videos.push(video);
    Ok(())
  }

  pub fn remove(&mut self, id: &str) -> Result<Arc<Video>, CommandError> {
    let idx = self.videos.iter().position(|v| v.id == id).ok_or(CommandError::NotInPlaylist)?;
    Ok(self.videos.remove(idx))
  }

  pub fn clear(&mut self) {
    self.videos.clear();
  }

  fn matches(&self, name: &str) -> bool {
    self.name.to_lowercase() == name.to_lowercase()
  }
}

/// All playlists. Names are unique under case-insensitive comparison.
#[derive(Debug, Default)]
pub struct PlaylistStore {
  playlists: Vec<Playlist>,
}

impl PlaylistStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn create(&mut self, name: &str) -> Result<(), CommandError> {
    if self.playlists.iter().any(|p| p.matches(name)) {
      return Err(CommandError::DuplicateName);
    }
    self.playlists.push(Playlist::new(name));
    Ok(())
  }

  pub fn get(&self, name: &str) -> Result<&Playlist, CommandError> {
    self.playlists.iter().find(|p| p.matches(name)).ok_or(CommandError::PlaylistNotFound)
  }

  pub fn get_mut(&mut self, name: &str) -> Result<&mut Playlist, CommandError> {
    self.playlists.iter_mut().find(|p| p.matches(name)).ok_or(CommandError::PlaylistNotFound)
  }

  pub fn delete(&mut self, name: &str) -> Result<Playlist, CommandError> {
    let idx = self.playlists.iter().position(|p| p.matches(name)).ok_or(CommandError::PlaylistNotFound)?;
    Ok(self.playlists.remove(idx))
  }

  /// Stored names, sorted with ordinary (case-sensitive) string ordering.
  pub fn sorted_names(&self) -> Vec<&str> {
    let mut names: Vec<&str> = self.playlists.iter().map(Playlist::name).collect();
    names.sort_unstable();
    names
  }

  pub fn is_empty(&self) -> bool {
    self.playlists.is_empty()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn video(id: &str) -> Arc<Video> {
    Arc::new(Video::new(id, format!("Title {}", id), &[]))
  }

  #[test]
  fn add_preserves_insertion_order() {
    let mut playlist = Playlist::new("mix");
    playlist.add(video("b")).unwrap();
    playlist.add(video("a")).unwrap();
    let ids: Vec<&str> = playlist.videos().iter().map(|v| v.id.as_str()).collect();
    assert_eq!(ids, ["b", "a"]);
  }

  #[test]
  fn add_rejects_same_id_from_distinct_allocation() {
    let mut playlist = Playlist::new("mix");
    playlist.add(video("a")).unwrap();
    assert_eq!(playlist.add(video("a")), Err(CommandError::AlreadyInPlaylist));
    assert_eq!(playlist.videos().len(), 1);
  }

  #[test]
  fn remove_by_id() {
    let mut playlist = Playlist::new("mix");
    playlist.add(video("a")).unwrap();
    playlist.add(video("b")).unwrap();
    assert_eq!(playlist.remove("a").unwrap().id, "a");
    assert_eq!(playlist.remove("a"), Err(CommandError::NotInPlaylist));
    assert!(playlist.contains("b"));
  }

  #[test]
  fn clear_empties() {
    let mut playlist = Playlist::new("mix");
    playlist.add(video("a")).unwrap();
    playlist.clear();
    assert!(playlist.is_empty());
  }

  #[test]
  fn create_is_case_insensitive_unique() {
    let mut store = PlaylistStore::new();
    store.create("My List").unwrap();
    assert_eq!(store.create("my list"), Err(CommandError::DuplicateName));
    assert_eq!(store.create("MY LIST"), Err(CommandError::DuplicateName));
    assert_eq!(store.sorted_names(), ["My List"]);
  }

  #[test]
  fn lookup_ignores_case() {
    let mut store = PlaylistStore::new();
    store.create("Chill").unwrap();
    assert_eq!(store.get("cHiLl").unwrap().name(), "Chill");
    assert!(store.get_mut("CHILL").is_ok());
    assert_eq!(store.get("other").unwrap_err(), CommandError::PlaylistNotFound);
  }

  #[test]
  fn delete_removes_playlist() {
    let mut store = PlaylistStore::new();
    store.create("Chill").unwrap();
    assert_eq!(store.delete("chill").unwrap().name(), "Chill");
    assert!(store.is_empty());
    assert_eq!(store.delete("chill").unwrap_err(), CommandError::PlaylistNotFound);
  }

  #[test]
  fn sorted_names_case_sensitive_order() {
    let mut store = PlaylistStore::new();
    store.create("beta").unwrap();
    store.create("Alpha").unwrap();
    store.create("Gamma").unwrap();
    assert_eq!(store.sorted_names(), ["Alpha", "Gamma", "beta"]);
  }
}
