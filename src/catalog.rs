use anyhow::{Context, Result, bail};
use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// A single catalog entry. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Video {
  pub id: String,
  pub title: String,
  pub tags: Vec<String>,
}

impl Video {
  #[cfg(test)]
  pub fn new(id: impl Into<String>, title: impl Into<String>, tags: &[&str]) -> Self {
    Self { id: id.into(), title: title.into(), tags: tags.iter().map(|t| t.to_string()).collect() }
  }

  pub fn has_tag(&self, tag: &str) -> bool {
    self.tags.iter().any(|t| t == tag)
  }
}

/// `Title (id) [#tag1 #tag2]`
impl fmt::Display for Video {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} ({}) [{}]", self.title, self.id, self.tags.join(" "))
  }
}

/// Where the catalog comes from. Read once at startup.
pub trait CatalogSource {
  fn list_videos(&self) -> Result<Vec<Video>>;
}

/// The catalog compiled into the binary.
pub struct EmbeddedCatalog;

impl CatalogSource for EmbeddedCatalog {
  fn list_videos(&self) -> Result<Vec<Video>> {
    parse_catalog(include_str!("../videos.txt")).context("Embedded catalog is malformed")
  }
}

/// A catalog file on disk, in the same `title | id | tags` format.
pub struct FileCatalog {
  pub path: PathBuf,
}

impl CatalogSource for FileCatalog {
  fn list_videos(&self) -> Result<Vec<Video>> {
    let content = std::fs::read_to_string(&self.path)
      .with_context(|| format!("Failed to read catalog file {}", self.path.display()))?;
    parse_catalog(&content).with_context(|| format!("Failed to parse catalog file {}", self.path.display()))
  }
}

/// Parse one catalog line.
/// Expected format: `title | id | #tag1 , #tag2` (tag field optional).
fn parse_catalog_line(line: &str) -> Option<Video> {
  let parts: Vec<&str> = line.split('|').map(str::trim).collect();
  if parts.len() < 2 {
    return None;
  }
  let title = parts[0].to_string();
  let id = parts[1].to_string();
  if id.is_empty() {
    return None;
  }
  let tags = parts
    .get(2)
    .map(|raw| raw.split(',').map(str::trim).filter(|t| !t.is_empty()).map(str::to_string).collect())
    .unwrap_or_default();
  Some(Video { id, title, tags })
}

/// Parse a whole catalog file. Blank lines are skipped; ids must be unique.
pub fn parse_catalog(content: &str) -> Result<Vec<Video>> {
  let mut seen = HashSet::new();
  let mut videos = Vec::new();
  for (idx, line) in content.lines().enumerate() {
    if line.trim().is_empty() {
      continue;
    }
    let Some(video) = parse_catalog_line(line) else {
      bail!("line {}: expected `title | id | tags`", idx + 1);
    };
    if !seen.insert(video.id.clone()) {
      bail!("line {}: duplicate video id {}", idx + 1, video.id);
    }
    videos.push(video);
  }
  Ok(videos)
}

/// Read-only video collection, in source order.
#[derive(Debug, Default)]
pub struct Catalog {
  videos: Vec<Arc<Video>>,
}

impl Catalog {
  pub fn new(videos: Vec<Video>) -> Self {
    Self { videos: videos.into_iter().map(Arc::new).collect() }
  }

  pub fn load(source: &dyn CatalogSource) -> Result<Self> {
    Ok(Self::new(source.list_videos()?))
  }

  pub fn get(&self, id: &str) -> Option<&Arc<Video>> {
    self.videos.iter().find(|v| v.id == id)
  }

  pub fn videos(&self) -> &[Arc<Video>] {
    &self.videos
  }

  pub fn len(&self) -> usize {
    self.videos.len()
  }

  pub fn is_empty(&self) -> bool {
    self.videos.is_empty()
  }
}
