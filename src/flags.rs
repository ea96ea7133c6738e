use std::collections::HashMap;

use crate::error::CommandError;

/// Moderation flags keyed by video id. A video appears at most once.
#[derive(Debug, Default)]
pub struct FlagRegistry {
  reasons: HashMap<String, String>,
}

impl FlagRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Record a flag. Catalog membership is checked by the caller.
  pub fn flag(&mut self, id: &str, reason: &str) -> Result<(), CommandError> {
    if self.reasons.contains_key(id) {
      return Err(CommandError::AlreadyFlagged);
    }
    self.reasons.insert(id.to_string(), reason.to_string());
    Ok(())
  }

  /// Remove a flag, returning the reason it carried.
  pub fn unflag(&mut self, id: &str) -> Result<String, CommandError> {
    self.reasons.remove(id).ok_or(CommandError::NotFlagged)
  }

  pub fn reason(&self, id: &str) -> Option<&str> {
    self.reasons.get(id).map(String::as_str)
  }

  pub fn is_flagged(&self, id: &str) -> bool {
    self.reasons.contains_key(id)
  }

  /// `Err(Flagged(reason))` when the id is flagged.
  pub fn ensure_allowed(&self, id: &str) -> Result<(), CommandError> {
    match self.reason(id) {
      Some(reason) => Err(CommandError::Flagged(reason.to_string())),
      None => Ok(()),
    }
  }

  /// Suffix appended to listing lines for flagged videos, empty otherwise.
  pub fn annotation(&self, id: &str) -> String {
    self.reason(id).map(|reason| format!(" - FLAGGED (reason: {})", reason)).unwrap_or_default()
  }
}
