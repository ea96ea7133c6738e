use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, Lines};

// --- Helpers ---

/// Interpret an answer to the post-search prompt: the first token as an
/// integer, or `None` for anything else (including no answer at all).
pub fn parse_selection(answer: Option<&str>) -> Option<i64> {
  answer?.split_whitespace().next()?.parse().ok()
}

// --- Line input ---

/// Read the next line of a command stream. `None` at end of input.
pub async fn next_line<R: AsyncBufRead + Unpin>(lines: &mut Lines<R>) -> Result<Option<String>> {
  lines.next_line().await.context("Failed to read from stdin")
}

/// One bounded read for the post-search prompt.
pub async fn read_optional_int<R: AsyncBufRead + Unpin>(lines: &mut Lines<R>) -> Result<Option<i64>> {
  let answer = next_line(lines).await?;
  Ok(parse_selection(answer.as_deref()))
}

#[cfg(test)]
mod tests {
  use super::*;
  use tokio::io::{AsyncBufReadExt, BufReader};

  // --- parse_selection ---

  #[test]
  fn selection_number() {
    assert_eq!(parse_selection(Some("2")), Some(2));
    assert_eq!(parse_selection(Some("  3  ")), Some(3));
    assert_eq!(parse_selection(Some("-1")), Some(-1));
  }

  #[test]
  fn selection_first_token_only() {
    assert_eq!(parse_selection(Some("1 please")), Some(1));
    assert_eq!(parse_selection(Some("yes 1")), None);
  }

  #[test]
  fn selection_not_a_number() {
    assert_eq!(parse_selection(Some("no")), None);
    assert_eq!(parse_selection(Some("1.5")), None);
    assert_eq!(parse_selection(Some("")), None);
    assert_eq!(parse_selection(None), None);
  }

  #[test]
  fn selection_overflow_is_a_no() {
    assert_eq!(parse_selection(Some("99999999999999999999999")), None);
  }

  // --- line input ---

  #[tokio::test]
  async fn read_optional_int_consumes_one_line() {
    let mut lines = BufReader::new(&b"2\nPLAY v1\n"[..]).lines();
    assert_eq!(read_optional_int(&mut lines).await.unwrap(), Some(2));
    assert_eq!(next_line(&mut lines).await.unwrap().as_deref(), Some("PLAY v1"));
    assert_eq!(read_optional_int(&mut lines).await.unwrap(), None);
  }
}
