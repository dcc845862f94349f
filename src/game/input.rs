use super::types::Direction;

/// Reads the direction out of a `key_press` key. Only the first character
/// counts; anything outside `wasd` is rejected.
pub fn parse_key(key: &str) -> Option<Direction> {
  key.chars().next().and_then(Direction::from_key)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parse_key_reads_first_character() {
    assert_eq!(parse_key("w"), Some(Direction::Up));
    assert_eq!(parse_key("dx"), Some(Direction::Right));
    assert_eq!(parse_key(""), None);
    assert_eq!(parse_key("x"), None);
    assert_eq!(parse_key(" a"), None);
  }
}
