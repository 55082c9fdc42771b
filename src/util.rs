//! Small utility helpers used across modules.

/// Log-safe preview of a document or field.
/// Cuts on a char boundary at or below `max` bytes and collapses newlines so one
/// record stays on one log line.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  let flat = |t: &str| t.replace(['\n', '\r'], " ");
  if s.len() <= max {
    return flat(s);
  }
  let mut cut = max;
  while !s.is_char_boundary(cut) {
    cut -= 1;
  }
  format!("{}… ({} bytes total)", flat(&s[..cut]), s.len())
}
