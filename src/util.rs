//! Small utility helpers used across modules.

/// Very small and safe string templating.
/// Replaces occurrences of `{key}` in the template with provided values.
/// Unknown placeholders are left untouched.
pub fn fill_template(tpl: &str, pairs: &[(&str, &str)]) -> String {
  let mut out = tpl.to_string();
  for (k, v) in pairs {
    let needle = format!("{{{}}}", k);
    out = out.replace(&needle, v);
  }
  out
}

/// True if the template mentions `{key}` anywhere.
pub fn has_placeholder(tpl: &str, key: &str) -> bool {
  tpl.contains(&format!("{{{}}}", key))
}

/// Lowercase and collapse every whitespace run to a single space, trimmed.
/// Two strings that only differ in case or spacing normalize to the same key.
pub fn normalize_key(s: &str) -> String {
  s.split_whitespace()
    .map(|w| w.to_lowercase())
    .collect::<Vec<_>>()
    .join(" ")
}

/// Human form of a topic id: `list-comprehensions` -> `list comprehensions`.
pub fn topic_text(topic: &str) -> String {
  let t = topic.trim();
  if t.is_empty() { "fundamentals".into() } else { t.replace('-', " ") }
}

/// Log-safe truncation for large strings.
/// Cuts on a char boundary so multi-byte text never panics.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max {
    return s.to_string();
  }
  let mut end = max;
  while !s.is_char_boundary(end) { end -= 1; }
  format!("{}… ({} bytes total)", &s[..end], s.len())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fill_template_replaces_every_occurrence() {
    let out = fill_template("{a} and {a} but {b}", &[("a", "x"), ("b", "y")]);
    assert_eq!(out, "x and x but y");
    assert_eq!(fill_template("{missing}", &[("a", "x")]), "{missing}");
  }

  #[test]
  fn normalize_key_ignores_case_and_spacing() {
    assert_eq!(normalize_key("  Hello \n  WORLD\t"), "hello world");
    assert_eq!(normalize_key("len()"), normalize_key(" LEN() "));
  }

  #[test]
  fn topic_text_defaults_and_dehyphenates() {
    assert_eq!(topic_text(""), "fundamentals");
    assert_eq!(topic_text("list-comprehensions"), "list comprehensions");
  }

  #[test]
  fn trunc_for_log_respects_char_boundaries() {
    let s = "ééééé";
    let t = trunc_for_log(s, 3);
    assert!(t.starts_with('é'));
    assert!(t.contains("bytes total"));
  }
}
