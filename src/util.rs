//! Small utility helpers used across modules.

/// Very small and safe string templating.
/// Replaces occurrences of `{key}` in the template with provided values.
/// This is intentionally simple (no nested/conditional logic).
pub fn fill_template(tpl: &str, pairs: &[(&str, &str)]) -> String {
  let mut out = tpl.to_string();
  for (k, v) in pairs {
    let needle = format!("{{{}}}", k);
    out = out.replace(&needle, v);
  }
  out
}

/// Whitespace-delimited word count, ignoring empty tokens.
/// Both the length guards and the rubric text quote this number,
/// so they must agree on how it is computed.
pub fn word_count(s: &str) -> usize {
  s.split_whitespace().count()
}

/// Log-safe truncation for large strings.
/// Avoids spamming logs with huge request/response payloads.
#[allow(dead_code)]
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max { s.to_string() } else { format!("{}… ({} bytes total)", &s[..max], s.len()) }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fill_template_replaces_all_occurrences() {
    let out = fill_template("{a} and {b} and {a}", &[("a", "x"), ("b", "y")]);
    assert_eq!(out, "x and y and x");
  }

  #[test]
  fn word_count_ignores_extra_whitespace() {
    assert_eq!(word_count(""), 0);
    assert_eq!(word_count("   \n\t  "), 0);
    assert_eq!(word_count("one"), 1);
    assert_eq!(word_count("  one   two\nthree\t four "), 4);
  }
}
