//! Strict `{key}` placeholder substitution.
//!
//! Every placeholder must resolve. A missing key or a stray brace is an error rather
//! than a silently shortened sentence. `{{` and `}}` produce literal braces.

use std::collections::BTreeMap;

use crate::{Result, VerdictError};

pub type Values = BTreeMap<String, String>;

pub fn render(template: &str, values: &Values) -> Result<String> {
  let mut output = String::with_capacity(template.len() + 64);
  let mut chars = template.char_indices().peekable();

  while let Some((position, ch)) = chars.next() {
    match ch {
      '{' if matches!(chars.peek(), Some((_, '{'))) => {
        chars.next();
        output.push('{');
      }
      '}' if matches!(chars.peek(), Some((_, '}'))) => {
        chars.next();
        output.push('}');
      }
      '{' => {
        let mut key = String::new();
        let mut closed = false;
        for (_, next) in chars.by_ref() {
          if next == '}' {
            closed = true;
            break;
          }
          key.push(next);
        }
        if !closed {
          return Err(VerdictError::validation(
            "template",
            format!("unclosed placeholder starting at byte {position}"),
          ));
        }
        let key = key.trim();
        let value = values.get(key).ok_or_else(|| {
          VerdictError::validation("template", format!("no value for placeholder '{key}'"))
        })?;
        output.push_str(value);
      }
      '}' => {
        return Err(VerdictError::validation(
          "template",
          format!("unmatched '}}' at byte {position}"),
        ));
      }
      other => output.push(other),
    }
  }

  Ok(output)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn values() -> Values {
    let mut values = Values::new();
    values.insert("total".into(), "3".into());
    values.insert("positive".into(), "1".into());
    values
  }

  #[test]
  fn test_substitutes_all_keys() {
    let out = render("{total} reviews, {positive} positive", &values()).unwrap();
    assert_eq!(out, "3 reviews, 1 positive");
  }

  #[test]
  fn test_missing_key_fails_loudly() {
    let err = render("{total} reviews, {negative} negative", &values()).unwrap_err();
    assert_eq!(err.kind(), "validation");
    assert!(err.to_string().contains("'negative'"));
  }

  #[test]
  fn test_escaped_braces() {
    let out = render("{{literal}} {total}", &values()).unwrap();
    assert_eq!(out, "{literal} 3");
  }

  #[test]
  fn test_unclosed_placeholder() {
    let err = render("{total", &values()).unwrap_err();
    assert!(err.to_string().contains("unclosed placeholder"));
  }

  #[test]
  fn test_stray_closing_brace() {
    let err = render("total}", &values()).unwrap_err();
    assert!(err.to_string().contains("unmatched"));
  }

  #[test]
  fn test_placeholder_whitespace_is_trimmed() {
    let out = render("{ total }", &values()).unwrap();
    assert_eq!(out, "3");
  }
}
