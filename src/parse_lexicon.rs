use regex::Regex;
/// Simple recursive-descent parsing of lexicon files
use std::str::FromStr;

use crate::error::{QaError, Result};
use crate::lexicon::{Entry, Lexicon, WordClass};

impl FromStr for Lexicon {
  type Err = QaError;

  /// Parses a lexicon from a string of `CLASS[ feature: value ] -> words;` entries
  fn from_str(s: &str) -> Result<Self> {
    let (entries, s) = parse_entries(s)?;
    debug_assert!(s.is_empty());

    if entries.is_empty() {
      Err(QaError::Lexicon("empty lexicon".into()))
    } else {
      Self::from_entries(entries)
    }
  }
}

type Infallible<'a, T> = (T, &'a str);
type ParseResult<'a, T> = Result<(T, &'a str)>;

fn err<T>(msg: String) -> Result<T> {
  Err(QaError::Lexicon(msg))
}

/// Try to consume a regex, returning None if it doesn't match
fn optional_re<'a>(re: &'static Regex, s: &'a str) -> Infallible<'a, Option<&'a str>> {
  if let Some(m) = re.find(s) {
    if m.start() > 0 {
      return (None, s);
    }
    let (_, rest) = s.split_at(m.end());
    (Some(m.as_str()), rest)
  } else {
    (None, s)
  }
}

/// Try to consume a regex, failing if it doesn't match
fn needed_re<'a>(re: &'static Regex, s: &'a str) -> ParseResult<'a, &'a str> {
  if let (Some(c), rest) = optional_re(re, s) {
    Ok((c, rest))
  } else {
    err(format!("couldn't match {} at {}", re, s))
  }
}

/// Try to consume a char, returning None if it doesn't match
fn optional_char(c: char, s: &str) -> Infallible<'_, Option<char>> {
  match s.strip_prefix(c) {
    Some(rest) => (Some(c), rest),
    None => (None, s),
  }
}

/// Try to consume a char, failing if it doesn't match
fn needed_char(c: char, s: &str) -> ParseResult<'_, char> {
  if let (Some(c), rest) = optional_char(c, s) {
    Ok((c, rest))
  } else {
    err(format!("couldn't match {} at {}", c, s))
  }
}

/// Tries to skip whitespace and // comments
fn skip_whitespace(s: &str) -> &str {
  regex_static!(WHITESPACE_OR_COMMENT, r"(\s+|//[^\n]*)+");
  optional_re(&*WHITESPACE_OR_COMMENT, s).1
}

fn parse_class(s: &str) -> ParseResult<'_, WordClass> {
  regex_static!(CLASS, r"[A-Z]+");
  let (name, rest) = needed_re(&*CLASS, s).map_err(|e| QaError::Lexicon(format!("class: {}", e)))?;
  match WordClass::from_symbol(name) {
    Some(class) => Ok((class, rest)),
    None => err(format!("unknown word class {}", name)),
  }
}

fn parse_feature(s: &str) -> ParseResult<'_, (String, String)> {
  regex_static!(NAME, r"[a-z_]+");
  regex_static!(VALUE, r"[^\s,\]]+");

  let (name, s) = needed_re(&*NAME, s).map_err(|e| QaError::Lexicon(format!("feature name: {}", e)))?;
  let s = skip_whitespace(s);
  let (_, s) = needed_char(':', s)?;
  let s = skip_whitespace(s);
  let (value, s) =
    needed_re(&*VALUE, s).map_err(|e| QaError::Lexicon(format!("feature value: {}", e)))?;
  let s = skip_whitespace(s);
  let (_, s) = optional_char(',', s);

  Ok(((name.to_string(), value.to_string()), s))
}

fn parse_features(s: &str) -> ParseResult<'_, Vec<(String, String)>> {
  let mut pairs = Vec::new();
  let mut rem = needed_char('[', s)?.1;
  loop {
    rem = skip_whitespace(rem);
    if let (Some(_), rem) = optional_char(']', rem) {
      return Ok((pairs, rem));
    }
    let (feature, s) = parse_feature(rem)?;
    pairs.push(feature);
    rem = s;
  }
}

/// Class, optional features, arrow, words, terminated by `;`
fn parse_entry(s: &str) -> ParseResult<'_, Entry> {
  regex_static!(ARROW, "->");
  regex_static!(WORD, r"[^\s;]+");

  let (class, s) = parse_class(s)?;
  let s = skip_whitespace(s);
  let (features, s) = if s.starts_with('[') {
    parse_features(s)?
  } else {
    (Vec::new(), s)
  };
  let s = skip_whitespace(s);
  let (_, s) = needed_re(&*ARROW, s).map_err(|e| QaError::Lexicon(format!("entry arrow: {}", e)))?;

  let mut words = Vec::new();
  let mut rem = s;
  loop {
    rem = skip_whitespace(rem);
    if let (Some(_), s) = optional_char(';', rem) {
      rem = s;
      break;
    }
    if rem.is_empty() {
      return err(format!("unterminated {:?} entry", class));
    }
    let (word, s) = needed_re(&*WORD, rem)?;
    words.push(word.to_string());
    rem = s;
  }

  Ok((
    Entry {
      class,
      features,
      words,
    },
    rem,
  ))
}

fn parse_entries(s: &str) -> ParseResult<'_, Vec<Entry>> {
  let mut entries = Vec::new();
  let mut rem = s;
  loop {
    rem = skip_whitespace(rem);
    if rem.is_empty() {
      return Ok((entries, rem));
    }
    let (entry, s) = parse_entry(rem)?;
    entries.push(entry);
    rem = s;
  }
}
