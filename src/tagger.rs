use std::fmt;

use tracing::debug;

use crate::lexicon::{self, Lexicon, WordClass};

/// A word as handed over by the tokenizer, with its lowercase form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
  pub text: String,
  pub lower: String,
}

impl Token {
  pub fn new(text: impl Into<String>) -> Self {
    let text = text.into();
    let lower = text.to_lowercase();
    Self { text, lower }
  }
}

impl fmt::Display for Token {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.text)
  }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Tag {
  Root,
  Noun,
  Name,
  Verb,
  WhWord,
  From,
  To,
  At,
  In,
  Query,
  TimePattern,
  DurationPattern,
  AirlinePattern,
  Other,
}

impl Tag {
  pub const ALL: [Tag; 14] = [
    Tag::Root,
    Tag::Noun,
    Tag::Name,
    Tag::Verb,
    Tag::WhWord,
    Tag::From,
    Tag::To,
    Tag::At,
    Tag::In,
    Tag::Query,
    Tag::TimePattern,
    Tag::DurationPattern,
    Tag::AirlinePattern,
    Tag::Other,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Root => "ROOT",
      Self::Noun => "NOUN",
      Self::Name => "NAME",
      Self::Verb => "VERB",
      Self::WhWord => "WH_WORD",
      Self::From => "FROM",
      Self::To => "TO",
      Self::At => "AT",
      Self::In => "IN",
      Self::Query => "QUERY",
      Self::TimePattern => "TIME_PATTERN",
      Self::DurationPattern => "DURATION_PATTERN",
      Self::AirlinePattern => "AIRLINE_PATTERN",
      Self::Other => "OTHER",
    }
  }
}

impl fmt::Display for Tag {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedToken {
  pub token: Token,
  pub tag: Tag,
}

impl TaggedToken {
  pub fn new(token: Token, tag: Tag) -> Self {
    Self { token, tag }
  }

  pub fn text(&self) -> &str {
    &self.token.text
  }
}

impl fmt::Display for TaggedToken {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}/{}", self.token, self.tag)
  }
}

/// Rule-based part-of-speech tagger over the lexicon's closed vocabularies
#[derive(Debug, Clone, Copy)]
pub struct Tagger<'l> {
  lexicon: &'l Lexicon,
}

impl<'l> Tagger<'l> {
  pub fn new(lexicon: &'l Lexicon) -> Self {
    Self { lexicon }
  }

  /// Tags left to right. A directional verb is retagged `TO` when it
  /// follows a `FROM` anywhere earlier, or directly follows a verb.
  pub fn tag<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<TaggedToken> {
    let mut tagged: Vec<TaggedToken> = Vec::with_capacity(tokens.len());
    for text in tokens.iter() {
      let token = Token::new(text.as_ref());
      let tag = self.classify(&token.lower, &tagged);
      tagged.push(TaggedToken::new(token, tag));
    }
    debug!(
      tagged = %tagged.iter().map(ToString::to_string).collect::<Vec<_>>().join(" "),
      "tagged"
    );
    tagged
  }

  fn classify(&self, word: &str, previous: &[TaggedToken]) -> Tag {
    let lex = self.lexicon;
    if lex.contains(WordClass::Verb, word) {
      let after_from = previous.iter().any(|t| t.tag == Tag::From);
      let after_verb = previous.last().is_some_and(|t| t.tag == Tag::Verb);
      if lex.contains(WordClass::To, word) && (after_from || after_verb) {
        Tag::To
      } else {
        Tag::Verb
      }
    } else if lex.contains(WordClass::Noun, word) {
      Tag::Noun
    } else if lex.contains(WordClass::Name, word) {
      Tag::Name
    } else if lex.contains(WordClass::Wh, word) {
      Tag::WhWord
    } else if lex.contains(WordClass::From, word) {
      Tag::From
    } else if lex.contains(WordClass::At, word) {
      Tag::At
    } else if lex.contains(WordClass::Query, word) {
      Tag::Query
    } else if lex.contains(WordClass::In, word) {
      Tag::In
    } else if lexicon::is_time_literal(word) {
      Tag::TimePattern
    } else if lexicon::is_duration_literal(word) {
      Tag::DurationPattern
    } else if lexicon::is_airline_code(word) {
      Tag::AirlinePattern
    } else {
      Tag::Other
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn tags(tokens: &[&str]) -> Vec<Tag> {
    Tagger::new(Lexicon::builtin())
      .tag(tokens)
      .into_iter()
      .map(|t| t.tag)
      .collect()
  }

  #[test]
  fn tags_closed_classes_and_patterns() {
    assert_eq!(
      tags(&["Máy_bay", "nào", "đến", "Huế", "lúc", "13:30HR", "?"]),
      vec![
        Tag::Noun,
        Tag::WhWord,
        Tag::Verb,
        Tag::Name,
        Tag::At,
        Tag::TimePattern,
        Tag::Query
      ]
    );
    assert_eq!(
      tags(&["VJ123", "bay", "2_giờ", "ở", "xyz"]),
      vec![
        Tag::AirlinePattern,
        Tag::Verb,
        Tag::DurationPattern,
        Tag::In,
        Tag::Other
      ]
    );
  }

  #[test]
  fn directional_verb_after_from_or_verb() {
    assert_eq!(
      tags(&["từ", "Hà_Nội", "đến", "Huế"]),
      vec![Tag::From, Tag::Name, Tag::To, Tag::Name]
    );
    assert_eq!(tags(&["bay", "đến", "Huế"]), vec![Tag::Verb, Tag::To, Tag::Name]);
    // no earlier tag at all
    assert_eq!(tags(&["đến", "Huế"]), vec![Tag::Verb, Tag::Name]);
  }

  #[test]
  fn output_is_total() {
    let input = ["", "!!", "máy_bay", "MÁY_BAY", "tp.", "24:00hr", "Đến"];
    let tagged = Tagger::new(Lexicon::builtin()).tag(&input);
    assert_eq!(tagged.len(), input.len());
    assert!(tagged.iter().all(|t| Tag::ALL.contains(&t.tag)));
    assert_eq!(tagged[3].tag, Tag::Noun);
    assert_eq!(tagged[5].tag, Tag::Other);
    assert!(Tagger::new(Lexicon::builtin()).tag::<&str>(&[]).is_empty());
  }
}
