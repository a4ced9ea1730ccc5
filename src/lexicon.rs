use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::error::{QaError, Result};

/// The word classes a lexicon file can list words under
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum WordClass {
  Verb,
  Noun,
  Name,
  Wh,
  From,
  To,
  At,
  In,
  Query,
  Field,
}

impl WordClass {
  pub fn from_symbol(s: &str) -> Option<Self> {
    Some(match s {
      "VERB" => Self::Verb,
      "NOUN" => Self::Noun,
      "NAME" => Self::Name,
      "WH" => Self::Wh,
      "FROM" => Self::From,
      "TO" => Self::To,
      "AT" => Self::At,
      "IN" => Self::In,
      "QUERY" => Self::Query,
      "FIELD" => Self::Field,
      _ => return None,
    })
  }
}

/// Record fields that nouns and verbs can stand for
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Field {
  Flight,
  Dest,
}

impl Field {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Flight => "FLIGHT",
      Self::Dest => "DEST",
    }
  }

  /// Placeholder variable a question about this field binds, e.g. `f1`
  pub fn alias(&self) -> &'static str {
    match self {
      Self::Flight => "f1",
      Self::Dest => "d1",
    }
  }
}

impl fmt::Display for Field {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// One `CLASS[ feature: value ] -> word word;` line of a lexicon file
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
  pub class: WordClass,
  pub features: Vec<(String, String)>,
  pub words: Vec<String>,
}

impl Entry {
  fn feature(&self, name: &str) -> Option<&str> {
    self
      .features
      .iter()
      .find(|(n, _)| n == name)
      .map(|(_, v)| v.as_str())
  }
}

/// Closed vocabularies and code tables for the question domain. All words
/// are stored lowercase.
#[derive(Debug, Default, Clone)]
pub struct Lexicon {
  classes: HashMap<WordClass, HashSet<String>>,
  fields: HashMap<String, Field>,
  codes: HashMap<String, String>,
  airline_group: Option<String>,
}

impl Lexicon {
  pub fn from_entries(entries: Vec<Entry>) -> Result<Self> {
    let mut lexicon = Self::default();

    for entry in entries {
      match entry.class {
        WordClass::Name => {
          let code = entry
            .feature("code")
            .ok_or_else(|| QaError::Lexicon(format!("NAME entry without code: {:?}", entry.words)))?
            .to_string();
          match entry.feature("group") {
            Some("airline") => lexicon.airline_group = Some(code.clone()),
            Some(other) => return Err(QaError::Lexicon(format!("unknown name group {}", other))),
            None => {}
          }
          for w in entry.words.iter() {
            lexicon.codes.insert(w.to_lowercase(), code.clone());
          }
        }
        WordClass::Field => {
          let field = match entry.feature("column") {
            Some("FLIGHT") => Field::Flight,
            Some("DEST") => Field::Dest,
            other => return Err(QaError::Lexicon(format!("bad FIELD column {:?}", other))),
          };
          for w in entry.words.iter() {
            lexicon.fields.insert(w.to_lowercase(), field);
          }
          // fields only map words, they aren't a tag class
          continue;
        }
        _ if !entry.features.is_empty() => {
          return Err(QaError::Lexicon(format!(
            "{:?} entries take no features",
            entry.class
          )));
        }
        _ => {}
      }

      lexicon
        .classes
        .entry(entry.class)
        .or_default()
        .extend(entry.words.iter().map(|w| w.to_lowercase()));
    }

    Ok(lexicon)
  }

  /// The lexicon for the flight schedule domain, parsed once
  pub fn builtin() -> &'static Lexicon {
    lazy_static! {
      static ref BUILTIN: Lexicon = BUILTIN_SRC.parse().unwrap();
    }
    &BUILTIN
  }

  pub fn contains(&self, class: WordClass, word: &str) -> bool {
    self
      .classes
      .get(&class)
      .is_some_and(|words| words.contains(word))
  }

  /// True if `text` is the literal directional verb ("to") that always
  /// heads a destination. Compared verbatim, not lowercased.
  pub fn is_directional(&self, text: &str) -> bool {
    self.contains(WordClass::To, text)
  }

  pub fn try_field_for(&self, word: &str) -> Option<Field> {
    self.fields.get(&word.to_lowercase()).copied()
  }

  pub fn field_for(&self, word: &str) -> Result<Field> {
    self
      .try_field_for(word)
      .ok_or_else(|| QaError::UnknownField(word.to_string()))
  }

  pub fn code_for(&self, word: &str) -> Result<&str> {
    self
      .codes
      .get(&word.to_lowercase())
      .map(String::as_str)
      .ok_or_else(|| QaError::UnknownCode(word.to_string()))
  }

  /// Flight literals that aren't named in the lexicon pass through when
  /// they look like flight numbers
  pub fn flight_code_for(&self, word: &str) -> Result<String> {
    match self.code_for(word) {
      Ok(code) => Ok(code.to_string()),
      Err(_) if is_airline_code(&word.to_lowercase()) => Ok(word.to_string()),
      Err(e) => Err(e),
    }
  }

  /// Code shared as a prefix by every flight of the airline group, if any
  pub fn airline_group(&self) -> Option<&str> {
    self.airline_group.as_deref()
  }
}

regex_static!(TIME_PATTERN, r"^([0-9]|1[0-9]|2[0-3]):[0-5][0-9]hr$");
regex_static!(DURATION_PATTERN, r"^[0-9]_giờ$");
regex_static!(AIRLINE_PATTERN, r"^v[a-z][1-9]");

/// Absolute time such as `13:30hr`. Expects a lowercased word.
pub fn is_time_literal(word: &str) -> bool {
  TIME_PATTERN.is_match(word)
}

/// Duration such as `2_giờ`. Expects a lowercased word.
pub fn is_duration_literal(word: &str) -> bool {
  DURATION_PATTERN.is_match(word)
}

/// Flight number such as `vj123`. Expects a lowercased word.
pub fn is_airline_code(word: &str) -> bool {
  AIRLINE_PATTERN.is_match(word)
}

/// Source text of [`Lexicon::builtin`]
pub const BUILTIN_SRC: &str = r#"
  // part-of-speech classes
  VERB  -> đến bay hạ_cánh xuất_phát;
  NOUN  -> máy_bay thành_phố tp tp. mã_hiệu hãng_hàng_không;
  WH    -> nào mấy_giờ cho_biết;
  FROM  -> từ;
  TO    -> đến;
  AT    -> lúc;
  IN    -> ở;
  QUERY -> ?;

  // places and airlines, with the codes the schedule uses
  NAME[ code: HUE ]  -> huế;
  NAME[ code: ĐN ]   -> đà_nẵng;
  NAME[ code: HN ]   -> hà_nội;
  NAME[ code: HCMC ] -> hồ_chí_minh tp.hồ_chí_minh tp._hồ_chí_minh;
  NAME[ code: KH ]   -> khánh_hòa;
  NAME[ code: HP ]   -> hải_phòng;
  NAME[ code: VJ, group: airline ] -> vietjetair;

  // words that stand for a schedule column
  FIELD[ column: FLIGHT ] -> máy_bay mã_hiệu;
  FIELD[ column: DEST ]   -> đến thành_phố;
"#;
