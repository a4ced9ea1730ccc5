use std::fmt;

use tracing::{debug, trace};

use crate::error::Result;
use crate::lexicon::{self, Field, Lexicon, WordClass};
use crate::parser::{Relation, RelationType};

/// What a slot stands for. Labels share family prefixes (`WH_`, `DEST`...)
/// which later stages match on through `starts_with`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Category {
  WhFlight,
  WhDest,
  WhTime,
  WhTimeCount,
  WhArrivalTime,
  WhDepartureTime,
  /// `<subject>_<object> ?`, from a subject relation
  Subject(Field, Field),
  Flight,
  Dest,
  Source,
  ToLoc,
  FromLoc,
  InLoc,
  NameLoc,
  Name,
  AtTime,
  RunTime,
  YesNo,
  YesNoQuestion,
  And,
}

/// Label families that categories are grouped by
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Prefix {
  /// `WH_`
  Wh,
  /// `DEST_`
  DestSubject,
  /// `DEST`
  Dest,
  Source,
  ToLoc,
  AtTime,
  RunTime,
  YesNo,
}

impl Category {
  pub fn starts_with(&self, prefix: Prefix) -> bool {
    match prefix {
      Prefix::Wh => self.is_question(),
      Prefix::DestSubject => matches!(self, Self::Subject(Field::Dest, _)),
      Prefix::Dest => matches!(self, Self::Dest | Self::Subject(Field::Dest, _)),
      Prefix::Source => *self == Self::Source,
      Prefix::ToLoc => *self == Self::ToLoc,
      Prefix::AtTime => *self == Self::AtTime,
      Prefix::RunTime => *self == Self::RunTime,
      Prefix::YesNo => *self == Self::YesNo,
    }
  }

  /// Question-word categories; a construction without one is a yes/no question
  pub fn is_question(&self) -> bool {
    matches!(
      self,
      Self::WhFlight
        | Self::WhDest
        | Self::WhTime
        | Self::WhTimeCount
        | Self::WhArrivalTime
        | Self::WhDepartureTime
    )
  }

  fn wh_for(field: Field) -> Self {
    match field {
      Field::Flight => Self::WhFlight,
      Field::Dest => Self::WhDest,
    }
  }

  fn for_field(field: Field) -> Self {
    match field {
      Field::Flight => Self::Flight,
      Field::Dest => Self::Dest,
    }
  }
}

impl fmt::Display for Category {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::WhFlight => write!(f, "WH_FLIGHT ?"),
      Self::WhDest => write!(f, "WH_DEST ?"),
      Self::WhTime => write!(f, "WH_TIME ?"),
      Self::WhTimeCount => write!(f, "WH_TIME_COUNT ?"),
      Self::WhArrivalTime => write!(f, "WH_ATIME ?"),
      Self::WhDepartureTime => write!(f, "WH_DTIME ?"),
      Self::Subject(subject, object) => write!(f, "{}_{} ?", subject, object),
      Self::Flight => write!(f, "FLIGHT"),
      Self::Dest => write!(f, "DEST"),
      Self::Source => write!(f, "SOURCE"),
      Self::ToLoc => write!(f, "TO_LOC"),
      Self::FromLoc => write!(f, "FROM_LOC"),
      Self::InLoc => write!(f, "IN_LOC"),
      Self::NameLoc => write!(f, "NAME_LOC"),
      Self::Name => write!(f, "NAME"),
      Self::AtTime => write!(f, "AT_TIME"),
      Self::RunTime => write!(f, "RUN_TIME"),
      Self::YesNo => write!(f, "YES_NO"),
      Self::YesNoQuestion => write!(f, "YES NO ?"),
      Self::And => write!(f, "&"),
    }
  }
}

/// A surface token wrapped as a name or noun
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaf {
  pub surface: String,
}

impl Leaf {
  pub fn new(surface: impl Into<String>) -> Self {
    Self {
      surface: surface.into(),
    }
  }

  /// `<first letter>1 "<surface>"`
  pub fn alias(&self) -> String {
    let initial = self
      .surface
      .chars()
      .next()
      .map(|c| c.to_lowercase().collect::<String>())
      .unwrap_or_default();
    format!("{}1 \"{}\"", initial, self.surface)
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotValue {
  /// Placeholder variable of a question word, e.g. `f1`
  Alias(String),
  Name(Leaf),
  Noun(Leaf),
  /// A question slot refined by a second slot
  Compound(Box<Slot>, Box<Slot>),
  /// Operands of an operator slot
  Children(Vec<Slot>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
  pub category: Category,
  pub value: SlotValue,
}

impl Slot {
  pub fn alias(category: Category, alias: &str) -> Self {
    Self {
      category,
      value: SlotValue::Alias(alias.to_string()),
    }
  }

  pub fn name(category: Category, surface: impl Into<String>) -> Self {
    Self {
      category,
      value: SlotValue::Name(Leaf::new(surface)),
    }
  }

  pub fn noun(category: Category, surface: impl Into<String>) -> Self {
    Self {
      category,
      value: SlotValue::Noun(Leaf::new(surface)),
    }
  }

  pub fn compound(head: Slot, tail: Slot) -> Self {
    Self {
      category: head.category,
      value: SlotValue::Compound(Box::new(head), Box::new(tail)),
    }
  }

  pub fn operator(category: Category, children: Vec<Slot>) -> Self {
    Self {
      category,
      value: SlotValue::Children(children),
    }
  }

  pub fn leaf(&self) -> Option<&Leaf> {
    match &self.value {
      SlotValue::Name(leaf) | SlotValue::Noun(leaf) => Some(leaf),
      _ => None,
    }
  }

  /// The surface word this slot is about. A compound is about its tail.
  pub fn surface(&self) -> Option<&str> {
    match &self.value {
      SlotValue::Compound(_, tail) => tail.surface(),
      _ => self.leaf().map(|l| l.surface.as_str()),
    }
  }

  pub fn is_name(&self) -> bool {
    matches!(self.value, SlotValue::Name(_))
  }

  pub fn is_noun(&self) -> bool {
    matches!(self.value, SlotValue::Noun(_))
  }

  pub fn children(&self) -> &[Slot] {
    match &self.value {
      SlotValue::Children(children) => children,
      _ => &[],
    }
  }
}

impl fmt::Display for Slot {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match &self.value {
      SlotValue::Alias(alias) => write!(f, "{}({})", self.category, alias),
      SlotValue::Name(leaf) if self.category == Category::Name => write!(f, "NAME({})", leaf.alias()),
      SlotValue::Name(leaf) => write!(f, "{}(NAME({}))", self.category, leaf.alias()),
      SlotValue::Noun(leaf) => write!(f, "{}(NOUN({}))", self.category, leaf.alias()),
      SlotValue::Compound(head, tail) => write!(f, "{}({})", head, tail),
      SlotValue::Children(children) => {
        write!(f, "{}", self.category)?;
        for child in children.iter() {
          write!(f, "({})", child)?;
        }
        Ok(())
      }
    }
  }
}

fn leaf_slot(lexicon: &Lexicon, category: Category, word: &str) -> Slot {
  if lexicon.contains(WordClass::Name, &word.to_lowercase()) {
    Slot::name(category, word)
  } else {
    Slot::noun(category, word)
  }
}

/// Maps one relation to at most one slot. `slots` is what has been built so
/// far, for rules that look back.
fn slot_for(lexicon: &Lexicon, relation: &Relation, slots: &[Slot]) -> Result<Option<Slot>> {
  let left = relation.left.as_str();
  let right = relation.right.as_str();

  let slot = match relation.kind {
    RelationType::WhDet => {
      let field = lexicon.field_for(left)?;
      Slot::alias(Category::wh_for(field), field.alias())
    }
    RelationType::Nsubj => {
      let Some(subject) = lexicon.try_field_for(left) else {
        return Ok(None);
      };
      let object = lexicon.field_for(right)?;
      Slot::alias(Category::Subject(subject, object), object.alias())
    }
    RelationType::Nmod => {
      let category = Category::for_field(lexicon.field_for(left)?);
      let lower = right.to_lowercase();
      if lexicon.contains(WordClass::Name, &lower) || lexicon::is_airline_code(&lower) {
        Slot::name(category, right)
      } else {
        Slot::noun(category, right)
      }
    }
    RelationType::NameLoc => Slot::name(Category::NameLoc, right),
    RelationType::ToLoc => {
      // the place is whichever side isn't the directional verb
      if lexicon.is_directional(&right.to_lowercase()) {
        leaf_slot(lexicon, Category::ToLoc, left)
      } else {
        leaf_slot(lexicon, Category::ToLoc, right)
      }
    }
    RelationType::InLoc => Slot::name(Category::InLoc, left),
    RelationType::FromLoc => leaf_slot(lexicon, Category::FromLoc, left),
    RelationType::Name => Slot::name(Category::Name, right),
    RelationType::Time => {
      if lexicon.contains(WordClass::Wh, &right.to_lowercase()) {
        Slot::alias(Category::WhTime, "t1")
      } else {
        Slot::name(Category::AtTime, right)
      }
    }
    RelationType::RunTime => Slot::name(Category::RunTime, right),
    RelationType::QueryTime => {
      if slots.iter().any(|s| s.category == Category::WhTime) {
        return Ok(None);
      }
      Slot::alias(Category::WhTimeCount, "t1")
    }
    RelationType::Root | RelationType::Query | RelationType::AtTime => return Ok(None),
  };

  Ok(Some(slot))
}

/// Copies `slots` without the slots at `removed`, then appends `added`
fn replace(slots: &[Slot], removed: &[usize], added: Vec<Slot>) -> Vec<Slot> {
  slots
    .iter()
    .enumerate()
    .filter(|(idx, _)| !removed.contains(idx))
    .map(|(_, s)| s.clone())
    .chain(added)
    .collect()
}

/// One merge pass over a snapshot of the slots. Returns a fresh list; an
/// unchanged length means nothing merged.
pub fn merge_pass(slots: &[Slot]) -> Vec<Slot> {
  let mut to_loc_noun = None;
  let mut from_loc_noun = None;
  let mut flight_noun = None;
  let mut name = None;
  let mut name_loc = None;
  let mut from_loc = None;
  let mut in_loc = None;
  let mut to_loc_name = None;

  // later slots win
  for (idx, slot) in slots.iter().enumerate() {
    match slot.category {
      Category::ToLoc if slot.is_noun() => to_loc_noun = Some(idx),
      Category::FromLoc if slot.is_noun() => from_loc_noun = Some(idx),
      Category::Name => name = Some(idx),
      Category::NameLoc => name_loc = Some(idx),
      Category::FromLoc => from_loc = Some(idx),
      Category::InLoc => in_loc = Some(idx),
      Category::ToLoc if slot.is_name() => to_loc_name = Some(idx),
      Category::Flight if slot.is_noun() => flight_noun = Some(idx),
      _ => {}
    }
  }

  // a generic noun slot takes the name found elsewhere in the sentence
  if let Some(name) = name {
    let surface = slots[name].surface().unwrap_or_default();
    for (noun, category) in [
      (flight_noun, Category::Flight),
      (from_loc_noun, Category::FromLoc),
      (to_loc_noun, Category::ToLoc),
    ] {
      if let Some(noun) = noun {
        return replace(slots, &[noun, name], vec![Slot::name(category, surface)]);
      }
    }
  }

  // a verb with a named location turns the prepositional slots into
  // source and destination
  if let Some(name_loc) = name_loc {
    let mut removed = vec![name_loc];
    let mut added = Vec::new();
    for (idx, category) in [
      (from_loc, Category::Source),
      (to_loc_name, Category::Dest),
      (in_loc, Category::Dest),
    ] {
      if let Some(idx) = idx {
        if let Some(surface) = slots[idx].surface() {
          added.push(Slot::name(category, surface));
        }
        removed.push(idx);
      }
    }
    return replace(slots, &removed, added);
  }

  slots.to_vec()
}

/// Builds the grammatical relations for a parse
pub fn construct_grammar(lexicon: &Lexicon, relations: &[Relation]) -> Result<Vec<Slot>> {
  let mut slots = Vec::new();
  for relation in relations.iter() {
    if let Some(slot) = slot_for(lexicon, relation, &slots)? {
      slots.push(slot);
    }
  }

  // every pass that changes anything removes at least one slot
  let bound = slots.len();
  for pass in 0..bound {
    let merged = merge_pass(&slots);
    let changed = merged.len() != slots.len();
    slots = merged;
    trace!(pass, changed, len = slots.len(), "merge pass");
    if !changed {
      break;
    }
  }

  if !slots.iter().any(|s| s.category.is_question()) {
    slots.push(Slot::alias(Category::YesNo, "NONE"));
  }

  debug!(
    slots = %slots.iter().map(ToString::to_string).collect::<Vec<_>>().join(" "),
    "constructed grammar"
  );
  Ok(slots)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::parser::Attach;

  fn rel(kind: RelationType, left: &str, right: &str) -> Relation {
    Relation::new(kind, left, right, Attach::Right)
  }

  fn rendered(slots: &[Slot]) -> Vec<String> {
    slots.iter().map(ToString::to_string).collect()
  }

  #[test]
  fn slots_for_flight_question() {
    let lex = Lexicon::builtin();
    let slots = construct_grammar(
      lex,
      &[
        rel(RelationType::WhDet, "Máy_bay", "nào"),
        rel(RelationType::Nsubj, "đến", "Máy_bay"),
        rel(RelationType::Root, "<ROOT>", "đến"),
        rel(RelationType::ToLoc, "đến", "Huế"),
      ],
    )
    .unwrap();
    assert_eq!(
      rendered(&slots),
      vec![
        "WH_FLIGHT ?(f1)",
        "DEST_FLIGHT ?(f1)",
        "TO_LOC(NAME(h1 \"Huế\"))"
      ]
    );
  }

  #[test]
  fn nmod_wraps_names_and_flight_codes() {
    let lex = Lexicon::builtin();
    let slots = construct_grammar(
      lex,
      &[
        rel(RelationType::Nmod, "Máy_bay", "VJ123"),
        rel(RelationType::Nmod, "thành_phố", "tp"),
      ],
    )
    .unwrap();
    assert_eq!(
      rendered(&slots),
      vec![
        "FLIGHT(NAME(v1 \"VJ123\"))",
        "DEST(NOUN(t1 \"tp\"))",
        "YES_NO(NONE)"
      ]
    );
  }

  #[test]
  fn time_question_words() {
    let lex = Lexicon::builtin();
    let slots = construct_grammar(
      lex,
      &[
        rel(RelationType::Time, "lúc", "mấy_giờ"),
        rel(RelationType::QueryTime, "bay", "mấy_giờ"),
        rel(RelationType::Time, "lúc", "13:30HR"),
        rel(RelationType::RunTime, "bay", "2_giờ"),
      ],
    )
    .unwrap();
    assert_eq!(
      rendered(&slots),
      vec![
        "WH_TIME ?(t1)",
        "AT_TIME(NAME(11 \"13:30HR\"))",
        "RUN_TIME(NAME(21 \"2_giờ\"))"
      ]
    );

    let slots = construct_grammar(lex, &[rel(RelationType::QueryTime, "bay", "mấy_giờ")]).unwrap();
    assert_eq!(rendered(&slots), vec!["WH_TIME_COUNT ?(t1)"]);
  }

  #[test]
  fn lookup_misses_fail_loudly() {
    let lex = Lexicon::builtin();
    let err = construct_grammar(lex, &[rel(RelationType::WhDet, "hãng_hàng_không", "nào")])
      .unwrap_err();
    assert!(err.is_lookup());

    // a subject that names no field is skipped instead
    let slots = construct_grammar(lex, &[rel(RelationType::Nsubj, "bay", "tp")]).unwrap();
    assert_eq!(rendered(&slots), vec!["YES_NO(NONE)"]);
  }

  #[test]
  fn noun_location_takes_the_name() {
    let slots = vec![
      Slot::noun(Category::ToLoc, "thành_phố"),
      Slot::alias(Category::WhFlight, "f1"),
      Slot::name(Category::Name, "Huế"),
    ];
    let merged = merge_pass(&slots);
    assert_eq!(
      merged,
      vec![
        Slot::alias(Category::WhFlight, "f1"),
        Slot::name(Category::ToLoc, "Huế"),
      ]
    );
    // a second pass is a no-op
    assert_eq!(merge_pass(&merged), merged);
  }

  #[test]
  fn flight_noun_merges_before_locations() {
    let slots = vec![
      Slot::noun(Category::FromLoc, "thành_phố"),
      Slot::noun(Category::Flight, "hãng_hàng_không"),
      Slot::name(Category::Name, "VietJetAir"),
    ];
    assert_eq!(
      merge_pass(&slots),
      vec![
        Slot::noun(Category::FromLoc, "thành_phố"),
        Slot::name(Category::Flight, "VietJetAir"),
      ]
    );
  }

  #[test]
  fn name_loc_relabels_locations() {
    let slots = vec![
      Slot::name(Category::FromLoc, "Hà_Nội"),
      Slot::name(Category::NameLoc, "Hà_Nội"),
      Slot::name(Category::ToLoc, "Huế"),
      Slot::alias(Category::WhTime, "t1"),
    ];
    assert_eq!(
      merge_pass(&slots),
      vec![
        Slot::alias(Category::WhTime, "t1"),
        Slot::name(Category::Source, "Hà_Nội"),
        Slot::name(Category::Dest, "Huế"),
      ]
    );
  }

  #[test]
  fn merging_reaches_a_fixed_point() {
    let lex = Lexicon::builtin();
    // from_loc noun + name merge first, then name_loc relabels on the next pass
    let slots = construct_grammar(
      lex,
      &[
        rel(RelationType::FromLoc, "thành_phố", "từ"),
        rel(RelationType::Name, "thành_phố", "Đà_Nẵng"),
        rel(RelationType::NameLoc, "bay", "Đà_Nẵng"),
        rel(RelationType::Time, "lúc", "mấy_giờ"),
      ],
    )
    .unwrap();
    assert_eq!(
      slots,
      vec![
        Slot::alias(Category::WhTime, "t1"),
        Slot::name(Category::Source, "Đà_Nẵng"),
      ]
    );
  }

  #[test]
  fn category_prefixes() {
    let dest_flight = Category::Subject(Field::Dest, Field::Flight);
    assert_eq!(dest_flight.to_string(), "DEST_FLIGHT ?");
    assert!(dest_flight.starts_with(Prefix::DestSubject));
    assert!(dest_flight.starts_with(Prefix::Dest));
    assert!(!Category::Dest.starts_with(Prefix::DestSubject));
    assert!(Category::Dest.starts_with(Prefix::Dest));
    assert!(Category::WhTimeCount.starts_with(Prefix::Wh));
    assert!(!Category::YesNoQuestion.starts_with(Prefix::YesNo));
    assert!(!Category::Subject(Field::Flight, Field::Dest).starts_with(Prefix::Dest));
  }

  #[test]
  fn operator_and_compound_rendering() {
    let and = Slot::operator(
      Category::And,
      vec![
        Slot::name(Category::Flight, "VJ123"),
        Slot::name(Category::Source, "Huế"),
      ],
    );
    assert_eq!(
      and.to_string(),
      "&(FLIGHT(NAME(v1 \"VJ123\")))(SOURCE(NAME(h1 \"Huế\")))"
    );
    let compound = Slot::compound(
      Slot::alias(Category::Subject(Field::Dest, Field::Flight), "f1"),
      Slot::name(Category::ToLoc, "Huế"),
    );
    assert_eq!(compound.category, Category::Subject(Field::Dest, Field::Flight));
    assert_eq!(compound.surface(), Some("Huế"));
    assert_eq!(
      compound.to_string(),
      "DEST_FLIGHT ?(f1)(TO_LOC(NAME(h1 \"Huế\")))"
    );
  }
}
