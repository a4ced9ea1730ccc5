use std::fmt;

use tracing::debug;

use crate::error::Result;
use crate::grammar::{Category, Slot};
use crate::lexicon::Lexicon;
use crate::logical_form::LogicalForm;

/// The unbound variable a display instruction prints
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Target {
  Flight,
  Time,
  Dest,
  FlightTime,
}

impl Target {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Flight => "?f1",
      Self::Time => "?t1",
      Self::Dest => "?d1",
      Self::FlightTime => "?f1 ?t1",
    }
  }
}

impl fmt::Display for Target {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DisplayAction {
  PrintAll,
  PrintYesNo,
}

impl fmt::Display for DisplayAction {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::PrintAll => write!(f, "PRINT-ALL"),
      Self::PrintYesNo => write!(f, "PRINT-YES-NO"),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayInstruction {
  pub action: DisplayAction,
  pub target: Option<Target>,
}

impl fmt::Display for DisplayInstruction {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.action)?;
    if let Some(target) = self.target {
      write!(f, " {}", target)?;
    }
    Ok(())
  }
}

/// Which schedule column a filter's time literal is compared against.
/// `Flight` filters carry no time at all.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FilterKind {
  Flight,
  ATime,
  DTime,
  Runtime,
}

impl FilterKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Flight => "FLIGHT",
      Self::ATime => "ATIME",
      Self::DTime => "DTIME",
      Self::Runtime => "RUNTIME",
    }
  }

  pub fn is_time(&self) -> bool {
    !matches!(self, Self::Flight)
  }
}

impl fmt::Display for FilterKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// A condition on schedule rows. `None` fields are unconstrained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterInstruction {
  pub kind: FilterKind,
  pub target: Option<Target>,
  pub flight: Option<String>,
  pub start_place: Option<String>,
  pub end_place: Option<String>,
  pub time: Option<String>,
}

impl FilterInstruction {
  /// A filter never targets the time variable; that only makes sense for display
  pub fn new(kind: FilterKind, target: Option<Target>) -> Self {
    Self {
      kind,
      target: target.filter(|t| *t != Target::Time),
      flight: None,
      start_place: None,
      end_place: None,
      time: None,
    }
  }

  pub fn with_flight(mut self, code: impl Into<String>) -> Self {
    self.flight = Some(code.into());
    self
  }

  pub fn with_start(mut self, code: impl Into<String>) -> Self {
    self.start_place = Some(code.into());
    self
  }

  pub fn with_end(mut self, code: impl Into<String>) -> Self {
    self.end_place = Some(code.into());
    self
  }

  /// Durations are written `N_giờ` and stored as `N:00HR`
  pub fn with_time(mut self, literal: Option<String>) -> Self {
    self.time = literal.map(|t| match t.strip_suffix("_giờ") {
      Some(hours) => format!("{}:00HR", hours),
      None => t,
    });
    self
  }
}

impl fmt::Display for FilterInstruction {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let time = match (&self.time, self.kind.is_time()) {
      (Some(t), _) => t.as_str(),
      (None, true) => Target::Time.as_str(),
      (None, false) => "",
    };
    write!(
      f,
      "{} {} {} {} {} {}",
      self.kind,
      self.target.map(|t| t.as_str()).unwrap_or(""),
      self.flight.as_deref().unwrap_or(""),
      self.start_place.as_deref().unwrap_or(""),
      self.end_place.as_deref().unwrap_or(""),
      time
    )
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
  Display(DisplayInstruction),
  Filter(FilterInstruction),
  /// Binary AND of two instructions
  And(Box<Instruction>, Box<Instruction>),
}

impl Instruction {
  fn display(action: DisplayAction, target: Option<Target>) -> Self {
    Self::Display(DisplayInstruction { action, target })
  }

  /// Joins `filter` with the auxiliary filter when there is one
  fn combine(auxiliary: &Option<FilterInstruction>, filter: FilterInstruction) -> Self {
    match auxiliary {
      Some(aux) => Self::And(
        Box::new(Self::Filter(aux.clone())),
        Box::new(Self::Filter(filter)),
      ),
      None => Self::Filter(filter),
    }
  }
}

impl fmt::Display for Instruction {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Display(d) => write!(f, "{}", d),
      Self::Filter(c) => write!(f, "{}", c),
      Self::And(a, b) => write!(f, "&({})({})", a, b),
    }
  }
}

/// An executable question: display instructions and filter conditions, in
/// the order they were compiled
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
  pub instructions: Vec<Instruction>,
}

fn place_code(lexicon: &Lexicon, slot: &Slot) -> Result<String> {
  Ok(lexicon.code_for(slot.surface().unwrap_or_default())?.to_string())
}

fn flight_code(lexicon: &Lexicon, slot: &Slot) -> Result<String> {
  lexicon.flight_code_for(slot.surface().unwrap_or_default())
}

impl Program {
  pub fn construct(lexicon: &Lexicon, lf: &LogicalForm) -> Result<Self> {
    let mut instructions = Vec::new();
    let mut target = None;
    let mut auxiliary = None;

    let flight_question = lf.has_question(Category::WhFlight);
    let time_question =
      lf.has_question(Category::WhArrivalTime) || lf.has_question(Category::WhDepartureTime);

    if flight_question {
      let shown = if time_question {
        Target::FlightTime
      } else {
        Target::Flight
      };
      instructions.push(Instruction::display(DisplayAction::PrintAll, Some(shown)));
      target = Some(Target::Flight);
      auxiliary = Some(FilterInstruction::new(FilterKind::Flight, target));
    } else if time_question || lf.has_question(Category::WhTimeCount) {
      instructions.push(Instruction::display(DisplayAction::PrintAll, Some(Target::Time)));
      target = Some(Target::Time);
    } else if lf.has_question(Category::WhDest) {
      instructions.push(Instruction::display(DisplayAction::PrintAll, Some(Target::Dest)));
      target = Some(Target::Dest);
      let mut filter = FilterInstruction::new(FilterKind::ATime, target);
      if let Some(flight) = lf.flight.first() {
        filter = filter.with_flight(flight_code(lexicon, flight)?);
      }
      instructions.push(Instruction::Filter(filter));
    }

    if !lf.yes_no.is_empty() {
      instructions.push(Instruction::display(DisplayAction::PrintYesNo, None));
    }

    let time = lf
      .time
      .first()
      .and_then(Slot::surface)
      .map(str::to_lowercase);

    // arrival at a destination at a given time
    if let (Some(dest), Some(_)) = (lf.dest.first(), &time) {
      if dest.surface().is_some() {
        let filter = FilterInstruction::new(FilterKind::ATime, target)
          .with_end(place_code(lexicon, dest)?)
          .with_time(time.clone());
        instructions.push(Instruction::combine(&auxiliary, filter));
      }
    }

    if let Some(entry) = lf.source_dest.first() {
      if let Some(filter) = Self::route_filter(lexicon, entry.children(), target, time)? {
        instructions.push(Instruction::combine(&auxiliary, filter));
      }
    }

    let program = Self { instructions };
    debug!(program = %program, "constructed procedural semantics");
    Ok(program)
  }

  /// Filter for a conjunction of flight, source and destination slots. The
  /// flight, when present, is always first.
  fn route_filter(
    lexicon: &Lexicon,
    children: &[Slot],
    target: Option<Target>,
    time: Option<String>,
  ) -> Result<Option<FilterInstruction>> {
    let Some(first) = children.first() else {
      return Ok(None);
    };
    let is_source = |slot: &Slot| slot.category == Category::Source;

    let filter = if children.iter().any(|c| c.category == Category::Flight) {
      let flight = flight_code(lexicon, first)?;
      let Some(second) = children.get(1) else {
        return Ok(None);
      };
      let filter = if children.len() == 3 {
        FilterInstruction::new(FilterKind::Runtime, target)
          .with_start(place_code(lexicon, second)?)
          .with_end(place_code(lexicon, &children[2])?)
      } else if is_source(second) {
        FilterInstruction::new(FilterKind::DTime, target).with_start(place_code(lexicon, second)?)
      } else {
        FilterInstruction::new(FilterKind::ATime, target).with_end(place_code(lexicon, second)?)
      };
      filter.with_flight(flight)
    } else if children.len() == 2 {
      FilterInstruction::new(FilterKind::Runtime, target)
        .with_start(place_code(lexicon, first)?)
        .with_end(place_code(lexicon, &children[1])?)
    } else if is_source(first) {
      FilterInstruction::new(FilterKind::DTime, target).with_start(place_code(lexicon, first)?)
    } else {
      FilterInstruction::new(FilterKind::ATime, target).with_end(place_code(lexicon, first)?)
    };

    Ok(Some(filter.with_time(time)))
  }
}

impl fmt::Display for Program {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for instruction in self.instructions.iter() {
      writeln!(f, "{}", instruction)?;
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::lexicon::Field;

  fn construct(lf: &LogicalForm) -> Vec<String> {
    Program::construct(Lexicon::builtin(), lf)
      .unwrap()
      .instructions
      .iter()
      .map(ToString::to_string)
      .collect()
  }

  fn dest_compound(place: &str) -> Slot {
    Slot::compound(
      Slot::alias(Category::Subject(Field::Dest, Field::Flight), "f1"),
      Slot::name(Category::ToLoc, place),
    )
  }

  #[test]
  fn flight_question_without_time_has_no_filter() {
    let lf = LogicalForm {
      wh: vec![Slot::alias(Category::WhFlight, "f1")],
      dest: vec![dest_compound("Huế")],
      ..Default::default()
    };
    assert_eq!(construct(&lf), vec!["PRINT-ALL ?f1"]);
  }

  #[test]
  fn flight_question_at_time_joins_auxiliary() {
    let lf = LogicalForm {
      wh: vec![Slot::alias(Category::WhFlight, "f1")],
      dest: vec![dest_compound("Huế")],
      time: vec![Slot::name(Category::AtTime, "13:30HR")],
      ..Default::default()
    };
    assert_eq!(
      construct(&lf),
      vec![
        "PRINT-ALL ?f1",
        "&(FLIGHT ?f1    )(ATIME ?f1   HUE 13:30hr)",
      ]
    );
  }

  #[test]
  fn destination_question_binds_flight() {
    let lf = LogicalForm {
      wh: vec![Slot::alias(Category::WhDest, "d1")],
      flight: vec![Slot::name(Category::Flight, "VJ123")],
      ..Default::default()
    };
    let program = Program::construct(Lexicon::builtin(), &lf).unwrap();
    assert_eq!(
      program.instructions,
      vec![
        Instruction::display(DisplayAction::PrintAll, Some(Target::Dest)),
        Instruction::Filter(FilterInstruction::new(FilterKind::ATime, Some(Target::Dest)).with_flight("VJ123")),
      ]
    );
    assert_eq!(program.to_string(), "PRINT-ALL ?d1\nATIME ?d1 VJ123   ?t1\n");
  }

  #[test]
  fn route_filters() {
    let flight = Slot::name(Category::Flight, "VietJetAir");
    let source = Slot::name(Category::Source, "Hà_Nội");
    let dest = Slot::name(Category::Dest, "Huế");
    let and = |children: Vec<Slot>| LogicalForm {
      wh: vec![Slot::alias(Category::WhTimeCount, "t1")],
      source_dest: vec![Slot::operator(Category::And, children)],
      ..Default::default()
    };

    assert_eq!(
      construct(&and(vec![flight.clone(), source.clone(), dest.clone()])),
      vec!["PRINT-ALL ?t1", "RUNTIME  VJ HN HUE ?t1"]
    );
    assert_eq!(
      construct(&and(vec![flight.clone(), source.clone()])),
      vec!["PRINT-ALL ?t1", "DTIME  VJ HN  ?t1"]
    );
    assert_eq!(
      construct(&and(vec![flight, dest.clone()])),
      vec!["PRINT-ALL ?t1", "ATIME  VJ  HUE ?t1"]
    );
    assert_eq!(
      construct(&and(vec![source.clone(), dest.clone()])),
      vec!["PRINT-ALL ?t1", "RUNTIME   HN HUE ?t1"]
    );
    assert_eq!(
      construct(&and(vec![source])),
      vec!["PRINT-ALL ?t1", "DTIME   HN  ?t1"]
    );
    assert_eq!(
      construct(&and(vec![dest])),
      vec!["PRINT-ALL ?t1", "ATIME    HUE ?t1"]
    );
  }

  #[test]
  fn durations_are_normalized() {
    let lf = LogicalForm {
      wh: vec![Slot::alias(Category::WhDepartureTime, "t1")],
      source_dest: vec![Slot::operator(
        Category::And,
        vec![
          Slot::name(Category::Source, "Hà_Nội"),
          Slot::name(Category::Dest, "Huế"),
        ],
      )],
      time: vec![Slot::name(Category::RunTime, "2_giờ")],
      ..Default::default()
    };
    assert_eq!(
      construct(&lf),
      vec!["PRINT-ALL ?t1", "RUNTIME   HN HUE 2:00HR"]
    );
  }

  #[test]
  fn yes_no_keeps_filters() {
    let lf = LogicalForm {
      yes_no: vec![Slot::alias(Category::YesNoQuestion, "NONE")],
      source_dest: vec![Slot::operator(
        Category::And,
        vec![Slot::name(Category::Flight, "VJ123"), Slot::name(Category::Dest, "Huế")],
      )],
      ..Default::default()
    };
    assert_eq!(
      construct(&lf),
      vec!["PRINT-YES-NO", "ATIME  VJ123  HUE ?t1"]
    );
  }

  #[test]
  fn unknown_places_are_lookup_errors() {
    let lf = LogicalForm {
      wh: vec![Slot::alias(Category::WhFlight, "f1")],
      dest: vec![dest_compound("Sài_Gòn")],
      time: vec![Slot::name(Category::AtTime, "13:30HR")],
      ..Default::default()
    };
    let err = Program::construct(Lexicon::builtin(), &lf).unwrap_err();
    assert!(err.is_lookup());
  }
}
