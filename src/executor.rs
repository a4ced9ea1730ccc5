use tracing::{debug, trace};

use crate::lexicon::Lexicon;
use crate::semantics::{
  DisplayAction, DisplayInstruction, FilterInstruction, FilterKind, Instruction, Program, Target,
};
use crate::store::{Column, FlightRecord, RecordStore};

pub const YES: &str = "Có";
pub const NO: &str = "Không";
pub const NOT_FOUND: &str = "Dạ thưa, không tìm thấy kết quả phù hợp";
pub const UNRECOGNIZED: &str = "Dạ thưa, không hiểu câu hỏi";
const PROMPT: &str = "Dạ thưa, kết quả câu hỏi là:";

/// Runs compiled programs against a record store and renders the answer
#[derive(Debug, Clone, Copy)]
pub struct Executor<'a> {
  lexicon: &'a Lexicon,
  store: &'a RecordStore,
}

impl<'a> Executor<'a> {
  pub fn new(lexicon: &'a Lexicon, store: &'a RecordStore) -> Self {
    Self { lexicon, store }
  }

  pub fn execute(&self, program: &Program) -> String {
    let Some(display) = display_of(program) else {
      debug!("no display instruction");
      return UNRECOGNIZED.to_string();
    };
    let condition = condition_of(program);
    let rows = self.select(condition);
    debug!(rows = rows.len(), "executed program");
    render(display, condition.map(|c| c.kind), &rows)
  }

  /// Rows satisfying `condition`; everything when there is none
  pub fn select(&self, condition: Option<&FilterInstruction>) -> Vec<&'a FlightRecord> {
    let Some(condition) = condition else {
      return self.store.iter().map(|(_, r)| r).collect();
    };

    let time = condition.time.as_deref().map(normalize_time);
    let group = self
      .lexicon
      .airline_group()
      .filter(|g| condition.flight.as_deref() == Some(*g));
    let flight = condition.flight.as_deref().filter(|_| group.is_none());
    let time_column = match condition.kind {
      FilterKind::ATime => Some(Column::ATime),
      FilterKind::DTime => Some(Column::DTime),
      FilterKind::Runtime => Some(Column::Runtime),
      FilterKind::Flight => None,
    };
    trace!(?group, ?flight, ?time, ?time_column, "built predicate");

    let matches = |column: Column, value: Option<&str>, record: &FlightRecord| {
      value.is_none_or(|v| record.get(column) == v)
    };

    self
      .store
      .select(|r| {
        group.is_none_or(|g| r.flight.contains(g))
          && matches(Column::Flight, flight, r)
          && time_column.is_none_or(|c| matches(c, time.as_deref(), r))
          && matches(Column::Source, condition.start_place.as_deref(), r)
          && matches(Column::Dest, condition.end_place.as_deref(), r)
      })
      .into_iter()
      .map(|(_, r)| r)
      .collect()
  }
}

fn display_of(program: &Program) -> Option<&DisplayInstruction> {
  match program.instructions.first()? {
    Instruction::Display(display) => Some(display),
    _ => None,
  }
}

/// The instruction after the display. Of an AND only the second operand is
/// applied.
// FIXME: the first operand of an AND (the auxiliary flight filter) is
// never checked against the rows
fn condition_of(program: &Program) -> Option<&FilterInstruction> {
  match program.instructions.get(1)? {
    Instruction::Filter(filter) => Some(filter),
    Instruction::And(_, second) => match second.as_ref() {
      Instruction::Filter(filter) => Some(filter),
      _ => None,
    },
    Instruction::Display(_) => None,
  }
}

/// `13:30HR` -> `13:30`
fn normalize_time(time: &str) -> String {
  let lower = time.to_lowercase();
  if lower.contains("hr") {
    lower.replace("hr", "")
  } else {
    time.to_string()
  }
}

fn time_column(kind: Option<FilterKind>) -> Column {
  match kind {
    Some(FilterKind::ATime) => Column::ATime,
    Some(FilterKind::DTime) => Column::DTime,
    _ => Column::Runtime,
  }
}

fn place_column(kind: Option<FilterKind>) -> Column {
  match kind {
    Some(FilterKind::DTime) => Column::Source,
    _ => Column::Dest,
  }
}

fn render(display: &DisplayInstruction, kind: Option<FilterKind>, rows: &[&FlightRecord]) -> String {
  if display.action == DisplayAction::PrintYesNo {
    let answer = if rows.is_empty() { NO } else { YES };
    return answer.to_string();
  }
  if rows.is_empty() {
    return NOT_FOUND.to_string();
  }

  let joined = |column: Column| {
    rows
      .iter()
      .map(|r| r.get(column))
      .collect::<Vec<_>>()
      .join(",")
  };

  match display.target {
    Some(Target::Flight) => format!("{} máy bay {}", PROMPT, joined(Column::Flight)),
    Some(Target::Time) => format!("{} {}", PROMPT, joined(time_column(kind))),
    Some(Target::FlightTime) => rows.iter().fold(PROMPT.to_string(), |mut out, r| {
      out.push_str(&format!(
        "máy bay {}, thời gian {}\n",
        r.flight,
        r.get(time_column(kind))
      ));
      out
    }),
    Some(Target::Dest) => rows.iter().fold(PROMPT.to_string(), |mut out, r| {
      out.push_str(&format!("thành phố {}\n", r.get(place_column(kind))));
      out
    }),
    None => UNRECOGNIZED.to_string(),
  }
}
