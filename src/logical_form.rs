use std::fmt;

use tracing::debug;

use crate::grammar::{Category, Prefix, Slot};

/// Grammatical relations grouped by the part of the question they feed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogicalForm {
  pub wh: Vec<Slot>,
  pub yes_no: Vec<Slot>,
  pub dest: Vec<Slot>,
  pub source_dest: Vec<Slot>,
  pub flight: Vec<Slot>,
  pub time: Vec<Slot>,
}

impl LogicalForm {
  pub fn construct(slots: &[Slot]) -> Self {
    let mut lf = Self::default();

    for slot in slots.iter() {
      let category = slot.category;
      if category.starts_with(Prefix::Wh) {
        lf.wh.push(slot.clone());
      } else if category.starts_with(Prefix::DestSubject) {
        lf.dest.push(slot.clone());
      } else if category.starts_with(Prefix::ToLoc) {
        // only refines a destination question already seen
        if !lf.dest.is_empty() {
          lf.dest.push(slot.clone());
        }
      } else if category.starts_with(Prefix::AtTime) || category.starts_with(Prefix::RunTime) {
        lf.time.push(slot.clone());
      } else if category.starts_with(Prefix::Source) || category.starts_with(Prefix::Dest) {
        lf.source_dest.push(slot.clone());
      } else if category.starts_with(Prefix::YesNo) {
        lf.yes_no.push(slot.clone());
      } else if category == Category::Flight && slot.is_name() {
        lf.flight.push(slot.clone());
      }
    }

    if lf.dest.len() >= 2 {
      let mut dest = std::mem::take(&mut lf.dest).into_iter();
      if let (Some(head), Some(tail)) = (dest.next(), dest.next()) {
        lf.dest = vec![Slot::compound(head, tail)];
      }
    }

    // the flight, if named, moves inside the conjunction
    if matches!(lf.source_dest.len(), 1 | 2) {
      let mut children = std::mem::take(&mut lf.flight);
      children.append(&mut lf.source_dest);
      lf.source_dest = vec![Slot::operator(Category::And, children)];
    }

    let time_question = lf.time_question();
    for wh in lf.wh.iter_mut() {
      if wh.category == Category::WhTime {
        *wh = Slot::alias(time_question, "t1");
      }
    }

    if !lf.yes_no.is_empty() {
      lf.yes_no = vec![Slot::alias(Category::YesNoQuestion, "NONE")];
    }

    debug!(logical_form = %lf, "constructed logical form");
    lf
  }

  /// What a bare "when" asks for, given the places mentioned
  fn time_question(&self) -> Category {
    if !self.dest.is_empty() {
      Category::WhDepartureTime
    } else if self.source_dest.len() == 1 {
      if self.source_dest[0].category == Category::Source {
        Category::WhArrivalTime
      } else {
        Category::WhDepartureTime
      }
    } else {
      Category::WhTime
    }
  }

  pub fn buckets(&self) -> [(&'static str, &[Slot]); 6] {
    [
      ("WH", &self.wh),
      ("YES_NO", &self.yes_no),
      ("DEST", &self.dest),
      ("SOURCE_DEST", &self.source_dest),
      ("FLIGHT", &self.flight),
      ("TIME", &self.time),
    ]
  }

  pub fn has_question(&self, category: Category) -> bool {
    self.wh.iter().any(|s| s.category == category)
  }
}

impl fmt::Display for LogicalForm {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (_, slots) in self.buckets() {
      if slots.is_empty() {
        continue;
      }
      let line = slots
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ");
      writeln!(f, "{}", line)?;
    }
    Ok(())
  }
}
