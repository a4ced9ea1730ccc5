use std::collections::VecDeque;
use std::fmt;

use tracing::{debug, trace};

use crate::lexicon::Lexicon;
use crate::tagger::{Tag, TaggedToken};

/// Text of the sentinel that sits at the bottom of the stack
pub const ROOT_TEXT: &str = "<ROOT>";

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum RelationType {
  WhDet,
  QueryTime,
  Nsubj,
  Nmod,
  Root,
  ToLoc,
  FromLoc,
  Name,
  NameLoc,
  AtTime,
  RunTime,
  Time,
  InLoc,
  Query,
}

impl RelationType {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::WhDet => "WH_det",
      Self::QueryTime => "query_time",
      Self::Nsubj => "nsubj",
      Self::Nmod => "nmod",
      Self::Root => "root",
      Self::ToLoc => "to_loc",
      Self::FromLoc => "from_loc",
      Self::Name => "name",
      Self::NameLoc => "name_loc",
      Self::AtTime => "at_time",
      Self::RunTime => "run_time",
      Self::Time => "time",
      Self::InLoc => "in_loc",
      Self::Query => "query",
    }
  }
}

impl fmt::Display for RelationType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// Which side of a match gets promoted. `Right` shifts the buffer head onto
/// the stack, `Left` reduces the stack top.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Attach {
  Right,
  Left,
}

impl fmt::Display for Attach {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Right => write!(f, "RIGHT"),
      Self::Left => write!(f, "LEFT"),
    }
  }
}

/// A labeled edge between two token texts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
  pub kind: RelationType,
  pub left: String,
  pub right: String,
  pub attach: Attach,
}

impl Relation {
  pub fn new(kind: RelationType, left: &str, right: &str, attach: Attach) -> Self {
    Self {
      kind,
      left: left.to_string(),
      right: right.to_string(),
      attach,
    }
  }
}

impl fmt::Display for Relation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}({}, {})", self.kind, self.left, self.right)
  }
}

/// One row of the transition table: (stack tag, buffer tag) -> relation
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
  pub stack: Tag,
  pub buffer: Tag,
  pub kind: RelationType,
  pub attach: Attach,
}

impl Rule {
  const fn new(stack: Tag, buffer: Tag, kind: RelationType, attach: Attach) -> Self {
    Self {
      stack,
      buffer,
      kind,
      attach,
    }
  }

  pub fn matches(&self, stack: Tag, buffer: Tag) -> bool {
    self.stack == stack && self.buffer == buffer
  }

  /// Subject, prepositional and fronted-question relations point from the
  /// buffer token back to the stack token
  fn is_inverted(&self) -> bool {
    self.kind == RelationType::Nsubj
      || matches!(self.stack, Tag::To | Tag::From | Tag::In)
      || (self.kind == RelationType::WhDet && self.stack == Tag::WhWord)
  }
}

impl fmt::Display for Rule {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "({}, {}) -> {} {}",
      self.stack, self.buffer, self.kind, self.attach
    )
  }
}

use Attach::{Left, Right};
use RelationType as R;

/// Evaluated top to bottom, first match wins
pub const RULES: &[Rule] = &[
  Rule::new(Tag::Noun, Tag::WhWord, R::WhDet, Right),
  Rule::new(Tag::WhWord, Tag::Noun, R::WhDet, Left),
  Rule::new(Tag::Verb, Tag::WhWord, R::QueryTime, Right),
  Rule::new(Tag::Noun, Tag::Verb, R::Nsubj, Left),
  Rule::new(Tag::Noun, Tag::Noun, R::Nmod, Right),
  Rule::new(Tag::Root, Tag::Verb, R::Root, Right),
  Rule::new(Tag::To, Tag::Name, R::ToLoc, Left),
  Rule::new(Tag::To, Tag::Noun, R::ToLoc, Left),
  Rule::new(Tag::From, Tag::Name, R::FromLoc, Left),
  Rule::new(Tag::From, Tag::Noun, R::FromLoc, Left),
  Rule::new(Tag::Noun, Tag::Name, R::Name, Right),
  Rule::new(Tag::Verb, Tag::Name, R::NameLoc, Right),
  Rule::new(Tag::Verb, Tag::At, R::AtTime, Right),
  Rule::new(Tag::Verb, Tag::DurationPattern, R::RunTime, Right),
  Rule::new(Tag::At, Tag::TimePattern, R::Time, Right),
  Rule::new(Tag::At, Tag::WhWord, R::Time, Left),
  Rule::new(Tag::In, Tag::Name, R::InLoc, Left),
  Rule::new(Tag::Verb, Tag::Query, R::Query, Right),
  Rule::new(Tag::Noun, Tag::AirlinePattern, R::Nmod, Right),
];

/// Shift-reduce dependency parser driven by `RULES`
#[derive(Debug, Clone, Copy)]
pub struct DependencyParser<'l> {
  lexicon: &'l Lexicon,
  rules: &'static [Rule],
}

impl<'l> DependencyParser<'l> {
  pub fn new(lexicon: &'l Lexicon) -> Self {
    Self::with_rules(lexicon, RULES)
  }

  pub fn with_rules(lexicon: &'l Lexicon, rules: &'static [Rule]) -> Self {
    Self { lexicon, rules }
  }

  /// Finds the relation between the stack top and the buffer head, if any
  pub fn check_relation(&self, top: (&str, Tag), head: (&str, Tag)) -> Option<Relation> {
    let (top_text, top_tag) = top;
    let (head_text, head_tag) = head;

    if top_tag == Tag::Verb && self.lexicon.is_directional(top_text) {
      return Some(Relation::new(R::ToLoc, top_text, head_text, Left));
    }

    let rule = self.rules.iter().find(|r| r.matches(top_tag, head_tag))?;
    let (left, right) = if rule.is_inverted() {
      (head_text, top_text)
    } else {
      (top_text, head_text)
    };
    Some(Relation::new(rule.kind, left, right, rule.attach))
  }

  /// Runs the automaton until the buffer is empty. Whatever is left on the
  /// stack is discarded.
  pub fn parse(&self, tagged: &[TaggedToken]) -> Vec<Relation> {
    let mut relations = Vec::new();
    let mut buffer: VecDeque<(&str, Tag)> = tagged.iter().map(|t| (t.text(), t.tag)).collect();
    let mut stack: Vec<(&str, Tag)> = vec![(ROOT_TEXT, Tag::Root)];

    match buffer.pop_front() {
      Some(first) => stack.push(first),
      None => return relations,
    }

    while let Some(&head) = buffer.front() {
      let Some(&top) = stack.last() else {
        // only reachable with a custom rule table that reduces the root
        stack.extend(buffer.pop_front());
        continue;
      };

      if let Some(relation) = self.check_relation(top, head) {
        trace!(%relation, ?top, ?head, "matched");
        let kind = relation.kind;
        let attach = relation.attach;
        relations.push(relation);

        if kind == R::Nmod {
          // the modifier is consumed and the head noun stays on top
          buffer.pop_front();
          continue;
        }
        match attach {
          Right => stack.extend(buffer.pop_front()),
          Left => {
            stack.pop();
          }
        }
      } else if Self::should_reduce(top.1, head.1) {
        trace!(?top, ?head, "reduce");
        stack.pop();
      } else {
        trace!(?top, ?head, "shift");
        stack.extend(buffer.pop_front());
      }
    }

    debug!(
      relations = %relations.iter().map(ToString::to_string).collect::<Vec<_>>().join(" "),
      "parsed"
    );
    relations
  }

  /// Fallback when no rule matches
  fn should_reduce(top: Tag, head: Tag) -> bool {
    (!matches!(top, Tag::Noun | Tag::Verb) && head == Tag::Verb)
      || (matches!(top, Tag::Noun | Tag::Name) && head != Tag::Verb)
      || !matches!(top, Tag::Verb | Tag::Root)
  }
}
