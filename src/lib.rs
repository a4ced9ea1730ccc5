#[macro_use]
extern crate lazy_static;

/// helper macro for initializing a regex with lazy_static!
macro_rules! regex_static {
  ($name:ident, $pattern:expr) => {
    lazy_static! {
      static ref $name: regex::Regex = regex::Regex::new($pattern).unwrap();
    }
  };
}

pub mod error;
pub mod executor;
pub mod grammar;
pub mod lexicon;
pub mod logical_form;
pub mod parse_lexicon;
pub mod parser;
pub mod semantics;
pub mod store;
pub mod tagger;

use std::fmt;

use tracing::debug;

use crate::executor::Executor;
use crate::grammar::{Slot, construct_grammar};
use crate::logical_form::LogicalForm;
use crate::parser::{DependencyParser, Relation};
use crate::semantics::Program;
use crate::store::RecordStore;
use crate::tagger::{TaggedToken, Tagger};

pub use crate::error::{Err, QaError, Result};
pub use crate::lexicon::Lexicon;

/// Everything the pipeline produced for one question, in stage order
#[derive(Debug, Clone)]
pub struct Answer {
  pub tagged: Vec<TaggedToken>,
  pub relations: Vec<Relation>,
  pub slots: Vec<Slot>,
  pub logical_form: LogicalForm,
  pub program: Program,
  pub output: String,
}

impl fmt::Display for Answer {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "Relation:")?;
    for relation in self.relations.iter() {
      writeln!(f, "{}", relation)?;
    }
    writeln!(f, "\nGrammatical Relation:")?;
    for slot in self.slots.iter() {
      writeln!(f, "{}", slot)?;
    }
    writeln!(f, "\nLogical Form:")?;
    write!(f, "{}", self.logical_form)?;
    writeln!(f, "\nProcedural Semantic:")?;
    write!(f, "{}", self.program)?;
    writeln!(f, "\nOutput:")?;
    writeln!(f, "{}", self.output)
  }
}

/// Answers pre-tokenized questions against one record store
#[derive(Debug)]
pub struct QuestionAnswering<'l> {
  lexicon: &'l Lexicon,
  store: RecordStore,
}

impl<'l> QuestionAnswering<'l> {
  pub fn new(lexicon: &'l Lexicon, store: RecordStore) -> Self {
    Self { lexicon, store }
  }

  pub fn store(&self) -> &RecordStore {
    &self.store
  }

  pub fn answer(&self, tokens: &[&str]) -> Result<Answer> {
    debug!(?tokens, "answering");
    let tagged = Tagger::new(self.lexicon).tag(tokens);
    let relations = DependencyParser::new(self.lexicon).parse(&tagged);
    let slots = construct_grammar(self.lexicon, &relations)?;
    let logical_form = LogicalForm::construct(&slots);
    let program = Program::construct(self.lexicon, &logical_form)?;
    let output = Executor::new(self.lexicon, &self.store).execute(&program);
    debug!(%output, "answered");

    Ok(Answer {
      tagged,
      relations,
      slots,
      logical_form,
      program,
      output,
    })
  }
}
