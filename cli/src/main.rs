use std::env;
use std::io;
use std::io::Write;
use std::process;

use flightqa::store::{FlightRecord, RecordStore};
use flightqa::{Err, Lexicon, QuestionAnswering};
use tracing_subscriber::EnvFilter;

fn usage(prog_name: &str) -> String {
  format!(
    r"Usage: {} [options]

Reads one tokenized question per line, words separated by spaces and
compounds joined with '_', e.g. `Máy_bay nào đến Huế ?`.

Options:
  -h, --help       Print this message
  -a, --artifacts  Print every intermediate artifact (defaults to the answer only)",
    prog_name
  )
}

fn demo_store() -> RecordStore {
  RecordStore::from_records(vec![
    FlightRecord::new("VJ123", "HN", "HUE", "10:00", "8:00", "2:00"),
    FlightRecord::new("VJ456", "HCMC", "HN", "13:30", "11:30", "2:00"),
    FlightRecord::new("VJ789", "ĐN", "HUE", "13:30", "12:30", "1:00"),
    FlightRecord::new("VN222", "HP", "HCMC", "16:00", "14:00", "2:00"),
    FlightRecord::new("VJ321", "HUE", "KH", "19:00", "17:30", "1:30"),
  ])
}

fn respond(qa: &QuestionAnswering, line: &str, print_artifacts: bool) {
  let tokens = line.split_whitespace().collect::<Vec<_>>();
  match qa.answer(&tokens) {
    Ok(answer) if print_artifacts => println!("{}", answer),
    Ok(answer) => println!("{}\n", answer.output),
    Err(e) => eprintln!("error: {}\n", e),
  }
}

struct Args {
  print_artifacts: bool,
}

impl Args {
  fn make_error_message(msg: &str, prog_name: impl AsRef<str>) -> String {
    format!("argument error: {}.\n\n{}", msg, usage(prog_name.as_ref()))
  }

  fn parse(v: Vec<String>) -> Result<Self, String> {
    let mut iter = v.into_iter();
    let Some(prog_name) = iter.next() else {
      return Err(Self::make_error_message("bad argument vector", "cli"));
    };

    let mut print_artifacts = false;

    for o in iter {
      if o == "-h" || o == "--help" {
        println!("{}", usage(&prog_name));
        process::exit(0);
      } else if o == "-a" || o == "--artifacts" {
        print_artifacts = true;
      } else {
        return Err(Self::make_error_message("invalid arguments", prog_name));
      }
    }

    Ok(Self { print_artifacts })
  }
}

fn main() -> Result<(), Err> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .with_writer(io::stderr)
    .init();

  let opts = match Args::parse(env::args().collect()) {
    Ok(opts) => opts,
    Err(msg) => {
      eprintln!("{}", msg);
      process::exit(255);
    }
  };

  let qa = QuestionAnswering::new(Lexicon::builtin(), demo_store());

  let mut input = String::new();
  loop {
    print!("> ");
    io::stdout().flush()?;

    input.clear();
    io::stdin().read_line(&mut input)?;
    if input.is_empty() {
      // ctrl+d
      return Ok(());
    }
    if !input.trim().is_empty() {
      respond(&qa, input.trim(), opts.print_artifacts);
    }
  }
}
