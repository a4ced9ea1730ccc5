use std::collections::BTreeMap;
use std::fmt;

/// The six columns of the flight schedule
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Column {
  Flight,
  Source,
  Dest,
  ATime,
  DTime,
  Runtime,
}

impl Column {
  pub const ALL: [Column; 6] = [
    Column::Flight,
    Column::Source,
    Column::Dest,
    Column::ATime,
    Column::DTime,
    Column::Runtime,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Flight => "FLIGHT",
      Self::Source => "SOURCE",
      Self::Dest => "DEST",
      Self::ATime => "ATIME",
      Self::DTime => "DTIME",
      Self::Runtime => "RUNTIME",
    }
  }
}

impl fmt::Display for Column {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// One schedule row. Every field is compared as text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlightRecord {
  pub flight: String,
  pub source: String,
  pub dest: String,
  pub atime: String,
  pub dtime: String,
  pub runtime: String,
}

impl FlightRecord {
  pub fn new(
    flight: &str,
    source: &str,
    dest: &str,
    atime: &str,
    dtime: &str,
    runtime: &str,
  ) -> Self {
    Self {
      flight: flight.to_string(),
      source: source.to_string(),
      dest: dest.to_string(),
      atime: atime.to_string(),
      dtime: dtime.to_string(),
      runtime: runtime.to_string(),
    }
  }

  pub fn get(&self, column: Column) -> &str {
    match column {
      Column::Flight => &self.flight,
      Column::Source => &self.source,
      Column::Dest => &self.dest,
      Column::ATime => &self.atime,
      Column::DTime => &self.dtime,
      Column::Runtime => &self.runtime,
    }
  }
}

impl fmt::Display for FlightRecord {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let fields = Column::ALL.map(|c| self.get(c));
    write!(f, "{}", fields.join(","))
  }
}

/// Read-only schedule, keyed by row index
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordStore {
  rows: BTreeMap<usize, FlightRecord>,
}

impl RecordStore {
  pub fn from_records(records: impl IntoIterator<Item = FlightRecord>) -> Self {
    Self {
      rows: records.into_iter().enumerate().collect(),
    }
  }

  pub fn len(&self) -> usize {
    self.rows.len()
  }

  pub fn is_empty(&self) -> bool {
    self.rows.is_empty()
  }

  pub fn get(&self, index: usize) -> Option<&FlightRecord> {
    self.rows.get(&index)
  }

  pub fn iter(&self) -> impl Iterator<Item = (usize, &FlightRecord)> {
    self.rows.iter().map(|(i, r)| (*i, r))
  }

  /// Rows matching `predicate`, in index order
  pub fn select<F>(&self, predicate: F) -> Vec<(usize, &FlightRecord)>
  where
    F: Fn(&FlightRecord) -> bool,
  {
    self.iter().filter(|(_, r)| predicate(r)).collect()
  }
}

impl FromIterator<FlightRecord> for RecordStore {
  fn from_iter<T: IntoIterator<Item = FlightRecord>>(iter: T) -> Self {
    Self::from_records(iter)
  }
}

impl fmt::Display for RecordStore {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let header = Column::ALL.map(|c| c.as_str());
    writeln!(f, "{}", header.join(","))?;
    for (_, record) in self.iter() {
      writeln!(f, "{}", record)?;
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn store() -> RecordStore {
    RecordStore::from_records(vec![
      FlightRecord::new("VJ123", "HN", "HUE", "10:00", "8:00", "2:00"),
      FlightRecord::new("VN456", "HCMC", "HN", "13:30", "11:30", "2:00"),
      FlightRecord::new("VJ789", "ĐN", "HUE", "13:30", "12:30", "1:00"),
    ])
  }

  #[test]
  fn select_keeps_index_order() {
    let store = store();
    let rows = store.select(|r| r.dest == "HUE");
    assert_eq!(
      rows.iter().map(|(i, r)| (*i, r.flight.as_str())).collect::<Vec<_>>(),
      vec![(0, "VJ123"), (2, "VJ789")]
    );
    assert_eq!(store.select(|_| true).len(), store.len());
    assert!(store.select(|r| r.flight == "XX000").is_empty());
  }

  #[test]
  fn columns_and_rendering() {
    let store = store();
    let record = store.get(1).unwrap();
    assert_eq!(record.get(Column::ATime), "13:30");
    assert_eq!(record.get(Column::Source), "HCMC");
    assert_eq!(
      store.to_string().lines().take(2).collect::<Vec<_>>(),
      vec!["FLIGHT,SOURCE,DEST,ATIME,DTIME,RUNTIME", "VJ123,HN,HUE,10:00,8:00,2:00"]
    );
  }
}
