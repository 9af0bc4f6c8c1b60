//! Builders for batch input tables.

use medlabel::models::BatchTable;

/// Builds a CSV table with `title,abstract,group` plus optional extra columns.
pub struct TableBuilder {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TableBuilder {
    pub fn new() -> Self {
        Self::with_headers(&["title", "abstract", "group"])
    }

    /// Table with arbitrary headers, e.g. to omit a required column.
    pub fn with_headers(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn row(mut self, fields: &[&str]) -> Self {
        self.rows.push(fields.iter().map(|s| s.to_string()).collect());
        self
    }

    /// Repeat the same row `count` times.
    pub fn repeat(mut self, fields: &[&str], count: usize) -> Self {
        for _ in 0..count {
            self = self.row(fields);
        }
        self
    }

    pub fn to_csv(&self) -> String {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&self.headers).unwrap();
        for row in &self.rows {
            writer.write_record(row).unwrap();
        }
        String::from_utf8(writer.into_inner().unwrap()).unwrap()
    }

    pub fn build(&self) -> BatchTable {
        BatchTable::from_reader(self.to_csv().as_bytes()).expect("table should parse")
    }
}
