//! Sample table: one row per sampled point, one column per time step.
//!
//! Cells are `Option<ClassCode>`; `None` is a point with no class data in
//! that image. Columns always have equal length.

use std::collections::BTreeSet;
use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SankeeError};
use crate::ClassCode;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Time-step label, e.g. "2001".
    pub name: String,
    pub values: Vec<Option<ClassCode>>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Option<ClassCode>>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Column with no missing values.
    pub fn complete(name: impl Into<String>, values: &[ClassCode]) -> Self {
        Self::new(name, values.iter().copied().map(Some).collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TableRepr")]
pub struct SampleTable {
    columns: Vec<Column>,
}

#[derive(Deserialize)]
struct TableRepr {
    columns: Vec<Column>,
}

impl TryFrom<TableRepr> for SampleTable {
    type Error = SankeeError;

    fn try_from(repr: TableRepr) -> Result<Self> {
        SampleTable::new(repr.columns)
    }
}

impl SampleTable {
    /// Validate and wrap columns. Fails on zero columns or ragged lengths.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let Some(first) = columns.first() else {
            return Err(SankeeError::InvalidInput("table has no columns".to_string()));
        };
        let n_rows = first.values.len();
        if let Some(bad) = columns.iter().find(|c| c.values.len() != n_rows) {
            return Err(SankeeError::InvalidInput(format!(
                "column {:?} has {} rows, expected {}",
                bad.name,
                bad.values.len(),
                n_rows
            )));
        }
        Ok(Self { columns })
    }

    /// Build from complete rows. Each row must have one value per name.
    pub fn from_rows<S: AsRef<str>>(names: &[S], rows: &[Vec<ClassCode>]) -> Result<Self> {
        let mut columns: Vec<Column> = names
            .iter()
            .map(|n| Column::new(n.as_ref(), Vec::with_capacity(rows.len())))
            .collect();
        for (r, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(SankeeError::InvalidInput(format!(
                    "row {r} has {} values, expected {}",
                    row.len(),
                    columns.len()
                )));
            }
            for (col, &v) in columns.iter_mut().zip(row) {
                col.values.push(Some(v));
            }
        }
        Self::new(columns)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn n_rows(&self) -> usize {
        self.columns[0].values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows() == 0
    }

    #[inline]
    pub fn cell(&self, row: usize, col: usize) -> Option<ClassCode> {
        self.columns[col].values[row]
    }

    /// Cells of one row, left to right.
    pub fn row(&self, row: usize) -> impl Iterator<Item = Option<ClassCode>> + '_ {
        self.columns.iter().map(move |c| c.values[row])
    }

    /// New table keeping only rows for which `keep(row_index)` holds.
    pub fn retain_rows(&self, mut keep: impl FnMut(usize) -> bool) -> SampleTable {
        let kept: Vec<usize> = (0..self.n_rows()).filter(|&r| keep(r)).collect();
        let columns = self
            .columns
            .iter()
            .map(|c| Column::new(c.name.clone(), kept.iter().map(|&r| c.values[r]).collect()))
            .collect();
        SampleTable { columns }
    }

    /// New table without rows that have a missing cell.
    pub fn drop_missing(&self) -> SampleTable {
        let out = self.retain_rows(|r| self.row(r).all(|v| v.is_some()));
        let dropped = self.n_rows() - out.n_rows();
        if dropped > 0 {
            log::warn!("dropped {dropped} of {} rows with missing class values", self.n_rows());
        }
        out
    }

    /// Distinct class codes present anywhere in the table.
    pub fn distinct_classes(&self) -> BTreeSet<ClassCode> {
        self.columns
            .iter()
            .flat_map(|c| c.values.iter().flatten().copied())
            .collect()
    }

    // ── CSV ─────────────────────────────────────────────────────────────────

    /// Read a table from CSV. The header row holds the time-step labels;
    /// an empty cell is a missing value.
    pub fn read_csv<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = rdr.headers().map_err(wrap_csv)?.clone();
        let mut columns: Vec<Column> = headers
            .iter()
            .map(|h| Column::new(h, Vec::new()))
            .collect();

        for (r, record) in rdr.records().enumerate() {
            let record = record.map_err(wrap_csv)?;
            for (col, field) in columns.iter_mut().zip(record.iter()) {
                let value = if field.is_empty() {
                    None
                } else {
                    Some(parse_code(field).ok_or_else(|| {
                        SankeeError::InvalidInput(format!(
                            "row {r}, column {:?}: {field:?} is not a class code",
                            col.name
                        ))
                    })?)
                };
                col.values.push(value);
            }
        }
        Self::new(columns)
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(self.column_names()).map_err(wrap_csv)?;
        for r in 0..self.n_rows() {
            let fields: Vec<String> = self
                .row(r)
                .map(|v| v.map(|c| c.to_string()).unwrap_or_default())
                .collect();
            wtr.write_record(&fields).map_err(wrap_csv)?;
        }
        wtr.flush()
            .map_err(|e| SankeeError::InvalidInput(format!("csv write failed: {e}")))
    }
}

/// Integer codes, also accepting integral floats ("41.0") as written by
/// samplers that store classes as floating point.
fn parse_code(field: &str) -> Option<ClassCode> {
    if let Ok(v) = field.parse::<ClassCode>() {
        return Some(v);
    }
    let f = field.parse::<f64>().ok()?;
    if f.is_finite() && f.fract() == 0.0 && f.abs() <= ClassCode::MAX as f64 {
        Some(f as ClassCode)
    } else {
        None
    }
}

fn wrap_csv(err: csv::Error) -> SankeeError {
    SankeeError::InvalidInput(format!("csv: {err}"))
}
