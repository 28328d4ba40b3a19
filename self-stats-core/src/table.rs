//! Column-oriented tables
//!
//! Events travel through the pipeline as parallel typed columns plus an
//! ordered [`Schema`] of column names. Every transformation returns a new
//! table carrying its own schema; nothing is extended in place.

use crate::error::{Error, Result};
use crate::types::{RecordType, DATE_COLUMN};
use chrono::{NaiveDate, NaiveDateTime};

/// One typed column of values.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Text(Vec<String>),
    DateTime(Vec<NaiveDateTime>),
    Date(Vec<NaiveDate>),
    Int(Vec<i64>),
    /// Nullable floats (coordinates, gaps, rates)
    Float(Vec<Option<f64>>),
    Bool(Vec<bool>),
}

impl Column {
    /// Number of rows in this column.
    pub fn len(&self) -> usize {
        match self {
            Column::Text(v) => v.len(),
            Column::DateTime(v) => v.len(),
            Column::Date(v) => v.len(),
            Column::Int(v) => v.len(),
            Column::Float(v) => v.len(),
            Column::Bool(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Short name of the value kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Column::Text(_) => "text",
            Column::DateTime(_) => "datetime",
            Column::Date(_) => "date",
            Column::Int(_) => "integer",
            Column::Float(_) => "float",
            Column::Bool(_) => "boolean",
        }
    }

    /// Keep the rows whose mask entry is `true`, preserving order.
    pub fn filter(&self, mask: &[bool]) -> Column {
        fn keep<T: Clone>(values: &[T], mask: &[bool]) -> Vec<T> {
            values
                .iter()
                .zip(mask)
                .filter(|(_, &keep)| keep)
                .map(|(v, _)| v.clone())
                .collect()
        }

        match self {
            Column::Text(v) => Column::Text(keep(v, mask)),
            Column::DateTime(v) => Column::DateTime(keep(v, mask)),
            Column::Date(v) => Column::Date(keep(v, mask)),
            Column::Int(v) => Column::Int(keep(v, mask)),
            Column::Float(v) => Column::Float(keep(v, mask)),
            Column::Bool(v) => Column::Bool(keep(v, mask)),
        }
    }

    /// Reorder rows: row `i` of the result is row `order[i]` of `self`.
    pub fn take(&self, order: &[usize]) -> Column {
        fn pick<T: Clone>(values: &[T], order: &[usize]) -> Vec<T> {
            order.iter().map(|&i| values[i].clone()).collect()
        }

        match self {
            Column::Text(v) => Column::Text(pick(v, order)),
            Column::DateTime(v) => Column::DateTime(pick(v, order)),
            Column::Date(v) => Column::Date(pick(v, order)),
            Column::Int(v) => Column::Int(pick(v, order)),
            Column::Float(v) => Column::Float(pick(v, order)),
            Column::Bool(v) => Column::Bool(pick(v, order)),
        }
    }
}

/// Ordered, immutable list of column names.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Schema {
    names: Vec<String>,
}

impl Schema {
    pub fn new<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Default ingest schema for a record type.
    pub fn for_record_type(record_type: RecordType) -> Self {
        Self::new(record_type.default_columns().iter().copied())
    }

    /// Position of a column by name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    /// A new schema with `name` appended.
    pub fn with_column(&self, name: impl Into<String>) -> Schema {
        let mut names = self.names.clone();
        names.push(name.into());
        Schema { names }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Parallel columns of equal length, named by a [`Schema`].
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    schema: Schema,
    columns: Vec<Column>,
}

impl Table {
    /// Build a table, checking that names and columns line up and that all
    /// columns share one length.
    pub fn new(schema: Schema, columns: Vec<Column>) -> Result<Self> {
        if schema.len() != columns.len() {
            return Err(Error::ColumnLength {
                column: "<schema>".to_string(),
                expected: schema.len(),
                found: columns.len(),
            });
        }
        if let Some(first) = columns.first() {
            let expected = first.len();
            for (name, column) in schema.names().iter().zip(&columns) {
                if column.len() != expected {
                    return Err(Error::ColumnLength {
                        column: name.clone(),
                        expected,
                        found: column.len(),
                    });
                }
            }
        }
        Ok(Self { schema, columns })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.columns.first().map(Column::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.schema.index_of(name).map(|i| &self.columns[i])
    }

    /// A new table with one more column appended.
    pub fn with_column(&self, name: impl Into<String>, column: Column) -> Result<Table> {
        let name = name.into();
        if !self.columns.is_empty() && column.len() != self.len() {
            return Err(Error::ColumnLength {
                column: name,
                expected: self.len(),
                found: column.len(),
            });
        }
        let mut columns = self.columns.clone();
        columns.push(column);
        Ok(Table {
            schema: self.schema.with_column(name),
            columns,
        })
    }

    /// Rows whose mask entry is `true`, in original order.
    ///
    /// # Panics
    ///
    /// Panics if the mask length differs from the row count.
    pub fn filter(&self, mask: &[bool]) -> Table {
        assert_eq!(mask.len(), self.len(), "row mask length mismatch");
        Table {
            schema: self.schema.clone(),
            columns: self.columns.iter().map(|c| c.filter(mask)).collect(),
        }
    }

    /// Rows reordered by `order` (a permutation of row indices).
    pub fn take(&self, order: &[usize]) -> Table {
        Table {
            schema: self.schema.clone(),
            columns: self.columns.iter().map(|c| c.take(order)).collect(),
        }
    }
}

/// An event table tagged with its record type.
///
/// Invariants checked at construction: the `Date` column exists and holds
/// parsed datetimes, and at least one discriminator column of the record
/// type is present.
#[derive(Debug, Clone, PartialEq)]
pub struct EventColumnSet {
    record_type: RecordType,
    table: Table,
}

impl EventColumnSet {
    pub fn new(record_type: RecordType, table: Table) -> Result<Self> {
        let has_discriminator = record_type
            .discriminator_columns()
            .iter()
            .any(|name| table.schema().contains(name));
        if !has_discriminator {
            return Err(Error::MalformedInput {
                column: record_type.discriminator_columns().join("' or '"),
                record_type: record_type.to_string(),
            });
        }

        match table.column(DATE_COLUMN) {
            None => Err(Error::MalformedInput {
                column: DATE_COLUMN.to_string(),
                record_type: record_type.to_string(),
            }),
            Some(Column::DateTime(_)) => Ok(Self { record_type, table }),
            Some(_) => Err(Error::ColumnType {
                column: DATE_COLUMN.to_string(),
                expected: "datetime",
            }),
        }
    }

    /// Convenience constructor from a schema and columns.
    pub fn from_columns(
        record_type: RecordType,
        schema: Schema,
        columns: Vec<Column>,
    ) -> Result<Self> {
        Self::new(record_type, Table::new(schema, columns)?)
    }

    pub fn record_type(&self) -> RecordType {
        self.record_type
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn into_table(self) -> Table {
        self.table
    }

    pub fn schema(&self) -> &Schema {
        self.table.schema()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.table.column(name)
    }

    /// The `Date` column values.
    pub fn timestamps(&self) -> &[NaiveDateTime] {
        match self.table.column(DATE_COLUMN) {
            Some(Column::DateTime(values)) => values,
            // Checked in `new`
            _ => unreachable!("event set without a datetime Date column"),
        }
    }

    /// Rows whose mask entry is `true`, applied to every column alike.
    pub fn filter(&self, mask: &[bool]) -> EventColumnSet {
        EventColumnSet {
            record_type: self.record_type,
            table: self.table.filter(mask),
        }
    }

    /// Rows in non-decreasing timestamp order; ties keep their input order.
    pub fn sorted_by_timestamp(&self) -> EventColumnSet {
        let timestamps = self.timestamps();
        if timestamps.windows(2).all(|w| w[0] <= w[1]) {
            return self.clone();
        }
        let mut order: Vec<usize> = (0..timestamps.len()).collect();
        order.sort_by_key(|&i| timestamps[i]);
        EventColumnSet {
            record_type: self.record_type,
            table: self.table.take(&order),
        }
    }

    /// A new set with one more column appended.
    pub fn with_column(&self, name: impl Into<String>, column: Column) -> Result<EventColumnSet> {
        Ok(EventColumnSet {
            record_type: self.record_type,
            table: self.table.with_column(name, column)?,
        })
    }
}
