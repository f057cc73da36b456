// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// A schema-less table of string cells.
///
/// Rows are kept exactly as parsed: they are not padded or truncated to the
/// header length, so ragged rows survive until a specific column is read
/// through [`Dataset::column`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    /// Ordered column names from the first non-blank line.
    pub headers: Vec<String>,
    /// Data rows in file order.
    pub rows: Vec<Vec<String>>,
    /// Field delimiter the rows were split on; also joins row signatures.
    pub delimiter: char,
}

impl Dataset {
    /// Build a dataset from already split headers and rows.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>, delimiter: char) -> Self {
        Dataset {
            headers,
            rows,
            delimiter,
        }
    }

    /// Number of data rows (the header line is not counted).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset has no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of header columns.
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Number of cells actually present across all rows.
    pub fn total_cells(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    /// Position of a header by exact name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Values of one column, aligned by header position.
    ///
    /// Rows too short to reach the column yield `None`; this is the only
    /// place where column alignment is checked.
    pub fn column(&self, name: &str) -> Option<Vec<Option<&str>>> {
        self.column_index(name).map(|idx| self.column_at(idx))
    }

    /// Values at header position `idx`, `None` where a row is too short.
    pub fn column_at(&self, idx: usize) -> Vec<Option<&str>> {
        self.rows
            .iter()
            .map(|row| row.get(idx).map(String::as_str))
            .collect()
    }

    /// Signature used for duplicate detection: the row's cells joined by the
    /// dataset delimiter.
    pub fn row_signature(&self, index: usize) -> Option<String> {
        self.rows
            .get(index)
            .map(|row| signature(row, self.delimiter))
    }

    /// A dataset with the same headers and delimiter but different rows.
    pub fn with_rows(&self, rows: Vec<Vec<String>>) -> Self {
        Dataset {
            headers: self.headers.clone(),
            rows,
            delimiter: self.delimiter,
        }
    }
}

/// Join the cells of a row with `delimiter`.
pub fn signature(row: &[String], delimiter: char) -> String {
    let mut buf = [0u8; 4];
    row.join(&*delimiter.encode_utf8(&mut buf))
}
