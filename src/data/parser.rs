use crate::error::{Error, Result};

use super::model::Dataset;

const BYTE_ORDER_MARK: char = '\u{feff}';

/// Parse comma-separated text.
pub fn parse_csv(raw: &str) -> Result<Dataset> {
    parse(raw, ',')
}

/// Parse delimited text into a [`Dataset`].
///
/// Layout: optional byte-order mark, then one record per line. Blank lines
/// are skipped; the first remaining line holds the headers. Cells are split
/// on `delimiter` with no quoting rules and are not trimmed, so ragged rows
/// come through unchanged.
pub fn parse(raw: &str, delimiter: char) -> Result<Dataset> {
    let text = raw.strip_prefix(BYTE_ORDER_MARK).unwrap_or(raw);

    let mut lines = text
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.trim().is_empty());

    let header_line = lines
        .next()
        .ok_or_else(|| Error::parse("input contains no non-blank lines"))?;

    let headers: Vec<String> = header_line
        .split(delimiter)
        .map(|h| h.trim().to_string())
        .collect();

    let rows: Vec<Vec<String>> = lines
        .map(|line| line.split(delimiter).map(str::to_string).collect())
        .collect();

    Ok(Dataset::new(headers, rows, delimiter))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_headers_and_rows() {
        let ds = parse_csv("name,age\nAna,25\nLuis,30\n").unwrap();
        assert_eq!(ds.headers, vec!["name", "age"]);
        assert_eq!(ds.rows.len(), 2);
        assert_eq!(ds.rows[1], vec!["Luis", "30"]);
    }

    #[test]
    fn test_parse_skips_blank_lines() {
        let ds = parse_csv("\n  \nname,age\n\nAna,25\n   \n").unwrap();
        assert_eq!(ds.headers, vec!["name", "age"]);
        assert_eq!(ds.rows, vec![vec!["Ana".to_string(), "25".to_string()]]);
    }

    #[test]
    fn test_parse_empty_input_fails() {
        assert!(matches!(parse_csv(""), Err(Error::Parse { .. })));
        assert!(matches!(parse_csv(" \n\t\n"), Err(Error::Parse { .. })));
    }

    #[test]
    fn test_parse_strips_bom_and_crlf() {
        let ds = parse_csv("\u{feff}name,age\r\nAna,25\r\n").unwrap();
        assert_eq!(ds.headers, vec!["name", "age"]);
        assert_eq!(ds.rows[0], vec!["Ana", "25"]);
    }

    #[test]
    fn test_parse_keeps_ragged_rows_and_raw_cells() {
        let ds = parse_csv("a,b,c\n1\n1,2,3,4\n x , y\n").unwrap();
        assert_eq!(ds.rows[0].len(), 1);
        assert_eq!(ds.rows[1].len(), 4);
        assert_eq!(ds.rows[2], vec![" x ", " y"]);
    }

    #[test]
    fn test_parse_header_only() {
        let ds = parse_csv("a,b\n").unwrap();
        assert!(ds.is_empty());
        assert_eq!(ds.column_count(), 2);
    }

    #[test]
    fn test_parse_custom_delimiter() {
        let ds = parse("a;b\n1,5;2\n", ';').unwrap();
        assert_eq!(ds.rows[0], vec!["1,5", "2"]);
        assert_eq!(ds.delimiter, ';');
    }
}
