//! Line and column lookup for module-relative spans.
//!
//! Silvera spans are byte offsets into one module's source. [`SourceMap`]
//! keeps a [`LineOffsetTable`] per module path so emitters can turn
//! `(path, span)` into `path:line:col`.

use rustc_hash::FxHashMap;

/// Pre-computed line offset table for efficient line/column lookup.
///
/// # Example
///
/// ```
/// use silvera_diagnostic::span_utils::LineOffsetTable;
///
/// let source = "service A {\n}\nservice B {\n}";
/// let table = LineOffsetTable::build(source);
///
/// assert_eq!(table.offset_to_line_col(source, 0), (1, 1));
/// assert_eq!(table.offset_to_line_col(source, 14), (3, 1));
/// ```
#[derive(Clone, Debug, Default)]
pub struct LineOffsetTable {
    /// Byte offset of each line start. offsets[0] = 0.
    offsets: Vec<u32>,
}

impl LineOffsetTable {
    /// Build a line offset table from source text.
    pub fn build(source: &str) -> Self {
        let mut offsets = vec![0u32];
        for (i, byte) in source.as_bytes().iter().enumerate() {
            if *byte == b'\n' {
                offsets.push(u32::try_from(i + 1).unwrap_or(u32::MAX));
            }
        }
        LineOffsetTable { offsets }
    }

    /// Get 1-based line number from a byte offset using binary search.
    #[inline]
    pub fn line_from_offset(&self, offset: u32) -> u32 {
        let line_idx = match self.offsets.binary_search(&offset) {
            Ok(exact) => exact,
            Err(insert) => insert.saturating_sub(1),
        };
        u32::try_from(line_idx).unwrap_or(u32::MAX - 1) + 1
    }

    /// Get 1-based (line, column) from a byte offset.
    ///
    /// The column counts characters, not bytes, from the start of the line.
    pub fn offset_to_line_col(&self, source: &str, offset: u32) -> (u32, u32) {
        let line = self.line_from_offset(offset);
        let line_start = self
            .offsets
            .get((line - 1) as usize)
            .copied()
            .unwrap_or(0) as usize;
        let end = (offset as usize).min(source.len()).max(line_start);

        let col_text = source.get(line_start..end).unwrap_or("");
        let col = u32::try_from(col_text.chars().count()).unwrap_or(u32::MAX - 1) + 1;

        (line, col)
    }

    pub fn line_count(&self) -> usize {
        self.offsets.len()
    }
}

/// Module sources by path.
#[derive(Clone, Debug, Default)]
pub struct SourceMap {
    files: FxHashMap<String, (String, LineOffsetTable)>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, path: impl Into<String>, source: impl Into<String>) {
        let source = source.into();
        let table = LineOffsetTable::build(&source);
        self.files.insert(path.into(), (source, table));
    }

    pub fn source(&self, path: &str) -> Option<&str> {
        self.files.get(path).map(|(src, _)| src.as_str())
    }

    /// 1-based (line, column) of an offset in a module.
    ///
    /// Returns `None` for unknown modules and for modules without source
    /// text, whose spans cannot be mapped.
    pub fn line_col(&self, path: &str, offset: u32) -> Option<(u32, u32)> {
        let (source, table) = self.files.get(path)?;
        if source.is_empty() {
            return None;
        }
        Some(table.offset_to_line_col(source, offset))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_line_table_lookup() {
        let source = "a\nbb\nccc";
        let table = LineOffsetTable::build(source);
        assert_eq!(table.line_count(), 3);
        assert_eq!(table.offset_to_line_col(source, 0), (1, 1));
        assert_eq!(table.offset_to_line_col(source, 3), (2, 2));
        assert_eq!(table.offset_to_line_col(source, 7), (3, 3));
    }

    #[test]
    fn test_columns_count_chars() {
        let source = "é=x";
        let table = LineOffsetTable::build(source);
        // 'é' is two bytes, '=' starts at byte 2
        assert_eq!(table.offset_to_line_col(source, 2), (1, 2));
    }

    #[test]
    fn test_offset_past_end_clamps() {
        let source = "ab";
        let table = LineOffsetTable::build(source);
        assert_eq!(table.offset_to_line_col(source, 40), (1, 3));
    }

    #[test]
    fn test_source_map() {
        let mut map = SourceMap::new();
        map.add("orders.si", "service Orders {\n  api {}\n}");
        map.add("empty.si", "");

        assert_eq!(map.line_col("orders.si", 19), Some((2, 3)));
        assert_eq!(map.line_col("empty.si", 0), None);
        assert_eq!(map.line_col("missing.si", 0), None);
        assert_eq!(map.source("empty.si"), Some(""));
    }
}
