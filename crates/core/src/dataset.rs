//! Tabular tweet data loaded from CSV.

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct Table {
    columns: Vec<Vec<String>>,
    index: HashMap<String, usize>,
}

impl Table {
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let table = Self::from_reader(file)?;
        debug!("loaded {} rows from {}", table.len(), path.display());
        Ok(table)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(reader);
        let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.to_string()).collect();
        let mut columns = vec![Vec::new(); headers.len()];
        for record in rdr.records() {
            let record = record?;
            for (col, value) in columns.iter_mut().zip(record.iter()) {
                col.push(value.to_string());
            }
        }
        let index = headers
            .into_iter()
            .enumerate()
            .map(|(i, h)| (h, i))
            .collect();
        Ok(Self { columns, index })
    }

    /// Builds a table from `(name, values)` pairs. Columns must share a length.
    pub fn from_columns(columns: Vec<(&str, Vec<&str>)>) -> Self {
        let index = columns
            .iter()
            .enumerate()
            .map(|(i, (h, _))| (h.to_string(), i))
            .collect();
        let values = columns
            .into_iter()
            .map(|(_, v)| v.into_iter().map(str::to_string).collect())
            .collect();
        Self {
            columns: values,
            index,
        }
    }

    pub fn column(&self, name: &str) -> Result<&[String]> {
        self.index
            .get(name)
            .map(|&i| self.columns[i].as_slice())
            .ok_or_else(|| Error::MissingColumn(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.columns.first().map(Vec::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Splits a stringified list such as `['#a', '#b']` into its top-level
/// elements. Quotes around an element are removed; nested brackets and
/// braces stay inside the element they belong to.
pub fn parse_list_cell(cell: &str) -> Vec<String> {
    let trimmed = cell.trim();
    if is_null(trimmed) {
        return Vec::new();
    }
    let inner = match trimmed
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
    {
        Some(inner) => inner,
        None => return vec![trimmed.to_string()],
    };

    let mut items = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for ch in inner.chars() {
        if let Some(q) = quote {
            current.push(ch);
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '\'' | '"' => {
                quote = Some(ch);
                current.push(ch);
            }
            '[' | '{' | '(' => {
                depth += 1;
                current.push(ch);
            }
            ']' | '}' | ')' => {
                depth = depth.saturating_sub(1);
                current.push(ch);
            }
            ',' if depth == 0 => {
                push_item(&mut items, &current);
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    push_item(&mut items, &current);
    items
}

fn push_item(items: &mut Vec<String>, raw: &str) {
    let item = raw.trim();
    if item.is_empty() {
        return;
    }
    items.push(unquote(item).to_string());
}

fn unquote(item: &str) -> &str {
    for q in ['\'', '"'] {
        if item.len() >= 2 && item.starts_with(q) && item.ends_with(q) {
            return &item[1..item.len() - 1];
        }
    }
    item
}

fn is_null(cell: &str) -> bool {
    cell.is_empty()
        || cell.eq_ignore_ascii_case("nan")
        || cell == "None"
        || cell == "[]"
}

/// Tokens of a tokenized-text cell: list elements when bracketed,
/// whitespace-separated words otherwise.
pub fn tokens_of(cell: &str) -> Vec<String> {
    let trimmed = cell.trim();
    if trimmed.starts_with('[') && trimmed.ends_with(']') {
        parse_list_cell(trimmed)
    } else {
        trimmed.split_whitespace().map(str::to_string).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_quoted_csv() {
        let data = "tweet,label\n\"hello, world\",True\nbye,False\n";
        let table = Table::from_reader(data.as_bytes()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.column("tweet").unwrap()[0], "hello, world");
        assert_eq!(table.column("label").unwrap()[1], "False");
        assert!(matches!(
            table.column("date"),
            Err(Error::MissingColumn(c)) if c == "date"
        ));
    }

    #[test]
    fn python_list_literals() {
        assert_eq!(parse_list_cell("['#ai', '#ml']"), vec!["#ai", "#ml"]);
        assert!(parse_list_cell("[]").is_empty());
        assert!(parse_list_cell("").is_empty());
        assert!(parse_list_cell("nan").is_empty());
        assert_eq!(parse_list_cell("['it, too', \"b\"]"), vec!["it, too", "b"]);
    }

    #[test]
    fn nested_dicts_count_once() {
        let cell = "[{'screen_name': 'a', 'id': '1'}, {'screen_name': 'b', 'id': '2'}]";
        assert_eq!(parse_list_cell(cell).len(), 2);
    }

    #[test]
    fn tokens_from_either_shape() {
        assert_eq!(tokens_of("['data', 'science']"), vec!["data", "science"]);
        assert_eq!(tokens_of("data  science"), vec!["data", "science"]);
    }
}
