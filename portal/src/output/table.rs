use portal_api::prelude::*;

/// Cells wider than this are cut and end with `…`
const MAX_CELL_WIDTH: usize = 48;

pub trait TableRow {
    fn headers() -> &'static [&'static str];
    fn row(&self) -> Vec<String>;
}

pub fn render_table<T: TableRow>(items: &[T]) -> String {
    let headers: Vec<String> = T::headers().iter().map(ToString::to_string).collect();
    let rows: Vec<Vec<String>> = items.iter().map(TableRow::row).collect();
    render_table_dynamic(&headers, &rows)
}

pub fn render_table_dynamic(headers: &[String], rows: &[Vec<String>]) -> String {
    let rows: Vec<Vec<String>> = rows
        .iter()
        .map(|row| row.iter().map(|cell| clip(cell)).collect())
        .collect();
    let widths = column_widths(headers, &rows);

    let mut out = String::new();
    out.push_str(&format_row(headers, &widths));
    out.push('\n');
    out.push_str(&format_separator(&widths));

    for row in &rows {
        out.push('\n');
        out.push_str(&format_row(row, &widths));
    }

    out
}

/// One line, at most [`MAX_CELL_WIDTH`] characters
fn clip(cell: &str) -> String {
    let flat = cell.replace(['\n', '\r', '\t'], " ");
    if flat.chars().count() <= MAX_CELL_WIDTH {
        return flat;
    }
    let mut clipped: String = flat.chars().take(MAX_CELL_WIDTH - 1).collect();
    clipped.push('…');
    clipped
}

fn column_widths(headers: &[String], rows: &[Vec<String>]) -> Vec<usize> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (idx, cell) in row.iter().enumerate() {
            let len = cell.chars().count();
            if idx >= widths.len() {
                widths.push(len);
            } else {
                widths[idx] = widths[idx].max(len);
            }
        }
    }
    widths
}

fn format_row(row: &[String], widths: &[usize]) -> String {
    use std::fmt::Write as _;
    let mut out = String::new();
    for (idx, cell) in row.iter().enumerate() {
        if idx > 0 {
            out.push_str("  ");
        }
        let width = widths.get(idx).copied().unwrap_or(0);
        let _ = write!(out, "{cell:<width$}");
    }
    out
}

fn format_separator(widths: &[usize]) -> String {
    let mut out = String::new();
    for (idx, width) in widths.iter().enumerate() {
        if idx > 0 {
            out.push_str("  ");
        }
        out.push_str(&"-".repeat(*width));
    }
    out
}

impl TableRow for CatalogItem {
    fn headers() -> &'static [&'static str] {
        &["key", "label"]
    }

    fn row(&self) -> Vec<String> {
        vec![self.key.clone(), self.label.clone()]
    }
}

impl TableRow for ApiSpec {
    fn headers() -> &'static [&'static str] {
        &["key", "label", "url"]
    }

    fn row(&self) -> Vec<String> {
        vec![self.key.clone(), self.label.clone(), self.url.clone()]
    }
}

impl TableRow for Operation {
    fn headers() -> &'static [&'static str] {
        &["method", "path", "summary", "tags"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.method.clone(),
            self.path.clone(),
            self.summary.clone().unwrap_or_default(),
            self.tags.join(","),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_table_aligns_columns() {
        let items: Vec<CatalogItem> = ["HR_Employees", "RightFax_Users"]
            .into_iter()
            .map(CatalogItem::from_key)
            .collect();
        let table = render_table(&items);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0].trim_end(), "key             label");
        assert_eq!(lines[1], "--------------  --------------");
        assert_eq!(lines[2].trim_end(), "HR_Employees    HR Employees");
        assert_eq!(lines[3].trim_end(), "RightFax_Users  RightFax Users");
    }

    #[test]
    fn wide_cells_are_clipped_to_one_line() {
        let long = "x".repeat(MAX_CELL_WIDTH + 10);
        assert_eq!(clip(&long).chars().count(), MAX_CELL_WIDTH);
        assert!(clip(&long).ends_with('…'));
        assert_eq!(clip("a\nb"), "a b");
    }

    #[test]
    fn widths_count_characters_not_bytes() {
        let headers = vec!["name".to_string()];
        let rows = vec![vec!["Zoë".to_string()], vec!["Ünïcödé".to_string()]];
        let table = render_table_dynamic(&headers, &rows);
        assert_eq!(table.lines().nth(1), Some("-------"));
    }
}
