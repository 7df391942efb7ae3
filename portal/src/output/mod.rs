use std::{fs, path::PathBuf};

use anyhow::Result;
use portal_api::prelude::*;
use serde::Serialize;

mod table;

pub use table::{TableRow, render_table, render_table_dynamic};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Pretty,
    Table,
    Quiet,
}

#[derive(Clone, Debug)]
pub struct Output {
    format: OutputFormat,
    path: Option<PathBuf>,
}

impl Output {
    pub fn new(format: OutputFormat, path: Option<PathBuf>) -> Self {
        Self { format, path }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn emit_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        if self.format == OutputFormat::Quiet {
            return Ok(());
        }

        let data = match self.format {
            OutputFormat::Pretty => serde_json::to_string_pretty(value)?,
            _ => serde_json::to_string(value)?,
        };

        self.write(&data)
    }

    /// Table for `--table`, json otherwise.
    pub fn emit_table<T: TableRow + Serialize>(&self, items: &[T]) -> Result<()> {
        match self.format {
            OutputFormat::Table => self.write(&render_table(items)),
            OutputFormat::Quiet => Ok(()),
            _ => self.emit_json(items),
        }
    }

    /// Preview rows as a table with one column per preview column, or as a json
    /// array of the row objects.
    pub fn emit_rows(&self, preview: &Preview, rows: &[&Row], formatter: &CellFormatter) -> Result<()> {
        match self.format {
            OutputFormat::Table => {
                if preview.columns.is_empty() {
                    return self.write("(no rows)");
                }
                let cells: Vec<Vec<String>> =
                    rows.iter().map(|row| preview.cells(row, formatter)).collect();
                self.write(&render_table_dynamic(&preview.columns, &cells))
            }
            OutputFormat::Quiet => Ok(()),
            _ => self.emit_json(rows),
        }
    }

    pub fn emit_text(&self, text: &str) -> Result<()> {
        if self.format == OutputFormat::Quiet {
            return Ok(());
        }
        self.write(text)
    }

    fn write(&self, data: &str) -> Result<()> {
        let mut output = data.to_string();
        if !output.ends_with('\n') {
            output.push('\n');
        }

        if let Some(path) = &self.path {
            fs::write(path, output)?;
        } else {
            print!("{output}");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn preview() -> Preview {
        Preview::from_value(
            "HR_Employees",
            json!([{"Name": "Alice", "Dept": "HR"}, {"Name": "Bob", "Dept": null}]),
        )
    }

    #[test]
    fn rows_as_table_written_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let output = Output::new(OutputFormat::Table, Some(path.clone()));
        let preview = preview();
        let rows: Vec<&Row> = preview.rows.iter().collect();
        output
            .emit_rows(&preview, &rows, &CellFormatter::default())
            .unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0].trim_end(), "Name   Dept");
        assert_eq!(lines[1], "-----  ----");
        assert_eq!(lines[2].trim_end(), "Alice  HR");
        assert_eq!(lines[3].trim_end(), "Bob");
    }

    #[test]
    fn rows_as_json_keep_column_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        let output = Output::new(OutputFormat::Json, Some(path.clone()));
        let preview = preview();
        let rows: Vec<&Row> = preview.rows.iter().take(1).collect();
        output
            .emit_rows(&preview, &rows, &CellFormatter::default())
            .unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "[{\"Name\":\"Alice\",\"Dept\":\"HR\"}]\n"
        );
    }

    #[test]
    fn quiet_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quiet.txt");
        let output = Output::new(OutputFormat::Quiet, Some(path.clone()));
        output.emit_text("hello").unwrap();
        output.emit_json(&Catalog::fallback()).unwrap();
        assert!(!path.exists());
    }
}
