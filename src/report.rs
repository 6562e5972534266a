// acishell - interactive shell for Cisco ACI APIC inventory queries
// Copyright (C) 2024 Mathias Uhl <mathiasuhl@gmx.de>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use crate::error::AciError;
use crate::normalize::ReportTable;
use std::fs;
use std::path::{Path, PathBuf};
use umya_spreadsheet::{Spreadsheet, reader, writer};

const ABSENT: &str = "-";
pub const MAX_SHEET_NAME: usize = 31;

/// Right-justified, fixed-width text table without a row index.
pub fn render(table: &ReportTable) -> String {
    let cells: Vec<Vec<&str>> = table
        .rows()
        .iter()
        .map(|row| {
            row.values()
                .iter()
                .map(|v| v.as_deref().unwrap_or(ABSENT))
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = table.columns().iter().map(|c| c.chars().count()).collect();
    for row in &cells {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, table.columns(), &widths);
    if cells.is_empty() {
        out.push_str("No records found.\n");
    }
    for row in &cells {
        push_line(&mut out, row, &widths);
    }
    out
}

fn push_line(out: &mut String, cells: &[&str], widths: &[usize]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:>width$}"))
        .collect();
    out.push_str(&line.join("  "));
    out.push('\n');
}

/// A workbook path plus the sheet to (re)write in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportTarget {
    pub path: PathBuf,
    pub sheet: String,
}

impl ExportTarget {
    pub fn new(path: impl Into<PathBuf>, sheet: &str) -> Self {
        Self {
            path: path.into(),
            sheet: sanitize_sheet_name(sheet),
        }
    }
}

/// Replaces characters Excel refuses in sheet names and enforces its
/// 31-character limit. Overlong names keep their tail, where the pod, node
/// and interface identifiers sit.
pub fn sanitize_sheet_name(name: &str) -> String {
    let chars: Vec<char> = name
        .chars()
        .map(|c| match c {
            '\\' | '/' | '?' | '*' | '[' | ']' | ':' => '-',
            other => other,
        })
        .collect();
    let cleaned: String = chars[chars.len().saturating_sub(MAX_SHEET_NAME)..]
        .iter()
        .collect();
    if cleaned.trim().is_empty() {
        "Sheet".to_string()
    } else {
        cleaned
    }
}

/// Writes `table` as `target.sheet`. Other sheets already in the file are
/// preserved; a sheet with the same name is replaced.
pub fn export(table: &ReportTable, target: &ExportTarget) -> Result<(), AciError> {
    let fail = |reason: String| AciError::Export {
        path: target.path.display().to_string(),
        reason,
    };

    if let Some(parent) = target.path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| fail(format!("creating {parent:?}: {e}")))?;
    }

    let mut book = open_or_new(&target.path).map_err(fail)?;
    if book.get_sheet_by_name(&target.sheet).is_some() {
        book.remove_sheet_by_name(&target.sheet)
            .map_err(|e| fail(e.to_string()))?;
    }
    let sheet = book
        .new_sheet(target.sheet.as_str())
        .map_err(|e| fail(e.to_string()))?;

    for (col, name) in table.columns().iter().enumerate() {
        sheet
            .get_cell_mut((col as u32 + 1, 1u32))
            .set_value_string(*name);
    }
    for (row_idx, row) in table.rows().iter().enumerate() {
        for (col, value) in row.values().iter().enumerate() {
            if let Some(value) = value {
                sheet
                    .get_cell_mut((col as u32 + 1, row_idx as u32 + 2))
                    .set_value_string(value.as_str());
            }
        }
    }

    writer::xlsx::write(&book, &target.path).map_err(|e| fail(e.to_string()))?;
    tracing::info!(
        path = %target.path.display(),
        sheet = %target.sheet,
        rows = table.len(),
        "exported report"
    );
    Ok(())
}

fn open_or_new(path: &Path) -> Result<Spreadsheet, String> {
    if path.exists() {
        reader::xlsx::read(path).map_err(|e| format!("reading existing workbook: {e}"))
    } else {
        Ok(umya_spreadsheet::new_file_empty_worksheet())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::{EPG_COLUMNS, InventoryRecord};
    use crate::query::Query;
    use tempfile::tempdir;

    fn epg_table(rows: &[[&str; 4]]) -> ReportTable {
        let mut table = ReportTable::new(EPG_COLUMNS, &["Tenant", "Application Profile", "EPG"]);
        for row in rows {
            let values = row
                .iter()
                .map(|v| (!v.is_empty()).then(|| v.to_string()))
                .collect();
            table.push(InventoryRecord::new(values)).unwrap();
        }
        table
    }

    #[test]
    fn renders_right_justified_without_index() {
        let table = epg_table(&[["T1", "AP", "Web", "frontend"], ["Tenant-22", "AP", "Db", ""]]);
        let text = render(&table);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "   Tenant  Application Profile  EPG     Alias");
        assert_eq!(lines[1], "       T1                   AP  Web  frontend");
        assert_eq!(lines[2], "Tenant-22                   AP   Db         -");
    }

    #[test]
    fn renders_empty_table_with_notice() {
        let text = render(&epg_table(&[]));
        assert!(text.ends_with("No records found.\n"));
    }

    #[test]
    fn sanitizes_sheet_names() {
        assert_eq!(
            sanitize_sheet_name("Interface_EPG_P1_N201_eth1/1"),
            "Interface_EPG_P1_N201_eth1-1"
        );
        assert_eq!(sanitize_sheet_name("a[b]:c?"), "a-b--c-");
        assert_eq!(sanitize_sheet_name(&"x".repeat(40)).len(), 31);
        assert_eq!(
            sanitize_sheet_name("Interface_EPG_P1_N1101_eth1/49/1"),
            "nterface_EPG_P1_N1101_eth1-49-1"
        );
        assert_eq!(sanitize_sheet_name(""), "Sheet");
    }

    #[test]
    fn creates_workbook_with_one_sheet() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reports").join("fabric.xlsx");
        let table = epg_table(&[["T1", "AP", "Web", "frontend"], ["T2", "AP", "Db", ""]]);

        export(&table, &ExportTarget::new(&path, "EPG")).unwrap();

        let book = reader::xlsx::read(&path).unwrap();
        assert_eq!(book.get_sheet_collection().len(), 1);
        let sheet = book.get_sheet_by_name("EPG").unwrap();
        assert_eq!(sheet.get_value((1u32, 1u32)), "Tenant");
        assert_eq!(sheet.get_value((4u32, 1u32)), "Alias");
        assert_eq!(sheet.get_value((1u32, 2u32)), "T1");
        assert_eq!(sheet.get_value((3u32, 3u32)), "Db");
        assert_eq!(sheet.get_value((4u32, 3u32)), "");
    }

    #[test]
    fn appends_sheets_without_clobbering() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("fabric.xlsx");

        export(
            &epg_table(&[["T1", "AP", "Web", ""]]),
            &ExportTarget::new(&path, "EPG"),
        )
        .unwrap();
        export(
            &epg_table(&[["T9", "AP", "Other", ""]]),
            &ExportTarget::new(&path, "Interface_EPG_P1_N201_eth1/1"),
        )
        .unwrap();

        let book = reader::xlsx::read(&path).unwrap();
        let names: Vec<&str> = book
            .get_sheet_collection()
            .iter()
            .map(|s| s.get_name())
            .collect();
        assert_eq!(names, ["EPG", "Interface_EPG_P1_N201_eth1-1"]);
        assert_eq!(book.get_sheet_by_name("EPG").unwrap().get_value((1u32, 2u32)), "T1");
        assert_eq!(
            book.get_sheet_by_name("Interface_EPG_P1_N201_eth1-1")
                .unwrap()
                .get_value((1u32, 2u32)),
            "T9"
        );
    }

    #[test]
    fn rewriting_a_sheet_replaces_only_that_sheet() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("fabric.xlsx");

        export(&epg_table(&[["Old", "AP", "E", ""]]), &ExportTarget::new(&path, "EPG")).unwrap();
        export(&epg_table(&[["Keep", "AP", "E", ""]]), &ExportTarget::new(&path, "Other")).unwrap();
        export(&epg_table(&[["New", "AP", "E", ""]]), &ExportTarget::new(&path, "EPG")).unwrap();

        let book = reader::xlsx::read(&path).unwrap();
        assert_eq!(book.get_sheet_collection().len(), 2);
        assert_eq!(book.get_sheet_by_name("EPG").unwrap().get_value((1u32, 2u32)), "New");
        assert_eq!(book.get_sheet_by_name("Other").unwrap().get_value((1u32, 2u32)), "Keep");
    }

    #[test]
    fn breakout_ports_on_long_node_ids_get_their_own_sheets() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("fabric.xlsx");
        let sheet_for = |iface: &str| {
            Query::InterfaceEpg {
                pod: "1".parse().unwrap(),
                node: "1101".parse().unwrap(),
                interface: iface.parse().unwrap(),
            }
            .sheet_name()
        };

        let first = ExportTarget::new(&path, &sheet_for("eth1/49/1"));
        let second = ExportTarget::new(&path, &sheet_for("eth1/49/2"));
        assert_eq!(first.sheet, "IF_EPG_P1_N1101_eth1-49-1");
        assert_eq!(second.sheet, "IF_EPG_P1_N1101_eth1-49-2");

        export(&epg_table(&[["T1", "AP", "A", ""]]), &first).unwrap();
        export(&epg_table(&[["T2", "AP", "B", ""]]), &second).unwrap();

        let book = reader::xlsx::read(&path).unwrap();
        assert_eq!(book.get_sheet_collection().len(), 2);
        assert_eq!(book.get_sheet_by_name(&first.sheet).unwrap().get_value((1u32, 2u32)), "T1");
        assert_eq!(book.get_sheet_by_name(&second.sheet).unwrap().get_value((1u32, 2u32)), "T2");
    }
}
