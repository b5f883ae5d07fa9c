//! Plain-text table rendering for `--table` output.
//!
//! Numeric cells (day counts, session codes) are right-aligned; everything
//! else is left-aligned. Embedded line breaks and tabs are flattened to
//! spaces so each record stays on one line.

use std::borrow::Cow;
use std::fmt::Write as _;

pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths = headers
        .iter()
        .map(|h| h.chars().count().max(3))
        .collect::<Vec<_>>();
    let mut numeric = vec![true; headers.len()];

    for row in rows {
        for (idx, cell) in row.iter().enumerate().take(headers.len()) {
            widths[idx] = widths[idx].max(flatten(cell).chars().count());
            if !cell.is_empty() && cell.parse::<f64>().is_err() {
                numeric[idx] = false;
            }
        }
    }

    let mut output = String::new();
    let header_cells = headers.iter().map(|h| Cow::Borrowed(h.as_str())).collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_line(&header_cells, &widths, &numeric));
    let rule = widths.iter().map(|w| Cow::Owned("-".repeat(*w))).collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_line(&rule, &widths, &numeric));
    for row in rows {
        let cells = row.iter().map(|c| flatten(c)).collect::<Vec<_>>();
        let _ = writeln!(output, "{}", format_line(&cells, &widths, &numeric));
    }
    output
}

pub fn print_table(headers: &[String], rows: &[Vec<String>]) {
    print!("{}", render_table(headers, rows));
}

fn format_line(cells: &[Cow<'_, str>], widths: &[usize], numeric: &[bool]) -> String {
    let line = cells
        .iter()
        .zip(widths)
        .zip(numeric)
        .map(|((cell, width), right)| {
            let width = *width;
            if *right {
                format!("{cell:>width$}")
            } else {
                format!("{cell:<width$}")
            }
        })
        .collect::<Vec<_>>()
        .join("  ");
    line.trim_end().to_string()
}

fn flatten(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(value.replace(['\n', '\r', '\t'], " "))
    } else {
        Cow::Borrowed(value)
    }
}
