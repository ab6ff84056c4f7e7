//! Report rendering for the text, json and minimal formats

use chrono::Utc;
use serde::Serialize;
use std::fmt::Write as _;

use crate::core::constants::{display, output_formats};
use crate::core::error::Result;
use crate::core::types::{LinkStatus, RunError};
use crate::reporting::report::{Report, ReportEntry, StatusCounts};
use crate::ui::color::{Colors, colorize, heading, status_color, status_emoji};

/// Print the report to stdout in the requested format
pub fn display_report(report: &Report, output_format: &str, quiet: bool) -> Result<()> {
    let rendered = match output_format {
        output_formats::MINIMAL => render_minimal(report),
        output_formats::JSON => render_json(report)?,
        _ => render_text(report, quiet),
    };
    print!("{rendered}");
    Ok(())
}

/// One broken link per line: `file:line target diagnostic`
pub fn render_minimal(report: &Report) -> String {
    let mut out = String::new();
    for entry in report.broken() {
        let record = &entry.link.record;
        let _ = writeln!(
            out,
            "{}:{} {} {}",
            record.source_file.display(),
            record.line_number,
            record.target,
            entry.detail
        );
    }
    out
}

#[derive(Serialize)]
struct JsonReport<'a> {
    generated_at: String,
    status: &'static str,
    cancelled: bool,
    files_scanned: usize,
    links_found: usize,
    unique_external_urls: usize,
    summary: StatusCounts,
    broken: Vec<&'a ReportEntry>,
    entries: &'a [ReportEntry],
    errors: &'a [RunError],
}

pub fn render_json(report: &Report) -> Result<String> {
    let status = if report.has_broken() {
        "failure"
    } else if report.cancelled {
        "cancelled"
    } else {
        "success"
    };
    let json = JsonReport {
        generated_at: Utc::now().to_rfc3339(),
        status,
        cancelled: report.cancelled,
        files_scanned: report.files_scanned,
        links_found: report.links_found,
        unique_external_urls: report.unique_external_urls,
        summary: report.counts(),
        broken: report.broken().collect(),
        entries: &report.entries,
        errors: &report.errors,
    };
    let mut out = serde_json::to_string_pretty(&json)?;
    out.push('\n');
    Ok(out)
}

/// Summary table, broken-link table and run errors. `quiet` keeps only the
/// broken links and errors.
pub fn render_text(report: &Report, quiet: bool) -> String {
    let mut out = String::new();
    let counts = report.counts();

    if !quiet {
        write_summary(&mut out, report, &counts);
    }

    if counts.broken > 0 {
        write_broken_table(&mut out, report);
    } else if !quiet && !report.cancelled {
        let _ = writeln!(
            out,
            "\n{} {}",
            colorize(display::VALID_EMOJI, Colors::BRIGHT_GREEN),
            heading("No broken links found!", Colors::BRIGHT_GREEN)
        );
    }

    if report.cancelled {
        let _ = writeln!(
            out,
            "\n{} {}",
            colorize(display::WARNING_EMOJI, Colors::BRIGHT_YELLOW),
            heading(
                "Run cancelled: some links were not checked",
                Colors::BRIGHT_YELLOW
            )
        );
    }

    if !report.errors.is_empty() {
        write_errors(&mut out, &report.errors);
    }

    out
}

fn write_summary(out: &mut String, report: &Report, counts: &StatusCounts) {
    let _ = writeln!(
        out,
        "{} {}",
        colorize(display::FILE_EMOJI, Colors::BRIGHT_BLUE),
        heading("Summary", Colors::BRIGHT_CYAN)
    );

    let rows = [
        ("Files scanned", report.files_scanned),
        ("Links found", report.links_found),
        ("Unique external URLs", report.unique_external_urls),
    ];
    for (label, value) in rows {
        let _ = writeln!(
            out,
            "   {:<22} {}",
            label,
            colorize(&value.to_string(), Colors::BRIGHT_WHITE)
        );
    }

    let _ = writeln!(out);
    for status in LinkStatus::ALL {
        let label = format!("{} {}", status_emoji(status), status.label());
        let _ = writeln!(
            out,
            "   {:<22} {}",
            label,
            colorize(&counts.get(status).to_string(), status_color(status))
        );
    }
}

fn write_broken_table(out: &mut String, report: &Report) {
    let rows: Vec<[String; 4]> = report
        .broken()
        .map(|entry| {
            let record = &entry.link.record;
            [
                record.source_file.display().to_string(),
                record.line_number.to_string(),
                truncate_url(&record.target),
                entry.detail.clone(),
            ]
        })
        .collect();

    let headers = ["File", "Line", "URL", "Diagnostic"];
    let mut widths = headers.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let _ = writeln!(
        out,
        "\n{} {}",
        colorize(display::BROKEN_EMOJI, Colors::BRIGHT_RED),
        heading(
            &format!("Broken links ({})", rows.len()),
            Colors::BRIGHT_RED
        )
    );

    // Pad before coloring so escape codes don't skew the columns
    let header_line = pad_row(&headers.map(String::from), &widths);
    let _ = writeln!(out, "   {}", colorize(&header_line, Colors::BOLD));
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let _ = writeln!(out, "   {}", colorize(&rule.join("  "), Colors::DIM));
    for row in &rows {
        let _ = writeln!(out, "   {}", pad_row(row, &widths));
    }
}

fn write_errors(out: &mut String, errors: &[RunError]) {
    let _ = writeln!(
        out,
        "\n{} {}",
        colorize(display::WARNING_EMOJI, Colors::BRIGHT_YELLOW),
        heading(&format!("Errors ({})", errors.len()), Colors::BRIGHT_YELLOW)
    );
    for (i, err) in errors.iter().enumerate() {
        let _ = writeln!(
            out,
            "   {}. {}",
            colorize(&(i + 1).to_string(), Colors::DIM),
            err
        );
    }
}

fn pad_row(cells: &[String; 4], widths: &[usize; 4]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths.iter())
        .map(|(cell, width)| {
            let fill = width.saturating_sub(cell.chars().count());
            format!("{cell}{}", " ".repeat(fill))
        })
        .collect();
    padded.join("  ").trim_end().to_string()
}

/// Shorten long URLs for the table, keeping the first characters
pub fn truncate_url(url: &str) -> String {
    if url.chars().count() <= display::MAX_URL_CHARS {
        url.to_string()
    } else {
        let head: String = url.chars().take(display::MAX_URL_CHARS).collect();
        format!("{head}...")
    }
}
