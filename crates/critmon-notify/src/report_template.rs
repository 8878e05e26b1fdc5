use crate::utils::escape_html;
use critmon_common::report::Report;
use std::fmt::Write;

const FOOTER: &str = "NA stands for exception not recorded.";

/// Pure report-to-document transforms used by the channels.
pub struct ReportRenderer;

impl ReportRenderer {
    /// `Critical log, every 30 minutes at 09:00 14 October 2026`
    pub fn heading(report: &Report) -> String {
        format!("Critical log, {} at {}", report.interval, report.window_label)
    }

    /// Renders the report as an HTML table with one row per exception;
    /// title and description cells span the rows beneath them.
    pub fn render_html(report: &Report) -> String {
        let template = include_str!("templates/critical_report.html");
        let mut rows = String::new();

        for (t_idx, (title, t)) in report.tree.titles().iter().enumerate() {
            let title_span: usize = t
                .descriptions()
                .values()
                .map(|d| d.exceptions().len())
                .sum();
            let class = if t_idx % 2 == 1 { " class=\"alt\"" } else { "" };
            let mut first_in_title = true;

            for (desc, d) in t.descriptions() {
                let mut first_in_desc = true;
                for (exc, e) in d.exceptions() {
                    let mut row = format!("<tr{class}>");
                    if first_in_title {
                        let _ = write!(
                            row,
                            "<td rowspan=\"{title_span}\">{}</td><td class=\"num\" rowspan=\"{title_span}\">{}</td>",
                            escape_html(title),
                            t.count()
                        );
                        first_in_title = false;
                    }
                    if first_in_desc {
                        let span = d.exceptions().len();
                        let _ = write!(
                            row,
                            "<td rowspan=\"{span}\">{}</td><td class=\"num\" rowspan=\"{span}\">{}</td>",
                            escape_html(desc),
                            d.count()
                        );
                        first_in_desc = false;
                    }
                    let _ = write!(
                        row,
                        "<td>{}</td><td class=\"num\">{}</td></tr>",
                        escape_html(exc),
                        e.count()
                    );
                    rows.push_str(&row);
                    rows.push('\n');
                }
            }
        }

        template
            .replace("{{heading}}", &escape_html(&Self::heading(report)))
            .replace("{{rows}}", &rows)
            .replace("{{footer}}", FOOTER)
    }

    /// Indented plain-text form, one line per node. Field text is written
    /// as recorded, without HTML escaping.
    pub fn render_text(report: &Report) -> String {
        let mut out = Self::heading(report);
        out.push('\n');

        for (title, t) in report.tree.titles() {
            let _ = writeln!(out, "- {title} ({})", t.count());
            for (desc, d) in t.descriptions() {
                let _ = writeln!(out, "  - {desc} ({})", d.count());
                for (exc, e) in d.exceptions() {
                    let _ = writeln!(out, "    - {exc} ({})", e.count());
                }
            }
        }

        if report.tree.is_empty() {
            out.push_str("(no records)\n");
        }
        out.push_str(FOOTER);
        out.push('\n');
        out
    }
}
