use std::{io::Write, path::Path, time::Duration};

use anyhow::Context;
use ordered_float::OrderedFloat;
use regex::{Captures, NoExpand, Regex};
use tempfile::NamedTempFile;
use tracing::info;

use crate::browser::BrowserSession;

const BAR_CHART_HTML: &str = include_str!("bar_chart.html");
/// Only used while loading the local chart file
const CHART_LOAD_TIMEOUT: Duration = Duration::from_secs(5);


pub(super) struct Bar {
    pub(super) label: String,
    pub(super) value: f64,
    /// How the value is printed next to the bar
    pub(super) display: String
}


/// A horizontal bar chart, first bar on top
pub(super) struct BarChart {
    pub(super) title: String,
    pub(super) x_label: String,
    pub(super) y_label: String,
    pub(super) bars: Vec<Bar>
}


pub(super) struct Regexes {
    title: Regex,
    x_label: Regex,
    y_label: Regex,
    bars: Regex,
    bar_label: Regex,
    bar_width: Regex,
    bar_value: Regex
}


impl Default for Regexes {
    fn default() -> Self {
        Self {
            title: Regex::new("<chart-title>").unwrap(),
            x_label: Regex::new("<x-label>").unwrap(),
            y_label: Regex::new("<y-label>").unwrap(),
            bars: Regex::new("<bars>((.|\n)*)</bars>").unwrap(),
            bar_label: Regex::new("<bar-label>").unwrap(),
            bar_width: Regex::new("<bar-width>").unwrap(),
            bar_value: Regex::new("<bar-value>").unwrap(),
        }
    }
}


fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c)
        }
    }
    escaped
}


impl BarChart {
    /// Bar lengths as a percentage of the longest bar
    fn widths(&self) -> Vec<f64> {
        let max = self.bars
            .iter()
            .map(|bar| OrderedFloat(bar.value))
            .max()
            .map(|x| x.0)
            .unwrap_or(0.0);

        self.bars
            .iter()
            .map(|bar| if max > 0.0 { (bar.value.max(0.0) / max * 100.0).min(100.0) } else { 0.0 })
            .collect()
    }

    pub(super) fn to_html(&self, regexes: &Regexes) -> String {
        macro_rules! sub {
            ($body: expr, $reg: ident, $($arg:tt)*) => {
                regexes.$reg.replace_all(&$body, $($arg)*)
            };
        }

        let title = escape_html(&self.title);
        let body = sub!(BAR_CHART_HTML, title, NoExpand(&title));
        let body = sub!(body, x_label, NoExpand(&escape_html(&self.x_label)));
        let body = sub!(body, y_label, NoExpand(&escape_html(&self.y_label)));
        let widths = self.widths();
        let body = sub!(body, bars, |c: &Captures| {
            let row = c.get(1).map(|m| m.as_str()).unwrap_or_default();
            self.bars
                .iter()
                .zip(&widths)
                .map(|(bar, width)| {
                    let label = escape_html(&bar.label);
                    let row = sub!(row, bar_label, NoExpand(&label));
                    let row = sub!(row, bar_width, NoExpand(&format!("{width:.2}")));
                    let row = sub!(row, bar_value, NoExpand(&escape_html(&bar.display)));
                    row.into_owned()
                })
                .collect::<String>()
        });
        body.into_owned()
    }

    /// Writes the chart to a temp file that is deleted when the handle is dropped
    fn write_html(&self, regexes: &Regexes) -> anyhow::Result<NamedTempFile> {
        let mut file = tempfile::Builder::new()
            .prefix("job-market-")
            .suffix(".html")
            .tempfile()
            .context("Failed to create a temp file for the chart")?;
        file.write_all(self.to_html(regexes).as_bytes())?;
        file.flush()?;
        Ok(file)
    }

    /// Opens the chart in a browser window and waits for the user to dismiss it.
    ///
    /// If `pdf_path` is given the chart is also printed there.
    pub(super) fn show(&self, regexes: &Regexes, pdf_path: Option<&Path>) -> anyhow::Result<()> {
        let html = self.write_html(regexes)?;
        Self::display(html.path(), pdf_path)
    }

    fn display(html_path: &Path, pdf_path: Option<&Path>) -> anyhow::Result<()> {
        if let Some(pdf_path) = pdf_path {
            let printer = BrowserSession::launch(true, CHART_LOAD_TIMEOUT)?;
            printer.show_file(html_path)?;
            if let Some(parent) = pdf_path.parent() {
                std::fs::create_dir_all(parent)
                    .context("Failed to create the chart directory. Do we have permissions?")?;
            }
            std::fs::write(pdf_path, printer.print_to_pdf()?)?;
            info!("Chart saved to {}", pdf_path.display());
        }

        let window = BrowserSession::launch(false, CHART_LOAD_TIMEOUT)?;
        window.show_file(html_path)?;
        dialoguer::Input::<String>::new()
            .with_prompt("Press Enter to close the chart")
            .allow_empty(true)
            .interact_text()?;
        Ok(())
    }
}
