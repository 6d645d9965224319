use std::path::Path;

use fxhash::FxHashMap;
use tracing::{info, warn};

use crate::{listing::{read_listings, Listing, NOT_AVAILABLE}, salary::extract_average_salary};

use self::chart::{Bar, BarChart, Regexes};

mod chart;


/// `(title, normalized salary)` for every listing that has a salary, in file order.
///
/// Listings without a salary are left out rather than counted as zero.
pub(super) fn salary_points(listings: &[Listing]) -> Vec<(String, f64)> {
    listings
        .iter()
        .filter(|listing| listing.has_salary())
        .map(|listing| (listing.title.clone(), extract_average_salary(&listing.salary)))
        .collect()
}


/// The `n` most common titles with their counts, most common first.
///
/// Titles with the same count keep the order they first appear in. Listings
/// without a title are not counted.
pub(super) fn top_titles(listings: &[Listing], n: usize) -> Vec<(String, usize)> {
    let mut first_seen = FxHashMap::<&str, usize>::default();
    let mut counts: Vec<(&str, usize)> = Vec::new();

    for listing in listings {
        let title = listing.title.as_str();
        if title.trim().is_empty() || title == NOT_AVAILABLE {
            continue;
        }
        match first_seen.get(title) {
            Some(&i) => counts[i].1 += 1,
            None => {
                first_seen.insert(title, counts.len());
                counts.push((title, 1));
            }
        }
    }

    // Stable, so ties stay in order of first appearance
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .take(n)
        .map(|(title, count)| (title.to_string(), count))
        .collect()
}


/// Charts the normalized salary of every listing in `csv_path`
pub(super) fn salary_report(csv_path: &Path, chart_dir: Option<&Path>) -> anyhow::Result<()> {
    let listings = read_listings(csv_path)?;
    let points = salary_points(&listings);
    info!("{} of {} listings have a salary", points.len(), listings.len());
    if points.is_empty() {
        warn!("No salaries to chart");
        return Ok(());
    }

    let chart = BarChart {
        title: "Average Salary for Different Job Titles".into(),
        x_label: "Average Salary (₹)".into(),
        y_label: "Job Title".into(),
        bars: points
            .into_iter()
            .map(|(title, salary)| Bar { label: title, value: salary, display: format!("{salary:.0}") })
            .collect()
    };
    let pdf_path = chart_dir.map(|dir| dir.join("average_salary.pdf"));
    chart.show(&Regexes::default(), pdf_path.as_deref())
}


/// Charts how often the most common titles in `csv_path` were posted
pub(super) fn title_report(csv_path: &Path, n: usize, chart_dir: Option<&Path>) -> anyhow::Result<()> {
    let listings = read_listings(csv_path)?;
    let top = top_titles(&listings, n);
    if top.is_empty() {
        warn!("No listings in {}", csv_path.display());
        return Ok(());
    }
    for (title, count) in &top {
        info!("{count:>4}  {title}");
    }

    let chart = BarChart {
        title: format!("Top {n} Job Postings by Job Title"),
        x_label: "Number of Postings".into(),
        y_label: "Job Title".into(),
        bars: top
            .into_iter()
            .map(|(title, count)| Bar { label: title, value: count as f64, display: count.to_string() })
            .collect()
    };
    let pdf_path = chart_dir.map(|dir| dir.join("top_titles.pdf"));
    chart.show(&Regexes::default(), pdf_path.as_deref())
}
