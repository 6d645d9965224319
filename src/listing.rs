use std::{fs::File, path::Path};

use anyhow::Context;
use serde::{Deserialize, Serialize};

pub(crate) const NOT_AVAILABLE: &str = "N/A";
pub(crate) const DEFAULT_JOB_TYPE: &str = "Part-Time";
pub(crate) const DEFAULT_DESCRIPTION: &str = "No Description.";


/// One job posting as it appears on a search results page.
///
/// Every field is always present. Fields that could not be found on the card
/// hold a placeholder instead of being left empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Listing {
    #[serde(rename = "Job Title")]
    pub(crate) title: String,
    /// Full-time, part-time, etc.
    ///
    /// Falls back to `Part-Time` when the card carries no job type, which
    /// cannot be told apart from a real part-time posting.
    #[serde(rename = "Job Type")]
    pub(crate) job_type: String,
    #[serde(rename = "Location")]
    pub(crate) location: String,
    /// Salary exactly as the site prints it, eg. `₹20,000 - ₹30,000 a month`
    #[serde(rename = "Salary")]
    pub(crate) salary: String,
    /// Text of the first bullet list on the card
    #[serde(rename = "Description")]
    pub(crate) description: String,
    #[serde(rename = "Link")]
    pub(crate) link: String
}


impl Default for Listing {
    fn default() -> Self {
        Self {
            title: NOT_AVAILABLE.into(),
            job_type: DEFAULT_JOB_TYPE.into(),
            location: NOT_AVAILABLE.into(),
            salary: NOT_AVAILABLE.into(),
            description: DEFAULT_DESCRIPTION.into(),
            link: NOT_AVAILABLE.into()
        }
    }
}


impl Listing {
    /// True if the salary column holds something worth parsing
    pub(crate) fn has_salary(&self) -> bool {
        let salary = self.salary.trim();
        !salary.is_empty() && salary != NOT_AVAILABLE
    }
}


/// Overwrites `path` with a header row followed by one row per listing
pub(crate) fn write_listings(path: &Path, listings: &[Listing]) -> anyhow::Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = csv::Writer::from_writer(file);

    if listings.is_empty() {
        // serialize only emits the header alongside the first row
        writer.write_record(["Job Title", "Job Type", "Location", "Salary", "Description", "Link"])?;
    }
    for listing in listings {
        writer.serialize(listing)?;
    }
    writer.flush()?;
    Ok(())
}


pub(crate) fn read_listings(path: &Path) -> anyhow::Result<Vec<Listing>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open {}. Did you run the collect step first?", path.display()))?;
    let mut reader = csv::Reader::from_reader(file);

    reader
        .deserialize()
        .collect::<Result<Vec<Listing>, _>>()
        .with_context(|| format!("{} is not a valid listings file", path.display()))
}
