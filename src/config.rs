use std::{fs, path::{Path, PathBuf}};

use anyhow::Context;
use serde::Deserialize;
use tracing::info;
use validator::Validate;

pub(super) const DEFAULT_CONFIG_PATH: &str = "config.toml";
const DEFAULT_BASE_URL: &str = "https://in.indeed.com/jobs?q=software+developer&l=Mumbai%2C+Maharashtra&from=searchOnDesktopSerp&vjk=cb692d426e5bf938";
const DEFAULT_SITE_ORIGIN: &str = "https://www.indeed.com";


/// Settings shared by every stage, read from `config.toml`.
///
/// Every key is optional. A missing file is the same as an empty one.
#[derive(Debug, Deserialize, Validate)]
#[serde(default, deny_unknown_fields)]
pub(super) struct Config {
    /// The search results page to start from, without a `start` parameter.
    #[validate(url)]
    pub(super) base_url: String,
    /// Prefixed to the relative link on each listing.
    #[validate(url)]
    pub(super) site_origin: String,
    /// Where the collector writes listings and the reports read them from.
    pub(super) output_file: PathBuf,
    /// How long to wait for listings to render before giving up on a page.
    #[validate(range(min = 1))]
    pub(super) wait_timeout_secs: u64,
    /// Set to false to watch the collector drive the browser.
    pub(super) headless: bool,
    /// How many titles the frequency report shows.
    #[validate(range(min = 1))]
    pub(super) top_titles: usize,
    /// If set, every chart is also saved here as a PDF.
    pub(super) chart_dir: Option<PathBuf>
}


impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            site_origin: DEFAULT_SITE_ORIGIN.into(),
            output_file: "jobs.csv".into(),
            wait_timeout_secs: 10,
            headless: true,
            top_titles: 10,
            chart_dir: None
        }
    }
}


impl Config {
    pub(super) fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            info!("{} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        let config = fs::read_to_string(path)?;
        Self::from_toml(&config).with_context(|| format!("Invalid config in {}", path.display()))
    }

    fn from_toml(text: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }
}
