use std::{path::Path, sync::Arc, time::Duration};

use anyhow::{anyhow, Context};
use headless_chrome::{types::PrintToPdfOptions, Browser, LaunchOptions, Tab};
use tracing::{debug, warn};
use url::Url;

use crate::page_scrapers::PageSource;

/// Chrome is dropped if it goes quiet for this long, which a chart window left open easily does
const IDLE_TIMEOUT: Duration = Duration::from_secs(60 * 60);


/// One Chrome process with a single tab.
///
/// The tab is closed and Chrome is shut down when this is dropped, whichever way
/// the stage that owns it exits.
pub(crate) struct BrowserSession {
    tab: Arc<Tab>,
    wait_timeout: Duration,
    // Dropped after `tab`, killing the process
    _browser: Browser
}


impl BrowserSession {
    pub(crate) fn launch(headless: bool, wait_timeout: Duration) -> anyhow::Result<Self> {
        let options = LaunchOptions::default_builder()
            .headless(headless)
            .idle_browser_timeout(IDLE_TIMEOUT)
            .build()
            .map_err(|e| anyhow!("Invalid browser options: {e}"))?;
        let browser = Browser::new(options).context("Failed to launch Chrome. Is it installed?")?;
        let tab = browser.new_tab()?;
        debug!("Browser session started (headless: {headless})");
        Ok(Self { tab, wait_timeout, _browser: browser })
    }

    /// Opens a local HTML file in the tab
    pub(crate) fn show_file(&self, path: &Path) -> anyhow::Result<()> {
        let url = Url::from_file_path(path)
            .map_err(|_| anyhow!("{} is not an absolute path", path.display()))?;
        self.tab
            .navigate_to(url.as_str())?
            .wait_until_navigated()?;
        Ok(())
    }

    /// Prints whatever the tab is showing
    pub(crate) fn print_to_pdf(&self) -> anyhow::Result<Vec<u8>> {
        self.tab.print_to_pdf(Some(PrintToPdfOptions {
            landscape: Some(true),
            print_background: Some(true),
            ..Default::default()
        }))
    }
}


impl PageSource for BrowserSession {
    fn load(&mut self, url: &Url, marker: &str) -> anyhow::Result<String> {
        self.tab
            .navigate_to(url.as_str())?
            .wait_for_element_with_custom_timeout(marker, self.wait_timeout)
            .with_context(|| format!("{marker:?} did not appear within {:?}", self.wait_timeout))?;
        self.tab.get_content()
    }
}


impl Drop for BrowserSession {
    fn drop(&mut self) {
        if let Err(e) = self.tab.close(false) {
            warn!("Failed to close browser tab: {e}");
        }
        debug!("Browser session closed");
    }
}
