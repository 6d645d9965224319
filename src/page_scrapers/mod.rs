use anyhow::anyhow;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, warn};
use url::Url;

use crate::listing::Listing;

pub(super) use self::indeed::IndeedScraper;

mod indeed;

/// Listings per results page. The `start` parameter moves in steps of this.
pub(super) const PAGE_SIZE: usize = 10;


/// Something that can turn a URL into rendered HTML.
pub(super) trait PageSource {
    /// Loads `url` and blocks until an element matching `marker` is present.
    ///
    /// Returns Err if the page failed to load or the marker never showed up in time.
    fn load(&mut self, url: &Url, marker: &str) -> anyhow::Result<String>;
}


/// Knows how the listings of one job board are laid out
pub(super) trait ListingScraper {
    const NAME: &'static str;

    /// CSS matching one listing container
    fn card_css(&self) -> &str;

    fn card_selector(&self) -> &Selector;

    /// Extracts a listing from one container.
    ///
    /// Missing fields must be filled with their placeholder. Err is reserved for cards
    /// that are malformed in a way the placeholders cannot cover, and only skips that card.
    fn scrape_card(&self, card: ElementRef) -> anyhow::Result<Listing>;
}


pub(super) fn parse_selector(css: &str) -> anyhow::Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("Invalid selector {css:?}: {e:?}"))
}


/// Trimmed text of every descendant of `element`
pub(super) fn element_text(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}


/// The results page at `offset`, eg. `...&start=20` for the third page
pub(super) fn page_url(base_url: &Url, offset: usize) -> Url {
    let mut url = base_url.clone();
    url.query_pairs_mut().append_pair("start", &offset.to_string());
    url
}


/// `start` values for the first `pages` results pages.
///
/// Stops at the largest offset a `usize` can hold instead of overflowing.
pub(super) fn page_offsets(pages: usize) -> impl Iterator<Item = usize> {
    (0..=usize::MAX).step_by(PAGE_SIZE).take(pages)
}


/// Extracts every listing from one rendered page.
///
/// Returns None if the page has no listing containers at all.
pub(super) fn scrape_page<S: ListingScraper>(scraper: &S, html: &str) -> Option<Vec<Listing>> {
    let document = Html::parse_document(html);
    let mut cards = document.select(scraper.card_selector()).peekable();
    cards.peek()?;

    let listings = cards
        .enumerate()
        .filter_map(|(i, card)| match scraper.scrape_card(card) {
            Ok(listing) => {
                debug!("Card {i}: {}", listing.title);
                Some(listing)
            }
            Err(e) => {
                warn!("Error processing job card {i}: {e:#}");
                None
            }
        })
        .collect();
    Some(listings)
}


/// Walks `pages` results pages starting at `base_url` and gathers their listings in order.
///
/// A page that fails to load or has no listings is logged and skipped.
pub(super) fn collect_listings<S: ListingScraper>(
    source: &mut impl PageSource,
    scraper: &S,
    base_url: &Url,
    pages: usize
) -> Vec<Listing> {
    let mut all_listings = Vec::new();

    for offset in page_offsets(pages) {
        let url = page_url(base_url, offset);
        info!("Scraping page: {url}");

        let html = match source.load(&url, scraper.card_css()) {
            Ok(html) => html,
            Err(e) => {
                warn!("Error loading page: {e:#}");
                continue;
            }
        };

        match scrape_page(scraper, &html) {
            Some(listings) => {
                info!("Found {} listings with {}", listings.len(), S::NAME);
                all_listings.extend(listings);
            }
            None => warn!("No job cards found with {:?}. Skipping.", scraper.card_css())
        }
    }

    all_listings
}


#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    /// Serves canned HTML and remembers what was asked for
    #[derive(Default)]
    struct FakeSource {
        pages: HashMap<String, String>,
        requested: Vec<String>
    }

    impl PageSource for FakeSource {
        fn load(&mut self, url: &Url, _marker: &str) -> anyhow::Result<String> {
            self.requested.push(url.to_string());
            self.pages
                .get(url.as_str())
                .cloned()
                .ok_or_else(|| anyhow!("Timed out waiting for listings"))
        }
    }

    fn card(title: &str) -> String {
        format!(r#"<div class="job_seen_beacon"><h2 class="jobTitle"><a href="/rc/clk?jk={title}"><span>{title}</span></a></h2></div>"#)
    }

    fn base_url() -> Url {
        Url::parse("https://in.indeed.com/jobs?q=software+developer&l=Mumbai").unwrap()
    }

    #[test]
    fn page_urls_step_by_ten() {
        let base = base_url();
        assert_eq!(
            page_url(&base, 0).as_str(),
            "https://in.indeed.com/jobs?q=software+developer&l=Mumbai&start=0"
        );
        assert_eq!(
            page_url(&base, 20).as_str(),
            "https://in.indeed.com/jobs?q=software+developer&l=Mumbai&start=20"
        );
    }

    #[test]
    fn failed_pages_are_skipped() {
        let scraper = IndeedScraper::new("https://www.indeed.com").unwrap();
        let base = base_url();
        let mut source = FakeSource::default();
        source.pages.insert(page_url(&base, 0).to_string(), format!("<html><body>{}{}</body></html>", card("A"), card("B")));
        // offset 10 times out
        source.pages.insert(page_url(&base, 20).to_string(), "<html><body><p>Nothing here</p></body></html>".into());
        source.pages.insert(page_url(&base, 30).to_string(), format!("<html><body>{}</body></html>", card("C")));

        let listings = collect_listings(&mut source, &scraper, &base, 4);

        assert_eq!(source.requested.len(), 4);
        assert!(source.requested[3].ends_with("start=30"));
        let titles: Vec<_> = listings.iter().map(|x| x.title.as_str()).collect();
        assert_eq!(titles, ["A", "B", "C"]);
        assert_eq!(listings[2].link, "https://www.indeed.com/rc/clk?jk=C");
    }

    #[test]
    fn offsets_never_overflow() {
        assert_eq!(page_offsets(3).collect::<Vec<_>>(), [0, 10, 20]);
        assert_eq!(page_offsets(0).count(), 0);

        let last = usize::MAX / PAGE_SIZE;
        assert_eq!(page_offsets(usize::MAX).nth(last), Some(last * PAGE_SIZE));
        assert_eq!(page_offsets(usize::MAX).nth(last + 1), None);
    }

    /// Fails every load and bails out of the run after a few pages
    struct AlwaysTimesOut {
        loads: usize
    }

    impl PageSource for AlwaysTimesOut {
        fn load(&mut self, url: &Url, _marker: &str) -> anyhow::Result<String> {
            self.loads += 1;
            if self.loads > 25 {
                std::panic::panic_any(url.to_string());
            }
            Err(anyhow!("Timed out waiting for listings"))
        }
    }

    #[test]
    fn huge_page_counts_are_walked_lazily() {
        let scraper = IndeedScraper::new("https://www.indeed.com").unwrap();
        let base = base_url();
        let mut source = AlwaysTimesOut { loads: 0 };

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            collect_listings(&mut source, &scraper, &base, usize::MAX / 4)
        }));

        // The only way out is the source giving up, on the 26th page
        let stopped_at = result.unwrap_err().downcast::<String>().unwrap();
        assert!(stopped_at.ends_with("start=250"), "{stopped_at}");
        assert_eq!(source.loads, 26);
    }

    #[test]
    fn zero_pages_loads_nothing() {
        let scraper = IndeedScraper::new("https://www.indeed.com").unwrap();
        let mut source = FakeSource::default();
        assert!(collect_listings(&mut source, &scraper, &base_url(), 0).is_empty());
        assert!(source.requested.is_empty());
    }

    #[test]
    fn page_without_cards_is_none() {
        let scraper = IndeedScraper::new("https://www.indeed.com").unwrap();
        assert!(scrape_page(&scraper, "<html><body><div class=\"other\"></div></body></html>").is_none());
    }

    #[test]
    fn bad_card_does_not_sink_the_page() {
        let scraper = IndeedScraper::new("https://www.indeed.com").unwrap();
        let broken = r#"<div class="job_seen_beacon"><h2 class="jobTitle">Broken</h2><li class="metadata css-1f4kgma eu4oa1w0"></li></div>"#;
        let html = format!("<html><body>{}{broken}{}</body></html>", card("A"), card("B"));

        let listings = scrape_page(&scraper, &html).unwrap();

        let titles: Vec<_> = listings.iter().map(|x| x.title.as_str()).collect();
        assert_eq!(titles, ["A", "B"]);
    }
}
