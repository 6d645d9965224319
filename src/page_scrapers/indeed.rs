use anyhow::Context;
use scraper::{ElementRef, Selector};

use crate::listing::{Listing, DEFAULT_DESCRIPTION, DEFAULT_JOB_TYPE, NOT_AVAILABLE};

use super::{element_text, parse_selector, ListingScraper};

const CARD_CSS: &str = "div.job_seen_beacon";


/// A scraper for Indeed search results
pub(crate) struct IndeedScraper {
    /// Scheme and host that relative listing links are resolved against
    origin: String,
    card: Selector,
    title: Selector,
    job_type: Selector,
    location: Selector,
    salary: Selector,
    attribute_snippet: Selector,
    description: Selector,
    link: Selector
}


impl IndeedScraper {
    pub(crate) fn new(origin: &str) -> anyhow::Result<Self> {
        Ok(Self {
            origin: origin.trim_end_matches('/').to_string(),
            card: parse_selector(CARD_CSS)?,
            title: parse_selector("h2.jobTitle")?,
            // Class lists are matched exactly, not as a set
            job_type: parse_selector("li[class=\"metadata css-1f4kgma eu4oa1w0\"]")?,
            location: parse_selector("div[data-testid=\"text-location\"]")?,
            salary: parse_selector("div[class=\"metadata salary-snippet-container css-1f4kgma eu4oa1w0\"]")?,
            attribute_snippet: parse_selector("div[data-testid=\"attribute_snippet_testid\"]")?,
            description: parse_selector("ul")?,
            link: parse_selector("a[href]")?
        })
    }

    fn find<'a>(card: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
        card.select(selector).next()
    }

    /// Text of the attribute snippet inside a metadata element, if that element exists.
    ///
    /// A metadata element without a snippet is a layout we do not understand, so it fails the card.
    fn snippet(&self, card: ElementRef, metadata: &Selector, field: &str) -> anyhow::Result<Option<String>> {
        let Some(element) = Self::find(card, metadata) else {
            return Ok(None);
        };
        let snippet = Self::find(element, &self.attribute_snippet)
            .with_context(|| format!("{field} metadata has no attribute snippet"))?;
        Ok(Some(element_text(snippet)))
    }
}


impl ListingScraper for IndeedScraper {
    const NAME: &'static str = "indeed";

    fn card_css(&self) -> &str {
        CARD_CSS
    }

    fn card_selector(&self) -> &Selector {
        &self.card
    }

    fn scrape_card(&self, card: ElementRef) -> anyhow::Result<Listing> {
        let text_or = |selector: &Selector, placeholder: &str| {
            Self::find(card, selector)
                .map(element_text)
                .unwrap_or_else(|| placeholder.to_string())
        };

        let link = Self::find(card, &self.link)
            .and_then(|a| a.value().attr("href"))
            .map(|href| format!("{}{href}", self.origin))
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());

        Ok(Listing {
            title: text_or(&self.title, NOT_AVAILABLE),
            job_type: self.snippet(card, &self.job_type, "Job type")?.unwrap_or_else(|| DEFAULT_JOB_TYPE.to_string()),
            location: text_or(&self.location, NOT_AVAILABLE),
            salary: self.snippet(card, &self.salary, "Salary")?.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            description: text_or(&self.description, DEFAULT_DESCRIPTION),
            link
        })
    }
}
