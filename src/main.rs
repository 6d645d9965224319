use std::{path::PathBuf, time::Duration};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

use crate::{
    browser::BrowserSession,
    config::{Config, DEFAULT_CONFIG_PATH},
    listing::write_listings,
    page_scrapers::{collect_listings, IndeedScraper}
};

mod browser;
mod config;
mod listing;
mod page_scrapers;
mod reports;
mod salary;


/// Scrapes job listings into a CSV file and charts what was found
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Path to the config file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command
}


#[derive(Subcommand)]
enum Command {
    /// Scrape results pages into the listings file
    Collect {
        /// Number of results pages to scrape. Asked for if not given.
        #[arg(long)]
        pages: Option<usize>
    },
    /// Chart the average salary of each listing
    Salaries,
    /// Chart the most frequently posted job titles
    Titles
}


/// Anything but a whole number ends the run
fn parse_page_count(answer: &str) -> anyhow::Result<usize> {
    answer
        .trim()
        .parse()
        .with_context(|| format!("{answer:?} is not a whole number of pages"))
}


fn collect(config: &Config, pages: Option<usize>) -> anyhow::Result<()> {
    let pages = match pages {
        Some(pages) => pages,
        None => {
            let answer = dialoguer::Input::<String>::new()
                .with_prompt("Enter the # of pages to scrape")
                .interact_text()?;
            parse_page_count(&answer)?
        }
    };
    let base_url = Url::parse(&config.base_url)?;
    let scraper = IndeedScraper::new(&config.site_origin)?;

    let listings = {
        let mut session = BrowserSession::launch(
            config.headless,
            Duration::from_secs(config.wait_timeout_secs)
        )?;
        collect_listings(&mut session, &scraper, &base_url, pages)
    };

    write_listings(&config.output_file, &listings)?;
    info!("{} listings have been saved to {}", listings.len(), config.output_file.display());
    Ok(())
}


fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,headless_chrome=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;

    match cli.command {
        Command::Collect { pages } => collect(&config, pages),
        Command::Salaries => reports::salary_report(&config.output_file, config.chart_dir.as_deref()),
        Command::Titles => reports::title_report(&config.output_file, config.top_titles, config.chart_dir.as_deref())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_count_must_be_a_whole_number() {
        assert_eq!(parse_page_count("3").unwrap(), 3);
        assert_eq!(parse_page_count(" 12 ").unwrap(), 12);
        assert!(parse_page_count("three").is_err());
        assert!(parse_page_count("2.5").is_err());
        assert!(parse_page_count("-1").is_err());
        assert!(parse_page_count("").is_err());
    }
}
