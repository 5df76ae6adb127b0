// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Set up logging (stderr, filtered by RUST_LOG)
// 2. Parse command-line arguments using clap
// 3. Dispatch to the appropriate subcommand handler
// 4. Print results as a table, plain text or JSON
// 5. Exit with proper code (0 = success, 2 = error)
// =============================================================================

mod cli;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use link_scout::crawl::{CrawlReport, DepthCrawler, Fetcher, FetcherConfig};
use link_scout::extract::{
    clean_page_text, find_cookie_consent_candidates, find_pagination_candidates, interactive_elements_html,
};
use link_scout::urls::is_web_url;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    init_logging();

    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Logs go to stderr so that --json output on stdout stays parseable
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Crawl {
            url,
            max_depth,
            delay,
            core_usage,
            concurrency,
            timeout,
            include_external,
            json,
        } => {
            let config = FetcherConfig {
                delay: Duration::try_from_secs_f64(delay).map_err(|e| anyhow!("Invalid --delay {}: {}", delay, e))?,
                max_concurrent: concurrency,
                core_usage,
                timeout: Duration::from_secs(timeout),
                ..FetcherConfig::default()
            };
            handle_crawl(&url, max_depth, &config, include_external, json).await
        }
        Commands::Pagination { source, max_candidates, json } => {
            let (html, _) = load_source(&source, None).await?;
            print_snippets(&find_pagination_candidates(&html, max_candidates), json)?;
            Ok(0)
        }
        Commands::Cookies { source, max_candidates, json } => {
            let (html, _) = load_source(&source, None).await?;
            print_snippets(&find_cookie_consent_candidates(&html, max_candidates), json)?;
            Ok(0)
        }
        Commands::Text {
            source,
            base_url,
            max_chars,
            no_links,
        } => {
            let (html, base_url) = load_source(&source, base_url.as_deref()).await?;
            println!("{}", clean_page_text(&html, &base_url, !no_links, max_chars));
            Ok(0)
        }
        Commands::Structure { source, max_chars } => {
            let (html, _) = load_source(&source, None).await?;
            println!("{}", interactive_elements_html(&html, max_chars));
            Ok(0)
        }
    }
}

// Handles the 'crawl' subcommand
async fn handle_crawl(
    url: &str,
    max_depth: usize,
    config: &FetcherConfig,
    include_external: bool,
    json: bool,
) -> Result<i32> {
    let fetcher = Fetcher::new(config)?;

    if !json {
        println!("🔍 Crawling website: {}", url);
        println!("📊 Max crawl depth: {}", max_depth);
        println!("⏱️  Request delay: {:.2}s", config.delay.as_secs_f64());
        println!("🧵 Concurrent requests: {}", fetcher.concurrency());
    }
    let report = DepthCrawler::new(&fetcher, max_depth)
        .include_external(include_external)
        .crawl(url)
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_table(&report);
    }
    Ok(0)
}

// Reads a page from an http(s) URL or a local file.
// Returns the HTML and the URL relative links resolve against: the page URL
// itself, or `base_url` for a local file (empty when not given).
async fn load_source(source: &str, base_url: Option<&str>) -> Result<(String, String)> {
    if is_web_url(source) {
        let fetcher = Fetcher::new(&FetcherConfig {
            delay: Duration::ZERO,
            ..FetcherConfig::default()
        })?;
        let body = fetcher
            .try_fetch(source)
            .await
            .with_context(|| format!("Failed to fetch {}", source))?;
        return Ok((String::from_utf8_lossy(&body).into_owned(), source.to_string()));
    }

    let html = tokio::fs::read_to_string(source)
        .await
        .with_context(|| format!("Failed to read {}", source))?;

    let base_url = match base_url {
        Some(base) if !is_web_url(base) => return Err(anyhow!("Invalid --base-url '{}'", base)),
        Some(base) => base.to_string(),
        None => String::new(),
    };
    Ok((html, base_url))
}

fn print_snippets(snippets: &[String], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(snippets)?);
        return Ok(());
    }

    if snippets.is_empty() {
        println!("No candidates found");
        return Ok(());
    }
    for (i, snippet) in snippets.iter().enumerate() {
        println!("--- candidate {} ---", i + 1);
        println!("{}", snippet);
    }
    Ok(())
}

// Prints the link registry as a human-readable table
fn print_table(report: &CrawlReport) {
    if report.links.is_empty() {
        println!("No links found");
        print_summary(report);
        return;
    }

    println!("{:<70} {:<6} {:<8} {:<30}", "URL", "DEPTH", "PAGES", "TEXT");
    println!("{}", "=".repeat(116));

    for record in report.links.iter() {
        // Truncate URL if too long for display
        let url_display = if record.url.chars().count() > 67 {
            format!("{}...", record.url.chars().take(67).collect::<String>())
        } else {
            record.url.clone()
        };
        let text = record
            .associated_texts
            .iter()
            .find(|t| !t.is_empty())
            .map(String::as_str)
            .unwrap_or("");

        println!(
            "{:<70} {:<6} {:<8} {:<30}",
            url_display,
            record.depth_found,
            record.found_on_urls.len(),
            text
        );
    }

    println!();
    print_summary(report);
}

fn print_summary(report: &CrawlReport) {
    println!("📊 Summary:");
    println!("   📄 Pages crawled: {}", report.visited.len());
    println!("   ❌ Failed: {}", report.failed.len());
    println!("   🔗 Unique links: {}", report.links.len());
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn saved_page(name: &str, html: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("link-scout-{}-{}.html", name, std::process::id()));
        tokio::fs::write(&path, html).await.unwrap();
        path
    }

    #[tokio::test]
    async fn test_local_file_resolves_against_base_url() {
        let path = saved_page("base", r#"<p><a href="/calls">open calls</a></p>"#).await;
        let source = path.to_string_lossy();

        let (html, base) = load_source(&source, Some("https://example.com/funding/")).await.unwrap();
        assert_eq!(base, "https://example.com/funding/");
        assert_eq!(
            clean_page_text(&html, &base, true, None),
            "open calls [URL: https://example.com/calls]"
        );

        let (_, none) = load_source(&source, None).await.unwrap();
        assert_eq!(none, "");

        assert!(load_source(&source, Some("not a url")).await.is_err());
        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        assert!(load_source("/nonexistent/link-scout/page.html", None).await.is_err());
    }
}
