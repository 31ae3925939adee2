use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand, ValueEnum};
use property_seo::models::{PropertyType, SeoPageFilters};
use property_seo::search::{SearchParser, SearchParserOptions};
use property_seo::seo::opportunity::DEFAULT_MIN_LISTINGS;
use property_seo::seo::sitemap::{
    listings_sitemap, locations_sitemap, seo_pages_sitemap, sitemap_index, SITEMAP_FILES,
};
use property_seo::seo::{
    find_opportunities, generate_seo_url, missing_pages, page_title, parse_seo_url, recount_pages,
};
use property_seo::slug::listing_url;
use property_seo::sources::{JsonFileSource, ListingSource, SourceParams, SupabaseSource};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

const DEFAULT_SITE_URL: &str = "https://property.com.ve";

#[derive(Debug, Parser)]
#[command(name = "property-seo", version, about = "SEO URLs, sitemaps and page discovery for property listings")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Where listings and stored pages come from
#[derive(Debug, Args)]
pub struct DataArgs {
    /// Listings exported as a JSON array
    #[arg(long)]
    listings: Option<PathBuf>,

    /// Stored SEO pages exported as a JSON array
    #[arg(long)]
    pages: Option<PathBuf>,

    /// Read from the hosted backend instead of files
    #[arg(long)]
    remote: bool,

    #[arg(long, env = "SUPABASE_URL", default_value = "http://localhost:54321")]
    supabase_url: String,

    #[arg(long, env = "SUPABASE_ANON_KEY", default_value = "", hide_env_values = true)]
    supabase_key: String,
}

impl DataArgs {
    fn source(&self) -> Result<Box<dyn ListingSource>> {
        let source: Box<dyn ListingSource> = if self.remote {
            Box::new(SupabaseSource::new(SourceParams {
                base_url: self.supabase_url.clone(),
                api_key: self.supabase_key.clone(),
                ..Default::default()
            })?)
        } else {
            Box::new(JsonFileSource::new(
                self.listings.clone(),
                self.pages.clone(),
            ))
        };

        info!("Reading data from {}", source.source_name());
        Ok(source)
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SitemapKind {
    SeoPages,
    Listings,
    /// State, city and per-type search pages
    Locations,
    /// Index pointing at the other sitemaps
    Index,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Decode a flat SEO URL into filters
    Parse { url: String },

    /// Build the flat SEO URL and title for a set of filters
    Generate {
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        state: Option<String>,
        #[arg(long = "type")]
        property_type: Option<PropertyType>,
        #[arg(long)]
        bedrooms: Option<u32>,
    },

    /// Print the detail page path of every listing
    ListingUrls {
        #[command(flatten)]
        data: DataArgs,
    },

    /// List landing pages the current listings could support
    Opportunities {
        #[command(flatten)]
        data: DataArgs,
        #[arg(long, default_value_t = DEFAULT_MIN_LISTINGS)]
        min_listings: u32,
        /// Only show pages that aren't stored yet
        #[arg(long)]
        missing_only: bool,
    },

    /// Show stored pages whose listing count is out of date
    Recount {
        #[command(flatten)]
        data: DataArgs,
    },

    /// Write a sitemap
    Sitemap {
        #[command(flatten)]
        data: DataArgs,
        #[arg(long, value_enum)]
        kind: SitemapKind,
        #[arg(long, env = "SITE_URL", default_value = DEFAULT_SITE_URL)]
        site_url: String,
        /// Output file; stdout when omitted
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Parse a free-text search query
    Search {
        #[arg(required = true)]
        query: Vec<String>,
        /// Also extract bedroom and bathroom counts
        #[arg(long)]
        rooms: bool,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

impl Command {
    pub async fn run(self) -> Result<()> {
        match self {
            Command::Parse { url } => print_json(&parse_seo_url(&url)),

            Command::Generate {
                city,
                state,
                property_type,
                bedrooms,
            } => {
                let filters = SeoPageFilters {
                    city,
                    state,
                    property_type,
                    bedrooms,
                };
                println!("{}", generate_seo_url(&filters));
                println!("{}", page_title(&filters));
                Ok(())
            }

            Command::ListingUrls { data } => {
                let listings = data.source()?.fetch_listings().await?;
                for listing in &listings {
                    println!("{}", listing_url(listing));
                }
                Ok(())
            }

            Command::Opportunities {
                data,
                min_listings,
                missing_only,
            } => {
                let source = data.source()?;
                let listings = source.fetch_listings().await?;
                let mut opportunities = find_opportunities(&listings, min_listings);

                if missing_only {
                    let pages = source.fetch_pages().await?;
                    opportunities = missing_pages(&opportunities, &pages);
                    info!("{} pages not stored yet", opportunities.len());
                }

                print_json(&opportunities)
            }

            Command::Recount { data } => {
                let source = data.source()?;
                let pages = source.fetch_pages().await?;
                let listings = source.fetch_listings().await?;
                print_json(&recount_pages(&pages, &listings))
            }

            Command::Sitemap {
                data,
                kind,
                site_url,
                out,
            } => {
                let xml = match kind {
                    SitemapKind::SeoPages => {
                        seo_pages_sitemap(&site_url, &data.source()?.fetch_pages().await?)
                    }
                    SitemapKind::Listings => {
                        listings_sitemap(&site_url, &data.source()?.fetch_listings().await?)
                    }
                    SitemapKind::Locations => {
                        let listings = data.source()?.fetch_listings().await?;
                        locations_sitemap(&site_url, &listings, Utc::now())
                    }
                    SitemapKind::Index => sitemap_index(&site_url, &SITEMAP_FILES, Utc::now()),
                };

                match out {
                    Some(path) => {
                        tokio::fs::write(&path, xml)
                            .await
                            .with_context(|| format!("Failed to write {}", path.display()))?;
                        info!("💾 Saved sitemap to {}", path.display());
                    }
                    None => print!("{}", xml),
                }
                Ok(())
            }

            Command::Search { query, rooms } => {
                let parser = SearchParser::with_options(SearchParserOptions {
                    extract_rooms: rooms,
                })?;
                print_json(&parser.parse(&query.join(" ")))
            }
        }
    }
}
