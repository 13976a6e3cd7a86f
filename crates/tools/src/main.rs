use std::path::PathBuf;

use clap::{Parser, Subcommand};
use engine::Camera;
use listings::{FetchOutcome, HttpListingSource, Listing, ViewportFetcher};
use serde_json::json;
use tools::{OfflineScene, parse_bbox, parse_lng_lat};
use tracing_subscriber::EnvFilter;
use viewer::ViewerConfig;

#[derive(Parser, Debug)]
#[command(author, version, about = "Offline tools for the listing map viewer")]
struct Args {
    /// Viewer config (TOML). `ESTATE_*` environment variables override it.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the ids of buildings that hold at least one listing.
    Match {
        /// Listings as a JSON array, in the listing endpoint's shape.
        #[arg(long)]
        listings: PathBuf,
        /// Building footprints as a GeoJSON FeatureCollection.
        #[arg(long)]
        buildings: PathBuf,
        #[arg(long, default_value_t = 17.0)]
        zoom: f64,
    },
    /// Click at `--at lng,lat` and print the selected listings.
    Select {
        #[arg(long)]
        listings: PathBuf,
        #[arg(long)]
        buildings: PathBuf,
        #[arg(long)]
        at: String,
        #[arg(long, default_value_t = 17.0)]
        zoom: f64,
    },
    /// Query a listing endpoint for `--bbox west,south,east,north`.
    Fetch {
        #[arg(long)]
        bbox: String,
        /// Endpoint base URL; defaults to the configured one.
        #[arg(long)]
        api: Option<String>,
        /// How many listings to print.
        #[arg(long, default_value_t = 10)]
        show: usize,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = real_main().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn real_main() -> Result<(), String> {
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => ViewerConfig::load(path),
        None => ViewerConfig::from_env(),
    }
    .map_err(|e| format!("invalid config: {e}"))?;

    match args.command {
        Command::Match {
            listings,
            buildings,
            zoom,
        } => {
            let scene = OfflineScene::load(&listings, &buildings, config)?
                .with_zoom(zoom)
                .centered_on_listings();
            let ids = scene.matched_buildings()?;
            eprintln!(
                "{} listings placed on {} buildings",
                scene.listings().len(),
                ids.len()
            );
            print_json(&json!({ "buildings": ids }))
        }
        Command::Select {
            listings,
            buildings,
            at,
            zoom,
        } => {
            let at = parse_lng_lat(&at)?;
            let scene = OfflineScene::load(&listings, &buildings, config)?
                .with_camera(Camera::new(at, zoom));
            match scene.select_at(at)? {
                Some(selection) => print_json(&json!({
                    "building": selection.building,
                    "coordinates": selection.coordinates,
                    "tier": format!("{:?}", selection.tier),
                    "listings": selection.matched_listings,
                })),
                None => {
                    eprintln!("no building or marker under {}, {}", at.lng, at.lat);
                    Ok(())
                }
            }
        }
        Command::Fetch { bbox, api, show } => {
            let bounds = parse_bbox(&bbox)?;
            let base = api.unwrap_or_else(|| config.api_base_url.clone());
            let fetcher = ViewportFetcher::new(HttpListingSource::new(base), config.locale.clone());
            match fetcher.fetch(bounds).await {
                FetchOutcome::Replaced(listings) => {
                    print_summary(&listings, show);
                    Ok(())
                }
                FetchOutcome::Skipped => Err("fetch skipped: another fetch in flight".to_string()),
                FetchOutcome::Failed(e) => Err(format!("fetch failed: {e}")),
            }
        }
    }
}

fn print_json(value: &serde_json::Value) -> Result<(), String> {
    let text = serde_json::to_string_pretty(value).map_err(|e| format!("encode output: {e}"))?;
    println!("{text}");
    Ok(())
}

fn print_summary(listings: &[Listing], show: usize) {
    println!("{} listings", listings.len());
    for l in listings.iter().take(show) {
        println!(
            "  #{:<8} {:>12} TL  {:<10} {:<6} {}",
            l.id, l.price, l.property_type, l.room_count, l.address
        );
    }
    if listings.len() > show {
        println!("  ... {} more", listings.len() - show);
    }
}
