#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Terminal front end for the shade map filtering pipeline.
//!
//! Loads the datasets named by the catalog, drives the dashboard core
//! headlessly, and prints what the map would render: filtered layer
//! summaries, neighborhood scope changes, and per-segment detail
//! panels. Useful for checking a data drop or a threshold combination
//! without starting the web frontend.

mod terminal;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use shade_map_dashboard::Dashboard;
use shade_map_dashboard::state::SentinelPolicy;
use shade_map_datasets::catalog::DatasetCatalog;
use shade_map_datasets::store::FileStore;
use shade_map_geocoder::{DEFAULT_BASE_URL, GeocodeService, NominatimClient};

use crate::terminal::{TerminalCharts, TerminalSurface};

#[derive(Parser)]
#[command(name = "shade-map", about = "Pedestrian heat-risk street dashboard")]
struct Args {
    /// Data directory containing the catalog's GeoJSON files.
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Catalog TOML overriding the embedded default.
    #[arg(long)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Filter the street network and print a layer summary.
    Summary {
        /// Minimum sun-exposure percentage (0-100).
        #[arg(long, default_value_t = 0.0)]
        shade_min: f64,
        /// Minimum comfort index.
        #[arg(long, default_value_t = 0.0)]
        comfort_min: f64,
        /// Restrict to one neighborhood code.
        #[arg(long)]
        neighborhood: Option<String>,
        /// Drop segments without a comfort measurement.
        #[arg(long)]
        exclude_unmeasured: bool,
        /// Show the cluster overlay.
        #[arg(long)]
        clusters: bool,
    },
    /// Print the detail panel for one segment of the filtered set.
    Inspect {
        /// Index into the filtered segment list.
        segment: usize,
        #[arg(long, default_value_t = 0.0)]
        shade_min: f64,
        #[arg(long, default_value_t = 0.0)]
        comfort_min: f64,
        #[arg(long)]
        neighborhood: Option<String>,
    },
    /// List neighborhoods in selection order.
    Neighborhoods,
    /// Search for a place and print the matched coordinate.
    Search {
        /// Free-text query.
        query: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let args = Args::parse();

    let catalog = match &args.catalog {
        Some(path) => DatasetCatalog::from_path(path)?,
        None => DatasetCatalog::default_catalog(),
    };
    let store = FileStore::new(args.data_dir.clone(), catalog);

    match args.command {
        Command::Summary {
            shade_min,
            comfort_min,
            neighborhood,
            exclude_unmeasured,
            clusters,
        } => {
            let mut dashboard = load_dashboard(&store).await?;
            let mut surface = TerminalSurface::default();
            dashboard.init(&mut surface);

            if exclude_unmeasured {
                dashboard.set_sentinel_policy(SentinelPolicy::Exclude, &mut surface);
            }
            dashboard.set_shade_threshold(shade_min, &mut surface);
            dashboard.set_comfort_threshold(comfort_min, &mut surface);
            if let Some(code) = neighborhood {
                dashboard
                    .select_neighborhood(&code, &store, &mut surface)
                    .await?;
            }
            if clusters {
                dashboard.toggle_clusters(true, &mut surface);
            }
        }
        Command::Inspect {
            segment,
            shade_min,
            comfort_min,
            neighborhood,
        } => {
            let mut dashboard = load_dashboard(&store).await?;
            let mut surface = TerminalSurface::default();
            dashboard.init(&mut surface);
            dashboard.set_shade_threshold(shade_min, &mut surface);
            dashboard.set_comfort_threshold(comfort_min, &mut surface);
            if let Some(code) = neighborhood {
                dashboard
                    .select_neighborhood(&code, &store, &mut surface)
                    .await?;
            }

            let mut charts = TerminalCharts;
            if dashboard.select_segment(segment, &mut charts).is_none() {
                eprintln!(
                    "No segment {segment} in the filtered set ({} segments)",
                    surface.last_layer_size
                );
                std::process::exit(1);
            }
        }
        Command::Neighborhoods => {
            let dashboard = load_dashboard(&store).await?;
            for (index, neighborhood) in dashboard.neighborhoods().iter().enumerate() {
                println!("{index:>3}  {} ({})", neighborhood.name, neighborhood.code);
            }
        }
        Command::Search { query } => {
            let client = reqwest::Client::builder()
                .user_agent("shade-map-cli")
                .build()?;
            let geocoder = NominatimClient::new(client, DEFAULT_BASE_URL.to_string());
            match geocoder.search(&query).await? {
                Some(place) => println!(
                    "{} -> ({:.4}, {:.4}){}",
                    query,
                    place.latitude,
                    place.longitude,
                    place
                        .display_name
                        .map(|name| format!(" {name}"))
                        .unwrap_or_default()
                ),
                None => println!("No matching results found."),
            }
        }
    }

    Ok(())
}

async fn load_dashboard(store: &FileStore) -> Result<Dashboard, Box<dyn std::error::Error>> {
    let data = shade_map_datasets::load_initial(store).await?;
    Ok(Dashboard::new(data))
}
