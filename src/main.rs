use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use parkfinder::api::{
    MapboxClient, NominatimClient, OverpassClient, ReverseGeocoder, RouteProvider,
};
use parkfinder::config::FileConfig;
use parkfinder::controller::{Controller, Phase, TapOutcome};
use parkfinder::domain::{GeoPoint, ParkingCandidate, RoutePath, TravelMode};
use parkfinder::geometry::{Region, distance_m, format_distance, simplify_path};
use parkfinder::navigation::deep_link;
use parkfinder::session::{Gesture, HELP, RouteOutcome, Session, SpotDetails};

/// Find parking near a map point and route to it
///
/// Examples:
///   # List parking within 1 km of a point in Budapest
///   parkfinder spots --lat 47.5068 --lon 19.0470
///
///   # Draw a walking route between two points
///   parkfinder route --from-lat 47.50 --from-lon 19.04 --to-lat 47.51 --to-lon 19.05 --mode walking
///
///   # Open directions in a maps app instead
///   parkfinder link --lat 47.51 --lon 19.05
///
///   # Tap, confirm, select and route step by step
///   parkfinder interactive
#[derive(Parser, Debug)]
#[command(name = "parkfinder")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to config file (optional, auto-searches parkfinder.toml if not provided)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List parking spots within 1 km of a point
    Spots {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Fetch a route polyline from the directions service
    Route {
        #[arg(long, allow_hyphen_values = true)]
        from_lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        from_lon: f64,
        #[arg(long, allow_hyphen_values = true)]
        to_lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        to_lon: f64,
        /// Travel mode (defaults to the config file's, else driving)
        #[arg(long)]
        mode: Option<TravelMode>,
        /// Simplify the polyline with this tolerance in meters
        #[arg(long)]
        simplify: Option<f64>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Print a navigation app link to a destination
    Link {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        #[arg(long, allow_hyphen_values = true, requires = "from_lon")]
        from_lat: Option<f64>,
        #[arg(long, allow_hyphen_values = true, requires = "from_lat")]
        from_lon: Option<f64>,
        #[arg(long)]
        mode: Option<TravelMode>,
    },

    /// Drive the map screen with typed gestures
    Interactive {
        #[arg(long)]
        mode: Option<TravelMode>,
        /// Treat every tap as confirmed
        #[arg(long)]
        no_confirm: bool,
    },
}

#[derive(Serialize)]
struct SpotsOutput<'a> {
    origin: GeoPoint,
    region: Option<Region>,
    candidates: &'a [ParkingCandidate],
}

fn main() -> Result<()> {
    let args = Args::parse();

    let file_config = match args.config {
        Some(ref path) => FileConfig::load_from(path)?,
        None => FileConfig::load().unwrap_or_default(),
    };
    let verbose = args.verbose || file_config.verbose;
    init_tracing(verbose);

    match args.command {
        Command::Spots { lat, lon, json } => run_spots(&file_config, GeoPoint::new(lat, lon), json),
        Command::Route {
            from_lat,
            from_lon,
            to_lat,
            to_lon,
            mode,
            simplify,
            json,
        } => run_route(
            &file_config,
            GeoPoint::new(from_lat, from_lon),
            GeoPoint::new(to_lat, to_lon),
            mode.unwrap_or(file_config.mode),
            simplify,
            json,
        ),
        Command::Link {
            lat,
            lon,
            from_lat,
            from_lon,
            mode,
        } => {
            let origin = from_lat.zip(from_lon).map(GeoPoint::from);
            let url = deep_link(
                origin,
                GeoPoint::new(lat, lon),
                mode.unwrap_or(file_config.mode),
            );
            println!("{}", url);
            Ok(())
        }
        Command::Interactive { mode, no_confirm } => {
            run_interactive(&file_config, mode.unwrap_or(file_config.mode), no_confirm)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "parkfinder=debug"
    } else {
        "parkfinder=warn"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run_spots(config: &FileConfig, origin: GeoPoint, json: bool) -> Result<()> {
    let search = OverpassClient::new(&config.overpass())?;
    let mut session = Session::new(Controller::new(false, Default::default()), Box::new(search));

    let spinner = create_spinner("Searching parking spots...");
    let start = Instant::now();
    session.tap(origin);
    let controller = session.controller();
    if let Some(notice) = controller.notice() {
        spinner.finish_and_clear();
        bail!("{}", notice);
    }
    spinner.finish_with_message(format!(
        "Found {} parking spots [{:.1}s]",
        controller.candidates().len(),
        start.elapsed().as_secs_f32()
    ));

    let candidates = controller.candidates();
    if json {
        let output = SpotsOutput {
            origin,
            region: Region::fitting(
                std::iter::once(origin).chain(candidates.iter().map(ParkingCandidate::location)),
            ),
            candidates,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_markers(origin, candidates);
    }
    Ok(())
}

fn run_route(
    config: &FileConfig,
    origin: GeoPoint,
    destination: GeoPoint,
    mode: TravelMode,
    simplify: Option<f64>,
    json: bool,
) -> Result<()> {
    let mapbox = config.mapbox();
    let router = MapboxClient::new(&mapbox, mapbox.resolve_token()?)?;

    let spinner = create_spinner("Requesting directions...");
    let start = Instant::now();
    let path = router
        .route(origin, destination, mode)
        .context("Failed to fetch directions")?;
    spinner.finish_with_message(format!(
        "Route with {} points [{:.1}s]",
        path.points.len(),
        start.elapsed().as_secs_f32()
    ));

    let path = match simplify {
        Some(epsilon) => simplify_path(&path, epsilon),
        None => path,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&path)?);
    } else {
        print_route(&path);
    }
    Ok(())
}

fn run_interactive(config: &FileConfig, mode: TravelMode, no_confirm: bool) -> Result<()> {
    let selection = config.selection();
    let controller = Controller::new(selection.require_confirmation && !no_confirm, selection.retap);
    let search = OverpassClient::new(&config.overpass())?;
    let mut session = Session::new(controller, Box::new(search)).with_mode(mode);

    let mapbox = config.mapbox();
    match mapbox.resolve_token() {
        Ok(token) => {
            let router: Box<dyn RouteProvider> = Box::new(MapboxClient::new(&mapbox, token)?);
            session = session.with_router(router);
        }
        Err(e) => {
            tracing::warn!("{}; routes open as navigation links", e);
        }
    }

    let nominatim = config.nominatim();
    if nominatim.enabled {
        let geocoder: Box<dyn ReverseGeocoder> = Box::new(NominatimClient::new(&nominatim)?);
        session = session.with_geocoder(geocoder);
    }

    println!("parkfinder - tap the map to find parking (type 'help')");
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("[{}] > ", session.controller().phase());
        std::io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("Failed to read input")?;
        if line.trim().is_empty() {
            continue;
        }

        let gesture: Gesture = match line.parse() {
            Ok(g) => g,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };
        if gesture == Gesture::Quit {
            break;
        }
        handle_gesture(&mut session, gesture);

        if let Some(notice) = session.controller().notice() {
            println!("! {} (type 'dismiss')", notice);
        }
    }
    Ok(())
}

fn handle_gesture(session: &mut Session, gesture: Gesture) {
    match gesture {
        Gesture::Tap(point) => {
            let spinner = create_spinner("Searching parking spots...");
            let outcome = session.tap(point);
            spinner.finish_and_clear();
            match outcome {
                TapOutcome::Pending => {
                    println!("Selected location: {}", point);
                    println!("  {}", session.describe(point));
                    println!("Use this location? (confirm / cancel)");
                }
                TapOutcome::Search(_) => print_after_search(session),
                TapOutcome::Ignored => println!("Origin already set; tap ignored"),
            }
        }
        Gesture::Confirm => {
            let spinner = create_spinner("Searching parking spots...");
            let confirmed = session.confirm().is_ok();
            spinner.finish_and_clear();
            if confirmed {
                print_after_search(session);
            }
        }
        Gesture::Cancel => {
            if session.cancel().is_ok() {
                println!("Location discarded");
            }
        }
        Gesture::Select(id) => {
            if let Ok(details) = session.select(&id) {
                print_details(&details);
            }
        }
        Gesture::Route => {
            let spinner = create_spinner("Requesting directions...");
            let outcome = session.request_route();
            spinner.finish_and_clear();
            match outcome {
                Ok(RouteOutcome::Drawn(path)) => print_route(&path),
                Ok(RouteOutcome::Link(url)) => println!("Open in maps: {}", url),
                Ok(RouteOutcome::Failed) | Err(_) => {}
            }
        }
        Gesture::Link => {
            if let Ok(url) = session.navigation_link() {
                println!("Open in maps: {}", url);
            }
        }
        Gesture::Mode(mode) => {
            session.set_mode(mode);
            println!("Travel mode: {}", mode);
        }
        Gesture::Show => print_state(session),
        Gesture::Dismiss => {
            if session.dismiss().is_none() {
                println!("Nothing to dismiss");
            }
        }
        Gesture::Help => println!("{}", HELP),
        Gesture::Quit => {}
    }
}

fn print_after_search(session: &Session) {
    if let Some(origin) = session.controller().origin()
        && session.controller().notice().is_none()
    {
        print_markers(origin, session.controller().candidates());
    }
}

fn print_markers(origin: GeoPoint, candidates: &[ParkingCandidate]) {
    println!("Origin: {}", origin);
    if candidates.is_empty() {
        println!("No parking spots within 1 km");
        return;
    }
    println!("Parking spots:");
    for spot in candidates {
        println!(
            "  [{}] {} ({:.5}, {:.5}) {}",
            spot.id,
            spot.name,
            spot.latitude,
            spot.longitude,
            format_distance(distance_m(origin, spot.location()))
        );
    }
}

fn print_details(details: &SpotDetails) {
    let spot = &details.candidate;
    println!("{}", spot.name);
    println!("  id:       {}", spot.id);
    println!("  location: {:.6}, {:.6}", spot.latitude, spot.longitude);
    println!("  address:  {}", details.address);
    if let Some(meters) = details.distance_m {
        println!("  distance: {}", format_distance(meters));
    }
    if let Some(ref capacity) = spot.capacity {
        println!("  capacity: {}", capacity);
    }
    if let Some(ref fee) = spot.fee {
        println!("  fee:      {}", fee);
    }
    if let Some(ref access) = spot.access {
        println!("  access:   {}", access);
    }
    println!("Type 'route' for directions or 'link' to open a maps app");
}

fn print_route(path: &RoutePath) {
    if !path.is_drawable() {
        println!("Route has no drawable geometry");
        return;
    }
    if let (Some(distance), Some(duration)) = (path.distance_m, path.duration_s) {
        println!(
            "Route: {}, about {:.0} min",
            format_distance(distance),
            duration / 60.0
        );
    }
    for point in &path.points {
        println!("  {:.6}, {:.6}", point.latitude, point.longitude);
    }
}

fn print_state(session: &Session) {
    let controller = session.controller();
    println!("State: {}", controller.phase());
    println!("Travel mode: {}", session.mode());
    if let Phase::PendingConfirmation { proposed, .. } = controller.phase() {
        println!("Awaiting confirmation: {}", proposed);
    }
    match controller.origin() {
        Some(origin) => print_markers(origin, controller.candidates()),
        None => println!("No origin selected"),
    }
    if let Some(spot) = controller.selected() {
        println!("Selected: [{}] {}", spot.id, spot.name);
    }
    if let Some(path) = controller.route() {
        println!("Route drawn with {} points", path.points.len());
    }
    let points = controller
        .origin()
        .into_iter()
        .chain(controller.candidates().iter().map(ParkingCandidate::location));
    if let Some(region) = Region::fitting(points) {
        println!(
            "Map region: {} (span {:.4} x {:.4})",
            region.center, region.latitude_delta, region.longitude_delta
        );
    }
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}
