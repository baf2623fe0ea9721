//! Runs one route enrichment and prints the result as JSON.
//!
//! The API key and endpoints come from the `GOOGLE_*` environment variables.
//! Logs go to stderr; set `RUST_LOG` to adjust verbosity.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use route_restaurants::boundary::{RouteRequest, status_code, user_message};
use route_restaurants::config::{EnrichmentConfig, GoogleMapsConfig};
use route_restaurants::rate_limit::{InMemoryRateLimiter, RateBudget, check_route_budget};
use route_restaurants::GoogleRouteEnricher;

#[derive(Debug, Parser)]
#[command(version, about = "Find restaurants along a driving route")]
struct Args {
    /// Origin place name.
    origin: String,

    /// Destination place name.
    destination: String,

    /// Caller id used for rate budgets, e.g. `user:42`.
    #[arg(long)]
    caller: Option<String>,

    /// Distance between route samples in meters.
    #[arg(long, default_value_t = 200.0)]
    interval: f64,

    /// Look up samples in parallel.
    #[arg(long)]
    parallel: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let request = RouteRequest::new(args.origin, args.destination);
    let (origin, destination) = match request.validate() {
        Ok(names) => names,
        Err(err) => {
            error!("{err}");
            return ExitCode::from(2);
        }
    };

    let limiter = Arc::new(InMemoryRateLimiter::new());
    if let Some(caller) = args.caller.as_deref() {
        if let Err(err) = check_route_budget(&*limiter, caller, RateBudget::ROUTE_POLYLINE) {
            error!("{}", user_message(&err));
            return ExitCode::FAILURE;
        }
    }

    let config = EnrichmentConfig {
        sample_interval_meters: args.interval,
        parallel_lookups: args.parallel,
        ..EnrichmentConfig::default()
    };
    let enricher = match GoogleRouteEnricher::google(GoogleMapsConfig::from_env(), config, limiter) {
        Ok(enricher) => enricher,
        Err(err) => {
            error!("failed to build http client: {err}");
            return ExitCode::FAILURE;
        }
    };

    match enricher.enrich(origin, destination, args.caller.as_deref()) {
        Ok(result) => match serde_json::to_string_pretty(&result) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(err) => {
                error!("failed to serialize result: {err}");
                ExitCode::FAILURE
            }
        },
        Err(err) => {
            error!(
                status = status_code(err.kind()),
                cause = %err,
                "{}",
                user_message(&err)
            );
            ExitCode::FAILURE
        }
    }
}
