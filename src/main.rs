//! Parkscout - browse National Park Service sites by state
//!
//! An interactive command-line tool that resolves park sites per state and
//! searches nearby places of interest for a chosen site, caching every
//! remote fetch on disk so later runs replay it.

use std::io;
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use parkscout::config::Config;
use parkscout::data::{NpsClient, PlacesClient};
use parkscout::fetch::HttpFetcher;
use parkscout::shell::Shell;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(error) => {
            eprintln!("{error}");
            return ExitCode::FAILURE;
        }
    };

    let nps = NpsClient::new(&config, HttpFetcher::new());
    let places = PlacesClient::new(&config, HttpFetcher::new());
    let mut shell = Shell::new(nps, places);

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    if let Err(error) = shell.run(stdin.lock(), &mut stdout) {
        eprintln!("I/O error: {error}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
