//! Serve command - run the HTTP analysis API.

use std::net::SocketAddr;

use colored::Colorize;

use crate::server::{app, state::AppState};

pub fn run(host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .map_err(|e| format!("Invalid address {host}:{port}: {e}"))?;

    let url = format!("http://{addr}");
    println!();
    println!(
        "{} {}",
        "Starting analysis server at".cyan().bold(),
        url.white().bold()
    );
    println!();
    println!("  POST {}/api/analyze with a CSV or JSON file", url);
    println!();
    println!("Press {} to stop the server", "Ctrl+C".yellow().bold());
    println!();

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(app::run_server(AppState::new(), addr))
}
