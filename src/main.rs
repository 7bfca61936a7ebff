//! Command-line front end.
//!
//! ```text
//! http1-client [--config FILE] [--timeout SECS] [-i] <get|head|post|put|delete> URL
//!     [-H 'Name: value']... [-p key=value]... [--data TEXT | --json TEXT] [--no-redirects]
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use serde_json::Value;

use http1_client::config::{load_config, ClientConfig};
use http1_client::observability::logging;
use http1_client::{Client, Method, RequestOptions, Response};

#[derive(Parser)]
#[command(name = "http1-client")]
#[command(about = "Minimal HTTP/1.x client", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Whole-operation timeout in seconds
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Print the status line and headers before the body
    #[arg(short, long)]
    include: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a GET request
    Get(Target),
    /// Send a HEAD request
    Head(Target),
    /// Send a POST request
    Post(Target),
    /// Send a PUT request
    Put(Target),
    /// Send a DELETE request
    Delete(Target),
}

#[derive(Args)]
struct Target {
    url: String,

    /// Request header as "Name: value"
    #[arg(short = 'H', long = "header")]
    headers: Vec<String>,

    /// Query parameter as "key=value"
    #[arg(short = 'p', long = "param")]
    params: Vec<String>,

    /// Raw request body
    #[arg(long, conflicts_with = "json")]
    data: Option<String>,

    /// JSON request body
    #[arg(long)]
    json: Option<String>,

    /// Return the first response even if it is a redirect
    #[arg(long)]
    no_redirects: bool,
}

impl Target {
    fn options(&self) -> Result<RequestOptions, Box<dyn std::error::Error>> {
        let mut options = RequestOptions::new().allow_redirects(!self.no_redirects);
        for header in &self.headers {
            let (name, value) = header
                .split_once(':')
                .ok_or_else(|| format!("header {header:?} is not \"Name: value\""))?;
            options = options.header(name.trim(), value.trim());
        }
        for param in &self.params {
            let (key, value) = param
                .split_once('=')
                .ok_or_else(|| format!("param {param:?} is not \"key=value\""))?;
            options = options.param(key, value);
        }
        if let Some(data) = &self.data {
            options = options.data(data.clone());
        }
        if let Some(json) = &self.json {
            let value: Value = serde_json::from_str(json)?;
            options = options.json(value);
        }
        Ok(options)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ClientConfig::default(),
    };
    logging::init(&config.observability);

    let (method, target) = match &cli.command {
        Commands::Get(t) => (Method::Get, t),
        Commands::Head(t) => (Method::Head, t),
        Commands::Post(t) => (Method::Post, t),
        Commands::Put(t) => (Method::Put, t),
        Commands::Delete(t) => (Method::Delete, t),
    };
    let mut options = target.options()?;
    if let Some(secs) = cli.timeout {
        options = options.timeout(Duration::from_secs(secs));
    }

    let client = Client::new(config)?;
    let response = client.request(method, &target.url, options).await?;
    print_response(&response, cli.include);

    if !response.is_success() {
        std::process::exit(1);
    }
    Ok(())
}

fn print_response(response: &Response, include: bool) {
    if include {
        println!("{} {}", response.status_code(), response.reason());
        for (name, value) in response.headers().iter() {
            println!("{name}: {value}");
        }
        println!();
    }

    if response.is_json() {
        if let Ok(json) = response.json::<Value>() {
            if let Ok(pretty) = serde_json::to_string_pretty(&json) {
                println!("{pretty}");
                return;
            }
        }
    }
    print!("{}", response.text());
}
