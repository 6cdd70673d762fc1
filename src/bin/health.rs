use std::env;

use anyhow::{bail, Context, Result};
use reqwest::Url;
use serde::Deserialize;

#[derive(Deserialize)]
struct HealthResponse {
    status: String,
}

fn main() -> Result<()> {
    let url = env::args()
        .nth(1)
        .context("Missing URL argument, e.g. http://localhost:3000/health")?;
    let url = Url::parse(&url)?;

    let response = reqwest::blocking::get(url)?;
    if !response.status().is_success() {
        bail!("Health check failed with status {}", response.status())
    }

    let health: HealthResponse = response.json()?;
    if health.status != "OK" {
        bail!("Service reported status {}", health.status)
    }

    Ok(())
}
