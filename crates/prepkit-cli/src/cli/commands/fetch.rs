//! `prepkit fetch <url>... [--out PATH]` – download with mirror fallback.

use anyhow::{bail, Result};
use std::collections::HashMap;
use std::path::PathBuf;

use prepkit_core::config::PrepkitConfig;
use prepkit_core::confirm::{AssumeYes, Confirm};
use prepkit_core::fetch::{fetch, FetchOutcome, FetchRequest};
use prepkit_core::url_model;

use crate::cli::confirm::ConsoleConfirm;
use crate::cli::progress_bar::ConsoleBar;

pub fn run_fetch(
    cfg: &PrepkitConfig,
    urls: Vec<String>,
    out: Option<PathBuf>,
    headers: &[String],
    yes: bool,
) -> Result<()> {
    let destination =
        out.unwrap_or_else(|| PathBuf::from(url_model::derive_filename(&urls[0])));

    let mut confirm: Box<dyn Confirm> = if yes {
        Box::new(AssumeYes)
    } else {
        Box::new(ConsoleConfirm)
    };
    let prompt = format!("Download {} to {}?", urls[0], destination.display());
    if !confirm.confirm(&prompt) {
        tracing::info!("user declined download of {}", urls[0]);
        println!("Aborted.");
        return Ok(());
    }

    let request = FetchRequest::new(urls, &destination)?.with_headers(parse_headers(headers)?);

    let mut bar = ConsoleBar::new();
    let outcome = fetch(&request, cfg, &mut bar)?;
    bar.finish();

    match outcome {
        FetchOutcome::AlreadyPresent => {
            println!("Skipping download, {} already exists.", destination.display());
        }
        FetchOutcome::Downloaded { source, bytes } => {
            tracing::info!("fetch finished: {} bytes from {}", bytes, source);
            println!(
                "Downloaded {} ({} bytes) from {}",
                destination.display(),
                bytes,
                source
            );
        }
    }
    Ok(())
}

/// Parses repeated `--header "Name: value"` flags.
fn parse_headers(raw: &[String]) -> Result<HashMap<String, String>> {
    let mut headers = HashMap::new();
    for h in raw {
        let Some((name, value)) = h.split_once(':') else {
            bail!("invalid header {h:?}, expected \"Name: value\"");
        };
        let name = name.trim();
        if name.is_empty() {
            bail!("invalid header {h:?}, empty name");
        }
        headers.insert(name.to_string(), value.trim().to_string());
    }
    Ok(headers)
}
