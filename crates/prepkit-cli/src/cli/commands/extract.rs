//! `prepkit extract <path>` – unpack an archive next to itself.

use anyhow::Result;
use std::path::Path;

use prepkit_core::extract::extract;

use crate::cli::progress_bar::ConsoleBar;

pub fn run_extract(path: &Path, delete_archive: bool) -> Result<()> {
    println!("Extracting {}", path.display());

    tracing::info!("extract requested for {} (delete_archive={})", path.display(), delete_archive);
    let mut bar = ConsoleBar::new();
    extract(path, delete_archive, &mut bar)?;
    bar.finish();

    println!("Extracted into {}", path.parent().unwrap_or(Path::new(".")).display());
    Ok(())
}
