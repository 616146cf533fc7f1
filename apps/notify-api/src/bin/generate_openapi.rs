//! Writes the notify-api OpenAPI document.
//!
//! Usage: `generate-openapi [OUTPUT]`, default `specs/notify-api.json` at the
//! workspace root.

use std::error::Error;
use std::path::{Path, PathBuf};

use utoipa::OpenApi;

fn main() -> Result<(), Box<dyn Error>> {
    let out = match std::env::args().nth(1) {
        Some(path) => PathBuf::from(path),
        None => Path::new(env!("CARGO_MANIFEST_DIR")).join("../../specs/notify-api.json"),
    };

    let document = notify_api::routes::ApiDoc::openapi().to_pretty_json()?;
    if let Some(parent) = out.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&out, document)?;
    println!("Wrote {}", out.display());
    Ok(())
}
