// src/utils/env.rs

use log::{debug, info};
use std::path::Path;

/// Load variables from a `.env` file, looking in the working directory first
/// and then in the crate root. Missing files are not an error.
pub fn load_env() {
    let candidates = [".env", concat!(env!("CARGO_MANIFEST_DIR"), "/.env")];
    for candidate in candidates {
        if Path::new(candidate).exists() {
            match dotenv::from_path(candidate) {
                Ok(()) => {
                    info!("Loaded environment from {}", candidate);
                    return;
                }
                Err(e) => debug!("Could not load {}: {}", candidate, e),
            }
        }
    }
    debug!("No .env file found, using process environment only");
}
