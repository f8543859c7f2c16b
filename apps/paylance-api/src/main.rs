//! # PayLance API Entry Point
//!
//! ## Startup Sequence
//! 1. Initialize tracing (logging)
//! 2. Load configuration
//! 3. Connect to database & run migrations
//! 4. Resume the stored draft, if any
//! 5. Serve HTTP until Ctrl-C

#[tokio::main]
async fn main() {
    // The actual setup is in lib.rs for better testability
    if let Err(e) = paylance_api::run().await {
        eprintln!("paylance-api: {}", e);
        std::process::exit(1);
    }
}
