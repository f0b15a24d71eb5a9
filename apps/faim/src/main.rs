//! # FAIM-QIRF
//!
//! The command-line binary for the FAIM-QIRF epistemic-justice rule engine.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │              apps/faim (THE BINARY)           │
//! │                                               │
//! │  ┌─────────────┐          ┌────────────────┐  │
//! │  │    CLI      │          │  faim.toml     │  │
//! │  │   (clap)    │          │  (config)      │  │
//! │  └──────┬──────┘          └───────┬────────┘  │
//! │         └────────────┬────────────┘           │
//! │                      ▼                        │
//! │              ┌───────────────┐                │
//! │              │   faim-core   │                │
//! │              │  (THE LOGIC)  │                │
//! │              └───────────────┘                │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! faim init
//! faim agent add "Sojourner Truth" --spts abolitionist,orator --score 80
//! faim gates --require-spts free_male_greek --standing-rule requiresSPTS -m "Lyceum rules"
//! faim status
//! ```

use clap::Parser;
use faim::cli;
use faim::config::Config;
use faim::logging::{self, LogFormat};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when neither `RUST_LOG` nor `log_filter` is set.
const DEFAULT_LOG_FILTER: &str = "faim=info";

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    // Parse CLI arguments
    let cli = cli::Cli::parse();

    // The config may name a log filter, so read it before tracing starts.
    let config = Config::load(&cli.config);
    let configured_filter = config
        .as_ref()
        .ok()
        .and_then(|c| c.log_filter.clone())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| configured_filter.into());

    // Logs go to stderr in both formats; stdout is reserved for command output.
    tracing_subscriber::registry()
        .with(filter)
        .with(logging::fmt_layer(LogFormat::from_env(), std::io::stderr))
        .init();

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Error: {}", e);
            std::process::exit(1);
        }
    };

    // Display startup banner
    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    // Execute command
    if let Err(e) = cli::execute(cli, &config) {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the FAIM-QIRF startup banner.
fn print_banner() {
    println!(
        r#"
  ███████╗ █████╗ ██╗███╗   ███╗
  ██╔════╝██╔══██╗██║████╗ ████║
  █████╗  ███████║██║██╔████╔██║
  ██╔══╝  ██╔══██║██║██║╚██╔╝██║
  ██║     ██║  ██║██║██║ ╚═╝ ██║
  ╚═╝     ╚═╝  ╚═╝╚═╝╚═╝     ╚═╝

  FAIM-QIRF Rule Engine v{}

  Gates • Rubric • Equal Standing • Audit
"#,
        env!("CARGO_PKG_VERSION")
    );
}
