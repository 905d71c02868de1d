use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Umbra: colour-scheme injection engine, developer tools.
#[derive(Parser, Debug)]
#[command(name = "umbra", version, about)]
pub struct Args {
    /// Preferences file (defaults to the platform config directory).
    #[arg(long, global = true)]
    pub prefs: Option<PathBuf>,

    /// Log level override (debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Patch a Content-Security-Policy header value so data: styles load.
    Csp {
        /// The raw header value.
        header: String,
    },
    /// Render one stylesheet template with the current preferences.
    Render {
        /// Bundle path of the template (e.g. methods/base.css).
        template: String,
        /// Render for a nested frame instead of the top-level document.
        #[arg(long)]
        nested: bool,
        /// Read templates from this directory instead of the built-in set.
        #[arg(long)]
        bundle: Option<PathBuf>,
    },
    /// Print the script that would be injected into pages.
    Payload {
        /// Extension manifest to take content-script settings from.
        #[arg(long)]
        manifest: Option<PathBuf>,
        /// Print the full registration as JSON instead of the script body.
        #[arg(long)]
        registration: bool,
        #[arg(long)]
        bundle: Option<PathBuf>,
    },
    /// Validate a preferences file.
    Check,
    /// Follow a preferences file and print every change set.
    Watch,
}

pub fn parse() -> Args {
    Args::parse()
}
