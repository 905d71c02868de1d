mod cli;

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use umbra_common::{PrefChanges, UmbraError};
use umbra_config::toml_loader;
use umbra_config::validation::validate;
use umbra_config::{
    merged_pages, FilePreferenceStore, MethodCatalog, PreferenceStore, Preferences, ReloadManager,
};
use umbra_engine::propagator::render_stylesheets;
use umbra_inject::{
    render, Background, BundleDir, FrameLevel, InjectionPayload, ManifestContentScript,
    RenderAxes, RenderParams, ScriptRegistration, StaticBundle, TemplateSource,
};

use crate::cli::Command;

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::parse();

    let log_directive = args.log_level.as_deref().unwrap_or("umbra=info");
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(
                log_directive
                    .parse()
                    .unwrap_or_else(|_| "umbra=info".parse().unwrap()),
            ),
        )
        .init();

    tracing::debug!("umbra v{} starting", env!("CARGO_PKG_VERSION"));

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: cli::Args) -> Result<(), UmbraError> {
    match args.command {
        Command::Csp { header } => {
            let patched = umbra_inject::rewrite_header_value(&header)
                .map_err(|e| UmbraError::Other(e.to_string()))?;
            println!("{patched}");
        }
        Command::Render {
            template,
            nested,
            bundle,
        } => {
            let prefs = load_prefs(args.prefs.as_deref())?;
            let templates = template_source(bundle);
            let text = templates.load(&template).await?;
            let dark = umbra_config::colors::is_dark_background(
                &prefs.default_background_color,
                &prefs.default_foreground_color,
            )?;
            let frame = if nested {
                FrameLevel::Nested
            } else {
                FrameLevel::TopLevel
            };
            let params = RenderParams::new(
                prefs.string_values(),
                RenderAxes::new(frame, Background::from_is_dark(dark)),
            );
            print!("{}", render(&text, &params));
        }
        Command::Payload {
            manifest,
            registration,
            bundle,
        } => {
            let prefs = load_prefs(args.prefs.as_deref())?;
            let manifest = match manifest {
                Some(path) => {
                    let text = std::fs::read_to_string(&path)?;
                    ManifestContentScript::from_manifest_json(&text)
                        .map_err(|e| UmbraError::Other(format!("{}: {e}", path.display())))?
                }
                None => ManifestContentScript::all_frames_at_start(),
            };
            let templates = template_source(bundle);
            let rendered =
                render_stylesheets(templates.as_ref(), &MethodCatalog::builtin(), &prefs)
                    .await
                    .map_err(|e| UmbraError::Other(e.to_string()))?;
            let payload = InjectionPayload {
                prefs: prefs.to_json(),
                merged_configured: json_value(&merged_pages(&prefs, &Default::default()))?,
                configured_tabs: serde_json::json!({}),
                rendered_stylesheets: rendered,
                changes: PrefChanges::new(),
            };
            let script = payload
                .to_script()
                .map_err(|e| UmbraError::Other(e.to_string()))?;
            if registration {
                let reg = ScriptRegistration::from_manifest(&manifest, script);
                let json = serde_json::to_string_pretty(&reg)
                    .map_err(|e| UmbraError::Other(e.to_string()))?;
                println!("{json}");
            } else {
                print!("{script}");
            }
        }
        Command::Check => {
            let path = prefs_path(args.prefs.as_deref())?;
            let prefs = toml_loader::load_from_path(&path)?;
            validate(&prefs)?;
            eprintln!("{}: ok", path.display());
            println!("{}", umbra_config::preferences_to_json(&prefs));
        }
        Command::Watch => {
            let path = prefs_path(args.prefs.as_deref())?;
            let store = Arc::new(FilePreferenceStore::open(&path)?);
            let mut changes = store.subscribe();
            let _reload = ReloadManager::new(Arc::clone(&store)).start();
            tracing::info!("watching {}", path.display());

            loop {
                tokio::select! {
                    received = changes.recv() => match received {
                        Ok(changes) => println!("{}", json_value(&changes)?),
                        Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                            tracing::warn!(skipped = n, "missed preference changes");
                        }
                        Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                    },
                    _ = tokio::signal::ctrl_c() => break,
                }
            }
        }
    }
    Ok(())
}

fn prefs_path(explicit: Option<&Path>) -> Result<std::path::PathBuf, UmbraError> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => Ok(toml_loader::default_preferences_path()?),
    }
}

/// Explicit file, else the default file if it exists, else defaults.
fn load_prefs(explicit: Option<&Path>) -> Result<Preferences, UmbraError> {
    let path = prefs_path(explicit)?;
    if explicit.is_none() && !path.exists() {
        tracing::debug!("no preferences at {}, using defaults", path.display());
        return Ok(Preferences::default());
    }
    let prefs = toml_loader::load_from_path(&path)?;
    validate(&prefs)?;
    Ok(prefs)
}

fn template_source(bundle: Option<std::path::PathBuf>) -> Arc<dyn TemplateSource> {
    match bundle {
        Some(dir) => Arc::new(BundleDir::new(dir)),
        None => Arc::new(StaticBundle::new()),
    }
}

fn json_value<T: serde::Serialize>(value: &T) -> Result<serde_json::Value, UmbraError> {
    serde_json::to_value(value).map_err(|e| UmbraError::Other(e.to_string()))
}
