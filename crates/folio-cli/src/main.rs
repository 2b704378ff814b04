mod cli;

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::Parser;
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use folio_core::{App, AppBuilder, Config, InputFile, ToolId};

use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "folio=info,folio_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("invalid FOLIO_* environment")?;
    let app = AppBuilder::new(config).build()?;

    match cli.command {
        Commands::Tools => list_tools(&app),
        Commands::Run {
            tool,
            files,
            options,
            out_dir,
        } => {
            app.init();
            let result = run(&app, &tool, &files, options.as_deref(), &out_dir).await;
            app.dispose().await;
            result
        }
    }
}

fn list_tools(app: &App) -> anyhow::Result<()> {
    for tool in ToolId::ALL {
        let route = app.route(tool)?;
        println!("{:<20} {route}", tool.as_str());
    }
    Ok(())
}

async fn run(
    app: &App,
    tool: &str,
    files: &[PathBuf],
    options: Option<&str>,
    out_dir: &Path,
) -> anyhow::Result<()> {
    let inputs = files
        .iter()
        .map(|path| read_input(path))
        .collect::<anyhow::Result<Vec<_>>>()?;
    let options = match options {
        Some(raw) => serde_json::from_str(raw).context("--options is not valid JSON")?,
        None => serde_json::Value::Null,
    };
    let request = app.parse_request(tool, inputs, options)?;

    let outcome = tokio::select! {
        outcome = app.process(&request) => outcome,
        _ = tokio::signal::ctrl_c() => {
            app.on_unload();
            bail!("interrupted");
        }
    };
    println!("{}", serde_json::to_string_pretty(&outcome)?);

    if !outcome.is_success() {
        if outcome.requires_auth() {
            warn!("the processing backend needs sign-in; set FOLIO_REMOTE_URL and FOLIO_REMOTE_TOKEN");
        }
        bail!(
            "{} failed: {}",
            request.tool,
            outcome.message().unwrap_or("unknown error")
        );
    }

    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("could not create {}", out_dir.display()))?;
    for handle in outcome.artifacts() {
        let path = app.download(&handle.id, out_dir).await?;
        println!("wrote {} ({} bytes)", path.display(), handle.size);
    }
    println!("store: {}", serde_json::to_string(&app.stats())?);
    Ok(())
}

fn read_input(path: &Path) -> anyhow::Result<InputFile> {
    let bytes =
        std::fs::read(path).with_context(|| format!("could not read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(InputFile::new(name, bytes))
}
