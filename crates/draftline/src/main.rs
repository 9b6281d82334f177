//! `draftline` - inspect the decisions the compose engine makes.
//!
//! Runs drafts through the engine against an in-memory editor and store,
//! so a configuration can be checked without touching real mail.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod args;
mod report;

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result, bail};
use draftline_core::compose::{ByName, Operator, Unattended};
use draftline_core::{
    ComposeRequest, ComposeSession, ComposeType, EditorSurface, EngineConfig, MemoryStore,
    Message, Outcome, ScratchEditor, Started,
};
use structopt::StructOpt;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use args::{ExplainOpt, Opt, SubCommand};
use report::{ConfigReport, ExplainReport};

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the JSON report.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "draftline=info,draftline_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let opt = Opt::from_args();
    debug!(?opt, "Parsed arguments");

    match opt.subcommand {
        SubCommand::PrintConfigPath => {
            println!("{}", default_config_path().display());
            Ok(())
        }
        SubCommand::CheckConfig => {
            let (config, source) = load_config(opt.config.as_deref()).await?;
            print_json(&ConfigReport::new(&config, source))
        }
        SubCommand::Explain(explain) => {
            let (config, _) = load_config(opt.config.as_deref()).await?;
            print_json(&run_explain(explain, &config).await?)
        }
    }
}

fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("draftline")
        .join("config.json")
}

/// Load the configuration; a missing default file means defaults.
async fn load_config(explicit: Option<&Path>) -> Result<(EngineConfig, Option<PathBuf>)> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let path = default_config_path();
            if !path.exists() {
                info!(path = %path.display(), "No configuration file, using defaults");
                return Ok((EngineConfig::default(), None));
            }
            path
        }
    };
    let config = EngineConfig::load(&path)
        .await
        .with_context(|| format!("loading {}", path.display()))?;
    Ok((config, Some(path)))
}

async fn read_message(path: &Path) -> Result<Message> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parsing {}", path.display()))
}

async fn run_explain(opt: ExplainOpt, config: &EngineConfig) -> Result<ExplainReport> {
    let store = MemoryStore::new();
    let mut editor = ScratchEditor::new();

    let request = match (opt.kind, opt.original) {
        (ComposeType::New, None) => ComposeRequest::new_message(),
        (ComposeType::New, Some(_)) => bail!("a new message takes no original"),
        (kind, Some(path)) => {
            let original = read_message(&path).await?;
            store.insert(original.clone());
            ComposeRequest::on(kind, original)
        }
        (kind, None) => bail!("{kind} needs --original"),
    }
    .including(opt.includes);

    let active = match opt.active.as_deref() {
        Some(name) => Some(
            config
                .context_index(name)
                .with_context(|| format!("no context named '{name}'"))?,
        ),
        None => None,
    };
    let mut operator: Box<dyn Operator> = match opt.choose {
        Some(name) => Box::new(ByName(name)),
        None => Box::new(Unattended),
    };

    let started = ComposeSession::start(
        request,
        config,
        active,
        &mut editor,
        &store,
        operator.as_mut(),
    )
    .await?;
    let Started::Open(session) = started else {
        info!("Compose aborted at context selection");
        return Ok(ExplainReport::Aborted);
    };
    let mut session = *session;

    for (name, value) in &opt.headers {
        editor.set_header(session.draft(), name, value)?;
    }
    session.send(config, &mut editor, &store)?;
    editor.transmit(session.draft())?;

    match session.finish(config, &mut editor, &store).await {
        Outcome::Sent(summary) => Ok(ExplainReport::Sent {
            summary,
            store_log: store.snapshot().log,
        }),
        Outcome::Discarded => Ok(ExplainReport::Discarded),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
