mod client;
mod config;
mod graph;
mod transcript;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use debate_coordination::{
    DebateConfig, DebateEngine, DebateEvent, DebateRecord, EventBus, GuardrailConfig,
    RepetitionPolicy, RoleId, TimeoutGenerator,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{error, info, warn};

use client::OpenAiGenerator;
use config::DebateAgentsConfig;
use transcript::Transcript;

/// Two personas debate a topic in alternating turns; a judge picks the winner.
#[derive(Parser, Debug)]
#[command(name = "debate-agents", version, about)]
struct Args {
    /// Debate topic. Read from stdin when omitted.
    #[arg(long)]
    topic: Option<String>,

    /// Total debater turns before the judge rules.
    #[arg(long)]
    max_turns: Option<u32>,

    /// Debater who opens: scientist or philosopher.
    #[arg(long, value_parser = parse_debater)]
    first_speaker: Option<RoleId>,

    /// Model name sent to the completions endpoint.
    #[arg(long)]
    model: Option<String>,

    /// OpenAI-compatible base URL, e.g. http://localhost:8080/v1.
    #[arg(long)]
    base_url: Option<String>,

    /// Transcript log file (truncated on start).
    #[arg(long)]
    log_path: Option<PathBuf>,

    /// Write a JSON run record here.
    #[arg(long)]
    record_path: Option<PathBuf>,

    /// Write the workflow graph as Mermaid here.
    #[arg(long)]
    graph_path: Option<PathBuf>,

    /// Handling of verbatim repeated arguments: allow, substitute or reject.
    #[arg(long)]
    repetition: Option<RepetitionPolicy>,
}

fn parse_debater(s: &str) -> Result<RoleId, String> {
    match RoleId::parse(s) {
        Some(role) if role.is_debater() => Ok(role),
        _ => Err(format!(
            "'{}' is not a debater (expected scientist or philosopher)",
            s
        )),
    }
}

impl Args {
    fn apply(self, config: &mut DebateAgentsConfig) -> Option<String> {
        if let Some(v) = self.max_turns {
            config.max_turns = v;
        }
        if let Some(v) = self.first_speaker {
            config.first_speaker = v;
        }
        if let Some(v) = self.model {
            config.endpoint.model = v;
        }
        if let Some(v) = self.base_url {
            config.endpoint.base_url = v;
        }
        if let Some(v) = self.log_path {
            config.log_path = v;
        }
        if let Some(v) = self.repetition {
            config.repetition = v;
        }
        config.record_path = self.record_path;
        config.graph_path = self.graph_path;
        self.topic
    }
}

async fn prompt_topic() -> Result<String> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(b"Enter the debate topic: ").await?;
    stdout.flush().await?;
    read_topic(BufReader::new(tokio::io::stdin())).await
}

async fn read_topic<R: AsyncBufRead + Unpin>(mut reader: R) -> Result<String> {
    let mut line = String::new();
    reader
        .read_line(&mut line)
        .await
        .context("failed to read topic from stdin")?;
    Ok(line.trim().to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let mut config = DebateAgentsConfig::default();
    let topic = Args::parse().apply(&mut config);
    config.validate()?;

    println!("--- Multi-Agent Debate System ---");
    let topic = match topic {
        Some(t) => t.trim().to_string(),
        None => prompt_topic().await?,
    };
    if topic.is_empty() {
        bail!("debate topic must not be empty");
    }

    info!(
        topic = %topic,
        model = %config.endpoint.model,
        base_url = %config.endpoint.base_url,
        max_turns = config.max_turns,
        first_speaker = %config.first_speaker,
        "Debate runner starting"
    );

    if let Some(path) = &config.graph_path {
        match std::fs::write(path, graph::render_mermaid()) {
            Ok(()) => info!(path = %path.display(), "Workflow graph saved"),
            Err(e) => warn!(path = %path.display(), "Could not write workflow graph: {e}"),
        }
    }

    let generator = TimeoutGenerator::new(
        OpenAiGenerator::new(config.endpoint.clone())?,
        config.endpoint.timeout,
    );
    let transcript = Transcript::open(&config.log_path)
        .with_context(|| format!("failed to open {}", config.log_path.display()))?;

    let bus = EventBus::new().shared();
    let printer = tokio::spawn(transcript.follow(bus.subscribe()));

    let engine = DebateEngine::with_config(
        Arc::new(generator),
        bus.clone(),
        DebateConfig {
            guardrails: GuardrailConfig {
                repetition: config.repetition,
            },
        },
    );

    let cancel = engine.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling debate");
            cancel.cancel();
        }
    });

    let run_id = DebateEvent::new_run_id();
    let outcome = engine
        .run_with_id(&run_id, &topic, config.max_turns, config.first_speaker)
        .await;

    if printer.await.is_err() {
        warn!("transcript task ended abnormally");
    }

    let record = match &outcome {
        Ok(done) => DebateRecord::completed(&run_id, done),
        Err(e) => DebateRecord::failed(&run_id, e),
    };
    if let Some(path) = &config.record_path {
        let json = record.to_json()?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), "Run record saved");
    }

    match outcome {
        Ok(done) => {
            info!(winner = %done.verdict.winner, turns = done.state.transcript.len(), "Debate concluded");
            println!("\nFull debate log saved to {}", config.log_path.display());
            Ok(())
        }
        Err(e) => {
            error!(phase = %e.phase, turns = e.transcript().len(), "Debate failed: {}", e.cause);
            Err(e.into())
        }
    }
}
