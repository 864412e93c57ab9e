mod chart;
mod conversation;
mod display;
mod error;
mod llm;
mod services;
mod session;
#[cfg(test)]
mod test_support;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::display::TerminalSink;
use crate::error::ErrorCode;
use crate::llm::LlmClient;
use crate::llm::config::LlmConfig;
use crate::services::prompts::Persona;
use crate::services::transcript::HistoryWindow;
use crate::services::turn::{TurnOrchestrator, TurnSettings};
use crate::session::ChatSession;

#[derive(Parser, Debug)]
#[command(name = "samaritan", about = "Chat with a retrieval-grounded assistant that can draw charts")]
struct Cli {
    /// Instruction set, banner, and default model.
    #[arg(long, value_enum, env = "SAMARITAN_PERSONA", default_value_t = Persona::Book)]
    persona: Persona,

    /// Model id; overrides OPENAI_MODEL and the persona default.
    #[arg(long)]
    model: Option<String>,

    /// Skip the haiku after each answer.
    #[arg(long, env = "SAMARITAN_NO_POET")]
    no_poet: bool,

    /// Resend only the last N turns with each question (0 = all).
    #[arg(long, env = "SAMARITAN_HISTORY_TURNS", default_value_t = 0)]
    history_turns: usize,

    /// Also write each chart as a standalone HTML file here.
    #[arg(long, env = "SAMARITAN_CHART_DIR")]
    chart_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let dotenv = dotenvy::dotenv();
    init_tracing();
    if let Err(e) = dotenv {
        if !e.not_found() {
            tracing::warn!(error = %e, ".env file could not be loaded");
        }
    }

    let cli = Cli::parse();

    let mut config = match LlmConfig::from_env(cli.persona.default_model()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error_code = e.error_code(), error = %e, "LLM config invalid");
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(model) = cli.model {
        config.model = model;
    }

    let client = match LlmClient::from_config(&config) {
        Ok(client) => {
            tracing::info!(model = client.model(), persona = ?cli.persona, "LLM client initialized");
            client
        }
        Err(e) => {
            tracing::error!(error_code = e.error_code(), error = %e, "LLM client build failed");
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let settings = TurnSettings {
        persona: cli.persona,
        model: client.model().to_string(),
        knowledge_base_id: config.knowledge_base_id,
        poet_enabled: !cli.no_poet,
        history: HistoryWindow::from_turns(cli.history_turns),
        max_output_tokens: config.max_output_tokens,
    };
    let mut session = ChatSession::new(TurnOrchestrator::new(Arc::new(client), settings));
    let mut sink = TerminalSink::new(std::io::stdout(), cli.chart_dir);
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());

    match session.run(stdin, &mut sink).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error_code = e.error_code(), error = %e, "session aborted");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
