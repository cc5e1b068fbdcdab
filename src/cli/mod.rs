//! Command-line interface parsing and handling
//!
//! This module parses arguments, resolves the session, and drives the
//! one chat-completion call.

use std::env;
use std::error::Error;
use std::path::PathBuf;

use clap::Parser;

use crate::api::client::complete;
use crate::api::ChatMessage;
use crate::core::config::{ConfigFile, Overrides, Session};
use crate::core::error::SayError;

#[derive(Parser)]
#[command(name = "sayonce")]
#[command(about = "Send one prompt to an OpenAI-compatible chat API and print the reply")]
#[command(
    long_about = "Sayonce sends a single prompt to an OpenAI-compatible chat-completions \
endpoint and prints the assistant's reply to stdout. It is built for one-shot use behind \
AI gateways: static routing headers (e.g. x-provider, x-model) are passed through verbatim, \
and TLS verification can be disabled with an explicit flag for development gateways.\n\n\
Environment Variables:\n\
  OPENAI_API_KEY    Bearer credential (required)\n\
  OPENAI_BASE_URL   API base URL (optional, defaults to https://api.openai.com/v1)\n\n\
The model has no built-in default; pass --model or set `model` in the config file."
)]
pub struct Args {
    /// Prompt text; multiple words are joined with spaces
    #[arg(required = true, value_name = "PROMPT")]
    pub prompt: Vec<String>,

    /// Model identifier to request (falls back to `model` in the config file)
    #[arg(short = 'm', long, value_name = "MODEL")]
    pub model: Option<String>,

    /// API base URL (overrides OPENAI_BASE_URL and the config file)
    #[arg(short = 'b', long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Static header sent with the request (NAME=VALUE, repeatable)
    #[arg(short = 'H', long = "header", value_name = "NAME=VALUE")]
    pub headers: Vec<String>,

    /// Optional system message placed before the prompt
    #[arg(short = 's', long, value_name = "TEXT")]
    pub system: Option<String>,

    /// Disable TLS certificate verification (insecure; development and
    /// gateway use only)
    #[arg(short = 'k', long)]
    pub insecure: bool,

    /// Read configuration from PATH instead of the default location
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

pub fn main() -> Result<(), Box<dyn Error>> {
    tokio::runtime::Runtime::new()?.block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_tracing();

    match run(args).await {
        Ok(content) => {
            println!("{content}");
            Ok(())
        }
        Err(err) => {
            eprintln!("❌ Error: {err}");
            std::process::exit(err.exit_code());
        }
    }
}

/// The straight-line sequence for one invocation: resolve the session,
/// build the message list, issue the call, return the reply text.
pub async fn run(args: Args) -> Result<String, SayError> {
    let prompt = args.prompt.join(" ");
    if prompt.trim().is_empty() {
        return Err(SayError::configuration("prompt must not be empty"));
    }

    let file = ConfigFile::load(args.config.as_deref())?;
    let overrides = Overrides {
        api_key: env::var("OPENAI_API_KEY").ok(),
        base_url: args.base_url,
        base_url_env: env::var("OPENAI_BASE_URL").ok(),
        model: args.model,
        headers: parse_header_flags(&args.headers)?,
        insecure: args.insecure,
    };
    let session = Session::resolve(overrides, file)?;

    if session.insecure {
        eprintln!(
            "⚠️  TLS certificate verification is disabled; the connection cannot be trusted."
        );
    }

    let mut messages = Vec::new();
    if let Some(system) = args.system {
        messages.push(ChatMessage::system(system));
    }
    messages.push(ChatMessage::user(prompt));

    complete(&session, messages).await
}

/// Split repeated `--header NAME=VALUE` flags into pairs.
pub fn parse_header_flags(flags: &[String]) -> Result<Vec<(String, String)>, SayError> {
    flags
        .iter()
        .map(|flag| match flag.split_once('=') {
            Some((name, value)) if !name.trim().is_empty() => {
                Ok((name.trim().to_string(), value.to_string()))
            }
            _ => Err(SayError::configuration(format!(
                "invalid --header '{flag}': expected NAME=VALUE"
            ))),
        })
        .collect()
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    // Diagnostics go to stderr; stdout carries only the reply.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
