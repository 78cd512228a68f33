#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;

use std::process;

use anyhow::Context;
use scout_agent::{AgentService, AskError, AskRequest, ChatService};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::config::{Cli, Command, Services, create_services};

// Tracing target constants
pub const TRACING_TARGET_STARTUP: &str = "scout_cli::startup";
pub const TRACING_TARGET_SHUTDOWN: &str = "scout_cli::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "scout_cli::config";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::debug!(
            target: TRACING_TARGET_SHUTDOWN,
            "application terminated successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SHUTDOWN,
            error = %error,
            "application terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    cli.init_tracing();
    cli.log();
    cli.validate()?;

    tracing::info!(
        target: TRACING_TARGET_STARTUP,
        version = env!("CARGO_PKG_VERSION"),
        "starting scout"
    );

    let Services { agent, chat } = create_services(&cli)
        .await
        .context("failed to create services")?;

    match cli.command {
        Command::Ask { question } => ask(&agent, question).await,
        Command::Chat => {
            let chat = chat.context("chat needs --policy-corpus or --document-corpus")?;
            chat_loop(&chat).await
        }
    }
}

/// Answers one question and prints it to stdout.
async fn ask(agent: &AgentService, question: String) -> anyhow::Result<()> {
    let response = match agent.ask(AskRequest::new(question)).await {
        Ok(response) => response,
        Err(AskError::InvalidRequest(reason)) => anyhow::bail!("invalid question: {reason}"),
        Err(error) => return Err(error.into()),
    };

    println!("{}", response.answer);

    let contributors = response
        .contributors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>();
    eprintln!("\nsources: {}", contributors.join(", "));
    if !response.unverified.is_empty() {
        let unverified = response
            .unverified
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>();
        eprintln!("unverified: {}", unverified.join(", "));
    }
    if response.timed_out {
        eprintln!("note: the answer was cut short by the request deadline");
    }

    Ok(())
}

/// Reads messages from stdin until EOF or `/exit`.
///
/// `/clear` starts over with an empty history.
async fn chat_loop(chat: &ChatService) -> anyhow::Result<()> {
    let mut session = chat.create_session();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    tracing::info!(target: TRACING_TARGET_STARTUP, session_id = %session, "Chat session started");

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let message = line.trim();

        match message {
            "" => continue,
            "/exit" | "/quit" => break,
            "/clear" => {
                chat.clear_session(session).await?;
                session = chat.create_session();
                stdout.write_all(b"(history cleared)\n").await?;
            }
            _ => {
                let reply = chat.chat(session, message).await?;
                let mut output = reply.answer;
                if !reply.sources.is_empty() {
                    output.push_str(&format!("\n[sources: {}]", reply.sources.join(", ")));
                }
                output.push('\n');
                stdout.write_all(output.as_bytes()).await?;
            }
        }
    }

    Ok(())
}
