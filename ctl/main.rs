#![forbid(unsafe_code)]

//! `simdeck-ctl`: command-line companion for `simdeck`.
//!
//! Talks to the server's HTTP API: submits programs, drives the engine, and
//! prints the state the web console would show.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde_json::{json, Value};

type CtlResult<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Interval between completion checks while waiting for a run to finish.
const RUN_POLL_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Parser)]
#[command(
    name = "simdeck-ctl",
    about = "Command-line client for the simdeck server",
    version,
    long_about = None
)]
struct Cli {
    /// Base URL of the simdeck server.
    #[arg(long, default_value = "http://127.0.0.1:5000")]
    url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Submit a program file and restart the engine.
    Submit {
        /// Path to the program text.
        file: PathBuf,
    },

    /// Execute one step.
    Step,

    /// Run to completion, then print the final registers.
    Run,

    /// Stop the engine.
    Exit,

    /// Print the register file.
    Registers,

    /// Print the data, stack and instruction memory.
    Memory,

    /// Print the trailing engine log.
    Logs,

    /// Print the execution status.
    Status,
}

fn main() {
    let args = Cli::parse();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("Failed to start runtime: {err}");
            std::process::exit(1);
        }
    };

    match runtime.block_on(run(&args)) {
        Ok(output) => {
            println!(
                "{}",
                serde_json::to_string_pretty(&output).unwrap_or_default()
            );
        }
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    }
}

async fn run(args: &Cli) -> CtlResult<Value> {
    let client = Client::new(&args.url);

    match &args.command {
        Command::Submit { file } => {
            let code = tokio::fs::read_to_string(file).await?;
            client.post("/submit", &json!({ "code": code })).await
        }
        Command::Step => client.control("N").await,
        Command::Exit => client.control("E").await,
        Command::Run => {
            client.control("R").await?;
            loop {
                tokio::time::sleep(RUN_POLL_INTERVAL).await;
                let status = client.get("/execution-status").await?;
                if status
                    .get("executionComplete")
                    .and_then(Value::as_bool)
                    .unwrap_or(false)
                {
                    break;
                }
            }
            client.get("/registers").await
        }
        Command::Registers => client.get("/registers").await,
        Command::Memory => client.get("/memory").await,
        Command::Logs => client.get("/logs").await,
        Command::Status => client.get("/execution-status").await,
    }
}

/// Thin JSON client over the server's HTTP API.
struct Client {
    http: reqwest::Client,
    base: String,
}

impl Client {
    fn new(base: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base: base.trim_end_matches('/').to_owned(),
        }
    }

    async fn get(&self, path: &str) -> CtlResult<Value> {
        let response = self.http.get(format!("{}{path}", self.base)).send().await?;
        Self::decode(response).await
    }

    async fn post(&self, path: &str, body: &Value) -> CtlResult<Value> {
        let response = self
            .http
            .post(format!("{}{path}", self.base))
            .json(body)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn control(&self, command: &str) -> CtlResult<Value> {
        self.post("/control", &json!({ "command": command })).await
    }

    /// Return the JSON body, or the server's `error` text for non-2xx
    /// responses.
    async fn decode(response: reqwest::Response) -> CtlResult<Value> {
        let status = response.status();
        let body: Value = response.json().await?;
        if status.is_success() {
            return Ok(body);
        }
        let message = body
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("unknown error")
            .to_owned();
        Err(format!("{status}: {message}").into())
    }
}
