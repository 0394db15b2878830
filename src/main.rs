use std::sync::{Arc, Mutex};

use bicepgen::adapters::ReqwestHttpClient;
use bicepgen::client::{GeneratorClient, DEFAULT_BASE_URL};
use bicepgen::session::{SessionController, SessionId};
use bicepgen::sse::StreamEvent;
use bicepgen::traits::{EndReason, RenderSink};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use tokio::sync::mpsc;

const NO_CODE_SENTINEL: &str = "// No code generated";

struct CliArgs {
    prompt: String,
    avm: bool,
    url: String,
}

fn print_usage() {
    eprintln!("Usage: bicepgen [--avm] [--url URL] <prompt>");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --avm        Generate using Azure Verified Modules");
    eprintln!("  --url URL    Backend base URL (default: {})", DEFAULT_BASE_URL);
}

fn parse_args(args: &[String]) -> Result<CliArgs> {
    let mut avm = false;
    let mut url = DEFAULT_BASE_URL.to_string();
    let mut prompt_parts: Vec<&str> = Vec::new();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--avm" => avm = true,
            "--url" => {
                url = iter
                    .next()
                    .ok_or_else(|| eyre!("--url requires a value"))?
                    .clone();
            }
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => prompt_parts.push(other),
        }
    }

    if prompt_parts.is_empty() {
        print_usage();
        return Err(eyre!("a prompt is required"));
    }

    Ok(CliArgs {
        prompt: prompt_parts.join(" "),
        avm,
        url,
    })
}

/// Sink that narrates progress on stderr and accumulates template text,
/// so stdout carries nothing but the generated Bicep.
struct TerminalSink {
    chunks: Mutex<String>,
    done: mpsc::UnboundedSender<EndReason>,
}

impl TerminalSink {
    fn new(done: mpsc::UnboundedSender<EndReason>) -> Self {
        Self {
            chunks: Mutex::new(String::new()),
            done,
        }
    }

    fn collected(&self) -> String {
        self.chunks.lock().unwrap().clone()
    }
}

impl RenderSink for TerminalSink {
    fn on_event(&self, _session: SessionId, event: StreamEvent) {
        match event {
            StreamEvent::Progress { message } | StreamEvent::Streaming { message } => {
                eprintln!("{}", message);
            }
            StreamEvent::Chunk { content } => {
                self.chunks.lock().unwrap().push_str(&content);
            }
            StreamEvent::Debug { debug: debug_info } => {
                tracing::debug!(debug = ?debug_info, "backend debug info");
            }
            StreamEvent::Complete { bicep } => {
                if let Some(bicep) = bicep {
                    let mut chunks = self.chunks.lock().unwrap();
                    chunks.clear();
                    chunks.push_str(&bicep);
                }
            }
            StreamEvent::Error { error } => {
                eprintln!("Generation error: {}", error);
            }
        }
    }

    fn session_ended(&self, _session: SessionId, reason: EndReason) {
        let _ = self.done.send(reason);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let args = parse_args(&args)?;

    let http = Arc::new(ReqwestHttpClient::new());
    let client = GeneratorClient::with_url(args.url, http);

    let (done_tx, mut done_rx) = mpsc::unbounded_channel();
    let sink = Arc::new(TerminalSink::new(done_tx));
    let controller = Arc::new(SessionController::new(client, sink.clone()));

    controller
        .generate(&args.prompt, args.avm)
        .map_err(|e| eyre!(e))?;

    let reason = done_rx
        .recv()
        .await
        .ok_or_else(|| eyre!("session ended without notification"))?;

    match reason {
        EndReason::Completed => {
            let template = sink.collected();
            if template.trim().is_empty() {
                println!("{}", NO_CODE_SENTINEL);
            } else {
                println!("{}", template);
            }
            Ok(())
        }
        EndReason::Failed(err) => Err(eyre!(err)),
        EndReason::Cancelled => Err(eyre!("session was cancelled")),
    }
}
