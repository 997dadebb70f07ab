use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use clap::{Parser, Subcommand};
use turnstream_core::{
    config::{Config, HttpCfg, SpeechCfg, UpstreamCfg},
    driver::StreamDriver,
    error::CoreResult,
    model::{ChatMessage, MessageUpdate, ModelOptions, Role, SpeakPolicy, TurnRequest, TurnTarget},
    sink::MessageSink,
    speech::SpeechSynthesizer,
    telemetry::{self, ReportSink, TurnReport, keys},
};

#[derive(Parser)]
#[command(author, version, about = "turnstream CLI smoke tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Stream one assistant turn (prints the reply live)
    Chat {
        #[arg(long)]
        model: String,
        #[arg(short, long, help = "Message from the user")]
        message: String,
        #[arg(long, help = "Config file (JSON or TOML)")]
        config: Option<PathBuf>,
        #[arg(long, default_value = "http://localhost:3000/stream-chat")]
        endpoint: String,
        #[arg(long, default_value_t = 0.7)]
        temperature: f32,
        #[arg(long, default_value_t = 1024)]
        max_tokens: u32,
        /// Speak the first paragraph as it arrives
        #[arg(long)]
        speak: bool,
        /// Cancel the turn after this many milliseconds (demo)
        #[arg(long)]
        cancel_after_ms: Option<u64>,
    },
    /// Load a config file and report what it resolves to
    CheckConfig {
        #[arg(long)]
        config: PathBuf,
    },
}

/// Prints reply deltas to stdout as cumulative updates arrive.
struct StdoutSink {
    printed: Mutex<String>,
}

impl StdoutSink {
    fn new() -> Self {
        Self {
            printed: Mutex::new(String::new()),
        }
    }
}

#[async_trait]
impl MessageSink for StdoutSink {
    async fn apply(&self, _target: &TurnTarget, update: MessageUpdate, _touch: bool) {
        if let Some(label) = &update.origin_label {
            eprintln!("[origin: {label}]");
        }
        if let Some(text) = &update.text {
            let mut printed = self.printed.lock().unwrap_or_else(|e| e.into_inner());
            if text.starts_with(printed.as_str()) {
                print!("{}", &text[printed.len()..]);
            } else {
                // The leading metadata packet was carved out; reprint.
                print!("\r{text}");
            }
            io::stdout().flush().ok();
            *printed = text.clone();
        }
        if update.in_progress == Some(false) {
            println!();
        }
    }
}

/// Stand-in synthesizer: announces the paragraph instead of voicing it.
struct SayAloud;

#[async_trait]
impl SpeechSynthesizer for SayAloud {
    async fn speak(&self, text: &str) -> CoreResult<()> {
        eprintln!("[speak] {text}");
        Ok(())
    }
}

struct ReportPrinter;

impl ReportSink for ReportPrinter {
    fn record(&self, r: TurnReport) {
        let mut parts: Vec<String> = Vec::new();
        if let Some(v) = &r.conversation_id {
            parts.push(format!("{}={}", keys::KEY_CONVERSATION_ID, v));
        }
        if let Some(v) = &r.message_id {
            parts.push(format!("{}={}", keys::KEY_MESSAGE_ID, v));
        }
        if let Some(v) = &r.model {
            parts.push(format!("{}={}", keys::KEY_MODEL, v));
        }
        if let Some(v) = &r.origin_label {
            parts.push(format!("{}={}", keys::KEY_ORIGIN_LABEL, v));
        }
        if let Some(v) = &r.termination {
            parts.push(format!("{}={}", keys::KEY_TERMINATION, v.as_str()));
        }
        if let Some(v) = r.chars_streamed {
            parts.push(format!("{}={}", keys::KEY_CHARS_STREAMED, v));
        }
        if let Some(v) = r.latency_ms {
            parts.push(format!("{}={}", keys::KEY_LATENCY_MS, v));
        }
        if let Some(v) = &r.error_kind {
            parts.push(format!("{}={}", keys::KEY_ERROR_KIND, v));
        }
        if let Some(v) = &r.error_message {
            parts.push(format!("{}={}", keys::KEY_ERROR_MESSAGE, v));
        }
        eprintln!("[report] {}", parts.join(" "));
    }
}

fn now_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Chat {
            model,
            message,
            config,
            endpoint,
            temperature,
            max_tokens,
            speak,
            cancel_after_ms,
        } => {
            let cfg = match config {
                Some(path) => Config::from_path(path)?,
                None => Config {
                    upstream: UpstreamCfg {
                        endpoint,
                        api_host: None,
                        api_key_env: Some("TURNSTREAM_API_KEY".into()),
                        organization_id: None,
                        routing_key_env: Some("TURNSTREAM_ROUTING_KEY".into()),
                    },
                    http: HttpCfg::default(),
                    speech: SpeechCfg::default(),
                },
            };

            telemetry::set_report_sink(Arc::new(ReportPrinter));

            let driver =
                StreamDriver::from_config(&cfg, Arc::new(StdoutSink::new()), Arc::new(SayAloud))?;
            tracing::info!(endpoint = %cfg.upstream.endpoint, "dispatching turn");

            let policy = if speak {
                SpeakPolicy::FirstParagraph
            } else {
                cfg.speech.auto_speak
            };
            let conversation_id = "cli".to_string();
            let req = TurnRequest {
                target: TurnTarget {
                    conversation_id: conversation_id.clone(),
                    message_id: format!("msg-{}", now_ms()),
                },
                model_id: model.clone(),
                options: ModelOptions {
                    model_ref: Some(model),
                    temperature: Some(temperature),
                    max_output_tokens: Some(max_tokens),
                },
                history: vec![ChatMessage {
                    role: Role::User,
                    content: message,
                }],
                access: cfg.upstream.access(),
                speak: policy,
            };

            if let Some(ms) = cancel_after_ms {
                let registry = driver.registry();
                tokio::spawn(async move {
                    tokio::time::sleep(std::time::Duration::from_millis(ms)).await;
                    if registry.stop(&conversation_id) {
                        eprintln!("[cancelled after {ms}ms]");
                    }
                });
            }

            let outcome = driver.run_turn(req).await?;
            eprintln!(
                "[{}] {} chars{}",
                outcome.termination.as_str(),
                outcome.text.chars().count(),
                outcome
                    .origin_label
                    .map(|l| format!(", origin {l}"))
                    .unwrap_or_default()
            );
        }
        Commands::CheckConfig { config } => {
            let cfg = Config::from_path(&config)?;
            let access = cfg.upstream.access();
            println!("endpoint: {}", cfg.upstream.endpoint);
            println!("api key set: {}", access.key.is_some());
            println!("routing key set: {}", access.routing_key.is_some());
            println!(
                "request timeout: {}",
                cfg.http
                    .request_timeout_ms
                    .map(|ms| format!("{ms}ms"))
                    .unwrap_or_else(|| "none".into())
            );
            println!("auto speak: {:?}", cfg.speech.auto_speak);
        }
    }

    Ok(())
}
