use std::path::PathBuf;

use clap::Parser;

/// Streams a CodePup generation and prints one JSON event per line as the
/// app's files are reconstructed.
#[derive(Debug, Parser)]
#[command(name = "codepup-exec", version)]
pub struct Cli {
    /// Prompt describing the app to generate.
    pub prompt: Option<String>,

    /// Base URL of the generation backend.
    #[arg(long, default_value = "http://localhost:3000", value_name = "URL")]
    pub backend_url: String,

    /// Idle timeout in milliseconds while waiting for stream data.
    #[arg(long, value_name = "MILLIS")]
    pub idle_timeout_ms: Option<u64>,

    /// Replay a recorded SSE exchange from a file instead of contacting the
    /// backend. The prompt is ignored.
    #[arg(long, value_name = "FILE")]
    pub fixture: Option<PathBuf>,
}
