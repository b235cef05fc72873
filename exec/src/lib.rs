//! Command line front-end for CodePup generation streams.
//!
//! Connects to the backend (or replays a fixture), watches the session's
//! snapshots, and prints JSONL [`codepup_protocol::SessionEvent`]s to stdout.
//! Logs go to stderr so the event stream stays machine-readable.

#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]

use anyhow::Context;
use codepup_backend_client::BackendInfo;
use codepup_backend_client::GenerateRequest;
use codepup_backend_client::GenerationClient;
use codepup_backend_client::GenerationHandle;
use codepup_backend_client::stream_from_fixture;
use codepup_protocol::SessionEvent;
use codepup_protocol::SessionState;
use tracing::error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod cli;
mod event_processor;

pub use cli::Cli;
pub use event_processor::EventProcessor;

pub async fn run_main(cli: Cli) -> anyhow::Result<()> {
    let stderr_fmt = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    let _ = tracing_subscriber::registry()
        .with(stderr_fmt)
        .with(EnvFilter::from_default_env())
        .try_init();

    let handle = start_stream(&cli).await?;

    let mut snapshots = handle.snapshots();
    let mut processor = EventProcessor::new();
    let mut closed = false;
    loop {
        let snapshot = snapshots.borrow_and_update().clone();
        let error = if snapshot.state == SessionState::Error {
            handle.last_error().await.map(|e| e.to_string())
        } else {
            None
        };
        for event in processor.collect_events(&snapshot, error.as_deref()) {
            emit(&event);
        }
        if snapshot.state.is_terminal() || closed {
            break;
        }

        tokio::select! {
            changed = snapshots.changed() => {
                // A closed channel still leaves the final value readable;
                // loop once more to report it.
                closed = changed.is_err();
            }
            _ = tokio::signal::ctrl_c() => {
                handle.stop();
            }
        }
    }

    handle.wait().await;
    Ok(())
}

async fn start_stream(cli: &Cli) -> anyhow::Result<GenerationHandle> {
    match &cli.fixture {
        Some(path) => stream_from_fixture(path)
            .await
            .with_context(|| format!("failed to replay fixture {}", path.display())),
        None => {
            let prompt = cli
                .prompt
                .clone()
                .context("a prompt is required unless --fixture is given")?;
            let mut info = BackendInfo::new(&cli.backend_url);
            info.stream_idle_timeout_ms = cli.idle_timeout_ms;
            GenerationClient::new(info)
                .stream_generation(&GenerateRequest::new(prompt))
                .await
                .context("failed to start generation stream")
        }
    }
}

#[allow(clippy::print_stdout)]
fn emit(event: &SessionEvent) {
    match serde_json::to_string(event) {
        Ok(line) => println!("{line}"),
        Err(e) => error!("failed to serialize event: {e:?}"),
    }
}
