use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use session_core::{SessionController, SessionEvent, SessionOptions};
use shared::domain::MessageOrigin;

mod config;
mod sim;

#[derive(Parser, Debug)]
struct Args {
    /// Path to a TOML app config; defaults to ./app.toml if present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, default_value = "nova-demo")]
    room_name: String,
    /// Hard cap on the whole session, in milliseconds.
    #[arg(long)]
    session_timeout_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();

    let app_config = config::load_config(args.config.as_deref())?;
    println!("{} — {}", app_config.page_title, app_config.page_description);

    let controller =
        SessionController::new_with_connector(app_config, Arc::new(sim::ScriptedConnector));
    let mut events = controller.subscribe_events();

    let mut options = SessionOptions::new(args.room_name, "demo-token");
    if let Some(ms) = args.session_timeout_ms {
        options.session_timeout = Duration::from_millis(ms);
    }
    controller.start(options).await?;

    let caps = controller.capabilities().await;
    println!(
        "controls: leave={} microphone={} chat={} camera={} screen_share={}",
        caps.leave, caps.microphone, caps.chat, caps.camera, caps.screen_share
    );
    controller.set_chat_open(true).await;

    // Drain session events until the script goes quiet.
    while let Ok(Ok(event)) =
        tokio::time::timeout(Duration::from_secs(3), events.recv()).await
    {
        match event {
            SessionEvent::PhaseChanged(phase) => println!("phase: {phase:?}"),
            SessionEvent::TranscriptUpdated { autoscroll } => {
                let transcript = controller.transcript().await;
                if let Some(entry) = transcript.last() {
                    let who = match entry.message.origin {
                        MessageOrigin::Local => "you",
                        MessageOrigin::Remote => "agent",
                    };
                    let mut flags = String::new();
                    if entry.buffered {
                        flags.push_str(" [buffered]");
                    }
                    if entry.message.edited {
                        flags.push_str(" [edited]");
                    }
                    if autoscroll {
                        flags.push_str(" [scroll]");
                    }
                    println!("{who}: {}{flags}", entry.message.text);
                }
            }
            SessionEvent::ImageUpdated(Some(image)) => {
                println!("image overlay: {} ({})", image.url, image.prompt);
            }
            SessionEvent::ImageUpdated(None) => println!("image overlay dismissed"),
            SessionEvent::ChatOpenChanged(open) => println!("chat open: {open}"),
        }
    }

    let transcript = controller.transcript().await;
    println!(
        "session ended in phase {:?} with {} transcript entries",
        controller.phase().await,
        transcript.len()
    );

    Ok(())
}
