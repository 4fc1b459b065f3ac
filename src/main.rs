use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use loqa_voice::session::status;
use loqa_voice::{create_router, AppState, Config, Language, NatsVoiceService, VoiceSessionController};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "loqa-voice", about = "Bilingual voice assistant session controller")]
struct Cli {
    /// Config file (without extension)
    #[arg(long, default_value = "config/loqa-voice")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the HTTP control API
    Serve,
    /// Control a session from the console
    Talk {
        /// Language to start with (en or ar)
        #[arg(long)]
        language: Option<Language>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let cfg = Config::load(&cli.config)?;

    info!("Loqa Voice v0.1.0");
    info!("Loaded config: {}", cfg.service.name);

    let service = NatsVoiceService::connect(
        &cfg.voice.nats_url,
        cfg.voice.subject_prefix.clone(),
        cfg.request_timeout(),
    )
    .await?;

    let mut session_config = cfg.session_config()?;
    if let Command::Talk {
        language: Some(language),
    } = cli.command
    {
        session_config = session_config.with_language(language);
    }

    let controller = VoiceSessionController::spawn(Arc::new(service), session_config);

    match cli.command {
        Command::Serve => serve(&cfg, controller.clone()).await?,
        Command::Talk { .. } => talk(controller.clone()).await?,
    }

    controller.teardown().await?;
    info!("Shut down cleanly");

    Ok(())
}

async fn serve(cfg: &Config, controller: VoiceSessionController) -> Result<()> {
    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("HTTP server listening on {}", addr);

    axum::serve(listener, create_router(AppState::new(controller)))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await
        .context("HTTP server failed")?;

    Ok(())
}

async fn talk(controller: VoiceSessionController) -> Result<()> {
    let language = controller.snapshot().language;
    println!("{}", status::prompt_hint(language));
    println!("Commands: start, stop, lang <en|ar>, status, quit");

    // Print every snapshot change
    let mut updates = controller.subscribe();
    let printer = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let snapshot = updates.borrow_and_update().clone();
            println!("[{}] {}", snapshot.state, snapshot.status);
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read stdin")?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else { break };

        let mut words = line.split_whitespace();
        let result = match (words.next(), words.next()) {
            (None, _) => continue,
            (Some("start"), _) => controller.start().await,
            (Some("stop"), _) => controller.stop().await,
            (Some("lang"), Some(code)) => match code.parse::<Language>() {
                Ok(language) => controller.set_language(language).await,
                Err(e) => {
                    warn!("{}", e);
                    continue;
                }
            },
            (Some("status"), _) => {
                let snapshot = controller.snapshot();
                println!(
                    "[{}] {} (language: {})",
                    snapshot.state,
                    snapshot.status,
                    snapshot.language.display_name()
                );
                continue;
            }
            (Some("quit" | "exit"), _) => break,
            (Some(other), _) => {
                println!("Unknown command: {}", other);
                continue;
            }
        };

        if let Err(e) = result {
            warn!("{}", e);
            break;
        }
    }

    printer.abort();
    Ok(())
}
