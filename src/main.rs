//! chatdesk binary entry point

use std::io::Write;

use chatdesk::{
    cli::{Cli, Commands},
    config::{model_ids, Settings},
    services::{siliconflow::SiliconFlow, siliconflow::SiliconFlowOptions, ChatProvider},
    sessions::default_sessions_en,
    ChatError,
};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<()> {
    // Install error handler
    color_eyre::install()?;

    // Parse CLI arguments
    let cli = Cli::parse_args();

    let settings = Settings::load()?;

    // Set up logging
    if cli.verbose || settings.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("chatdesk=debug")
            .init();
    }

    // Handle commands
    match cli.command {
        Some(Commands::Chat {
            message,
            model,
            system,
        }) => {
            chat(&settings, message, model, system).await?;
        }
        Some(Commands::Models) => {
            for id in model_ids() {
                println!("{id}");
            }
        }
        Some(Commands::Sessions) => {
            let sessions = default_sessions_en();
            println!("{}", serde_json::to_string_pretty(&sessions)?);
        }
        Some(Commands::Version) => {
            println!("chatdesk version {}", env!("CARGO_PKG_VERSION"));
        }
        None => {
            println!("Use `chatdesk chat <message>` to start chatting");
            println!("Use --help for more information");
        }
    }

    Ok(())
}

async fn chat(
    settings: &Settings,
    message: String,
    model: Option<String>,
    system: Option<String>,
) -> Result<()> {
    let api_key = settings
        .effective_api_key()
        .ok_or_else(|| eyre!("No API key configured; set one in settings or SILICONFLOW_API_KEY"))?;

    let mut options = SiliconFlowOptions::from_settings(settings, api_key);
    if let Some(model) = model {
        options.model = model;
    }

    let system_prompt = system.unwrap_or_else(|| {
        default_sessions_en()
            .into_iter()
            .next()
            .map(|session| session.messages[0].content.clone())
            .unwrap_or_default()
    });

    let messages = vec![
        chatdesk::messages::ChatMessage::system(system_prompt),
        chatdesk::messages::ChatMessage::user(message),
    ];

    // Ctrl-C aborts the in-flight request
    let cancel = CancellationToken::new();
    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c_cancel.cancel();
        }
    });

    // Each snapshot is the full text so far; print only the new suffix
    let mut printed = 0usize;
    let on_result_change: chatdesk::services::OnResultChange<'_> = Box::new(move |text: &str| {
        print!("{}", &text[printed..]);
        printed = text.len();
        std::io::stdout().flush().ok();
    });

    let adapter = SiliconFlow::new(options)?;
    match adapter
        .call_chat_completion(&messages, Some(cancel), Some(on_result_change))
        .await
    {
        Ok(_) => {
            println!();
            Ok(())
        }
        Err(ChatError::Cancelled) => {
            eprintln!("\nCancelled");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
