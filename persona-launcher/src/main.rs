mod cli;

use axum::Router;
use backend::ChatAdapter;
use clap::Parser;
use shared::models::ChatEvent;
use std::net::SocketAddr;
use tokio::io::AsyncReadExt;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    let cli = cli::Cli::parse();
    let config = cli.provider.adapter_config();
    if config.api_key().is_none() {
        tracing::warn!("OPENAI_API_KEY is not set; chat requests will fail");
    }
    let adapter = ChatAdapter::openai(config);

    match cli.command.unwrap_or(cli::Command::Serve(cli::ServeArgs::default())) {
        cli::Command::Serve(args) => {
            let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
            tracing::info!(
                model = %adapter.config().model,
                locale = %adapter.config().locale,
                "Listening on {}",
                addr
            );
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            let router = backend::init(Router::new(), adapter);
            axum::serve(listener, router).await?;
        }
        cli::Command::Invoke { event } => {
            let raw = match event {
                Some(path) => tokio::fs::read_to_string(path).await?,
                None => {
                    let mut buf = String::new();
                    tokio::io::stdin().read_to_string(&mut buf).await?;
                    buf
                }
            };
            let event: ChatEvent = serde_json::from_str(&raw)?;
            let reply = adapter.handle(event).await;
            println!("{}", serde_json::to_string_pretty(&reply)?);
        }
    }
    Ok(())
}
