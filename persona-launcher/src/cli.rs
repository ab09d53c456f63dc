use backend::{AdapterConfig, Locale};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(about = "Persona chat endpoint")]
pub struct Cli {
    #[command(flatten)]
    pub provider: ProviderArgs,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    #[command(about = "Serve the chat endpoint over HTTP")]
    Serve(ServeArgs),
    #[command(about = "Handle a single serverless-style event and print the reply")]
    Invoke {
        /// JSON event file ({"httpMethod": ..., "body": ...}); stdin when omitted
        #[arg(long)]
        event: Option<PathBuf>,
    },
}

#[derive(Args, Clone)]
pub struct ServeArgs {
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,
    #[arg(long, default_value_t = 8080)]
    pub port: u16,
}

impl Default for ServeArgs {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

#[derive(Args)]
pub struct ProviderArgs {
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,
    #[arg(long, env = "OPENAI_API_BASE", default_value = backend::config::DEFAULT_API_BASE, global = true)]
    pub api_base: String,
    #[arg(long, env = "PERSONA_MODEL", default_value = backend::config::DEFAULT_MODEL, global = true)]
    pub model: String,
    /// Language the characters answer in (ru or en)
    #[arg(long, env = "PERSONA_LOCALE", default_value = "ru", global = true)]
    pub locale: Locale,
}

impl ProviderArgs {
    pub fn adapter_config(&self) -> AdapterConfig {
        AdapterConfig {
            api_key: self.api_key.clone(),
            ..AdapterConfig::default()
        }
        .with_api_base(self.api_base.clone())
        .with_model(self.model.clone())
        .with_locale(self.locale)
    }
}
