//! authgate-probe
//!
//! Configures the HTTP auth hook the way a broker would and evaluates
//! decisions against the configured authorities. Prints one verdict per
//! evaluation on stdout and exits non-zero when the last one denies.
//!
//! Configuration layers, later wins:
//!
//! 1. built-in defaults
//! 2. `--config <path>` (YAML, keys `authgate` and `logging`)
//! 3. `HTTP_URL_AUTH`, `HTTP_URL_ACL`, `HTTP_AUTH_CACHE`, `HTTP_ACL_CACHE`,
//!    `HTTP_CLIENT_TIMEOUT`
//! 4. `AUTHGATE_<KEY>` with `__` for nesting, e.g. `AUTHGATE_AUTH__URL`

mod config;
mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, bail};
use authgate::HttpAuthHook;
use authgate_sdk::{AuthHook, AuthenticateRequest, AuthorizeRequest, DecisionRequest};
use clap::{Parser, Subcommand};
use tracing::info;

use crate::config::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "authgate-probe")]
#[command(version, about, long_about = None)]
struct Cli {
    /// YAML configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Evaluate the request this many times; repeats are served from cache
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    repeat: u32,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check a client connect
    Authenticate {
        #[arg(long, default_value = "")]
        client_id: String,
        #[arg(long, default_value = "")]
        username: String,
        /// Read from `AUTHGATE_PROBE_PASSWORD` when not given
        #[arg(
            long,
            env = config::PASSWORD_ENV,
            default_value = "",
            hide_env_values = true
        )]
        password: String,
    },
    /// Check publish or subscribe access to a topic
    Authorize {
        #[arg(long, default_value = "")]
        client_id: String,
        #[arg(long, default_value = "")]
        username: String,
        #[arg(long)]
        topic: String,
        /// Publish access; subscribe access when absent
        #[arg(long)]
        write: bool,
    },
    /// Print the effective hook configuration and exit
    Config,
}

impl Command {
    fn into_request(self) -> Option<DecisionRequest> {
        match self {
            Self::Authenticate {
                client_id,
                username,
                password,
            } => Some(
                AuthenticateRequest::new(client_id, username, password.into_bytes()).into(),
            ),
            Self::Authorize {
                client_id,
                username,
                topic,
                write,
            } => Some(AuthorizeRequest::new(client_id, username, topic, write).into()),
            Self::Config => None,
        }
    }
}

async fn evaluate(hook: &HttpAuthHook, request: &DecisionRequest) -> bool {
    match request {
        DecisionRequest::Authenticate(req) => hook.on_connect_authenticate(req).await,
        DecisionRequest::Authorize(req) => hook.on_acl_check(req).await,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    logging::init(&config.logging)?;

    let Some(request) = cli.command.into_request() else {
        println!("{}", serde_json::to_string_pretty(&config.authgate)?);
        return Ok(ExitCode::SUCCESS);
    };

    let hook = HttpAuthHook::configure(&config.authgate).context("invalid hook configuration")?;
    if !hook.provides(request.capability()) {
        bail!("{} does not provide {}", hook.id(), request.capability());
    }
    hook.start();

    let mut allowed = false;
    for attempt in 1..=cli.repeat {
        allowed = evaluate(&hook, &request).await;
        println!(
            "{attempt}: {} {} {}",
            request.capability(),
            request.username(),
            if allowed { "allow" } else { "deny" }
        );
    }

    info!(
        auth = ?hook.auth_metrics(),
        acl = ?hook.acl_metrics(),
        "Decision cache metrics"
    );
    hook.shutdown().await;

    Ok(if allowed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
