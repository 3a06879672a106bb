//! rotator - secret rotation handler
//!
//! Runs as a Lambda function on the `provided` runtime by default. The
//! `invoke` and `rotate` subcommands drive the same handler from a shell.

use anyhow::Context;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use clap::{Parser, Subcommand};
use rotator::{Config, HttpBasicProbe, RotationHandler, Rotator};
use rotator_core::{RotationEvent, RotationStep};
use rotator_iam::SdkCredentialAuthority;
use rotator_lambda::{LambdaErrorResponse, RuntimeClient};
use rotator_secretsmanager::SdkSecretStore;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "rotator")]
#[command(about = "Secret rotation handler for service-specific credentials", long_about = None)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "ROTATOR_LOG_LEVEL", global = true)]
    log_level: String,

    /// Endpoint for every AWS client, e.g. a local emulator
    #[arg(long, env = "ROTATOR_ENDPOINT_URL", global = true)]
    endpoint_url: Option<String>,

    /// Configuration file (defaults to ./rotator.toml when present)
    #[arg(long, env = "ROTATOR_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve invocations from the Lambda Runtime API
    Serve,

    /// Run a single rotation step
    Invoke {
        #[arg(long)]
        secret_id: String,

        #[arg(long)]
        token: String,

        /// createSecret, setSecret, testSecret or finishSecret
        #[arg(long)]
        step: RotationStep,
    },

    /// Start a rotation; the service invokes the rotation function for each step
    Rotate {
        #[arg(long)]
        secret_id: String,

        /// Version token; a new one is generated when omitted
        #[arg(long)]
        token: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Lambda ships stdout to CloudWatch, which does not render colours
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "rotator={0},rotator_lambda={0},rotator_secretsmanager={0},rotator_iam={0}",
                    args.log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_ansi(false))
        .init();

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            let client = RuntimeClient::from_env()?;

            let rotator = match build_rotator(args.config, args.endpoint_url).await {
                Ok(rotator) => rotator,
                Err(e) => {
                    let error = LambdaErrorResponse::new("Runtime.InitError", format!("{:#}", e));
                    client.send_init_error(&error).await?;
                    return Err(e);
                }
            };

            let handler = RotationHandler::new(rotator);
            rotator_lambda::run(&client, &handler).await?;
        }
        Command::Invoke {
            secret_id,
            token,
            step,
        } => {
            let rotator = build_rotator(args.config, args.endpoint_url).await?;
            rotator
                .handle(&RotationEvent::new(&secret_id, &token, step))
                .await?;
            info!(secret_id = %secret_id, step = %step, "Step succeeded");
        }
        Command::Rotate { secret_id, token } => {
            let rotator = build_rotator(args.config, args.endpoint_url).await?;
            let token = token.unwrap_or_else(|| Uuid::new_v4().to_string());
            rotator.start_rotation(&secret_id, &token).await?;
        }
    }

    Ok(())
}

async fn build_rotator(
    config_path: Option<PathBuf>,
    endpoint_url: Option<String>,
) -> anyhow::Result<Rotator> {
    let mut config = Config::load(config_path.as_deref()).context("loading configuration")?;
    if endpoint_url.is_some() {
        config.aws.endpoint_url = endpoint_url;
    }

    let sdk_config = load_sdk_config(&config).await;
    let iam_config = sdk_config
        .clone()
        .into_builder()
        .region(Region::new(config.aws.iam_region.clone()))
        .build();

    let call_timeout = config.timeouts.call_timeout();
    let store = SdkSecretStore::from_conf(&sdk_config, call_timeout);
    let authority = SdkCredentialAuthority::from_conf(&iam_config, call_timeout);

    let http = reqwest::Client::builder()
        .build()
        .context("building HTTP client")?;
    let probe = HttpBasicProbe::new(http, config.timeouts.probe_timeout());

    info!(
        region = ?sdk_config.region(),
        iam_region = %config.aws.iam_region,
        endpoint_url = ?config.aws.endpoint_url,
        "Rotator configured"
    );

    Ok(Rotator::new(
        Arc::new(store),
        Arc::new(authority),
        Arc::new(probe),
    ))
}

async fn load_sdk_config(config: &Config) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(endpoint_url) = &config.aws.endpoint_url {
        loader = loader.endpoint_url(endpoint_url);
    }
    if let Some(region) = &config.aws.region {
        loader = loader.region(Region::new(region.clone()));
    }
    loader.load().await
}
