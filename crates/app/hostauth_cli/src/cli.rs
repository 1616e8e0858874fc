use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use hostauth_client::{ClientConfig, HostSession};
use hostauth_core::LoginRedirect;

use crate::{Error, Result};

#[derive(Parser, Debug)]
#[command(name = "hostauth", version, about = "Host auth session tools")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the version.
    Version,
    /// Log in against a running auth API, fetch the current user and log out.
    Check(CheckArgs),
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// API base URL including the `/api` prefix.
    #[arg(long, env = "HOSTAUTH_BASE_URL", default_value = hostauth_client::config::DEFAULT_BASE_URL)]
    pub base_url: String,

    #[arg(long, env = "HOSTAUTH_EMAIL")]
    pub email: String,

    #[arg(long, env = "HOSTAUTH_PASSWORD")]
    pub password: String,

    /// Skip the final logout, leaving the server-side session live.
    #[arg(long, default_value_t = false)]
    pub keep: bool,
}

struct LogRedirect;

impl LoginRedirect for LogRedirect {
    fn login_required(&self) {
        log::warn!("session expired, login required");
    }
}

/// Run the session check: restore or log in, print the current user as JSON, log out.
pub fn check(args: &CheckArgs) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run_check(args))
}

async fn run_check(args: &CheckArgs) -> Result<()> {
    let config = ClientConfig {
        base_url: args.base_url.clone(),
        ..ClientConfig::from_env()
    };
    let host = HostSession::connect(&config, Arc::new(LogRedirect))?;

    if host.auth().initialize().await {
        log::info!("restored existing session");
    } else {
        let user = host.auth().login(&args.email, &args.password).await?;
        log::info!("logged in as {} ({})", user.email, user.role);
    }

    let user = host.auth().me().await?;
    println!("{}", serde_json::to_string(&user)?);

    if !args.keep {
        host.auth().logout().await;
        if host.session().is_authenticated() {
            return Err(Error::Custom("session still live after logout".into()));
        }
    }

    Ok(())
}
