// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! flow-publisher REST server binary

use anyhow::Context;
use clap::Parser;
use fp_core::InMemoryPlatform;
use fp_logging::CliLoggingArgs;
use fp_rest_server::demo::{demo_platform, demo_publications};
use fp_rest_server::{Server, ServerConfig, ServerDependencies};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Bind address for the server
    #[arg(short, long, env = "FP_BIND")]
    bind: Option<SocketAddr>,

    /// TOML configuration file with server settings and publications
    #[arg(short, long, env = "FP_CONFIG")]
    config: Option<PathBuf>,

    /// Path segment operations are served under
    #[arg(long)]
    service_root: Option<String>,

    /// Externally visible base URL used in operation descriptions
    #[arg(long)]
    public_url: Option<String>,

    /// Enable CORS for any origin
    #[arg(long)]
    cors: bool,

    /// Serve the built-in demo catalog
    #[arg(long)]
    demo: bool,

    #[command(flatten)]
    logging: CliLoggingArgs,
}

impl Args {
    fn server_config(&self) -> anyhow::Result<ServerConfig> {
        let mut config = match &self.config {
            Some(path) => ServerConfig::from_file(path)?,
            None => ServerConfig::default(),
        };
        if let Some(bind) = self.bind {
            config.bind_addr = bind;
        }
        if let Some(root) = &self.service_root {
            config.service_root = root.clone();
        }
        if let Some(url) = &self.public_url {
            config.public_url = Some(url.clone());
        }
        config.enable_cors |= self.cors;
        if self.demo {
            config.publications.extend(demo_publications());
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    args.logging.clone().init("fp-rest-server")?;

    let config = args.server_config()?;
    tracing::info!(
        publications = config.publications.len(),
        demo = args.demo,
        "Starting flow-publisher REST server"
    );

    let platform = if args.demo {
        demo_platform()
    } else {
        InMemoryPlatform::new()
    };
    let state = ServerDependencies::new(config, Arc::new(platform))
        .context("publication failed, refusing to start")?
        .into_state();

    Server::with_state(state).run().await?;
    Ok(())
}
