// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Profile enrichment server binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use enrich_server::{create_app_state, create_router, version, with_static_files};
use tower_http::{
	cors::{Any, CorsLayer},
	trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// enrich-server - fills identity-profile metadata from third-party providers.
#[derive(Parser, Debug)]
#[command(name = "enrich-server", about = "Identity profile enrichment server", version)]
struct Args {
	/// Config file to use instead of /etc/enrich/server.toml
	#[arg(long, env = "ENRICH_SERVER_CONFIG")]
	config: Option<PathBuf>,

	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Show version and build information
	Version,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	if let Some(Command::Version) = args.command {
		println!("{}", version::format_version_info());
		return Ok(());
	}

	// Load .env file if present
	dotenvy::dotenv().ok();

	let config = match &args.config {
		Some(path) => enrich_server_config::load_config_with_file(path)?,
		None => enrich_server_config::load_config()?,
	};

	tracing_subscriber::registry()
		.with(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| config.logging.level.clone().into()),
		)
		.with(tracing_subscriber::fmt::layer())
		.init();

	tracing::info!(
		host = %config.http.host,
		port = config.http.port,
		idp_domain = %config.idp.domain,
		write_mode = %config.pipeline.write_mode,
		"starting enrich-server"
	);

	let state = create_app_state(&config)?;

	let mut app = create_router(state);
	if let Some(web_dir) = &config.paths.web_dir {
		tracing::info!(web_dir = %web_dir.display(), "serving static files");
		app = with_static_files(app, web_dir);
	}

	let app = app.layer(TraceLayer::new_for_http()).layer(
		CorsLayer::new()
			.allow_origin(Any)
			.allow_methods(Any)
			.allow_headers(Any),
	);

	let addr = config.socket_addr();
	tracing::info!(addr = %addr, "listening");
	let listener = tokio::net::TcpListener::bind(&addr).await?;

	tokio::select! {
		result = axum::serve(listener, app) => {
			if let Err(e) = result {
				tracing::error!(error = %e, "Server error");
			}
		}
		_ = tokio::signal::ctrl_c() => {
			tracing::info!("Received shutdown signal");
		}
	}

	tracing::info!("Server shutdown complete");
	Ok(())
}
