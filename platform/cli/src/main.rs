use std::time::Duration;

use anyhow::Context as _;
use clap::Parser;
use cli::Invokable;
use client::Client;
use common::context::Context;
use common::prelude::FutureTimeout;

mod cli;
mod client;

#[cfg(test)]
mod tests;

#[tokio::main]
async fn main() {
	let (context, handler) = Context::new();

	if let Err(err) = start(context).await {
		eprintln!("{:#}", err);
		std::process::exit(1);
	}

	handler.cancel().await;
}

async fn start(context: Context) -> anyhow::Result<()> {
	let cli = cli::Cli::parse();

	let client = Client::new(&cli).context("failed to build client")?;

	// Generation calls go through an AI provider and can be slow
	cli.command
		.invoke(&client, &cli)
		.timeout(Duration::from_secs(60))
		.await
		.context("command timed out")?
		.context("failed to invoke command")?;

	drop(context);

	Ok(())
}
