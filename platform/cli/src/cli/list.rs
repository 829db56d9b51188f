use crate::cli::{Cli, Invokable};
use crate::client::Client;

#[derive(Debug, clap::Args)]
pub struct List {}

#[async_trait::async_trait]
impl Invokable for List {
	async fn invoke(&self, client: &Client, args: &Cli) -> anyhow::Result<()> {
		let records = client.api()?.get_names().await?;

		if records.is_empty() && !args.json {
			println!("You have not saved any names yet.");
			return Ok(());
		}

		client.display_array(&records)
	}
}
