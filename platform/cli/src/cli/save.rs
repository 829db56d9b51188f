use crate::cli::{Cli, Invokable};
use crate::client::Client;

#[derive(Debug, clap::Args)]
pub struct Save {
	/// The name to save
	name: String,
}

#[async_trait::async_trait]
impl Invokable for Save {
	async fn invoke(&self, client: &Client, _: &Cli) -> anyhow::Result<()> {
		let record = client.api()?.save_name(&self.name).await?;

		client.display(&record)
	}
}
