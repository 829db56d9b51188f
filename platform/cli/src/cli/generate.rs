use crate::cli::{Cli, Invokable};
use crate::client::{Client, Suggestion};

#[derive(Debug, clap::Args)]
pub struct Generate {}

#[async_trait::async_trait]
impl Invokable for Generate {
	async fn invoke(&self, client: &Client, _: &Cli) -> anyhow::Result<()> {
		let name = client.generator()?.generate().await?;

		client.display(&Suggestion { name })
	}
}
