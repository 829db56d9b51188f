use crate::cli::{Cli, Invokable};
use crate::client::{Client, Suggestion};

#[derive(Debug, clap::Args)]
pub struct Suggest {
	/// Save the suggestion right away
	#[clap(long)]
	save: bool,
}

#[async_trait::async_trait]
impl Invokable for Suggest {
	async fn invoke(&self, client: &Client, _: &Cli) -> anyhow::Result<()> {
		let name = client.generator()?.generate().await?;

		if !self.save {
			return client.display(&Suggestion { name });
		}

		let record = client.api()?.save_name(&name).await?;

		client.display(&record)
	}
}
