use crate::client::Client;

pub mod generate;
pub mod list;
pub mod save;
pub mod suggest;

/// Suggest baby names and keep a list of the ones you like
#[derive(Debug, clap::Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
	/// The endpoint of the names api
	#[clap(long, env = "NAMES_ENDPOINT", default_value = "http://localhost:4000")]
	pub endpoint: String,

	/// The access token of the signed in user
	#[clap(long, env = "NAMES_ACCESS_TOKEN")]
	pub token: Option<String>,

	/// The url of the name generation service
	#[clap(long, env = "NAMES_GENERATOR_URL")]
	pub generator_url: Option<String>,

	/// The key for the name generation service
	#[clap(long, env = "NAMES_GENERATOR_KEY")]
	pub generator_key: Option<String>,

	/// Json output
	#[clap(long)]
	pub json: bool,

	#[clap(subcommand)]
	pub command: Commands,
}

#[async_trait::async_trait]
pub trait Invokable {
	async fn invoke(&self, client: &Client, args: &Cli) -> anyhow::Result<()>;
}

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
	/// Generate a name suggestion
	Generate(generate::Generate),

	/// Save a name to your list
	Save(save::Save),

	/// List your saved names
	List(list::List),

	/// Generate a name and optionally save it
	Suggest(suggest::Suggest),
}

#[async_trait::async_trait]
impl Invokable for Commands {
	async fn invoke(&self, client: &Client, args: &Cli) -> anyhow::Result<()> {
		match self {
			Self::Generate(cmd) => cmd.invoke(client, args).await,
			Self::Save(cmd) => cmd.invoke(client, args).await,
			Self::List(cmd) => cmd.invoke(client, args).await,
			Self::Suggest(cmd) => cmd.invoke(client, args).await,
		}
	}
}
