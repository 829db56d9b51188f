use std::sync::Arc;

use common::context::Context;

use crate::auth::{self, TokenVerifier};
use crate::config::{ApiConfig, AppConfig};
use crate::database::{self, NameStore, PgNameStore};
use crate::telemetry::ErrorReporter;

pub trait ApiState {
	fn verifier(&self) -> &Arc<dyn TokenVerifier>;
	fn name_store(&self) -> &Arc<dyn NameStore>;
	fn reporter(&self) -> &Arc<dyn ErrorReporter>;
}

pub trait ApiGlobal:
	common::global::GlobalCtx
	+ common::global::GlobalConfigProvider<ApiConfig>
	+ common::global::GlobalConfig
	+ ApiState
	+ Send
	+ Sync
	+ 'static
{
}

impl<T> ApiGlobal for T where
	T: common::global::GlobalCtx
		+ common::global::GlobalConfigProvider<ApiConfig>
		+ common::global::GlobalConfig
		+ ApiState
		+ Send
		+ Sync
		+ 'static
{
}

pub struct GlobalState {
	ctx: Context,
	config: AppConfig,
	verifier: Arc<dyn TokenVerifier>,
	name_store: Arc<dyn NameStore>,
	reporter: Arc<dyn ErrorReporter>,
}

impl GlobalState {
	pub fn new(
		ctx: Context,
		config: AppConfig,
		verifier: Arc<dyn TokenVerifier>,
		name_store: Arc<dyn NameStore>,
		reporter: Arc<dyn ErrorReporter>,
	) -> Self {
		Self {
			ctx,
			config,
			verifier,
			name_store,
			reporter,
		}
	}

	/// Connects to postgres and builds the verifier the config asks for.
	pub async fn setup(ctx: Context, config: AppConfig, reporter: Arc<dyn ErrorReporter>) -> anyhow::Result<Self> {
		let verifier = auth::verifier_from_config(&config.auth)?;
		let db = database::setup_database(&config.database).await?;

		Ok(Self::new(ctx, config, verifier, Arc::new(PgNameStore::new(db)), reporter))
	}
}

impl common::global::GlobalCtx for GlobalState {
	fn ctx(&self) -> &Context {
		&self.ctx
	}
}

impl common::global::GlobalConfigProvider<ApiConfig> for GlobalState {
	fn provide_config(&self) -> &ApiConfig {
		&self.config.api
	}
}

impl common::global::GlobalConfigProvider<AppConfig> for GlobalState {
	fn provide_config(&self) -> &AppConfig {
		&self.config
	}
}

impl common::global::GlobalConfig for GlobalState {}

impl ApiState for GlobalState {
	fn verifier(&self) -> &Arc<dyn TokenVerifier> {
		&self.verifier
	}

	fn name_store(&self) -> &Arc<dyn NameStore> {
		&self.name_store
	}

	fn reporter(&self) -> &Arc<dyn ErrorReporter> {
		&self.reporter
	}
}
