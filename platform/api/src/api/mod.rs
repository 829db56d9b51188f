use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use common::http::{error_body, RouteError};
use common::make_response;
use common::prelude::FutureTimeout;
use hyper::server::conn::Http;
use hyper::{Body, StatusCode};
use routerify::{RequestServiceBuilder, Router};
use tokio::net::TcpSocket;
use tokio::select;

use self::error::ApiError;
use crate::config::ApiConfig;
use crate::global::ApiGlobal;

pub mod error;
mod health;
pub mod names;

pub fn routes<G: ApiGlobal>(global: &Arc<G>) -> Router<Body, RouteError<ApiError>> {
	let weak = Arc::downgrade(global);
	Router::builder()
		.data(weak)
		.err_handler_with_info(common::http::error_handler::<ApiError>)
		.get("/health", health::health)
		.scope("/api", names::routes(global))
		.any(|_| async move { Ok(make_response!(StatusCode::NOT_FOUND, error_body("Not Found"))) })
		.build()
		.expect("failed to build router")
}

async fn tls_acceptor(config: &ApiConfig) -> anyhow::Result<Option<Arc<tokio_rustls::TlsAcceptor>>> {
	let Some(tls) = &config.tls else {
		return Ok(None);
	};

	tracing::info!("TLS enabled");
	let cert = tokio::fs::read(&tls.cert).await.context("failed to read api ssl cert")?;
	let key = tokio::fs::read(&tls.key)
		.await
		.context("failed to read api ssl private key")?;

	let key = rustls::PrivateKey(
		rustls_pemfile::pkcs8_private_keys(&mut io::BufReader::new(io::Cursor::new(key)))?
			.into_iter()
			.next()
			.ok_or_else(|| anyhow::anyhow!("failed to find private key in api private key file"))?,
	);

	let certs = rustls_pemfile::certs(&mut io::BufReader::new(io::Cursor::new(cert)))?
		.into_iter()
		.map(rustls::Certificate)
		.collect();

	Ok(Some(Arc::new(tokio_rustls::TlsAcceptor::from(Arc::new(
		rustls::ServerConfig::builder()
			.with_safe_defaults()
			.with_no_client_auth()
			.with_single_cert(certs, key)?,
	)))))
}

pub async fn run<G: ApiGlobal>(global: Arc<G>) -> anyhow::Result<()> {
	let config = global.config::<ApiConfig>();
	tracing::info!("API listening on {}", config.bind_address);
	let socket = if config.bind_address.is_ipv6() {
		TcpSocket::new_v6()?
	} else {
		TcpSocket::new_v4()?
	};

	socket.set_reuseaddr(true)?;
	socket.set_reuseport(true)?;
	socket.bind(config.bind_address)?;
	let listener = socket.listen(1024)?;

	let tls_acceptor = tls_acceptor(config).await?;

	// The router only holds a Weak reference to the global state, so open
	// keep-alive connections never keep it alive past shutdown.
	let request_service = RequestServiceBuilder::new(routes(&global)).expect("failed to build request service");

	loop {
		select! {
			_ = global.ctx().done() => {
				return Ok(());
			},
			r = listener.accept() => {
				let (socket, addr) = r?;

				let tls_acceptor = tls_acceptor.clone();
				let service = request_service.build(addr);

				tracing::debug!("Accepted connection from {}", addr);

				tokio::spawn(async move {
					if let Some(tls_acceptor) = tls_acceptor {
						let Ok(Ok(socket)) = tls_acceptor.accept(socket).timeout(Duration::from_secs(5)).await else {
							return;
						};
						tracing::debug!("TLS handshake complete");
						Http::new().serve_connection(socket, service).await.ok();
					} else {
						Http::new().serve_connection(socket, service).await.ok();
					}
				});
			},
		}
	}
}
