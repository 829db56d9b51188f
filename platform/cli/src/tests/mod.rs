use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use common::context::Context;
use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Request, Response, StatusCode};
use platform_api::auth::{JwtVerifier, UserIdentity};
use platform_api::config::{AppConfig, JwtConfig};
use platform_api::database::MemoryNameStore;
use platform_api::global::GlobalState;
use platform_api::telemetry::TracingReporter;

use crate::client::generator::{parse_suggestion, PROMPT};
use crate::client::{ApiClient, ClientError, GenerationClient};

#[test]
fn test_parse_suggestion() {
	assert_eq!(parse_suggestion("  Aria \n").unwrap(), "Aria");
	assert_eq!(parse_suggestion("\"Luca\"").unwrap(), "Luca");
	assert_eq!(parse_suggestion(" \"  Noor \" ").unwrap(), "Noor");
	assert_eq!(parse_suggestion("How about \"Ezra\"?").unwrap(), "How about \"Ezra\"?");

	assert!(matches!(parse_suggestion(""), Err(ClientError::EmptySuggestion)));
	assert!(matches!(parse_suggestion(" \n "), Err(ClientError::EmptySuggestion)));
	assert!(matches!(parse_suggestion("\"  \""), Err(ClientError::EmptySuggestion)));
}

#[test]
fn test_error_from_response() {
	let err = ClientError::from_response(reqwest::StatusCode::BAD_REQUEST, r#"{"error":"Name is required"}"#);
	assert_eq!(err.to_string(), "400 Bad Request: Name is required");

	let err = ClientError::from_response(reqwest::StatusCode::METHOD_NOT_ALLOWED, "Method GET Not Allowed\n");
	assert_eq!(err.to_string(), "405 Method Not Allowed: Method GET Not Allowed");
}

async fn generator(req: Request<Body>) -> Result<Response<Body>, Infallible> {
	let authorized = req
		.headers()
		.get(hyper::header::AUTHORIZATION)
		.is_some_and(|v| v.as_bytes() == b"Bearer generator-key");

	let body = hyper::body::to_bytes(req.into_body()).await.unwrap();
	let body: serde_json::Value = serde_json::from_slice(&body).unwrap();

	let resp = if !authorized {
		Response::builder()
			.status(StatusCode::UNAUTHORIZED)
			.body(Body::from(r#"{"error":"invalid key"}"#))
	} else if body["event_type"] != "chatgpt_request"
		|| body["data"]["prompt"] != PROMPT
		|| body["data"]["response_type"] != "text"
	{
		Response::builder().status(StatusCode::BAD_REQUEST).body(Body::empty())
	} else {
		Response::builder().body(Body::from("\"  Noor\\n\""))
	};

	Ok(resp.unwrap())
}

fn start_generator() -> SocketAddr {
	let port = portpicker::pick_unused_port().expect("failed to pick port");
	let addr = SocketAddr::from(([127, 0, 0, 1], port));

	tokio::spawn(
		hyper::Server::bind(&addr).serve(make_service_fn(|_| async { Ok::<_, Infallible>(service_fn(generator)) })),
	);

	addr
}

#[tokio::test]
async fn test_generate() {
	let addr = start_generator();
	let http = reqwest::Client::new();

	let client = GenerationClient::new(http.clone(), &format!("http://{addr}"), Some("generator-key".to_string()));
	assert_eq!(client.generate().await.unwrap(), "Noor");

	let client = GenerationClient::new(http, &format!("http://{addr}"), None);
	match client.generate().await {
		Err(ClientError::Status { status, message }) => {
			assert_eq!(status, reqwest::StatusCode::UNAUTHORIZED);
			assert_eq!(message, "invalid key");
		}
		r => panic!("unexpected result: {r:?}"),
	}
}

#[tokio::test]
async fn test_api_client() {
	let port = portpicker::pick_unused_port().expect("failed to pick port");

	let mut config = AppConfig::default();
	config.api.bind_address = format!("127.0.0.1:{port}").parse().unwrap();

	let jwt_config = JwtConfig {
		secret: "cli-secret".to_string(),
		..Default::default()
	};
	let jwt = JwtVerifier::new(&jwt_config).unwrap();
	let user = uuid::Uuid::new_v4();
	let token = jwt
		.sign(
			&UserIdentity { id: user, email: None },
			chrono::Utc::now() + chrono::Duration::hours(1),
		)
		.unwrap();

	let (ctx, handler) = Context::new();
	let global = Arc::new(GlobalState::new(
		ctx,
		config,
		Arc::new(jwt),
		Arc::new(MemoryNameStore::new()),
		Arc::new(TracingReporter::new(&Default::default())),
	));

	let task = tokio::spawn(platform_api::api::run(global.clone()));
	tokio::time::sleep(Duration::from_millis(200)).await;

	let endpoint = format!("http://127.0.0.1:{port}/");
	let api = ApiClient::new(reqwest::Client::new(), &endpoint, &token);

	assert!(api.get_names().await.unwrap().is_empty());

	let record = api.save_name("Aria").await.unwrap();
	assert_eq!(record.name, "Aria");
	assert_eq!(record.user_id, user);

	let names = api.get_names().await.unwrap();
	assert_eq!(names, vec![record]);

	match api.save_name("  ").await {
		Err(ClientError::Status { status, message }) => {
			assert_eq!(status, reqwest::StatusCode::BAD_REQUEST);
			assert_eq!(message, "Name is required");
		}
		r => panic!("unexpected result: {r:?}"),
	}

	let stranger = ApiClient::new(reqwest::Client::new(), &endpoint, "not-a-token");
	match stranger.get_names().await {
		Err(ClientError::Status { status, message }) => {
			assert_eq!(status, reqwest::StatusCode::UNAUTHORIZED);
			assert_eq!(message, "Authentication failed");
		}
		r => panic!("unexpected result: {r:?}"),
	}

	drop(global);
	handler.cancel().await;
	task.await.unwrap().unwrap();
}
