use hyper::{Body, StatusCode};

use crate::http::ext::ResultExt;
use crate::http::{RouteError, ShouldLog};

#[derive(thiserror::Error, Debug)]
#[error("boom")]
struct Boom;

type Result<T, E = RouteError<Boom>> = std::result::Result<T, E>;

async fn body_json(err: RouteError<Boom>) -> serde_json::Value {
	let body = hyper::body::to_bytes(err.response().into_body())
		.await
		.expect("failed to read body");
	serde_json::from_slice(&body).expect("body is not json")
}

#[tokio::test]
async fn test_error_from_residual_string() {
	let fn1 = || -> Result<()> {
		Err::<(), _>("error from fn1")?;
		Ok(())
	};

	let err = fn1().unwrap_err();

	assert_eq!(err.should_log(), ShouldLog::Yes);
	assert_eq!(err.location().file(), file!());
	assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
	assert_eq!(body_json(err).await, serde_json::json!({ "error": "error from fn1" }));
}

#[test]
fn test_error_from_residual_response() {
	let fn1 = || -> Result<()> {
		Err::<(), _>(
			hyper::Response::builder()
				.status(StatusCode::BAD_REQUEST)
				.body(Body::empty())
				.unwrap(),
		)?;
		Ok(())
	};

	let err = fn1().unwrap_err();

	assert_eq!(err.should_log(), ShouldLog::No);
	assert_eq!(err.location().file(), file!());
	assert_eq!(err.response().status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_error_from_residual_tuple() {
	let fn1 = || -> Result<()> {
		Err::<(), _>((StatusCode::UNAUTHORIZED, "Authentication failed"))?;
		Ok(())
	};

	let err = fn1().unwrap_err();

	assert_eq!(err.should_log(), ShouldLog::No);
	assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
	assert_eq!(body_json(err).await, serde_json::json!({ "error": "Authentication failed" }));
}

#[tokio::test]
async fn test_map_err_route_keeps_source_private() {
	let fn1 = || -> Result<()> {
		Err::<(), _>(Boom).map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "Error saving name"))
	};

	let err = fn1().unwrap_err();

	assert_eq!(err.should_log(), ShouldLog::Yes);
	assert!(err.source_ref().is_some());
	assert_eq!(err.location().file(), file!());
	assert_eq!(body_json(err).await, serde_json::json!({ "error": "Error saving name" }));
}

#[test]
fn test_sourced_client_error_logs_at_debug() {
	let err: RouteError<Boom> = (StatusCode::UNAUTHORIZED, "Authentication failed", Boom).into();
	assert_eq!(err.should_log(), ShouldLog::Debug);
}
