use std::panic::Location;
use std::sync::Arc;

use common::http::ext::{RequestGlobalExt, ResultExt};
use common::http::RouteError;
use common::make_response;
use hyper::body::HttpBody;
use hyper::header::{self, HeaderMap};
use hyper::{Body, Method, Request, Response, StatusCode};
use routerify::Router;
use serde_json::json;
use uuid::Uuid;

use super::error::{ApiError, Result};
use crate::auth::{bearer_token, UserIdentity};
use crate::global::ApiGlobal;
use crate::telemetry::ReportContext;

/// Body of a save request. Anything that does not deserialize into this is
/// treated as a request without a name.
#[derive(Debug, Default, serde::Deserialize)]
pub struct SaveNameRequest {
	#[serde(default)]
	pub name: Option<String>,
}

impl SaveNameRequest {
	pub fn from_body(body: &[u8]) -> Self {
		serde_json::from_slice(body).unwrap_or_default()
	}

	/// The name as sent, unless it is missing or blank.
	pub fn name(&self) -> Option<&str> {
		self.name.as_deref().filter(|name| !name.trim().is_empty())
	}
}

/// Upper bound on a buffered request body.
pub const MAX_BODY_SIZE: usize = 16 * 1024;

async fn read_body(mut body: Body) -> Result<Vec<u8>> {
	let too_large = || -> RouteError<ApiError> {
		(
			StatusCode::PAYLOAD_TOO_LARGE,
			"Request body too large",
			ApiError::BodyTooLarge(MAX_BODY_SIZE),
		)
			.into()
	};

	if body.size_hint().lower() > MAX_BODY_SIZE as u64 {
		return Err(too_large());
	}

	let mut buf = Vec::new();
	while let Some(chunk) = body.data().await {
		let chunk = chunk.map_err_route((StatusCode::BAD_REQUEST, "Invalid request body"))?;
		if buf.len() + chunk.len() > MAX_BODY_SIZE {
			return Err(too_large());
		}

		buf.extend_from_slice(&chunk);
	}

	Ok(buf)
}

struct Endpoint {
	route: &'static str,
	allow: &'static str,
	failure: &'static str,
}

const SAVE_NAME: Endpoint = Endpoint {
	route: "/api/saveName",
	allow: "POST",
	failure: "Error saving name",
};

const GET_NAMES: Endpoint = Endpoint {
	route: "/api/getNames",
	allow: "GET",
	failure: "Error fetching names",
};

impl Endpoint {
	#[track_caller]
	fn method_not_allowed(&self, method: &Method) -> RouteError<ApiError> {
		let resp = Response::builder()
			.status(StatusCode::METHOD_NOT_ALLOWED)
			.header(header::ALLOW, self.allow)
			.header(header::CONTENT_TYPE, "text/plain")
			.body(Body::from(format!("Method {method} Not Allowed")))
			.expect("failed to build response");

		RouteError::from(resp).with_source(Some(ApiError::MethodNotAllowed {
			method: method.clone(),
			allowed: self.allow,
		}))
	}

	/// Reports `err` and hides it behind the endpoint's generic message.
	#[track_caller]
	fn server_error<G: ApiGlobal>(&self, global: &G, user_id: Option<Uuid>, err: impl Into<ApiError>) -> RouteError<ApiError> {
		let err = err.into();

		global.reporter().capture(
			&err,
			&ReportContext {
				route: self.route,
				user_id,
			},
		);

		RouteError::from((StatusCode::INTERNAL_SERVER_ERROR, self.failure, err)).with_location(Location::caller())
	}

	async fn authenticate<G: ApiGlobal>(&self, global: &G, headers: &HeaderMap) -> Result<UserIdentity> {
		let result = match bearer_token(headers) {
			Ok(token) => global.verifier().verify(token).await,
			Err(err) => Err(err),
		};

		match result {
			Ok(user) => Ok(user),
			Err(err) if err.is_unauthorized() => Err((StatusCode::UNAUTHORIZED, "Authentication failed", err).into()),
			Err(err) => Err(self.server_error(global, None, err)),
		}
	}
}

#[tracing::instrument(name = "save_name", skip_all, fields(method = %req.method()))]
async fn save_name<G: ApiGlobal>(req: Request<Body>) -> Result<Response<Body>> {
	if req.method() != Method::POST {
		return Err(SAVE_NAME.method_not_allowed(req.method()));
	}

	let global = req.get_global::<G>()?;
	let user = SAVE_NAME.authenticate(global.as_ref(), req.headers()).await?;

	let body = read_body(req.into_body()).await?;

	let request = SaveNameRequest::from_body(&body);
	let Some(name) = request.name() else {
		return Err((StatusCode::BAD_REQUEST, "Name is required", ApiError::Validation("missing name")).into());
	};

	let record = global
		.name_store()
		.insert(name, user.id)
		.await
		.map_err(|err| SAVE_NAME.server_error(global.as_ref(), Some(user.id), err))?;

	tracing::debug!(id = record.id, user_id = %user.id, "name saved");

	Ok(make_response!(StatusCode::CREATED, json!(record)))
}

#[tracing::instrument(name = "get_names", skip_all, fields(method = %req.method()))]
async fn get_names<G: ApiGlobal>(req: Request<Body>) -> Result<Response<Body>> {
	if req.method() != Method::GET {
		return Err(GET_NAMES.method_not_allowed(req.method()));
	}

	let global = req.get_global::<G>()?;
	let user = GET_NAMES.authenticate(global.as_ref(), req.headers()).await?;

	let records = global
		.name_store()
		.list_by_owner(user.id)
		.await
		.map_err(|err| GET_NAMES.server_error(global.as_ref(), Some(user.id), err))?;

	tracing::debug!(count = records.len(), user_id = %user.id, "names listed");

	Ok(make_response!(StatusCode::OK, json!(records)))
}

pub fn routes<G: ApiGlobal>(_: &Arc<G>) -> Router<Body, RouteError<ApiError>> {
	Router::builder()
		.any_method("/saveName", save_name::<G>)
		.any_method("/getNames", get_names::<G>)
		.build()
		.expect("failed to build router")
}
