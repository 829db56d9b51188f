use common::http::RouteError;
use hyper::Method;

use crate::auth::AuthError;
use crate::database::StoreError;

pub type Result<T, E = RouteError<ApiError>> = std::result::Result<T, E>;

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
	#[error("authentication failed")]
	Auth(#[from] AuthError),
	#[error("invalid request: {0}")]
	Validation(&'static str),
	#[error("persistence failed")]
	Persistence(#[from] StoreError),
	#[error("method {method} not allowed, expected {allowed}")]
	MethodNotAllowed { method: Method, allowed: &'static str },
	#[error("failed to read http body")]
	ParseHttpBody(#[from] hyper::Error),
	#[error("request body exceeds {0} bytes")]
	BodyTooLarge(usize),
}
