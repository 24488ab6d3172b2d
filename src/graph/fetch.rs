//! Graph provider backed by a JSON HTTP endpoint through the browser's `fetch`.

use serde::de::DeserializeOwned;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

use super::filter::GraphFilter;
use super::provider::GraphProvider;
use super::types::{GraphSnapshot, Node};
use crate::error::GraphError;

/// Talks to `POST {base}/graph` and `GET {base}/nodes/{id}`.
#[derive(Clone, Debug)]
pub struct HttpGraphProvider {
	base_url: String,
}

impl HttpGraphProvider {
	/// Creates a client rooted at `base_url` (without trailing slash).
	pub fn new(base_url: &str) -> Self {
		Self {
			base_url: base_url.trim_end_matches('/').to_string(),
		}
	}

	/// URL for `path` below the base.
	pub fn url(&self, path: &str) -> String {
		format!("{}{}", self.base_url, path)
	}

	async fn request<T: DeserializeOwned>(
		&self,
		method: &str,
		path: &str,
		body: Option<String>,
		resource: Option<&str>,
	) -> Result<T, GraphError> {
		let opts = RequestInit::new();
		opts.set_method(method);
		opts.set_mode(RequestMode::Cors);
		if let Some(body) = &body {
			opts.set_body(&JsValue::from_str(body));
		}

		let request =
			Request::new_with_str_and_init(&self.url(path), &opts).map_err(upstream("request"))?;
		if body.is_some() {
			request
				.headers()
				.set("Content-Type", "application/json")
				.map_err(upstream("headers"))?;
		}

		let window = web_sys::window()
			.ok_or_else(|| GraphError::UpstreamUnavailable("no window".into()))?;
		let response: Response = JsFuture::from(window.fetch_with_request(&request))
			.await
			.map_err(upstream("fetch"))?
			.dyn_into()
			.map_err(upstream("response"))?;

		if !response.ok() {
			return Err(status_error(response.status(), path, resource));
		}

		let text = JsFuture::from(response.text().map_err(upstream("body"))?)
			.await
			.map_err(upstream("body"))?
			.as_string()
			.unwrap_or_default();
		decode(&text)
	}
}

impl GraphProvider for HttpGraphProvider {
	async fn fetch_graph(&self, filter: &GraphFilter) -> Result<GraphSnapshot, GraphError> {
		let body = serde_json::to_string(filter)
			.map_err(|e| GraphError::UpstreamUnavailable(e.to_string()))?;
		let graph: GraphSnapshot = self.request("POST", "/graph", Some(body), None).await?;
		// The backend may ignore parts of the filter; re-derive locally.
		Ok(filter.apply(&graph))
	}

	async fn fetch_node(&self, id: &str) -> Result<Node, GraphError> {
		let encoded = String::from(js_sys::encode_uri_component(id));
		self.request("GET", &format!("/nodes/{encoded}"), None, Some(id)).await
	}
}

/// Maps a failed HTTP status. Only a lookup of a named `resource` turns a
/// 404 into `NotFound`; anything else means the backend misbehaved.
fn status_error(status: u16, path: &str, resource: Option<&str>) -> GraphError {
	match (status, resource) {
		(404, Some(id)) => GraphError::NotFound(id.to_string()),
		_ => GraphError::UpstreamUnavailable(format!("HTTP {status} for {path}")),
	}
}

fn decode<T: DeserializeOwned>(text: &str) -> Result<T, GraphError> {
	serde_json::from_str(text)
		.map_err(|e| GraphError::UpstreamUnavailable(format!("bad payload: {e}")))
}

fn upstream(stage: &'static str) -> impl Fn(JsValue) -> GraphError {
	move |e| GraphError::UpstreamUnavailable(format!("{stage}: {e:?}"))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn base_url_is_trimmed() {
		let p = HttpGraphProvider::new("https://sentinel.local/api/");
		assert_eq!(p.url("/graph"), "https://sentinel.local/api/graph");
	}

	#[test]
	fn only_node_lookups_report_not_found() {
		assert_eq!(
			status_error(404, "/nodes/a%2Fb", Some("a/b")),
			GraphError::NotFound("a/b".into())
		);
		assert_eq!(
			status_error(404, "/graph", None),
			GraphError::UpstreamUnavailable("HTTP 404 for /graph".into())
		);
		assert!(matches!(
			status_error(500, "/nodes/x", Some("x")),
			GraphError::UpstreamUnavailable(_)
		));
	}

	#[test]
	fn malformed_payload_is_upstream_failure() {
		let err = decode::<GraphSnapshot>("{not json").unwrap_err();
		assert!(matches!(err, GraphError::UpstreamUnavailable(_)));
		let empty: GraphSnapshot = decode("{}").unwrap();
		assert!(empty.is_empty());
	}
}
