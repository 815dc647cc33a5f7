//! Request handlers.
//!
//! Every handler ends in exactly one of [`respond_with_success`] or
//! [`respond_with_error`].

use super::respond::{respond_with_error, respond_with_success, HOME_BODY};
use super::Api;
use crate::error::ApiError;
use crate::http::{ApiRequest, ApiResponse};
use crate::model::{Resource, ResourceKind};
use crate::router::{Endpoint, Operation, RouteTable};
use crate::store::Store;
use bytes::Bytes;
use serde::Serialize;
use tracing::debug;

impl Api {
    /// Route `request` through `routes` and run the matching handler.
    ///
    /// Requests that match no route get the router's plain 404.
    pub async fn dispatch(&self, routes: &RouteTable, mut request: ApiRequest) -> ApiResponse {
        let (endpoint, params) = match routes.find(&request.method, &request.path) {
            Some((route, params)) => (route.endpoint, params),
            None => {
                debug!(method = %request.method, path = %request.path, "no route");
                return ApiResponse::not_found();
            }
        };
        request.params = params;
        self.handle(endpoint, &request).await
    }

    /// Run the handler for an already matched endpoint.
    pub async fn handle(&self, endpoint: Endpoint, request: &ApiRequest) -> ApiResponse {
        let result = match endpoint {
            Endpoint::Home => Ok(Bytes::from_static(HOME_BODY.as_bytes())),
            Endpoint::Resource(kind, op) => self.resource(kind, op, request).await,
            Endpoint::LogProxy => self.function_logs(request).await,
        };

        match result {
            Ok(payload) => respond_with_success(payload),
            Err(err) => respond_with_error(&err),
        }
    }

    async fn resource(
        &self,
        kind: ResourceKind,
        op: Operation,
        request: &ApiRequest,
    ) -> Result<Bytes, ApiError> {
        let name = request.param(kind.placeholder());
        match kind {
            ResourceKind::Function => crud(&self.functions, op, name, request).await,
            ResourceKind::HttpTrigger => crud(&self.http_triggers, op, name, request).await,
            ResourceKind::TimeTrigger => crud(&self.time_triggers, op, name, request).await,
            ResourceKind::Environment => crud(&self.environments, op, name, request).await,
            ResourceKind::Watch => crud(&self.watches, op, name, request).await,
        }
    }

    async fn function_logs(&self, request: &ApiRequest) -> Result<Bytes, ApiError> {
        let db_type = request
            .param("dbType")
            .ok_or_else(|| ApiError::invalid_argument("missing log database type"))?;

        self.log_proxy
            .forward(
                db_type,
                request.query.as_deref(),
                request.get_header("content-type").map(String::as_str),
                request.body.clone(),
            )
            .await
    }
}

async fn crud<R: Resource>(
    store: &Store<R>,
    op: Operation,
    name: Option<&str>,
    request: &ApiRequest,
) -> Result<Bytes, ApiError> {
    match op {
        Operation::List => to_json(&store.list().await?),
        Operation::Create => {
            let resource: R = serde_json::from_slice(&request.body)?;
            to_json(&store.create(resource).await?)
        }
        Operation::Get => to_json(&store.get(required::<R>(name)?).await?),
        Operation::Update => {
            let name = required::<R>(name)?;
            let resource: R = serde_json::from_slice(&request.body)?;
            if resource.metadata().name != name {
                return Err(ApiError::invalid_argument(format!(
                    "{} name in URL '{}' does not match name in body '{}'",
                    R::KIND,
                    name,
                    resource.metadata().name
                )));
            }
            to_json(&store.update(resource).await?)
        }
        Operation::Delete => {
            store.delete(required::<R>(name)?).await?;
            Ok(Bytes::new())
        }
    }
}

fn required<R: Resource>(name: Option<&str>) -> Result<&str, ApiError> {
    name.ok_or_else(|| ApiError::invalid_argument(format!("missing {} name", R::KIND)))
}

fn to_json<T: Serialize>(value: &T) -> Result<Bytes, ApiError> {
    serde_json::to_vec(value)
        .map(Bytes::from)
        .map_err(|e| ApiError::internal(format!("failed to encode response: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{Method, JSON_CONTENT_TYPE};
    use crate::model::{Function, Metadata};
    use crate::store::ResourceStore;
    use hyper::StatusCode;
    use std::sync::Arc;

    fn api() -> Api {
        Api::with_env(
            &ResourceStore::in_memory("/fission"),
            Arc::new(|_: &str| -> Option<String> { None }),
        )
    }

    #[tokio::test]
    async fn test_home() {
        let api = api();
        let response = api
            .dispatch(&RouteTable::controller(), ApiRequest::new(Method::Get, "/"))
            .await;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.get_header("content-type"), Some(JSON_CONTENT_TYPE));
        assert_eq!(
            response.text_body(),
            "{\"message\": \"Fission API\", \"version\": \"0.1.0\"}\n"
        );
    }

    #[tokio::test]
    async fn test_create_returns_metadata() {
        let api = api();
        let request = ApiRequest::new(Method::Post, "/v1/functions")
            .json(&Function::new("hello", "nodejs"))
            .unwrap();

        let response = api.dispatch(&RouteTable::controller(), request).await;

        assert_eq!(response.status, StatusCode::OK);
        let meta: Metadata = serde_json::from_slice(&response.body).unwrap();
        assert_eq!(meta.name, "hello");
        assert!(!meta.uid.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let api = api();
        let request = ApiRequest::new(Method::Post, "/v1/environments").body("{not json");

        let response = api.dispatch(&RouteTable::controller(), request).await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_update_name_mismatch() {
        let api = api();
        api.functions
            .create(Function::new("hello", "nodejs"))
            .await
            .unwrap();

        let request = ApiRequest::new(Method::Put, "/v1/functions/hello")
            .json(&Function::new("other", "nodejs"))
            .unwrap();
        let response = api.dispatch(&RouteTable::controller(), request).await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert!(response.text_body().contains("does not match"));
    }

    #[tokio::test]
    async fn test_unmatched_route_is_router_not_found() {
        let api = api();
        let response = api
            .dispatch(
                &RouteTable::controller(),
                ApiRequest::new(Method::Patch, "/v1/functions/hello"),
            )
            .await;

        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.text_body(), "404 page not found\n");
    }

    #[tokio::test]
    async fn test_missing_resource_is_core_not_found() {
        let api = api();
        let response = api
            .dispatch(
                &RouteTable::controller(),
                ApiRequest::new(Method::Get, "/v1/watches/ghost"),
            )
            .await;

        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.text_body(), "watch 'ghost' not found\n");
    }

    #[tokio::test]
    async fn test_log_proxy_rejects_unknown_database() {
        let api = api();
        let response = api
            .dispatch(
                &RouteTable::controller(),
                ApiRequest::new(Method::Post, "/proxy/splunk").body("q=x"),
            )
            .await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
    }
}
