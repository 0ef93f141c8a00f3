//! The `Api` extension: routes, serializers and hooks bound to one dispatcher.

use crate::error::RouteError;
use crate::router::{Resolution, Router};
use bytes::Bytes;
use http::{Method, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use talaria_config::Config;
use talaria_core::{ApiError, ApiResult, Invocation, Reply, RouteArgs};
use talaria_middleware::{
    handler_fn, BoxedHandler, Dispatcher, Hook, Request, Response, DISPATCH_TARGET,
};
use talaria_negotiate::{SerializeContext, TemplateRenderer};
use tracing::Instrument;

/// Name used when none is given.
pub const DEFAULT_BLUEPRINT_NAME: &str = "api";

/// Builder for [`Api`].
#[must_use]
pub struct ApiBuilder {
    name: String,
    url_prefix: Option<String>,
    config: Option<Arc<Config>>,
    templates: Option<Arc<dyn TemplateRenderer>>,
    preprocessors: Vec<Hook<BoxedHandler>>,
    postprocessors: Vec<Hook<Reply>>,
    finalizers: Vec<Hook<Response>>,
}

impl ApiBuilder {
    fn new() -> Self {
        Self {
            name: DEFAULT_BLUEPRINT_NAME.to_string(),
            url_prefix: None,
            config: None,
            templates: None,
            preprocessors: Vec::new(),
            postprocessors: Vec::new(),
            finalizers: Vec::new(),
        }
    }

    /// Sets the name the api is registered under.
    pub fn blueprint_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Mounts every route under `prefix`.
    pub fn url_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.url_prefix = Some(prefix.into());
        self
    }

    /// Shares an existing configuration. Missing keys get their defaults.
    pub fn config(mut self, config: Arc<Config>) -> Self {
        self.config = Some(config);
        self
    }

    /// Replaces the templates used by the debug serializer.
    pub fn templates(mut self, templates: Arc<dyn TemplateRenderer>) -> Self {
        self.templates = Some(templates);
        self
    }

    /// Adds an initial preprocessor.
    pub fn preprocessor<F>(mut self, hook: F) -> Self
    where
        F: Fn(BoxedHandler) -> ApiResult<BoxedHandler> + Send + Sync + 'static,
    {
        self.preprocessors.push(Arc::new(hook));
        self
    }

    /// Adds an initial postprocessor.
    pub fn postprocessor<F>(mut self, hook: F) -> Self
    where
        F: Fn(Reply) -> ApiResult<Reply> + Send + Sync + 'static,
    {
        self.postprocessors.push(Arc::new(hook));
        self
    }

    /// Adds an initial finalizer.
    pub fn finalizer<F>(mut self, hook: F) -> Self
    where
        F: Fn(Response) -> ApiResult<Response> + Send + Sync + 'static,
    {
        self.finalizers.push(Arc::new(hook));
        self
    }

    /// Builds the api.
    pub fn build(self) -> Api {
        let config = self
            .config
            .unwrap_or_else(|| Arc::new(Config::new()));
        Api::init_config(&config);

        let mut dispatcher = Dispatcher::new(config);
        if let Some(templates) = self.templates {
            dispatcher = dispatcher.with_templates(templates);
        }
        for hook in self.preprocessors {
            dispatcher.preprocessor(move |h| hook(h));
        }
        for hook in self.postprocessors {
            dispatcher.postprocessor(move |r| hook(r));
        }
        for hook in self.finalizers {
            dispatcher.finalizer(move |r| hook(r));
        }

        let router = match &self.url_prefix {
            Some(prefix) => Router::with_prefix(prefix),
            None => Router::new(),
        };

        Api {
            name: self.name,
            router,
            dispatcher,
        }
    }
}

/// A REST api: a set of routes served through one [`Dispatcher`].
///
/// Everything is registered on a mutable `Api`; [`Api::into_service`] then
/// freezes it for concurrent use.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use talaria::{Api, ApiResult, Invocation};
///
/// let mut api = Api::builder().url_prefix("/api").build();
///
/// api.get("/ping", |inv: Invocation| async move {
///     ApiResult::Ok(json!({"value": inv.args().get_i64("value").unwrap_or(200)}))
/// })
/// .unwrap();
///
/// api.finalizer(|mut res| {
///     res.headers_mut().insert("x-rate-limit", 42_u16.into());
///     Ok(res)
/// });
///
/// let service = api.into_service();
/// assert_eq!(service.api().name(), "api");
/// ```
pub struct Api {
    name: String,
    router: Router<BoxedHandler>,
    dispatcher: Dispatcher,
}

impl Default for Api {
    fn default() -> Self {
        Self::new()
    }
}

impl Api {
    /// Creates an api with default settings.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Creates a builder.
    pub fn builder() -> ApiBuilder {
        ApiBuilder::new()
    }

    /// Sets the default of every extension key that has no value yet.
    pub fn init_config(config: &Config) {
        config.apply_defaults();
    }

    /// The name the api is registered under.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The url prefix, if any.
    #[must_use]
    pub fn url_prefix(&self) -> Option<&str> {
        Some(self.router.prefix()).filter(|p| !p.is_empty())
    }

    /// The configuration read on every request.
    #[must_use]
    pub fn config(&self) -> &Arc<Config> {
        self.dispatcher.config()
    }

    /// The dispatcher.
    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// The router.
    #[must_use]
    pub fn router(&self) -> &Router<BoxedHandler> {
        &self.router
    }

    /// Registers a handler for `pattern` under the given methods.
    ///
    /// The same handler may be registered under several patterns; each
    /// request still invokes it once.
    pub fn route(
        &mut self,
        pattern: &str,
        methods: &[Method],
        handler: BoxedHandler,
    ) -> Result<&mut Self, RouteError> {
        self.route_with_defaults(pattern, methods, RouteArgs::new(), handler)
    }

    /// Registers a handler with default arguments for values the pattern
    /// does not capture.
    pub fn route_with_defaults(
        &mut self,
        pattern: &str,
        methods: &[Method],
        defaults: RouteArgs,
        handler: BoxedHandler,
    ) -> Result<&mut Self, RouteError> {
        self.router.add(methods, pattern, defaults, handler)?;
        Ok(self)
    }

    /// Registers an async function for `GET`.
    pub fn get<F, Fut, R>(&mut self, pattern: &str, f: F) -> Result<&mut Self, RouteError>
    where
        F: Fn(Invocation) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ApiResult<R>> + Send + 'static,
        R: Into<Reply>,
    {
        self.route(pattern, &[Method::GET], handler_fn(f))
    }

    /// Registers an async function for `POST`.
    pub fn post<F, Fut, R>(&mut self, pattern: &str, f: F) -> Result<&mut Self, RouteError>
    where
        F: Fn(Invocation) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ApiResult<R>> + Send + 'static,
        R: Into<Reply>,
    {
        self.route(pattern, &[Method::POST], handler_fn(f))
    }

    /// Registers an async function for `PUT`.
    pub fn put<F, Fut, R>(&mut self, pattern: &str, f: F) -> Result<&mut Self, RouteError>
    where
        F: Fn(Invocation) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ApiResult<R>> + Send + 'static,
        R: Into<Reply>,
    {
        self.route(pattern, &[Method::PUT], handler_fn(f))
    }

    /// Registers an async function for `DELETE`.
    pub fn delete<F, Fut, R>(&mut self, pattern: &str, f: F) -> Result<&mut Self, RouteError>
    where
        F: Fn(Invocation) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ApiResult<R>> + Send + 'static,
        R: Into<Reply>,
    {
        self.route(pattern, &[Method::DELETE], handler_fn(f))
    }

    /// Registers a serializer, replacing any previous one for the type.
    pub fn serializer<F>(&mut self, mimetype: impl Into<String>, serializer: F) -> &mut Self
    where
        F: Fn(&Value, &SerializeContext<'_>) -> ApiResult<Bytes> + Send + Sync + 'static,
    {
        self.dispatcher.serializer(mimetype, serializer);
        self
    }

    /// Appends a preprocessor.
    pub fn preprocessor<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(BoxedHandler) -> ApiResult<BoxedHandler> + Send + Sync + 'static,
    {
        self.dispatcher.preprocessor(hook);
        self
    }

    /// Appends a postprocessor.
    pub fn postprocessor<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(Reply) -> ApiResult<Reply> + Send + Sync + 'static,
    {
        self.dispatcher.postprocessor(hook);
        self
    }

    /// Appends a finalizer.
    pub fn finalizer<F>(&mut self, hook: F) -> &mut Self
    where
        F: Fn(Response) -> ApiResult<Response> + Send + Sync + 'static,
    {
        self.dispatcher.finalizer(hook);
        self
    }

    /// Freezes the api for serving.
    pub fn into_service(self) -> ApiService {
        tracing::info!(
            target: DISPATCH_TARGET,
            api = %self.name,
            routes = self.router.route_count(),
            serializers = ?self.dispatcher.registry().keys().collect::<Vec<_>>(),
            "api ready"
        );
        ApiService {
            inner: Arc::new(self),
        }
    }
}

impl std::fmt::Debug for Api {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Api")
            .field("name", &self.name)
            .field("url_prefix", &self.url_prefix())
            .field("routes", &self.router.patterns().collect::<Vec<_>>())
            .field("dispatcher", &self.dispatcher)
            .finish()
    }
}

/// A frozen [`Api`], cheap to clone and safe to share between tasks.
#[derive(Debug, Clone)]
pub struct ApiService {
    inner: Arc<Api>,
}

impl ApiService {
    /// The api behind this service.
    #[must_use]
    pub fn api(&self) -> &Api {
        &self.inner
    }

    /// Serves one request.
    ///
    /// Unknown paths answer `404` and known paths with the wrong method
    /// answer `405`; both go through the dispatcher like any other error.
    pub async fn handle(&self, request: Request) -> Response {
        let (parts, body) = request.into_parts();
        let body: Bytes = match body.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(never) => match never {},
        };

        let span = tracing::debug_span!(
            target: DISPATCH_TARGET,
            "request",
            http.method = %parts.method,
            http.path = %parts.uri.path(),
        );

        let (handler, args) = match self.inner.router.resolve(&parts.method, parts.uri.path()) {
            Resolution::Matched { target, args } => (target.clone(), args),
            Resolution::MethodNotAllowed { allowed } => {
                tracing::debug!(target: DISPATCH_TARGET, allowed = ?allowed, "method not allowed");
                (rejection(method_not_allowed), RouteArgs::new())
            }
            Resolution::NotFound => (rejection(ApiError::not_found), RouteArgs::new()),
        };

        let invocation = Invocation::new(parts.method, parts.uri, parts.headers, body, args);
        self.inner
            .dispatcher
            .dispatch(&handler, invocation)
            .instrument(span)
            .await
    }
}

fn method_not_allowed() -> ApiError {
    ApiError::http(StatusCode::METHOD_NOT_ALLOWED)
}

/// A handler that always fails with a fresh error.
fn rejection(error: fn() -> ApiError) -> BoxedHandler {
    handler_fn(move |_| async move { Err::<Reply, _>(error()) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::{ACCEPT, CONTENT_TYPE};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use talaria_config::keys;
    use talaria_core::full_body;

    fn get(uri: &str) -> Request {
        http::Request::builder()
            .uri(uri)
            .header(ACCEPT, "application/json")
            .body(full_body(Bytes::new()))
            .unwrap()
    }

    async fn text(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_builder_defaults() {
        let api = Api::new();
        assert_eq!(api.name(), DEFAULT_BLUEPRINT_NAME);
        assert_eq!(api.url_prefix(), None);
        assert_eq!(api.config().default_mimetype().as_deref(), Some("application/json"));
    }

    #[test]
    fn test_init_config_keeps_existing_values() {
        let config = Arc::new(Config::new());
        config.set(keys::DEFAULT_MIMETYPE, "text/html");

        let api = Api::builder()
            .blueprint_name("v1")
            .url_prefix("/v1")
            .config(config.clone())
            .build();

        assert_eq!(api.name(), "v1");
        assert_eq!(api.url_prefix(), Some("/v1"));
        assert_eq!(config.default_mimetype().as_deref(), Some("text/html"));
        assert_eq!(config.jsonp_callback().as_deref(), Some("callback"));
    }

    #[tokio::test]
    async fn test_handle_routes_and_args() {
        let mut api = Api::new();
        api.get("/ping/{value:int}", |inv: Invocation| async move {
            ApiResult::Ok(json!({"value": inv.args().get_i64("value")}))
        })
        .unwrap();

        let response = api.into_service().handle(get("/ping/404")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(text(response).await, r#"{"value":404}"#);
    }

    #[tokio::test]
    async fn test_not_found_goes_through_dispatcher() {
        let service = Api::new().into_service();

        let response = service.handle(get("/nowhere")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
        assert!(text(response).await.contains(r#""error":"Not Found""#));
    }

    #[tokio::test]
    async fn test_method_not_allowed() {
        let mut api = Api::new();
        api.post("/todos", |_| async { ApiResult::Ok(json!({})) })
            .unwrap();

        let response = api.into_service().handle(get("/todos")).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert!(text(response).await.contains("Method Not Allowed"));
    }

    #[tokio::test]
    async fn test_shared_handler_runs_once_per_request() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let handler = handler_fn(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            async { ApiResult::Ok(json!({"ok": true})) }
        });

        let mut api = Api::new();
        api.route("/a", &[Method::GET], handler.clone())
            .unwrap()
            .route("/b", &[Method::GET], handler)
            .unwrap();
        let service = api.into_service();

        service.handle(get("/a")).await;
        service.handle(get("/b")).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_builder_hooks_run_before_later_ones() {
        let mut api = Api::builder()
            .finalizer(|mut res| {
                res.headers_mut().insert("x-order", "builder".parse().unwrap());
                Ok(res)
            })
            .build();
        api.get("/ping", |_| async { ApiResult::Ok(json!({})) })
            .unwrap();
        api.finalizer(|mut res| {
            res.headers_mut().append("x-order", "api".parse().unwrap());
            Ok(res)
        });

        let response = api.into_service().handle(get("/ping")).await;
        let order: Vec<_> = response.headers().get_all("x-order").iter().collect();
        assert_eq!(order, ["builder", "api"]);
    }

    #[test]
    fn test_invalid_route_is_rejected() {
        let mut api = Api::new();
        let err = api
            .get("/ping/{value:float}", |_| async { ApiResult::Ok(json!({})) })
            .unwrap_err();
        assert!(matches!(err, RouteError::UnknownConverter { .. }));
    }
}
