//! The request dispatcher.
//!
//! One dispatch serves one endpoint invocation and walks these stages:
//!
//! ```text
//! Negotiating → Preprocessing → Invoking → Postprocessing → Responding → Finalizing
//!      │              │             │             │               │            │
//!      └──────────────┴─────────────┴─────┬───────┴───────────────┴────────────┘
//!                                         ↓
//!                                   ErrorHandling → Responding → Finalizing*
//! ```
//!
//! Every error and panic raised along the way is caught once, logged, and
//! turned into an `{error, message}` payload that is serialized with the
//! negotiated format like any other reply. When negotiation itself fails,
//! the default format is bound first so the `406` body is still readable.
//!
//! `*` Finalizers run at most once per request: an error response built
//! after a finalizer failed is returned without running them again.

use crate::error::{DispatchError, DispatchResult};
use crate::hooks::{Finalizers, Postprocessors, Preprocessors};
use crate::logging::{ExceptionLogger, DISPATCH_TARGET};
use crate::types::{BoxedHandler, Response, ResponseExt};
use bytes::Bytes;
use futures_util::FutureExt;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, Method, StatusCode};
use serde_json::Value;
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use talaria_config::Config;
use talaria_core::{full_body, unpack_response, ApiError, ApiResult, Invocation, Reply};
use talaria_negotiate::{
    AcceptHeader, BuiltinTemplates, MissingDefaultSerializer, NegotiatedFormat, NegotiationError,
    SerializeContext, SerializerRegistry, TemplateRenderer,
};
use tracing::{debug, error, trace};

/// The stages of a dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Resolving the response format from the `Accept` header.
    Negotiating,
    /// Running preprocessors over the handler.
    Preprocessing,
    /// Awaiting the handler.
    Invoking,
    /// Running postprocessors over the handler's reply.
    Postprocessing,
    /// Serializing the reply into a response.
    Responding,
    /// Running finalizers over the response.
    Finalizing,
    /// Turning an error into a response.
    ErrorHandling,
}

impl Stage {
    /// Returns the stage name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Negotiating => "negotiating",
            Self::Preprocessing => "preprocessing",
            Self::Invoking => "invoking",
            Self::Postprocessing => "postprocessing",
            Self::Responding => "responding",
            Self::Finalizing => "finalizing",
            Self::ErrorHandling => "error_handling",
        }
    }

    /// Returns the stages of a successful dispatch, in order.
    #[must_use]
    pub const fn all() -> [Self; 6] {
        [
            Self::Negotiating,
            Self::Preprocessing,
            Self::Invoking,
            Self::Postprocessing,
            Self::Responding,
            Self::Finalizing,
        ]
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-request state. Never shared between requests.
struct RequestScope {
    method: Method,
    path: String,
    query: Option<String>,
    format: Option<NegotiatedFormat>,
    stage: Stage,
}

impl RequestScope {
    /// Opens a scope in the negotiating stage.
    fn new(invocation: &Invocation) -> Self {
        Self {
            method: invocation.method().clone(),
            path: invocation.path().to_string(),
            query: invocation.query_string().map(ToString::to_string),
            format: None,
            stage: Stage::Negotiating,
        }
    }

    fn enter(&mut self, stage: Stage) {
        trace!(target: DISPATCH_TARGET, from = %self.stage, to = %stage, "dispatch stage");
        self.stage = stage;
    }
}

/// Serves endpoint invocations.
///
/// The dispatcher owns the serializer registry and the three hook chains.
/// Register everything before serving; afterwards share it behind an `Arc`.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use std::sync::Arc;
/// use talaria_config::Config;
/// use talaria_core::{ApiResult, Invocation};
/// use talaria_middleware::{handler_fn, Dispatcher};
///
/// # tokio_test::block_on(async {
/// let mut dispatcher = Dispatcher::new(Arc::new(Config::with_defaults()));
/// dispatcher.finalizer(|mut res| {
///     res.headers_mut().insert("x-rate-limit", "42".parse().unwrap());
///     Ok(res)
/// });
///
/// let ping = handler_fn(|_| async { ApiResult::Ok(json!({"value": 200})) });
/// let invocation = Invocation::builder()
///     .header("accept", "application/json")
///     .build();
///
/// let response = dispatcher.dispatch(&ping, invocation).await;
/// assert_eq!(response.status(), 200);
/// assert_eq!(response.headers()["x-rate-limit"], "42");
/// # });
/// ```
pub struct Dispatcher {
    config: Arc<Config>,
    registry: SerializerRegistry,
    templates: Arc<dyn TemplateRenderer>,
    preprocessors: Preprocessors,
    postprocessors: Postprocessors,
    finalizers: Finalizers,
    logger: ExceptionLogger,
}

impl Dispatcher {
    /// Creates a dispatcher with the built-in serializers and templates.
    #[must_use]
    pub fn new(config: Arc<Config>) -> Self {
        Self {
            config,
            registry: SerializerRegistry::new(),
            templates: Arc::new(BuiltinTemplates::new()),
            preprocessors: Preprocessors::new(),
            postprocessors: Postprocessors::new(),
            finalizers: Finalizers::new(),
            logger: ExceptionLogger::new(),
        }
    }

    /// Replaces the template renderer used by the debug serializer.
    #[must_use]
    pub fn with_templates(mut self, templates: Arc<dyn TemplateRenderer>) -> Self {
        self.templates = templates;
        self
    }

    /// Replaces the serializer registry.
    #[must_use]
    pub fn with_registry(mut self, registry: SerializerRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// The configuration read on every request.
    #[must_use]
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// The serializer registry.
    #[must_use]
    pub fn registry(&self) -> &SerializerRegistry {
        &self.registry
    }

    /// The serializer registry, for registration.
    pub fn registry_mut(&mut self) -> &mut SerializerRegistry {
        &mut self.registry
    }

    /// The preprocessor chain.
    #[must_use]
    pub fn preprocessors(&self) -> &Preprocessors {
        &self.preprocessors
    }

    /// The postprocessor chain.
    #[must_use]
    pub fn postprocessors(&self) -> &Postprocessors {
        &self.postprocessors
    }

    /// The finalizer chain.
    #[must_use]
    pub fn finalizers(&self) -> &Finalizers {
        &self.finalizers
    }

    /// Registers a serializer for a media type.
    pub fn serializer<F>(&mut self, mimetype: impl Into<String>, serializer: F)
    where
        F: Fn(&Value, &SerializeContext<'_>) -> ApiResult<Bytes> + Send + Sync + 'static,
    {
        self.registry.register(mimetype, serializer);
    }

    /// Appends a preprocessor.
    ///
    /// A preprocessor receives the handler before it runs and returns the
    /// handler to run instead. Returning an error skips the handler.
    pub fn preprocessor<F>(&mut self, hook: F)
    where
        F: Fn(BoxedHandler) -> ApiResult<BoxedHandler> + Send + Sync + 'static,
    {
        self.preprocessors.push(hook);
    }

    /// Appends a postprocessor over the handler's reply.
    pub fn postprocessor<F>(&mut self, hook: F)
    where
        F: Fn(Reply) -> ApiResult<Reply> + Send + Sync + 'static,
    {
        self.postprocessors.push(hook);
    }

    /// Appends a finalizer over the built response.
    pub fn finalizer<F>(&mut self, hook: F)
    where
        F: Fn(Response) -> ApiResult<Response> + Send + Sync + 'static,
    {
        self.finalizers.push(hook);
    }

    /// Serves one invocation of `handler`.
    ///
    /// Never fails: every error and panic is converted into a response.
    pub async fn dispatch(&self, handler: &BoxedHandler, invocation: Invocation) -> Response {
        let mut scope = RequestScope::new(&invocation);

        let outcome = AssertUnwindSafe(self.run(handler.clone(), invocation, &mut scope))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(response)) => response,
            Ok(Err(error)) => self.handle_error(error, scope),
            Err(panic) => self.handle_error(panic_error(&*panic).into(), scope),
        }
    }

    async fn run(
        &self,
        handler: BoxedHandler,
        invocation: Invocation,
        scope: &mut RequestScope,
    ) -> DispatchResult<Response> {
        self.negotiate(invocation.headers(), scope)?;

        scope.enter(Stage::Preprocessing);
        let handler = self.preprocessors.apply(handler)?;

        scope.enter(Stage::Invoking);
        let reply = handler(invocation).await?;

        scope.enter(Stage::Postprocessing);
        let reply = self.postprocessors.apply(reply)?;

        scope.enter(Stage::Responding);
        let response = self.make_response(reply, scope)?;

        scope.enter(Stage::Finalizing);
        Ok(self.finalizers.apply(response)?)
    }

    fn negotiate(&self, headers: &HeaderMap, scope: &mut RequestScope) -> DispatchResult<()> {
        let accept = AcceptHeader::from_headers(headers);

        match self.registry.negotiate(&accept, &self.config) {
            Ok(format) => {
                debug!(target: DISPATCH_TARGET, mimetype = format.mimetype(), "negotiated mimetype");
                scope.format = Some(format);
                Ok(())
            }
            Err(NegotiationError::NotAcceptable { fallback }) => {
                scope.format = Some(fallback);
                Err(ApiError::not_acceptable().into())
            }
            Err(NegotiationError::MissingDefault(e)) => Err(e.into()),
        }
    }

    fn bound_format(&self, scope: &RequestScope) -> DispatchResult<NegotiatedFormat> {
        match &scope.format {
            Some(format) => Ok(format.clone()),
            None => Ok(self.registry.default_serializer(&self.config)?),
        }
    }

    fn make_response(&self, reply: Reply, scope: &RequestScope) -> DispatchResult<Response> {
        // A finished response bypasses serialization.
        if let Reply::Response(response) = reply {
            return Ok(response);
        }

        let (payload, status, headers) = unpack_response(reply);
        let format = self.bound_format(scope)?;
        Ok(self.serialize(&payload, status, headers, &format, scope.query.as_deref())?)
    }

    fn serialize(
        &self,
        payload: &Value,
        status: StatusCode,
        headers: HeaderMap,
        format: &NegotiatedFormat,
        query: Option<&str>,
    ) -> ApiResult<Response> {
        let ctx = SerializeContext::new(&self.registry, &self.config, self.templates.as_ref())
            .with_query(query);

        let body = format.serialize(payload, &ctx)?;
        let content_type = format.content_type()?;

        let mut response = Response::new(full_body(body));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        response.headers_mut().insert(CONTENT_TYPE, content_type);
        Ok(response)
    }

    fn handle_error(&self, error: DispatchError, scope: RequestScope) -> Response {
        match error {
            DispatchError::Api(error) => self.error_response(error, scope),
            DispatchError::MissingDefaultSerializer(error) => self.fatal_response(&error, &scope),
        }
    }

    fn error_response(&self, error: ApiError, mut scope: RequestScope) -> Response {
        let failed_in = scope.stage;
        scope.enter(Stage::ErrorHandling);

        let error = error.normalized();
        self.logger.log(&scope.method, &scope.path, &error);

        let status = error.status_or_default();
        let payload = error_payload(&error);

        let format = match self.bound_format(&scope) {
            Ok(format) => format,
            Err(DispatchError::MissingDefaultSerializer(e)) => return self.fatal_response(&e, &scope),
            Err(DispatchError::Api(e)) => return self.error_response(e, scope),
        };

        scope.enter(Stage::Responding);
        let response = self.serialize_error(&payload, status, &format, scope.query.as_deref());

        if failed_in == Stage::Finalizing {
            return response;
        }

        scope.enter(Stage::Finalizing);
        match panic::catch_unwind(AssertUnwindSafe(|| self.finalizers.apply(response))) {
            Ok(Ok(response)) => response,
            Ok(Err(error)) => self.error_response(error, scope),
            Err(panic) => self.error_response(panic_error(&*panic), scope),
        }
    }

    /// Serializes an error payload, falling back to bare JSON when the bound
    /// serializer fails or panics again.
    fn serialize_error(
        &self,
        payload: &Value,
        status: StatusCode,
        format: &NegotiatedFormat,
        query: Option<&str>,
    ) -> Response {
        let serialized = panic::catch_unwind(AssertUnwindSafe(|| {
            self.serialize(payload, status, HeaderMap::new(), format, query)
        }));

        let reason = match serialized {
            Ok(Ok(response)) => return response,
            Ok(Err(e)) => e.to_string(),
            Err(panic) => format!("panic: {}", panic_message(&*panic)),
        };

        error!(
            target: DISPATCH_TARGET,
            mimetype = format.mimetype(),
            error = %reason,
            "failed to serialize error response"
        );
        Response::json(status, payload)
    }

    fn fatal_response(&self, missing: &MissingDefaultSerializer, scope: &RequestScope) -> Response {
        error!(
            target: DISPATCH_TARGET,
            mimetype = ?missing.mimetype,
            "{missing}"
        );

        let error = ApiError::internal(missing.clone()).normalized();
        self.logger.log(&scope.method, &scope.path, &error);

        Response::json(error.status_or_default(), &error_payload(&error))
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("registry", &self.registry)
            .field("preprocessors", &self.preprocessors)
            .field("postprocessors", &self.postprocessors)
            .field("finalizers", &self.finalizers)
            .finish_non_exhaustive()
    }
}

fn error_payload(error: &ApiError) -> Value {
    serde_json::to_value(error.to_payload()).unwrap_or_default()
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string())
}

fn panic_error(panic: &(dyn Any + Send)) -> ApiError {
    ApiError::internal(anyhow::anyhow!("panic: {}", panic_message(panic)))
}
