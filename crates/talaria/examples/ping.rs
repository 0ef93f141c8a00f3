//! Serves a few in-memory requests through a small api and prints the
//! responses.
//!
//! ```text
//! RUST_LOG=talaria::dispatch=debug cargo run -p talaria --example ping
//! ```

use http::header::ACCEPT;
use http_body_util::BodyExt;
use serde_json::json;
use talaria::prelude::*;
use talaria::telemetry::{init_logging, LogConfig};

fn build_api() -> Result<Api, RouteError> {
    let mut api = Api::builder().url_prefix("/api").build();

    let mut defaults = RouteArgs::new();
    defaults.insert("value", 200);

    let ping = handler_fn(|inv: Invocation| async move {
        ApiResult::Ok(json!({"value": inv.args().get_i64("value")}))
    });

    api.route_with_defaults("/ping", &[Method::GET], defaults, ping.clone())?
        .route("/ping/{value:int}", &[Method::GET], ping)?
        .get("/error", |_| async {
            Err::<Value, _>(
                ApiError::new()
                    .with_status(StatusCode::IM_A_TEAPOT)
                    .with_description("This server is a teapot, not a coffee machine"),
            )
        })?;

    api.finalizer(|mut res| {
        res.headers_mut().insert("x-rate-limit", 42_u16.into());
        Ok(res)
    });

    Ok(api)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(&LogConfig::development().with_level("info"))?;

    let service = build_api()?.into_service();

    let requests = [
        ("/api/ping", "application/json"),
        ("/api/ping/404", "text/html"),
        ("/api/ping?callback=console.log", "application/javascript"),
        ("/api/error", "application/json"),
        ("/api/ping", "text/xml"),
    ];

    for (uri, accept) in requests {
        let request = http::Request::builder()
            .uri(uri)
            .header(ACCEPT, accept)
            .body(talaria::core::full_body(""))?;

        let response = service.handle(request).await;
        let status = response.status();
        let body = response.into_body().collect().await?.to_bytes();

        println!("GET {uri} [{accept}] -> {status}");
        println!("{}\n", String::from_utf8_lossy(&body));
    }

    Ok(())
}
