//! # Talaria Test
//!
//! In-memory testing for Talaria apis. Requests never touch the network
//! but still pass through routing, negotiation, the hook chains and the
//! error boundary.
//!
//! ```ignore
//! use talaria_test::TestClient;
//!
//! #[tokio::test]
//! async fn test_ping() {
//!     let client = TestClient::new(build_api());
//!
//!     client
//!         .get("/ping")
//!         .accept("text/html")
//!         .send()
//!         .await
//!         .assert_status(StatusCode::OK)
//!         .assert_mimetype("text/html")
//!         .assert_body_contains("&quot;value&quot;: 200");
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/talaria-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod error;
mod request;
mod response;

pub use client::{TestClient, TestClientRequest};
pub use error::TestError;
pub use request::{TestRequest, TestRequestBuilder};
pub use response::TestResponse;
