//! Integration test support for TeeRex.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p teerex-integration-tests
//! ```
//!
//! Everything runs in-process: catalogue endpoints are served by a local
//! axum router bound to an ephemeral port, and persistent state goes to a
//! temporary directory.

use std::net::SocketAddr;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use teerex_storefront::StorefrontConfig;
use teerex_storefront::config::CatalogueConfig;
use url::Url;

/// Catalogue used across the integration tests.
///
/// Shaped like the public shopping-cart catalogue: numeric prices, the
/// `imageURL` and `type` field names, and a mix of stock levels.
pub const CATALOGUE_JSON: &str = r#"[
  {"id":1,"imageURL":"https://example.com/polo-red.png","name":"Black Polo","type":"Polo","price":250,"currency":"INR","color":"Black","gender":"Men","quantity":3},
  {"id":2,"imageURL":"https://example.com/polo-blue.png","name":"Blue Polo","type":"Polo","price":350,"currency":"INR","color":"Blue","gender":"Women","quantity":3},
  {"id":3,"imageURL":"https://example.com/polo-pink.png","name":"Pink Polo","type":"Polo","price":350,"currency":"INR","color":"Pink","gender":"Women","quantity":6},
  {"id":4,"imageURL":"https://example.com/hoodie-black.png","name":"Black Hoodie","type":"Hoodie","price":500,"currency":"INR","color":"Black","gender":"Men","quantity":2},
  {"id":5,"imageURL":"https://example.com/round-green.png","name":"Green Round","type":"Basic","price":250,"currency":"INR","color":"Green","gender":"Men","quantity":1},
  {"id":6,"imageURL":"https://example.com/hoodie-green.png","name":"Green Hoodie","type":"Hoodie","price":650,"currency":"INR","color":"Green","gender":"Women","quantity":0}
]"#;

/// A delivery address long enough to pass checkout.
pub const VALID_ADDRESS: &str = "42 Residency Road, Bengaluru 560025";

/// Serve `router` on an ephemeral local port.
///
/// # Errors
///
/// Returns an error if no local port can be bound.
pub async fn serve(router: Router) -> std::io::Result<SocketAddr> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    Ok(addr)
}

/// Router serving [`CATALOGUE_JSON`] at `/catalogue.json`.
pub fn catalogue_router() -> Router {
    body_router(StatusCode::OK, CATALOGUE_JSON)
}

/// Router answering `/catalogue.json` with a fixed status and body.
pub fn body_router(status: StatusCode, body: &'static str) -> Router {
    Router::new().route(
        "/catalogue.json",
        get(move || async move {
            (
                status,
                [(axum::http::header::CONTENT_TYPE, "application/json")],
                body,
            )
        }),
    )
}

/// The catalogue URL on a server started by [`serve`].
///
/// # Errors
///
/// Returns an error if the address does not form a valid URL.
pub fn catalogue_url(addr: SocketAddr) -> Result<Url, url::ParseError> {
    Url::parse(&format!("http://{addr}/catalogue.json"))
}

/// Configuration pointing at a local catalogue and a short notice timer.
#[must_use]
pub fn test_config(url: Url) -> StorefrontConfig {
    StorefrontConfig {
        catalogue: CatalogueConfig { url },
        notice_duration: std::time::Duration::from_millis(50),
        ..StorefrontConfig::default()
    }
}
