//! # schemacafe-http
//!
//! Serves a `PathStore` over HTTP: the URL path of every request names a path below the store
//! root, and the method picks the operation.
//!
//! | Method | Schema store | Raw store |
//! |---|---|---|
//! | PUT | body is a JSON schema, stored as JSON | body stored verbatim, parents created |
//! | DELETE | removes the document | removes the document |
//! | GET (directory) | JSON listing, or HTML links when preferred | HTML links |
//! | GET (document) | `{"type":"schema","data":...}` | the stored bytes |
//! | other | 405 | treated as GET |
//!
//! ```ignore
//! use schemacafe_http::{server, signals, Router};
//!
//! let store = config.open_store()?;
//! let listener = server::bind(config.socket_addr()).await?;
//! server::serve(listener, Router::new(store), signals::shutdown_signal()).await;
//! ```

pub mod accept;
pub mod config;
pub mod error;
pub mod response;
pub mod router;
pub mod server;
pub mod signals;

pub use config::{Config, Variant};
pub use error::Error;
pub use router::Router;

/// Opens the configured store and serves it until a shutdown signal arrives.
pub async fn run(config: Config) -> Result<(), Error> {
    let store = config.open_store()?;
    let listener = server::bind(config.socket_addr()).await?;
    tracing::info!(
        "Serving {} ({:?} store) on {}",
        config.data_dir.display(),
        config.variant,
        config.socket_addr()
    );

    server::serve(listener, Router::new(store), signals::shutdown_signal()).await;
    Ok(())
}
