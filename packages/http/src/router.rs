//! Maps HTTP requests onto a `PathStore`.

use std::sync::Arc;
use std::{fmt, io};

use bytes::Bytes;
use futures_util::TryStreamExt;
use http::{Method, Request, Response, StatusCode};
use http_body_util::BodyExt;
use hyper::body::Body;
use tokio_util::io::StreamReader;
use tracing::Instrument;

use schemacafe_store::{
    BodyReader, Document, EntryKind, Error as StoreError, Node, Path, PathStore, StoreKind,
};

use crate::accept;
use crate::response::{self, ResponseBody};

/// Dispatches requests by method onto a store.
///
/// PUT writes, DELETE removes, and GET reads.  The schema store rejects every other method with
/// 405; the raw store treats every other method as a read.
#[derive(Clone)]
pub struct Router {
    store: Arc<dyn PathStore>,
}

impl Router {
    pub fn new(store: Arc<dyn PathStore>) -> Self {
        Self { store }
    }

    pub async fn handle<B>(&self, request: Request<B>) -> Response<ResponseBody>
    where
        B: Body<Data = Bytes> + Send + 'static,
        B::Error: fmt::Display,
    {
        let span = tracing::info_span!(
            "request",
            method = %request.method(),
            path = %request.uri().path(),
        );

        async move {
            let response = self.dispatch(request).await;
            tracing::debug!(status = response.status().as_u16(), "Responded");
            response
        }
        .instrument(span)
        .await
    }

    async fn dispatch<B>(&self, request: Request<B>) -> Response<ResponseBody>
    where
        B: Body<Data = Bytes> + Send + 'static,
        B::Error: fmt::Display,
    {
        let path = match Path::from_request(request.uri().path()) {
            Ok(path) => path,
            Err(err) => return response::error(StatusCode::BAD_REQUEST, &err.to_string()),
        };

        let kind = self.store.kind();
        let html = kind == StoreKind::Raw || accept::prefers_html(request.headers());

        let method = request.method().clone();
        match method {
            Method::PUT => self.put(&path, request.into_body()).await,
            Method::DELETE => self.delete(&path).await,
            Method::GET => self.get(&path, html).await,
            _ if kind == StoreKind::Raw => self.get(&path, html).await,
            _ => response::method_not_allowed(),
        }
    }

    async fn put<B>(&self, path: &Path, body: B) -> Response<ResponseBody>
    where
        B: Body<Data = Bytes> + Send + 'static,
        B::Error: fmt::Display,
    {
        match self.store.put(path, body_reader(body)).await {
            Ok(()) => response::ok(),
            Err(err) => store_error(&Method::PUT, &err),
        }
    }

    async fn delete(&self, path: &Path) -> Response<ResponseBody> {
        match self.store.delete(path).await {
            Ok(()) => response::ok(),
            Err(err) => store_error(&Method::DELETE, &err),
        }
    }

    async fn get(&self, path: &Path, html: bool) -> Response<ResponseBody> {
        match self.store.get(path).await {
            Ok(None) => response::not_found(),
            Ok(Some(Node::Directory(entries))) if html => response::html_listing(path, &entries),
            Ok(Some(Node::Directory(entries))) => response::envelope(EntryKind::Dir, &entries),
            Ok(Some(Node::Document(Document::Schema(schema)))) => {
                response::envelope(EntryKind::Schema, &schema)
            }
            Ok(Some(Node::Document(Document::Raw(file)))) => response::stream(file),
            Err(err) => store_error(&Method::GET, &err),
        }
    }
}

/// Adapts a request body into the reader the stores consume, frame by frame.
fn body_reader<B>(body: B) -> BodyReader
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: fmt::Display,
{
    let frames = body.into_data_stream().map_err(|err| {
        io::Error::new(
            io::ErrorKind::Other,
            format!("read request body: {}", err),
        )
    });
    Box::pin(StreamReader::new(frames))
}

fn store_error(method: &Method, err: &StoreError) -> Response<ResponseBody> {
    let status = match err {
        StoreError::Path(_) => StatusCode::BAD_REQUEST,
        StoreError::BodyTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        StoreError::Decode { .. } if *method == Method::PUT => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status.is_server_error() {
        tracing::error!("{}", err);
    } else {
        tracing::warn!("{}", err);
    }
    response::error(status, &err.to_string())
}
