//! Response builders for every shape the router emits.

use std::convert::Infallible;
use std::fmt::Write as _;
use std::io;

use bytes::Bytes;
use futures_util::TryStreamExt;
use http::header::{HeaderValue, CONTENT_TYPE, X_CONTENT_TYPE_OPTIONS};
use http::{Response, StatusCode};
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Empty, Full, StreamBody};
use hyper::body::Frame;
use serde::Serialize;
use tokio_util::io::ReaderStream;

use schemacafe_store::{DirEntry, EntryKind, Path};

pub type ResponseBody = UnsyncBoxBody<Bytes, io::Error>;

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
const TEXT_HTML: &str = "text/html; charset=utf-8";
const APPLICATION_JSON: &str = "application/json";
const OCTET_STREAM: &str = "application/octet-stream";

/// The `{"type": ..., "data": ...}` wrapper around every JSON response.
#[derive(Debug, Serialize)]
pub struct Envelope<'a, T: Serialize> {
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub data: &'a T,
}

fn full(bytes: impl Into<Bytes>) -> ResponseBody {
    Full::new(bytes.into())
        .map_err(|never: Infallible| match never {})
        .boxed_unsync()
}

fn with_content_type(
    status: StatusCode,
    content_type: &'static str,
    body: ResponseBody,
) -> Response<ResponseBody> {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

/// A plain-text error: the message followed by a newline.
pub fn error(status: StatusCode, message: &str) -> Response<ResponseBody> {
    let mut response = with_content_type(status, TEXT_PLAIN, full(format!("{}\n", message)));
    response
        .headers_mut()
        .insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    response
}

pub fn not_found() -> Response<ResponseBody> {
    error(StatusCode::NOT_FOUND, "404 page not found")
}

pub fn method_not_allowed() -> Response<ResponseBody> {
    error(StatusCode::METHOD_NOT_ALLOWED, "method not allowed")
}

/// `200 OK` with no body.
pub fn ok() -> Response<ResponseBody> {
    Response::new(
        Empty::<Bytes>::new()
            .map_err(|never: Infallible| match never {})
            .boxed_unsync(),
    )
}

pub fn envelope<T: Serialize>(kind: EntryKind, data: &T) -> Response<ResponseBody> {
    match serde_json::to_vec(&Envelope { kind, data }) {
        Ok(mut encoded) => {
            encoded.push(b'\n');
            with_content_type(StatusCode::OK, APPLICATION_JSON, full(encoded))
        }
        Err(err) => error(StatusCode::INTERNAL_SERVER_ERROR, &err.to_string()),
    }
}

/// One anchor per entry, concatenated, linking each child relative to the site root.
pub fn html_listing(dir: &Path, entries: &[DirEntry]) -> Response<ResponseBody> {
    let mut html = String::new();
    for entry in entries {
        // Writing to a String cannot fail.
        let _ = write!(
            html,
            "<a href=\"{}\">{}</a>",
            escape_html(&dir.child_href(&entry.name)),
            escape_html(&entry.name)
        );
    }
    with_content_type(StatusCode::OK, TEXT_HTML, full(html))
}

/// Streams an open file as the body; the handle is closed once the body is dropped.
pub fn stream(file: tokio::fs::File) -> Response<ResponseBody> {
    let body = StreamBody::new(ReaderStream::new(file).map_ok(Frame::data));
    with_content_type(StatusCode::OK, OCTET_STREAM, body.boxed_unsync())
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&#34;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}
