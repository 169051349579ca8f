//! Accept header preference checks.
//!
//! The only decision made from the header is whether a directory listing is rendered as HTML.

use http::header::{HeaderMap, ACCEPT};

/// True when the client prefers `text/html` over anything else it listed.
pub fn prefers_html(headers: &HeaderMap) -> bool {
    prefers(headers, "text/html")
}

/// True when `media_type` is listed with `q > 0` and no other listed range carries a strictly
/// higher weight.  Ties go to `media_type`.  A missing header prefers nothing.
pub fn prefers(headers: &HeaderMap, media_type: &str) -> bool {
    let mut wanted: Option<f32> = None;
    let mut best_other = 0.0f32;

    for value in headers.get_all(ACCEPT) {
        let Ok(value) = value.to_str() else {
            continue;
        };

        for range in value.split(',') {
            let mut params = range.split(';');
            let name = params.next().unwrap_or_default().trim();
            if name.is_empty() {
                continue;
            }
            let q = quality(params);

            if name.eq_ignore_ascii_case(media_type) {
                wanted = Some(wanted.map_or(q, |w| w.max(q)));
            } else {
                best_other = best_other.max(q);
            }
        }
    }

    matches!(wanted, Some(q) if q > 0.0 && q >= best_other)
}

// Malformed weights count as the default of 1.
fn quality<'a>(params: impl Iterator<Item = &'a str>) -> f32 {
    params
        .filter_map(|param| {
            let (key, value) = param.split_once('=')?;
            if key.trim().eq_ignore_ascii_case("q") {
                value.trim().parse::<f32>().ok()
            } else {
                None
            }
        })
        .next()
        .map_or(1.0, |q| q.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    fn accept(values: &[&'static str]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for value in values {
            headers.append(ACCEPT, HeaderValue::from_static(value));
        }
        headers
    }

    #[test]
    fn missing_header_is_not_html() {
        assert!(!prefers_html(&HeaderMap::new()));
    }

    #[test]
    fn browser_accept_is_html() {
        assert!(prefers_html(&accept(&[
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"
        ])));
    }

    #[test]
    fn wildcard_only_is_not_html() {
        assert!(!prefers_html(&accept(&["*/*"])));
    }

    #[test]
    fn json_only_is_not_html() {
        assert!(!prefers_html(&accept(&["application/json"])));
    }

    #[test]
    fn lower_weight_html_loses() {
        assert!(!prefers_html(&accept(&["text/html;q=0.5, application/json"])));
    }

    #[test]
    fn ties_go_to_html() {
        assert!(prefers_html(&accept(&["application/json, text/html"])));
    }

    #[test]
    fn zero_weight_html_is_refused() {
        assert!(!prefers_html(&accept(&["text/html;q=0"])));
    }

    #[test]
    fn matching_is_case_insensitive_and_spans_headers() {
        assert!(prefers_html(&accept(&["application/json;q=0.2", "Text/HTML"])));
    }

    #[test]
    fn malformed_weight_defaults_to_one() {
        assert!(prefers_html(&accept(&["text/html;q=abc, application/json;q=0.9"])));
    }
}
