use std::borrow::Cow;

use anyhow::{Result, Error};
use rouille::{Response, ResponseBody};

use crate::escape::escape_html;
use crate::http_response_status_codes::HttpResponseStatusCode;


// Pages are rebuilt from the current content on every request; keep
// browsers and proxies from holding on to them.
const NO_STORE: (Cow<'static, str>, Cow<'static, str>) =
    (Cow::Borrowed("Cache-Control"), Cow::Borrowed("no-store"));


/// If thunk returns an Err, log it and answer with an error page
/// instead.
pub fn error_boundary<F>(thunk: F) -> Response
where F: FnOnce() -> Result<Response>
{
    match thunk() {
        Ok(v) => v,
        Err(e) => errorpage_from_error(e)
    }
}


pub fn errorpage_from_status(status: HttpResponseStatusCode) -> Response {
    let title = escape_html(status.title());
    let explanation = escape_html(status.desc());
    let resp = format!("<html><head><title>{title}</title></head><body><h1>{title}</h1>\
                        <p>{explanation}</p></body></html>\n");
    Response {
        status_code: status.code(),
        headers: vec![(Cow::from("Content-type"), Cow::from("text/html; charset=utf-8"))],
        data: ResponseBody::from_string(resp),
        upgrade: None,
    }
}

pub fn errorpage_from_error(err: Error) -> Response {
    let status = HttpResponseStatusCode::InternalServerError500;
    tracing::error!("error in page (return {status:?}): {err:#}");
    errorpage_from_status(status)
}

pub fn htmlresponse(status: HttpResponseStatusCode, html: String) -> Response {
    Response {
        status_code: status.code(),
        headers: vec![(Cow::from("Content-type"),
                       Cow::from("text/html; charset=utf-8")),
                      NO_STORE],
        data: ResponseBody::from_string(html),
        upgrade: None,
    }
}

/// `body` is passed on as is, it is not checked to be JSON.
pub fn jsonresponse(status: u16, body: String) -> Response {
    Response {
        status_code: status,
        headers: vec![(Cow::from("Content-type"),
                       Cow::from("application/json; charset=utf-8")),
                      NO_STORE],
        data: ResponseBody::from_string(body),
        upgrade: None,
    }
}

pub fn header<'r>(response: &'r Response, name: &str) -> Option<&'r str> {
    response.headers.iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_ref())
}


#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn t_responses() {
        let r = htmlresponse(HttpResponseStatusCode::OK200, "<p>x</p>".into());
        assert_eq!(r.status_code, 200);
        assert_eq!(header(&r, "cache-control"), Some("no-store"));
        assert_eq!(header(&r, "Content-Type"), Some("text/html; charset=utf-8"));

        let r = jsonresponse(404, "".into());
        assert_eq!(r.status_code, 404);
        assert_eq!(header(&r, "Cache-Control"), Some("no-store"));

        let r = error_boundary(|| Err(anyhow!("boom")));
        assert_eq!(r.status_code, 500);
        assert_eq!(header(&r, "Cache-Control"), None);
    }
}
