//! Serving the page over HTTP: the rendered page, the raw content
//! resource, the contact form fallback for posts without scripts, and
//! static files.

use std::{path::PathBuf, sync::Arc};

use anyhow::{Result, anyhow};
use rouille::{Request, Response, Server};

use crate::dom::SubmitOutcome;
use crate::http_response_status_codes::HttpResponseStatusCode;
use crate::page::Page;
use crate::source::DEFAULT_RESOURCE;
use crate::webutils::{error_boundary, errorpage_from_status, htmlresponse, jsonresponse};

#[derive(Debug)]
pub struct Site {
    pub page: Page,
    pub static_dir: Option<PathBuf>,
}

fn is_page_path(path: &str) -> bool {
    matches!(path, "/" | "/index.html")
}

fn content_response(site: &Site) -> Result<Response> {
    let fetched = site.page.fetch_raw()?;
    if fetched.is_success() {
        Ok(jsonresponse(fetched.status, fetched.body))
    } else {
        tracing::warn!("{} could not be loaded: {}", site.page.source(), fetched.status);
        Ok(errorpage_from_status(
            HttpResponseStatusCode::from_code(fetched.status)
                .unwrap_or(HttpResponseStatusCode::BadGateway502)))
    }
}

fn contact_response(site: &Site, request: &Request) -> Result<Response> {
    let fields = match rouille::input::post::raw_urlencoded_post_input(request) {
        Ok(fields) => fields,
        Err(e) => {
            tracing::warn!("unreadable form post: {e}");
            return Ok(errorpage_from_status(HttpResponseStatusCode::BadRequest400))
        }
    };
    let submission = site.page.submit_contact(&fields)?;
    if let SubmitOutcome::Navigate { action, .. } = &submission.outcome {
        // Only happens if the page could not be brought up; there is
        // nothing to hand the fields to.
        tracing::warn!("contact form is not intercepted, dropping submission to {action:?}");
    }
    Ok(htmlresponse(HttpResponseStatusCode::OK200, submission.html))
}

fn static_response(site: &Site, request: &Request) -> Response {
    if let Some(dir) = &site.static_dir {
        let response = rouille::match_assets(request, dir);
        if response.is_success() {
            return response
        }
    }
    errorpage_from_status(HttpResponseStatusCode::NotFound404)
}

pub fn handle(site: &Site, request: &Request) -> Response {
    let url = request.url();
    let content_path = format!("/{DEFAULT_RESOURCE}");
    let response = error_boundary(|| {
        Ok(match request.method() {
            "GET" | "HEAD" =>
                if is_page_path(&url) {
                    htmlresponse(HttpResponseStatusCode::OK200, site.page.render_html())
                } else if url == content_path {
                    content_response(site)?
                } else {
                    static_response(site, request)
                },
            "POST" if is_page_path(&url) => contact_response(site, request)?,
            method => {
                tracing::warn!("method {method:?} not supported for {url:?}");
                errorpage_from_status(HttpResponseStatusCode::MethodNotAllowed405)
            }
        })
    });
    tracing::info!("{} {} -> {}", request.method(), request.raw_url(), response.status_code);
    response
}

/// Serve `site` on `listen` until the process is stopped.
pub fn serve(site: Site, listen: &str) -> Result<()> {
    let site = Arc::new(site);
    tracing::info!("serving on http://{listen}/, content from {}", site.page.source());
    let server = Server::new(listen, move |request: &Request| handle(&site, request))
        .map_err(|e| anyhow!("could not listen on {listen:?}: {e}"))?;
    server.run();
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use crate::dom::Document;
    use crate::source::StaticSource;
    use crate::time_util::FixedYear;
    use crate::webutils::header;

    const TEMPLATE: &str = "<html><body><h1 data-fill=\"brand.name\">Name</h1>\
        <form id=\"contactForm\"><input name=\"name\"></form></body></html>";

    fn site(json: &str, static_dir: Option<PathBuf>) -> Site {
        Site {
            page: Page::new(Document::parse(TEMPLATE).unwrap(),
                            Box::new(StaticSource::json(json)))
                .with_year(Arc::new(FixedYear(2030))),
            static_dir,
        }
    }

    fn body(response: Response) -> String {
        let (mut reader, _) = response.data.into_reader_and_size();
        let mut s = String::new();
        reader.read_to_string(&mut s).unwrap();
        s
    }

    fn get(site: &Site, url: &str) -> Response {
        handle(site, &Request::fake_http("GET", url, vec![], vec![]))
    }

    #[test]
    fn t_page() {
        let site = site(r#"{"brand": {"name": "Blau"}}"#, None);
        for url in ["/", "/index.html"] {
            let r = get(&site, url);
            assert_eq!(r.status_code, 200);
            assert_eq!(header(&r, "Cache-Control"), Some("no-store"));
            assert!(body(r).contains("<h1 data-fill=\"brand.name\">Blau</h1>"));
        }
    }

    #[test]
    fn t_content() {
        let r = get(&site(r#"{"a": 1}"#, None), "/content.json");
        assert_eq!(r.status_code, 200);
        assert_eq!(header(&r, "Cache-Control"), Some("no-store"));
        assert_eq!(body(r), r#"{"a": 1}"#);
    }

    #[test]
    fn t_post() {
        let site = site("{}", None);
        let r = handle(&site, &Request::fake_http(
            "POST", "/",
            vec![("Content-Type".into(), "application/x-www-form-urlencoded".into())],
            b"name=Eva".to_vec()));
        assert_eq!(r.status_code, 200);
        let html = body(r);
        assert!(html.contains("<dialog class=\"notice\" open>"));
        assert!(!html.contains("Eva"));
    }

    #[test]
    fn t_static_and_errors() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("style.css"), "body {}").unwrap();
        let site = site("{}", Some(dir.path().to_path_buf()));
        let r = get(&site, "/style.css");
        assert_eq!(r.status_code, 200);
        assert_eq!(body(r), "body {}");
        assert_eq!(get(&site, "/missing.css").status_code, 404);
        assert_eq!(handle(&site, &Request::fake_http("DELETE", "/", vec![], vec![]))
                   .status_code, 405);
        assert_eq!(handle(&site, &Request::fake_http("POST", "/style.css", vec![], vec![]))
                   .status_code, 405);
    }
}
