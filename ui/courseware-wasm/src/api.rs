//! HTTP transport over `fetch`.
//!
//! Same-origin requests with the session cookie; the CSRF token is read from
//! the cookie named in the page config.

use crate::config::PageConfig;
use crate::dom;
use async_trait::async_trait;
use cw_client::{ClientError, CoursewareClient, HttpRequest, HttpResponse, Transport};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestCredentials, RequestInit, Response};

pub type Client = CoursewareClient<FetchTransport>;

#[derive(Default)]
pub struct FetchTransport;

fn js_err(context: &str) -> impl Fn(JsValue) -> ClientError + '_ {
    move |e| ClientError::Transport(format!("{context}: {e:?}"))
}

#[async_trait(?Send)]
impl Transport for FetchTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ClientError> {
        let opts = RequestInit::new();
        opts.set_method(request.method.as_str());
        opts.set_credentials(RequestCredentials::SameOrigin);

        let headers = Headers::new().map_err(js_err("headers"))?;
        for (name, value) in &request.headers {
            headers.set(name, value).map_err(js_err("header"))?;
        }
        opts.set_headers(&headers);

        if let Some(ref b) = request.body {
            let js_body = JsValue::from_str(b);
            opts.set_body(&js_body);
        }

        let req = Request::new_with_str_and_init(&request.url, &opts).map_err(js_err("request"))?;

        let resp_value = JsFuture::from(dom::window().fetch_with_request(&req))
            .await
            .map_err(js_err("fetch error"))?;

        let resp: Response = resp_value
            .dyn_into()
            .map_err(|_| ClientError::Transport("response is not a Response".to_owned()))?;

        let text = JsFuture::from(resp.text().map_err(js_err("text"))?)
            .await
            .map_err(js_err("text error"))?;

        Ok(HttpResponse::new(resp.status(), text.as_string().unwrap_or_default()))
    }
}

/// Client shared by every widget on the page.
pub fn client(config: &PageConfig) -> Rc<Client> {
    Rc::new(CoursewareClient::new(FetchTransport).with_csrf_token(dom::cookie(&config.csrf_cookie)))
}
