use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, Response};

use crate::client::{ApiRequest, ClientError, Transport};
use crate::config::UiConfig;

fn network_error(value: JsValue) -> ClientError {
    let message = value
        .as_string()
        .or_else(|| {
            value
                .dyn_ref::<web_sys::js_sys::Error>()
                .map(|error| String::from(error.message()))
        })
        .unwrap_or_else(|| format!("{value:?}"));
    ClientError::Network { message }
}

/// 基于浏览器 `fetch` 的传输层。
#[derive(Debug, Clone)]
pub struct FetchTransport {
    config: UiConfig,
}

impl FetchTransport {
    pub fn new(config: UiConfig) -> Self {
        Self { config }
    }
}

impl Transport for FetchTransport {
    async fn send(&self, request: ApiRequest) -> Result<String, ClientError> {
        let window = web_sys::window().ok_or_else(|| ClientError::Network {
            message: "no window available".into(),
        })?;

        let init = RequestInit::new();
        init.set_method(request.method.as_str());
        if let Some(body) = request.body.as_deref() {
            init.set_body(&JsValue::from_str(body));
        }

        let url = self.config.api_url(request.path);
        let http_request = Request::new_with_str_and_init(&url, &init).map_err(network_error)?;
        if request.body.is_some() {
            http_request
                .headers()
                .set("Content-Type", "application/json")
                .map_err(network_error)?;
        }

        let response: Response = JsFuture::from(window.fetch_with_request(&http_request))
            .await
            .map_err(network_error)?
            .dyn_into()
            .map_err(network_error)?;
        if !response.ok() {
            return Err(ClientError::HttpStatus {
                status: response.status(),
            });
        }

        let text = JsFuture::from(response.text().map_err(network_error)?)
            .await
            .map_err(network_error)?;
        text.as_string()
            .ok_or_else(|| ClientError::decode("response body is not text"))
    }
}
