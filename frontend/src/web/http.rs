//! HTTP 请求封装模块
//!
//! 基于 `web_sys::fetch` 的轻量客户端。数据文件与 Firebase REST 接口都经过这里；
//! 失败统一转换为 `AppError`，非 2xx 响应的状态码与响应体写入错误消息。

use async_trait::async_trait;
use sigpa::{AppError, AppResult, Fetcher};
use sigpa_shared::protocol::HttpMethod;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestInit, Response};

fn js_error(context: &str, value: JsValue) -> String {
    format!("{}: {:?}", context, value)
}

/// HTTP 响应封装
pub struct HttpResponse {
    inner: Response,
}

impl HttpResponse {
    pub fn status(&self) -> u16 {
        self.inner.status()
    }

    /// 2xx
    pub fn ok(&self) -> bool {
        self.inner.ok()
    }

    pub async fn text(self) -> AppResult<String> {
        let promise = self
            .inner
            .text()
            .map_err(|e| AppError::parse(js_error("response.text", e)))?;

        let text = JsFuture::from(promise)
            .await
            .map_err(|e| AppError::parse(js_error("response.text", e)))?;

        text.as_string()
            .ok_or_else(|| AppError::parse("response body is not a string"))
    }

    /// 读取响应体；非 2xx 时返回 `Fetch` 错误，消息中带有状态码与响应体
    pub async fn text_if_ok(self) -> AppResult<String> {
        let status = self.status();
        let ok = self.ok();
        let body = self.text().await?;
        if ok {
            Ok(body)
        } else {
            Err(AppError::fetch(format!("HTTP {}: {}", status, body)))
        }
    }
}

/// HTTP 请求构建器
pub struct HttpRequestBuilder {
    url: String,
    method: HttpMethod,
    headers: Vec<(String, String)>,
    body: Option<String>,
}

impl HttpRequestBuilder {
    fn new(url: String, method: HttpMethod) -> Self {
        Self {
            url,
            method,
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn header(mut self, key: &str, value: &str) -> Self {
        self.headers.push((key.to_string(), value.to_string()));
        self
    }

    /// JSON 请求体（同时设置 Content-Type）
    pub fn json_body(self, body: String) -> Self {
        let mut builder = self.header("Content-Type", "application/json");
        builder.body = Some(body);
        builder
    }

    pub async fn send(self) -> AppResult<HttpResponse> {
        let op = format!("{} {}", self.method.as_str(), self.url);

        let headers = Headers::new()
            .map_err(|e| AppError::fetch(js_error("Headers::new", e)).in_op_with("http.send", &op))?;
        for (key, value) in &self.headers {
            headers
                .set(key, value)
                .map_err(|e| AppError::fetch(js_error("Headers::set", e)).in_op_with("http.send", &op))?;
        }

        let opts = RequestInit::new();
        opts.set_method(self.method.as_str());
        opts.set_headers(&headers.into());
        if let Some(body) = &self.body {
            opts.set_body(&JsValue::from_str(body));
        }

        let request = Request::new_with_str_and_init(&self.url, &opts)
            .map_err(|e| AppError::fetch(js_error("Request::new", e)).in_op_with("http.send", &op))?;

        let window = web_sys::window()
            .ok_or_else(|| AppError::fetch("window is not available").in_op_with("http.send", &op))?;

        let resp_value = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(|e| AppError::fetch(js_error("network", e)).in_op_with("http.send", &op))?;

        let response: Response = resp_value
            .dyn_into()
            .map_err(|e| AppError::parse(js_error("Response cast", e)).in_op_with("http.send", &op))?;

        Ok(HttpResponse { inner: response })
    }
}

/// 轻量级 HTTP 客户端
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpClient;

impl HttpClient {
    pub fn get(url: &str) -> HttpRequestBuilder {
        HttpRequestBuilder::new(url.to_string(), HttpMethod::Get)
    }

    pub fn post(url: &str) -> HttpRequestBuilder {
        HttpRequestBuilder::new(url.to_string(), HttpMethod::Post)
    }

    pub fn patch(url: &str) -> HttpRequestBuilder {
        HttpRequestBuilder::new(url.to_string(), HttpMethod::Patch)
    }
}

/// 数据文件读取
#[async_trait(?Send)]
impl Fetcher for HttpClient {
    async fn fetch_text(&self, url: &str) -> AppResult<String> {
        HttpClient::get(url).send().await?.text_if_ok().await
    }
}
