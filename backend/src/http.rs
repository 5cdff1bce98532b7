use std::collections::HashMap;

use sigpa_shared::protocol::HttpMethod;
use worker::{Fetch, Headers, Request, RequestInit, Result, wasm_bindgen};

#[cfg(test)]
use std::cell::RefCell;

// =========================================================
// 核心抽象层 (HTTP Interface Abstraction)
// =========================================================

fn worker_method(method: HttpMethod) -> worker::Method {
    match method {
        HttpMethod::Get => worker::Method::Get,
        HttpMethod::Post => worker::Method::Post,
        HttpMethod::Patch => worker::Method::Patch,
    }
}

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub method: HttpMethod,
    pub headers: HashMap<String, String>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn new(url: &str, method: HttpMethod) -> Self {
        Self {
            url: url.to_string(),
            method,
            headers: HashMap::new(),
            body: None,
        }
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    /// JSON 请求体（同时设置 Content-Type）
    pub fn with_json(self, body: serde_json::Value) -> Self {
        let mut req = self.with_header("Content-Type", "application/json");
        req.body = Some(body.to_string());
        req
    }
}

pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait::async_trait(?Send)]
pub trait HttpClient {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse>;
}

// =========================================================
// 实现层: Worker 客户端
// =========================================================

#[derive(Clone)]
pub struct WorkerHttpClient;

#[async_trait::async_trait(?Send)]
impl HttpClient for WorkerHttpClient {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse> {
        let headers = Headers::new();
        for (k, v) in &req.headers {
            headers.set(k, v)?;
        }

        let mut init = RequestInit {
            method: worker_method(req.method),
            headers,
            ..Default::default()
        };
        if let Some(body) = &req.body {
            init.body = Some(wasm_bindgen::JsValue::from_str(body));
        }

        let worker_req = Request::new_with_init(&req.url, &init)?;
        let mut response = Fetch::Request(worker_req).send().await?;
        Ok(HttpResponse {
            status: response.status_code(),
            body: response.text().await?,
        })
    }
}

// =========================================================
// 测试工具: MockHttpClient
// =========================================================

#[cfg(test)]
pub struct MockHttpClient {
    // URL -> (Status, Response Body)
    responses: RefCell<HashMap<String, (u16, String)>>,
    pub requests: RefCell<Vec<HttpRequest>>,
}

#[cfg(test)]
impl MockHttpClient {
    pub fn new() -> Self {
        Self {
            responses: RefCell::new(HashMap::new()),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn mock_response(&self, url: &str, status: u16, body: &str) {
        self.responses
            .borrow_mut()
            .insert(url.to_string(), (status, body.to_string()));
    }
}

#[cfg(test)]
#[async_trait::async_trait(?Send)]
impl HttpClient for MockHttpClient {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse> {
        let url = req.url.clone();
        self.requests.borrow_mut().push(req);

        let responses = self.responses.borrow();
        let (status, body) = responses
            .get(&url)
            .cloned()
            .unwrap_or((404, "Not Found".to_string()));
        Ok(HttpResponse { status, body })
    }
}
