use super::error::ClientError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// 一次 HTTP 往返的请求描述。`body` 为 JSON 文本。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: &'static str,
    pub body: Option<String>,
}

impl ApiRequest {
    pub fn get(path: &'static str) -> Self {
        Self {
            method: Method::Get,
            path,
            body: None,
        }
    }

    pub fn post(path: &'static str) -> Self {
        Self {
            method: Method::Post,
            path,
            body: None,
        }
    }

    pub fn with_body(mut self, body: String) -> Self {
        self.body = Some(body);
        self
    }
}

/// 发送请求并返回响应正文。浏览器里由 `fetch` 实现，测试里用内存实现。
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn send(&self, request: ApiRequest) -> Result<String, ClientError>;
}
