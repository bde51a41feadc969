// ==========================================
// 学员名册导入系统 - 批量提交客户端
// ==========================================
// 职责: 与外部持久化接口通信（一次请求提交整批）
// 协议: POST { "data": [record…] } → { inserted, duplicatesSkipped, errors }
// ==========================================

use crate::config::ImportConfigReader;
use crate::domain::roster::CandidateRecord;
use crate::uploader::error::UploadError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

// ==========================================
// 请求体
// ==========================================

/// 单条提交记录（空字段以 null 发送）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnerPayload<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub gender: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub whatsapp: Option<&'a str>,
    pub telegram: Option<&'a str>,
    pub accession_number: Option<&'a str>,
}

fn non_empty(value: &str) -> Option<&str> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

impl<'a> From<&'a CandidateRecord> for LearnerPayload<'a> {
    fn from(record: &'a CandidateRecord) -> Self {
        Self {
            first_name: &record.first_name,
            last_name: &record.last_name,
            gender: non_empty(&record.gender),
            phone: non_empty(&record.phone),
            whatsapp: non_empty(&record.whatsapp),
            telegram: non_empty(&record.telegram),
            accession_number: non_empty(&record.accession_number),
        }
    }
}

/// 整批请求体
#[derive(Debug, Serialize)]
pub struct BatchPayload<'a> {
    pub data: Vec<LearnerPayload<'a>>,
}

impl<'a> BatchPayload<'a> {
    pub fn from_records(records: &'a [CandidateRecord]) -> Self {
        Self {
            data: records.iter().map(LearnerPayload::from).collect(),
        }
    }
}

// ==========================================
// 响应体
// ==========================================

/// 常见的错误文本字段名（message 缺失时依次查找）
const FALLBACK_MESSAGE_KEYS: [&str; 4] = ["error", "detail", "reason", "msg"];

/// 对象形式的错误条目；未识别的键保存在 extra 中
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServerErrorDetail {
    #[serde(default)]
    pub row: Option<usize>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ServerErrorDetail {
    fn text(&self) -> String {
        if let Some(message) = &self.message {
            return message.clone();
        }

        let fallback = FALLBACK_MESSAGE_KEYS
            .iter()
            .find_map(|key| self.extra.get(*key).and_then(|v| v.as_str()));

        match fallback {
            Some(text) => text.to_string(),
            None if self.extra.is_empty() => "服务端未提供错误信息".to_string(),
            None => serde_json::Value::Object(self.extra.clone()).to_string(),
        }
    }
}

/// 服务端错误条目: 字符串、{ row?, message?, … } 或其他 JSON
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ServerErrorEntry {
    Message(String),
    Detailed(ServerErrorDetail),
    Other(serde_json::Value),
}

impl ServerErrorEntry {
    pub fn row(&self) -> Option<usize> {
        match self {
            ServerErrorEntry::Detailed(detail) => detail.row,
            _ => None,
        }
    }

    pub fn message(&self) -> String {
        match self {
            ServerErrorEntry::Message(message) => message.clone(),
            ServerErrorEntry::Detailed(detail) => detail.text(),
            ServerErrorEntry::Other(value) => value.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServerBatchResponse {
    #[serde(alias = "insertedCount")]
    pub inserted: usize,
    #[serde(rename = "duplicatesSkipped", default)]
    pub duplicates_skipped: usize,
    #[serde(default)]
    pub errors: Vec<ServerErrorEntry>,
}

// ==========================================
// BatchUploadClient Trait
// ==========================================
// 用途: 外部持久化接口的接缝
// 实现者: HttpBatchUploadClient（reqwest），测试中为 Mock
#[async_trait]
pub trait BatchUploadClient: Send + Sync {
    /// 提交整批记录（一次请求）
    ///
    /// # 返回
    /// - Ok(ServerBatchResponse): 服务端 2xx 且响应可解析
    /// - Err(UploadError): 整批失败，无部分成功
    async fn upload_batch(
        &self,
        records: &[CandidateRecord],
    ) -> Result<ServerBatchResponse, UploadError>;
}

// ==========================================
// HttpBatchUploadClient - reqwest 实现
// ==========================================
#[derive(Debug, Clone)]
pub struct HttpBatchUploadClient {
    client: Client,
    endpoint: Url,
}

impl HttpBatchUploadClient {
    /// 创建客户端
    ///
    /// # 参数
    /// - endpoint: 批量提交地址（http/https）
    /// - timeout: 请求超时
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, UploadError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| UploadError::Network(format!("HTTP 客户端初始化失败: {}", e)))?;

        Self::with_client(client, endpoint)
    }

    /// 使用调用方构建好的 reqwest::Client（代理、TLS 等由调用方决定）
    pub fn with_client(client: Client, endpoint: &str) -> Result<Self, UploadError> {
        let endpoint = Url::parse(endpoint)?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(UploadError::InvalidEndpoint(format!(
                "不支持的协议: {}",
                endpoint.scheme()
            )));
        }

        Ok(Self { client, endpoint })
    }

    /// 按配置创建（提交地址、超时）
    pub fn from_config<C: ImportConfigReader + ?Sized>(config: &C) -> Result<Self, UploadError> {
        let endpoint = config
            .get_upload_endpoint()
            .map_err(|e| UploadError::Config(e.to_string()))?;
        let timeout = config
            .get_request_timeout()
            .map_err(|e| UploadError::Config(e.to_string()))?;
        Self::new(&endpoint, timeout)
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl BatchUploadClient for HttpBatchUploadClient {
    #[instrument(skip(self, records), fields(endpoint = %self.endpoint, count = records.len()))]
    async fn upload_batch(
        &self,
        records: &[CandidateRecord],
    ) -> Result<ServerBatchResponse, UploadError> {
        let payload = BatchPayload::from_records(records);

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "服务端拒绝批量提交");
            return Err(UploadError::Server {
                status: status.as_u16(),
                body,
            });
        }

        debug!(status = status.as_u16(), bytes = body.len(), "收到服务端响应");
        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    // ==========================================
    // 本地 HTTP 应答端
    // ==========================================
    // 接受一次连接，读完请求后返回给定状态行与响应体；任务结果为收到的请求体
    async fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];

            let header_end = loop {
                if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                    break pos + 4;
                }
                let n = socket.read(&mut chunk).await.unwrap();
                assert!(n > 0, "请求头未读完连接即关闭");
                buf.extend_from_slice(&chunk[..n]);
            };

            let head = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
            let content_length = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);

            while buf.len() < header_end + content_length {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
            }

            let response = format!(
                "{}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;

            String::from_utf8_lossy(&buf[header_end..]).to_string()
        });

        (format!("http://{}/api/learners/batch", addr), handle)
    }

    fn local_client(endpoint: &str) -> HttpBatchUploadClient {
        let client = Client::builder()
            .no_proxy()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        HttpBatchUploadClient::with_client(client, endpoint).unwrap()
    }

    fn record() -> CandidateRecord {
        CandidateRecord {
            row_number: 2,
            first_name: "Jo".to_string(),
            last_name: "Soap".to_string(),
            gender: String::new(),
            accession_number: "A-1".to_string(),
            cell_phone: String::new(),
            tel_home: "011 555 0101".to_string(),
            tel_emergency: String::new(),
            phone: "011 555 0101".to_string(),
            whatsapp: String::new(),
            telegram: "@jo".to_string(),
        }
    }

    #[test]
    fn test_payload_shape() {
        let records = vec![record()];
        let payload = serde_json::to_value(BatchPayload::from_records(&records)).unwrap();

        assert_eq!(
            payload,
            json!({
                "data": [{
                    "firstName": "Jo",
                    "lastName": "Soap",
                    "gender": null,
                    "phone": "011 555 0101",
                    "whatsapp": null,
                    "telegram": "@jo",
                    "accessionNumber": "A-1"
                }]
            })
        );
    }

    #[test]
    fn test_response_defaults() {
        let response: ServerBatchResponse = serde_json::from_value(json!({ "inserted": 3 })).unwrap();

        assert_eq!(response.inserted, 3);
        assert_eq!(response.duplicates_skipped, 0);
        assert!(response.errors.is_empty());
    }

    #[test]
    fn test_response_mixed_error_entries() {
        let response: ServerBatchResponse = serde_json::from_value(json!({
            "inserted": 1,
            "duplicatesSkipped": 1,
            "errors": ["duplicate accession", { "row": 4, "message": "rejected" }, { "row": 5 }]
        }))
        .unwrap();

        assert_eq!(response.errors.len(), 3);
        assert_eq!(response.errors[0].message(), "duplicate accession");
        assert_eq!(response.errors[0].row(), None);
        assert_eq!(response.errors[1].row(), Some(4));
        assert_eq!(response.errors[1].message(), "rejected");
        assert_eq!(response.errors[2].row(), Some(5));
    }

    #[test]
    fn test_response_without_inserted_is_invalid() {
        let result: Result<ServerBatchResponse, _> =
            serde_json::from_value(json!({ "duplicatesSkipped": 1 }));
        assert!(result.is_err());
    }

    #[test]
    fn test_response_error_object_with_unknown_keys_keeps_text() {
        let response: ServerBatchResponse = serde_json::from_value(json!({
            "inserted": 0,
            "errors": [
                { "row": 4, "error": "accession 2024-0417 already exists" },
                { "code": "E42" },
                {}
            ]
        }))
        .unwrap();

        assert_eq!(response.errors[0].row(), Some(4));
        assert_eq!(response.errors[0].message(), "accession 2024-0417 already exists");
        assert_eq!(response.errors[1].message(), r#"{"code":"E42"}"#);
        assert_eq!(response.errors[2].message(), "服务端未提供错误信息");
    }

    #[tokio::test]
    async fn test_upload_batch_non_2xx_fails_whole_batch() {
        let (endpoint, server) = serve_once("HTTP/1.1 500 Internal Server Error", r#"{"error":"boom"}"#).await;
        let client = local_client(&endpoint);

        let result = client.upload_batch(&[record()]).await;

        match result {
            Err(UploadError::Server { status, body }) => {
                assert_eq!(status, 500);
                assert!(body.contains("boom"));
            }
            other => panic!("期望 Server 错误，实际: {:?}", other),
        }
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_upload_batch_posts_data_and_decodes_response() {
        let (endpoint, server) = serve_once(
            "HTTP/1.1 200 OK",
            r#"{"inserted":1,"duplicatesSkipped":0,"errors":[]}"#,
        )
        .await;
        let client = local_client(&endpoint);

        let response = client.upload_batch(&[record()]).await.unwrap();
        assert_eq!(response.inserted, 1);
        assert_eq!(response.duplicates_skipped, 0);

        let request_body: serde_json::Value = serde_json::from_str(&server.await.unwrap()).unwrap();
        assert_eq!(request_body["data"][0]["firstName"], "Jo");
        assert!(request_body["data"][0]["gender"].is_null());
    }

    #[tokio::test]
    async fn test_upload_batch_unparseable_body_is_invalid_response() {
        let (endpoint, server) = serve_once("HTTP/1.1 200 OK", "not json").await;
        let client = local_client(&endpoint);

        let result = client.upload_batch(&[record()]).await;
        assert!(matches!(result, Err(UploadError::InvalidResponse(_))));
        server.await.unwrap();
    }

    #[test]
    fn test_client_rejects_bad_endpoint() {
        let timeout = Duration::from_secs(5);
        assert!(matches!(
            HttpBatchUploadClient::new("not a url", timeout),
            Err(UploadError::InvalidEndpoint(_))
        ));
        assert!(matches!(
            HttpBatchUploadClient::new("ftp://example.org/batch", timeout),
            Err(UploadError::InvalidEndpoint(_))
        ));
        assert!(HttpBatchUploadClient::new("https://example.org/batch", timeout).is_ok());
    }
}
