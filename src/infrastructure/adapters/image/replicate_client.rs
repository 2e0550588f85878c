//! Replicate Client - 预测（prediction）接口
//!
//! POST {base_url}/models/{model}/predictions  (Prefer: wait)
//! GET  urls.get 轮询直到 succeeded / failed / canceled
//! GET  output URL 下载图片字节

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::{Duration, Instant};

use crate::application::ports::{ImageGeneratorPort, ImageRequest, ProviderError};
use crate::domain::book::ImageRef;
use crate::infrastructure::adapters::retry::{with_retry, RetryPolicy};

/// 提示词最大长度
const MAX_PROMPT_CHARS: usize = 300;

#[derive(Debug, Deserialize)]
struct Prediction {
    #[serde(default)]
    id: String,
    status: String,
    #[serde(default)]
    output: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<serde_json::Value>,
    #[serde(default)]
    urls: Option<PredictionUrls>,
}

#[derive(Debug, Deserialize)]
struct PredictionUrls {
    #[serde(default)]
    get: Option<String>,
}

impl Prediction {
    fn is_terminal(&self) -> bool {
        matches!(self.status.as_str(), "succeeded" | "failed" | "canceled")
    }

    /// output 可能是字符串或字符串数组
    fn output_url(&self) -> Option<String> {
        match self.output.as_ref()? {
            serde_json::Value::String(url) => Some(url.clone()),
            serde_json::Value::Array(items) => items
                .iter()
                .find_map(|item| item.as_str().map(str::to_string)),
            _ => None,
        }
    }
}

/// Replicate 客户端配置
#[derive(Debug, Clone)]
pub struct ReplicateClientConfig {
    pub base_url: String,
    pub api_token: String,
    /// owner/name
    pub model: String,
    pub negative_prompt: String,
    pub num_inference_steps: u32,
    pub guidance_scale: f32,
    /// 单次请求超时（秒）
    pub timeout_secs: u64,
    /// 轮询总时长上限（秒）
    pub max_wait_secs: u64,
    pub poll_interval_ms: u64,
    pub retry: RetryPolicy,
}

impl Default for ReplicateClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.replicate.com/v1".to_string(),
            api_token: String::new(),
            model: "lucataco/realistic-vision-v5.1".to_string(),
            negative_prompt: "blurry, watermark, text".to_string(),
            num_inference_steps: 30,
            guidance_scale: 7.5,
            timeout_secs: 60,
            max_wait_secs: 180,
            poll_interval_ms: 1000,
            retry: RetryPolicy::default(),
        }
    }
}

/// Replicate 客户端
pub struct ReplicateClient {
    client: Client,
    config: ReplicateClientConfig,
}

impl ReplicateClient {
    pub fn new(config: ReplicateClientConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn predictions_url(&self) -> String {
        format!(
            "{}/models/{}/predictions",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let message = response.text().await.unwrap_or_default();
            Err(ProviderError::Status {
                status: status.as_u16(),
                message,
            })
        }
    }

    async fn create_prediction(&self, request: &ImageRequest) -> Result<Prediction, ProviderError> {
        let prompt: String = request.prompt.chars().take(MAX_PROMPT_CHARS).collect();
        let body = json!({
            "input": {
                "prompt": prompt,
                "negative_prompt": self.config.negative_prompt,
                "num_inference_steps": self.config.num_inference_steps,
                "guidance_scale": self.config.guidance_scale,
                "width": request.width,
                "height": request.height,
            }
        });

        let response = self
            .client
            .post(self.predictions_url())
            .bearer_auth(&self.config.api_token)
            .header("Prefer", "wait")
            .json(&body)
            .send()
            .await
            .map_err(ProviderError::from_reqwest)?;

        Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))
    }

    async fn fetch_prediction(&self, url: &str) -> Result<Prediction, ProviderError> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.config.api_token)
            .send()
            .await
            .map_err(ProviderError::from_reqwest)?;

        Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))
    }

    /// 轮询地址只取自创建响应，轮询响应不一定带 urls
    async fn wait_for(&self, mut prediction: Prediction) -> Result<Prediction, ProviderError> {
        if prediction.is_terminal() {
            return Ok(prediction);
        }

        let poll_url = prediction
            .urls
            .as_ref()
            .and_then(|u| u.get.clone())
            .ok_or_else(|| ProviderError::InvalidResponse("prediction has no poll URL".into()))?;
        let deadline = Instant::now() + Duration::from_secs(self.config.max_wait_secs);

        while !prediction.is_terminal() {
            if Instant::now() >= deadline {
                return Err(ProviderError::Timeout);
            }
            tokio::time::sleep(Duration::from_millis(self.config.poll_interval_ms)).await;
            prediction = self.fetch_prediction(&poll_url).await?;
            tracing::debug!(
                prediction_id = %prediction.id,
                status = %prediction.status,
                "Polled prediction"
            );
        }

        Ok(prediction)
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, ProviderError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(ProviderError::from_reqwest)?;

        let bytes = Self::check(response)
            .await?
            .bytes()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("Failed to read image: {}", e)))?;
        Ok(bytes.to_vec())
    }

    async fn generate_once(&self, request: &ImageRequest) -> Result<ImageRef, ProviderError> {
        let prediction = self.create_prediction(request).await?;
        let prediction = self.wait_for(prediction).await?;

        if prediction.status != "succeeded" {
            let reason = prediction
                .error
                .map(|e| e.to_string())
                .unwrap_or_else(|| prediction.status.clone());
            return Err(ProviderError::Failed(reason));
        }

        let url = prediction
            .output_url()
            .ok_or_else(|| ProviderError::InvalidResponse("prediction has no output".into()))?;
        let bytes = self.download(&url).await?;

        tracing::info!(
            prediction_id = %prediction.id,
            size = bytes.len(),
            "Image generated"
        );
        Ok(ImageRef::Bytes(bytes))
    }
}

#[async_trait]
impl ImageGeneratorPort for ReplicateClient {
    async fn text_to_image(&self, request: ImageRequest) -> Result<ImageRef, ProviderError> {
        tracing::debug!(
            model = %self.config.model,
            width = request.width,
            height = request.height,
            "Sending image prediction"
        );
        with_retry(self.config.retry, "text_to_image", || self.generate_once(&request)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use axum::extract::State;
    use axum::http::HeaderMap;
    use axum::routing::{get, post};
    use axum::{Json, Router};

    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    #[derive(Clone)]
    struct Mock {
        base: String,
        polls: Arc<AtomicUsize>,
        fail: bool,
        immediate: bool,
    }

    async fn create(
        State(mock): State<Mock>,
        headers: HeaderMap,
        Json(body): Json<serde_json::Value>,
    ) -> Json<serde_json::Value> {
        assert_eq!(headers["prefer"], "wait");
        assert_eq!(body["input"]["width"], 768);
        if mock.immediate {
            return Json(json!({
                "id": "p1",
                "status": "succeeded",
                "output": format!("{}/files/cover.png", mock.base)
            }));
        }
        Json(json!({
            "id": "p1",
            "status": "processing",
            "urls": {"get": format!("{}/predictions/p1", mock.base)}
        }))
    }

    /// 轮询响应不带 urls
    async fn poll(State(mock): State<Mock>) -> Json<serde_json::Value> {
        let n = mock.polls.fetch_add(1, Ordering::SeqCst);
        if n == 0 {
            Json(json!({"id": "p1", "status": "processing"}))
        } else if mock.fail {
            Json(json!({"id": "p1", "status": "failed", "error": "NSFW content"}))
        } else {
            Json(json!({
                "id": "p1",
                "status": "succeeded",
                "output": [format!("{}/files/cover.png", mock.base)]
            }))
        }
    }

    async fn start_with(fail: bool, immediate: bool) -> (String, Arc<AtomicUsize>) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let polls = Arc::new(AtomicUsize::new(0));
        let state = Mock {
            base: base.clone(),
            polls: polls.clone(),
            fail,
            immediate,
        };

        let router = Router::new()
            .route("/models/owner/model/predictions", post(create))
            .route("/predictions/p1", get(poll))
            .route("/files/cover.png", get(|| async { PNG.to_vec() }))
            .with_state(state);

        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        (base, polls)
    }

    async fn start(fail: bool) -> (String, Arc<AtomicUsize>) {
        start_with(fail, false).await
    }

    fn config(base: String) -> ReplicateClientConfig {
        ReplicateClientConfig {
            base_url: base,
            api_token: "token".into(),
            model: "owner/model".into(),
            timeout_secs: 5,
            max_wait_secs: 5,
            poll_interval_ms: 1,
            retry: RetryPolicy::none(),
            ..Default::default()
        }
    }

    fn request() -> ImageRequest {
        ImageRequest {
            prompt: "Cover art".into(),
            width: 768,
            height: 1024,
        }
    }

    #[tokio::test]
    async fn test_polls_until_succeeded_and_downloads() {
        let (base, polls) = start(false).await;
        let client = ReplicateClient::new(config(base)).unwrap();

        let image = client.text_to_image(request()).await.unwrap();
        assert_eq!(image.bytes(), Some(PNG));
        assert_eq!(polls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_prediction_is_error() {
        let (base, _polls) = start(true).await;
        let client = ReplicateClient::new(config(base)).unwrap();

        let err = client.text_to_image(request()).await.unwrap_err();
        assert!(matches!(err, ProviderError::Failed(ref reason) if reason.contains("NSFW")));
    }

    #[tokio::test]
    async fn test_prediction_finished_on_create_skips_polling() {
        let (base, polls) = start_with(false, true).await;
        let client = ReplicateClient::new(config(base)).unwrap();

        let image = client.text_to_image(request()).await.unwrap();
        assert_eq!(image.bytes(), Some(PNG));
        assert_eq!(polls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_output_url_accepts_string_or_list() {
        let single: Prediction =
            serde_json::from_value(json!({"status": "succeeded", "output": "http://x/a.png"}))
                .unwrap();
        assert_eq!(single.output_url().as_deref(), Some("http://x/a.png"));

        let list: Prediction =
            serde_json::from_value(json!({"status": "succeeded", "output": ["http://x/b.png"]}))
                .unwrap();
        assert_eq!(list.output_url().as_deref(), Some("http://x/b.png"));
    }
}
