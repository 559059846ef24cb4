//! Best-effort archival of uploaded images to an auxiliary endpoint.
//!
//! Nothing here can fail an analysis: uploads run on detached tasks and their
//! errors end up in the failure hook only.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::model::UploadedImage;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage request failed: {0}")]
    Transport(String),

    #[error("storage endpoint returned {0}")]
    Status(u16),
}

#[async_trait]
pub trait StorageSink: Send + Sync {
    async fn store(&self, image: &UploadedImage) -> Result<(), StorageError>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StoreRequest<'a> {
    image: &'a str,
    mime_type: &'a str,
}

/// POSTs `{image, mimeType}` as JSON to a fixed URL.
#[derive(Debug, Clone)]
pub struct HttpStorage {
    http: reqwest::Client,
    url: String,
}

impl HttpStorage {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl StorageSink for HttpStorage {
    async fn store(&self, image: &UploadedImage) -> Result<(), StorageError> {
        let response = self
            .http
            .post(&self.url)
            .json(&StoreRequest {
                image: &image.base64,
                mime_type: &image.mime_type,
            })
            .send()
            .await
            .map_err(|e| StorageError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(StorageError::Status(response.status().as_u16()));
        }
        Ok(())
    }
}

pub type FailureHook = Arc<dyn Fn(&StorageError) + Send + Sync>;

#[derive(Clone, Default)]
pub struct SideChannel {
    sink: Option<Arc<dyn StorageSink>>,
    on_failure: Option<FailureHook>,
}

impl fmt::Debug for SideChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SideChannel")
            .field("enabled", &self.sink.is_some())
            .finish()
    }
}

impl SideChannel {
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn new(sink: Arc<dyn StorageSink>) -> Self {
        Self {
            sink: Some(sink),
            on_failure: None,
        }
    }

    /// Replaces the default warn-level log on failure.
    pub fn with_failure_hook(mut self, hook: FailureHook) -> Self {
        self.on_failure = Some(hook);
        self
    }

    /// Starts the upload on a detached task and returns immediately.
    ///
    /// Callers are not expected to await the handle.
    pub fn dispatch(&self, image: UploadedImage) -> Option<JoinHandle<()>> {
        let Some(sink) = self.sink.clone() else {
            debug!("no storage endpoint configured, skipping side upload");
            return None;
        };
        let on_failure = self.on_failure.clone();

        Some(tokio::spawn(async move {
            match sink.store(&image).await {
                Ok(()) => debug!(mime_type = %image.mime_type, "image archived"),
                Err(err) => match on_failure {
                    Some(hook) => hook(&err),
                    None => warn!(error = %err, "failed to store image on server"),
                },
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::Value;

    fn image() -> UploadedImage {
        UploadedImage {
            base64: "aGVsbG8=".into(),
            mime_type: "image/png".into(),
            preview_url: String::new(),
        }
    }

    struct Failing;

    #[async_trait]
    impl StorageSink for Failing {
        async fn store(&self, _image: &UploadedImage) -> Result<(), StorageError> {
            Err(StorageError::Status(500))
        }
    }

    #[tokio::test]
    async fn failures_reach_the_hook() {
        let failures = Arc::new(AtomicUsize::new(0));
        let counter = failures.clone();
        let channel = SideChannel::new(Arc::new(Failing)).with_failure_hook(Arc::new(
            move |err: &StorageError| {
                assert!(matches!(err, StorageError::Status(500)));
                counter.fetch_add(1, Ordering::SeqCst);
            },
        ));

        channel.dispatch(image()).unwrap().await.unwrap();
        assert_eq!(failures.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn disabled_channel_spawns_nothing() {
        assert!(SideChannel::disabled().dispatch(image()).is_none());
    }

    #[tokio::test]
    async fn http_storage_posts_image_and_mime_type() {
        let received: Arc<Mutex<Option<Value>>> = Arc::default();
        let sink = received.clone();
        let app = Router::new().route(
            "/upload",
            post(move |Json(body): Json<Value>| async move {
                *sink.lock().unwrap() = Some(body);
                StatusCode::NO_CONTENT
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        let storage = HttpStorage::new(format!("http://{addr}/upload"));
        storage.store(&image()).await.unwrap();

        let body = received.lock().unwrap().take().unwrap();
        assert_eq!(body, serde_json::json!({"image": "aGVsbG8=", "mimeType": "image/png"}));
    }

    #[tokio::test]
    async fn http_storage_reports_server_errors() {
        let app = Router::new().route("/upload", post(|| async { StatusCode::BAD_GATEWAY }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        let err = HttpStorage::new(format!("http://{addr}/upload"))
            .store(&image())
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Status(502)));
    }
}
