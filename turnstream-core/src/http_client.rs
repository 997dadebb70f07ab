use futures::stream::BoxStream;
use futures_util::StreamExt;
use reqwest::{Client, StatusCode};
use serde::Serialize;

use crate::config::HttpCfg;
use crate::error::{CoreResult, TurnStreamError};

/// A boxed stream of raw body chunks, errors already mapped.
pub type ByteStream = BoxStream<'static, CoreResult<bytes::Bytes>>;

/// Thin wrapper around reqwest::Client with defaults and helpers.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client,
    user_agent: String,
}

impl HttpClient {
    pub fn new_default() -> CoreResult<Self> {
        Self::from_cfg(&HttpCfg::default())
    }

    pub fn from_cfg(cfg: &HttpCfg) -> CoreResult<Self> {
        let mut builder = Client::builder()
            .connect_timeout(std::time::Duration::from_millis(cfg.connect_timeout_ms))
            .pool_max_idle_per_host(cfg.pool_max_idle_per_host);
        // Reply streams are long-lived; a total timeout is opt-in.
        if let Some(ms) = cfg.request_timeout_ms {
            builder = builder.timeout(std::time::Duration::from_millis(ms));
        }
        let inner = builder
            .build()
            .map_err(|e| TurnStreamError::Other(anyhow::anyhow!("http client build failed: {e}")))?;
        Ok(Self {
            inner,
            user_agent: "turnstream/0.1".to_string(),
        })
    }

    /// POST a JSON body and return the response's chunked byte stream.
    /// Non-2xx responses become a transport error before any chunk is
    /// yielded. Cancellation is the caller's concern: the returned
    /// stream is simply dropped when the turn's token fires.
    pub async fn post_stream<T: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &T,
    ) -> CoreResult<ByteStream> {
        let resp = self
            .inner
            .post(url)
            .json(body)
            .header("User-Agent", &self.user_agent)
            .send()
            .await
            .map_err(|e| TurnStreamError::Transport {
                status: "network".into(),
                message: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(map_http_error(status, &text));
        }

        let byte_stream = resp.bytes_stream().map(|item| {
            item.map_err(|e| TurnStreamError::Transport {
                status: "stream".into(),
                message: e.to_string(),
            })
        });
        Ok(byte_stream.boxed())
    }
}

fn map_http_error(status: StatusCode, body: &str) -> TurnStreamError {
    TurnStreamError::Transport {
        status: status.as_u16().to_string(),
        message: truncate(body, 300),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() > max {
        let mut t = s[..max].to_string();
        t.push_str("...");
        t
    } else {
        s.to_string()
    }
}
