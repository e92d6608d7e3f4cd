use crate::config::EndpointConfig;
use crate::error::QueryError;
use crate::events::QueryEvent;
use crate::streaming::{ReplyStream, normalize_reply};
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use uuid::Uuid;

/// Body posted to the query endpoint
#[derive(Debug, Clone, Serialize)]
pub struct QueryRequest<'a> {
    pub query: &'a str,
}

/// Buffered JSON answer
#[derive(Debug, Clone, Deserialize)]
pub struct QueryResponse {
    pub response: String,
}

/// A reply, in whichever shape the service chose to send it
pub enum Reply {
    /// Whole body was a JSON document
    Buffered(String),
    /// Body is being streamed as framed text
    Streamed(ReplyStream),
}

impl Reply {
    /// Consume the reply and return its normalized text. Fragments of a
    /// streamed reply are handed to `on_fragment` as they arrive.
    pub async fn into_text<F>(self, on_fragment: F) -> Result<String, QueryError>
    where
        F: FnMut(&str),
    {
        match self {
            Reply::Buffered(text) => Ok(normalize_reply(&text)),
            Reply::Streamed(stream) => stream.collect_reply(on_fragment).await,
        }
    }
}

/// `application/json`, ignoring case and any parameters such as `charset`
fn is_json_media_type(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .is_some_and(|media| media.trim().eq_ignore_ascii_case("application/json"))
}

/// HTTP client for the query endpoint
#[derive(Clone)]
pub struct QueryClient {
    url: String,
    client: reqwest::Client,
}

impl QueryClient {
    pub fn new(endpoint: &EndpointConfig) -> Result<Self, QueryError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = endpoint.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(QueryError::Client)?;

        Ok(Self {
            url: endpoint.url.clone(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Post a query and pick the reply shape from the response headers.
    pub async fn send(&self, query: &str) -> Result<Reply, QueryError> {
        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .json(&QueryRequest { query })
            .send()
            .await
            .map_err(|source| QueryError::Transport {
                url: self.url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(QueryError::from_status(status, &body));
        }

        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(is_json_media_type);

        if is_json {
            let body: QueryResponse = response
                .json()
                .await
                .map_err(|e| QueryError::Decode(e.to_string()))?;
            Ok(Reply::Buffered(body.response))
        } else {
            Ok(Reply::Streamed(ReplyStream::from_chunks(response.bytes_stream())))
        }
    }

    /// Send a query and wait for the complete, normalized reply
    pub async fn ask(&self, query: &str) -> Result<String, QueryError> {
        self.send(query).await?.into_text(|_| {}).await
    }

    /// Run a query on a background task, reporting progress over a channel.
    ///
    /// The channel always ends with exactly one `Completed` or `Failed` event
    /// unless the task panics, in which case it just closes.
    pub fn spawn_query(&self, query: String) -> mpsc::UnboundedReceiver<QueryEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        let client = self.clone();

        tokio::spawn(async move {
            let request_id = Uuid::new_v4();
            log::info!("[{request_id}] posting query to {}", client.url);

            let fragments = tx.clone();
            let result = match client.send(&query).await {
                Ok(reply) => {
                    reply
                        .into_text(|fragment| {
                            let _ = fragments.send(QueryEvent::Fragment(fragment.to_string()));
                        })
                        .await
                }
                Err(err) => Err(err),
            };

            let event = match result {
                Ok(reply) => {
                    log::info!("[{request_id}] reply received ({} chars)", reply.chars().count());
                    QueryEvent::Completed(reply)
                }
                Err(err) => {
                    log::error!("[{request_id}] error fetching the response: {err}");
                    QueryEvent::Failed(err.to_string())
                }
            };
            let _ = tx.send(event);
        });

        rx
    }
}
