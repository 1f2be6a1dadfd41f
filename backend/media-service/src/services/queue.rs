/// Transcode job queue
///
/// One named Redis list carries all transcode jobs. Delivery is
/// at-least-once: a job may be observed twice, which the worker tolerates
/// because encoding overwrites its outputs and the status guard skips
/// records that are already in flight or done.
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, Result};

/// Unit of asynchronous work consumed by the transcode worker.
///
/// `Video` is the normal path and carries a record id. `RawFile` is the
/// alternate ingestion path: it runs the same encode routine over a bare
/// file without touching any record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TranscodeJob {
    Video { video_id: Uuid },
    RawFile { path: String },
}

impl TranscodeJob {
    pub fn for_video(video_id: Uuid) -> Self {
        Self::Video { video_id }
    }
}

/// Durable work queue with a single named channel.
///
/// Constructed at process start and injected into the ingestion trigger and
/// the worker; there is no module-level queue state.
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Push a job onto the channel.
    async fn enqueue(&self, job: &TranscodeJob) -> Result<()>;

    /// Block up to `timeout` for the next job. `None` on timeout.
    async fn dequeue(&self, timeout: Duration) -> Result<Option<TranscodeJob>>;
}

/// Redis-list-backed queue (LPUSH to enqueue, BRPOP to dequeue).
#[derive(Clone)]
pub struct RedisJobQueue {
    conn: ConnectionManager,
    queue_name: String,
}

impl RedisJobQueue {
    /// Connect to Redis and bind to the named channel.
    pub async fn connect(redis_url: &str, queue_name: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url)?;
        let conn = ConnectionManager::new(client).await?;

        Ok(Self {
            conn,
            queue_name: queue_name.to_string(),
        })
    }

    pub fn queue_name(&self) -> &str {
        &self.queue_name
    }
}

#[async_trait]
impl JobQueue for RedisJobQueue {
    async fn enqueue(&self, job: &TranscodeJob) -> Result<()> {
        let payload = serde_json::to_string(job)?;
        let mut conn = self.conn.clone();

        redis::cmd("LPUSH")
            .arg(&self.queue_name)
            .arg(payload)
            .query_async::<_, ()>(&mut conn)
            .await?;

        Ok(())
    }

    async fn dequeue(&self, timeout: Duration) -> Result<Option<TranscodeJob>> {
        let mut conn = self.conn.clone();

        let reply: Option<(String, String)> = redis::cmd("BRPOP")
            .arg(&self.queue_name)
            .arg(timeout.as_secs())
            .query_async(&mut conn)
            .await?;

        match reply {
            Some((_list, payload)) => {
                let job = serde_json::from_str(&payload).map_err(|e| {
                    AppError::Queue(format!("malformed job payload: {e}"))
                })?;
                Ok(Some(job))
            }
            None => Ok(None),
        }
    }
}
