//! Transcode Worker - queue consumer for the video pipeline
//!
//! Dequeues transcode jobs from the named Redis list and drives ffmpeg
//! through the three fixed profiles for each one. Blocking the loop for the
//! full duration of an encode is intentional; run more worker processes for
//! parallelism. Jobs are delivered at least once, so the worker skips
//! records that are already processing or completed.
//!
//! Environment variables: DATABASE_URL, REDIS_URL, TRANSCODE_QUEUE_NAME,
//! MEDIA_ROOT, FFMPEG_PATH, THUMB_MAX_DIMENSION.

use std::sync::Arc;
use std::time::Duration;

use media_service::db::PgVideoStore;
use media_service::services::{FfmpegEncoder, JobQueue, RedisJobQueue, TranscodeWorker};
use media_service::storage::MediaStore;
use media_service::Config;
use sqlx::postgres::PgPoolOptions;
use tokio::sync::watch;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("transcode_worker=info".parse().expect("valid directive"))
                .add_directive("media_service=info".parse().expect("valid directive")),
        )
        .init();

    info!("Starting transcode worker");

    let config = Config::from_env().map_err(|e| anyhow::anyhow!("{e}"))?;
    info!(
        queue = %config.queue.queue_name,
        media_root = %config.media.root.display(),
        "Configuration loaded"
    );

    let db_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;

    let queue = RedisJobQueue::connect(&config.queue.redis_url, &config.queue.queue_name)
        .await
        .map_err(|e| anyhow::anyhow!("Redis unavailable: {e}"))?;

    let worker = TranscodeWorker::new(
        Arc::new(PgVideoStore::new(db_pool)),
        MediaStore::new(config.media.root.clone()),
        Arc::new(FfmpegEncoder::new(config.media.ffmpeg_path.clone())),
        config.media.thumbnail_max_dimension,
    );

    // Graceful shutdown on ctrl-c; an in-flight encode finishes first.
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to listen for ctrl+c");
        info!("Shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    let dequeue_timeout = Duration::from_secs(config.queue.dequeue_timeout_secs);

    loop {
        tokio::select! {
            _ = shutdown_rx.changed() => {
                if *shutdown_rx.borrow() {
                    break;
                }
            }
            next = queue.dequeue(dequeue_timeout) => {
                match next {
                    Ok(Some(job)) => {
                        info!(?job, "job dequeued");
                        if let Err(e) = worker.run_job(&job).await {
                            // run_job already moved the record to failed.
                            error!("job failed: {}", e);
                        }
                    }
                    Ok(None) => {}
                    Err(e) => {
                        warn!("dequeue error, backing off: {}", e);
                        tokio::time::sleep(Duration::from_secs(5)).await;
                    }
                }
            }
        }
    }

    info!("Transcode worker stopped");
    Ok(())
}
