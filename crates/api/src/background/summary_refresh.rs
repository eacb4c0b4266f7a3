//! Periodic weekly-summary generation.
//!
//! Iterates every distinct (city, department) admin scope, computes the
//! weekly statistics, and asks the configured [`Summarizer`] for a fresh
//! narrative, upserting the result into `summary_cache`. Request handlers
//! only ever read the cache, so a slow or failing text-generation service
//! cannot stall an admin's request.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use cityline_core::summary::{compute_weekly_stats, render_prompt, IssueSample, WeeklyStats};
use cityline_db::repositories::SummaryRepo;
use cityline_services::summary::Summarizer;

/// Length of one reporting window.
const WINDOW_DAYS: i64 = 7;

/// Run the summary refresh loop until `cancel` is triggered.
///
/// The first tick fires immediately so a fresh deployment has summaries
/// without waiting a full interval.
pub async fn run(
    pool: PgPool,
    summarizer: Arc<dyn Summarizer>,
    refresh_interval: Duration,
    cancel: CancellationToken,
) {
    tracing::info!(
        interval_secs = refresh_interval.as_secs(),
        "Summary refresh job started"
    );

    let mut interval = tokio::time::interval(refresh_interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Summary refresh job stopping");
                break;
            }
            _ = interval.tick() => {
                refresh_all(&pool, summarizer.as_ref()).await;
            }
        }
    }
}

/// Refresh the cached narrative for every admin scope. A failure on one
/// scope is logged and does not stop the others.
pub async fn refresh_all(pool: &PgPool, summarizer: &dyn Summarizer) {
    let scopes = match SummaryRepo::admin_scopes(pool).await {
        Ok(scopes) => scopes,
        Err(e) => {
            tracing::error!(error = %e, "Summary refresh: failed to list admin scopes");
            return;
        }
    };

    for (city, department) in scopes {
        match refresh_scope(pool, summarizer, &city, &department).await {
            Ok(()) => {
                tracing::info!(city, department, "Summary refreshed");
            }
            Err(e) => {
                tracing::error!(city, department, error = %e, "Summary refresh failed");
            }
        }
    }
}

/// Compute stats and regenerate the narrative for one scope.
async fn refresh_scope(
    pool: &PgPool,
    summarizer: &dyn Summarizer,
    city: &str,
    department: &str,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let stats = scope_weekly_stats(pool, city, department).await?;
    let prompt = render_prompt(city, department, &stats);

    let narrative = summarizer.generate(&prompt).await?;

    let stats_json = serde_json::to_value(&stats)?;
    SummaryRepo::upsert(pool, city, department, &narrative, &stats_json).await?;
    Ok(())
}

/// Weekly stats for one scope: the last seven days measured against the
/// seven days before them. Shared with the `/admin/summary` handler so the
/// request path and the job agree on the windows.
pub async fn scope_weekly_stats(
    pool: &PgPool,
    city: &str,
    department: &str,
) -> Result<WeeklyStats, sqlx::Error> {
    let now = Utc::now();
    let week_ago = now - chrono::Duration::days(WINDOW_DAYS);
    let two_weeks_ago = now - chrono::Duration::days(2 * WINDOW_DAYS);

    let current: Vec<IssueSample> =
        SummaryRepo::weekly_samples(pool, city, department, week_ago, now)
            .await?
            .into_iter()
            .map(Into::into)
            .collect();
    let previous: Vec<IssueSample> =
        SummaryRepo::weekly_samples(pool, city, department, two_weeks_ago, week_ago)
            .await?
            .into_iter()
            .map(Into::into)
            .collect();

    Ok(compute_weekly_stats(&current, &previous))
}
