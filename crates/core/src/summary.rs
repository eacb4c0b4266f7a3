//! Weekly performance statistics for one (city, department) scope.
//!
//! The stats are computed over two adjacent seven-day reporting windows
//! and feed both the summary API response and the prompt sent to the
//! narrative generator. Generation itself lives in `cityline-services`;
//! this module is pure math and text.

use serde::{Deserialize, Serialize};

use crate::issue::{IssueStatus, Severity};

/// Narrative served while no generated summary exists for a scope.
pub const SUMMARY_PLACEHOLDER: &str = "(Weekly summary not yet generated.)";

/// One issue drawn from a reporting window, reduced to what the stats need.
#[derive(Debug, Clone)]
pub struct IssueSample {
    pub status: IssueStatus,
    pub severity: Severity,
    pub category: String,
    /// Hours between creation and last update. Zero means the issue was
    /// never touched and is excluded from resolution-time averages.
    pub resolution_hours: f64,
}

/// Week-over-week movement of the average resolution time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolutionTrend {
    #[serde(rename = "improved")]
    Improved,
    #[serde(rename = "slowed down")]
    SlowedDown,
}

impl ResolutionTrend {
    pub fn as_str(self) -> &'static str {
        match self {
            ResolutionTrend::Improved => "improved",
            ResolutionTrend::SlowedDown => "slowed down",
        }
    }
}

/// Issue counts per severity tier in the current window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityBreakdown {
    pub critical: i64,
    pub moderate: i64,
    pub minor: i64,
}

impl SeverityBreakdown {
    pub fn count(self, severity: Severity) -> i64 {
        match severity {
            Severity::Critical => self.critical,
            Severity::Moderate => self.moderate,
            Severity::Minor => self.minor,
        }
    }
}

/// Aggregated weekly statistics for one admin scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyStats {
    pub total: i64,
    pub resolved: i64,
    pub in_progress: i64,
    pub pending: i64,
    pub rejected: i64,
    /// Share of this week's issues that are resolved, in percent, one decimal.
    pub resolution_rate: f64,
    /// Mean hours from creation to last update, two decimals; zero when no
    /// issue in the window was ever updated.
    pub avg_resolution_hours: f64,
    pub prev_avg_resolution_hours: f64,
    pub trend: ResolutionTrend,
    pub severity: SeverityBreakdown,
    /// Most frequent category this week; earliest-seen wins ties.
    pub top_category: Option<String>,
    /// Most frequent severity this week; more urgent wins ties.
    pub top_severity: Option<Severity>,
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn count_status(samples: &[IssueSample], status: IssueStatus) -> i64 {
    samples.iter().filter(|s| s.status == status).count() as i64
}

fn avg_resolution(samples: &[IssueSample]) -> f64 {
    let times: Vec<f64> = samples
        .iter()
        .map(|s| s.resolution_hours)
        .filter(|h| *h > 0.0)
        .collect();
    if times.is_empty() {
        return 0.0;
    }
    round2(times.iter().sum::<f64>() / times.len() as f64)
}

fn top_category(samples: &[IssueSample]) -> Option<String> {
    // First-seen order so ties resolve deterministically.
    let mut counts: Vec<(&str, i64)> = Vec::new();
    for sample in samples {
        match counts.iter_mut().find(|(name, _)| *name == sample.category) {
            Some((_, n)) => *n += 1,
            None => counts.push((&sample.category, 1)),
        }
    }
    let mut best: Option<(&str, i64)> = None;
    for (name, n) in counts {
        if best.map_or(true, |(_, max)| n > max) {
            best = Some((name, n));
        }
    }
    best.map(|(name, _)| name.to_string())
}

/// Compute the weekly statistics from the current window's samples and the
/// preceding window's samples.
pub fn compute_weekly_stats(current: &[IssueSample], previous: &[IssueSample]) -> WeeklyStats {
    let total = current.len() as i64;
    let resolved = count_status(current, IssueStatus::Resolved);

    let resolution_rate = if total > 0 {
        round1(resolved as f64 / total as f64 * 100.0)
    } else {
        0.0
    };

    let avg_resolution_hours = avg_resolution(current);
    let prev_avg_resolution_hours = avg_resolution(previous);
    let trend = if avg_resolution_hours < prev_avg_resolution_hours {
        ResolutionTrend::Improved
    } else {
        ResolutionTrend::SlowedDown
    };

    let severity = SeverityBreakdown {
        critical: current.iter().filter(|s| s.severity == Severity::Critical).count() as i64,
        moderate: current.iter().filter(|s| s.severity == Severity::Moderate).count() as i64,
        minor: current.iter().filter(|s| s.severity == Severity::Minor).count() as i64,
    };

    // max_by_key keeps the last maximum, so iterate least-urgent-first to
    // let the more urgent tier win ties.
    let top_severity = Severity::ALL
        .into_iter()
        .rev()
        .filter(|s| severity.count(*s) > 0)
        .max_by_key(|s| severity.count(*s));

    WeeklyStats {
        total,
        resolved,
        in_progress: count_status(current, IssueStatus::InProgress),
        pending: count_status(current, IssueStatus::Pending),
        rejected: count_status(current, IssueStatus::Rejected),
        resolution_rate,
        avg_resolution_hours,
        prev_avg_resolution_hours,
        trend,
        severity,
        top_category: top_category(current),
        top_severity,
    }
}

/// Render the generation prompt for one scope's weekly report.
pub fn render_prompt(city: &str, department: &str, stats: &WeeklyStats) -> String {
    let mut severity_dist = String::from("{");
    for severity in Severity::ALL {
        let count = stats.severity.count(severity);
        if count > 0 {
            if severity_dist.len() > 1 {
                severity_dist.push_str(", ");
            }
            severity_dist.push_str(&format!("'{}': {}", severity.as_str(), count));
        }
    }
    severity_dist.push('}');

    format!(
        "You are an AI analyst that generates weekly performance summaries for municipal service departments.\n\
         \n\
         Generate a professional, insightful weekly report for the **{department} Department** in **{city}**.\n\
         Summarize this week's operational statistics, identify patterns, and give brief improvement suggestions.\n\
         \n\
         ### Weekly Data Overview:\n\
         - Total issues: {total}\n\
         - Resolved: {resolved}\n\
         - In Progress: {in_progress}\n\
         - Pending: {pending}\n\
         - Rejected: {rejected}\n\
         - Resolution Rate: {rate}%\n\
         - Average Resolution Time: {avg} hours (last week: {prev_avg} hours -> {trend})\n\
         - Top Category: {top_category}\n\
         - Severity Distribution: {severity_dist}\n\
         \n\
         ### Report Requirements:\n\
         - Start with a summary paragraph highlighting total activity and performance.\n\
         - Then mention notable improvements or challenges.\n\
         - If resolution time worsened, suggest prioritizing resource allocation.\n\
         - End with an optimistic outlook or plan-of-action tone.\n\
         - Keep it under 180 words, factual and analytical.\n",
        department = department,
        city = city,
        total = stats.total,
        resolved = stats.resolved,
        in_progress = stats.in_progress,
        pending = stats.pending,
        rejected = stats.rejected,
        rate = stats.resolution_rate,
        avg = stats.avg_resolution_hours,
        prev_avg = stats.prev_avg_resolution_hours,
        trend = stats.trend.as_str(),
        top_category = stats.top_category.as_deref().unwrap_or("N/A"),
        severity_dist = severity_dist,
    )
}
