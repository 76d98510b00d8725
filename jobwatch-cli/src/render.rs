//! Terminal rendering
//!
//! Prints the job table, job details and the polling status line.

use chrono::{DateTime, Utc};
use colored::*;
use jobwatch_core::domain::job::{Job, JobStatus, JobSummary};
use jobwatch_core::domain::polling::PollingState;
use jobwatch_core::stats::JobStats;

/// Print the dashboard: header counts followed by one line per job
pub fn print_dashboard(jobs: &[JobSummary]) {
    let stats = JobStats::from_summaries(jobs);

    println!();
    println!(
        "{}  {} active, {} total",
        "Jobs".bold(),
        stats.active().to_string().cyan(),
        stats.total()
    );
    let breakdown: Vec<String> = JobStatus::ALL
        .iter()
        .filter(|status| stats.count(**status) > 0)
        .map(|status| format!("{} {}", stats.count(*status), colorize_status(*status)))
        .collect();
    if !breakdown.is_empty() {
        println!("  {}", breakdown.join("  "));
    }
    println!("{}", "─".repeat(80).dimmed());

    if jobs.is_empty() {
        println!("{}", "No jobs found.".yellow());
        return;
    }

    for job in jobs {
        print_job_summary(job);
    }
}

/// Print one dashboard row
fn print_job_summary(job: &JobSummary) {
    let short_id: String = job.id.to_string().chars().take(8).collect();
    let title = job.title.as_deref().unwrap_or("(untitled)");

    println!(
        "  {} {} {:<11} {:<20} {} {}",
        "▸".cyan(),
        short_id.dimmed(),
        colorize_status(job.status),
        job.agent_identifier,
        title,
        format!("updated {}", ago(job.updated_at)).dimmed()
    );
}

/// Print detailed job information
pub fn print_job_details(job: &Job) {
    println!();
    println!("{}", "Job Details:".bold());
    println!("  ID:          {}", job.id.to_string().cyan());
    if let Some(title) = &job.title {
        println!("  Title:       {}", title);
    }
    println!("  Agent:       {}", job.agent_identifier);
    println!("  Status:      {}", colorize_status(job.status));
    if let Some(priority) = job.priority {
        println!("  Priority:    {}", priority);
    }
    println!("  Created:     {}", job.created_at.format("%Y-%m-%d %H:%M:%S"));

    if let Some(started) = job.started_at {
        println!("  Started:     {}", started.format("%Y-%m-%d %H:%M:%S"));
    }

    if let Some(completed) = job.completed_at {
        println!("  Completed:   {}", completed.format("%Y-%m-%d %H:%M:%S"));
    }

    if let Some(duration) = job.duration() {
        println!("  Duration:    {}s", duration.num_seconds());
    }

    if !job.data.is_null() {
        println!("\n{}", "Input:".bold());
        print_json(&job.data);
    }

    if let Some(result) = &job.result {
        println!("\n{}", "Result:".bold());
        print_json(result);
    }

    if let Some(error) = &job.error {
        println!("\n{}", "Error:".bold());
        println!("{}", error.red());
    }
}

/// Print the poller status line
pub fn print_polling_state(state: &PollingState) {
    let mode = if state.is_paused {
        "paused".yellow()
    } else if state.is_polling {
        "refreshing".cyan()
    } else if state.is_failing() {
        "retrying".red()
    } else {
        "live".green()
    };

    let updated = state
        .last_update
        .map(|at| format!("updated {}", ago(at)))
        .unwrap_or_else(|| "never updated".to_string());

    let mut line = format!("[{}] {}", mode, updated.dimmed());
    if let Some(error) = &state.error {
        line.push_str(&format!("  {} {}", "error:".red(), error));
        if state.retry_count > 0 {
            line.push_str(&format!(" (retry {})", state.retry_count));
        }
    }

    eprintln!("{}", line);
}

pub fn print_controls() {
    eprintln!(
        "{}",
        "Controls: p = pause, r = resume, f = refresh, q = quit".dimmed()
    );
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(pretty) => println!("{}", pretty),
        Err(_) => println!("{:?}", value),
    }
}

/// Colorize job status for display
fn colorize_status(status: JobStatus) -> ColoredString {
    let label = status.as_str();
    match status {
        JobStatus::Pending => label.yellow(),
        JobStatus::Running => label.cyan(),
        JobStatus::Completed => label.green(),
        JobStatus::Failed => label.red(),
        JobStatus::Cancelled => label.dimmed(),
    }
}

/// Coarse relative time, e.g. "5s ago"
fn ago(at: DateTime<Utc>) -> String {
    let seconds = Utc::now().signed_duration_since(at).num_seconds().max(0);
    match seconds {
        0..=59 => format!("{}s ago", seconds),
        60..=3599 => format!("{}m ago", seconds / 60),
        3600..=86_399 => format!("{}h ago", seconds / 3600),
        _ => format!("{}d ago", seconds / 86_400),
    }
}
