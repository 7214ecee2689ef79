//! Terminal output formatting.

use colored::Colorize;

use interlink_core::{Domain, ExhaustedEvent};
use interlink_graph::queries::edges::SubjectEdge;
use interlink_worker::{BatchReport, EventOutcome};

/// Print the totals of one or more polling cycles.
pub fn print_report(report: &BatchReport) {
    if report.is_idle() {
        println!("{}", "Outbox is empty.".dimmed());
        return;
    }

    println!("{}", "Outbox drained".bold());
    println!("{}", "─".repeat(40));
    println!("  Claimed:   {}", report.claimed);
    println!("  Synced:    {}", report.synced.to_string().green());
    println!("  Deleted:   {}", report.deleted.to_string().green());
    if report.skipped > 0 {
        println!("  Skipped:   {}", report.skipped.to_string().yellow());
    }
    if report.unrouted > 0 {
        println!("  Unrouted:  {}", report.unrouted.to_string().yellow());
    }
    if report.failed > 0 {
        println!("  Failed:    {}", report.failed.to_string().red());
    }
    if report.bookkeeping_errors > 0 {
        println!("  Status update errors: {}", report.bookkeeping_errors.to_string().red());
    }
    println!("{}", "─".repeat(40));
}

/// Print the result of a manual resync.
pub fn print_outcome(domain: Domain, subject_id: &str, outcome: &EventOutcome) {
    let subject = format!("{} {}", domain.to_string().cyan(), subject_id.yellow());
    match outcome {
        EventOutcome::Synced { edges } => {
            println!("{} {} synced ({} edges)", "✓".green(), subject, edges)
        }
        EventOutcome::Deleted => println!("{} {} removed from graph", "✓".green(), subject),
        EventOutcome::SkippedMissingSubject => {
            println!("{} {} not found at source; graph unchanged", "!".yellow(), subject)
        }
        EventOutcome::Unrouted => println!("{} no pipeline for {}", "✗".red(), subject),
    }
}

/// Print exhausted outbox rows as a table.
pub fn print_exhausted_table(events: &[ExhaustedEvent], total: i64) {
    if events.is_empty() {
        println!("{}", "No exhausted events.".dimmed());
        return;
    }

    println!(
        "{:<10} {:<16} {:<24} {:<7} {:<9} {}",
        "ID", "Type", "Aggregate", "Op", "Attempts", "Last error"
    );
    println!("{}", "─".repeat(100));

    for ExhaustedEvent { event, last_error } in events {
        println!(
            "{:<10} {:<16} {:<24} {:<7} {:<9} {}",
            event.id,
            event.aggregate_type,
            truncate(&event.aggregate_id, 22),
            event.op.as_str(),
            event.attempts.to_string().red(),
            truncate(last_error.as_deref().unwrap_or("-"), 40).dimmed()
        );
    }

    if total > events.len() as i64 {
        println!("\n{} of {} shown.", events.len(), total.to_string().bold());
    }
}

/// Print a subject's outgoing edges.
pub fn print_edges(edges: &[SubjectEdge]) {
    if edges.is_empty() {
        println!("{}", "No edges found.".dimmed());
        return;
    }

    for edge in edges {
        let count = edge.count.map(|c| format!(" count={}", c)).unwrap_or_default();
        println!(
            "  {} {} [{}] {}{}",
            "→".dimmed(),
            edge.kind.yellow(),
            edge.target_label.dimmed(),
            edge.target_id,
            count.dimmed()
        );
    }

    println!("\n{} edges.", edges.len().to_string().bold());
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("connection refused by peer", 10), "connect...");
        assert_eq!(truncate("ééééééé", 5), "éé...");
    }
}
