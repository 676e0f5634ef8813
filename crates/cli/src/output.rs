// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Plain `println!`-based human-readable formatting. No table-formatting
//! crate: every command here prints fixed-width columns directly.

use numerus_storage::TaskRow;

/// Render `epoch_ms` as a `HH:MM:SS` UTC clock time, without pulling in a
/// timezone crate the rest of the workspace has no other use for.
fn hms(epoch_ms: u64) -> String {
    let secs_of_day = (epoch_ms / 1000) % 86_400;
    let h = secs_of_day / 3600;
    let m = (secs_of_day % 3600) / 60;
    let s = secs_of_day % 60;
    format!("{h:02}:{m:02}:{s:02}")
}

pub fn print_status_table(rows: &[TaskRow]) {
    let header = format!(
        "{:<12} {:<18} {:<10} {:<10} {:<8} {:<6} {}",
        "Task", "Status", "Created", "Updated", "PID", "Exit", "Objective"
    );
    println!("{header}");
    println!("{}", "-".repeat(header.len()));
    for row in rows {
        let pid = row.worker_pid.map(|p| p.to_string()).unwrap_or_else(|| "-".to_string());
        let exit = row.exit_code.map(|c| c.to_string()).unwrap_or_else(|| "-".to_string());
        println!(
            "{:<12} {:<18} {:<10} {:<10} {:<8} {:<6} {}",
            row.task_id,
            row.status,
            hms(row.created_at_ms),
            hms(row.updated_at_ms),
            pid,
            exit,
            row.objective,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::hms;

    #[test]
    fn formats_midnight() {
        assert_eq!(hms(0), "00:00:00");
    }

    #[test]
    fn formats_within_a_day() {
        // 1h 2m 3s after midnight UTC.
        let ms = (3_600 + 2 * 60 + 3) * 1000;
        assert_eq!(hms(ms), "01:02:03");
    }

    #[test]
    fn wraps_past_a_day() {
        let one_day_ms = 86_400 * 1000;
        assert_eq!(hms(one_day_ms + 5_000), hms(5_000));
    }
}
