// SPDX-FileCopyrightText: 2026 Canvass Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Submission history as CSV and as a recent-first listing.

use std::path::Path;

use canvass_core::{CanvassError, Submission};
use tracing::info;

use crate::export_error;

const HEADER: [&str; 4] = ["Date", "User", "Question", "Answer"];

/// Renders `history` as CSV, one row per answer.
///
/// Fields are quoted as needed rather than stripped of commas. Dates that
/// parse as RFC 3339 are shown as `YYYY-MM-DD HH:MM:SS` (UTC); anything else
/// is written as stored.
pub fn history_csv(history: &[Submission]) -> Result<String, CanvassError> {
    render(history).map(|(body, _)| body)
}

/// Writes [`history_csv`] output to `path`, returning the number of rows.
pub fn write_csv(history: &[Submission], path: &Path) -> Result<usize, CanvassError> {
    let (body, rows) = render(history)?;
    std::fs::write(path, &body).map_err(export_error)?;
    info!(path = %path.display(), rows, "history exported");
    Ok(rows)
}

fn render(history: &[Submission]) -> Result<(String, usize), CanvassError> {
    if history.is_empty() {
        return Err(CanvassError::validation("no feedback data to export"));
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADER).map_err(export_error)?;
    let mut rows = 0;
    for submission in history {
        let date = display_date(submission);
        for answer in &submission.answers {
            writer
                .write_record([
                    date.as_str(),
                    submission.user.as_str(),
                    answer.question.as_str(),
                    answer.answer.as_str(),
                ])
                .map_err(export_error)?;
            rows += 1;
        }
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| export_error(e.into_error()))?;
    let body = String::from_utf8(bytes).map_err(export_error)?;
    Ok((body, rows))
}

/// The newest `limit` submissions, newest first.
///
/// History is append-only, so position is recency; stored dates are not
/// trusted for ordering.
pub fn recent_submissions(history: &[Submission], limit: usize) -> Vec<&Submission> {
    history.iter().rev().take(limit).collect()
}

fn display_date(submission: &Submission) -> String {
    match submission.parsed_date() {
        Some(date) => date.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => submission.date.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canvass_test_utils::fixtures::submission;

    #[test]
    fn one_row_per_answer_with_header() {
        let history = vec![
            submission("Dana", "2026-10-14T17:05:00Z", &[("Q1", "a"), ("Q2", "b")]),
            submission("Lee", "2026-10-15T08:00:00+02:00", &[("Q1", "c")]),
        ];
        let csv = history_csv(&history).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Date,User,Question,Answer",
                "2026-10-14 17:05:00,Dana,Q1,a",
                "2026-10-14 17:05:00,Dana,Q2,b",
                "2026-10-15 06:00:00,Lee,Q1,c",
            ]
        );
    }

    #[test]
    fn commas_and_quotes_are_escaped_not_stripped() {
        let history = vec![submission(
            "Smith, J",
            "2026-10-14T17:05:00Z",
            &[("How was it?", "Busy, \"really\" busy")],
        )];
        let csv = history_csv(&history).unwrap();
        assert!(csv.contains("\"Smith, J\""));
        assert!(csv.contains("\"Busy, \"\"really\"\" busy\""));
    }

    #[test]
    fn unparseable_date_is_written_verbatim() {
        let history = vec![submission("Dana", "last tuesday", &[("Q1", "a")])];
        let csv = history_csv(&history).unwrap();
        assert!(csv.contains("last tuesday,Dana,Q1,a"));
    }

    #[test]
    fn empty_history_is_rejected() {
        let err = history_csv(&[]).unwrap_err();
        assert!(matches!(err, CanvassError::ValidationFailed { .. }));
        assert!(err.to_string().contains("no feedback data"));
    }

    #[test]
    fn submission_without_answers_adds_no_rows() {
        let history = vec![submission("Dana", "2026-10-14T17:05:00Z", &[])];
        assert_eq!(history_csv(&history).unwrap().lines().count(), 1);
    }

    #[test]
    fn recent_is_newest_first_and_capped() {
        let history: Vec<Submission> = (0..5)
            .map(|i| submission(&format!("user{i}"), "2026-10-14T17:05:00Z", &[]))
            .collect();
        let recent = recent_submissions(&history, 3);
        let users: Vec<&str> = recent.iter().map(|s| s.user.as_str()).collect();
        assert_eq!(users, vec!["user4", "user3", "user2"]);
        assert_eq!(recent_submissions(&history, 50).len(), 5);
        assert!(recent_submissions(&history, 0).is_empty());
    }
}
