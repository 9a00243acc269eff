use chrono::{DateTime, FixedOffset, Utc};

use crate::models::quiz::Quiz;

/// The business zone the scheduling UI works in (WIB, UTC+7). Quiz bounds
/// are stored as UTC instants; only the inclusive end-of-day rule needs the
/// civil zone to decide which calendar day an end timestamp falls on.
const WIB_OFFSET_SECS: i32 = 7 * 3600;

/// Whether a quiz currently accepts submissions, with the reason when it
/// does not. Callers surface the reason to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizActivity {
    Active,
    /// Activation flag off, or no window configured.
    Disabled,
    NotYetStarted { starts: DateTime<Utc> },
    Ended,
}

impl QuizActivity {
    pub fn is_active(&self) -> bool {
        matches!(self, QuizActivity::Active)
    }

    pub fn message(&self) -> String {
        match self {
            QuizActivity::Active => "Quiz aktif".to_string(),
            QuizActivity::Disabled => "Quiz tidak aktif".to_string(),
            QuizActivity::NotYetStarted { starts } => {
                let local = starts.with_timezone(&wib());
                format!("Quiz belum dimulai. Akan aktif pada {}", local.format("%d/%m/%Y"))
            }
            QuizActivity::Ended => "Periode quiz sudah berakhir".to_string(),
        }
    }
}

fn wib() -> FixedOffset {
    FixedOffset::east_opt(WIB_OFFSET_SECS).expect("WIB offset is valid")
}

/// Evaluate the activity window. The end date is inclusive through the last
/// second (23:59:59) of its calendar day in WIB, so a quiz ending "on" a
/// date stays open for that entire date.
pub fn evaluate(
    is_active: bool,
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> QuizActivity {
    if !is_active {
        return QuizActivity::Disabled;
    }
    let (Some(start), Some(end)) = (start_date, end_date) else {
        return QuizActivity::Disabled;
    };

    if now < start {
        return QuizActivity::NotYetStarted { starts: start };
    }

    let end_of_day = end
        .with_timezone(&wib())
        .date_naive()
        .and_hms_opt(23, 59, 59)
        .expect("23:59:59 is a valid time")
        .and_local_timezone(wib())
        .single()
        .expect("fixed offset has no ambiguous times")
        .with_timezone(&Utc);

    if now > end_of_day {
        return QuizActivity::Ended;
    }

    QuizActivity::Active
}

pub fn evaluate_quiz(quiz: &Quiz, now: DateTime<Utc>) -> QuizActivity {
    evaluate(quiz.is_active, quiz.start_date, quiz.end_date, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn disabled_flag_wins_over_dates() {
        let start = utc(2025, 1, 1, 0, 0, 0);
        let end = utc(2025, 12, 31, 0, 0, 0);
        let now = utc(2025, 6, 1, 12, 0, 0);
        assert_eq!(
            evaluate(false, Some(start), Some(end), now),
            QuizActivity::Disabled
        );
    }

    #[test]
    fn missing_bounds_mean_inactive() {
        let now = utc(2025, 6, 1, 12, 0, 0);
        assert_eq!(evaluate(true, None, Some(now), now), QuizActivity::Disabled);
        assert_eq!(evaluate(true, Some(now), None, now), QuizActivity::Disabled);
    }

    #[test]
    fn end_date_is_inclusive_through_its_day() {
        // Window: yesterday .. today (end stored at midnight WIB, i.e.
        // 2025-06-01T17:00Z is 2025-06-02T00:00+07:00).
        let start = utc(2025, 5, 31, 17, 0, 0);
        let end = utc(2025, 6, 1, 17, 0, 0);

        // Late evening WIB on the end date: 2025-06-02 23:30 WIB.
        let late = utc(2025, 6, 2, 16, 30, 0);
        assert_eq!(evaluate(true, Some(start), Some(end), late), QuizActivity::Active);

        // First second past the end day in WIB: 2025-06-03 00:00:00 WIB.
        let past = utc(2025, 6, 2, 17, 0, 0);
        assert_eq!(evaluate(true, Some(start), Some(end), past), QuizActivity::Ended);
    }

    #[test]
    fn before_start_reports_not_yet_started() {
        let start = utc(2025, 6, 10, 0, 0, 0);
        let end = utc(2025, 6, 20, 0, 0, 0);
        let now = utc(2025, 6, 1, 0, 0, 0);
        let activity = evaluate(true, Some(start), Some(end), now);
        assert_eq!(activity, QuizActivity::NotYetStarted { starts: start });
        assert!(activity.message().contains("belum dimulai"));
    }

    #[test]
    fn after_end_reports_ended() {
        let start = utc(2025, 6, 1, 0, 0, 0);
        let end = utc(2025, 6, 2, 0, 0, 0);
        let now = utc(2025, 7, 1, 0, 0, 0);
        let activity = evaluate(true, Some(start), Some(end), now);
        assert_eq!(activity, QuizActivity::Ended);
        assert_eq!(activity.message(), "Periode quiz sudah berakhir");
    }

    #[test]
    fn inside_window_is_active() {
        let start = utc(2025, 6, 1, 0, 0, 0);
        let end = utc(2025, 6, 30, 0, 0, 0);
        let now = utc(2025, 6, 15, 8, 0, 0);
        assert!(evaluate(true, Some(start), Some(end), now).is_active());
    }
}
