use serde::{Deserialize, Serialize};
use ts_rs::TS;

crate::string_enum! {
    pub enum AttendanceStatus("attendance.ts") {
        Present => "present",
        Absent => "absent",
        Late => "late",
        Excused => "excused",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "attendance.ts")]
pub struct AttendanceRecord {
    pub id: i64,
    pub course_id: i64,
    pub lesson_id: Option<i64>,
    pub student_id: i64,
    // 上课日期 YYYY-MM-DD
    pub session_date: chrono::NaiveDate,
    pub status: AttendanceStatus,
    pub note: Option<String>,
    pub recorded_by: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// 考勤计数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, TS)]
#[ts(export, export_to = "attendance.ts")]
pub struct AttendanceTally {
    pub present: u32,
    pub absent: u32,
    pub late: u32,
    pub excused: u32,
}

impl AttendanceTally {
    pub fn add(&mut self, status: AttendanceStatus) {
        match status {
            AttendanceStatus::Present => self.present += 1,
            AttendanceStatus::Absent => self.absent += 1,
            AttendanceStatus::Late => self.late += 1,
            AttendanceStatus::Excused => self.excused += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.present + self.absent + self.late + self.excused
    }

    /// 出勤率（迟到计为出勤），百分制保留两位小数
    pub fn rate(&self) -> Option<f64> {
        let total = self.total();
        if total == 0 {
            return None;
        }
        let attended = f64::from(self.present + self.late);
        Some(((attended / f64::from(total)) * 10000.0).round() / 100.0)
    }
}

impl FromIterator<AttendanceStatus> for AttendanceTally {
    fn from_iter<I: IntoIterator<Item = AttendanceStatus>>(iter: I) -> Self {
        let mut tally = AttendanceTally::default();
        for status in iter {
            tally.add(status);
        }
        tally
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_counts_late_as_attended() {
        let tally: AttendanceTally = [
            AttendanceStatus::Present,
            AttendanceStatus::Late,
            AttendanceStatus::Absent,
            AttendanceStatus::Excused,
        ]
        .into_iter()
        .collect();
        assert_eq!(tally.total(), 4);
        assert_eq!(tally.rate(), Some(50.0));
    }

    #[test]
    fn test_rate_rounding_and_empty() {
        assert_eq!(AttendanceTally::default().rate(), None);
        let tally: AttendanceTally = [
            AttendanceStatus::Present,
            AttendanceStatus::Absent,
            AttendanceStatus::Absent,
        ]
        .into_iter()
        .collect();
        assert_eq!(tally.rate(), Some(33.33));
    }
}
