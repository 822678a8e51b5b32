use serde::{Deserialize, Serialize};
use ts_rs::TS;

crate::string_enum! {
    pub enum GradeCategory("grade.ts") {
        Exam => "exam",
        Quiz => "quiz",
        Homework => "homework",
        Oral => "oral",
        Participation => "participation",
        Other => "other",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "grade.ts")]
pub struct GradeRecord {
    pub id: i64,
    pub course_id: i64,
    pub student_id: i64,
    // 由考试评分生成时关联的考试
    pub exam_id: Option<i64>,
    pub title: String,
    pub category: GradeCategory,
    pub score: f64,
    pub max_score: f64,
    // 计算加权平均时的权重
    pub weight: f64,
    pub comment: Option<String>,
    pub graded_by: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl GradeRecord {
    /// 百分制得分
    pub fn percentage(&self) -> f64 {
        if self.max_score <= 0.0 {
            return 0.0;
        }
        self.score / self.max_score * 100.0
    }
}

/// 按权重计算百分制平均分，没有有效权重时返回 None
pub fn weighted_average(records: &[GradeRecord]) -> Option<f64> {
    let total_weight: f64 = records.iter().map(|r| r.weight).sum();
    if total_weight <= 0.0 {
        return None;
    }
    let sum: f64 = records.iter().map(|r| r.percentage() * r.weight).sum();
    Some(round2(sum / total_weight))
}

pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// 校验分数、满分与权重
pub fn validate_grade_values(score: f64, max_score: f64, weight: f64) -> Result<(), &'static str> {
    if !score.is_finite() || !max_score.is_finite() || !weight.is_finite() {
        return Err("分数必须为有效数字");
    }
    if max_score <= 0.0 {
        return Err("满分必须大于 0");
    }
    if score < 0.0 || score > max_score {
        return Err("分数必须在 0 到满分之间");
    }
    if weight <= 0.0 {
        return Err("权重必须大于 0");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(score: f64, max_score: f64, weight: f64) -> GradeRecord {
        let now = chrono::Utc::now();
        GradeRecord {
            id: 1,
            course_id: 1,
            student_id: 1,
            exam_id: None,
            title: "Quiz".to_string(),
            category: GradeCategory::Quiz,
            score,
            max_score,
            weight,
            comment: None,
            graded_by: 1,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_weighted_average() {
        // 80% * 1 + 50% * 3 => 57.5
        let records = vec![record(8.0, 10.0, 1.0), record(50.0, 100.0, 3.0)];
        assert_eq!(weighted_average(&records), Some(57.5));
        assert_eq!(weighted_average(&[]), None);
    }

    #[test]
    fn test_average_is_rounded() {
        let records = vec![record(1.0, 3.0, 1.0)];
        assert_eq!(weighted_average(&records), Some(33.33));
    }

    #[test]
    fn test_validate_grade_values() {
        assert!(validate_grade_values(7.5, 10.0, 1.0).is_ok());
        assert!(validate_grade_values(11.0, 10.0, 1.0).is_err());
        assert!(validate_grade_values(-1.0, 10.0, 1.0).is_err());
        assert!(validate_grade_values(1.0, 0.0, 1.0).is_err());
        assert!(validate_grade_values(1.0, 10.0, 0.0).is_err());
        assert!(validate_grade_values(f64::NAN, 10.0, 1.0).is_err());
    }
}
