//! 限时作答规则
//!
//! 与存储无关的纯函数：截止时间、剩余时间、超时判定、答案校验与自动评分。

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

use crate::models::exam_sessions::entities::{ExamSubmission, SessionStatus};
use crate::models::exam_sessions::requests::SubmissionUpdate;
use crate::models::exams::entities::{Exam, Question, QuestionKind};
use crate::models::grades::entities::round2;

pub const MAX_ANSWER_CHARS: usize = 10_000;
pub const MAX_WARNING_DETAIL_CHARS: usize = 500;

/// 截止时间：开始时刻加考试时长，不晚于考试的关闭时间
pub fn deadline_for(exam: &Exam, started_at: DateTime<Utc>) -> DateTime<Utc> {
    let deadline = started_at + Duration::minutes(i64::from(exam.duration_minutes));
    match exam.available_until {
        Some(until) if until < deadline => until,
        _ => deadline,
    }
}

pub fn remaining_seconds(submission: &ExamSubmission, now: DateTime<Utc>) -> i64 {
    if !submission.status.is_open() {
        return 0;
    }
    (submission.deadline_at - now).num_seconds().max(0)
}

/// 超过截止时间加宽限期
pub fn is_expired(deadline_at: DateTime<Utc>, now: DateTime<Utc>, grace_seconds: i64) -> bool {
    now > deadline_at + Duration::seconds(grace_seconds)
}

/// 用时：min(now, deadline) - started
pub fn elapsed_seconds(
    started_at: DateTime<Utc>,
    deadline_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> i64 {
    (now.min(deadline_at) - started_at).num_seconds().max(0)
}

fn is_blank(answer: Option<&String>) -> bool {
    answer.is_none_or(|a| a.trim().is_empty())
}

/// 未作答的必答题 ID，按题目顺序
pub fn unanswered_required(questions: &[Question], answers: &HashMap<i64, String>) -> Vec<i64> {
    let mut ordered: Vec<&Question> = questions.iter().filter(|q| q.required).collect();
    ordered.sort_by_key(|q| (q.position, q.id));
    ordered
        .into_iter()
        .filter(|q| is_blank(answers.get(&q.id)))
        .map(|q| q.id)
        .collect()
}

/// 答案校验：题目必须属于该考试，选择题答案为有效的选项下标
pub fn validate_answers(
    questions: &[Question],
    answers: &HashMap<i64, String>,
) -> Result<(), String> {
    let mut ids: Vec<&i64> = answers.keys().collect();
    ids.sort();
    for id in ids {
        let Some(question) = questions.iter().find(|q| q.id == *id) else {
            return Err(format!("题目 {id} 不属于该考试"));
        };
        let answer = &answers[id];
        if answer.chars().count() > MAX_ANSWER_CHARS {
            return Err(format!("题目 {id} 的答案过长"));
        }
        if question.kind == QuestionKind::MultipleChoice && !answer.trim().is_empty() {
            let valid = answer
                .trim()
                .parse::<usize>()
                .is_ok_and(|idx| idx < question.options.len());
            if !valid {
                return Err(format!("题目 {id} 的选项无效: '{answer}'"));
            }
        }
    }
    Ok(())
}

/// 合并草稿与新提交的答案，新答案覆盖旧答案
pub fn merge_answers(
    draft: &HashMap<i64, String>,
    incoming: HashMap<i64, String>,
) -> HashMap<i64, String> {
    let mut merged = draft.clone();
    merged.extend(incoming);
    merged
}

/// 自动评分：答对的选择题分值之和占全部题目分值的比例，折算到考试满分
///
/// 简答题计入总分但不自动给分，需要教师人工评分。
pub fn auto_score(questions: &[Question], answers: &HashMap<i64, String>, max_score: f64) -> f64 {
    let total: f64 = questions.iter().map(|q| q.points).sum();
    if total <= 0.0 {
        return 0.0;
    }
    let earned: f64 = questions
        .iter()
        .filter(|q| q.kind == QuestionKind::MultipleChoice)
        .filter(|q| {
            let chosen = answers.get(&q.id).and_then(|a| a.trim().parse::<i32>().ok());
            chosen.is_some() && chosen == q.correct_option
        })
        .map(|q| q.points)
        .sum();
    round2(earned / total * max_score)
}

/// 结束作答：按时提交为 submitted，超时为 auto_submitted
pub fn finalize(
    submission: &ExamSubmission,
    exam: &Exam,
    questions: &[Question],
    answers: HashMap<i64, String>,
    now: DateTime<Utc>,
    grace_seconds: i64,
) -> SubmissionUpdate {
    let expired = is_expired(submission.deadline_at, now, grace_seconds);
    let status = if expired {
        SessionStatus::AutoSubmitted
    } else {
        SessionStatus::Submitted
    };
    SubmissionUpdate {
        status: Some(status),
        submitted_at: Some(if expired {
            submission.deadline_at
        } else {
            now
        }),
        elapsed_seconds: Some(elapsed_seconds(
            submission.started_at,
            submission.deadline_at,
            now,
        )),
        auto_score: Some(auto_score(questions, &answers, exam.max_score)),
        answers: Some(answers),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exam(duration_minutes: i32) -> Exam {
        let now = Utc::now();
        Exam {
            id: 1,
            course_id: 1,
            title: "Final".to_string(),
            description: None,
            duration_minutes,
            max_score: 100.0,
            available_from: None,
            available_until: None,
            require_all_answered: true,
            proctoring_enabled: true,
            published: true,
            created_by: 1,
            created_at: now,
            updated_at: now,
        }
    }

    fn choice(id: i64, position: i32, correct: i32, points: f64) -> Question {
        Question {
            id,
            exam_id: 1,
            section: "Grammar".to_string(),
            position,
            kind: QuestionKind::MultipleChoice,
            prompt: format!("q{id}"),
            options: vec!["a".into(), "b".into(), "c".into()],
            correct_option: Some(correct),
            points,
            required: true,
        }
    }

    fn free_text(id: i64, position: i32, required: bool) -> Question {
        Question {
            id,
            exam_id: 1,
            section: "Writing".to_string(),
            position,
            kind: QuestionKind::FreeText,
            prompt: format!("q{id}"),
            options: vec![],
            correct_option: None,
            points: 2.0,
            required,
        }
    }

    fn session(started_at: DateTime<Utc>, deadline_at: DateTime<Utc>) -> ExamSubmission {
        ExamSubmission {
            id: 9,
            exam_id: 1,
            student_id: 5,
            status: SessionStatus::InProgress,
            started_at,
            deadline_at,
            submitted_at: None,
            elapsed_seconds: None,
            answers: HashMap::new(),
            warnings: vec![],
            auto_score: None,
            score: None,
            feedback: None,
            recording_token: None,
            graded_by: None,
            graded_at: None,
        }
    }

    fn answers(pairs: &[(i64, &str)]) -> HashMap<i64, String> {
        pairs.iter().map(|(k, v)| (*k, v.to_string())).collect()
    }

    #[test]
    fn test_deadline_is_capped_by_exam_window() {
        let now = Utc::now();
        let mut e = exam(60);
        assert_eq!(deadline_for(&e, now), now + Duration::minutes(60));

        e.available_until = Some(now + Duration::minutes(20));
        assert_eq!(deadline_for(&e, now), now + Duration::minutes(20));
    }

    #[test]
    fn test_grace_period() {
        let deadline = Utc::now();
        assert!(!is_expired(deadline, deadline + Duration::seconds(30), 30));
        assert!(is_expired(deadline, deadline + Duration::seconds(31), 30));
        assert!(!is_expired(deadline, deadline - Duration::seconds(1), 0));
    }

    #[test]
    fn test_elapsed_is_capped_at_deadline() {
        let start = Utc::now();
        let deadline = start + Duration::minutes(10);
        assert_eq!(elapsed_seconds(start, deadline, start + Duration::seconds(95)), 95);
        assert_eq!(elapsed_seconds(start, deadline, deadline + Duration::minutes(5)), 600);
    }

    #[test]
    fn test_remaining_seconds() {
        let start = Utc::now();
        let mut s = session(start, start + Duration::minutes(5));
        assert_eq!(remaining_seconds(&s, start + Duration::seconds(60)), 240);
        assert_eq!(remaining_seconds(&s, start + Duration::minutes(9)), 0);
        s.status = SessionStatus::Submitted;
        assert_eq!(remaining_seconds(&s, start), 0);
    }

    #[test]
    fn test_unanswered_required_ignores_blank_and_optional() {
        let questions = vec![
            choice(1, 1, 0, 1.0),
            free_text(2, 2, true),
            free_text(3, 3, false),
        ];
        let given = answers(&[(1, "0"), (2, "   ")]);
        assert_eq!(unanswered_required(&questions, &given), vec![2]);
        assert_eq!(
            unanswered_required(&questions, &HashMap::new()),
            vec![1, 2]
        );
    }

    #[test]
    fn test_validate_answers() {
        let questions = vec![choice(1, 1, 0, 1.0), free_text(2, 2, true)];
        assert!(validate_answers(&questions, &answers(&[(1, "2"), (2, "Hola")])).is_ok());
        assert!(validate_answers(&questions, &answers(&[(1, "")])).is_ok());
        assert!(validate_answers(&questions, &answers(&[(1, "3")])).is_err());
        assert!(validate_answers(&questions, &answers(&[(1, "b")])).is_err());
        let err = validate_answers(&questions, &answers(&[(99, "x")])).unwrap_err();
        assert!(err.contains("99"));
    }

    #[test]
    fn test_auto_score_scales_to_max_score() {
        // 总分 1 + 3 + 2 = 6，答对 3 分
        let questions = vec![
            choice(1, 1, 0, 1.0),
            choice(2, 2, 2, 3.0),
            free_text(3, 3, true),
        ];
        let given = answers(&[(1, "1"), (2, "2"), (3, "essay")]);
        assert_eq!(auto_score(&questions, &given, 100.0), 50.0);
        assert_eq!(auto_score(&questions, &HashMap::new(), 100.0), 0.0);
        assert_eq!(auto_score(&[], &given, 100.0), 0.0);
    }

    #[test]
    fn test_merge_answers_overrides_draft() {
        let draft = answers(&[(1, "0"), (2, "draft")]);
        let merged = merge_answers(&draft, answers(&[(2, "final")]));
        assert_eq!(merged[&1], "0");
        assert_eq!(merged[&2], "final");
    }

    #[test]
    fn test_finalize_on_time_and_late() {
        let e = exam(10);
        let start = Utc::now();
        let s = session(start, start + Duration::minutes(10));
        let questions = vec![choice(1, 1, 0, 1.0)];

        let on_time = finalize(&s, &e, &questions, answers(&[(1, "0")]), start + Duration::minutes(4), 30);
        assert_eq!(on_time.status, Some(SessionStatus::Submitted));
        assert_eq!(on_time.elapsed_seconds, Some(240));
        assert_eq!(on_time.auto_score, Some(100.0));

        let late = finalize(&s, &e, &questions, HashMap::new(), start + Duration::minutes(11), 30);
        assert_eq!(late.status, Some(SessionStatus::AutoSubmitted));
        assert_eq!(late.submitted_at, Some(s.deadline_at));
        assert_eq!(late.elapsed_seconds, Some(600));
        assert_eq!(late.auto_score, Some(0.0));
    }
}
