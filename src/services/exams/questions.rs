use crate::models::exams::requests::QuestionInput;

const MAX_QUESTIONS: usize = 200;

/// 整份题目校验，错误信息带上题号（从 1 开始）
pub fn validate_questions(questions: &[QuestionInput]) -> Result<(), String> {
    if questions.len() > MAX_QUESTIONS {
        return Err(format!("题目数量不能超过 {MAX_QUESTIONS}"));
    }
    for (idx, question) in questions.iter().enumerate() {
        question
            .validate()
            .map_err(|msg| format!("第 {} 题: {msg}", idx + 1))?;
        if let Some(ref section) = question.section
            && section.chars().count() > 64
        {
            return Err(format!("第 {} 题: 分节名称过长", idx + 1));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::exams::entities::QuestionKind;

    fn free_text(prompt: &str) -> QuestionInput {
        QuestionInput {
            section: None,
            kind: QuestionKind::FreeText,
            prompt: prompt.to_string(),
            options: None,
            correct_option: None,
            points: None,
            required: None,
        }
    }

    #[test]
    fn test_error_names_the_question() {
        let questions = vec![free_text("Introduce yourself"), free_text("")];
        let err = validate_questions(&questions).unwrap_err();
        assert!(err.starts_with("第 2 题"));
    }

    #[test]
    fn test_empty_list_is_valid() {
        assert!(validate_questions(&[]).is_ok());
    }
}
