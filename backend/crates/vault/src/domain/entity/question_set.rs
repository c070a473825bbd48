//! Secret Question Set Entity
//!
//! Gates a recipient's access to one assignment behind answers to personal
//! questions. Only the prompts are readable; the key shares needed to open
//! `recipient_ciphertext` sit inside `timelocked_shares` (and a master-key
//! copy in `sealed_shares` used to re-lock on check-in).

use chrono::{DateTime, Utc};
use kernel::error::app_error::AppError;
use kernel::id::{AssignmentId, QuestionSetId, UserId};

use crate::error::VaultResult;

pub const MAX_QUESTIONS: usize = 10;
const MAX_QUESTION_CHARS: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretQuestion {
    /// 1-based; binds the answer key and the share ciphertext
    pub position: u8,
    pub question: String,
}

#[derive(Debug, Clone)]
pub struct SecretQuestionSet {
    pub id: QuestionSetId,
    pub user_id: UserId,
    pub assignment_id: AssignmentId,
    pub threshold: u8,
    pub questions: Vec<SecretQuestion>,
    pub recipient_ciphertext: Vec<u8>,
    pub sealed_shares: Vec<u8>,
    pub timelock_round: u64,
    pub timelocked_shares: Vec<u8>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SecretQuestionSet {
    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }

    pub fn prompts(&self) -> Vec<String> {
        self.questions.iter().map(|q| q.question.clone()).collect()
    }
}

/// A question and its answer as submitted by the owner
#[derive(Debug, Clone)]
pub struct QuestionAnswer {
    pub question: String,
    pub answer: String,
}

/// `1 <= threshold <= n <= 10`, non-empty questions and answers
pub fn validate_questions(threshold: u8, pairs: &[QuestionAnswer]) -> VaultResult<()> {
    if pairs.is_empty() || pairs.len() > MAX_QUESTIONS {
        return Err(AppError::bad_request("Provide between 1 and 10 questions").into());
    }
    if threshold == 0 || usize::from(threshold) > pairs.len() {
        return Err(AppError::bad_request(format!(
            "Threshold must be between 1 and {}",
            pairs.len()
        ))
        .into());
    }
    for pair in pairs {
        let question = pair.question.trim();
        if question.is_empty() || question.chars().count() > MAX_QUESTION_CHARS {
            return Err(AppError::bad_request("Questions must be 1 to 500 characters").into());
        }
        if pair.answer.trim().is_empty() {
            return Err(AppError::bad_request("Every question needs an answer").into());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(q: &str, a: &str) -> QuestionAnswer {
        QuestionAnswer {
            question: q.to_string(),
            answer: a.to_string(),
        }
    }

    #[test]
    fn test_validate_questions() {
        let pairs = vec![pair("First pet?", "Rex"), pair("Street?", "Elm")];
        assert!(validate_questions(1, &pairs).is_ok());
        assert!(validate_questions(2, &pairs).is_ok());
        assert!(validate_questions(0, &pairs).is_err());
        assert!(validate_questions(3, &pairs).is_err());
        assert!(validate_questions(1, &[]).is_err());
        assert!(validate_questions(1, &[pair("Pet?", "  ")]).is_err());

        let many: Vec<_> = (0..11).map(|i| pair(&format!("Q{i}"), "a")).collect();
        assert!(validate_questions(1, &many).is_err());
    }
}
