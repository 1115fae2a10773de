//! Test and quiz scoring.
//!
//! Scores are whole percentages rounded half-up, matching what learners see
//! on the results screen.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

/// Bucket used for questions without a topic.
pub const GENERAL_TOPIC: &str = "general";

/// Largest test accepted in a single submission.
pub const MAX_TEST_QUESTIONS: usize = 500;

/// A question as needed for scoring: which option is right and which topic
/// it exercises.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScoredQuestion {
    pub correct_option: i32,
    #[serde(default)]
    pub topic_id: Option<DbId>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicPerformance {
    pub correct: u32,
    pub total: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestScore {
    pub correct: u32,
    pub total: u32,
    /// Whole percent, 0..=100.
    pub score: i32,
    /// Keyed by topic id, or [`GENERAL_TOPIC`].
    pub topic_performance: BTreeMap<String, TopicPerformance>,
}

/// `round(part / whole * 100)` with half-up rounding; `0` when `whole == 0`.
pub fn percent(part: u32, whole: u32) -> i32 {
    if whole == 0 {
        return 0;
    }
    let rounded = (u64::from(part) * 100 + u64::from(whole) / 2) / u64::from(whole);
    i32::try_from(rounded).unwrap_or(i32::MAX)
}

/// Score `answers` (by position) against `questions`.
///
/// Missing or `None` answers count as wrong. Extra answers are rejected.
pub fn score_answers(
    questions: &[ScoredQuestion],
    answers: &[Option<i32>],
) -> Result<TestScore, CoreError> {
    if questions.is_empty() {
        return Err(CoreError::Validation("A test needs at least one question".into()));
    }
    if questions.len() > MAX_TEST_QUESTIONS {
        return Err(CoreError::Validation(format!(
            "A test may have at most {MAX_TEST_QUESTIONS} questions"
        )));
    }
    if answers.len() > questions.len() {
        return Err(CoreError::Validation(format!(
            "Got {} answers for {} questions",
            answers.len(),
            questions.len()
        )));
    }

    let mut correct = 0u32;
    let mut topic_performance: BTreeMap<String, TopicPerformance> = BTreeMap::new();

    for (i, question) in questions.iter().enumerate() {
        let is_correct = answers.get(i).copied().flatten() == Some(question.correct_option);
        let key = question
            .topic_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| GENERAL_TOPIC.to_string());
        let entry = topic_performance.entry(key).or_default();
        entry.total += 1;
        if is_correct {
            entry.correct += 1;
            correct += 1;
        }
    }

    let total = questions.len() as u32;
    Ok(TestScore {
        correct,
        total,
        score: percent(correct, total),
        topic_performance,
    })
}

/// Rounded mean given the sum and count of whole-percent scores; `0` when
/// there are none.
pub fn average_score(sum: i64, count: i64) -> i32 {
    if count <= 0 {
        return 0;
    }
    i32::try_from((sum * 2 + count) / (2 * count)).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(correct_option: i32, topic_id: Option<DbId>) -> ScoredQuestion {
        ScoredQuestion {
            correct_option,
            topic_id,
        }
    }

    #[test]
    fn percent_rounds_half_up() {
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(1, 8), 13);
        assert_eq!(percent(0, 0), 0);
        assert_eq!(percent(4, 4), 100);
    }

    #[test]
    fn scores_by_position_and_topic() {
        let questions = [q(0, Some(7)), q(2, Some(7)), q(1, None), q(3, Some(9))];
        let answers = [Some(0), Some(1), Some(1), None];

        let score = score_answers(&questions, &answers).unwrap();
        assert_eq!(score.correct, 2);
        assert_eq!(score.total, 4);
        assert_eq!(score.score, 50);
        assert_eq!(score.topic_performance["7"], TopicPerformance { correct: 1, total: 2 });
        assert_eq!(score.topic_performance[GENERAL_TOPIC], TopicPerformance { correct: 1, total: 1 });
        assert_eq!(score.topic_performance["9"], TopicPerformance { correct: 0, total: 1 });
    }

    #[test]
    fn short_answer_list_counts_missing_as_wrong() {
        let questions = [q(1, None), q(1, None)];
        let score = score_answers(&questions, &[Some(1)]).unwrap();
        assert_eq!(score.correct, 1);
        assert_eq!(score.score, 50);
    }

    #[test]
    fn perfect_score_is_100() {
        let questions = [q(1, None), q(2, None), q(3, None)];
        let score = score_answers(&questions, &[Some(1), Some(2), Some(3)]).unwrap();
        assert_eq!(score.score, 100);
    }

    #[test]
    fn rejects_empty_and_oversized_answers() {
        assert!(score_answers(&[], &[]).is_err());
        assert!(score_answers(&[q(0, None)], &[Some(0), Some(1)]).is_err());
    }

    #[test]
    fn average_rounds() {
        assert_eq!(average_score(0, 0), 0);
        assert_eq!(average_score(170, 2), 85);
        assert_eq!(average_score(101, 2), 51);
        assert_eq!(average_score(100, 3), 33);
    }
}
