//! Adaptive mini-test session.
//!
//! A session walks a learner through a bank of questions tagged
//! easy/medium/hard. A correct answer promotes the active tier, a wrong one
//! demotes it. Each question is asked at most once, so every session ends
//! after at most `bank.len()` answers.
//!
//! ```text
//!            select_option                advance
//! Awaiting ----------------> ShowingResult -------> Awaiting (same or higher tier)
//!                                          \------> Complete (no tier left)
//! NoQuestions: the starting tier has no questions (terminal, restart only)
//! ```

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Difficulty
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Self::Easy, Self::Medium, Self::Hard];

    /// One tier up; `Hard` stays `Hard`.
    pub fn promote(self) -> Self {
        match self {
            Self::Easy => Self::Medium,
            Self::Medium | Self::Hard => Self::Hard,
        }
    }

    /// One tier down; `Easy` stays `Easy`.
    pub fn demote(self) -> Self {
        match self {
            Self::Hard => Self::Medium,
            Self::Medium | Self::Easy => Self::Easy,
        }
    }

    /// The tier above this one, `None` for `Hard`.
    pub fn next_tier(self) -> Option<Self> {
        match self {
            Self::Easy => Some(Self::Medium),
            Self::Medium => Some(Self::Hard),
            Self::Hard => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

// ---------------------------------------------------------------------------
// Question bank
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    /// Option key, e.g. `"A"`.
    pub key: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MiniTestQuestion {
    pub id: String,
    pub difficulty: Difficulty,
    pub prompt: String,
    pub options: Vec<QuestionOption>,
    /// Key of the correct option.
    pub correct: String,
    #[serde(default)]
    pub explanation: Option<String>,
}

impl MiniTestQuestion {
    fn has_option(&self, key: &str) -> bool {
        self.options.iter().any(|o| o.key == key)
    }

    fn validate(&self) -> Result<(), CoreError> {
        if self.options.len() < 2 {
            return Err(CoreError::Validation(format!(
                "Question '{}' needs at least two options",
                self.id
            )));
        }
        for (i, option) in self.options.iter().enumerate() {
            if self.options[..i].iter().any(|o| o.key == option.key) {
                return Err(CoreError::Validation(format!(
                    "Question '{}' has duplicate option key '{}'",
                    self.id, option.key
                )));
            }
        }
        if !self.has_option(&self.correct) {
            return Err(CoreError::Validation(format!(
                "Question '{}' marks '{}' as correct but has no such option",
                self.id, self.correct
            )));
        }
        Ok(())
    }
}

/// Largest bank a single session accepts.
pub const MAX_BANK_SIZE: usize = 200;

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionPhase {
    AwaitingAnswer,
    ShowingResult { selected: String, correct: bool },
    Complete,
    NoQuestions { difficulty: Difficulty },
}

/// Result of answering the current question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerOutcome {
    pub correct: bool,
    pub correct_option: String,
    pub explanation: Option<String>,
    /// Tier after the promotion/demotion.
    pub difficulty: Difficulty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvanceOutcome {
    NextQuestion,
    Complete,
}

#[derive(Debug, Clone)]
pub struct AdaptiveSession {
    bank: Vec<MiniTestQuestion>,
    asked: Vec<bool>,
    difficulty: Difficulty,
    /// Bank index of the question being asked or shown.
    current: Option<usize>,
    score: u32,
    answered: u32,
    phase: SessionPhase,
}

impl AdaptiveSession {
    /// Start a session on the easy tier.
    ///
    /// The bank must be non-empty and every question well-formed. An empty
    /// easy tier is not an error; the session starts in
    /// [`SessionPhase::NoQuestions`].
    pub fn new(bank: Vec<MiniTestQuestion>) -> Result<Self, CoreError> {
        if bank.is_empty() {
            return Err(CoreError::Validation(
                "Mini-test question bank is empty".into(),
            ));
        }
        if bank.len() > MAX_BANK_SIZE {
            return Err(CoreError::Validation(format!(
                "Mini-test question bank exceeds {MAX_BANK_SIZE} questions"
            )));
        }
        for question in &bank {
            question.validate()?;
        }

        let mut session = Self {
            asked: vec![false; bank.len()],
            bank,
            difficulty: Difficulty::Easy,
            current: None,
            score: 0,
            answered: 0,
            phase: SessionPhase::AwaitingAnswer,
        };
        session.restart();
        Ok(session)
    }

    /// Reset to the initial state: easy tier, nothing answered.
    pub fn restart(&mut self) {
        self.asked.iter_mut().for_each(|a| *a = false);
        self.difficulty = Difficulty::Easy;
        self.score = 0;
        self.answered = 0;
        self.current = self.first_unasked(Difficulty::Easy);
        self.phase = match self.current {
            Some(_) => SessionPhase::AwaitingAnswer,
            None => SessionPhase::NoQuestions {
                difficulty: Difficulty::Easy,
            },
        };
    }

    /// Answer the current question with option `key`.
    pub fn select_option(&mut self, key: &str) -> Result<AnswerOutcome, CoreError> {
        if self.phase != SessionPhase::AwaitingAnswer {
            return Err(CoreError::InvalidState(format!(
                "Cannot answer while session is {}",
                self.phase_name()
            )));
        }
        let current = self
            .current
            .ok_or_else(|| CoreError::Internal("Awaiting answer without a question".into()))?;
        let question = &self.bank[current];
        if !question.has_option(key) {
            return Err(CoreError::Validation(format!(
                "Question '{}' has no option '{key}'",
                question.id
            )));
        }

        let correct = question.correct == key;
        let outcome_explanation = question.explanation.clone();
        let correct_option = question.correct.clone();

        self.asked[current] = true;
        self.answered += 1;
        if correct {
            self.score += 1;
            self.difficulty = self.difficulty.promote();
        } else {
            self.difficulty = self.difficulty.demote();
        }
        self.phase = SessionPhase::ShowingResult {
            selected: key.to_string(),
            correct,
        };

        Ok(AnswerOutcome {
            correct,
            correct_option,
            explanation: outcome_explanation,
            difficulty: self.difficulty,
        })
    }

    /// Move on from a shown result.
    ///
    /// Stays on the (possibly adjusted) tier while it has unasked questions,
    /// otherwise climbs to the next tier that still has some. Completes when
    /// no tier above is left.
    pub fn advance(&mut self) -> Result<AdvanceOutcome, CoreError> {
        if !matches!(self.phase, SessionPhase::ShowingResult { .. }) {
            return Err(CoreError::InvalidState(format!(
                "Cannot advance while session is {}",
                self.phase_name()
            )));
        }

        let mut tier = self.difficulty;
        loop {
            if let Some(next) = self.first_unasked(tier) {
                self.difficulty = tier;
                self.current = Some(next);
                self.phase = SessionPhase::AwaitingAnswer;
                return Ok(AdvanceOutcome::NextQuestion);
            }
            match tier.next_tier() {
                Some(up) => tier = up,
                None => {
                    self.current = None;
                    self.phase = SessionPhase::Complete;
                    return Ok(AdvanceOutcome::Complete);
                }
            }
        }
    }

    fn first_unasked(&self, tier: Difficulty) -> Option<usize> {
        self.bank
            .iter()
            .enumerate()
            .find(|(i, q)| q.difficulty == tier && !self.asked[*i])
            .map(|(i, _)| i)
    }

    fn phase_name(&self) -> &'static str {
        match self.phase {
            SessionPhase::AwaitingAnswer => "awaiting an answer",
            SessionPhase::ShowingResult { .. } => "showing a result",
            SessionPhase::Complete => "complete",
            SessionPhase::NoQuestions { .. } => "out of questions",
        }
    }

    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn answered(&self) -> u32 {
        self.answered
    }

    pub fn bank_size(&self) -> usize {
        self.bank.len()
    }

    /// Position of the current question within its tier's subset.
    pub fn tier_index(&self) -> Option<usize> {
        let current = self.current?;
        let tier = self.bank[current].difficulty;
        Some(
            self.bank[..current]
                .iter()
                .filter(|q| q.difficulty == tier)
                .count(),
        )
    }

    pub fn current_question(&self) -> Option<&MiniTestQuestion> {
        match self.phase {
            SessionPhase::AwaitingAnswer | SessionPhase::ShowingResult { .. } => {
                self.current.map(|i| &self.bank[i])
            }
            SessionPhase::Complete | SessionPhase::NoQuestions { .. } => None,
        }
    }

    /// `round(score / answered * 100)`, `None` before the first answer.
    pub fn percent(&self) -> Option<u32> {
        (self.answered > 0).then(|| (self.score * 100 + self.answered / 2) / self.answered)
    }

    /// Client-facing snapshot. The correct option is only revealed once the
    /// current question has been answered.
    pub fn view(&self) -> SessionView {
        let reveal = matches!(self.phase, SessionPhase::ShowingResult { .. });
        SessionView {
            phase: self.phase.clone(),
            difficulty: self.difficulty,
            question_number: self.answered + u32::from(!reveal),
            tier_index: self.current_question().and(self.tier_index()),
            score: self.score,
            answered: self.answered,
            total_questions: self.bank.len(),
            percent: self.percent(),
            question: self.current_question().map(|q| QuestionView {
                id: q.id.clone(),
                difficulty: q.difficulty,
                prompt: q.prompt.clone(),
                options: q.options.clone(),
                correct: reveal.then(|| q.correct.clone()),
                explanation: if reveal { q.explanation.clone() } else { None },
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionView {
    pub id: String,
    pub difficulty: Difficulty,
    pub prompt: String,
    pub options: Vec<QuestionOption>,
    pub correct: Option<String>,
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionView {
    pub phase: SessionPhase,
    pub difficulty: Difficulty,
    /// 1-based number of the question on screen.
    pub question_number: u32,
    pub tier_index: Option<usize>,
    pub score: u32,
    pub answered: u32,
    pub total_questions: usize,
    pub percent: Option<u32>,
    pub question: Option<QuestionView>,
}
