//! Challenge questions: payload shape, validation, and the offline fallback bank.
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of answer options every question carries.
pub const OPTION_COUNT: usize = 4;

/// Topic family of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[serde(alias = "Tư duy phản biện")]
    CriticalThinking,
    #[serde(alias = "Đạo đức AI")]
    AiEthics,
    #[serde(alias = "Logic học")]
    Logic,
    #[serde(alias = "Quyền riêng tư")]
    Privacy,
    #[serde(alias = "Tin giả & Deepfakes")]
    Misinformation,
    #[serde(alias = "Phân tích nguồn tin")]
    SourceAnalysis,
    #[serde(alias = "An ninh mạng")]
    Cybersecurity,
}

/// One multiple-choice challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionData {
    pub question: String,
    pub options: Vec<String>,
    pub correct_index: usize,
    pub explanation: String,
    pub category: Category,
}

impl QuestionData {
    /// Parse and validate a provider payload.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::Malformed` for unparseable JSON and a validation error
    /// when the payload parses but breaks the question shape.
    pub fn from_json(json: &str) -> Result<Self, QuestionError> {
        let question: Self =
            serde_json::from_str(json).map_err(|err| QuestionError::Malformed(err.to_string()))?;
        question.validate()?;
        Ok(question)
    }

    /// Check the option count, the answer index and that no text is blank.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule.
    pub fn validate(&self) -> Result<(), QuestionError> {
        if self.question.trim().is_empty() {
            return Err(QuestionError::BlankQuestion);
        }
        if self.options.len() != OPTION_COUNT {
            return Err(QuestionError::OptionCount(self.options.len()));
        }
        if let Some(index) = self.options.iter().position(|opt| opt.trim().is_empty()) {
            return Err(QuestionError::BlankOption(index));
        }
        if self.correct_index >= OPTION_COUNT {
            return Err(QuestionError::AnswerOutOfRange(self.correct_index));
        }
        Ok(())
    }

    #[must_use]
    pub const fn is_correct(&self, choice: usize) -> bool {
        choice == self.correct_index
    }

    #[must_use]
    pub fn correct_option(&self) -> Option<&str> {
        self.options.get(self.correct_index).map(String::as_str)
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QuestionError {
    #[error("question payload malformed: {0}")]
    Malformed(String),
    #[error("question text is blank")]
    BlankQuestion,
    #[error("expected 4 options, got {0}")]
    OptionCount(usize),
    #[error("option {0} is blank")]
    BlankOption(usize),
    #[error("correct index {0} is outside the option list")]
    AnswerOutOfRange(usize),
}

struct OfflineEntry {
    question: &'static str,
    options: [&'static str; OPTION_COUNT],
    correct_index: usize,
    explanation: &'static str,
    category: Category,
}

impl OfflineEntry {
    fn to_question(&self) -> QuestionData {
        QuestionData {
            question: self.question.to_string(),
            options: self.options.iter().map(ToString::to_string).collect(),
            correct_index: self.correct_index,
            explanation: self.explanation.to_string(),
            category: self.category,
        }
    }
}

const OFFLINE_BANK: [OfflineEntry; 10] = [
    OfflineEntry {
        question: "What is an AI 'hallucination'?",
        options: [
            "The AI sees ghosts.",
            "The AI confidently presents false information.",
            "The AI has been infected by a virus.",
            "The AI has genuine emotions.",
        ],
        correct_index: 1,
        explanation: "A hallucination is a fluent, plausible answer that is not supported by facts.",
        category: Category::AiEthics,
    },
    OfflineEntry {
        question: "What is a deepfake?",
        options: [
            "A new kind of computer virus.",
            "Media where AI swaps in a fake face or voice.",
            "A basic photo editor.",
            "A deep-sea robot.",
        ],
        correct_index: 1,
        explanation: "Deepfakes use deep learning to fabricate convincing audio or video.",
        category: Category::Misinformation,
    },
    OfflineEntry {
        question: "What is confirmation bias?",
        options: [
            "Seeking only information that supports what you already believe.",
            "Doubting everything.",
            "Analysing an issue from many angles.",
            "Favouring relatives.",
        ],
        correct_index: 0,
        explanation: "It filters out contrary evidence and weakens critical thinking.",
        category: Category::CriticalThinking,
    },
    OfflineEntry {
        question: "\"Everyone uses it, so it must be good.\" Which fallacy is this?",
        options: [
            "Straw man.",
            "Appeal to popularity.",
            "Slippery slope.",
            "Ad hominem.",
        ],
        correct_index: 1,
        explanation: "Popularity does not establish truth or quality.",
        category: Category::Logic,
    },
    OfflineEntry {
        question: "If all A are B and some B are C, what follows?",
        options: [
            "All A are C.",
            "Some A are C.",
            "Nothing certain about A and C.",
            "No A are C.",
        ],
        correct_index: 2,
        explanation: "The C members of B need not overlap with A.",
        category: Category::Logic,
    },
    OfflineEntry {
        question: "Which attack dismisses an argument by insulting the person making it?",
        options: ["Ad hominem.", "Red herring.", "False dilemma.", "Circular reasoning."],
        correct_index: 0,
        explanation: "Attacking the speaker says nothing about the argument itself.",
        category: Category::Logic,
    },
    OfflineEntry {
        question: "Which habit best protects your personal data online?",
        options: [
            "Reusing one strong password everywhere.",
            "Sharing your location publicly.",
            "Reviewing app permissions and enabling two-factor authentication.",
            "Accepting every cookie banner.",
        ],
        correct_index: 2,
        explanation: "Least-privilege permissions and 2FA reduce exposure.",
        category: Category::Privacy,
    },
    OfflineEntry {
        question: "What should you check first about a surprising news story?",
        options: [
            "How many likes it has.",
            "Whether reputable independent sources report it.",
            "Whether it matches your opinion.",
            "How dramatic the headline is.",
        ],
        correct_index: 1,
        explanation: "Independent corroboration is the quickest credibility test.",
        category: Category::SourceAnalysis,
    },
    OfflineEntry {
        question: "Why can an AI hiring tool be biased?",
        options: [
            "Computers dislike people.",
            "It learned from historically biased data.",
            "It runs too fast.",
            "It has too little memory.",
        ],
        correct_index: 1,
        explanation: "Models reproduce patterns, including unfair ones, from training data.",
        category: Category::AiEthics,
    },
    OfflineEntry {
        question: "An email urges you to 'verify your account now' via a link. What is it likely?",
        options: [
            "A routine security update.",
            "A phishing attempt.",
            "A prize notification.",
            "A newsletter.",
        ],
        correct_index: 1,
        explanation: "Urgency plus a credential link is the classic phishing pattern.",
        category: Category::Cybersecurity,
    },
];

/// Size of the built-in offline pool.
#[must_use]
pub const fn offline_len() -> usize {
    OFFLINE_BANK.len()
}

/// Offline question at `index`, if any.
#[must_use]
pub fn offline_question(index: usize) -> Option<QuestionData> {
    OFFLINE_BANK.get(index).map(OfflineEntry::to_question)
}

/// Uniformly random offline question.
pub fn random_offline<R: Rng + ?Sized>(rng: &mut R) -> QuestionData {
    OFFLINE_BANK[rng.gen_range(0..OFFLINE_BANK.len())].to_question()
}
