//! Readiness quizzes: fixed questions, each answered 0..=max, scored once
//! every question has an answer.

use serde::{Deserialize, Serialize};
use vitrine_api_core::parse_int;

use crate::calculator::round_half_up;

/// Recommendation shown for scores at or above `min_score`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Band {
    pub min_score: u32,
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizCfg {
    pub name: String,
    /// Radio group names, one per question.
    pub questions: Vec<String>,
    #[serde(default = "default_max_answer")]
    pub max_answer: u32,
    /// Receives `"NN%"`.
    pub score: String,
    pub recommendation: String,
    /// Shown (`display: block`) once a score exists.
    #[serde(default)]
    pub results: Option<String>,
    /// Checked in order; the first band the score reaches wins.
    pub bands: Vec<Band>,
    /// Used below every band.
    pub fallback: String,
}

fn default_max_answer() -> u32 {
    3
}

fn band(min_score: u32, text: &str) -> Band {
    Band {
        min_score,
        text: text.to_string(),
    }
}

impl QuizCfg {
    pub fn partnership() -> Self {
        Self {
            name: "partnership".into(),
            questions: [
                "partnerValue",
                "resourceCommitment",
                "partnerProgram",
                "revenueTracking",
                "teamBandwidth",
            ]
            .map(String::from)
            .to_vec(),
            max_answer: 3,
            score: "#partnershipScore".into(),
            recommendation: "#partnershipRecommendation".into(),
            results: Some(".quiz-results".into()),
            bands: vec![
                band(80, "Excellent! You're ready to launch a strategic partnership program. Let's build your partner ecosystem."),
                band(60, "Good foundation. With some optimization, you can build a successful partnership program."),
            ],
            fallback: "Focus on strengthening your core business first. We can help you prepare for partnerships.".into(),
        }
    }

    pub fn ai_maturity() -> Self {
        Self {
            name: "ai_maturity".into(),
            questions: [
                "dataQuality",
                "processDocumentation",
                "teamSkills",
                "technologyStack",
                "changeManagement",
            ]
            .map(String::from)
            .to_vec(),
            max_answer: 3,
            score: "#aiMaturityScore".into(),
            recommendation: "#aiRecommendation".into(),
            results: None,
            bands: vec![
                band(80, "Excellent AI readiness! You're prepared for advanced AI implementation across multiple use cases."),
                band(60, "Good foundation. Start with targeted AI pilots in your strongest areas."),
            ],
            fallback: "Focus on data infrastructure and process documentation before AI implementation.".into(),
        }
    }

    pub fn recommendation_for(&self, score: u32) -> &str {
        self.bands
            .iter()
            .find(|b| score >= b.min_score)
            .map(|b| b.text.as_str())
            .unwrap_or(self.fallback.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizResult {
    /// Percent, 0..=100.
    pub score: u32,
    pub recommendation: String,
}

#[derive(Debug)]
pub struct Quiz {
    cfg: QuizCfg,
    answers: Vec<Option<u32>>,
}

impl Quiz {
    pub fn new(cfg: QuizCfg) -> Self {
        Self {
            answers: vec![None; cfg.questions.len()],
            cfg,
        }
    }

    pub fn cfg(&self) -> &QuizCfg {
        &self.cfg
    }

    pub fn answered(&self) -> usize {
        self.answers.iter().flatten().count()
    }

    /// Record the raw radio value for `question`. Unparseable values count
    /// as 0 and values above `max_answer` are clamped. Returns the result
    /// once every question is answered.
    pub fn answer(&mut self, question: &str, raw: &str) -> Option<QuizResult> {
        let Some(i) = self.cfg.questions.iter().position(|q| q == question) else {
            log::debug!("quiz {}: unknown question {question}", self.cfg.name);
            return None;
        };
        let value = parse_int(raw).unwrap_or(0).clamp(0, self.cfg.max_answer as i64) as u32;
        self.answers[i] = Some(value);
        self.result()
    }

    pub fn result(&self) -> Option<QuizResult> {
        let total: u32 = self
            .answers
            .iter()
            .copied()
            .collect::<Option<Vec<u32>>>()?
            .into_iter()
            .sum();
        let possible = self.cfg.questions.len() as f64 * self.cfg.max_answer as f64;
        if possible <= 0.0 {
            return None;
        }
        let score = round_half_up(total as f64 / possible * 100.0) as u32;
        Some(QuizResult {
            score,
            recommendation: self.cfg.recommendation_for(score).to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_score_until_every_question_is_answered() {
        let mut quiz = Quiz::new(QuizCfg::partnership());
        for q in ["partnerValue", "resourceCommitment", "partnerProgram", "revenueTracking"] {
            assert!(quiz.answer(q, "3").is_none());
        }
        let result = quiz.answer("teamBandwidth", "3").expect("complete");
        assert_eq!(result.score, 100);
        assert!(result.recommendation.starts_with("Excellent!"));
    }

    #[test]
    fn bands_follow_the_score() {
        let mut quiz = Quiz::new(QuizCfg::ai_maturity());
        let names = quiz.cfg().questions.clone();
        // 9 / 15 -> 60
        for (q, v) in names.iter().zip(["3", "3", "1", "1", "1"]) {
            quiz.answer(q, v);
        }
        let result = quiz.result().expect("complete");
        assert_eq!(result.score, 60);
        assert!(result.recommendation.starts_with("Good foundation"));

        // 7 / 15 -> 46.67 -> 47
        quiz.answer("dataQuality", "1");
        let result = quiz.result().expect("complete");
        assert_eq!(result.score, 47);
        assert!(result.recommendation.starts_with("Focus on data"));
    }

    #[test]
    fn odd_values_are_clamped() {
        let mut quiz = Quiz::new(QuizCfg::partnership());
        let names = quiz.cfg().questions.clone();
        for q in &names {
            quiz.answer(q, "9");
        }
        quiz.answer(&names[0], "x");
        assert_eq!(quiz.result().map(|r| r.score), Some(80));
        assert!(quiz.answer("nope", "1").is_none());
        assert_eq!(quiz.answered(), 5);
    }
}
