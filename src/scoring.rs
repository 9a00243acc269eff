use crate::error::{Error, Result};
use crate::models::quiz::Question;
use serde::Serialize;

/// Grade bands of the independent curriculum, inclusive lower bounds.
const GRADE_BANDS: [(u32, &str, &str); 5] = [
    (90, "A+", "LULUS DENGAN MEMUASKAN"),
    (80, "A", "LULUS DENGAN BAIK"),
    (70, "B", "LULUS CUKUP BAIK"),
    (60, "C", "LULUS"),
    (40, "D", "TIDAK LULUS"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResult {
    pub score: u32,
    pub grade: String,
    pub grade_desc: String,
    pub correct: u32,
    pub total: u32,
}

/// Grade a submission. `answers` holds the selected option index per
/// question position; `None` means unanswered and never matches. Arrays
/// shorter than the question set are treated as unanswered from that point
/// on. A quiz with no questions has no defined score and is rejected.
pub fn calculate(questions: &[Question], answers: &[Option<u32>]) -> Result<ScoreResult> {
    if questions.is_empty() {
        return Err(Error::BadRequest(
            "Quiz has no questions to grade".to_string(),
        ));
    }

    let correct = questions
        .iter()
        .enumerate()
        .filter(|(i, q)| answers.get(*i).copied().flatten() == Some(q.correct_answer))
        .count() as u32;

    let total = questions.len() as u32;
    let score = (correct as f64 / total as f64 * 100.0).round() as u32;
    let (grade, grade_desc) = grade_for(score);

    Ok(ScoreResult {
        score,
        grade: grade.to_string(),
        grade_desc: grade_desc.to_string(),
        correct,
        total,
    })
}

pub fn grade_for(score: u32) -> (&'static str, &'static str) {
    for (floor, grade, desc) in GRADE_BANDS {
        if score >= floor {
            return (grade, desc);
        }
    }
    ("E", "GAGAL")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(correct: u32) -> Question {
        Question {
            question: "q".to_string(),
            options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct_answer: correct,
        }
    }

    #[test]
    fn counts_exact_matches_only() {
        let questions = vec![question(0), question(1), question(2), question(3)];
        let answers = vec![Some(0), Some(2), None, Some(3)];
        let result = calculate(&questions, &answers).unwrap();
        assert_eq!(result.correct, 2);
        assert_eq!(result.total, 4);
        assert_eq!(result.score, 50);
    }

    #[test]
    fn unanswered_never_counts() {
        let questions = vec![question(0), question(0)];
        let result = calculate(&questions, &[None, None]).unwrap();
        assert_eq!(result.correct, 0);
        assert_eq!(result.score, 0);
        assert_eq!(result.grade, "E");
        assert_eq!(result.grade_desc, "GAGAL");
    }

    #[test]
    fn short_answer_array_is_unanswered_tail() {
        let questions = vec![question(1), question(1), question(1)];
        let result = calculate(&questions, &[Some(1)]).unwrap();
        assert_eq!(result.correct, 1);
        assert_eq!(result.score, 33);
    }

    #[test]
    fn perfect_score_is_a_plus() {
        let questions = vec![question(2), question(3)];
        let result = calculate(&questions, &[Some(2), Some(3)]).unwrap();
        assert_eq!(result.score, 100);
        assert_eq!(result.grade, "A+");
        assert_eq!(result.grade_desc, "LULUS DENGAN MEMUASKAN");
    }

    #[test]
    fn rounding_is_standard_ties_up() {
        // 5/8 = 62.5 rounds to 63.
        let questions: Vec<Question> = (0..8).map(|_| question(0)).collect();
        let answers: Vec<Option<u32>> = (0..8).map(|i| (i < 5).then_some(0)).collect();
        let result = calculate(&questions, &answers).unwrap();
        assert_eq!(result.score, 63);

        // 1/3 = 33.33 rounds down to 33, 2/3 = 66.67 rounds up to 67.
        let questions: Vec<Question> = (0..3).map(|_| question(0)).collect();
        let result = calculate(&questions, &[Some(0), None, None]).unwrap();
        assert_eq!(result.score, 33);
        let result = calculate(&questions, &[Some(0), Some(0), None]).unwrap();
        assert_eq!(result.score, 67);
    }

    #[test]
    fn band_boundaries() {
        let cases = [
            (90, "A+"),
            (89, "A"),
            (80, "A"),
            (79, "B"),
            (70, "B"),
            (69, "C"),
            (60, "C"),
            (59, "D"),
            (40, "D"),
            (39, "E"),
            (0, "E"),
        ];
        for (score, expected) in cases {
            assert_eq!(grade_for(score).0, expected, "score {}", score);
        }
    }

    #[test]
    fn empty_quiz_is_an_error() {
        let err = calculate(&[], &[]).unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
    }

    #[test]
    fn deterministic_for_equal_inputs() {
        let questions = vec![question(1), question(2), question(0)];
        let answers = vec![Some(1), Some(1), Some(0)];
        let a = calculate(&questions, &answers).unwrap();
        let b = calculate(&questions, &answers).unwrap();
        assert_eq!(a, b);
    }
}
