use crate::error::Result;
use crate::models::quiz::Quiz;
use crate::store::{modify_collection, read_collection, MutateOutcome, SharedStore, QUIZZES_KEY};

/// Record store for the quiz collection. The whole collection lives under
/// one key; every mutation is a read-modify-write cycle with a conditional
/// write (see `store::modify_collection`).
#[derive(Clone)]
pub struct QuizService {
    store: SharedStore,
}

impl QuizService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn get_all(&self) -> Result<Vec<Quiz>> {
        let (quizzes, _) = read_collection::<Vec<Quiz>>(self.store.as_ref(), QUIZZES_KEY).await?;
        Ok(quizzes)
    }

    /// Exact, case-sensitive lesson-name lookup.
    pub async fn get_by_lesson(&self, lesson_name: &str) -> Result<Option<Quiz>> {
        let quizzes = self.get_all().await?;
        Ok(quizzes.into_iter().find(|q| q.lesson_name == lesson_name))
    }

    /// Replace the quiz with the same lesson name in place, or append when
    /// absent. Upsert always succeeds logically; only storage I/O fails.
    pub async fn upsert(&self, quiz: Quiz) -> Result<()> {
        modify_collection::<Vec<Quiz>, _, _>(self.store.as_ref(), QUIZZES_KEY, |quizzes| {
            match quizzes
                .iter_mut()
                .find(|q| q.lesson_name == quiz.lesson_name)
            {
                Some(existing) => *existing = quiz.clone(),
                None => quizzes.push(quiz.clone()),
            }
            Ok(MutateOutcome::Commit(()))
        })
        .await
    }

    /// Remove every quiz with the given lesson name (none-or-one under the
    /// uniqueness invariant). Returns whether anything was removed.
    pub async fn delete_by_lesson(&self, lesson_name: &str) -> Result<bool> {
        modify_collection::<Vec<Quiz>, _, _>(self.store.as_ref(), QUIZZES_KEY, |quizzes| {
            let before = quizzes.len();
            quizzes.retain(|q| q.lesson_name != lesson_name);
            if quizzes.len() == before {
                Ok(MutateOutcome::Unchanged(false))
            } else {
                Ok(MutateOutcome::Commit(true))
            }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::quiz::{LessonData, Question};
    use crate::store::MemoryCollectionStore;
    use std::sync::Arc;

    fn quiz(lesson: &str, timer: u32) -> Quiz {
        Quiz {
            lesson_name: lesson.to_string(),
            lesson_data: LessonData::default(),
            timer_minutes: timer,
            start_date: None,
            end_date: None,
            is_active: true,
            questions: vec![Question {
                question: "q".into(),
                options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
                correct_answer: 0,
            }],
            target_companies: None,
            updated_at: None,
        }
    }

    fn service() -> QuizService {
        QuizService::new(Arc::new(MemoryCollectionStore::new()))
    }

    #[tokio::test]
    async fn upsert_is_idempotent_on_lesson_name() {
        let svc = service();
        svc.upsert(quiz("Safety101", 30)).await.unwrap();
        svc.upsert(quiz("Safety101", 30)).await.unwrap();

        let all = svc.get_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].lesson_name, "Safety101");
    }

    #[tokio::test]
    async fn upsert_replaces_in_place_preserving_position() {
        let svc = service();
        svc.upsert(quiz("A", 10)).await.unwrap();
        svc.upsert(quiz("B", 20)).await.unwrap();
        svc.upsert(quiz("A", 45)).await.unwrap();

        let all = svc.get_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].lesson_name, "A");
        assert_eq!(all[0].timer_minutes, 45);
        assert_eq!(all[1].lesson_name, "B");
    }

    #[tokio::test]
    async fn lookup_is_case_sensitive() {
        let svc = service();
        svc.upsert(quiz("Safety101", 30)).await.unwrap();
        assert!(svc.get_by_lesson("Safety101").await.unwrap().is_some());
        assert!(svc.get_by_lesson("safety101").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_filters_by_lesson_name() {
        let svc = service();
        svc.upsert(quiz("A", 10)).await.unwrap();
        svc.upsert(quiz("B", 20)).await.unwrap();

        assert!(svc.delete_by_lesson("A").await.unwrap());
        assert!(!svc.delete_by_lesson("A").await.unwrap());

        let all = svc.get_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].lesson_name, "B");
    }
}
