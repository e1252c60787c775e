use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use quiz_progress::{
    AppError, AppResult, Filter, HttpResponse, HttpTransport, QuestionState, QuizApiClient,
    QuizSession, StartupOptions, SubmitOutcome,
};
use serde_json::{json, Value};
use tokio_test::assert_ok;

/// 内存中的题库服务：题目固定，状态文档随 POST 更新
#[derive(Default)]
struct InMemoryBackend {
    state: Mutex<Option<Value>>,
    saves: Mutex<usize>,
}

impl InMemoryBackend {
    fn questions(query: &str) -> Value {
        let all = vec![
            json!({"id": "math/algebra/linear.json:0", "content": "2x = 4, x = ?",
                   "options": [{"id": "A", "content": "1"}, {"id": "B", "content": "2"}],
                   "correct_options": ["B"]}),
            json!({"id": "math/algebra/linear.json:1", "content": "Solve: x + 1 = 1", "answer": "0"}),
            json!({"id": "math/geometry/circles.json:0", "content": "Area of unit circle?", "answer": "pi"}),
        ];
        let selected: Vec<Value> = all
            .into_iter()
            .filter(|q| {
                let id = q["id"].as_str().unwrap_or_default();
                !query.contains("division=algebra") || id.contains("/algebra/")
            })
            .collect();
        json!({"status": "success", "questions": selected, "total": selected.len()})
    }

    fn saves(&self) -> usize {
        *self.saves.lock().unwrap()
    }
}

#[async_trait]
impl HttpTransport for InMemoryBackend {
    async fn get(&self, path: &str) -> AppResult<HttpResponse> {
        let (route, query) = path.split_once('?').unwrap_or((path, ""));
        let body = match route {
            "/api/subjects" => json!({"status": "success", "subjects": ["math"]}),
            "/api/subjects/math/divisions" => {
                json!({"status": "success", "subject": "math", "divisions": ["algebra", "geometry"]})
            }
            "/api/subjects/math/algebra/chapters" => {
                json!({"status": "success", "chapters": ["linear.json"]})
            }
            "/api/questions" => Self::questions(query),
            "/quiz-state.json" => match self.state.lock().unwrap().clone() {
                Some(state) => state,
                None => {
                    return Ok(HttpResponse::json(
                        404,
                        &json!({"status": "error", "message": "State file not found"}),
                    ))
                }
            },
            _ => return Err(AppError::Other(format!("unexpected path {}", path))),
        };
        Ok(HttpResponse::json(200, &body))
    }

    async fn post_json(&self, path: &str, body: &Value) -> AppResult<HttpResponse> {
        assert_eq!(path, "/api/state");
        *self.state.lock().unwrap() = Some(body.clone());
        *self.saves.lock().unwrap() += 1;
        Ok(HttpResponse::json(
            200,
            &json!({"status": "success", "message": "State merged and saved"}),
        ))
    }
}

#[tokio::test]
async fn test_progress_survives_a_new_session() {
    let backend = Arc::new(InMemoryBackend::default());
    let options = StartupOptions::from_url("/math/algebra/linear");

    let mut first = QuizSession::new(QuizApiClient::new(backend.clone()), options.clone());
    let progress = first.start().await;
    assert_eq!(progress.total, 2);
    assert_eq!(progress.attempted, 0);

    assert!(first.select_option("B"));
    assert_eq!(
        first.submit(),
        SubmitOutcome::Answered {
            correct: true,
            show_explanation: true
        }
    );
    first.next_question();
    assert_eq!(first.toggle_review_current(), Some(true));
    first.flush().await;
    assert!(backend.saves() >= 2);

    let mut second = QuizSession::new(QuizApiClient::new(backend.clone()), options);
    let restored = second.start().await;
    assert_eq!(restored.attempted, 1);
    assert_eq!(restored.correct, 1);
    assert_eq!(restored.percentage, 50.0);
    assert_eq!(second.current_index(), 1);
    assert!(second.is_current_marked());

    second.previous_question();
    assert_eq!(
        second.current_state(),
        &QuestionState::Answered {
            selection: "B".into(),
            correct: true
        }
    );
}

#[tokio::test]
async fn test_export_then_import_into_fresh_session() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("export.json");
    let backend = Arc::new(InMemoryBackend::default());

    let mut session = QuizSession::new(QuizApiClient::new(backend.clone()), StartupOptions::default());
    session.start().await;
    session.jump_to(2);
    session.enter_text("  PI ");
    assert!(matches!(
        session.submit(),
        SubmitOutcome::Answered { correct: true, .. }
    ));
    assert_ok!(session.export_progress(&path).await);

    let contents = std::fs::read_to_string(&path).unwrap();
    let exported: Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(
        exported["attemptedQuestions"]["math/geometry/circles.json:0"]["selectedOption"],
        json!("  PI ")
    );

    let fresh_backend = Arc::new(InMemoryBackend::default());
    let mut fresh = QuizSession::new(QuizApiClient::new(fresh_backend), StartupOptions::default());
    fresh.start().await;
    assert_eq!(fresh.progress().attempted, 0);
    assert!(fresh.import_progress(&contents));
    assert_eq!(fresh.progress().attempted, 1);
    assert!(fresh.store().is_attempted("math/geometry/circles.json:0"));
}

#[tokio::test]
async fn test_cascading_filter_selection() {
    let backend = Arc::new(InMemoryBackend::default());
    let mut session = QuizSession::new(QuizApiClient::new(backend), StartupOptions::default());
    session.start().await;
    assert_eq!(session.questions().len(), 3);

    let filters = session.filters_mut();
    filters.select_subject(Some("math".into())).await;
    filters.select_division(Some("algebra".into())).await;
    filters.select_chapter(Some("linear.json".into()));

    let progress = session.apply_selected_filter().await;
    assert_eq!(progress.total, 2);
    assert_eq!(
        session.store().snapshot().current_filter,
        Filter::new(
            Some("math".into()),
            Some("algebra".into()),
            Some("linear.json".into())
        )
    );
}
