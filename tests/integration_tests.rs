//! Integration tests for the conversation flow.
//!
//! These drive the use cases through the public API with offline gateways.

use std::sync::Arc;

use gemchat::{
    Container, InMemorySessionStore, MockGateway, Role, SessionStore, SubmitPromptUseCase, Turn,
    TurnOutcome, ViewTranscriptUseCase,
};

fn setup(gateway: MockGateway) -> (Arc<InMemorySessionStore>, SubmitPromptUseCase) {
    let store = Arc::new(InMemorySessionStore::new());
    let use_case = SubmitPromptUseCase::new(store.clone(), Arc::new(gateway));
    (store, use_case)
}

#[tokio::test]
async fn test_hi_ok_exchange_produces_exact_transcript() {
    let (store, use_case) = setup(MockGateway::fixed("OK"));

    use_case.execute("Hi").await.expect("turn should succeed");

    assert_eq!(
        store.all().await,
        vec![Turn::user("Hi"), Turn::assistant("OK")]
    );
}

#[tokio::test]
async fn test_successful_turns_double_transcript_length() {
    let (store, use_case) = setup(MockGateway::echo());

    for (n, prompt) in ["uno", "dos", "tres", "cuatro", "cinco"].iter().enumerate() {
        use_case.execute(prompt).await.expect("turn should succeed");
        assert_eq!(store.len().await, 2 * (n + 1));
    }

    let turns = store.all().await;
    for pair in turns.chunks(2) {
        assert_eq!(pair[0].role(), Role::User);
        assert_eq!(pair[1].role(), Role::Assistant);
        assert_eq!(pair[0].content(), pair[1].content());
    }
}

#[tokio::test]
async fn test_failing_gateway_leaves_single_user_turn() {
    let (store, use_case) = setup(MockGateway::failing("service unavailable"));

    let outcome = use_case.execute("Hi").await.expect("failure is an outcome, not an error");

    match outcome {
        TurnOutcome::Failed(e) => assert!(e.to_string().contains("service unavailable")),
        other => panic!("expected failure, got {:?}", other),
    }
    assert_eq!(store.all().await, vec![Turn::user("Hi")]);
}

#[tokio::test]
async fn test_appends_never_rewrite_history() {
    let (store, use_case) = setup(MockGateway::echo());
    let mut seen: Vec<Turn> = Vec::new();

    for prompt in ["a", "b", "c"] {
        use_case.execute(prompt).await.unwrap();
        let now = store.all().await;
        assert!(now.starts_with(&seen), "prior turns must be unchanged");
        seen = now;
    }
}

#[tokio::test]
async fn test_gateway_only_receives_current_prompt() {
    let gateway = Arc::new(MockGateway::echo());
    let store = Arc::new(InMemorySessionStore::new());
    let use_case = SubmitPromptUseCase::new(store.clone(), gateway.clone());

    use_case.execute("first").await.unwrap();
    let outcome = use_case.execute("second").await.unwrap();

    assert_eq!(outcome.reply().map(Turn::content), Some("second"));
    assert_eq!(gateway.call_count(), 2);
}

#[tokio::test]
async fn test_view_transcript_is_repeatable() {
    let container = Container::with_gateway(Arc::new(MockGateway::fixed("OK")));
    let store: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
    container.submit_use_case(store.clone()).execute("Hi").await.unwrap();

    let view = ViewTranscriptUseCase::new(store);
    assert_eq!(view.execute().await, view.execute().await);
}
