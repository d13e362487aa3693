//! Session store and server state integration tests

mod common;

use std::sync::Arc;

use futures::future::join_all;
use tempfile::TempDir;
use tokio_test::{assert_err, assert_ok};

use common::{create_file, delegation, return_result, test_config, text_response, FakeRenderer, ScriptedProvider};
use deckwright::agent::progress::NoopListener;
use deckwright::render::DeckRenderer;
use deckwright::server::ServerState;
use deckwright::session::{InMemorySessionStore, RendererFactory, SessionFactory, SessionStore};
use deckwright::workspace::Workspace;

fn factory(dir: &TempDir, provider: ScriptedProvider) -> SessionFactory {
    let renderer: RendererFactory = Arc::new(|workspace: &Workspace, _id: &str| {
        Arc::new(FakeRenderer::new(workspace.clone())) as Arc<dyn DeckRenderer>
    });
    SessionFactory::new(test_config(dir.path()), Arc::new(provider)).with_renderer(renderer)
}

#[tokio::test]
async fn test_sessions_are_isolated() {
    let dir = TempDir::new().unwrap();
    let factory = factory(
        &dir,
        ScriptedProvider::new(vec![
            text_response("Who is the audience?"),
            delegation("c1", "Launch Plan"),
            create_file("g1", "slides/slide_1.html", "<h1>Launch</h1>"),
            return_result("g2", "Launch Plan", &["slides/slide_1.html"]),
            text_response("Your deck is ready."),
            text_response("Hello! What should your deck be about?"),
        ]),
    );

    let mut a = factory.create().await.unwrap();
    let mut b = factory.create().await.unwrap();
    assert_ne!(a.id(), b.id());
    assert_ne!(a.workspace().root(), b.workspace().root());
    assert!(a.workspace().root().starts_with(dir.path().join("sessions")));
    assert!(a.workspace().exports_dir().is_dir());

    a.submit("A launch plan deck", &[], &NoopListener).await.unwrap();
    let summary = a
        .submit("Investors, keep it to one slide", &[], &NoopListener)
        .await
        .unwrap();
    let deck = summary.pptx_path.expect("deck linked to session a");
    assert!(deck.starts_with(a.workspace().root()));
    assert!(a.workspace().root().join("slides/slide_1.html").is_file());
    assert!(!b.workspace().root().join("slides/slide_1.html").exists());

    let summary = b.submit("Hi", &[], &NoopListener).await.unwrap();
    assert!(summary.pptx_path.is_none());
    assert!(b.artifact().is_none());

    assert_eq!(a.transcript().len(), 4);
    assert_eq!(b.transcript().len(), 2);
}

#[tokio::test]
async fn test_export_in_session_workspace_is_linked() {
    let dir = TempDir::new().unwrap();
    let factory = factory(
        &dir,
        ScriptedProvider::new(vec![text_response("Noted."), text_response("Done.")]),
    );

    let mut session = assert_ok!(factory.create().await);
    assert_ok!(session.submit("Hello", &[], &NoopListener).await);
    assert!(session.artifact().is_none());

    let manual = session.workspace().exports_dir().join("Manual.pptx");
    std::fs::write(&manual, b"PK").unwrap();

    let summary = session.submit("Anything new?", &[], &NoopListener).await.unwrap();
    assert_eq!(summary.pptx_path, Some(manual));
}

#[tokio::test]
async fn test_export_right_after_creation_is_linked() {
    let dir = TempDir::new().unwrap();
    let factory = factory(&dir, ScriptedProvider::new(vec![text_response("Done.")]));

    let mut session = assert_ok!(factory.create().await);
    let quick = session.workspace().exports_dir().join("Quick.pptx");
    std::fs::write(&quick, b"PK").unwrap();

    let summary = assert_ok!(session.submit("Hello", &[], &NoopListener).await);
    assert_eq!(summary.pptx_path, Some(quick));
}

#[tokio::test]
async fn test_store_remove_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let factory = factory(&dir, ScriptedProvider::new(vec![]));
    let store = InMemorySessionStore::new();

    let session = factory.create().await.unwrap();
    let id = session.id().to_string();
    store.insert(session).await;

    assert_eq!(store.len().await, 1);
    assert!(store.load(&id).await.is_some());
    assert!(store.remove(&id).await);
    assert!(!store.remove(&id).await);
    assert!(store.load(&id).await.is_none());
    assert_eq!(store.len().await, 0);
}

#[tokio::test]
async fn test_server_state_reuses_known_sessions() {
    let dir = TempDir::new().unwrap();
    let store: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
    let state = ServerState::new(factory(&dir, ScriptedProvider::new(vec![])), store.clone());

    let (id, first) = state.session_for(None).await.unwrap();
    assert_eq!(first.lock().await.id(), id);

    let (again_id, again) = state.session_for(Some(&id)).await.unwrap();
    assert_eq!(again_id, id);
    assert!(Arc::ptr_eq(&first, &again));

    let (fresh_id, fresh) = state.session_for(Some("not-a-session")).await.unwrap();
    assert_ne!(fresh_id, id);
    assert_eq!(fresh.lock().await.id(), fresh_id);
    assert_eq!(store.len().await, 2);
}

#[tokio::test]
async fn test_session_id_available_while_turn_runs() {
    let dir = TempDir::new().unwrap();
    let store: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
    let state = ServerState::new(factory(&dir, ScriptedProvider::new(vec![])), store);

    let (id, shared) = state.session_for(None).await.unwrap();
    let _busy = shared.lock().await;

    let lookup = tokio::time::timeout(
        std::time::Duration::from_secs(1),
        state.session_for(Some(&id)),
    )
    .await;
    let (again_id, _) = assert_ok!(assert_ok!(lookup));
    assert_eq!(again_id, id);
}

#[tokio::test]
async fn test_sessions_run_concurrently() {
    let dir = TempDir::new().unwrap();
    let factory = factory(&dir, ScriptedProvider::repeating(text_response("What topic?")));
    let store = InMemorySessionStore::new();

    let mut shared = Vec::new();
    for _ in 0..3 {
        shared.push(store.insert(assert_ok!(factory.create().await)).await);
    }

    let turns = shared.iter().map(|session| async move {
        session
            .lock()
            .await
            .submit("I need a deck", &[], &NoopListener)
            .await
    });
    for result in join_all(turns).await {
        let summary = assert_ok!(result);
        assert_eq!(summary.reply.text, "What topic?");
    }
    assert_eq!(store.len().await, 3);
}

#[tokio::test]
async fn test_empty_turn_is_rejected() {
    let dir = TempDir::new().unwrap();
    let factory = factory(&dir, ScriptedProvider::new(vec![]));
    let mut session = assert_ok!(factory.create().await);

    assert_err!(session.submit("   ", &[], &NoopListener).await);
    assert!(session.transcript().is_empty());
}
