//! Conversational agent integration tests

mod common;

use std::sync::Arc;

use serde_json::json;
use tempfile::TempDir;

use common::{
    create_file, delegation, return_result, test_config, text_response, tool_response,
    FakeRenderer, RecordingListener, ScriptedProvider,
};
use deckwright::agent::progress::{NoopListener, ProgressEvent};
use deckwright::agent::ConversationAgent;
use deckwright::core::{ContentBlock, DeckError, Message, ToolChoice};
use deckwright::workspace::Workspace;
use deckwright::Config;

fn tool_results(messages: &[Message]) -> Vec<(String, bool)> {
    messages
        .iter()
        .flat_map(|m| m.content.iter())
        .filter_map(|block| match block {
            ContentBlock::ToolResult {
                content, is_error, ..
            } => Some((content.clone(), *is_error)),
            _ => None,
        })
        .collect()
}

struct Harness {
    _dir: TempDir,
    provider: Arc<ScriptedProvider>,
    renderer: Arc<FakeRenderer>,
    agent: ConversationAgent,
}

fn harness_with(provider: ScriptedProvider, failing_render: bool, tweak: impl FnOnce(&mut Config)) -> Harness {
    let dir = TempDir::new().unwrap();
    let mut config = test_config(dir.path());
    tweak(&mut config);

    let workspace = Workspace::new(dir.path());
    let provider = Arc::new(provider);
    let renderer = Arc::new(if failing_render {
        FakeRenderer::failing(workspace.clone())
    } else {
        FakeRenderer::new(workspace.clone())
    });
    let agent = ConversationAgent::new(config, provider.clone(), renderer.clone(), &workspace);

    Harness {
        _dir: dir,
        provider,
        renderer,
        agent,
    }
}

fn harness(provider: ScriptedProvider) -> Harness {
    harness_with(provider, false, |_| {})
}

#[tokio::test]
async fn test_first_turn_delegation_is_rejected() {
    let mut h = harness(ScriptedProvider::new(vec![
        delegation("c1", "Q4 Review"),
        text_response("Who is the audience for this deck?"),
    ]));

    let reply = h
        .agent
        .handle_turn("Make me a deck about our Q4 results", &[], &NoopListener)
        .await
        .unwrap();

    assert_eq!(reply.text, "Who is the audience for this deck?");
    assert!(reply.artifact.is_none());
    assert_eq!(h.renderer.calls(), 0);

    let requests = h.provider.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].tool_choice, ToolChoice::Auto);
    assert!(requests[0]
        .tools
        .iter()
        .any(|t| t.name() == "generate_presentation"));
    assert!(requests[0].tools.iter().all(|t| t.name() != "create_file"));

    let results = tool_results(&requests[1].messages);
    assert_eq!(results.len(), 1);
    assert!(results[0].1);
    assert!(results[0].0.starts_with("Error: "));
    assert!(results[0].0.contains("not available yet"));
}

#[tokio::test]
async fn test_second_turn_delegation_exports_deck() {
    let mut h = harness(ScriptedProvider::new(vec![
        text_response("Who is the audience, and any brand colours?"),
        delegation("c1", "Q4 Review"),
        create_file("g1", "slides/slide_1.html", "<h1>Q4</h1>"),
        create_file("g2", "slides/slide_2.html", "<h1>Next</h1>"),
        return_result(
            "g3",
            "Q4 Review",
            &["slides/slide_1.html", "slides/slide_2.html"],
        ),
        text_response("Your Q4 Review deck is ready."),
    ]));
    let listener = RecordingListener::default();

    h.agent
        .handle_turn("A deck on our Q4 results", &[], &NoopListener)
        .await
        .unwrap();
    let reply = h
        .agent
        .handle_turn("Leadership team, navy and white", &[], &listener)
        .await
        .unwrap();

    assert_eq!(reply.text, "Your Q4 Review deck is ready.");
    let artifact = reply.artifact.expect("deck exported");
    assert!(artifact.pptx_path.is_file());
    assert_eq!(artifact.file_name(), "Q4_Review.pptx");
    assert_eq!(h.renderer.calls(), 1);
    assert_eq!(h.agent.user_turns(), 2);
    assert!(h.agent.last_artifact().is_some());

    let requests = h.provider.requests();
    assert_eq!(requests.len(), 6);
    assert_eq!(requests[2].tool_choice, ToolChoice::Any);

    let results = tool_results(&requests[5].messages);
    let (content, is_error) = results.last().unwrap();
    assert!(!is_error);
    assert!(content.contains("Successfully generated presentation"));
    assert!(content.contains("Slide count: 2"));

    let events = listener.events();
    assert!(events.contains(&ProgressEvent::TurnStarted));
    assert!(events
        .iter()
        .any(|e| matches!(e, ProgressEvent::ExportFinished { .. })));
    assert!(!events.iter().any(|e| e.is_done()));
}

#[tokio::test]
async fn test_failed_generation_is_reported_to_chat() {
    let mut h = harness(ScriptedProvider::new(vec![
        text_response("Any data to include?"),
        delegation("c1", "Roadmap"),
        tool_response(vec![("g1", "return_result", json!({"success": true}))]),
        text_response("Sorry, the slides could not be generated."),
    ]));

    h.agent.handle_turn("A roadmap deck", &[], &NoopListener).await.unwrap();
    let reply = h
        .agent
        .handle_turn("No data, keep it short", &[], &NoopListener)
        .await
        .unwrap();

    assert!(reply.artifact.is_none());
    assert_eq!(h.renderer.calls(), 0);

    let requests = h.provider.requests();
    let (content, is_error) = tool_results(&requests[3].messages).pop().unwrap();
    assert!(is_error);
    assert!(content.starts_with("Error: Failed to generate presentation"));
}

#[tokio::test]
async fn test_export_failure_keeps_slides() {
    let mut h = harness_with(
        ScriptedProvider::new(vec![
            text_response("Any brand guidelines?"),
            delegation("c1", "Roadmap"),
            create_file("g1", "slides/slide_1.html", "<h1>Roadmap</h1>"),
            return_result("g2", "Roadmap", &["slides/slide_1.html"]),
            text_response("The slides are written but the PPTX export failed."),
        ]),
        true,
        |_| {},
    );

    h.agent.handle_turn("A roadmap deck", &[], &NoopListener).await.unwrap();
    let reply = h
        .agent
        .handle_turn("None, go ahead", &[], &NoopListener)
        .await
        .unwrap();

    assert!(reply.artifact.is_none());
    assert_eq!(h.renderer.calls(), 1);

    let (content, is_error) = tool_results(&h.provider.requests()[4].messages)
        .pop()
        .unwrap();
    assert!(!is_error);
    assert!(content.contains("PPTX export failed"));
}

#[tokio::test]
async fn test_provider_error_rolls_back_turn() {
    let mut h = harness(
        ScriptedProvider::new(vec![text_response("What is the topic?")]).then_fail("overloaded"),
    );

    h.agent.handle_turn("I need a deck", &[], &NoopListener).await.unwrap();
    let before = h.agent.conversation().len();

    let err = h
        .agent
        .handle_turn("About Rust adoption", &[], &NoopListener)
        .await
        .unwrap_err();

    assert!(err.is_provider());
    assert_eq!(h.agent.conversation().len(), before);
    assert_eq!(h.agent.user_turns(), 1);
}

#[tokio::test]
async fn test_unsupported_attachment_fails_closed() {
    let mut h = harness(ScriptedProvider::new(vec![text_response("Thanks, noted.")]));
    let notes = h._dir.path().join("notes.pdf");
    std::fs::write(&notes, b"%PDF").unwrap();

    let err = h
        .agent
        .handle_turn("", &[notes.clone()], &NoopListener)
        .await
        .unwrap_err();
    assert!(matches!(err, DeckError::Attachment(_)));
    assert_eq!(h.provider.request_count(), 0);
    assert!(h.agent.conversation().is_empty());

    let listener = RecordingListener::default();
    let reply = h
        .agent
        .handle_turn("Here are my notes", &[notes], &listener)
        .await
        .unwrap();
    assert_eq!(reply.warnings.len(), 1);
    assert!(listener.events().iter().any(|e| matches!(
        e,
        ProgressEvent::Warning { message } if message.contains("notes.pdf")
    )));

    let sent = &h.provider.requests()[0].messages[0];
    assert!(sent
        .content
        .iter()
        .all(|b| matches!(b, ContentBlock::Text { .. })));
}

#[tokio::test]
async fn test_image_is_sent_before_text() {
    let mut h = harness(ScriptedProvider::new(vec![text_response("Nice logo.")]));
    let logo = h._dir.path().join("logo.png");
    std::fs::write(&logo, [0x89, b'P', b'N', b'G']).unwrap();

    h.agent
        .handle_turn("This is our logo", &[logo], &NoopListener)
        .await
        .unwrap();

    let sent = &h.provider.requests()[0].messages[0];
    assert_eq!(sent.content.len(), 2);
    assert!(matches!(sent.content[0], ContentBlock::Image { .. }));
    assert!(matches!(sent.content[1], ContentBlock::Text { .. }));
}

#[tokio::test]
async fn test_iteration_cap_gives_apology() {
    let mut h = harness_with(
        ScriptedProvider::repeating(tool_response(vec![("c1", "lookup_weather", json!({}))])),
        false,
        |config| config.agent.max_chat_iterations = 2,
    );

    let reply = h
        .agent
        .handle_turn("Hello", &[], &NoopListener)
        .await
        .unwrap();

    assert!(reply.text.starts_with("Sorry"));
    assert_eq!(reply.iterations, 2);
    assert_eq!(h.provider.request_count(), 2);
}

#[tokio::test]
async fn test_reset_clears_history() {
    let mut h = harness(ScriptedProvider::new(vec![text_response("Hi!")]));
    h.agent.handle_turn("Hello", &[], &NoopListener).await.unwrap();
    assert_eq!(h.agent.user_turns(), 1);

    h.agent.reset();
    assert!(h.agent.conversation().is_empty());
    assert!(h.agent.last_artifact().is_none());
}
