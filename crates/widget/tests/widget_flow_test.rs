use std::io::Write;
use std::sync::Arc;

use mealchat_core::{AppContext, IdentityProvider, InMemoryIdentity, WidgetConfig};
use mealchat_providers::{MockResponse, ScriptedClient};
use mealchat_widget::{
    ApplyOutcome, AuthForm, AuthMode, SubmitRejection, WidgetController, WidgetRuntime, WidgetSnapshot, WidgetState,
};

fn create_controller(responses: Vec<MockResponse>) -> (WidgetController, Arc<ScriptedClient>) {
    let client = Arc::new(ScriptedClient::new(responses));
    let controller = WidgetController::new(client.clone(), WidgetConfig::default());
    (controller, client)
}

fn texts(snapshot: &WidgetSnapshot) -> Vec<(&str, bool)> {
    snapshot.entries.iter().map(|e| (e.text(), e.is_bot())).collect()
}

#[tokio::test]
async fn test_greeting_scenario() {
    let (mut controller, client) = create_controller(vec![MockResponse::text("Halo, ada yang bisa saya bantu?")]);
    controller.open();
    controller.set_draft("Hi");

    assert_eq!(controller.submit_and_wait().await, Ok(ApplyOutcome::Replied));

    let session = controller.session().unwrap();
    let entries: Vec<(&str, bool)> = session.transcript().iter().map(|e| (e.text(), e.is_bot())).collect();
    assert_eq!(entries, vec![("Hi", false), ("Halo, ada yang bisa saya bantu?", true)]);
    assert_eq!(controller.state(), WidgetState::Idle);
    assert_eq!(client.prompts(), vec!["Hi".to_string()]);
}

#[tokio::test]
async fn test_failure_shows_fallback_not_cause() {
    let (mut controller, _client) = create_controller(vec![MockResponse::error(503, "Model is currently loading")]);
    controller.set_draft("Ada promo?");

    assert_eq!(controller.submit_and_wait().await, Ok(ApplyOutcome::FellBack));

    let last = controller.session().unwrap().transcript().last().unwrap();
    assert!(last.is_bot());
    assert_eq!(last.text(), "Silakan coba lagi dalam beberapa detik");
    assert!(!controller.session().unwrap().is_busy());
}

#[tokio::test]
async fn test_blank_inputs_change_nothing() {
    let (mut controller, client) = create_controller(vec![MockResponse::text("unused")]);

    for blank in ["", "   ", "\n\t"] {
        controller.set_draft(blank);
        assert_eq!(controller.submit_and_wait().await, Err(SubmitRejection::Blank));
    }

    let session = controller.session().unwrap();
    assert!(session.transcript().is_empty());
    assert!(!session.is_busy());
    assert!(client.prompts().is_empty());
}

#[tokio::test]
async fn test_second_submit_while_busy_keeps_draft() {
    let (mut controller, client) = create_controller(vec![MockResponse::text("Jawaban A")]);

    controller.set_draft("A");
    let pending = controller.submit().unwrap();

    controller.set_draft("B");
    assert_eq!(controller.submit().err(), Some(SubmitRejection::Busy));
    assert_eq!(controller.submit().err(), Some(SubmitRejection::Busy));

    let completion = pending.dispatch(client.as_ref()).await;
    assert_eq!(controller.apply(completion), ApplyOutcome::Replied);

    let session = controller.session().unwrap();
    let entries: Vec<&str> = session.transcript().iter().map(|e| e.text()).collect();
    assert_eq!(entries, vec!["A", "Jawaban A"]);
    assert_eq!(session.draft(), "B");
    assert_eq!(client.prompts().len(), 1);
}

#[tokio::test]
async fn test_close_and_reopen_preserves_transcript() {
    let (mut controller, _client) = create_controller(vec![MockResponse::text("Halo!")]);
    controller.open();
    controller.set_draft("Hi");
    controller.submit_and_wait().await.unwrap();

    controller.close();
    assert!(!controller.session().unwrap().is_open());
    controller.open();

    let session = controller.session().unwrap();
    assert!(session.is_open());
    assert_eq!(session.transcript().len(), 2);
}

#[tokio::test]
async fn test_reply_after_remount_is_dropped() {
    let (mut controller, client) = create_controller(vec![MockResponse::text("late")]);
    controller.set_draft("Hi");
    let pending = controller.submit().unwrap();

    controller.unmount();
    controller.mount();

    let completion = pending.dispatch(client.as_ref()).await;
    assert_eq!(controller.apply(completion), ApplyOutcome::Discarded);
    assert!(controller.session().unwrap().transcript().is_empty());
}

#[tokio::test]
async fn test_runtime_handles_ui_events_while_awaiting() {
    let client = Arc::new(ScriptedClient::new(vec![MockResponse::delayed("Jawaban A", 50)]));
    let (runtime, mut handle) = WidgetRuntime::new(WidgetController::new(client, WidgetConfig::default()));
    let task = tokio::spawn(runtime.run());

    handle.open();
    handle.say("A");
    handle.wait_for(|s| s.is_busy).await.unwrap();

    handle.close();
    handle.say("B");
    let snapshot = handle.wait_for(|s| !s.is_open && s.draft == "B").await.unwrap();
    assert!(snapshot.is_busy);
    assert_eq!(texts(&snapshot), vec![("A", false)]);

    let snapshot = handle.wait_for(|s| !s.is_busy).await.unwrap();
    assert_eq!(texts(&snapshot), vec![("A", false), ("Jawaban A", true)]);
    assert_eq!(snapshot.draft, "B");

    handle.shutdown();
    task.await.unwrap();
}

#[tokio::test]
async fn test_runtime_unmount_discards_pending_reply() {
    let client = Arc::new(ScriptedClient::new(vec![MockResponse::delayed("late", 20)]));
    let (runtime, mut handle) = WidgetRuntime::new(WidgetController::new(client, WidgetConfig::default()));
    let task = tokio::spawn(runtime.run());

    handle.say("Hi");
    handle.wait_for(|s| s.is_busy).await.unwrap();
    handle.unmount();
    handle.wait_for(|s| !s.mounted).await.unwrap();

    drop(handle);
    let controller = task.await.unwrap();
    assert!(!controller.is_mounted());
}

#[tokio::test]
async fn test_submit_queued_after_handles_dropped_leaves_session_idle() {
    let client = Arc::new(ScriptedClient::new(vec![MockResponse::text("Halo!")]));
    let (runtime, handle) = WidgetRuntime::new(WidgetController::new(client.clone(), WidgetConfig::default()));

    handle.say("Hi");
    drop(handle);
    let mut controller = runtime.run().await;

    let session = controller.session().unwrap();
    assert_eq!(controller.state(), WidgetState::Idle);
    assert!(!session.is_busy());
    assert!(session.transcript().is_empty());
    assert_eq!(session.draft(), "Hi");
    assert!(client.prompts().is_empty());

    assert_eq!(controller.submit_and_wait().await, Ok(ApplyOutcome::Replied));
    let entries: Vec<&str> = controller.session().unwrap().transcript().iter().map(|e| e.text()).collect();
    assert_eq!(entries, vec!["Hi", "Halo!"]);
}

#[tokio::test]
async fn test_scripted_session_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "[[responses]]\ntype = \"text\"\ncontent = \"Buka jam 10 pagi\"\n\n[[responses]]\ntype = \"timeout\""
    )
    .unwrap();

    let client = Arc::new(ScriptedClient::from_file(file.path()).unwrap());
    let mut controller = WidgetController::new(client, WidgetConfig::default());

    controller.set_draft("Jam buka?");
    assert_eq!(controller.submit_and_wait().await, Ok(ApplyOutcome::Replied));
    controller.set_draft("Lagi?");
    assert_eq!(controller.submit_and_wait().await, Ok(ApplyOutcome::FellBack));
    assert_eq!(controller.session().unwrap().transcript().len(), 4);
}

#[tokio::test]
async fn test_auth_form_drives_app_context() {
    let identity = InMemoryIdentity::new();
    let context = AppContext::new(&identity);
    let mut viewer = context.viewer();
    assert!(!viewer.is_signed_in());

    let mut form = AuthForm::new(AuthMode::Register);
    form.set_email("Budi@Example.com");
    form.set_password("rahasia123");
    let user = form.submit(&identity).await.unwrap();

    assert_eq!(viewer.changed().await, Some(Some(user.clone())));
    assert_eq!(viewer.current().map(|u| u.initial()), Some('B'));

    identity.sign_out().await;
    assert_eq!(viewer.changed().await, Some(None));
}
