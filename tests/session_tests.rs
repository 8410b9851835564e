//! Submit-cycle tests driven through scripted responders and an in-memory
//! surface.

use std::collections::VecDeque;
use std::sync::Arc;

use futures::FutureExt;
use parking_lot::Mutex;
use tokio::sync::Notify;

use relaychat::chat::{BUSY_NOTICE, ChatConfig, ChatSession, SessionState, Submission};
use relaychat::{
    ChatResponse, ClientLogger, Entry, EntryKind, Error, MemorySurface, Message, MessageRole,
    Reply, Responder, Result,
};

const SYSTEM: &str = "You are a beauty advisor.";

fn config() -> ChatConfig {
    ChatConfig::new()
        .with_system_prompt(SYSTEM)
        .with_greeting(None)
}

/// Replays canned outcomes in order and records every transcript it sees.
#[derive(Default)]
struct ScriptedResponder {
    outcomes: Mutex<VecDeque<Result<Reply>>>,
    seen: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedResponder {
    fn new(outcomes: impl IntoIterator<Item = Result<Reply>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into_iter().collect()),
            seen: Mutex::new(Vec::new()),
        }
    }

    fn seen(&self) -> Vec<Vec<Message>> {
        self.seen.lock().clone()
    }
}

#[async_trait::async_trait]
impl Responder for ScriptedResponder {
    async fn respond(&self, messages: &[Message]) -> Result<Reply> {
        self.seen.lock().push(messages.to_vec());
        self.outcomes
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(Error::status(500, "script exhausted")))
    }
}

fn session_with(
    outcomes: impl IntoIterator<Item = Result<Reply>>,
) -> ChatSession<Arc<ScriptedResponder>, Arc<MemorySurface>> {
    ChatSession::new(
        Arc::new(ScriptedResponder::new(outcomes)),
        Arc::new(MemorySurface::new()),
        config(),
    )
}

#[tokio::test]
async fn blank_input_is_a_no_op() {
    let session = session_with([]);
    for raw in ["", "   ", "\n\t "] {
        assert_eq!(session.submit(raw).await.unwrap(), Submission::Ignored);
    }
    assert_eq!(session.message_count(), 1);
    assert!(session.surface().is_empty());
    assert!(session.responder().seen().is_empty());
    assert_eq!(session.stats().submissions, 0);
}

#[tokio::test]
async fn successful_round_trip_appends_user_then_assistant() {
    let session = session_with([Ok(Reply::new("R"))]);
    session.submit("  hello there \n").await.unwrap();

    let transcript = session.transcript();
    let tail: Vec<_> = transcript.messages()[1..].to_vec();
    assert_eq!(
        tail,
        vec![Message::user("hello there"), Message::assistant("R")]
    );
    assert_eq!(
        session.surface().entries(),
        vec![Entry::user("hello there"), Entry::assistant("R")]
    );
    assert_eq!(session.surface().scrolled_to(), Some(1));
}

#[tokio::test]
async fn whole_transcript_is_sent() {
    let session = session_with([Ok(Reply::new("first")), Ok(Reply::new("second"))]);
    session.submit("one").await.unwrap();
    session.submit("two").await.unwrap();

    let seen = session.responder().seen();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0], vec![Message::system(SYSTEM), Message::user("one")]);
    assert_eq!(
        seen[1],
        vec![
            Message::system(SYSTEM),
            Message::user("one"),
            Message::assistant("first"),
            Message::user("two"),
        ]
    );
}

#[tokio::test]
async fn transport_failure_restores_transcript() {
    let session = session_with([Ok(Reply::new("R")), Err(Error::status(500, ""))]);
    session.submit("first").await.unwrap();
    let before = session.transcript();
    let shown_before = session.surface().len();

    let err = session.submit("second").await.unwrap_err();
    assert_eq!(err.status_code(), Some(500));
    assert_eq!(session.transcript(), before);

    let errors = session.surface().entries_of(EntryKind::Error);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].text.contains("500"));
    // the user entry stays on screen; only the transcript is rolled back
    assert_eq!(session.surface().len(), shown_before + 2);
    assert_eq!(session.state(), SessionState::Idle);
}

#[tokio::test]
async fn responder_error_text_is_shown() {
    let session = session_with([Err(Error::responder("E", None))]);
    let before = session.transcript();

    let err = session.submit("question").await.unwrap_err();
    assert!(err.is_responder());
    assert_eq!(session.transcript(), before);

    let errors = session.surface().entries_of(EntryKind::Error);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].text.contains("E"));
}

#[tokio::test]
async fn format_error_is_generic() {
    let session = session_with([Err(Error::format())]);
    let before = session.transcript();

    session.submit("question").await.unwrap_err();
    assert_eq!(session.transcript(), before);

    let errors = session.surface().entries_of(EntryKind::Error);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].text.contains("Invalid response format"));
    assert_eq!(session.stats().format_errors, 1);
}

/// Reports whether the pending indicator was on screen when it was asked.
struct ObservingResponder {
    surface: Arc<MemorySurface>,
    outcome: fn() -> Result<Reply>,
    observed: Mutex<Vec<bool>>,
}

#[async_trait::async_trait]
impl Responder for ObservingResponder {
    async fn respond(&self, _: &[Message]) -> Result<Reply> {
        self.observed.lock().push(self.surface.has_pending());
        (self.outcome)()
    }
}

#[tokio::test]
async fn pending_indicator_brackets_the_request() {
    let outcomes: [fn() -> Result<Reply>; 2] =
        [|| Ok(Reply::new("R")), || Err(Error::status(503, ""))];
    for outcome in outcomes {
        let surface = Arc::new(MemorySurface::new());
        let responder = Arc::new(ObservingResponder {
            surface: Arc::clone(&surface),
            outcome,
            observed: Mutex::new(Vec::new()),
        });
        let session = ChatSession::new(Arc::clone(&responder), Arc::clone(&surface), config());

        assert!(!surface.has_pending());
        let _ = session.submit("hi").await;
        assert_eq!(*responder.observed.lock(), vec![true]);
        assert!(!surface.has_pending());
    }
}

#[tokio::test]
async fn repeated_failures_do_not_grow_transcript() {
    let session = session_with((0..5).map(|i| Err(Error::status(500 + i, ""))));
    let before = session.message_count();
    for attempt in 0..5 {
        session
            .submit(&format!("attempt {attempt}"))
            .await
            .unwrap_err();
        assert_eq!(session.message_count(), before);
    }
    assert_eq!(session.surface().entries_of(EntryKind::Error).len(), 5);
    assert_eq!(session.stats().transport_errors, 5);
}

#[tokio::test]
async fn session_recovers_after_failure() {
    let session = session_with([Err(Error::transport("connection reset", None)), Ok(Reply::new("R"))]);
    session.submit("try").await.unwrap_err();
    session.submit("try again").await.unwrap();

    let transcript = session.transcript();
    assert_eq!(
        transcript.messages().to_vec(),
        vec![
            Message::system(SYSTEM),
            Message::user("try again"),
            Message::assistant("R"),
        ]
    );
}

#[tokio::test]
async fn frizzy_hair_scenario() {
    let session = session_with([Ok(Reply::new("Try a leave-in conditioner"))]);
    session.submit("My hair is frizzy").await.unwrap();

    let transcript = session.transcript();
    let messages: Vec<_> = transcript
        .messages()
        .iter()
        .map(|m| (m.role(), m.content().to_string()))
        .collect();
    assert_eq!(
        messages,
        vec![
            (MessageRole::System, SYSTEM.to_string()),
            (MessageRole::User, "My hair is frizzy".to_string()),
            (
                MessageRole::Assistant,
                "Try a leave-in conditioner".to_string()
            ),
        ]
    );
    assert_eq!(
        session.surface().entries(),
        vec![
            Entry::user("My hair is frizzy"),
            Entry::assistant("Try a leave-in conditioner"),
        ]
    );
}

/// Holds every request until the gate opens.
struct GatedResponder {
    gate: Arc<Notify>,
}

#[async_trait::async_trait]
impl Responder for GatedResponder {
    async fn respond(&self, messages: &[Message]) -> Result<Reply> {
        self.gate.notified().await;
        Ok(Reply::new(format!("answer to {}", messages.len())))
    }
}

#[tokio::test]
async fn concurrent_submission_is_rejected() {
    let gate = Arc::new(Notify::new());
    let session = ChatSession::new(
        GatedResponder {
            gate: Arc::clone(&gate),
        },
        MemorySurface::new(),
        config(),
    );

    let (first, second) = tokio::join!(session.submit("first"), async {
        let result = session.submit("second").await;
        gate.notify_one();
        result
    });

    assert_eq!(
        first.unwrap(),
        Submission::Replied(Reply::new("answer to 2"))
    );
    assert!(second.unwrap_err().is_busy());

    let transcript = session.transcript();
    assert_eq!(
        transcript.messages().to_vec(),
        vec![
            Message::system(SYSTEM),
            Message::user("first"),
            Message::assistant("answer to 2"),
        ]
    );
    assert_eq!(
        session.surface().entries_of(EntryKind::Notice),
        vec![Entry::notice(BUSY_NOTICE)]
    );
    assert!(session.surface().entries_of(EntryKind::Error).is_empty());
    assert_eq!(session.stats().rejected, 1);
}

#[tokio::test]
async fn reset_is_rejected_while_pending() {
    let gate = Arc::new(Notify::new());
    let session = ChatSession::new(
        GatedResponder {
            gate: Arc::clone(&gate),
        },
        MemorySurface::new(),
        config(),
    );

    let (first, reset) = tokio::join!(session.submit("first"), async {
        let result = session.reset();
        gate.notify_one();
        result
    });
    assert!(first.is_ok());
    assert!(reset.unwrap_err().is_busy());
    assert_eq!(session.message_count(), 3);
}

/// Never answers.
struct SilentResponder;

#[async_trait::async_trait]
impl Responder for SilentResponder {
    async fn respond(&self, _: &[Message]) -> Result<Reply> {
        std::future::pending().await
    }
}

#[test]
fn dropped_submission_rolls_back() {
    let session = ChatSession::new(SilentResponder, MemorySurface::new(), config());

    let mut submit = Box::pin(session.submit("hello"));
    assert!((&mut submit).now_or_never().is_none());
    assert_eq!(session.state(), SessionState::Pending);
    assert_eq!(session.message_count(), 2);
    assert!(session.surface().has_pending());
    drop(submit);

    assert_eq!(session.state(), SessionState::Idle);
    assert_eq!(session.message_count(), 1);
    assert!(!session.surface().has_pending());
    assert!(session.surface().entries_of(EntryKind::Error).is_empty());
    assert_eq!(session.stats().abandoned, 1);
}

/// Keeps the display text of every logged failure.
#[derive(Default)]
struct RecordingLogger {
    errors: Mutex<Vec<String>>,
}

impl ClientLogger for RecordingLogger {
    fn log_request(&self, _: &str, _: &[Message]) {}

    fn log_response(&self, _: u16, _: &ChatResponse) {}

    fn log_error(&self, error: &Error) {
        self.errors.lock().push(error.to_string());
    }
}

#[tokio::test]
async fn failures_reach_the_diagnostic_logger() {
    let logger = Arc::new(RecordingLogger::default());
    let session = session_with([Err(Error::responder("E", None)), Ok(Reply::new("R"))])
        .with_logger(logger.clone());

    session.submit("one").await.unwrap_err();
    session.submit("two").await.unwrap();

    assert_eq!(*logger.errors.lock(), vec!["E".to_string()]);
}
