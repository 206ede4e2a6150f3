use crate::api::client::ChatBackend;
use crate::api::models::{ChatReply, ChatTurn};
use crate::error::ApiError;
use crate::render::{render, RenderedTurn};
use crate::storage::{HistoryStore, KeyValueStore};
use std::cell::RefCell;

pub const NO_RESPONSE_MESSAGE: &str = "I'm having trouble connecting right now.";
pub const UNREACHABLE_MESSAGE: &str =
    "I apologize, but I'm unable to reach the server at the moment. Please try again later.";

/// What the session needs from whatever is drawing the conversation.
pub trait ChatView {
    fn set_placeholder_visible(&self, visible: bool);
    fn append_turn(&self, turn: &RenderedTurn);
    fn remove_all_turns(&self);
    fn set_typing_visible(&self, visible: bool);
    fn clear_input(&self);
    fn focus_input(&self);
    fn scroll_to_bottom(&self);
}

pub struct ChatSession<S, V> {
    history: Vec<ChatTurn>,
    store: HistoryStore<S>,
    view: V,
}

impl<S: KeyValueStore, V: ChatView> ChatSession<S, V> {
    /// Loads the saved conversation and draws it without saving it again.
    pub fn restore(store: HistoryStore<S>, view: V) -> Self {
        let history = store.load();
        if !history.is_empty() {
            view.set_placeholder_visible(false);
            for turn in &history {
                view.append_turn(&render(turn));
            }
            view.scroll_to_bottom();
        }
        log::debug!("Restored {} chat turns", history.len());
        Self { history, store, view }
    }

    pub fn history(&self) -> &[ChatTurn] {
        &self.history
    }

    fn append(&mut self, turn: ChatTurn) {
        self.view.append_turn(&render(&turn));
        self.history.push(turn);
        if let Err(e) = self.store.save(&self.history) {
            log::warn!("Chat history not persisted, keeping it in memory: {}", e);
        }
    }

    /// First half of a submission. Returns the message to send, or `None`
    /// when the input is blank and nothing happened.
    pub fn begin_submission(&mut self, text: &str) -> Option<String> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        self.view.set_placeholder_visible(false);
        self.append(ChatTurn::user(text));
        self.view.clear_input();
        self.view.set_typing_visible(true);
        self.view.scroll_to_bottom();
        Some(text.to_string())
    }

    /// Second half of a submission: exactly one bot turn, whatever happened.
    pub fn finish_submission(&mut self, result: Result<ChatReply, ApiError>) {
        self.view.set_typing_visible(false);
        let text = match result {
            Ok(reply) => reply
                .response
                .filter(|r| !r.is_empty())
                .unwrap_or_else(|| NO_RESPONSE_MESSAGE.to_string()),
            Err(e) => {
                log::error!("Chat request failed: {}", e);
                UNREACHABLE_MESSAGE.to_string()
            }
        };
        self.append(ChatTurn::bot(text));
        self.view.scroll_to_bottom();
    }

    pub fn clear_conversation(&mut self) {
        self.history.clear();
        if let Err(e) = self.store.clear() {
            log::warn!("Could not clear saved chat history: {}", e);
        }
        self.view.remove_all_turns();
        self.view.set_placeholder_visible(true);
        self.view.clear_input();
        self.view.focus_input();
    }
}

/// Runs one full conversation turn. Never returns an error: failures end up
/// as an apology from the bot.
pub async fn submit_user_message<S, V, B>(session: &RefCell<ChatSession<S, V>>, backend: &B, text: &str)
where
    S: KeyValueStore,
    V: ChatView,
    B: ChatBackend,
{
    let message = session.borrow_mut().begin_submission(text);
    let Some(message) = message else {
        return;
    };
    let result = backend.send_message(message).await;
    session.borrow_mut().finish_submission(result);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::Sender;
    use crate::error::StorageError;
    use crate::render::TurnBody;
    use crate::storage::SqliteStore;
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;
    use std::future::Future;
    use std::rc::Rc;

    #[derive(Default)]
    pub struct RecordingView {
        pub turns: RefCell<Vec<RenderedTurn>>,
        pub placeholder: Cell<bool>,
        pub typing: Cell<bool>,
        pub input_cleared: Cell<usize>,
        pub focused: Cell<usize>,
    }

    impl ChatView for Rc<RecordingView> {
        fn set_placeholder_visible(&self, visible: bool) {
            self.placeholder.set(visible);
        }
        fn append_turn(&self, turn: &RenderedTurn) {
            self.turns.borrow_mut().push(turn.clone());
        }
        fn remove_all_turns(&self) {
            self.turns.borrow_mut().clear();
        }
        fn set_typing_visible(&self, visible: bool) {
            self.typing.set(visible);
        }
        fn clear_input(&self) {
            self.input_cleared.set(self.input_cleared.get() + 1);
        }
        fn focus_input(&self) {
            self.focused.set(self.focused.get() + 1);
        }
        fn scroll_to_bottom(&self) {}
    }

    /// Answers from a queue of canned results.
    struct ScriptedBackend {
        replies: RefCell<VecDeque<Result<ChatReply, ApiError>>>,
        calls: Cell<usize>,
    }

    impl ScriptedBackend {
        fn new(replies: Vec<Result<ChatReply, ApiError>>) -> Self {
            Self { replies: RefCell::new(replies.into()), calls: Cell::new(0) }
        }
    }

    impl ChatBackend for ScriptedBackend {
        fn send_message(&self, _text: String) -> impl Future<Output = Result<ChatReply, ApiError>> + 'static {
            self.calls.set(self.calls.get() + 1);
            let next = self
                .replies
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Ok(ChatReply::default()));
            async move { next }
        }
    }

    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Ok(None)
        }
        fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Io(std::io::Error::new(std::io::ErrorKind::Other, "quota exceeded")))
        }
        fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Io(std::io::Error::new(std::io::ErrorKind::Other, "unavailable")))
        }
    }

    fn ok(text: &str) -> Result<ChatReply, ApiError> {
        Ok(ChatReply { response: Some(text.to_string()) })
    }

    fn new_session(
        store: Rc<SqliteStore>,
    ) -> (RefCell<ChatSession<Rc<SqliteStore>, Rc<RecordingView>>>, Rc<RecordingView>) {
        let view = Rc::new(RecordingView::default());
        view.placeholder.set(true);
        let session = ChatSession::restore(HistoryStore::new(store), view.clone());
        (RefCell::new(session), view)
    }

    #[tokio::test]
    async fn each_submission_renders_two_turns_and_blank_input_none() {
        let store = Rc::new(SqliteStore::open_in_memory().unwrap());
        let (session, view) = new_session(store);
        let backend = ScriptedBackend::new(vec![ok("Hello!"), ok("Library opens at 9.")]);

        submit_user_message(&session, &backend, "hi").await;
        submit_user_message(&session, &backend, "   \n\t").await;
        submit_user_message(&session, &backend, "").await;
        submit_user_message(&session, &backend, "library hours?").await;

        assert_eq!(view.turns.borrow().len(), 4);
        assert_eq!(backend.calls.get(), 2);
        let history = session.borrow().history().to_vec();
        assert_eq!(
            history,
            vec![
                ChatTurn::user("hi"),
                ChatTurn::bot("Hello!"),
                ChatTurn::user("library hours?"),
                ChatTurn::bot("Library opens at 9."),
            ]
        );
        assert!(!view.placeholder.get());
        assert!(!view.typing.get());
        assert_eq!(view.input_cleared.get(), 2);
    }

    #[tokio::test]
    async fn persisted_history_reloads_identically() {
        let store = Rc::new(SqliteStore::open_in_memory().unwrap());
        let (session, _view) = new_session(store.clone());
        let backend = ScriptedBackend::new(vec![ok("one"), ok("two **bold**"), ok("three")]);
        for q in ["a", "b", "c"] {
            submit_user_message(&session, &backend, q).await;
        }

        let (reloaded, view) = new_session(store);
        assert_eq!(reloaded.borrow().history(), session.borrow().history());
        assert_eq!(view.turns.borrow().len(), 6);
        assert!(!view.placeholder.get());
    }

    #[tokio::test]
    async fn backend_failure_yields_one_apology() {
        let store = Rc::new(SqliteStore::open_in_memory().unwrap());
        let (session, view) = new_session(store);
        let backend = ScriptedBackend::new(vec![Err(ApiError::Status(reqwest::StatusCode::BAD_GATEWAY))]);

        submit_user_message(&session, &backend, "hello?").await;

        let history = session.borrow().history().to_vec();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1], ChatTurn::bot(UNREACHABLE_MESSAGE));
        assert!(!view.typing.get());
    }

    #[tokio::test]
    async fn missing_response_uses_fallback() {
        let store = Rc::new(SqliteStore::open_in_memory().unwrap());
        let (session, _view) = new_session(store);
        let backend = ScriptedBackend::new(vec![Ok(ChatReply { response: None }), ok("")]);

        submit_user_message(&session, &backend, "first").await;
        submit_user_message(&session, &backend, "second").await;

        let history = session.borrow().history().to_vec();
        assert_eq!(history[1].text, NO_RESPONSE_MESSAGE);
        assert_eq!(history[3].text, NO_RESPONSE_MESSAGE);
    }

    #[tokio::test]
    async fn clear_then_reload_is_empty() {
        let store = Rc::new(SqliteStore::open_in_memory().unwrap());
        let (session, view) = new_session(store.clone());
        let backend = ScriptedBackend::new(vec![ok("hi")]);
        submit_user_message(&session, &backend, "hello").await;

        session.borrow_mut().clear_conversation();

        assert!(session.borrow().history().is_empty());
        assert!(view.turns.borrow().is_empty());
        assert!(view.placeholder.get());
        assert_eq!(view.focused.get(), 1);
        let (reloaded, _) = new_session(store);
        assert!(reloaded.borrow().history().is_empty());
    }

    #[test]
    fn typing_indicator_shows_between_halves() {
        let store = Rc::new(SqliteStore::open_in_memory().unwrap());
        let (session, view) = new_session(store);
        let sent = session.borrow_mut().begin_submission("  where is the canteen?  ");
        assert_eq!(sent.as_deref(), Some("where is the canteen?"));
        assert!(view.typing.get());
        assert_eq!(view.turns.borrow()[0].sender, Sender::User);

        session.borrow_mut().finish_submission(ok("Behind the library."));
        assert!(!view.typing.get());
        let turns = view.turns.borrow();
        assert_eq!(turns[1].body, TurnBody::Markup("Behind the library.".into()));
    }

    #[test]
    fn overlapping_submissions_append_replies_as_they_arrive() {
        let store = Rc::new(SqliteStore::open_in_memory().unwrap());
        let (session, _view) = new_session(store);
        session.borrow_mut().begin_submission("first");
        session.borrow_mut().begin_submission("second");
        session.borrow_mut().finish_submission(ok("reply to second"));
        session.borrow_mut().finish_submission(ok("reply to first"));

        let texts: Vec<String> = session.borrow().history().iter().map(|t| t.text.clone()).collect();
        assert_eq!(texts, ["first", "second", "reply to second", "reply to first"]);
    }

    #[tokio::test]
    async fn storage_failure_keeps_memory_authoritative() {
        let view = Rc::new(RecordingView::default());
        let session = RefCell::new(ChatSession::restore(HistoryStore::new(FailingStore), view.clone()));
        let backend = ScriptedBackend::new(vec![ok("still here")]);

        submit_user_message(&session, &backend, "hello").await;
        assert_eq!(session.borrow().history().len(), 2);
        assert_eq!(view.turns.borrow().len(), 2);

        session.borrow_mut().clear_conversation();
        assert!(session.borrow().history().is_empty());
    }
}
