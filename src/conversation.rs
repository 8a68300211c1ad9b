use crate::api::{ApiError, ChatBackend, ChatReply};
use crate::events::{ConnectionStatus, Message, Sender};
use crate::session::SessionId;

/// Greeting shown as message 1 and restored verbatim whenever the
/// conversation is cleared.
pub const GREETING: &str = "Hey there, fellow Deadhead! 🌹💀⚡ Welcome to the cosmic journey through Grateful Dead knowledge. I'm your guide through 30 years of the Dead's music, history, and magic. What would you like to explore? Ask me about songs that'll blow your mind, legendary shows that changed everything, or the beautiful community that followed the music. Let's take this trip together!";

/// Appended as the bot reply when an exchange fails.
pub const FALLBACK_REPLY: &str = "Sorry, I'm having trouble connecting to the Dead knowledge base right now. Please try again! ⚡";

/// Payload captured when a user message is accepted for dispatch.
///
/// Holds a snapshot of the session id from the moment of submission, so
/// the network call carries exactly what the user saw.
#[derive(Debug, Clone)]
pub struct PendingExchange {
    pub message: String,
    pub session_id: String,
}

/// Single source of truth for the conversation thread, session identity,
/// loading flag, and connection status.
///
/// The controller is a synchronous state machine; network calls run
/// elsewhere and feed their outcomes back in through [`resolve_exchange`]
/// and [`apply_probe`]. The async wrappers below compose both halves for
/// callers that can await in place.
///
/// [`resolve_exchange`]: ConversationController::resolve_exchange
/// [`apply_probe`]: ConversationController::apply_probe
pub struct ConversationController {
    messages: Vec<Message>,
    // Monotonic counter, deliberately decoupled from the log length so a
    // clear landing mid-exchange cannot mint a duplicate id
    next_id: u64,
    session: SessionId,
    status: ConnectionStatus,
    is_loading: bool,
}

impl ConversationController {
    /// Seed the thread with the greeting, generate a fresh session id,
    /// and start in `Checking` until the first probe resolves.
    pub fn new() -> Self {
        let mut controller = Self {
            messages: Vec::new(),
            next_id: 1,
            session: SessionId::generate(),
            status: ConnectionStatus::Checking,
            is_loading: false,
        };
        controller.append(Sender::Bot, GREETING.to_string());
        controller
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn session_id(&self) -> &str {
        self.session.as_str()
    }

    /// Accept a user message for sending.
    ///
    /// Blank input or an exchange already in flight makes this a silent
    /// no-op. Otherwise the user message is appended, the loading flag is
    /// raised, and the caller receives the payload to dispatch.
    pub fn submit(&mut self, text: &str) -> Option<PendingExchange> {
        if text.trim().is_empty() || self.is_loading {
            return None;
        }

        self.append(Sender::User, text.to_string());
        self.is_loading = true;

        Some(PendingExchange {
            message: text.to_string(),
            session_id: self.session.as_str().to_string(),
        })
    }

    /// Fold the outcome of a dispatched exchange back into the thread.
    ///
    /// Exactly one bot message is appended per call: the reply text on
    /// success, the fixed fallback on failure. The loading flag clears on
    /// both arms.
    pub fn resolve_exchange(&mut self, outcome: Result<ChatReply, ApiError>) {
        match outcome {
            Ok(reply) => {
                if let Some(server_id) = reply.session_id.as_deref() {
                    if self.session.adopt(server_id) {
                        log::debug!("adopted server session id {}", self.session);
                    }
                }
                self.append(Sender::Bot, reply.response);
                self.status = ConnectionStatus::Connected;
            }
            Err(err) => {
                log::warn!("chat exchange failed: {err}");
                self.append(Sender::Bot, FALLBACK_REPLY.to_string());
                self.status = ConnectionStatus::Disconnected;
            }
        }
        self.is_loading = false;
    }

    /// Fold a health probe outcome into the status indicator. Probes never
    /// touch the thread or gate sending.
    pub fn apply_probe(&mut self, outcome: Result<(), ApiError>) {
        self.status = match outcome {
            Ok(()) => ConnectionStatus::Connected,
            Err(err) => {
                log::debug!("health probe failed: {err}");
                ConnectionStatus::Disconnected
            }
        };
    }

    /// Reset the thread to exactly the greeting, with a fresh timestamp.
    ///
    /// The session id survives; an exchange still in flight keeps the
    /// loading flag and will clear it when it resolves.
    pub fn reset(&mut self) {
        self.messages.clear();
        self.next_id = 1;
        self.append(Sender::Bot, GREETING.to_string());
    }

    /// Run one full exchange against `api`: submit, await the reply,
    /// resolve. Returns false if the submission was rejected.
    pub async fn send_message<C: ChatBackend>(&mut self, api: &C, text: &str) -> bool {
        let Some(pending) = self.submit(text) else {
            return false;
        };
        let outcome = api.send_chat(&pending.message, Some(&pending.session_id)).await;
        self.resolve_exchange(outcome);
        true
    }

    /// Probe the service and update the status indicator.
    #[allow(dead_code)]
    pub async fn probe_health<C: ChatBackend>(&mut self, api: &C) {
        let outcome = api.probe_health().await;
        self.apply_probe(outcome);
    }

    /// Ask the service to drop its context for this session, then reset
    /// the local thread. A failed request is logged and nothing more; the
    /// local reset always happens.
    #[allow(dead_code)]
    pub async fn clear_conversation<C: ChatBackend>(&mut self, api: &C) {
        if let Err(err) = api.clear_conversation(Some(self.session.as_str())).await {
            log::warn!("conversation clear request failed: {err}");
        }
        self.reset();
    }

    fn append(&mut self, sender: Sender, text: String) {
        let id = self.next_id;
        self.next_id += 1;
        self.messages.push(Message {
            id,
            text,
            sender,
            timestamp: capture_time(),
        });
    }
}

impl Default for ConversationController {
    fn default() -> Self {
        Self::new()
    }
}

fn capture_time() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Scripted service double: chat outcomes pop in order, the probe
    /// outcome is fixed.
    struct ScriptedBackend {
        chat_outcomes: Mutex<VecDeque<Result<ChatReply, ApiError>>>,
        probe_ok: bool,
    }

    impl ScriptedBackend {
        fn new(probe_ok: bool) -> Self {
            Self {
                chat_outcomes: Mutex::new(VecDeque::new()),
                probe_ok,
            }
        }

        fn reply(self, response: &str, session_id: Option<&str>) -> Self {
            self.chat_outcomes.lock().unwrap().push_back(Ok(ChatReply {
                response: response.to_string(),
                session_id: session_id.map(str::to_string),
            }));
            self
        }

        fn failure(self) -> Self {
            self.chat_outcomes
                .lock()
                .unwrap()
                .push_back(Err(ApiError::Status(StatusCode::INTERNAL_SERVER_ERROR)));
            self
        }
    }

    impl ChatBackend for ScriptedBackend {
        async fn probe_health(&self) -> Result<(), ApiError> {
            if self.probe_ok {
                Ok(())
            } else {
                Err(ApiError::Status(StatusCode::SERVICE_UNAVAILABLE))
            }
        }

        async fn send_chat(
            &self,
            _message: &str,
            _session_id: Option<&str>,
        ) -> Result<ChatReply, ApiError> {
            self.chat_outcomes
                .lock()
                .unwrap()
                .pop_front()
                .expect("no scripted chat outcome left")
        }

        async fn clear_conversation(&self, _session_id: Option<&str>) -> Result<(), ApiError> {
            Ok(())
        }
    }

    #[test]
    fn starts_with_the_greeting_and_checking_status() {
        let controller = ConversationController::new();

        assert_eq!(controller.messages().len(), 1);
        assert_eq!(controller.messages()[0].id, 1);
        assert_eq!(controller.messages()[0].sender, Sender::Bot);
        assert_eq!(controller.messages()[0].text, GREETING);
        assert_eq!(controller.status(), ConnectionStatus::Checking);
        assert!(!controller.is_loading());
    }

    #[tokio::test]
    async fn sequential_exchanges_number_messages_in_pairs() {
        let api = ScriptedBackend::new(true)
            .reply("first answer", None)
            .reply("second answer", None);
        let mut controller = ConversationController::new();

        assert!(controller.send_message(&api, "one").await);
        assert!(controller.send_message(&api, "two").await);

        let ids: Vec<u64> = controller.messages().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);

        let senders: Vec<Sender> = controller.messages().iter().map(|m| m.sender).collect();
        assert_eq!(
            senders,
            vec![Sender::Bot, Sender::User, Sender::Bot, Sender::User, Sender::Bot]
        );
        assert_eq!(controller.status(), ConnectionStatus::Connected);
    }

    #[test]
    fn blank_input_is_a_silent_no_op() {
        let mut controller = ConversationController::new();

        assert!(controller.submit("").is_none());
        assert!(controller.submit("   \n\t").is_none());
        assert_eq!(controller.messages().len(), 1);
        assert!(!controller.is_loading());
    }

    #[test]
    fn a_second_submission_is_rejected_while_one_is_in_flight() {
        let mut controller = ConversationController::new();

        let first = controller.submit("hi");
        assert!(first.is_some());
        assert!(controller.is_loading());

        // Synchronous phase of the second call sees the raised flag
        assert!(controller.submit("there").is_none());
        assert_eq!(controller.messages().len(), 2);

        controller.resolve_exchange(Ok(ChatReply {
            response: "welcome".to_string(),
            session_id: None,
        }));
        assert!(!controller.is_loading());
        assert!(controller.submit("there").is_some());
    }

    #[tokio::test]
    async fn a_failed_exchange_appends_exactly_one_fallback_reply() {
        let api = ScriptedBackend::new(true).failure();
        let mut controller = ConversationController::new();

        assert!(controller.send_message(&api, "hi").await);

        assert_eq!(controller.messages().len(), 3);
        let bot_reply = controller.messages().last().unwrap();
        assert_eq!(bot_reply.sender, Sender::Bot);
        assert_eq!(bot_reply.text, FALLBACK_REPLY);
        assert_eq!(controller.status(), ConnectionStatus::Disconnected);
        assert!(!controller.is_loading());
    }

    #[tokio::test]
    async fn a_reply_with_a_new_session_id_is_adopted() {
        let api = ScriptedBackend::new(true).reply("42", Some("abc"));
        let mut controller = ConversationController::new();
        let original = controller.session_id().to_string();

        assert!(controller.send_message(&api, "hi").await);

        assert_ne!(original, "abc");
        assert_eq!(controller.session_id(), "abc");
        assert_eq!(controller.messages().last().unwrap().text, "42");
    }

    #[tokio::test]
    async fn a_reply_without_a_session_id_keeps_the_local_one() {
        let api = ScriptedBackend::new(true).reply("sure", None);
        let mut controller = ConversationController::new();
        let original = controller.session_id().to_string();

        assert!(controller.send_message(&api, "hi").await);
        assert_eq!(controller.session_id(), original);
    }

    #[tokio::test]
    async fn a_failing_probe_flips_the_status_and_leaves_the_thread_alone() {
        let api = ScriptedBackend::new(false);
        let mut controller = ConversationController::new();

        controller.probe_health(&api).await;

        assert_eq!(controller.status(), ConnectionStatus::Disconnected);
        assert_eq!(controller.messages().len(), 1);
        assert_eq!(controller.messages()[0].text, GREETING);
    }

    #[tokio::test]
    async fn a_successful_probe_reports_connected() {
        let api = ScriptedBackend::new(true);
        let mut controller = ConversationController::new();

        controller.probe_health(&api).await;
        assert_eq!(controller.status(), ConnectionStatus::Connected);
    }

    #[tokio::test]
    async fn clear_resets_to_exactly_the_greeting() {
        let api = ScriptedBackend::new(true)
            .reply("first", None)
            .reply("second", None);
        let mut controller = ConversationController::new();
        controller.send_message(&api, "one").await;
        controller.send_message(&api, "two").await;
        let session = controller.session_id().to_string();

        controller.clear_conversation(&api).await;

        assert_eq!(controller.messages().len(), 1);
        assert_eq!(controller.messages()[0].id, 1);
        assert_eq!(controller.messages()[0].sender, Sender::Bot);
        assert_eq!(controller.messages()[0].text, GREETING);
        // Clearing never regenerates the session id
        assert_eq!(controller.session_id(), session);
    }

    #[tokio::test]
    async fn numbering_restarts_after_a_clear() {
        let api = ScriptedBackend::new(true)
            .reply("first", None)
            .reply("second", None);
        let mut controller = ConversationController::new();
        controller.send_message(&api, "one").await;

        controller.clear_conversation(&api).await;
        controller.send_message(&api, "two").await;

        let ids: Vec<u64> = controller.messages().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn a_clear_landing_mid_exchange_cannot_duplicate_ids() {
        let mut controller = ConversationController::new();
        controller.submit("hi").expect("accepted");

        // The thread resets while the reply is still in flight
        controller.reset();
        assert!(controller.is_loading());

        controller.resolve_exchange(Ok(ChatReply {
            response: "late".to_string(),
            session_id: None,
        }));

        let ids: Vec<u64> = controller.messages().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert!(!controller.is_loading());
    }
}
