use crate::api::{ApiError, ChatReply};

/// Internal application events for coordinating between components.
///
/// Network tasks run detached from the UI loop and report back through
/// these; the conversation manager drains them between frames.
#[derive(Debug)]
pub enum AppEvent {
    /// A health probe finished
    ProbeFinished(Result<(), ApiError>),

    /// A chat exchange resolved (reply or failure)
    ExchangeFinished(Result<ChatReply, ApiError>),

    /// The conversation clear request finished
    ClearFinished(Result<(), ApiError>),
}

/// Who authored a message in the thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

/// Reachability of the remote chat service, driven purely by the outcome
/// of the most recent network attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// Initial state, before the first probe resolves
    Checking,
    /// Last probe or exchange succeeded
    Connected,
    /// Last probe or exchange failed
    Disconnected,
}

impl ConnectionStatus {
    pub fn display_name(&self) -> &'static str {
        match self {
            ConnectionStatus::Checking => "Checking...",
            ConnectionStatus::Connected => "Connected",
            ConnectionStatus::Disconnected => "Disconnected",
        }
    }
}

/// A single message in the conversation thread.
///
/// Messages are append-only and never reordered; `id` is unique within a
/// conversation and increases in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: u64,
    pub text: String,
    pub sender: Sender,
    /// Local capture time, already formatted for display
    pub timestamp: String,
}
