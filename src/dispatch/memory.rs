use crate::models::{Message, ProviderId, ProviderMap};

/// Per-provider conversation transcripts.
///
/// Transcripts are never capped and live only as long as the session. When
/// disabled nothing is ever recorded and every call carries just the new question.
#[derive(Debug, Clone, Default)]
pub struct ConversationMemory {
    enabled: bool,
    transcripts: ProviderMap<Vec<Message>>,
}

impl ConversationMemory {
    pub fn new(enabled: bool) -> Self {
        Self { enabled, transcripts: ProviderMap::default() }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Messages to send for `question`: the transcript so far plus the new user turn
    pub fn outgoing(&self, provider: ProviderId, question: &str) -> Vec<Message> {
        let mut messages =
            if self.enabled { self.transcripts[provider].clone() } else { Vec::new() };
        messages.push(Message::user(question));
        messages
    }

    /// Append one user/assistant exchange after a successful reply
    pub fn record_exchange(&mut self, provider: ProviderId, question: &str, reply: &str) {
        if !self.enabled {
            return;
        }
        let transcript = &mut self.transcripts[provider];
        transcript.push(Message::user(question));
        transcript.push(Message::assistant(reply));
    }

    pub fn clear(&mut self, provider: ProviderId) {
        self.transcripts[provider].clear();
    }

    pub fn transcript(&self, provider: ProviderId) -> &[Message] {
        &self.transcripts[provider]
    }

    /// Remembered exchanges: one user plus one assistant turn count as one memory
    pub fn memory_count(&self, provider: ProviderId) -> usize {
        self.transcripts[provider].len() / 2
    }
}
