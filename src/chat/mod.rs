//! Conversation state owned by an explicit manager instead of ambient globals.

use crate::error::ChatError;
use ahash::AHashMap;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const NEW_CHAT_TITLE: &str = "New Chat";
const TITLE_CHARS: usize = 50;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub content: String,
    pub is_user: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    pub created: DateTime<Utc>,
    /// Name of the file this chat was loaded from or last saved to.
    #[serde(skip)]
    pub file: Option<String>,
}

impl Chat {
    pub fn new() -> Self {
        Self {
            id: generate_chat_id(),
            title: NEW_CHAT_TITLE.to_string(),
            messages: Vec::new(),
            created: Utc::now(),
            file: None,
        }
    }

    pub fn user_message_count(&self) -> usize {
        self.messages.iter().filter(|m| m.is_user).count()
    }
}

impl Default for Chat {
    fn default() -> Self {
        Self::new()
    }
}

/// `chat_<unix millis>_<9 base36 chars>`
pub fn generate_chat_id() -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..9)
        .map(|_| BASE36[rng.random_range(0..BASE36.len())] as char)
        .collect();
    format!("chat_{}_{}", Utc::now().timestamp_millis(), suffix)
}

/// Title derived from the first user message.
pub fn title_from(content: &str) -> String {
    let mut title: String = content.chars().take(TITLE_CHARS).collect();
    if content.chars().count() > TITLE_CHARS {
        title.push_str("...");
    }
    title
}

/// Owns every known conversation and which one is current.
#[derive(Debug, Default)]
pub struct ConversationManager {
    chats: AHashMap<String, Chat>,
    current: Option<String>,
}

impl ConversationManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id of the current chat, creating an empty one if there is none.
    pub fn current_chat_id(&mut self) -> &str {
        if self.current.is_none() {
            self.start_new_chat();
        }
        self.current.as_deref().unwrap_or_default()
    }

    pub fn current_chat(&self) -> Option<&Chat> {
        self.current.as_ref().and_then(|id| self.chats.get(id))
    }

    pub fn chat(&self, id: &str) -> Option<&Chat> {
        self.chats.get(id)
    }

    pub fn len(&self) -> usize {
        self.chats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chats.is_empty()
    }

    /// Creates an empty chat and makes it current.
    pub fn start_new_chat(&mut self) -> String {
        let chat = Chat::new();
        let id = chat.id.clone();
        debug!(chat = %id, "started new chat");
        self.chats.insert(id.clone(), chat);
        self.current = Some(id.clone());
        id
    }

    pub fn switch_to(&mut self, id: &str) -> Result<&Chat, ChatError> {
        let chat = self
            .chats
            .get(id)
            .ok_or_else(|| ChatError::NotFound(id.to_string()))?;
        self.current = Some(id.to_string());
        Ok(chat)
    }

    /// Removes a chat. Deleting the current chat starts a fresh one.
    pub fn delete(&mut self, id: &str) -> Result<Chat, ChatError> {
        let chat = self
            .chats
            .remove(id)
            .ok_or_else(|| ChatError::NotFound(id.to_string()))?;
        if self.current.as_deref() == Some(id) {
            self.start_new_chat();
        }
        Ok(chat)
    }

    /// Appends a message to the current chat and returns that chat.
    pub fn add_message(&mut self, content: &str, is_user: bool) -> &Chat {
        let id = self.current_chat_id().to_string();
        let chat = self.chats.entry(id).or_default();
        chat.messages.push(ChatMessage {
            content: content.to_string(),
            is_user,
            timestamp: Utc::now(),
        });
        if is_user && chat.user_message_count() == 1 {
            chat.title = title_from(content);
        }
        chat
    }

    /// Adopts chats loaded from storage. If no chat is current, the most recently
    /// created one becomes current.
    pub fn replace_history(&mut self, chats: AHashMap<String, Chat>) {
        self.chats = chats;
        if let Some(current) = &self.current {
            if !self.chats.contains_key(current) {
                self.current = None;
            }
        }
        if self.current.is_none() {
            let latest = self.chats_by_recency().first().map(|c| c.id.clone());
            self.current = latest;
        }
    }

    /// Newest first.
    pub fn chats_by_recency(&self) -> Vec<&Chat> {
        let mut chats: Vec<&Chat> = self.chats.values().collect();
        chats.sort_by(|a, b| b.created.cmp(&a.created).then_with(|| a.id.cmp(&b.id)));
        chats
    }

    /// The last thing the user said in the current chat, for retrying a reply.
    pub fn last_user_message(&self) -> Option<&ChatMessage> {
        self.current_chat()?
            .messages
            .iter()
            .rev()
            .find(|m| m.is_user)
    }

    pub fn chat_mut(&mut self, id: &str) -> Option<&mut Chat> {
        self.chats.get_mut(id)
    }
}
