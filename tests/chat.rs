//! Tests for conversation management.
use ahash::AHashMap;
use flowport::chat::{Chat, ConversationManager, NEW_CHAT_TITLE, generate_chat_id, title_from};
use flowport::error::ChatError;
use chrono::{Duration, Utc};
use pretty_assertions::assert_eq;

#[test]
fn test_chat_ids_have_expected_shape() {
    let id = generate_chat_id();
    let parts: Vec<&str> = id.split('_').collect();
    assert_eq!(parts.len(), 3);
    assert_eq!(parts[0], "chat");
    assert!(parts[1].parse::<i64>().is_ok());
    assert_eq!(parts[2].len(), 9);
    assert!(
        parts[2]
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase())
    );
    assert_ne!(generate_chat_id(), generate_chat_id());
}

#[test]
fn test_title_is_truncated_to_fifty_chars() {
    assert_eq!(title_from("Blink an LED"), "Blink an LED");
    let long = "x".repeat(60);
    let title = title_from(&long);
    assert_eq!(title, format!("{}...", "x".repeat(50)));
    assert_eq!(title_from(&"é".repeat(50)), "é".repeat(50));
}

#[test]
fn test_current_chat_is_created_lazily() {
    let mut manager = ConversationManager::new();
    assert!(manager.is_empty());
    assert!(manager.current_chat().is_none());

    let id = manager.current_chat_id().to_string();
    assert_eq!(manager.len(), 1);
    assert_eq!(manager.current_chat_id(), id);
    assert_eq!(manager.current_chat().unwrap().title, NEW_CHAT_TITLE);
}

#[test]
fn test_first_user_message_sets_title() {
    let mut manager = ConversationManager::new();
    manager.add_message("Make a flow that polls an API every minute", true);
    manager.add_message("Here is a flow...", false);
    let chat = manager.add_message("Now add a debug node", true);

    assert_eq!(chat.title, "Make a flow that polls an API every minute");
    assert_eq!(chat.messages.len(), 3);
    assert_eq!(chat.user_message_count(), 2);
    assert_eq!(
        manager.last_user_message().unwrap().content,
        "Now add a debug node"
    );
}

#[test]
fn test_assistant_message_does_not_set_title() {
    let mut manager = ConversationManager::new();
    let chat = manager.add_message("Welcome!", false);
    assert_eq!(chat.title, NEW_CHAT_TITLE);
}

#[test]
fn test_switch_and_delete() {
    let mut manager = ConversationManager::new();
    let first = manager.start_new_chat();
    let second = manager.start_new_chat();
    assert_eq!(manager.current_chat_id(), second);

    manager.switch_to(&first).unwrap();
    assert_eq!(manager.current_chat_id(), first);
    assert_eq!(
        manager.switch_to("missing").unwrap_err(),
        ChatError::NotFound("missing".to_string())
    );

    manager.delete(&second).unwrap();
    assert_eq!(manager.current_chat_id(), first);
    assert_eq!(manager.len(), 1);

    manager.delete(&first).unwrap();
    assert_eq!(manager.len(), 1);
    assert_ne!(manager.current_chat_id(), first);
    assert!(manager.delete("missing").is_err());
}

#[test]
fn test_replace_history_picks_most_recent() {
    let now = Utc::now();
    let mut older = Chat::new();
    older.created = now - Duration::hours(2);
    let mut newer = Chat::new();
    newer.created = now - Duration::minutes(5);
    let newer_id = newer.id.clone();
    let older_id = older.id.clone();

    let mut loaded = AHashMap::new();
    loaded.insert(older.id.clone(), older);
    loaded.insert(newer.id.clone(), newer);

    let mut manager = ConversationManager::new();
    manager.replace_history(loaded);

    assert_eq!(manager.current_chat().unwrap().id, newer_id);
    let order: Vec<&str> = manager
        .chats_by_recency()
        .iter()
        .map(|c| c.id.as_str())
        .collect();
    assert_eq!(order, vec![newer_id.as_str(), older_id.as_str()]);
}
