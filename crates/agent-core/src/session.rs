//! Thread Management
//!
//! Conversation histories keyed by a caller-chosen thread identifier.
//! Histories are append-only; appends to one thread are serialized, distinct
//! threads never contend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AgentError, Result};
use crate::message::{Message, Role};

/// Unique thread identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThreadId(String);

impl ThreadId {
    /// Generate a fresh random thread id
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ThreadId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Overview of a stored thread
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ThreadSummary {
    pub id: ThreadId,
    pub title: String,
    pub message_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Thread store trait for persistence
pub trait ThreadStore: Send + Sync {
    /// Full history of a thread; empty if the thread was never seen
    fn load(&self, id: &ThreadId) -> Result<Vec<Message>>;

    /// Append messages to a thread, creating it if needed
    fn append(&self, id: &ThreadId, messages: Vec<Message>) -> Result<()>;

    /// Summary of one thread
    fn summary(&self, id: &ThreadId) -> Result<Option<ThreadSummary>>;

    /// Most recently updated threads first
    fn list(&self, limit: usize) -> Result<Vec<ThreadSummary>>;
}

#[derive(Debug)]
struct ThreadSlot {
    messages: Vec<Message>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ThreadSlot {
    fn new() -> Self {
        let now = Utc::now();
        Self {
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn summary(&self, id: &ThreadId) -> ThreadSummary {
        ThreadSummary {
            id: id.clone(),
            title: title(id, &self.messages),
            message_count: self.messages.len(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Title from the first user message, or a short id fallback
fn title(id: &ThreadId, messages: &[Message]) -> String {
    messages
        .iter()
        .find(|m| m.role == Role::User)
        .map(|m| {
            let preview: String = m.content.chars().take(50).collect();
            if m.content.chars().count() > 50 {
                format!("{preview}...")
            } else {
                preview
            }
        })
        .unwrap_or_else(|| {
            let short: String = id.as_str().chars().take(8).collect();
            format!("Thread {short}")
        })
}

fn poisoned<T>(_: T) -> AgentError {
    AgentError::Session("thread store lock poisoned".into())
}

type Slot = Arc<Mutex<ThreadSlot>>;

/// In-memory thread store
#[derive(Default)]
pub struct MemoryThreadStore {
    threads: RwLock<HashMap<ThreadId, Slot>>,
}

impl MemoryThreadStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, id: &ThreadId) -> Result<Option<Slot>> {
        let threads = self.threads.read().map_err(poisoned)?;
        Ok(threads.get(id).cloned())
    }

    fn slot_or_create(&self, id: &ThreadId) -> Result<Slot> {
        if let Some(slot) = self.slot(id)? {
            return Ok(slot);
        }
        let mut threads = self.threads.write().map_err(poisoned)?;
        Ok(threads
            .entry(id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(ThreadSlot::new())))
            .clone())
    }
}

impl ThreadStore for MemoryThreadStore {
    fn load(&self, id: &ThreadId) -> Result<Vec<Message>> {
        match self.slot(id)? {
            Some(slot) => Ok(slot.lock().map_err(poisoned)?.messages.clone()),
            None => Ok(Vec::new()),
        }
    }

    fn append(&self, id: &ThreadId, messages: Vec<Message>) -> Result<()> {
        let slot = self.slot_or_create(id)?;
        let mut slot = slot.lock().map_err(poisoned)?;
        slot.messages.extend(messages);
        slot.updated_at = Utc::now();
        Ok(())
    }

    fn summary(&self, id: &ThreadId) -> Result<Option<ThreadSummary>> {
        match self.slot(id)? {
            Some(slot) => Ok(Some(slot.lock().map_err(poisoned)?.summary(id))),
            None => Ok(None),
        }
    }

    fn list(&self, limit: usize) -> Result<Vec<ThreadSummary>> {
        let slots: Vec<(ThreadId, Slot)> = {
            let threads = self.threads.read().map_err(poisoned)?;
            threads.iter().map(|(id, s)| (id.clone(), s.clone())).collect()
        };

        let mut result = slots
            .iter()
            .map(|(id, slot)| -> Result<ThreadSummary> {
                Ok(slot.lock().map_err(poisoned)?.summary(id))
            })
            .collect::<Result<Vec<_>>>()?;

        result.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        result.truncate(limit);
        Ok(result)
    }
}
