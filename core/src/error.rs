//! Error types for the todo domain.
//!
//! # Design
//! Lookups by id get dedicated variants so the web layer can turn them into a
//! 404 without inspecting messages. `ValidationError` keeps every failing
//! rule's message, in rule order, because the forms display all of them.

use std::fmt;

use thiserror::Error;

use crate::todo::TodoId;
use crate::todo_list::ListId;

/// Errors returned by domain operations and record reconstruction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// No list with this id exists in the collection.
    #[error("todo list {0} not found")]
    ListNotFound(ListId),

    /// The list exists but holds no todo with this id.
    #[error("todo {todo} not found in list {list}")]
    TodoNotFound { list: ListId, todo: TodoId },

    /// A positional operation was given an index past the end of the list.
    #[error("index {index} out of bounds for list of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// A title did not satisfy the title rules.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Persisted records used the same id twice.
    #[error("duplicate id {0} in session records")]
    DuplicateId(u64),

    /// The session's id counter cannot advance any further.
    #[error("no ids left to allocate in this session")]
    IdsExhausted,
}

/// One or more title rules failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct ValidationError {
    messages: Vec<String>,
}

impl ValidationError {
    pub fn new(messages: Vec<String>) -> Self {
        Self { messages }
    }

    /// User-facing messages, one per failed rule.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation failed: {}", self.messages.join(" "))
    }
}
