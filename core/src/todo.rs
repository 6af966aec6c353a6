//! A single todo item.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a todo, unique within its session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(u64);

impl TodoId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A task with a title and a done flag.
///
/// The id is fixed at construction; only the done flag changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Todo {
    id: TodoId,
    title: String,
    done: bool,
}

impl Todo {
    /// Create an undone todo. The title is expected to be validated already.
    pub fn new(id: TodoId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            done: false,
        }
    }

    pub(crate) fn with_status(id: TodoId, title: String, done: bool) -> Self {
        Self { id, title, done }
    }

    pub fn id(&self) -> TodoId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn mark_done(&mut self) {
        self.done = true;
    }

    pub fn mark_undone(&mut self) {
        self.done = false;
    }

    /// Flip the done flag and return the new state.
    pub fn toggle(&mut self) -> bool {
        self.done = !self.done;
        self.done
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_todo_is_not_done() {
        let todo = Todo::new(TodoId::new(1), "Buy milk");
        assert_eq!(todo.id(), TodoId::new(1));
        assert_eq!(todo.title(), "Buy milk");
        assert!(!todo.is_done());
    }

    #[test]
    fn mark_done_and_undone_are_idempotent() {
        let mut todo = Todo::new(TodoId::new(1), "Walk dog");
        todo.mark_done();
        todo.mark_done();
        assert!(todo.is_done());
        todo.mark_undone();
        todo.mark_undone();
        assert!(!todo.is_done());
    }

    #[test]
    fn toggle_returns_new_state() {
        let mut todo = Todo::new(TodoId::new(1), "Call mom");
        assert!(todo.toggle());
        assert!(todo.is_done());
        assert!(!todo.toggle());
        assert!(!todo.is_done());
    }
}
