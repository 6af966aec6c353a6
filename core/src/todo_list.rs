//! An ordered, titled collection of todos.
//!
//! # Design
//! `todos` keeps insertion order; display ordering is derived on demand by
//! the `sort` module and never written back. Title uniqueness across lists is
//! the caller's concern (see `validation`), so nothing here checks it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::todo::{Todo, TodoId};

/// Identifier of a todo list, unique within its session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListId(u64);

impl ListId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ListId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoList {
    id: ListId,
    title: String,
    todos: Vec<Todo>,
}

impl TodoList {
    pub fn new(id: ListId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            todos: Vec::new(),
        }
    }

    pub(crate) fn with_todos(id: ListId, title: String, todos: Vec<Todo>) -> Self {
        Self { id, title, todos }
    }

    pub fn id(&self) -> ListId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn rename(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Todos in insertion order.
    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    pub fn len(&self) -> usize {
        self.todos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.todos.is_empty()
    }

    /// Append a todo. No duplicate check is made.
    pub fn add(&mut self, todo: Todo) {
        self.todos.push(todo);
    }

    pub fn item_at(&self, index: usize) -> Result<&Todo, DomainError> {
        self.todos.get(index).ok_or(DomainError::IndexOutOfBounds {
            index,
            len: self.todos.len(),
        })
    }

    /// Remove and return the todo at `index`, shifting later todos left.
    pub fn remove_at(&mut self, index: usize) -> Result<Todo, DomainError> {
        self.check_index(index)?;
        Ok(self.todos.remove(index))
    }

    /// Position of `todo` in this list, matched by id.
    pub fn find_index_of(&self, todo: &Todo) -> Option<usize> {
        self.todos.iter().position(|t| t.id() == todo.id())
    }

    pub fn find_by_id(&self, id: TodoId) -> Option<&Todo> {
        self.todos.iter().find(|t| t.id() == id)
    }

    pub fn find_by_id_mut(&mut self, id: TodoId) -> Option<&mut Todo> {
        self.todos.iter_mut().find(|t| t.id() == id)
    }

    pub fn mark_all_done(&mut self) {
        self.todos.iter_mut().for_each(Todo::mark_done);
    }

    /// True when the list has at least one todo and all of them are done.
    pub fn is_done(&self) -> bool {
        !self.todos.is_empty() && self.todos.iter().all(Todo::is_done)
    }

    fn check_index(&self, index: usize) -> Result<(), DomainError> {
        if index < self.todos.len() {
            Ok(())
        } else {
            Err(DomainError::IndexOutOfBounds {
                index,
                len: self.todos.len(),
            })
        }
    }
}
