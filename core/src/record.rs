//! Plain records persisted between requests, and their typed counterparts.
//!
//! # Design
//! Sessions store only these records. `TryFrom<TodoListRecord>` is the one
//! way back to a live `TodoList`: it re-checks titles and todo-id uniqueness
//! so a tampered or stale record surfaces as an error instead of an entity
//! that breaks its own invariants.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::todo::{Todo, TodoId};
use crate::todo_list::{ListId, TodoList};
use crate::validation::{validate_title, TitleKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoRecord {
    pub id: TodoId,
    pub title: String,
    #[serde(default)]
    pub done: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoListRecord {
    pub id: ListId,
    pub title: String,
    #[serde(default)]
    pub todos: Vec<TodoRecord>,
}

impl From<&Todo> for TodoRecord {
    fn from(todo: &Todo) -> Self {
        Self {
            id: todo.id(),
            title: todo.title().to_string(),
            done: todo.is_done(),
        }
    }
}

impl From<&TodoList> for TodoListRecord {
    fn from(list: &TodoList) -> Self {
        Self {
            id: list.id(),
            title: list.title().to_string(),
            todos: list.todos().iter().map(TodoRecord::from).collect(),
        }
    }
}

impl TryFrom<TodoRecord> for Todo {
    type Error = DomainError;

    fn try_from(record: TodoRecord) -> Result<Self, Self::Error> {
        let title = validate_title(&record.title, TitleKind::Todo)?;
        Ok(Todo::with_status(record.id, title, record.done))
    }
}

impl TryFrom<TodoListRecord> for TodoList {
    type Error = DomainError;

    fn try_from(record: TodoListRecord) -> Result<Self, Self::Error> {
        let title = validate_title(&record.title, TitleKind::EditList)?;
        let mut seen = HashSet::with_capacity(record.todos.len());
        let mut todos = Vec::with_capacity(record.todos.len());
        for todo in record.todos {
            if !seen.insert(todo.id) {
                return Err(DomainError::DuplicateId(todo.id.get()));
            }
            todos.push(Todo::try_from(todo)?);
        }
        Ok(TodoList::with_todos(record.id, title, todos))
    }
}
