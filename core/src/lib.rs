//! Domain core for the session-backed todo lists application.
//!
//! # Overview
//! Todos, todo lists, the per-session collection of lists, and the display
//! ordering rules. Nothing here performs I/O: the web layer loads plain
//! records from the session, rebuilds a `TodoLists` with
//! `TodoLists::from_records`, calls operations on it, and stores
//! `TodoLists::to_records` back.
//!
//! # Design
//! - Entities keep their fields private; ids are fixed at construction.
//! - The collection is passed explicitly to every operation. There is no
//!   global list of lists.
//! - Display ordering (`sort`) borrows and never reorders stored data.
//! - Records are separate plain types; converting them back into entities
//!   goes through `TryFrom`, which re-checks titles and id uniqueness.

pub mod collection;
pub mod error;
pub mod record;
pub mod sort;
pub mod todo;
pub mod todo_list;
pub mod validation;

pub use collection::TodoLists;
pub use error::{DomainError, ValidationError};
pub use record::{TodoListRecord, TodoRecord};
pub use sort::{compare_titles, sort_todo_lists, sort_todos};
pub use todo::{Todo, TodoId};
pub use todo_list::{ListId, TodoList};
pub use validation::{trim_title, validate_list_title, validate_title, TitleKind, MAX_TITLE_CHARS};
