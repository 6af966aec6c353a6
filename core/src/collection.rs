//! The collection of todo lists held by one session.
//!
//! # Design
//! `TodoLists` is rebuilt from records at the start of every request and
//! handed to the handlers explicitly. It owns the session's id counter, so
//! ids handed out to lists and todos are never reused, even after deletes.
//! All lookups by id go through `find_list_by_id` and `find_todo_by_id`.

use std::collections::HashSet;

use crate::error::DomainError;
use crate::record::TodoListRecord;
use crate::todo::{Todo, TodoId};
use crate::todo_list::{ListId, TodoList};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoLists {
    lists: Vec<TodoList>,
    next_id: u64,
}

impl Default for TodoLists {
    fn default() -> Self {
        Self::new()
    }
}

impl TodoLists {
    pub fn new() -> Self {
        Self {
            lists: Vec::new(),
            next_id: 1,
        }
    }

    /// Rebuild the collection from persisted records.
    ///
    /// `next_id` is the persisted counter; when absent, or when it would hand
    /// out an id already present, it is raised past the largest id in use.
    /// Records holding `u64::MAX` leave no room for that and are rejected.
    pub fn from_records(
        records: Vec<TodoListRecord>,
        next_id: Option<u64>,
    ) -> Result<Self, DomainError> {
        let mut seen = HashSet::new();
        let mut lists = Vec::with_capacity(records.len());
        for record in records {
            if !seen.insert(record.id) {
                return Err(DomainError::DuplicateId(record.id.get()));
            }
            lists.push(TodoList::try_from(record)?);
        }

        let max_id = lists
            .iter()
            .flat_map(|list| {
                std::iter::once(list.id().get()).chain(list.todos().iter().map(|t| t.id().get()))
            })
            .max()
            .unwrap_or(0);
        let after_max = max_id.checked_add(1).ok_or(DomainError::IdsExhausted)?;
        let next_id = next_id.unwrap_or(1).max(after_max);

        Ok(Self { lists, next_id })
    }

    pub fn to_records(&self) -> Vec<TodoListRecord> {
        self.lists.iter().map(TodoListRecord::from).collect()
    }

    /// The id the next created list or todo will receive.
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    /// Lists in creation order.
    pub fn lists(&self) -> &[TodoList] {
        &self.lists
    }

    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    /// Whether another list already uses `title`. The list `except` is
    /// skipped, so renaming a list to its current title is allowed.
    pub fn has_title(&self, title: &str, except: Option<ListId>) -> bool {
        self.lists
            .iter()
            .any(|list| Some(list.id()) != except && list.title() == title)
    }

    pub fn find_list_by_id(&self, id: ListId) -> Result<&TodoList, DomainError> {
        self.lists
            .iter()
            .find(|list| list.id() == id)
            .ok_or(DomainError::ListNotFound(id))
    }

    pub fn find_list_by_id_mut(&mut self, id: ListId) -> Result<&mut TodoList, DomainError> {
        self.lists
            .iter_mut()
            .find(|list| list.id() == id)
            .ok_or(DomainError::ListNotFound(id))
    }

    pub fn find_todo_by_id(&self, list_id: ListId, todo_id: TodoId) -> Result<&Todo, DomainError> {
        self.find_list_by_id(list_id)?
            .find_by_id(todo_id)
            .ok_or(DomainError::TodoNotFound {
                list: list_id,
                todo: todo_id,
            })
    }

    pub fn find_todo_by_id_mut(
        &mut self,
        list_id: ListId,
        todo_id: TodoId,
    ) -> Result<&mut Todo, DomainError> {
        self.find_list_by_id_mut(list_id)?
            .find_by_id_mut(todo_id)
            .ok_or(DomainError::TodoNotFound {
                list: list_id,
                todo: todo_id,
            })
    }

    /// Append a new empty list. The title must already be validated.
    pub fn create_list(&mut self, title: impl Into<String>) -> Result<&TodoList, DomainError> {
        let id = ListId::new(self.allocate_id()?);
        self.lists.push(TodoList::new(id, title));
        self.find_list_by_id(id)
    }

    /// Append a new undone todo to the list `list_id`.
    pub fn add_todo(
        &mut self,
        list_id: ListId,
        title: impl Into<String>,
    ) -> Result<&Todo, DomainError> {
        // resolve the list before consuming an id
        self.find_list_by_id(list_id)?;
        let id = TodoId::new(self.allocate_id()?);
        let list = self.find_list_by_id_mut(list_id)?;
        list.add(Todo::new(id, title));
        list.item_at(list.len() - 1)
    }

    /// Flip a todo's done flag.
    pub fn toggle_todo(&mut self, list_id: ListId, todo_id: TodoId) -> Result<&Todo, DomainError> {
        let todo = self.find_todo_by_id_mut(list_id, todo_id)?;
        todo.toggle();
        Ok(&*todo)
    }

    pub fn remove_todo(&mut self, list_id: ListId, todo_id: TodoId) -> Result<Todo, DomainError> {
        let list = self.find_list_by_id_mut(list_id)?;
        let todo = list.find_by_id(todo_id).ok_or(DomainError::TodoNotFound {
            list: list_id,
            todo: todo_id,
        })?;
        let index = list.find_index_of(todo).ok_or(DomainError::TodoNotFound {
            list: list_id,
            todo: todo_id,
        })?;
        list.remove_at(index)
    }

    pub fn complete_all(&mut self, list_id: ListId) -> Result<&TodoList, DomainError> {
        let list = self.find_list_by_id_mut(list_id)?;
        list.mark_all_done();
        Ok(&*list)
    }

    /// Rename a list. The title must already be validated and unique.
    pub fn rename_list(
        &mut self,
        list_id: ListId,
        title: impl Into<String>,
    ) -> Result<&TodoList, DomainError> {
        let list = self.find_list_by_id_mut(list_id)?;
        list.rename(title);
        Ok(&*list)
    }

    pub fn remove_list(&mut self, list_id: ListId) -> Result<TodoList, DomainError> {
        let index = self
            .lists
            .iter()
            .position(|list| list.id() == list_id)
            .ok_or(DomainError::ListNotFound(list_id))?;
        Ok(self.lists.remove(index))
    }

    fn allocate_id(&mut self) -> Result<u64, DomainError> {
        let id = self.next_id;
        self.next_id = id.checked_add(1).ok_or(DomainError::IdsExhausted)?;
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::TodoRecord;

    fn session() -> (TodoLists, ListId) {
        let mut lists = TodoLists::new();
        let id = lists.create_list("Groceries").unwrap().id();
        lists.add_todo(id, "Milk").unwrap();
        lists.add_todo(id, "Eggs").unwrap();
        (lists, id)
    }

    #[test]
    fn create_list_assigns_fresh_ids() {
        let mut lists = TodoLists::new();
        let a = lists.create_list("A").unwrap().id();
        let b = lists.create_list("B").unwrap().id();
        assert_ne!(a, b);
        assert_eq!(lists.len(), 2);
        assert!(lists.find_list_by_id(a).unwrap().is_empty());
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let mut lists = TodoLists::new();
        let first = lists.create_list("First").unwrap().id();
        lists.remove_list(first).unwrap();
        let second = lists.create_list("Second").unwrap().id();
        assert_ne!(first, second);
    }

    #[test]
    fn find_list_by_unknown_id_is_not_found() {
        let (lists, _) = session();
        assert_eq!(
            lists.find_list_by_id(ListId::new(999)).unwrap_err(),
            DomainError::ListNotFound(ListId::new(999))
        );
    }

    #[test]
    fn find_todo_distinguishes_missing_list_and_missing_todo() {
        let (lists, id) = session();
        assert!(matches!(
            lists.find_todo_by_id(ListId::new(999), TodoId::new(2)),
            Err(DomainError::ListNotFound(_))
        ));
        assert!(matches!(
            lists.find_todo_by_id(id, TodoId::new(999)),
            Err(DomainError::TodoNotFound { .. })
        ));
    }

    #[test]
    fn add_todo_to_unknown_list_consumes_no_id() {
        let (mut lists, _) = session();
        let before = lists.next_id();
        assert!(lists.add_todo(ListId::new(999), "x").is_err());
        assert_eq!(lists.next_id(), before);
    }

    #[test]
    fn toggle_flips_and_reports_todo() {
        let (mut lists, id) = session();
        let todo_id = lists.find_list_by_id(id).unwrap().todos()[0].id();
        assert!(lists.toggle_todo(id, todo_id).unwrap().is_done());
        assert!(!lists.toggle_todo(id, todo_id).unwrap().is_done());
    }

    #[test]
    fn remove_todo_removes_only_that_todo() {
        let (mut lists, id) = session();
        let milk = lists.find_list_by_id(id).unwrap().todos()[0].id();
        let removed = lists.remove_todo(id, milk).unwrap();
        assert_eq!(removed.title(), "Milk");
        let list = lists.find_list_by_id(id).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list.todos()[0].title(), "Eggs");
        assert!(lists.remove_todo(id, milk).is_err());
    }

    #[test]
    fn complete_all_marks_list_done() {
        let (mut lists, id) = session();
        assert!(lists.complete_all(id).unwrap().is_done());
        assert!(lists.complete_all(ListId::new(999)).is_err());
    }

    #[test]
    fn remove_list_uses_the_given_collection() {
        let (mut lists, id) = session();
        let removed = lists.remove_list(id).unwrap();
        assert_eq!(removed.title(), "Groceries");
        assert!(lists.is_empty());
        assert_eq!(
            lists.remove_list(id).unwrap_err(),
            DomainError::ListNotFound(id)
        );
    }

    #[test]
    fn has_title_can_skip_the_list_being_edited() {
        let (mut lists, id) = session();
        lists.create_list("Work").unwrap();
        assert!(lists.has_title("Groceries", None));
        assert!(!lists.has_title("Groceries", Some(id)));
        assert!(lists.has_title("Work", Some(id)));
        assert!(!lists.has_title("groceries", None));
    }

    #[test]
    fn rename_list_changes_title() {
        let (mut lists, id) = session();
        assert_eq!(lists.rename_list(id, "Food").unwrap().title(), "Food");
    }

    #[test]
    fn records_round_trip_with_counter() {
        let (mut lists, id) = session();
        lists.complete_all(id).unwrap();
        let rebuilt = TodoLists::from_records(lists.to_records(), Some(lists.next_id())).unwrap();
        assert_eq!(rebuilt, lists);
    }

    #[test]
    fn missing_counter_is_derived_from_records() {
        let records = vec![TodoListRecord {
            id: ListId::new(4),
            title: "Old".to_string(),
            todos: vec![TodoRecord {
                id: TodoId::new(9),
                title: "t".to_string(),
                done: true,
            }],
        }];
        let lists = TodoLists::from_records(records.clone(), None).unwrap();
        assert_eq!(lists.next_id(), 10);
        let lists = TodoLists::from_records(records, Some(2)).unwrap();
        assert_eq!(lists.next_id(), 10);
    }

    #[test]
    fn record_id_at_the_top_of_the_range_is_rejected() {
        let list = TodoListRecord {
            id: ListId::new(u64::MAX),
            title: "Full".to_string(),
            todos: Vec::new(),
        };
        assert_eq!(
            TodoLists::from_records(vec![list], None).unwrap_err(),
            DomainError::IdsExhausted
        );

        let todo_at_max = TodoListRecord {
            id: ListId::new(1),
            title: "Full".to_string(),
            todos: vec![TodoRecord {
                id: TodoId::new(u64::MAX),
                title: "last".to_string(),
                done: false,
            }],
        };
        assert_eq!(
            TodoLists::from_records(vec![todo_at_max], Some(2)).unwrap_err(),
            DomainError::IdsExhausted
        );
    }

    #[test]
    fn exhausted_counter_fails_instead_of_reusing_ids() {
        let mut lists = TodoLists::from_records(Vec::new(), Some(u64::MAX)).unwrap();
        assert_eq!(lists.create_list("One").unwrap_err(), DomainError::IdsExhausted);
        assert!(lists.is_empty());
        assert_eq!(lists.next_id(), u64::MAX);

        let mut lists = TodoLists::from_records(Vec::new(), Some(u64::MAX - 1)).unwrap();
        let id = lists.create_list("Last").unwrap().id();
        assert_eq!(id, ListId::new(u64::MAX - 1));
        assert_eq!(
            lists.add_todo(id, "no room").unwrap_err(),
            DomainError::IdsExhausted
        );
        assert!(lists.find_list_by_id(id).unwrap().is_empty());
    }

    #[test]
    fn duplicate_list_ids_are_rejected() {
        let record = TodoListRecord {
            id: ListId::new(1),
            title: "Twice".to_string(),
            todos: Vec::new(),
        };
        assert_eq!(
            TodoLists::from_records(vec![record.clone(), record], None).unwrap_err(),
            DomainError::DuplicateId(1)
        );
    }
}
