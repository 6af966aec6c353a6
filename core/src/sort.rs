//! Display ordering for lists and todos.
//!
//! Outstanding items come first, completed ones after; within each group
//! items are ordered by title, ignoring case. Equal titles keep their input
//! order. These functions borrow their input and return a new ordering, so
//! the stored insertion order is never touched.

use std::cmp::Ordering;

use crate::todo::Todo;
use crate::todo_list::TodoList;

/// Anything with a title and a completion status can be display-sorted.
pub trait Sortable {
    fn sort_title(&self) -> &str;
    fn sort_is_done(&self) -> bool;
}

impl Sortable for Todo {
    fn sort_title(&self) -> &str {
        self.title()
    }

    fn sort_is_done(&self) -> bool {
        self.is_done()
    }
}

impl Sortable for TodoList {
    fn sort_title(&self) -> &str {
        self.title()
    }

    fn sort_is_done(&self) -> bool {
        self.is_done()
    }
}

/// Compare two titles after lowercasing both.
pub fn compare_titles(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// Undone items, then done items, each group sorted by title.
pub fn sort_by_status_and_title<'a, T, I>(items: I) -> Vec<&'a T>
where
    T: Sortable + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let (mut done, mut undone): (Vec<&T>, Vec<&T>) =
        items.into_iter().partition(|item| item.sort_is_done());
    // sort_by is stable, so equal titles keep input order
    undone.sort_by(|a, b| compare_titles(a.sort_title(), b.sort_title()));
    done.sort_by(|a, b| compare_titles(a.sort_title(), b.sort_title()));
    undone.extend(done);
    undone
}

pub fn sort_todo_lists(lists: &[TodoList]) -> Vec<&TodoList> {
    sort_by_status_and_title(lists)
}

pub fn sort_todos(todo_list: &TodoList) -> Vec<&Todo> {
    sort_by_status_and_title(todo_list.todos())
}
