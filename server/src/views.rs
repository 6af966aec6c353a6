//! HTML pages rendered from templates compiled into the binary.

use axum::response::Html;
use minijinja::{context, Environment};
use serde::Serialize;
use todos_core::{sort_todo_lists, sort_todos, Todo, TodoList, TodoLists};

use crate::error::AppError;
use crate::flash::Flash;

const TEMPLATES: &[(&str, &str)] = &[
    ("layout.html", include_str!("../templates/layout.html")),
    ("lists.html", include_str!("../templates/lists.html")),
    ("new_list.html", include_str!("../templates/new_list.html")),
    ("list.html", include_str!("../templates/list.html")),
    ("edit_list.html", include_str!("../templates/edit_list.html")),
];

#[derive(Debug, Serialize)]
struct ListView<'a> {
    id: u64,
    title: &'a str,
    done: bool,
    todo_count: usize,
    remaining: usize,
}

impl<'a> From<&'a TodoList> for ListView<'a> {
    fn from(list: &'a TodoList) -> Self {
        Self {
            id: list.id().get(),
            title: list.title(),
            done: list.is_done(),
            todo_count: list.len(),
            remaining: list.todos().iter().filter(|t| !t.is_done()).count(),
        }
    }
}

#[derive(Debug, Serialize)]
struct TodoView<'a> {
    id: u64,
    title: &'a str,
    done: bool,
}

impl<'a> From<&'a Todo> for TodoView<'a> {
    fn from(todo: &'a Todo) -> Self {
        Self {
            id: todo.id().get(),
            title: todo.title(),
            done: todo.is_done(),
        }
    }
}

pub struct Views {
    env: Environment<'static>,
}

impl Views {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        for &(name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }
        Ok(Self { env })
    }

    fn render(&self, name: &str, ctx: minijinja::Value) -> Result<Html<String>, AppError> {
        let html = self.env.get_template(name)?.render(ctx)?;
        Ok(Html(html))
    }

    /// All lists, outstanding ones first.
    pub fn lists_page(&self, lists: &TodoLists, flash: Vec<Flash>) -> Result<Html<String>, AppError> {
        let lists: Vec<ListView> = sort_todo_lists(lists.lists())
            .into_iter()
            .map(ListView::from)
            .collect();
        self.render("lists.html", context! { lists, flash })
    }

    pub fn new_list_page(
        &self,
        todo_list_title: &str,
        flash: Vec<Flash>,
    ) -> Result<Html<String>, AppError> {
        self.render("new_list.html", context! { todo_list_title, flash })
    }

    /// One list with its todos, outstanding ones first.
    pub fn list_page(
        &self,
        list: &TodoList,
        todo_title: &str,
        flash: Vec<Flash>,
    ) -> Result<Html<String>, AppError> {
        let todos: Vec<TodoView> = sort_todos(list).into_iter().map(TodoView::from).collect();
        self.render(
            "list.html",
            context! { list => ListView::from(list), todos, todo_title, flash },
        )
    }

    pub fn edit_list_page(
        &self,
        list: &TodoList,
        todo_list_title: &str,
        flash: Vec<Flash>,
    ) -> Result<Html<String>, AppError> {
        self.render(
            "edit_list.html",
            context! { list => ListView::from(list), todo_list_title, flash },
        )
    }
}
