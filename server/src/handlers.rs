//! Route handlers.
//!
//! Every handler works on the session's `TodoLists` through the
//! `SessionHandle` the session middleware put into the request. Mutations
//! end in a redirect with a flash message; failed validation re-renders the
//! form with the messages and the value the user entered.

use axum::{
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
    Extension, Form,
};
use serde::Deserialize;
use todos_core::{
    trim_title, validate_list_title, validate_title, ListId, TitleKind, TodoId, ValidationError,
};

use crate::error::AppError;
use crate::flash::Flash;
use crate::session::{Session, SessionHandle};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ListTitleForm {
    #[serde(rename = "todoListTitle", default)]
    pub todo_list_title: String,
}

#[derive(Debug, Deserialize)]
pub struct TodoTitleForm {
    #[serde(rename = "todoTitle", default)]
    pub todo_title: String,
}

/// Path segments that are not numbers name nothing, so they are not found.
fn parse_list_id(raw: &str) -> Result<ListId, AppError> {
    raw.parse().map(ListId::new).map_err(|_| AppError::NotFound)
}

fn parse_todo_id(raw: &str) -> Result<TodoId, AppError> {
    raw.parse().map(TodoId::new).map_err(|_| AppError::NotFound)
}

fn flash_errors(session: &mut Session, errors: &ValidationError) {
    for message in errors.messages() {
        session.flash(Flash::error(message.clone()));
    }
}

fn redirect_to_list(id: ListId) -> Response {
    Redirect::to(&format!("/lists/{id}")).into_response()
}

pub async fn index() -> Redirect {
    Redirect::to("/lists")
}

pub async fn show_lists(
    State(state): State<AppState>,
    Extension(session): Extension<SessionHandle>,
) -> Result<Html<String>, AppError> {
    let mut session = session.lock().await;
    let flash = session.take_flash();
    state.views.lists_page(session.lists(), flash)
}

pub async fn new_list(
    State(state): State<AppState>,
    Extension(session): Extension<SessionHandle>,
) -> Result<Html<String>, AppError> {
    let mut session = session.lock().await;
    let flash = session.take_flash();
    state.views.new_list_page("", flash)
}

pub async fn create_list(
    State(state): State<AppState>,
    Extension(session): Extension<SessionHandle>,
    Form(form): Form<ListTitleForm>,
) -> Result<Response, AppError> {
    let mut session = session.lock().await;
    let validated = validate_list_title(&form.todo_list_title, TitleKind::NewList, |title| {
        session.lists().has_title(title, None)
    });
    match validated {
        Ok(title) => {
            let list = session.lists_mut().create_list(title)?;
            tracing::debug!(list = %list.id(), "todo list created");
            session.flash(Flash::success("The todo list has been created."));
            Ok(Redirect::to("/lists").into_response())
        }
        Err(errors) => {
            flash_errors(&mut session, &errors);
            let flash = session.take_flash();
            let page = state
                .views
                .new_list_page(trim_title(&form.todo_list_title), flash)?;
            Ok(page.into_response())
        }
    }
}

pub async fn show_list(
    State(state): State<AppState>,
    Extension(session): Extension<SessionHandle>,
    Path(list_id): Path<String>,
) -> Result<Html<String>, AppError> {
    let list_id = parse_list_id(&list_id)?;
    let mut session = session.lock().await;
    let flash = session.take_flash();
    let list = session.lists().find_list_by_id(list_id)?;
    state.views.list_page(list, "", flash)
}

pub async fn create_todo(
    State(state): State<AppState>,
    Extension(session): Extension<SessionHandle>,
    Path(list_id): Path<String>,
    Form(form): Form<TodoTitleForm>,
) -> Result<Response, AppError> {
    let list_id = parse_list_id(&list_id)?;
    let mut session = session.lock().await;
    session.lists().find_list_by_id(list_id)?;

    match validate_title(&form.todo_title, TitleKind::Todo) {
        Ok(title) => {
            session.lists_mut().add_todo(list_id, title)?;
            session.flash(Flash::success("The todo has been created."));
            Ok(redirect_to_list(list_id))
        }
        Err(errors) => {
            flash_errors(&mut session, &errors);
            let flash = session.take_flash();
            let list = session.lists().find_list_by_id(list_id)?;
            let page = state
                .views
                .list_page(list, trim_title(&form.todo_title), flash)?;
            Ok(page.into_response())
        }
    }
}

pub async fn toggle_todo(
    Extension(session): Extension<SessionHandle>,
    Path((list_id, todo_id)): Path<(String, String)>,
) -> Result<Response, AppError> {
    let list_id = parse_list_id(&list_id)?;
    let todo_id = parse_todo_id(&todo_id)?;
    let mut session = session.lock().await;

    let todo = session.lists_mut().toggle_todo(list_id, todo_id)?;
    let message = if todo.is_done() {
        format!("\"{}\" marked as done.", todo.title())
    } else {
        format!("\"{}\" marked as NOT done.", todo.title())
    };
    session.flash(Flash::success(message));
    Ok(redirect_to_list(list_id))
}

pub async fn destroy_todo(
    Extension(session): Extension<SessionHandle>,
    Path((list_id, todo_id)): Path<(String, String)>,
) -> Result<Response, AppError> {
    let list_id = parse_list_id(&list_id)?;
    let todo_id = parse_todo_id(&todo_id)?;
    let mut session = session.lock().await;

    let removed = session.lists_mut().remove_todo(list_id, todo_id)?;
    session.flash(Flash::success(format!("{} was removed.", removed.title())));
    Ok(redirect_to_list(list_id))
}

pub async fn complete_all(
    Extension(session): Extension<SessionHandle>,
    Path(list_id): Path<String>,
) -> Result<Response, AppError> {
    let list_id = parse_list_id(&list_id)?;
    let mut session = session.lock().await;

    session.lists_mut().complete_all(list_id)?;
    session.flash(Flash::success("All tasks in this list are marked done."));
    Ok(redirect_to_list(list_id))
}

pub async fn edit_list(
    State(state): State<AppState>,
    Extension(session): Extension<SessionHandle>,
    Path(list_id): Path<String>,
) -> Result<Html<String>, AppError> {
    let list_id = parse_list_id(&list_id)?;
    let mut session = session.lock().await;
    let flash = session.take_flash();
    let list = session.lists().find_list_by_id(list_id)?;
    state.views.edit_list_page(list, list.title(), flash)
}

pub async fn update_list(
    State(state): State<AppState>,
    Extension(session): Extension<SessionHandle>,
    Path(list_id): Path<String>,
    Form(form): Form<ListTitleForm>,
) -> Result<Response, AppError> {
    let list_id = parse_list_id(&list_id)?;
    let mut session = session.lock().await;
    session.lists().find_list_by_id(list_id)?;

    let validated = validate_list_title(&form.todo_list_title, TitleKind::EditList, |title| {
        session.lists().has_title(title, Some(list_id))
    });
    match validated {
        Ok(title) => {
            session.lists_mut().rename_list(list_id, title)?;
            session.flash(Flash::success("Todo List has been updated."));
            Ok(redirect_to_list(list_id))
        }
        Err(errors) => {
            flash_errors(&mut session, &errors);
            let flash = session.take_flash();
            let list = session.lists().find_list_by_id(list_id)?;
            let page = state
                .views
                .edit_list_page(list, trim_title(&form.todo_list_title), flash)?;
            Ok(page.into_response())
        }
    }
}

pub async fn destroy_list(
    Extension(session): Extension<SessionHandle>,
    Path(list_id): Path<String>,
) -> Result<Response, AppError> {
    let list_id = parse_list_id(&list_id)?;
    let mut session = session.lock().await;

    let removed = session.lists_mut().remove_list(list_id)?;
    tracing::debug!(list = %list_id, "todo list deleted");
    session.flash(Flash::success(format!(
        "Todo List \"{}\" has been deleted.",
        removed.title()
    )));
    Ok(Redirect::to("/lists").into_response())
}

pub async fn not_found() -> AppError {
    AppError::NotFound
}
