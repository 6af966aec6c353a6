//! Title rules shared by the forms and by record reconstruction.
//!
//! Titles are trimmed, must be 1 to 100 characters long, and list titles must
//! not repeat another list's title. Every failing rule contributes its own
//! message; messages come out in rule order.

use crate::error::ValidationError;

pub const MAX_TITLE_CHARS: usize = 100;

/// Which form a title comes from. Each form words its messages differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleKind {
    NewList,
    EditList,
    Todo,
}

impl TitleKind {
    fn too_short(self) -> &'static str {
        match self {
            TitleKind::NewList => "The list title is required.",
            TitleKind::EditList | TitleKind::Todo => "Title should be at least 1 char long.",
        }
    }

    fn too_long(self) -> &'static str {
        match self {
            TitleKind::NewList => "List title must be between 1 and 100 characters.",
            TitleKind::EditList | TitleKind::Todo => "Title should be under 100 char long.",
        }
    }
}

pub const DUPLICATE_LIST_TITLE: &str = "List title must be unique.";

/// Strip surrounding whitespace, counting U+FEFF (byte-order mark) as
/// whitespace the way browsers' `String.prototype.trim` does.
pub fn trim_title(raw: &str) -> &str {
    raw.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}')
}

/// Trim `raw` and check its length. Returns the trimmed title.
pub fn validate_title(raw: &str, kind: TitleKind) -> Result<String, ValidationError> {
    let title = trim_title(raw);
    let messages = length_messages(title, kind);
    if messages.is_empty() {
        Ok(title.to_string())
    } else {
        Err(ValidationError::new(messages))
    }
}

/// Trim `raw`, check its length, and reject it when `is_taken` reports the
/// trimmed title as already used by another list.
pub fn validate_list_title(
    raw: &str,
    kind: TitleKind,
    is_taken: impl FnOnce(&str) -> bool,
) -> Result<String, ValidationError> {
    let title = trim_title(raw);
    let mut messages = length_messages(title, kind);
    if is_taken(title) {
        messages.push(DUPLICATE_LIST_TITLE.to_string());
    }
    if messages.is_empty() {
        Ok(title.to_string())
    } else {
        Err(ValidationError::new(messages))
    }
}

fn length_messages(title: &str, kind: TitleKind) -> Vec<String> {
    let len = title.chars().count();
    let mut messages = Vec::new();
    if len < 1 {
        messages.push(kind.too_short().to_string());
    }
    if len > MAX_TITLE_CHARS {
        messages.push(kind.too_long().to_string());
    }
    messages
}
