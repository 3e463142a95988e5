//! Text View
//!
//! Renders store snapshots for the terminal: a sidebar of collection
//! names and a panel showing one collection's JSON.

use crate::store::{EntryStatus, StoreSnapshot};
use crate::theme::Theme;

/// Sidebar listing every collection with its load state
pub fn render_sidebar(snapshot: &StoreSnapshot, theme: Theme) -> String {
    let mut out = String::from("Collections\n");

    if snapshot.names.is_empty() {
        out.push_str("  (no collections)\n");
    }

    // Column width in characters; `{:<width$}` pads by chars too
    let width = snapshot
        .names
        .iter()
        .map(|n| n.chars().count())
        .max()
        .unwrap_or(0);
    for name in &snapshot.names {
        let marker = if snapshot.is_active(name) { '>' } else { ' ' };
        out.push_str(&format!(
            "{} {:<width$}  {}\n",
            marker,
            name,
            status_label(snapshot, name),
            width = width
        ));
    }

    out.push_str(&format!("{}\nTheme: {}\n", "-".repeat(width.max(11) + 2), theme));
    out
}

/// Panel for `name`, or for the active collection when `name` is `None`
pub fn render_panel(snapshot: &StoreSnapshot, name: Option<&str>) -> String {
    let Some(name) = name.or(snapshot.active.as_deref()) else {
        return "No collection selected\n".to_string();
    };

    if let Some(payload) = snapshot.payload(name) {
        let body = payload
            .to_pretty_json()
            .unwrap_or_else(|e| format!("(cannot render {}: {})", name, e));
        return format!("{}\n{}\n", name, body);
    }

    match snapshot.status(name) {
        Some(EntryStatus::Loading) => format!("({} is loading)\n", name),
        Some(EntryStatus::Failed(error)) => format!("({} failed to load: {})\n", name, error),
        _ => format!("({} has not been loaded)\n", name),
    }
}

/// Error banner for a failed refresh, if any
pub fn render_error(snapshot: &StoreSnapshot) -> Option<String> {
    snapshot
        .last_error
        .as_ref()
        .map(|error| format!("Refresh failed: {}\n", error))
}

fn status_label(snapshot: &StoreSnapshot, name: &str) -> String {
    match snapshot.status(name) {
        Some(EntryStatus::Loading) => "[loading]".to_string(),
        Some(EntryStatus::Failed(_)) => "[failed]".to_string(),
        Some(EntryStatus::Present) => match snapshot.payload(name) {
            Some(payload) if !payload.is_empty() => {
                let noun = if payload.len() == 1 { "item" } else { "items" };
                format!("[{}, {} {}]", payload.kind(), payload.len(), noun)
            }
            Some(payload) => format!("[{}]", payload.kind()),
            None => "[loaded]".to_string(),
        },
        None => "[not loaded]".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::CollectionPayload;

    fn snapshot() -> StoreSnapshot {
        let mut snapshot = StoreSnapshot {
            names: vec!["users".to_string(), "orders".to_string()],
            active: Some("users".to_string()),
            ..StoreSnapshot::default()
        };
        snapshot.collections.insert(
            "users".to_string(),
            CollectionPayload::from_json(r#"[{"id":1}]"#).unwrap(),
        );
        snapshot
            .status
            .insert("users".to_string(), EntryStatus::Present);
        snapshot.status.insert(
            "orders".to_string(),
            EntryStatus::Failed("Collection not found: orders".to_string()),
        );
        snapshot
    }

    #[test]
    fn test_sidebar_marks_active() {
        let text = render_sidebar(&snapshot(), Theme::Light);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Collections");
        assert_eq!(lines[1], "> users   [list, 1 item]");
        assert_eq!(lines[2], "  orders  [failed]");
        assert_eq!(lines.last(), Some(&"Theme: Light"));
    }

    #[test]
    fn test_sidebar_aligns_non_ascii_names() {
        let mut snapshot = StoreSnapshot {
            names: vec!["användare".to_string(), "orders".to_string()],
            ..StoreSnapshot::default()
        };
        snapshot.collections.insert(
            "orders".to_string(),
            CollectionPayload::from_json(r#"{"a":1,"b":2}"#).unwrap(),
        );
        snapshot
            .status
            .insert("orders".to_string(), EntryStatus::Present);

        let text = render_sidebar(&snapshot, Theme::Dark);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[1], "  användare  [not loaded]");
        assert_eq!(lines[2], "  orders     [map, 2 items]");

        let column = |line: &str| line.chars().position(|c| c == '[');
        assert_eq!(column(lines[1]), column(lines[2]));
    }

    #[test]
    fn test_sidebar_empty() {
        let text = render_sidebar(&StoreSnapshot::default(), Theme::Dark);
        assert!(text.contains("(no collections)"));
        assert!(text.ends_with("Theme: Dark\n"));
    }

    #[test]
    fn test_panel_shows_active_payload() {
        let text = render_panel(&snapshot(), None);
        assert_eq!(text, "users\n[\n  {\n    \"id\": 1\n  }\n]\n");
    }

    #[test]
    fn test_panel_placeholders() {
        let snapshot = snapshot();
        assert_eq!(
            render_panel(&snapshot, Some("orders")),
            "(orders failed to load: Collection not found: orders)\n"
        );
        assert_eq!(
            render_panel(&snapshot, Some("other")),
            "(other has not been loaded)\n"
        );
        assert_eq!(
            render_panel(&StoreSnapshot::default(), None),
            "No collection selected\n"
        );
    }

    #[test]
    fn test_error_banner() {
        let mut snapshot = snapshot();
        assert!(render_error(&snapshot).is_none());
        snapshot.last_error = Some("Transport error: refused".to_string());
        assert_eq!(
            render_error(&snapshot).unwrap(),
            "Refresh failed: Transport error: refused\n"
        );
    }
}
