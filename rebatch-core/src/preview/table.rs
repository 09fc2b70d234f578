use super::{display_path, PreviewRow};
use comfy_table::{Cell, Color, ContentArrangement, Table};
use std::io::{self, IsTerminal};

/// Render preview rows as a two-column table
pub fn render_table(rows: &[PreviewRow], use_color: bool) -> String {
    let mut table = Table::new();

    if io::stdout().is_terminal() {
        table.set_content_arrangement(ContentArrangement::Dynamic);
    } else {
        table.set_content_arrangement(ContentArrangement::Disabled);
    }

    if use_color {
        table.enforce_styling();
        table.set_header(vec![
            Cell::new("Original").fg(Color::Cyan),
            Cell::new("New name").fg(Color::Cyan),
        ]);
    } else {
        table.set_header(vec!["Original", "New name"]);
    }

    for row in rows {
        let from = display_path(&row.from);
        let (text, color) = match (&row.to, &row.error) {
            (_, Some(error)) => (format!("error: {}", error), Color::Red),
            (Some(_), None) if row.is_unchanged() => ("(unchanged)".to_string(), Color::DarkGrey),
            (Some(to), None) => (display_path(to), Color::Green),
            (None, None) => (String::new(), Color::Reset),
        };

        if use_color {
            table.add_row(vec![Cell::new(from), Cell::new(text).fg(color)]);
        } else {
            table.add_row(vec![from, text]);
        }
    }

    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_plain_table_lists_every_row() {
        let rows = vec![
            PreviewRow {
                from: PathBuf::from("a.txt"),
                to: Some(PathBuf::from("00a.txt")),
                error: None,
            },
            PreviewRow {
                from: PathBuf::from("same.txt"),
                to: Some(PathBuf::from("same.txt")),
                error: None,
            },
            PreviewRow {
                from: PathBuf::from("b.txt"),
                to: None,
                error: Some("too short".to_string()),
            },
        ];

        let out = render_table(&rows, false);
        assert!(out.contains("Original"));
        assert!(out.contains("00a.txt"));
        assert!(out.contains("(unchanged)"));
        assert!(out.contains("error: too short"));
    }
}
