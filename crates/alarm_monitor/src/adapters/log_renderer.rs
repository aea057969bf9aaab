// Rust guideline compliant 2026-10-19

//! Log-based rendering of the alarm table.
//!
//! Emits one `tracing::info!` event per row, with the row background as a
//! field, and only when the table changed since the previous render.

use std::cell::RefCell;

use alarm_view::AlarmRow;

/// Renders [`AlarmRow`]s as structured log lines.
#[derive(Debug, Default)]
pub struct LogRenderer {
    last: RefCell<Option<Vec<AlarmRow>>>,
}

impl LogRenderer {
    /// Create a renderer that has not drawn anything yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw `rows` unless they equal the previous frame.
    ///
    /// Returns `true` when something was drawn.
    pub fn render(&self, rows: &[AlarmRow]) -> bool {
        let mut last = self.last.borrow_mut();
        if last.as_deref() == Some(rows) {
            return false;
        }

        tracing::info!(count = rows.len(), "alarm_table.render");
        for row in rows {
            let fields = serde_json::Value::Object(row.alarm.fields.clone());
            tracing::info!(
                alarm_id = %row.alarm.id,
                status = %row.alarm.status,
                background = row.background,
                %fields,
                "alarm_table.row"
            );
        }
        *last = Some(rows.to_vec());
        true
    }
}
