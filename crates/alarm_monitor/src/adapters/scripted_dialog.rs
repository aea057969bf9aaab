// Rust guideline compliant 2026-10-19

//! Scripted adapter for the `AlarmDialog` port.
//!
//! Replays a fixed queue of user answers, one per opened dialog, after a
//! configurable "think time". An exhausted queue, or a step that does not
//! match the dialog kind, dismisses the dialog.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::time::Duration;

use domain::{Alarm, AlarmDialog, AlarmFields, AlarmForm, DialogOutcome};

/// One scripted user answer.
#[derive(Debug, Clone, PartialEq)]
pub enum DialogStep {
    /// Dismiss whatever dialog is open.
    Close,
    /// Edit dialog: merge these fields into the alarm and save.
    SaveEdit(AlarmFields),
    /// Delete dialog: confirm.
    ConfirmDelete,
    /// Add dialog: submit this form.
    Add(AlarmForm),
}

/// `AlarmDialog` adapter that answers from a queue of [`DialogStep`]s.
#[derive(Debug)]
pub struct ScriptedDialog {
    steps: RefCell<VecDeque<DialogStep>>,
    think_time: Duration,
}

impl ScriptedDialog {
    /// Create a dialog that replays `steps` in order, waiting `think_time`
    /// before each answer.
    #[must_use]
    pub fn new(steps: Vec<DialogStep>, think_time: Duration) -> Self {
        Self { steps: RefCell::new(steps.into()), think_time }
    }

    /// Number of steps not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.steps.borrow().len()
    }

    async fn next_step(&self, dialog: &'static str) -> Option<DialogStep> {
        tokio::time::sleep(self.think_time).await;
        let step = self.steps.borrow_mut().pop_front();
        tracing::info!(dialog, step = ?step, "scripted_dialog.answer");
        step
    }
}

impl AlarmDialog for ScriptedDialog {
    async fn edit(&self, mut alarm: Alarm) -> DialogOutcome<Alarm> {
        match self.next_step("edit").await {
            Some(DialogStep::SaveEdit(changes)) => {
                alarm.fields.extend(changes);
                DialogOutcome::Completed(alarm)
            }
            _ => DialogOutcome::Closed,
        }
    }

    async fn confirm_delete(&self, _alarm: &Alarm) -> DialogOutcome<()> {
        match self.next_step("delete").await {
            Some(DialogStep::ConfirmDelete) => DialogOutcome::Completed(()),
            _ => DialogOutcome::Closed,
        }
    }

    async fn add(&self, device_names: &[String]) -> DialogOutcome<AlarmForm> {
        match self.next_step("add").await {
            Some(DialogStep::Add(form)) => {
                let known = form
                    .fields
                    .get("DeviceName")
                    .and_then(serde_json::Value::as_str)
                    .is_none_or(|name| device_names.iter().any(|n| n == name));
                if !known {
                    tracing::warn!("scripted_dialog.add: device not in picker list");
                }
                DialogOutcome::Completed(form)
            }
            _ => DialogOutcome::Closed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DialogStep, ScriptedDialog};
    use domain::{Alarm, AlarmDialog as _, AlarmForm, DialogOutcome};
    use std::time::Duration;

    fn sample_alarm() -> Alarm {
        Alarm::from_form(AlarmForm::default().with("DeviceName", "Freezer A").with("Threshold", -15))
    }

    #[tokio::test]
    async fn replays_steps_in_order() {
        let form = AlarmForm::default().with("DeviceName", "Incubator");
        let dialog = ScriptedDialog::new(
            vec![DialogStep::Add(form.clone()), DialogStep::ConfirmDelete],
            Duration::ZERO,
        );

        assert_eq!(dialog.add(&["Incubator".to_owned()]).await, DialogOutcome::Completed(form));
        assert_eq!(dialog.confirm_delete(&sample_alarm()).await, DialogOutcome::Completed(()));
        assert_eq!(dialog.remaining(), 0);
    }

    #[tokio::test]
    async fn save_edit_merges_fields() {
        let changes = AlarmForm::default().with("Threshold", -25).fields;
        let dialog = ScriptedDialog::new(vec![DialogStep::SaveEdit(changes)], Duration::ZERO);
        let alarm = sample_alarm();

        let DialogOutcome::Completed(edited) = dialog.edit(alarm.clone()).await else {
            panic!("edit should complete");
        };
        assert_eq!(edited.id, alarm.id);
        assert_eq!(edited.fields.get("Threshold"), Some(&serde_json::json!(-25)));
        assert_eq!(edited.fields.get("DeviceName"), alarm.fields.get("DeviceName"));
    }

    #[tokio::test]
    async fn mismatched_or_missing_step_closes() {
        let dialog = ScriptedDialog::new(vec![DialogStep::ConfirmDelete], Duration::ZERO);
        assert_eq!(dialog.edit(sample_alarm()).await, DialogOutcome::Closed);
        assert_eq!(dialog.add(&[]).await, DialogOutcome::Closed);
    }

    #[tokio::test]
    async fn explicit_close_step() {
        let dialog = ScriptedDialog::new(vec![DialogStep::Close], Duration::ZERO);
        assert_eq!(dialog.confirm_delete(&sample_alarm()).await, DialogOutcome::Closed);
    }

    #[tokio::test(start_paused = true)]
    async fn waits_think_time_before_answering() {
        let dialog = ScriptedDialog::new(vec![DialogStep::Close], Duration::from_secs(2));
        let started = tokio::time::Instant::now();
        dialog.confirm_delete(&sample_alarm()).await;
        assert!(started.elapsed() >= Duration::from_secs(2));
    }
}
