// Rust guideline compliant 2026-10-19

//! Alarm list view -- mirrors the lab's alarm list, polls the remote service
//! for updates, and drives the add/edit/delete dialogs.
//!
//! Entry points: [`AlarmListView::activate`], [`AlarmListView::run`], and the
//! `open_*_dialog` actions. Configuration via [`ViewConfig::builder`].
//!
//! The remote service is the source of truth. Local mutations are applied only
//! after the service confirms them; every remote failure is logged and
//! otherwise ignored, leaving the previous list in place.

use domain::{
    Alarm, AlarmApi, AlarmDialog, AlarmForm, AlarmId, ApiError, DialogOutcome, SessionProvider,
    SessionToken,
};
use std::cell::{Cell, RefCell};
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};

/// Row highlight for a triggered alarm.
pub const TRIGGERED_COLOR: &str = "rgba(255, 99, 71, 0.1)";

/// Row highlight for every other status.
pub const NEUTRAL_COLOR: &str = "white";

/// Background color of an alarm row with the given status.
#[must_use]
pub fn background_color(status: &str) -> &'static str {
    if status == "Triggered" {
        TRIGGERED_COLOR
    } else {
        NEUTRAL_COLOR
    }
}

// ---------------------------------------------------------------------------
// ViewError
// ---------------------------------------------------------------------------

/// Errors returned by the view itself.
///
/// Remote failures never show up here; they are logged and swallowed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ViewError {
    /// The supplied configuration is invalid.
    #[error("invalid view configuration: {reason}")]
    InvalidConfig {
        /// Human-readable description of the problem.
        reason: String,
    },
    /// No session token is available; the view was never activated.
    #[error("no active session")]
    NoSession,
    /// Another dialog is still open.
    #[error("a dialog is already open")]
    DialogAlreadyOpen,
}

// ---------------------------------------------------------------------------
// ViewConfig + builder
// ---------------------------------------------------------------------------

/// Runtime configuration for an [`AlarmListView`].
///
/// Construct via [`ViewConfig::builder`].
#[derive(Debug, Clone)]
pub struct ViewConfig {
    /// Period of the alarm re-fetch timer.
    pub refresh_interval: Duration,
    /// Optional upper bound on the number of timer ticks. `None` means infinite.
    pub iterations: Option<u64>,
}

/// Builder for [`ViewConfig`].
///
/// Obtain via [`ViewConfig::builder`]; finalize with [`build`](Self::build).
#[derive(Debug)]
pub struct ViewConfigBuilder {
    refresh_interval: Duration,
    iterations: Option<u64>,
}

impl ViewConfig {
    /// Create a builder.
    ///
    /// Default values: `refresh_interval = 10 s`, `iterations = None`.
    #[must_use]
    pub fn builder() -> ViewConfigBuilder {
        ViewConfigBuilder {
            refresh_interval: Duration::from_secs(10),
            iterations: None,
        }
    }
}

impl ViewConfigBuilder {
    /// Override the refresh period.
    #[must_use]
    pub fn refresh_interval(mut self, refresh_interval: Duration) -> Self {
        self.refresh_interval = refresh_interval;
        self
    }

    /// Stop [`AlarmListView::run`] after `n` timer ticks.
    #[must_use]
    pub fn iterations(mut self, n: u64) -> Self {
        self.iterations = Some(n);
        self
    }

    /// Validate and build the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::InvalidConfig`] when `refresh_interval` is zero.
    #[must_use = "the Result must be checked; use ? or unwrap"]
    pub fn build(self) -> Result<ViewConfig, ViewError> {
        if self.refresh_interval.is_zero() {
            return Err(ViewError::InvalidConfig {
                reason: "refresh_interval must be non-zero".to_owned(),
            });
        }
        Ok(ViewConfig {
            refresh_interval: self.refresh_interval,
            iterations: self.iterations,
        })
    }
}

// ---------------------------------------------------------------------------
// AlarmRow
// ---------------------------------------------------------------------------

/// One rendered line of the alarm table.
#[derive(Debug, Clone, PartialEq)]
pub struct AlarmRow {
    /// The alarm shown on this row.
    pub alarm: Alarm,
    /// Row background, see [`background_color`].
    pub background: &'static str,
}

// ---------------------------------------------------------------------------
// DialogGuard
// ---------------------------------------------------------------------------

/// Marks the dialog slot as taken; frees it on drop, including cancellation.
struct DialogGuard<'a> {
    open: &'a Cell<bool>,
}

impl Drop for DialogGuard<'_> {
    fn drop(&mut self) {
        self.open.set(false);
    }
}

// ---------------------------------------------------------------------------
// AlarmListView
// ---------------------------------------------------------------------------

/// In-memory mirror of the lab's alarm list plus its dialog actions.
///
/// Generic over the `AlarmApi`, `SessionProvider` and `AlarmDialog` ports per
/// call; holds no adapter references. Meant for a `current_thread` runtime:
/// `RefCell` borrows are never held across an `.await`.
#[derive(Debug)]
pub struct AlarmListView {
    config: ViewConfig,
    session: RefCell<Option<SessionToken>>,
    alarms: RefCell<Vec<Alarm>>,
    device_names: RefCell<Vec<String>>,
    dialog_open: Cell<bool>,
}

impl AlarmListView {
    /// Create an inactive view with empty lists.
    #[must_use]
    pub fn new(config: ViewConfig) -> Self {
        Self {
            config,
            session: RefCell::new(None),
            alarms: RefCell::new(vec![]),
            device_names: RefCell::new(vec![]),
            dialog_open: Cell::new(false),
        }
    }

    /// Snapshot of the current alarm list.
    #[must_use]
    pub fn alarms(&self) -> Vec<Alarm> {
        self.alarms.borrow().clone()
    }

    /// Snapshot of the known device names.
    #[must_use]
    pub fn device_names(&self) -> Vec<String> {
        self.device_names.borrow().clone()
    }

    /// Current alarms paired with their row background.
    #[must_use]
    pub fn rows(&self) -> Vec<AlarmRow> {
        self.alarms
            .borrow()
            .iter()
            .map(|alarm| AlarmRow {
                background: background_color(alarm.status.as_str()),
                alarm: alarm.clone(),
            })
            .collect()
    }

    /// `true` while a dialog is open.
    ///
    /// The slot is taken by an `open_*_dialog` call and released when that
    /// call returns or is cancelled.
    #[must_use]
    pub fn is_dialog_open(&self) -> bool {
        self.dialog_open.get()
    }

    // -- lifecycle ----------------------------------------------------------

    /// Read the session token, then fetch alarms and device names once.
    ///
    /// Both fetches are issued concurrently.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::NoSession`] when `session` holds no token.
    pub async fn activate<S, A>(&self, session: &S, api: &A) -> Result<(), ViewError>
    where
        S: SessionProvider,
        A: AlarmApi,
    {
        let token = session.session_token().ok_or(ViewError::NoSession)?;
        *self.session.borrow_mut() = Some(token.clone());
        tracing::info!("alarm_view.activated");

        tokio::join!(self.fetch_alarms(api, &token), self.fetch_device_names(api, &token));
        Ok(())
    }

    /// Re-fetch the alarm list every `config.refresh_interval` until stopped.
    ///
    /// The first fetch happens one period after the call. When a tick fires
    /// while the previous fetch is still pending, that fetch is dropped and a
    /// new one is issued, so at most one request is in flight. Stops after
    /// `config.iterations` ticks when set; otherwise runs until the future is
    /// dropped.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::NoSession`] if the view was never activated.
    pub async fn run<A: AlarmApi>(&self, api: &A) -> Result<(), ViewError> {
        let token = self.token()?;
        let period = self.config.refresh_interval;
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut ticks = 0u64;
        ticker.tick().await;
        loop {
            ticks += 1;
            let superseded = tokio::select! {
                biased;
                result = api.get_all_alarms(&token) => {
                    self.apply_alarms(result);
                    false
                }
                _ = ticker.tick() => true,
            };
            if superseded {
                tracing::debug!(tick = ticks, "alarm_view.refresh.superseded");
            }

            if let Some(max) = self.config.iterations
                && ticks >= max
            {
                tracing::info!("alarm_view.run.stopped: iteration limit reached");
                return Ok(());
            }

            // A superseding tick has already elapsed; fetch again right away.
            if !superseded {
                ticker.tick().await;
            }
        }
    }

    /// Fetch the alarm list and replace the local one wholesale.
    ///
    /// On failure the existing list is kept.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::NoSession`] if the view was never activated.
    pub async fn refresh_alarms<A: AlarmApi>(&self, api: &A) -> Result<(), ViewError> {
        let token = self.token()?;
        self.fetch_alarms(api, &token).await;
        Ok(())
    }

    /// Fetch device configurations and replace the device-name list.
    ///
    /// Replacing keeps repeated calls from accumulating duplicates. On failure
    /// the existing names are kept.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::NoSession`] if the view was never activated.
    pub async fn refresh_device_names<A: AlarmApi>(&self, api: &A) -> Result<(), ViewError> {
        let token = self.token()?;
        self.fetch_device_names(api, &token).await;
        Ok(())
    }

    // -- dialogs ------------------------------------------------------------

    /// Open the edit dialog on a copy of `alarm`; save on completion.
    ///
    /// The dialog closes when this returns, whatever the remote outcome.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::NoSession`] if the view was never activated, or
    /// [`ViewError::DialogAlreadyOpen`] while another dialog is open.
    pub async fn open_edit_dialog<A, D>(
        &self,
        api: &A,
        dialog: &D,
        alarm: &Alarm,
    ) -> Result<(), ViewError>
    where
        A: AlarmApi,
        D: AlarmDialog,
    {
        self.token()?;
        let _guard = self.begin_dialog()?;
        match dialog.edit(alarm.clone()).await {
            DialogOutcome::Closed => {
                tracing::debug!(alarm_id = %alarm.id, "alarm_view.dialog.closed");
                Ok(())
            }
            DialogOutcome::Completed(edited) => self.save_changes(api, &alarm.id, edited).await,
        }
    }

    /// Open the delete confirmation for `alarm`; delete on confirmation.
    ///
    /// The dialog closes when this returns, whatever the remote outcome.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::NoSession`] if the view was never activated, or
    /// [`ViewError::DialogAlreadyOpen`] while another dialog is open.
    pub async fn open_delete_dialog<A, D>(
        &self,
        api: &A,
        dialog: &D,
        alarm: &Alarm,
    ) -> Result<(), ViewError>
    where
        A: AlarmApi,
        D: AlarmDialog,
    {
        self.token()?;
        let _guard = self.begin_dialog()?;
        match dialog.confirm_delete(alarm).await {
            DialogOutcome::Closed => {
                tracing::debug!(alarm_id = %alarm.id, "alarm_view.dialog.closed");
                Ok(())
            }
            DialogOutcome::Completed(()) => self.delete_alarm(api, alarm).await,
        }
    }

    /// Open the add dialog seeded with the device names; add on completion.
    ///
    /// The dialog closes when this returns, whatever the remote outcome.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::NoSession`] if the view was never activated, or
    /// [`ViewError::DialogAlreadyOpen`] while another dialog is open.
    pub async fn open_add_dialog<A, D>(&self, api: &A, dialog: &D) -> Result<(), ViewError>
    where
        A: AlarmApi,
        D: AlarmDialog,
    {
        self.token()?;
        let _guard = self.begin_dialog()?;
        let names = self.device_names();
        match dialog.add(&names).await {
            DialogOutcome::Closed => {
                tracing::debug!("alarm_view.dialog.closed");
                Ok(())
            }
            DialogOutcome::Completed(form) => self.add_alarm(api, form).await,
        }
    }

    /// Row action: same as [`open_edit_dialog`](Self::open_edit_dialog).
    ///
    /// # Errors
    ///
    /// See [`open_edit_dialog`](Self::open_edit_dialog).
    pub async fn edit_alarm<A, D>(&self, api: &A, dialog: &D, alarm: &Alarm) -> Result<(), ViewError>
    where
        A: AlarmApi,
        D: AlarmDialog,
    {
        self.open_edit_dialog(api, dialog, alarm).await
    }

    /// Row action: same as [`open_delete_dialog`](Self::open_delete_dialog).
    ///
    /// # Errors
    ///
    /// See [`open_delete_dialog`](Self::open_delete_dialog).
    pub async fn remove_alarm<A, D>(
        &self,
        api: &A,
        dialog: &D,
        alarm: &Alarm,
    ) -> Result<(), ViewError>
    where
        A: AlarmApi,
        D: AlarmDialog,
    {
        self.open_delete_dialog(api, dialog, alarm).await
    }

    // -- mutations ----------------------------------------------------------

    // Dialog completion handlers. Only reachable from the `open_*_dialog`
    // calls, whose guard closes the dialog once the handler returns.

    /// Send `edited` to the service; on success replace the alarm whose id is
    /// `target`. An unknown `target` leaves the list untouched.
    async fn save_changes<A: AlarmApi>(
        &self,
        api: &A,
        target: &AlarmId,
        edited: Alarm,
    ) -> Result<(), ViewError> {
        let token = self.token()?;
        if let Err(e) = api.edit_alarm(&token, &edited).await {
            tracing::warn!(alarm_id = %target, error = %e, "alarm_view.edit.failed");
            return Ok(());
        }
        let mut alarms = self.alarms.borrow_mut();
        match alarms.iter_mut().find(|a| a.id == *target) {
            Some(slot) => {
                *slot = edited;
                tracing::info!(alarm_id = %target, "alarm_view.alarm.updated");
            }
            None => tracing::debug!(alarm_id = %target, "alarm_view.edit.not_found"),
        }
        Ok(())
    }

    /// Ask the service to remove `alarm`; on success drop it from the list.
    async fn delete_alarm<A: AlarmApi>(&self, api: &A, alarm: &Alarm) -> Result<(), ViewError> {
        let token = self.token()?;
        let id = &alarm.id;
        if let Err(e) = api.remove_alarm(&token, id).await {
            tracing::warn!(alarm_id = %id, error = %e, "alarm_view.delete.failed");
            return Ok(());
        }
        let mut alarms = self.alarms.borrow_mut();
        match alarms.iter().position(|a| a.id == *id) {
            Some(index) => {
                alarms.remove(index);
                tracing::info!(alarm_id = %id, "alarm_view.alarm.deleted");
            }
            None => tracing::debug!(alarm_id = %id, "alarm_view.delete.not_found"),
        }
        Ok(())
    }

    /// Send `form` to the service; on success append it as a new
    /// `"Not Triggered"` alarm with a freshly generated id.
    async fn add_alarm<A: AlarmApi>(&self, api: &A, form: AlarmForm) -> Result<(), ViewError> {
        let token = self.token()?;
        if let Err(e) = api.add_alarm(&token, &form).await {
            tracing::warn!(error = %e, "alarm_view.add.failed");
            return Ok(());
        }
        let alarm = Alarm::from_form(form);
        tracing::info!(alarm_id = %alarm.id, "alarm_view.alarm.added");
        self.alarms.borrow_mut().push(alarm);
        Ok(())
    }

    // -- internals ----------------------------------------------------------

    fn token(&self) -> Result<SessionToken, ViewError> {
        self.session.borrow().clone().ok_or(ViewError::NoSession)
    }

    fn begin_dialog(&self) -> Result<DialogGuard<'_>, ViewError> {
        if self.dialog_open.replace(true) {
            tracing::warn!("alarm_view.dialog.rejected: another dialog is open");
            return Err(ViewError::DialogAlreadyOpen);
        }
        Ok(DialogGuard { open: &self.dialog_open })
    }

    async fn fetch_alarms<A: AlarmApi>(&self, api: &A, token: &SessionToken) {
        let result = api.get_all_alarms(token).await;
        self.apply_alarms(result);
    }

    async fn fetch_device_names<A: AlarmApi>(&self, api: &A, token: &SessionToken) {
        match api.get_home_page_data(token).await {
            Ok(configs) => {
                let names: Vec<String> = configs.into_iter().map(|c| c.device_name).collect();
                tracing::debug!(count = names.len(), "alarm_view.devices.applied");
                *self.device_names.borrow_mut() = names;
            }
            Err(e) => tracing::warn!(error = %e, "alarm_view.devices.failed"),
        }
    }

    fn apply_alarms(&self, result: Result<Vec<Alarm>, ApiError>) {
        match result {
            Ok(alarms) => {
                tracing::debug!(count = alarms.len(), "alarm_view.refresh.applied");
                *self.alarms.borrow_mut() = alarms;
            }
            Err(e) => tracing::warn!(error = %e, "alarm_view.refresh.failed"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
