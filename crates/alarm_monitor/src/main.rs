// Rust guideline compliant 2026-10-19

//! Alarm monitor entry point.
//!
//! Activates an `AlarmListView` against the lab service, keeps it refreshed
//! every 10 seconds, and renders the table to the log whenever it changes.
//!
//! With `ALARM_MONITOR_API_URL` set, the view talks to that service over
//! HTTP. Without it, an in-memory DEMO service is used and a scripted user
//! adds, edits and deletes one alarm so every dialog path runs.
//!
//! # Usage
//!
//! ```text
//! # DEMO service -- press CTRL+C to stop
//! RUST_LOG=info cargo run
//!
//! # Real service
//! RUST_LOG=info ALARM_MONITOR_API_URL=http://lab.local/api ALARM_MONITOR_TOKEN=... cargo run
//! ```

mod adapters;

use adapters::demo_api::DemoAlarmApi;
use adapters::http_api::{HttpAlarmApi, HttpApiConfig};
use adapters::log_renderer::LogRenderer;
use adapters::scripted_dialog::{DialogStep, ScriptedDialog};
use adapters::static_session::StaticSession;
use alarm_view::{AlarmListView, ViewConfig, ViewError};
use anyhow::Context as _;
use domain::{AlarmApi, AlarmForm, SessionToken};
use std::time::Duration;
use tracing::Instrument as _;

/// Selects the HTTP adapter when set.
const API_URL_VAR: &str = "ALARM_MONITOR_API_URL";

/// Session token; falls back to [`DEMO_TOKEN`].
const TOKEN_VAR: &str = "ALARM_MONITOR_TOKEN";

/// Per-request timeout for the HTTP adapter, in seconds.
const TIMEOUT_VAR: &str = "ALARM_MONITOR_TIMEOUT_SECS";

/// Token accepted by the DEMO service.
const DEMO_TOKEN: &str = "demo";

/// Per-fetch probability that a DEMO alarm changes state.
const DEMO_TRIGGER_RATE: f64 = 0.1;

/// How often the table is checked for changes and redrawn.
const RENDER_INTERVAL: Duration = Duration::from_secs(1);

/// Pause between scripted user actions; longer than one refresh period so
/// each action starts from a freshly fetched list.
const SCRIPT_PAUSE: Duration = Duration::from_secs(12);

/// Time the scripted user spends in each dialog.
const THINK_TIME: Duration = Duration::from_secs(2);

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize the tracing subscriber before any async work.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let token = std::env::var(TOKEN_VAR).unwrap_or_else(|_| DEMO_TOKEN.to_owned());
    let session = StaticSession::new(SessionToken::new(token.clone()));
    let view_config = ViewConfig::builder()
        .build()
        .context("failed to build view config")?;

    if let Ok(base_url) = std::env::var(API_URL_VAR) {
        let mut builder = HttpApiConfig::builder(base_url);
        if let Ok(secs) = std::env::var(TIMEOUT_VAR) {
            let secs: u64 = secs
                .parse()
                .with_context(|| format!("{TIMEOUT_VAR} must be a whole number of seconds"))?;
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let api_config = builder.build().context("failed to build http api config")?;
        let api = HttpAlarmApi::new(api_config).context("failed to create http client")?;
        tracing::info!("main.start: http service");
        run_monitor(&session, &api, view_config, false).await
    } else {
        // DEMO service: OS-seeded status flips, accepts the configured token.
        let api = DemoAlarmApi::new(SessionToken::new(token), None)
            .with_trigger_rate(DEMO_TRIGGER_RATE);
        tracing::info!("main.start: demo service");
        run_monitor(&session, &api, view_config, true).await
    }
}

/// Activate the view, then run refresh, rendering and (optionally) the demo
/// script until CTRL+C.
async fn run_monitor<A: AlarmApi>(
    session: &StaticSession,
    api: &A,
    config: ViewConfig,
    scripted: bool,
) -> anyhow::Result<()> {
    let view = AlarmListView::new(config);
    view.activate(session, api)
        .await
        .context("failed to activate alarm view")?;

    let renderer = LogRenderer::new();

    let script = async {
        if scripted {
            demo_script(&view, api).await
        } else {
            Ok(())
        }
    };
    let pipeline = drive(&view, api, script);

    // Dropping the pipeline cancels the refresh timer; in-flight requests are
    // abandoned with it.
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("main.shutdown: ctrl_c received");
        }
        () = render_loop(&view, &renderer) => {}
        result = pipeline => {
            result?;
        }
    }

    Ok(())
}

/// Run the refresh loop alongside `script`.
///
/// Returns as soon as either side fails; otherwise keeps refreshing after the
/// script is done.
async fn drive<A, F>(view: &AlarmListView, api: &A, script: F) -> anyhow::Result<()>
where
    A: AlarmApi,
    F: Future<Output = Result<(), ViewError>>,
{
    tokio::try_join!(
        async { view.run(api).await.context("refresh loop failed") }
            .instrument(tracing::info_span!("refresh")),
        async { script.await.context("demo script failed") }
            .instrument(tracing::info_span!("script")),
    )?;
    Ok(())
}

/// Redraw the table every [`RENDER_INTERVAL`] when it changed.
async fn render_loop(view: &AlarmListView, renderer: &LogRenderer) {
    let mut ticker = tokio::time::interval(RENDER_INTERVAL);
    loop {
        ticker.tick().await;
        renderer.render(&view.rows());
    }
}

/// Scripted user session: cancel a delete, add an alarm, edit the first one,
/// delete the last.
async fn demo_script<A: AlarmApi>(view: &AlarmListView, api: &A) -> Result<(), ViewError> {
    let new_alarm = AlarmForm::default()
        .with("DeviceName", "Cold Room")
        .with("Condition", "above")
        .with("Threshold", 8);
    let threshold_change = AlarmForm::default().with("Threshold", 25).fields;
    let dialog = ScriptedDialog::new(
        vec![
            DialogStep::Close,
            DialogStep::Add(new_alarm),
            DialogStep::SaveEdit(threshold_change),
            DialogStep::ConfirmDelete,
        ],
        THINK_TIME,
    );

    tokio::time::sleep(SCRIPT_PAUSE).await;
    if let Some(first) = view.alarms().first().cloned() {
        view.remove_alarm(api, &dialog, &first).await?;
    }
    view.open_add_dialog(api, &dialog).await?;

    tokio::time::sleep(SCRIPT_PAUSE).await;
    if let Some(first) = view.alarms().first().cloned() {
        view.edit_alarm(api, &dialog, &first).await?;
    }

    tokio::time::sleep(SCRIPT_PAUSE).await;
    if let Some(last) = view.alarms().last().cloned() {
        view.remove_alarm(api, &dialog, &last).await?;
    }

    tracing::info!(remaining = dialog.remaining(), "main.script.finished");
    Ok(())
}
