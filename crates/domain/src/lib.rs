// Rust guideline compliant 2026-10-19

//! Shared domain types for the alarm monitor.
//!
//! Defines `Alarm`, `AlarmId`, `AlarmStatus`, `DeviceConfig`, the remote
//! response envelope, and the hexagonal port traits: `AlarmApi`,
//! `SessionProvider`, and `AlarmDialog`.
//! Field names on the wire follow the lab service (`AlarmID`, `Status`, ...).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Free-form alarm fields as supplied by the add/edit forms.
pub type AlarmFields = serde_json::Map<String, serde_json::Value>;

/// Wire key of the alarm identifier.
pub const ALARM_ID_KEY: &str = "AlarmID";

/// Wire key of the alarm status.
pub const STATUS_KEY: &str = "Status";

// ---------------------------------------------------------------------------
// AlarmId
// ---------------------------------------------------------------------------

/// Identifier of an alarm record.
///
/// Alarms fetched from the service carry the id it issued, usually numeric.
/// Alarms added during this session get a locally generated token until the
/// next refresh replaces them with the server's copy, so an id never collides
/// with a surviving alarm after a delete-then-add sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AlarmId {
    /// Numeric id issued by the remote service.
    Server(u64),
    /// Id generated locally for an alarm added in this session.
    Local(uuid::Uuid),
    /// Any other string id issued by the service, kept verbatim.
    Key(String),
}

impl AlarmId {
    /// Generate a fresh local id (UUID v4).
    #[must_use]
    pub fn generate() -> Self {
        Self::Local(uuid::Uuid::new_v4())
    }
}

impl fmt::Display for AlarmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Server(id) => write!(f, "{id}"),
            Self::Local(token) => write!(f, "{token}"),
            Self::Key(key) => f.write_str(key),
        }
    }
}

// ---------------------------------------------------------------------------
// AlarmStatus
// ---------------------------------------------------------------------------

/// Triggered state of an alarm as reported by the service.
///
/// A record without a status reads as [`AlarmStatus::NotTriggered`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AlarmStatus {
    /// `"Triggered"`.
    Triggered,
    /// `"Not Triggered"`.
    #[default]
    NotTriggered,
    /// Any other value, kept verbatim.
    Other(String),
}

impl AlarmStatus {
    /// Wire representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Triggered => "Triggered",
            Self::NotTriggered => "Not Triggered",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for AlarmStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Triggered" => Self::Triggered,
            "Not Triggered" => Self::NotTriggered,
            _ => Self::Other(value),
        }
    }
}

impl From<AlarmStatus> for String {
    fn from(value: AlarmStatus) -> Self {
        match value {
            AlarmStatus::Other(s) => s,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for AlarmStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Alarm + AlarmForm
// ---------------------------------------------------------------------------

/// A threshold/condition record attached to a sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alarm {
    /// Alarm identifier.
    #[serde(rename = "AlarmID")]
    pub id: AlarmId,
    /// Triggered / not-triggered state.
    #[serde(rename = "Status", default)]
    pub status: AlarmStatus,
    /// Remaining form fields (device name, threshold, ...), kept as-is.
    #[serde(flatten)]
    pub fields: AlarmFields,
}

impl Alarm {
    /// Build a freshly added alarm from an add-form payload.
    ///
    /// The alarm gets a new local id and the `"Not Triggered"` status; any
    /// `AlarmID` or `Status` keys present in the form are discarded.
    #[must_use]
    pub fn from_form(form: AlarmForm) -> Self {
        let mut fields = form.fields;
        fields.remove(ALARM_ID_KEY);
        fields.remove(STATUS_KEY);
        Self {
            id: AlarmId::generate(),
            status: AlarmStatus::NotTriggered,
            fields,
        }
    }
}

/// Payload of the add dialog: the new alarm's fields, without id or status.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlarmForm {
    /// Field values entered in the form.
    #[serde(flatten)]
    pub fields: AlarmFields,
}

impl AlarmForm {
    /// Set a field, returning the form for chaining.
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.fields.insert(key.to_owned(), value.into());
        self
    }
}

// ---------------------------------------------------------------------------
// DeviceConfig
// ---------------------------------------------------------------------------

/// Metadata describing a monitored sensor device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Service-side record id.
    #[serde(rename = "_id")]
    pub record_id: String,
    /// Numeric device id.
    #[serde(rename = "DeviceID")]
    pub device_id: u32,
    /// Human-readable device name.
    #[serde(rename = "DeviceName")]
    pub device_name: String,
    /// Sampling frequency.
    #[serde(rename = "Frequency")]
    pub frequency: f64,
    /// Measurement units (e.g. `"C"`).
    #[serde(rename = "Units")]
    pub units: String,
}

// ---------------------------------------------------------------------------
// SessionToken
// ---------------------------------------------------------------------------

/// Opaque credential scoping every remote call to one lab.
///
/// `Debug` never prints the token value.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wrap a raw token.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Raw token value, for transport adapters.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(<redacted>)")
    }
}

// ---------------------------------------------------------------------------
// Remote envelope + errors
// ---------------------------------------------------------------------------

/// Errors from the `AlarmApi` hexagonal port.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a decodable response.
    #[error("transport failed: {reason}")]
    Transport {
        /// Human-readable description.
        reason: String,
    },
    /// The service answered with `success: false`.
    #[error("request rejected: {message}")]
    Rejected {
        /// Message supplied by the service.
        message: String,
    },
    /// The service reported success but sent no payload.
    #[error("response carried no data")]
    MissingPayload,
}

/// Response envelope shared by every remote call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    /// Application-level success flag.
    pub success: bool,
    /// Payload, present on success for data-returning calls.
    pub data: Option<T>,
    /// Diagnostic message, present on failure.
    pub message: Option<String>,
}

impl<T> ApiEnvelope<T> {
    /// Successful envelope carrying `data`.
    #[must_use]
    pub fn ok(data: T) -> Self {
        Self { success: true, data: Some(data), message: None }
    }

    /// Failed envelope carrying `message`.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self { success: false, data: None, message: Some(message.into()) }
    }

    /// Unwrap the payload.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Rejected`] when `success` is false, or
    /// [`ApiError::MissingPayload`] when a successful envelope has no data.
    pub fn into_result(self) -> Result<T, ApiError> {
        self.check()?;
        self.data.ok_or(ApiError::MissingPayload)
    }

    /// Check the success flag, ignoring any payload.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Rejected`] when `success` is false.
    pub fn into_ack(self) -> Result<(), ApiError> {
        self.check()
    }

    fn check(&self) -> Result<(), ApiError> {
        if self.success {
            return Ok(());
        }
        Err(ApiError::Rejected {
            message: self
                .message
                .clone()
                .unwrap_or_else(|| "no message".to_owned()),
        })
    }
}

// ---------------------------------------------------------------------------
// Dialog outcome
// ---------------------------------------------------------------------------

/// Single completion event of a dialog.
#[derive(Debug, Clone, PartialEq)]
pub enum DialogOutcome<T> {
    /// The user dismissed the dialog.
    Closed,
    /// The user completed the dialog with a payload.
    Completed(T),
}

// ---------------------------------------------------------------------------
// Ports
// ---------------------------------------------------------------------------

/// Hexagonal port: the remote alarm service.
///
/// Adapters decode the service envelope and surface both transport failures
/// and `success: false` answers as [`ApiError`].
#[expect(
    async_fn_in_trait,
    reason = "no dyn dispatch needed; internal workspace only"
)]
pub trait AlarmApi {
    /// Fetch every alarm of the lab.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport or application failure.
    async fn get_all_alarms(&self, token: &SessionToken) -> Result<Vec<Alarm>, ApiError>;

    /// Fetch the device configurations shown on the home page.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport or application failure.
    async fn get_home_page_data(
        &self,
        token: &SessionToken,
    ) -> Result<Vec<DeviceConfig>, ApiError>;

    /// Update an alarm with the edited fields.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport or application failure.
    async fn edit_alarm(&self, token: &SessionToken, alarm: &Alarm) -> Result<(), ApiError>;

    /// Remove the alarm with `id`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport or application failure.
    async fn remove_alarm(&self, token: &SessionToken, id: &AlarmId) -> Result<(), ApiError>;

    /// Create an alarm from form fields.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] on transport or application failure.
    async fn add_alarm(&self, token: &SessionToken, form: &AlarmForm) -> Result<(), ApiError>;
}

/// Hexagonal port: source of the authenticated session.
pub trait SessionProvider {
    /// Current session token, or `None` when not logged in.
    fn session_token(&self) -> Option<SessionToken>;
}

/// Hexagonal port: modal dialogs for alarm editing.
///
/// Each method opens one dialog seeded with its input and resolves once, with
/// either [`DialogOutcome::Closed`] or the completed payload.
#[expect(
    async_fn_in_trait,
    reason = "no dyn dispatch needed; internal workspace only"
)]
pub trait AlarmDialog {
    /// Edit a copy of `alarm`; completes with the edited alarm.
    async fn edit(&self, alarm: Alarm) -> DialogOutcome<Alarm>;

    /// Ask for confirmation before deleting `alarm`.
    async fn confirm_delete(&self, alarm: &Alarm) -> DialogOutcome<()>;

    /// Collect a new alarm; `device_names` seeds the device picker.
    async fn add(&self, device_names: &[String]) -> DialogOutcome<AlarmForm>;
}
