// Rust guideline compliant 2026-10-19

//! DEMO adapter for the `AlarmApi` port.
//!
//! An in-memory stand-in for the lab service: three devices, two seed alarms,
//! server-issued numeric ids, and a session check. Every `get_all_alarms`
//! call flips each alarm's status with probability `trigger_rate` so the
//! rendered list changes over time. Supports seeded randomness for
//! reproducible tests.

use std::cell::{Cell, RefCell};

use domain::{
    ALARM_ID_KEY, Alarm, AlarmApi, AlarmForm, AlarmId, AlarmStatus, ApiError, DeviceConfig,
    STATUS_KEY, SessionToken,
};
use rand::{Rng, SeedableRng, rngs::StdRng};

/// Default per-fetch probability that an alarm changes state.
const DEFAULT_TRIGGER_RATE: f64 = 0.2;

/// In-memory `AlarmApi` implementation for demos and tests.
#[derive(Debug)]
pub struct DemoAlarmApi {
    /// Only requests carrying this token are accepted.
    token: SessionToken,
    alarms: RefCell<Vec<Alarm>>,
    devices: Vec<DeviceConfig>,
    next_id: Cell<u64>,
    trigger_rate: f64,
    rng: RefCell<StdRng>,
}

impl DemoAlarmApi {
    /// Create the demo service, accepting only `token`.
    ///
    /// `seed = Some(s)` produces deterministic status flips; `None` seeds from
    /// the OS.
    #[must_use]
    pub fn new(token: SessionToken, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_os_rng(),
        };
        let devices = vec![
            demo_device(1, "Freezer A", 0.5, "C"),
            demo_device(2, "Incubator", 1.0, "C"),
            demo_device(3, "Cold Room", 0.2, "C"),
        ];
        let alarms = vec![
            demo_alarm(0, AlarmStatus::NotTriggered, "Freezer A", -15.0),
            demo_alarm(1, AlarmStatus::Triggered, "Incubator", 38.5),
        ];
        Self {
            token,
            next_id: Cell::new(alarms.len() as u64),
            alarms: RefCell::new(alarms),
            devices,
            trigger_rate: DEFAULT_TRIGGER_RATE,
            rng: RefCell::new(rng),
        }
    }

    /// Override the per-fetch flip probability; clamped to `[0, 1]`.
    #[must_use]
    pub fn with_trigger_rate(mut self, rate: f64) -> Self {
        self.trigger_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Number of alarms currently stored by the service.
    #[cfg(test)]
    #[must_use]
    pub fn len(&self) -> usize {
        self.alarms.borrow().len()
    }

    fn authorize(&self, token: &SessionToken) -> Result<(), ApiError> {
        if *token == self.token {
            return Ok(());
        }
        tracing::warn!("demo_api.unauthorized");
        Err(ApiError::Rejected { message: "invalid lab session".to_owned() })
    }

    fn not_found(id: &AlarmId) -> ApiError {
        ApiError::Rejected { message: format!("alarm {id} not found") }
    }
}

fn demo_device(device_id: u32, name: &str, frequency: f64, units: &str) -> DeviceConfig {
    DeviceConfig {
        record_id: format!("dev-{device_id}"),
        device_id,
        device_name: name.to_owned(),
        frequency,
        units: units.to_owned(),
    }
}

fn demo_alarm(id: u64, status: AlarmStatus, device: &str, threshold: f64) -> Alarm {
    let form = AlarmForm::default()
        .with("DeviceName", device)
        .with("Threshold", threshold);
    Alarm { id: AlarmId::Server(id), status, fields: form.fields }
}

impl AlarmApi for DemoAlarmApi {
    async fn get_all_alarms(&self, token: &SessionToken) -> Result<Vec<Alarm>, ApiError> {
        self.authorize(token)?;
        let mut rng = self.rng.borrow_mut();
        let mut alarms = self.alarms.borrow_mut();
        for alarm in alarms.iter_mut() {
            if rng.random_bool(self.trigger_rate) {
                alarm.status = match alarm.status {
                    AlarmStatus::Triggered => AlarmStatus::NotTriggered,
                    _ => AlarmStatus::Triggered,
                };
                tracing::debug!(alarm_id = %alarm.id, status = %alarm.status, "demo_api.status_changed");
            }
        }
        Ok(alarms.clone())
    }

    async fn get_home_page_data(
        &self,
        token: &SessionToken,
    ) -> Result<Vec<DeviceConfig>, ApiError> {
        self.authorize(token)?;
        Ok(self.devices.clone())
    }

    async fn edit_alarm(&self, token: &SessionToken, alarm: &Alarm) -> Result<(), ApiError> {
        self.authorize(token)?;
        let mut alarms = self.alarms.borrow_mut();
        let slot = alarms
            .iter_mut()
            .find(|a| a.id == alarm.id)
            .ok_or_else(|| Self::not_found(&alarm.id))?;
        *slot = alarm.clone();
        Ok(())
    }

    async fn remove_alarm(&self, token: &SessionToken, id: &AlarmId) -> Result<(), ApiError> {
        self.authorize(token)?;
        let mut alarms = self.alarms.borrow_mut();
        let index = alarms
            .iter()
            .position(|a| a.id == *id)
            .ok_or_else(|| Self::not_found(id))?;
        alarms.remove(index);
        Ok(())
    }

    async fn add_alarm(&self, token: &SessionToken, form: &AlarmForm) -> Result<(), ApiError> {
        self.authorize(token)?;
        let mut fields = form.fields.clone();
        fields.remove(ALARM_ID_KEY);
        fields.remove(STATUS_KEY);
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.alarms.borrow_mut().push(Alarm {
            id: AlarmId::Server(id),
            status: AlarmStatus::NotTriggered,
            fields,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token() -> SessionToken {
        SessionToken::new("demo")
    }

    fn quiet_api() -> DemoAlarmApi {
        DemoAlarmApi::new(token(), Some(1)).with_trigger_rate(0.0)
    }

    #[tokio::test]
    async fn seeds_two_alarms_and_three_devices() {
        let api = quiet_api();
        assert_eq!(api.get_all_alarms(&token()).await.unwrap().len(), 2);
        let devices = api.get_home_page_data(&token()).await.unwrap();
        let names: Vec<_> = devices.iter().map(|d| d.device_name.as_str()).collect();
        assert_eq!(names, ["Freezer A", "Incubator", "Cold Room"]);
    }

    #[tokio::test]
    async fn wrong_token_is_rejected() {
        let api = quiet_api();
        let result = api.get_all_alarms(&SessionToken::new("intruder")).await;
        assert!(matches!(result, Err(ApiError::Rejected { .. })));
    }

    #[tokio::test]
    async fn add_issues_increasing_server_ids() {
        let api = quiet_api();
        api.add_alarm(&token(), &AlarmForm::default().with("DeviceName", "Cold Room"))
            .await
            .unwrap();
        api.remove_alarm(&token(), &AlarmId::Server(2)).await.unwrap();
        api.add_alarm(&token(), &AlarmForm::default().with("DeviceName", "Cold Room"))
            .await
            .unwrap();

        let alarms = api.get_all_alarms(&token()).await.unwrap();
        let ids: Vec<_> = alarms.iter().map(|a| a.id.clone()).collect();
        assert_eq!(ids, [AlarmId::Server(0), AlarmId::Server(1), AlarmId::Server(3)]);
        assert_eq!(alarms[2].status, AlarmStatus::NotTriggered);
    }

    #[tokio::test]
    async fn edit_and_remove_unknown_id_are_rejected() {
        let api = quiet_api();
        let ghost = demo_alarm(99, AlarmStatus::Triggered, "Nowhere", 0.0);
        assert!(api.edit_alarm(&token(), &ghost).await.is_err());
        assert!(api.remove_alarm(&token(), &ghost.id).await.is_err());
        assert_eq!(api.len(), 2);
    }

    #[tokio::test]
    async fn edit_replaces_stored_alarm() {
        let api = quiet_api();
        let mut edited = api.get_all_alarms(&token()).await.unwrap()[0].clone();
        edited.fields.insert("Threshold".to_owned(), serde_json::json!(-30.0));
        api.edit_alarm(&token(), &edited).await.unwrap();
        assert_eq!(api.get_all_alarms(&token()).await.unwrap()[0], edited);
    }

    #[tokio::test]
    async fn full_trigger_rate_flips_every_alarm() {
        let api = DemoAlarmApi::new(token(), Some(7)).with_trigger_rate(1.0);
        let alarms = api.get_all_alarms(&token()).await.unwrap();
        assert_eq!(alarms[0].status, AlarmStatus::Triggered);
        assert_eq!(alarms[1].status, AlarmStatus::NotTriggered);
    }

    #[test]
    fn trigger_rate_is_clamped() {
        let api = DemoAlarmApi::new(token(), Some(1)).with_trigger_rate(4.0);
        assert!((api.trigger_rate - 1.0).abs() < f64::EPSILON);
    }
}
