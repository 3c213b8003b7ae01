use super::event::{AdminStatus, Event, RegistrationOverride};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    Upcoming,
    Live,
    Past,
    Closed,
}

#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationState {
    OpeningSoon,
    Open,
    Closed,
}

/// Whether the registration state came from the time window or an admin
/// override.
#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationMode {
    Auto,
    Manual,
}

#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy)]
pub struct EventStatus {
    pub lifecycle_state: LifecycleState,
    pub registration_state: RegistrationState,
    pub registration_mode: RegistrationMode,
    pub is_registration_open: bool,
}

/// Computes an event's lifecycle and registration state at `now`.
///
/// Pure: the same event and instant always produce the same status. The
/// lifecycle window is right-open (`now == end_date` is past) while the
/// registration window includes both bounds.
pub fn compute_status(event: &Event, now: DateTime<Utc>) -> EventStatus {
    let lifecycle_state = if event.admin_status == Some(AdminStatus::Closed) {
        LifecycleState::Closed
    } else if now < event.start_date {
        LifecycleState::Upcoming
    } else if now < event.end_date {
        LifecycleState::Live
    } else {
        LifecycleState::Past
    };

    let (registration_state, registration_mode) = match event.registration_override {
        Some(RegistrationOverride::Open) => (RegistrationState::Open, RegistrationMode::Manual),
        Some(RegistrationOverride::Closed) => (RegistrationState::Closed, RegistrationMode::Manual),
        None => (registration_window_state(event, now), RegistrationMode::Auto),
    };

    let is_registration_open = registration_state == RegistrationState::Open
        && matches!(lifecycle_state, LifecycleState::Upcoming | LifecycleState::Live);

    EventStatus {
        lifecycle_state,
        registration_state,
        registration_mode,
        is_registration_open,
    }
}

fn registration_window_state(event: &Event, now: DateTime<Utc>) -> RegistrationState {
    if now < event.registration_start {
        RegistrationState::OpeningSoon
    } else if now <= event.registration_end {
        RegistrationState::Open
    } else {
        RegistrationState::Closed
    }
}
