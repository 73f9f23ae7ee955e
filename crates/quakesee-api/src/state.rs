//! Per-session server state
//!
//! Sessions are in-memory only and vanish with the process. All handler
//! access goes through the `RwLock` around the session map; lock poisoning
//! only happens if a writer panicked, at which point the state is
//! unrecoverable anyway, so the locks use `unwrap()`.

use std::collections::HashMap;
use std::sync::RwLock;

use uuid::Uuid;

use quakesee_core::geo::MapSelection;
use quakesee_core::models::{Event, Inventory};
use quakesee_core::waveform::Stream;
use quakesee_fdsn::isc::BulkProgress;

use crate::config::ApiConfig;
use crate::error::ApiError;

/// State of one dashboard session.
#[derive(Default)]
pub struct Session {
    pub events: Vec<Event>,
    /// Index into `events` of the currently selected earthquake.
    pub selected: Option<usize>,
    pub inventory: Inventory,
    pub stream: Stream,
    pub selection: MapSelection,
    pub bulk: BulkProgress,
}

impl Session {
    pub fn selected_event(&self) -> Result<&Event, ApiError> {
        let index = self
            .selected
            .ok_or_else(|| ApiError::bad_request("Please select an earthquake first"))?;
        self.events
            .get(index)
            .ok_or_else(|| ApiError::internal("Selected event index out of range"))
    }
}

pub struct AppState {
    pub sessions: RwLock<HashMap<Uuid, Session>>,
    pub config: ApiConfig,
}

impl AppState {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            config,
        }
    }

    pub fn create_session(&self) -> Uuid {
        let id = Uuid::new_v4();
        self.sessions.write().unwrap().insert(id, Session::default());
        id
    }

    pub fn drop_session(&self, id: Uuid) -> bool {
        self.sessions.write().unwrap().remove(&id).is_some()
    }

    /// Run `f` with shared access to a session.
    pub fn with_session<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&Session) -> Result<T, ApiError>,
    ) -> Result<T, ApiError> {
        let sessions = self.sessions.read().unwrap();
        let session = sessions
            .get(&id)
            .ok_or_else(|| ApiError::not_found(format!("Unknown session {id}")))?;
        f(session)
    }

    /// Run `f` with exclusive access to a session.
    pub fn with_session_mut<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut Session) -> Result<T, ApiError>,
    ) -> Result<T, ApiError> {
        let mut sessions = self.sessions.write().unwrap();
        let session = sessions
            .get_mut(&id)
            .ok_or_else(|| ApiError::not_found(format!("Unknown session {id}")))?;
        f(session)
    }
}
