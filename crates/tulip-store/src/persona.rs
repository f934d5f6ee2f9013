//! Persona store: who is acting, and the roster to choose from.
//!
//! Lifecycle: `Idle → Loading → {Ready | Error}`. `Error` still leaves a
//! usable roster: a failed load falls back to the seed personas, so the
//! terminal is never without someone to act as.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use tulip_api::{ApiError, PersonaApi};
use tulip_core::{sort_personas, Persona, PersonaPayload, UNKNOWN_PERSONA_ID};
use tulip_telemetry::Metrics;

use crate::error::{StoreError, StoreResult};
use crate::generation::Generation;
use crate::{LoadOutcome, LoadStatus};

/// Observable persona state.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonaSnapshot {
    /// Roster sorted by display name.
    pub personas: Vec<Persona>,
    pub active_id: String,
    pub status: LoadStatus,
    pub error: Option<String>,
}

impl PersonaSnapshot {
    /// The active persona, else the first roster entry, else the placeholder.
    pub fn active(&self) -> Persona {
        self.personas
            .iter()
            .find(|p| p.user_id == self.active_id)
            .or_else(|| self.personas.first())
            .cloned()
            .unwrap_or_else(Persona::placeholder)
    }

    pub fn contains(&self, user_id: &str) -> bool {
        self.personas.iter().any(|p| p.user_id == user_id)
    }

    /// Active id re-anchored onto `personas`: kept if present, else first entry.
    fn anchor(personas: &[Persona], current: &str) -> String {
        if personas.iter().any(|p| p.user_id == current) {
            current.to_string()
        } else {
            personas
                .first()
                .map(|p| p.user_id.clone())
                .unwrap_or_else(|| UNKNOWN_PERSONA_ID.to_string())
        }
    }
}

struct Inner {
    api: Arc<dyn PersonaApi>,
    seeds: Vec<Persona>,
    state: watch::Sender<PersonaSnapshot>,
    generation: Generation,
}

/// Single source of truth for the acting persona.
#[derive(Clone)]
pub struct PersonaStore {
    inner: Arc<Inner>,
}

impl PersonaStore {
    /// Create a store seeded with `seeds`. Nothing is fetched until `load`.
    pub fn new(api: Arc<dyn PersonaApi>, seeds: Vec<Persona>) -> Self {
        let mut seeds = seeds;
        sort_personas(&mut seeds);
        let active_id = seeds
            .first()
            .map(|p| p.user_id.clone())
            .unwrap_or_else(|| UNKNOWN_PERSONA_ID.to_string());

        let (state, _) = watch::channel(PersonaSnapshot {
            personas: seeds.clone(),
            active_id,
            status: LoadStatus::Idle,
            error: None,
        });

        Self {
            inner: Arc::new(Inner {
                api,
                seeds,
                state,
                generation: Generation::new(),
            }),
        }
    }

    pub fn snapshot(&self) -> PersonaSnapshot {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PersonaSnapshot> {
        self.inner.state.subscribe()
    }

    pub fn active_persona(&self) -> Persona {
        self.inner.state.borrow().active()
    }

    pub fn personas(&self) -> Vec<Persona> {
        self.inner.state.borrow().personas.clone()
    }

    /// Switch the active persona. Membership is trusted.
    pub fn set_active(&self, persona: &Persona) {
        self.set_active_id(&persona.user_id);
    }

    pub fn set_active_id(&self, user_id: &str) {
        self.inner.state.send_if_modified(|s| {
            if s.active_id == user_id {
                return false;
            }
            s.active_id = user_id.to_string();
            true
        });
        debug!(user_id, "Active persona switched");
    }

    /// Fire the initial load in the background.
    pub fn spawn_autoload(&self) -> JoinHandle<LoadOutcome> {
        let store = self.clone();
        tokio::spawn(async move { store.load().await })
    }

    /// Replace the roster with the remote one.
    ///
    /// An empty remote roster or a failed fetch resets to the seeds. Only the
    /// most recently started load may commit.
    pub async fn load(&self) -> LoadOutcome {
        let ticket = self.inner.generation.begin();
        self.set_status(LoadStatus::Loading);

        let result = self.inner.api.list_personas().await;

        if !self.inner.generation.is_current(ticket) {
            debug!(ticket, "Discarding superseded persona load");
            Metrics::stale_response("personas");
            return LoadOutcome::Stale;
        }

        match result {
            Ok(remote) => {
                let from_remote = !remote.is_empty();
                let mut next = if from_remote { remote } else { self.inner.seeds.clone() };
                sort_personas(&mut next);

                self.inner.state.send_modify(|s| {
                    s.active_id = PersonaSnapshot::anchor(&next, &s.active_id);
                    s.personas = next;
                    s.status = LoadStatus::Ready;
                    s.error = None;
                });
                Metrics::persona_sync("ready");
                info!(from_remote, count = self.inner.state.borrow().personas.len(), "Personas synced");
                LoadOutcome::Applied
            }
            Err(e) => {
                let message = persona_error_message(&e);
                warn!(error = %e, "Failed to load personas, falling back to seed data");
                let seeds = self.inner.seeds.clone();
                self.inner.state.send_modify(|s| {
                    s.active_id = PersonaSnapshot::anchor(&seeds, &s.active_id);
                    s.personas = seeds;
                    s.status = LoadStatus::Error;
                    s.error = Some(message.clone());
                });
                Metrics::persona_sync("fallback");
                LoadOutcome::Failed(message)
            }
        }
    }

    /// Create a persona and make it active.
    pub async fn create(&self, payload: PersonaPayload) -> StoreResult<Persona> {
        let payload = payload.normalized()?;
        self.set_status(LoadStatus::Loading);

        let created = self
            .inner
            .api
            .create_persona(&payload)
            .await
            .map_err(|e| self.fail(e))?;

        // Anything fetched before this point no longer reflects the server.
        self.inner.generation.invalidate();
        self.inner.state.send_modify(|s| {
            s.personas.retain(|p| p.user_id != created.user_id);
            s.personas.push(created.clone());
            sort_personas(&mut s.personas);
            s.active_id = created.user_id.clone();
            s.status = LoadStatus::Ready;
            s.error = None;
        });
        info!(user_id = %created.user_id, "Persona created and activated");
        Ok(created)
    }

    /// Update a persona in place. The active persona does not change.
    pub async fn update(&self, user_id: &str, payload: PersonaPayload) -> StoreResult<Persona> {
        let payload = payload.normalized()?;
        self.set_status(LoadStatus::Loading);

        let updated = self
            .inner
            .api
            .update_persona(user_id, &payload)
            .await
            .map_err(|e| self.fail(e))?;

        self.inner.generation.invalidate();
        self.inner.state.send_modify(|s| {
            for persona in s.personas.iter_mut() {
                if persona.user_id == user_id {
                    *persona = updated.clone();
                }
            }
            sort_personas(&mut s.personas);
            s.status = LoadStatus::Ready;
            s.error = None;
        });
        info!(user_id, "Persona updated");
        Ok(updated)
    }

    /// Delete a persona, re-anchoring the active one if it was removed.
    pub async fn delete(&self, user_id: &str) -> StoreResult<()> {
        {
            let state = self.inner.state.borrow();
            if state.personas.len() == 1 && state.contains(user_id) {
                warn!(user_id, "Deleting the last remaining persona");
            }
        }
        self.set_status(LoadStatus::Loading);

        self.inner
            .api
            .delete_persona(user_id)
            .await
            .map_err(|e| self.fail(e))?;

        self.inner.generation.invalidate();
        self.inner.state.send_modify(|s| {
            s.personas.retain(|p| p.user_id != user_id);
            if s.active_id == user_id {
                s.active_id = s
                    .personas
                    .first()
                    .map(|p| p.user_id.clone())
                    .unwrap_or_else(|| UNKNOWN_PERSONA_ID.to_string());
            }
            s.status = LoadStatus::Ready;
            s.error = None;
        });
        info!(user_id, "Persona deleted");
        Ok(())
    }

    fn set_status(&self, status: LoadStatus) {
        self.inner.state.send_if_modified(|s| {
            let changed = s.status != status;
            s.status = status;
            changed
        });
    }

    /// Record a failed CRUD call. The roster is left as it was.
    fn fail(&self, err: ApiError) -> StoreError {
        let message = persona_error_message(&err);
        warn!(error = %err, "Persona request failed");
        self.inner.state.send_modify(|s| {
            s.status = LoadStatus::Error;
            s.error = Some(message);
        });
        err.into()
    }
}

fn persona_error_message(err: &ApiError) -> String {
    match err {
        ApiError::Unreachable { reason, .. } => format!("Personas API unreachable: {reason}"),
        other => other.user_message(),
    }
}
