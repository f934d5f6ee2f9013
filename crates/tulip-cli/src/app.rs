//! Application wiring and command execution.
//!
//! Builds the stores from configuration and runs one command against them.
//! Output goes to the supplied writer; diagnostics go through `tracing`.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, warn};
use tulip_api::{ConfigApi, TulipClient};
use tulip_core::{avatar_data_url, Persona, PersonaPayload};
use tulip_store::{
    ApiStatus, BackendSelector, FilePreferences, LoadStatus, MarketPulse, OrderDesk,
    PersonaStore, PreferenceStore, StoreError, SubmitState, MISSING_API_URL_MESSAGE,
};
use tulip_telemetry::Metrics;

use crate::cli::{BackendCommand, Command, OrderCommand, PersonaCommand, PersonaFields, PersonaUpdate};
use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::render;

/// Preference key holding the last active persona id.
pub const ACTIVE_PERSONA_PREF_KEY: &str = "tb-active-persona";

/// Main application.
pub struct Application {
    config: AppConfig,
    prefs: Arc<dyn PreferenceStore>,
    backend: BackendSelector,
    client: Option<Arc<TulipClient>>,
}

impl Application {
    /// Create the application. No request is made here.
    pub fn new(config: AppConfig) -> AppResult<Self> {
        let prefs: Arc<dyn PreferenceStore> =
            Arc::new(FilePreferences::open(&config.preferences_path));
        Self::with_preferences(config, prefs)
    }

    pub fn with_preferences(config: AppConfig, prefs: Arc<dyn PreferenceStore>) -> AppResult<Self> {
        config.validate()?;

        let client = match config.api_url() {
            Some(url) => Some(Arc::new(TulipClient::new(url, config.request_timeout())?)),
            None => {
                debug!("No API URL configured");
                None
            }
        };
        let backend = BackendSelector::new(prefs.clone());

        Ok(Self {
            config,
            prefs,
            backend,
            client,
        })
    }

    /// Run a single command, writing its output to `out`.
    pub async fn run(&self, command: Command, out: &mut dyn Write) -> AppResult<()> {
        match command {
            Command::Status => self.status(out).await,
            Command::Personas(cmd) => self.personas(cmd, out).await,
            Command::Orders(cmd) => self.orders(cmd, out).await,
            Command::Backend(cmd) => self.backend(cmd, out).await,
            Command::Pulse { watch } => self.pulse(watch, out).await,
            Command::Metrics => {
                out.write_all(Metrics::render()?.as_bytes())?;
                Ok(())
            }
        }
    }

    async fn status(&self, out: &mut dyn Write) -> AppResult<()> {
        let api = self.client.clone().map(|c| c as Arc<dyn ConfigApi>);
        let state = ApiStatus::new(api).load().await;
        write!(out, "{}", render::status(&state))?;
        Ok(())
    }

    async fn personas(&self, cmd: PersonaCommand, out: &mut dyn Write) -> AppResult<()> {
        let store = self.persona_store().await?;

        match cmd {
            PersonaCommand::List => {}
            PersonaCommand::Create(fields) => {
                let payload = create_payload(fields)?;
                let created = store
                    .create(payload)
                    .await
                    .map_err(|e| persona_failure(&store, e))?;
                self.remember_active(&created.user_id);
                writeln!(out, "Created {} ({})", created.user_name, created.user_id)?;
            }
            PersonaCommand::Update { id, fields } => {
                let current = store
                    .personas()
                    .into_iter()
                    .find(|p| p.user_id == id)
                    .ok_or_else(|| AppError::UnknownPersona(id.clone()))?;
                let payload = update_payload(&current, fields)?;
                let updated = store
                    .update(&id, payload)
                    .await
                    .map_err(|e| persona_failure(&store, e))?;
                writeln!(out, "Updated {} ({})", updated.user_name, updated.user_id)?;
            }
            PersonaCommand::Delete { id } => {
                store
                    .delete(&id)
                    .await
                    .map_err(|e| persona_failure(&store, e))?;
                self.remember_active(&store.active_persona().user_id);
                writeln!(out, "Deleted {id}")?;
            }
            PersonaCommand::Use { id } => {
                if !store.snapshot().contains(&id) {
                    return Err(AppError::UnknownPersona(id));
                }
                store.set_active_id(&id);
                self.remember_active(&id);
            }
        }

        write!(out, "{}", render::personas(&store.snapshot()))?;
        Ok(())
    }

    async fn orders(&self, cmd: OrderCommand, out: &mut dyn Write) -> AppResult<()> {
        let desk = self.order_desk().await?;

        match cmd {
            OrderCommand::List => {
                desk.refresh().await;
            }
            OrderCommand::Submit {
                side,
                price,
                quantity,
            } => {
                let ack = desk
                    .submit(side, &price, &quantity)
                    .await
                    .map_err(|e| submit_failure(&desk, e))?;
                write!(out, "{}", render::ack(&ack, desk.backend()))?;
            }
        }

        write!(out, "{}", render::orders(&desk.snapshot()))?;
        Ok(())
    }

    async fn backend(&self, cmd: BackendCommand, out: &mut dyn Write) -> AppResult<()> {
        match cmd {
            BackendCommand::Get => {
                let backend = self.backend.get();
                writeln!(out, "{} ({})", backend, backend.label())?;
            }
            BackendCommand::Set { backend } => {
                if self.client.is_some() {
                    let desk = self.order_desk().await?;
                    if desk.select_backend(backend).await.is_none() {
                        writeln!(out, "Already using {}", backend.label())?;
                    }
                    write!(out, "{}", render::orders(&desk.snapshot()))?;
                } else {
                    self.backend.set(backend);
                    writeln!(out, "Orders backend set to {}", backend.label())?;
                }
            }
        }
        Ok(())
    }

    async fn pulse(&self, watch: Option<usize>, out: &mut dyn Write) -> AppResult<()> {
        let pulse = MarketPulse::new(self.require_client()?);

        let Some(updates) = watch.filter(|n| *n > 0) else {
            pulse.refresh().await;
            write!(out, "{}", render::pulse(&pulse.snapshot()))?;
            return Ok(());
        };

        let mut rx = pulse.subscribe();
        let handle = pulse.spawn(self.config.pulse_interval());
        let mut printed = 0;

        while printed < updates {
            tokio::select! {
                changed = rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let state = rx.borrow_and_update().clone();
                    if !matches!(state.status, LoadStatus::Ready | LoadStatus::Error) {
                        continue;
                    }
                    write!(out, "{}", render::pulse(&state))?;
                    out.flush()?;
                    printed += 1;
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Interrupted, stopping pulse watch");
                    break;
                }
            }
        }

        handle.shutdown().await;
        Ok(())
    }

    /// Persona store loaded from the API, with the remembered persona restored.
    async fn persona_store(&self) -> AppResult<PersonaStore> {
        let store = PersonaStore::new(self.require_client()?, self.config.seed_personas()?);
        store.load().await;

        if let Some(id) = self.prefs.get(ACTIVE_PERSONA_PREF_KEY) {
            if store.snapshot().contains(&id) {
                store.set_active_id(&id);
            } else {
                debug!(user_id = %id, "Remembered persona no longer in roster");
            }
        }
        Ok(store)
    }

    async fn order_desk(&self) -> AppResult<OrderDesk> {
        let client = self.require_client()?;
        let personas = self.persona_store().await?;
        Ok(OrderDesk::new(
            client,
            personas,
            self.backend.clone(),
            self.config.order_desk(),
        ))
    }

    fn require_client(&self) -> AppResult<Arc<TulipClient>> {
        self.client
            .clone()
            .ok_or(AppError::Offline(MISSING_API_URL_MESSAGE))
    }

    fn remember_active(&self, user_id: &str) {
        if let Err(e) = self.prefs.set(ACTIVE_PERSONA_PREF_KEY, user_id) {
            warn!(error = %e, user_id, "Failed to persist active persona");
        }
    }
}

/// The message the desk recorded for a failed submit.
fn submit_failure(desk: &OrderDesk, err: StoreError) -> AppError {
    match desk.snapshot().submit {
        SubmitState::Failed(message) => AppError::Rejected(message),
        _ => err.into(),
    }
}

/// The message the persona store recorded for a failed write.
fn persona_failure(store: &PersonaStore, err: StoreError) -> AppError {
    let snapshot = store.snapshot();
    match (snapshot.status, snapshot.error) {
        (LoadStatus::Error, Some(message)) if matches!(err, StoreError::Api(_)) => {
            AppError::Rejected(message)
        }
        _ => err.into(),
    }
}

/// Avatar from `--avatar <file>` if given, else `--avatar-url`.
fn avatar_value(file: Option<PathBuf>, url: Option<String>) -> AppResult<Option<String>> {
    match file {
        Some(path) => {
            let bytes = std::fs::read(&path)?;
            debug!(path = %path.display(), bytes = bytes.len(), "Encoding avatar");
            let url = avatar_data_url(&bytes).map_err(|e| AppError::Rejected(e.to_string()))?;
            Ok(Some(url))
        }
        None => Ok(url),
    }
}

fn create_payload(fields: PersonaFields) -> AppResult<PersonaPayload> {
    let mut payload = PersonaPayload::new(fields.name);
    payload.user_id = fields.id;
    payload.bio = fields.bio;
    payload.avatar_url = avatar_value(fields.avatar, fields.avatar_url)?;
    Ok(payload)
}

fn update_payload(current: &Persona, fields: PersonaUpdate) -> AppResult<PersonaPayload> {
    let avatar_url = avatar_value(fields.avatar, fields.avatar_url)?;
    Ok(PersonaPayload {
        user_id: Some(current.user_id.clone()),
        user_name: fields.name.unwrap_or_else(|| current.user_name.clone()),
        bio: fields.bio.or_else(|| Some(current.bio.clone())),
        avatar_url: avatar_url.or_else(|| Some(current.avatar_url.clone())),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tulip_store::MemoryPreferences;

    #[test]
    fn test_update_payload_keeps_unspecified_fields() {
        let mut current = Persona::new("ann", "Ann");
        current.bio = "Tulip grower".to_string();

        let payload = update_payload(
            &current,
            PersonaUpdate {
                name: Some("Anna".to_string()),
                bio: None,
                avatar_url: None,
                avatar: None,
            },
        )
        .unwrap();
        assert_eq!(payload.user_id.as_deref(), Some("ann"));
        assert_eq!(payload.user_name, "Anna");
        assert_eq!(payload.bio.as_deref(), Some("Tulip grower"));
    }

    #[tokio::test]
    async fn test_offline_commands_report_missing_url() {
        let app = Application::with_preferences(
            AppConfig::default(),
            Arc::new(MemoryPreferences::new()),
        )
        .unwrap();

        let mut out = Vec::new();
        let err = app
            .run(Command::Orders(OrderCommand::List), &mut out)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), MISSING_API_URL_MESSAGE);

        app.run(Command::Status, &mut out).await.unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), format!("{MISSING_API_URL_MESSAGE}\n"));
    }

    #[tokio::test]
    async fn test_backend_set_offline_persists() {
        let prefs = Arc::new(MemoryPreferences::new());
        let app = Application::with_preferences(AppConfig::default(), prefs.clone()).unwrap();

        let mut out = Vec::new();
        app.run(
            Command::Backend(BackendCommand::Set {
                backend: tulip_core::OrdersBackend::Yugabyte,
            }),
            &mut out,
        )
        .await
        .unwrap();

        assert_eq!(
            prefs.get(tulip_store::BACKEND_PREF_KEY).as_deref(),
            Some("yugabyte")
        );
        assert_eq!(String::from_utf8(out).unwrap(), "Orders backend set to YugabyteDB\n");
    }
}
