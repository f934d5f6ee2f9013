//! Personas: the identities orders are attributed to.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// User id of the synthetic placeholder persona.
pub const UNKNOWN_PERSONA_ID: &str = "unknown";

/// A selectable identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Persona {
    pub user_id: String,
    pub user_name: String,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub bio: String,
}

impl Persona {
    pub fn new(user_id: impl Into<String>, user_name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            user_name: user_name.into(),
            avatar_url: String::new(),
            bio: String::new(),
        }
    }

    /// Placeholder used when the roster is empty.
    pub fn placeholder() -> Self {
        Self::new(UNKNOWN_PERSONA_ID, "Unknown User")
    }

    pub fn is_placeholder(&self) -> bool {
        self.user_id == UNKNOWN_PERSONA_ID
    }
}

/// Create/update payload for `/api/personas`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonaPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub user_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

impl PersonaPayload {
    pub fn new(user_name: impl Into<String>) -> Self {
        Self {
            user_name: user_name.into(),
            ..Self::default()
        }
    }

    pub fn with_bio(mut self, bio: impl Into<String>) -> Self {
        self.bio = Some(bio.into());
        self
    }

    pub fn with_avatar_url(mut self, avatar_url: impl Into<String>) -> Self {
        self.avatar_url = Some(avatar_url.into());
        self
    }

    /// Trim text fields and reject an empty display name.
    pub fn normalized(self) -> Result<Self> {
        let user_name = self.user_name.trim().to_string();
        if user_name.is_empty() {
            return Err(CoreError::InvalidPersona(
                "Display name is required".to_string(),
            ));
        }
        Ok(Self {
            user_id: self.user_id.map(|id| id.trim().to_string()).filter(|id| !id.is_empty()),
            user_name,
            avatar_url: self.avatar_url,
            bio: self.bio.map(|bio| bio.trim().to_string()),
        })
    }
}

/// Sort a roster by display name, case-insensitively, then by id.
pub fn sort_personas(list: &mut [Persona]) {
    list.sort_by(|a, b| {
        a.user_name
            .to_lowercase()
            .cmp(&b.user_name.to_lowercase())
            .then_with(|| a.user_id.cmp(&b.user_id))
    });
}

/// Built-in roster used at startup and whenever the API cannot be reached.
pub fn seed_personas() -> Vec<Persona> {
    let seeds = [
        (
            "semper-augustus",
            "Semper Augustus",
            "Collector of the rarest flamed bulbs. Buys on rumours, sells on facts.",
        ),
        (
            "admiral-liefkens",
            "Admiral Liefkens",
            "Patient market maker who quotes both sides of every tavern auction.",
        ),
        (
            "viceroy-trader",
            "Viceroy Trader",
            "Momentum chaser. Never met a rally he didn't like.",
        ),
        (
            "gouda-gardener",
            "Gouda Gardener",
            "Grows the bulbs, hedges the harvest, keeps the books.",
        ),
    ];

    let mut personas: Vec<Persona> = seeds
        .into_iter()
        .map(|(id, name, bio)| Persona {
            user_id: id.to_string(),
            user_name: name.to_string(),
            avatar_url: String::new(),
            bio: bio.to_string(),
        })
        .collect();
    sort_personas(&mut personas);
    personas
}
