use serde::{Deserialize, Serialize};
use triage_core::Persona;
use utoipa::ToSchema;

/// A persona and what it sees and may do.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PersonaRes {
    pub id: String,
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub icon: String,
    pub shows_patient_list: bool,
    /// Statuses in this persona's list; empty means every status.
    pub visible_statuses: Vec<String>,
    /// Transitions this persona may perform.
    pub actions: Vec<String>,
}

impl From<Persona> for PersonaRes {
    fn from(persona: Persona) -> Self {
        let profile = persona.profile();
        Self {
            id: persona.to_string(),
            title: profile.title.into(),
            subtitle: profile.subtitle.into(),
            description: profile.description.into(),
            icon: profile.icon.into(),
            shows_patient_list: profile.shows_patient_list,
            visible_statuses: persona
                .visible_statuses()
                .unwrap_or_default()
                .iter()
                .map(|s| s.to_string())
                .collect(),
            actions: persona.actions().iter().map(|a| a.to_string()).collect(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ListPersonasRes {
    pub personas: Vec<PersonaRes>,
}

impl ListPersonasRes {
    pub fn all() -> Self {
        Self {
            personas: Persona::ALL.into_iter().map(PersonaRes::from).collect(),
        }
    }
}
