//! Static business knowledge, call script lines, and the urgency lexicon.
//!
//! All three are loaded once from configuration and never mutated.

use serde::{Deserialize, Serialize};

/// Business facts the assistant is allowed to state.
///
/// These six fields are the only grounding material given to the language
/// model; there is no retrieval step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeBase {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub hours: String,
    pub pricing: String,
    pub policies: String,
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self {
            name: "Cabinet Santé Active".to_string(),
            address: "12 rue de Paris, 75010 Paris".to_string(),
            phone: "+33 1 23 45 67 89".to_string(),
            hours: "Lundi–Samedi, 9h–19h".to_string(),
            pricing: "Séance: 50€; Bilan initial: 65€".to_string(),
            policies: "Annulation 24h à l'avance sans frais. En cas d'urgence, appelez le 112."
                .to_string(),
        }
    }
}

impl KnowledgeBase {
    /// Returns `(label, value)` pairs in prompt order.
    pub fn fields(&self) -> [(&'static str, &str); 6] {
        [
            ("Nom", self.name.as_str()),
            ("Adresse", self.address.as_str()),
            ("Téléphone", self.phone.as_str()),
            ("Horaires", self.hours.as_str()),
            ("Tarifs", self.pricing.as_str()),
            ("Politique", self.policies.as_str()),
        ]
    }
}

/// Fixed lines spoken by the assistant outside of generated replies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallScript {
    /// Spoken inside the listening instruction on the first turn.
    pub greeting: String,
    /// Spoken when the caller said nothing intelligible.
    pub reprompt: String,
    /// Spoken after the reply when the utterance was classified urgent.
    pub escalation_notice: String,
    /// Last line of every answered turn.
    pub closing: String,
    /// Reply used whenever the language model cannot produce one.
    pub fallback_reply: String,
    /// Spoken when the webhook payload itself could not be understood.
    pub technical_apology: String,
    /// Provider speech timeout passed to the listening instruction.
    pub speech_timeout: String,
    /// Length of the pauses around the escalation notice and closing line.
    pub pause_seconds: u32,
    /// Human transfer target. Escalation only announces the transfer when unset.
    pub transfer_number: Option<String>,
}

impl Default for CallScript {
    fn default() -> Self {
        Self {
            greeting: "Bonjour, vous êtes bien au standard du cabinet. \
                       Dites-moi en quelques mots ce dont vous avez besoin."
                .to_string(),
            reprompt: "Je n'ai pas bien saisi. Pouvez-vous répéter, s'il vous plaît ?".to_string(),
            escalation_notice: "Je vous transfère immédiatement.".to_string(),
            closing: "Merci pour votre appel. Bonne journée.".to_string(),
            fallback_reply:
                "Je transmets votre demande à un collègue et nous vous recontactons très vite."
                    .to_string(),
            technical_apology: "Désolé, un souci technique est survenu. \
                                Je vous propose de rappeler dans quelques instants."
                .to_string(),
            speech_timeout: "auto".to_string(),
            pause_seconds: 1,
            transfer_number: None,
        }
    }
}

/// Keywords that mark a caller utterance as urgent.
///
/// Matching is a case-insensitive substring test, so `"urgen"`-style stems
/// catch inflections. False positives only add a transfer notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UrgencyLexicon {
    pub keywords: Vec<String>,
}

impl Default for UrgencyLexicon {
    fn default() -> Self {
        Self {
            keywords: [
                "urgence",
                "urgent",
                "fuite",
                "accident",
                "douleur",
                "immédiat",
                "immediat",
                "saigne",
                "saignement",
                "malaise",
                "évanoui",
                "respire mal",
            ]
            .iter()
            .map(|k| k.to_string())
            .collect(),
        }
    }
}

impl UrgencyLexicon {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keywords: keywords.into_iter().map(Into::into).collect(),
        }
    }
}
