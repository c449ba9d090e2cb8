//! System instruction built from the knowledge base.
//!
//! The prompt is the only grounding the model gets, so every knowledge base
//! field is embedded verbatim.

use accueil_types::KnowledgeBase;
use std::fmt::Write;

/// Builds the system instruction for one knowledge base. Pure and deterministic.
pub fn build_system_prompt(kb: &KnowledgeBase) -> String {
    let mut prompt = String::with_capacity(768);

    let _ = writeln!(
        prompt,
        "Tu es l'assistant téléphonique professionnel de {}, une petite entreprise.",
        kb.name
    );
    prompt.push_str(
        "Objectif: répondre utilement et poliment, en une ou deux phrases maximum.\n",
    );
    prompt.push_str(
        "Pour toute question factuelle (horaires, adresse, téléphone, tarifs, politiques), \
         utilise STRICTEMENT et UNIQUEMENT ces données:\n",
    );
    for (label, value) in kb.fields() {
        let _ = writeln!(prompt, "- {}: {}", label, value);
    }
    prompt.push_str(
        "N'invente jamais une information qui ne figure pas ci-dessus.\n\
         Si la question sort de ce cadre, réponds brièvement que tu transmets la demande \
         à un membre de l'équipe, qui rappellera.\n\
         Langue: réponds toujours en français, quelle que soit la langue de l'appelant.\n\
         Ton: chaleureux, professionnel et constant. Pas de listes, pas de longues explications.",
    );

    prompt
}
