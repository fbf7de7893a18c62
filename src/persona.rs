//! Persona configuration and loading
//!
//! A persona defines the fixed first-person character the gateway answers as.
//! Personas are TOML files; an embedded default is used when none is supplied.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Embedded default persona
const DEFAULT_PERSONA: &str = include_str!("../personas/default.toml");

/// A persona defines the identity the gateway speaks as
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Persona {
    /// Core identity
    pub identity: Identity,

    /// Character description and behavior
    pub personality: Personality,
}

/// Core identity of the persona
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Identity {
    /// Unique identifier
    pub id: String,

    /// Display name
    pub name: String,

    /// Short descriptive phrase
    pub tagline: Option<String>,
}

/// Character description and behavior
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Personality {
    /// Full first-person character description prepended to every prompt
    pub system_prompt: String,

    /// Personality traits
    #[serde(default)]
    pub traits: Vec<String>,

    /// Interview questions the persona is prepared for
    #[serde(default)]
    pub sample_questions: Vec<String>,
}

impl Persona {
    /// Load a persona from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed, or the persona
    /// is invalid.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Persona(format!("cannot read {}: {e}", path.display())))?;
        let persona: Self = toml::from_str(&text)
            .map_err(|e| Error::Persona(format!("cannot parse {}: {e}", path.display())))?;
        persona.validate()?;
        Ok(persona)
    }

    /// The embedded default persona
    ///
    /// # Panics
    ///
    /// Panics if the embedded persona file is malformed, which is a build
    /// defect caught by `embedded_persona_parses` in this module's tests.
    #[must_use]
    pub fn embedded() -> Self {
        toml::from_str(DEFAULT_PERSONA).expect("embedded persona must parse")
    }

    /// The fixed character description sent with every prompt
    #[must_use]
    pub fn system_prompt(&self) -> &str {
        &self.personality.system_prompt
    }

    /// Validate required fields
    ///
    /// # Errors
    ///
    /// Returns error if the identity or character description is empty.
    pub fn validate(&self) -> Result<()> {
        if self.identity.id.is_empty() {
            return Err(Error::Persona("identity.id cannot be empty".to_string()));
        }
        if self.identity.name.is_empty() {
            return Err(Error::Persona("identity.name cannot be empty".to_string()));
        }
        if self.personality.system_prompt.trim().is_empty() {
            return Err(Error::Persona(
                "personality.system_prompt cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_persona_parses() {
        let persona = Persona::embedded();
        assert!(persona.validate().is_ok());
        assert!(!persona.system_prompt().is_empty());
        assert!(!persona.personality.sample_questions.is_empty());
    }

    #[test]
    fn embedded_persona_speaks_first_person() {
        let persona = Persona::embedded();
        let prompt = persona.system_prompt();
        assert!(prompt.contains("first person"));
        assert!(prompt.contains("as an AI"));
    }

    #[test]
    fn empty_prompt_is_rejected() {
        let persona = Persona {
            identity: Identity {
                id: "x".to_string(),
                name: "X".to_string(),
                tagline: None,
            },
            personality: Personality {
                system_prompt: "   ".to_string(),
                traits: vec![],
                sample_questions: vec![],
            },
        };
        assert!(persona.validate().is_err());
    }
}
