//! Document type catalog
//!
//! A document type bundles the interview question set for one kind of
//! document. Builtin types are compiled in; additional or overriding types
//! load from YAML files in configured directories, one type per file, keyed
//! by id with later directories winning.

use std::collections::BTreeMap;
use std::path::PathBuf;

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::domain::Question;

/// One document type and its interview questions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentTypeDef {
    /// Stable id used in session records
    pub id: String,

    /// Display name
    pub name: String,

    /// One-line description shown when listing types
    #[serde(default)]
    pub description: String,

    /// Interview question set, in document order
    #[serde(default)]
    pub questions: Vec<Question>,
}

/// Builtin document type definitions (embedded in binary)
const BUILTIN_SERVICE_AGREEMENT: &str = include_str!("builtin_types/service-agreement.yml");
const BUILTIN_MUTUAL_NDA: &str = include_str!("builtin_types/mutual-nda.yml");

/// All known document types, keyed by id
pub struct Catalog {
    types: BTreeMap<String, DocumentTypeDef>,
}

impl Catalog {
    /// Builtin types plus YAML overrides from the given directories
    pub fn load(dirs: &[PathBuf]) -> Result<Self> {
        let mut types = parse_builtin()?;

        for dir in dirs {
            if !dir.exists() {
                debug!(?dir, "Document type directory absent, skipping");
                continue;
            }
            let pattern = dir.join("*.yml");
            let paths = glob::glob(&pattern.to_string_lossy())
                .context("Invalid document type glob pattern")?;
            for entry in paths {
                let path = entry?;
                let content = std::fs::read_to_string(&path)
                    .context(format!("Failed to read document type: {}", path.display()))?;
                let def: DocumentTypeDef = serde_yaml::from_str(&content)
                    .context(format!("Failed to parse document type: {}", path.display()))?;
                if types.contains_key(&def.id) {
                    info!(id = %def.id, path = %path.display(), "Overriding document type");
                } else {
                    info!(id = %def.id, path = %path.display(), "Loaded document type");
                }
                types.insert(def.id.clone(), def);
            }
        }

        for def in types.values() {
            if def.questions.is_empty() {
                warn!(id = %def.id, "Document type has no questions");
            }
        }

        Ok(Self { types })
    }

    /// Builtins only, no directory scan
    pub fn builtin() -> Result<Self> {
        Ok(Self {
            types: parse_builtin()?,
        })
    }

    /// Build from explicit definitions (used by tests)
    pub fn from_types(defs: Vec<DocumentTypeDef>) -> Self {
        Self {
            types: defs.into_iter().map(|d| (d.id.clone(), d)).collect(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&DocumentTypeDef> {
        self.types.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.types.contains_key(id)
    }

    /// Interview questions for a type, empty when the type is unknown
    pub fn questions(&self, id: &str) -> &[Question] {
        self.types.get(id).map(|d| d.questions.as_slice()).unwrap_or(&[])
    }

    /// All types, sorted by id
    pub fn iter(&self) -> impl Iterator<Item = &DocumentTypeDef> {
        self.types.values()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.types.keys().map(|k| k.as_str()).collect()
    }
}

fn parse_builtin() -> Result<BTreeMap<String, DocumentTypeDef>> {
    let mut types = BTreeMap::new();
    for source in [BUILTIN_SERVICE_AGREEMENT, BUILTIN_MUTUAL_NDA] {
        let def: DocumentTypeDef =
            serde_yaml::from_str(source).context("Builtin document type failed to parse")?;
        types.insert(def.id.clone(), def);
    }
    Ok(types)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RequiredLevel;
    use tempfile::TempDir;

    #[test]
    fn builtin_types_parse_and_are_nonempty() {
        let catalog = Catalog::builtin().unwrap();
        assert!(catalog.contains("service-agreement"));
        assert!(catalog.contains("mutual-nda"));
        assert!(!catalog.questions("service-agreement").is_empty());
    }

    #[test]
    fn builtin_service_agreement_has_all_tiers() {
        let catalog = Catalog::builtin().unwrap();
        let questions = catalog.questions("service-agreement");

        let musts = questions.iter().filter(|q| q.tier() == RequiredLevel::Must).count();
        let recommended = questions
            .iter()
            .filter(|q| q.tier() == RequiredLevel::Recommended)
            .count();
        let optional = questions
            .iter()
            .filter(|q| q.tier() == RequiredLevel::Optional)
            .count();

        assert!(musts >= 2);
        assert!(recommended >= 3);
        assert!(optional >= 1);
    }

    #[test]
    fn builtin_questions_have_affect_paths() {
        let catalog = Catalog::builtin().unwrap();
        for def in catalog.iter() {
            for q in &def.questions {
                assert!(!q.affects.is_empty(), "{} has no affects", q.id);
            }
        }
    }

    #[test]
    fn unknown_type_yields_empty_questions() {
        let catalog = Catalog::builtin().unwrap();
        assert!(catalog.questions("missing").is_empty());
        assert!(catalog.get("missing").is_none());
    }

    #[test]
    fn directory_types_override_builtins() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("custom.yml"),
            "id: service-agreement\nname: Custom SA\nquestions:\n  - id: q-only\n    text: solo?\n    affects: [solo]\n",
        )
        .unwrap();

        let catalog = Catalog::load(&[dir.path().to_path_buf()]).unwrap();
        assert_eq!(catalog.get("service-agreement").unwrap().name, "Custom SA");
        assert_eq!(catalog.questions("service-agreement").len(), 1);
    }

    #[test]
    fn missing_directories_are_skipped() {
        let catalog = Catalog::load(&[PathBuf::from("/nonexistent/doctypes")]).unwrap();
        assert!(catalog.contains("service-agreement"));
    }
}
