//! Prompt Loader
//!
//! Loads prompt templates from files or falls back to embedded defaults.

use std::path::{Path, PathBuf};

use eyre::{Result, eyre};
use handlebars::Handlebars;
use serde::Serialize;
use tracing::debug;

use super::embedded;

/// Loads and renders prompt templates
pub struct PromptLoader {
    /// Handlebars template engine
    hbs: Handlebars<'static>,
    /// User override directory (e.g., `.draftdaemon/prompts/`)
    user_dir: Option<PathBuf>,
    /// Repo default directory (e.g., `prompts/`)
    repo_dir: Option<PathBuf>,
}

impl PromptLoader {
    /// Create a new prompt loader rooted at the given project directory
    ///
    /// Looks for overrides in `.draftdaemon/prompts/` and `prompts/` under
    /// the root.
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        let user_dir = root.join(".draftdaemon/prompts");
        let repo_dir = root.join("prompts");

        Self {
            hbs: Handlebars::new(),
            user_dir: if user_dir.exists() { Some(user_dir) } else { None },
            repo_dir: if repo_dir.exists() { Some(repo_dir) } else { None },
        }
    }

    /// Create a loader that only uses embedded prompts (for testing)
    pub fn embedded_only() -> Self {
        Self {
            hbs: Handlebars::new(),
            user_dir: None,
            repo_dir: None,
        }
    }

    /// Load a template by name
    ///
    /// Checks in order:
    /// 1. User override: `.draftdaemon/prompts/{name}.pmt`
    /// 2. Repo default: `prompts/{name}.pmt`
    /// 3. Embedded fallback
    fn load_template(&self, name: &str) -> Result<String> {
        if let Some(ref user_dir) = self.user_dir {
            let path = user_dir.join(format!("{}.pmt", name));
            if path.exists() {
                debug!("Loading prompt from user override: {:?}", path);
                return std::fs::read_to_string(&path)
                    .map_err(|e| eyre!("Failed to read user prompt {}: {}", path.display(), e));
            }
        }

        if let Some(ref repo_dir) = self.repo_dir {
            let path = repo_dir.join(format!("{}.pmt", name));
            if path.exists() {
                debug!("Loading prompt from repo: {:?}", path);
                return std::fs::read_to_string(&path)
                    .map_err(|e| eyre!("Failed to read repo prompt {}: {}", path.display(), e));
            }
        }

        if let Some(content) = embedded::get_embedded(name) {
            debug!("Using embedded prompt: {}", name);
            return Ok(content.to_string());
        }

        Err(eyre!("Prompt template not found: {}", name))
    }

    /// Render a template with the given context
    pub fn render<T: Serialize>(&self, template_name: &str, context: &T) -> Result<String> {
        let template = self.load_template(template_name)?;
        self.hbs
            .render_template(&template, context)
            .map_err(|e| eyre!("Failed to render template {}: {}", template_name, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn embedded_interview_renders_question_list() {
        let loader = PromptLoader::embedded_only();
        let context = json!({
            "document_type_name": "Service Agreement",
            "questions": [
                {"id": "q-client", "text": "Who is the client?", "tier": "must", "option_ids": ""},
            ],
            "context_json": "{}",
            "must_answered": 0,
            "must_total": 3,
            "gate_ready": false,
        });

        let prompt = loader.render("interview", &context).unwrap();
        assert!(prompt.contains("Service Agreement"));
        assert!(prompt.contains("q-client"));
        assert!(prompt.contains("[must]"));
    }

    #[test]
    fn json_blobs_render_unescaped() {
        let loader = PromptLoader::embedded_only();
        let context = json!({
            "document_type_name": "NDA",
            "context_json": "{\"scope\": \"<broad>\"}",
            "candidates_text": "",
        });

        let prompt = loader.render("skeleton", &context).unwrap();
        assert!(prompt.contains("{\"scope\": \"<broad>\"}"));
    }

    #[test]
    fn user_override_wins_over_embedded() {
        let root = TempDir::new().unwrap();
        let dir = root.path().join(".draftdaemon/prompts");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("interview.pmt"), "override for {{document_type_name}}").unwrap();

        let loader = PromptLoader::new(root.path());
        let prompt = loader
            .render("interview", &json!({"document_type_name": "NDA"}))
            .unwrap();
        assert_eq!(prompt, "override for NDA");
    }

    #[test]
    fn unknown_template_errors() {
        let loader = PromptLoader::embedded_only();
        let err = loader.render("nope", &json!({})).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
