//! MiniJinja-backed renderer.

use std::path::Path;

use minijinja::Environment;
use walkdir::WalkDir;

use crate::dispatch::RenderContext;
use crate::render::{RenderError, Renderer};
use crate::routing::access::{self, RoleSet};

pub struct MiniJinjaRenderer {
    env: Environment<'static>,
}

impl MiniJinjaRenderer {
    /// Compile every template under `dir`; view identifiers are paths inside it.
    ///
    /// Templates are read once here, so rendering never touches the filesystem.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, RenderError> {
        let dir = dir.as_ref();
        let mut templates = Vec::new();
        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry
                .path()
                .strip_prefix(dir)
                .map_err(|_| {
                    RenderError::Other(format!("{} is outside {}", entry.path().display(), dir.display()))
                })?
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            let source = std::fs::read_to_string(entry.path()).map_err(|source| RenderError::Io {
                path: entry.path().to_path_buf(),
                source,
            })?;
            templates.push((name, source));
        }
        tracing::debug!(directory = %dir.display(), templates = templates.len(), "Templates loaded");
        Self::from_templates(templates)
    }

    /// Build from in-memory `(name, source)` pairs.
    pub fn from_templates<I>(templates: I) -> Result<Self, RenderError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut env = Environment::new();
        for (name, source) in templates {
            env.add_template_owned(name, source)?;
        }
        register_globals(&mut env);
        Ok(Self { env })
    }
}

/// Expose the access predicate as `has_access(caller_roles, required_roles)`.
fn register_globals(env: &mut Environment<'static>) {
    env.add_function("has_access", |caller: Vec<String>, required: Vec<String>| {
        let caller: RoleSet = caller.into_iter().collect();
        let required: RoleSet = required.into_iter().collect();
        access::allows(&caller, &required)
    });
}

impl Renderer for MiniJinjaRenderer {
    fn render(&self, view: &str, context: &RenderContext<'_>) -> Result<String, RenderError> {
        let template = self.env.get_template(view)?;
        Ok(template.render(context)?)
    }
}
