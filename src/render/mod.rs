//! Templating collaborator.
//!
//! The dispatcher hands a [`RenderContext`] and a view identifier to a
//! [`Renderer`] and gets back a body. `MiniJinjaRenderer` is the production
//! implementation; tests substitute their own.

pub mod jinja;

use std::path::PathBuf;

use thiserror::Error;

use crate::dispatch::RenderContext;

pub use jinja::MiniJinjaRenderer;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("failed to list templates: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("failed to read template {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("render failed: {0}")]
    Other(String),
}

/// Turns a view identifier and a context into a response body.
pub trait Renderer: Send + Sync {
    fn render(&self, view: &str, context: &RenderContext<'_>) -> Result<String, RenderError>;
}
