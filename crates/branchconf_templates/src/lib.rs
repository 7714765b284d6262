//! # branchconf_templates
//!
//! Template rendering for branchconf.
//!
//! The lifecycle engine never renders templates itself. It hands a template
//! path and a data bag to a [`RenderGateway`] and writes whatever text comes
//! back. This crate defines that seam and ships [`EjsRenderer`], a renderer
//! for the `<%= key %>` / `<%- key %>` subset of EJS used by proxy
//! configuration templates.
//!
//! ## Example
//!
//! ```rust,no_run
//! use branchconf_templates::{EjsRenderer, RenderGateway, TemplateData};
//! use std::path::Path;
//!
//! # async fn demo() -> branchconf_templates::TemplateResult<()> {
//! let mut data = TemplateData::new();
//! data.insert("branch".into(), "develop".into());
//!
//! let renderer = EjsRenderer::new();
//! let text = renderer.render(Path::new("templates/nginx.tmpl"), &data).await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod renderer;

pub use error::{TemplateError, TemplateResult};
pub use renderer::{EjsRenderer, RenderGateway, TemplateData};
