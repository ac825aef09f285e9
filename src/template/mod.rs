//! Role binding and template rendering.
//!
//! A layout references monitors symbolically (`primary_display`,
//! `left_display`, `right_display`). [`resolve_layout`] replaces every
//! reference with the concrete monitor name, failing fast on any token
//! outside that vocabulary, and [`Renderer`] substitutes the fully
//! resolved, role-free variables into the template.
//!
//! The template language is flat `{{name}}` substitution. Structured
//! sections (workspace mappings, bindings, startup programs) are
//! pre-formatted into multi-line variables before substitution, so the
//! template itself needs no loops or conditionals.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{Config, Layout};
use crate::monitor::{DetectedMonitors, Role};

/// Default template compiled into the binary. A file named `i3.tmpl` in
/// the renderer's template directory overrides it.
pub const DEFAULT_TEMPLATE: &str = include_str!("i3.tmpl");
pub const TEMPLATE_FILENAME: &str = "i3.tmpl";

/// A layout referenced a role outside the fixed three-token vocabulary.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown monitor role '{role}' referenced by '{key}'")]
pub struct UnknownRole {
    pub key: String,
    pub role: String,
}

/// A layout with every role reference replaced by a monitor name.
/// Built fresh per render and discarded afterward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLayout {
    pub gaps_inner: i64,
    pub gaps_outer: i64,
    pub move_workspace: BTreeMap<String, String>,
    pub workspace_to_display: BTreeMap<String, String>,
}

/// Replace the role tokens in both layout maps with monitor names.
///
/// The first unknown token aborts the whole operation; no partially
/// resolved layout is ever returned. A recognized role that resolved to
/// the empty string (fewer monitors than the role's position) binds as
/// the empty string — degenerate but legal.
pub fn resolve_layout(
    layout: &Layout,
    monitors: &DetectedMonitors,
) -> Result<ResolvedLayout, UnknownRole> {
    Ok(ResolvedLayout {
        gaps_inner: layout.gaps_inner,
        gaps_outer: layout.gaps_outer,
        move_workspace: bind_roles(&layout.move_workspace, monitors)?,
        workspace_to_display: bind_roles(&layout.workspace_to_display, monitors)?,
    })
}

fn bind_roles(
    references: &BTreeMap<String, String>,
    monitors: &DetectedMonitors,
) -> Result<BTreeMap<String, String>, UnknownRole> {
    let mut bound = BTreeMap::new();
    for (key, token) in references {
        let role = Role::from_token(token).ok_or_else(|| UnknownRole {
            key: key.clone(),
            role: token.clone(),
        })?;
        bound.insert(key.clone(), monitors.by_role(role).to_string());
    }
    Ok(bound)
}

/// Renders the i3 configuration from the template and the resolved data.
pub struct Renderer {
    template_dir: Option<PathBuf>,
}

impl Renderer {
    /// `template_dir` is an optional directory checked for an `i3.tmpl`
    /// override before falling back to the embedded default.
    pub fn new(template_dir: Option<PathBuf>) -> Self {
        Self { template_dir }
    }

    /// Render the named layout to a string.
    pub fn render(
        &self,
        config: &Config,
        layout_name: &str,
        monitors: &DetectedMonitors,
    ) -> Result<String> {
        let layout = config.layout(layout_name)?;
        let resolved = resolve_layout(layout, monitors)?;
        let vars = build_vars(config, &resolved, monitors);
        let template = self.template_source()?;
        Ok(substitute(&template, &vars))
    }

    /// Render and write to `output_path`, creating missing parent
    /// directories. Nothing is written unless rendering succeeded in
    /// full, so a failed run never leaves a partial file behind.
    pub fn render_to_file(
        &self,
        config: &Config,
        layout_name: &str,
        monitors: &DetectedMonitors,
        output_path: &Path,
    ) -> Result<()> {
        let rendered = self.render(config, layout_name, monitors)?;
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create output directory {}", parent.display())
            })?;
        }
        fs::write(output_path, &rendered)
            .with_context(|| format!("failed to write output file {}", output_path.display()))?;
        info!(
            "wrote {} bytes to {}",
            rendered.len(),
            output_path.display()
        );
        Ok(())
    }

    /// Two-tier template lookup: filesystem override first, embedded
    /// default otherwise.
    fn template_source(&self) -> Result<Cow<'static, str>> {
        if let Some(dir) = &self.template_dir {
            let path = dir.join(TEMPLATE_FILENAME);
            if path.exists() {
                debug!("using template override {}", path.display());
                let contents = fs::read_to_string(&path)
                    .with_context(|| format!("failed to read template {}", path.display()))?;
                return Ok(Cow::Owned(contents));
            }
        }
        Ok(Cow::Borrowed(DEFAULT_TEMPLATE))
    }
}

/// Build the flat variable map handed to substitution. Everything here
/// is already role-free; the resolved layout and monitor set are the
/// only dynamic inputs.
fn build_vars(
    config: &Config,
    layout: &ResolvedLayout,
    monitors: &DetectedMonitors,
) -> BTreeMap<String, String> {
    let mut vars = BTreeMap::new();
    let mut set = |key: &str, value: String| {
        vars.insert(key.to_string(), value);
    };

    set("mod_key", config.i3.mod_key.clone());
    set("bar_font", config.i3.bar_font.clone());

    set("gaps_inner", layout.gaps_inner.to_string());
    set("gaps_outer", layout.gaps_outer.to_string());

    set("primary_display", monitors.primary.clone());
    set("left_display", monitors.left.clone());
    set("right_display", monitors.right.clone());

    let colors = &config.colors;
    set("base00", colors.base00.clone());
    set("base01", colors.base01.clone());
    set("base02", colors.base02.clone());
    set("base03", colors.base03.clone());
    set("base04", colors.base04.clone());
    set("base05", colors.base05.clone());
    set("base06", colors.base06.clone());
    set("base07", colors.base07.clone());
    set("base08", colors.base08.clone());
    set("base09", colors.base09.clone());
    set("base0A", colors.base0a.clone());
    set("base0B", colors.base0b.clone());
    set("base0C", colors.base0c.clone());
    set("base0D", colors.base0d.clone());
    set("base0E", colors.base0e.clone());
    set("base0F", colors.base0f.clone());

    set(
        "workspace_outputs",
        format_block(
            layout
                .workspace_to_display
                .iter()
                .map(|(workspace, monitor)| format!("workspace {workspace} output {monitor}")),
        ),
    );
    set(
        "move_workspace_bindings",
        format_block(layout.move_workspace.iter().map(|(binding, monitor)| {
            format!("bindsym {binding} move workspace to output {monitor}")
        })),
    );
    set(
        "application_bindings",
        format_block(
            config
                .application_bindings
                .iter()
                .map(|(binding, command)| format!("bindsym {binding} exec {command}")),
        ),
    );
    set(
        "startup_programs",
        format_block(
            config
                .startup_programs
                .iter()
                .map(|program| format!("exec --no-startup-id {program}")),
        ),
    );
    set(
        "window_overrides",
        format_block(config.window_overrides.iter().cloned()),
    );

    vars
}

fn format_block(lines: impl Iterator<Item = String>) -> String {
    lines.collect::<Vec<_>>().join("\n")
}

/// Replace every `{{name}}` present in the variable map. Placeholders
/// not in the map stay untouched, so user template overrides may carry
/// literal `{{` text.
fn substitute(template: &str, vars: &BTreeMap<String, String>) -> String {
    let mut rendered = template.to_string();
    for (key, value) in vars {
        rendered = rendered.replace(&format!("{{{{{key}}}}}"), value);
    }
    rendered
}
