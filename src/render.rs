//! Handlebars rendering for themed pages

use std::fs::{read_dir, read_to_string};
use std::path::{Path, PathBuf};

use handlebars::Handlebars;
use serde_json::{Map, Value};

use crate::context::RequestContext;
use crate::error::{ErrorPageError, Result};
use crate::fields::FieldSet;
use crate::page::PlaceholderPage;

/// Template every site theme is expected to provide
pub const GENERIC_TEMPLATE: &str = "Page";

const TEMPLATE_EXT: &str = "hbs";

/// Template registry for one theme.
///
/// Values are escaped before they enter the render context (see
/// [`crate::fields::FieldValue`]), so the registry itself never escapes.
pub struct PageRenderer {
    pub work_dir: PathBuf,
    handle: Handlebars<'static>,
    globals: Map<String, Value>,
}

impl std::fmt::Debug for PageRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageRenderer")
            .field("work_dir", &self.work_dir)
            .field("templates", &self.handle.get_templates().keys().collect::<Vec<_>>())
            .finish()
    }
}

impl PageRenderer {
    /// Empty registry, for themes registered from strings
    pub fn new(globals: Map<String, Value>) -> PageRenderer {
        let mut handle = Handlebars::new();
        handle.register_escape_fn(handlebars::no_escape);
        let globals = match escape_value(Value::Object(globals)) {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        PageRenderer {
            work_dir: PathBuf::new(),
            handle,
            globals,
        }
    }

    /// Loads `./themes/<theme_name>`
    pub fn for_theme(theme_name: &str, globals: Map<String, Value>) -> Result<PageRenderer> {
        PageRenderer::from_theme_dir(format!("./themes/{}", theme_name), globals)
    }

    /// Registers `<dir>/templates/*.hbs` as templates and
    /// `<dir>/templates/partials/*.hbs` as partials, named by file stem.
    pub fn from_theme_dir(dir: impl AsRef<Path>, globals: Map<String, Value>) -> Result<PageRenderer> {
        let mut renderer = PageRenderer::new(globals);
        renderer.work_dir = dir.as_ref().to_path_buf();

        let templates_dir = renderer.work_dir.join("templates");
        for (name, source) in hbs_files(&templates_dir)? {
            renderer.register_template(&name, &source)?;
        }
        let partials_dir = templates_dir.join("partials");
        if partials_dir.is_dir() {
            for (name, source) in hbs_files(&partials_dir)? {
                renderer.register_partial(&name, &source)?;
            }
        }
        log::info!(
            "Loaded {} templates from {}",
            renderer.handle.get_templates().len(),
            renderer.work_dir.display()
        );
        Ok(renderer)
    }

    pub fn register_template(&mut self, name: &str, source: &str) -> Result<()> {
        self.handle.register_template_string(name, source)?;
        Ok(())
    }

    pub fn register_partial(&mut self, name: &str, source: &str) -> Result<()> {
        self.handle.register_partial(name, source)?;
        Ok(())
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.handle.has_template(name)
    }

    /// Builds the render context: fields at top level, plus `Page`,
    /// `CurrentPage`, `Session` and `Site`.
    pub fn context(
        &self,
        fields: &FieldSet,
        page: Option<&PlaceholderPage>,
        request: &RequestContext,
    ) -> Value {
        let mut ctx = fields.to_context();
        ctx.insert(
            String::from("Page"),
            page.map_or(Value::Null, PlaceholderPage::to_context),
        );
        ctx.insert(
            String::from("CurrentPage"),
            request
                .current_page
                .as_deref()
                .map_or(Value::Null, |p| Value::String(handlebars::html_escape(p))),
        );
        ctx.insert(
            String::from("Session"),
            escape_value(Value::Object(request.session.clone())),
        );
        ctx.insert(String::from("Site"), Value::Object(self.globals.clone()));
        Value::Object(ctx)
    }

    pub fn render(&self, name: &str, context: &Value) -> Result<String> {
        if !self.has_template(name) {
            return Err(ErrorPageError::TemplateNotFound(vec![name.to_string()]));
        }
        Ok(self.handle.render(name, context)?)
    }

    /// Renders the first template of `chain` that is registered
    pub fn render_first(&self, chain: &[String], context: &Value) -> Result<String> {
        let name = chain
            .iter()
            .find(|name| self.has_template(name))
            .ok_or_else(|| ErrorPageError::TemplateNotFound(chain.to_vec()))?;
        log::debug!("Rendering with template {} (candidates: {:?})", name, chain);
        Ok(self.handle.render(name, context)?)
    }
}

/// `(file stem, contents)` for every `.hbs` file directly inside `dir`
fn hbs_files(dir: &Path) -> Result<Vec<(String, String)>> {
    let mut files = Vec::new();
    for entry in read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(TEMPLATE_EXT) {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            files.push((stem.to_string(), read_to_string(&path)?));
        }
    }
    Ok(files)
}

/// Escapes every string inside a JSON value
fn escape_value(value: Value) -> Value {
    match value {
        Value::String(s) => Value::String(handlebars::html_escape(&s)),
        Value::Array(items) => Value::Array(items.into_iter().map(escape_value).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, escape_value(v)))
                .collect(),
        ),
        other => other,
    }
}
