use std::path::PathBuf;
use std::sync::Arc;
use log::debug;
use serde::Serialize;
use crate::config::Config;
use crate::context::RenderContext;
use crate::error::{ExecutionError, RenderError};
use crate::scope::Scope;
use crate::source::{TemplateDir, TemplateName, TemplateSource};
use crate::template::Template;
use crate::value::{Helper, Map, Value};


/// Renders templates from a [`TemplateSource`].
///
/// An engine holds no per-render state: every call to [`Engine::render`]
/// builds its own [`RenderContext`], so one engine can serve concurrent
/// requests.
///
/// Every scope starts with three helpers, which render data may shadow:
/// - `e` escapes its body, `{{#e}}...{{/e}}`
/// - `url` prefixes its body with [`Config::base_url`]
/// - `asset` prefixes its body with [`Config::asset_base`]
pub struct Engine {
    source: Box<dyn TemplateSource>,
    config: Config,
    escape: Helper,
    helpers: Map,
}

impl Engine {
    pub fn new(source: impl TemplateSource + 'static) -> Self {
        Engine::with_config(source, Config::default())
    }

    pub fn with_config(source: impl TemplateSource + 'static, config: Config) -> Self {
        let mut engine = Engine {
            source: Box::new(source),
            config,
            escape: Helper::new(html_escape),
            helpers: Map::new(),
        };
        engine.bind_builtins();
        engine
    }

    /// Engine over [`Config::root`], reading files with [`Config::extension`].
    pub fn from_config(config: Config) -> Self {
        let dir = TemplateDir::new(&config.root, &config.extension).cached(config.cache);
        Engine::with_config(dir, config)
    }

    pub fn from_dir(root: impl Into<PathBuf>) -> Self {
        Engine::from_config(Config {
            root: root.into(),
            ..Config::default()
        })
    }

    /// Renders `name` with a fresh engine over the templates in `root`.
    pub fn make(root: impl Into<PathBuf>, name: &str, data: Map) -> Result<String, RenderError> {
        Engine::from_dir(root).render(name, data)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Replaces the escaping applied to `{{name}}` and bound as `e`.
    pub fn set_escape<F>(&mut self, fun: F)
    where F: Fn(&str) -> String + Send + Sync + 'static {
        self.escape = Helper::new(fun);
        self.helpers.insert("e".to_owned(), Value::Helper(self.escape.clone()));
    }

    /// Binds a helper in every scope.
    pub fn register_helper<F>(&mut self, name: &str, fun: F)
    where F: Fn(&str) -> String + Send + Sync + 'static {
        self.helpers.insert(name.to_owned(), Value::helper(fun));
    }

    fn bind_builtins(&mut self) {
        let base_url = self.config.base_url.clone();
        let asset_base = self.config.asset_base.clone();
        self.helpers.insert("e".to_owned(), Value::Helper(self.escape.clone()));
        self.helpers.insert("url".to_owned(), Value::helper(move |path| join_url(&base_url, path)));
        self.helpers.insert("asset".to_owned(), Value::helper(move |path| join_url(&asset_base, path)));
    }

    pub fn escape(&self, text: &str) -> String {
        self.escape.call(text)
    }

    pub fn url(&self, path: &str) -> String {
        join_url(&self.config.base_url, path)
    }

    pub fn asset(&self, path: &str) -> String {
        join_url(&self.config.asset_base, path)
    }

    /// A context over `data`, for driving sections and layouts by hand.
    pub fn context(&self, data: Map) -> RenderContext<'_> {
        let mut scope = Scope::new();
        scope.push(Value::mapping(self.helpers.clone()));
        scope.push(Value::mapping(data));
        RenderContext::new(self, scope, 0)
    }

    pub fn render(&self, name: &str, data: Map) -> Result<String, RenderError> {
        debug!("render {}", name);
        self.context(data).run(name)
    }

    /// Starts a render whose data is collected with [`View::with`].
    pub fn view(&self) -> View<'_> {
        View {
            engine: self,
            data: Map::new(),
        }
    }

    pub(crate) fn load(&self, name: &str) -> Result<Arc<Template>, RenderError> {
        let name = TemplateName::parse(name).map_err(|err| RenderError::execution(name, err))?;
        self.source.load(&name)
    }
}


/// Data collected for one render of an [`Engine`].
///
/// ```
/// use lore_views::{Engine, TemplateMap};
///
/// let templates = TemplateMap::from_sources([
///     ("entities/show", "{{entity}} of {{campaign}}"),
/// ]).unwrap();
/// let engine = Engine::new(templates);
///
/// let page = engine.view()
///     .with("entity", "Minas Tirith")
///     .with("campaign", "Third Age")
///     .render("entities/show")
///     .unwrap();
/// assert_eq!(page, "Minas Tirith of Third Age");
/// ```
pub struct View<'e> {
    engine: &'e Engine,
    data: Map,
}

impl<'e> View<'e> {
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    pub fn with_data(mut self, data: Map) -> Self {
        self.data.extend(data);
        self
    }

    pub fn with_serialized<T>(self, key: impl Into<String>, value: &T) -> Result<Self, ExecutionError>
    where T: Serialize + ?Sized {
        let value = Value::from_serialize(value)?;
        Ok(self.with(key, value))
    }

    pub fn data(&self) -> &Map {
        &self.data
    }

    pub fn render(self, name: &str) -> Result<String, RenderError> {
        self.engine.render(name, self.data)
    }
}


fn html_escape(input: &str) -> String {
    input.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn join_url(base: &str, path: &str) -> String {
    let path = path.trim();
    if path.contains("://") || path.starts_with("//") {
        return path.to_owned();
    }
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}
