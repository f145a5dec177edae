use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use log::trace;
use crate::error::{ExecutionError, RenderError};
use crate::template::Template;


/// Slash-delimited logical name of a template, such as `layouts/base`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TemplateName(String);

impl TemplateName {
    pub fn parse(name: &str) -> Result<Self, ExecutionError> {
        let valid = !name.is_empty()
            && !name.contains('\\')
            && name.split('/').all(|part| !part.is_empty() && part != "." && part != "..");
        if valid {
            Ok(TemplateName(name.to_owned()))
        } else {
            Err(ExecutionError::InvalidName(name.to_owned()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `<root>/<name>.<extension>`
    pub fn to_path(&self, root: &Path, extension: &str) -> PathBuf {
        let mut path = self.0.split('/').fold(root.to_path_buf(), |path, part| path.join(part));
        if !extension.is_empty() {
            let file = format!("{}.{}", path.file_name().unwrap_or_default().to_string_lossy(), extension);
            path.set_file_name(file);
        }
        path
    }
}

impl fmt::Display for TemplateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}


/// Where templates come from.
pub trait TemplateSource: Send + Sync {
    /// Fails with [`RenderError::TemplateNotFound`] when nothing has this name.
    fn load(&self, name: &TemplateName) -> Result<Arc<Template>, RenderError>;
}


/// Templates compiled from in-memory sources.
#[derive(Debug, Default)]
pub struct TemplateMap {
    templates: HashMap<String, Arc<Template>>
}

impl TemplateMap {
    pub fn new() -> Self {
        TemplateMap::default()
    }

    pub fn from_sources<'a, I>(sources: I) -> Result<Self, RenderError>
    where I: IntoIterator<Item = (&'a str, &'a str)> {
        let mut map = TemplateMap::new();
        for (name, source) in sources {
            map.insert(name, source)?;
        }
        Ok(map)
    }

    pub fn insert(&mut self, name: &str, source: &str) -> Result<(), RenderError> {
        let name = TemplateName::parse(name).map_err(|err| RenderError::execution(name, err))?;
        let template = Template::compile(source)
            .map_err(|err| RenderError::execution(name.as_str(), err))?;
        self.templates.insert(name.0, Arc::new(template));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl TemplateSource for TemplateMap {
    fn load(&self, name: &TemplateName) -> Result<Arc<Template>, RenderError> {
        self.templates.get(name.as_str())
            .cloned()
            .ok_or_else(|| RenderError::TemplateNotFound(name.to_string()))
    }
}


/// Templates read from files under a root directory.
///
/// With caching on, each file is compiled once and kept for the life of
/// the source; edits on disk are not seen until [`TemplateDir::clear`].
#[derive(Debug)]
pub struct TemplateDir {
    root: PathBuf,
    extension: String,
    cache: Option<RwLock<HashMap<String, Arc<Template>>>>,
}

impl TemplateDir {
    pub fn new(root: impl Into<PathBuf>, extension: &str) -> Self {
        TemplateDir {
            root: root.into(),
            extension: extension.trim_start_matches('.').to_owned(),
            cache: Some(RwLock::new(HashMap::new())),
        }
    }

    pub fn cached(mut self, cache: bool) -> Self {
        self.cache = cache.then(|| RwLock::new(HashMap::new()));
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_of(&self, name: &TemplateName) -> PathBuf {
        name.to_path(&self.root, &self.extension)
    }

    pub fn clear(&self) {
        if let Some(Ok(mut cache)) = self.cache.as_ref().map(|cache| cache.write()) {
            cache.clear();
        }
    }

    fn cached_template(&self, name: &TemplateName) -> Option<Arc<Template>> {
        let cache = self.cache.as_ref()?.read().ok()?;
        cache.get(name.as_str()).cloned()
    }

    fn compile(&self, name: &TemplateName) -> Result<Arc<Template>, RenderError> {
        let path = self.path_of(name);
        let text = fs::read_to_string(&path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => RenderError::TemplateNotFound(name.to_string()),
            _ => RenderError::execution(name.as_str(), err),
        })?;
        let template = Template::compile(&text)
            .map_err(|err| RenderError::execution(name.as_str(), err))?;
        trace!("compiled {} from {}", name, path.display());
        Ok(Arc::new(template))
    }
}

impl TemplateSource for TemplateDir {
    fn load(&self, name: &TemplateName) -> Result<Arc<Template>, RenderError> {
        if let Some(template) = self.cached_template(name) {
            trace!("cache hit for {}", name);
            return Ok(template);
        }
        let template = self.compile(name)?;
        if let Some(Ok(mut cache)) = self.cache.as_ref().map(|cache| cache.write()) {
            cache.insert(name.as_str().to_owned(), Arc::clone(&template));
        }
        Ok(template)
    }
}
