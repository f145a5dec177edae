use std::collections::HashMap;
use log::{debug, trace};
use crate::engine::Engine;
use crate::error::{ExecutionError, RenderError};
use crate::scope::Scope;
use crate::value::{Map, Value};

/// Section receiving the output a template writes outside any section
/// when it declares a layout.
pub const CONTENT: &str = "content";


/// A layout requested by the executing template.
#[derive(Debug, Clone)]
pub struct LayoutDeclaration {
    pub name: String,
    pub data: Option<Value>,
}

#[derive(Debug)]
struct OpenSection {
    name: String,
    level: usize,
}


/// State of one render call: scope, section buffer, open section,
/// pending layout and output.
///
/// A context is created for each `render` and dropped when it returns.
/// It is reused along the chain of layouts of that call; partials get a
/// context of their own, so their sections and layouts stay local.
pub struct RenderContext<'e> {
    engine: &'e Engine,
    template: String,
    scope: Scope,
    sections: HashMap<String, String>,
    open: Option<OpenSection>,
    layout: Option<LayoutDeclaration>,
    explicit_content: bool,
    buffers: Vec<String>,
    depth: usize,
}

impl<'e> RenderContext<'e> {
    pub(crate) fn new(engine: &'e Engine, scope: Scope, depth: usize) -> Self {
        RenderContext {
            engine,
            template: String::new(),
            scope,
            sections: HashMap::new(),
            open: None,
            layout: None,
            explicit_content: false,
            buffers: vec![String::new()],
            depth,
        }
    }

    /// Executes `name`, then the layouts it declares, and returns the
    /// final output.
    pub fn run(mut self, name: &str) -> Result<String, RenderError> {
        let mut name = name.to_owned();
        loop {
            self.execute(&name)?;
            let output = self.finish_pass()?;
            let Some(layout) = self.layout.take() else {
                return Ok(output);
            };
            if !self.explicit_content {
                self.sections.insert(CONTENT.to_owned(), output);
            }
            self.explicit_content = false;
            self.check_depth(self.depth + 1)?;
            self.depth += 1;
            debug!("{} extends {}", name, layout.name);
            if let Some(data) = layout.data {
                self.scope.push(data);
            }
            name = layout.name;
        }
    }

    fn execute(&mut self, name: &str) -> Result<(), RenderError> {
        let template = self.engine.load(name)?;
        self.template = name.to_owned();
        template.render(self)
    }

    fn finish_pass(&mut self) -> Result<String, RenderError> {
        if let Some(open) = self.open.take() {
            return Err(self.error(ExecutionError::UnclosedSection(open.name)));
        }
        self.buffers.truncate(1);
        Ok(self.buffers.first_mut().map(std::mem::take).unwrap_or_default())
    }

    // `depth` counts the layouts and partials entered since the render began
    fn check_depth(&self, depth: usize) -> Result<(), RenderError> {
        let max_depth = self.engine.config().max_depth;
        if depth > max_depth {
            Err(self.error(ExecutionError::DepthExceeded(max_depth)))
        } else {
            Ok(())
        }
    }

    fn error(&self, source: ExecutionError) -> RenderError {
        RenderError::execution(&self.template, source)
    }

    /// Name of the template being executed.
    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn lookup(&self, path: &str) -> Option<&Value> {
        self.scope.get(path)
    }

    pub(crate) fn push(&mut self, frame: Value) {
        self.scope.push(frame);
    }

    pub(crate) fn pop(&mut self) {
        self.scope.pop();
    }

    pub fn escape(&self, text: &str) -> String {
        self.engine.escape(text)
    }

    /// Appends to the open section, or to the template output.
    pub fn write(&mut self, text: &str) {
        if let Some(buffer) = self.buffers.last_mut() {
            buffer.push_str(text);
        }
    }

    // runs `f` with its output redirected, and returns that output
    pub(crate) fn capture<F>(&mut self, f: F) -> Result<String, RenderError>
    where F: FnOnce(&mut Self) -> Result<(), RenderError> {
        let level = self.buffers.len();
        self.buffers.push(String::new());
        f(self)?;
        if let Some(open) = self.open.as_ref().filter(|open| open.level >= level) {
            return Err(self.error(ExecutionError::SectionBoundary(open.name.clone())));
        }
        Ok(self.buffers.pop().unwrap_or_default())
    }

    pub fn begin_section(&mut self, name: &str) -> Result<(), RenderError> {
        if let Some(open) = &self.open {
            return Err(RenderError::NestedSection {
                open: open.name.clone(),
                requested: name.to_owned(),
            });
        }
        trace!("{}: section {}", self.template, name);
        self.buffers.push(String::new());
        self.open = Some(OpenSection {
            name: name.to_owned(),
            level: self.buffers.len() - 1,
        });
        Ok(())
    }

    /// Commits the open section. A section of the same name captured
    /// earlier in this render is replaced.
    pub fn end_section(&mut self) -> Result<(), RenderError> {
        let Some(open) = self.open.take() else {
            return Err(RenderError::NoOpenSection);
        };
        if open.level + 1 != self.buffers.len() {
            return Err(self.error(ExecutionError::SectionBoundary(open.name)));
        }
        let content = self.buffers.pop().unwrap_or_default();
        if open.name == CONTENT {
            self.explicit_content = true;
        }
        self.sections.insert(open.name, content);
        Ok(())
    }

    /// Content of section `name`, or `default` when it was never captured.
    pub fn yield_section<'s>(&'s self, name: &str, default: &'s str) -> &'s str {
        self.sections.get(name).map_or(default, String::as_str)
    }

    /// Requests `name` as the layout of the executing template. The last
    /// declaration wins.
    pub fn declare_layout(&mut self, name: &str, data: Map) {
        self.declare_layout_with(name, Some(Value::mapping(data)));
    }

    pub(crate) fn declare_layout_with(&mut self, name: &str, data: Option<Value>) {
        let layout = LayoutDeclaration { name: name.to_owned(), data };
        if let Some(previous) = self.layout.replace(layout) {
            debug!("{}: layout {} replaced by {}", self.template, previous.name, name);
        }
    }

    pub fn layout(&self) -> Option<&LayoutDeclaration> {
        self.layout.as_ref()
    }

    /// Renders partial `name` and writes it at the current position.
    pub fn include_partial(&mut self, name: &str, data: Map) -> Result<(), RenderError> {
        let output = self.render_partial(name, data)?;
        self.write(&output);
        Ok(())
    }

    /// Renders partial `name` over this scope with `data` on top.
    pub fn render_partial(&self, name: &str, data: Map) -> Result<String, RenderError> {
        self.render_partial_with(name, Some(Value::mapping(data)))
    }

    pub(crate) fn render_partial_with(&self, name: &str, data: Option<Value>) -> Result<String, RenderError> {
        self.check_depth(self.depth + 1)?;
        let mut scope = self.scope.clone();
        if let Some(data) = data {
            scope.push(data);
        }
        trace!("{}: partial {}", self.template, name);
        RenderContext::new(self.engine, scope, self.depth + 1).run(name)
    }
}
