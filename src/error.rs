/// Failure of a `render` call.
///
/// `TemplateNotFound` is kept apart from every other failure so that a
/// request handler can answer with its own not-found page.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("template not found: {0}")]
    TemplateNotFound(String),

    #[error("cannot open section `{requested}` while section `{open}` is open")]
    NestedSection { open: String, requested: String },

    #[error("no open section to end")]
    NoOpenSection,

    #[error("failed to render `{template}`: {source}")]
    Execution {
        template: String,
        #[source]
        source: ExecutionError,
    },
}

impl RenderError {
    pub(crate) fn execution(template: &str, source: impl Into<ExecutionError>) -> Self {
        RenderError::Execution {
            template: template.to_owned(),
            source: source.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RenderError::TemplateNotFound(_))
    }
}


/// Underlying cause of a [`RenderError::Execution`].
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid template name `{0}`")]
    InvalidName(String),

    #[error("section `{0}` is still open at the end of the template")]
    UnclosedSection(String),

    #[error("section `{0}` must be closed at the level it was opened")]
    SectionBoundary(String),

    #[error("nesting of layouts and partials exceeds {0} levels")]
    DepthExceeded(usize),

    #[error("cannot convert data: {0}")]
    Serialization(#[from] serde_json::Error),
}


/// Compilation failure, located by byte offset in the template source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("syntax error at byte {offset}: {message}")]
pub struct SyntaxError {
    pub message: String,
    pub offset: usize,
}

impl SyntaxError {
    pub(crate) fn new(message: impl Into<String>, offset: usize) -> Self {
        SyntaxError {
            message: message.into(),
            offset,
        }
    }
}
