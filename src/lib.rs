//! Server-side view rendering for the lore campaign manager.
//!
//! A [Template] compiled from mustache-flavoured source is rendered by an
//! [Engine], which resolves names through a [TemplateSource] and threads a
//! [RenderContext] through the render: the variable [Scope], the section
//! buffer, and the layout the template asks to be wrapped in.
//!
//! Beside the usual mustache tags (`{{name}}`, `{{{raw}}}`, `{{#list}}`,
//! `{{^empty}}`, `{{>partial}}`, `{{! comment }}`) templates compose with
//! directives:
//!
//! - `{{@extends layouts/base}}` wraps the output in a layout,
//! - `{{@section title}}...{{@endsection}}` captures a named section,
//! - `{{@yield title "Default"}}` places a section inside a layout; a bare
//!   `{{@yield}}` places whatever the child wrote outside its sections.
//!
//! # Samples
//!
//! ## Hello world
//!
//! ```
//! use lore_views::{Engine, Map, TemplateMap};
//!
//! let templates = TemplateMap::from_sources([
//!     ("greeting", "Hello, {{name}}"),
//! ]).unwrap();
//! let engine = Engine::new(templates);
//!
//! let mut data = Map::new();
//! data.insert("name".to_owned(), "Gandalf".into());
//!
//! assert_eq!(engine.render("greeting", data).unwrap(), "Hello, Gandalf");
//! ```
//!
//! ## Layout
//!
//! ```
//! use lore_views::{Engine, Map, TemplateMap};
//!
//! let templates = TemplateMap::from_sources([
//!     ("layouts/base", "<title>{{@yield title \"Lore\"}}</title><main>{{@yield}}</main>"),
//!     ("campaigns/index", r#"{{@extends layouts/base}}
//! {{@section title}}Campaigns{{@endsection}}
//! {{#campaigns}}<p>{{name}}</p>{{/campaigns}}"#),
//! ]).unwrap();
//! let engine = Engine::new(templates);
//!
//! let page = engine.view()
//!     .with("campaigns", vec!["Arda", "Eberron"].into_iter()
//!         .map(|name| {
//!             let mut campaign = Map::new();
//!             campaign.insert("name".to_owned(), name.into());
//!             campaign
//!         })
//!         .collect::<Vec<_>>())
//!     .render("campaigns/index")
//!     .unwrap();
//!
//! assert_eq!(page, "<title>Campaigns</title><main>\n<p>Arda</p><p>Eberron</p></main>");
//! ```
mod config;
mod context;
mod engine;
mod error;
mod json;
mod reader;
mod scope;
mod source;
mod template;
mod value;
mod yaml;

pub use self::config::{Config, ConfigError};
pub use self::context::{RenderContext, LayoutDeclaration, CONTENT};
pub use self::engine::{Engine, View};
pub use self::error::{RenderError, ExecutionError, SyntaxError};
pub use self::json::JsonValue;
pub use self::scope::Scope;
pub use self::source::{TemplateName, TemplateSource, TemplateMap, TemplateDir};
pub use self::template::Template;
pub use self::value::{Value, Map, Helper};
pub use self::yaml::YamlValue;
