use std::fmt::Debug;
use crate::context::RenderContext;
use crate::error::{RenderError, SyntaxError};
use crate::reader::{Directive, Reader, Token};
use crate::value::Value;


/// A compiled template. Compilation is done once; the result holds no
/// per-render state and can be shared between threads.
#[derive(Debug)]
pub struct Template {
    segments: Segments
}

impl Template {
    pub fn compile(input: &str) -> Result<Self, SyntaxError> {
        let mut reader = Reader::new(input);
        let segments = parse(&mut reader, None)?;
        Ok(Template { segments })
    }

    pub(crate) fn render(&self, ctx: &mut RenderContext<'_>) -> Result<(), RenderError> {
        self.segments.render(ctx)
    }
}


fn parse<'a>(
    reader: &mut Reader<'a>, section: Option<(&str, usize)>
) -> Result<Segments, SyntaxError> {
    let mut segments = Segments::new();
    loop {
        let at = reader.pos();
        let Some(token) = reader.pop_front() else {
            break;
        };
        match token? {
            Token::Text("") | Token::Comment => {},
            Token::Text(text) => {
                segments.push(Box::new(TextSegment::new(text)))
            },
            Token::Value(name, is_escaped) => {
                segments.push(Box::new(ValueSegment::new(name, is_escaped)))
            },
            Token::Section(name) => {
                segments.push(Box::new(
                    SectionSegment::new(name, parse(reader, Some((name, at)))?)
                ))
            },
            Token::InvertedSection(name) => {
                segments.push(Box::new(
                    InvertedSectionSegment::new(name, parse(reader, Some((name, at)))?)
                ))
            },
            Token::EndSection(name) => {
                return match section {
                    Some((open, _)) if open == name => Ok(segments),
                    _ => Err(SyntaxError::new(format!("unexpected end of section {}", name), at)),
                };
            },
            Token::Partial { name, with, indent } => {
                segments.push(Box::new(PartialSegment::new(name, with, indent)))
            },
            Token::Directive(directive) => {
                segments.push(directive_segment(directive))
            },
        }
    }
    match section {
        Some((name, at)) => Err(SyntaxError::new(format!("unclosed section {}", name), at)),
        None => Ok(segments),
    }
}

fn directive_segment(directive: Directive<'_>) -> Box<dyn Segment> {
    match directive {
        Directive::Extends { name, with } => Box::new(ExtendsSegment::new(name, with)),
        Directive::BeginSection(name) => Box::new(BeginSectionSegment::new(name)),
        Directive::EndSection => Box::new(EndSectionSegment),
        Directive::Yield { name, default } => Box::new(YieldSegment::new(name, default)),
    }
}


trait Segment: Debug + Send + Sync {
    fn render(&self, ctx: &mut RenderContext<'_>) -> Result<(), RenderError>;
}

type Segments = Vec<Box<dyn Segment>>;

impl Segment for Segments {
    fn render(&self, ctx: &mut RenderContext<'_>) -> Result<(), RenderError> {
        self.iter().try_for_each(|child| child.render(ctx))
    }
}


#[derive(Debug)]
struct TextSegment {
    text: String
}

impl TextSegment {
    fn new(text: &str) -> Self {
        TextSegment { text: text.to_owned() }
    }
}

impl Segment for TextSegment {
    fn render(&self, ctx: &mut RenderContext<'_>) -> Result<(), RenderError> {
        ctx.write(&self.text);
        Ok(())
    }
}


#[derive(Debug)]
struct ValueSegment {
    name: String,
    is_escaped: bool
}

impl ValueSegment {
    fn new(name: &str, is_escaped: bool) -> Self {
        ValueSegment {
            name: name.to_owned(),
            is_escaped
        }
    }
}

impl Segment for ValueSegment {
    fn render(&self, ctx: &mut RenderContext<'_>) -> Result<(), RenderError> {
        let text = ctx.lookup(&self.name)
            .map(Value::to_text)
            .unwrap_or_default();
        let text = match self.is_escaped {
            true => ctx.escape(&text),
            false => text
        };
        ctx.write(&text);
        Ok(())
    }
}


/// `{{#name}}`: loops over sequences, descends into anything else that is
/// truthy, and hands its rendered body to helpers.
#[derive(Debug)]
struct SectionSegment {
    name: String,
    children: Segments
}

impl SectionSegment {
    fn new(name: &str, children: Segments) -> Self {
        SectionSegment {
            name: name.to_owned(),
            children
        }
    }

    fn render_in(&self, ctx: &mut RenderContext<'_>, frame: Value) -> Result<(), RenderError> {
        ctx.push(frame);
        let result = self.children.render(ctx);
        ctx.pop();
        result
    }
}

impl Segment for SectionSegment {
    fn render(&self, ctx: &mut RenderContext<'_>) -> Result<(), RenderError> {
        let value = match ctx.lookup(&self.name) {
            Some(value) if value.is_truthy() => value.clone(),
            _ => return Ok(()),
        };
        match value {
            Value::Sequence(items) => {
                items.iter().try_for_each(|item| self.render_in(ctx, item.clone()))
            },
            Value::Helper(helper) => {
                let body = ctx.capture(|ctx| self.children.render(ctx))?;
                ctx.write(&helper.call(&body));
                Ok(())
            },
            value => self.render_in(ctx, value),
        }
    }
}


#[derive(Debug)]
struct InvertedSectionSegment {
    name: String,
    children: Segments
}

impl InvertedSectionSegment {
    fn new(name: &str, children: Segments) -> Self {
        InvertedSectionSegment {
            name: name.to_owned(),
            children
        }
    }
}

impl Segment for InvertedSectionSegment {
    fn render(&self, ctx: &mut RenderContext<'_>) -> Result<(), RenderError> {
        let falsy = !ctx.lookup(&self.name).is_some_and(Value::is_truthy);
        if falsy {
            self.children.render(ctx)
        } else {
            Ok(())
        }
    }
}


#[derive(Debug)]
struct PartialSegment {
    name: String,
    with: Option<String>,
    indent: String
}

impl PartialSegment {
    fn new(name: &str, with: Option<&str>, indent: &str) -> Self {
        PartialSegment {
            name: name.to_owned(),
            with: with.map(str::to_owned),
            indent: indent.to_owned()
        }
    }
}

impl Segment for PartialSegment {
    fn render(&self, ctx: &mut RenderContext<'_>) -> Result<(), RenderError> {
        let data = self.with.as_ref()
            .map(|with| ctx.lookup(with).cloned().unwrap_or_default());
        let output = ctx.render_partial_with(&self.name, data)?;
        if self.indent.is_empty() {
            ctx.write(&output);
        } else {
            ctx.write(&indent_lines(&output, &self.indent));
        }
        Ok(())
    }
}

// every line gets the indent; a trailing eol does not start a new line
fn indent_lines(text: &str, indent: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for line in text.split_inclusive('\n') {
        result.push_str(indent);
        result.push_str(line);
    }
    result
}


#[derive(Debug)]
struct ExtendsSegment {
    name: String,
    with: Option<String>
}

impl ExtendsSegment {
    fn new(name: &str, with: Option<&str>) -> Self {
        ExtendsSegment {
            name: name.to_owned(),
            with: with.map(str::to_owned)
        }
    }
}

impl Segment for ExtendsSegment {
    fn render(&self, ctx: &mut RenderContext<'_>) -> Result<(), RenderError> {
        let data = self.with.as_ref()
            .map(|with| ctx.lookup(with).cloned().unwrap_or_default());
        ctx.declare_layout_with(&self.name, data);
        Ok(())
    }
}


#[derive(Debug)]
struct BeginSectionSegment {
    name: String
}

impl BeginSectionSegment {
    fn new(name: &str) -> Self {
        BeginSectionSegment { name: name.to_owned() }
    }
}

impl Segment for BeginSectionSegment {
    fn render(&self, ctx: &mut RenderContext<'_>) -> Result<(), RenderError> {
        ctx.begin_section(&self.name)
    }
}


#[derive(Debug)]
struct EndSectionSegment;

impl Segment for EndSectionSegment {
    fn render(&self, ctx: &mut RenderContext<'_>) -> Result<(), RenderError> {
        ctx.end_section()
    }
}


#[derive(Debug)]
struct YieldSegment {
    name: String,
    default: String
}

impl YieldSegment {
    fn new(name: &str, default: Option<&str>) -> Self {
        YieldSegment {
            name: name.to_owned(),
            default: default.unwrap_or_default().to_owned()
        }
    }
}

impl Segment for YieldSegment {
    fn render(&self, ctx: &mut RenderContext<'_>) -> Result<(), RenderError> {
        let content = ctx.yield_section(&self.name, &self.default).to_owned();
        ctx.write(&content);
        Ok(())
    }
}
