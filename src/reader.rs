use crate::error::SyntaxError;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

// tags whose line disappears when they stand alone on it
static STRIPPABLE_SIGILS: &str = "#^/>!@";


pub(crate) struct Reader<'a> {
    input: &'a str,
    pos: usize,
    standalone: Option<Standalone<'a>>,
}

// a tag alone on its line: the indent before it and the position after
// the end of its line
#[derive(Debug, Clone, Copy)]
struct Standalone<'a> {
    tag: usize,
    indent: &'a str,
    after: usize,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        Reader {
            input,
            pos: 0,
            standalone: None,
        }
    }

    pub(crate) fn pos(&self) -> usize {
        self.pos
    }

    pub(crate) fn pop_front(&mut self) -> Option<Result<Token<'a>, SyntaxError>> {
        if self.pos >= self.input.len() {
            None
        } else if self.input[self.pos..].starts_with(OPEN) {
            Some(self.read_tag())
        } else {
            Some(Ok(self.read_text()))
        }
    }

    fn read_text(&mut self) -> Token<'a> {
        let after_text = self.input[self.pos..]
            .find(OPEN)
            .map_or(self.input.len(), |p| self.pos + p);
        let line_start = match self.input[self.pos..after_text].rfind('\n') {
            Some(p) => Some(self.pos + p + 1),
            None if self.at_line_start(self.pos) => Some(self.pos),
            None => None,
        };
        let mut end_of_text = after_text;
        if let Some(line_start) = line_start {
            if let Some(standalone) = self.standalone(line_start, after_text) {
                end_of_text = line_start;
                self.standalone = Some(standalone);
            }
        }
        let text = &self.input[self.pos..end_of_text];
        self.pos = after_text;
        Token::Text(text)
    }

    fn read_tag(&mut self) -> Result<Token<'a>, SyntaxError> {
        let start = self.pos;
        let standalone = match self.standalone.take() {
            Some(standalone) if standalone.tag == start => Some(standalone),
            _ if self.at_line_start(start) => self.standalone(start, start),
            _ => None,
        };
        let Some((body, after_tag, triple)) = self.span_tag(start) else {
            self.pos = self.input.len();
            return Err(SyntaxError::new("missing close delimiter", start));
        };
        self.pos = match standalone {
            Some(standalone) => standalone.after,
            None => after_tag,
        };
        let indent = standalone.map_or("", |it| it.indent);
        Token::tag(body, triple, indent, start)
    }

    // tag body, position after the tag, whether it was a `{{{...}}}` tag
    fn span_tag(&self, start: usize) -> Option<(&'a str, usize, bool)> {
        let tail = &self.input[start + OPEN.len()..];
        let triple = tail.starts_with('{');
        let (tail, close) = if triple {
            (&tail[1..], "}}}")
        } else {
            (tail, CLOSE)
        };
        let p = tail.find(close)?;
        let body_start = self.input.len() - tail.len();
        Some((tail[..p].trim(), body_start + p + close.len(), triple))
    }

    fn standalone(&self, line_start: usize, tag: usize) -> Option<Standalone<'a>> {
        if tag >= self.input.len() || !self.input.is_indent(line_start, tag) {
            return None;
        }
        let (body, after_tag, triple) = self.span_tag(tag)?;
        if triple || !is_strippable(body) {
            return None;
        }
        let rest = &self.input[after_tag..];
        let eol = rest.find('\n');
        let line_rest = &rest[..eol.unwrap_or(rest.len())];
        if !line_rest.trim_end_matches('\r').chars().all(|c| c == ' ' || c == '\t') {
            return None;
        }
        Some(Standalone {
            tag,
            indent: &self.input[line_start..tag],
            after: eol.map_or(self.input.len(), |p| after_tag + p + 1),
        })
    }

    fn at_line_start(&self, pos: usize) -> bool {
        pos == 0 || self.input[..pos].ends_with('\n')
    }
}


#[derive(PartialEq, Debug)]
pub(crate) enum Token<'a> {
    Text(&'a str),
    Value(&'a str, bool),
    Section(&'a str),
    InvertedSection(&'a str),
    EndSection(&'a str),
    Partial { name: &'a str, with: Option<&'a str>, indent: &'a str },
    Comment,
    Directive(Directive<'a>),
}

#[derive(PartialEq, Debug)]
pub(crate) enum Directive<'a> {
    Extends { name: &'a str, with: Option<&'a str> },
    BeginSection(&'a str),
    EndSection,
    Yield { name: &'a str, default: Option<&'a str> },
}

impl<'a> Token<'a> {
    fn tag(body: &'a str, triple: bool, indent: &'a str, at: usize) -> Result<Token<'a>, SyntaxError> {
        if triple {
            return Ok(Token::Value(maybe_tag(body, at)?, false));
        }
        let Some(sigil) = body.chars().next() else {
            return Err(SyntaxError::new("empty tag", at));
        };
        let rest = body[sigil.len_utf8()..].trim_start();
        let token = match sigil {
            '#' => Token::Section(maybe_tag(rest, at)?),
            '^' => Token::InvertedSection(maybe_tag(rest, at)?),
            '/' => Token::EndSection(maybe_tag(rest, at)?),
            '>' => {
                let (name, with) = name_and_with(rest, at)?;
                Token::Partial { name, with, indent }
            },
            '!' => Token::Comment,
            '@' => Token::Directive(Directive::parse(rest, at)?),
            '&' => Token::Value(maybe_tag(rest, at)?, false),
            _ => Token::Value(maybe_tag(body, at)?, true),
        };
        Ok(token)
    }
}

impl<'a> Directive<'a> {
    fn parse(text: &'a str, at: usize) -> Result<Directive<'a>, SyntaxError> {
        let (keyword, args) = match text.find(char::is_whitespace) {
            Some(p) => (&text[..p], text[p..].trim_start()),
            None => (text, ""),
        };
        match keyword {
            "extends" => {
                let (name, with) = name_and_with(args, at)?;
                Ok(Directive::Extends { name, with })
            },
            "section" => Ok(Directive::BeginSection(maybe_name(args, at)?)),
            "endsection" if args.is_empty() => Ok(Directive::EndSection),
            "endsection" => Err(SyntaxError::new("endsection takes no argument", at)),
            "yield" => {
                if args.is_empty() {
                    return Ok(Directive::Yield { name: "content", default: None });
                }
                let (name, default) = match args.find(char::is_whitespace) {
                    Some(p) => (&args[..p], Some(quoted(args[p..].trim_start(), at)?)),
                    None => (args, None),
                };
                Ok(Directive::Yield { name: maybe_name(name, at)?, default })
            },
            "" => Err(SyntaxError::new("missing directive", at)),
            other => Err(SyntaxError::new(format!("unknown directive `{}`", other), at)),
        }
    }
}

// dotted variable path, or `.` for the current frame
fn maybe_tag(text: &str, at: usize) -> Result<&str, SyntaxError> {
    if text == "." {
        Ok(text)
    } else if text.is_empty() {
        Err(SyntaxError::new("missing tag", at))
    } else if text.starts_with('.') || text.ends_with('.') || text.contains(char::is_whitespace) || text.contains("..") {
        Err(SyntaxError::new(format!("invalid tag `{}`", text), at))
    } else {
        Ok(text)
    }
}

// section or template name, one word
fn maybe_name(text: &str, at: usize) -> Result<&str, SyntaxError> {
    if text.is_empty() {
        Err(SyntaxError::new("missing name", at))
    } else if text.contains(char::is_whitespace) || text.contains('"') {
        Err(SyntaxError::new(format!("invalid name `{}`", text), at))
    } else {
        Ok(text)
    }
}

fn name_and_with(text: &str, at: usize) -> Result<(&str, Option<&str>), SyntaxError> {
    let words = text.split_whitespace().collect::<Vec<_>>();
    match words.as_slice() {
        [name] => Ok((maybe_name(*name, at)?, None)),
        [name, with] => Ok((maybe_name(*name, at)?, Some(maybe_tag(*with, at)?))),
        [] => Err(SyntaxError::new("missing name", at)),
        _ => Err(SyntaxError::new(format!("too many arguments in `{}`", text), at)),
    }
}

fn quoted(text: &str, at: usize) -> Result<&str, SyntaxError> {
    text.strip_prefix('"')
        .and_then(|it| it.strip_suffix('"'))
        .filter(|it| !it.contains('"'))
        .ok_or_else(|| SyntaxError::new(format!("default must be quoted, found `{}`", text), at))
}

// a yield is replaced where it stands, so its line and indent are kept
fn is_strippable(body: &str) -> bool {
    let is_yield = body.strip_prefix('@')
        .is_some_and(|it| it.split_whitespace().next() == Some("yield"));
    body.starts_with(|c: char| STRIPPABLE_SIGILS.contains(c)) && !is_yield
}

trait ReaderStringOps {
    fn is_indent(&self, start: usize, after: usize) -> bool;
}

impl ReaderStringOps for str {
    fn is_indent(&self, start: usize, after: usize) -> bool {
        self[start..after].chars().all(|c| c == ' ' || c == '\t')
    }
}
