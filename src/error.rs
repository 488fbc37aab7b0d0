//! Error types for slot expressions and generator diagnostics

use std::fmt;

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// Boxed error raised by user code (generator bodies, scope functions)
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A slot expression that does not parse
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExprError {
    #[error("invalid token '{text}' at {span:?}")]
    InvalidToken { span: Span, text: String },

    #[error("{message} at {span:?}")]
    Syntax {
        span: Span,
        message: String,
        expected: Vec<String>,
    },

    #[error("empty expression")]
    Empty,
}

impl ExprError {
    pub fn span(&self) -> Option<Span> {
        match self {
            ExprError::InvalidToken { span, .. } | ExprError::Syntax { span, .. } => {
                Some(span.clone())
            }
            ExprError::Empty => None,
        }
    }

    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        let span = self.span().unwrap_or(0..source.len());
        let note = match self {
            ExprError::Syntax {
                message, expected, ..
            } if !expected.is_empty() => {
                format!("{}\nExpected: {}", message, expected.join(", "))
            }
            other => other.to_string(),
        };
        render_report(filename, source, span, &self.to_string(), &note)
    }
}

impl<'a> From<chumsky::error::Rich<'a, crate::parser::lexer::Token>> for ExprError {
    fn from(err: chumsky::error::Rich<'a, crate::parser::lexer::Token>) -> Self {
        use chumsky::error::{RichPattern, RichReason};

        let message = match err.reason() {
            RichReason::ExpectedFound { found, .. } => {
                let found_str = match found {
                    Some(tok) => format_token(tok),
                    None => "end of input".to_string(),
                };
                format!("unexpected {}", found_str)
            }
            RichReason::Custom(msg) => msg.to_string(),
        };

        let expected: Vec<String> = err
            .expected()
            .filter_map(|e| match e {
                RichPattern::Token(tok) => Some(format_token(tok)),
                RichPattern::Label(label) => Some(label.to_string()),
                RichPattern::EndOfInput => Some("end of input".to_string()),
                RichPattern::Identifier(s) => Some(format!("identifier '{}'", s)),
                RichPattern::Any => Some("any token".to_string()),
                RichPattern::SomethingElse => None,
            })
            .collect();

        ExprError::Syntax {
            span: err.span().into_range(),
            message,
            expected,
        }
    }
}

/// Format a token for human-readable error messages
fn format_token(tok: &crate::parser::lexer::Token) -> String {
    use crate::parser::lexer::Token;
    match tok {
        Token::Ident(s) => format!("identifier '{}'", s),
        Token::String(s) => format!("string {:?}", s),
        Token::Int(n) => format!("number {}", n),
        Token::Float(x) => format!("number {}", x),
        Token::True => "'true'".to_string(),
        Token::False => "'false'".to_string(),
        Token::NoneKw => "'none'".to_string(),
        Token::ParenOpen => "'('".to_string(),
        Token::ParenClose => "')'".to_string(),
        Token::BracketOpen => "'['".to_string(),
        Token::BracketClose => "']'".to_string(),
        Token::Comma => "','".to_string(),
        Token::Dot => "'.'".to_string(),
    }
}

fn render_report(filename: &str, source: &str, span: Span, message: &str, note: &str) -> String {
    let mut buf = Vec::new();
    let written = Report::build(ReportKind::Error, filename, span.start)
        .with_message(message)
        .with_label(
            Label::new((filename, span))
                .with_message(note)
                .with_color(Color::Red),
        )
        .finish()
        .write((filename, Source::from(source)), &mut buf);
    match written {
        Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
        Err(_) => message.to_string(),
    }
}

/// A line in a Rust source file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: &'static str,
    pub line: u32,
}

impl SourceLocation {
    /// Location of the caller (follows `#[track_caller]` chains)
    #[track_caller]
    pub fn caller() -> Self {
        let location = std::panic::Location::caller();
        SourceLocation {
            file: location.file(),
            line: location.line(),
        }
    }

    /// The location `lines` further down the same file
    pub fn offset(self, lines: usize) -> Self {
        let lines = u32::try_from(lines).unwrap_or(u32::MAX);
        SourceLocation {
            line: self.line.saturating_add(lines),
            ..self
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// The part of a template a failure points at
#[derive(Debug, Clone, PartialEq)]
pub struct Excerpt {
    /// Key the template was registered under
    pub template: String,
    /// Normalized template text
    pub source: String,
    /// Zero-based line of the failure
    pub line: usize,
    /// Byte range of the failing slot in `source`
    pub span: Span,
}

impl Excerpt {
    /// Up to three lines of context around the failing line, which is
    /// annotated with `message`
    fn annotate(&self, message: &str) -> String {
        let mut lines: Vec<String> = self.source.split('\n').map(str::to_string).collect();
        let last = lines.len() - 1;
        let line = self.line.min(last);
        lines[line] = format!("{} <- {}", lines[line], message);

        let start = line.saturating_sub(3);
        let end = (line + 3).min(last);
        let mut text = lines[start..=end].join("\n");
        if end < last {
            text.push_str("\n[...]");
        }
        crate::template::dedent(&text).trim().to_string()
    }
}

const RULE_WIDTH: usize = 80;

/// A failure inside a generator, enriched with where it happened
///
/// Produced once at the innermost generator boundary and handed unchanged
/// through every enclosing one.
#[derive(Error, Debug)]
#[error("{diagnostic}")]
pub struct TemplateError {
    generator: String,
    function: Option<String>,
    location: SourceLocation,
    message: String,
    excerpt: Option<Excerpt>,
    diagnostic: String,
    #[source]
    cause: Option<BoxError>,
}

impl TemplateError {
    pub(crate) fn new(
        generator: &str,
        location: SourceLocation,
        function: Option<String>,
        excerpt: Option<Excerpt>,
        cause: BoxError,
    ) -> Self {
        let message = cause.to_string();

        let header = match &function {
            Some(function) => format!(
                "error in function '{}' called (directly or indirectly) by generator '{}' ({}):",
                function, generator, location
            ),
            None => format!("error in generator '{}' ({}):", generator, location),
        };
        let body = match &excerpt {
            Some(excerpt) => excerpt.annotate(&message),
            None => message.clone(),
        };
        let rule = "-".repeat(RULE_WIDTH);
        let diagnostic = format!("{}\n{}\n{}\n{}", header, rule, body, rule);

        TemplateError {
            generator: generator.to_string(),
            function,
            location,
            message,
            excerpt,
            diagnostic,
            cause: Some(cause),
        }
    }

    /// Name of the generator that raised the failure
    pub fn generator(&self) -> &str {
        &self.generator
    }

    /// Scope function the failure originated in, if any
    pub fn function(&self) -> Option<&str> {
        self.function.as_deref()
    }

    pub fn location(&self) -> SourceLocation {
        self.location
    }

    /// Message of the underlying cause
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn excerpt(&self) -> Option<&Excerpt> {
        self.excerpt.as_ref()
    }

    pub fn cause(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    /// Render the failing template with ariadne, when there is one
    pub fn report(&self) -> Option<String> {
        let excerpt = self.excerpt.as_ref()?;
        let note = format!("in generator '{}'", self.generator);
        Some(render_report(
            &excerpt.template,
            &excerpt.source,
            excerpt.span.clone(),
            &self.message,
            &note,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn location() -> SourceLocation {
        SourceLocation {
            file: "src/gen.rs",
            line: 10,
        }
    }

    #[test]
    fn test_diagnostic_without_excerpt() {
        let err = TemplateError::new("gen_all", location(), None, None, "boom".into());
        let rule = "-".repeat(80);
        assert_eq!(
            err.to_string(),
            format!("error in generator 'gen_all' (src/gen.rs:10):\n{rule}\nboom\n{rule}")
        );
        assert_eq!(err.message(), "boom");
        assert!(err.report().is_none());
    }

    #[test]
    fn test_diagnostic_with_function_hint() {
        let err = TemplateError::new(
            "gen_all",
            location(),
            Some("helper".to_string()),
            None,
            "boom".into(),
        );
        assert!(err
            .to_string()
            .starts_with("error in function 'helper' called (directly or indirectly) by generator 'gen_all'"));
        assert_eq!(err.function(), Some("helper"));
    }

    #[test]
    fn test_excerpt_window() {
        let source = (0..10).map(|i| format!("line{}", i)).collect::<Vec<_>>().join("\n");
        let excerpt = Excerpt {
            template: "main".to_string(),
            source,
            line: 5,
            span: 0..1,
        };
        assert_eq!(
            excerpt.annotate("bad"),
            "line2\nline3\nline4\nline5 <- bad\nline6\nline7\nline8\n[...]"
        );
    }

    #[test]
    fn test_excerpt_at_end_has_no_ellipsis() {
        let excerpt = Excerpt {
            template: "main".to_string(),
            source: "  a\n  b {x}".to_string(),
            line: 1,
            span: 8..11,
        };
        assert_eq!(excerpt.annotate("bad"), "a\nb {x} <- bad");
    }

    #[test]
    fn test_report_points_at_slot() {
        let excerpt = Excerpt {
            template: "main".to_string(),
            source: "color: {missing}".to_string(),
            line: 0,
            span: 7..16,
        };
        let err = TemplateError::new("gen", location(), None, Some(excerpt), "unknown variable 'missing'".into());
        let report = err.report().expect("Should render a report");
        assert!(report.contains("unknown variable 'missing'"));
    }

    #[test]
    fn test_location_offset() {
        assert_eq!(location().offset(3).to_string(), "src/gen.rs:13");
    }

    #[test]
    fn test_expr_error_format() {
        let err = crate::parser::parse("select(").expect_err("Should fail");
        let report = err.format("select(", "slot");
        assert!(report.contains("unexpected end of input"));
    }
}
