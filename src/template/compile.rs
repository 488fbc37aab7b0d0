//! Splitting normalized template text into literals and slots

use crate::error::{ExprError, Span};
use crate::parser::{self, Expr};

use super::error::TemplateSyntaxError;
use super::text::{leading_whitespace, normalize};

/// A compiled template
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    source: String,
    pieces: Vec<Piece>,
    leading_newline: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Piece {
    Literal(String),
    Slot(Slot),
}

/// A `{expression}` placeholder
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    expr: String,
    indent: String,
    line: usize,
    span: Span,
    parsed: Result<Expr, ExprError>,
}

impl Slot {
    fn new(expr: &str, indent: &str, line: usize, span: Span) -> Self {
        Slot {
            expr: expr.to_string(),
            indent: indent.to_string(),
            line,
            span,
            parsed: parser::parse(expr),
        }
    }

    /// Expression text between the braces
    pub fn expr(&self) -> &str {
        &self.expr
    }

    /// Leading whitespace of the slot's line
    pub fn indent(&self) -> &str {
        &self.indent
    }

    /// One-based line in the normalized template
    pub fn line(&self) -> usize {
        self.line + 1
    }

    pub(crate) fn line_index(&self) -> usize {
        self.line
    }

    /// Byte range of `{...}` in the normalized template
    pub fn span(&self) -> Span {
        self.span.clone()
    }

    /// The parsed expression, or why it does not parse
    pub fn expression(&self) -> Result<&Expr, &ExprError> {
        self.parsed.as_ref()
    }
}

impl Template {
    /// Normalize `source` and locate its slots
    pub fn parse(source: &str) -> Result<Template, TemplateSyntaxError> {
        let text = normalize(source);
        let lines: Vec<&str> = text.split('\n').collect();
        let single_line = lines.len() == 1;

        let mut pieces = Vec::new();
        let mut literal = String::new();
        let mut offset = 0;

        for (index, line) in lines.iter().enumerate() {
            if index > 0 {
                literal.push('\n');
            }
            let indent = if single_line {
                ""
            } else {
                leading_whitespace(line)
            };
            let bytes = line.as_bytes();
            let column = |at: usize| line[..at].chars().count() + 1;

            let mut i = 0;
            while i < line.len() {
                match bytes[i] {
                    b'{' if bytes.get(i + 1) == Some(&b'{') => {
                        literal.push('{');
                        i += 2;
                    }
                    b'}' if bytes.get(i + 1) == Some(&b'}') => {
                        literal.push('}');
                        i += 2;
                    }
                    b'{' => {
                        let close = line[i + 1..].find('}').ok_or_else(|| {
                            TemplateSyntaxError::Unclosed {
                                line: index + 1,
                                column: column(i),
                                span: offset + i..offset + line.len(),
                            }
                        })?;
                        if !literal.is_empty() {
                            pieces.push(Piece::Literal(std::mem::take(&mut literal)));
                        }
                        let end = i + 1 + close;
                        pieces.push(Piece::Slot(Slot::new(
                            &line[i + 1..end],
                            indent,
                            index,
                            offset + i..offset + end + 1,
                        )));
                        i = end + 1;
                    }
                    b'}' => {
                        return Err(TemplateSyntaxError::StrayClose {
                            line: index + 1,
                            column: column(i),
                            span: offset + i..offset + i + 1,
                        });
                    }
                    _ => {
                        let ch = line[i..].chars().next().unwrap_or_default();
                        literal.push(ch);
                        i += ch.len_utf8().max(1);
                    }
                }
            }
            offset += line.len() + 1;
        }
        if !literal.is_empty() {
            pieces.push(Piece::Literal(literal));
        }

        Ok(Template {
            source: text,
            pieces,
            leading_newline: source.starts_with('\n'),
        })
    }

    /// The normalized template text
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Slots in order of appearance
    pub fn slots(&self) -> impl Iterator<Item = &Slot> {
        self.pieces.iter().filter_map(|piece| match piece {
            Piece::Slot(slot) => Some(slot),
            Piece::Literal(_) => None,
        })
    }

    pub(crate) fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    /// Lines between the start of the raw source and its first normalized
    /// line
    pub fn first_line_offset(&self) -> usize {
        usize::from(self.leading_newline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slots_carry_line_indent() {
        let template = Template::parse("\n    x\n      {a}\n    {b}\n").expect("Should parse");
        let slots: Vec<_> = template.slots().collect();
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[0].expr(), "a");
        assert_eq!(slots[0].indent(), "  ");
        assert_eq!(slots[0].line(), 2);
        assert_eq!(slots[1].indent(), "");
        assert_eq!(&template.source()[slots[0].span()], "{a}");
    }

    #[test]
    fn test_single_line_has_no_indent() {
        let template = Template::parse("    {a}  ").expect("Should parse");
        let slot = template.slots().next().expect("Should have a slot");
        assert_eq!(slot.indent(), "");
    }

    #[test]
    fn test_double_braces_are_literal() {
        let template = Template::parse("struct {{ {name} }}").expect("Should parse");
        assert_eq!(template.slots().count(), 1);
        assert_eq!(
            template.pieces()[0],
            Piece::Literal("struct { ".to_string())
        );
    }

    #[test]
    fn test_unclosed_slot() {
        let err = Template::parse("\n  ok\n  {broken\n").expect_err("Should fail");
        assert_eq!(
            err,
            TemplateSyntaxError::Unclosed {
                line: 2,
                column: 1,
                span: 3..10
            }
        );
    }

    #[test]
    fn test_stray_close() {
        let err = Template::parse("a } b").expect_err("Should fail");
        assert!(matches!(
            err,
            TemplateSyntaxError::StrayClose { line: 1, column: 3, .. }
        ));
    }

    #[test]
    fn test_expression_errors_are_kept() {
        let template = Template::parse("{a b}").expect("Should compile");
        let slot = template.slots().next().expect("Should have a slot");
        assert!(slot.expression().is_err());
    }

    #[test]
    fn test_first_line_offset() {
        assert_eq!(Template::parse("\n  x\n").expect("ok").first_line_offset(), 1);
        assert_eq!(Template::parse("x").expect("ok").first_line_offset(), 0);
    }
}
