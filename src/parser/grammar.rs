//! Parser implementation using chumsky

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use crate::error::ExprError;
use crate::parser::ast::*;
use crate::parser::lexer::{lex, Token};

/// Parse a slot expression
pub fn parse(input: &str) -> Result<Expr, ExprError> {
    let tokens = lex(input)?;
    if tokens.is_empty() {
        return Err(ExprError::Empty);
    }

    let len = input.len();
    let token_iter = tokens
        .into_iter()
        .map(|(tok, span)| (tok, SimpleSpan::from(span)));

    // Turn the token iterator into a stream that chumsky can use
    let token_stream = Stream::from_iter(token_iter)
        // Split (Token, SimpleSpan) into token and span parts
        .map((len..len).into(), |(t, s): (_, _)| (t, s));

    expr_parser()
        .then_ignore(end())
        .parse(token_stream)
        .into_result()
        .map_err(|errs| {
            errs.into_iter()
                .next()
                .map(ExprError::from)
                .unwrap_or(ExprError::Empty)
        })
}

fn expr_parser<'a, I>() -> impl Parser<'a, I, Expr, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    recursive(|expr| {
        let ident = select! {
            Token::Ident(name) => name,
        }
        .labelled("identifier");

        let literal = select! {
            Token::String(s) => Literal::String(s),
            Token::Int(n) => Literal::Int(n),
            Token::Float(x) => Literal::Float(x),
            Token::True => Literal::Bool(true),
            Token::False => Literal::Bool(false),
            Token::NoneKw => Literal::None,
        }
        .map(Expr::Literal);

        // Comma separated expressions, trailing comma allowed
        let items = expr
            .separated_by(just(Token::Comma))
            .allow_trailing()
            .collect::<Vec<_>>();

        let call_args = items
            .clone()
            .delimited_by(just(Token::ParenOpen), just(Token::ParenClose));

        // name or name(args)
        let variable_or_call = ident
            .clone()
            .then(call_args.clone().or_not())
            .map(|(name, args)| match args {
                Some(args) => Expr::Call {
                    function: name,
                    args,
                },
                None => Expr::Variable(name),
            });

        let list = items
            .delimited_by(just(Token::BracketOpen), just(Token::BracketClose))
            .map(Expr::List);

        let primary = choice((literal, variable_or_call, list));

        // .name or .name(args)
        let postfix = just(Token::Dot)
            .ignore_then(ident)
            .then(call_args.or_not());

        primary
            .then(postfix.repeated().collect::<Vec<_>>())
            .map(|(target, chain)| {
                chain
                    .into_iter()
                    .fold(target, |target, (name, args)| match args {
                        Some(args) => Expr::Method {
                            target: Box::new(target),
                            name,
                            args,
                        },
                        None => Expr::Attribute {
                            target: Box::new(target),
                            name,
                        },
                    })
            })
            .boxed()
    })
}
