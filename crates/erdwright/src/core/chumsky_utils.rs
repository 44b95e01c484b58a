//! Shared chumsky parser utilities for annotation parsing

use chumsky::prelude::*;

/// Parser state shared by the annotation grammar; errors carry a span
pub type ParseExtra<'src> = extra::Err<Rich<'src, char>>;

/// Parse optional whitespace including newlines.
///
/// Uses explicit character matching to avoid the "repeated combinator making no progress"
/// issue that can occur with `chumsky::text::whitespace().repeated()`.
pub fn optional_whitespace<'src>() -> impl Parser<'src, &'src str, (), ParseExtra<'src>> + Clone {
    one_of(" \t\n\r").repeated().ignored()
}

/// Parse a dotted name: `str`, `typing.Optional`, `models.orders.Order`.
pub fn dotted_name<'src>() -> impl Parser<'src, &'src str, String, ParseExtra<'src>> + Clone {
    text::ident()
        .then(just('.').then(text::ident()).repeated())
        .to_slice()
        .map(|s: &str| s.to_string())
}

/// Parse a single- or double-quoted string without escape handling,
/// returning the text between the quotes.
pub fn quoted_string<'src>() -> impl Parser<'src, &'src str, String, ParseExtra<'src>> + Clone {
    let double = just('"')
        .ignore_then(none_of('"').repeated().to_slice())
        .then_ignore(just('"'));
    let single = just('\'')
        .ignore_then(none_of('\'').repeated().to_slice())
        .then_ignore(just('\''));

    double.or(single).map(|s: &str| s.to_string())
}

/// Parse a balanced parenthesised group and discard it: `(gt=0, le=(1))`.
pub fn balanced_parens<'src>() -> impl Parser<'src, &'src str, (), ParseExtra<'src>> + Clone {
    recursive(|group| {
        just('(')
            .ignore_then(none_of("()").ignored().or(group).repeated())
            .then_ignore(just(')'))
            .ignored()
    })
}
