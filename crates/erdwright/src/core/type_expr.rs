//! Annotation parsing
//!
//! Field annotations arrive as the text the host wrote
//! (`Optional[List["Quest"]]`, `dict[str, Item] | None`). They are parsed
//! once, during field extraction, into a [`TypeExpr`] tree that the
//! relationship resolver walks.

use std::fmt;

use chumsky::prelude::*;

use super::chumsky_utils::{
    balanced_parens, dotted_name, optional_whitespace, quoted_string, ParseExtra,
};

/// A parsed annotation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeExpr {
    /// Plain or dotted name: `str`, `Quest`, `models.Quest`
    Name(String),
    /// Subscripted name: `List[Quest]`, `Dict[str, int]`
    Generic { base: String, args: Vec<TypeExpr> },
    /// PEP 604 union: `Quest | None`
    Union(Vec<TypeExpr>),
    /// The `None` singleton
    None,
    /// Bracketed parameter list, as in `Callable[[int, str], bool]`
    List(Vec<TypeExpr>),
    /// String literal value, e.g. the arguments of `Literal["a", "b"]`
    Str(String),
    /// Numeric literal value
    Literal(String),
    /// `...`, as in `Tuple[int, ...]`
    Ellipsis,
    /// A call or other expression kept as source text: `Field(gt=0)`
    Opaque(String),
}

/// Module prefixes that carry no meaning when classifying typing names
const TYPING_MODULES: &[&str] = &[
    "typing_extensions.",
    "typing.",
    "collections.abc.",
    "collections.",
    "builtins.",
];

/// Strip a standard-library module prefix from a typing name
///
/// `typing.Optional` and `collections.abc.Sequence` become `Optional` and
/// `Sequence`; anything else is returned unchanged.
pub fn strip_typing_prefix(name: &str) -> &str {
    for prefix in TYPING_MODULES {
        if let Some(rest) = name.strip_prefix(prefix) {
            return rest;
        }
    }
    name
}

impl TypeExpr {
    /// Parse annotation text with no import table in scope
    ///
    /// Equivalent to [`TypeExpr::parse_in`] with names taken as written.
    pub fn parse(input: &str) -> Result<TypeExpr, String> {
        Self::parse_in(input, &|name: &str| name.to_string())
    }

    /// Parse annotation text written in a module
    ///
    /// `canonical` maps a subscripted name to the name it refers to in the
    /// module (`t.Literal` to `typing.Literal`). String forward references
    /// are parsed in place wherever a type is expected. Strings stay values
    /// inside `Literal[...]` and in the metadata of `Annotated[T, ...]`.
    pub fn parse_in(input: &str, canonical: &dyn Fn(&str) -> String) -> Result<TypeExpr, String> {
        let parser = type_expr_parser()
            .padded_by(optional_whitespace())
            .then_ignore(end());

        let expr = parser.parse(input).into_result().map_err(|errors| {
            let reasons: Vec<String> = errors
                .iter()
                .map(|e| format!("at {}: {}", e.span().start, e))
                .collect();
            format!("cannot parse annotation '{}': {}", input, reasons.join("; "))
        })?;

        expr.expand_forward_refs(canonical)
    }

    fn expand_forward_refs(self, canonical: &dyn Fn(&str) -> String) -> Result<TypeExpr, String> {
        match self {
            TypeExpr::Str(text) => TypeExpr::parse_in(&text, canonical)
                .map_err(|e| format!("invalid forward reference \"{}\": {}", text, e)),
            TypeExpr::Generic { base, args } => {
                let resolved = canonical(&base);
                let is_literal = strip_typing_prefix(&resolved) == "Literal";
                let is_annotated = strip_typing_prefix(&resolved) == "Annotated";

                if is_literal {
                    // Kept under the resolved name so later checks need no scope
                    return Ok(TypeExpr::Generic {
                        base: resolved,
                        args,
                    });
                }

                let args = if is_annotated {
                    let mut args = args.into_iter();
                    let mut expanded = Vec::new();
                    if let Some(first) = args.next() {
                        expanded.push(first.expand_forward_refs(canonical)?);
                    }
                    expanded.extend(args.map(|meta| TypeExpr::Opaque(meta.to_string())));
                    expanded
                } else {
                    expand_all(args, canonical)?
                };
                Ok(TypeExpr::Generic { base, args })
            }
            TypeExpr::Union(members) => Ok(TypeExpr::Union(expand_all(members, canonical)?)),
            TypeExpr::List(items) => Ok(TypeExpr::List(expand_all(items, canonical)?)),
            other => Ok(other),
        }
    }

    /// Returns true if this is `None`
    pub fn is_none(&self) -> bool {
        matches!(self, TypeExpr::None)
    }

    /// Returns true for `Literal[...]` whose values are all strings
    pub fn is_string_literal(&self) -> bool {
        match self {
            TypeExpr::Generic { base, args } => {
                strip_typing_prefix(base) == "Literal"
                    && !args.is_empty()
                    && args.iter().all(|arg| matches!(arg, TypeExpr::Str(_)))
            }
            _ => false,
        }
    }

    /// Outermost name, if the expression has one
    pub fn head(&self) -> Option<&str> {
        match self {
            TypeExpr::Name(name) => Some(name),
            TypeExpr::Generic { base, .. } => Some(base),
            _ => None,
        }
    }
}

fn expand_all(
    exprs: Vec<TypeExpr>,
    canonical: &dyn Fn(&str) -> String,
) -> Result<Vec<TypeExpr>, String> {
    exprs
        .into_iter()
        .map(|expr| expr.expand_forward_refs(canonical))
        .collect()
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[TypeExpr], sep: &str) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, "{}", sep)?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Name(name) => write!(f, "{}", name),
            TypeExpr::Generic { base, args } => {
                write!(f, "{}[", base)?;
                write_list(f, args, ", ")?;
                write!(f, "]")
            }
            TypeExpr::Union(members) => write_list(f, members, " | "),
            TypeExpr::None => write!(f, "None"),
            TypeExpr::List(items) => {
                write!(f, "[")?;
                write_list(f, items, ", ")?;
                write!(f, "]")
            }
            TypeExpr::Str(text) => write!(f, "\"{}\"", text),
            TypeExpr::Literal(text) | TypeExpr::Opaque(text) => write!(f, "{}", text),
            TypeExpr::Ellipsis => write!(f, "..."),
        }
    }
}

/// Chumsky parser for one annotation expression
pub fn type_expr_parser<'src>() -> impl Parser<'src, &'src str, TypeExpr, ParseExtra<'src>> + Clone
{
    recursive(|expr| {
        let comma = just(',').padded_by(optional_whitespace());

        let subscript = expr
            .clone()
            .separated_by(comma.clone())
            .at_least(1)
            .allow_trailing()
            .collect::<Vec<_>>()
            .delimited_by(
                just('[').then(optional_whitespace()),
                optional_whitespace().then(just(']')),
            );

        let list = expr
            .separated_by(comma)
            .allow_trailing()
            .collect::<Vec<_>>()
            .delimited_by(
                just('[').then(optional_whitespace()),
                optional_whitespace().then(just(']')),
            )
            .map(TypeExpr::List);

        let call = dotted_name()
            .then(balanced_parens())
            .to_slice()
            .map(|s: &str| TypeExpr::Opaque(s.to_string()));

        let named = dotted_name()
            .then(subscript.or_not())
            .map(|(name, args)| match args {
                Some(args) => TypeExpr::Generic { base: name, args },
                None if name == "None" => TypeExpr::None,
                None => TypeExpr::Name(name),
            });

        let number = just('-')
            .or_not()
            .then(text::int(10))
            .then(just('.').then(text::digits(10)).or_not())
            .to_slice()
            .map(|s: &str| TypeExpr::Literal(s.to_string()));

        let atom = just("...")
            .to(TypeExpr::Ellipsis)
            .or(quoted_string().map(TypeExpr::Str))
            .or(number)
            .or(list)
            .or(call)
            .or(named);

        atom.separated_by(just('|').padded_by(optional_whitespace()))
            .at_least(1)
            .collect::<Vec<_>>()
            .map(|mut members| {
                if members.len() == 1 {
                    members.remove(0)
                } else {
                    TypeExpr::Union(members)
                }
            })
    })
}
