//! Marker annotation schema and attribute parsing.
//!
//! # Responsibility
//! - Define the `eager_initialize` marker name and its single `priority` argument.
//! - Recognize marker attributes on parsed items and extract their arguments.
//!
//! # Invariants
//! - A bare marker carries `DEFAULT_PRIORITY`.
//! - `priority` is the only accepted key and must be an `i32` integer literal.
//!
//! # See also
//! - `eager_init_macros::eager_initialize` for the compile-time side.

use std::error::Error;
use std::fmt::{Display, Formatter};
use syn::{Attribute, Expr, ExprLit, ExprUnary, Lit, Meta, UnOp};

/// Attribute name recognized as the marker.
pub const MARKER_NAME: &str = "eager_initialize";
/// Argument key carrying the priority.
pub const PRIORITY_KEY: &str = "priority";
/// Priority of a marker without arguments.
pub const DEFAULT_PRIORITY: i32 = 0;

/// Extracted marker data for one declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EagerInitialize {
    pub priority: i32,
}

impl Default for EagerInitialize {
    fn default() -> Self {
        Self {
            priority: DEFAULT_PRIORITY,
        }
    }
}

/// Returns whether `attr` is the marker, by bare or path-qualified name.
pub fn is_marker_attribute(attr: &Attribute) -> bool {
    attr.path()
        .segments
        .last()
        .is_some_and(|segment| segment.ident == MARKER_NAME)
}

/// Returns the first marker among `attrs`, parsed.
///
/// `Ok(None)` means the item is not marked.
pub fn find_marker(attrs: &[Attribute]) -> Result<Option<EagerInitialize>, MarkerError> {
    match attrs.iter().find(|attr| is_marker_attribute(attr)) {
        Some(attr) => parse_marker(attr).map(Some),
        None => Ok(None),
    }
}

/// Parses marker arguments from one attribute.
///
/// Accepted forms: `#[eager_initialize]`, `#[eager_initialize()]`,
/// `#[eager_initialize(priority = 5)]`, `#[eager_initialize(priority = -5)]`.
pub fn parse_marker(attr: &Attribute) -> Result<EagerInitialize, MarkerError> {
    let list = match &attr.meta {
        Meta::Path(_) => return Ok(EagerInitialize::default()),
        Meta::List(list) => list,
        Meta::NameValue(_) => return Err(MarkerError::UnsupportedForm),
    };

    let mut priority: Option<i32> = None;
    let mut failure: Option<MarkerError> = None;
    let parsed = list.parse_nested_meta(|meta| {
        if !meta.path.is_ident(PRIORITY_KEY) {
            let key = meta
                .path
                .get_ident()
                .map(ToString::to_string)
                .unwrap_or_else(|| "<path>".to_string());
            failure = Some(MarkerError::UnknownArgument(key));
            return Err(meta.error("unknown marker argument"));
        }
        if priority.is_some() {
            failure = Some(MarkerError::DuplicatePriority);
            return Err(meta.error("duplicate priority"));
        }
        let expr: Expr = meta.value()?.parse()?;
        match priority_from_expr(&expr) {
            Ok(value) => {
                priority = Some(value);
                Ok(())
            }
            Err(err) => {
                failure = Some(err);
                Err(meta.error("invalid priority"))
            }
        }
    });

    if let Err(err) = parsed {
        return Err(failure.unwrap_or_else(|| MarkerError::Malformed(err.to_string())));
    }

    Ok(EagerInitialize {
        priority: priority.unwrap_or(DEFAULT_PRIORITY),
    })
}

fn priority_from_expr(expr: &Expr) -> Result<i32, MarkerError> {
    match expr {
        Expr::Lit(ExprLit {
            lit: Lit::Int(int), ..
        }) => int
            .base10_parse::<i32>()
            .map_err(|_| MarkerError::PriorityOutOfRange(int.to_string())),
        Expr::Unary(ExprUnary {
            op: UnOp::Neg(_),
            expr: inner,
            ..
        }) => match inner.as_ref() {
            Expr::Lit(ExprLit {
                lit: Lit::Int(int), ..
            }) => {
                let magnitude = int
                    .base10_parse::<i64>()
                    .map_err(|_| MarkerError::PriorityOutOfRange(format!("-{int}")))?;
                i32::try_from(-magnitude)
                    .map_err(|_| MarkerError::PriorityOutOfRange(format!("-{int}")))
            }
            _ => Err(MarkerError::NonIntegerPriority),
        },
        _ => Err(MarkerError::NonIntegerPriority),
    }
}

/// Marker argument errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkerError {
    UnsupportedForm,
    UnknownArgument(String),
    DuplicatePriority,
    NonIntegerPriority,
    PriorityOutOfRange(String),
    Malformed(String),
}

impl Display for MarkerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedForm => write!(
                f,
                "marker must be written as #[{MARKER_NAME}] or #[{MARKER_NAME}({PRIORITY_KEY} = N)]"
            ),
            Self::UnknownArgument(key) => write!(f, "unknown marker argument: {key}"),
            Self::DuplicatePriority => write!(f, "marker priority is declared more than once"),
            Self::NonIntegerPriority => write!(f, "marker priority must be an integer literal"),
            Self::PriorityOutOfRange(value) => {
                write!(f, "marker priority does not fit in i32: {value}")
            }
            Self::Malformed(message) => write!(f, "malformed marker arguments: {message}"),
        }
    }
}

impl Error for MarkerError {}

#[cfg(test)]
mod tests {
    use super::{find_marker, is_marker_attribute, parse_marker, EagerInitialize, MarkerError};
    use syn::{parse_quote, Attribute, ItemStatic};

    fn marker(attr: Attribute) -> Result<EagerInitialize, MarkerError> {
        parse_marker(&attr)
    }

    #[test]
    fn bare_marker_uses_default_priority() {
        let parsed = marker(parse_quote!(#[eager_initialize])).expect("bare marker");
        assert_eq!(parsed.priority, 0);

        let parsed = marker(parse_quote!(#[eager_initialize()])).expect("empty list");
        assert_eq!(parsed.priority, 0);
    }

    #[test]
    fn parses_positive_and_negative_priorities() {
        let parsed = marker(parse_quote!(#[eager_initialize(priority = 10)])).expect("positive");
        assert_eq!(parsed.priority, 10);

        let parsed = marker(parse_quote!(#[eager_initialize(priority = -3)])).expect("negative");
        assert_eq!(parsed.priority, -3);

        let parsed =
            marker(parse_quote!(#[eager_initialize(priority = -2147483648)])).expect("i32::MIN");
        assert_eq!(parsed.priority, i32::MIN);
    }

    #[test]
    fn rejects_unknown_keys_and_non_integer_values() {
        let err = marker(parse_quote!(#[eager_initialize(order = 1)])).expect_err("unknown key");
        assert_eq!(err, MarkerError::UnknownArgument("order".to_string()));

        let err =
            marker(parse_quote!(#[eager_initialize(priority = "high")])).expect_err("string value");
        assert_eq!(err, MarkerError::NonIntegerPriority);

        let err = marker(parse_quote!(#[eager_initialize(priority = 1, priority = 2)]))
            .expect_err("duplicate key");
        assert_eq!(err, MarkerError::DuplicatePriority);
    }

    #[test]
    fn rejects_out_of_range_priority() {
        let err = marker(parse_quote!(#[eager_initialize(priority = 2147483648)]))
            .expect_err("overflow");
        assert!(matches!(err, MarkerError::PriorityOutOfRange(_)));
    }

    #[test]
    fn recognizes_path_qualified_marker() {
        let attr: Attribute = parse_quote!(#[eager_init_macros::eager_initialize(priority = 1)]);
        assert!(is_marker_attribute(&attr));

        let other: Attribute = parse_quote!(#[derive(Debug)]);
        assert!(!is_marker_attribute(&other));
    }

    #[test]
    fn find_marker_skips_unrelated_attributes() {
        let item: ItemStatic = parse_quote! {
            #[allow(dead_code)]
            #[eager_initialize(priority = 4)]
            static A: u8 = 0;
        };
        let found = find_marker(&item.attrs).expect("marker parses");
        assert_eq!(found, Some(EagerInitialize { priority: 4 }));

        let plain: ItemStatic = parse_quote!(static B: u8 = 0;);
        assert_eq!(find_marker(&plain.attrs).expect("no marker"), None);
    }
}
