//! Marker attribute for eager initialization.
//!
//! `#[eager_initialize]` and `#[eager_initialize(priority = N)]` only tag an
//! item for the build-time generator. The attribute is erased during expansion
//! and the item is emitted unchanged. Argument syntax and the item shape are
//! checked here so mistakes fail at the marked item instead of at generation
//! time: only an immutable `static` typed as `LazyLock`, `LazyCell`, or `Lazy`
//! may carry the marker.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::parse::Parser;
use syn::{Expr, ExprLit, ExprUnary, Item, ItemStatic, Lit, StaticMutability, Type, UnOp};

const LAZY_CELL_TYPES: [&str; 3] = ["LazyLock", "LazyCell", "Lazy"];

/// Marks a lazily initialized `static` for eager, priority-ordered startup.
///
/// Higher priority initializes earlier; the default priority is `0`.
///
/// ```ignore
/// #[eager_initialize(priority = 10)]
/// pub static POOL: std::sync::LazyLock<Pool> = std::sync::LazyLock::new(Pool::connect);
/// ```
#[proc_macro_attribute]
pub fn eager_initialize(args: TokenStream, item: TokenStream) -> TokenStream {
    match expand(args.into(), item.into()) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(args: TokenStream2, item: TokenStream2) -> syn::Result<TokenStream2> {
    check_args(args)?;
    let item: Item = syn::parse2(item)?;
    match &item {
        Item::Static(item_static) => check_static(item_static)?,
        other => {
            return Err(syn::Error::new_spanned(
                other,
                "#[eager_initialize] only applies to `static` items",
            ))
        }
    }
    Ok(quote!(#item))
}

/// Checks marker arguments: at most one `priority` integer fitting in `i32`.
fn check_args(args: TokenStream2) -> syn::Result<()> {
    let mut priority: Option<i32> = None;
    let parser = syn::meta::parser(|meta| {
        if !meta.path.is_ident("priority") {
            return Err(meta.error("unsupported eager_initialize argument; expected `priority`"));
        }
        if priority.is_some() {
            return Err(meta.error("`priority` is declared more than once"));
        }
        let expr: Expr = meta.value()?.parse()?;
        priority = Some(int_value(&expr)?);
        Ok(())
    });
    parser.parse2(args)
}

fn check_static(item: &ItemStatic) -> syn::Result<()> {
    if let StaticMutability::Mut(token) = &item.mutability {
        return Err(syn::Error::new_spanned(
            token,
            "#[eager_initialize] cannot mark a `static mut`",
        ));
    }
    if !is_lazy_cell(&item.ty) {
        return Err(syn::Error::new_spanned(
            &item.ty,
            "#[eager_initialize] statics must be `LazyLock`, `LazyCell`, or `Lazy`",
        ));
    }
    Ok(())
}

fn is_lazy_cell(ty: &Type) -> bool {
    match ty {
        Type::Path(type_path) => {
            type_path.qself.is_none()
                && type_path
                    .path
                    .segments
                    .last()
                    .is_some_and(|segment| {
                        LAZY_CELL_TYPES.iter().any(|name| segment.ident == *name)
                    })
        }
        Type::Group(group) => is_lazy_cell(&group.elem),
        Type::Paren(paren) => is_lazy_cell(&paren.elem),
        _ => false,
    }
}

fn int_value(expr: &Expr) -> syn::Result<i32> {
    match expr {
        Expr::Lit(ExprLit {
            lit: Lit::Int(int), ..
        }) => int.base10_parse::<i32>(),
        Expr::Unary(ExprUnary {
            op: UnOp::Neg(_),
            expr: inner,
            ..
        }) => match inner.as_ref() {
            Expr::Lit(ExprLit {
                lit: Lit::Int(int), ..
            }) => {
                let magnitude = int.base10_parse::<i64>()?;
                i32::try_from(-magnitude)
                    .map_err(|_| syn::Error::new_spanned(expr, "priority does not fit in i32"))
            }
            _ => Err(syn::Error::new_spanned(
                expr,
                "priority must be an integer literal",
            )),
        },
        _ => Err(syn::Error::new_spanned(
            expr,
            "priority must be an integer literal",
        )),
    }
}
