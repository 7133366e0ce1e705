use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::ext::IdentExt;
use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::{Attribute, Expr, Ident, LitStr, Token, parenthesized};

use crate::REFLECT_ATTRIBUTE_NAME;

// -----------------------------------------------------------------------------
// AttrItem

/// One comma-separated item inside `#[reflect(...)]`.
pub(crate) enum AttrItem {
    /// `ident`
    Flag(Ident),
    /// `ident = expr`
    Value(Ident, Expr),
    /// `ident(expr, ...)`
    Call(Ident, Punctuated<Expr, Token![,]>),
    /// `@expr`
    Custom(Expr),
}

impl Parse for AttrItem {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        if input.peek(Token![@]) {
            input.parse::<Token![@]>()?;
            return Ok(Self::Custom(input.parse()?));
        }

        let ident = Ident::parse_any(input)?;
        if input.peek(Token![=]) {
            input.parse::<Token![=]>()?;
            Ok(Self::Value(ident, input.parse()?))
        } else if input.peek(syn::token::Paren) {
            let content;
            parenthesized!(content in input);
            Ok(Self::Call(ident, content.parse_terminated(Expr::parse, Token![,])?))
        } else {
            Ok(Self::Flag(ident))
        }
    }
}

impl AttrItem {
    fn ident(&self) -> Option<&Ident> {
        match self {
            Self::Flag(ident) | Self::Value(ident, _) | Self::Call(ident, _) => Some(ident),
            Self::Custom(_) => None,
        }
    }

    fn span(&self) -> Span {
        match self {
            Self::Flag(ident) | Self::Value(ident, _) | Self::Call(ident, _) => ident.span(),
            Self::Custom(expr) => expr.span(),
        }
    }

    fn expect_flag(self) -> syn::Result<Span> {
        match self {
            Self::Flag(ident) => Ok(ident.span()),
            other => Err(syn::Error::new(other.span(), "expected a bare flag")),
        }
    }

    fn expect_str(self) -> syn::Result<LitStr> {
        match self {
            Self::Value(
                _,
                Expr::Lit(syn::ExprLit {
                    lit: syn::Lit::Str(lit),
                    ..
                }),
            ) => Ok(lit),
            other => Err(syn::Error::new(other.span(), "expected `= \"...\"`")),
        }
    }

    fn expect_value(self) -> syn::Result<Expr> {
        match self {
            Self::Value(_, expr) => Ok(expr),
            other => Err(syn::Error::new(other.span(), "expected `= ...`")),
        }
    }
}

/// All items of every `#[reflect(...)]` attribute in `attrs`, in order.
fn parse_items(attrs: &[Attribute]) -> syn::Result<Vec<AttrItem>> {
    let mut items = Vec::new();
    for attr in attrs {
        if !attr.path().is_ident(REFLECT_ATTRIBUTE_NAME) {
            continue;
        }
        let list = attr.parse_args_with(Punctuated::<AttrItem, Token![,]>::parse_terminated)?;
        items.extend(list);
    }
    Ok(items)
}

fn set_once<T>(slot: &mut Option<T>, value: T, span: Span, what: &str) -> syn::Result<()> {
    if slot.is_some() {
        return Err(syn::Error::new(span, format!("`{what}` given more than once")));
    }
    *slot = Some(value);
    Ok(())
}

// -----------------------------------------------------------------------------
// TypeAttributes

/// Type-level `#[reflect(...)]` options.
#[derive(Default)]
pub(crate) struct TypeAttributes {
    pub name: Option<LitStr>,
    pub default: Option<Span>,
    pub constructors: Vec<Expr>,
    pub auto_register: Option<Span>,
    pub leaf: Option<Span>,
}

impl TypeAttributes {
    pub fn parse_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut this = Self::default();
        for item in parse_items(attrs)? {
            let span = item.span();
            let Some(name) = item.ident().map(ToString::to_string) else {
                return Err(syn::Error::new(span, "custom attributes belong on fields"));
            };
            match name.as_str() {
                "name" => set_once(&mut this.name, item.expect_str()?, span, "name")?,
                "default" => set_once(&mut this.default, item.expect_flag()?, span, "default")?,
                "constructor" => this.constructors.push(item.expect_value()?),
                "auto_register" => {
                    set_once(&mut this.auto_register, item.expect_flag()?, span, "auto_register")?;
                }
                "leaf" => set_once(&mut this.leaf, item.expect_flag()?, span, "leaf")?,
                _ => {
                    return Err(syn::Error::new(
                        span,
                        format!("unknown type attribute `{name}`, expected one of `name`, `default`, `constructor`, `auto_register`, `leaf`"),
                    ));
                }
            }
        }
        Ok(this)
    }
}

// -----------------------------------------------------------------------------
// FieldAttributes

/// Field-level `#[reflect(...)]` options.
#[derive(Default)]
pub(crate) struct FieldAttributes {
    pub ignore: bool,
    pub parent: Option<Span>,
    pub rename: Option<LitStr>,
    /// `MetaBuilder` calls, already in method-call form.
    pub meta_calls: Vec<TokenStream>,
}

impl FieldAttributes {
    pub fn parse_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut this = Self::default();
        for item in parse_items(attrs)? {
            let span = item.span();
            match item {
                AttrItem::Flag(ident) if ident == "ignore" => this.ignore = true,
                AttrItem::Flag(ident) if ident == "parent" => this.parent = Some(ident.span()),
                item @ AttrItem::Value(..) if item.ident().is_some_and(|i| i == "rename") => {
                    set_once(&mut this.rename, item.expect_str()?, span, "rename")?;
                }
                AttrItem::Custom(expr) => this.meta_calls.push(quote! { .with_attribute(#expr) }),
                AttrItem::Flag(ident) => this.meta_calls.push(quote! { .#ident() }),
                AttrItem::Value(ident, expr) => this.meta_calls.push(quote! { .#ident(#expr) }),
                AttrItem::Call(ident, args) => this.meta_calls.push(quote! { .#ident(#args) }),
            }
        }
        if this.parent.is_some() && (this.ignore || this.rename.is_some() || !this.meta_calls.is_empty()) {
            return Err(syn::Error::new(
                this.parent.unwrap_or(Span::call_site()),
                "a `parent` field takes no other reflect attributes",
            ));
        }
        Ok(this)
    }
}

// -----------------------------------------------------------------------------
// VariantAttributes

/// Variant-level `#[reflect(...)]` options.
#[derive(Default)]
pub(crate) struct VariantAttributes {
    pub rename: Option<LitStr>,
}

impl VariantAttributes {
    pub fn parse_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut this = Self::default();
        for item in parse_items(attrs)? {
            let span = item.span();
            if item.ident().is_some_and(|ident| ident == "rename") {
                set_once(&mut this.rename, item.expect_str()?, span, "rename")?;
            } else {
                return Err(syn::Error::new(span, "variants only accept `rename = \"...\"`"));
            }
        }
        Ok(this)
    }
}
