//! `#[rearrange(...)]` attribute parsing.

use syn::meta::ParseNestedMeta;
use syn::parse::{Parse, ParseStream};
use syn::{parenthesized, token, Attribute, Expr, Ident, LitStr, Path, Token, Type};

/// How the blank instance for field injection is produced.
#[derive(Default)]
pub(crate) enum Allocate {
    /// Field-wise `Default` literal, only if no constructor is declared.
    #[default]
    Implicit,
    /// Field-wise `Default` literal.
    Blank,
    /// No-argument factory.
    Factory(Path),
}

/// One declared constructor.
pub(crate) struct ConstructorAttr {
    pub(crate) ident: Ident,
    pub(crate) params: Vec<ParamAttr>,
    pub(crate) fallible: bool,
}

/// One constructor parameter; `default` is set for non-property parameters.
pub(crate) struct ParamAttr {
    pub(crate) ident: Ident,
    pub(crate) default: Option<Expr>,
}

/// `name: Type = getter`
pub(crate) struct ComputedAttr {
    pub(crate) ident: Ident,
    pub(crate) ty: Type,
    pub(crate) getter: Option<Path>,
}

impl Parse for ComputedAttr {
    fn parse(input: ParseStream<'_>) -> syn::Result<Self> {
        let ident: Ident = input.parse()?;
        input.parse::<Token![:]>()?;
        let ty: Type = input.parse()?;
        let getter = if input.peek(Token![=]) {
            input.parse::<Token![=]>()?;
            Some(input.parse()?)
        } else {
            None
        };
        Ok(Self { ident, ty, getter })
    }
}

/// Struct-level attributes.
#[derive(Default)]
pub(crate) struct ContainerAttrs {
    pub(crate) constructors: Vec<ConstructorAttr>,
    pub(crate) allocate: Allocate,
    pub(crate) computed: Vec<ComputedAttr>,
}

impl ContainerAttrs {
    pub(crate) fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut parsed = Self::default();

        for attr in attrs.iter().filter(|a| a.path().is_ident("rearrange")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("constructor") {
                    parsed.constructors.push(parse_constructor(&meta)?);
                    Ok(())
                } else if meta.path.is_ident("allocate") {
                    parsed.allocate = if meta.input.peek(Token![=]) {
                        Allocate::Factory(meta.value()?.parse()?)
                    } else {
                        Allocate::Blank
                    };
                    Ok(())
                } else if meta.path.is_ident("computed") {
                    let content;
                    parenthesized!(content in meta.input);
                    parsed.computed.push(content.parse()?);
                    Ok(())
                } else {
                    Err(meta.error("unknown rearrange attribute; expected constructor, allocate or computed"))
                }
            })?;
        }

        Ok(parsed)
    }
}

fn parse_constructor(meta: &ParseNestedMeta<'_>) -> syn::Result<ConstructorAttr> {
    let mut signature: Option<(Ident, Vec<ParamAttr>)> = None;
    let mut fallible = false;

    meta.parse_nested_meta(|inner| {
        let has_params = inner.input.peek(token::Paren);
        if inner.path.is_ident("fallible") && !has_params {
            fallible = true;
            return Ok(());
        }

        let Some(ident) = inner.path.get_ident().cloned() else {
            return Err(inner.error("expected constructor name"));
        };
        if signature.is_some() {
            return Err(inner.error("constructor is already named"));
        }

        let mut params = Vec::new();
        if has_params {
            inner.parse_nested_meta(|param| {
                let Some(ident) = param.path.get_ident().cloned() else {
                    return Err(param.error("expected parameter name"));
                };
                let default = if param.input.peek(Token![=]) {
                    Some(param.value()?.parse::<Expr>()?)
                } else {
                    None
                };
                params.push(ParamAttr { ident, default });
                Ok(())
            })?;
        }

        signature = Some((ident, params));
        Ok(())
    })?;

    let Some((ident, params)) = signature else {
        return Err(meta.error("constructor(...) needs a constructor name"));
    };
    Ok(ConstructorAttr {
        ident,
        params,
        fallible,
    })
}

/// Field-level attributes.
#[derive(Default)]
pub(crate) struct FieldAttrs {
    pub(crate) skip: bool,
    pub(crate) extends: bool,
    pub(crate) rename: Option<LitStr>,
    pub(crate) setter: Option<Ident>,
}

impl FieldAttrs {
    pub(crate) fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut parsed = Self::default();

        for attr in attrs.iter().filter(|a| a.path().is_ident("rearrange")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("skip") {
                    parsed.skip = true;
                } else if meta.path.is_ident("extends") {
                    parsed.extends = true;
                } else if meta.path.is_ident("rename") {
                    parsed.rename = Some(meta.value()?.parse()?);
                } else if meta.path.is_ident("setter") {
                    parsed.setter = Some(meta.value()?.parse()?);
                } else {
                    return Err(meta.error("unknown rearrange field attribute; expected skip, extends, rename or setter"));
                }
                Ok(())
            })?;

            if parsed.extends && (parsed.skip || parsed.rename.is_some() || parsed.setter.is_some()) {
                return Err(syn::Error::new_spanned(
                    attr,
                    "extends cannot be combined with skip, rename or setter",
                ));
            }
        }

        Ok(parsed)
    }
}
