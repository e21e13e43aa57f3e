//! `#[derive(Rearrange)]` code generation.

use crate::attrs::{Allocate, ComputedAttr, ConstructorAttr, ContainerAttrs, FieldAttrs};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{Data, DeriveInput, Fields, Ident, Type};

pub(crate) fn derive_rearrange(input: &DeriveInput) -> syn::Result<TokenStream> {
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Rearrange cannot be derived for generic types",
        ));
    }

    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            &input.ident,
            "Rearrange can only be derived for structs",
        ));
    };
    let Fields::Named(fields) = &data.fields else {
        return Err(syn::Error::new_spanned(
            &data.fields,
            "Rearrange requires a struct with named fields",
        ));
    };

    let container = ContainerAttrs::parse(&input.attrs)?;

    let mut parent: Option<(&Ident, &Type)> = None;
    let mut registrations = Vec::new();
    let mut key_fields = Vec::new();
    let mut key_values = Vec::new();
    let mut all_fields = Vec::new();

    for field in &fields.named {
        let Some(ident) = &field.ident else {
            continue;
        };
        let ty = &field.ty;
        let attrs = FieldAttrs::parse(&field.attrs)?;
        all_fields.push(ident);

        if attrs.extends {
            if parent.is_some() {
                return Err(syn::Error::new_spanned(
                    ident,
                    "only one field can be marked #[rearrange(extends)]",
                ));
            }
            parent = Some((ident, ty));
            registrations.push(quote! {
                table.extends::<#ty>(|this| &this.#ident, |this| &mut this.#ident)?;
            });
            continue;
        }
        if attrs.skip {
            let name = ident.to_string();
            registrations.push(quote! {
                table.carried(
                    #name,
                    |this: &Self| &this.#ident,
                    |this: &mut Self| &mut this.#ident,
                );
            });
            continue;
        }

        let name = attrs
            .rename
            .as_ref()
            .map_or_else(|| ident.to_string(), syn::LitStr::value);
        key_fields.push(quote! { pub #ident: ::rearranger::Property<#ty> });
        key_values.push(quote! { #ident: ::rearranger::Property::new(#name) });

        registrations.push(match &attrs.setter {
            Some(setter) => quote! {
                table.with_setter(
                    #name,
                    |this: &Self| &this.#ident,
                    |this: &mut Self, value: #ty| Self::#setter(this, value),
                );
            },
            None => quote! {
                table.stored(
                    #name,
                    |this: &Self| &this.#ident,
                    |this: &mut Self| &mut this.#ident,
                );
            },
        });
    }

    for computed in &container.computed {
        let ComputedAttr { ident, ty, getter } = computed;
        let name = ident.to_string();
        let getter = match getter {
            Some(path) if path.get_ident().is_none() => quote! { #path },
            Some(path) => quote! { Self::#path },
            None => quote! { Self::#ident },
        };
        key_fields.push(quote! { pub #ident: ::rearranger::Property<#ty> });
        key_values.push(quote! { #ident: ::rearranger::Property::new(#name) });
        registrations.push(quote! {
            table.computed(#name, |this: &Self| -> #ty { #getter(this) });
        });
    }

    registrations.extend(container.constructors.iter().map(constructor));

    let blank = quote! {
        table.allocator(|| Self {
            #(#all_fields: ::core::default::Default::default()),*
        });
    };
    match &container.allocate {
        Allocate::Factory(path) => registrations.push(quote! { table.allocator(#path); }),
        Allocate::Blank => registrations.push(blank),
        Allocate::Implicit if container.constructors.is_empty() => registrations.push(blank),
        Allocate::Implicit => {}
    }

    let name = &input.ident;
    let vis = &input.vis;
    let keys = format_ident!("{}Keys", name);

    let (parent_key_field, parent_key_value, deref) = match parent {
        Some((field, ty)) => (
            quote! { pub #field: <#ty as ::rearranger::Rearrange>::Keys, },
            quote! { #field: <#ty as ::rearranger::Rearrange>::KEYS, },
            quote! {
                impl ::core::ops::Deref for #keys {
                    type Target = <#ty as ::rearranger::Rearrange>::Keys;

                    fn deref(&self) -> &Self::Target {
                        &self.#field
                    }
                }
            },
        ),
        None => (quote! {}, quote! {}, quote! {}),
    };

    Ok(quote! {
        #[doc = concat!("Property keys of [`", stringify!(#name), "`].")]
        #[allow(missing_docs)]
        #[derive(Clone, Copy)]
        #vis struct #keys {
            #parent_key_field
            #(#key_fields,)*
        }

        #deref

        impl ::rearranger::Rearrange for #name {
            type Keys = #keys;

            const KEYS: #keys = #keys {
                #parent_key_value
                #(#key_values,)*
            };

            fn describe(
                table: &mut ::rearranger::TypeTable<Self>,
            ) -> ::core::result::Result<(), ::rearranger::RearrangeError> {
                #(#registrations)*
                ::core::result::Result::Ok(())
            }
        }
    })
}

fn constructor(ctor: &ConstructorAttr) -> TokenStream {
    let ident = &ctor.ident;
    let ctor_name = ident.to_string();
    let params: Vec<String> = ctor.params.iter().map(|p| p.ident.to_string()).collect();

    let arguments = ctor.params.iter().map(|param| {
        let param_name = param.ident.to_string();
        match &param.default {
            Some(default) => quote! { args.take_or(#param_name, || #default)? },
            None => quote! { args.take(#param_name)? },
        }
    });
    let call = quote! { Self::#ident(#(#arguments),*) };
    let body = if ctor.fallible {
        quote! { #call.map_err(::rearranger::InvokeError::rejected) }
    } else {
        quote! { ::core::result::Result::Ok(#call) }
    };

    quote! {
        table.constructor(::rearranger::ConstructorDescriptor::new(
            #ctor_name,
            &[#(#params),*],
            |args: &mut ::rearranger::Arguments|
                -> ::core::result::Result<Self, ::rearranger::InvokeError> { #body },
        ));
    }
}
