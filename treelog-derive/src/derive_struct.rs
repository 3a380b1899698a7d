//! Struct-specific `ToPayload` derivation.
//!
//! Named structs become records, tuple structs lists, unit structs null.

use proc_macro2::{Ident, TokenStream};
use quote::{quote, quote_spanned};
use syn::{DataStruct, Fields, Index, Result, ext::IdentExt, spanned::Spanned};

use crate::{
    DeriveOutput, crate_path,
    generics::collect_generics_from_type,
    strategy::{Strategy, parse_field_strategy},
};

pub(crate) fn derive_struct(
    name: &Ident,
    data: DataStruct,
    generics: &syn::Generics,
) -> Result<DeriveOutput> {
    match data.fields {
        Fields::Named(fields) => derive_named_struct(name, fields, generics),
        Fields::Unnamed(fields) => derive_unnamed_struct(fields, generics),
        Fields::Unit => {
            let payload = crate_path("Payload");
            Ok(DeriveOutput {
                body: quote! { #payload::Null },
                used_generics: Vec::new(),
            })
        }
    }
}

fn derive_named_struct(
    name: &Ident,
    fields: syn::FieldsNamed,
    generics: &syn::Generics,
) -> Result<DeriveOutput> {
    let payload = crate_path("Payload");
    let record = crate_path("Record");
    let to_payload = crate_path("ToPayload");
    let mut used_generics = Vec::new();
    let mut emitted = Vec::new();

    for field in fields.named {
        let Strategy::Emit { rename } = parse_field_strategy(&field.attrs)? else {
            continue;
        };
        let span = field.span();
        let Some(ident) = field.ident else {
            return Err(syn::Error::new(span, "named field without an identifier"));
        };
        let key = rename.unwrap_or_else(|| ident.unraw().to_string());
        collect_generics_from_type(&field.ty, generics, &mut used_generics);

        emitted.push(quote_spanned! { span =>
            .field(#key, #to_payload::to_payload(&self.#ident))
        });
    }

    Ok(DeriveOutput {
        body: quote! {
            #payload::Record(#record::new(stringify!(#name)) #(#emitted)*)
        },
        used_generics,
    })
}

fn derive_unnamed_struct(
    fields: syn::FieldsUnnamed,
    generics: &syn::Generics,
) -> Result<DeriveOutput> {
    let payload = crate_path("Payload");
    let to_payload = crate_path("ToPayload");
    let mut used_generics = Vec::new();
    let mut items: Vec<TokenStream> = Vec::new();

    for (index, field) in fields.unnamed.into_iter().enumerate() {
        match parse_field_strategy(&field.attrs)? {
            Strategy::Skip => continue,
            Strategy::Emit { rename: Some(_) } => {
                return Err(syn::Error::new(
                    field.ty.span(),
                    "`rename` has no effect on tuple struct fields",
                ));
            }
            Strategy::Emit { rename: None } => {}
        }
        let span = field.span();
        let index = Index::from(index);
        collect_generics_from_type(&field.ty, generics, &mut used_generics);

        items.push(quote_spanned! { span =>
            #to_payload::to_payload(&self.#index)
        });
    }

    Ok(DeriveOutput {
        body: quote! {
            #payload::List(::std::vec![#(#items),*])
        },
        used_generics,
    })
}
