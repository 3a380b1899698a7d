//! Derive macro for `treelog`.
//!
//! This crate generates `treelog::ToPayload` implementations for structs. It:
//! - reads `#[payload(skip)]` and `#[payload(rename = "...")]` field attributes
//! - bounds generic parameters that emitted fields actually use
//!
//! Enums and unions are rejected. Their payload shape is a choice the caller
//! should make by hand.

// <https://doc.rust-lang.org/rustc/lints/listing/allowed-by-default.html>
#![warn(
    anonymous_parameters,
    bare_trait_objects,
    elided_lifetimes_in_paths,
    missing_copy_implementations,
    rust_2018_idioms,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unsafe_code,
    unused_extern_crates,
    unused_import_braces
)]
// <https://rust-lang.github.io/rust-clippy/stable>
#![warn(
    clippy::all,
    clippy::cargo,
    clippy::dbg_macro,
    clippy::float_cmp_const,
    clippy::get_unwrap,
    clippy::mem_forget,
    clippy::nursery,
    clippy::pedantic,
    clippy::todo,
    clippy::unwrap_used,
    clippy::uninlined_format_args
)]
// Allow some clippy lints
#![allow(
    clippy::default_trait_access,
    clippy::doc_markdown,
    clippy::if_not_else,
    clippy::module_name_repetitions,
    clippy::multiple_crate_versions,
    clippy::must_use_candidate,
    clippy::needless_pass_by_value,
    clippy::needless_ifs,
    clippy::use_self,
    clippy::cargo_common_metadata,
    clippy::missing_errors_doc,
    clippy::enum_glob_use,
    clippy::struct_excessive_bools,
    clippy::missing_const_for_fn,
    clippy::redundant_pub_crate,
    clippy::result_large_err,
    clippy::future_not_send,
    clippy::option_if_let_else,
    clippy::from_over_into,
    clippy::manual_inspect
)]
// Allow some lints while testing
#![cfg_attr(test, allow(clippy::non_ascii_literal, clippy::unwrap_used))]

#[allow(unused_extern_crates)]
extern crate proc_macro;

use proc_macro_crate::{FoundCrate, crate_name};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{Data, DeriveInput, Result, parse_macro_input};

mod derive_struct;
mod generics;
mod strategy;

use derive_struct::derive_struct;
use generics::add_to_payload_bounds;

/// Derives `treelog::ToPayload` for a struct.
///
/// # Shapes
///
/// - Named fields become a `Payload::Record` named after the struct, with
///   fields in declaration order.
/// - Tuple structs become a `Payload::List`.
/// - Unit structs become `Payload::Null`.
///
/// # Field Attributes
///
/// - `#[payload(skip)]`: the field is left out of the payload and needs no
///   `ToPayload` impl.
/// - `#[payload(rename = "name")]`: the field is emitted under `name`. Only
///   meaningful on named fields.
///
/// Every other field must implement `ToPayload`. Generic parameters used by
/// emitted fields get a `ToPayload` bound; parameters that only appear inside
/// `PhantomData` or skipped fields do not.
#[proc_macro_derive(ToPayload, attributes(payload))]
pub fn derive_to_payload(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.into_compile_error().into(),
    }
}

/// Output of a shape-specific derive.
pub(crate) struct DeriveOutput {
    pub(crate) body: TokenStream,
    pub(crate) used_generics: Vec<syn::Ident>,
}

fn expand(input: DeriveInput) -> Result<TokenStream> {
    let DeriveInput {
        ident,
        generics,
        data,
        ..
    } = input;

    let output = match data {
        Data::Struct(data) => derive_struct(&ident, data, &generics)?,
        Data::Enum(data) => {
            return Err(syn::Error::new(
                data.enum_token.span,
                "`ToPayload` cannot be derived for enums; implement it by hand",
            ));
        }
        Data::Union(data) => {
            return Err(syn::Error::new(
                data.union_token.span,
                "`ToPayload` cannot be derived for unions",
            ));
        }
    };

    let generics = add_to_payload_bounds(generics, &output.used_generics);
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();
    let trait_path = crate_path("ToPayload");
    let payload_path = crate_path("Payload");
    let body = output.body;

    Ok(quote! {
        impl #impl_generics #trait_path for #ident #ty_generics #where_clause {
            fn to_payload(&self) -> #payload_path {
                #body
            }
        }
    })
}

/// Returns the token stream to reference the `treelog` crate root.
///
/// Handles crate renaming (e.g., `logs = { package = "treelog", ... }`).
fn crate_root() -> TokenStream {
    match crate_name("treelog") {
        Ok(FoundCrate::Itself) => quote! { crate },
        Ok(FoundCrate::Name(name)) => {
            let ident = format_ident!("{}", name);
            quote! { ::#ident }
        }
        Err(_) => quote! { ::treelog },
    }
}

pub(crate) fn crate_path(item: &str) -> TokenStream {
    let root = crate_root();
    let item = format_ident!("{}", item);
    quote! { #root::#item }
}
