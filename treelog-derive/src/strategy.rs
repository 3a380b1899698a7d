//! Parsing of `#[payload(...)]` field attributes.

use syn::{Attribute, LitStr, Result, spanned::Spanned};

/// What the derive does with one field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Strategy {
    /// Emit the field, optionally under a different name.
    Emit { rename: Option<String> },
    /// `#[payload(skip)]`: leave the field out.
    Skip,
}

pub(crate) fn parse_field_strategy(attrs: &[Attribute]) -> Result<Strategy> {
    let mut skip = false;
    let mut rename: Option<String> = None;

    for attr in attrs.iter().filter(|attr| attr.path().is_ident("payload")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                if skip {
                    return Err(meta.error("duplicate `skip`"));
                }
                skip = true;
                Ok(())
            } else if meta.path.is_ident("rename") {
                if rename.is_some() {
                    return Err(meta.error("duplicate `rename`"));
                }
                let name: LitStr = meta.value()?.parse()?;
                rename = Some(name.value());
                Ok(())
            } else {
                Err(meta.error("expected `skip` or `rename = \"...\"`"))
            }
        })?;

        if skip && rename.is_some() {
            return Err(syn::Error::new(
                attr.span(),
                "`skip` and `rename` cannot be combined",
            ));
        }
    }

    Ok(if skip {
        Strategy::Skip
    } else {
        Strategy::Emit { rename }
    })
}
