//! Bounds for generic parameters used by emitted fields.
//!
//! Only type parameters that appear in emitted fields get a `ToPayload` bound.
//! `PhantomData<T>` is not looked into, so marker parameters stay unbounded:
//!
//! ```ignore
//! #[derive(ToPayload)]
//! struct Id<T> {
//!     raw: u64,
//!     _kind: PhantomData<T>, // no `T: ToPayload` required
//! }
//! ```

use syn::{Ident, parse_quote, visit::Visit};

use crate::crate_path;

struct UsedParams<'a> {
    params: Vec<&'a Ident>,
    used: &'a mut Vec<Ident>,
}

impl<'ast> Visit<'ast> for UsedParams<'_> {
    fn visit_path(&mut self, path: &'ast syn::Path) {
        if path
            .segments
            .last()
            .is_some_and(|segment| segment.ident == "PhantomData")
        {
            return;
        }
        // A type parameter is always the first segment: `T` or `T::Assoc`.
        if let Some(first) = path.segments.first() {
            if self.params.iter().any(|param| **param == first.ident)
                && !self.used.contains(&first.ident)
            {
                self.used.push(first.ident.clone());
            }
        }
        syn::visit::visit_path(self, path);
    }
}

/// Records the type parameters of `generics` that `ty` mentions.
pub(crate) fn collect_generics_from_type(
    ty: &syn::Type,
    generics: &syn::Generics,
    used: &mut Vec<Ident>,
) {
    let mut visitor = UsedParams {
        params: generics.type_params().map(|param| &param.ident).collect(),
        used,
    };
    visitor.visit_type(ty);
}

/// Adds `ToPayload` bounds to generic parameters used in emitted fields.
pub(crate) fn add_to_payload_bounds(mut generics: syn::Generics, used: &[Ident]) -> syn::Generics {
    let trait_path = crate_path("ToPayload");
    for param in generics.type_params_mut() {
        if used.contains(&param.ident) {
            param.bounds.push(parse_quote!(#trait_path));
        }
    }
    generics
}
