use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{Data, DeriveInput, Error, parse_macro_input};

/// Register a migration type with the link-time registry.
///
/// The type must implement `Default` (used as its no-argument factory) and
/// `seqmig::Migration`. Its name and module path become the migration's name
/// and namespace; name and numbering rules are checked by the runner before
/// anything executes.
///
/// ```text
/// #[derive(Default, Migration)]
/// pub struct Migration3;
/// ```
#[proc_macro_derive(Migration)]
pub fn derive_migration(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match emit_registration(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn emit_registration(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    if !input.generics.params.is_empty() {
        return Err(Error::new_spanned(
            &input.generics,
            "migration types cannot be generic; register one concrete type per migration",
        ));
    }
    if let Data::Union(data) = &input.data {
        return Err(Error::new_spanned(
            data.union_token,
            "Migration cannot be derived for unions",
        ));
    }

    let ident = &input.ident;
    let name = ident.to_string();
    let factory = format_ident!("__seqmig_factory_{}", ident);

    Ok(quote! {
        #[doc(hidden)]
        #[allow(non_snake_case)]
        fn #factory() -> ::std::boxed::Box<dyn ::seqmig::Migration> {
            ::std::boxed::Box::new(<#ident as ::core::default::Default>::default())
        }

        ::seqmig::inventory::submit! {
            ::seqmig::MigrationDescriptor::new(#name, ::core::module_path!(), #factory)
        }
    })
}
