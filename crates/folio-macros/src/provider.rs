use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::{DeriveInput, Ident, LitStr, parse_macro_input};

const NAMESPACE_SEPARATOR: char = '\\';

/// Implementation of `#[provider("Vendor\\Name\\Class")]`.
///
/// Leaves the decorated type unchanged and appends a constructor plus a
/// `#[::folio_core::linkme::distributed_slice]` static that adds the type to
/// `folio_core::PROVIDER_CLASSES` under the given class name.
pub fn provider(attr: TokenStream, item: TokenStream) -> TokenStream {
    let class = parse_macro_input!(attr as LitStr);
    let input = parse_macro_input!(item as DeriveInput);

    if let Err(message) = validate_class_name(&class.value()) {
        return syn::Error::new(class.span(), message)
            .into_compile_error()
            .into();
    }

    if !input.generics.params.is_empty() {
        return syn::Error::new_spanned(
            &input.generics,
            "#[provider] types cannot be generic",
        )
        .into_compile_error()
        .into();
    }

    let ty = &input.ident;
    let upper = to_upper_snake(&ty.to_string());
    let create_fn = Ident::new(
        &format!("__folio_create_{}", upper.to_lowercase()),
        Span::call_site(),
    );
    let static_name = Ident::new(&format!("_PROVIDER_CLASS_{upper}"), Span::call_site());

    quote! {
        #input

        #[doc(hidden)]
        fn #create_fn() -> ::std::boxed::Box<dyn ::folio_core::ServiceProvider> {
            ::std::boxed::Box::new(<#ty as ::core::default::Default>::default())
        }

        #[::folio_core::linkme::distributed_slice(::folio_core::PROVIDER_CLASSES)]
        #[linkme(crate = ::folio_core::linkme)]
        static #static_name: ::folio_core::ProviderClass = ::folio_core::ProviderClass {
            name: #class,
            create: #create_fn,
        };
    }
    .into()
}

fn validate_class_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("provider class name cannot be empty".to_string());
    }
    if name.starts_with(NAMESPACE_SEPARATOR) || name.ends_with(NAMESPACE_SEPARATOR) {
        return Err(format!(
            "provider class name `{name}` must not start or end with a namespace separator"
        ));
    }
    if name.split(NAMESPACE_SEPARATOR).any(str::is_empty) {
        return Err(format!("provider class name `{name}` has an empty segment"));
    }
    Ok(())
}

fn to_upper_snake(ident: &str) -> String {
    let mut out = String::with_capacity(ident.len() + 4);
    for (i, c) in ident.chars().enumerate() {
        if c.is_uppercase() && i > 0 {
            out.push('_');
        }
        out.extend(c.to_uppercase());
    }
    out
}
