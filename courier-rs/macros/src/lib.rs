//! Derive macros for courier-rs: request markers (`Command`, `Query`, `Event`) and
//! constructor injection (`Inject`).

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{
    parse_macro_input, Data, DeriveInput, Fields, GenericArgument, PathArguments, Type,
};

/// Reads `#[<attr>(result = T)]` from the derive input, if present.
fn result_type(input: &DeriveInput, attr: &str) -> syn::Result<Option<Type>> {
    let mut result = None;
    for a in input.attrs.iter().filter(|a| a.path().is_ident(attr)) {
        a.parse_nested_meta(|meta| {
            if meta.path.is_ident("result") {
                result = Some(meta.value()?.parse::<Type>()?);
                Ok(())
            } else {
                Err(meta.error(format!("unsupported {} attribute", attr)))
            }
        })?;
    }
    Ok(result)
}

/// Implements `Command`, or `ResultCommand<T>` with `#[command(result = T)]`.
///
/// ```ignore
/// #[derive(Command)]
/// struct ShipOrder { id: u64 }
///
/// #[derive(Command)]
/// #[command(result = OrderId)]
/// struct CreateOrder { customer: String }
/// ```
#[proc_macro_derive(Command, attributes(command))]
pub fn derive_command(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let expanded = match result_type(&input, "command") {
        Ok(Some(result)) => quote! {
            impl #impl_generics ::courier_rs::ResultCommand<#result> for #name #ty_generics #where_clause {}
        },
        Ok(None) => quote! {
            impl #impl_generics ::courier_rs::Command for #name #ty_generics #where_clause {}
        },
        Err(e) => e.to_compile_error(),
    };
    TokenStream::from(expanded)
}

/// Implements `Query<T>`. The result type is required: `#[query(result = T)]`.
#[proc_macro_derive(Query, attributes(query))]
pub fn derive_query(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let expanded = match result_type(&input, "query") {
        Ok(Some(result)) => quote! {
            impl #impl_generics ::courier_rs::Query<#result> for #name #ty_generics #where_clause {}
        },
        Ok(None) => syn::Error::new_spanned(name, "#[derive(Query)] needs #[query(result = T)]")
            .to_compile_error(),
        Err(e) => e.to_compile_error(),
    };
    TokenStream::from(expanded)
}

#[proc_macro_derive(Event)]
pub fn derive_event(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    TokenStream::from(quote! {
        impl #impl_generics ::courier_rs::Event for #name #ty_generics #where_clause {}
    })
}

/// `T` when `ty` is `Arc<T>` (any path ending in `Arc`).
fn arc_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    let last = path.path.segments.last()?;
    if last.ident != "Arc" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &last.arguments else {
        return None;
    };
    match args.args.first()? {
        GenericArgument::Type(inner) if args.args.len() == 1 => Some(inner),
        _ => None,
    }
}

fn field_value(ty: &Type) -> TokenStream2 {
    match arc_inner(ty) {
        Some(inner) => quote! { ::courier_rs::ResolveExt::get_required::<#inner>(scope)? },
        None => quote! { ::core::default::Default::default() },
    }
}

/// Implements `Inject`: every `Arc<T>` field is resolved from the scope as a
/// required service, every other field takes its `Default`.
#[proc_macro_derive(Inject)]
pub fn derive_inject(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let Data::Struct(data) = &input.data else {
        return syn::Error::new_spanned(name, "#[derive(Inject)] supports structs only")
            .to_compile_error()
            .into();
    };
    let body = match &data.fields {
        Fields::Named(fields) => {
            let values = fields.named.iter().map(|f| {
                let ident = &f.ident;
                let value = field_value(&f.ty);
                quote! { #ident: #value }
            });
            quote! { Self { #(#values),* } }
        }
        Fields::Unnamed(fields) => {
            let values = fields.unnamed.iter().map(|f| field_value(&f.ty));
            quote! { Self(#(#values),*) }
        }
        Fields::Unit => quote! { Self },
    };

    TokenStream::from(quote! {
        impl #impl_generics ::courier_rs::Inject for #name #ty_generics #where_clause {
            #[allow(unused_variables)]
            fn inject(scope: &::courier_rs::Scope) -> ::core::result::Result<Self, ::courier_rs::ContainerError> {
                ::core::result::Result::Ok(#body)
            }
        }
    })
}
