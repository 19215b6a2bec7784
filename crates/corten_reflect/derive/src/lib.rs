//! Derive macro for block types. See [`Block`].
#![allow(clippy::std_instead_of_core, reason = "proc-macro lib")]
#![allow(clippy::std_instead_of_alloc, reason = "proc-macro lib")]

use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::{format_ident, quote};
use syn::spanned::Spanned;
use syn::{Data, DeriveInput, Fields, GenericArgument, PathArguments, Type, parse_macro_input};

static CORTEN_ATTRIBUTE_NAME: &str = "corten";

// -----------------------------------------------------------------------------
// Macros

/// # Block Derivation
///
/// `#[derive(Block)]` implements `Schematic` and `Block` for a struct with
/// named fields, deriving its schema once and caching it in a `'static`.
/// The type must also implement `Default` (the zero value).
///
/// Every field carries exactly one `#[corten(...)]` kind annotation:
///
/// - `#[corten(attr)]`: a scalar attribute, written `name = literal`;
/// - `#[corten(block)]`: a nested block, written `name { ... }`. An
///   `Option`-typed block field may additionally be absent.
///
/// ## Optional Fields
///
/// `optional` marks a field elidable on encode when its value matches what
/// decoding would reconstruct:
///
/// ```rust, ignore
/// #[derive(Block, Default)]
/// struct Server {
///     #[corten(attr)]
///     addr: String,
///     #[corten(attr, optional)]
///     limit: u32,
/// }
/// ```
///
/// ## Renaming
///
/// `rename = "..."` overrides the statement name of a field, or the block
/// name of the type when applied at the type level:
///
/// ```rust, ignore
/// #[derive(Block, Default)]
/// #[corten(rename = "server")]
/// struct ServerConfig {
///     #[corten(attr, rename = "listen_addr")]
///     addr: String,
/// }
/// ```
///
/// ## Self-Default
///
/// `#[corten(defaulter)]` at the type level resolves the type's `Defaulter`
/// impl into the schema, making it the default decoding starts from:
///
/// ```rust, ignore
/// #[derive(Block, Default)]
/// #[corten(defaulter)]
/// struct Retry {
///     #[corten(attr, optional)]
///     attempts: u32,
/// }
///
/// impl Defaulter for Retry {
///     fn set_to_default(&mut self) {
///         self.attempts = 3;
///     }
/// }
/// ```
///
/// ## Auto Registration
///
/// `#[corten(auto_register)]` at the type level submits the schema for
/// link-time collection by `TypeRegistry::auto_register`. The attribute is a
/// no-op when the `auto_register` feature is disabled.
#[proc_macro_derive(Block, attributes(corten))]
pub fn derive_block(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);

    match expand(&ast) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.into_compile_error().into(),
    }
}

// -----------------------------------------------------------------------------
// Attribute parsing

/// Type-level `#[corten(...)]` options.
#[derive(Default)]
struct TypeOpts {
    rename: Option<String>,
    defaulter: bool,
    auto_register: Option<Span>,
}

impl TypeOpts {
    fn parse(attrs: &[syn::Attribute]) -> syn::Result<Self> {
        let mut opts = Self::default();
        for attr in attrs {
            if !attr.path().is_ident(CORTEN_ATTRIBUTE_NAME) {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("defaulter") {
                    opts.defaulter = true;
                    Ok(())
                } else if meta.path.is_ident("auto_register") {
                    opts.auto_register = Some(meta.path.span());
                    Ok(())
                } else if meta.path.is_ident("rename") {
                    let lit: syn::LitStr = meta.value()?.parse()?;
                    check_name(&lit)?;
                    opts.rename = Some(lit.value());
                    Ok(())
                } else {
                    Err(meta.error("expected `defaulter`, `auto_register` or `rename = \"...\"`"))
                }
            })?;
        }
        Ok(opts)
    }
}

/// Which statement form a field uses.
#[derive(Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Attr,
    Block,
}

/// Field-level `#[corten(...)]` options.
struct FieldOpts {
    kind: FieldKind,
    optional: bool,
    rename: Option<String>,
}

impl FieldOpts {
    fn parse(field: &syn::Field) -> syn::Result<Self> {
        let mut kind = None;
        let mut optional = false;
        let mut rename = None;
        for attr in &field.attrs {
            if !attr.path().is_ident(CORTEN_ATTRIBUTE_NAME) {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("attr") {
                    set_kind(&mut kind, FieldKind::Attr, &meta)
                } else if meta.path.is_ident("block") {
                    set_kind(&mut kind, FieldKind::Block, &meta)
                } else if meta.path.is_ident("optional") {
                    optional = true;
                    Ok(())
                } else if meta.path.is_ident("rename") {
                    let lit: syn::LitStr = meta.value()?.parse()?;
                    check_name(&lit)?;
                    rename = Some(lit.value());
                    Ok(())
                } else {
                    Err(meta.error("expected `attr`, `block`, `optional` or `rename = \"...\"`"))
                }
            })?;
        }
        let Some(kind) = kind else {
            return Err(syn::Error::new_spanned(
                field,
                "field needs `#[corten(attr)]` or `#[corten(block)]`",
            ));
        };
        Ok(Self {
            kind,
            optional,
            rename,
        })
    }
}

fn set_kind(
    slot: &mut Option<FieldKind>,
    kind: FieldKind,
    meta: &syn::meta::ParseNestedMeta<'_>,
) -> syn::Result<()> {
    if slot.replace(kind).is_some() {
        return Err(meta.error("a field is either an `attr` or a `block`, not both"));
    }
    Ok(())
}

/// Statement names must survive a round trip through the parser.
fn check_name(lit: &syn::LitStr) -> syn::Result<()> {
    let name = lit.value();
    let mut chars = name.chars();
    let head_ok = chars
        .next()
        .is_some_and(|ch| ch.is_ascii_alphabetic() || ch == '_');
    if !head_ok || !chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '.') {
        return Err(syn::Error::new_spanned(
            lit,
            "names must match [A-Za-z_][A-Za-z0-9_.]*",
        ));
    }
    Ok(())
}

// -----------------------------------------------------------------------------
// Expansion

fn expand(ast: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let Data::Struct(data) = &ast.data else {
        return Err(syn::Error::new_spanned(
            ast,
            "`#[derive(Block)]` only supports structs",
        ));
    };
    let Fields::Named(fields) = &data.fields else {
        return Err(syn::Error::new_spanned(
            ast,
            "`#[derive(Block)]` only supports named fields",
        ));
    };
    if !ast.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &ast.generics,
            "`#[derive(Block)]` does not support generic types",
        ));
    }

    let opts = TypeOpts::parse(&ast.attrs)?;
    let ident = &ast.ident;
    let type_name = opts.rename.clone().unwrap_or_else(|| ident.to_string());

    let mut infos = Vec::new();
    let mut field_arms = Vec::new();
    let mut field_mut_arms = Vec::new();
    let mut names: Vec<String> = Vec::new();
    for (index, field) in fields.named.iter().enumerate() {
        let field_opts = FieldOpts::parse(field)?;
        let field_ident = field.ident.as_ref().expect("named fields checked above");
        let name = field_opts
            .rename
            .clone()
            .unwrap_or_else(|| field_ident.to_string());
        if names.contains(&name) {
            return Err(syn::Error::new_spanned(
                field,
                format!("duplicate field name `{name}`"),
            ));
        }
        names.push(name.clone());

        let (info, variant) = match field_opts.kind {
            FieldKind::Attr => (
                quote!(::corten_reflect::FieldInfo::attr(#name)),
                format_ident!("Attr"),
            ),
            FieldKind::Block => match option_inner(&field.ty) {
                Some(inner) => (
                    quote!(::corten_reflect::FieldInfo::ptr_block::<#inner>(#name)),
                    format_ident!("OptionalBlock"),
                ),
                None => {
                    let ty = &field.ty;
                    (
                        quote!(::corten_reflect::FieldInfo::block::<#ty>(#name)),
                        format_ident!("Block"),
                    )
                }
            },
        };
        let info = if field_opts.optional {
            quote!(#info.optional())
        } else {
            info
        };
        infos.push(info);
        field_arms.push(quote! {
            #index => ::core::option::Option::Some(
                ::corten_reflect::FieldRef::#variant(&self.#field_ident),
            ),
        });
        field_mut_arms.push(quote! {
            #index => ::core::option::Option::Some(
                ::corten_reflect::FieldMut::#variant(&mut self.#field_ident),
            ),
        });
    }

    let schema = quote!(::corten_reflect::Schema::new::<#ident>(#type_name, FIELDS));
    let schema = if opts.defaulter {
        quote! {
            #schema.with_defaulter(
                ::corten_reflect::macro_exports::defaulter_hook::<#ident>,
            )
        }
    } else {
        schema
    };

    let registration = registration(ident, &opts);

    Ok(quote! {
        const _: () = {
            const FIELDS: &[::corten_reflect::FieldInfo] = &[#(#infos),*];

            impl ::corten_reflect::Schematic for #ident {
                fn schema() -> &'static ::corten_reflect::Schema {
                    static SCHEMA: ::corten_reflect::Schema = #schema;
                    &SCHEMA
                }
            }

            impl ::corten_reflect::Block for #ident {
                #[inline]
                fn schema(&self) -> &'static ::corten_reflect::Schema {
                    <Self as ::corten_reflect::Schematic>::schema()
                }

                fn field(
                    &self,
                    index: usize,
                ) -> ::core::option::Option<::corten_reflect::FieldRef<'_>> {
                    match index {
                        #(#field_arms)*
                        _ => ::core::option::Option::None,
                    }
                }

                fn field_mut(
                    &mut self,
                    index: usize,
                ) -> ::core::option::Option<::corten_reflect::FieldMut<'_>> {
                    match index {
                        #(#field_mut_arms)*
                        _ => ::core::option::Option::None,
                    }
                }

                fn reset_zero(&mut self) {
                    *self = <Self as ::core::default::Default>::default();
                }

                #[inline]
                fn as_any(&self) -> &dyn ::core::any::Any {
                    self
                }

                #[inline]
                fn as_any_mut(&mut self) -> &mut dyn ::core::any::Any {
                    self
                }
            }

            #registration
        };
    })
}

/// Generate the `auto_register` submission.
#[cfg(feature = "auto_register")]
fn registration(ident: &syn::Ident, opts: &TypeOpts) -> proc_macro2::TokenStream {
    match opts.auto_register {
        Some(span) => quote::quote_spanned! { span =>
            ::corten_reflect::macro_exports::inventory::submit! {
                ::corten_reflect::BlockRegistration::new(
                    <#ident as ::corten_reflect::Schematic>::schema,
                )
            }
        },
        None => proc_macro2::TokenStream::new(),
    }
}

/// Generate the `auto_register` submission.
#[cfg(not(feature = "auto_register"))]
fn registration(_: &syn::Ident, opts: &TypeOpts) -> proc_macro2::TokenStream {
    // The attribute is accepted but inert without the feature.
    let _ = opts.auto_register;
    proc_macro2::TokenStream::new()
}

/// Returns the `T` of an `Option<T>` field type.
fn option_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    if segment.ident != "Option" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first()? {
        GenericArgument::Type(inner) if args.args.len() == 1 => Some(inner),
        _ => None,
    }
}
