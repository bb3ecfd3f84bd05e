use proc_macro::TokenStream;
use quote::quote;
use syn::meta::ParseNestedMeta;
use syn::{Attribute, Data, DeriveInput, Expr, Field, Fields, LitStr, Token, parse_macro_input};

pub fn derive_es_mapping_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    name,
                    "EsMapping can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "EsMapping can only be derived for structs",
            ));
        }
    };

    let rename_all = container_rename_all(&input.attrs);

    let mut specs = Vec::with_capacity(fields.len());
    for field in fields {
        let wire_name = wire_name(field, rename_all)?;
        let ty = &field.ty;
        specs.push(quote! {
            ::esconvert::FieldSpec::of::<#ty>(#wire_name)
        });
    }

    Ok(quote! {
        impl #impl_generics ::esconvert::EsMapping for #name #ty_generics #where_clause {
            fn field_specs() -> ::std::vec::Vec<::esconvert::FieldSpec> {
                ::std::vec![#(#specs),*]
            }
        }
    })
}

fn wire_name(field: &Field, rename_all: Option<RenameRule>) -> syn::Result<String> {
    let mut es_rename = None;
    let mut serde_rename = None;

    for attr in &field.attrs {
        if attr.path().is_ident("es") {
            es_rename = es_rename.or(parse_es_attr(attr)?);
        } else if attr.path().is_ident("serde") {
            // serde reports its own malformed attributes.
            serde_rename = serde_rename.or(parse_serde_rename(attr).unwrap_or(None));
        }
    }

    if let Some(name) = es_rename.or(serde_rename) {
        return Ok(name);
    }

    let ident = field
        .ident
        .as_ref()
        .ok_or_else(|| syn::Error::new_spanned(field, "expected a named field"))?;
    let ident = ident.to_string();
    let ident = ident.strip_prefix("r#").map(str::to_string).unwrap_or(ident);
    Ok(match rename_all {
        Some(rule) => rule.apply(&ident),
        None => ident,
    })
}

/// Case conversions accepted by `#[serde(rename_all = "...")]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RenameRule {
    Lower,
    Upper,
    Pascal,
    Camel,
    Snake,
    ScreamingSnake,
    Kebab,
    ScreamingKebab,
}

impl RenameRule {
    fn from_name(rule: &str) -> Option<Self> {
        Some(match rule {
            "lowercase" => RenameRule::Lower,
            "UPPERCASE" => RenameRule::Upper,
            "PascalCase" => RenameRule::Pascal,
            "camelCase" => RenameRule::Camel,
            "snake_case" => RenameRule::Snake,
            "SCREAMING_SNAKE_CASE" => RenameRule::ScreamingSnake,
            "kebab-case" => RenameRule::Kebab,
            "SCREAMING-KEBAB-CASE" => RenameRule::ScreamingKebab,
            _ => return None,
        })
    }

    /// Apply to a snake_case field name the way serde does.
    fn apply(self, field: &str) -> String {
        match self {
            RenameRule::Lower | RenameRule::Snake => field.to_string(),
            RenameRule::Upper | RenameRule::ScreamingSnake => field.to_ascii_uppercase(),
            RenameRule::Pascal => {
                let mut pascal = String::with_capacity(field.len());
                let mut capitalize = true;
                for ch in field.chars() {
                    if ch == '_' {
                        capitalize = true;
                    } else if capitalize {
                        pascal.push(ch.to_ascii_uppercase());
                        capitalize = false;
                    } else {
                        pascal.push(ch);
                    }
                }
                pascal
            }
            RenameRule::Camel => {
                let pascal = RenameRule::Pascal.apply(field);
                let mut chars = pascal.chars();
                match chars.next() {
                    Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
                    None => pascal,
                }
            }
            RenameRule::Kebab => field.replace('_', "-"),
            RenameRule::ScreamingKebab => field.to_ascii_uppercase().replace('_', "-"),
        }
    }
}

/// `rename_all` (or its `serialize` half) from the struct's serde attributes.
fn container_rename_all(attrs: &[Attribute]) -> Option<RenameRule> {
    let mut rule = None;
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("serde")) {
        // serde reports its own malformed attributes.
        let _ = attr.parse_nested_meta(|meta| {
            if !meta.path.is_ident("rename_all") {
                return skip(meta);
            }
            if meta.input.peek(Token![=]) {
                let value: LitStr = meta.value()?.parse()?;
                rule = RenameRule::from_name(&value.value()).or(rule);
                return Ok(());
            }
            meta.parse_nested_meta(|inner| {
                if inner.path.is_ident("serialize") {
                    let value: LitStr = inner.value()?.parse()?;
                    rule = RenameRule::from_name(&value.value()).or(rule);
                    Ok(())
                } else {
                    skip(inner)
                }
            })
        });
    }
    rule
}

fn parse_es_attr(attr: &Attribute) -> syn::Result<Option<String>> {
    let mut rename = None;
    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("rename") {
            let value: LitStr = meta.value()?.parse()?;
            rename = Some(value.value());
            Ok(())
        } else {
            Err(meta.error("unsupported es attribute, expected `rename = \"...\"`"))
        }
    })?;
    Ok(rename)
}

fn parse_serde_rename(attr: &Attribute) -> syn::Result<Option<String>> {
    let mut rename = None;
    attr.parse_nested_meta(|meta| {
        if !meta.path.is_ident("rename") {
            return skip(meta);
        }
        if meta.input.peek(Token![=]) {
            let value: LitStr = meta.value()?.parse()?;
            rename = Some(value.value());
            return Ok(());
        }
        // rename(serialize = "...", deserialize = "...")
        meta.parse_nested_meta(|inner| {
            if inner.path.is_ident("serialize") {
                let value: LitStr = inner.value()?.parse()?;
                rename = Some(value.value());
                Ok(())
            } else {
                skip(inner)
            }
        })
    })?;
    Ok(rename)
}

fn skip(meta: ParseNestedMeta) -> syn::Result<()> {
    if meta.input.peek(Token![=]) {
        meta.value()?.parse::<Expr>()?;
    } else if meta.input.peek(syn::token::Paren) {
        meta.parse_nested_meta(skip)?;
    }
    Ok(())
}
