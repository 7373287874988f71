use quote::ToTokens;
use syn::{Error, Field, Ident, LitStr, Result, parse::ParseBuffer, spanned::Spanned};

pub(crate) struct ColumnMetadata {
    pub(crate) ident: Ident,
    pub(crate) name: String,
    pub(crate) primary_key: bool,
    pub(crate) serial: bool,
    pub(crate) read_only: bool,
    pub(crate) skip: bool,
}

/// Flag attributes do not accept a value: `#[tabula(serial)]`.
fn expect_flag(arg: &syn::meta::ParseNestedMeta, name: &str) -> Result<()> {
    if arg.input.peek(syn::Token![=]) {
        return Err(arg.error(format!(
            "Error while parsing `{name}`, use it like: `#[tabula({name})]`"
        )));
    }
    Ok(())
}

pub(crate) fn decode_column(field: &Field) -> Result<ColumnMetadata> {
    let Some(ident) = field.ident.clone() else {
        return Err(Error::new(
            field.span(),
            "Entity can only be derived for structs with named fields",
        ));
    };
    let mut name = ident.to_string();
    if let Some(stripped) = name.strip_prefix("r#") {
        name = stripped.to_string();
    }
    let mut metadata = ColumnMetadata {
        ident,
        name,
        primary_key: false,
        serial: false,
        read_only: false,
        skip: false,
    };
    for attr in &field.attrs {
        if !attr.path().is_ident("tabula") {
            continue;
        }
        attr.parse_nested_meta(|arg| {
            if arg.path.is_ident("name") {
                let Ok(v) = arg.value().and_then(ParseBuffer::parse::<LitStr>) else {
                    return Err(arg.error(
                        "Error while parsing `name`, use it like: `#[tabula(name = \"my_column\")]`",
                    ));
                };
                metadata.name = v.value();
            } else if arg.path.is_ident("primary_key") {
                expect_flag(&arg, "primary_key")?;
                metadata.primary_key = true;
            } else if arg.path.is_ident("serial") {
                expect_flag(&arg, "serial")?;
                metadata.serial = true;
            } else if arg.path.is_ident("read_only") {
                expect_flag(&arg, "read_only")?;
                metadata.read_only = true;
            } else if arg.path.is_ident("skip") {
                expect_flag(&arg, "skip")?;
                metadata.skip = true;
            } else {
                return Err(arg.error(format!(
                    "Unknown attribute `{}` inside tabula macro",
                    arg.path.to_token_stream()
                )));
            }
            Ok(())
        })?;
    }
    Ok(metadata)
}
