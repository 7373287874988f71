use crate::decode_column::{ColumnMetadata, decode_column};
use convert_case::{Case, Casing};
use quote::ToTokens;
use std::collections::HashSet;
use syn::{Error, Fields, ItemStruct, LitStr, Result, parse::ParseBuffer, spanned::Spanned};

pub(crate) struct TableMetadata {
    pub(crate) item: ItemStruct,
    pub(crate) name: String,
    pub(crate) columns: Vec<ColumnMetadata>,
}

pub(crate) fn decode_table(item: ItemStruct) -> Result<TableMetadata> {
    if !item.generics.params.is_empty() {
        return Err(Error::new(
            item.generics.span(),
            "Entity cannot be derived for generic structs",
        ));
    }
    let Fields::Named(fields) = &item.fields else {
        return Err(Error::new(
            item.fields.span(),
            "Entity can only be derived for structs with named fields",
        ));
    };
    let columns = fields
        .named
        .iter()
        .map(decode_column)
        .collect::<Result<Vec<_>>>()?;
    let mut name = item.ident.to_string().to_case(Case::Snake);
    if name.starts_with('_') {
        name.remove(0);
    }
    for attr in &item.attrs {
        if !attr.path().is_ident("tabula") {
            continue;
        }
        attr.parse_nested_meta(|arg| {
            if arg.path.is_ident("table") {
                let Ok(value) = arg.value().and_then(ParseBuffer::parse::<LitStr>) else {
                    return Err(arg.error(
                        "Error while parsing `table`, use it like: `#[tabula(table = \"my_table\")]`",
                    ));
                };
                name = value.value();
            } else {
                return Err(arg.error(format!(
                    "Unknown attribute `{}` inside tabula macro",
                    arg.path.to_token_stream()
                )));
            }
            Ok(())
        })?;
    }
    let mut seen = HashSet::new();
    for column in columns.iter().filter(|c| !c.skip) {
        if !seen.insert(column.name.as_str()) {
            return Err(Error::new(
                column.ident.span(),
                format!("Column `{}` is declared more than once", column.name),
            ));
        }
    }
    Ok(TableMetadata {
        item,
        name,
        columns,
    })
}
