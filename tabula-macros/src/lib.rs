mod decode_column;
mod decode_table;
mod encode_column;

use decode_table::decode_table;
use encode_column::encode_column_descriptor;
use proc_macro::TokenStream;
use quote::quote;
use syn::{ItemStruct, parse_macro_input};

/// Implements `tabula::Record` and `tabula::Entity` for a struct with named fields.
///
/// Struct attribute: `#[tabula(table = "name")]` (defaults to the snake case type name).
/// Field attributes: `#[tabula(name = "column", primary_key, serial, read_only, skip)]`.
/// The struct must implement `Default`, skipped fields keep their default value.
#[proc_macro_derive(Entity, attributes(tabula))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let item = parse_macro_input!(input as ItemStruct);
    let table = match decode_table(item) {
        Ok(v) => v,
        Err(e) => return e.to_compile_error().into(),
    };
    let name = &table.item.ident;
    let table_name = &table.name;
    let columns: Vec<_> = table.columns.iter().filter(|c| !c.skip).collect();
    let column_names: Vec<_> = columns.iter().map(|c| &c.name).collect();
    let idents: Vec<_> = columns.iter().map(|c| &c.ident).collect();
    let descriptors = columns.iter().map(|c| encode_column_descriptor(c));
    quote! {
        impl ::tabula::Record for #name {
            fn table(&self) -> &'static ::tabula::TableMeta {
                <Self as ::tabula::Entity>::table_meta()
            }

            fn field_value(&self, column: &str) -> ::tabula::Result<::tabula::Value> {
                match column {
                    #(#column_names => Ok(::tabula::AsValue::as_value(
                        ::std::clone::Clone::clone(&self.#idents),
                    )),)*
                    _ => Err(::tabula::unknown_column(
                        <Self as ::tabula::Entity>::table_meta().type_name,
                        column,
                    )),
                }
            }

            fn set_field(&mut self, column: &str, value: ::tabula::Value) -> ::tabula::Result<()> {
                match column {
                    #(#column_names => {
                        self.#idents = ::tabula::Context::with_context(
                            ::tabula::AsValue::try_from_value(value),
                            || format!("While setting the column `{}`", #column_names),
                        )?;
                        Ok(())
                    })*
                    _ => Err(::tabula::unknown_column(
                        <Self as ::tabula::Entity>::table_meta().type_name,
                        column,
                    )),
                }
            }
        }

        impl ::tabula::Entity for #name {
            fn table_meta() -> &'static ::tabula::TableMeta {
                static META: ::std::sync::LazyLock<::tabula::TableMeta> =
                    ::std::sync::LazyLock::new(|| {
                        ::tabula::TableMeta::new(
                            ::std::any::type_name::<#name>(),
                            #table_name,
                            ::tabula::ColumnSet::new([#(#descriptors),*]),
                        )
                    });
                &META
            }
        }
    }
    .into()
}
