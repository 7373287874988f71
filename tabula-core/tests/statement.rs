mod fixtures;

#[cfg(test)]
mod tests {
    use crate::fixtures::{Account, Loose};
    use tabula_core::{ColumnDescriptor, ColumnSet, Entity, Statement, Value, truncate_long};

    #[test]
    fn insert_without_columns() {
        let statement =
            Statement::insert("only_serial", &ColumnSet::default(), &Loose::default(), None)
                .unwrap();
        assert_eq!(statement.sql, r#"INSERT INTO "only_serial" DEFAULT VALUES"#);
        assert!(statement.params.is_empty());
    }

    #[test]
    fn identifiers_are_quoted() {
        let columns = ColumnSet::new([ColumnDescriptor::new(r#"odd"name"#)]);
        let statement = Statement::select_all("my schema.my table", &columns);
        assert_eq!(
            statement.sql,
            r#"SELECT "odd""name" FROM "my schema"."my table""#
        );
        assert_eq!(
            Statement::select_all("t", &ColumnSet::default()).sql,
            r#"SELECT * FROM "t""#
        );
    }

    #[test]
    fn tokens_follow_parameters() {
        let account = Account {
            id: 2,
            owner: "o".into(),
            balance: 3,
            audit: None,
        };
        let columns = Account::columns();
        let statement = Statement::update(
            "accounts",
            &columns.update_columns(),
            &columns.primary_key(),
            &account,
        )
        .unwrap();
        let tokens = statement
            .sql
            .split(' ')
            .filter(|v| v.starts_with('$'))
            .map(|v| v.trim_end_matches(','))
            .collect::<Vec<_>>();
        assert_eq!(tokens, ["$1", "$2", "$3"]);
        assert_eq!(statement.params.len(), 3);

        let mut statement = Statement::new("SELECT ");
        statement
            .push_param(Value::Int32(Some(1)))
            .push_param(Value::Null);
        assert_eq!(statement.sql, "SELECT $1$2");
        assert_eq!(statement.to_string(), statement.sql);
    }

    #[test]
    fn long_statements_are_truncated() {
        let sql = "é".repeat(400);
        let short = truncate_long!(sql).to_string();
        assert!(short.ends_with("..."));
        assert!(short.len() <= 500);
        assert_eq!(truncate_long!("SELECT 1").to_string(), "SELECT 1");
    }
}
