use rust_decimal::Decimal;
use tabula::{Connection, Entity, Invocation, NO_PARAMS, Value, columns_for, table_name_for};

/// Composite primary key, the `note` column is filled by the database.
#[derive(Default, Debug, Clone, PartialEq, Entity)]
#[tabula(table = "tabula_ledger_entry")]
pub struct LedgerEntry {
    #[tabula(primary_key)]
    pub account: String,
    #[tabula(primary_key)]
    pub line: i32,
    pub amount: Decimal,
    #[tabula(read_only)]
    pub note: String,
}

pub async fn ledger<C: Connection>(invocation: &mut Invocation<C>) {
    assert_eq!(table_name_for::<LedgerEntry>(), "tabula_ledger_entry");
    assert_eq!(
        columns_for::<LedgerEntry>().primary_key().names(),
        ["account", "line"]
    );

    // Setup
    invocation
        .exec("DROP TABLE IF EXISTS tabula_ledger_entry", NO_PARAMS)
        .await
        .expect("Failed to drop tabula_ledger_entry");
    invocation
        .exec(
            "CREATE TABLE tabula_ledger_entry (
                account VARCHAR NOT NULL,
                line INTEGER NOT NULL,
                amount NUMERIC(12, 2) NOT NULL,
                note VARCHAR NOT NULL DEFAULT 'generated',
                PRIMARY KEY (account, line))",
            NO_PARAMS,
        )
        .await
        .expect("Failed to create tabula_ledger_entry");

    let mut entries = [
        LedgerEntry {
            account: "ACME".into(),
            line: 1,
            amount: Decimal::new(1250, 2),
            ..Default::default()
        },
        LedgerEntry {
            account: "ACME".into(),
            line: 2,
            amount: Decimal::new(-300, 2),
            ..Default::default()
        },
        LedgerEntry {
            account: "Initech".into(),
            line: 1,
            amount: Decimal::new(99, 0),
            ..Default::default()
        },
    ];
    invocation
        .create_many(entries.iter_mut())
        .await
        .expect("Could not create the ledger entries");

    // The read only column is never written
    let notes = invocation
        .query(
            "SELECT note FROM tabula_ledger_entry WHERE account = $1",
            ["ACME"],
        )
        .await
        .expect("Could not query the notes");
    assert_eq!(notes.row_count(), 2);
    assert!(
        notes
            .column("note")
            .iter()
            .all(|v| *v == Value::Varchar(Some("generated".into())))
    );

    // Lookup by both keys
    let found = invocation
        .get::<LedgerEntry, _>([Value::from("ACME"), Value::from(2)])
        .await
        .expect("Could not get the ledger entry")
        .expect("The ledger entry should exist");
    assert_eq!(found.amount, Decimal::new(-3, 0));
    assert_eq!(found.note, "");

    // Delete matches every key column
    let result = invocation
        .delete(&entries[1])
        .await
        .expect("Could not delete the ledger entry");
    assert_eq!(result.rows_affected, 1);
    let mut remaining = invocation
        .get_all::<LedgerEntry>()
        .await
        .expect("Could not get all the ledger entries");
    remaining.sort_by(|a, b| (&a.account, a.line).cmp(&(&b.account, b.line)));
    assert_eq!(remaining, [entries[0].clone(), entries[2].clone()]);
}
