//! # Catalog Tests
//!
//! Database containers and long field names.

mod common;

use common::*;
use foxdbf::{Catalog, DbfError, Table, Value};
use tempfile::tempdir;

#[test]
fn catalog_lists_fields_of_table_in_file_order() {
    let dir = tempdir().unwrap();
    write_contacts_database(dir.path());

    let catalog = Catalog::read(dir.path().join("contacts.dbc"), encoding_rs::WINDOWS_1252).unwrap();

    assert_eq!(
        catalog.fields_of("CONTACTS").unwrap(),
        &[
            "CONTACT_ID".to_string(),
            "FIRST_NAME_OF_CONTACT".to_string(),
            "LAST_NAME_OF_CONTACT".to_string(),
        ]
    );
    assert_eq!(catalog.fields_of("ORDERS").unwrap(), &["ORDER_ID".to_string()]);
    assert_eq!(catalog.len(), 2);
}

#[test]
fn catalog_missing_table_is_table_not_found() {
    let dir = tempdir().unwrap();
    write_contacts_database(dir.path());

    let catalog = Catalog::read(dir.path().join("contacts.dbc"), encoding_rs::WINDOWS_1252).unwrap();
    let err = catalog.fields_of("INVOICES").unwrap_err();

    assert_eq!(
        DbfError::of(&err),
        Some(&DbfError::TableNotFound("INVOICES".into()))
    );
}

#[test]
fn table_row_without_fields_is_table_not_found() {
    let dir = tempdir().unwrap();
    catalog_fixture(&[
        (1, 1, "Table", "empty"),
        (2, 1, "Table", "people"),
        (3, 2, "Field", "person_id"),
    ])
    .write(&dir.path().join("sparse.dbc"));

    let catalog = Catalog::read(dir.path().join("sparse.dbc"), encoding_rs::WINDOWS_1252).unwrap();

    assert!(!catalog.contains("EMPTY"));
    assert_eq!(catalog.len(), 1);
    let err = catalog.fields_of("EMPTY").unwrap_err();
    assert_eq!(
        DbfError::of(&err),
        Some(&DbfError::TableNotFound("EMPTY".into()))
    );
    assert_eq!(catalog.fields_of("PEOPLE").unwrap(), &["PERSON_ID".to_string()]);
}

#[test]
fn catalog_table_has_no_dbc_of_its_own() {
    let dir = tempdir().unwrap();
    write_contacts_database(dir.path());

    let table = Table::open(dir.path().join("contacts.dbc"), encoding_rs::WINDOWS_1252).unwrap();

    assert!(table.header().flags().is_catalog());
    assert_eq!(table.dbc(), None);
}

#[test]
fn read_catalog_links_long_field_names() {
    let dir = tempdir().unwrap();
    let path = write_contacts_database(dir.path());

    let mut table = Table::open(&path, encoding_rs::WINDOWS_1252).unwrap();
    assert_eq!(table.dbc(), Some("contacts.dbc"));
    assert_eq!(table.fields()[1].name, "FIRST_NAME");

    table.read_catalog().unwrap();

    let names: Vec<&str> = table.fields().iter().map(|f| f.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["CONTACT_ID", "FIRST_NAME_OF_CONTACT", "LAST_NAME_OF_CONTACT"]
    );

    let mut record = table.record_at(1).unwrap();
    assert_eq!(
        record.field_value("last_name_of_contact").unwrap(),
        Value::from("Turing              ")
    );
}

#[test]
fn shorter_catalog_list_leaves_remaining_names() {
    let dir = tempdir().unwrap();
    catalog_fixture(&[(1, 1, "Table", "wide"), (2, 1, "Field", "first_long_name")])
        .write(&dir.path().join("wide.dbc"));
    let path = TableFixture::new(vec![field("FIRST", b'C', 5), field("SECOND", b'C', 5)])
        .backlink("wide.dbc")
        .record(vec![text("a"), text("b")])
        .write(&dir.path().join("wide.dbf"));

    let mut table = Table::open(&path, encoding_rs::WINDOWS_1252).unwrap();
    table.read_catalog().unwrap();

    assert_eq!(table.fields()[0].name, "FIRST_LONG_NAME");
    assert_eq!(table.fields()[1].name, "SECOND");
}

#[test]
fn linking_a_free_table_is_not_catalog_linked() {
    let dir = tempdir().unwrap();
    write_contacts_database(dir.path());
    let catalog = Catalog::read(dir.path().join("contacts.dbc"), encoding_rs::WINDOWS_1252).unwrap();

    let path = TableFixture::new(vec![field("ID", b'I', 4)])
        .record(vec![int(1)])
        .write(&dir.path().join("contacts_free.dbf"));
    let mut table = Table::open(&path, encoding_rs::WINDOWS_1252).unwrap();

    let err = table.link_catalog(&catalog).unwrap_err();
    assert!(matches!(
        DbfError::of(&err),
        Some(DbfError::NotCatalogLinked(_))
    ));
}

#[test]
fn linking_a_table_missing_from_catalog_is_table_not_found() {
    let dir = tempdir().unwrap();
    write_contacts_database(dir.path());
    let path = TableFixture::new(vec![field("ID", b'I', 4)])
        .backlink("contacts.dbc")
        .record(vec![int(1)])
        .write(&dir.path().join("stray.dbf"));

    let mut table = Table::open(&path, encoding_rs::WINDOWS_1252).unwrap();
    let err = table.read_catalog().unwrap_err();

    assert_eq!(
        DbfError::of(&err),
        Some(&DbfError::TableNotFound("STRAY".into()))
    );
}

#[test]
fn catalog_without_object_columns_is_field_not_found() {
    let dir = tempdir().unwrap();
    let path = TableFixture::new(vec![field("OBJECTID", b'I', 4)])
        .flags(FLAG_CATALOG)
        .record(vec![int(1)])
        .write(&dir.path().join("odd.dbc"));

    let err = Catalog::read(&path, encoding_rs::WINDOWS_1252).unwrap_err();

    assert!(matches!(DbfError::of(&err), Some(DbfError::FieldNotFound(_))));
}

#[test]
fn deleted_catalog_rows_are_ignored() {
    let dir = tempdir().unwrap();
    catalog_fixture(&[(1, 1, "Table", "t"), (2, 1, "Field", "kept")])
        .deleted_record(vec![int(3), int(1), text("Field"), text("dropped")])
        .write(&dir.path().join("t.dbc"));

    let catalog = Catalog::read(dir.path().join("t.dbc"), encoding_rs::WINDOWS_1252).unwrap();

    assert_eq!(catalog.fields_of("T").unwrap(), &["KEPT".to_string()]);
}
