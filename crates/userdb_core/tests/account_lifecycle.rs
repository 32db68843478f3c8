mod common;

use common::StaleLookupStore;
use rusqlite::Connection;
use std::convert::Infallible;
use userdb_core::db::open_db_in_memory;
use userdb_core::model::AssetId;
use userdb_core::{
    AccountId, AccountService, ErrorKind, NomineeMap, OwnerMap, OwnershipError, ProductService,
    ProjectService, ServiceError, SqliteStore,
};
use uuid::Uuid;

const OWNER: i64 = 1;
const PARTNER: i64 = 2;
const USER: i64 = 3;

fn path_gen(id: AssetId) -> String {
    format!("/srv/assets/{id}")
}

fn encrypt(plain: &[u8]) -> Result<Vec<u8>, Infallible> {
    Ok(plain.iter().map(|byte| byte ^ 0x5a).collect())
}

fn compare(plain: &[u8], stored: &[u8]) -> bool {
    encrypt(plain).map(|cipher| cipher == stored).unwrap_or(false)
}

fn create_account(conn: &Connection, name: &str) -> AccountId {
    AccountService::new(SqliteStore::new(conn))
        .create(name, &format!("{name}@x"), b"pw", path_gen, encrypt)
        .unwrap()
        .id
}

fn count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}

fn snapshot(conn: &Connection) -> Vec<i64> {
    [
        "accounts",
        "account_settings",
        "account_assets",
        "products",
        "product_details",
        "product_assets",
        "account_products",
        "projects",
        "project_details",
        "project_assets",
        "account_projects",
    ]
    .iter()
    .map(|table| count(conn, table))
    .collect()
}

#[test]
fn create_normalizes_email_and_reads_back() {
    let conn = open_db_in_memory().unwrap();
    let accounts = AccountService::new(SqliteStore::new(&conn));

    let created = accounts
        .create("alice", " alice @x ", b"secret", path_gen, encrypt)
        .unwrap();

    assert_eq!(created.email, "alice@x");
    assert_eq!(accounts.get(created.id).unwrap(), created);
    assert_eq!(accounts.get_by_email("alice@x\n").unwrap().id, created.id);
    assert!(matches!(
        accounts.get_by_email("nobody@x").unwrap_err(),
        ServiceError::AccountEmailNotFound(_)
    ));

    let stored: Vec<u8> = conn
        .query_row("SELECT password FROM accounts;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(stored, encrypt(b"secret").unwrap());
}

#[test]
fn creating_same_email_twice_is_duplicate_entry_with_one_row() {
    let conn = open_db_in_memory().unwrap();
    let accounts = AccountService::new(SqliteStore::new(&conn));

    accounts
        .create("alice", "alice@x", b"pw", path_gen, encrypt)
        .unwrap();
    let err = accounts
        .create("alice2", "alice@x", b"pw", path_gen, encrypt)
        .unwrap_err();

    assert!(matches!(err, ServiceError::DuplicateEmail(ref email) if email == "alice@x"));
    assert_eq!(err.kind(), ErrorKind::DuplicateEntry);
    assert_eq!(count(&conn, "accounts"), 1);
    assert_eq!(count(&conn, "account_settings"), 1);
    assert_eq!(count(&conn, "account_assets"), 1);
}

#[test]
fn store_rejected_name_maps_to_duplicate_account_name() {
    let conn = open_db_in_memory().unwrap();
    let accounts = AccountService::new(SqliteStore::new(&conn));

    accounts
        .create("alice", "alice@x", b"pw", path_gen, encrypt)
        .unwrap();
    let err = accounts
        .create("alice", "other@x", b"pw", path_gen, encrypt)
        .unwrap_err();

    assert!(matches!(err, ServiceError::DuplicateAccountName(ref name) if name == "alice"));
    assert_eq!(err.kind(), ErrorKind::DuplicateEntry);
    assert_eq!(count(&conn, "accounts"), 1);
    assert_eq!(count(&conn, "account_settings"), 1);
}

#[test]
fn email_collision_reported_by_store_maps_to_duplicate_email() {
    let conn = open_db_in_memory().unwrap();
    create_account(&conn, "alice");
    let before = snapshot(&conn);

    let err = AccountService::new(StaleLookupStore::new(&conn))
        .create("alicia", " alice@x ", b"pw", path_gen, encrypt)
        .unwrap_err();

    assert!(matches!(err, ServiceError::DuplicateEmail(ref email) if email == "alice@x"));
    assert_eq!(err.kind(), ErrorKind::DuplicateEntry);
    assert_eq!(snapshot(&conn), before);
}

#[test]
fn failing_encryption_writes_nothing() {
    let conn = open_db_in_memory().unwrap();
    let accounts = AccountService::new(SqliteStore::new(&conn));

    let err = accounts
        .create("alice", "alice@x", b"pw", path_gen, |_: &[u8]| {
            Err::<Vec<u8>, _>("hasher offline")
        })
        .unwrap_err();

    assert!(matches!(err, ServiceError::Credential(ref message) if message == "hasher offline"));
    assert_eq!(count(&conn, "accounts"), 0);
    assert_eq!(count(&conn, "account_settings"), 0);
}

#[test]
fn authenticate_distinguishes_unknown_account_from_bad_credentials() {
    let conn = open_db_in_memory().unwrap();
    let accounts = AccountService::new(SqliteStore::new(&conn));
    let alice = accounts
        .create("alice", "alice@x", b"secret", path_gen, encrypt)
        .unwrap();

    accounts
        .authenticate(alice.id, " alice@x", b"secret", compare)
        .unwrap();

    let err = accounts
        .authenticate(alice.id, "alice@x", b"wrong", compare)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AuthenticationFailed);

    let err = accounts
        .authenticate(alice.id, "mallory@x", b"secret", compare)
        .unwrap_err();
    assert!(matches!(err, ServiceError::AuthenticationFailed));

    let err = accounts
        .authenticate(Uuid::new_v4(), "alice@x", b"secret", compare)
        .unwrap_err();
    assert!(matches!(err, ServiceError::AccountNotFound(_)));
}

#[test]
fn update_settings_round_trips_and_reports_missing_rows() {
    let conn = open_db_in_memory().unwrap();
    let accounts = AccountService::new(SqliteStore::new(&conn));
    let mut alice = accounts
        .create("alice", "alice@x", b"pw", path_gen, encrypt)
        .unwrap();

    alice.settings.set_url("theme", "dark");
    accounts.update_settings(&alice).unwrap();
    alice.assets.set_image_path("avatar", &userdb_core::model::RandomIdSource);
    accounts.update_assets(&alice).unwrap();

    let loaded = accounts.get(alice.id).unwrap();
    assert_eq!(loaded.settings.url("theme", "light"), "dark");
    assert!(loaded
        .assets
        .image_path("avatar", "")
        .starts_with(&path_gen(loaded.assets.id)));

    let mut stale = loaded;
    stale.settings.id = Uuid::new_v4();
    assert!(matches!(
        accounts.update_settings(&stale).unwrap_err(),
        ServiceError::MissingAsset(_)
    ));
}

#[test]
fn get_many_returns_found_accounts_in_order() {
    let conn = open_db_in_memory().unwrap();
    let alice = create_account(&conn, "alice");
    let bob = create_account(&conn, "bob");
    let accounts = AccountService::new(SqliteStore::new(&conn));

    let views = accounts.get_many(&[bob, Uuid::new_v4(), alice]).unwrap();
    let ids: Vec<AccountId> = views.iter().map(|view| view.id).collect();
    assert_eq!(ids, vec![bob, alice]);
    assert!(matches!(
        accounts.get_many(&[]).unwrap_err(),
        ServiceError::EmptyIdList
    ));
}

#[test]
fn deleting_sole_owner_without_nominee_cascades_products_and_projects() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::new(&conn);
    let accounts = AccountService::new(store);
    let products = ProductService::new(store);
    let projects = ProjectService::new(store);

    let alice = create_account(&conn, "alice");
    let product = products.create("paint", false, alice, path_gen).unwrap();
    projects
        .create("sketch", false, alice, product.id, path_gen)
        .unwrap();

    accounts.delete(alice, &NomineeMap::new()).unwrap();

    assert!(matches!(
        products.get(product.id).unwrap_err(),
        ServiceError::ProductNotFound(_)
    ));
    assert!(matches!(
        accounts.get(alice).unwrap_err(),
        ServiceError::AccountNotFound(_)
    ));
    assert_eq!(snapshot(&conn), vec![0; 11]);
}

#[test]
fn deleting_owner_with_nominee_hands_product_over() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::new(&conn);
    let accounts = AccountService::new(store);
    let products = ProductService::new(store);

    let alice = create_account(&conn, "alice");
    let bob = create_account(&conn, "bob");
    let product = products.create("paint", false, alice, path_gen).unwrap();

    accounts
        .delete(alice, &NomineeMap::from([(product.id, bob)]))
        .unwrap();

    let loaded = products.get(product.id).unwrap();
    assert_eq!(loaded, product);
    assert_eq!(
        products.owners(product.id).unwrap(),
        OwnerMap::from([(bob, OWNER)])
    );
    assert_eq!(count(&conn, "accounts"), 1);
}

#[test]
fn nominee_that_already_shares_the_product_is_promoted() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::new(&conn);
    let accounts = AccountService::new(store);
    let products = ProductService::new(store);
    let projects = ProjectService::new(store);

    let alice = create_account(&conn, "alice");
    let bob = create_account(&conn, "bob");
    let product = products.create("paint", false, alice, path_gen).unwrap();
    accounts
        .add_product_ownership(product.id, bob, PARTNER)
        .unwrap();
    let project = projects
        .create("sketch", false, alice, product.id, path_gen)
        .unwrap();

    accounts
        .delete(alice, &NomineeMap::from([(product.id, bob)]))
        .unwrap();

    assert_eq!(
        products.owners(product.id).unwrap(),
        OwnerMap::from([(bob, OWNER)])
    );
    assert_eq!(
        projects.owners(project.id).unwrap(),
        OwnerMap::from([(bob, OWNER)])
    );
}

#[test]
fn non_owner_edges_are_released_and_foreign_products_survive() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::new(&conn);
    let accounts = AccountService::new(store);
    let products = ProductService::new(store);
    let projects = ProjectService::new(store);

    let alice = create_account(&conn, "alice");
    let carol = create_account(&conn, "carol");
    let product = products.create("paint", false, carol, path_gen).unwrap();
    accounts
        .add_product_ownership(product.id, alice, USER)
        .unwrap();
    let project = projects
        .create("sketch", false, carol, product.id, path_gen)
        .unwrap();
    projects.add_ownership(project.id, alice, PARTNER).unwrap();

    accounts.delete(alice, &NomineeMap::new()).unwrap();

    assert_eq!(
        products.owners(product.id).unwrap(),
        OwnerMap::from([(carol, OWNER)])
    );
    assert_eq!(
        projects.owners(project.id).unwrap(),
        OwnerMap::from([(carol, OWNER)])
    );
    assert_eq!(count(&conn, "accounts"), 1);
}

#[test]
fn owned_project_in_foreign_product_is_deleted_without_nominee() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::new(&conn);
    let accounts = AccountService::new(store);
    let products = ProductService::new(store);
    let projects = ProjectService::new(store);

    let alice = create_account(&conn, "alice");
    let carol = create_account(&conn, "carol");
    let product = products.create("paint", false, carol, path_gen).unwrap();
    let project = projects
        .create("sketch", false, alice, product.id, path_gen)
        .unwrap();

    accounts.delete(alice, &NomineeMap::new()).unwrap();

    assert!(matches!(
        projects.get(project.id).unwrap_err(),
        ServiceError::ProjectNotFound(_)
    ));
    assert!(products.get(product.id).is_ok());
}

fn assert_failing_delete_rolls_back(failing_table: &str) {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::new(&conn);
    let accounts = AccountService::new(store);
    let products = ProductService::new(store);
    let projects = ProjectService::new(store);

    let alice = create_account(&conn, "alice");
    let bob = create_account(&conn, "bob");
    let handed_over = products.create("handed", false, alice, path_gen).unwrap();
    let dropped = products.create("dropped", false, alice, path_gen).unwrap();
    projects
        .create("sketch", false, alice, dropped.id, path_gen)
        .unwrap();
    let before = snapshot(&conn);

    conn.execute_batch(&format!(
        "CREATE TRIGGER fail_{failing_table}_delete
         BEFORE DELETE ON {failing_table}
         BEGIN
             SELECT RAISE(ABORT, 'injected failure');
         END;"
    ))
    .unwrap();

    let err = accounts
        .delete(alice, &NomineeMap::from([(handed_over.id, bob)]))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Store, "failing table {failing_table}");

    assert_eq!(snapshot(&conn), before, "failing table {failing_table}");
    assert_eq!(
        products.owners(handed_over.id).unwrap(),
        OwnerMap::from([(alice, OWNER)])
    );
    assert!(products.get(dropped.id).is_ok());
    assert_eq!(projects.list_for_product(dropped.id).unwrap().len(), 1);
    assert!(accounts.get(alice).is_ok());
}

#[test]
fn failure_while_removing_account_rows_rolls_back_everything() {
    assert_failing_delete_rolls_back("account_settings");
}

#[test]
fn failure_while_cascading_projects_rolls_back_everything() {
    assert_failing_delete_rolls_back("project_assets");
}

#[test]
fn failure_while_cascading_products_rolls_back_everything() {
    assert_failing_delete_rolls_back("product_details");
}

#[test]
fn unknown_account_or_nominee_is_not_found_and_changes_nothing() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::new(&conn);
    let accounts = AccountService::new(store);
    let products = ProductService::new(store);

    assert!(matches!(
        accounts.delete(Uuid::new_v4(), &NomineeMap::new()).unwrap_err(),
        ServiceError::AccountNotFound(_)
    ));

    let alice = create_account(&conn, "alice");
    let product = products.create("paint", false, alice, path_gen).unwrap();
    let ghost = Uuid::new_v4();
    let before = snapshot(&conn);

    let err = accounts
        .delete(alice, &NomineeMap::from([(product.id, ghost)]))
        .unwrap_err();

    assert!(matches!(err, ServiceError::AccountNotFound(id) if id == ghost));
    assert_eq!(snapshot(&conn), before);
}

#[test]
fn product_edge_mutations_guard_owner_invariant() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteStore::new(&conn);
    let accounts = AccountService::new(store);
    let products = ProductService::new(store);

    let alice = create_account(&conn, "alice");
    let bob = create_account(&conn, "bob");
    let product = products.create("paint", false, alice, path_gen).unwrap();

    let err = accounts
        .remove_product_ownership(product.id, bob)
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::ProductUserNotAssociated { product_id, account_id }
            if product_id == product.id && account_id == bob
    ));

    let err = accounts
        .add_product_ownership(product.id, bob, 42)
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Ownership(OwnershipError::UnknownPrivilege { privilege: 42, .. })
    ));

    let err = accounts
        .add_product_ownership(product.id, bob, OWNER)
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Ownership(OwnershipError::InvalidOwnerCount { count: 2 })
    ));

    let err = accounts
        .remove_product_ownership(product.id, alice)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidOwnership);

    accounts
        .add_product_ownership(product.id, bob, PARTNER)
        .unwrap();
    assert_eq!(
        products.owners(product.id).unwrap(),
        OwnerMap::from([(alice, OWNER), (bob, PARTNER)])
    );
}
