use std::collections::VecDeque;
use std::sync::Mutex;

use crate::connection::{Connection, Row};
use crate::database_error::DatabaseError;
use crate::sql::physical_column::{IntBits, PhysicalColumn, PhysicalColumnType};
use crate::sql::physical_table::PhysicalTable;
use crate::sql::{Database, SQLValue, TableId};

/// A schema fixture shared by the compiler tests: a music catalog (artists,
/// albums, tags with a join table), an employee hierarchy for inheritance
/// datasets, and a composite-key pair (books keyed by isbn+edition).
pub struct TestSetup {
    pub database: Database,

    pub artists_table: TableId,
    pub albums_table: TableId,
    pub tags_table: TableId,
    pub album_tags_table: TableId,

    pub employees_table: TableId,
    pub managers_table: TableId,
    pub executives_table: TableId,

    pub books_table: TableId,
    pub reviews_table: TableId,
}

fn int_column(table_id: TableId, name: &str, is_pk: bool) -> PhysicalColumn {
    PhysicalColumn {
        table_id,
        name: name.to_string(),
        typ: PhysicalColumnType::Int { bits: IntBits::_64 },
        is_pk,
        is_nullable: false,
    }
}

fn string_column(table_id: TableId, name: &str, is_pk: bool) -> PhysicalColumn {
    PhysicalColumn {
        table_id,
        name: name.to_string(),
        typ: PhysicalColumnType::String { max_length: None },
        is_pk,
        is_nullable: false,
    }
}

impl TestSetup {
    pub fn with_setup(test_fn: impl Fn(TestSetup)) {
        let mut database = Database::default();

        let artists_table = database.insert_table(PhysicalTable::new("artists"));
        let albums_table = database.insert_table(PhysicalTable::new("albums"));
        let tags_table = database.insert_table(PhysicalTable::new("tags"));
        let album_tags_table = database.insert_table(PhysicalTable::new("album_tags"));
        let employees_table = database.insert_table(PhysicalTable::new("employees"));
        let managers_table = database.insert_table(PhysicalTable::new("managers"));
        let executives_table = database.insert_table(PhysicalTable::new("executives"));
        let books_table = database.insert_table(PhysicalTable::new("books"));
        let reviews_table = database.insert_table(PhysicalTable::new("reviews"));

        let columns: Vec<PhysicalColumn> = vec![
            int_column(artists_table, "id", true),
            string_column(artists_table, "name", false),
            int_column(albums_table, "id", true),
            int_column(albums_table, "artist_id", false),
            string_column(albums_table, "title", false),
            int_column(tags_table, "id", true),
            string_column(tags_table, "name", false),
            int_column(album_tags_table, "album_id", false),
            int_column(album_tags_table, "tag_id", false),
            int_column(employees_table, "id", true),
            string_column(employees_table, "kind", false),
            string_column(employees_table, "name", false),
            int_column(managers_table, "id", true),
            int_column(managers_table, "num_staff", false),
            int_column(executives_table, "id", true),
            int_column(executives_table, "num_managers", false),
            string_column(books_table, "isbn", true),
            int_column(books_table, "edition", true),
            string_column(books_table, "title", false),
            string_column(reviews_table, "book_isbn", false),
            int_column(reviews_table, "book_edition", false),
            string_column(reviews_table, "body", false),
        ];
        for column in columns {
            let table_id = column.table_id;
            database.get_table_mut(table_id).columns.push(column);
        }

        test_fn(TestSetup {
            database,
            artists_table,
            albums_table,
            tags_table,
            album_tags_table,
            employees_table,
            managers_table,
            executives_table,
            books_table,
            reviews_table,
        })
    }
}

/// Build a row from (column, value) pairs.
pub fn row(pairs: &[(&str, SQLValue)]) -> Row {
    pairs
        .iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect()
}

/// A scripted connection: queued row batches are returned in order, and every
/// statement is logged so tests can assert on query counts and SQL text.
#[derive(Default)]
pub struct MockConnection {
    responses: Mutex<VecDeque<Vec<Row>>>,
    log: Mutex<Vec<String>>,
}

impl MockConnection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue_rows(&self, rows: Vec<Row>) {
        self.responses
            .lock()
            .unwrap()
            .push_back(rows);
    }

    pub fn executed_sql(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

impl Connection for MockConnection {
    fn execute(&self, sql: &str) -> Result<u64, DatabaseError> {
        self.log.lock().unwrap().push(sql.to_string());
        Ok(0)
    }

    fn fetch_rows(&self, sql: &str) -> Result<Vec<Row>, DatabaseError> {
        self.log.lock().unwrap().push(sql.to_string());
        Ok(self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_default())
    }
}
