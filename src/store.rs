use std::collections::HashMap;

use sqlx::SqlitePool;

use crate::errors::RequestError;

/// Storage class used to decode a column out of a dynamic row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Int,
    Text,
    Timestamp,
}

#[derive(Debug)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
}

/// A foreign key reachable as `name__column` in list queries.
#[derive(Debug)]
pub struct Relation {
    pub name: &'static str,
    pub column: &'static str,
    pub target: &'static str,
}

#[derive(Debug)]
pub struct TableSchema {
    pub table: &'static str,
    pub columns: &'static [Column],
    pub relations: &'static [Relation],
}

impl TableSchema {
    pub fn column(&self, name: &str) -> Option<&'static Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn relation(&self, name: &str) -> Option<&'static Relation> {
        self.relations.iter().find(|r| r.name == name)
    }
}

const fn col(name: &'static str, kind: ColumnKind) -> Column {
    Column { name, kind }
}

// No `password` column: it must never be selected or filtered on.
pub static USERS: TableSchema = TableSchema {
    table: "users",
    columns: &[
        col("id", ColumnKind::Int),
        col("username", ColumnKind::Text),
        col("email", ColumnKind::Text),
        col("created_at", ColumnKind::Timestamp),
    ],
    relations: &[],
};

pub static PHOTOS: TableSchema = TableSchema {
    table: "photos",
    columns: &[
        col("id", ColumnKind::Int),
        col("title", ColumnKind::Text),
        col("url", ColumnKind::Text),
        col("user_id", ColumnKind::Int),
        col("created_at", ColumnKind::Timestamp),
        col("updated_at", ColumnKind::Timestamp),
    ],
    relations: &[Relation {
        name: "user",
        column: "user_id",
        target: "users",
    }],
};

pub static PHOTO_COMMENTS: TableSchema = TableSchema {
    table: "photo_comments",
    columns: &[
        col("id", ColumnKind::Int),
        col("content", ColumnKind::Text),
        col("created_at", ColumnKind::Timestamp),
        col("updated_at", ColumnKind::Timestamp),
        col("photo_id", ColumnKind::Int),
        col("user_id", ColumnKind::Int),
    ],
    relations: &[
        Relation {
            name: "photo",
            column: "photo_id",
            target: "photos",
        },
        Relation {
            name: "user",
            column: "user_id",
            target: "users",
        },
    ],
};

pub static ARTICLES: TableSchema = TableSchema {
    table: "articles",
    columns: &[
        col("id", ColumnKind::Int),
        col("title", ColumnKind::Text),
        col("content", ColumnKind::Text),
        col("created_at", ColumnKind::Timestamp),
        col("updated_at", ColumnKind::Timestamp),
        col("title_image", ColumnKind::Text),
    ],
    relations: &[],
};

/// Table mappings known to a [`Store`], keyed by table name.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    tables: HashMap<&'static str, &'static TableSchema>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, schema: &'static TableSchema) -> Self {
        self.tables.insert(schema.table, schema);
        self
    }

    /// Every table this crate persists.
    pub fn all() -> Self {
        Self::new()
            .register(&USERS)
            .register(&PHOTOS)
            .register(&PHOTO_COMMENTS)
            .register(&ARTICLES)
    }

    pub fn get(&self, table: &str) -> Result<&'static TableSchema, RequestError> {
        self.tables
            .get(table)
            .copied()
            .ok_or_else(|| RequestError::Unregistered(table.to_string()))
    }
}

/// Connection pool plus the table mappings queries are checked against.
#[derive(Debug)]
pub struct Store {
    pub pool: SqlitePool,
    pub schemas: SchemaRegistry,
}

impl Store {
    pub fn new(pool: SqlitePool, schemas: SchemaRegistry) -> Self {
        Self { pool, schemas }
    }

    pub fn schema(&self, table: &str) -> Result<&'static TableSchema, RequestError> {
        self.schemas.get(table)
    }
}
