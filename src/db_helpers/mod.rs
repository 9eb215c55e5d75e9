use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row as _, Sqlite, Transaction};

use crate::{
    errors::RequestError,
    models::{FieldValue, Row},
    store::{ColumnKind, Relation, SchemaRegistry, Store, TableSchema},
};

mod article_helpers;
mod photo_comment_helpers;
mod photo_helpers;
mod user_helpers;

pub use article_helpers::*;
pub use photo_comment_helpers::*;
pub use photo_helpers::*;
pub use user_helpers::*;

/// Filter, projection, ordering and paging for a list request.
#[derive(Debug, Clone, Default)]
pub struct ListParams {
    pub query: BTreeMap<String, String>,
    pub fields: Vec<String>,
    pub sortby: Vec<String>,
    pub order: Vec<String>,
    pub offset: i64,
    pub limit: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    fn parse(token: &str) -> Result<Self, RequestError> {
        match token {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(RequestError::InvalidQuery(
                "Error: Invalid order. Must be either [asc|desc]",
            )),
        }
    }

    fn to_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Pairs every `sortby` field with a direction.
///
/// Equal lengths pair element-wise; a single order applies to every field.
pub fn sort_keys(
    sortby: &[String],
    order: &[String],
) -> Result<Vec<(String, SortDirection)>, RequestError> {
    if sortby.is_empty() {
        if !order.is_empty() {
            return Err(RequestError::InvalidQuery("Error: unused 'order' fields"));
        }
        return Ok(vec![]);
    }

    if sortby.len() == order.len() {
        sortby
            .iter()
            .zip(order)
            .map(|(field, token)| Ok((field.clone(), SortDirection::parse(token)?)))
            .collect()
    } else if order.len() == 1 {
        let direction = SortDirection::parse(&order[0])?;
        Ok(sortby.iter().map(|field| (field.clone(), direction)).collect())
    } else {
        Err(RequestError::InvalidQuery(
            "Error: 'sortby', 'order' sizes mismatch or 'order' size is not 1",
        ))
    }
}

/// `related.field` -> `related__field`
pub fn join_path(key: &str) -> String {
    key.replace('.', "__")
}

/// A SELECT statement ready to bind: filter values in order, then limit and offset.
#[derive(Debug)]
pub struct ListQuery {
    pub sql: String,
    pub params: Vec<String>,
    pub limit: i64,
    pub offset: i64,
    pub fields: Vec<(String, ColumnKind)>,
}

struct QueryBuilder<'a> {
    registry: &'a SchemaRegistry,
    schema: &'static TableSchema,
    joins: Vec<&'static Relation>,
    filters: Vec<String>,
    params: Vec<String>,
    sorts: Vec<String>,
    selected: Vec<(String, String, ColumnKind)>,
}

impl<'a> QueryBuilder<'a> {
    fn new(registry: &'a SchemaRegistry, schema: &'static TableSchema) -> Self {
        Self {
            registry,
            schema,
            joins: vec![],
            filters: vec![],
            params: vec![],
            sorts: vec![],
            selected: vec![],
        }
    }

    /// Maps a field path onto a quoted SQL expression, joining relations on demand.
    fn resolve(&mut self, path: &str) -> Result<(String, ColumnKind), RequestError> {
        let unknown = || RequestError::UnknownField(path.to_string());
        let table = self.schema.table;
        let parts: Vec<&str> = path.split("__").collect();

        match parts.as_slice() {
            [name] => {
                if let Some(column) = self.schema.column(name) {
                    Ok((format!("\"{}\".\"{}\"", table, column.name), column.kind))
                } else if let Some(relation) = self.schema.relation(name) {
                    Ok((format!("\"{}\".\"{}\"", table, relation.column), ColumnKind::Int))
                } else {
                    Err(unknown())
                }
            }
            [relation, name] => {
                let relation = self.schema.relation(relation).ok_or_else(unknown)?;
                let target = self.registry.get(relation.target)?;
                let column = target.column(name).ok_or_else(unknown)?;
                if !self.joins.iter().any(|r| r.name == relation.name) {
                    self.joins.push(relation);
                }
                Ok((format!("\"{}\".\"{}\"", relation.name, column.name), column.kind))
            }
            _ => Err(unknown()),
        }
    }

    fn filter(mut self, key: &str, value: &str) -> Result<Self, RequestError> {
        let (expr, _) = self.resolve(&join_path(key))?;
        self.filters.push(format!("{} = ?", expr));
        self.params.push(value.to_string());
        Ok(self)
    }

    fn order_by(mut self, field: &str, direction: SortDirection) -> Result<Self, RequestError> {
        let (expr, _) = self.resolve(field)?;
        self.sorts.push(format!("{} {}", expr, direction.to_sql()));
        Ok(self)
    }

    fn select(mut self, fields: &[String]) -> Result<Self, RequestError> {
        if fields.is_empty() {
            let table = self.schema.table;
            for column in self.schema.columns {
                self.selected.push((
                    column.name.to_string(),
                    format!("\"{}\".\"{}\"", table, column.name),
                    column.kind,
                ));
            }
            return Ok(self);
        }
        for field in fields {
            let key = join_path(field);
            if self.selected.iter().any(|(name, _, _)| *name == key) {
                continue;
            }
            let (expr, kind) = self.resolve(&key)?;
            self.selected.push((key, expr, kind));
        }
        Ok(self)
    }

    fn build(self, limit: i64, offset: i64) -> ListQuery {
        let columns: Vec<&str> = self.selected.iter().map(|(_, expr, _)| expr.as_str()).collect();
        let mut sql = format!("SELECT {} FROM \"{}\"", columns.join(", "), self.schema.table);
        for relation in &self.joins {
            sql.push_str(&format!(
                " LEFT JOIN \"{target}\" AS \"{alias}\" ON \"{alias}\".\"id\" = \"{table}\".\"{column}\"",
                target = relation.target,
                alias = relation.name,
                table = self.schema.table,
                column = relation.column,
            ));
        }
        if !self.filters.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.filters.join(" AND "));
        }
        if !self.sorts.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.sorts.join(", "));
        }
        sql.push_str(" LIMIT ? OFFSET ?");

        ListQuery {
            sql,
            params: self.params,
            limit,
            offset,
            fields: self
                .selected
                .into_iter()
                .map(|(key, _, kind)| (key, kind))
                .collect(),
        }
    }
}

/// Translates list parameters into SQL checked against the registered schemas.
pub fn build_list_query(
    registry: &SchemaRegistry,
    schema: &'static TableSchema,
    params: &ListParams,
) -> Result<ListQuery, RequestError> {
    let mut builder = QueryBuilder::new(registry, schema);
    for (key, value) in &params.query {
        builder = builder.filter(key, value)?;
    }
    for (field, direction) in sort_keys(&params.sortby, &params.order)? {
        builder = builder.order_by(&field, direction)?;
    }
    let builder = builder.select(&params.fields)?;
    Ok(builder.build(params.limit, params.offset))
}

fn decode_row(row: &SqliteRow, fields: &[(String, ColumnKind)]) -> Result<Row, RequestError> {
    let mut values = Vec::with_capacity(fields.len());
    for (index, (key, kind)) in fields.iter().enumerate() {
        let value = match kind {
            ColumnKind::Int => row
                .try_get::<Option<i64>, _>(index)?
                .map_or(FieldValue::Null, FieldValue::Int),
            ColumnKind::Text => row
                .try_get::<Option<String>, _>(index)?
                .map_or(FieldValue::Null, FieldValue::Text),
            ColumnKind::Timestamp => row
                .try_get::<Option<DateTime<Utc>>, _>(index)?
                .map_or(FieldValue::Null, FieldValue::Timestamp),
        };
        values.push((key.clone(), value));
    }
    Ok(Row(values))
}

/// Existence pre-read used before updates and deletes.
async fn ensure_exists(
    tx: &mut Transaction<'_, Sqlite>,
    table: &'static str,
    id: i64,
    not_found: &'static str,
) -> Result<(), RequestError> {
    let query = format!("SELECT id FROM \"{}\" WHERE id = $1", table);
    let found = sqlx::query(&query)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
    match found {
        Some(_) => Ok(()),
        None => Err(RequestError::NotFound(not_found)),
    }
}

/// Runs a list request against `table` and returns loosely-typed rows.
pub async fn list_rows_in_db(
    store: &Store,
    table: &str,
    params: &ListParams,
) -> Result<Vec<Row>, RequestError> {
    let schema = store.schema(table)?;
    let list = build_list_query(&store.schemas, schema, params)?;
    tracing::debug!(sql = %list.sql, "list query");

    let mut query = sqlx::query(&list.sql);
    for param in list.params {
        query = query.bind(param);
    }
    let rows = query
        .bind(list.limit)
        .bind(list.offset)
        .fetch_all(&store.pool)
        .await?;

    rows.iter().map(|row| decode_row(row, &list.fields)).collect()
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{ARTICLES, PHOTO_COMMENTS};

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn sort_pairs_each_field_with_its_order() {
        let keys = sort_keys(&strings(&["a", "b"]), &strings(&["desc", "asc"])).unwrap();
        assert_eq!(
            keys,
            vec![
                ("a".to_string(), SortDirection::Desc),
                ("b".to_string(), SortDirection::Asc)
            ]
        );
    }

    #[test]
    fn single_order_applies_to_every_field() {
        let keys = sort_keys(&strings(&["a", "b"]), &strings(&["desc"])).unwrap();
        assert!(keys.iter().all(|(_, d)| *d == SortDirection::Desc));
        assert_eq!(keys.len(), 2);
    }

    #[test]
    fn sort_errors() {
        let err = sort_keys(&[], &strings(&["asc"])).unwrap_err();
        assert_eq!(err.to_string(), "Error: unused 'order' fields");

        let err = sort_keys(&strings(&["a", "b", "c"]), &strings(&["asc", "desc"])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Error: 'sortby', 'order' sizes mismatch or 'order' size is not 1"
        );

        let err = sort_keys(&strings(&["a"]), &strings(&["up"])).unwrap_err();
        assert_eq!(err.to_string(), "Error: Invalid order. Must be either [asc|desc]");

        let err = sort_keys(&strings(&["a", "b"]), &strings(&["sideways"])).unwrap_err();
        assert_eq!(err.to_string(), "Error: Invalid order. Must be either [asc|desc]");
    }

    #[test]
    fn filters_are_anded_and_bound_in_key_order() {
        let registry = SchemaRegistry::all();
        let mut params = ListParams {
            limit: 10,
            ..Default::default()
        };
        params.query.insert("title".into(), "t".into());
        params.query.insert("content".into(), "c".into());

        let list = build_list_query(&registry, &ARTICLES, &params).unwrap();
        assert!(list
            .sql
            .contains(r#"WHERE "articles"."content" = ? AND "articles"."title" = ?"#));
        assert_eq!(list.params, strings(&["c", "t"]));
        assert!(list.sql.ends_with("LIMIT ? OFFSET ?"));
        assert_eq!(list.fields.len(), ARTICLES.columns.len());
    }

    #[test]
    fn dot_notation_joins_the_relation() {
        let registry = SchemaRegistry::all();
        let mut params = ListParams {
            fields: strings(&["id", "photo.title"]),
            sortby: strings(&["photo__id"]),
            order: strings(&["desc"]),
            ..Default::default()
        };
        params.query.insert("photo.title".into(), "cat".into());

        let list = build_list_query(&registry, &PHOTO_COMMENTS, &params).unwrap();
        assert_eq!(
            list.sql,
            concat!(
                r#"SELECT "photo_comments"."id", "photo"."title" FROM "photo_comments""#,
                r#" LEFT JOIN "photos" AS "photo" ON "photo"."id" = "photo_comments"."photo_id""#,
                r#" WHERE "photo"."title" = ?"#,
                r#" ORDER BY "photo"."id" DESC LIMIT ? OFFSET ?"#
            )
        );
        assert_eq!(list.fields[1], ("photo__title".to_string(), ColumnKind::Text));
    }

    #[test]
    fn unknown_names_are_rejected() {
        let registry = SchemaRegistry::all();
        let mut params = ListParams::default();
        params.query.insert("status".into(), "1".into());
        let err = build_list_query(&registry, &ARTICLES, &params).unwrap_err();
        assert_eq!(err.to_string(), "unknown field `status`");

        let params = ListParams {
            fields: strings(&["user__password"]),
            ..Default::default()
        };
        assert!(build_list_query(&registry, &PHOTO_COMMENTS, &params).is_err());

        let params = ListParams {
            sortby: strings(&["title; DROP TABLE articles"]),
            order: strings(&["asc"]),
            ..Default::default()
        };
        assert!(build_list_query(&registry, &ARTICLES, &params).is_err());
    }

    #[test]
    fn repeated_fields_are_selected_once() {
        let registry = SchemaRegistry::all();
        let params = ListParams {
            fields: strings(&["id", "content", "id", "photo.title", "photo__title"]),
            ..Default::default()
        };
        let list = build_list_query(&registry, &PHOTO_COMMENTS, &params).unwrap();
        let names: Vec<_> = list.fields.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, ["id", "content", "photo__title"]);
        assert_eq!(list.sql.matches("LEFT JOIN").count(), 1);
    }

    #[test]
    fn bare_relation_name_is_its_foreign_key() {
        let registry = SchemaRegistry::all();
        let mut params = ListParams::default();
        params.query.insert("photo".into(), "4".into());
        let list = build_list_query(&registry, &PHOTO_COMMENTS, &params).unwrap();
        assert!(list.sql.contains(r#"WHERE "photo_comments"."photo_id" = ?"#));
        assert!(!list.sql.contains("JOIN"));
    }

    #[tokio::test]
    async fn list_rows_projects_requested_fields() {
        let store = test_support::memory_store().await;
        for title in ["b", "a", "c"] {
            sqlx::query("INSERT INTO articles (title, content) VALUES (?, 'x')")
                .bind(title)
                .execute(&store.pool)
                .await
                .unwrap();
        }
        let params = ListParams {
            fields: strings(&["title"]),
            sortby: strings(&["title"]),
            order: strings(&["desc"]),
            limit: 2,
            offset: 0,
            ..Default::default()
        };
        let rows = list_rows_in_db(&store, "articles", &params).await.unwrap();
        let titles: Vec<_> = rows.iter().map(|r| r.get("title").cloned()).collect();
        assert_eq!(
            titles,
            vec![
                Some(FieldValue::Text("c".into())),
                Some(FieldValue::Text("b".into()))
            ]
        );
        assert_eq!(rows[0].columns().collect::<Vec<_>>(), ["title"]);
    }
}
