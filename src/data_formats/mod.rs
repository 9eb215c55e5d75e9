mod request;
mod response;
mod wrapper;

pub use request::*;
pub use response::*;
pub use wrapper::*;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{db_helpers::ListParams, errors::RequestError};

const DEFAULT_LIMIT: i64 = 10;
/// Rows returned when a client asks for `limit=0`.
const ROW_CAP: i64 = 1000;

/// Raw list query string: `?query=k:v,k:v&fields=a,b&sortby=a&order=desc&limit=10&offset=0`.
///
/// Everything is kept as text so unparseable numbers fall back to defaults
/// instead of rejecting the request.
#[derive(Deserialize, Serialize, Debug, Default)]
#[serde(default)]
pub struct ListQueryParams {
    pub query: Option<String>,
    pub fields: Option<String>,
    pub sortby: Option<String>,
    pub order: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

fn comma_list(value: Option<&str>) -> Vec<String> {
    match value {
        Some(v) if !v.is_empty() => v.split(',').map(str::to_string).collect(),
        _ => vec![],
    }
}

fn integer_or(value: Option<&str>, default: i64) -> i64 {
    value.and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn limit_or_default(value: Option<&str>) -> i64 {
    match integer_or(value, DEFAULT_LIMIT) {
        0 => ROW_CAP,
        limit => limit,
    }
}

impl ListQueryParams {
    pub fn into_list_params(self) -> Result<ListParams, RequestError> {
        let mut query = BTreeMap::new();
        if let Some(conditions) = self.query.as_deref().filter(|v| !v.is_empty()) {
            for condition in conditions.split(',') {
                let kv: Vec<&str> = condition.split(':').collect();
                if kv.len() != 2 {
                    return Err(RequestError::InvalidQuery(
                        "Error: invalid query key/value pair",
                    ));
                }
                query.insert(kv[0].to_string(), kv[1].to_string());
            }
        }

        Ok(ListParams {
            query,
            fields: comma_list(self.fields.as_deref()),
            sortby: comma_list(self.sortby.as_deref()),
            order: comma_list(self.order.as_deref()),
            offset: integer_or(self.offset.as_deref(), 0),
            limit: limit_or_default(self.limit.as_deref()),
        })
    }
}

#[derive(Deserialize, Serialize, Debug, Default)]
#[serde(default)]
pub struct PageParams {
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl PageParams {
    pub fn limit(&self) -> i64 {
        limit_or_default(self.limit.as_deref())
    }

    pub fn offset(&self) -> i64 {
        integer_or(self.offset.as_deref(), 0)
    }
}

/// Path ids that are not numbers become 0, which never matches a row.
pub fn parse_id(raw: &str) -> i64 {
    raw.parse().unwrap_or(0)
}
