//! Multi-query builder: one search query per identifier.

use serde::{Deserialize, Serialize};

use crate::extract::split_paths;

/// One entry of a multi-query request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub index_name: String,
    /// Form-urlencoded search parameters.
    pub params: String,
}

/// Request body: `{"requests": [...]}`.
#[derive(Debug, Serialize)]
pub struct MultiQueryBody<'a> {
    pub requests: &'a [SearchQuery],
}

/// `field:"<id>"` for every configured field, joined with ` OR `.
pub fn filter_expression(id: &str, filter_field_spec: &str) -> String {
    filter_field_spec
        .split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(|field| format!("{field}:\"{id}\""))
        .collect::<Vec<_>>()
        .join(" OR ")
}

/// Build one query per id: a single hit, only the label paths retrieved,
/// filtered on the id across every configured filter field.
pub fn build_queries(
    batch: &[String],
    index_name: &str,
    filter_field_spec: &str,
    paths_spec: &str,
) -> Vec<SearchQuery> {
    let attributes = split_paths(paths_spec).join(",");
    batch
        .iter()
        .map(|id| {
            let params = url::form_urlencoded::Serializer::new(String::new())
                .append_pair("hitsPerPage", "1")
                .append_pair("attributesToRetrieve", &attributes)
                .append_pair("filters", &filter_expression(id, filter_field_spec))
                .finish();
            SearchQuery {
                index_name: index_name.to_string(),
                params,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn decode(params: &str) -> HashMap<String, String> {
        url::form_urlencoded::parse(params.as_bytes())
            .into_owned()
            .collect()
    }

    #[test]
    fn filter_expression_ors_every_field() {
        assert_eq!(filter_expression("63", "categoryId"), "categoryId:\"63\"");
        assert_eq!(
            filter_expression("63", " categories.id , categoryIds ,"),
            "categories.id:\"63\" OR categoryIds:\"63\""
        );
    }

    #[test]
    fn one_query_per_id() {
        let batch = vec!["63".to_string(), "shoes".to_string()];
        let queries = build_queries(&batch, "products", "categoryId", "categories, categoriesHierarchy");
        assert_eq!(queries.len(), 2);
        assert!(queries.iter().all(|q| q.index_name == "products"));

        let first = decode(&queries[0].params);
        assert_eq!(first["hitsPerPage"], "1");
        assert_eq!(first["attributesToRetrieve"], "categories,categoriesHierarchy");
        assert_eq!(first["filters"], "categoryId:\"63\"");

        let second = decode(&queries[1].params);
        assert_eq!(second["filters"], "categoryId:\"shoes\"");
    }

    #[test]
    fn params_are_form_encoded() {
        let batch = vec!["63".to_string()];
        let queries = build_queries(&batch, "idx", "a,b", "categories");
        let params = &queries[0].params;
        assert!(params.starts_with("hitsPerPage=1&attributesToRetrieve=categories&filters="));
        assert!(params.contains("a%3A%2263%22+OR+b%3A%2263%22"));
    }

    #[test]
    fn body_serializes_camel_case() {
        let queries = build_queries(&["1".to_string()], "idx", "f", "p");
        let body = serde_json::to_value(MultiQueryBody { requests: &queries }).unwrap();
        assert_eq!(body["requests"][0]["indexName"], "idx");
        assert!(body["requests"][0]["params"].is_string());
    }
}
