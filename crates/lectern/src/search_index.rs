//! HTTP client for the Solr-style search index.
//!
//! Encodes a [`SearchRequest`] as select-handler query parameters and
//! decodes hits plus facet counts from the JSON response. Facet query
//! counts come back keyed by the raw range query; they are translated to
//! the bucket display names here.

use async_trait::async_trait;
use serde_json::Value;

use lectern_core::search::{
    bucket_name_for_range_query, FacetCounts, SearchError, SearchHit, SearchIndex, SearchRequest,
    SearchResults, START_FIELD,
};

/// HTTP implementation of the search index boundary.
#[derive(Debug, Clone)]
pub struct SolrSearchIndex {
    client: reqwest::Client,
    base_url: String,
}

impl SolrSearchIndex {
    /// Create a new client for the given core URL,
    /// e.g. `http://localhost:8983/solr/talks`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Encode a request as select-handler parameters.
    fn params(request: &SearchRequest) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("q", request.query.clone()),
            ("wt", "json".to_string()),
            ("rows", request.rows.to_string()),
            ("start", (request.page * request.rows).to_string()),
            ("facet", "true".to_string()),
            ("facet.mincount", request.facet_min_count.to_string()),
        ];
        for fq in &request.filter_queries {
            params.push(("fq", fq.clone()));
        }
        for field in &request.facet_fields {
            params.push(("facet.field", field.clone()));
        }
        for query in &request.facet_queries {
            params.push(("facet.query", query.clone()));
        }
        params
    }
}

#[async_trait]
impl SearchIndex for SolrSearchIndex {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResults, SearchError> {
        let response = self
            .client
            .get(format!("{}/select", self.base_url))
            .query(&Self::params(request))
            .send()
            .await
            .map_err(|e| SearchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Status {
                status: status.as_u16(),
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SearchError::InvalidResponse(e.to_string()))?;

        parse_response(&body)
    }
}

/// Decode a select-handler JSON body into results.
fn parse_response(body: &Value) -> Result<SearchResults, SearchError> {
    let response = body
        .get("response")
        .ok_or_else(|| SearchError::InvalidResponse("missing response section".to_string()))?;

    let total = response
        .get("numFound")
        .and_then(Value::as_u64)
        .unwrap_or(0);

    let hits = response
        .get("docs")
        .and_then(Value::as_array)
        .map(|docs| {
            docs.iter()
                .map(|doc| SearchHit {
                    id: field_str(doc, "id"),
                    title: field_str(doc, "title"),
                    slug: doc.get("slug").and_then(Value::as_str).map(str::to_string),
                    start: doc.get("start").and_then(Value::as_str).map(str::to_string),
                })
                .collect()
        })
        .unwrap_or_default();

    let facet_counts = body.get("facet_counts");

    let facets = FacetCounts {
        speakers: facet_field(facet_counts, "speakers"),
        location: facet_field(facet_counts, "location"),
        topics: facet_field(facet_counts, "topics"),
        date_buckets: facet_queries(facet_counts),
    };

    Ok(SearchResults {
        total,
        hits,
        facets,
    })
}

/// Some index fields are multivalued; take the first value either way.
fn field_str(doc: &Value, field: &str) -> String {
    match doc.get(field) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(values)) => values
            .first()
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        _ => String::new(),
    }
}

/// Facet fields come back as a flat array alternating value and count.
fn facet_field(facet_counts: Option<&Value>, field: &str) -> Vec<(String, u64)> {
    let Some(entries) = facet_counts
        .and_then(|fc| fc.get("facet_fields"))
        .and_then(|ff| ff.get(field))
        .and_then(Value::as_array)
    else {
        return Vec::new();
    };

    entries
        .chunks(2)
        .filter_map(|pair| match pair {
            [Value::String(value), count] => {
                count.as_u64().map(|count| (value.clone(), count))
            }
            _ => None,
        })
        .collect()
}

/// Facet query counts are keyed by the raw range query; translate each
/// key back to its bucket display name.
fn facet_queries(facet_counts: Option<&Value>) -> Vec<(String, u64)> {
    let Some(queries) = facet_counts
        .and_then(|fc| fc.get("facet_queries"))
        .and_then(Value::as_object)
    else {
        return Vec::new();
    };

    queries
        .iter()
        .filter_map(|(key, count)| {
            let range_query = key
                .strip_prefix(&format!("{START_FIELD}:"))
                .unwrap_or(key.as_str());
            let name = bucket_name_for_range_query(range_query).unwrap_or(range_query);
            count.as_u64().map(|count| (name.to_string(), count))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lectern_core::search::base_request;
    use serde_json::json;

    #[test]
    fn test_params_include_facets_and_filters() {
        let request = base_request("quantum").with_date_token("past").unwrap();
        let params = SolrSearchIndex::params(&request);

        assert!(params.contains(&("q", "quantum".to_string())));
        assert!(params.contains(&("fq", "status:published".to_string())));
        assert!(params.contains(&("fq", "start:[* TO NOW]".to_string())));
        assert!(params.contains(&("facet.mincount", "1".to_string())));
        assert_eq!(
            params.iter().filter(|(k, _)| *k == "facet.field").count(),
            3
        );
        // Every date bucket rides along as a facet query.
        assert_eq!(
            params.iter().filter(|(k, _)| *k == "facet.query").count(),
            3
        );
    }

    #[test]
    fn test_parse_response_hits_and_facets() {
        let body = json!({
            "response": {
                "numFound": 2,
                "docs": [
                    {"id": "ev-1", "title": "Quantum computing", "slug": "quantum-computing", "start": "2024-06-01T10:00:00Z"},
                    {"id": "ev-2", "title": ["Entanglement"], "slug": "entanglement"}
                ]
            },
            "facet_counts": {
                "facet_fields": {
                    "speakers": ["Ada Lovelace", 2, "Alan Turing", 1],
                    "location": ["Banbury Road", 3],
                    "topics": []
                },
                "facet_queries": {
                    "start:[NOW TO NOW/DAY+7DAY]": 1,
                    "start:[NOW/DAY+7DAY TO *]": 0,
                    "start:[* TO NOW]": 1
                }
            }
        });

        let results = parse_response(&body).unwrap();
        assert_eq!(results.total, 2);
        assert_eq!(results.hits.len(), 2);
        assert_eq!(results.hits[0].id, "ev-1");
        assert_eq!(results.hits[1].title, "Entanglement");

        assert_eq!(
            results.facets.speakers,
            [("Ada Lovelace".to_string(), 2), ("Alan Turing".to_string(), 1)]
        );
        assert!(results.facets.topics.is_empty());

        // Bucket counts are reported under their display names.
        let buckets: std::collections::HashMap<_, _> =
            results.facets.date_buckets.into_iter().collect();
        assert_eq!(buckets.get("Next 7 days"), Some(&1));
        assert_eq!(buckets.get("Future talks"), Some(&0));
        assert_eq!(buckets.get("Past talks"), Some(&1));
    }

    #[test]
    fn test_parse_response_missing_section_rejected() {
        assert!(parse_response(&json!({"error": "oops"})).is_err());
    }
}
