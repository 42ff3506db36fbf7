//! Normalized job listings produced from heterogeneous scraped rows.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::jobs::scraper::RawJobRow;

/// One job posting. Missing values are dropped from the serialized form
/// rather than stored as null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobListing {
    pub job_url: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_posted: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_remote: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_logo: Option<String>,
}

/// Projects raw rows into `JobListing`s, preserving order. Rows without a
/// url or title cannot form a listing and are skipped. No de-duplication:
/// a posting surfaced by two role searches appears twice.
pub fn normalize_rows(rows: Vec<RawJobRow>) -> Vec<JobListing> {
    let total = rows.len();
    let listings: Vec<JobListing> = rows
        .into_iter()
        .filter_map(|row| {
            let job_url = row.job_url?;
            let title = row.title?;
            Some(JobListing {
                job_url,
                title,
                company: row.company,
                location: row.location,
                date_posted: row.date_posted,
                is_remote: row.is_remote,
                company_url: row.company_url,
                company_logo: row.company_logo,
            })
        })
        .collect();
    if listings.len() < total {
        debug!(
            dropped = total - listings.len(),
            "skipped rows missing job_url or title"
        );
    }
    listings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(url: &str, title: &str) -> RawJobRow {
        RawJobRow {
            job_url: Some(url.to_string()),
            title: Some(title.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_normalize_preserves_order_and_duplicates() {
        let rows = vec![
            row("https://a.example/1", "Backend Engineer"),
            row("https://a.example/2", "Data Analyst"),
            row("https://a.example/1", "Backend Engineer"),
        ];
        let listings = normalize_rows(rows);
        assert_eq!(listings.len(), 3);
        assert_eq!(listings[0].job_url, "https://a.example/1");
        assert_eq!(listings[2].job_url, "https://a.example/1");
    }

    #[test]
    fn test_normalize_drops_rows_missing_required_fields() {
        let rows = vec![
            RawJobRow {
                title: Some("No url".to_string()),
                ..Default::default()
            },
            row("https://a.example/1", "Kept"),
            RawJobRow {
                job_url: Some("https://a.example/2".to_string()),
                ..Default::default()
            },
        ];
        let listings = normalize_rows(rows);
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].title, "Kept");
    }

    #[test]
    fn test_missing_values_are_dropped_not_null() {
        let listing = JobListing {
            job_url: "https://a.example/1".to_string(),
            title: "Backend Engineer".to_string(),
            company: Some("Acme".to_string()),
            location: None,
            date_posted: None,
            is_remote: Some(true),
            company_url: None,
            company_logo: None,
        };
        let json = serde_json::to_value(&listing).unwrap();
        let obj = json.as_object().unwrap();
        assert!(obj.contains_key("company"));
        assert!(obj.contains_key("is_remote"));
        assert!(!obj.contains_key("location"));
        assert!(!obj.contains_key("company_logo"));
    }
}
