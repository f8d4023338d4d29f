//! Specimen portal endpoint URL builders
//!
//! The base URL always ends with `/nhash_ids/`; every builder appends its
//! suffix directly.

/// Production portal base URL
pub const DEFAULT_PORTAL_URL: &str = "https://brain-specimenportal.org/api/v1/nhash_ids/";

/// Normalize a base URL so suffixes can be appended
pub fn normalize_base_url(base_url: &str) -> String {
    if base_url.ends_with('/') {
        base_url.to_string()
    } else {
        format!("{}/", base_url)
    }
}

/// Record details for one NHash id
pub fn info_url(base_url: &str, nhash_id: &str) -> String {
    format!("{}info?id={}", base_url, urlencoding::encode(nhash_id))
}

/// Ancestor graph of an NHash id (the id itself included)
pub fn ancestors_url(base_url: &str, nhash_id: &str, nhash_only: bool) -> String {
    format!(
        "{}ancestors?id={}&nhash_only={}",
        base_url,
        urlencoding::encode(nhash_id),
        python_bool(nhash_only)
    )
}

/// Descendant graph of an NHash id
pub fn descendants_url(base_url: &str, nhash_id: &str, nhash_only: bool) -> String {
    format!(
        "{}descendants?id={}&nhash_only={}",
        base_url,
        urlencoding::encode(nhash_id),
        python_bool(nhash_only)
    )
}

/// Direct parents of an NHash id
pub fn parents_url(base_url: &str, nhash_id: &str) -> String {
    format!("{}parents?id={}", base_url, urlencoding::encode(nhash_id))
}

/// Donor search; only filters that are set become query parameters
pub fn donors_url(base_url: &str, filters: &[(&str, &str)]) -> String {
    let mut url = format!("{}donors", base_url);

    for (i, (key, value)) in filters.iter().enumerate() {
        url.push(if i == 0 { '?' } else { '&' });
        url.push_str(key);
        url.push('=');
        url.push_str(&urlencoding::encode(value));
    }

    url
}

// The portal expects Python-style booleans
fn python_bool(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(normalize_base_url("http://localhost:8000/nhash_ids"), "http://localhost:8000/nhash_ids/");
        assert_eq!(normalize_base_url(DEFAULT_PORTAL_URL), DEFAULT_PORTAL_URL);
    }

    #[test]
    fn test_info_url() {
        assert_eq!(
            info_url(DEFAULT_PORTAL_URL, "LP-CVFLMQ819998"),
            "https://brain-specimenportal.org/api/v1/nhash_ids/info?id=LP-CVFLMQ819998"
        );
    }

    #[test]
    fn test_graph_urls() {
        assert_eq!(
            ancestors_url(DEFAULT_PORTAL_URL, "LA-1", true),
            "https://brain-specimenportal.org/api/v1/nhash_ids/ancestors?id=LA-1&nhash_only=True"
        );
        assert_eq!(
            descendants_url(DEFAULT_PORTAL_URL, "DO-1", false),
            "https://brain-specimenportal.org/api/v1/nhash_ids/descendants?id=DO-1&nhash_only=False"
        );
        assert_eq!(
            parents_url(DEFAULT_PORTAL_URL, "LI-1"),
            "https://brain-specimenportal.org/api/v1/nhash_ids/parents?id=LI-1"
        );
    }

    #[test]
    fn test_donors_url() {
        assert_eq!(
            donors_url(DEFAULT_PORTAL_URL, &[]),
            "https://brain-specimenportal.org/api/v1/nhash_ids/donors"
        );
        assert_eq!(
            donors_url(DEFAULT_PORTAL_URL, &[("species", "Mus musculus"), ("sex", "2")]),
            "https://brain-specimenportal.org/api/v1/nhash_ids/donors?species=Mus%20musculus&sex=2"
        );
    }
}
