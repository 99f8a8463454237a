//! Unsplash API data transfer objects.

use serde::Deserialize;

use crate::domain::entities::ImageId;
use crate::domain::errors::PageError;

/// One record of `GET /photos/`. Only the fields we read are declared.
#[derive(Debug, Deserialize)]
pub struct PhotoRecord {
    /// Rendition URLs.
    pub urls: PhotoUrls,
}

/// Rendition URLs of a photo.
#[derive(Debug, Deserialize)]
pub struct PhotoUrls {
    /// 400px-wide rendition.
    pub small: String,
}

/// Parses a photo list body into identifiers.
///
/// Every record must carry a string `urls.small`; one bad record fails the
/// whole page.
///
/// # Errors
/// Returns `PageError::ParseError` on any structural deviation.
pub fn parse_photo_list(body: &str) -> Result<Vec<ImageId>, PageError> {
    let records: Vec<PhotoRecord> =
        serde_json::from_str(body).map_err(|e| PageError::parse(e.to_string()))?;
    Ok(records
        .into_iter()
        .map(|record| ImageId::new(record.urls.small))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_parse_preserves_order() {
        let body = r#"[
            {"id": "a", "urls": {"raw": "r1", "small": "https://img/1"}},
            {"id": "b", "urls": {"small": "https://img/2", "thumb": "t2"}},
            {"id": "c", "urls": {"small": "https://img/3"}, "likes": 4}
        ]"#;

        let ids = parse_photo_list(body).unwrap();

        assert_eq!(
            ids,
            vec![
                ImageId::new("https://img/1"),
                ImageId::new("https://img/2"),
                ImageId::new("https://img/3"),
            ]
        );
    }

    #[test]
    fn test_parse_empty_list() {
        assert!(parse_photo_list("[]").unwrap().is_empty());
    }

    #[test_case("" ; "empty_body")]
    #[test_case("{}" ; "object_not_array")]
    #[test_case(r#"[{"urls": {"small": "https://img/1"}}, {"id": "x"}]"# ; "missing_urls")]
    #[test_case(r#"[{"urls": {"regular": "https://img/1"}}]"# ; "missing_small")]
    #[test_case(r#"[{"urls": {"small": 42}}]"# ; "small_not_string")]
    #[test_case(r#"[{"urls": "https://img/1"}]"# ; "urls_not_object")]
    fn test_parse_rejects_malformed(body: &str) {
        let result = parse_photo_list(body);
        assert!(matches!(result, Err(PageError::ParseError { .. })));
    }
}
