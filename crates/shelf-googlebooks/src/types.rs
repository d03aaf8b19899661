// SPDX-FileCopyrightText: 2026 Shelf Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Google Books volumes API response types.
//!
//! Only the fields the mapper reads are modeled; everything else in the
//! payload is ignored.

use serde::Deserialize;

/// `GET /volumes?q=...`. `items` is absent when nothing matches.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeList {
    #[serde(default)]
    pub total_items: u64,
    #[serde(default)]
    pub items: Vec<Volume>,
}

/// `GET /volumes/{id}` and each entry of [`VolumeList::items`].
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Volume {
    pub id: String,
    #[serde(default)]
    pub volume_info: VolumeInfo,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeInfo {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    #[serde(default)]
    pub authors: Vec<String>,
    pub publisher: Option<String>,
    /// `YYYY`, `YYYY-MM`, or `YYYY-MM-DD`.
    pub published_date: Option<String>,
    /// May contain HTML markup.
    pub description: Option<String>,
    #[serde(default)]
    pub industry_identifiers: Vec<IndustryIdentifier>,
    pub page_count: Option<u32>,
    #[serde(default)]
    pub categories: Vec<String>,
    pub language: Option<String>,
    pub image_links: Option<ImageLinks>,
}

#[derive(Debug, Deserialize)]
pub struct IndustryIdentifier {
    /// `ISBN_13`, `ISBN_10`, or `OTHER`.
    #[serde(rename = "type")]
    pub kind: String,
    pub identifier: String,
}

/// Cover images, smallest first. Search responses usually carry only the thumbnails.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageLinks {
    pub small_thumbnail: Option<String>,
    pub thumbnail: Option<String>,
    pub small: Option<String>,
    pub medium: Option<String>,
    pub large: Option<String>,
    pub extra_large: Option<String>,
}

impl ImageLinks {
    /// Smallest available image, for result lists.
    pub fn smallest(&self) -> Option<&str> {
        [&self.small_thumbnail, &self.thumbnail, &self.small]
            .into_iter()
            .find_map(|u| u.as_deref())
    }

    /// Largest available image, for the imported asset.
    pub fn largest(&self) -> Option<&str> {
        [
            &self.extra_large,
            &self.large,
            &self.medium,
            &self.small,
            &self.thumbnail,
            &self.small_thumbnail,
        ]
        .into_iter()
        .find_map(|u| u.as_deref())
    }
}

impl VolumeInfo {
    /// ISBN-13 when present, otherwise ISBN-10.
    pub fn isbn(&self) -> Option<&str> {
        let find = |kind: &str| {
            self.industry_identifiers
                .iter()
                .find(|id| id.kind == kind)
                .map(|id| id.identifier.as_str())
        };
        find("ISBN_13").or_else(|| find("ISBN_10"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_result_has_no_items_key() {
        let list: VolumeList =
            serde_json::from_str(r#"{"kind":"books#volumes","totalItems":0}"#).unwrap();
        assert!(list.items.is_empty());
    }

    #[test]
    fn prefers_isbn13() {
        let info: VolumeInfo = serde_json::from_str(
            r#"{"industryIdentifiers":[
                {"type":"ISBN_10","identifier":"0441013597"},
                {"type":"ISBN_13","identifier":"9780441013593"}]}"#,
        )
        .unwrap();
        assert_eq!(info.isbn(), Some("9780441013593"));
    }

    #[test]
    fn image_size_preference() {
        let links = ImageLinks {
            thumbnail: Some("t".into()),
            medium: Some("m".into()),
            ..Default::default()
        };
        assert_eq!(links.largest(), Some("m"));
        assert_eq!(links.smallest(), Some("t"));
    }
}
