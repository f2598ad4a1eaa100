//! Typed records for every content domain.
//!
//! Records serialize as camelCase JSON, matching the layout the site has
//! always kept in local storage. Singleton records carry
//! `#[serde(default)]`, so a stored record missing a field picks up the
//! default for that field at read time while the stored JSON is left as is.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::device::Device;

/// Records that live in an id-keyed list.
pub trait Identified {
    fn id(&self) -> &str;
    fn assign_id(&mut self, id: String);
}

/// Where a newly added list entry goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Append,
    Prepend,
}

/// Inserts or replaces `item` in `items` and returns the stored copy.
///
/// An empty id is replaced by a fresh UUID and the item is added at
/// `placement`. A matching id is replaced in place. An unknown id is added.
pub fn upsert_by_id<T>(items: &mut Vec<T>, mut item: T, placement: Placement) -> T
where
    T: Identified + Clone,
{
    if item.id().is_empty() {
        item.assign_id(new_record_id());
    } else if let Some(slot) = items.iter_mut().find(|existing| existing.id() == item.id()) {
        *slot = item.clone();
        return item;
    }

    match placement {
        Placement::Append => items.push(item.clone()),
        Placement::Prepend => items.insert(0, item.clone()),
    }
    item
}

/// Removes the first entry with `id`. Returns whether one was removed.
pub fn remove_by_id<T: Identified>(items: &mut Vec<T>, id: &str) -> bool {
    match items.iter().position(|item| item.id() == id) {
        Some(index) => {
            items.remove(index);
            true
        }
        None => false,
    }
}

pub fn new_record_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

macro_rules! impl_identified {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Identified for $ty {
                fn id(&self) -> &str {
                    &self.id
                }

                fn assign_id(&mut self, id: String) {
                    self.id = id;
                }
            }
        )*
    };
}

// ---------------------------------------------------------------------------
// Singletons
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SiteContent {
    pub hero_title: String,
    pub hero_subtitle: String,
    pub hero_cta_text: String,
    pub hero_cta_link: String,
    pub hero_image: String,
    pub about_title: String,
    pub about_text: String,
    pub about_image: String,
    pub services_title: String,
    pub services_subtitle: String,
    pub gallery_title: String,
    pub gallery_subtitle: String,
    pub primary_color: String,
    pub secondary_color: String,
    pub accent_color: String,
    pub contact_info: ContactInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContactInfo {
    pub phone: String,
    pub email: String,
    pub address: String,
    pub whatsapp: String,
    pub hours: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Navigation {
    pub items: Vec<NavigationItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationItem {
    #[serde(default)]
    pub id: String,
    pub label: String,
    pub url: String,
    #[serde(default)]
    pub highlight: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FooterContent {
    pub description: String,
    pub link_groups: Vec<FooterLinkGroup>,
    pub contact_info: FooterContact,
    pub social_links: Vec<SocialLink>,
    /// Copyright line; `{year}` is substituted at render time.
    pub copyright: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FooterLinkGroup {
    pub title: String,
    pub links: Vec<FooterLink>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FooterLink {
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct FooterContact {
    pub phone: String,
    pub email: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialLink {
    pub name: String,
    pub url: String,
    /// Inline SVG markup.
    #[serde(default)]
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SliderSettings {
    pub autoplay: bool,
    pub interval_ms: u64,
    pub show_arrows: bool,
    pub show_dots: bool,
    pub pause_on_hover: bool,
}

// ---------------------------------------------------------------------------
// List entries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryItem {
    #[serde(default)]
    pub id: String,
    pub title: String,
    pub category: String,
    pub image_url: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub message: String,
    pub date: DateTime<Utc>,
    pub device: Device,
    /// Placeholder; no address is ever captured.
    #[serde(default = "placeholder_ip")]
    pub ip: String,
}

pub const PLACEHOLDER_IP: &str = "127.0.0.1";

fn placeholder_ip() -> String {
    PLACEHOLDER_IP.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageView {
    #[serde(default)]
    pub id: String,
    pub path: String,
    pub date: NaiveDate,
    /// Unix milliseconds.
    pub timestamp: i64,
    pub device: Device,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackupKind {
    Auto,
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackupStatus {
    Completed,
    Failed,
    InProgress,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupMetadata {
    pub id: String,
    pub date: DateTime<Utc>,
    /// Human-readable size, e.g. `"2.4 MB"`.
    pub size: String,
    #[serde(rename = "type")]
    pub kind: BackupKind,
    pub status: BackupStatus,
}

impl_identified!(GalleryItem, Contact, PageView, BackupMetadata);

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, title: &str) -> GalleryItem {
        GalleryItem {
            id: id.to_string(),
            title: title.to_string(),
            category: "kitchens".to_string(),
            image_url: "/img.jpg".to_string(),
            description: String::new(),
        }
    }

    #[test]
    fn test_upsert_mints_id_and_respects_placement() {
        let mut items = vec![item("a", "A")];
        let appended = upsert_by_id(&mut items, item("", "B"), Placement::Append);
        assert!(!appended.id.is_empty());
        assert_eq!(items.last().unwrap().id, appended.id);

        let prepended = upsert_by_id(&mut items, item("", "C"), Placement::Prepend);
        assert_eq!(items[0].id, prepended.id);
        assert_ne!(prepended.id, appended.id);
        assert_eq!(items.len(), 3);
    }

    #[test]
    fn test_upsert_replaces_in_place() {
        let mut items = vec![item("a", "A"), item("b", "B"), item("c", "C")];
        upsert_by_id(&mut items, item("b", "B2"), Placement::Prepend);
        assert_eq!(items.len(), 3);
        assert_eq!(items[1].title, "B2");
    }

    #[test]
    fn test_remove_by_id() {
        let mut items = vec![item("a", "A"), item("b", "B")];
        assert!(remove_by_id(&mut items, "a"));
        assert!(!remove_by_id(&mut items, "a"));
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_backup_metadata_wire_names() {
        let json = serde_json::json!({
            "id": "b1",
            "date": "2024-03-01T02:00:00Z",
            "size": "1.2 MB",
            "type": "auto",
            "status": "in-progress"
        });
        let meta: BackupMetadata = serde_json::from_value(json).unwrap();
        assert_eq!(meta.kind, BackupKind::Auto);
        assert_eq!(meta.status, BackupStatus::InProgress);
    }

    #[test]
    fn test_site_content_missing_fields_fall_back() {
        let partial: SiteContent =
            serde_json::from_str(r#"{"heroTitle":"כותרת חדשה"}"#).unwrap();
        let defaults = SiteContent::default();
        assert_eq!(partial.hero_title, "כותרת חדשה");
        assert_eq!(partial.about_title, defaults.about_title);
        assert_eq!(partial.contact_info, defaults.contact_info);
    }
}
