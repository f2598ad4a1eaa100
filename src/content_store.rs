//! The content store: typed accessors over fixed storage keys.
//!
//! Every domain has a getter that returns the stored record, or the baked-in
//! default when the key is absent, and a setter that overwrites the whole
//! record. Getters never write; [`ContentStore::initialize_defaults`] is the
//! only call that materializes defaults into storage.
//!
//! There is no merge or version check. Two handles writing the same key race
//! and the last write wins.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::config::{CorruptValuePolicy, StoreConfig};
use crate::contact_form::ValidatedContact;
use crate::content_model::{
    new_record_id, remove_by_id, upsert_by_id, AdminCredentials, Contact, FooterContent,
    GalleryItem, Navigation, PageView, Placement, SiteContent, SliderSettings, PLACEHOLDER_IP,
};
use crate::defaults;
use crate::device::Device;
use crate::key_value::KeyValueStorage;
use crate::logging::LogContext;
use crate::store_error::{StoreError, StoreResult};

/// Fixed storage keys, one per domain plus the session and token keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    SiteContent,
    Navigation,
    FooterContent,
    GalleryItems,
    HomeGalleryItems,
    Contacts,
    PageViews,
    AdminCredentials,
    LoggedIn,
    LoginTime,
    BannedIps,
    SliderSettings,
    CsrfToken,
}

impl StorageKey {
    pub const ALL: [StorageKey; 13] = [
        StorageKey::SiteContent,
        StorageKey::Navigation,
        StorageKey::FooterContent,
        StorageKey::GalleryItems,
        StorageKey::HomeGalleryItems,
        StorageKey::Contacts,
        StorageKey::PageViews,
        StorageKey::AdminCredentials,
        StorageKey::LoggedIn,
        StorageKey::LoginTime,
        StorageKey::BannedIps,
        StorageKey::SliderSettings,
        StorageKey::CsrfToken,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            StorageKey::SiteContent => "siteContent",
            StorageKey::Navigation => "navigation",
            StorageKey::FooterContent => "footerContent",
            StorageKey::GalleryItems => "galleryItems",
            StorageKey::HomeGalleryItems => "homeGalleryItems",
            StorageKey::Contacts => "contacts",
            StorageKey::PageViews => "pageViews",
            StorageKey::AdminCredentials => "adminCredentials",
            StorageKey::LoggedIn => "isLoggedIn",
            StorageKey::LoginTime => "loginTime",
            StorageKey::BannedIps => "bannedIPs",
            StorageKey::SliderSettings => "sliderSettings",
            StorageKey::CsrfToken => "csrfToken",
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content domains addressable by name, as used by the FFI surface.
///
/// Credentials and session state are deliberately absent; they are only
/// reachable through [`AuthGate`](crate::auth::AuthGate).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    SiteContent,
    Navigation,
    Footer,
    Gallery,
    HomeGallery,
    Contacts,
    PageViews,
    BannedIps,
    SliderSettings,
}

impl Domain {
    pub const fn storage_key(&self) -> StorageKey {
        match self {
            Domain::SiteContent => StorageKey::SiteContent,
            Domain::Navigation => StorageKey::Navigation,
            Domain::Footer => StorageKey::FooterContent,
            Domain::Gallery => StorageKey::GalleryItems,
            Domain::HomeGallery => StorageKey::HomeGalleryItems,
            Domain::Contacts => StorageKey::Contacts,
            Domain::PageViews => StorageKey::PageViews,
            Domain::BannedIps => StorageKey::BannedIps,
            Domain::SliderSettings => StorageKey::SliderSettings,
        }
    }
}

impl FromStr for Domain {
    type Err = StoreError;

    /// Accepts the storage key name, e.g. `"galleryItems"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "siteContent" => Ok(Domain::SiteContent),
            "navigation" => Ok(Domain::Navigation),
            "footerContent" => Ok(Domain::Footer),
            "galleryItems" => Ok(Domain::Gallery),
            "homeGalleryItems" => Ok(Domain::HomeGallery),
            "contacts" => Ok(Domain::Contacts),
            "pageViews" => Ok(Domain::PageViews),
            "bannedIPs" => Ok(Domain::BannedIps),
            "sliderSettings" => Ok(Domain::SliderSettings),
            other => Err(StoreError::UnknownDomain(other.to_string())),
        }
    }
}

/// The subset of [`StoreConfig`] the store consults on every call.
#[derive(Debug, Clone)]
pub struct StoreSettings {
    pub key_namespace: Option<String>,
    pub page_view_cap: usize,
    pub corrupt_value_policy: CorruptValuePolicy,
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings::from(&StoreConfig::default())
    }
}

impl From<&StoreConfig> for StoreSettings {
    fn from(config: &StoreConfig) -> Self {
        Self {
            key_namespace: config.key_namespace.clone(),
            page_view_cap: config.page_view_cap.max(1),
            corrupt_value_policy: config.corrupt_value_policy,
        }
    }
}

pub struct ContentStore<S> {
    storage: S,
    settings: StoreSettings,
    log_ctx: LogContext,
}

impl<S: KeyValueStorage> ContentStore<S> {
    pub fn new(storage: S) -> Self {
        Self::with_settings(storage, StoreSettings::default(), "site")
    }

    pub fn with_config(storage: S, config: &StoreConfig) -> Self {
        let name = config.db_path.display().to_string();
        Self::with_settings(storage, StoreSettings::from(config), &name)
    }

    pub fn with_settings(storage: S, settings: StoreSettings, name: &str) -> Self {
        Self {
            storage,
            settings,
            log_ctx: LogContext::new(name),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn settings(&self) -> &StoreSettings {
        &self.settings
    }

    /// The physical key for `key`, including the configured namespace.
    pub fn physical_key(&self, key: StorageKey) -> String {
        match &self.settings.key_namespace {
            Some(namespace) => format!("{namespace}{}", key.as_str()),
            None => key.as_str().to_string(),
        }
    }

    // -----------------------------------------------------------------------
    // Raw typed access
    // -----------------------------------------------------------------------

    pub(crate) fn read<T: DeserializeOwned>(&self, key: StorageKey) -> StoreResult<Option<T>> {
        let physical = self.physical_key(key);
        let raw = match self.storage.get_item(&physical)? {
            Some(raw) => raw,
            None => return Ok(None),
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(source) => match self.settings.corrupt_value_policy {
                CorruptValuePolicy::Fail => {
                    log::error!(
                        "{} CORRUPT_VALUE policy=fail error={}",
                        self.log_ctx.with_domain(key.as_str()),
                        source
                    );
                    Err(StoreError::Corrupt {
                        key: physical,
                        source,
                    })
                }
                CorruptValuePolicy::FallbackToDefault => {
                    log::warn!(
                        "{} CORRUPT_VALUE policy=fallback error={}",
                        self.log_ctx.with_domain(key.as_str()),
                        source
                    );
                    Ok(None)
                }
            },
        }
    }

    fn read_or_else<T, F>(&self, key: StorageKey, default: F) -> StoreResult<T>
    where
        T: DeserializeOwned,
        F: FnOnce() -> T,
    {
        Ok(self.read(key)?.unwrap_or_else(default))
    }

    pub(crate) fn write<T: Serialize + ?Sized>(&self, key: StorageKey, value: &T) -> StoreResult<()> {
        let json = serde_json::to_string(value)?;
        self.storage.set_item(&self.physical_key(key), &json)?;
        log::info!(
            "{} DOMAIN_SAVED bytes={}",
            self.log_ctx.with_domain(key.as_str()),
            json.len()
        );
        Ok(())
    }

    pub(crate) fn remove(&self, key: StorageKey) -> StoreResult<()> {
        self.storage.remove_item(&self.physical_key(key))?;
        log::info!("{} DOMAIN_REMOVED", self.log_ctx.with_domain(key.as_str()));
        Ok(())
    }

    pub fn is_stored(&self, key: StorageKey) -> StoreResult<bool> {
        self.storage.contains_key(&self.physical_key(key))
    }

    /// Writes the default of every domain that has no stored value yet.
    ///
    /// Returns the keys that were written. Session keys and the CSRF token
    /// are never materialized here.
    pub fn initialize_defaults(&self) -> StoreResult<Vec<StorageKey>> {
        let mut written = Vec::new();
        for key in StorageKey::ALL {
            if self.is_stored(key)? {
                continue;
            }
            match key {
                StorageKey::SiteContent => self.write(key, &SiteContent::default())?,
                StorageKey::Navigation => self.write(key, &Navigation::default())?,
                StorageKey::FooterContent => self.write(key, &FooterContent::default())?,
                StorageKey::GalleryItems => self.write(key, &defaults::sample_gallery_items())?,
                StorageKey::HomeGalleryItems => {
                    self.write(key, &defaults::sample_home_gallery_items())?
                }
                StorageKey::Contacts => self.write(key, &defaults::sample_contacts())?,
                StorageKey::PageViews => self.write(key, &Vec::<PageView>::new())?,
                StorageKey::AdminCredentials => self.write(key, &AdminCredentials::default())?,
                StorageKey::BannedIps => self.write(key, &Vec::<String>::new())?,
                StorageKey::SliderSettings => self.write(key, &SliderSettings::default())?,
                StorageKey::LoggedIn | StorageKey::LoginTime | StorageKey::CsrfToken => continue,
            }
            written.push(key);
        }
        log::info!("{} DEFAULTS_INITIALIZED written={}", self.log_ctx, written.len());
        Ok(written)
    }

    // -----------------------------------------------------------------------
    // Singletons
    // -----------------------------------------------------------------------

    pub fn get_site_content(&self) -> StoreResult<SiteContent> {
        self.read_or_else(StorageKey::SiteContent, SiteContent::default)
    }

    pub fn save_site_content(&self, content: &SiteContent) -> StoreResult<()> {
        self.write(StorageKey::SiteContent, content)
    }

    pub fn get_navigation(&self) -> StoreResult<Navigation> {
        self.read_or_else(StorageKey::Navigation, Navigation::default)
    }

    pub fn save_navigation(&self, navigation: &Navigation) -> StoreResult<()> {
        self.write(StorageKey::Navigation, navigation)
    }

    pub fn get_footer_content(&self) -> StoreResult<FooterContent> {
        self.read_or_else(StorageKey::FooterContent, FooterContent::default)
    }

    pub fn save_footer_content(&self, footer: &FooterContent) -> StoreResult<()> {
        self.write(StorageKey::FooterContent, footer)
    }

    pub fn get_admin_credentials(&self) -> StoreResult<AdminCredentials> {
        self.read_or_else(StorageKey::AdminCredentials, AdminCredentials::default)
    }

    pub fn save_admin_credentials(&self, credentials: &AdminCredentials) -> StoreResult<()> {
        self.write(StorageKey::AdminCredentials, credentials)
    }

    pub fn get_slider_settings(&self) -> StoreResult<SliderSettings> {
        self.read_or_else(StorageKey::SliderSettings, SliderSettings::default)
    }

    pub fn save_slider_settings(&self, settings: &SliderSettings) -> StoreResult<()> {
        self.write(StorageKey::SliderSettings, settings)
    }

    /// Reloads slider settings into `current`.
    ///
    /// Any failure is logged and leaves `current` untouched.
    pub fn refresh_slider_settings(&self, current: &mut SliderSettings) {
        match self.read::<SliderSettings>(StorageKey::SliderSettings) {
            Ok(Some(stored)) => *current = stored,
            Ok(None) => {}
            Err(e) => log::warn!(
                "{} SLIDER_SETTINGS_LOAD_FAILED error={}",
                self.log_ctx.with_domain(StorageKey::SliderSettings.as_str()),
                e
            ),
        }
    }

    /// Returns the stored CSRF token, minting and storing one on first use.
    pub fn csrf_token(&self) -> StoreResult<String> {
        if let Some(token) = self.read::<String>(StorageKey::CsrfToken)? {
            return Ok(token);
        }
        let token = uuid::Uuid::new_v4().simple().to_string();
        self.write(StorageKey::CsrfToken, &token)?;
        Ok(token)
    }

    // -----------------------------------------------------------------------
    // Galleries
    // -----------------------------------------------------------------------

    pub fn get_gallery_items(&self) -> StoreResult<Vec<GalleryItem>> {
        self.read_or_else(StorageKey::GalleryItems, defaults::sample_gallery_items)
    }

    pub fn save_gallery_items(&self, items: &[GalleryItem]) -> StoreResult<()> {
        self.write(StorageKey::GalleryItems, items)
    }

    pub fn save_gallery_item(&self, item: GalleryItem) -> StoreResult<GalleryItem> {
        let mut items = self.get_gallery_items()?;
        let stored = upsert_by_id(&mut items, item, Placement::Append);
        self.save_gallery_items(&items)?;
        Ok(stored)
    }

    pub fn delete_gallery_item(&self, id: &str) -> StoreResult<bool> {
        let mut items = self.get_gallery_items()?;
        let removed = remove_by_id(&mut items, id);
        self.save_gallery_items(&items)?;
        Ok(removed)
    }

    pub fn get_home_gallery_items(&self) -> StoreResult<Vec<GalleryItem>> {
        self.read_or_else(StorageKey::HomeGalleryItems, defaults::sample_home_gallery_items)
    }

    pub fn save_home_gallery_items(&self, items: &[GalleryItem]) -> StoreResult<()> {
        self.write(StorageKey::HomeGalleryItems, items)
    }

    pub fn save_home_gallery_item(&self, item: GalleryItem) -> StoreResult<GalleryItem> {
        let mut items = self.get_home_gallery_items()?;
        let stored = upsert_by_id(&mut items, item, Placement::Append);
        self.save_home_gallery_items(&items)?;
        Ok(stored)
    }

    pub fn delete_home_gallery_item(&self, id: &str) -> StoreResult<bool> {
        let mut items = self.get_home_gallery_items()?;
        let removed = remove_by_id(&mut items, id);
        self.save_home_gallery_items(&items)?;
        Ok(removed)
    }

    // -----------------------------------------------------------------------
    // Contacts
    // -----------------------------------------------------------------------

    /// Contacts, newest first.
    pub fn get_contacts(&self) -> StoreResult<Vec<Contact>> {
        self.read_or_else(StorageKey::Contacts, defaults::sample_contacts)
    }

    pub fn save_contacts(&self, contacts: &[Contact]) -> StoreResult<()> {
        self.write(StorageKey::Contacts, contacts)
    }

    pub fn save_contact(&self, contact: Contact) -> StoreResult<Contact> {
        let mut contacts = self.get_contacts()?;
        let stored = upsert_by_id(&mut contacts, contact, Placement::Prepend);
        self.save_contacts(&contacts)?;
        Ok(stored)
    }

    /// Records a validated contact-form submission at the head of the list.
    pub fn add_contact(&self, submission: ValidatedContact, user_agent: &str) -> StoreResult<Contact> {
        self.add_contact_at(submission, user_agent, Utc::now())
    }

    pub fn add_contact_at(
        &self,
        submission: ValidatedContact,
        user_agent: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<Contact> {
        let contact = Contact {
            id: new_record_id(),
            name: submission.name,
            email: submission.email,
            subject: submission.subject,
            message: submission.message,
            date: now,
            device: Device::from_user_agent(user_agent),
            ip: PLACEHOLDER_IP.to_string(),
        };
        let stored = self.save_contact(contact)?;
        log::info!(
            "{} CONTACT_RECEIVED id={} device={}",
            self.log_ctx.with_domain(StorageKey::Contacts.as_str()),
            stored.id,
            stored.device.as_str()
        );
        Ok(stored)
    }

    pub fn delete_contact(&self, id: &str) -> StoreResult<bool> {
        let mut contacts = self.get_contacts()?;
        let removed = remove_by_id(&mut contacts, id);
        self.save_contacts(&contacts)?;
        Ok(removed)
    }

    // -----------------------------------------------------------------------
    // Page views
    // -----------------------------------------------------------------------

    /// Page views, newest first.
    pub fn get_page_views(&self) -> StoreResult<Vec<PageView>> {
        self.read_or_else(StorageKey::PageViews, Vec::new)
    }

    /// Overwrites the page-view list, truncated to the configured cap.
    pub fn save_page_views(&self, views: &[PageView]) -> StoreResult<()> {
        let cap = self.settings.page_view_cap.min(views.len());
        self.write(StorageKey::PageViews, &views[..cap])
    }

    pub fn save_page_view(&self, view: PageView) -> StoreResult<PageView> {
        let mut views = self.get_page_views()?;
        let stored = upsert_by_id(&mut views, view, Placement::Prepend);
        self.save_page_views(&views)?;
        Ok(stored)
    }

    pub fn delete_page_view(&self, id: &str) -> StoreResult<bool> {
        let mut views = self.get_page_views()?;
        let removed = remove_by_id(&mut views, id);
        self.save_page_views(&views)?;
        Ok(removed)
    }

    pub fn record_page_view(&self, path: &str, user_agent: &str) -> StoreResult<PageView> {
        self.record_page_view_at(path, user_agent, Utc::now())
    }

    /// Prepends a page view stamped with `now` and drops the oldest entries
    /// beyond the cap.
    pub fn record_page_view_at(
        &self,
        path: &str,
        user_agent: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<PageView> {
        let view = PageView {
            id: new_record_id(),
            path: path.to_string(),
            date: now.date_naive(),
            timestamp: now.timestamp_millis(),
            device: Device::from_user_agent(user_agent),
        };
        let mut views = self.get_page_views()?;
        views.insert(0, view.clone());
        views.truncate(self.settings.page_view_cap);
        self.write(StorageKey::PageViews, &views)?;
        log::debug!(
            "{} PAGE_VIEW_RECORDED path={} total={}",
            self.log_ctx.with_domain(StorageKey::PageViews.as_str()),
            path,
            views.len()
        );
        Ok(view)
    }

    pub fn clear_page_views(&self) -> StoreResult<()> {
        self.write(StorageKey::PageViews, &Vec::<PageView>::new())
    }

    // -----------------------------------------------------------------------
    // Banned IPs
    // -----------------------------------------------------------------------

    pub fn get_banned_ips(&self) -> StoreResult<Vec<String>> {
        self.read_or_else(StorageKey::BannedIps, Vec::new)
    }

    pub fn save_banned_ips(&self, ips: &[String]) -> StoreResult<()> {
        self.write(StorageKey::BannedIps, ips)
    }

    /// Adds `ip` to the banned list. Returns `false` if it was already there.
    pub fn ban_ip(&self, ip: &str) -> StoreResult<bool> {
        let ip = ip.trim();
        if ip.is_empty() {
            return Err(StoreError::InvalidRecord("IP address must not be empty".into()));
        }
        let mut banned = self.get_banned_ips()?;
        if banned.iter().any(|existing| existing == ip) {
            return Ok(false);
        }
        banned.push(ip.to_string());
        self.save_banned_ips(&banned)?;
        Ok(true)
    }

    /// Removes `ip` from the banned list. Returns whether it was present.
    pub fn unban_ip(&self, ip: &str) -> StoreResult<bool> {
        let mut banned = self.get_banned_ips()?;
        let before = banned.len();
        banned.retain(|existing| existing != ip.trim());
        if banned.len() == before {
            return Ok(false);
        }
        self.save_banned_ips(&banned)?;
        Ok(true)
    }

    // -----------------------------------------------------------------------
    // Name-addressed access
    // -----------------------------------------------------------------------

    pub fn get_domain_json(&self, domain: Domain) -> StoreResult<JsonValue> {
        let value = match domain {
            Domain::SiteContent => serde_json::to_value(self.get_site_content()?)?,
            Domain::Navigation => serde_json::to_value(self.get_navigation()?)?,
            Domain::Footer => serde_json::to_value(self.get_footer_content()?)?,
            Domain::Gallery => serde_json::to_value(self.get_gallery_items()?)?,
            Domain::HomeGallery => serde_json::to_value(self.get_home_gallery_items()?)?,
            Domain::Contacts => serde_json::to_value(self.get_contacts()?)?,
            Domain::PageViews => serde_json::to_value(self.get_page_views()?)?,
            Domain::BannedIps => serde_json::to_value(self.get_banned_ips()?)?,
            Domain::SliderSettings => serde_json::to_value(self.get_slider_settings()?)?,
        };
        Ok(value)
    }

    /// Validates `raw` as the domain's record and overwrites the stored value.
    pub fn save_domain_json(&self, domain: Domain, raw: &str) -> StoreResult<()> {
        match domain {
            Domain::SiteContent => self.save_site_content(&parse_record(domain, raw)?),
            Domain::Navigation => self.save_navigation(&parse_record(domain, raw)?),
            Domain::Footer => self.save_footer_content(&parse_record(domain, raw)?),
            Domain::Gallery => {
                self.save_gallery_items(&parse_record::<Vec<GalleryItem>>(domain, raw)?)
            }
            Domain::HomeGallery => {
                self.save_home_gallery_items(&parse_record::<Vec<GalleryItem>>(domain, raw)?)
            }
            Domain::Contacts => self.save_contacts(&parse_record::<Vec<Contact>>(domain, raw)?),
            Domain::PageViews => self.save_page_views(&parse_record::<Vec<PageView>>(domain, raw)?),
            Domain::BannedIps => self.save_banned_ips(&parse_record::<Vec<String>>(domain, raw)?),
            Domain::SliderSettings => self.save_slider_settings(&parse_record(domain, raw)?),
        }
    }

    /// Upserts one entry of a list domain and returns the stored entry.
    pub fn save_item_json(&self, domain: Domain, raw: &str) -> StoreResult<JsonValue> {
        let stored = match domain {
            Domain::Gallery => serde_json::to_value(self.save_gallery_item(parse_record(domain, raw)?)?)?,
            Domain::HomeGallery => {
                serde_json::to_value(self.save_home_gallery_item(parse_record(domain, raw)?)?)?
            }
            Domain::Contacts => serde_json::to_value(self.save_contact(parse_record(domain, raw)?)?)?,
            Domain::PageViews => serde_json::to_value(self.save_page_view(parse_record(domain, raw)?)?)?,
            other => return Err(not_a_list(other)),
        };
        Ok(stored)
    }

    pub fn delete_item(&self, domain: Domain, id: &str) -> StoreResult<bool> {
        match domain {
            Domain::Gallery => self.delete_gallery_item(id),
            Domain::HomeGallery => self.delete_home_gallery_item(id),
            Domain::Contacts => self.delete_contact(id),
            Domain::PageViews => self.delete_page_view(id),
            Domain::BannedIps => self.unban_ip(id),
            other => Err(not_a_list(other)),
        }
    }
}

fn parse_record<T: DeserializeOwned>(domain: Domain, raw: &str) -> StoreResult<T> {
    serde_json::from_str(raw).map_err(|e| {
        StoreError::InvalidRecord(format!("{} record rejected: {e}", domain.storage_key()))
    })
}

fn not_a_list(domain: Domain) -> StoreError {
    StoreError::InvalidRecord(format!("{} is not a list domain", domain.storage_key()))
}
