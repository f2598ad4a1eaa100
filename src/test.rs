//! # Test Suite for Studio Site Core
//!
//! ## Test Categories
//!
//! ### 1. Content Store Contract
//! - Every getter answers on empty storage with its default, without writing
//! - `save` followed by `get` returns an equal record
//! - Explicit `initialize_defaults` materializes absent domains only
//!
//! ### 2. List Domains
//! - Id minting, in-place replacement, deletion, newest-first ordering
//! - Page-view cap
//!
//! ### 3. Failure Semantics
//! - Corrupt values under both policies, quota errors, slider-settings swallowing
//!
//! ### 4. Auth Gate and Routes
//!
//! ### 5. Contact Form
//!
//! ### 6. Simulated Analytics and Backups
//!
//! ### 7. LMDB Backend
//!
//! ### 8. FFI Functions
//!
//! ## Running the Tests
//!
//! ```bash
//! cargo test
//! cargo test test_ffi_        # FFI tests
//! cargo test test_lmdb_       # LMDB backend tests
//! ```

#[cfg(test)]
pub mod tests {
    use std::sync::Arc;

    use chrono::{Duration, NaiveDate, TimeZone, Utc};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    use crate::analytics::{summarize_traffic, OnlineUsersTracker};
    use crate::auth::AuthGate;
    use crate::backup::{BackupService, RestoreOutcome, SimulatedBackupService};
    use crate::config::{AnalyticsConfig, BackupConfig, CorruptValuePolicy, StoreConfig};
    use crate::contact_form::{ContactField, ContactSubmission};
    use crate::content_model::{
        AdminCredentials, BackupKind, BackupStatus, FooterContent, GalleryItem, Navigation,
        NavigationItem, PageView, SiteContent, SliderSettings,
    };
    use crate::content_store::{ContentStore, Domain, StorageKey, StoreSettings};
    use crate::defaults::{sample_contacts, sample_gallery_items, sample_home_gallery_items};
    use crate::device::Device;
    use crate::key_value::{KeyValueStorage, MemoryStorage};
    use crate::local_db_state::AppDbState;
    use crate::routes::{Route, RouteDecision};
    use crate::store_error::StoreError;
    use crate::text::replace_year_placeholder_with;

    const DESKTOP_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) Chrome/120.0 Safari/537.36";
    const MOBILE_UA: &str =
        "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 Mobile/15E148";

    fn memory_store() -> ContentStore<MemoryStorage> {
        ContentStore::new(MemoryStorage::new())
    }

    fn store_with(settings: StoreSettings) -> ContentStore<MemoryStorage> {
        ContentStore::with_settings(MemoryStorage::new(), settings, "test")
    }

    fn new_gallery_item(title: &str) -> GalleryItem {
        GalleryItem {
            id: String::new(),
            title: title.to_string(),
            category: "מטבחים".to_string(),
            image_url: format!("/images/{title}.jpg"),
            description: String::new(),
        }
    }

    fn valid_submission() -> ContactSubmission {
        ContactSubmission {
            name: "  רותם ברק ".to_string(),
            email: "rotem@example.com".to_string(),
            subject: Some("שיפוץ סלון".to_string()),
            message: "אשמח לשמוע פרטים על ליווי בשיפוץ הסלון.".to_string(),
            consent: true,
        }
    }

    // ===============================
    // 1. CONTENT STORE CONTRACT
    // ===============================

    #[test]
    fn test_getters_return_defaults_on_empty_storage() {
        let store = memory_store();

        assert_eq!(store.get_site_content().unwrap(), SiteContent::default());
        assert_eq!(store.get_navigation().unwrap(), Navigation::default());
        assert_eq!(store.get_footer_content().unwrap(), FooterContent::default());
        assert_eq!(store.get_gallery_items().unwrap(), sample_gallery_items());
        assert_eq!(store.get_home_gallery_items().unwrap(), sample_home_gallery_items());
        assert_eq!(store.get_contacts().unwrap(), sample_contacts());
        assert!(store.get_page_views().unwrap().is_empty());
        assert_eq!(store.get_admin_credentials().unwrap(), AdminCredentials::default());
        assert!(store.get_banned_ips().unwrap().is_empty());
        assert_eq!(store.get_slider_settings().unwrap(), SliderSettings::default());

        // Reading never materializes anything.
        assert!(store.storage().is_empty());
    }

    #[test]
    fn test_default_values_are_usable() {
        let store = memory_store();
        assert!(!store.get_site_content().unwrap().hero_title.is_empty());
        assert!(store.get_footer_content().unwrap().copyright.contains("{year}"));
        assert!(!store.get_gallery_items().unwrap().is_empty());
        let credentials = store.get_admin_credentials().unwrap();
        assert_eq!(credentials.username, "admin");
        assert_eq!(credentials.password, "admin123");
    }

    #[test]
    fn test_singletons_round_trip() {
        let store = memory_store();

        let mut content = SiteContent::default();
        content.hero_title = "כותרת מעודכנת".to_string();
        content.contact_info.phone = "03-7654321".to_string();
        store.save_site_content(&content).unwrap();
        assert_eq!(store.get_site_content().unwrap(), content);

        let navigation = Navigation {
            items: vec![NavigationItem {
                id: "n1".to_string(),
                label: "בלוג".to_string(),
                url: "/blog".to_string(),
                highlight: true,
            }],
        };
        store.save_navigation(&navigation).unwrap();
        assert_eq!(store.get_navigation().unwrap(), navigation);

        let mut footer = FooterContent::default();
        footer.social_links.clear();
        footer.copyright = "© {year} אחר".to_string();
        store.save_footer_content(&footer).unwrap();
        assert_eq!(store.get_footer_content().unwrap(), footer);

        let slider = SliderSettings {
            autoplay: false,
            interval_ms: 8000,
            show_arrows: false,
            show_dots: true,
            pause_on_hover: false,
        };
        store.save_slider_settings(&slider).unwrap();
        assert_eq!(store.get_slider_settings().unwrap(), slider);
    }

    #[test]
    fn test_collections_round_trip() {
        let store = memory_store();

        let items = vec![GalleryItem {
            id: "only".to_string(),
            ..new_gallery_item("יחיד")
        }];
        store.save_gallery_items(&items).unwrap();
        assert_eq!(store.get_gallery_items().unwrap(), items);

        store.save_home_gallery_items(&[]).unwrap();
        assert!(store.get_home_gallery_items().unwrap().is_empty());

        let contacts = sample_contacts()[..1].to_vec();
        store.save_contacts(&contacts).unwrap();
        assert_eq!(store.get_contacts().unwrap(), contacts);

        let ips = vec!["10.0.0.1".to_string()];
        store.save_banned_ips(&ips).unwrap();
        assert_eq!(store.get_banned_ips().unwrap(), ips);
    }

    #[test]
    fn test_saving_empty_collection_is_not_default() {
        let store = memory_store();
        store.save_gallery_items(&[]).unwrap();
        assert!(store.get_gallery_items().unwrap().is_empty());
    }

    #[test]
    fn test_last_write_wins_across_handles() {
        let storage = Arc::new(MemoryStorage::new());
        let tab_a = ContentStore::new(Arc::clone(&storage));
        let tab_b = ContentStore::new(Arc::clone(&storage));

        let mut from_a = SiteContent::default();
        from_a.hero_title = "A".to_string();
        let mut from_b = SiteContent::default();
        from_b.hero_title = "B".to_string();

        tab_a.save_site_content(&from_a).unwrap();
        tab_b.save_site_content(&from_b).unwrap();
        assert_eq!(tab_a.get_site_content().unwrap().hero_title, "B");
    }

    #[test]
    fn test_partial_site_content_fills_missing_fields_at_read_time() {
        let store = memory_store();
        store
            .storage()
            .set_item("siteContent", r#"{"heroTitle":"רק כותרת"}"#)
            .unwrap();

        let content = store.get_site_content().unwrap();
        assert_eq!(content.hero_title, "רק כותרת");
        assert_eq!(content.about_title, SiteContent::default().about_title);
        // The stored JSON is left untouched.
        assert_eq!(
            store.storage().get_item("siteContent").unwrap().as_deref(),
            Some(r#"{"heroTitle":"רק כותרת"}"#)
        );
    }

    #[test]
    fn test_initialize_defaults_writes_only_absent_domains() {
        let store = memory_store();
        let mut content = SiteContent::default();
        content.hero_title = "שמור".to_string();
        store.save_site_content(&content).unwrap();

        let written = store.initialize_defaults().unwrap();
        assert!(!written.contains(&StorageKey::SiteContent));
        assert!(written.contains(&StorageKey::GalleryItems));
        assert!(written.contains(&StorageKey::AdminCredentials));
        assert!(!written.contains(&StorageKey::LoggedIn));
        assert!(!written.contains(&StorageKey::CsrfToken));
        assert_eq!(store.get_site_content().unwrap().hero_title, "שמור");

        assert!(store.initialize_defaults().unwrap().is_empty());
    }

    #[test]
    fn test_key_namespace_prefixes_physical_keys() {
        let config = StoreConfig {
            key_namespace: Some("studio:".to_string()),
            ..StoreConfig::default()
        };
        let store = ContentStore::with_config(MemoryStorage::new(), &config);
        store.save_gallery_items(&[]).unwrap();

        assert_eq!(store.physical_key(StorageKey::GalleryItems), "studio:galleryItems");
        assert!(store.storage().get_item("studio:galleryItems").unwrap().is_some());
        assert!(store.storage().get_item("galleryItems").unwrap().is_none());
    }

    #[test]
    fn test_csrf_token_is_minted_once() {
        let store = memory_store();
        let first = store.csrf_token().unwrap();
        let second = store.csrf_token().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 32);
    }

    #[test]
    fn test_banned_ip_edits() {
        let store = memory_store();
        assert!(store.ban_ip(" 10.0.0.7 ").unwrap());
        assert!(!store.ban_ip("10.0.0.7").unwrap());
        assert_eq!(store.get_banned_ips().unwrap(), vec!["10.0.0.7".to_string()]);
        assert!(matches!(store.ban_ip("  "), Err(StoreError::InvalidRecord(_))));

        assert!(store.unban_ip("10.0.0.7").unwrap());
        assert!(!store.unban_ip("10.0.0.7").unwrap());
        assert!(store.get_banned_ips().unwrap().is_empty());
    }

    #[test]
    fn test_domain_json_access() {
        let store = memory_store();
        let domain: Domain = "homeGalleryItems".parse().unwrap();
        assert_eq!(domain, Domain::HomeGallery);
        assert!(matches!("adminCredentials".parse::<Domain>(), Err(StoreError::UnknownDomain(_))));

        let value = store.get_domain_json(Domain::Navigation).unwrap();
        assert!(value["items"].is_array());

        store
            .save_domain_json(Domain::BannedIps, r#"["1.1.1.1","2.2.2.2"]"#)
            .unwrap();
        assert_eq!(store.get_banned_ips().unwrap().len(), 2);

        // Shape mismatch is rejected before anything is written.
        let err = store
            .save_domain_json(Domain::Navigation, r#"{"items":"nope"}"#)
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidRecord(_)));
        assert!(store.storage().get_item("navigation").unwrap().is_none());

        let stored = store
            .save_item_json(
                Domain::Gallery,
                r#"{"title":"חדש","category":"סלונים","imageUrl":"/x.jpg"}"#,
            )
            .unwrap();
        let id = stored["id"].as_str().unwrap().to_string();
        assert!(!id.is_empty());
        assert!(store.delete_item(Domain::Gallery, &id).unwrap());

        assert!(matches!(
            store.save_item_json(Domain::SiteContent, "{}"),
            Err(StoreError::InvalidRecord(_))
        ));
    }

    // ===============================
    // 2. LIST DOMAINS
    // ===============================

    #[test]
    fn test_save_item_without_id_adds_exactly_one_entry() {
        let store = memory_store();
        let before = store.get_gallery_items().unwrap();

        let saved = store.save_gallery_item(new_gallery_item("חדש")).unwrap();
        assert!(!saved.id.is_empty());
        assert!(before.iter().all(|item| item.id != saved.id));

        let after = store.get_gallery_items().unwrap();
        assert_eq!(after.len(), before.len() + 1);
        assert_eq!(after.iter().filter(|item| item.id == saved.id).count(), 1);
        assert_eq!(after.last().unwrap(), &saved);
    }

    #[test]
    fn test_save_item_with_existing_id_replaces_in_place() {
        let store = memory_store();
        let before = store.get_gallery_items().unwrap();
        let target = before[2].clone();

        let mut edited = target.clone();
        edited.title = "כותרת ערוכה".to_string();
        store.save_gallery_item(edited.clone()).unwrap();

        let after = store.get_gallery_items().unwrap();
        assert_eq!(after.len(), before.len());
        assert_eq!(after[2], edited);
        assert_eq!(after.iter().filter(|item| item.id == target.id).count(), 1);
    }

    #[test]
    fn test_save_item_with_unknown_id_is_added() {
        let store = memory_store();
        let before = store.get_home_gallery_items().unwrap().len();
        let item = GalleryItem {
            id: "imported-1".to_string(),
            ..new_gallery_item("מיובא")
        };
        let saved = store.save_home_gallery_item(item).unwrap();
        assert_eq!(saved.id, "imported-1");
        assert_eq!(store.get_home_gallery_items().unwrap().len(), before + 1);
    }

    #[test]
    fn test_unknown_id_placement_follows_list_order() {
        let store = memory_store();

        let gallery = store
            .save_gallery_item(GalleryItem {
                id: "external-g".to_string(),
                ..new_gallery_item("חיצוני")
            })
            .unwrap();
        assert_eq!(store.get_gallery_items().unwrap().last().unwrap(), &gallery);

        let mut contact = sample_contacts()[0].clone();
        contact.id = "external-c".to_string();
        store.save_contact(contact).unwrap();
        let contacts = store.get_contacts().unwrap();
        assert_eq!(contacts.len(), sample_contacts().len() + 1);
        assert_eq!(contacts[0].id, "external-c");
    }

    #[test]
    fn test_delete_item_removes_one_or_nothing() {
        let store = memory_store();
        let before = store.get_gallery_items().unwrap();

        assert!(!store.delete_gallery_item("missing").unwrap());
        assert_eq!(store.get_gallery_items().unwrap(), before);

        assert!(store.delete_gallery_item(&before[0].id).unwrap());
        let after = store.get_gallery_items().unwrap();
        assert_eq!(after.len(), before.len() - 1);
        assert_eq!(after, before[1..].to_vec());
    }

    #[test]
    fn test_galleries_are_independent() {
        let store = memory_store();
        store.save_gallery_items(&[]).unwrap();
        assert_eq!(store.get_home_gallery_items().unwrap(), sample_home_gallery_items());
    }

    #[test]
    fn test_contacts_are_newest_first() {
        let store = memory_store();
        store.save_contacts(&[]).unwrap();

        let t0 = Utc.with_ymd_and_hms(2025, 5, 1, 9, 0, 0).unwrap();
        let first = store
            .add_contact_at(valid_submission().validate().unwrap(), DESKTOP_UA, t0)
            .unwrap();
        let second = store
            .add_contact_at(
                valid_submission().validate().unwrap(),
                MOBILE_UA,
                t0 + Duration::minutes(5),
            )
            .unwrap();

        let contacts = store.get_contacts().unwrap();
        assert_eq!(contacts.len(), 2);
        assert_eq!(contacts[0].id, second.id);
        assert_eq!(contacts[1].id, first.id);
        assert_eq!(contacts[0].device, Device::Mobile);
        assert_eq!(contacts[1].device, Device::Desktop);
        assert_eq!(contacts[1].name, "רותם ברק");
        assert_eq!(contacts[1].date, t0);

        assert!(store.delete_contact(&first.id).unwrap());
        assert_eq!(store.get_contacts().unwrap().len(), 1);
    }

    #[test]
    fn test_record_page_view_fields() {
        let store = memory_store();
        let now = Utc.with_ymd_and_hms(2025, 3, 9, 14, 15, 0).unwrap();
        let view = store.record_page_view_at("/gallery", MOBILE_UA, now).unwrap();

        assert_eq!(view.path, "/gallery");
        assert_eq!(view.date, NaiveDate::from_ymd_opt(2025, 3, 9).unwrap());
        assert_eq!(view.timestamp, now.timestamp_millis());
        assert_eq!(view.device, Device::Mobile);
        assert_eq!(store.get_page_views().unwrap(), vec![view]);
    }

    #[test]
    fn test_page_views_capped_at_500() {
        let store = memory_store();
        for i in 0..501 {
            store.record_page_view(&format!("/p{i}"), DESKTOP_UA).unwrap();
        }

        let views = store.get_page_views().unwrap();
        assert_eq!(views.len(), 500);
        assert_eq!(views[0].path, "/p500");
        assert_eq!(views[499].path, "/p1");
        assert!(views.iter().all(|v| v.path != "/p0"));
    }

    #[test]
    fn test_page_view_cap_is_configurable() {
        let store = store_with(StoreSettings {
            page_view_cap: 3,
            ..StoreSettings::default()
        });
        for i in 0..5 {
            store.record_page_view(&format!("/{i}"), DESKTOP_UA).unwrap();
        }
        let paths: Vec<String> = store.get_page_views().unwrap().into_iter().map(|v| v.path).collect();
        assert_eq!(paths, vec!["/4", "/3", "/2"]);

        store.clear_page_views().unwrap();
        assert!(store.get_page_views().unwrap().is_empty());
    }

    // ===============================
    // 3. FAILURE SEMANTICS
    // ===============================

    #[test]
    fn test_corrupt_value_fails_by_default() {
        let store = memory_store();
        store.storage().set_item("galleryItems", "{not json").unwrap();

        match store.get_gallery_items() {
            Err(StoreError::Corrupt { key, .. }) => assert_eq!(key, "galleryItems"),
            other => panic!("expected corrupt error, got {other:?}"),
        }
        // Writers that read first propagate the same error.
        assert!(store.save_gallery_item(new_gallery_item("x")).is_err());
    }

    #[test]
    fn test_corrupt_value_fallback_policy() {
        let store = store_with(StoreSettings {
            corrupt_value_policy: CorruptValuePolicy::FallbackToDefault,
            ..StoreSettings::default()
        });
        store.storage().set_item("navigation", "[1,2,3]").unwrap();
        assert_eq!(store.get_navigation().unwrap(), Navigation::default());
    }

    #[test]
    fn test_quota_errors_propagate() {
        let store = ContentStore::new(MemoryStorage::with_quota(64));
        let err = store.save_site_content(&SiteContent::default()).unwrap_err();
        assert!(matches!(err, StoreError::QuotaExceeded { .. }));
        assert!(store.storage().is_empty());
    }

    #[test]
    fn test_slider_settings_refresh_swallows_errors() {
        let store = memory_store();
        let mut current = SliderSettings {
            interval_ms: 1234,
            ..SliderSettings::default()
        };

        store.storage().set_item("sliderSettings", "oops").unwrap();
        store.refresh_slider_settings(&mut current);
        assert_eq!(current.interval_ms, 1234);

        let saved = SliderSettings {
            interval_ms: 9000,
            ..SliderSettings::default()
        };
        store.save_slider_settings(&saved).unwrap();
        store.refresh_slider_settings(&mut current);
        assert_eq!(current, saved);
    }

    // ===============================
    // 4. AUTH GATE AND ROUTES
    // ===============================

    #[test]
    fn test_login_with_default_credentials() {
        let store = memory_store();
        let auth = AuthGate::new(&store);

        assert!(!auth.is_logged_in().unwrap());
        assert!(auth.login("admin", "admin123").unwrap());
        assert!(auth.is_logged_in().unwrap());
        assert!(auth.login_time().unwrap().is_some());
    }

    #[test]
    fn test_login_rejects_other_pairs() {
        for (user, pass) in [("admin", "wrong"), ("root", "admin123"), ("", ""), ("Admin", "admin123")] {
            let store = memory_store();
            let auth = AuthGate::new(&store);
            assert!(!auth.login(user, pass).unwrap());
            assert!(!auth.is_logged_in().unwrap());
            assert!(store.storage().is_empty());
        }
    }

    #[test]
    fn test_logout_clears_session() {
        let store = memory_store();
        let auth = AuthGate::new(&store);
        let now = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        auth.login_at("admin", "admin123", now).unwrap();
        assert_eq!(auth.login_time().unwrap(), Some(now));

        auth.logout().unwrap();
        assert!(!auth.is_logged_in().unwrap());
        assert!(auth.login_time().unwrap().is_none());
        assert!(!store.is_stored(StorageKey::LoginTime).unwrap());
    }

    #[test]
    fn test_change_credentials() {
        let store = memory_store();
        let auth = AuthGate::new(&store);
        let new_credentials = AdminCredentials {
            username: "studio".to_string(),
            password: "s3cret".to_string(),
        };

        assert!(!auth.change_credentials("bad", new_credentials.clone()).unwrap());
        assert!(auth.change_credentials("admin123", new_credentials).unwrap());
        assert!(!auth.login("admin", "admin123").unwrap());
        assert!(auth.login("studio", "s3cret").unwrap());

        let empty = AdminCredentials {
            username: " ".to_string(),
            password: "x".to_string(),
        };
        assert!(auth.change_credentials("s3cret", empty).is_err());
    }

    #[test]
    fn test_route_guard() {
        let store = memory_store();
        let auth = AuthGate::new(&store);

        assert_eq!(auth.guard(&Route::Home).unwrap(), RouteDecision::Allow);
        assert_eq!(auth.guard(&Route::Admin).unwrap(), RouteDecision::Allow);
        assert_eq!(
            auth.guard(&Route::parse("/admin/contacts")).unwrap(),
            RouteDecision::Redirect(Route::Admin)
        );

        auth.login("admin", "admin123").unwrap();
        assert_eq!(auth.guard(&Route::AdminBackups).unwrap(), RouteDecision::Allow);
    }

    #[test]
    fn test_tampered_session_flag_is_honoured() {
        let store = memory_store();
        store.storage().set_item("isLoggedIn", "true").unwrap();
        assert!(AuthGate::new(&store).is_logged_in().unwrap());
    }

    #[test]
    fn test_replace_year_placeholder_in_footer() {
        let footer = FooterContent::default();
        let rendered = replace_year_placeholder_with(&footer.copyright, 2026);
        assert!(rendered.starts_with("© 2026 "));
        assert!(!rendered.contains("{year}"));
    }

    // ===============================
    // 5. CONTACT FORM
    // ===============================

    #[test]
    fn test_valid_submission_is_trimmed() {
        let validated = valid_submission().validate().unwrap();
        assert_eq!(validated.name(), "רותם ברק");
        assert_eq!(validated.subject(), Some("שיפוץ סלון"));
    }

    #[test]
    fn test_invalid_submission_reports_every_field() {
        let submission = ContactSubmission {
            name: "א".to_string(),
            email: "not-an-email".to_string(),
            subject: Some("x".repeat(201)),
            message: "קצר".to_string(),
            consent: false,
        };
        let errors = submission.validate().unwrap_err();
        for field in [
            ContactField::Name,
            ContactField::Email,
            ContactField::Subject,
            ContactField::Message,
            ContactField::Consent,
        ] {
            assert!(errors.has_error(field), "missing error for {field:?}");
        }
        assert!(errors.message_for(ContactField::Email).is_some());
    }

    #[test]
    fn test_blank_subject_is_dropped_and_markup_rejected() {
        let mut submission = valid_submission();
        submission.subject = Some("   ".to_string());
        assert_eq!(submission.validate().unwrap().subject(), None);

        submission.message = "שלום <script>alert(1)</script> עולם".to_string();
        let errors = submission.validate().unwrap_err();
        assert!(errors.has_error(ContactField::Message));
        assert_eq!(errors.0.len(), 1);
    }

    #[test]
    fn test_plain_equals_sign_is_not_markup() {
        let mut submission = valid_submission();
        submission.message = "We need one = two rooms redone, please call".to_string();
        submission.subject = Some("online = fine".to_string());
        assert!(submission.validate().is_ok());

        submission.message = "שלום <img src=x onerror=alert(1)> עולם".to_string();
        let errors = submission.validate().unwrap_err();
        assert!(errors.has_error(ContactField::Message));
        assert!(!errors.has_error(ContactField::Subject));
    }

    // ===============================
    // 6. SIMULATED ANALYTICS AND BACKUPS
    // ===============================

    fn sample_views(count: usize, now: chrono::DateTime<Utc>) -> Vec<PageView> {
        let store = memory_store();
        for i in 0..count {
            store
                .record_page_view_at(&format!("/p{}", i % 3), DESKTOP_UA, now - Duration::hours(i as i64))
                .unwrap();
        }
        store.get_page_views().unwrap()
    }

    #[test]
    fn test_online_users_sampling_bounds() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let views = sample_views(20, now);
        let mut rng = StdRng::seed_from_u64(7);

        let mut everyone = OnlineUsersTracker::new(&AnalyticsConfig {
            inclusion_probability: 1.0,
            ..AnalyticsConfig::default()
        });
        assert_eq!(everyone.refresh(&views, &[], now, &mut rng).len(), 20);
        assert!(everyone.users().iter().all(|u| u.last_seen == now));

        let mut nobody = OnlineUsersTracker::new(&AnalyticsConfig {
            inclusion_probability: 0.0,
            ..AnalyticsConfig::default()
        });
        assert!(nobody.refresh(&views, &[], now, &mut rng).is_empty());

        let mut sampled = OnlineUsersTracker::new(&AnalyticsConfig::default());
        let users = sampled.refresh(&views, &[], now, &mut rng);
        assert!(users.len() <= views.len());
        assert!(users.iter().all(|u| views.iter().any(|v| v.id == u.id)));
    }

    #[test]
    fn test_online_users_respect_window_interval_and_bans() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let views = sample_views(10, now);
        let config = AnalyticsConfig {
            inclusion_probability: 1.0,
            sample_window: 4,
            ..AnalyticsConfig::default()
        };

        let mut tracker = OnlineUsersTracker::new(&config);
        let first: Vec<String> = tracker
            .refresh(&views, &[], now, &mut StdRng::seed_from_u64(1))
            .iter()
            .map(|u| u.ip.clone())
            .collect();
        assert_eq!(first.len(), 4);

        assert!(!tracker.refresh_if_due(&views, &[], now + Duration::seconds(10), &mut StdRng::seed_from_u64(1)));
        assert!(tracker.refresh_if_due(
            &views,
            &[first[0].clone()],
            now + Duration::seconds(30),
            &mut StdRng::seed_from_u64(1)
        ));
        assert!(tracker.users().iter().all(|u| u.ip != first[0]));
        assert_eq!(tracker.last_refresh(), Some(now + Duration::seconds(30)));
    }

    #[test]
    fn test_traffic_summary() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
        let make = |path: &str, date: NaiveDate, device| PageView {
            id: String::new(),
            path: path.to_string(),
            date,
            timestamp: 0,
            device,
        };
        let views = vec![
            make("/", today, Device::Mobile),
            make("/", today, Device::Desktop),
            make("/gallery", today.pred_opt().unwrap(), Device::Tablet),
            make("/contact", today - Duration::days(30), Device::Desktop),
        ];

        let summary = summarize_traffic(&views, 7, today);
        assert_eq!(summary.total_views, 4);
        assert_eq!(summary.views_by_day.len(), 7);
        assert_eq!(summary.views_by_day.last().unwrap().date, today);
        assert_eq!(summary.views_by_day.last().unwrap().count, 2);
        assert_eq!(summary.views_by_day[5].count, 1);
        assert_eq!(summary.views_by_day[0].count, 0);
        assert_eq!(summary.devices.desktop, 2);
        assert_eq!(summary.devices.mobile, 1);
        assert_eq!(summary.devices.tablet, 1);
        assert_eq!(summary.top_pages[0].path, "/");
        assert_eq!(summary.top_pages[0].count, 2);
        assert_eq!(summary.top_pages[1].path, "/contact");
    }

    fn backup_service() -> SimulatedBackupService<MemoryStorage> {
        SimulatedBackupService::new(Arc::new(memory_store()), &BackupConfig { delay_ms: 0 })
    }

    #[tokio::test]
    async fn test_backup_list_is_seeded() {
        let service = backup_service();
        let entries = service.list().await.unwrap();
        assert_eq!(entries.len(), 4);
        assert!(entries.windows(2).all(|w| w[0].date >= w[1].date));
        assert!(entries.iter().any(|e| e.status == BackupStatus::Failed));
    }

    #[tokio::test]
    async fn test_backup_create_prepends_manual_entry() {
        let service = backup_service();
        let created = service.create().await.unwrap();
        assert_eq!(created.kind, BackupKind::Manual);
        assert_eq!(created.status, BackupStatus::Completed);

        let entries = service.list().await.unwrap();
        assert_eq!(entries.len(), 5);
        assert_eq!(entries[0], created);
    }

    #[tokio::test]
    async fn test_backup_restore_always_succeeds() {
        let service = backup_service();
        assert_eq!(service.restore("anything").await.unwrap(), RestoreOutcome::Restored);
    }

    #[tokio::test]
    async fn test_backup_download_exports_contacts() {
        let store = Arc::new(memory_store());
        store.save_contacts(&sample_contacts()[..1]).unwrap();
        let service = SimulatedBackupService::new(Arc::clone(&store), &BackupConfig { delay_ms: 0 });

        let export = service.download("latest").await.unwrap();
        assert!(export.file_name.starts_with("contacts-backup-"));
        assert!(export.file_name.ends_with(".json"));
        assert_eq!(export.content_type, "application/json");
        let parsed: serde_json::Value = serde_json::from_str(&export.body).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_backup_service_behind_trait_object() {
        let service: Box<dyn BackupService> = Box::new(backup_service());
        assert_eq!(service.list().await.unwrap().len(), 4);
    }

    // ===============================
    // 7. LMDB BACKEND
    // ===============================

    fn lmdb_name(dir: &tempfile::TempDir, name: &str) -> String {
        dir.path().join(name).to_string_lossy().into_owned()
    }

    #[test]
    fn test_lmdb_basic_operations() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppDbState::init(lmdb_name(&dir, "basic")).unwrap();

        assert!(state.get_item("missing").unwrap().is_none());
        state.set_item("b", "2").unwrap();
        state.set_item("a", "1").unwrap();
        state.set_item("a", "uno").unwrap();
        assert_eq!(state.get_item("a").unwrap().as_deref(), Some("uno"));
        assert_eq!(state.keys().unwrap(), vec!["a".to_string(), "b".to_string()]);

        state.remove_item("a").unwrap();
        state.remove_item("a").unwrap();
        assert!(!state.contains_key("a").unwrap());
        assert_eq!(state.clear_all_records().unwrap(), 1);
        assert!(state.keys().unwrap().is_empty());
    }

    #[test]
    fn test_lmdb_content_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let name = lmdb_name(&dir, "persist");

        {
            let store = ContentStore::new(AppDbState::init(name.clone()).unwrap());
            store.save_gallery_item(new_gallery_item("נשמר")).unwrap();
            AuthGate::new(&store).login("admin", "admin123").unwrap();
        }

        let store = ContentStore::new(AppDbState::init(name).unwrap());
        assert!(store.get_gallery_items().unwrap().iter().any(|i| i.title == "נשמר"));
        assert!(AuthGate::new(&store).is_logged_in().unwrap());
    }

    #[test]
    fn test_lmdb_reset_database() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppDbState::init(lmdb_name(&dir, "before")).unwrap();
        state.set_item("k", "v").unwrap();
        let old_path = state.path().to_path_buf();

        state.reset_database(&lmdb_name(&dir, "after")).unwrap();
        assert!(state.get_item("k").unwrap().is_none());
        assert!(!old_path.exists());
        state.set_item("k", "fresh").unwrap();

        let same = lmdb_name(&dir, "after");
        state.reset_database(&same).unwrap();
        assert!(state.keys().unwrap().is_empty());
        state.close_database().unwrap();
    }

    #[test]
    fn test_lmdb_opens_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig {
            db_path: dir.path().join("configured"),
            ..StoreConfig::default()
        };
        let store = ContentStore::with_config(AppDbState::from_config(&config).unwrap(), &config);
        assert!(store.storage().path().ends_with("configured.lmdb"));
        store.save_banned_ips(&["10.1.1.1".to_string()]).unwrap();
        assert_eq!(store.get_banned_ips().unwrap().len(), 1);
    }

    #[test]
    fn test_lmdb_map_full_is_quota_error() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppDbState::init_with_map_size(lmdb_name(&dir, "tiny"), 64 * 1024).unwrap();
        let big = "x".repeat(256 * 1024);
        assert!(matches!(
            state.set_item("big", &big),
            Err(StoreError::QuotaExceeded { .. })
        ));
    }

    // ===============================
    // 8. FFI FUNCTIONS
    // ===============================

    mod ffi {
        use std::ffi::{CStr, CString};
        use std::os::raw::c_char;

        use crate::app_response::AppResponse;
        use crate::{
            close_store, create_store, delete_item, free_response, get_domain, initialize_defaults,
            is_logged_in, login, logout, record_page_view, save_domain, save_item, submit_contact,
            LocalContentStore,
        };

        fn take(ptr: *const c_char) -> AppResponse {
            assert!(!ptr.is_null(), "response should not be null");
            let json = unsafe { CStr::from_ptr(ptr) }.to_str().unwrap().to_string();
            free_response(ptr);
            serde_json::from_str(&json).unwrap()
        }

        fn ok_payload(ptr: *const c_char) -> String {
            match take(ptr) {
                AppResponse::Ok(payload) => payload,
                other => panic!("expected Ok, got {other:?}"),
            }
        }

        fn open(dir: &tempfile::TempDir, name: &str) -> *mut LocalContentStore {
            let path = CString::new(dir.path().join(name).to_string_lossy().into_owned()).unwrap();
            let store = create_store(path.as_ptr());
            assert!(!store.is_null());
            store
        }

        #[test]
        fn test_ffi_create_store_null_and_invalid_utf8() {
            assert!(create_store(std::ptr::null()).is_null());
            let invalid_bytes = [0xFFu8, 0xFE, 0xFD, 0x00];
            assert!(create_store(invalid_bytes.as_ptr() as *const c_char).is_null());
        }

        #[test]
        fn test_ffi_null_store_is_bad_request() {
            let domain = CString::new("navigation").unwrap();
            assert!(matches!(
                take(get_domain(std::ptr::null_mut(), domain.as_ptr())),
                AppResponse::BadRequest(_)
            ));
            assert!(matches!(take(is_logged_in(std::ptr::null_mut())), AppResponse::BadRequest(_)));
            assert!(matches!(take(close_store(std::ptr::null_mut())), AppResponse::BadRequest(_)));
        }

        #[test]
        fn test_ffi_domain_round_trip() {
            let dir = tempfile::tempdir().unwrap();
            let store = open(&dir, "ffi_domain");

            let written: Vec<String> = serde_json::from_str(&ok_payload(initialize_defaults(store))).unwrap();
            assert!(written.contains(&"siteContent".to_string()));

            let domain = CString::new("bannedIPs").unwrap();
            let body = CString::new(r#"["9.9.9.9"]"#).unwrap();
            ok_payload(save_domain(store, domain.as_ptr(), body.as_ptr()));
            let ips: Vec<String> = serde_json::from_str(&ok_payload(get_domain(store, domain.as_ptr()))).unwrap();
            assert_eq!(ips, vec!["9.9.9.9".to_string()]);

            let unknown = CString::new("secrets").unwrap();
            assert!(matches!(take(get_domain(store, unknown.as_ptr())), AppResponse::BadRequest(_)));

            let nav = CString::new("navigation").unwrap();
            let bad = CString::new(r#"{"items": 5}"#).unwrap();
            assert!(matches!(
                take(save_domain(store, nav.as_ptr(), bad.as_ptr())),
                AppResponse::ValidationError(_)
            ));

            ok_payload(close_store(store));
        }

        #[test]
        fn test_ffi_items_and_page_views() {
            let dir = tempfile::tempdir().unwrap();
            let store = open(&dir, "ffi_items");

            let gallery = CString::new("galleryItems").unwrap();
            let item = CString::new(r#"{"title":"FFI","category":"סלונים","imageUrl":"/f.jpg"}"#).unwrap();
            let stored: serde_json::Value =
                serde_json::from_str(&ok_payload(save_item(store, gallery.as_ptr(), item.as_ptr()))).unwrap();
            let id = CString::new(stored["id"].as_str().unwrap()).unwrap();

            assert_eq!(ok_payload(delete_item(store, gallery.as_ptr(), id.as_ptr())), "true");
            // Deleting an absent id is a successful no-op.
            assert_eq!(ok_payload(delete_item(store, gallery.as_ptr(), id.as_ptr())), "false");
            let missing = CString::new("missing").unwrap();
            assert_eq!(ok_payload(delete_item(store, gallery.as_ptr(), missing.as_ptr())), "false");

            let path = CString::new("/contact").unwrap();
            let ua = CString::new("Mozilla/5.0 (iPad; CPU OS 16_6 like Mac OS X)").unwrap();
            let view: serde_json::Value =
                serde_json::from_str(&ok_payload(record_page_view(store, path.as_ptr(), ua.as_ptr()))).unwrap();
            assert_eq!(view["device"], "Tablet");

            ok_payload(close_store(store));
        }

        #[test]
        fn test_ffi_submit_contact() {
            let dir = tempfile::tempdir().unwrap();
            let store = open(&dir, "ffi_contact");
            let ua = CString::new("Mozilla/5.0 (Windows NT 10.0; Win64; x64)").unwrap();

            let invalid = CString::new(r#"{"name":"","email":"x","message":"hi","consent":false}"#).unwrap();
            match take(submit_contact(store, invalid.as_ptr(), ua.as_ptr())) {
                AppResponse::ValidationError(payload) => {
                    let errors: serde_json::Value = serde_json::from_str(&payload).unwrap();
                    assert_eq!(errors.as_array().unwrap().len(), 4);
                }
                other => panic!("expected validation error, got {other:?}"),
            }

            let malformed = CString::new("{").unwrap();
            assert!(matches!(
                take(submit_contact(store, malformed.as_ptr(), ua.as_ptr())),
                AppResponse::SerializationError(_)
            ));

            let valid = CString::new(
                r#"{"name":"נועה","email":"noa@example.com","message":"מבקשת לתאם פגישת ייעוץ","consent":true}"#,
            )
            .unwrap();
            let contact: serde_json::Value =
                serde_json::from_str(&ok_payload(submit_contact(store, valid.as_ptr(), ua.as_ptr()))).unwrap();
            assert_eq!(contact["device"], "Desktop");
            assert_eq!(contact["ip"], "127.0.0.1");

            ok_payload(close_store(store));
        }

        #[test]
        fn test_ffi_login_flow() {
            let dir = tempfile::tempdir().unwrap();
            let store = open(&dir, "ffi_login");
            let user = CString::new("admin").unwrap();
            let wrong = CString::new("nope").unwrap();
            let right = CString::new("admin123").unwrap();

            assert_eq!(ok_payload(login(store, user.as_ptr(), wrong.as_ptr())), "false");
            assert_eq!(ok_payload(is_logged_in(store)), "false");
            assert_eq!(ok_payload(login(store, user.as_ptr(), right.as_ptr())), "true");
            assert_eq!(ok_payload(is_logged_in(store)), "true");
            ok_payload(logout(store));
            assert_eq!(ok_payload(is_logged_in(store)), "false");

            assert!(matches!(
                take(login(store, std::ptr::null(), right.as_ptr())),
                AppResponse::BadRequest(_)
            ));

            ok_payload(close_store(store));
        }

        #[test]
        fn test_ffi_free_response_null_is_noop() {
            free_response(std::ptr::null());
        }
    }

    #[test]
    fn test_navigation_items_tolerate_missing_fields() {
        // Stored navigation written by older builds without ids still parses.
        let nav: Navigation =
            serde_json::from_value(json!({"items":[{"label":"בית","url":"/"}]})).unwrap();
        assert_eq!(nav.items[0].id, "");
        assert!(!nav.items[0].highlight);
    }
}
