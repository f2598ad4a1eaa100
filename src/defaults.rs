//! Baked-in content returned when a domain has never been saved.

use chrono::{Duration, TimeZone, Utc};

use crate::content_model::{
    AdminCredentials, Contact, ContactInfo, FooterContact, FooterContent, FooterLink,
    FooterLinkGroup, GalleryItem, Navigation, NavigationItem, SiteContent, SliderSettings,
    SocialLink, PLACEHOLDER_IP,
};
use crate::device::Device;

pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

const INSTAGRAM_ICON: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2"><rect x="2" y="2" width="20" height="20" rx="5"/><circle cx="12" cy="12" r="4"/><circle cx="17.5" cy="6.5" r="1"/></svg>"#;
const FACEBOOK_ICON: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2"><path d="M18 2h-3a5 5 0 0 0-5 5v3H7v4h3v8h4v-8h3l1-4h-4V7a1 1 0 0 1 1-1h3z"/></svg>"#;
const WHATSAPP_ICON: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2"><path d="M21 11.5a8.4 8.4 0 0 1-12.6 7.3L3 21l2.3-5.3A8.5 8.5 0 1 1 21 11.5z"/></svg>"#;

impl Default for SiteContent {
    fn default() -> Self {
        Self {
            hero_title: "עיצוב פנים שמספר את הסיפור שלכם".to_string(),
            hero_subtitle: "סטודיו לעיצוב פנים ואדריכלות, מהסקיצה הראשונה ועד המפתח".to_string(),
            hero_cta_text: "לתיאום פגישת ייעוץ".to_string(),
            hero_cta_link: "/contact".to_string(),
            hero_image: "/images/hero.jpg".to_string(),
            about_title: "קצת עלינו".to_string(),
            about_text: "אנחנו סטודיו בוטיק המתמחה בתכנון ועיצוב בתים פרטיים, דירות ומשרדים. כל פרויקט מתחיל בהקשבה ומסתיים בחלל שמרגיש כמו בית.".to_string(),
            about_image: "/images/about.jpg".to_string(),
            services_title: "השירותים שלנו".to_string(),
            services_subtitle: "ליווי מלא בכל שלבי הפרויקט".to_string(),
            gallery_title: "הפרויקטים שלנו".to_string(),
            gallery_subtitle: "מבחר עבודות מהשנים האחרונות".to_string(),
            primary_color: "#1f2937".to_string(),
            secondary_color: "#c8a97e".to_string(),
            accent_color: "#f5f0e8".to_string(),
            contact_info: ContactInfo::default(),
        }
    }
}

impl Default for ContactInfo {
    fn default() -> Self {
        Self {
            phone: "050-1234567".to_string(),
            email: "info@studio-design.co.il".to_string(),
            address: "רחוב הרצל 1, תל אביב".to_string(),
            whatsapp: "972501234567".to_string(),
            hours: "א׳-ה׳ 09:00-18:00".to_string(),
        }
    }
}

impl Default for FooterContent {
    fn default() -> Self {
        Self {
            description: "סטודיו לעיצוב פנים ואדריכלות. מתכננים חללים שמשלבים אסתטיקה, נוחות ופונקציונליות.".to_string(),
            link_groups: vec![
                FooterLinkGroup {
                    title: "ניווט מהיר".to_string(),
                    links: vec![
                        footer_link("דף הבית", "/"),
                        footer_link("גלריה", "/gallery"),
                        footer_link("צור קשר", "/contact"),
                    ],
                },
                FooterLinkGroup {
                    title: "מידע".to_string(),
                    links: vec![
                        footer_link("מדיניות פרטיות", "/privacy"),
                        footer_link("הצהרת נגישות", "/accessibility"),
                    ],
                },
            ],
            contact_info: FooterContact {
                phone: "050-1234567".to_string(),
                email: "info@studio-design.co.il".to_string(),
                address: "רחוב הרצל 1, תל אביב".to_string(),
            },
            social_links: vec![
                social_link("Instagram", "https://instagram.com/", INSTAGRAM_ICON),
                social_link("Facebook", "https://facebook.com/", FACEBOOK_ICON),
                social_link("WhatsApp", "https://wa.me/972501234567", WHATSAPP_ICON),
            ],
            copyright: "© {year} סטודיו לעיצוב. כל הזכויות שמורות.".to_string(),
        }
    }
}

impl Default for AdminCredentials {
    fn default() -> Self {
        Self {
            username: DEFAULT_ADMIN_USERNAME.to_string(),
            password: DEFAULT_ADMIN_PASSWORD.to_string(),
        }
    }
}

impl Default for SliderSettings {
    fn default() -> Self {
        Self {
            autoplay: true,
            interval_ms: 5000,
            show_arrows: true,
            show_dots: true,
            pause_on_hover: true,
        }
    }
}

impl Default for Navigation {
    fn default() -> Self {
        Self {
            items: vec![
                nav_item("nav-home", "דף הבית", "/", false),
                nav_item("nav-gallery", "גלריה", "/gallery", false),
                nav_item("nav-contact", "צור קשר", "/contact", true),
            ],
        }
    }
}

pub fn sample_gallery_items() -> Vec<GalleryItem> {
    vec![
        gallery_item("g-1", "מטבח כפרי מודרני", "מטבחים", "/images/gallery/kitchen-1.jpg", "שילוב עץ אלון ושיש בהיר"),
        gallery_item("g-2", "סלון בגווני אדמה", "סלונים", "/images/gallery/living-1.jpg", "חלל פתוח עם תאורה רכה"),
        gallery_item("g-3", "חדר שינה הורים", "חדרי שינה", "/images/gallery/bedroom-1.jpg", "קיר ראש מיטה מרופד"),
        gallery_item("g-4", "חדר רחצה מינימליסטי", "חדרי רחצה", "/images/gallery/bath-1.jpg", "אריחי טרצו וברזים שחורים"),
        gallery_item("g-5", "משרד בוטיק", "משרדים", "/images/gallery/office-1.jpg", "עמדות עבודה גמישות"),
        gallery_item("g-6", "פינת אוכל", "סלונים", "/images/gallery/dining-1.jpg", "שולחן עץ מלא לשמונה סועדים"),
    ]
}

pub fn sample_home_gallery_items() -> Vec<GalleryItem> {
    vec![
        gallery_item("h-1", "דירת גן בהרצליה", "פרויקטים", "/images/home/herzliya.jpg", "שיפוץ מלא של דירת גן"),
        gallery_item("h-2", "פנטהאוז בתל אביב", "פרויקטים", "/images/home/tlv.jpg", "נוף לים וחומרים טבעיים"),
        gallery_item("h-3", "בית פרטי ברעננה", "פרויקטים", "/images/home/raanana.jpg", "תכנון מחדש של קומת הקרקע"),
        gallery_item("h-4", "משרדי הייטק", "פרויקטים", "/images/home/office.jpg", "חללי עבודה משותפים"),
    ]
}

pub fn sample_contacts() -> Vec<Contact> {
    let base = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).single().unwrap_or_else(Utc::now);
    vec![
        Contact {
            id: "c-2".to_string(),
            name: "דנה לוי".to_string(),
            email: "dana@example.com".to_string(),
            subject: Some("עיצוב מטבח".to_string()),
            message: "שלום, אשמח לקבל הצעת מחיר לעיצוב מטבח בדירה חדשה.".to_string(),
            date: base + Duration::days(2),
            device: Device::Mobile,
            ip: PLACEHOLDER_IP.to_string(),
        },
        Contact {
            id: "c-1".to_string(),
            name: "יוסי כהן".to_string(),
            email: "yossi@example.com".to_string(),
            subject: None,
            message: "מעוניין בייעוץ לשיפוץ דירת ארבעה חדרים.".to_string(),
            date: base,
            device: Device::Desktop,
            ip: PLACEHOLDER_IP.to_string(),
        },
    ]
}

fn footer_link(label: &str, url: &str) -> FooterLink {
    FooterLink {
        label: label.to_string(),
        url: url.to_string(),
    }
}

fn social_link(name: &str, url: &str, icon: &str) -> SocialLink {
    SocialLink {
        name: name.to_string(),
        url: url.to_string(),
        icon: icon.to_string(),
    }
}

fn nav_item(id: &str, label: &str, url: &str, highlight: bool) -> NavigationItem {
    NavigationItem {
        id: id.to_string(),
        label: label.to_string(),
        url: url.to_string(),
        highlight,
    }
}

fn gallery_item(id: &str, title: &str, category: &str, image_url: &str, description: &str) -> GalleryItem {
    GalleryItem {
        id: id.to_string(),
        title: title.to_string(),
        category: category.to_string(),
        image_url: image_url.to_string(),
        description: description.to_string(),
    }
}
