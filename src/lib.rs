//! # Studio Site Core
//!
//! The content and admin core of a Hebrew (RTL) design-studio website. It
//! persists everything the site edits locally (site content, navigation,
//! footer, galleries, contact submissions, page views, admin session) as JSON
//! records under fixed keys in a key-value store, and exposes a C-compatible
//! API so a UI shell (web view, Flutter, native) can drive it.
//!
//! ## Layers
//!
//! - [`key_value`]: the storage port, with an in-memory backend.
//! - [`local_db_state`]: the durable LMDB backend.
//! - [`content_store`]: typed get/save accessors per domain.
//! - [`auth`]: the admin login flag and route guard (not a security boundary).
//! - [`contact_form`]: contact submission validation.
//! - [`analytics`] / [`backup`]: simulated dashboard data behind swappable APIs.
//!
//! ## Quick Start
//!
//! ```no_run
//! use studio_site_core::content_store::ContentStore;
//! use studio_site_core::key_value::MemoryStorage;
//!
//! let store = ContentStore::new(MemoryStorage::new());
//! let content = store.get_site_content()?;
//! println!("{}", content.hero_title);
//! # Ok::<(), studio_site_core::store_error::StoreError>(())
//! ```
//!
//! ## FFI Functions
//!
//! Every function except [`create_store`] returns a heap C string holding a
//! JSON [`AppResponse`]; release it with [`free_response`].
//!
//! - [`create_store`] / [`close_store`]
//! - [`initialize_defaults`]
//! - [`get_domain`] / [`save_domain`]
//! - [`save_item`] / [`delete_item`]
//! - [`record_page_view`] / [`submit_contact`]
//! - [`login`] / [`is_logged_in`] / [`logout`]

pub mod analytics;
pub mod app_response;
pub mod auth;
pub mod backup;
pub mod config;
pub mod contact_form;
pub mod content_model;
pub mod content_store;
pub mod defaults;
pub mod device;
pub mod key_value;
pub mod local_db_state;
pub mod logging;
pub mod routes;
pub mod store_error;
pub mod text;
mod test;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use log::{info, warn};

use crate::app_response::AppResponse;
use crate::auth::AuthGate;
use crate::contact_form::ContactSubmission;
use crate::content_store::{ContentStore, Domain};
use crate::local_db_state::AppDbState;

/// The store type handed across the FFI boundary.
pub type LocalContentStore = ContentStore<AppDbState>;

/// Opens (or creates) a durable content store.
///
/// The store lives in an LMDB environment directory named `<name>.lmdb` and
/// starts with default settings: no key namespace, a 500-entry page-view cap
/// and the fail-loudly corrupt-value policy. Nothing is written until a save,
/// a login or [`initialize_defaults`].
///
/// # Parameters
///
/// * `name` - A null-terminated C string with the store path, without the
///   `.lmdb` suffix
///
/// # Returns
///
/// A pointer to the [`LocalContentStore`] on success, or a null pointer on
/// failure. The caller owns the handle and must release it with
/// [`close_store`].
///
/// # Safety
///
/// This function is unsafe because it:
/// - Dereferences a raw pointer without validation
/// - Returns a raw pointer that must be properly managed
/// - Requires the input string to be valid UTF-8
///
/// # Examples
///
/// ```no_run
/// use std::ffi::CString;
/// use studio_site_core::{close_store, create_store, free_response};
///
/// let name = CString::new("studio_site").unwrap();
/// let store = create_store(name.as_ptr());
/// if !store.is_null() {
///     free_response(close_store(store));
/// }
/// ```
///
/// # Errors
///
/// Returns a null pointer if:
/// - The name pointer is null
/// - The name contains invalid UTF-8
/// - The directory or LMDB environment cannot be opened
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn create_store(name: *const c_char) -> *mut LocalContentStore {
    logging::init_logger();

    if name.is_null() {
        warn!("Null name pointer passed to create_store");
        return std::ptr::null_mut();
    }

    let name_str = match unsafe { CStr::from_ptr(name).to_str() } {
        Ok(s) => s,
        Err(e) => {
            warn!("Invalid UTF-8 in name parameter: {e}");
            return std::ptr::null_mut();
        }
    };

    match AppDbState::init(name_str.to_string()) {
        Ok(state) => {
            info!("STORE_OPENED name={}", name_str);
            let store = ContentStore::with_settings(state, Default::default(), name_str);
            Box::into_raw(Box::new(store))
        }
        Err(e) => {
            warn!("STORE_OPEN_FAILED name={} error={}", name_str, e);
            std::ptr::null_mut()
        }
    }
}

/// Flushes and releases a store created by [`create_store`].
///
/// # Parameters
///
/// * `store` - The handle returned by [`create_store`]
///
/// # Returns
///
/// A JSON [`AppResponse`]: `Ok` once the environment is synced. The handle
/// is freed in every case except a null pointer.
///
/// # Safety
///
/// This function is unsafe because it:
/// - Takes ownership of `store` through `Box::from_raw`
/// - Must be called at most once per handle; the pointer is dangling afterwards
///
/// # Errors
///
/// - `BadRequest` if `store` is null
/// - `DatabaseError` if the final sync fails
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn close_store(store: *mut LocalContentStore) -> *const c_char {
    if store.is_null() {
        let error = AppResponse::BadRequest("Null store pointer passed to close_store".to_string());
        return response_to_c_string(&error);
    }

    let mut store = unsafe { Box::from_raw(store) };
    match store.storage_mut().close_database() {
        Ok(_) => response_to_c_string(&AppResponse::success("Store closed successfully")),
        Err(e) => response_to_c_string(&AppResponse::from(e)),
    }
}

/// Writes the default record of every domain that has never been saved.
///
/// Domains already present are left untouched. Session keys and the CSRF
/// token are never written here.
///
/// # Parameters
///
/// * `store` - The handle returned by [`create_store`]
///
/// # Returns
///
/// `Ok` carrying a JSON array of the storage keys that were written, e.g.
/// `["siteContent","navigation"]`. An empty array means nothing was missing.
///
/// # Safety
///
/// This function is unsafe because it:
/// - Dereferences `store`, which must come from [`create_store`] and not yet
///   be passed to [`close_store`]
/// - Reads every string argument as a null-terminated C string
///
/// # Errors
///
/// - `BadRequest` if `store` is null
/// - `SerializationError` if an existing value is corrupt
/// - `DatabaseError` on storage failures
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn initialize_defaults(store: *mut LocalContentStore) -> *const c_char {
    let store = match store_ref(store) {
        Ok(s) => s,
        Err(err) => return err,
    };

    match store.initialize_defaults() {
        Ok(keys) => {
            let names: Vec<&str> = keys.iter().map(|k| k.as_str()).collect();
            json_ok(&names)
        }
        Err(e) => response_to_c_string(&AppResponse::from(e)),
    }
}

/// Reads a domain by its storage key name.
///
/// Absent domains answer with their default; the read never writes.
///
/// # Parameters
///
/// * `store` - The handle returned by [`create_store`]
/// * `domain` - A storage key name: `siteContent`, `navigation`,
///   `footerContent`, `galleryItems`, `homeGalleryItems`, `contacts`,
///   `pageViews`, `bannedIPs` or `sliderSettings`
///
/// # Returns
///
/// `Ok` carrying the domain record as JSON.
///
/// # Safety
///
/// This function is unsafe because it:
/// - Dereferences `store`, which must come from [`create_store`] and not yet
///   be passed to [`close_store`]
/// - Reads every string argument as a null-terminated C string
///
/// # Examples
///
/// ```no_run
/// use std::ffi::{CStr, CString};
/// use studio_site_core::{create_store, free_response, get_domain};
///
/// let name = CString::new("studio_site").unwrap();
/// let store = create_store(name.as_ptr());
/// let domain = CString::new("galleryItems").unwrap();
///
/// let response = get_domain(store, domain.as_ptr());
/// let json = unsafe { CStr::from_ptr(response) }.to_str().unwrap().to_owned();
/// free_response(response);
/// println!("{json}");
/// ```
///
/// # Errors
///
/// - `BadRequest` for a null pointer, invalid UTF-8 or an unknown domain
/// - `SerializationError` if the stored value is corrupt
/// - `DatabaseError` on storage failures
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn get_domain(store: *mut LocalContentStore, domain: *const c_char) -> *const c_char {
    let store = match store_ref(store) {
        Ok(s) => s,
        Err(err) => return err,
    };
    let domain = match parse_domain(domain) {
        Ok(d) => d,
        Err(err) => return err,
    };

    match store.get_domain_json(domain) {
        Ok(value) => json_ok(&value),
        Err(e) => response_to_c_string(&AppResponse::from(e)),
    }
}

/// Overwrites a whole domain record with the given JSON.
///
/// The JSON is parsed as the domain's record before anything is written, so
/// a rejected body leaves storage unchanged. Page-view lists are truncated to
/// the configured cap.
///
/// # Parameters
///
/// * `store` - The handle returned by [`create_store`]
/// * `domain` - A storage key name, as for [`get_domain`]
/// * `json_ptr` - The full replacement record as JSON
///
/// # Returns
///
/// `Ok` with a confirmation message.
///
/// # Safety
///
/// This function is unsafe because it:
/// - Dereferences `store`, which must come from [`create_store`] and not yet
///   be passed to [`close_store`]
/// - Reads every string argument as a null-terminated C string
///
/// # Errors
///
/// - `BadRequest` for a null pointer, invalid UTF-8 or an unknown domain
/// - `ValidationError` if the JSON does not match the domain's record
/// - `DatabaseError` on storage failures, including a full map
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn save_domain(
    store: *mut LocalContentStore,
    domain: *const c_char,
    json_ptr: *const c_char,
) -> *const c_char {
    let store = match store_ref(store) {
        Ok(s) => s,
        Err(err) => return err,
    };
    let domain = match parse_domain(domain) {
        Ok(d) => d,
        Err(err) => return err,
    };
    let json_str = match c_ptr_to_string(json_ptr, "JSON") {
        Ok(json) => json,
        Err(err) => return err,
    };

    match store.save_domain_json(domain, &json_str) {
        Ok(()) => response_to_c_string(&AppResponse::success(format!(
            "Domain '{}' saved",
            domain.storage_key()
        ))),
        Err(e) => response_to_c_string(&AppResponse::from(e)),
    }
}

/// Inserts or replaces one entry of a list domain.
///
/// An entry without an id gets a fresh UUID. An id already in the list
/// replaces that entry in place. Galleries append new entries; contacts and
/// page views put them first.
///
/// # Parameters
///
/// * `store` - The handle returned by [`create_store`]
/// * `domain` - `galleryItems`, `homeGalleryItems`, `contacts` or `pageViews`
/// * `json_ptr` - The entry as JSON
///
/// # Returns
///
/// `Ok` carrying the stored entry, including its id.
///
/// # Safety
///
/// This function is unsafe because it:
/// - Dereferences `store`, which must come from [`create_store`] and not yet
///   be passed to [`close_store`]
/// - Reads every string argument as a null-terminated C string
///
/// # Errors
///
/// - `BadRequest` for a null pointer, invalid UTF-8 or an unknown domain
/// - `ValidationError` if the domain is not a list or the JSON is not an entry
/// - `SerializationError` if the stored list is corrupt
/// - `DatabaseError` on storage failures
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn save_item(
    store: *mut LocalContentStore,
    domain: *const c_char,
    json_ptr: *const c_char,
) -> *const c_char {
    let store = match store_ref(store) {
        Ok(s) => s,
        Err(err) => return err,
    };
    let domain = match parse_domain(domain) {
        Ok(d) => d,
        Err(err) => return err,
    };
    let json_str = match c_ptr_to_string(json_ptr, "JSON") {
        Ok(json) => json,
        Err(err) => return err,
    };

    match store.save_item_json(domain, &json_str) {
        Ok(value) => json_ok(&value),
        Err(e) => response_to_c_string(&AppResponse::from(e)),
    }
}

/// Removes one entry of a list domain by id.
///
/// Deleting an id that is not present is a successful no-op. For
/// `bannedIPs` the id is the address to unban.
///
/// # Parameters
///
/// * `store` - The handle returned by [`create_store`]
/// * `domain` - `galleryItems`, `homeGalleryItems`, `contacts`, `pageViews`
///   or `bannedIPs`
/// * `id` - The entry id
///
/// # Returns
///
/// `Ok("true")` if an entry was removed, `Ok("false")` if none matched.
///
/// # Safety
///
/// This function is unsafe because it:
/// - Dereferences `store`, which must come from [`create_store`] and not yet
///   be passed to [`close_store`]
/// - Reads every string argument as a null-terminated C string
///
/// # Errors
///
/// - `BadRequest` for a null pointer, invalid UTF-8 or an unknown domain
/// - `ValidationError` if the domain is not a list
/// - `DatabaseError` on storage failures
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn delete_item(
    store: *mut LocalContentStore,
    domain: *const c_char,
    id: *const c_char,
) -> *const c_char {
    let store = match store_ref(store) {
        Ok(s) => s,
        Err(err) => return err,
    };
    let domain = match parse_domain(domain) {
        Ok(d) => d,
        Err(err) => return err,
    };
    let id_str = match c_ptr_to_string(id, "id") {
        Ok(id) => id,
        Err(err) => return err,
    };

    match store.delete_item(domain, &id_str) {
        Ok(removed) => response_to_c_string(&AppResponse::success(removed.to_string())),
        Err(e) => response_to_c_string(&AppResponse::from(e)),
    }
}

/// Records a visit to `path`, newest first, dropping the oldest views beyond
/// the cap.
///
/// # Parameters
///
/// * `store` - The handle returned by [`create_store`]
/// * `path` - The visited route path, e.g. `/gallery`
/// * `user_agent` - The browser user agent, used only to classify the device
///
/// # Returns
///
/// `Ok` carrying the recorded view as JSON.
///
/// # Safety
///
/// This function is unsafe because it:
/// - Dereferences `store`, which must come from [`create_store`] and not yet
///   be passed to [`close_store`]
/// - Reads every string argument as a null-terminated C string
///
/// # Errors
///
/// - `BadRequest` for a null pointer or invalid UTF-8
/// - `SerializationError` if the stored list is corrupt
/// - `DatabaseError` on storage failures
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn record_page_view(
    store: *mut LocalContentStore,
    path: *const c_char,
    user_agent: *const c_char,
) -> *const c_char {
    let store = match store_ref(store) {
        Ok(s) => s,
        Err(err) => return err,
    };
    let path = match c_ptr_to_string(path, "path") {
        Ok(p) => p,
        Err(err) => return err,
    };
    let user_agent = match c_ptr_to_string(user_agent, "user agent") {
        Ok(ua) => ua,
        Err(err) => return err,
    };

    match store.record_page_view(&path, &user_agent) {
        Ok(view) => json_ok(&view),
        Err(e) => response_to_c_string(&AppResponse::from(e)),
    }
}

/// Validates a contact form post and records it.
///
/// # Parameters
///
/// * `store` - The handle returned by [`create_store`]
/// * `json_ptr` - The form post: `{name, email, subject?, message, consent}`
/// * `user_agent` - The browser user agent, used only to classify the device
///
/// # Returns
///
/// `Ok` carrying the stored contact, which is placed first in the list.
///
/// # Safety
///
/// This function is unsafe because it:
/// - Dereferences `store`, which must come from [`create_store`] and not yet
///   be passed to [`close_store`]
/// - Reads every string argument as a null-terminated C string
///
/// # Errors
///
/// - `BadRequest` for a null pointer or invalid UTF-8
/// - `SerializationError` if the body is not a form post
/// - `ValidationError` carrying a JSON array of `{field, message}` objects,
///   one per invalid field
/// - `DatabaseError` on storage failures
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn submit_contact(
    store: *mut LocalContentStore,
    json_ptr: *const c_char,
    user_agent: *const c_char,
) -> *const c_char {
    let store = match store_ref(store) {
        Ok(s) => s,
        Err(err) => return err,
    };
    let json_str = match c_ptr_to_string(json_ptr, "JSON") {
        Ok(json) => json,
        Err(err) => return err,
    };
    let user_agent = match c_ptr_to_string(user_agent, "user agent") {
        Ok(ua) => ua,
        Err(err) => return err,
    };

    let submission: ContactSubmission = match serde_json::from_str(&json_str) {
        Ok(s) => s,
        Err(e) => {
            let error = AppResponse::SerializationError(format!("Invalid JSON: {e}"));
            return response_to_c_string(&error);
        }
    };

    let validated = match submission.validate() {
        Ok(v) => v,
        Err(errors) => return response_to_c_string(&AppResponse::from(errors)),
    };

    match store.add_contact(validated, &user_agent) {
        Ok(contact) => json_ok(&contact),
        Err(e) => response_to_c_string(&AppResponse::from(e)),
    }
}

/// Checks admin credentials and opens the session on a match.
///
/// This gate is a UI convenience, not a security boundary: credentials and
/// the session flag live in the same storage as the content.
///
/// # Parameters
///
/// * `store` - The handle returned by [`create_store`]
/// * `username` - The admin user name
/// * `password` - The admin password
///
/// # Returns
///
/// `Ok("true")` on success, `Ok("false")` on a credential mismatch. A
/// mismatch writes nothing.
///
/// # Safety
///
/// This function is unsafe because it:
/// - Dereferences `store`, which must come from [`create_store`] and not yet
///   be passed to [`close_store`]
/// - Reads every string argument as a null-terminated C string
///
/// # Errors
///
/// - `BadRequest` for a null pointer or invalid UTF-8
/// - `DatabaseError` on storage failures
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn login(
    store: *mut LocalContentStore,
    username: *const c_char,
    password: *const c_char,
) -> *const c_char {
    let store = match store_ref(store) {
        Ok(s) => s,
        Err(err) => return err,
    };
    let username = match c_ptr_to_string(username, "username") {
        Ok(u) => u,
        Err(err) => return err,
    };
    let password = match c_ptr_to_string(password, "password") {
        Ok(p) => p,
        Err(err) => return err,
    };

    match AuthGate::new(store).login(&username, &password) {
        Ok(ok) => response_to_c_string(&AppResponse::success(ok.to_string())),
        Err(e) => response_to_c_string(&AppResponse::from(e)),
    }
}

/// Reports whether the admin session flag is set.
///
/// # Parameters
///
/// * `store` - The handle returned by [`create_store`]
///
/// # Returns
///
/// `Ok("true")` or `Ok("false")`. An absent flag is `false`.
///
/// # Safety
///
/// This function is unsafe because it:
/// - Dereferences `store`, which must come from [`create_store`] and not yet
///   be passed to [`close_store`]
/// - Reads every string argument as a null-terminated C string
///
/// # Errors
///
/// - `BadRequest` if `store` is null
/// - `SerializationError` if the stored flag is corrupt
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn is_logged_in(store: *mut LocalContentStore) -> *const c_char {
    let store = match store_ref(store) {
        Ok(s) => s,
        Err(err) => return err,
    };

    match AuthGate::new(store).is_logged_in() {
        Ok(flag) => response_to_c_string(&AppResponse::success(flag.to_string())),
        Err(e) => response_to_c_string(&AppResponse::from(e)),
    }
}

/// Clears the admin session flag and login time.
///
/// # Parameters
///
/// * `store` - The handle returned by [`create_store`]
///
/// # Returns
///
/// `Ok` with a confirmation message, whether or not a session was open.
///
/// # Safety
///
/// This function is unsafe because it:
/// - Dereferences `store`, which must come from [`create_store`] and not yet
///   be passed to [`close_store`]
/// - Reads every string argument as a null-terminated C string
///
/// # Errors
///
/// - `BadRequest` if `store` is null
/// - `DatabaseError` on storage failures
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn logout(store: *mut LocalContentStore) -> *const c_char {
    let store = match store_ref(store) {
        Ok(s) => s,
        Err(err) => return err,
    };

    match AuthGate::new(store).logout() {
        Ok(()) => response_to_c_string(&AppResponse::success("Logged out")),
        Err(e) => response_to_c_string(&AppResponse::from(e)),
    }
}

/// Releases a response string returned by any function in this module.
///
/// # Parameters
///
/// * `response` - A pointer returned by one of this crate's FFI functions
///
/// # Safety
///
/// This function is unsafe because it:
/// - Reclaims `response` through `CString::from_raw`
/// - Must be called exactly once per response; a null pointer is ignored
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn free_response(response: *const c_char) {
    if response.is_null() {
        return;
    }
    unsafe {
        drop(CString::from_raw(response as *mut c_char));
    }
}

/// Serializes `value` and wraps it in `AppResponse::Ok`.
fn json_ok<T: serde::Serialize + ?Sized>(value: &T) -> *const c_char {
    match serde_json::to_string(value) {
        Ok(json) => response_to_c_string(&AppResponse::Ok(json)),
        Err(e) => response_to_c_string(&AppResponse::from(e)),
    }
}

fn store_ref<'a>(store: *mut LocalContentStore) -> Result<&'a LocalContentStore, *const c_char> {
    match unsafe { store.as_ref() } {
        Some(s) => Ok(s),
        None => Err(response_to_c_string(&AppResponse::BadRequest(
            "Null store pointer".to_string(),
        ))),
    }
}

fn parse_domain(ptr: *const c_char) -> Result<Domain, *const c_char> {
    let name = c_ptr_to_string(ptr, "domain")?;
    name.parse::<Domain>()
        .map_err(|e| response_to_c_string(&AppResponse::from(e)))
}

/// Converts an [`AppResponse`] to a C string owned by the caller.
///
/// Returns a null pointer if serialization or C string creation fails.
fn response_to_c_string(response: &AppResponse) -> *const c_char {
    let json = match serde_json::to_string(response) {
        Ok(j) => j,
        Err(e) => {
            warn!("Error serializing response: {e}");
            return std::ptr::null();
        }
    };

    match CString::new(json) {
        Ok(c_str) => c_str.into_raw(),
        Err(e) => {
            warn!("Error creating CString: {e}");
            std::ptr::null()
        }
    }
}

/// Converts a C string pointer to a Rust `String`, reporting null pointers
/// and invalid UTF-8 as `BadRequest` responses.
fn c_ptr_to_string(ptr: *const c_char, field_name: &str) -> Result<String, *const c_char> {
    if ptr.is_null() {
        let error = AppResponse::BadRequest(format!("Null {field_name} pointer"));
        return Err(response_to_c_string(&error));
    }

    match unsafe { CStr::from_ptr(ptr).to_str() } {
        Ok(s) => Ok(s.to_string()),
        Err(e) => {
            let error = AppResponse::BadRequest(format!("Invalid UTF-8 in {field_name}: {e}"));
            Err(response_to_c_string(&error))
        }
    }
}
