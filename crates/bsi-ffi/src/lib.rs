//! C FFI bindings for bsi-core
//!
//! Read-only access to a reconciliation for document renderers written in
//! C or C++. Records cross the boundary as JSON strings.

use bsi_core::{MatchPolicy, ReconcileInput, Reconciler, ReconcilerOptions, Reconciliation, Vocabulary};
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::path::PathBuf;
use std::ptr;

/// Opaque handle to a finished reconciliation
pub struct FfiReconciliation {
    inner: Reconciliation,
}

unsafe fn path_arg(s: *const c_char) -> Option<PathBuf> {
    if s.is_null() {
        return None;
    }
    CStr::from_ptr(s).to_str().ok().map(PathBuf::from)
}

fn into_c_string(s: String) -> *mut c_char {
    CString::new(s)
        .map(|s| s.into_raw())
        .unwrap_or(ptr::null_mut())
}

/// Run a reconciliation
///
/// # Safety
/// - `compensation` and `worked_days` must be valid C strings
/// - `descriptions` must point to `count` C strings (merged in that order);
///   a null or non-UTF-8 entry makes the whole call return null
/// - `vocabulary` may be null to use the built-in vocabulary
/// - Returns null on any error, including an empty description list
#[no_mangle]
pub unsafe extern "C" fn bsi_reconcile(
    compensation: *const c_char,
    worked_days: *const c_char,
    descriptions: *const *const c_char,
    count: usize,
    vocabulary: *const c_char,
    strict_matching: bool,
) -> *mut FfiReconciliation {
    let (Some(compensation), Some(worked_days)) = (path_arg(compensation), path_arg(worked_days))
    else {
        return ptr::null_mut();
    };
    if descriptions.is_null() || count == 0 {
        return ptr::null_mut();
    }

    let descriptions: Option<Vec<PathBuf>> = (0..count)
        .map(|i| path_arg(*descriptions.add(i)))
        .collect();
    let Some(descriptions) = descriptions else {
        return ptr::null_mut();
    };

    let vocabulary = match path_arg(vocabulary) {
        Some(path) => match Vocabulary::load(path) {
            Ok(v) => v,
            Err(_) => return ptr::null_mut(),
        },
        None => Vocabulary::default(),
    };

    let match_policy = if strict_matching {
        MatchPolicy::Strict
    } else {
        MatchPolicy::Greedy
    };
    let reconciler = Reconciler::with_options(vocabulary, ReconcilerOptions { match_policy });

    let input = ReconcileInput {
        compensation,
        worked_days,
        descriptions,
    };
    match reconciler.reconcile(&input) {
        Ok(result) => Box::into_raw(Box::new(FfiReconciliation { inner: result })),
        Err(_) => ptr::null_mut(),
    }
}

/// Free a reconciliation
///
/// # Safety
/// - `handle` must be a valid pointer returned by `bsi_reconcile` or null
#[no_mangle]
pub unsafe extern "C" fn bsi_free_reconciliation(handle: *mut FfiReconciliation) {
    if !handle.is_null() {
        drop(Box::from_raw(handle));
    }
}

/// Get the number of employees. Zero means no employee was detected.
///
/// # Safety
/// - `handle` must be a valid pointer returned by `bsi_reconcile`
#[no_mangle]
pub unsafe extern "C" fn bsi_record_count(handle: *const FfiReconciliation) -> usize {
    if handle.is_null() {
        return 0;
    }
    let handle = &*handle;
    handle.inner.len()
}

/// Get the canonical key of a record by index
///
/// # Safety
/// - `handle` must be a valid pointer returned by `bsi_reconcile`
/// - Returns null if index is out of bounds
/// - Caller must free the returned string with `bsi_free_string`
#[no_mangle]
pub unsafe extern "C" fn bsi_record_key(handle: *const FfiReconciliation, index: usize) -> *mut c_char {
    if handle.is_null() {
        return ptr::null_mut();
    }

    let handle = &*handle;
    handle
        .inner
        .records
        .get(index)
        .map(|r| into_c_string(r.canonical_key.clone()))
        .unwrap_or(ptr::null_mut())
}

/// Get one record as JSON, looked up by canonical key
///
/// # Safety
/// - `handle` must be a valid pointer returned by `bsi_reconcile`
/// - `key` must be a valid C string
/// - Returns null if no record has that key
/// - Caller must free the returned string with `bsi_free_string`
#[no_mangle]
pub unsafe extern "C" fn bsi_record_json(handle: *const FfiReconciliation, key: *const c_char) -> *mut c_char {
    if handle.is_null() || key.is_null() {
        return ptr::null_mut();
    }

    let key = match CStr::from_ptr(key).to_str() {
        Ok(s) => s,
        Err(_) => return ptr::null_mut(),
    };

    let handle = &*handle;
    handle
        .inner
        .get(key)
        .and_then(|record| serde_json::to_string(record).ok())
        .map(into_c_string)
        .unwrap_or(ptr::null_mut())
}

/// Get the whole reconciliation (records and run summary) as JSON
///
/// # Safety
/// - `handle` must be a valid pointer returned by `bsi_reconcile`
/// - Caller must free the returned string with `bsi_free_string`
#[no_mangle]
pub unsafe extern "C" fn bsi_reconciliation_json(handle: *const FfiReconciliation) -> *mut c_char {
    if handle.is_null() {
        return ptr::null_mut();
    }

    let handle = &*handle;
    serde_json::to_string(&handle.inner)
        .map(into_c_string)
        .unwrap_or(ptr::null_mut())
}

/// Free a string returned by other FFI functions
///
/// # Safety
/// - `s` must be a valid pointer returned by a bsi_* function or null
#[no_mangle]
pub unsafe extern "C" fn bsi_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const LEDGER: &str = "\
Bulletins;;;;;
Code;Libellé;Base S.;Sal.;Pat.;
;;Jean Dupont;;;
100;Salaire de base;1500;1500;0;
";
    const DAYS: &str = "Nom;Prénom;Jours travaillés\nDupont;Jean;12\n";
    const DESCRIPTION: &str = "Nom;Prénom;Poste\nDupont;Jean;Technicien\n";

    fn c_path(dir: &TempDir, name: &str, content: &str) -> CString {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        CString::new(path.to_str().unwrap()).unwrap()
    }

    #[test]
    fn test_reconcile_and_read_back() {
        let dir = TempDir::new().unwrap();
        let money = c_path(&dir, "money.csv", LEDGER);
        let days = c_path(&dir, "days.csv", DAYS);
        let description = c_path(&dir, "description.csv", DESCRIPTION);
        let descriptions = [description.as_ptr()];

        unsafe {
            let handle = bsi_reconcile(
                money.as_ptr(),
                days.as_ptr(),
                descriptions.as_ptr(),
                descriptions.len(),
                ptr::null(),
                false,
            );
            assert!(!handle.is_null());
            assert_eq!(bsi_record_count(handle), 1);

            let key = bsi_record_key(handle, 0);
            assert_eq!(CStr::from_ptr(key).to_str().unwrap(), "JEAN DUPONT");

            let json = bsi_record_json(handle, key);
            let record: serde_json::Value =
                serde_json::from_str(CStr::from_ptr(json).to_str().unwrap()).unwrap();
            assert_eq!(record["worked_days"], 12.0);
            assert_eq!(record["description"]["job_title"], "Technicien");

            assert!(bsi_record_key(handle, 1).is_null());

            let whole = bsi_reconciliation_json(handle);
            assert!(CStr::from_ptr(whole).to_str().unwrap().contains("JEAN DUPONT"));

            bsi_free_string(whole);
            bsi_free_string(json);
            bsi_free_string(key);
            bsi_free_reconciliation(handle);
        }
    }

    #[test]
    fn test_null_description_entry_fails_the_run() {
        let dir = TempDir::new().unwrap();
        let money = c_path(&dir, "money.csv", LEDGER);
        let days = c_path(&dir, "days.csv", DAYS);
        let description = c_path(&dir, "description.csv", DESCRIPTION);
        let descriptions = [description.as_ptr(), ptr::null()];

        unsafe {
            let handle = bsi_reconcile(
                money.as_ptr(),
                days.as_ptr(),
                descriptions.as_ptr(),
                descriptions.len(),
                ptr::null(),
                false,
            );
            assert!(handle.is_null());
        }
    }

    #[test]
    fn test_non_utf8_description_entry_fails_the_run() {
        let dir = TempDir::new().unwrap();
        let money = c_path(&dir, "money.csv", LEDGER);
        let days = c_path(&dir, "days.csv", DAYS);
        let description = c_path(&dir, "description.csv", DESCRIPTION);
        let invalid = CString::new(vec![b'd', 0xE9, b'.', b'c', b's', b'v']).unwrap();
        let descriptions = [invalid.as_ptr(), description.as_ptr()];

        unsafe {
            let handle = bsi_reconcile(
                money.as_ptr(),
                days.as_ptr(),
                descriptions.as_ptr(),
                descriptions.len(),
                ptr::null(),
                false,
            );
            assert!(handle.is_null());
        }
    }

    #[test]
    fn test_null_handle_accessors() {
        unsafe {
            assert_eq!(bsi_record_count(ptr::null()), 0);
            assert!(bsi_record_key(ptr::null(), 0).is_null());
            assert!(bsi_reconciliation_json(ptr::null()).is_null());
            bsi_free_reconciliation(ptr::null_mut());
            bsi_free_string(ptr::null_mut());
        }
    }
}
