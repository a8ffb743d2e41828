//! FFI bindings for ShiftFlux
//!
//! This module provides C-compatible functions for calling ShiftFlux from other languages.
//! All functions use C strings (null-terminated) and return allocated memory that
//! must be freed by the caller using `shiftflux_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::cards::CardRegistry;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::pipeline::{process_json, ShiftProcessor};

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Set the last error message
fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Clear the last error message
fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Read a required string argument, recording an error when absent
unsafe fn required_arg(ptr: *const c_char, name: &str) -> Option<String> {
    let value = cstr_to_string(ptr);
    if value.is_none() {
        set_last_error(&format!("Invalid {} string pointer", name));
    }
    value
}

/// Read an optional string argument; NULL means "not given".
///
/// The outer `None` signals an error that has already been recorded.
unsafe fn optional_arg(ptr: *const c_char, name: &str) -> Option<Option<String>> {
    if ptr.is_null() {
        return Some(None);
    }
    required_arg(ptr, name).map(Some)
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Convert a JSON result into an owned C string, or NULL with the error recorded
fn json_result_to_cstr(result: Result<String, EngineError>) -> *mut c_char {
    match result {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

fn parse_config(json: Option<&str>) -> Result<Option<EngineConfig>, EngineError> {
    json.map(EngineConfig::from_json).transpose()
}

// ============================================================================
// Stateless API
// ============================================================================

/// Run the pipeline over JSON records and cards, returning the output JSON.
///
/// # Safety
/// - `records` and `cards` must be valid null-terminated C strings.
/// - `config` may be NULL for default tunables.
/// - Returns a newly allocated string that must be freed with `shiftflux_free_string`.
/// - Returns NULL on error; call `shiftflux_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn shiftflux_process_json(
    records: *const c_char,
    cards: *const c_char,
    config: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let Some(records) = required_arg(records, "records") else {
        return ptr::null_mut();
    };
    let Some(cards) = required_arg(cards, "cards") else {
        return ptr::null_mut();
    };
    let Some(config) = optional_arg(config, "config") else {
        return ptr::null_mut();
    };

    json_result_to_cstr(process_json(&records, &cards, config.as_deref()))
}

// ============================================================================
// Stateful Processor API
// ============================================================================

/// Opaque handle to a ShiftProcessor
pub struct ShiftProcessorHandle {
    processor: ShiftProcessor,
}

/// Create a new ShiftProcessor from a card registry and optional config.
///
/// # Safety
/// - `cards` must be a valid null-terminated C string; `config` may be NULL.
/// - Returns a pointer to a newly allocated ShiftProcessor.
/// - Must be freed with `shiftflux_processor_free`.
/// - Returns NULL on error; call `shiftflux_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn shiftflux_processor_new(
    cards: *const c_char,
    config: *const c_char,
) -> *mut ShiftProcessorHandle {
    clear_last_error();

    let Some(cards) = required_arg(cards, "cards") else {
        return ptr::null_mut();
    };
    let Some(config) = optional_arg(config, "config") else {
        return ptr::null_mut();
    };

    let processor = CardRegistry::from_json(&cards).and_then(|registry| {
        let config = parse_config(config.as_deref())?.unwrap_or_default();
        ShiftProcessor::with_config(config, registry)
    });

    match processor {
        Ok(processor) => Box::into_raw(Box::new(ShiftProcessorHandle { processor })),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Free a ShiftProcessor.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `shiftflux_processor_new`.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn shiftflux_processor_free(processor: *mut ShiftProcessorHandle) {
    if !processor.is_null() {
        drop(Box::from_raw(processor));
    }
}

/// Process JSON records with a stateful processor, caching them for reprocessing.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `shiftflux_processor_new`.
/// - `records` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with `shiftflux_free_string`.
/// - Returns NULL on error; call `shiftflux_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn shiftflux_processor_process(
    processor: *mut ShiftProcessorHandle,
    records: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return ptr::null_mut();
    }

    let handle = &mut *processor;

    let Some(records) = required_arg(records, "records") else {
        return ptr::null_mut();
    };

    json_result_to_cstr(handle.processor.process_json(&records))
}

/// Rerun the cached input, optionally replacing cards and/or config first.
///
/// # Safety
/// - `processor` must be a valid pointer returned by `shiftflux_processor_new`.
/// - `cards` and `config` may each be NULL to keep the current value.
/// - Returns a newly allocated string that must be freed with `shiftflux_free_string`.
/// - Returns NULL on error; call `shiftflux_last_error` to get the error message.
#[no_mangle]
pub unsafe extern "C" fn shiftflux_processor_reprocess(
    processor: *mut ShiftProcessorHandle,
    cards: *const c_char,
    config: *const c_char,
) -> *mut c_char {
    clear_last_error();

    if processor.is_null() {
        set_last_error("Null processor pointer");
        return ptr::null_mut();
    }

    let handle = &mut *processor;

    let Some(cards) = optional_arg(cards, "cards") else {
        return ptr::null_mut();
    };
    let Some(config) = optional_arg(config, "config") else {
        return ptr::null_mut();
    };

    json_result_to_cstr(reprocess_json(
        &mut handle.processor,
        cards.as_deref(),
        config.as_deref(),
    ))
}

fn reprocess_json(
    processor: &mut ShiftProcessor,
    cards: Option<&str>,
    config: Option<&str>,
) -> Result<String, EngineError> {
    let registry = cards.map(CardRegistry::from_json).transpose()?;
    let config = parse_config(config)?;
    let output = processor.reprocess(config, registry)?;
    Ok(serde_json::to_string(&output)?)
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free a string returned by ShiftFlux functions.
///
/// # Safety
/// - `ptr` must be a valid pointer returned by a ShiftFlux function, or NULL.
/// - After calling this function, the pointer is invalid.
#[no_mangle]
pub unsafe extern "C" fn shiftflux_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Get the last error message.
///
/// # Safety
/// - Returns a pointer to a thread-local error string.
/// - The returned pointer is valid until the next ShiftFlux function call on this thread.
/// - Do NOT free the returned pointer.
/// - Returns NULL if no error occurred.
#[no_mangle]
pub unsafe extern "C" fn shiftflux_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(cstr) => cstr.as_ptr(),
        None => ptr::null(),
    })
}

// ============================================================================
// Version Information
// ============================================================================

/// Get the ShiftFlux library version.
///
/// # Safety
/// - Returns a pointer to a static string. Do NOT free.
#[no_mangle]
pub unsafe extern "C" fn shiftflux_version() -> *const c_char {
    static VERSION: &[u8] = concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes();
    VERSION.as_ptr() as *const c_char
}
