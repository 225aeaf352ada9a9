//! Windows native registry operations
//!
//! Uses the Win32 registry API instead of shelling out to `reg.exe`.
//!
//! ## Usage
//!
//! ```ignore
//! let registry = NativeRegistry::new();
//! let value = registry.get_value(
//!     RegistryHive::LocalMachine,
//!     r"SOFTWARE\Policies\Microsoft\Windows\CloudContent",
//!     "DisableWindowsConsumerFeatures",
//! )?;
//! ```
//!
//! ## Value Types
//!
//! | Registry type | `FieldValue` |
//! |---------------|--------------|
//! | `REG_DWORD` | `Dword` |
//! | `REG_SZ`, `REG_EXPAND_SZ` | `String` (not expanded) |
//!
//! Any other type is reported as `UnsupportedType`.

#[cfg(windows)]
use std::ffi::OsStr;
#[cfg(windows)]
use std::os::windows::ffi::OsStrExt;

#[cfg(windows)]
use windows::core::PCWSTR;
#[cfg(windows)]
use windows::Win32::Foundation::{
    ERROR_ACCESS_DENIED, ERROR_FILE_NOT_FOUND, ERROR_PATH_NOT_FOUND, ERROR_SUCCESS, WIN32_ERROR,
};
#[cfg(windows)]
use windows::Win32::System::Registry::{
    RegCloseKey, RegCreateKeyExW, RegGetValueW, RegSetValueExW, HKEY, HKEY_CURRENT_USER,
    HKEY_LOCAL_MACHINE, KEY_SET_VALUE, REG_DWORD, REG_EXPAND_SZ, REG_OPTION_NON_VOLATILE, REG_SZ,
    REG_ROUTINE_FLAGS, REG_VALUE_TYPE, RRF_NOEXPAND, RRF_RT_ANY,
};

use thiserror::Error;

use crate::types::{FieldValue, RegistryHive};

/// Error type for registry operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// No registry on this host
    #[error("registry access is not available on this platform")]
    Unsupported,

    #[error("access denied: {0}")]
    AccessDenied(String),

    #[error("unsupported registry value type {value_type} at {path}")]
    UnsupportedType { path: String, value_type: u32 },

    #[error("registry call failed for {path} (error {code})")]
    Os { path: String, code: u32 },
}

/// Read/write access to registry values
///
/// `get_value` returns `Ok(None)` when either the key or the value is
/// absent. `set_value` creates the key path when it does not exist.
pub trait RegistryBackend {
    fn get_value(
        &self,
        hive: RegistryHive,
        key_path: &str,
        value_name: &str,
    ) -> Result<Option<FieldValue>, RegistryError>;

    fn set_value(
        &self,
        hive: RegistryHive,
        key_path: &str,
        value_name: &str,
        value: &FieldValue,
    ) -> Result<(), RegistryError>;
}

impl<T: RegistryBackend + ?Sized> RegistryBackend for std::sync::Arc<T> {
    fn get_value(
        &self,
        hive: RegistryHive,
        key_path: &str,
        value_name: &str,
    ) -> Result<Option<FieldValue>, RegistryError> {
        (**self).get_value(hive, key_path, value_name)
    }

    fn set_value(
        &self,
        hive: RegistryHive,
        key_path: &str,
        value_name: &str,
        value: &FieldValue,
    ) -> Result<(), RegistryError> {
        (**self).set_value(hive, key_path, value_name, value)
    }
}

/// Registry backend for the local host
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeRegistry;

impl NativeRegistry {
    pub fn new() -> Self {
        Self
    }
}

fn display_path(hive: RegistryHive, key_path: &str, value_name: &str) -> String {
    format!("{}\\{}\\{}", hive, key_path, value_name)
}

// ============================================================================
// Windows Implementation
// ============================================================================

/// Convert a Rust string to a null-terminated wide string
#[cfg(windows)]
fn to_wide_string(s: &str) -> Vec<u16> {
    OsStr::new(s)
        .encode_wide()
        .chain(std::iter::once(0))
        .collect()
}

#[cfg(windows)]
fn root_key(hive: RegistryHive) -> HKEY {
    match hive {
        RegistryHive::LocalMachine => HKEY_LOCAL_MACHINE,
        RegistryHive::CurrentUser => HKEY_CURRENT_USER,
    }
}

#[cfg(windows)]
fn check_status(status: WIN32_ERROR, path: &str) -> Result<(), RegistryError> {
    if status == ERROR_SUCCESS {
        Ok(())
    } else if status == ERROR_ACCESS_DENIED {
        Err(RegistryError::AccessDenied(path.to_string()))
    } else {
        Err(RegistryError::Os {
            path: path.to_string(),
            code: status.0,
        })
    }
}

/// Decode REG_SZ bytes (UTF-16LE, possibly null-terminated)
#[cfg(any(windows, test))]
fn decode_reg_sz(bytes: &[u8]) -> String {
    let wide: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .take_while(|&c| c != 0)
        .collect();
    String::from_utf16_lossy(&wide)
}

/// Encode a value as (registry type code, raw bytes)
#[cfg(any(windows, test))]
fn encode_value(value: &FieldValue) -> (u32, Vec<u8>) {
    const REG_SZ_CODE: u32 = 1;
    const REG_DWORD_CODE: u32 = 4;
    match value {
        FieldValue::Dword(v) => (REG_DWORD_CODE, v.to_le_bytes().to_vec()),
        FieldValue::String(s) => {
            let bytes = s
                .encode_utf16()
                .chain(std::iter::once(0))
                .flat_map(|c| c.to_le_bytes())
                .collect();
            (REG_SZ_CODE, bytes)
        }
    }
}

/// Any value type, with `REG_EXPAND_SZ` returned unexpanded
#[cfg(windows)]
const READ_FLAGS: REG_ROUTINE_FLAGS = REG_ROUTINE_FLAGS(RRF_RT_ANY.0 | RRF_NOEXPAND.0);

#[cfg(windows)]
impl RegistryBackend for NativeRegistry {
    fn get_value(
        &self,
        hive: RegistryHive,
        key_path: &str,
        value_name: &str,
    ) -> Result<Option<FieldValue>, RegistryError> {
        let path = display_path(hive, key_path, value_name);
        let key_w = to_wide_string(key_path);
        let name_w = to_wide_string(value_name);

        let mut value_type = REG_VALUE_TYPE::default();
        let mut size: u32 = 0;

        // First call to get the buffer size
        let status = unsafe {
            RegGetValueW(
                root_key(hive),
                PCWSTR(key_w.as_ptr()),
                PCWSTR(name_w.as_ptr()),
                READ_FLAGS,
                Some(&mut value_type as *mut REG_VALUE_TYPE),
                None,
                Some(&mut size as *mut u32),
            )
        };

        if status == ERROR_FILE_NOT_FOUND || status == ERROR_PATH_NOT_FOUND {
            return Ok(None);
        }
        check_status(status, &path)?;

        let mut buffer: Vec<u8> = vec![0; size as usize];
        let status = unsafe {
            RegGetValueW(
                root_key(hive),
                PCWSTR(key_w.as_ptr()),
                PCWSTR(name_w.as_ptr()),
                READ_FLAGS,
                Some(&mut value_type as *mut REG_VALUE_TYPE),
                Some(buffer.as_mut_ptr() as *mut std::ffi::c_void),
                Some(&mut size as *mut u32),
            )
        };

        if status == ERROR_FILE_NOT_FOUND || status == ERROR_PATH_NOT_FOUND {
            return Ok(None);
        }
        check_status(status, &path)?;
        buffer.truncate(size as usize);

        if value_type == REG_DWORD {
            let bytes: [u8; 4] = buffer
                .get(..4)
                .and_then(|b| b.try_into().ok())
                .ok_or(RegistryError::UnsupportedType {
                    path: path.clone(),
                    value_type: value_type.0,
                })?;
            Ok(Some(FieldValue::Dword(u32::from_le_bytes(bytes))))
        } else if value_type == REG_SZ || value_type == REG_EXPAND_SZ {
            Ok(Some(FieldValue::String(decode_reg_sz(&buffer))))
        } else {
            Err(RegistryError::UnsupportedType {
                path,
                value_type: value_type.0,
            })
        }
    }

    fn set_value(
        &self,
        hive: RegistryHive,
        key_path: &str,
        value_name: &str,
        value: &FieldValue,
    ) -> Result<(), RegistryError> {
        let path = display_path(hive, key_path, value_name);
        let key_w = to_wide_string(key_path);
        let name_w = to_wide_string(value_name);

        let mut key = HKEY::default();
        let status = unsafe {
            RegCreateKeyExW(
                root_key(hive),
                PCWSTR(key_w.as_ptr()),
                0,
                PCWSTR::null(),
                REG_OPTION_NON_VOLATILE,
                KEY_SET_VALUE,
                None,
                &mut key,
                None,
            )
        };
        check_status(status, &path)?;

        let (type_code, data) = encode_value(value);
        let status = unsafe {
            RegSetValueExW(
                key,
                PCWSTR(name_w.as_ptr()),
                0,
                REG_VALUE_TYPE(type_code),
                Some(&data),
            )
        };

        unsafe {
            let _ = RegCloseKey(key);
        }

        check_status(status, &path)
    }
}

// ============================================================================
// Other Platforms
// ============================================================================

#[cfg(not(windows))]
impl RegistryBackend for NativeRegistry {
    fn get_value(
        &self,
        hive: RegistryHive,
        key_path: &str,
        value_name: &str,
    ) -> Result<Option<FieldValue>, RegistryError> {
        log::debug!(
            "Registry read of {} skipped: not a Windows host",
            display_path(hive, key_path, value_name)
        );
        Err(RegistryError::Unsupported)
    }

    fn set_value(
        &self,
        _hive: RegistryHive,
        _key_path: &str,
        _value_name: &str,
        _value: &FieldValue,
    ) -> Result<(), RegistryError> {
        Err(RegistryError::Unsupported)
    }
}
