//! Thin RAII layer over the POSIX dynamic-linking facility.
//!
//! Symbols are resolved to opaque addresses for identity comparison only;
//! nothing here is ever called through. The two resolution contexts the
//! detector needs are a specific library handle (`Library::resolve`) and
//! the global scope past the current module (`resolve_next`).

use core::ffi::c_void;
use std::ffi::{CStr, CString};
use std::path::{Path, PathBuf};

use crate::error::{ProbeError, Result};

/// A shared library opened with lazy binding. The handle is released via
/// `dlclose` on drop, on every exit path.
#[derive(Debug)]
pub struct Library {
    handle: *mut c_void,
    path: PathBuf,
}

impl Library {
    /// Open `path` with `RTLD_LAZY`.
    ///
    /// A null handle is an error here, not a value to carry forward:
    /// resolving against an invalid handle produces undefined results.
    pub fn open_lazy(path: &Path) -> Result<Self> {
        let c_path = path_to_cstring(path)?;
        let handle = unsafe { libc::dlopen(c_path.as_ptr(), libc::RTLD_LAZY) };
        if handle.is_null() {
            return Err(ProbeError::Loader {
                path: path.display().to_string(),
                reason: dl_error_message(),
            });
        }
        Ok(Self {
            handle,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolve `symbol` within this library instance.
    pub fn resolve(&self, symbol: &str) -> Result<usize> {
        let c_sym = symbol_to_cstring(symbol)?;
        let p = unsafe { libc::dlsym(self.handle, c_sym.as_ptr()) };
        if p.is_null() {
            Err(ProbeError::SymbolNotFound(symbol.to_string()))
        } else {
            Ok(p as usize)
        }
    }
}

impl Drop for Library {
    fn drop(&mut self) {
        unsafe {
            libc::dlclose(self.handle);
        }
    }
}

/// Resolve the next definition of `symbol` after the current module in the
/// global search order (`dlsym(RTLD_NEXT, ...)`).
///
/// `RTLD_NEXT` is relative to the module containing the caller; this crate
/// links statically into the probing executable, so "current module" is the
/// executable itself and preloaded libraries are still ahead in the order.
pub fn resolve_next(symbol: &str) -> Result<usize> {
    let c_sym = symbol_to_cstring(symbol)?;
    let p = unsafe { libc::dlsym(libc::RTLD_NEXT, c_sym.as_ptr()) };
    if p.is_null() {
        Err(ProbeError::SymbolNotFound(symbol.to_string()))
    } else {
        Ok(p as usize)
    }
}

/// Pathname of the module containing `addr`, via `dladdr`.
pub fn module_for_address(addr: usize) -> Option<String> {
    unsafe {
        let mut info: libc::Dl_info = std::mem::zeroed();
        if libc::dladdr(addr as *const c_void, &mut info) == 0 {
            return None;
        }
        if info.dli_fname.is_null() {
            return None;
        }
        Some(CStr::from_ptr(info.dli_fname).to_string_lossy().into_owned())
    }
}

fn path_to_cstring(path: &Path) -> Result<CString> {
    use std::os::unix::ffi::OsStrExt;
    CString::new(path.as_os_str().as_bytes()).map_err(|_| ProbeError::Loader {
        path: path.display().to_string(),
        reason: "path contains an interior NUL byte".to_string(),
    })
}

fn symbol_to_cstring(symbol: &str) -> Result<CString> {
    CString::new(symbol).map_err(|_| ProbeError::BadSymbolName(symbol.to_string()))
}

fn dl_error_message() -> String {
    unsafe {
        let err = libc::dlerror();
        if err.is_null() {
            "unknown dynamic loader error".to_string()
        } else {
            CStr::from_ptr(err).to_string_lossy().into_owned()
        }
    }
}
