//! Native Windows power requests.
//!
//! Wraps `PowerCreateRequest`/`PowerSetRequest`/`PowerClearRequest`. One
//! request handle carries the system-required request and, when asked, the
//! display-required request as well; clearing removes whichever were set.

use crate::platform::PlatformError;

use windows_sys::Win32::Foundation::{CloseHandle, HANDLE, INVALID_HANDLE_VALUE};
use windows_sys::Win32::System::Power::{
    PowerClearRequest, PowerCreateRequest, PowerRequestDisplayRequired,
    PowerRequestSystemRequired, PowerSetRequest,
};
use windows_sys::Win32::System::Threading::{
    POWER_REQUEST_CONTEXT_SIMPLE_STRING, POWER_REQUEST_CONTEXT_VERSION, REASON_CONTEXT,
    REASON_CONTEXT_0,
};

/// A live OS power request.
pub(crate) struct PowerRequest {
    handle: HANDLE,
    display: bool,
    cleared: bool,
}

// HANDLE is a raw pointer type; the request is only touched from the worker
// thread that created it, and clearing from another thread is valid anyway.
unsafe impl Send for PowerRequest {}

impl PowerRequest {
    /// Create a power request tagged with `reason` and set the
    /// system-required request, plus the display-required request when
    /// `keep_display` is true.
    pub(crate) fn create(reason: &str, keep_display: bool) -> Result<PowerRequest, PlatformError> {
        let mut reason_wide: Vec<u16> = reason.encode_utf16().chain(std::iter::once(0)).collect();
        let context = REASON_CONTEXT {
            Version: POWER_REQUEST_CONTEXT_VERSION,
            Flags: POWER_REQUEST_CONTEXT_SIMPLE_STRING,
            Reason: REASON_CONTEXT_0 {
                SimpleReasonString: reason_wide.as_mut_ptr(),
            },
        };

        // SAFETY: context points to a fully initialized REASON_CONTEXT and
        // the reason string outlives the call (the OS copies it).
        let handle = unsafe { PowerCreateRequest(&context) };
        if handle == INVALID_HANDLE_VALUE {
            return Err(PlatformError::os("PowerCreateRequest"));
        }

        let mut request = PowerRequest {
            handle,
            display: false,
            cleared: false,
        };

        // SAFETY: handle is a valid power request handle.
        if unsafe { PowerSetRequest(handle, PowerRequestSystemRequired) } == 0 {
            let err = PlatformError::os("PowerSetRequest(system)");
            request.close();
            return Err(err);
        }

        if keep_display {
            // SAFETY: handle is a valid power request handle.
            if unsafe { PowerSetRequest(handle, PowerRequestDisplayRequired) } == 0 {
                let err = PlatformError::os("PowerSetRequest(display)");
                request.clear();
                return Err(err);
            }
            request.display = true;
        }

        Ok(request)
    }

    /// Clear whichever requests are set and close the handle. Idempotent.
    pub(crate) fn clear(&mut self) {
        if self.cleared {
            return;
        }
        // SAFETY: handle is valid until closed below; clearing a request
        // that was never set is harmless.
        unsafe {
            if self.display {
                PowerClearRequest(self.handle, PowerRequestDisplayRequired);
            }
            PowerClearRequest(self.handle, PowerRequestSystemRequired);
        }
        self.close();
    }

    fn close(&mut self) {
        if !self.cleared {
            // SAFETY: handle came from PowerCreateRequest and is closed once.
            unsafe { CloseHandle(self.handle) };
            self.cleared = true;
        }
    }
}

impl Drop for PowerRequest {
    fn drop(&mut self) {
        self.clear();
    }
}
