//! Task watchdog registration for the control loop.
//!
//! The loop registers itself as a Task Watchdog Timer (TWDT) user and feeds it
//! once per tick. A stalled loop resets the chip instead of freezing the wheel.

use esp_idf_svc::sys::{
    esp_task_wdt_add_user, esp_task_wdt_delete_user, esp_task_wdt_reset_user,
    esp_task_wdt_user_handle_t, EspError,
};
use log::{debug, warn};
use std::ffi::CStr;

/// A registered watchdog user. Unregisters on drop.
pub struct WatchdogHandle {
    handle: esp_task_wdt_user_handle_t,
    name: &'static CStr,
}

impl WatchdogHandle {
    /// Register a watchdog user called `name` (e.g. `c"wheel_loop"`).
    ///
    /// # Errors
    /// Returns the ESP-IDF error if the TWDT rejects the registration.
    pub fn register(name: &'static CStr) -> Result<Self, EspError> {
        let mut handle: esp_task_wdt_user_handle_t = std::ptr::null_mut();
        // SAFETY: `name` is a valid NUL-terminated string that outlives the handle
        EspError::convert(unsafe { esp_task_wdt_add_user(name.as_ptr(), &mut handle) })?;
        debug!("Watchdog: registered user '{name:?}'");
        Ok(Self { handle, name })
    }

    /// Reset the watchdog timeout for this user
    pub fn feed(&self) {
        // SAFETY: handle came from a successful esp_task_wdt_add_user
        if let Err(e) = EspError::convert(unsafe { esp_task_wdt_reset_user(self.handle) }) {
            warn!("Watchdog: failed to feed '{:?}': {e}", self.name);
        }
    }
}

impl Drop for WatchdogHandle {
    fn drop(&mut self) {
        // SAFETY: handle came from a successful esp_task_wdt_add_user
        if let Err(e) = EspError::convert(unsafe { esp_task_wdt_delete_user(self.handle) }) {
            warn!("Watchdog: failed to unregister '{:?}': {e}", self.name);
        }
    }
}
