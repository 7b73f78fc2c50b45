//! Spin duration randomness from the ESP32 hardware RNG.

use esp_idf_svc::sys::esp_random;
use rand_core::RngCore;

/// [`RngCore`] over `esp_random`.
///
/// Without the RF subsystem running the output is only pseudo-random, which is
/// fine for picking a spin length.
#[derive(Debug, Default, Clone, Copy)]
pub struct HardwareRng;

impl RngCore for HardwareRng {
    fn next_u32(&mut self) -> u32 {
        // SAFETY: esp_random has no preconditions
        unsafe { esp_random() }
    }

    fn next_u64(&mut self) -> u64 {
        (u64::from(self.next_u32()) << 32) | u64::from(self.next_u32())
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        for chunk in dst.chunks_mut(4) {
            let bytes = self.next_u32().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }
}
