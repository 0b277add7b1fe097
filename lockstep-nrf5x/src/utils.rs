//! Small nRF-specific helpers.

use crate::pac;
use lockstep::radio::Pipe;

/// Derives this device's unicast pipe from the factory device id, which is
/// pre-programmed in the FICR (factory information configuration registers).
///
/// Both id words are folded together so boards differing in either word land
/// on different pipes.
pub fn device_pipe() -> Pipe {
    // FICR is read-only, so accessing it directly is safe.
    let ficr = unsafe { &*pac::FICR::ptr() };

    let id = ficr.deviceid[0].read().bits() ^ ficr.deviceid[1].read().bits();
    Pipe::from_device_id(id)
}
