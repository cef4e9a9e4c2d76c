use std::fs::OpenOptions;
use std::io;
use std::os::fd::AsRawFd;

use nix::libc;

use opendut_types::util::net::NetworkInterfaceName;

use crate::service::network_interface::manager::interface::Interface;
use crate::service::network_interface::manager::{Error, NetworkInterfaceManager};

const TUN_DEVICE_PATH: &str = "/dev/net/tun";

impl NetworkInterfaceManager {
    /// Creates a persistent TAP interface, which outlives this process.
    pub async fn create_tap_interface(&self, name: &NetworkInterfaceName) -> Result<Interface, Error> {
        self.ensure_name_available(name).await?;

        create_persistent_tap(name)
            .map_err(|cause| Error::TapCreation { name: name.clone(), cause })?;

        let interface = self.try_find_interface(name).await?;
        Ok(interface)
    }
}

mod ioctl {
    use super::TapRequest;

    // Sets name and mode of the device behind the file descriptor, creating it if necessary.
    nix::ioctl_write_ptr_bad!(tunsetiff, nix::request_code_write!(b'T', 202, std::mem::size_of::<nix::libc::c_int>()), TapRequest);

    // Keeps the device when the last file descriptor to it is closed.
    nix::ioctl_write_int!(tunsetpersist, b'T', 203);
}

/// Layout of `struct ifreq` from `linux/if.h`, restricted to the flags member of its union.
#[repr(C)]
pub(crate) struct TapRequest {
    name: [libc::c_char; libc::IFNAMSIZ],
    flags: libc::c_short,
    padding: [u8; 22],
}

impl TapRequest {
    fn new(name: &NetworkInterfaceName) -> Self {
        // IFF_TUN_EXCL makes the kernel refuse to attach to an already existing device.
        let flags = libc::IFF_TAP | libc::IFF_NO_PI | libc::IFF_TUN_EXCL;

        let mut request = Self {
            name: [0; libc::IFNAMSIZ],
            flags: flags as libc::c_short,
            padding: [0; 22],
        };
        // NetworkInterfaceName is at most IFNAMSIZ - 1 bytes, so the name stays null-terminated.
        for (target, byte) in request.name.iter_mut().zip(name.name().bytes()) {
            *target = byte as libc::c_char;
        }
        request
    }
}

fn create_persistent_tap(name: &NetworkInterfaceName) -> Result<(), TapError> {
    let device = OpenOptions::new()
        .read(true)
        .write(true)
        .open(TUN_DEVICE_PATH)
        .map_err(|cause| TapError::OpenDevice { cause })?;

    let request = TapRequest::new(name);

    unsafe { ioctl::tunsetiff(device.as_raw_fd(), &request) }
        .map_err(|cause| TapError::SetInterface { cause })?;

    unsafe { ioctl::tunsetpersist(device.as_raw_fd(), 1) }
        .map_err(|cause| TapError::SetPersistent { cause })?;

    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum TapError {
    #[error("Could not open '/dev/net/tun': {cause}")]
    OpenDevice { cause: io::Error },
    #[error("Kernel refused to create the device: {cause}")]
    SetInterface { cause: nix::Error },
    #[error("Kernel refused to make the device persistent: {cause}")]
    SetPersistent { cause: nix::Error },
}
