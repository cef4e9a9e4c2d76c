use tracing::debug;

use opendut_types::util::net::{MacAddress, NetworkInterfaceName};

use crate::service::network_interface::manager::interface::Interface;
use crate::service::network_interface::manager::{Error, NetworkInterfaceManagerRef};

/// Which hardware address a newly created bridge starts out with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BridgeAddress {
    /// Assign a random, locally administered address when creating the bridge.
    /// The kernel then keeps it, no matter which ports join.
    Random,
    /// Leave the address to the kernel, which adopts the lowest address among the joined ports.
    KernelAssigned,
}

pub async fn create(
    bridge_name: &NetworkInterfaceName,
    bridge_address: BridgeAddress,
    network_interface_manager: NetworkInterfaceManagerRef,
) -> Result<Interface, Error> {

    let address = match bridge_address {
        BridgeAddress::Random => {
            let address = MacAddress::random()
                .map_err(|cause| Error::RandomBridgeAddress { name: bridge_name.clone(), cause })?;
            Some(address)
        }
        BridgeAddress::KernelAssigned => None,
    };

    match address {
        Some(address) => debug!("Creating bridge '{bridge_name}' with address {address}."),
        None => debug!("Creating bridge '{bridge_name}' with kernel-assigned address."),
    }
    let bridge = network_interface_manager.create_empty_bridge(bridge_name, address).await?;
    network_interface_manager.set_interface_up(&bridge).await?;

    Ok(bridge)
}
