use tracing::debug;

use opendut_types::util::net::NetworkInterfaceName;

use crate::service::network_interface::manager::interface::Interface;
use crate::service::network_interface::manager::{Error, NetworkInterfaceManagerRef};

pub async fn create(
    tap_name: &NetworkInterfaceName,
    network_interface_manager: NetworkInterfaceManagerRef,
) -> Result<Interface, Error> {

    debug!("Creating TAP interface '{tap_name}'.");
    let tap = network_interface_manager.create_tap_interface(tap_name).await?;
    network_interface_manager.set_interface_up(&tap).await?;

    Ok(tap)
}
