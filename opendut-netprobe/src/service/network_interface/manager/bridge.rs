use rtnetlink::{LinkBridge, LinkUnspec};

use opendut_types::util::net::{MacAddress, NetworkInterfaceName};

use crate::service::network_interface::manager::interface::Interface;
use crate::service::network_interface::manager::{Error, NetworkInterfaceManager};

impl NetworkInterfaceManager {
    /// Creates a bridge without any ports.
    ///
    /// Without an explicit `address`, the kernel assigns a random one at first,
    /// but replaces it with the lowest address among the ports joined later on.
    pub async fn create_empty_bridge(&self, name: &NetworkInterfaceName, address: Option<MacAddress>) -> Result<Interface, Error> {
        self.ensure_name_available(name).await?;

        let mut bridge = LinkBridge::new(&name.name());
        if let Some(address) = address {
            bridge = bridge.address(address.into());
        }

        self.handle
            .link()
            .add(bridge.build())
            .execute().await
            .map_err(|cause| Error::BridgeCreation { name: name.clone(), cause })?;
        let interface = self.try_find_interface(name).await?;
        Ok(interface)
    }

    pub async fn join_interface_to_bridge(&self, interface: &Interface, bridge: &Interface) -> Result<(), Error> {
        self.handle
            .link()
            .set(
                LinkUnspec::new_with_index(interface.index)
                    .controller(bridge.index)
                    .build()
            )
            .execute().await
            .map_err(|cause| Error::JoinInterfaceToBridge {
                interface: Box::new(interface.clone()),
                bridge: Box::new(bridge.clone()),
                cause,
            })?;
        Ok(())
    }
}
