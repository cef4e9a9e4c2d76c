use std::io;
use std::sync::Arc;

use futures::TryStreamExt;
use rtnetlink::LinkUnspec;
use tracing::warn;

use opendut_types::util::net::{MacAddress, MacAddressError, NetworkInterfaceName};

use crate::service::network_interface::manager::interface::{Interface, NetlinkConversionError};
pub use crate::service::network_interface::manager::tap::TapError;

mod bridge;
pub mod interface;
mod tap;

pub type NetworkInterfaceManagerRef = Arc<NetworkInterfaceManager>;

pub struct NetworkInterfaceManager {
    handle: rtnetlink::Handle,
}
impl NetworkInterfaceManager {
    /// Opens a netlink connection, which is driven by a task on the current tokio runtime.
    pub fn create() -> Result<Self, Error> {
        let (connection, handle, _) = rtnetlink::new_connection()
            .map_err(|cause| Error::Connecting { cause })?;
        tokio::spawn(connection);

        Ok(Self { handle })
    }

    pub async fn list_interfaces(&self) -> Result<Vec<Interface>, Error> {
        let interfaces = self.handle
            .link()
            .get()
            .execute()
            .try_collect::<Vec<_>>().await
            .map_err(|cause| Error::ListInterfaces { cause })?
            .into_iter()
            .filter_map(|link_message| {
                let index = link_message.header.index;
                Interface::try_from(link_message)
                    .inspect_err(|cause| warn!("Could not determine attributes of interface with index '{index}': {cause}"))
                    .ok()
            })
            .collect::<Vec<_>>();
        Ok(interfaces)
    }

    pub async fn find_interface(&self, name: &NetworkInterfaceName) -> Result<Option<Interface>, Error> {
        let interfaces = self.list_interfaces().await?;
        let maybe_interface = interfaces.into_iter().find(|interface| interface.name == *name);
        Ok(maybe_interface)
    }

    pub async fn try_find_interface(&self, name: &NetworkInterfaceName) -> Result<Interface, Error> {
        self.find_interface(name).await?
            .ok_or(Error::InterfaceNotFound { name: name.clone() })
    }

    /// Fetches the current state of the given interface from the kernel, by its index.
    ///
    /// The passed [`Interface`] is only used for its index; its other fields may be outdated,
    /// since the kernel modifies links on its own, e.g. when they join a bridge.
    pub async fn refresh_interface(&self, interface: &Interface) -> Result<Interface, Error> {
        let index = interface.index;
        let link_message = self.handle
            .link()
            .get()
            .match_index(index)
            .execute()
            .try_next().await
            .map_err(|cause| Error::InterfaceLookup { index, cause })?
            .ok_or(Error::InterfaceIndexNotFound { index })?;

        Interface::try_from(link_message)
            .map_err(|cause| Error::InterfaceAttributes { index, cause })
    }

    pub async fn read_hardware_address(&self, interface: &Interface) -> Result<MacAddress, Error> {
        let current = self.refresh_interface(interface).await?;

        let address = current.hardware_address.as_deref()
            .ok_or_else(|| Error::HardwareAddressMissing { interface: Box::new(current.clone()) })?;

        MacAddress::try_from(address)
            .map_err(|cause| Error::HardwareAddress { interface: Box::new(current.clone()), cause })
    }

    pub async fn set_interface_up(&self, interface: &Interface) -> Result<(), Error> {
        self.handle
            .link()
            .set(
                LinkUnspec::new_with_index(interface.index)
                    .up()
                    .build()
            )
            .execute().await
            .map_err(|cause| Error::SetInterfaceUp { interface: Box::new(interface.clone()), cause })?;
        Ok(())
    }

    pub async fn delete_interface(&self, interface: &Interface) -> Result<(), Error> {
        self.handle
            .link()
            .del(interface.index)
            .execute().await
            .map_err(|cause| Error::DeleteInterface { interface: Box::new(interface.clone()), cause })?;
        Ok(())
    }

    async fn ensure_name_available(&self, name: &NetworkInterfaceName) -> Result<(), Error> {
        match self.find_interface(name).await? {
            Some(_) => Err(Error::InterfaceAlreadyExists { name: name.clone() }),
            None => Ok(()),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failure while creating bridge '{name}': {cause}")]
    BridgeCreation { name: NetworkInterfaceName, cause: rtnetlink::Error },
    #[error("Failed to generate a hardware address for bridge '{name}': {cause}")]
    RandomBridgeAddress { name: NetworkInterfaceName, cause: MacAddressError },
    #[error("Failure while creating TAP interface '{name}': {cause}")]
    TapCreation { name: NetworkInterfaceName, cause: TapError },
    #[error("Interface with name '{name}' already exists.")]
    InterfaceAlreadyExists { name: NetworkInterfaceName },
    #[error("Failed to establish connection to netlink: {cause}")]
    Connecting { cause: io::Error },
    #[error("Failure while deleting interface {interface}: {cause}")]
    DeleteInterface { interface: Box<Interface>, cause: rtnetlink::Error },
    #[error("Interface with name '{name}' not found.")]
    InterfaceNotFound { name: NetworkInterfaceName },
    #[error("Failure while looking up interface with index '{index}': {cause}")]
    InterfaceLookup { index: u32, cause: rtnetlink::Error },
    #[error("Interface with index '{index}' not found.")]
    InterfaceIndexNotFound { index: u32 },
    #[error("Could not determine attributes of interface with index '{index}': {cause}")]
    InterfaceAttributes { index: u32, cause: NetlinkConversionError },
    #[error("Interface {interface} has no hardware address.")]
    HardwareAddressMissing { interface: Box<Interface> },
    #[error("Interface {interface} reports an unexpected hardware address: {cause}")]
    HardwareAddress { interface: Box<Interface>, cause: MacAddressError },
    #[error("Failure while listing interfaces: {cause}")]
    ListInterfaces { cause: rtnetlink::Error },
    #[error("Failure while setting interface {interface} to state 'up': {cause}")]
    SetInterfaceUp { interface: Box<Interface>, cause: rtnetlink::Error },
    #[error("Failure while joining interface {interface} to bridge {bridge}: {cause}")]
    JoinInterfaceToBridge { interface: Box<Interface>, bridge: Box<Interface>, cause: rtnetlink::Error },
}
