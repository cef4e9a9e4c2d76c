use std::fmt::Formatter;

use rtnetlink::packet_route::link::{LinkAttribute, LinkFlags, LinkMessage};

use opendut_types::util::net::{NetworkInterfaceName, NetworkInterfaceNameError};

/// Snapshot of a link, as reported by the kernel at the time of the request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Interface {
    pub index: u32,
    pub name: NetworkInterfaceName,
    /// interface joined to a bridge with given index
    pub controller_index: Option<u32>,
    /// link-layer address, not necessarily 6 bytes long for every kind of link
    pub hardware_address: Option<Vec<u8>>,
    pub link_flags: LinkFlags,
}

impl Interface {
    pub fn is_up(&self) -> bool {
        self.link_flags.contains(LinkFlags::Up)
    }
}

impl std::fmt::Display for Interface {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}: {}]", self.index, self.name)
    }
}


#[derive(thiserror::Error, Debug)]
pub enum NetlinkConversionError {
    #[error("Could not find name attribute!")]
    NameAttributeNotFound,
    #[error("Could not parse interface name!")]
    NetworkInterfaceName(#[from] NetworkInterfaceNameError),
}

impl TryFrom<LinkMessage> for Interface {
    type Error = NetlinkConversionError;

    fn try_from(link_message: LinkMessage) -> Result<Self, Self::Error> {
        let index = link_message.header.index;
        let interface_name = link_message.attributes.iter()
            .find_map(|nla| match nla {
                LinkAttribute::IfName(name) => Some(name),
                _ => None,
            })
            .cloned()
            .ok_or(NetlinkConversionError::NameAttributeNotFound)?;
        let name = NetworkInterfaceName::try_from(interface_name)?;

        let controller_index = find_controller_index(&link_message.attributes);
        let hardware_address = find_hardware_address(&link_message.attributes);

        Ok(Self {
            index,
            name,
            controller_index,
            hardware_address,
            link_flags: link_message.header.flags,
        })
    }
}

fn find_controller_index(attributes: &[LinkAttribute]) -> Option<u32> {
    attributes.iter().find_map(|link_attribute| {
        if let LinkAttribute::Controller(index) = link_attribute {
            Some(*index)
        } else {
            None
        }
    })
}

fn find_hardware_address(attributes: &[LinkAttribute]) -> Option<Vec<u8>> {
    attributes.iter().find_map(|link_attribute| {
        if let LinkAttribute::Address(address) = link_attribute {
            Some(address.clone())
        } else {
            None
        }
    })
}


#[cfg(test)]
mod tests {
    use googletest::prelude::*;

    use super::*;

    fn link_message(index: u32, attributes: Vec<LinkAttribute>) -> LinkMessage {
        let mut link_message = LinkMessage::default();
        link_message.header.index = index;
        link_message.header.flags = LinkFlags::Up | LinkFlags::Broadcast;
        link_message.attributes = attributes;
        link_message
    }

    #[test]
    fn An_Interface_should_be_read_from_a_LinkMessage() -> Result<()> {
        let message = link_message(7, vec![
            LinkAttribute::IfName(String::from("nltest_tp0")),
            LinkAttribute::Address(vec![0x02, 0x11, 0x22, 0x33, 0x44, 0x55]),
            LinkAttribute::Controller(9),
        ]);

        let interface = Interface::try_from(message)?;

        assert_that!(interface.index, eq(7));
        assert_that!(interface.name.name(), eq("nltest_tp0"));
        assert_that!(interface.controller_index, some(eq(9)));
        assert_that!(interface.hardware_address, some(eq(vec![0x02, 0x11, 0x22, 0x33, 0x44, 0x55])));
        assert_that!(interface.is_up(), eq(true));
        Ok(())
    }

    #[test]
    fn An_Interface_without_controller_or_address_should_report_none() -> Result<()> {
        let message = link_message(3, vec![
            LinkAttribute::IfName(String::from("nltest_br0")),
        ]);

        let interface = Interface::try_from(message)?;

        assert_that!(interface.controller_index, none());
        assert_that!(interface.hardware_address, none());
        Ok(())
    }

    #[test]
    fn A_LinkMessage_without_name_should_not_convert_to_an_Interface() -> Result<()> {
        let message = link_message(5, vec![
            LinkAttribute::Address(vec![0x02, 0x11, 0x22, 0x33, 0x44, 0x55]),
        ]);

        assert!(matches!(
            Interface::try_from(message),
            Err(NetlinkConversionError::NameAttributeNotFound)
        ));
        Ok(())
    }
}
