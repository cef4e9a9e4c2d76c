//! Joins interfaces to a bridge and watches what happens to the hardware addresses.
//!
//! The kernel may change the address of a bridge when ports join it, see:
//! - <https://backreference.org/2010/07/28/linux-bridge-mac-addresses-and-dynamic-ports/>
//! - <https://lists.linuxfoundation.org/pipermail/bridge/2010-May/007204.html>
//!
//! Addresses are always re-read from the kernel by interface index, since an
//! [`Interface`] obtained earlier does not reflect these changes.

use std::fmt;

use tracing::{error, info, warn};

use opendut_types::util::net::{MacAddress, NetworkInterfaceName};

use crate::service::network_interface::manager::interface::Interface;
use crate::service::network_interface::manager::{Error, NetworkInterfaceManagerRef};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttachStage {
    PreAttach,
    PostAttach,
}

impl fmt::Display for AttachStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttachStage::PreAttach => write!(f, "Pre-attach"),
            AttachStage::PostAttach => write!(f, "Post-attach"),
        }
    }
}

/// An anomaly observed while attaching. Never a reason to abort the probe.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Finding {
    /// Interface and bridge share the same hardware address.
    DuplicateAddress {
        stage: AttachStage,
        interface: NetworkInterfaceName,
        bridge: NetworkInterfaceName,
        address: MacAddress,
    },
    /// The attached interface itself changed its hardware address.
    AddressChanged {
        interface: NetworkInterfaceName,
        before: MacAddress,
        after: MacAddress,
    },
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Finding::DuplicateAddress { stage, interface, bridge, address } =>
                write!(f, "{stage}: Duplicate MAC address {address} on interface '{interface}' and bridge '{bridge}'"),
            Finding::AddressChanged { interface, before, after } =>
                write!(f, "'{interface}' changed MAC address: {before} -> {after}"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AddressObservation {
    pub before: MacAddress,
    pub after: MacAddress,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttachmentReport {
    pub interface: AddressObservation,
    pub bridge: AddressObservation,
    pub findings: Vec<Finding>,
}

/// Joins `interface` to `bridge`, comparing hardware addresses before and after.
///
/// Findings are logged as they are observed and returned in the report.
/// Only a failure to talk to the kernel results in an `Err`.
pub async fn attach(
    interface: &Interface,
    bridge: &Interface,
    network_interface_manager: NetworkInterfaceManagerRef,
) -> Result<AttachmentReport, Error> {
    let mut findings = Vec::new();

    let interface_before = read_address(AttachStage::PreAttach, interface, &network_interface_manager).await?;
    let bridge_before = read_address(AttachStage::PreAttach, bridge, &network_interface_manager).await?;

    if let Some(finding) = check_duplicate(AttachStage::PreAttach, &interface.name, &bridge.name, interface_before, bridge_before) {
        warn!("{finding}");
        findings.push(finding);
    }

    info!("Joining interface {interface} to bridge {bridge}.");
    network_interface_manager.join_interface_to_bridge(interface, bridge).await?;

    let interface_after = read_address(AttachStage::PostAttach, interface, &network_interface_manager).await?;
    let bridge_after = read_address(AttachStage::PostAttach, bridge, &network_interface_manager).await?;

    if let Some(finding) = check_changed(&interface.name, interface_before, interface_after) {
        error!("{finding}");
        findings.push(finding);
    }

    if let Some(finding) = check_duplicate(AttachStage::PostAttach, &interface.name, &bridge.name, interface_after, bridge_after) {
        error!("{finding}");
        findings.push(finding);
    }

    Ok(AttachmentReport {
        interface: AddressObservation { before: interface_before, after: interface_after },
        bridge: AddressObservation { before: bridge_before, after: bridge_after },
        findings,
    })
}

async fn read_address(
    stage: AttachStage,
    interface: &Interface,
    network_interface_manager: &NetworkInterfaceManagerRef,
) -> Result<MacAddress, Error> {
    let address = network_interface_manager.read_hardware_address(interface).await?;
    info!("{stage} '{}' MAC address: {address}", interface.name);
    Ok(address)
}

fn check_duplicate(
    stage: AttachStage,
    interface: &NetworkInterfaceName,
    bridge: &NetworkInterfaceName,
    interface_address: MacAddress,
    bridge_address: MacAddress,
) -> Option<Finding> {
    (interface_address == bridge_address).then(|| Finding::DuplicateAddress {
        stage,
        interface: interface.clone(),
        bridge: bridge.clone(),
        address: interface_address,
    })
}

fn check_changed(
    interface: &NetworkInterfaceName,
    before: MacAddress,
    after: MacAddress,
) -> Option<Finding> {
    (before != after).then(|| Finding::AddressChanged {
        interface: interface.clone(),
        before,
        after,
    })
}
