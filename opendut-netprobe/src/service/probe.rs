use std::sync::Arc;

use tracing::warn;

use opendut_types::util::net::{NetworkInterfaceName, NetworkInterfaceNameError};

use crate::service::attachment::{self, AttachmentReport, Finding};
use crate::service::network_interface::bridge::{self, BridgeAddress};
use crate::service::network_interface::manager::{self, NetworkInterfaceManager, NetworkInterfaceManagerRef};
use crate::service::network_interface::tap;

pub const FIRST_TAP_NAME: &str = "nltest_tp0";
pub const SECOND_TAP_NAME: &str = "nltest_tp1";
pub const BRIDGE_NAME: &str = "nltest_br0";

#[derive(Clone, Debug)]
pub struct ProbeSummary {
    pub first_attachment: AttachmentReport,
    pub second_attachment: AttachmentReport,
}

impl ProbeSummary {
    pub fn findings(&self) -> impl Iterator<Item=&Finding> {
        self.first_attachment.findings.iter()
            .chain(&self.second_attachment.findings)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid interface name: {0}")]
    InterfaceName(#[from] NetworkInterfaceNameError),
    #[error(transparent)]
    NetworkInterface(#[from] manager::Error),
}

/// Creates two TAP interfaces and a bridge, then joins both interfaces to the bridge, one after another.
///
/// The interfaces are left in place afterwards. Running the probe a second time fails,
/// unless they have been deleted in the meantime.
pub async fn run() -> Result<ProbeSummary, Error> {
    let network_interface_manager: NetworkInterfaceManagerRef = Arc::new(NetworkInterfaceManager::create()?);

    let first_tap_name = NetworkInterfaceName::try_from(FIRST_TAP_NAME)?;
    let second_tap_name = NetworkInterfaceName::try_from(SECOND_TAP_NAME)?;
    let bridge_name = NetworkInterfaceName::try_from(BRIDGE_NAME)?;

    let first_tap = tap::create(&first_tap_name, network_interface_manager.clone()).await?;
    let second_tap = tap::create(&second_tap_name, network_interface_manager.clone()).await?;
    let bridge = bridge::create(&bridge_name, BridgeAddress::Random, network_interface_manager.clone()).await?;

    announce_attachment("first");
    let first_attachment = attachment::attach(&first_tap, &bridge, network_interface_manager.clone()).await?;

    announce_attachment("second");
    let second_attachment = attachment::attach(&second_tap, &bridge, network_interface_manager).await?;

    Ok(ProbeSummary {
        first_attachment,
        second_attachment,
    })
}

/// Marks the steps of the scenario at WARN, so they remain visible when only problems are logged.
fn announce_attachment(ordinal: &str) {
    warn!("Attach {ordinal} adapter to bridge");
}
