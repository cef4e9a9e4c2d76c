use std::process::Command;
use std::sync::Arc;

use opendut_netprobe::service::network_interface::manager::{NetworkInterfaceManager, NetworkInterfaceManagerRef};
use opendut_netprobe::service::network_interface::tap;
use opendut_netprobe::service::probe::{BRIDGE_NAME, FIRST_TAP_NAME, SECOND_TAP_NAME};
use opendut_types::util::net::NetworkInterfaceName;

/// Removes interfaces left behind by an earlier run of the probe binary.
async fn delete_if_present(manager: &NetworkInterfaceManagerRef, name: &NetworkInterfaceName) -> anyhow::Result<()> {
    if let Some(interface) = manager.find_interface(name).await? {
        manager.delete_interface(&interface).await?;
    }
    Ok(())
}

/// Occupies the name of the first TAP interface, so the probe fails right at its first step.
///
/// Uses the fixed interface names of the probe, so it must not run concurrently with the probe binary.
#[test_with::env(RUN_NETPROBE_NETLINK_INTEGRATION_TESTS)]
#[test_log::test(tokio::test)]
async fn The_probe_should_exit_unsuccessfully_when_an_interface_name_is_taken() -> anyhow::Result<()> {
    let manager: NetworkInterfaceManagerRef = Arc::new(NetworkInterfaceManager::create()?);

    let first_tap_name = NetworkInterfaceName::try_from(FIRST_TAP_NAME)?;
    let second_tap_name = NetworkInterfaceName::try_from(SECOND_TAP_NAME)?;
    let bridge_name = NetworkInterfaceName::try_from(BRIDGE_NAME)?;

    for name in [&first_tap_name, &second_tap_name, &bridge_name] {
        delete_if_present(&manager, name).await?;
    }
    assert_eq!(manager.find_interface(&second_tap_name).await?, None, "Second TAP interface should be absent before the run.");
    assert_eq!(manager.find_interface(&bridge_name).await?, None, "Bridge should be absent before the run.");

    let occupying_tap = tap::create(&first_tap_name, manager.clone()).await?;

    let status = Command::new(env!("CARGO_BIN_EXE_opendut-netprobe")).status();

    let second_tap = manager.find_interface(&second_tap_name).await?;
    let bridge = manager.find_interface(&bridge_name).await?;
    manager.delete_interface(&occupying_tap).await?;

    let status = status?;
    assert!(!status.success(), "Expected probe to fail, but it exited with: {status}");
    assert_eq!(second_tap, None, "Second TAP interface should not have been created.");
    assert_eq!(bridge, None, "Bridge should not have been created.");
    Ok(())
}
