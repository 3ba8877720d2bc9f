//! Runtime settings

use crate::{
    config::CliArgs,
    core::{
        error::ConfigError,
        logging::DebugFlags,
        types::{MacAddress, VirtualInterfaceRole},
    },
};

/// Virtual interface requested on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualInterfaceSpec {
    pub role: VirtualInterfaceRole,
    pub address: MacAddress,
}

impl std::str::FromStr for VirtualInterfaceSpec {
    type Err = ConfigError;

    /// `ROLE@ADDRESS`, e.g. `soft_ap@02:00:00:00:00:01`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (role, address) = s
            .split_once('@')
            .ok_or_else(|| ConfigError::InvalidVirtualInterface(s.to_string()))?;

        Ok(Self {
            role: role.parse().map_err(ConfigError::UnknownRole)?,
            address: parse_address(address)?,
        })
    }
}

/// Runtime configuration settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub interface_prefix: String,
    pub hardware_address: MacAddress,
    pub virtual_interfaces: Vec<VirtualInterfaceSpec>,
    pub debug_flags: DebugFlags,
    pub provider: String,
    pub socket_path: String,
    pub socket_mode: u32,
}

impl TryFrom<CliArgs> for Settings {
    type Error = ConfigError;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        // Parse octal socket mode
        let socket_mode = u32::from_str_radix(&args.socket_mode, 8).unwrap_or(0o660);

        let virtual_interfaces = args
            .virtual_interfaces
            .iter()
            .map(|spec| spec.parse())
            .collect::<Result<Vec<VirtualInterfaceSpec>, _>>()?;

        Ok(Settings {
            interface_prefix: args.interface_prefix,
            hardware_address: parse_address(&args.hardware_address)?,
            virtual_interfaces,
            debug_flags: args
                .debug_flags
                .parse()
                .map_err(|_| ConfigError::InvalidDebugFlags(args.debug_flags.clone()))?,
            provider: args.provider,
            socket_path: args.socket_path,
            socket_mode,
        })
    }
}

fn parse_address(s: &str) -> Result<MacAddress, ConfigError> {
    let address: MacAddress = s
        .parse()
        .map_err(|_| ConfigError::InvalidAddress(s.to_string()))?;
    if !address.is_valid_unicast() {
        return Err(ConfigError::InvalidAddress(s.to_string()));
    }
    Ok(address)
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use pretty_assertions::assert_eq;

    use super::*;

    fn settings(args: &[&str]) -> Result<Settings, ConfigError> {
        let argv = std::iter::once("wlan-controller").chain(args.iter().copied());
        let args = CliArgs::parse_from(argv);
        Settings::try_from(args)
    }

    #[test]
    fn test_defaults() {
        let settings = settings(&[]).unwrap();
        assert_eq!(settings.interface_prefix, "wlan");
        assert_eq!(settings.hardware_address, MacAddress::new([2, 0, 0, 0, 0, 0xaa]));
        assert!(settings.virtual_interfaces.is_empty());
        assert_eq!(settings.debug_flags, DebugFlags::ERROR);
        assert_eq!(settings.socket_path, "/run/wlan-controller.sock");
        assert_eq!(settings.socket_mode, 0o660);
    }

    #[test]
    fn test_virtual_interfaces() {
        let settings = settings(&[
            "--virtual-interface",
            "soft_ap@02:00:00:00:00:01",
            "--virtual-interface",
            "p2p@02-00-00-00-00-02",
            "--debug-flags",
            "all",
        ])
        .unwrap();

        assert_eq!(
            settings.virtual_interfaces,
            vec![
                VirtualInterfaceSpec {
                    role: VirtualInterfaceRole::SoftAp,
                    address: MacAddress::new([2, 0, 0, 0, 0, 1]),
                },
                VirtualInterfaceSpec {
                    role: VirtualInterfaceRole::P2pDevice,
                    address: MacAddress::new([2, 0, 0, 0, 0, 2]),
                },
            ]
        );
        assert_eq!(settings.debug_flags, DebugFlags::ALL);
    }

    #[test]
    fn test_invalid_values() {
        assert_eq!(
            settings(&["--virtual-interface", "soft_ap"]).unwrap_err(),
            ConfigError::InvalidVirtualInterface("soft_ap".to_string())
        );
        assert_eq!(
            settings(&["--virtual-interface", "mesh@02:00:00:00:00:01"]).unwrap_err(),
            ConfigError::UnknownRole("mesh".to_string())
        );
        assert_eq!(
            settings(&["--hardware-address", "ff:ff:ff:ff:ff:ff"]).unwrap_err(),
            ConfigError::InvalidAddress("ff:ff:ff:ff:ff:ff".to_string())
        );
        assert_eq!(
            settings(&["--debug-flags", "chatty"]).unwrap_err(),
            ConfigError::InvalidDebugFlags("chatty".to_string())
        );
    }

    #[test]
    fn test_bad_socket_mode_falls_back() {
        let settings = settings(&["--socket-mode", "999"]).unwrap();
        assert_eq!(settings.socket_mode, 0o660);
    }
}
