//! Command-line argument parsing

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[clap(name = "wlan-controller", version, author)]
#[clap(about = "802.11 controller with a loopback radio and a JSON-RPC control socket")]
pub struct CliArgs {
    /// Name prefix of the primary interface (unit number is appended)
    #[clap(short, long, default_value = "wlan")]
    pub interface_prefix: String,

    /// Hardware address of the loopback radio
    #[clap(short = 'a', long, default_value = "02:00:00:00:00:aa")]
    pub hardware_address: String,

    /// Virtual interface to attach at start-up, as ROLE@ADDRESS (repeatable)
    #[clap(long = "virtual-interface", value_name = "ROLE@ADDRESS")]
    pub virtual_interfaces: Vec<String>,

    /// Debug categories for new interfaces: all, a number, or e.g. error,rx,tx
    #[clap(short, long, default_value = "error")]
    pub debug_flags: String,

    /// Provider (device) name reported by the controller
    #[clap(long, default_value = "loopback")]
    pub provider: String,

    /// Path for the control socket
    #[clap(long, default_value = "/run/wlan-controller.sock")]
    pub socket_path: String,

    /// Socket file permissions (octal, e.g., 660)
    #[clap(long, default_value = "660")]
    pub socket_mode: String,
}
