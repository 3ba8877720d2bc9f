//! Domain types shared by the controller, its drivers and the stack

use std::{fmt, str::FromStr, time::Duration};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Authentication timeout shared with drivers; enforcement is theirs
pub const AUTH_TIMEOUT: Duration = Duration::from_secs(15);

/// Nominal link speeds in bits per second
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkSpeed {
    Ieee80211a,
    Ieee80211b,
    Ieee80211g,
    /// MCS index 15, 400ns GI, 40 MHz channel
    Ieee80211n,
}

impl LinkSpeed {
    pub fn bits_per_second(self) -> u64 {
        match self {
            LinkSpeed::Ieee80211a | LinkSpeed::Ieee80211g => 54_000_000,
            LinkSpeed::Ieee80211b => 11_000_000,
            LinkSpeed::Ieee80211n => 300_000_000,
        }
    }
}

/// 48-bit IEEE 802 hardware address
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct MacAddress([u8; 6]);

impl MacAddress {
    pub const BROADCAST: MacAddress = MacAddress([0xff; 6]);

    pub const fn new(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    pub fn octets(&self) -> [u8; 6] {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0; 6]
    }

    pub fn is_broadcast(&self) -> bool {
        *self == Self::BROADCAST
    }

    pub fn is_multicast(&self) -> bool {
        self.0[0] & 0x01 != 0
    }

    pub fn is_locally_administered(&self) -> bool {
        self.0[0] & 0x02 != 0
    }

    /// Usable as a station address: not zero, not group-addressed
    pub fn is_valid_unicast(&self) -> bool {
        !self.is_zero() && !self.is_multicast()
    }
}

impl From<[u8; 6]> for MacAddress {
    fn from(octets: [u8; 6]) -> Self {
        Self(octets)
    }
}

impl FromStr for MacAddress {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split([':', '-']).collect();
        if parts.len() != 6 {
            return Err(format!("expected 6 octets, got {}", parts.len()));
        }

        let mut octets = [0u8; 6];
        for (octet, part) in octets.iter_mut().zip(parts) {
            if part.len() != 2 {
                return Err(format!("invalid octet {part:?}"));
            }
            let mut byte = [0u8; 1];
            hex::decode_to_slice(part, &mut byte)
                .map_err(|e| format!("invalid octet {part:?}: {e}"))?;
            *octet = byte[0];
        }

        Ok(Self(octets))
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

impl fmt::Debug for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MacAddress({self})")
    }
}

impl Serialize for MacAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MacAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Opaque network packet
///
/// Ownership moves with the value: whoever the packet is handed to owns it.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Packet {
    data: Vec<u8>,
}

impl Packet {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl From<Vec<u8>> for Packet {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

impl From<&[u8]> for Packet {
    fn from(data: &[u8]) -> Self {
        Self::new(data.to_vec())
    }
}

impl fmt::Debug for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Packet").field("len", &self.data.len()).finish()
    }
}

/// Data link type tag used for passive taps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dlt(pub u32);

impl Dlt {
    pub const EN10MB: Dlt = Dlt(1);
    pub const IEEE802_11: Dlt = Dlt(105);
    pub const PRISM_HEADER: Dlt = Dlt(119);
    pub const IEEE802_11_RADIO: Dlt = Dlt(127);
    pub const IEEE802_11_RADIO_AVS: Dlt = Dlt(163);
}

/// System power state delivered by the host power manager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum PowerState {
    #[default]
    Unknown = 0,
    Awake = 1,
    Sleeping = 2,
}

impl TryFrom<u8> for PowerState {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, <Self as TryFrom<u8>>::Error> {
        match value {
            0 => Ok(PowerState::Unknown),
            1 => Ok(PowerState::Awake),
            2 => Ok(PowerState::Sleeping),
            _ => Err(()),
        }
    }
}

impl From<PowerState> for u8 {
    fn from(state: PowerState) -> Self {
        state as u8
    }
}

/// Regulatory operations the stack may request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountryCodeOp {
    /// Reset to the worldwide default and start looking for 802.11d beacons
    Reset,
}

/// Optional capabilities the stack may ask the driver to enable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u32)]
pub enum FeatureCode {
    Ieee80211n = 1,
}

/// Role of a virtual interface sharing the radio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VirtualInterfaceRole {
    Station,
    SoftAp,
    P2pDevice,
    P2pClient,
    P2pGo,
}

impl VirtualInterfaceRole {
    /// Name prefix the stack uses when allocating a unit for this role
    pub fn name_prefix(self) -> &'static str {
        match self {
            VirtualInterfaceRole::Station => "wlan",
            VirtualInterfaceRole::SoftAp => "ap",
            VirtualInterfaceRole::P2pDevice
            | VirtualInterfaceRole::P2pClient
            | VirtualInterfaceRole::P2pGo => "p2p",
        }
    }
}

impl FromStr for VirtualInterfaceRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "station" | "sta" => Ok(VirtualInterfaceRole::Station),
            "soft_ap" | "ap" => Ok(VirtualInterfaceRole::SoftAp),
            "p2p_device" | "p2p" => Ok(VirtualInterfaceRole::P2pDevice),
            "p2p_client" => Ok(VirtualInterfaceRole::P2pClient),
            "p2p_go" => Ok(VirtualInterfaceRole::P2pGo),
            other => Err(other.to_string()),
        }
    }
}

/// Session identifier for control socket connections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(uuid::Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
