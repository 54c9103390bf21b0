//! Strong type definitions for Carbonmeter.
//!
//! All identifiers are newtypes to prevent misuse at compile time.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Seconds in one calendar day bucket.
pub const SECONDS_PER_DAY: i64 = 86_400;

/// Compute the day bucket for a unix-seconds timestamp.
///
/// Floor division, so timestamps before the epoch still bucket
/// consistently.
pub fn day_bucket(timestamp: i64) -> i64 {
    timestamp.div_euclid(SECONDS_PER_DAY)
}

/// A 32-byte device identifier, issued once per physical meter.
///
/// Immutable for the lifetime of the device. Two packets with the same
/// DeviceId claim to come from the same hardware.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DeviceId(pub [u8; 32]);

impl DeviceId {
    /// Create a new DeviceId from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string.
    pub fn from_hex(s: &str) -> Result<Self, CoreError> {
        let bytes = hex::decode(s).map_err(|_| CoreError::InvalidLength {
            field: "device_id",
            expected: 32,
            got: s.len() / 2,
        })?;
        Self::try_from(bytes.as_slice())
    }
}

impl fmt::Debug for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeviceId({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.to_hex()[..16])
    }
}

impl AsRef<[u8]> for DeviceId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for DeviceId {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl TryFrom<&[u8]> for DeviceId {
    type Error = CoreError;

    fn try_from(slice: &[u8]) -> Result<Self, Self::Error> {
        let arr: [u8; 32] = slice.try_into().map_err(|_| CoreError::InvalidLength {
            field: "device_id",
            expected: 32,
            got: slice.len(),
        })?;
        Ok(Self(arr))
    }
}

/// An opaque ledger account address.
///
/// The pipeline never interprets the address; it only enforces that a
/// wallet binds to at most one device.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WalletAddress(String);

impl WalletAddress {
    /// Create a wallet address. Rejects the empty string.
    pub fn new(addr: impl Into<String>) -> Result<Self, CoreError> {
        let addr = addr.into();
        if addr.is_empty() {
            return Err(CoreError::EmptyWalletAddress);
        }
        Ok(Self(addr))
    }

    /// The address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WalletAddress({})", self.0)
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Supported tether types between device and host.
///
/// The processor only accepts packets arriving over a cable type listed
/// in the meter configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CableType {
    /// USB Type-C tether.
    TypeC,
    /// 12V hard-wired tether.
    TwelveVolt,
    /// Legacy USB-A tether.
    Usb,
}

impl CableType {
    /// The wire string used by device firmware.
    pub fn as_str(&self) -> &'static str {
        match self {
            CableType::TypeC => "type-c",
            CableType::TwelveVolt => "12v",
            CableType::Usb => "usb",
        }
    }
}

impl FromStr for CableType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "type-c" => Ok(CableType::TypeC),
            "12v" => Ok(CableType::TwelveVolt),
            "usb" => Ok(CableType::Usb),
            other => Err(CoreError::UnknownCableType(other.to_string())),
        }
    }
}

impl fmt::Display for CableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deployment region of the meter owner.
///
/// Determines the storage bucket readings land in and the default grid
/// CO2 intensity used for offset records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Region {
    Eu,
    Sg,
    Nz,
    Cn,
    Other,
}

impl Region {
    /// The storage bucket readings for this region are keyed under.
    ///
    /// EU data stays in the EU bucket; everything else lands in the
    /// Singapore bucket.
    pub fn bucket(&self) -> &'static str {
        match self {
            Region::Eu => "ccm-energy-eu",
            _ => "ccm-energy-sg",
        }
    }

    /// Default grid CO2 intensity in kg per kWh.
    pub fn grid_intensity(&self) -> f64 {
        match self {
            Region::Eu => 0.23,
            Region::Sg => 0.41,
            Region::Nz => 0.11,
            Region::Cn => 0.57,
            Region::Other => 0.45,
        }
    }

    /// The wire string used in stored records.
    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Eu => "EU",
            Region::Sg => "SG",
            Region::Nz => "NZ",
            Region::Cn => "CN",
            Region::Other => "OTHER",
        }
    }
}

impl FromStr for Region {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EU" => Ok(Region::Eu),
            "SG" => Ok(Region::Sg),
            "NZ" => Ok(Region::Nz),
            "CN" => Ok(Region::Cn),
            "OTHER" => Ok(Region::Other),
            other => Err(CoreError::UnknownRegion(other.to_string())),
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
