//! Encoding of option values into the handset's raw item values.
//!
//! Booleans become `"1"`/`"0"`, enumerations become a single digit, integers and
//! dotted addresses pass through untouched. Nothing here percent-encodes; the
//! command builder escapes the query exactly once.

use super::error::{Error, Result};

use std::fmt::{self, Display};
use std::str::FromStr;

/// `true` → `"1"`, `false` → `"0"`
pub fn encode_bool(value: bool) -> String {
    let code = if value { "1" } else { "0" };
    code.to_string()
}

/// Integers pass through as their decimal representation
pub fn encode_int<N: Display>(value: N) -> String {
    value.to_string()
}

/// Strings (dotted IPv4 addresses, extensions, user ids) pass through unchanged
pub fn encode_str<S: Into<String>>(value: S) -> String {
    value.into()
}

/// Parse a symbolic option name and encode it as the handset's digit
pub fn encode_enum<E: OptionCode>(name: &str) -> Result<String> {
    Ok(name.parse::<E>()?.code().to_string())
}

/// Enumerated option with a fixed name → digit mapping
pub trait OptionCode: FromStr<Err = Error> {
    /// Option name used in error messages
    const OPTION: &'static str;

    /// Digit sent to the handset
    fn code(&self) -> u8;
}

/// LAN / PC port speed and duplex
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortSpeed {
    Auto,
    Full100,
    Half100,
    Full10,
    Half10,
}

impl OptionCode for PortSpeed {
    const OPTION: &'static str = "port speed";

    fn code(&self) -> u8 {
        match self {
            Self::Auto => 0,
            Self::Full100 => 1,
            Self::Half100 => 2,
            Self::Full10 => 3,
            Self::Half10 => 4,
        }
    }
}

impl FromStr for PortSpeed {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "auto" => Ok(Self::Auto),
            "100full" => Ok(Self::Full100),
            "100half" => Ok(Self::Half100),
            "10full" => Ok(Self::Full10),
            "10half" => Ok(Self::Half10),
            other => Err(Error::invalid_enum(Self::OPTION, other)),
        }
    }
}

impl Display for PortSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Auto => "auto",
            Self::Full100 => "100full",
            Self::Half100 => "100half",
            Self::Full10 => "10full",
            Self::Half10 => "10half",
        })
    }
}

/// Behaviour of the spare (secondary) IP address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpareIpMode {
    Disable,
    Spare,
    Backup,
}

impl OptionCode for SpareIpMode {
    const OPTION: &'static str = "spare IP address mode";

    fn code(&self) -> u8 {
        match self {
            Self::Disable => 0,
            Self::Spare => 1,
            Self::Backup => 2,
        }
    }
}

impl FromStr for SpareIpMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "disable" => Ok(Self::Disable),
            "spare" => Ok(Self::Spare),
            "backup" => Ok(Self::Backup),
            other => Err(Error::invalid_enum(Self::OPTION, other)),
        }
    }
}

/// SIP registration access mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SipAccessMode {
    Normal,
    Remote,
}

impl OptionCode for SipAccessMode {
    const OPTION: &'static str = "SIP access mode";

    fn code(&self) -> u8 {
        match self {
            Self::Normal => 0,
            Self::Remote => 1,
        }
    }
}

impl FromStr for SipAccessMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "normal" => Ok(Self::Normal),
            "remote" => Ok(Self::Remote),
            other => Err(Error::invalid_enum(Self::OPTION, other)),
        }
    }
}
