//! Item codes understood by the handset firmware.
//!
//! These keys come from the firmware's web interface and must be sent exactly as
//! written here.

use super::error::{ClientError, Result};

use std::fmt::{self, Display};

/// Key identifying one configurable parameter on the handset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemCode(&'static str);

impl ItemCode {
    pub fn as_str(&self) -> &'static str {
        self.0
    }

    /// Values written to this item are credentials and stay out of logs
    pub fn is_secret(&self) -> bool {
        *self == SIP_PASSWORD || *self == ENCRYPTION_OTP
    }
}

impl Display for ItemCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Key that must accompany typed values such as addresses and ports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Companion {
    /// `type=ip`
    Ip,
    /// `port=int`
    Port,
}

impl Companion {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Ip => "type",
            Self::Port => "port",
        }
    }

    pub fn value(&self) -> &'static str {
        match self {
            Self::Ip => "ip",
            Self::Port => "int",
        }
    }
}

// LAN port
pub const LAN_DHCP_MODE: ItemCode = ItemCode("4020401");
pub const LAN_IP_ADDRESS: ItemCode = ItemCode("4020402");
pub const LAN_DEFAULT_GATEWAY: ItemCode = ItemCode("4020403");
pub const LAN_SUBNET_MASK: ItemCode = ItemCode("4020404");
pub const LAN_DNS_ADDRESS: ItemCode = ItemCode("4020405");
pub const LAN_LLDP_MODE: ItemCode = ItemCode("44604f3");
pub const LAN_PORT_SPEED: ItemCode = ItemCode("41d044d");
pub const LAN_VLAN_MODE: ItemCode = ItemCode("41d044e");
pub const LAN_VLAN_ID: ItemCode = ItemCode("41d044f");
pub const LAN_VLAN_PRIORITY: ItemCode = ItemCode("41d0450");
pub const LAN_SPARE_IP_MODE: ItemCode = ItemCode("44304f2");
pub const LAN_SPARE_IP_ADDRESS: ItemCode = ItemCode("4442001");
pub const LAN_SPARE_DEFAULT_GATEWAY: ItemCode = ItemCode("4442002");
pub const LAN_SPARE_SUBNET_MASK: ItemCode = ItemCode("4442003");
pub const LAN_SPARE_DNS_ADDRESS: ItemCode = ItemCode("4442004");

// PC port
pub const PC_PORT_SECURITY: ItemCode = ItemCode("41e0415");
pub const PC_PORT_SPEED: ItemCode = ItemCode("41e0451");
pub const PC_VLAN_MODE: ItemCode = ItemCode("41e0452");
pub const PC_VLAN_ID: ItemCode = ItemCode("41e0453");
pub const PC_VLAN_PRIORITY: ItemCode = ItemCode("41e0454");
pub const PC_PORT_AVAILABLE: ItemCode = ItemCode("41e0455");
pub const PC_EAPOL_FORWARDING: ItemCode = ItemCode("41e0456");

// VoIP
pub const SIP_ACCESS_MODE: ItemCode = ItemCode("4030406");
pub const SIP_USER_ID: ItemCode = ItemCode("40a0418");
pub const SIP_PASSWORD: ItemCode = ItemCode("40a0419");
pub const SIP_EXTENSION: ItemCode = ItemCode("40a041a");
pub const SIP_BACKUP_LOGIN: ItemCode = ItemCode("40a04ca");
pub const SIP_SERVER_1: ItemCode = ItemCode("40b041b");
pub const SIP_SERVER_2: ItemCode = ItemCode("40b041c");
pub const SIP_SERVER_3: ItemCode = ItemCode("40b041d");
pub const SIP_SERVER_4: ItemCode = ItemCode("40b041e");
pub const SIP_SERVER_1_PORT: ItemCode = ItemCode("40c0423");
// Firmware addresses ports 2-4 through the server items with `port=int`
pub const SIP_SERVER_2_PORT: ItemCode = SIP_SERVER_2;
pub const SIP_SERVER_3_PORT: ItemCode = SIP_SERVER_3;
pub const SIP_SERVER_4_PORT: ItemCode = SIP_SERVER_4;
pub const ENCRYPTION_AUTH_MODE: ItemCode = ItemCode("40d0427");
pub const ENCRYPTION_OTP: ItemCode = ItemCode("40d0428");

/// Direct key assignments, sent without the `set=`/`item=` wrapper
pub mod assign {
    /// Restore factory values
    pub const DATA_CLEAR: (&str, &str) = ("data_clear", "4110430");
    /// Reboot into the restored configuration
    pub const HARD_RESET: (&str, &str) = ("hard_reset", "4040408");
}

/// One catalog row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry {
    pub name: &'static str,
    pub code: ItemCode,
    pub companion: Option<Companion>,
}

const fn single(name: &'static str, code: ItemCode) -> Entry {
    Entry {
        name,
        code,
        companion: None,
    }
}

const fn ip(name: &'static str, code: ItemCode) -> Entry {
    Entry {
        name,
        code,
        companion: Some(Companion::Ip),
    }
}

const fn port(name: &'static str, code: ItemCode) -> Entry {
    Entry {
        name,
        code,
        companion: Some(Companion::Port),
    }
}

/// Every writable setting, by name
pub static ENTRIES: &[Entry] = &[
    single("lan.dhcp_mode", LAN_DHCP_MODE),
    ip("lan.ip_address", LAN_IP_ADDRESS),
    ip("lan.default_gateway", LAN_DEFAULT_GATEWAY),
    ip("lan.subnet_mask", LAN_SUBNET_MASK),
    ip("lan.dns_address", LAN_DNS_ADDRESS),
    single("lan.lldp_mode", LAN_LLDP_MODE),
    single("lan.port_speed", LAN_PORT_SPEED),
    single("lan.vlan_mode", LAN_VLAN_MODE),
    single("lan.vlan_id", LAN_VLAN_ID),
    single("lan.vlan_priority", LAN_VLAN_PRIORITY),
    single("lan.spare_ip_address_mode", LAN_SPARE_IP_MODE),
    ip("lan.spare_ip_address", LAN_SPARE_IP_ADDRESS),
    ip("lan.spare_default_gateway", LAN_SPARE_DEFAULT_GATEWAY),
    ip("lan.spare_subnet_mask", LAN_SPARE_SUBNET_MASK),
    ip("lan.spare_dns_address", LAN_SPARE_DNS_ADDRESS),
    single("pc.port_security", PC_PORT_SECURITY),
    single("pc.port_speed", PC_PORT_SPEED),
    single("pc.vlan_mode", PC_VLAN_MODE),
    single("pc.vlan_id", PC_VLAN_ID),
    single("pc.vlan_priority", PC_VLAN_PRIORITY),
    single("pc.port_available", PC_PORT_AVAILABLE),
    single("pc.eapol_forwarding", PC_EAPOL_FORWARDING),
    single("voip.sip_access_mode", SIP_ACCESS_MODE),
    single("voip.sip_user_id", SIP_USER_ID),
    single("voip.sip_password", SIP_PASSWORD),
    single("voip.sip_extension", SIP_EXTENSION),
    single("voip.sip_backup_login", SIP_BACKUP_LOGIN),
    ip("voip.sip_server_1", SIP_SERVER_1),
    ip("voip.sip_server_2", SIP_SERVER_2),
    ip("voip.sip_server_3", SIP_SERVER_3),
    ip("voip.sip_server_4", SIP_SERVER_4),
    port("voip.sip_server_1_port", SIP_SERVER_1_PORT),
    port("voip.sip_server_2_port", SIP_SERVER_2_PORT),
    port("voip.sip_server_3_port", SIP_SERVER_3_PORT),
    port("voip.sip_server_4_port", SIP_SERVER_4_PORT),
    single("voip.encryption_auth_mode", ENCRYPTION_AUTH_MODE),
    single("voip.encryption_otp", ENCRYPTION_OTP),
];

/// Find a setting by its dotted name, e.g. `lan.lldp_mode`
pub fn lookup(name: &str) -> Result<&'static Entry> {
    ENTRIES
        .iter()
        .find(|entry| entry.name == name)
        .ok_or_else(|| ClientError::UnknownSetting(name.to_string()).into())
}
