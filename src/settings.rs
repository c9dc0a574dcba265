//! Option groups of the handset's web interface, translated into writes.
//!
//! Every field is optional; only the options that are set produce a write. Writes
//! are emitted in a fixed order per group so that repeated runs send identical
//! request sequences.

use super::catalog::{self, assign};
use super::codec::{self, OptionCode, PortSpeed, SipAccessMode, SpareIpMode};
use super::command::Action;
use super::error::{Error, Result};

use serde::Deserialize;

use std::fmt::{self, Debug};

/// One labelled write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Write {
    /// Catalog name of the setting, e.g. `lan.vlan_id`
    pub setting: &'static str,
    pub action: Action,
}

#[derive(Default)]
struct Writes(Vec<Write>);

impl Writes {
    fn push(&mut self, setting: &'static str, value: Option<String>) -> Result<()> {
        if let Some(value) = value {
            let entry = catalog::lookup(setting)?;
            self.0.push(Write {
                setting: entry.name,
                action: Action::for_entry(entry, value),
            });
        }
        Ok(())
    }

    fn flag(&mut self, setting: &'static str, value: Option<bool>) -> Result<()> {
        self.push(setting, value.map(codec::encode_bool))
    }

    fn text(&mut self, setting: &'static str, value: &Option<String>) -> Result<()> {
        self.push(setting, value.clone().map(codec::encode_str))
    }

    fn number(&mut self, setting: &'static str, value: Option<u16>) -> Result<()> {
        self.push(setting, value.map(codec::encode_int))
    }

    fn choice<E: OptionCode>(&mut self, setting: &'static str, value: &Option<String>) -> Result<()> {
        let code = match value {
            Some(name) => Some(codec::encode_enum::<E>(name)?),
            None => None,
        };
        self.push(setting, code)
    }

    fn priority(&mut self, setting: &'static str, value: Option<u8>) -> Result<()> {
        match value {
            Some(p) if p > 7 => Err(Error::invalid_enum("VLAN priority", p.to_string())),
            _ => self.push(setting, value.map(codec::encode_int)),
        }
    }
}

/// LAN port, addressing and spare address settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LanPortSettings {
    pub default_gateway: Option<String>,
    pub dhcp_mode: Option<bool>,
    pub dns_address: Option<String>,
    pub lldp_mode: Option<bool>,
    pub ip_address: Option<String>,
    /// `auto`, `10half`, `10full`, `100half` or `100full`
    pub port_speed: Option<String>,
    pub subnet_mask: Option<String>,
    pub vlan_id: Option<u16>,
    pub vlan_mode: Option<bool>,
    /// 0-7
    pub vlan_priority: Option<u8>,
    pub spare_default_gateway: Option<String>,
    pub spare_dns_address: Option<String>,
    pub spare_ip_address: Option<String>,
    /// `disable`, `spare` or `backup`
    pub spare_ip_address_mode: Option<String>,
    pub spare_subnet_mask: Option<String>,
}

impl LanPortSettings {
    pub fn writes(&self) -> Result<Vec<Write>> {
        let mut w = Writes::default();
        w.text("lan.default_gateway", &self.default_gateway)?;
        w.flag("lan.dhcp_mode", self.dhcp_mode)?;
        w.text("lan.dns_address", &self.dns_address)?;
        w.flag("lan.lldp_mode", self.lldp_mode)?;
        w.text("lan.ip_address", &self.ip_address)?;
        w.choice::<PortSpeed>("lan.port_speed", &self.port_speed)?;
        w.text("lan.subnet_mask", &self.subnet_mask)?;
        w.number("lan.vlan_id", self.vlan_id)?;
        w.flag("lan.vlan_mode", self.vlan_mode)?;
        w.priority("lan.vlan_priority", self.vlan_priority)?;
        w.text("lan.spare_default_gateway", &self.spare_default_gateway)?;
        w.text("lan.spare_dns_address", &self.spare_dns_address)?;
        w.text("lan.spare_ip_address", &self.spare_ip_address)?;
        w.choice::<SpareIpMode>("lan.spare_ip_address_mode", &self.spare_ip_address_mode)?;
        w.text("lan.spare_subnet_mask", &self.spare_subnet_mask)?;
        Ok(w.0)
    }
}

/// PC (pass-through) port settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PcPortSettings {
    pub eapol_forwarding: Option<bool>,
    /// The handset stores this inverted: an available port is written as `0`
    pub port_available: Option<bool>,
    pub port_security: Option<bool>,
    pub port_speed: Option<String>,
    pub vlan_id: Option<u16>,
    pub vlan_mode: Option<bool>,
    pub vlan_priority: Option<u8>,
}

impl PcPortSettings {
    pub fn writes(&self) -> Result<Vec<Write>> {
        let mut w = Writes::default();
        w.flag("pc.eapol_forwarding", self.eapol_forwarding)?;
        w.flag("pc.port_available", self.port_available.map(|available| !available))?;
        w.flag("pc.port_security", self.port_security)?;
        w.choice::<PortSpeed>("pc.port_speed", &self.port_speed)?;
        w.number("pc.vlan_id", self.vlan_id)?;
        w.flag("pc.vlan_mode", self.vlan_mode)?;
        w.priority("pc.vlan_priority", self.vlan_priority)?;
        Ok(w.0)
    }
}

/// SIP registration and encryption settings
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VoipSettings {
    pub encryption_auth_mode: Option<bool>,
    pub encryption_otp: Option<String>,
    pub sip_user_id: Option<String>,
    pub sip_password: Option<String>,
    pub sip_extension: Option<String>,
    pub sip_backup_login: Option<bool>,
    pub sip_server_one: Option<String>,
    pub sip_server_two: Option<String>,
    pub sip_server_three: Option<String>,
    pub sip_server_four: Option<String>,
    pub sip_server_one_port: Option<u16>,
    pub sip_server_two_port: Option<u16>,
    pub sip_server_three_port: Option<u16>,
    pub sip_server_four_port: Option<u16>,
    /// `normal` or `remote`
    pub sip_access_mode: Option<String>,
}

impl VoipSettings {
    pub fn writes(&self) -> Result<Vec<Write>> {
        let mut w = Writes::default();
        w.flag("voip.encryption_auth_mode", self.encryption_auth_mode)?;
        w.text("voip.encryption_otp", &self.encryption_otp)?;
        w.text("voip.sip_user_id", &self.sip_user_id)?;
        w.text("voip.sip_password", &self.sip_password)?;
        w.text("voip.sip_extension", &self.sip_extension)?;
        w.flag("voip.sip_backup_login", self.sip_backup_login)?;
        w.text("voip.sip_server_1", &self.sip_server_one)?;
        w.text("voip.sip_server_2", &self.sip_server_two)?;
        w.text("voip.sip_server_3", &self.sip_server_three)?;
        w.text("voip.sip_server_4", &self.sip_server_four)?;
        w.number("voip.sip_server_1_port", self.sip_server_one_port)?;
        w.number("voip.sip_server_2_port", self.sip_server_two_port)?;
        w.number("voip.sip_server_3_port", self.sip_server_three_port)?;
        w.number("voip.sip_server_4_port", self.sip_server_four_port)?;
        w.choice::<SipAccessMode>("voip.sip_access_mode", &self.sip_access_mode)?;
        Ok(w.0)
    }
}

impl Debug for VoipSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hidden = |value: &Option<String>| value.as_ref().map(|_| "<redacted>");
        f.debug_struct("VoipSettings")
            .field("encryption_auth_mode", &self.encryption_auth_mode)
            .field("encryption_otp", &hidden(&self.encryption_otp))
            .field("sip_user_id", &self.sip_user_id)
            .field("sip_password", &hidden(&self.sip_password))
            .field("sip_extension", &self.sip_extension)
            .field("sip_backup_login", &self.sip_backup_login)
            .field("sip_server_one", &self.sip_server_one)
            .field("sip_server_two", &self.sip_server_two)
            .field("sip_server_three", &self.sip_server_three)
            .field("sip_server_four", &self.sip_server_four)
            .field("sip_server_one_port", &self.sip_server_one_port)
            .field("sip_server_two_port", &self.sip_server_two_port)
            .field("sip_server_three_port", &self.sip_server_three_port)
            .field("sip_server_four_port", &self.sip_server_four_port)
            .field("sip_access_mode", &self.sip_access_mode)
            .finish()
    }
}

/// Wipe the handset's configuration
///
/// Clears the stored values, then reboots into them. The reboot ends the
/// session, so it is only sent when the session is not being kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FactoryReset {}

impl FactoryReset {
    pub fn writes(&self) -> Vec<Write> {
        vec![
            Write {
                setting: "factory.data_clear",
                action: Action::assign(assign::DATA_CLEAR),
            },
            Write {
                setting: "factory.hard_reset",
                action: Action::assign(assign::HARD_RESET),
            },
        ]
    }
}

/// Everything to apply to one handset
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub lan: Option<LanPortSettings>,
    pub pc: Option<PcPortSettings>,
    pub voip: Option<VoipSettings>,
    pub factory_reset: Option<FactoryReset>,
}

impl Settings {
    /// LAN, PC and VoIP writes in that order, factory reset last
    pub fn writes(&self) -> Result<Vec<Write>> {
        let mut writes = Vec::new();
        if let Some(lan) = &self.lan {
            writes.extend(lan.writes()?);
        }
        if let Some(pc) = &self.pc {
            writes.extend(pc.writes()?);
        }
        if let Some(voip) = &self.voip {
            writes.extend(voip.writes()?);
        }
        if let Some(reset) = &self.factory_reset {
            writes.extend(reset.writes());
        }
        Ok(writes)
    }
}
