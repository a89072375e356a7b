//! IP address rule set
//!
//! Restrictions compare addresses in a normalized 128-bit space: IPv4
//! addresses are mapped into `::ffff:0:0/96`. An IPv4 network therefore
//! also matches the IPv4-mapped IPv6 form of its addresses, and ranges
//! order addresses the same way regardless of notation.
//!
//! All restriction failures are `Pattern` errors.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::sync::{Arc, LazyLock};

use serde_json::Value;

use crate::engine::apply::{apply, slot_mismatch, type_mismatch};
use crate::engine::{Chain, ConflictType, Label};
use crate::foundation::config::expect_valid;
use crate::foundation::{
    ConfigError, Context, ErrorKind, Input, Output, Rule, ValidationError, ValidationResult,
};

static BASE: LazyLock<IpRuleSet> = LazyLock::new(|| IpRuleSet {
    chain: Chain::new("IpRuleSet", IpSettings::default()),
});

// ============================================================================
// NORMALIZED ADDRESSES
// ============================================================================

fn normalize(ip: IpAddr) -> u128 {
    match ip {
        IpAddr::V4(v4) => u128::from(v4.to_ipv6_mapped()),
        IpAddr::V6(v6) => u128::from(v6),
    }
}

/// A set of addresses sharing the bits selected by `mask`.
///
/// Masks need not be contiguous.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Network {
    addr: u128,
    mask: u128,
}

impl Network {
    fn new(addr: u128, mask: u128) -> Self {
        Self {
            addr: addr & mask,
            mask,
        }
    }

    fn from_prefix(ip: IpAddr, prefix: u8) -> Option<Self> {
        let (family_bits, offset) = match ip {
            IpAddr::V4(_) => (32, 96),
            IpAddr::V6(_) => (128, 0),
        };
        if u32::from(prefix) > family_bits {
            return None;
        }
        let bits = offset + u32::from(prefix);
        let mask = u128::MAX.checked_shl(128 - bits).unwrap_or(0);
        Some(Self::new(normalize(ip), mask))
    }

    fn parse_cidr(cidr: &str) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::InvalidCidr(cidr.to_owned());
        let (ip, prefix) = cidr.split_once('/').ok_or_else(invalid)?;
        let ip: IpAddr = ip.parse().map_err(|_| invalid())?;
        let prefix: u8 = prefix.parse().map_err(|_| invalid())?;
        Self::from_prefix(ip, prefix).ok_or_else(invalid)
    }

    fn contains(&self, addr: u128) -> bool {
        addr & self.mask == self.addr
    }
}

fn parse_addr(text: &str) -> Result<IpAddr, ConfigError> {
    text.parse()
        .map_err(|_| ConfigError::InvalidAddress(text.to_owned()))
}

fn same_family(a: IpAddr, b: IpAddr) -> Result<(), ConfigError> {
    if a.is_ipv4() == b.is_ipv4() {
        Ok(())
    } else {
        Err(ConfigError::FamilyMismatch(a.to_string(), b.to_string()))
    }
}

// ============================================================================
// CLASSIFICATION TABLES
// ============================================================================

/// Ranges that are not globally routable.
static NON_GLOBAL: LazyLock<Vec<Network>> = LazyLock::new(|| {
    [
        // IPv4
        "0.0.0.0/8",
        "10.0.0.0/8",
        "100.64.0.0/10",
        "127.0.0.0/8",
        "169.254.0.0/16",
        "172.16.0.0/12",
        "192.0.0.0/24",
        "192.0.2.0/24",
        "192.88.99.0/24",
        "192.168.0.0/16",
        "198.18.0.0/15",
        "198.51.100.0/24",
        "203.0.113.0/24",
        "224.0.0.0/4",
        "240.0.0.0/4",
        "255.255.255.255/32",
        // IPv6
        "::/128",
        "::1/128",
        "100::/64",
        "2001:db8::/32",
        "fc00::/7",
        "fe80::/10",
        "ff00::/8",
    ]
    .into_iter()
    .map(|cidr| expect_valid(Network::parse_cidr(cidr)))
    .collect()
});

/// Returns true if `ip` falls in a range that is not globally routable.
///
/// IPv4-mapped IPv6 addresses classify like their IPv4 form.
#[must_use]
pub fn is_private(ip: IpAddr) -> bool {
    let addr = normalize(ip);
    NON_GLOBAL.iter().any(|network| network.contains(addr))
}

// ============================================================================
// RULES
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Versions {
    v4: bool,
    v6: bool,
}

impl Versions {
    fn allows(self, ip: &IpAddr) -> bool {
        match ip {
            IpAddr::V4(_) => self.v4,
            IpAddr::V6(_) => self.v6,
        }
    }
}

rule! {
    VersionRule { versions: Versions } for IpAddr;
    key "ip.version";
    rule(self, input) { self.versions.allows(input) }
    error(self, ctx, input) {
        let version = if input.is_ipv4() { "IPv4" } else { "IPv6" };
        ctx.error(ErrorKind::Pattern, format!("{version} addresses are not allowed"))
            .with_param("version", version)
    }
}

rule! {
    CidrRule { networks: Arc<[Network]>, text: Arc<[String]> } for IpAddr;
    key "ip.cidr";
    rule(self, input) {
        let addr = normalize(*input);
        self.networks.iter().any(|network| network.contains(addr))
    }
    error(self, ctx, input) {
        ctx.error(ErrorKind::Pattern, format!("{input} is not in an allowed network"))
            .with_param("networks", self.text.join(", "))
    }
}

rule! {
    NetworkRule { network: Network, text: String } for IpAddr;
    key "ip.network";
    rule(self, input) { self.network.contains(normalize(*input)) }
    error(self, ctx, input) {
        ctx.error(ErrorKind::Pattern, format!("{input} is not in network {}", self.text))
            .with_param("network", self.text.clone())
    }
}

rule! {
    RangeRule { start: IpAddr, end: IpAddr } for IpAddr;
    key "ip.range";
    rule(self, input) {
        let addr = normalize(*input);
        normalize(self.start) <= addr && addr <= normalize(self.end)
    }
    error(self, ctx, input) {
        ctx.error(
            ErrorKind::Pattern,
            format!("{input} is not between {} and {}", self.start, self.end),
        )
        .with_param("start", self.start.to_string())
        .with_param("end", self.end.to_string())
    }
}

rule! {
    VisibilityRule { public: bool } for IpAddr;
    key "ip.visibility";
    rule(self, input) { is_private(*input) != self.public }
    error(self, ctx, input) {
        let expected = if self.public { "public" } else { "private" };
        ctx.error(ErrorKind::Pattern, format!("{input} is not a {expected} address"))
            .with_param("expected", expected)
    }
}

// ============================================================================
// IP RULE SET
// ============================================================================

#[derive(Debug, Clone, Default)]
struct IpSettings {
    versions: Versions,
}

/// Validates IP addresses.
///
/// # Examples
///
/// ```
/// use nebula_ruleset::prelude::*;
///
/// let rs = ip().with_range("192.168.1.1", "192.168.1.100");
///
/// let mut out = String::new();
/// assert!(rs.apply(&Context::new(), "192.168.1.100", &mut out).is_ok());
/// assert!(rs.apply(&Context::new(), "192.168.1.101", &mut out).is_err());
/// ```
#[derive(Clone)]
pub struct IpRuleSet {
    chain: Chain<IpAddr, IpSettings>,
}

impl IpRuleSet {
    /// Returns the shared base rule set, accepting any address.
    #[must_use]
    pub fn new() -> Self {
        BASE.clone()
    }

    fn with_versions(&self, method: &'static str, add: Versions) -> Self {
        let current = self.chain.extra().versions;
        let versions = Versions {
            v4: current.v4 || add.v4,
            v6: current.v6 || add.v6,
        };
        if versions == current {
            return self.clone();
        }
        let rule: Arc<dyn Rule<IpAddr>> = Arc::new(VersionRule { versions });
        Self {
            chain: self.chain.derive(
                ConflictType::None,
                Some(rule),
                Label::call(method),
                |settings| settings.extra.versions = versions,
            ),
        }
    }

    /// Allows IPv4 addresses.
    ///
    /// Versions merge: `with_ipv6().with_ipv4()` allows both. Without
    /// either call every version is allowed.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_ipv4(&self) -> Self {
        self.with_versions(
            "with_ipv4",
            Versions {
                v4: true,
                v6: false,
            },
        )
    }

    /// Allows IPv6 addresses. See [`with_ipv4`](Self::with_ipv4).
    #[must_use = "builder methods must be chained or built"]
    pub fn with_ipv6(&self) -> Self {
        self.with_versions(
            "with_ipv6",
            Versions {
                v4: false,
                v6: true,
            },
        )
    }

    /// Requires membership in any of `cidrs` (e.g. `"10.0.0.0/8"`).
    ///
    /// # Panics
    ///
    /// Panics if the list is empty or a block is malformed.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_cidr<I, S>(&self, cidrs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        expect_valid(self.try_with_cidr(cidrs))
    }

    /// Fallible [`with_cidr`](Self::with_cidr).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidCidr`].
    pub fn try_with_cidr<I, S>(&self, cidrs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let text: Arc<[String]> = cidrs
            .into_iter()
            .map(|cidr| cidr.as_ref().to_owned())
            .collect();
        if text.is_empty() {
            return Err(ConfigError::InvalidCidr(String::new()));
        }
        let networks = text
            .iter()
            .map(|cidr| Network::parse_cidr(cidr))
            .collect::<Result<Arc<[Network]>, _>>()?;

        let label = Label::call("with_cidr").args_str(text.iter());
        Ok(Self {
            chain: self.chain.attach(CidrRule { networks, text }, label),
        })
    }

    /// Requires `addr & mask == ip & mask`.
    ///
    /// # Panics
    ///
    /// Panics if either literal is malformed or the families differ.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_network(&self, ip: &str, mask: &str) -> Self {
        expect_valid(self.try_with_network(ip, mask))
    }

    /// Fallible [`with_network`](Self::with_network).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidAddress`] or
    /// [`ConfigError::FamilyMismatch`].
    pub fn try_with_network(&self, ip: &str, mask: &str) -> Result<Self, ConfigError> {
        let addr = parse_addr(ip)?;
        let mask_addr = parse_addr(mask)?;
        same_family(addr, mask_addr)?;

        let mask_bits = match mask_addr {
            IpAddr::V4(m) => (u128::MAX << 32) | u128::from(u32::from(m)),
            IpAddr::V6(m) => u128::from(m),
        };
        let rule = NetworkRule {
            network: Network::new(normalize(addr), mask_bits),
            text: format!("{ip}/{mask}"),
        };
        let label = Label::call("with_network").arg_str(ip).arg_str(mask);
        Ok(Self {
            chain: self.chain.attach(rule, label),
        })
    }

    /// Requires `start <= addr <= end`.
    ///
    /// # Panics
    ///
    /// Panics if either literal is malformed, the families differ or
    /// `start > end`.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_range(&self, start: &str, end: &str) -> Self {
        expect_valid(self.try_with_range(start, end))
    }

    /// Fallible [`with_range`](Self::with_range).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidAddress`],
    /// [`ConfigError::FamilyMismatch`] or [`ConfigError::InvertedRange`].
    pub fn try_with_range(&self, start: &str, end: &str) -> Result<Self, ConfigError> {
        let start_addr = parse_addr(start)?;
        let end_addr = parse_addr(end)?;
        same_family(start_addr, end_addr)?;
        if normalize(start_addr) > normalize(end_addr) {
            return Err(ConfigError::InvertedRange {
                start: start.to_owned(),
                end: end.to_owned(),
            });
        }

        let label = Label::call("with_range").arg_str(start).arg_str(end);
        Ok(Self {
            chain: self.chain.attach(
                RangeRule {
                    start: start_addr,
                    end: end_addr,
                },
                label,
            ),
        })
    }

    /// Requires a globally routable address. Replaces [`with_private`](Self::with_private).
    #[must_use = "builder methods must be chained or built"]
    pub fn with_public(&self) -> Self {
        Self {
            chain: self
                .chain
                .attach(VisibilityRule { public: true }, Label::call("with_public")),
        }
    }

    /// Requires an address that is not globally routable (private,
    /// loopback, link-local, documentation, reserved...).
    /// Replaces [`with_public`](Self::with_public).
    #[must_use = "builder methods must be chained or built"]
    pub fn with_private(&self) -> Self {
        Self {
            chain: self
                .chain
                .attach(VisibilityRule { public: false }, Label::call("with_private")),
        }
    }

    /// Runs every attached rule against `value`.
    ///
    /// # Errors
    ///
    /// Returns every violation found.
    pub fn evaluate(&self, ctx: &Context, value: &IpAddr) -> ValidationResult {
        let ctx = self.chain.annotate(ctx);
        self.chain.evaluate_rules(&ctx, value).into_result()
    }

    /// Coerces `input` to an address, evaluates it and writes it to `output`.
    ///
    /// Accepts `IpAddr`, text and JSON strings. Writes to address, text,
    /// JSON and `Any` slots (`IpAddr`, `Option<IpAddr>`, `String`,
    /// `serde_json::Value`).
    ///
    /// # Errors
    ///
    /// Returns `Null`, `Type`, validation or `Internal` errors.
    pub fn apply<'i, 'o>(
        &self,
        ctx: &Context,
        input: impl Into<Input<'i>>,
        output: impl Into<Output<'o>>,
    ) -> ValidationResult {
        let ctx = self.chain.annotate(ctx);
        apply(
            &ctx,
            self.is_nilable(),
            input.into(),
            output.into(),
            coerce_ip,
            |ctx, value: &IpAddr| self.evaluate(ctx, value),
            store_ip,
        )
    }
}

impl Default for IpRuleSet {
    fn default() -> Self {
        Self::new()
    }
}

rule_set_common!(IpRuleSet, value: IpAddr, rule: IpAddr);

/// Returns the base [`IpRuleSet`].
#[must_use]
pub fn ip() -> IpRuleSet {
    IpRuleSet::new()
}

// ============================================================================
// COERCION
// ============================================================================

fn coerce_ip(ctx: &Context, input: Input<'_>) -> Result<IpAddr, ValidationError> {
    if let Input::Ip(ip) = input {
        return Ok(ip);
    }
    let text = input
        .as_text()
        .ok_or_else(|| type_mismatch(ctx, &input, "IP address"))?;
    text.parse().map_err(|_| {
        tracing::debug!(input = text, "IP address coercion failed");
        type_mismatch(ctx, &input, "IP address")
    })
}

fn store_ip(ctx: &Context, ip: IpAddr, output: Output<'_>) -> Result<(), ValidationError> {
    match output {
        Output::Ip(slot) => *slot = ip,
        Output::OptionalIp(slot) => *slot = Some(ip),
        Output::Text(slot) => *slot = ip.to_string(),
        Output::OptionalText(slot) => *slot = Some(ip.to_string()),
        Output::Json(slot) => *slot = Value::String(ip.to_string()),
        Output::Any(slot) => {
            if let Some(s) = slot.downcast_mut::<IpAddr>() {
                *s = ip;
            } else if let Some(s) = slot.downcast_mut::<Option<IpAddr>>() {
                *s = Some(ip);
            } else if let Some(s) = slot.downcast_mut::<Ipv4Addr>() {
                let IpAddr::V4(v4) = ip else {
                    return Err(slot_mismatch(ctx, "Ipv4Addr", "IPv6 address"));
                };
                *s = v4;
            } else if let Some(s) = slot.downcast_mut::<Ipv6Addr>() {
                *s = match ip {
                    IpAddr::V4(v4) => v4.to_ipv6_mapped(),
                    IpAddr::V6(v6) => v6,
                };
            } else if let Some(s) = slot.downcast_mut::<String>() {
                *s = ip.to_string();
            } else if let Some(s) = slot.downcast_mut::<Value>() {
                *s = Value::String(ip.to_string());
            } else {
                return Err(slot_mismatch(ctx, "dyn Any", "IP address"));
            }
        }
        other => return Err(slot_mismatch(ctx, other.describe(), "IP address")),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn addr(text: &str) -> IpAddr {
        text.parse().unwrap()
    }

    fn accepts(rs: &IpRuleSet, text: &str) -> bool {
        rs.evaluate(&Context::new(), &addr(text)).is_ok()
    }

    #[test]
    fn test_base_accepts_both_versions() {
        assert!(accepts(&ip(), "10.0.0.1"));
        assert!(accepts(&ip(), "2001:db8::1"));
    }

    #[test]
    fn test_versions_merge() {
        let v6 = ip().with_ipv6();
        assert!(!accepts(&v6, "10.0.0.1"));
        assert!(accepts(&v6, "::1"));

        let both = v6.with_ipv4();
        assert!(accepts(&both, "10.0.0.1"));
        assert!(accepts(&both, "::1"));

        assert!(both.with_ipv6().ptr_eq(&both));
        assert!(v6.with_ipv6().ptr_eq(&v6));
    }

    #[rstest]
    #[case("10.1.2.3", true)]
    #[case("11.0.0.0", false)]
    #[case("192.168.0.5", true)]
    #[case("::ffff:10.0.0.1", true)]
    #[case("2001:db8::1", false)]
    fn test_cidr_any_of(#[case] value: &str, #[case] expected: bool) {
        let rs = ip().with_cidr(["10.0.0.0/8", "192.168.0.0/24"]);
        assert_eq!(accepts(&rs, value), expected);
    }

    #[rstest]
    #[case("10.0.0.0/33")]
    #[case("10.0.0.0")]
    #[case("nope/8")]
    #[case("::/129")]
    fn test_invalid_cidr(#[case] cidr: &str) {
        assert_eq!(
            ip().try_with_cidr([cidr]).unwrap_err(),
            ConfigError::InvalidCidr(cidr.to_owned())
        );
    }

    #[test]
    fn test_network_mask() {
        let rs = ip().with_network("172.16.0.0", "255.240.0.0");
        assert!(accepts(&rs, "172.31.255.255"));
        assert!(!accepts(&rs, "172.32.0.0"));
        assert!(!accepts(&rs, "::1"));
    }

    #[test]
    fn test_network_family_mismatch() {
        assert!(matches!(
            ip().try_with_network("10.0.0.0", "ffff::"),
            Err(ConfigError::FamilyMismatch(_, _))
        ));
    }

    #[rstest]
    #[case("192.168.1.0", false)]
    #[case("192.168.1.1", true)]
    #[case("192.168.1.100", true)]
    #[case("192.168.1.101", false)]
    fn test_range_endpoints(#[case] value: &str, #[case] expected: bool) {
        let rs = ip().with_range("192.168.1.1", "192.168.1.100");
        assert_eq!(accepts(&rs, value), expected);
    }

    #[test]
    fn test_range_config_errors() {
        assert!(matches!(
            ip().try_with_range("10.0.0.9", "10.0.0.1"),
            Err(ConfigError::InvertedRange { .. })
        ));
        assert!(matches!(
            ip().try_with_range("10.0.0.1", "::1"),
            Err(ConfigError::FamilyMismatch(_, _))
        ));
        assert!(matches!(
            ip().try_with_range("10.0.0.1", "x"),
            Err(ConfigError::InvalidAddress(_))
        ));
    }

    #[test]
    #[should_panic(expected = "range start")]
    fn test_with_range_panics_when_inverted() {
        let _ = ip().with_range("10.0.0.9", "10.0.0.1");
    }

    #[rstest]
    #[case("10.0.0.1", true)]
    #[case("127.0.0.1", true)]
    #[case("100.64.0.1", true)]
    #[case("203.0.113.9", true)]
    #[case("8.8.8.8", false)]
    #[case("::1", true)]
    #[case("fd00::1", true)]
    #[case("fe80::1", true)]
    #[case("2606:4700::1111", false)]
    #[case("::ffff:192.168.1.1", true)]
    #[case("::ffff:8.8.8.8", false)]
    fn test_classification(#[case] value: &str, #[case] private: bool) {
        assert_eq!(is_private(addr(value)), private);
    }

    #[test]
    fn test_public_replaces_private() {
        let rs = ip().with_private().with_public();
        assert!(accepts(&rs, "8.8.8.8"));
        assert!(!accepts(&rs, "10.0.0.1"));
        assert_eq!(rs.to_string(), "IpRuleSet.with_public()");
    }

    #[test]
    fn test_failures_are_pattern_errors() {
        let rs = ip().with_ipv4().with_public();
        let errors = rs.evaluate(&Context::new(), &addr("fe80::1")).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| e.kind == ErrorKind::Pattern));
    }

    #[test]
    fn test_coercion() {
        let mut out: Option<IpAddr> = None;
        ip().apply(&Context::new(), "10.0.0.1", &mut out).unwrap();
        assert_eq!(out, Some(addr("10.0.0.1")));

        let errors = ip().apply(&Context::new(), "10.0.0.256", &mut out).unwrap_err();
        assert_eq!(errors.first().unwrap().kind, ErrorKind::Type);

        let errors = ip().apply(&Context::new(), Input::Int(1), &mut out).unwrap_err();
        assert_eq!(errors.first().unwrap().kind, ErrorKind::Type);
    }

    #[test]
    fn test_store_v4_slot_rejects_v6() {
        let mut slot = Ipv4Addr::UNSPECIFIED;
        let errors = ip()
            .apply(&Context::new(), "::1", Output::Any(&mut slot))
            .unwrap_err();
        assert_eq!(errors.first().unwrap().kind, ErrorKind::Internal);
    }
}
