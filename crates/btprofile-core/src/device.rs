//! Device records extracted from a Bluetooth enumeration listing

use serde::{Serialize, Serializer};
use std::fmt;

/// Rendering used for a vendor ID token that could not be read as hexadecimal
pub const UNPARSEABLE_VENDOR_ID: &str = "NaN";

/// Vendor identifier reinterpreted from the listing's hexadecimal form
///
/// The listing prints vendor IDs as `0x004C (Apple)`. Only the token before
/// the first space is considered; it is read as base 16 and re-rendered in
/// base 10, so `0x004C` becomes `"76"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VendorId {
    /// Token read as hexadecimal
    Known(i128),
    /// Token read as hexadecimal but too wide for `i128`, kept as decimal digits
    Wide { decimal: String },
    /// Token with no readable hexadecimal digits
    Unparseable { raw: String },
}

impl VendorId {
    /// Interpret a single token as a hexadecimal numeral
    ///
    /// An optional `+`/`-` sign and then an optional `0x`/`0X` prefix are
    /// skipped, then the longest leading run of hex digits is used. Anything
    /// after that run is ignored.
    pub fn from_hex_token(token: &str) -> Self {
        let (negative, unsigned) = match token.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, token.strip_prefix('+').unwrap_or(token)),
        };
        let digits = unsigned
            .strip_prefix("0x")
            .or_else(|| unsigned.strip_prefix("0X"))
            .unwrap_or(unsigned);
        let end = digits
            .find(|c: char| !c.is_ascii_hexdigit())
            .unwrap_or(digits.len());
        let run = &digits[..end];

        if run.is_empty() {
            return Self::Unparseable {
                raw: token.to_string(),
            };
        }

        // The run is all hex digits, so the only failure left is overflow
        match i128::from_str_radix(run, 16) {
            Ok(value) if negative => Self::Known(-value),
            Ok(value) => Self::Known(value),
            Err(_) => {
                let sign = if negative { "-" } else { "" };
                Self::Wide {
                    decimal: format!("{}{}", sign, hex_to_decimal(run)),
                }
            }
        }
    }

    /// Interpret the value half of a `Vendor ID:` attribute line
    ///
    /// `"0x004c (Apple)"` yields the same result as `from_hex_token("0x004c")`.
    pub fn from_attribute_value(value: &str) -> Self {
        let token = value.split(' ').next().unwrap_or_default();
        Self::from_hex_token(token)
    }

    /// Numeric value, if the token was readable and fits in `i128`
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            Self::Known(value) => Some(*value),
            Self::Wide { .. } | Self::Unparseable { .. } => None,
        }
    }

    /// Whether the token had any hexadecimal digits
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unparseable { .. })
    }
}

/// Convert a run of hex digits of any length to decimal digits
fn hex_to_decimal(hex: &str) -> String {
    const LIMB: u64 = 1_000_000_000;

    // Base 10^9, least significant limb first
    let mut limbs: Vec<u32> = vec![0];
    for c in hex.chars() {
        let mut carry = u64::from(c.to_digit(16).unwrap_or(0));
        for limb in limbs.iter_mut() {
            let value = u64::from(*limb) * 16 + carry;
            *limb = (value % LIMB) as u32;
            carry = value / LIMB;
        }
        if carry > 0 {
            limbs.push(carry as u32);
        }
    }

    let mut out = limbs.last().map(|l| l.to_string()).unwrap_or_default();
    for limb in limbs.iter().rev().skip(1) {
        out.push_str(&format!("{:09}", limb));
    }
    out
}

impl fmt::Display for VendorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(value) => write!(f, "{}", value),
            Self::Wide { decimal } => f.write_str(decimal),
            Self::Unparseable { .. } => f.write_str(UNPARSEABLE_VENDOR_ID),
        }
    }
}

impl Serialize for VendorId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A Bluetooth device found in the listing
///
/// Only emitted once both a name and an address were seen for its block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    /// Header text of the device block, without the trailing colon
    pub name: String,
    /// Hardware address, verbatim from the `Address:` line
    pub address: String,
    /// Decimal vendor identifier, when a `Vendor ID:` line was present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor_id: Option<VendorId>,
}

impl Device {
    /// Create a device with no vendor identifier
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            vendor_id: None,
        }
    }

    pub fn with_vendor_id(mut self, vendor_id: VendorId) -> Self {
        self.vendor_id = Some(vendor_id);
        self
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.address)?;
        if let Some(vendor_id) = &self.vendor_id {
            write!(f, " vendor={}", vendor_id)?;
        }
        Ok(())
    }
}
