use std::fmt;
use std::str::FromStr;

use rand::rngs::OsRng;
use rand::TryRngCore;

#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct NetworkInterfaceName { name: String }
impl NetworkInterfaceName {
    /// IFNAMSIZ minus the terminating null byte.
    pub const MAX_LENGTH: usize = 15;
    pub fn name(&self) -> String {
        self.name.clone()
    }
}

impl fmt::Display for NetworkInterfaceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl TryFrom<String> for NetworkInterfaceName {
    type Error = NetworkInterfaceNameError;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.is_empty() {
            Err(NetworkInterfaceNameError::Empty)
        } else if value.len() > Self::MAX_LENGTH {
            Err(NetworkInterfaceNameError::TooLong { value, max: Self::MAX_LENGTH })
        } else if value == "." || value == ".." {
            Err(NetworkInterfaceNameError::Reserved { value })
        } else if let Some(character) = value.chars().find(|c| *c == '/' || *c == ':' || c.is_whitespace()) {
            Err(NetworkInterfaceNameError::InvalidCharacter { value, character })
        } else {
            Ok(Self { name: value })
        }
    }
}

impl TryFrom<&str> for NetworkInterfaceName {
    type Error = NetworkInterfaceNameError;
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::try_from(String::from(value))
    }
}

impl FromStr for NetworkInterfaceName {
    type Err = NetworkInterfaceNameError;
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::try_from(String::from(value))
    }
}

#[derive(thiserror::Error, Debug)]
pub enum NetworkInterfaceNameError {
    #[error("Name for network interface may not be empty!")]
    Empty,
    #[error("Due to operating system limitations, the name for network interfaces may not be longer than {max} characters!")]
    TooLong { value: String, max: usize },
    #[error("Name '{value}' is reserved and cannot be used for a network interface!")]
    Reserved { value: String },
    #[error("Name '{value}' contains the character {character:?}, which the kernel does not accept in network interface names!")]
    InvalidCharacter { value: String, character: char },
}


/// Hardware address of an Ethernet link.
///
/// Comparison is byte-exact. Two addresses read from the same link at different
/// times may differ, since the kernel is free to change them.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub struct MacAddress([u8; MAC_ADDRESS_LENGTH]);

const MAC_ADDRESS_LENGTH: usize = 6;

impl MacAddress {
    pub const LENGTH: usize = MAC_ADDRESS_LENGTH;

    const MULTICAST_BIT: u8 = 0b0000_0001;
    const LOCALLY_ADMINISTERED_BIT: u8 = 0b0000_0010;

    /// Generates a unicast, locally administered address from the operating system's random source.
    pub fn random() -> Result<Self, MacAddressError> {
        let mut octets = [0u8; Self::LENGTH];
        OsRng.try_fill_bytes(&mut octets)
            .map_err(|cause| MacAddressError::Entropy { cause })?;
        Ok(Self::local_unicast(octets))
    }

    pub const fn from_octets(octets: [u8; Self::LENGTH]) -> Self {
        Self(octets)
    }

    /// Clears the multicast bit and sets the locally administered bit of the first octet.
    pub fn local_unicast(mut octets: [u8; Self::LENGTH]) -> Self {
        octets[0] = (octets[0] & !Self::MULTICAST_BIT) | Self::LOCALLY_ADMINISTERED_BIT;
        Self(octets)
    }

    pub fn octets(&self) -> [u8; Self::LENGTH] {
        self.0
    }

    pub fn is_multicast(&self) -> bool {
        self.0[0] & Self::MULTICAST_BIT != 0
    }

    pub fn is_locally_administered(&self) -> bool {
        self.0[0] & Self::LOCALLY_ADMINISTERED_BIT != 0
    }
}

impl From<[u8; MAC_ADDRESS_LENGTH]> for MacAddress {
    fn from(octets: [u8; MAC_ADDRESS_LENGTH]) -> Self {
        Self::from_octets(octets)
    }
}

impl From<MacAddress> for Vec<u8> {
    fn from(address: MacAddress) -> Self {
        address.0.to_vec()
    }
}

impl TryFrom<&[u8]> for MacAddress {
    type Error = MacAddressError;
    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let octets = <[u8; Self::LENGTH]>::try_from(bytes)
            .map_err(|_| MacAddressError::InvalidLength { length: bytes.len() })?;
        Ok(Self(octets))
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

impl FromStr for MacAddress {
    type Err = MacAddressError;
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let malformed = || MacAddressError::Malformed { value: value.to_owned() };

        let mut octets = [0u8; Self::LENGTH];
        let mut parts = value.split(':');
        for octet in octets.iter_mut() {
            let part = parts.next().ok_or_else(malformed)?;
            if part.len() != 2 {
                return Err(malformed());
            }
            *octet = u8::from_str_radix(part, 16).map_err(|_| malformed())?;
        }
        if parts.next().is_some() {
            return Err(malformed());
        }
        Ok(Self(octets))
    }
}

#[derive(thiserror::Error, Debug)]
pub enum MacAddressError {
    #[error("Could not obtain random bytes from the operating system: {cause}")]
    Entropy { cause: rand::rand_core::OsError },
    #[error("A MAC address consists of {expected} bytes, but {length} bytes were given.", expected = MacAddress::LENGTH)]
    InvalidLength { length: usize },
    #[error("'{value}' is not a MAC address in the form 'xx:xx:xx:xx:xx:xx'.")]
    Malformed { value: String },
}
