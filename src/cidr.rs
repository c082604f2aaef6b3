//! IPv4 CIDR arithmetic for VPC subnet partitioning.
//!
//! A VPC carves its address block into subnets at synthesis time. This module
//! provides the block representation plus a sequential allocator that hands
//! out non-overlapping child blocks in declaration order, failing with a
//! typed error when a requested mask no longer fits.

use crate::error::{Error, Result};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

/// An IPv4 address block in CIDR notation.
///
/// The network address is normalized on construction: host bits below the
/// prefix length are cleared, so `10.0.0.5/16` and `10.0.0.0/16` compare
/// equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ipv4Cidr {
    network: u32,
    prefix_len: u8,
}

impl Ipv4Cidr {
    /// Creates a block from an address and prefix length, normalizing the
    /// network address.
    pub fn new(addr: Ipv4Addr, prefix_len: u8) -> Result<Self> {
        if prefix_len > 32 {
            return Err(Error::invalid_cidr(
                format!("{addr}/{prefix_len}"),
                "prefix length must be at most 32",
            ));
        }
        let raw = u32::from(addr);
        Ok(Self {
            network: raw & Self::mask_bits(prefix_len),
            prefix_len,
        })
    }

    /// Parses `a.b.c.d/len` notation.
    pub fn parse(s: &str) -> Result<Self> {
        let (addr_part, len_part) = s
            .split_once('/')
            .ok_or_else(|| Error::invalid_cidr(s, "expected 'a.b.c.d/len' notation"))?;
        let addr = Ipv4Addr::from_str(addr_part)
            .map_err(|e| Error::invalid_cidr(s, format!("invalid address: {e}")))?;
        let prefix_len: u8 = len_part
            .parse()
            .map_err(|_| Error::invalid_cidr(s, "prefix length is not a number"))?;
        Self::new(addr, prefix_len)
    }

    /// The network address of the block.
    pub fn network(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.network)
    }

    /// The prefix length of the block.
    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    /// Number of addresses covered by the block.
    pub fn address_count(&self) -> u64 {
        1u64 << (32 - self.prefix_len)
    }

    /// The first address after the block, or `None` if the block ends at the
    /// top of the address space.
    fn next_address(&self) -> Option<u32> {
        let size = 1u64 << (32 - self.prefix_len);
        let end = u64::from(self.network) + size;
        u32::try_from(end).ok()
    }

    /// Returns true if `addr` falls inside this block.
    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        u32::from(addr) & Self::mask_bits(self.prefix_len) == self.network
    }

    /// Returns true if the two blocks share any address.
    pub fn overlaps(&self, other: &Ipv4Cidr) -> bool {
        let shorter = self.prefix_len.min(other.prefix_len);
        let mask = Self::mask_bits(shorter);
        self.network & mask == other.network & mask
    }

    fn mask_bits(prefix_len: u8) -> u32 {
        if prefix_len == 0 {
            0
        } else {
            u32::MAX << (32 - prefix_len)
        }
    }
}

impl fmt::Display for Ipv4Cidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network(), self.prefix_len)
    }
}

impl FromStr for Ipv4Cidr {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Sequential subnet allocator over a parent block.
///
/// Allocations are handed out in call order, each aligned to its own size,
/// so the resulting blocks never overlap. Alignment gaps (a smaller subnet
/// followed by a larger one) are skipped, matching how address planners lay
/// out mixed-size subnets.
#[derive(Debug)]
pub struct CidrAllocator {
    parent: Ipv4Cidr,
    cursor: u64,
    allocated: Vec<Ipv4Cidr>,
}

impl CidrAllocator {
    /// Creates an allocator over the given parent block.
    pub fn new(parent: Ipv4Cidr) -> Self {
        Self {
            parent,
            cursor: u64::from(parent.network),
            allocated: Vec::new(),
        }
    }

    /// Allocates the next free block with the given mask length.
    pub fn allocate(&mut self, mask: u8) -> Result<Ipv4Cidr> {
        if mask > 32 || mask < self.parent.prefix_len {
            return Err(Error::invalid_cidr(
                format!("{}/{mask}", self.parent.network()),
                format!(
                    "subnet mask /{mask} is not inside parent {}",
                    self.parent
                ),
            ));
        }
        let size = 1u64 << (32 - mask);
        // Align the cursor up to the subnet size.
        let start = (self.cursor + size - 1) / size * size;
        let parent_end = u64::from(self.parent.network) + self.parent.address_count();
        if start + size > parent_end {
            return Err(Error::CidrExhausted {
                block: self.parent.to_string(),
                mask,
            });
        }
        self.cursor = start + size;
        let block = Ipv4Cidr {
            network: start as u32,
            prefix_len: mask,
        };
        self.allocated.push(block);
        Ok(block)
    }

    /// Blocks allocated so far, in allocation order.
    pub fn allocated(&self) -> &[Ipv4Cidr] {
        &self.allocated
    }
}

/// Computes the default mask for dividing `parent` evenly into `count`
/// subnets: the smallest power-of-two split that yields at least `count`
/// blocks.
pub fn even_division_mask(parent: &Ipv4Cidr, count: usize) -> Result<u8> {
    if count == 0 {
        return Err(Error::Internal(
            "cannot divide a block into zero subnets".into(),
        ));
    }
    let extra_bits = (usize::BITS - (count - 1).leading_zeros()) as u8;
    let mask = parent.prefix_len() + extra_bits;
    // /28 is the smallest subnet CloudFormation accepts.
    if mask > 28 {
        return Err(Error::CidrExhausted {
            block: parent.to_string(),
            mask,
        });
    }
    Ok(mask)
}
