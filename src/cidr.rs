// Copyright (c) 2025 - Cowboy AI, Inc.
//! CIDR Allocation
//!
//! Deterministic, non-overlapping address-block assignment. Every region's
//! /16 comes from a fixed table inside 10.0.0.0/8, so blocks for distinct
//! indices never overlap by construction. Subnets are /24s carved from the
//! region block by a pure offset formula with disjoint ranges per tier, so
//! public and private subnets never overlap within a region either.

use crate::errors::{ComposerError, ComposerResult};
use ipnet::Ipv4Net;
use std::collections::BTreeMap;
use std::net::Ipv4Addr;

/// Hard ceiling of availability zones per subnet tier.
///
/// The third octet reserves offsets 0..10 for the public tier and 10..20
/// for the private tier; an AZ index at or past the ceiling would bleed
/// into the next tier's range.
pub const MAX_AZS_PER_TIER: u8 = 10;

/// Subnet tier within a region block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubnetTier {
    /// Internet-facing subnets, offsets 0..10
    Public,
    /// Internal subnets, offsets 10..20
    Private,
}

impl SubnetTier {
    /// First third-octet offset reserved for this tier
    pub fn offset_base(&self) -> u8 {
        match self {
            SubnetTier::Public => 0,
            SubnetTier::Private => MAX_AZS_PER_TIER,
        }
    }

    /// Tier name as used in identifiers
    pub fn as_str(&self) -> &'static str {
        match self {
            SubnetTier::Public => "public",
            SubnetTier::Private => "private",
        }
    }
}

/// The /16 block for a CIDR table index: `10.{index}.0.0/16`
pub fn region_block(cidr_index: u8) -> Ipv4Net {
    // A /16 prefix is always valid for an IPv4 network
    Ipv4Net::new_assert(Ipv4Addr::new(10, cidr_index, 0, 0), 16)
}

/// The /24 subnet for a tier and AZ within a region block.
///
/// Pure formula: third octet = tier base + AZ index. Fails with
/// [`ComposerError::AddressSpaceExhausted`] when the AZ index reaches
/// [`MAX_AZS_PER_TIER`].
pub fn subnet(block: Ipv4Net, tier: SubnetTier, az: u8) -> ComposerResult<Ipv4Net> {
    if az >= MAX_AZS_PER_TIER {
        return Err(ComposerError::AddressSpaceExhausted(format!(
            "AZ index {} exceeds the {} reserved {} offsets in {}",
            az,
            MAX_AZS_PER_TIER,
            tier.as_str(),
            block
        )));
    }
    let base = block.network().octets();
    Ok(Ipv4Net::new_assert(
        Ipv4Addr::new(base[0], base[1], tier.offset_base() + az, 0),
        24,
    ))
}

/// Whether two blocks share any address
pub fn blocks_overlap(a: &Ipv4Net, b: &Ipv4Net) -> bool {
    a.contains(&b.network()) || b.contains(&a.network())
}

/// Per-run allocation record.
///
/// The table itself is static; this struct only remembers which index each
/// region claimed so overlap checking can see all claims in one place. It
/// is shared state for uniqueness checking and is never mutated externally.
#[derive(Debug, Clone, Default)]
pub struct CidrAllocator {
    allocated: BTreeMap<u8, Ipv4Net>,
}

impl CidrAllocator {
    /// Create an empty allocator for one composer run
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the region block for an index and record the claim.
    ///
    /// A repeated index returns the same block; the resulting overlap is
    /// the graph validator's to report, keeping construction deterministic.
    pub fn allocate_region_block(&mut self, cidr_index: u8) -> Ipv4Net {
        let block = region_block(cidr_index);
        self.allocated.insert(cidr_index, block);
        block
    }

    /// All claims made this run, in index order
    pub fn allocated_blocks(&self) -> impl Iterator<Item = (u8, Ipv4Net)> + '_ {
        self.allocated.iter().map(|(index, block)| (*index, *block))
    }
}
