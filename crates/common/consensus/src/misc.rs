use alloy_primitives::{aliases::B32, B256};
use tree_hash::TreeHash;

use crate::{
    fork::ForkInfo,
    fork_data::ForkData,
    primitives::{Domain, DomainType, Epoch},
    signing_data::SigningData,
};

pub fn compute_signing_root<SSZObject: TreeHash>(ssz_object: SSZObject, domain: Domain) -> B256 {
    SigningData {
        object_root: ssz_object.tree_hash_root(),
        domain,
    }
    .tree_hash_root()
}

/// Return the domain for the ``domain_type`` and ``fork_version``
pub fn compute_domain(
    domain_type: DomainType,
    fork_version: Option<B32>,
    genesis_validators_root: Option<B256>,
) -> Domain {
    let fork_data = ForkData {
        current_version: fork_version.unwrap_or_default(),
        genesis_validators_root: genesis_validators_root.unwrap_or_default(),
    };
    let fork_data_root = fork_data.compute_fork_data_root();
    let domain_bytes = [&domain_type.0[..], &fork_data_root.0[..28]].concat();
    B256::from_slice(&domain_bytes)
}

/// Return the domain in force at ``epoch`` under the request's fork schedule.
pub fn compute_fork_domain(
    domain_type: DomainType,
    fork_info: &ForkInfo,
    epoch: Epoch,
) -> Domain {
    compute_domain(
        domain_type,
        Some(fork_info.fork_version_at(epoch)),
        Some(fork_info.genesis_validators_root),
    )
}
