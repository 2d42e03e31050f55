//! One signing pipeline per artifact type: object root, epoch, domain,
//! signing root, optional caller root check, slashing protection where it
//! applies, then the BLS signature.

use alloy_primitives::{aliases::B32, hex, B256};
use remsig_consensus::{
    fork::ForkInfo,
    merkle,
    misc::{compute_domain, compute_fork_domain, compute_signing_root},
    signature::BlsSignature,
};
use remsig_keystore::ValidatorKey;
use remsig_network_spec::ChainSpec;
use remsig_slashing::{ProtectedKind, SlashingStore};
use tree_hash::TreeHash;

use crate::{
    envelope::{AggregateAndProofRequest, ArtifactType, RequestEnvelope},
    error::ApiError,
};

pub fn sign_request(
    envelope: &RequestEnvelope,
    key: &ValidatorKey,
    store: &dyn SlashingStore,
    spec: &ChainSpec,
) -> Result<String, ApiError> {
    let artifact =
        ArtifactType::parse(&envelope.artifact_type).ok_or(ApiError::UnsupportedType)?;

    if artifact.requires_fork_info() && envelope.fork_info.is_none() {
        return Err(invalid("fork_info must be specified"));
    }

    let signature = match artifact {
        ArtifactType::Attestation => sign_attestation(envelope, key, store, spec)?,
        ArtifactType::BlockV2 => sign_block(envelope, key, store, spec)?,
        ArtifactType::AggregationSlot => sign_aggregation_slot(envelope, key, spec)?,
        ArtifactType::AggregateAndProof | ArtifactType::AggregateAndProofV2 => {
            sign_aggregate_and_proof(envelope, key, spec)?
        }
        ArtifactType::VoluntaryExit => sign_voluntary_exit(envelope, key, spec)?,
        ArtifactType::RandaoReveal => sign_randao_reveal(envelope, key, spec)?,
        ArtifactType::SyncCommitteeMessage => sign_sync_committee_message(envelope, key, spec)?,
        ArtifactType::SyncCommitteeSelectionProof => {
            sign_sync_committee_selection_proof(envelope, key, spec)?
        }
        ArtifactType::SyncCommitteeContributionAndProof => {
            sign_contribution_and_proof(envelope, key, spec)?
        }
        ArtifactType::Deposit => sign_deposit(envelope, key, spec)?,
        ArtifactType::ValidatorRegistration => sign_validator_registration(envelope, key, spec)?,
    };

    Ok(signature.to_hex())
}

fn sign_attestation(
    envelope: &RequestEnvelope,
    key: &ValidatorKey,
    store: &dyn SlashingStore,
    spec: &ChainSpec,
) -> Result<BlsSignature, ApiError> {
    let attestation = envelope
        .attestation
        .as_ref()
        .ok_or_else(|| invalid("attestation must be specified"))?;
    let fork_info = required_fork_info(envelope)?;

    let domain = compute_fork_domain(
        spec.domain_beacon_attester,
        fork_info,
        attestation.target.epoch,
    );
    let signing_root = compute_signing_root(attestation.clone(), domain);

    finish_protected(
        envelope,
        key,
        store,
        ProtectedKind::Attestation,
        signing_root,
    )
}

fn sign_block(
    envelope: &RequestEnvelope,
    key: &ValidatorKey,
    store: &dyn SlashingStore,
    spec: &ChainSpec,
) -> Result<BlsSignature, ApiError> {
    let block_request = envelope
        .beacon_block
        .as_ref()
        .ok_or_else(|| invalid("beacon_block must be specified for type BLOCK_V2"))?;
    let fork_info = required_fork_info(envelope)?;

    let (object_root, slot) = match block_request.version.to_lowercase().as_str() {
        "phase0" | "altair" => {
            let block = block_request
                .block
                .as_ref()
                .ok_or_else(|| invalid("block must be specified for BLOCK_V2 PHASE0/ALTAIR"))?;
            (block.tree_hash_root(), block.slot)
        }
        _ => {
            let header = block_request
                .block_header
                .as_ref()
                .ok_or_else(|| invalid("block_header must be specified for BLOCK_V2 BELLATRIX+"))?;
            (header.tree_hash_root(), header.slot)
        }
    };

    let domain = compute_fork_domain(
        spec.domain_beacon_proposer,
        fork_info,
        spec.epoch_at_slot(slot),
    );
    let signing_root = compute_signing_root(object_root, domain);

    finish_protected(envelope, key, store, ProtectedKind::Block, signing_root)
}

fn sign_aggregation_slot(
    envelope: &RequestEnvelope,
    key: &ValidatorKey,
    spec: &ChainSpec,
) -> Result<BlsSignature, ApiError> {
    let aggregation_slot = envelope
        .aggregation_slot
        .as_ref()
        .ok_or_else(|| invalid("aggregation_slot must be specified"))?;
    let fork_info = required_fork_info(envelope)?;

    let object_root = merkle::uint64_root(aggregation_slot.slot);
    let domain = compute_fork_domain(
        spec.domain_selection_proof,
        fork_info,
        spec.epoch_at_slot(aggregation_slot.slot),
    );

    finish(envelope, key, compute_signing_root(object_root, domain))
}

fn sign_aggregate_and_proof(
    envelope: &RequestEnvelope,
    key: &ValidatorKey,
    spec: &ChainSpec,
) -> Result<BlsSignature, ApiError> {
    let request = envelope
        .aggregate_and_proof
        .as_ref()
        .ok_or_else(|| invalid("aggregate_and_proof must be specified"))?;
    let fork_info = required_fork_info(envelope)?;

    let (object_root, target_epoch) = match request {
        AggregateAndProofRequest::Legacy(aggregate_and_proof) => (
            aggregate_and_proof.tree_hash_root(),
            aggregate_and_proof.aggregate.data.target.epoch,
        ),
        AggregateAndProofRequest::Versioned { version, data } => {
            // Electra aggregates must ship their committee bitvector, but
            // the proof itself commits to the pre-Electra container root.
            if matches!(version.trim().to_uppercase().as_str(), "ELECTRA" | "FULU") {
                data.aggregate
                    .committee_bits()
                    .map_err(|err| invalid(format!("hash aggregate_and_proof SSZ: {err}")))?;
            }
            let proof = data
                .to_phase0()
                .map_err(|err| invalid(format!("hash aggregate_and_proof SSZ: {err}")))?;
            (proof.tree_hash_root(), data.aggregate.data.target.epoch)
        }
    };

    let domain = compute_fork_domain(spec.domain_aggregate_and_proof, fork_info, target_epoch);

    finish(envelope, key, compute_signing_root(object_root, domain))
}

fn sign_voluntary_exit(
    envelope: &RequestEnvelope,
    key: &ValidatorKey,
    spec: &ChainSpec,
) -> Result<BlsSignature, ApiError> {
    let voluntary_exit = envelope
        .voluntary_exit
        .as_ref()
        .ok_or_else(|| invalid("voluntary_exit must be specified"))?;
    let fork_info = required_fork_info(envelope)?;

    let domain = compute_fork_domain(
        spec.domain_voluntary_exit,
        fork_info,
        voluntary_exit.epoch,
    );
    let signing_root = compute_signing_root(voluntary_exit.clone(), domain);

    finish(envelope, key, signing_root)
}

fn sign_randao_reveal(
    envelope: &RequestEnvelope,
    key: &ValidatorKey,
    spec: &ChainSpec,
) -> Result<BlsSignature, ApiError> {
    let randao_reveal = envelope
        .randao_reveal
        .as_ref()
        .ok_or_else(|| invalid("randao_reveal must be specified"))?;
    let fork_info = required_fork_info(envelope)?;

    let object_root = merkle::uint64_root(randao_reveal.epoch);
    let domain = compute_fork_domain(spec.domain_randao, fork_info, randao_reveal.epoch);

    finish(envelope, key, compute_signing_root(object_root, domain))
}

fn sign_sync_committee_message(
    envelope: &RequestEnvelope,
    key: &ValidatorKey,
    spec: &ChainSpec,
) -> Result<BlsSignature, ApiError> {
    let message = envelope
        .sync_committee_message
        .as_ref()
        .ok_or_else(|| invalid("sync_committee_message must be specified"))?;
    let fork_info = required_fork_info(envelope)?;

    // The block root itself is the object being signed.
    let domain = compute_fork_domain(
        spec.domain_sync_committee,
        fork_info,
        spec.epoch_at_slot(message.slot),
    );
    let signing_root = compute_signing_root(message.beacon_block_root, domain);

    finish(envelope, key, signing_root)
}

fn sign_sync_committee_selection_proof(
    envelope: &RequestEnvelope,
    key: &ValidatorKey,
    spec: &ChainSpec,
) -> Result<BlsSignature, ApiError> {
    let selection_data = envelope
        .sync_aggregator_selection_data
        .as_ref()
        .ok_or_else(|| invalid("sync_aggregator_selection_data must be specified"))?;
    let fork_info = required_fork_info(envelope)?;

    let domain = compute_fork_domain(
        spec.domain_sync_committee_selection_proof,
        fork_info,
        spec.epoch_at_slot(selection_data.slot),
    );
    let signing_root = compute_signing_root(*selection_data, domain);

    finish(envelope, key, signing_root)
}

fn sign_contribution_and_proof(
    envelope: &RequestEnvelope,
    key: &ValidatorKey,
    spec: &ChainSpec,
) -> Result<BlsSignature, ApiError> {
    let contribution_and_proof = envelope
        .contribution_and_proof
        .as_ref()
        .ok_or_else(|| invalid("contribution_and_proof must be specified"))?;
    let fork_info = required_fork_info(envelope)?;

    let domain = compute_fork_domain(
        spec.domain_contribution_and_proof,
        fork_info,
        spec.epoch_at_slot(contribution_and_proof.contribution.slot),
    );
    let signing_root = compute_signing_root(contribution_and_proof.clone(), domain);

    finish(envelope, key, signing_root)
}

fn sign_deposit(
    envelope: &RequestEnvelope,
    key: &ValidatorKey,
    spec: &ChainSpec,
) -> Result<BlsSignature, ApiError> {
    let deposit = envelope
        .deposit
        .as_ref()
        .ok_or_else(|| invalid("deposit must be specified"))?;

    // Deposits are valid across forks: the domain mixes the request's
    // genesis fork version and a zero genesis validators root.
    let domain = compute_domain(
        spec.domain_deposit,
        Some(deposit.genesis_fork_version),
        None,
    );
    let signing_root = compute_signing_root(deposit.message(), domain);

    finish(envelope, key, signing_root)
}

fn sign_validator_registration(
    envelope: &RequestEnvelope,
    key: &ValidatorKey,
    spec: &ChainSpec,
) -> Result<BlsSignature, ApiError> {
    let registration = envelope
        .validator_registration
        .as_ref()
        .ok_or_else(|| invalid("validator_registration must be specified"))?;

    // The builder network pins the fork version to zero for every chain.
    let domain = compute_domain(spec.domain_application_mask, Some(B32::ZERO), None);
    let signing_root = compute_signing_root(registration.clone(), domain);

    finish(envelope, key, signing_root)
}

fn required_fork_info(envelope: &RequestEnvelope) -> Result<&ForkInfo, ApiError> {
    envelope
        .fork_info
        .as_ref()
        .ok_or_else(|| invalid("fork_info must be specified"))
}

fn invalid(message: impl Into<String>) -> ApiError {
    ApiError::InvalidRequest(message.into())
}

fn check_signing_root(envelope: &RequestEnvelope, computed: B256) -> Result<(), ApiError> {
    if let Some(provided) = envelope.signing_root {
        if provided != computed {
            return Err(ApiError::SigningRootMismatch {
                provided: hex::encode_prefixed(provided),
                computed: hex::encode_prefixed(computed),
            });
        }
    }
    Ok(())
}

fn finish(
    envelope: &RequestEnvelope,
    key: &ValidatorKey,
    signing_root: B256,
) -> Result<BlsSignature, ApiError> {
    check_signing_root(envelope, signing_root)?;
    Ok(key.sign(signing_root.as_slice()))
}

fn finish_protected(
    envelope: &RequestEnvelope,
    key: &ValidatorKey,
    store: &dyn SlashingStore,
    kind: ProtectedKind,
    signing_root: B256,
) -> Result<BlsSignature, ApiError> {
    check_signing_root(envelope, signing_root)?;

    let pubkey = key.public_key().inner;
    let allowed = store
        .can_sign(kind, &pubkey, signing_root.as_slice())
        .map_err(|source| ApiError::Storage {
            kind: kind.label(),
            source,
        })?;
    if !allowed {
        return Err(ApiError::AlreadySigned { kind: kind.label() });
    }

    let signature = key.sign(signing_root.as_slice());

    // The insert is the authoritative check: losing the race to a concurrent
    // identical request surfaces the same rejection.
    let inserted = store
        .try_insert(kind, &pubkey, signing_root.as_slice())
        .map_err(|source| ApiError::Storage {
            kind: kind.label(),
            source,
        })?;
    if !inserted {
        return Err(ApiError::AlreadySigned { kind: kind.label() });
    }

    Ok(signature)
}
