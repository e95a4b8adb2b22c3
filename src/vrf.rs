//! VRF proof verification and dice-face derivation.
//!
//! Scheme (sr25519): the oracle signs a game seed under a fixed signing
//! context; the signature is the proof, and SHA-256 of the signature is the
//! random output. Verification re-checks the signature under the registered
//! public key and re-derives the output from the proof, so a
//! (seed, output, proof) triple is binding and publicly checkable.
//!
//! The settlement path only ever verifies; the prover ([`VrfEngine`]) exists
//! for the oracle side and for tests.

use crate::errors::{GameError, GameResult};
use schnorrkel::context::SigningContext;
use schnorrkel::{ExpansionMode, Keypair, MiniSecretKey, PublicKey, Signature};
use sha2::{Digest, Sha256};

const VRF_SIGNING_CONTEXT: &[u8] = b"dicehouse-vrf-v1";

/// sr25519 public key length in bytes.
pub const PUBLIC_KEY_LENGTH: usize = 32;
/// sr25519 signature (= VRF proof) length in bytes.
pub const PROOF_LENGTH: usize = 64;

/// Derive a dice face in [1, 6] from a VRF output.
///
/// Hashes the output once more and maps the first byte onto the faces, so
/// the face is a deterministic, pure function of the output.
pub fn derive_face(random_output: &[u8]) -> u8 {
    let digest = Sha256::digest(random_output);
    (digest[0] % 6) + 1
}

/// Verify that `random_output` is the VRF output for `seed` under `public_key`.
pub fn verify_output(
    public_key: &[u8; PUBLIC_KEY_LENGTH],
    seed: &[u8],
    random_output: &[u8],
    proof: &[u8],
) -> GameResult<()> {
    let pk = PublicKey::from_bytes(public_key)
        .map_err(|e| GameError::InvalidProof(format!("invalid public key: {:?}", e)))?;

    let proof_bytes: [u8; PROOF_LENGTH] = proof
        .try_into()
        .map_err(|_| GameError::InvalidProof(format!("proof must be {} bytes", PROOF_LENGTH)))?;
    let signature = Signature::from_bytes(&proof_bytes)
        .map_err(|e| GameError::InvalidProof(format!("malformed proof: {:?}", e)))?;

    let ctx = SigningContext::new(VRF_SIGNING_CONTEXT);
    pk.verify(ctx.bytes(seed), &signature).map_err(|_| {
        GameError::InvalidProof("signature does not match seed under registered key".to_string())
    })?;

    // The output must be exactly the hash of the proof; anything else is a
    // forged output attached to a genuine signature.
    let expected = Sha256::digest(proof_bytes);
    if expected.as_slice() != random_output {
        return Err(GameError::InvalidProof(
            "random output does not match proof".to_string(),
        ));
    }

    Ok(())
}

/// Verify a proof and derive the dice face in one step.
pub fn verified_face(
    public_key: &[u8; PUBLIC_KEY_LENGTH],
    seed: &[u8],
    random_output: &[u8],
    proof: &[u8],
) -> GameResult<u8> {
    verify_output(public_key, seed, random_output, proof)?;
    Ok(derive_face(random_output))
}

/// Generate a fresh 32-byte one-time seed.
///
/// Player-side helper; seeds only need to be unpredictable and never reused.
pub fn random_seed() -> Vec<u8> {
    use rand::RngCore;
    let mut bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    bytes.to_vec()
}

/// Oracle-side VRF prover.
pub struct VrfEngine {
    keypair: Keypair,
}

impl VrfEngine {
    pub fn new(keypair: Keypair) -> Self {
        Self { keypair }
    }

    /// Prover with a random keypair.
    pub fn new_random() -> Self {
        use rand_core::OsRng;
        Self::new(Keypair::generate_with(OsRng))
    }

    /// Prover expanded from a 32-byte mini secret seed.
    ///
    /// Deterministic: the same seed always yields the same keypair.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        let mini = MiniSecretKey::from_bytes(&seed)
            .expect("a 32-byte seed is always a valid mini secret key");
        Self::new(mini.expand_to_keypair(ExpansionMode::Ed25519))
    }

    /// Produce the (random_output, proof) pair for a seed.
    pub fn prove(&self, seed: &[u8]) -> (Vec<u8>, Vec<u8>) {
        let ctx = SigningContext::new(VRF_SIGNING_CONTEXT);
        let signature = self.keypair.sign(ctx.bytes(seed));
        let proof = signature.to_bytes().to_vec();
        let output = Sha256::digest(&proof).to_vec();
        (output, proof)
    }

    pub fn public_key(&self) -> [u8; PUBLIC_KEY_LENGTH] {
        self.keypair.public.to_bytes()
    }

    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prove_verify_roundtrip() {
        let engine = VrfEngine::new_random();
        let seed = b"game-seed-1".to_vec();

        let (output, proof) = engine.prove(&seed);
        verify_output(&engine.public_key(), &seed, &output, &proof)
            .expect("genuine proof should verify");

        let face = verified_face(&engine.public_key(), &seed, &output, &proof).unwrap();
        assert!((1..=6).contains(&face));
    }

    #[test]
    fn test_prove_is_deterministic_per_seed() {
        let engine = VrfEngine::from_seed([7u8; 32]);
        let (out1, proof1) = engine.prove(b"seed");
        let (out2, proof2) = engine.prove(b"seed");
        assert_eq!(out1, out2);
        assert_eq!(proof1, proof2);
        assert_eq!(derive_face(&out1), derive_face(&out2));
    }

    #[test]
    fn test_tampered_output_rejected() {
        let engine = VrfEngine::new_random();
        let (mut output, proof) = engine.prove(b"seed");
        output[0] ^= 0xff;

        let err = verify_output(&engine.public_key(), b"seed", &output, &proof).unwrap_err();
        assert!(matches!(err, GameError::InvalidProof(_)));
    }

    #[test]
    fn test_tampered_proof_rejected() {
        let engine = VrfEngine::new_random();
        let (output, mut proof) = engine.prove(b"seed");
        proof[10] ^= 0x01;

        assert!(verify_output(&engine.public_key(), b"seed", &output, &proof).is_err());
    }

    #[test]
    fn test_proof_bound_to_seed_and_key() {
        let engine = VrfEngine::new_random();
        let (output, proof) = engine.prove(b"seed-a");

        // Same proof against a different seed fails.
        assert!(verify_output(&engine.public_key(), b"seed-b", &output, &proof).is_err());

        // Same proof against a different key fails.
        let other = VrfEngine::new_random();
        assert!(verify_output(&other.public_key(), b"seed-a", &output, &proof).is_err());
    }

    #[test]
    fn test_truncated_proof_rejected() {
        let engine = VrfEngine::new_random();
        let (output, proof) = engine.prove(b"seed");
        let err = verify_output(&engine.public_key(), b"seed", &output, &proof[..32]).unwrap_err();
        assert!(matches!(err, GameError::InvalidProof(_)));
    }

    #[test]
    fn test_face_range_over_many_outputs() {
        for i in 0u32..256 {
            let face = derive_face(&i.to_le_bytes());
            assert!((1..=6).contains(&face), "face {} out of range", face);
        }
    }

    #[test]
    fn test_random_seed_shape() {
        let a = random_seed();
        let b = random_seed();
        assert_eq!(a.len(), 32);
        assert_ne!(a, b);
    }
}
