use proptest::prelude::*;

use directsend_crypto::voter_keys_from_seed;
use directsend_engine::outpoint_lock::{OutPointLock, SIGNATURES_REQUIRED};
use directsend_engine::vote::TxLockVote;
use directsend_messages::LockVoteMessage;
use directsend_types::{OutPoint, Timestamp, TxHash, VoterId};

fn make_outpoint(byte: u8, index: u32) -> OutPoint {
    OutPoint::new(TxHash::new([byte; 32]), index)
}

fn make_vote(tx_byte: u8, outpoint: OutPoint, voter_byte: u8, at: u64) -> TxLockVote {
    TxLockVote::new(
        TxHash::new([tx_byte; 32]),
        outpoint,
        VoterId::new(make_outpoint(voter_byte, 0)),
        Timestamp::new(at),
    )
}

proptest! {
    /// No two votes inside one outpoint tally ever share a voter, no
    /// matter the insertion order or duplication in the input.
    #[test]
    fn outpoint_lock_holds_one_vote_per_voter(
        voters in proptest::collection::vec(0u8..20, 1..60),
    ) {
        let outpoint = make_outpoint(1, 0);
        let mut lock = OutPointLock::new(outpoint);
        for &voter in &voters {
            lock.add_vote(make_vote(9, outpoint, voter, 100));
        }

        let distinct: std::collections::BTreeSet<u8> = voters.iter().copied().collect();
        prop_assert_eq!(lock.vote_count() as usize, distinct.len());

        let seen: Vec<VoterId> = lock.votes().map(|v| v.voter()).collect();
        let unique: std::collections::BTreeSet<VoterId> = seen.iter().copied().collect();
        prop_assert_eq!(seen.len(), unique.len());
    }

    /// The attacked latch is permanent: no sequence of later votes makes
    /// the tally ready again.
    #[test]
    fn attacked_lock_stays_unready(
        before in proptest::collection::vec(0u8..30, 0..20),
        after in proptest::collection::vec(0u8..30, 0..30),
    ) {
        let outpoint = make_outpoint(1, 0);
        let mut lock = OutPointLock::new(outpoint);
        for &voter in &before {
            lock.add_vote(make_vote(9, outpoint, voter, 100));
        }
        lock.mark_attacked();
        for &voter in &after {
            lock.add_vote(make_vote(9, outpoint, voter, 100));
            prop_assert!(!lock.is_ready());
        }
        prop_assert!(!lock.is_ready());
    }

    /// Readiness is exactly the unique-voter threshold (absent attacks).
    #[test]
    fn readiness_matches_unique_voter_threshold(
        voters in proptest::collection::vec(0u8..40, 0..60),
    ) {
        let outpoint = make_outpoint(1, 0);
        let mut lock = OutPointLock::new(outpoint);
        for &voter in &voters {
            lock.add_vote(make_vote(9, outpoint, voter, 100));
        }
        let distinct: std::collections::BTreeSet<u8> = voters.iter().copied().collect();
        prop_assert_eq!(lock.is_ready(), distinct.len() as u32 >= SIGNATURES_REQUIRED);
    }

    /// Serializing then deserializing a signed vote preserves its identity
    /// hash and its signature validity.
    #[test]
    fn vote_wire_roundtrip_preserves_hash(
        tx_byte in 0u8..=255,
        outpoint_byte in 0u8..=255,
        outpoint_index in 0u32..1000,
        voter_byte in 0u8..=255,
        seed in 1u8..=255,
    ) {
        let outpoint = make_outpoint(outpoint_byte, outpoint_index);
        let mut vote = make_vote(tx_byte, outpoint, voter_byte, 100);
        let keypair = voter_keys_from_seed(&[seed; 32]);
        vote.sign(&keypair.secret);

        let msg = vote.to_message().expect("signed vote has a wire form");
        let bytes = directsend_messages::encode(&msg).expect("encode");
        let back: LockVoteMessage = directsend_messages::decode(&bytes).expect("decode");
        let restored = TxLockVote::from_message(back, Timestamp::new(777));

        prop_assert_eq!(restored.hash(), vote.hash());
        prop_assert!(restored.check_signature(&keypair.public));
    }

    /// Expiry never triggers for unconfirmed votes and is exact at the
    /// keep-depth boundary for confirmed ones.
    #[test]
    fn expiry_boundary_is_exact(
        confirmed in 0u32..10_000,
        depth in 1u32..100,
        extra in 0u32..200,
    ) {
        let outpoint = make_outpoint(1, 0);
        let mut vote = make_vote(9, outpoint, 2, 100);
        prop_assert!(!vote.is_expired(confirmed + depth + extra, depth));

        vote.set_confirmed_height(i64::from(confirmed));
        let height = confirmed + depth + extra;
        prop_assert_eq!(vote.is_expired(height, depth), extra > 0);
    }
}
