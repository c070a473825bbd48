//! Domain Services
//!
//! Secret content sealing and the secret-question lock:
//! - content is sealed under the master key, bound to the secret id
//! - a question set splits a fresh content key into Shamir shares, seals
//!   each share under a key derived from one answer, and time-locks the
//!   sealed shares to the round of the owner's release deadline

use chrono::{DateTime, Utc};
use kernel::id::{AssignmentId, QuestionSetId, SecretId};
use platform::seal::{self, SealedBox, SealingKey};
use platform::sharing::{KeyShare, combine_shares, split_secret};
use platform::timelock::{Beacon, TimelockEnvelope, timelock_decrypt, timelock_encrypt};
use unicode_normalization::UnicodeNormalization;
use zeroize::Zeroizing;

use crate::domain::entity::question_set::{QuestionAnswer, SecretQuestion};
use crate::error::{VaultError, VaultResult};

// ============================================================================
// Secret content
// ============================================================================

pub fn seal_content(master_key: &SealingKey, id: &SecretId, content: &[u8]) -> VaultResult<Vec<u8>> {
    Ok(seal::seal(master_key, content, id.as_uuid().as_bytes())?.to_bytes())
}

pub fn open_content(
    master_key: &SealingKey,
    id: &SecretId,
    sealed_content: &[u8],
) -> VaultResult<Zeroizing<Vec<u8>>> {
    let sealed = SealedBox::from_bytes(sealed_content)?;
    Ok(seal::open(master_key, &sealed, id.as_uuid().as_bytes())?)
}

// ============================================================================
// Answers
// ============================================================================

/// Trim, NFKC, lowercase, collapse internal whitespace
pub fn normalize_answer(answer: &str) -> String {
    let normalized: String = answer.nfkc().collect::<String>().to_lowercase();
    normalized.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn answer_key(set_id: &QuestionSetId, position: u8, answer: &str) -> VaultResult<SealingKey> {
    let normalized = Zeroizing::new(normalize_answer(answer));
    let info = format!("answer:{position}");
    Ok(SealingKey::derive(
        normalized.as_bytes(),
        set_id.as_uuid().as_bytes(),
        info.as_bytes(),
    )?)
}

fn share_aad(position: u8) -> [u8; 1] {
    [position]
}

// ============================================================================
// Share bundle
// ============================================================================

/// `count (u8) || (len (u16 BE) || sealed share)*`
fn encode_bundle(sealed_shares: &[Vec<u8>]) -> VaultResult<Vec<u8>> {
    let count = u8::try_from(sealed_shares.len())
        .map_err(|_| VaultError::Internal("Too many shares".to_string()))?;
    let mut out = vec![count];
    for share in sealed_shares {
        let len = u16::try_from(share.len())
            .map_err(|_| VaultError::Internal("Share too large".to_string()))?;
        out.extend_from_slice(&len.to_be_bytes());
        out.extend_from_slice(share);
    }
    Ok(out)
}

fn decode_bundle(bytes: &[u8]) -> VaultResult<Vec<Vec<u8>>> {
    let malformed = || VaultError::Crypto("Malformed share bundle".to_string());

    let (&count, mut rest) = bytes.split_first().ok_or_else(malformed)?;
    let mut shares = Vec::with_capacity(usize::from(count));
    for _ in 0..count {
        if rest.len() < 2 {
            return Err(malformed());
        }
        let len = usize::from(u16::from_be_bytes([rest[0], rest[1]]));
        rest = &rest[2..];
        if rest.len() < len {
            return Err(malformed());
        }
        let (share, tail) = rest.split_at(len);
        shares.push(share.to_vec());
        rest = tail;
    }
    if !rest.is_empty() {
        return Err(malformed());
    }
    Ok(shares)
}

// ============================================================================
// Question lock
// ============================================================================

/// Everything a question set stores besides its identity
#[derive(Debug, Clone)]
pub struct QuestionLock {
    pub questions: Vec<SecretQuestion>,
    pub recipient_ciphertext: Vec<u8>,
    pub sealed_shares: Vec<u8>,
    pub timelock_round: u64,
    pub timelocked_shares: Vec<u8>,
}

pub struct LockParams<'a> {
    pub set_id: &'a QuestionSetId,
    pub assignment_id: &'a AssignmentId,
    pub threshold: u8,
    pub pairs: &'a [QuestionAnswer],
    pub plaintext: &'a [u8],
    /// Unlock no earlier than this
    pub deadline: DateTime<Utc>,
}

pub fn lock_with_questions<B: Beacon + ?Sized>(
    params: LockParams<'_>,
    master_key: &SealingKey,
    beacon: &B,
) -> VaultResult<QuestionLock> {
    let share_count = u8::try_from(params.pairs.len())
        .map_err(|_| VaultError::Internal("Too many questions".to_string()))?;

    let content_key = SealingKey::generate();
    let recipient_ciphertext = seal::seal(
        &content_key,
        params.plaintext,
        params.assignment_id.as_uuid().as_bytes(),
    )?
    .to_bytes();

    let shares = split_secret(content_key.as_bytes(), params.threshold, share_count)?;

    let mut questions = Vec::with_capacity(shares.len());
    let mut sealed = Vec::with_capacity(shares.len());
    for ((index, pair), share) in params.pairs.iter().enumerate().zip(&shares) {
        let position = u8::try_from(index + 1)
            .map_err(|_| VaultError::Internal("Too many questions".to_string()))?;
        let key = answer_key(params.set_id, position, &pair.answer)?;
        sealed.push(seal::seal(&key, share.as_bytes(), &share_aad(position))?.to_bytes());
        questions.push(SecretQuestion {
            position,
            question: pair.question.trim().to_string(),
        });
    }

    let bundle = Zeroizing::new(encode_bundle(&sealed)?);
    let sealed_shares =
        seal::seal(master_key, &bundle, params.set_id.as_uuid().as_bytes())?.to_bytes();

    let timelock_round = beacon
        .schedule()
        .round_for_deadline(params.deadline.timestamp());
    let timelocked_shares = timelock_encrypt(beacon, timelock_round, &bundle)?.to_bytes();

    Ok(QuestionLock {
        questions,
        recipient_ciphertext,
        sealed_shares,
        timelock_round,
        timelocked_shares,
    })
}

/// New `(round, timelocked_shares)` for a later deadline
pub fn relock<B: Beacon + ?Sized>(
    set_id: &QuestionSetId,
    sealed_shares: &[u8],
    deadline: DateTime<Utc>,
    master_key: &SealingKey,
    beacon: &B,
) -> VaultResult<(u64, Vec<u8>)> {
    let sealed = SealedBox::from_bytes(sealed_shares)?;
    let bundle = seal::open(master_key, &sealed, set_id.as_uuid().as_bytes())?;

    let round = beacon.schedule().round_for_deadline(deadline.timestamp());
    let envelope = timelock_encrypt(beacon, round, &bundle)?;
    Ok((round, envelope.to_bytes()))
}

pub struct UnlockParams<'a> {
    pub set_id: &'a QuestionSetId,
    pub assignment_id: &'a AssignmentId,
    pub threshold: u8,
    pub recipient_ciphertext: &'a [u8],
    pub timelocked_shares: &'a [u8],
    /// In question order; missing trailing answers count as wrong
    pub answers: &'a [String],
    pub now: DateTime<Utc>,
}

pub fn unlock_with_answers<B: Beacon + ?Sized>(
    params: UnlockParams<'_>,
    beacon: &B,
) -> VaultResult<Zeroizing<Vec<u8>>> {
    let envelope = TimelockEnvelope::from_bytes(params.timelocked_shares)?;
    let bundle = timelock_decrypt(beacon, &envelope, params.now)?;
    let sealed_shares = decode_bundle(&bundle)?;

    let mut shares: Vec<KeyShare> = Vec::new();
    for (index, (sealed, answer)) in sealed_shares.iter().zip(params.answers).enumerate() {
        let position = u8::try_from(index + 1)
            .map_err(|_| VaultError::Internal("Too many questions".to_string()))?;
        if answer.trim().is_empty() {
            continue;
        }
        let key = answer_key(params.set_id, position, answer)?;
        let Ok(sealed) = SealedBox::from_bytes(sealed) else {
            continue;
        };
        if let Ok(share) = seal::open(&key, &sealed, &share_aad(position)) {
            shares.push(KeyShare::from_bytes(share.to_vec())?);
        }
    }

    let needed = usize::from(params.threshold);
    if shares.len() < needed {
        return Err(VaultError::InsufficientAnswers {
            correct: shares.len(),
            needed,
        });
    }

    let key_bytes = combine_shares(params.threshold, &shares)?;
    let content_key = SealingKey::from_slice(&key_bytes)?;
    let ciphertext = SealedBox::from_bytes(params.recipient_ciphertext)?;
    Ok(seal::open(
        &content_key,
        &ciphertext,
        params.assignment_id.as_uuid().as_bytes(),
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use platform::timelock::{LocalBeacon, RoundSchedule};

    fn beacon() -> LocalBeacon {
        LocalBeacon::new(RoundSchedule::new(1_700_000_000, 30), b"beacon-secret")
    }

    fn pairs() -> Vec<QuestionAnswer> {
        [("First pet?", "Rex"), ("Birth city?", "São Paulo"), ("Favourite tea?", "Earl  Grey")]
            .iter()
            .map(|(q, a)| QuestionAnswer {
                question: q.to_string(),
                answer: a.to_string(),
            })
            .collect()
    }

    struct Fixture {
        set_id: QuestionSetId,
        assignment_id: AssignmentId,
        master_key: SealingKey,
        deadline: DateTime<Utc>,
        lock: QuestionLock,
    }

    fn fixture(threshold: u8) -> Fixture {
        let set_id = QuestionSetId::new();
        let assignment_id = AssignmentId::new();
        let master_key = SealingKey::generate();
        let deadline = Utc::now() + Duration::days(10);
        let pairs = pairs();
        let lock = lock_with_questions(
            LockParams {
                set_id: &set_id,
                assignment_id: &assignment_id,
                threshold,
                pairs: &pairs,
                plaintext: b"the vault code is 0451",
                deadline,
            },
            &master_key,
            &beacon(),
        )
        .unwrap();
        Fixture {
            set_id,
            assignment_id,
            master_key,
            deadline,
            lock,
        }
    }

    fn unlock(f: &Fixture, threshold: u8, answers: &[&str], now: DateTime<Utc>) -> VaultResult<Zeroizing<Vec<u8>>> {
        let answers: Vec<String> = answers.iter().map(|a| a.to_string()).collect();
        unlock_with_answers(
            UnlockParams {
                set_id: &f.set_id,
                assignment_id: &f.assignment_id,
                threshold,
                recipient_ciphertext: &f.lock.recipient_ciphertext,
                timelocked_shares: &f.lock.timelocked_shares,
                answers: &answers,
                now,
            },
            &beacon(),
        )
    }

    #[test]
    fn test_normalize_answer() {
        assert_eq!(normalize_answer("  Earl   Grey\t"), "earl grey");
        assert_eq!(normalize_answer("ＲＥＸ"), "rex");
        assert_eq!(normalize_answer("São"), normalize_answer("Sa\u{0303}o"));
    }

    #[test]
    fn test_content_bound_to_secret_id() {
        let key = SealingKey::generate();
        let id = SecretId::new();
        let sealed = seal_content(&key, &id, b"hello").unwrap();
        assert_eq!(&open_content(&key, &id, &sealed).unwrap()[..], b"hello");
        assert!(open_content(&key, &SecretId::new(), &sealed).is_err());
    }

    #[test]
    fn test_lock_keeps_only_prompts() {
        let f = fixture(2);
        assert_eq!(f.lock.questions.len(), 3);
        assert_eq!(f.lock.questions[0].position, 1);
        assert_eq!(f.lock.questions[2].question, "Favourite tea?");
        assert_eq!(
            f.lock.timelock_round,
            beacon().schedule().round_for_deadline(f.deadline.timestamp())
        );
    }

    #[test]
    fn test_unlock_before_round_is_too_early() {
        let f = fixture(2);
        let err = unlock(&f, 2, &["rex", "são paulo", "earl grey"], Utc::now()).unwrap_err();
        assert!(matches!(err, VaultError::TooEarly { .. }));
    }

    #[test]
    fn test_unlock_with_threshold_answers() {
        let f = fixture(2);
        let after = f.deadline + Duration::minutes(1);

        let plain = unlock(&f, 2, &["REX", "wrong", " earl grey "], after).unwrap();
        assert_eq!(&plain[..], b"the vault code is 0451");

        let err = unlock(&f, 2, &["rex", "wrong", "wrong"], after).unwrap_err();
        assert!(matches!(
            err,
            VaultError::InsufficientAnswers { correct: 1, needed: 2 }
        ));

        let err = unlock(&f, 2, &["rex"], after).unwrap_err();
        assert!(matches!(err, VaultError::InsufficientAnswers { correct: 1, .. }));
    }

    #[test]
    fn test_relock_moves_round() {
        let f = fixture(1);
        let later = f.deadline + Duration::days(30);
        let (round, timelocked) =
            relock(&f.set_id, &f.lock.sealed_shares, later, &f.master_key, &beacon()).unwrap();
        assert!(round > f.lock.timelock_round);

        let answers = vec!["rex".to_string()];
        let params = |now| UnlockParams {
            set_id: &f.set_id,
            assignment_id: &f.assignment_id,
            threshold: 1,
            recipient_ciphertext: &f.lock.recipient_ciphertext,
            timelocked_shares: &timelocked,
            answers: &answers,
            now,
        };

        let err = unlock_with_answers(params(f.deadline + Duration::minutes(1)), &beacon())
            .unwrap_err();
        assert!(matches!(err, VaultError::TooEarly { .. }));

        let plain =
            unlock_with_answers(params(later + Duration::minutes(1)), &beacon()).unwrap();
        assert_eq!(&plain[..], b"the vault code is 0451");
    }

    #[test]
    fn test_bundle_rejects_truncation() {
        let bundle = encode_bundle(&[vec![1, 2, 3], vec![4]]).unwrap();
        assert_eq!(decode_bundle(&bundle).unwrap(), vec![vec![1, 2, 3], vec![4]]);
        assert!(decode_bundle(&bundle[..bundle.len() - 1]).is_err());
        assert!(decode_bundle(&[]).is_err());
    }
}
