use super::*;

#[test]
fn test_frankenhash_deterministic() {
    let mut scratch = FrankenhashScratch::new().unwrap();
    let first = frankenhash(b"trellis test key", &mut scratch);
    let second = frankenhash(b"trellis test key", &mut scratch);
    assert_eq!(first, second);
}

#[test]
fn test_frankenhash_input_sensitivity() {
    let mut scratch = FrankenhashScratch::new().unwrap();
    let a = frankenhash(b"trellis test key", &mut scratch);
    let b = frankenhash(b"trellis test kez", &mut scratch);
    assert_ne!(a, b);
    // A fresh scratch must not change the result.
    let mut fresh = FrankenhashScratch::new().unwrap();
    assert_eq!(a, frankenhash(b"trellis test key", &mut fresh));
}

#[test]
fn test_frankenhash_accept_bound() {
    let mut digest = [0u8; 64];
    for byte in 0..=255u8 {
        digest[0] = byte;
        assert_eq!(frankenhash_accepts(&digest), byte < 17);
    }
}

#[test]
fn test_memhash_deterministic() {
    let mut scratch = MemhashScratch::new().unwrap();
    let first = memhash_accepts(b"trellis pow input", &mut scratch);
    // The scratch is fully overwritten per run, so reuse and a fresh
    // allocation must agree.
    let second = memhash_accepts(b"trellis pow input", &mut scratch);
    let mut fresh = MemhashScratch::new().unwrap();
    let third = memhash_accepts(b"trellis pow input", &mut fresh);
    assert_eq!(first, second);
    assert_eq!(first, third);
}

#[test]
fn test_memhash_acceptance_rate_is_rare() {
    // With a 1-in-180 acceptance rate, 24 distinct inputs accepting
    // all or mostly would indicate a broken predicate. Expect mostly
    // rejections.
    let mut scratch = MemhashScratch::new().unwrap();
    let mut accepted = 0;
    for nonce in 0..24u8 {
        if memhash_accepts(&[b'x', b'y', nonce], &mut scratch) {
            accepted += 1;
        }
    }
    assert!(accepted < 12, "acceptance rate implausibly high: {accepted}/24");
}
