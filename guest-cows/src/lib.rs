//! Consistent Overhead Word Stuffing.
//!
//! A word-oriented cousin of COBS: stuffing removes every zero *word* from
//! the payload, threading a singly-linked list of former zero positions
//! through the buffer itself, with the list head stored in the reserved
//! word 0. Every payload word in `buf[1..n]` comes out non-zero, freeing
//! the zero word to serve as an unambiguous frame delimiter on the wire.
//!
//! Words are 16 bits, stored little-endian, addressed by word index into a
//! byte slice (`buf[2*i..2*i + 2]` is word `i`). Deltas are distances in
//! words, so they fit a `u16` for any buffer up to 65535 words.
#![cfg_attr(not(test), no_std)]

#[inline]
fn get_word(buf: &[u8], i: usize) -> u16 {
    let o = i * 2;
    u16::from_le_bytes([buf[o], buf[o + 1]])
}

#[inline]
fn set_word(buf: &mut [u8], i: usize, v: u16) {
    let o = i * 2;
    let b = v.to_le_bytes();
    buf[o] = b[0];
    buf[o + 1] = b[1];
}

/// Stuffs `buf[0..n_words*2]` in place so that no payload word in
/// `buf[1..n_words]` is zero. Word 0 is overwritten with the COWS overhead
/// word (the distance to the first restored zero, minus one); it stores 0
/// itself whenever the first payload word (index 1) was zero before
/// stuffing, so callers must not assume word 0 is non-zero.
///
/// `n_words` must be at least 1 and `buf` must hold at least `n_words * 2`
/// bytes.
pub fn stuff(buf: &mut [u8], n_words: usize) {
    debug_assert!(n_words >= 1, "n_words must be at least 1");
    debug_assert!(buf.len() >= n_words * 2, "buffer too small for n_words");

    let mut last_zero = n_words;
    let mut i = n_words;
    while i > 1 {
        i -= 1;
        if get_word(buf, i) == 0 {
            set_word(buf, i, (last_zero - i) as u16);
            last_zero = i;
        }
    }
    set_word(buf, 0, (last_zero - 1) as u16);
}

/// Inverse of [`stuff`]. Word 0 is left as-is (it still encodes the offset
/// of the first restored zero); words `1..n_words` are restored to their
/// pre-stuff values, including any interior zeros.
pub fn unstuff(buf: &mut [u8], n_words: usize) {
    debug_assert!(n_words >= 1, "n_words must be at least 1");
    debug_assert!(buf.len() >= n_words * 2, "buffer too small for n_words");

    let mut next = 1 + get_word(buf, 0) as usize;
    while next < n_words {
        let delta = get_word(buf, next);
        set_word(buf, next, 0);
        next += delta as usize;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words_to_bytes(words: &[u16]) -> Vec<u8> {
        words.iter().flat_map(|w| w.to_le_bytes()).collect()
    }

    fn bytes_to_words(buf: &[u8], n_words: usize) -> Vec<u16> {
        (0..n_words).map(|i| get_word(buf, i)).collect()
    }

    /// Deterministic, non-trivial payload touching both zero and non-zero
    /// words, including a run of consecutive zeros.
    fn make_payload(n_words: usize) -> Vec<u16> {
        let mut words = vec![0u16; n_words];
        let mut prev = 0u16;
        for i in 2..n_words {
            let v = if prev == 0 {
                3u16.wrapping_mul(i as u16 + 1)
            } else if i % 5 == 0 {
                0
            } else {
                prev.wrapping_shl(1).wrapping_add(1)
            };
            words[i] = v;
            prev = v;
        }
        words
    }

    #[test]
    fn round_trip_mixed_payload() {
        let n = 32;
        let original = make_payload(n);
        let mut buf = words_to_bytes(&original);

        stuff(&mut buf, n);
        // The contract only guarantees non-zero payload words (`1..n`):
        // word 0 is the overhead word, and it stores `first_zero - 1`,
        // which is itself 0 whenever the first payload word (index 1) was
        // zero before stuffing. That's exactly the all-zero-payload case
        // below.
        for i in 1..n {
            assert_ne!(get_word(&buf, i), 0, "word {i} should be non-zero after stuff");
        }

        unstuff(&mut buf, n);
        let restored = bytes_to_words(&buf, n);
        assert_eq!(&original[1..], &restored[1..]);
    }

    #[test]
    fn all_zero_payload() {
        // n_words = 8, words 1..7 start zero (matches the spec's worked
        // example in the testable-properties section: stuffing produces
        // *seven* non-zero words, not eight, since the overhead word at
        // index 0 ends up 0 here because the first payload word was zero).
        let n = 8;
        let mut buf = vec![0u8; n * 2];
        stuff(&mut buf, n);
        for i in 1..n {
            assert_ne!(get_word(&buf, i), 0);
        }
        unstuff(&mut buf, n);
        for i in 1..n {
            assert_eq!(get_word(&buf, i), 0);
        }
    }

    #[test]
    fn no_zeros_payload() {
        let n = 6;
        let original: Vec<u16> = (0..n as u16).map(|i| i + 100).collect();
        let mut buf = words_to_bytes(&original);
        stuff(&mut buf, n);
        // Word 0 should point one-past-the-end: no interior zero exists.
        assert_eq!(get_word(&buf, 0) as usize, n - 1);
        unstuff(&mut buf, n);
        for i in 1..n {
            assert_eq!(get_word(&buf, i), original[i]);
        }
    }

    #[test]
    fn single_word_payload_is_noop_shaped() {
        let mut buf = vec![0u8; 2];
        stuff(&mut buf, 1);
        unstuff(&mut buf, 1);
    }
}
