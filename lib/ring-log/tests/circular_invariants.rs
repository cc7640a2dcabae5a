use proptest::prelude::*;
use ring_log::{CircularLog, Entry};

fn arb_line() -> impl Strategy<Value = Vec<u8>> {
    // Printable ASCII body of 0..16 bytes, plus the mandatory trailing newline.
    proptest::collection::vec(32u8..127, 0..16).prop_map(|mut body| {
        body.push(b'\n');
        body
    })
}

proptest! {
    /// Property 1: total_bytes always equals the sum of resident entry lengths.
    #[test]
    fn total_bytes_matches_resident_sum(lines in proptest::collection::vec(arb_line(), 0..40)) {
        let mut log = CircularLog::new(10);
        for line in &lines {
            log.append(Entry::new(line.clone()));
            let expected: u64 = log.iter().map(|e| e.len() as u64).sum();
            prop_assert_eq!(log.total_bytes(), expected);
        }
    }

    /// Property 2: eviction is FIFO — after N+k appends, the resident set is exactly the
    /// last N appended, in order.
    #[test]
    fn eviction_keeps_last_n_in_order(lines in proptest::collection::vec(arb_line(), 11..40)) {
        let n = 10usize;
        let mut log = CircularLog::new(n);
        for line in &lines {
            log.append(Entry::new(line.clone()));
        }
        let resident: Vec<Vec<u8>> = log.iter().map(|e| e.bytes().to_vec()).collect();
        let expected: Vec<Vec<u8>> = lines[lines.len() - n..].to_vec();
        prop_assert_eq!(resident, expected);
    }

    /// Property 4: round trip between locate_by_index and locate_by_absolute.
    #[test]
    fn round_trip_index_and_absolute(lines in proptest::collection::vec(arb_line(), 1..15)) {
        let mut log = CircularLog::new(10);
        for line in &lines {
            log.append(Entry::new(line.clone()));
        }
        for (i, entry) in log.iter().enumerate() {
            for offset in 0..entry.len() as u64 {
                let abs = log.locate_by_index(i as u64, offset).unwrap();
                let (found, found_offset) = log.locate_by_absolute(abs).unwrap();
                prop_assert_eq!(found.bytes(), entry.bytes());
                prop_assert_eq!(found_offset, offset);
            }
        }
    }

    /// Property 3 (end-of-stream half): locate_by_absolute(total_bytes) is always None.
    #[test]
    fn absolute_at_total_bytes_is_eof(lines in proptest::collection::vec(arb_line(), 0..20)) {
        let mut log = CircularLog::new(10);
        for line in &lines {
            log.append(Entry::new(line.clone()));
        }
        prop_assert!(log.locate_by_absolute(log.total_bytes()).is_none());
    }
}
