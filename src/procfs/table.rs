//! Table-driven scanner for flat `name: value` and `name value` files
//!
//! `/proc/meminfo` and `/proc/vmstat` are long lists of counters, most of
//! which any given check doesn't care about, and whose names change from one
//! kernel generation to the next. A `FieldTable` maps the names we do care
//! about onto fields of a destination struct; everything else is skipped.

/// The integer type kernel counters are stored in
///
/// This is the platform's `unsigned long`, which is what the kernel itself
/// uses: 32 bits wide on 32-bit targets.
pub type Counter = libc::c_ulong;

/// Accessor for the destination field of one table entry
pub type Slot<T> = fn(&mut T) -> &mut Counter;

/// What separates a field name from its value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Separator {
    /// `MemTotal:       16318412 kB`
    Colon,
    /// `pgpgin 2215478`
    Whitespace,
}

impl Separator {
    fn find(self, haystack: &[u8]) -> Option<usize> {
        match self {
            Separator::Colon => haystack.iter().position(|&b| b == b':'),
            Separator::Whitespace => haystack.iter().position(|&b| b == b' ' || b == b'\t'),
        }
    }
}

/// A sorted, read-only mapping from field name to destination slot
pub struct FieldTable<T> {
    separator: Separator,
    name_buf_len: usize,
    entries: Vec<(&'static str, Slot<T>)>,
}

impl<T> FieldTable<T> {
    /// Build a table, sorting the entries by name
    ///
    /// Names of `name_buf_len` bytes or longer are never looked up, so an
    /// entry that long can never match.
    ///
    /// # Panics
    ///
    /// If two entries share a name. Tables are static data, so this is a
    /// programming error.
    pub fn new(
        separator: Separator,
        name_buf_len: usize,
        mut entries: Vec<(&'static str, Slot<T>)>,
    ) -> FieldTable<T> {
        entries.sort_by(|l, r| l.0.as_bytes().cmp(r.0.as_bytes()));
        for pair in entries.windows(2) {
            assert!(pair[0].0 != pair[1].0, "duplicate field name {}", pair[0].0);
        }
        FieldTable {
            separator,
            name_buf_len,
            entries,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Find the slot for `name`, by exact byte comparison
    pub fn lookup(&self, name: &str) -> Option<Slot<T>> {
        if name.len() >= self.name_buf_len {
            return None;
        }
        self.entries
            .binary_search_by(|probe| probe.0.as_bytes().cmp(name.as_bytes()))
            .ok()
            .map(|idx| self.entries[idx].1)
    }

    /// Walk `text` line by line and store every known field into `dest`
    ///
    /// Unknown fields are ignored and fields that are not present keep
    /// whatever value `dest` already had.
    pub fn scan(&self, text: &str, dest: &mut T) {
        let bytes = text.as_bytes();
        let mut head = 0;
        loop {
            let tail = match self.separator.find(&bytes[head..]) {
                Some(offset) => head + offset,
                None => break,
            };
            let name = &text[head..tail];
            head = tail + 1;

            if name.len() >= self.name_buf_len {
                log::debug!("skipping oversized field name {:?}", name);
            } else {
                match self.lookup(name) {
                    Some(slot) => *slot(dest) = to_counter(parse_leading_u64(&bytes[head..])),
                    None => log::trace!("ignoring unknown field {:?}", name),
                }
            }

            match bytes[head..].iter().position(|&b| b == b'\n') {
                Some(offset) => head += offset + 1,
                None => break,
            }
        }
    }
}

/// Narrow a 64-bit reading to the counter width
///
/// On 32-bit targets this wraps, exactly like the kernel's own 32-bit
/// counters do. Tools that compare against kernel-reported values depend on
/// seeing the same wrapped number, so the truncation is intentional.
pub fn to_counter(wide: u64) -> Counter {
    wide as Counter
}

/// Parse the unsigned integer at the start of `bytes`
///
/// Leading whitespace and a `+` are skipped, parsing stops at the first
/// non-digit, no digits at all reads as 0, and values that don't fit
/// saturate at `u64::MAX`.
pub fn parse_leading_u64(bytes: &[u8]) -> u64 {
    let mut rest = bytes;
    while let Some((&b, tail)) = rest.split_first() {
        if b.is_ascii_whitespace() {
            rest = tail;
        } else {
            break;
        }
    }
    if let Some((&b'+', tail)) = rest.split_first() {
        rest = tail;
    }

    let mut value: u64 = 0;
    for &b in rest.iter().take_while(|b| b.is_ascii_digit()) {
        value = match value
            .checked_mul(10)
            .and_then(|v| v.checked_add(u64::from(b - b'0')))
        {
            Some(v) => v,
            None => return u64::MAX,
        };
    }
    value
}

impl<T> std::fmt::Debug for FieldTable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("FieldTable")
            .field("separator", &self.separator)
            .field("name_buf_len", &self.name_buf_len)
            .field(
                "names",
                &self.entries.iter().map(|e| e.0).collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod unit {
    use std::cmp::Ordering;

    use super::*;

    fn is_sorted<T>(table: &FieldTable<T>) -> bool {
        table
            .entries
            .windows(2)
            .all(|w| w[0].0.as_bytes().cmp(w[1].0.as_bytes()) == Ordering::Less)
    }

    #[derive(Debug, Default, PartialEq)]
    struct Mem {
        total: Counter,
        free: Counter,
        very_long: Counter,
    }

    fn total(m: &mut Mem) -> &mut Counter {
        &mut m.total
    }
    fn free(m: &mut Mem) -> &mut Counter {
        &mut m.free
    }
    fn very_long(m: &mut Mem) -> &mut Counter {
        &mut m.very_long
    }

    fn mem_table() -> FieldTable<Mem> {
        FieldTable::new(
            Separator::Colon,
            16,
            vec![
                ("MemTotal", total as Slot<Mem>),
                ("MemFree", free as Slot<Mem>),
                ("AVeryLongFieldName", very_long as Slot<Mem>),
            ],
        )
    }

    #[test]
    fn entries_get_sorted() {
        let table = mem_table();
        assert!(is_sorted(&table));
        assert_eq!(table.len(), 3);
    }

    #[test]
    #[should_panic(expected = "duplicate field name")]
    fn duplicates_are_rejected() {
        FieldTable::new(
            Separator::Colon,
            16,
            vec![("MemFree", free as Slot<Mem>), ("MemFree", total as Slot<Mem>)],
        );
    }

    #[test]
    fn scans_two_fields() {
        let mut mem = Mem::default();
        mem_table().scan("MemTotal: 1000 kB\nMemFree: 200 kB\n", &mut mem);
        assert_eq!(mem.total, 1000);
        assert_eq!(mem.free, 200);
    }

    #[test]
    fn ignores_unknown_fields_and_keeps_defaults() {
        let mut mem = Mem {
            total: 0,
            free: 77,
            very_long: 0,
        };
        mem_table().scan(
            "Useless: 898 kB\nMemTotal:   500 kB\nHugePages_Total: 0\n",
            &mut mem,
        );
        assert_eq!(mem.total, 500);
        assert_eq!(mem.free, 77);
    }

    #[test]
    fn lookup_is_exact() {
        let table = mem_table();
        assert!(table.lookup("MemTotal").is_some());
        assert!(table.lookup("memtotal").is_none());
        assert!(table.lookup("MemTota").is_none());
        assert!(table.lookup("MemTotalX").is_none());
    }

    #[test]
    fn oversized_names_are_skipped_without_lookup() {
        let table = mem_table();
        assert!(table.lookup("AVeryLongFieldName").is_none());

        let mut mem = Mem::default();
        table.scan(
            "AVeryLongFieldName: 5 kB\nMemFree: 9 kB\nSixteenBytesLong: 3\n",
            &mut mem,
        );
        assert_eq!(mem.very_long, 0);
        assert_eq!(mem.free, 9);
    }

    #[test]
    fn whitespace_separated() {
        fn pgin(m: &mut Mem) -> &mut Counter {
            &mut m.total
        }
        let table = FieldTable::new(Separator::Whitespace, 32, vec![("pgpgin", pgin as Slot<Mem>)]);
        let mut mem = Mem::default();
        table.scan("nr_free_pages 12\npgpgin 2215478\npgpgout 99", &mut mem);
        assert_eq!(mem.total, 2_215_478);
    }

    #[test]
    fn last_line_without_newline() {
        let mut mem = Mem::default();
        mem_table().scan("MemTotal: 10 kB\nMemFree: 4", &mut mem);
        assert_eq!((mem.total, mem.free), (10, 4));
    }

    #[test]
    fn garbage_does_not_panic() {
        let mut mem = Mem::default();
        for text in &["", ":", "\n\n", "MemFree:", "MemFree:\n", "no separator here", "é:1\nMemFree: 2"] {
            mem_table().scan(text, &mut mem);
        }
        assert_eq!(mem.free, 2);
    }

    #[test]
    fn numbers_parse_like_strtoul() {
        assert_eq!(parse_leading_u64(b"  42 kB"), 42);
        assert_eq!(parse_leading_u64(b"+7"), 7);
        assert_eq!(parse_leading_u64(b"kB"), 0);
        assert_eq!(parse_leading_u64(b""), 0);
        assert_eq!(parse_leading_u64(b"12ab34"), 12);
        assert_eq!(parse_leading_u64(b"99999999999999999999999"), u64::MAX);
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn wide_values_survive_on_64_bit() {
        assert_eq!(to_counter(0x1_0000_0005), 0x1_0000_0005);
    }

    #[test]
    #[cfg(target_pointer_width = "32")]
    fn wide_values_wrap_on_32_bit() {
        assert_eq!(to_counter(0x1_0000_0005), 5);
        assert_eq!(to_counter(u64::MAX), Counter::MAX);
    }
}
