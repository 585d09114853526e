//! Parsers for `/proc` filesystem files.
//!
//! These are pure functions that parse the content of various `/proc`
//! files into structured data. They are designed to be easily testable
//! with string inputs.

/// Error type for parsing failures.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Parse error: {}", self.message)
    }
}

impl std::error::Error for ParseError {}

/// Name and parent pid pulled from `/proc/[pid]/stat`.
#[derive(Debug, Clone, PartialEq)]
pub struct StatIdentity {
    pub comm: String,
    pub ppid: u32,
}

/// Parses `/proc/[pid]/stat` by plain whitespace tokenization: the 2nd
/// field is the parenthesized short name, the 4th the parent pid.
///
/// KNOWN LIMITATION: a comm containing whitespace ("Web Content") splits
/// into several tokens, so the name truncates at its first space and the
/// 4th token is no longer numeric; the ppid then lenient-parses to 0
/// and an ancestry walk treats the process as a chain root. Nested
/// parentheses are likewise not reassembled. Preserved intentionally;
/// see the tests below before changing this.
pub fn parse_stat_identity(content: &str) -> Result<StatIdentity, ParseError> {
    let fields: Vec<&str> = content.split_whitespace().collect();
    if fields.len() < 4 {
        return Err(ParseError::new(format!(
            "not enough fields in stat: expected 4+, got {}",
            fields.len()
        )));
    }

    let comm = fields[1]
        .trim_start_matches('(')
        .trim_end_matches(')')
        .to_string();
    let ppid = fields[3].parse().unwrap_or(0);

    Ok(StatIdentity { comm, ppid })
}

/// The four mandatory counters of `/proc/[pid]/smaps_rollup`, in kB.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollupCounters {
    pub rss: i64,
    pub pss: i64,
    pub private_clean: i64,
    pub private_dirty: i64,
}

impl RollupCounters {
    /// Unique set size: memory no other process shares.
    pub fn uss(&self) -> i64 {
        self.private_clean + self.private_dirty
    }
}

/// Parses `/proc/[pid]/smaps_rollup` content.
///
/// All four of `Rss`, `Pss`, `Private_Clean` and `Private_Dirty` must be
/// present; a partial rollup is a failure, never a partial result.
/// Labels are matched at line start so `Pss_Anon`/`SwapPss` do not
/// collide, and the first occurrence of each label wins.
pub fn parse_smaps_rollup(content: &str) -> Result<RollupCounters, ParseError> {
    let mut rss = None;
    let mut pss = None;
    let mut private_clean = None;
    let mut private_dirty = None;

    for line in content.lines() {
        let slot = if line.starts_with("Rss:") {
            &mut rss
        } else if line.starts_with("Pss:") {
            &mut pss
        } else if line.starts_with("Private_Clean:") {
            &mut private_clean
        } else if line.starts_with("Private_Dirty:") {
            &mut private_dirty
        } else {
            continue;
        };

        if slot.is_none() {
            *slot = parse_kb_value(line);
        }
    }

    let require = |value: Option<i64>, label: &str| {
        value.ok_or_else(|| ParseError::new(format!("missing {} in smaps_rollup", label)))
    };

    Ok(RollupCounters {
        rss: require(rss, "Rss")?,
        pss: require(pss, "Pss")?,
        private_clean: require(private_clean, "Private_Clean")?,
        private_dirty: require(private_dirty, "Private_Dirty")?,
    })
}

/// Finds a `Label:  value kB` line and returns the value.
///
/// Shared by the `MemTotal` (meminfo) and `VmPTE` (status) single-scalar
/// lookups.
pub fn parse_labeled_kb(content: &str, label: &str) -> Option<i64> {
    let prefix = format!("{}:", label);
    content
        .lines()
        .find(|line| line.starts_with(&prefix))
        .and_then(parse_kb_value)
}

/// Extracts the numeric kB value of one `Label:  value kB` line.
fn parse_kb_value(line: &str) -> Option<i64> {
    line.split_whitespace().nth(1).and_then(|s| s.parse().ok())
}

/// Parses a single-integer file such as `/proc/[pid]/oom_score`.
pub fn parse_scalar_i32(content: &str) -> Option<i32> {
    content.split_whitespace().next().and_then(|s| s.parse().ok())
}

/// One region of `/proc/[pid]/maps`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapRegion {
    pub start: u64,
    pub end: u64,
    pub perms: String,
    pub dev: String,
    pub inode: u64,
    /// Backing file path; empty for anonymous mappings, never absent.
    pub path: String,
}

impl MapRegion {
    /// Region size in bytes, non-negative by construction.
    pub fn size(&self) -> u64 {
        self.end - self.start
    }

    pub fn size_kb(&self) -> u64 {
        self.size() / 1024
    }
}

/// Parses one `/proc/[pid]/maps` line:
/// `start-end perm offset dev inode [path]`.
///
/// The path is optional (anonymous mapping ⇒ empty string). Lines where
/// fewer than the six mandatory fields parse are dropped, as is an
/// end address below the start.
pub fn parse_maps_line(line: &str) -> Option<MapRegion> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 5 {
        return None;
    }

    let (start_hex, end_hex) = fields[0].split_once('-')?;
    let start = u64::from_str_radix(start_hex, 16).ok()?;
    let end = u64::from_str_radix(end_hex, 16).ok()?;
    if end < start {
        return None;
    }

    // offset must be well-formed even though it is not retained
    u64::from_str_radix(fields[2], 16).ok()?;

    let inode: u64 = fields[4].parse().ok()?;

    Some(MapRegion {
        start,
        end,
        perms: fields[1].to_string(),
        dev: fields[3].to_string(),
        inode,
        path: fields[5..].join(" "),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_stat_identity_basic() {
        let content = "1234 (bash) S 1233 1234 1234 34816 1235 4194304 5000 50000 10 20 100 50 200 100 20 0 1 0 100000 25000000 2000";
        let id = parse_stat_identity(content).unwrap();
        assert_eq!(id.comm, "bash");
        assert_eq!(id.ppid, 1233);
    }

    #[test]
    fn test_parse_stat_identity_init() {
        let id = parse_stat_identity("1 (systemd) S 0 1 1 0 -1 4194560").unwrap();
        assert_eq!(id.comm, "systemd");
        assert_eq!(id.ppid, 0);
    }

    #[test]
    fn test_parse_stat_identity_truncates_spaced_comm() {
        // Whitespace tokenization: the name truncates and the displaced
        // 4th token ("S") lenient-parses to ppid 0.
        let id = parse_stat_identity("5000 (Web Content) S 4999 5000 4999 0 -1").unwrap();
        assert_eq!(id.comm, "Web");
        assert_eq!(id.ppid, 0);
    }

    #[test]
    fn test_parse_stat_identity_nested_parens() {
        let id = parse_stat_identity("5001 (test(1)) S 1 5001 5001 0 -1").unwrap();
        assert_eq!(id.comm, "test(1");
        assert_eq!(id.ppid, 1);
    }

    #[test]
    fn test_parse_stat_identity_too_short() {
        assert!(parse_stat_identity("1234 (bash) S").is_err());
        assert!(parse_stat_identity("").is_err());
    }

    #[test]
    fn test_parse_smaps_rollup_complete() {
        let content = "\
00400000-7ffc5c0c2000 ---p 00000000 00:00 0                              [rollup]
Rss:                8000 kB
Pss:                6000 kB
Pss_Anon:           4000 kB
Shared_Clean:       2500 kB
Private_Clean:      1000 kB
Private_Dirty:      3500 kB
Swap:                  0 kB
";
        let counters = parse_smaps_rollup(content).unwrap();
        assert_eq!(counters.rss, 8000);
        assert_eq!(counters.pss, 6000);
        assert_eq!(counters.private_clean, 1000);
        assert_eq!(counters.private_dirty, 3500);
        assert_eq!(counters.uss(), 4500);
    }

    #[test]
    fn test_parse_smaps_rollup_partial_is_total_failure() {
        // Pss_Anon present but Pss absent: prefix matching must not let
        // the former stand in for the latter.
        let content = "\
Rss:                8000 kB
Pss_Anon:           4000 kB
Private_Clean:      1000 kB
Private_Dirty:      3500 kB
";
        let err = parse_smaps_rollup(content).unwrap_err();
        assert!(err.message.contains("Pss"));

        let content = "\
Rss:                8000 kB
Pss:                6000 kB
Private_Clean:      1000 kB
";
        let err = parse_smaps_rollup(content).unwrap_err();
        assert!(err.message.contains("Private_Dirty"));
    }

    #[test]
    fn test_parse_smaps_rollup_first_occurrence_wins() {
        let content = "\
Rss:                8000 kB
Rss:                9999 kB
Pss:                6000 kB
Private_Clean:      1000 kB
Private_Dirty:      3500 kB
";
        assert_eq!(parse_smaps_rollup(content).unwrap().rss, 8000);
    }

    #[test]
    fn test_parse_labeled_kb() {
        let meminfo = "\
MemTotal:       16384000 kB
MemFree:         8192000 kB
";
        assert_eq!(parse_labeled_kb(meminfo, "MemTotal"), Some(16384000));
        assert_eq!(parse_labeled_kb(meminfo, "MemAvailable"), None);

        let status = "Name:\tleaky\nVmPTE:\t     184 kB\nVmSwap:\t0 kB\n";
        assert_eq!(parse_labeled_kb(status, "VmPTE"), Some(184));
    }

    #[test]
    fn test_parse_scalar_i32() {
        assert_eq!(parse_scalar_i32("667\n"), Some(667));
        assert_eq!(parse_scalar_i32("-17\n"), Some(-17));
        assert_eq!(parse_scalar_i32(""), None);
        assert_eq!(parse_scalar_i32("abc"), None);
    }

    #[test]
    fn test_parse_maps_line_with_path() {
        let region =
            parse_maps_line("00400000-00452000 r-xp 00000000 08:02 173521   /usr/bin/leaky")
                .unwrap();
        assert_eq!(region.start, 0x0040_0000);
        assert_eq!(region.end, 0x0045_2000);
        assert_eq!(region.perms, "r-xp");
        assert_eq!(region.dev, "08:02");
        assert_eq!(region.inode, 173521);
        assert_eq!(region.path, "/usr/bin/leaky");
        assert_eq!(region.size(), 0x52000);
        assert_eq!(region.size_kb(), 0x52000 / 1024);
    }

    #[test]
    fn test_parse_maps_line_anonymous() {
        let region = parse_maps_line("7f3c60000000-7f3c60400000 rw-p 00000000 00:00 0").unwrap();
        assert_eq!(region.path, "");
        assert_eq!(region.inode, 0);
        assert_eq!(region.size_kb(), 4096);
    }

    #[test]
    fn test_parse_maps_line_deleted_suffix_kept() {
        let region = parse_maps_line(
            "7f11aa000000-7f11aa021000 rw-s 00000000 00:01 4099   /dev/shm/cache (deleted)",
        )
        .unwrap();
        assert_eq!(region.path, "/dev/shm/cache (deleted)");
    }

    #[test]
    fn test_parse_maps_line_size_independent_of_path() {
        let with_path =
            parse_maps_line("00400000-00452000 r-xp 00000000 08:02 173521 /usr/bin/leaky").unwrap();
        let without = parse_maps_line("00400000-00452000 r-xp 00000000 08:02 173521").unwrap();
        assert_eq!(with_path.size(), without.size());
    }

    #[test]
    fn test_parse_maps_line_malformed() {
        assert!(parse_maps_line("").is_none());
        assert!(parse_maps_line("00400000-00452000 r-xp 00000000 08:02").is_none());
        assert!(parse_maps_line("00400000 r-xp 00000000 08:02 173521").is_none());
        assert!(parse_maps_line("zz-00452000 r-xp 00000000 08:02 173521").is_none());
        assert!(parse_maps_line("00400000-00452000 r-xp gg 08:02 173521").is_none());
        // end below start would make the derived size negative
        assert!(parse_maps_line("00452000-00400000 r-xp 00000000 08:02 173521").is_none());
    }
}
