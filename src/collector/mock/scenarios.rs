//! Pre-built mock filesystem scenarios for testing.
//!
//! These scenarios provide realistic `/proc` states for a monitored
//! process: pid 4242 (`leaky`), child of a shell (pid 1700), child of
//! init (pid 1).

use super::filesystem::MockFs;

impl MockFs {
    /// Creates a monitored process with ancestry, mappings, descriptors
    /// and all four protocol socket tables.
    ///
    /// Socket layout: fd 3 → tcp inode 12345 (LISTEN 127.0.0.1:8080),
    /// fd 4 → udp inode 67890, fd 7 → inode 99999 absent from every table.
    pub fn typical_target() -> Self {
        let mut fs = Self::new();

        fs.add_file(
            "/proc/meminfo",
            "\
MemTotal:       16384000 kB
MemFree:         8192000 kB
MemAvailable:   12000000 kB
Buffers:          512000 kB
Cached:          2048000 kB
SwapTotal:       4096000 kB
SwapFree:        4096000 kB
",
        );

        // Target process: pid 4242, child of 1700
        fs.add_file(
            "/proc/4242/stat",
            "4242 (leaky) S 1700 4242 4242 34816 4242 4194304 5000 0 10 0 100 50 0 0 20 0 1 0 100000 25000000 2000 18446744073709551615 0 0 0 0 0 0 0 0 0 0 0 0 17 2 0 0 5 0 0",
        );
        fs.add_file(
            "/proc/4242/status",
            "\
Name:\tleaky
Pid:\t4242
PPid:\t1700
VmPeak:\t   30000 kB
VmSize:\t   25000 kB
VmRSS:\t    8000 kB
VmPTE:\t     184 kB
VmSwap:\t       0 kB
",
        );
        fs.add_file(
            "/proc/4242/smaps_rollup",
            "\
00400000-7ffc5c0c2000 ---p 00000000 00:00 0                              [rollup]
Rss:                8000 kB
Pss:                6000 kB
Pss_Anon:           4000 kB
Pss_File:           2000 kB
Shared_Clean:       2500 kB
Shared_Dirty:       1000 kB
Private_Clean:      1000 kB
Private_Dirty:      3500 kB
Referenced:         7500 kB
Anonymous:          4500 kB
Swap:                  0 kB
",
        );
        fs.add_file("/proc/4242/oom_score", "667\n");
        fs.add_file("/proc/4242/oom_score_adj", "-17\n");
        fs.add_file(
            "/proc/4242/maps",
            "\
00400000-00452000 r-xp 00000000 08:02 173521                             /usr/bin/leaky
00651000-00652000 rw-p 00051000 08:02 173521                             /usr/bin/leaky
7f3c60000000-7f3c60400000 rw-p 00000000 00:00 0
7ffc5c0a1000-7ffc5c0c2000 rw-p 00000000 00:00 0                          [stack]
",
        );
        fs.add_symlink("/proc/4242/exe", "/usr/bin/leaky");
        fs.add_symlink("/proc/4242/fd/0", "/dev/null");
        fs.add_symlink("/proc/4242/fd/1", "/dev/null");
        fs.add_symlink("/proc/4242/fd/3", "socket:[12345]");
        fs.add_symlink("/proc/4242/fd/4", "socket:[67890]");
        fs.add_symlink("/proc/4242/fd/7", "socket:[99999]");

        // Parent shell: pid 1700, child of init
        fs.add_file(
            "/proc/1700/stat",
            "1700 (bash) S 1 1700 1700 34816 4242 4194304 2000 5000 1 10 40 20 100 50 20 0 1 0 90000 12000000 800 18446744073709551615 0 0 0 0 0 0 0 0 0 0 0 0 17 1 0 0 0 0 0",
        );
        fs.add_file(
            "/proc/1700/smaps_rollup",
            "\
00400000-7ffd00000000 ---p 00000000 00:00 0                              [rollup]
Rss:                3000 kB
Pss:                2500 kB
Shared_Clean:       2000 kB
Private_Clean:       400 kB
Private_Dirty:       600 kB
",
        );
        fs.add_file("/proc/1700/oom_score", "100\n");
        fs.add_file("/proc/1700/oom_score_adj", "0\n");

        // init: pid 1, parent 0, no readable accounting files
        fs.add_file(
            "/proc/1/stat",
            "1 (systemd) S 0 1 1 0 -1 4194560 50000 900000 100 2000 300 200 5000 3000 20 0 1 0 10 170000000 3000 18446744073709551615 0 0 0 0 0 0 0 0 0 0 0 0 17 0 0 0 2 0 0",
        );

        // Protocol socket tables
        fs.add_file(
            "/proc/net/tcp",
            "\
  sl  local_address rem_address   st tx_queue rx_queue tr tm->when retrnsmt   uid  timeout inode
1: 0100007F:1F90 00000000:0000 0A 00000000:00000000 00:00000000 00000000 1000 0 12345 1 0 0
2: 0B01A8C0:9C40 0101A8C0:01BB 01 00000022:00000014 00:00000000 00000000 1000 0 54321 1 0 0
",
        );
        fs.add_file(
            "/proc/net/udp",
            "\
  sl  local_address rem_address   st tx_queue rx_queue tr tm->when retrnsmt   uid  timeout inode
7: 00000000:0044 00000000:0000 07 00000000:00000000 00:00000000 00000000 1000 0 67890 1 0 0
",
        );
        fs.add_file(
            "/proc/net/tcp6",
            "\
  sl  local_address                         rem_address                        st tx_queue rx_queue tr tm->when retrnsmt   uid  timeout inode
1: 00000000000000000000000001000000:1F91 00000000000000000000000000000000:0000 0A 00000000:00000000 00:00000000 00000000 1000 0 77777 1 0 0
",
        );
        fs.add_file(
            "/proc/net/udp6",
            "  sl  local_address                         rem_address                        st tx_queue rx_queue tr tm->when retrnsmt   uid  timeout inode\n",
        );

        fs
    }

    /// Same as [`MockFs::typical_target`] but with IPv6 disabled: the
    /// `tcp6`/`udp6` tables are absent, as on kernels booted with
    /// `ipv6.disable=1`.
    pub fn without_ipv6() -> Self {
        let mut fs = Self::typical_target();
        fs.remove("/proc/net/tcp6");
        fs.remove("/proc/net/udp6");
        fs
    }

    /// Adds pid 5000 whose executable short name contains a space.
    ///
    /// Whitespace tokenization of its stat line truncates the name and
    /// displaces every later field.
    pub fn with_spaced_comm() -> Self {
        let mut fs = Self::typical_target();
        fs.add_file(
            "/proc/5000/stat",
            "5000 (Web Content) S 4242 5000 4242 0 -1 4194304 100000 0 500 0 5000 1000 0 0 20 0 20 0 500000 2000000000 50000 18446744073709551615 0 0 0 0 0 0 0 0 0 0 0 0 17 0 0 0 0 0 0",
        );
        fs
    }
}
