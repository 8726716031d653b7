//! Connection Table - socket-to-process lookup
//!
//! Maps TCP sockets to the processes that own them.
//!
//! On Linux the table is read from `/proc/net/tcp{,6}` (socket endpoints,
//! state and inode) joined with the `socket:[inode]` links under
//! `/proc/<pid>/fd`. Other platforms get `UnsupportedTable`, which reports
//! `GuardianError::Unsupported` instead of guessing.

use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::path::{Path, PathBuf};

use crate::logic::error::{GuardianError, GuardianResult};
use super::types::{Connection, TcpState};

// ============================================================================
// TRAIT
// ============================================================================

pub trait ConnectionTable {
    /// ESTABLISHED TCP connections owned by `pid`
    fn established(&self, pid: u32) -> GuardianResult<Vec<Connection>>;

    /// Local process whose socket is bound to `endpoint`, if any
    fn owner_of(&self, endpoint: SocketAddr) -> GuardianResult<Option<u32>>;
}

/// Best table available on this platform
pub fn platform_table() -> Box<dyn ConnectionTable> {
    #[cfg(target_os = "linux")]
    {
        let table = ProcNetTable::new();
        // containers and chroots may run without procfs
        if table.is_available() {
            return Box::new(table);
        }
        log::debug!("{} not mounted, connection table unavailable", table.root.display());
    }
    Box::new(UnsupportedTable)
}

// ============================================================================
// UNSUPPORTED
// ============================================================================

pub struct UnsupportedTable;

impl ConnectionTable for UnsupportedTable {
    fn established(&self, _pid: u32) -> GuardianResult<Vec<Connection>> {
        Err(GuardianError::Unsupported("socket-to-process table"))
    }

    fn owner_of(&self, _endpoint: SocketAddr) -> GuardianResult<Option<u32>> {
        Err(GuardianError::Unsupported("socket-to-process table"))
    }
}

// ============================================================================
// /proc TABLE
// ============================================================================

const TCP_TABLES: &[&str] = &["tcp", "tcp6"];

/// One row of /proc/net/tcp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SocketEntry {
    pub local: SocketAddr,
    pub remote: SocketAddr,
    pub state: TcpState,
    pub inode: u64,
}

pub struct ProcNetTable {
    root: PathBuf,
}

impl ProcNetTable {
    pub fn new() -> Self {
        Self::with_root("/proc")
    }

    /// Table rooted somewhere other than /proc (fixtures)
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn is_available(&self) -> bool {
        self.root.join("net").join(TCP_TABLES[0]).is_file()
    }

    fn entries(&self) -> GuardianResult<Vec<SocketEntry>> {
        let mut entries = Vec::new();
        for table in TCP_TABLES {
            let path = self.root.join("net").join(table);
            let text = match fs::read_to_string(&path) {
                Ok(text) => text,
                // tcp6 is absent on kernels without IPv6
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            entries.extend(text.lines().skip(1).filter_map(parse_tcp_line));
        }
        Ok(entries)
    }

    fn socket_inodes(&self, pid: u32) -> GuardianResult<HashSet<u64>> {
        let fd_dir = self.root.join(pid.to_string()).join("fd");
        let dir = fs::read_dir(&fd_dir).map_err(|e| match e.kind() {
            ErrorKind::NotFound => GuardianError::ProcessGone { pid },
            ErrorKind::PermissionDenied => GuardianError::AccessDenied {
                pid,
                reason: e.to_string(),
            },
            _ => GuardianError::Io(e),
        })?;

        Ok(dir
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| fs::read_link(entry.path()).ok())
            .filter_map(|target| socket_inode(&target))
            .collect())
    }

    fn pids(&self) -> GuardianResult<Vec<u32>> {
        Ok(fs::read_dir(&self.root)?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().to_str().and_then(|n| n.parse().ok()))
            .collect())
    }
}

impl Default for ProcNetTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionTable for ProcNetTable {
    fn established(&self, pid: u32) -> GuardianResult<Vec<Connection>> {
        let inodes = self.socket_inodes(pid)?;
        if inodes.is_empty() {
            return Ok(Vec::new());
        }

        Ok(self
            .entries()?
            .into_iter()
            .filter(|e| e.state == TcpState::Established && inodes.contains(&e.inode))
            .map(|e| Connection { local: e.local, remote: e.remote, state: e.state })
            .collect())
    }

    fn owner_of(&self, endpoint: SocketAddr) -> GuardianResult<Option<u32>> {
        let endpoint = canonical(endpoint);
        let wanted: HashSet<u64> = self
            .entries()?
            .into_iter()
            .filter(|e| e.local == endpoint && e.inode != 0)
            .map(|e| e.inode)
            .collect();

        if wanted.is_empty() {
            return Ok(None);
        }

        for pid in self.pids()? {
            // processes come and go while we walk /proc
            if let Ok(inodes) = self.socket_inodes(pid) {
                if !inodes.is_disjoint(&wanted) {
                    return Ok(Some(pid));
                }
            }
        }
        Ok(None)
    }
}

// ============================================================================
// PARSING
// ============================================================================

/// Parse one data row of /proc/net/tcp or /proc/net/tcp6
pub fn parse_tcp_line(line: &str) -> Option<SocketEntry> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 10 {
        return None;
    }

    Some(SocketEntry {
        local: parse_endpoint(fields[1])?,
        remote: parse_endpoint(fields[2])?,
        state: TcpState::from_code(u8::from_str_radix(fields[3], 16).ok()?),
        inode: fields[9].parse().ok()?,
    })
}

/// IPv4-mapped IPv6 addresses (`::ffff:a.b.c.d`) collapse to plain IPv4, so
/// a dual-stack listener in tcp6 matches its IPv4 peer in tcp.
fn canonical(addr: SocketAddr) -> SocketAddr {
    SocketAddr::new(addr.ip().to_canonical(), addr.port())
}

/// `ADDR:PORT` in kernel hex. Addresses are printed as native-endian 32-bit
/// words of the network-order bytes.
fn parse_endpoint(text: &str) -> Option<SocketAddr> {
    let (addr, port) = text.split_once(':')?;
    let port = u16::from_str_radix(port, 16).ok()?;

    let ip = match addr.len() {
        8 => {
            let word = u32::from_str_radix(addr, 16).ok()?;
            IpAddr::V4(Ipv4Addr::from(word.to_ne_bytes()))
        }
        32 => {
            let mut bytes = [0u8; 16];
            for (i, chunk) in bytes.chunks_mut(4).enumerate() {
                let word = u32::from_str_radix(&addr[i * 8..i * 8 + 8], 16).ok()?;
                chunk.copy_from_slice(&word.to_ne_bytes());
            }
            IpAddr::V6(Ipv6Addr::from(bytes))
        }
        _ => return None,
    };

    Some(canonical(SocketAddr::new(ip, port)))
}

/// `socket:[12345]` -> 12345
fn socket_inode(link: &Path) -> Option<u64> {
    link.to_str()?
        .strip_prefix("socket:[")?
        .strip_suffix(']')?
        .parse()
        .ok()
}

// ============================================================================
// TESTS
// ============================================================================
