//! # Command Builders
//!
//! One pure function per remote command. Each maps typed arguments to a
//! single `redis::Cmd` and has no side effects, so the exact wire encoding
//! can be checked without a server.

use std::time::Duration;

use redis::{cmd, Cmd};

/// `DEL key`
pub fn del(key: &str) -> Cmd {
    let mut c = cmd("DEL");
    c.arg(key);
    c
}

/// `SET key value [EX seconds]`
///
/// The expiry is sent in whole seconds; sub-second precision is dropped.
pub fn set(key: &str, value: &str, ex: Option<Duration>) -> Cmd {
    let mut c = cmd("SET");
    c.arg(key).arg(value);
    if let Some(ttl) = ex {
        c.arg("EX").arg(ttl.as_secs());
    }
    c
}

/// `GET key`
pub fn get(key: &str) -> Cmd {
    let mut c = cmd("GET");
    c.arg(key);
    c
}

/// `RPUSH key element [element ...]`
pub fn rpush<S: AsRef<str>>(key: &str, elements: &[S]) -> Cmd {
    push("RPUSH", key, elements)
}

/// `LPUSH key element [element ...]`
pub fn lpush<S: AsRef<str>>(key: &str, elements: &[S]) -> Cmd {
    push("LPUSH", key, elements)
}

fn push<S: AsRef<str>>(name: &str, key: &str, elements: &[S]) -> Cmd {
    let mut c = cmd(name);
    c.arg(key);
    for element in elements {
        c.arg(element.as_ref());
    }
    c
}

/// `LRANGE key start stop` (inclusive on both ends, negatives count from
/// the tail).
pub fn lrange(key: &str, start: i64, stop: i64) -> Cmd {
    let mut c = cmd("LRANGE");
    c.arg(key).arg(start).arg(stop);
    c
}

/// `LINDEX key index`
pub fn lindex(key: &str, index: i64) -> Cmd {
    let mut c = cmd("LINDEX");
    c.arg(key).arg(index);
    c
}

/// `LLEN key`
pub fn llen(key: &str) -> Cmd {
    let mut c = cmd("LLEN");
    c.arg(key);
    c
}

/// `HSET key field value`
pub fn hset(key: &str, field: &str, value: &str) -> Cmd {
    let mut c = cmd("HSET");
    c.arg(key).arg(field).arg(value);
    c
}

/// `HGET key field`
pub fn hget(key: &str, field: &str) -> Cmd {
    let mut c = cmd("HGET");
    c.arg(key).arg(field);
    c
}

/// `HGETALL key`
pub fn hgetall(key: &str) -> Cmd {
    let mut c = cmd("HGETALL");
    c.arg(key);
    c
}

/// `HLEN key`
pub fn hlen(key: &str) -> Cmd {
    let mut c = cmd("HLEN");
    c.arg(key);
    c
}

/// `HEXISTS key field`
pub fn hexists(key: &str, field: &str) -> Cmd {
    let mut c = cmd("HEXISTS");
    c.arg(key).arg(field);
    c
}

/// `EXISTS key`
pub fn exists(key: &str) -> Cmd {
    let mut c = cmd("EXISTS");
    c.arg(key);
    c
}

/// `CLUSTER INFO`, used to tell a cluster node from a standalone server.
pub fn cluster_info() -> Cmd {
    let mut c = cmd("CLUSTER");
    c.arg("INFO");
    c
}

/// `SELECT db`
pub fn select(db: i64) -> Cmd {
    let mut c = cmd("SELECT");
    c.arg(db);
    c
}

/// Name of the command, for logging.
pub(crate) fn name(c: &Cmd) -> String {
    c.args_iter()
        .next()
        .and_then(|arg| match arg {
            redis::Arg::Simple(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
            redis::Arg::Cursor => None,
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn packed(c: &Cmd) -> Vec<u8> {
        c.get_packed_command()
    }

    #[test]
    fn encodes_get() {
        assert_eq!(packed(&get("key")), b"*2\r\n$3\r\nGET\r\n$3\r\nkey\r\n");
    }

    #[test]
    fn set_without_expiry_has_no_ex() {
        assert_eq!(
            packed(&set("k", "v", None)),
            b"*3\r\n$3\r\nSET\r\n$1\r\nk\r\n$1\r\nv\r\n"
        );
    }

    #[test]
    fn set_with_expiry_uses_whole_seconds() {
        let c = set("k", "v", Some(Duration::from_millis(5_900)));
        assert_eq!(
            packed(&c),
            b"*5\r\n$3\r\nSET\r\n$1\r\nk\r\n$1\r\nv\r\n$2\r\nEX\r\n$1\r\n5\r\n"
        );
    }

    #[test]
    fn push_keeps_element_order() {
        let c = rpush("list", &["a", "b"]);
        assert_eq!(
            packed(&c),
            b"*4\r\n$5\r\nRPUSH\r\n$4\r\nlist\r\n$1\r\na\r\n$1\r\nb\r\n"
        );
        let c = lpush("list", &[String::from("a")]);
        assert_eq!(packed(&c), b"*3\r\n$5\r\nLPUSH\r\n$4\r\nlist\r\n$1\r\na\r\n");
    }

    #[test]
    fn encodes_negative_range_bounds() {
        assert_eq!(
            packed(&lrange("l", 0, -1)),
            b"*4\r\n$6\r\nLRANGE\r\n$1\r\nl\r\n$1\r\n0\r\n$2\r\n-1\r\n"
        );
    }

    #[test]
    fn encodes_hash_commands() {
        assert_eq!(
            packed(&hset("h", "f", "v")),
            b"*4\r\n$4\r\nHSET\r\n$1\r\nh\r\n$1\r\nf\r\n$1\r\nv\r\n"
        );
        assert_eq!(
            packed(&hexists("h", "f")),
            b"*3\r\n$7\r\nHEXISTS\r\n$1\r\nh\r\n$1\r\nf\r\n"
        );
    }

    #[test]
    fn encodes_topology_probe() {
        assert_eq!(
            packed(&cluster_info()),
            b"*2\r\n$7\r\nCLUSTER\r\n$4\r\nINFO\r\n"
        );
        assert_eq!(packed(&select(2)), b"*2\r\n$6\r\nSELECT\r\n$1\r\n2\r\n");
    }

    #[test]
    fn reports_command_name() {
        assert_eq!(name(&hgetall("h")), "HGETALL");
        assert_eq!(name(&del("k")), "DEL");
    }
}
