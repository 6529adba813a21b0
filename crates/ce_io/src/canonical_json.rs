//! Canonical JSON utilities (ce_io)
//! - Objects: keys sorted lexicographically (UTF-8 byte order)
//! - Arrays: order preserved (callers sort before writing)
//! - Output: compact, no trailing newline
//! - Atomic write: temp file in the same dir, fsync(temp), rename; fsync(dir) on Unix

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;

use crate::IoError;

/// Canonical bytes of any serializable value.
pub fn to_canonical_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, IoError> {
    let v = serde_json::to_value(value)?;
    canonical_value_bytes(&v)
}

/// Canonical bytes of an already-built `Value`.
pub fn canonical_value_bytes(v: &Value) -> Result<Vec<u8>, IoError> {
    let mut out = Vec::with_capacity(1024);
    write_canonical_value(v, &mut out)?;
    Ok(out)
}

/// Canonical JSON as a `String`.
pub fn to_canonical_string<T: Serialize + ?Sized>(value: &T) -> Result<String, IoError> {
    let bytes = to_canonical_bytes(value)?;
    String::from_utf8(bytes).map_err(|e| IoError::Json { pointer: "/".into(), msg: e.to_string() })
}

/// Write canonical JSON to `path` atomically.
pub fn write_canonical_file<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), IoError> {
    let bytes = to_canonical_bytes(value)?;
    write_atomic(path, &bytes)?;
    Ok(())
}

fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent)?;

    let tmp = make_unique_tmp_path(path);
    let mut tf = OpenOptions::new().write(true).create_new(true).open(&tmp)?;
    let written = tf.write_all(bytes).and_then(|_| tf.sync_all());
    drop(tf);
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }

    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    let _ = fsync_dir(&parent);
    Ok(())
}

fn write_canonical_value(v: &Value, out: &mut Vec<u8>) -> Result<(), IoError> {
    match v {
        Value::Null => out.extend_from_slice(b"null"),
        Value::Bool(true) => out.extend_from_slice(b"true"),
        Value::Bool(false) => out.extend_from_slice(b"false"),
        Value::Number(n) => out.extend_from_slice(n.to_string().as_bytes()),
        Value::String(s) => out.extend_from_slice(serde_json::to_string(s)?.as_bytes()),
        Value::Array(arr) => {
            out.push(b'[');
            for (i, elem) in arr.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_canonical_value(elem, out)?;
            }
            out.push(b']');
        }
        Value::Object(map) => {
            out.push(b'{');
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
            for (i, (k, val)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                out.extend_from_slice(serde_json::to_string(k)?.as_bytes());
                out.push(b':');
                write_canonical_value(val, out)?;
            }
            out.push(b'}');
        }
    }
    Ok(())
}

/// "<filename>.<pid>.<counter>.tmp" next to `target`.
fn make_unique_tmp_path(target: &Path) -> PathBuf {
    use std::sync::atomic::{AtomicU64, Ordering};

    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let pid = std::process::id();
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    let fname = target.file_name().and_then(|s| s.to_str()).unwrap_or("file");
    let tmp_name = format!("{fname}.{pid}.{n}.tmp");

    match target.parent() {
        Some(dir) => dir.join(tmp_name),
        None => PathBuf::from(tmp_name),
    }
}

#[cfg(unix)]
fn fsync_dir(dir: &Path) -> io::Result<()> {
    OpenOptions::new().read(true).open(dir)?.sync_all()
}

#[cfg(not(unix))]
#[inline]
fn fsync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn objects_are_sorted_arrays_preserved() {
        let v = json!({
            "phaseEndsEpoch": 1,
            "candidateId": { "y": 1, "x": 2 },
            "arr": [ {"k":2,"j":1}, 3, "z" ]
        });
        let s = String::from_utf8(canonical_value_bytes(&v).unwrap()).unwrap();
        assert_eq!(s, r#"{"arr":[{"j":1,"k":2},3,"z"],"candidateId":{"x":2,"y":1},"phaseEndsEpoch":1}"#);
        assert!(!s.ends_with('\n'));
    }

    #[test]
    fn atomic_write_replaces_and_leaves_no_temp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");
        write_canonical_file(&path, &json!({"b": 2, "a": 1})).unwrap();
        write_canonical_file(&path, &json!({"b": 3, "a": 1})).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), r#"{"a":1,"b":3}"#);
        let leftovers = fs::read_dir(path.parent().unwrap())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .count();
        assert_eq!(leftovers, 0);
    }
}
