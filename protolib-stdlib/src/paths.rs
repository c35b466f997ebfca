//! Filesystem helpers on path strings
//!
//! Each helper resolves its receiver as a path, expanding a leading `~`, and
//! hands the work to `std::fs`. OS errors are surfaced unchanged.

use crate::args::{opt_map, receiver_str, req_int, req_str};
use crate::registry::{Operation, Registry};
use anyhow::Result;
use protolib_core::{Effect, Group, Map, Value};
use regex::Regex;
use rustc_hash::FxHashSet;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use tracing::debug;

/// Options for [`PathExt::ls`]
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    /// Descend into subdirectories
    pub recursive: bool,
    /// Descend through symbolic links to directories
    pub follow_symlinks: bool,
    /// Keep only paths matching this pattern
    pub filter: Option<Regex>,
}

impl ListOptions {
    fn from_map(map: &Map) -> protolib_core::Result<Self> {
        let filter = match map.get("filter") {
            Some(Value::String(pattern)) => Some(
                Regex::new(pattern).map_err(|e| protolib_core::Error::Parse(e.to_string()))?,
            ),
            _ => None,
        };
        Ok(Self {
            recursive: map.get("recursive").is_some_and(Value::is_truthy),
            follow_symlinks: map.get("followSymlinks").is_some_and(Value::is_truthy),
            filter,
        })
    }
}

/// Filesystem operations addressed by a path string
pub trait PathExt {
    /// The path with a leading `~` expanded to the home directory
    fn path(&self) -> PathBuf;

    fn exists(&self) -> bool;

    /// `size`, `mode`, `isFile`, `isDirectory`, `isSymbolicLink` and `mtimeMs`
    fn stat(&self) -> protolib_core::Result<Map>;

    fn cat(&self) -> protolib_core::Result<String>;

    fn write(&self, contents: &str) -> protolib_core::Result<()>;

    fn append(&self, contents: &str) -> protolib_core::Result<()>;

    fn cp(&self, dest: &str) -> protolib_core::Result<()>;

    fn rename(&self, dest: &str) -> protolib_core::Result<()>;

    fn unlink(&self) -> protolib_core::Result<()>;

    /// Create the directory and any missing parents
    fn mkdir(&self) -> protolib_core::Result<()>;

    /// Remove the directory and everything under it
    fn rmdir(&self) -> protolib_core::Result<()>;

    /// Create a symbolic link at `link` pointing to this path
    fn symlink(&self, link: &str) -> protolib_core::Result<()>;

    fn chmod(&self, mode: u32) -> protolib_core::Result<()>;

    fn chown(&self, uid: u32, gid: u32) -> protolib_core::Result<()>;

    /// Entries under this directory, sorted
    fn ls(&self, options: &ListOptions) -> protolib_core::Result<Vec<String>>;
}

impl PathExt for str {
    fn path(&self) -> PathBuf {
        expand_home(self)
    }

    fn exists(&self) -> bool {
        self.path().exists()
    }

    fn stat(&self) -> protolib_core::Result<Map> {
        let path = self.path();
        let link = fs::symlink_metadata(&path)?;
        let meta = if link.file_type().is_symlink() {
            fs::metadata(&path).unwrap_or_else(|_| link.clone())
        } else {
            link.clone()
        };

        let mtime_ms = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0);

        let mut out = Map::default();
        out.insert("size".into(), Value::Integer(meta.len() as i64));
        out.insert("mode".into(), Value::Integer(mode_of(&meta) as i64));
        out.insert("isFile".into(), Value::Boolean(meta.is_file()));
        out.insert("isDirectory".into(), Value::Boolean(meta.is_dir()));
        out.insert(
            "isSymbolicLink".into(),
            Value::Boolean(link.file_type().is_symlink()),
        );
        out.insert("mtimeMs".into(), Value::Integer(mtime_ms));
        Ok(out)
    }

    fn cat(&self) -> protolib_core::Result<String> {
        Ok(fs::read_to_string(self.path())?)
    }

    fn write(&self, contents: &str) -> protolib_core::Result<()> {
        let path = self.path();
        debug!("write {} bytes to {}", contents.len(), path.display());
        Ok(fs::write(path, contents)?)
    }

    fn append(&self, contents: &str) -> protolib_core::Result<()> {
        let path = self.path();
        debug!("append {} bytes to {}", contents.len(), path.display());
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        Ok(file.write_all(contents.as_bytes())?)
    }

    fn cp(&self, dest: &str) -> protolib_core::Result<()> {
        let (from, to) = (self.path(), dest.path());
        debug!("copy {} -> {}", from.display(), to.display());
        fs::copy(from, to)?;
        Ok(())
    }

    fn rename(&self, dest: &str) -> protolib_core::Result<()> {
        let (from, to) = (self.path(), dest.path());
        debug!("rename {} -> {}", from.display(), to.display());
        Ok(fs::rename(from, to)?)
    }

    fn unlink(&self) -> protolib_core::Result<()> {
        let path = self.path();
        debug!("unlink {}", path.display());
        Ok(fs::remove_file(path)?)
    }

    fn mkdir(&self) -> protolib_core::Result<()> {
        let path = self.path();
        debug!("mkdir {}", path.display());
        Ok(fs::create_dir_all(path)?)
    }

    fn rmdir(&self) -> protolib_core::Result<()> {
        let path = self.path();
        debug!("rmdir {}", path.display());
        Ok(fs::remove_dir_all(path)?)
    }

    fn symlink(&self, link: &str) -> protolib_core::Result<()> {
        let (target, link) = (self.path(), link.path());
        debug!("symlink {} -> {}", link.display(), target.display());
        make_symlink(&target, &link)
    }

    fn chmod(&self, mode: u32) -> protolib_core::Result<()> {
        let path = self.path();
        debug!("chmod {:o} {}", mode, path.display());
        set_mode(&path, mode)
    }

    fn chown(&self, uid: u32, gid: u32) -> protolib_core::Result<()> {
        let path = self.path();
        debug!("chown {}:{} {}", uid, gid, path.display());
        set_owner(&path, uid, gid)
    }

    fn ls(&self, options: &ListOptions) -> protolib_core::Result<Vec<String>> {
        let root = self.path();
        let mut out = Vec::new();
        let mut visited = FxHashSet::default();
        if let Ok(canonical) = fs::canonicalize(&root) {
            visited.insert(canonical);
        }
        walk(&root, options, &mut visited, &mut out)?;
        out.sort();
        Ok(out)
    }
}

fn expand_home(path: &str) -> PathBuf {
    let rest = match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest.trim_start_matches('/'),
        _ => return PathBuf::from(path),
    };
    match dirs::home_dir() {
        Some(home) if rest.is_empty() => home,
        Some(home) => home.join(rest),
        None => PathBuf::from(path),
    }
}

fn walk(
    dir: &Path,
    options: &ListOptions,
    visited: &mut FxHashSet<PathBuf>,
    out: &mut Vec<String>,
) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let display = path.to_string_lossy().into_owned();
        if options.filter.as_ref().map_or(true, |re| re.is_match(&display)) {
            out.push(display);
        }

        if !options.recursive {
            continue;
        }
        let file_type = entry.file_type()?;
        let descend = if file_type.is_symlink() {
            options.follow_symlinks && path.is_dir()
        } else {
            file_type.is_dir()
        };
        // Symlink cycles would otherwise recurse forever.
        if descend && visited.insert(fs::canonicalize(&path)?) {
            walk(&path, options, visited, out)?;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn mode_of(meta: &fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode()
}

#[cfg(not(unix))]
fn mode_of(meta: &fs::Metadata) -> u32 {
    if meta.permissions().readonly() {
        0o444
    } else {
        0o666
    }
}

#[cfg(unix)]
fn make_symlink(target: &Path, link: &Path) -> protolib_core::Result<()> {
    Ok(std::os::unix::fs::symlink(target, link)?)
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> protolib_core::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    Ok(fs::set_permissions(path, fs::Permissions::from_mode(mode))?)
}

#[cfg(unix)]
fn set_owner(path: &Path, uid: u32, gid: u32) -> protolib_core::Result<()> {
    Ok(std::os::unix::fs::chown(path, Some(uid), Some(gid))?)
}

#[cfg(not(unix))]
fn make_symlink(_target: &Path, _link: &Path) -> protolib_core::Result<()> {
    Err(unsupported("symlink"))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> protolib_core::Result<()> {
    Err(unsupported("chmod"))
}

#[cfg(not(unix))]
fn set_owner(_path: &Path, _uid: u32, _gid: u32) -> protolib_core::Result<()> {
    Err(unsupported("chown"))
}

#[cfg(not(unix))]
fn unsupported(op: &str) -> protolib_core::Error {
    io::Error::new(io::ErrorKind::Unsupported, format!("{} is not supported on this platform", op)).into()
}

/// Register the filesystem helpers with the string group
pub fn register(registry: &mut Registry) {
    let io = || vec![Effect::IO];
    registry.register_all(vec![
        Operation::pure(Group::String, "path", path_resolve, 0, Some(0), "Resolve a leading ~"),
        Operation::effectful(Group::String, "exists", path_exists, 0, Some(0), io(), "Check whether the path exists"),
        Operation::effectful(Group::String, "stat", path_stat, 0, Some(0), io(), "File metadata"),
        Operation::effectful(Group::String, "cat", path_cat, 0, Some(0), io(), "Read the file as text"),
        Operation::effectful(Group::String, "write", path_write, 1, Some(1), io(), "Write text to the file"),
        Operation::effectful(Group::String, "append", path_append, 1, Some(1), io(), "Append text to the file"),
        Operation::effectful(Group::String, "cp", path_cp, 1, Some(1), io(), "Copy the file"),
        Operation::effectful(Group::String, "rename", path_rename, 1, Some(1), io(), "Move the file"),
        Operation::effectful(Group::String, "unlink", path_unlink, 0, Some(0), io(), "Delete the file"),
        Operation::effectful(Group::String, "mkdir", path_mkdir, 0, Some(0), io(), "Create the directory and its parents"),
        Operation::effectful(Group::String, "rmdir", path_rmdir, 0, Some(0), io(), "Remove the directory recursively"),
        Operation::effectful(Group::String, "symlink", path_symlink, 1, Some(1), io(), "Create a symbolic link to this path"),
        Operation::effectful(Group::String, "chmod", path_chmod, 1, Some(1), io(), "Set permission bits"),
        Operation::effectful(Group::String, "chown", path_chown, 2, Some(2), io(), "Set owner and group"),
        Operation::effectful(Group::String, "ls", path_ls, 0, Some(1), io(), "List directory entries"),
    ]);
}

fn path_resolve(receiver: &mut Value, _args: &[Value]) -> Result<Value> {
    let s = receiver_str("string:path", receiver)?;
    Ok(Value::from(s.path().to_string_lossy().into_owned()))
}

fn path_exists(receiver: &mut Value, _args: &[Value]) -> Result<Value> {
    Ok(Value::Boolean(receiver_str("string:exists", receiver)?.exists()))
}

fn path_stat(receiver: &mut Value, _args: &[Value]) -> Result<Value> {
    Ok(Value::Map(receiver_str("string:stat", receiver)?.stat()?))
}

fn path_cat(receiver: &mut Value, _args: &[Value]) -> Result<Value> {
    Ok(Value::from(receiver_str("string:cat", receiver)?.cat()?))
}

fn path_write(receiver: &mut Value, args: &[Value]) -> Result<Value> {
    let s = receiver_str("string:write", receiver)?;
    s.write(&args[0].to_display_string())?;
    Ok(receiver.clone())
}

fn path_append(receiver: &mut Value, args: &[Value]) -> Result<Value> {
    let s = receiver_str("string:append", receiver)?;
    s.append(&args[0].to_display_string())?;
    Ok(receiver.clone())
}

fn path_cp(receiver: &mut Value, args: &[Value]) -> Result<Value> {
    let s = receiver_str("string:cp", receiver)?;
    let dest = req_str("string:cp", args, 0)?;
    s.cp(dest)?;
    Ok(Value::from(dest))
}

fn path_rename(receiver: &mut Value, args: &[Value]) -> Result<Value> {
    let s = receiver_str("string:rename", receiver)?;
    let dest = req_str("string:rename", args, 0)?;
    s.rename(dest)?;
    Ok(Value::from(dest))
}

fn path_unlink(receiver: &mut Value, _args: &[Value]) -> Result<Value> {
    receiver_str("string:unlink", receiver)?.unlink()?;
    Ok(Value::Nil)
}

fn path_mkdir(receiver: &mut Value, _args: &[Value]) -> Result<Value> {
    receiver_str("string:mkdir", receiver)?.mkdir()?;
    Ok(receiver.clone())
}

fn path_rmdir(receiver: &mut Value, _args: &[Value]) -> Result<Value> {
    receiver_str("string:rmdir", receiver)?.rmdir()?;
    Ok(Value::Nil)
}

fn path_symlink(receiver: &mut Value, args: &[Value]) -> Result<Value> {
    let s = receiver_str("string:symlink", receiver)?;
    let link = req_str("string:symlink", args, 0)?;
    s.symlink(link)?;
    Ok(Value::from(link))
}

fn path_chmod(receiver: &mut Value, args: &[Value]) -> Result<Value> {
    let s = receiver_str("string:chmod", receiver)?;
    // Octal strings such as "755" are accepted alongside integers.
    let mode = match &args[0] {
        Value::String(text) => u32::from_str_radix(text, 8)
            .map_err(|e| anyhow::anyhow!("string:chmod: invalid mode '{}': {}", text, e))?,
        _ => u32::try_from(req_int("string:chmod", args, 0)?)?,
    };
    s.chmod(mode)?;
    Ok(receiver.clone())
}

fn path_chown(receiver: &mut Value, args: &[Value]) -> Result<Value> {
    let s = receiver_str("string:chown", receiver)?;
    let uid = u32::try_from(req_int("string:chown", args, 0)?)?;
    let gid = u32::try_from(req_int("string:chown", args, 1)?)?;
    s.chown(uid, gid)?;
    Ok(receiver.clone())
}

fn path_ls(receiver: &mut Value, args: &[Value]) -> Result<Value> {
    let s = receiver_str("string:ls", receiver)?;
    let options = match opt_map("string:ls", args, 0)? {
        Some(map) => ListOptions::from_map(map)?,
        None => ListOptions::default(),
    };
    let entries = s.ls(&options)?;
    Ok(Value::List(entries.into_iter().map(Value::from).collect()))
}
