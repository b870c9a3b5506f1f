use anyhow::Result;
use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};

/// Maps an archive entry name onto a path below `root`.
///
/// Both `/` and `\` separate components. Empty and `.` components are
/// dropped; `..`, roots and drive prefixes are rejected.
pub fn entry_output_path(root: &Path, name: &str) -> Result<PathBuf> {
    let mut path = root.to_path_buf();
    let mut depth = 0usize;
    for part in name.split(['/', '\\']) {
        if part.is_empty() || part == "." {
            continue;
        }
        let mut components = Path::new(part).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(c)), None) => path.push(c),
            _ => {
                return Err(anyhow::anyhow!(
                    "Entry name '{}' escapes the output directory",
                    name
                ));
            }
        }
        depth += 1;
    }
    if depth == 0 {
        return Err(anyhow::anyhow!("Entry name '{}' is empty", name));
    }
    Ok(path)
}

pub fn make_sure_dir_exists<F: AsRef<Path> + ?Sized>(f: &F) -> std::io::Result<()> {
    let path = f.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Creates `path` (and its parent directories) and writes `data` into it.
pub fn write_file_all<F: AsRef<Path> + ?Sized>(path: &F, data: &[u8]) -> std::io::Result<()> {
    make_sure_dir_exists(path)?;
    let mut file = fs::File::create(path)?;
    file.write_all(data)?;
    file.flush()
}
