use std::path::{Component, Path, PathBuf};

pub const HOME_SHORTHAND: &str = "~";

/// Replaces a leading `~` with `home` and normalizes the result lexically.
///
/// An unknown home directory substitutes an empty prefix, so `~/foo` becomes
/// `foo`. Paths without the shorthand are only normalized. Expanding an
/// already expanded path returns it unchanged.
pub fn expand_path(input: &Path, home: Option<&Path>) -> PathBuf {
    match input.strip_prefix(HOME_SHORTHAND) {
        Ok(rest) => {
            let home = home.unwrap_or(Path::new(""));
            normalize(&home.join(rest))
        }
        Err(_) => normalize(input),
    }
}

/// Expands the home shorthand and anchors relative paths at the current
/// working directory.
///
/// Used for paths typed by the user on the command line or in the
/// configuration file.
pub fn resolve_user_path(input: &Path, home: Option<&Path>) -> PathBuf {
    let expanded = expand_path(input, home);
    if expanded.is_absolute() {
        return expanded;
    }
    match std::path::absolute(&expanded) {
        Ok(p) => normalize(&p),
        Err(_) => expanded,
    }
}

/// Drops `.` components and folds `..` into the preceding component.
///
/// Purely lexical, the filesystem is never touched.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    out
}

/// True for Windows paths rooted at a drive letter, like `E:\Emulation`.
pub fn is_drive_rooted(path: &Path) -> bool {
    let text = path.to_string_lossy();
    let mut chars = text.chars();
    matches!(
        (chars.next(), chars.next(), chars.next()),
        (Some(letter), Some(':'), Some('\\' | '/')) if letter.is_ascii_alphabetic()
    )
}
