use chrono::Utc;

/// Extension-less names the form accepts as files right away.
/// The match is exact, same case as shown in the type selector.
pub(crate) const SPECIAL_FILENAMES: [&str; 5] =
    ["Dockerfile", "Makefile", "makefile", "GNUmakefile", "LICENSE"];

/// Data source of the file type dropdown, (extension, label)
pub(crate) const FILE_TYPES: [(&str, &str); 12] = [
    ("ipynb", "Jupyter notebook"),
    ("tex", "LaTeX document"),
    ("md", "Markdown"),
    ("rmd", "RMarkdown"),
    ("term", "Linux terminal"),
    ("x11", "X11 desktop"),
    ("sagews", "Sage worksheet"),
    ("py", "Python file"),
    ("sage", "Sage file"),
    ("course", "Course management"),
    ("tasks", "Task list"),
    ("txt", "Plain text"),
];

/// Extension of the last path segment, without the dot.
/// A name ending in '.' has an empty extension, a dotfile like
/// ".bashrc" counts as having one.
pub(crate) fn filename_extension(filename: &str) -> &str {
    let tail = filename.rsplit('/').next().unwrap_or(filename);
    match tail.rfind('.') {
        Some(pos) => &tail[pos + 1..],
        None => "",
    }
}

/// The candidate is a link to fetch, not a name to create
pub(crate) fn is_only_downloadable(filename: &str) -> bool {
    filename.contains("://") || filename.starts_with("git@github.com")
}

/// Timestamp shaped name used when the caller gives none, ex "2026-08-26-103045"
pub(crate) fn default_filename(ext: Option<&str>) -> String {
    let stamp = Utc::now().format("%Y-%m-%d-%H%M%S").to_string();
    match ext {
        Some(e) if !e.is_empty() => format!("{}.{}", stamp, e),
        _ => stamp,
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;

    use super::*;

    #[test]
    fn extension_of_plain_names() {
        assert_eq!("md", filename_extension("notes.md"));
        assert_eq!("gz", filename_extension("archive.tar.gz"));
        assert_eq!("", filename_extension("notes"));
    }

    #[test]
    fn extension_comes_from_the_last_segment() {
        assert_eq!("ipynb", filename_extension("notebooks/main.ipynb"));
        assert_eq!("", filename_extension("v1.2/readme"));
        assert_eq!("", filename_extension("data/"));
    }

    #[test]
    fn trailing_dot_means_empty_extension() {
        assert_eq!("", filename_extension("foo."));
    }

    #[test]
    fn dotfile_counts_as_having_an_extension() {
        assert_eq!("bashrc", filename_extension(".bashrc"));
    }

    #[test]
    fn downloadable_patterns() {
        assert!(is_only_downloadable("https://example.com/data.csv"));
        assert!(is_only_downloadable("ftp://host/file"));
        assert!(is_only_downloadable("git@github.com:me/repo.git"));
        assert!(!is_only_downloadable("notes.md"));
        assert!(!is_only_downloadable("github.com/me/repo"));
    }

    #[test]
    fn default_filename_is_a_timestamp() {
        let name = default_filename(None);
        assert!(NaiveDateTime::parse_from_str(&name, "%Y-%m-%d-%H%M%S").is_ok());

        let with_ext = default_filename(Some("ipynb"));
        assert!(with_ext.ends_with(".ipynb"));
    }

    #[test]
    fn special_names_are_extension_less() {
        for name in SPECIAL_FILENAMES {
            assert_eq!("", filename_extension(name), "name={}", name);
        }
    }
}
