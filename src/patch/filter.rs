/// Which discovered files get a patch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileFilter {
    All,
    /// Lowercased suffixes, each including the leading dot.
    Extensions(Vec<String>),
}

impl FileFilter {
    pub fn extensions<I, S>(exts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let suffixes = exts
            .into_iter()
            .map(|e| e.as_ref().trim().trim_start_matches('.').to_lowercase())
            .filter(|e| !e.is_empty())
            .map(|e| format!(".{e}"))
            .collect();
        FileFilter::Extensions(suffixes)
    }

    /// True for an extension set that can never match anything.
    pub fn is_empty(&self) -> bool {
        matches!(self, FileFilter::Extensions(suffixes) if suffixes.is_empty())
    }

    /// Case-insensitive suffix match on the file name.
    pub fn accepts(&self, file_name: &str) -> bool {
        match self {
            FileFilter::All => true,
            FileFilter::Extensions(suffixes) => {
                let name = file_name.to_lowercase();
                suffixes.iter().any(|s| name.ends_with(s.as_str()))
            }
        }
    }

    pub fn label(&self) -> String {
        match self {
            FileFilter::All => "all files".to_string(),
            FileFilter::Extensions(suffixes) => format!("{} files", suffixes.join(" and ")),
        }
    }
}
