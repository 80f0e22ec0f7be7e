use std::path::Path;
use crate::error::DetectError;
use crate::utils;

/// Class-id to label lookup. Ids are dense and zero-based: id `n` is line `n` of the names file.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ClassNameTable {
    names: Vec<String>,
}

impl ClassNameTable {
    pub fn from_file(path: &Path) -> crate::Result<Self> {
        let names = utils::file_to_vec(path).map_err(|source| DetectError::NamesFile {
            path: path.to_path_buf(),
            source,
        })?;
        if names.is_empty() {
            log::warn!("Names file {} is empty, every detection will fail to resolve", path.display());
        }
        Ok(Self { names })
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { names: names.into_iter().map(Into::into).collect() }
    }

    pub fn get(&self, class_id: u32) -> Option<&str> {
        self.names.get(class_id as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
