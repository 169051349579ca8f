use std::fmt;
use std::path as fs_path;

use percent_encoding::percent_decode_str;

static MAX_PATH_BYTES: usize = 4096; // Bytes

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("The path is invalid {path:?}: {message}")]
    PathStringInvalid { path: String, message: String },
    #[error("The path component {component:?} is invalid: {message}")]
    ComponentInvalid { component: String, message: String },
}

/// A `Path` is a request path resolved against the store root.
///
/// Components are already percent-decoded and free of `.`/`..` segments, so joining a `Path` onto
/// a root directory can never name anything outside of that root.
#[derive(Clone, Debug, Default, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Path {
    pub components: Vec<String>,
}

impl Path {
    /// The root of the store.
    pub fn root() -> Self {
        Path { components: vec![] }
    }

    /// Resolves the path portion of a request URI.
    ///
    /// Empty and `.` segments are dropped and `..` removes the previous segment, stopping at the
    /// root.  `/a/./b//../c/` resolves to `a/c` and `/../../etc` resolves to `etc`.
    pub fn from_request(raw: &str) -> Result<Self, Error> {
        Self::validate_path_length(raw)?;

        let mut components: Vec<String> = vec![];
        for segment in raw.split('/') {
            let decoded = percent_decode_str(segment).decode_utf8().map_err(|err| {
                Error::PathStringInvalid {
                    path: raw.to_string(),
                    message: format!("segment {:?} is not valid UTF-8: {}", segment, err),
                }
            })?;

            match decoded.as_ref() {
                "" | "." => {}
                ".." => {
                    components.pop();
                }
                component => {
                    Self::validate_component(component)?;
                    components.push(component.to_string());
                }
            }
        }

        Ok(Path { components })
    }

    fn validate_path_length(raw: &str) -> Result<(), Error> {
        if raw.len() > MAX_PATH_BYTES {
            return Err(Error::PathStringInvalid {
                path: raw.chars().take(64).collect(),
                message: format!("path exceeds {} bytes", MAX_PATH_BYTES),
            });
        }
        Ok(())
    }

    // Decoding can smuggle separators and NULs back into a single segment.
    fn validate_component(component: &str) -> Result<(), Error> {
        if component.contains('/') || component.contains('\\') {
            return Err(Error::ComponentInvalid {
                component: component.to_string(),
                message: "contains a path separator".to_string(),
            });
        }
        if component.contains('\0') {
            return Err(Error::ComponentInvalid {
                component: component.to_string(),
                message: "contains a NUL byte".to_string(),
            });
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maps this path onto the filesystem below `root`.
    pub fn to_file_path(&self, root: &fs_path::Path) -> fs_path::PathBuf {
        let mut file_path = root.to_path_buf();
        file_path.extend(self.components.iter());
        file_path
    }

    /// The site-absolute URL path of the child `name` of this path.
    pub fn child_href(&self, name: &str) -> String {
        let mut href = String::from("/");
        for component in &self.components {
            href.push_str(component);
            href.push('/');
        }
        href.push_str(name);
        href
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.components.join("/"))
    }
}
