use constants::resources::{AssetKind, LIB_BASE_PATH, RUNTIME_ASSETS};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Style,
    Script,
}

impl From<AssetKind> for ResourceKind {
    fn from(kind: AssetKind) -> Self {
        match kind {
            AssetKind::Style => Self::Style,
            AssetKind::Script => Self::Script,
        }
    }
}

/// One external stylesheet or script. The identity, not the url, decides
/// whether the resource is already present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    kind: ResourceKind,
    url: String,
    identity: String,
}

impl ResourceDescriptor {
    pub fn new(kind: ResourceKind, url: impl Into<String>, identity: impl Into<String>) -> Self {
        Self {
            kind,
            url: url.into(),
            identity: identity.into(),
        }
    }

    pub fn style(url: impl Into<String>, identity: impl Into<String>) -> Self {
        Self::new(ResourceKind::Style, url, identity)
    }

    pub fn script(url: impl Into<String>, identity: impl Into<String>) -> Self {
        Self::new(ResourceKind::Script, url, identity)
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }
}

/// Ordered list of descriptors. Later entries may rely on globals defined by
/// earlier ones, so order is preserved exactly as given.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceManifest(Vec<ResourceDescriptor>);

impl ResourceManifest {
    pub fn new(descriptors: Vec<ResourceDescriptor>) -> Self {
        Self(descriptors)
    }

    /// The engine runtime manifest rooted at `base_path`.
    pub fn runtime(base_path: &str) -> Self {
        let base = base_path.trim_end_matches('/');
        Self(
            RUNTIME_ASSETS
                .iter()
                .map(|(kind, path, identity)| {
                    ResourceDescriptor::new((*kind).into(), format!("{base}/{path}"), *identity)
                })
                .collect(),
        )
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResourceDescriptor> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First identity that appears more than once, if any.
    pub fn duplicate_identity(&self) -> Option<&str> {
        self.0.iter().enumerate().find_map(|(index, descriptor)| {
            self.0[..index]
                .iter()
                .any(|earlier| earlier.identity == descriptor.identity)
                .then_some(descriptor.identity.as_str())
        })
    }
}

pub(crate) fn default_manifest() -> ResourceManifest {
    ResourceManifest::runtime(LIB_BASE_PATH)
}
