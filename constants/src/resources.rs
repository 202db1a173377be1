/// Directory the engine runtime and its dependencies are served from.
pub const LIB_BASE_PATH: &str = "/libs";

/// Kind of runtime asset, as injected into the document head.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Style,
    Script,
}

/// (kind, path relative to [`LIB_BASE_PATH`], identity)
///
/// Order matters: stylesheets first, then the 3D scene library, then the
/// utility scripts the engine expects as globals, then the engine entry script.
pub const RUNTIME_ASSETS: &[(AssetKind, &str, &str)] = &[
    (AssetKind::Style, "potree/potree.css", "potree-style"),
    (AssetKind::Style, "jquery-ui/jquery-ui.min.css", "jquery-ui-style"),
    (AssetKind::Script, "three.js/build/three.min.js", "three-script"),
    (AssetKind::Script, "jquery/jquery-3.1.1.min.js", "jquery-script"),
    (AssetKind::Script, "jquery-ui/jquery-ui.min.js", "jquery-ui-script"),
    (AssetKind::Script, "other/BinaryHeap.js", "binary-heap-script"),
    (AssetKind::Script, "tween/tween.min.js", "tween-script"),
    (AssetKind::Script, "i18next/i18next.js", "i18next-script"),
    (AssetKind::Script, "potree/potree.js", "potree-script"),
];
